/// Outcome of a scroll-position update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollUpdate {
    /// Nothing to do (empty pool or zero item count).
    None,
    /// The scroll delta exceeded the rendered extent; the whole window was
    /// relocated by estimation and every slot needs new content.
    Reseek,
    /// Slots that scrolled out on the trailing edge were moved to the leading
    /// edge. The recycled slot ids are in the caller-provided scratch buffer.
    Recycle { scrolling_down: bool },
}

/// Pool growth scheduling hint returned by [`crate::ListCore::growth_policy`].
///
/// `Soon` growth should run as soon as the current event handler finishes (the
/// viewport is not yet covered); `Idle` growth is low-priority back-buffer
/// filling and may wait for idle time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PoolGrowth {
    Done,
    Soon(usize),
    Idle(usize),
}
