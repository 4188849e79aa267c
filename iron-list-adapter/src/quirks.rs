/// Platform-specific scroll behavior, isolated so the windowing algorithm
/// stays portable. Browser hosts plug in measured values and inertial-scroll
/// handling; headless hosts use [`NoQuirks`].
pub trait PlatformQuirks {
    /// Pixel height of one wheel "line" scroll unit.
    fn line_height_px(&self) -> u32 {
        16
    }

    /// Pixel height of one wheel "page" scroll unit.
    fn page_height_px(&self, viewport_size: u32) -> u32 {
        viewport_size
    }

    /// Whether the platform delivers inertial (momentum) wheel events after
    /// the user's gesture has ended. When true, the adapter swallows the
    /// momentum tail after yielding a scroll to an ancestor.
    fn has_inertial_scroll(&self) -> bool {
        false
    }
}

/// Default quirks: fixed line height, no inertial scrolling.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoQuirks;

impl PlatformQuirks for NoQuirks {}
