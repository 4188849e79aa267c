/// Configuration for [`crate::ListCore`].
///
/// The `ratio` and `max_pages` knobs are empirically tuned values inherited from
/// production use. They trade pool size against recycle churn; treat them as
/// performance-tunable parameters, not correctness parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoreConfig {
    /// Fraction of the currently hidden content that the reusables walk leaves
    /// in place on the trailing edge. `0.0` recycles everything that is out of
    /// view; `0.5` keeps half of it as a scroll-direction-change buffer.
    pub ratio: f32,

    /// The pool stops growing once the rendered content covers this many
    /// viewport heights.
    pub max_pages: f32,

    /// Minimum number of physical slots to allocate, even for tiny viewports.
    pub default_physical_count: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            ratio: 0.5,
            max_pages: 2.0,
            default_physical_count: 3,
        }
    }
}

impl CoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ratio(mut self, ratio: f32) -> Self {
        self.ratio = ratio;
        self
    }

    pub fn with_max_pages(mut self, max_pages: f32) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_default_physical_count(mut self, default_physical_count: usize) -> Self {
        self.default_physical_count = default_physical_count;
        self
    }
}
