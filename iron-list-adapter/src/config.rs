use iron_list_core::CoreConfig;

use crate::remap::DEFAULT_MAX_VIRTUAL_COUNT;

/// Configuration for [`crate::VirtualScroller`].
///
/// The timing values mirror the delays the engine was tuned with in
/// production; they are scheduling knobs, not correctness parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollerConfig {
    pub core: CoreConfig,

    /// Logical item count above which index remapping activates.
    pub max_virtual_count: usize,

    /// Fallback main-axis size for elements that measure zero before any
    /// non-zero element has been seen.
    pub placeholder_size: u32,

    /// Whether elements are physically reordered after scrolling so host
    /// order matches window order (focus/tab-order correctness).
    pub reorder_elements: bool,

    /// Delay before the post-scroll reorder runs.
    pub reorder_delay_ms: u64,

    /// Window during which inertial wheel events are swallowed after a
    /// scroll was yielded to an ancestor.
    pub ignore_wheel_ms: u64,

    /// Delay before the invalid-position check runs after a scroll.
    pub reposition_delay_ms: u64,
}

impl Default for ScrollerConfig {
    fn default() -> Self {
        Self {
            core: CoreConfig::default(),
            max_virtual_count: DEFAULT_MAX_VIRTUAL_COUNT,
            placeholder_size: 200,
            reorder_elements: false,
            reorder_delay_ms: 500,
            ignore_wheel_ms: 500,
            reposition_delay_ms: 100,
        }
    }
}

impl ScrollerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_core(mut self, core: CoreConfig) -> Self {
        self.core = core;
        self
    }

    pub fn with_max_virtual_count(mut self, max_virtual_count: usize) -> Self {
        self.max_virtual_count = max_virtual_count;
        self
    }

    pub fn with_placeholder_size(mut self, placeholder_size: u32) -> Self {
        self.placeholder_size = placeholder_size;
        self
    }

    pub fn with_reorder_elements(mut self, reorder_elements: bool) -> Self {
        self.reorder_elements = reorder_elements;
        self
    }
}
