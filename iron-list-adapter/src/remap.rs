/// Logical item count above which index remapping activates. Window math
/// becomes unreliable past a few hundred thousand slots, so larger lists are
/// presented to the metrics core through a bounded virtual range.
pub const DEFAULT_MAX_VIRTUAL_COUNT: usize = 100_000;

/// Band (in indexes) near either end of the virtual range inside which the
/// offset gets nudged back so the extremes stay reachable.
const OFFSET_ADJUST_MIN_THRESHOLD: usize = 1_000;

/// Largest offset nudge applied per scroll event inside the threshold band.
const MAX_OFFSET_SHIFT: usize = 100;

/// Single-frame scroll deltas larger than this (a dragged scrollbar thumb)
/// recompute the offset proportionally instead of incrementally.
const HUGE_SCROLL_DELTA: i64 = 10_000;

/// Inputs for [`IndexRemap::adjust`], captured after the scroll handler ran.
#[derive(Clone, Copy, Debug)]
pub struct AdjustContext {
    /// Scroll delta of the event being processed.
    pub delta: i64,
    pub scroll_top: i64,
    /// Maximum reachable scroll position (extent minus viewport).
    pub max_scroll_top: i64,
    /// First visible virtual index after the scroll was applied.
    pub first_visible: usize,
}

/// Maps an unbounded logical index space onto the bounded virtual range the
/// metrics core operates on: `logical = virtual + offset`.
///
/// The offset is re-anchored as scrolling approaches either extreme so that
/// logical index 0 and `size - 1` always stay reachable. A pure coordinate
/// transform; no rendering responsibility.
#[derive(Clone, Copy, Debug)]
pub struct IndexRemap {
    size: usize,
    max_virtual_count: usize,
    vidx_offset: usize,
    skip_next_adjust: bool,
}

impl IndexRemap {
    pub fn new(max_virtual_count: usize) -> Self {
        Self {
            size: 0,
            max_virtual_count: max_virtual_count.max(1),
            vidx_offset: 0,
            skip_next_adjust: false,
        }
    }

    pub fn set_size(&mut self, size: usize) {
        self.size = size;
        self.vidx_offset = self.vidx_offset.min(self.max_offset());
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Item count presented to the metrics core.
    pub fn virtual_count(&self) -> usize {
        self.size.min(self.max_virtual_count)
    }

    pub fn active(&self) -> bool {
        self.size > self.max_virtual_count
    }

    pub fn offset(&self) -> usize {
        self.vidx_offset
    }

    pub fn max_offset(&self) -> usize {
        self.size - self.virtual_count()
    }

    pub fn logical(&self, vidx: usize) -> usize {
        vidx + self.vidx_offset
    }

    /// Picks the virtual index to scroll to for a logical target, re-anchoring
    /// the offset. `visible_count` is the number of currently visible items;
    /// targets that close to either end of the virtual range are special-cased
    /// so the exact boundary items stay reachable.
    pub fn target_for(&mut self, index: usize, visible_count: usize) -> usize {
        let index = index.min(self.size.saturating_sub(1));
        if !self.active() {
            self.vidx_offset = 0;
            return index;
        }
        let vc = self.virtual_count();
        let mut target = (index as u128 * vc as u128 / self.size.max(1) as u128) as usize;
        if vc - target < visible_count {
            // The very end of the range must be exactly reachable. With a
            // small ceiling the trailing item count can exceed the whole
            // virtual range; the target clamps instead of wrapping.
            target = (vc as i64 - (self.size - index) as i64).clamp(0, vc as i64 - 1) as usize;
            self.vidx_offset = self.size - vc;
        } else if target < visible_count {
            if index < OFFSET_ADJUST_MIN_THRESHOLD {
                target = index;
                self.vidx_offset = 0;
            } else {
                target = OFFSET_ADJUST_MIN_THRESHOLD;
                self.vidx_offset = index - target;
            }
        } else {
            self.vidx_offset = index - target;
        }
        self.skip_next_adjust = true;
        ldebug!(index, vidx = target, offset = self.vidx_offset, "remap target");
        target
    }

    /// Re-anchors the offset after a scroll event.
    ///
    /// Returns the virtual index the adapter must re-scroll to so the view
    /// does not visibly jump when the offset changes, or `None` when no
    /// compensation is needed.
    pub fn adjust(&mut self, ctx: AdjustContext) -> Option<usize> {
        if !self.active() {
            return None;
        }
        if self.skip_next_adjust {
            self.skip_next_adjust = false;
            return None;
        }
        let vc = self.virtual_count();
        let max_offset = self.max_offset();

        if ctx.delta.abs() > HUGE_SCROLL_DELTA {
            if ctx.max_scroll_top > 0 {
                let n = ctx.scroll_top.clamp(0, ctx.max_scroll_top) as i128 * max_offset as i128;
                let offset = round_div_i128(n, ctx.max_scroll_top as i128) as usize;
                self.vidx_offset = offset.min(max_offset);
                ltrace!(offset = self.vidx_offset, "remap proportional recompute");
            }
            return None;
        }

        let old = self.vidx_offset;

        // Near the start.
        if ctx.scroll_top == 0 {
            self.vidx_offset = 0;
            return (old != 0).then_some(0);
        }
        if ctx.first_visible < OFFSET_ADJUST_MIN_THRESHOLD && self.vidx_offset > 0 {
            let shift = self.vidx_offset.min(MAX_OFFSET_SHIFT);
            self.vidx_offset -= shift;
            return Some(ctx.first_visible + shift);
        }

        // Near the end.
        if ctx.scroll_top >= ctx.max_scroll_top && ctx.max_scroll_top > 0 {
            self.vidx_offset = max_offset;
            return (old != max_offset).then_some(vc - 1);
        }
        if ctx.first_visible > vc.saturating_sub(OFFSET_ADJUST_MIN_THRESHOLD)
            && self.vidx_offset < max_offset
        {
            let shift = (max_offset - self.vidx_offset).min(MAX_OFFSET_SHIFT);
            self.vidx_offset += shift;
            return Some(ctx.first_visible - shift);
        }
        None
    }
}

fn round_div_i128(n: i128, d: i128) -> i128 {
    if d == 0 { 0 } else { (n + d / 2) / d }
}
