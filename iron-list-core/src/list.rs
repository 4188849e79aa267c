use alloc::vec::Vec;
use core::cell::Cell;

use crate::{CoreConfig, PoolGrowth, ScrollUpdate};

/// The windowing metrics core.
///
/// `ListCore` maintains a sliding window of "physical" slots (a circular,
/// recycling pool of renderable elements) over a much larger "virtual" index
/// range, and estimates the total scrollable extent from a running average of
/// measured slot sizes.
///
/// This type is intentionally host-agnostic:
/// - It never touches elements; the adapter owns the pool and feeds
///   measurements in through closures.
/// - Scroll/resize events arrive as plain method calls with pixel values.
/// - Recycle decisions come back as slot ids in caller-owned scratch buffers,
///   so steady-state scrolling allocates nothing.
///
/// Pixel positions are `i64` (over-scroll and repair deltas go negative),
/// measured sizes are `u32`.
#[derive(Clone, Debug)]
pub struct ListCore {
    cfg: CoreConfig,

    virtual_count: usize,
    items_per_row: usize,
    row_height: u32,

    physical_count: usize,
    physical_start: usize,
    virtual_start: usize,

    physical_top: i64,
    scroll_position: i64,
    physical_size: i64,

    physical_average: u32,
    physical_average_count: usize,

    viewport_size: u32,
    list_offset: i64,

    // Live copy of cfg.ratio; temporarily forced to 0 during invalid-position
    // repair so every reusable slot moves to one side.
    ratio: f32,

    sizes: Vec<u32>,

    first_visible: Cell<Option<usize>>,
    last_visible: Cell<Option<usize>>,
}

impl ListCore {
    pub fn new(cfg: CoreConfig) -> Self {
        ldebug!(
            ratio = cfg.ratio,
            max_pages = cfg.max_pages,
            default_physical_count = cfg.default_physical_count,
            "ListCore::new"
        );
        Self {
            ratio: cfg.ratio,
            cfg,
            virtual_count: 0,
            items_per_row: 1,
            row_height: 0,
            physical_count: 0,
            physical_start: 0,
            virtual_start: 0,
            physical_top: 0,
            scroll_position: 0,
            physical_size: 0,
            physical_average: 0,
            physical_average_count: 0,
            viewport_size: 0,
            list_offset: 0,
            sizes: Vec::new(),
            first_visible: Cell::new(None),
            last_visible: Cell::new(None),
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    pub fn virtual_count(&self) -> usize {
        self.virtual_count
    }

    pub fn physical_count(&self) -> usize {
        self.physical_count
    }

    pub fn physical_start(&self) -> usize {
        self.physical_start
    }

    pub fn virtual_start(&self) -> usize {
        self.virtual_start
    }

    /// Last virtual index the pool can currently cover (inclusive).
    pub fn virtual_end(&self) -> usize {
        self.virtual_start + self.physical_count.saturating_sub(1)
    }

    pub fn physical_top(&self) -> i64 {
        self.physical_top
    }

    pub fn physical_bottom(&self) -> i64 {
        self.physical_top + self.physical_size
    }

    pub fn physical_size(&self) -> i64 {
        self.physical_size
    }

    pub fn physical_average(&self) -> u32 {
        self.physical_average
    }

    pub fn physical_average_count(&self) -> usize {
        self.physical_average_count
    }

    pub fn scroll_position(&self) -> i64 {
        self.scroll_position
    }

    pub fn viewport_size(&self) -> u32 {
        self.viewport_size
    }

    pub fn list_offset(&self) -> i64 {
        self.list_offset
    }

    pub fn items_per_row(&self) -> usize {
        self.items_per_row
    }

    pub fn row_height(&self) -> u32 {
        self.row_height
    }

    pub fn slot_size(&self, slot: usize) -> u32 {
        self.sizes.get(slot).copied().unwrap_or(0)
    }

    pub fn set_viewport(&mut self, viewport_size: u32, list_offset: i64) {
        self.viewport_size = viewport_size;
        self.list_offset = list_offset;
        self.invalidate_visible_caches();
    }

    /// Switches between linear (`items_per_row == 1`) and grid layout.
    ///
    /// In grid layout all index math is row based and the window start is kept
    /// row aligned.
    pub fn set_grid(&mut self, items_per_row: usize) {
        let items_per_row = items_per_row.max(1);
        if self.items_per_row == items_per_row {
            return;
        }
        self.items_per_row = items_per_row;
        self.virtual_start -= self.virtual_start % items_per_row;
        self.invalidate_visible_caches();
    }

    /// Temporarily overrides the protected-content ratio (used by
    /// invalid-position repair). [`Self::restore_ratio`] reinstates the
    /// configured value.
    pub fn set_ratio(&mut self, ratio: f32) {
        self.ratio = ratio;
    }

    pub fn restore_ratio(&mut self) {
        self.ratio = self.cfg.ratio;
    }

    /// Virtual index currently assigned to a physical slot.
    ///
    /// The pool is circular: the mapping is relative to `physical_start`, not
    /// absolute, which is what makes recycling O(1) per slot.
    pub fn slot_virtual_index(&self, slot: usize) -> usize {
        if self.physical_count == 0 {
            return self.virtual_start;
        }
        let rel = (slot as i64 - self.physical_start as i64)
            .rem_euclid(self.physical_count as i64) as usize;
        self.virtual_start + rel
    }

    pub fn is_index_rendered(&self, vidx: usize) -> bool {
        self.physical_count > 0 && vidx >= self.virtual_start && vidx <= self.virtual_end()
    }

    /// Number of window positions that map to a valid virtual index.
    fn window_len(&self) -> usize {
        self.physical_count
            .min(self.virtual_count.saturating_sub(self.virtual_start))
    }

    /// Visits the active window in virtual-index order as `(slot, vidx)`.
    pub fn for_each_slot(&self, mut f: impl FnMut(usize, usize)) {
        let len = self.window_len();
        for i in 0..len {
            let slot = (self.physical_start + i) % self.physical_count;
            f(slot, self.virtual_start + i);
        }
    }

    /// Visits the active window with the layout position of each slot:
    /// `(slot, vidx, main_axis_offset, column)`.
    pub fn for_each_slot_position(&self, mut f: impl FnMut(usize, usize, i64, usize)) {
        let len = self.window_len();
        let mut main = self.physical_top;
        for i in 0..len {
            let slot = (self.physical_start + i) % self.physical_count;
            let vidx = self.virtual_start + i;
            if self.items_per_row > 1 {
                let col = vidx % self.items_per_row;
                if col == 0 && i > 0 {
                    main += i64::from(self.row_height);
                }
                f(slot, vidx, main, col);
            } else {
                f(slot, vidx, main, 0);
                main += i64::from(self.sizes[slot]);
            }
        }
    }

    /// Main-axis extent one window position contributes. In grid layout only
    /// the first slot of each row advances the layout.
    fn size_increment(&self, slot: usize, vidx: usize) -> i64 {
        if self.items_per_row > 1 {
            if vidx % self.items_per_row == 0 {
                i64::from(self.row_height)
            } else {
                0
            }
        } else {
            i64::from(self.sizes[slot])
        }
    }

    pub fn max_virtual_start(&self) -> usize {
        let virtual_count = self.round_up_to_row(self.virtual_count);
        virtual_count.saturating_sub(self.physical_count)
    }

    fn round_up_to_row(&self, idx: usize) -> usize {
        if self.items_per_row > 1 {
            idx.div_ceil(self.items_per_row) * self.items_per_row
        } else {
            idx
        }
    }

    /// Rendered content currently outside the viewport.
    pub fn hidden_content_size(&self) -> i64 {
        let size = if self.items_per_row > 1 {
            self.pool_rows() as i64 * i64::from(self.row_height)
        } else {
            self.physical_size
        };
        size - i64::from(self.viewport_size)
    }

    fn pool_rows(&self) -> usize {
        self.physical_count.div_ceil(self.items_per_row)
    }

    /// Pool size target: enough rendered content to cover `max_pages`
    /// viewports. A zero-height viewport yields an unreachable target; the
    /// caller must stop growth rounds that no longer add slots.
    pub fn optimal_physical_size(&self) -> i64 {
        if self.viewport_size == 0 {
            return i64::MAX;
        }
        (f64::from(self.viewport_size) * f64::from(self.cfg.max_pages)) as i64
    }

    /// Whether the rendered window fully covers the viewport.
    pub fn is_client_full(&self) -> bool {
        let top = self.physical_top + self.list_offset;
        let bottom = self.physical_bottom() + self.list_offset;
        bottom >= self.scroll_bottom() && top <= self.scroll_position
    }

    fn scroll_bottom(&self) -> i64 {
        self.scroll_position + i64::from(self.viewport_size)
    }

    /// Estimated total scrollable extent.
    ///
    /// Unrendered items below the window are assumed to have the running
    /// average size; nothing outside the pool is ever measured.
    pub fn est_scroll_height(&self) -> i64 {
        if self.items_per_row > 1 {
            let rows = self.virtual_count.div_ceil(self.items_per_row);
            return rows as i64 * i64::from(self.row_height);
        }
        let below = self
            .virtual_count
            .saturating_sub(self.physical_count)
            .saturating_sub(self.virtual_start);
        self.physical_bottom() + below as i64 * i64::from(self.physical_average)
    }

    fn invalidate_visible_caches(&self) {
        self.first_visible.set(None);
        self.last_visible.set(None);
    }

    /// First virtual index whose content intersects the viewport.
    pub fn first_visible_index(&self) -> usize {
        if let Some(idx) = self.first_visible.get() {
            return idx;
        }
        let mut offset = self.physical_top + self.list_offset;
        let mut found = None;
        let len = self.window_len();
        for i in 0..len {
            let slot = (self.physical_start + i) % self.physical_count;
            let vidx = self.virtual_start + i;
            offset += self.size_increment(slot, vidx);
            if offset > self.scroll_position {
                found = Some(self.row_aligned(vidx));
                break;
            }
        }
        let idx = found.unwrap_or(0);
        self.first_visible.set(Some(idx));
        idx
    }

    /// Last virtual index whose content intersects the viewport.
    pub fn last_visible_index(&self) -> usize {
        if let Some(idx) = self.last_visible.get() {
            return idx;
        }
        let scroll_bottom = self.scroll_bottom();
        let mut offset = self.physical_top + self.list_offset;
        let mut last = 0usize;
        let len = self.window_len();
        for i in 0..len {
            let slot = (self.physical_start + i) % self.physical_count;
            let vidx = self.virtual_start + i;
            if offset < scroll_bottom {
                last = vidx;
            }
            offset += self.size_increment(slot, vidx);
        }
        if self.items_per_row > 1 {
            // Complete the row, clamped to the final (possibly partial) row.
            last = (self.row_aligned(last) + self.items_per_row - 1)
                .min(self.virtual_count.saturating_sub(1));
        }
        self.last_visible.set(Some(last));
        last
    }

    fn row_aligned(&self, vidx: usize) -> usize {
        vidx - vidx % self.items_per_row
    }

    /// Resets the window for a new virtual item count.
    ///
    /// The window restarts at the origin; the pool shrinks only when the new
    /// count is smaller than the pool itself. The caller re-renders every slot
    /// afterwards (scheduled on its next frame).
    pub fn set_virtual_count(&mut self, count: usize) {
        ldebug!(count, physical_count = self.physical_count, "set_virtual_count");
        self.virtual_count = count;
        self.virtual_start = 0;
        self.physical_top = 0;
        if self.physical_count > count {
            self.physical_count = count;
            self.physical_start = 0;
            self.sizes.truncate(count);
            self.physical_size = self.sizes.iter().map(|&s| i64::from(s)).sum();
        }
        self.invalidate_visible_caches();
    }

    /// Records a programmatic scroll position (e.g. after `scroll_to_index`)
    /// without running the recycle machinery.
    pub fn reset_scroll_position(&mut self, position: i64) {
        self.scroll_position = position;
        self.invalidate_visible_caches();
    }

    fn wrap_physical_start(&self, value: i64) -> usize {
        if self.physical_count == 0 {
            0
        } else {
            value.rem_euclid(self.physical_count as i64) as usize
        }
    }

    fn clamp_virtual_start(&self, value: i64) -> usize {
        let clamped = value.clamp(0, self.max_virtual_start() as i64) as usize;
        if self.items_per_row > 1 {
            self.row_aligned(clamped)
        } else {
            clamped
        }
    }

    /// Handles a scroll-position change.
    ///
    /// A delta larger than the rendered extent (scrollbar drag across many
    /// screens) relocates the whole window by estimation; anything smaller
    /// moves just the slots that left the viewport on the trailing edge.
    /// `recycled` receives the slot ids that need new content.
    pub fn on_scroll(&mut self, scroll_top: i64, recycled: &mut Vec<usize>) -> ScrollUpdate {
        recycled.clear();
        let delta = scroll_top - self.scroll_position;
        let scrolling_down = delta >= 0;
        self.scroll_position = scroll_top;
        self.invalidate_visible_caches();

        if self.physical_count == 0 || self.virtual_count == 0 {
            return ScrollUpdate::None;
        }

        if delta.abs() > self.physical_size && self.physical_size > 0 {
            // Random-access reseek.
            let average = i64::from(self.physical_average.max(1));
            let step = round_div(delta, average) * self.items_per_row as i64;
            let target = self.clamp_virtual_start(self.virtual_start as i64 + step);
            let shift = target as i64 - self.virtual_start as i64;
            self.physical_start = self.wrap_physical_start(self.physical_start as i64 + shift);
            self.virtual_start = target;
            self.physical_top =
                (self.virtual_start / self.items_per_row) as i64 * average;
            ltrace!(
                delta,
                virtual_start = self.virtual_start,
                physical_top = self.physical_top,
                "reseek"
            );
            ScrollUpdate::Reseek
        } else {
            let new_top = self.reusables(scrolling_down, recycled);
            if scrolling_down {
                self.physical_top = new_top;
                self.virtual_start += recycled.len();
                self.physical_start =
                    self.wrap_physical_start((self.physical_start + recycled.len()) as i64);
            } else {
                self.virtual_start -= recycled.len();
                self.physical_start = self
                    .wrap_physical_start(self.physical_start as i64 - recycled.len() as i64);
                self.physical_top = new_top;
            }
            ltrace!(delta, moved = recycled.len(), scrolling_down, "recycle");
            ScrollUpdate::Recycle { scrolling_down }
        }
    }

    /// Greedy single-pass reusables walk.
    ///
    /// Starting at the trailing edge, accumulates slots until the walk would
    /// eat into the protected fraction of hidden content, reach a slot still
    /// inside the viewport, or push the window out of the virtual range.
    /// Returns the `physical_top` that results from dropping the collected
    /// slots off that edge.
    pub fn reusables(&self, from_top: bool, out: &mut Vec<usize>) -> i64 {
        out.clear();
        if self.physical_count == 0 {
            return self.physical_top;
        }

        let protected_size = (self.hidden_content_size() as f64 * f64::from(self.ratio)) as i64;
        let scroll_top = self.scroll_position - self.list_offset;
        let scroll_bottom = scroll_top + i64::from(self.viewport_size);
        let mut top = self.physical_top;

        if from_top {
            let mut slot = self.physical_start;
            let mut offset_content = scroll_top - self.physical_top;
            loop {
                let size = i64::from(self.sizes[slot]);
                offset_content -= size;
                if out.len() >= self.physical_count || offset_content <= protected_size {
                    break;
                }
                if self.virtual_end() + out.len() + 1 >= self.virtual_count {
                    break;
                }
                if top + size >= scroll_top {
                    break;
                }
                out.push(slot);
                top += size;
                slot = (slot + 1) % self.physical_count;
            }
        } else {
            let mut slot = self.physical_end();
            let mut bottom = self.physical_bottom();
            let mut offset_content = bottom - scroll_bottom;
            loop {
                let size = i64::from(self.sizes[slot]);
                offset_content -= size;
                if out.len() >= self.physical_count || offset_content <= protected_size {
                    break;
                }
                if self.virtual_start <= out.len() {
                    break;
                }
                if bottom - size <= scroll_bottom {
                    break;
                }
                out.push(slot);
                top -= size;
                bottom -= size;
                slot = if slot == 0 { self.physical_count - 1 } else { slot - 1 };
            }
        }
        top
    }

    fn physical_end(&self) -> usize {
        if self.physical_count == 0 {
            0
        } else {
            (self.physical_start + self.physical_count - 1) % self.physical_count
        }
    }

    /// Re-measures slots and folds the results into `physical_size` and the
    /// running average. `slots == None` re-measures the whole active window.
    ///
    /// `physical_size` is maintained incrementally from the old/new delta, not
    /// recomputed from scratch; only non-zero measurements contribute to the
    /// average.
    pub fn update_metrics(
        &mut self,
        slots: Option<&[usize]>,
        mut measure: impl FnMut(usize) -> u32,
    ) {
        let mut old_size = 0i64;
        let mut new_size = 0i64;
        let prev_count = self.physical_average_count;
        let prev_average = u64::from(self.physical_average);

        let mut remeasure = |core: &mut Self, slot: usize| {
            old_size += i64::from(core.sizes[slot]);
            let measured = measure(slot);
            core.sizes[slot] = measured;
            new_size += i64::from(measured);
            if measured > 0 {
                core.physical_average_count += 1;
            }
        };

        match slots {
            Some(slots) => {
                for &slot in slots {
                    if slot < self.physical_count {
                        remeasure(self, slot);
                    }
                }
            }
            None => {
                let len = self.window_len();
                for i in 0..len {
                    let slot = (self.physical_start + i) % self.physical_count;
                    remeasure(self, slot);
                }
            }
        }

        self.physical_size += new_size - old_size;

        if self.items_per_row > 1 {
            self.row_height = self.sizes.iter().copied().max().unwrap_or(0);
            self.physical_size = self.pool_rows() as i64 * i64::from(self.row_height);
        }

        if self.physical_average_count != prev_count {
            let total = prev_average * prev_count as u64 + new_size as u64;
            self.physical_average =
                round_div_u64(total, self.physical_average_count as u64) as u32;
        }
        self.invalidate_visible_caches();
    }

    /// Next pool size for a growth request, clamped to
    /// `[default_physical_count, virtual_count - virtual_start]` and rounded
    /// to complete rows in grid layout.
    pub fn pool_target(&self, requested: usize) -> usize {
        let hi = self.virtual_count.saturating_sub(self.virtual_start);
        let lo = self.cfg.default_physical_count;
        let mut next = (self.physical_count + requested).clamp(lo.min(hi), hi);
        if self.items_per_row > 1 {
            let correction = next % self.items_per_row;
            if correction != 0 {
                if next - correction <= self.physical_count {
                    next += self.items_per_row;
                }
                next -= correction;
                next = next.min(hi);
            }
        }
        next
    }

    /// Appends `delta` freshly created slots to the pool.
    ///
    /// New slots join the leading edge of the window; the caller re-renders
    /// the whole window after growth since the circular mapping changes with
    /// the pool length.
    pub fn grow_pool(&mut self, delta: usize) {
        if delta == 0 {
            return;
        }
        ldebug!(delta, physical_count = self.physical_count, "grow_pool");
        self.physical_count += delta;
        self.sizes.resize(self.physical_count, 0);
        self.invalidate_visible_caches();
    }

    /// Growth step for the next allocation round: half the current pool.
    pub fn next_increase(&self) -> usize {
        self.physical_count.div_ceil(2)
    }

    /// Decides whether (and how urgently) another allocation round is needed.
    /// `opt_physical_size` is normally [`Self::optimal_physical_size`], plus
    /// whatever slack the adapter adds for uneven item heights.
    pub fn growth_policy(&self, opt_physical_size: i64) -> PoolGrowth {
        let next = self.next_increase();
        if self.physical_count >= self.virtual_count || next == 0 {
            PoolGrowth::Done
        } else if self.virtual_end() + 1 >= self.virtual_count {
            PoolGrowth::Done
        } else if !self.is_client_full() {
            PoolGrowth::Soon(next)
        } else if self.physical_size < opt_physical_size {
            PoolGrowth::Idle(next)
        } else {
            PoolGrowth::Done
        }
    }

    /// Moves the window near `vidx` if it is not rendered (or sits past the
    /// last reachable window start). Returns whether the window moved; if it
    /// did, the caller must re-render every slot before calling
    /// [`Self::offset_for_index`].
    pub fn relocate_for_index(&mut self, vidx: usize) -> bool {
        if self.virtual_count == 0 || self.physical_count == 0 {
            return false;
        }
        let vidx = vidx.min(self.virtual_count - 1);
        if self.is_index_rendered(vidx) && vidx < self.max_virtual_start() {
            return false;
        }
        let back = if self.items_per_row > 1 {
            2 * self.items_per_row
        } else {
            1
        };
        self.virtual_start = self.clamp_virtual_start(vidx as i64 - back as i64);
        self.invalidate_visible_caches();
        true
    }

    /// Pixel offset to scroll to so that `vidx` is at the viewport top.
    ///
    /// Estimates the window's top from the running average, then walks the
    /// rendered slots to the exact offset of the target index.
    pub fn offset_for_index(&mut self, vidx: usize) -> i64 {
        if self.virtual_count == 0 || self.physical_count == 0 {
            return 0;
        }
        let vidx = vidx.min(self.virtual_count - 1);
        self.physical_top = (self.virtual_start / self.items_per_row) as i64
            * i64::from(self.physical_average);

        let hidden = self.hidden_content_size();
        let mut slot = self.physical_start;
        let mut current = self.virtual_start;
        let mut target = 0i64;
        while current < vidx && target <= hidden {
            target += self.size_increment(slot, current);
            slot = (slot + 1) % self.physical_count;
            current += 1;
        }
        self.invalidate_visible_caches();
        self.physical_top + self.list_offset + target
    }
}

/// Round-to-nearest signed division, ties away from zero.
fn round_div(n: i64, d: i64) -> i64 {
    debug_assert!(d > 0, "round_div by non-positive divisor");
    if n >= 0 {
        (n + d / 2) / d
    } else {
        (n - d / 2) / d
    }
}

fn round_div_u64(n: u64, d: u64) -> u64 {
    if d == 0 { 0 } else { (n + d / 2) / d }
}
