use alloc::vec::Vec;

use iron_list_core::{ListCore, PoolGrowth, ScrollUpdate};

use crate::config::ScrollerConfig;
use crate::host::{ElementId, RenderHost};
use crate::quirks::{NoQuirks, PlatformQuirks};
use crate::remap::{AdjustContext, IndexRemap};
use crate::scheduler::Scheduler;
use crate::wheel::{WheelEvent, WheelOutcome, WheelState};

const PLACEHOLDER_SAMPLES: usize = 10;

/// Rolling average of recently measured non-zero element sizes, used as the
/// temporary size for elements whose content has not laid out yet. Without it
/// the pool-growth heuristic sees zero-size content and allocates without
/// bound.
#[derive(Clone, Copy, Debug)]
struct PlaceholderSizer {
    recent: [u32; PLACEHOLDER_SAMPLES],
    len: usize,
    next: usize,
    default_size: u32,
}

impl PlaceholderSizer {
    fn new(default_size: u32) -> Self {
        Self {
            recent: [0; PLACEHOLDER_SAMPLES],
            len: 0,
            next: 0,
            default_size,
        }
    }

    fn record(&mut self, size: u32) {
        self.recent[self.next] = size;
        self.next = (self.next + 1) % PLACEHOLDER_SAMPLES;
        self.len = (self.len + 1).min(PLACEHOLDER_SAMPLES);
    }

    fn size(&self) -> u32 {
        if self.len == 0 {
            return self.default_size;
        }
        let sum: u64 = self.recent[..self.len].iter().map(|&s| u64::from(s)).sum();
        ((sum + self.len as u64 / 2) / self.len as u64) as u32
    }
}

#[derive(Clone, Copy, Debug)]
struct Slot {
    element: ElementId,
    placeholder: bool,
    hidden: bool,
}

/// Binds a [`ListCore`] window to a real element pool and scroll container
/// through the [`RenderHost`] contract.
///
/// The scroller owns the pool: elements are created in growth rounds,
/// recycled (re-populated, never destroyed) during steady-state scrolling,
/// and discarded only when the logical size shrinks below the pool.
///
/// All deferred work is explicit scheduler state; the host drives it by
/// calling [`Self::run_frame`], [`Self::run_timers`] and [`Self::run_idle`],
/// or [`Self::flush`] to complete everything synchronously.
#[derive(Debug)]
pub struct VirtualScroller<H: RenderHost, Q: PlatformQuirks = NoQuirks> {
    host: H,
    quirks: Q,
    cfg: ScrollerConfig,
    core: ListCore,
    remap: IndexRemap,
    sched: Scheduler,
    wheel: WheelState,
    slots: Vec<Slot>,
    placeholder: PlaceholderSizer,
    size: usize,
    extent: i64,
    updating_size: bool,
    dragging_scrollbar: bool,
    reorder_pending: bool,
    // Reused scratch buffers; steady-state scrolling allocates nothing.
    scratch: Vec<usize>,
    in_window: Vec<bool>,
    element_scratch: Vec<ElementId>,
}

impl<H: RenderHost> VirtualScroller<H, NoQuirks> {
    pub fn new(host: H, cfg: ScrollerConfig) -> Self {
        Self::with_quirks(host, NoQuirks, cfg)
    }
}

impl<H: RenderHost, Q: PlatformQuirks> VirtualScroller<H, Q> {
    pub fn with_quirks(host: H, quirks: Q, cfg: ScrollerConfig) -> Self {
        Self {
            host,
            quirks,
            core: ListCore::new(cfg.core),
            remap: IndexRemap::new(cfg.max_virtual_count),
            sched: Scheduler::new(),
            wheel: WheelState::new(),
            slots: Vec::new(),
            placeholder: PlaceholderSizer::new(cfg.placeholder_size),
            cfg,
            size: 0,
            extent: 0,
            updating_size: false,
            dragging_scrollbar: false,
            reorder_pending: false,
            scratch: Vec::new(),
            in_window: Vec::new(),
            element_scratch: Vec::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn core(&self) -> &ListCore {
        &self.core
    }

    /// Logical item count.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Current remapper displacement: `logical = virtual + index_offset`.
    pub fn index_offset(&self) -> usize {
        self.remap.offset()
    }

    /// First logical index whose content intersects the viewport.
    pub fn first_visible_index(&self) -> usize {
        self.remap.logical(self.core.first_visible_index())
    }

    /// Last logical index whose content intersects the viewport.
    pub fn last_visible_index(&self) -> usize {
        self.remap.logical(self.core.last_visible_index())
    }

    /// The pooled element currently rendering `logical_index`, if any.
    pub fn element_for_logical(&self, logical_index: usize) -> Option<ElementId> {
        let vidx = logical_index.checked_sub(self.remap.offset())?;
        if !self.core.is_index_rendered(vidx) {
            return None;
        }
        let mut found = None;
        self.core.for_each_slot(|slot, v| {
            if v == vidx {
                found = Some(slot);
            }
        });
        found.map(|slot| self.slots[slot].element)
    }

    /// Sets the logical item count.
    ///
    /// Cancels in-flight pool growth, then tries to keep the item that was at
    /// the top of the viewport at the same pixel offset, so the user's
    /// reading position survives dynamic insert/remove.
    pub fn set_size(&mut self, size: usize) {
        if size == self.size {
            return;
        }
        ldebug!(old = self.size, new = size, "set_size");
        // A stale growth round must not fight the resized pool.
        self.sched.cancel_growth();
        self.sched.reposition_at = None;

        let anchor = if self.size > 0 && size > 0 && self.core.physical_count() > 0 {
            let logical = self.first_visible_index();
            self.index_viewport_offset(logical).map(|off| (logical, off))
        } else {
            None
        };

        self.updating_size = true;
        self.size = size;
        self.remap.set_size(size);
        self.core.set_virtual_count(self.remap.virtual_count());
        if self.slots.len() > self.core.physical_count() {
            let excess = self.slots.split_off(self.core.physical_count());
            self.element_scratch.clear();
            self.element_scratch.extend(excess.iter().map(|s| s.element));
            let discarded = core::mem::take(&mut self.element_scratch);
            self.host.discard_elements(&discarded);
            self.element_scratch = discarded;
        }
        self.updating_size = false;

        if self.core.physical_count() == 0 && size > 0 {
            let target = self.core.pool_target(0);
            self.create_slots(target);
        }
        self.render_window();
        self.update_extent(true);
        self.schedule_growth();

        if let Some((logical, before)) = anchor {
            let logical = logical.min(size - 1);
            self.scroll_to_index(logical);
            if let Some(after) = self.index_viewport_offset(logical) {
                let position = (self.host.scroll_position() + (after - before))
                    .clamp(0, self.max_scroll_position());
                self.host.set_scroll_position(position);
                self.core.reset_scroll_position(position);
            }
        }

        if self.slots.iter().any(|s| s.placeholder) {
            self.sched.placeholder_clear = true;
        }
        self.run_microtasks();
    }

    /// Switches between linear and grid layout.
    pub fn set_grid(&mut self, items_per_row: usize) {
        self.core.set_grid(items_per_row);
        self.render_window();
        self.update_extent(true);
        self.schedule_growth();
        self.run_microtasks();
    }

    /// Re-populates rendered elements whose logical index falls in `range`
    /// (`None` re-populates the whole window), after external data changes.
    pub fn update(&mut self, range: Option<core::ops::Range<usize>>) {
        if self.updating_size || self.core.physical_count() == 0 {
            return;
        }
        {
            let Self {
                core,
                remap,
                scratch,
                ..
            } = self;
            scratch.clear();
            core.for_each_slot(|slot, vidx| {
                let logical = remap.logical(vidx);
                if range.as_ref().is_none_or(|r| r.contains(&logical)) {
                    scratch.push(slot);
                }
            });
        }
        for i in 0..self.scratch.len() {
            let slot = self.scratch[i];
            self.populate_slot(slot);
        }
        let scratch = core::mem::take(&mut self.scratch);
        self.measure_slots(Some(&scratch));
        self.scratch = scratch;
        self.position_elements();
        self.update_extent(false);
        self.schedule_growth();
        self.run_microtasks();
    }

    /// Scrolls so the item at `index` sits at the top of the viewport
    /// (clamped at the end of the list so the last item aligns with the
    /// viewport bottom).
    pub fn scroll_to_index(&mut self, index: usize) {
        if self.size == 0 || self.core.physical_count() == 0 {
            return;
        }
        let index = index.min(self.size - 1);
        // A window that drifted entirely below the viewport reports
        // last < first; the subtraction must not wrap.
        let visible = (self.core.last_visible_index() + 1)
            .saturating_sub(self.core.first_visible_index())
            .max(1);
        let vidx = self.remap.target_for(index, visible);
        self.scroll_to_virtual(vidx);
        self.run_microtasks();
    }

    /// Handles a scroll-position change the host observed on its container.
    pub fn on_scroll(&mut self, now_ms: u64) {
        let position = self.host.scroll_position();
        let delta = position - self.core.scroll_position();
        self.handle_scroll(position);

        let ctx = AdjustContext {
            delta,
            scroll_top: position,
            max_scroll_top: self.max_scroll_position(),
            first_visible: self.core.first_visible_index(),
        };
        if let Some(vidx) = self.remap.adjust(ctx) {
            self.scroll_to_virtual(vidx);
        }

        if self.cfg.reorder_elements {
            self.sched.reorder_at = Some(now_ms + self.cfg.reorder_delay_ms);
        }
        self.sched.reposition_at = Some(now_ms + self.cfg.reposition_delay_ms);
        self.run_microtasks();
    }

    /// Handles a resize of the scroll container itself.
    pub fn on_container_resize(&mut self) {
        let viewport = self.host.viewport_size();
        let offset = self.host.list_offset();
        self.core.set_viewport(viewport, offset);
        if self.core.physical_count() == 0 && self.size > 0 {
            let target = self.core.pool_target(0);
            self.create_slots(target);
        }
        self.render_window();
        self.update_extent(true);
        self.schedule_growth();
        self.run_microtasks();
    }

    /// Handles a resize report for a single pooled element.
    pub fn on_element_resize(&mut self, slot: usize) {
        if self.updating_size || slot >= self.core.physical_count() {
            return;
        }
        let slots = [slot];
        self.measure_slots(Some(&slots));
        self.position_elements();
        self.update_extent(false);
        self.schedule_growth();
        self.run_microtasks();
    }

    /// Handles a wheel event. Returns whether the event was consumed; an
    /// unconsumed event should be given to a scrollable ancestor.
    pub fn on_wheel(&mut self, event: WheelEvent, now_ms: u64) -> bool {
        let pixels = event.to_pixels(self.core.viewport_size(), &self.quirks);
        match self.wheel.on_wheel(pixels, self.sched.render, now_ms) {
            WheelOutcome::Ignored | WheelOutcome::Deferred => true,
            WheelOutcome::Scroll(px) => self.apply_wheel_scroll(px, now_ms),
        }
    }

    pub fn on_scrollbar_drag_start(&mut self) {
        self.dragging_scrollbar = true;
    }

    pub fn on_scrollbar_drag_end(&mut self) {
        self.dragging_scrollbar = false;
        if self.reorder_pending {
            self.reorder_elements();
        }
    }

    /// Requests a full render pass on the next frame.
    pub fn invalidate(&mut self) {
        self.sched.render = true;
    }

    /// Runs frame-deferred work: the pending render pass, the placeholder
    /// re-check, and wheel deltas queued behind the frame.
    pub fn run_frame(&mut self, now_ms: u64) {
        if self.sched.render {
            self.sched.render = false;
            self.render_window();
            self.schedule_growth();
        }
        if self.sched.placeholder_clear {
            self.sched.placeholder_clear = false;
            self.clear_placeholders();
        }
        let queued = self.wheel.take_accumulated();
        if queued != 0 {
            self.apply_wheel_scroll(queued, now_ms);
        }
        self.run_microtasks();
    }

    /// Runs expired timers.
    pub fn run_timers(&mut self, now_ms: u64) {
        if self.sched.reorder_at.is_some_and(|at| at <= now_ms) {
            self.sched.reorder_at = None;
            self.reorder_elements();
        }
        if self.sched.reposition_at.is_some_and(|at| at <= now_ms) {
            self.sched.reposition_at = None;
            self.fix_invalid_item_positioning();
            self.run_microtasks();
        }
    }

    /// Runs low-priority idle work (back-buffer pool growth).
    pub fn run_idle(&mut self) {
        if let Some(n) = self.sched.idle_grow.take() {
            self.grow(n);
        }
        self.run_microtasks();
    }

    /// Synchronously completes all pending scheduled work.
    ///
    /// Growth is monotone and clamped, so the loop terminates. Placeholders
    /// are re-checked once; elements whose content is still not laid out stay
    /// placeholder-sized until a later frame.
    pub fn flush(&mut self) {
        let mut cleared_placeholders = false;
        loop {
            if self.sched.pool_grow.is_some() {
                self.run_microtasks();
                continue;
            }
            if self.sched.render {
                self.sched.render = false;
                self.render_window();
                self.schedule_growth();
                continue;
            }
            if let Some(n) = self.sched.idle_grow.take() {
                self.grow(n);
                continue;
            }
            if self.sched.reorder_at.take().is_some() {
                self.reorder_elements();
                continue;
            }
            if self.sched.reposition_at.take().is_some() {
                self.fix_invalid_item_positioning();
                continue;
            }
            if self.sched.placeholder_clear && !cleared_placeholders {
                cleared_placeholders = true;
                self.sched.placeholder_clear = false;
                self.clear_placeholders();
                continue;
            }
            break;
        }
    }

    fn max_scroll_position(&self) -> i64 {
        (self.core.est_scroll_height() - i64::from(self.core.viewport_size())).max(0)
    }

    fn logical_for_slot(&self, slot: usize) -> usize {
        self.remap.logical(self.core.slot_virtual_index(slot))
    }

    /// Pixel offset of a rendered logical index from the viewport top.
    fn index_viewport_offset(&self, logical_index: usize) -> Option<i64> {
        let vidx = logical_index.checked_sub(self.remap.offset())?;
        if !self.core.is_index_rendered(vidx) {
            return None;
        }
        let mut found = None;
        self.core.for_each_slot_position(|_, v, main, _| {
            if v == vidx {
                found = Some(main);
            }
        });
        found.map(|main| main + self.core.list_offset() - self.core.scroll_position())
    }

    fn populate_slot(&mut self, slot: usize) {
        let logical = self.logical_for_slot(slot);
        let Self { host, slots, .. } = self;
        let s = &mut slots[slot];
        if s.placeholder {
            host.clear_placeholder_size(s.element);
            s.placeholder = false;
        }
        host.update_element(s.element, logical);
    }

    /// Re-measures slots into the core metrics, substituting a placeholder
    /// size for elements that measure zero.
    fn measure_slots(&mut self, which: Option<&[usize]>) {
        let Self {
            core,
            host,
            slots,
            placeholder,
            sched,
            ..
        } = self;
        let placeholder_size = placeholder.size().max(1);
        let mut applied = false;
        core.update_metrics(which, |slot| {
            let s = &mut slots[slot];
            let measured = host.measure(s.element);
            if measured == 0 {
                host.set_placeholder_size(s.element, placeholder_size);
                host.set_hidden(s.element, true);
                s.placeholder = true;
                s.hidden = true;
                applied = true;
                placeholder_size
            } else {
                placeholder.record(measured);
                measured
            }
        });
        if applied {
            sched.placeholder_clear = true;
        }
    }

    /// Frame-deferred placeholder re-check: drops the forced size from every
    /// placeholder slot and re-measures it. Slots whose content is still not
    /// laid out get the placeholder re-applied by the measure pass.
    fn clear_placeholders(&mut self) {
        {
            let Self {
                host,
                slots,
                scratch,
                ..
            } = self;
            scratch.clear();
            for (slot, s) in slots.iter_mut().enumerate() {
                if s.placeholder {
                    s.placeholder = false;
                    host.clear_placeholder_size(s.element);
                    scratch.push(slot);
                }
            }
        }
        if self.scratch.is_empty() {
            return;
        }
        let scratch = core::mem::take(&mut self.scratch);
        self.measure_slots(Some(&scratch));
        self.scratch = scratch;
        self.position_elements();
        self.update_extent(false);
        self.schedule_growth();
    }

    fn position_elements(&mut self) {
        let Self {
            core,
            host,
            slots,
            in_window,
            ..
        } = self;
        in_window.clear();
        in_window.resize(core.physical_count(), false);
        core.for_each_slot_position(|slot, _vidx, main, column| {
            in_window[slot] = true;
            host.position(slots[slot].element, main, column);
        });
        // Slots outside the window (partial grid rows, shrunk ranges) are
        // hidden rather than discarded.
        for (slot, s) in slots.iter_mut().enumerate() {
            let hide = !in_window.get(slot).copied().unwrap_or(false) || s.placeholder;
            if s.hidden != hide {
                host.set_hidden(s.element, hide);
                s.hidden = hide;
            }
        }
    }

    /// Full window pass: populate, measure, position, refresh the extent.
    fn render_window(&mut self) {
        {
            let Self { core, scratch, .. } = self;
            scratch.clear();
            core.for_each_slot(|slot, _| scratch.push(slot));
        }
        for i in 0..self.scratch.len() {
            let slot = self.scratch[i];
            self.populate_slot(slot);
        }
        self.measure_slots(None);
        self.position_elements();
        self.update_extent(false);
    }

    fn update_extent(&mut self, force: bool) {
        let est = self.core.est_scroll_height();
        let viewport = i64::from(self.core.viewport_size().max(1));
        if force || (est - self.extent).abs() >= viewport {
            self.extent = est;
            self.host.set_scroll_extent(est);
        }
    }

    fn create_slots(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        self.element_scratch.clear();
        self.host.create_elements(count, &mut self.element_scratch);
        debug_assert_eq!(
            self.element_scratch.len(),
            count,
            "host must create exactly the requested number of elements"
        );
        for i in 0..self.element_scratch.len() {
            let element = self.element_scratch[i];
            self.slots.push(Slot {
                element,
                placeholder: false,
                hidden: false,
            });
        }
        self.core.grow_pool(self.element_scratch.len());
    }

    /// One pool growth round. The circular slot mapping changes with the pool
    /// length, so the whole window is re-rendered afterwards.
    fn grow(&mut self, requested: usize) {
        let target = self.core.pool_target(requested);
        let delta = target.saturating_sub(self.core.physical_count());
        if delta == 0 {
            return;
        }
        ldebug!(delta, physical_count = self.core.physical_count(), "pool grow");
        self.create_slots(delta);
        self.render_window();
        self.schedule_growth();
    }

    fn opt_physical_size(&self) -> i64 {
        let base = self.core.optimal_physical_size();
        if base == i64::MAX {
            return base;
        }
        base.saturating_add(self.item_height_buffer())
    }

    /// Extra pool slack when rendered sizes are very uneven, so a single
    /// oversized item near the viewport edge cannot starve the window.
    fn item_height_buffer(&self) -> i64 {
        if self.slots.iter().any(|s| s.placeholder) {
            return 0;
        }
        let core = &self.core;
        let mut min = u32::MAX;
        let mut max = 0u32;
        core.for_each_slot(|slot, _| {
            let size = core.slot_size(slot);
            if size > 0 {
                min = min.min(size);
                max = max.max(size);
            }
        });
        if min == u32::MAX || max < 2 * min {
            0
        } else {
            i64::from(max - min)
        }
    }

    fn schedule_growth(&mut self) {
        match self.core.growth_policy(self.opt_physical_size()) {
            PoolGrowth::Done => self.sched.cancel_growth(),
            PoolGrowth::Soon(n) => {
                self.sched.pool_grow = Some(n);
                self.sched.idle_grow = None;
            }
            PoolGrowth::Idle(n) => {
                self.sched.idle_grow = Some(n);
                self.sched.pool_grow = None;
            }
        }
    }

    /// Drains coalesced urgent growth rounds at the end of an entry point.
    fn run_microtasks(&mut self) {
        while let Some(n) = self.sched.pool_grow.take() {
            let before = self.core.physical_count();
            self.grow(n);
            if self.core.physical_count() == before {
                break;
            }
        }
    }

    fn handle_scroll(&mut self, position: i64) {
        let mut scratch = core::mem::take(&mut self.scratch);
        match self.core.on_scroll(position, &mut scratch) {
            ScrollUpdate::None => {
                self.scratch = scratch;
            }
            ScrollUpdate::Reseek => {
                self.scratch = scratch;
                self.render_window();
                self.schedule_growth();
            }
            ScrollUpdate::Recycle { .. } => {
                for i in 0..scratch.len() {
                    let slot = scratch[i];
                    self.populate_slot(slot);
                }
                self.measure_slots(Some(&scratch));
                self.scratch = scratch;
                self.position_elements();
                self.update_extent(false);
                self.schedule_growth();
            }
        }
    }

    fn scroll_to_virtual(&mut self, vidx: usize) {
        if self.core.relocate_for_index(vidx) {
            self.render_window();
        }
        let offset = self.core.offset_for_index(vidx);
        let position = offset.clamp(0, self.max_scroll_position());
        self.host.set_scroll_position(position);
        self.core.reset_scroll_position(position);
        self.position_elements();
        self.update_extent(false);
        self.schedule_growth();
    }

    fn apply_wheel_scroll(&mut self, pixels: i64, now_ms: u64) -> bool {
        if pixels == 0 {
            return true;
        }
        let current = self.host.scroll_position();
        let target = (current + pixels).clamp(0, self.max_scroll_position());
        if target == current {
            // At the boundary: a scrollable ancestor takes over; swallow the
            // inertial tail that would otherwise drag it along.
            if self.quirks.has_inertial_scroll() {
                self.wheel.begin_ignore(now_ms + self.cfg.ignore_wheel_ms);
            }
            return false;
        }
        self.host.set_scroll_position(target);
        self.on_scroll(now_ms);
        true
    }

    /// Detects a window that drifted past the scroll position (a failure mode
    /// of the incremental recycle under rapid direction changes) and replays
    /// the scroll handler with `ratio = 0` and a faked one-pixel delta toward
    /// the gap.
    fn fix_invalid_item_positioning(&mut self) {
        if self.size == 0 || self.core.physical_count() == 0 {
            return;
        }
        let scroll_top = self.core.scroll_position();
        let viewport = i64::from(self.core.viewport_size());
        let top = self.core.physical_top() + self.core.list_offset();
        let bottom = self.core.physical_bottom() + self.core.list_offset();
        let top_gap = top > scroll_top;
        let bottom_gap = bottom < scroll_top + viewport;
        let first_visible = self.core.virtual_start() == 0
            && self.remap.offset() == 0
            && self.first_visible_index() == 0;
        let last_visible = self.last_visible_index() + 1 >= self.size;
        if (top_gap && !first_visible) || (bottom_gap && !last_visible) {
            ltrace!(top_gap, bottom_gap, scroll_top, "invalid position repair");
            let faked = scroll_top + if top_gap { 1 } else { -1 };
            self.core.set_ratio(0.0);
            self.core.reset_scroll_position(faked);
            self.handle_scroll(scroll_top);
            self.core.restore_ratio();
        }
    }

    /// Physically reorders elements so host order matches window order,
    /// keeping a focused element in place. Deferred while the user is
    /// dragging the scrollbar.
    fn reorder_elements(&mut self) {
        if self.dragging_scrollbar {
            self.reorder_pending = true;
            return;
        }
        self.reorder_pending = false;
        if self.core.physical_count() == 0 {
            return;
        }
        {
            let Self { core, scratch, .. } = self;
            scratch.clear();
            core.for_each_slot(|slot, _| scratch.push(slot));
        }
        self.element_scratch.clear();
        for i in 0..self.scratch.len() {
            let element = self.slots[self.scratch[i]].element;
            self.element_scratch.push(element);
        }
        let order = core::mem::take(&mut self.element_scratch);
        let focused = self.host.focused_element().filter(|f| order.contains(f));
        self.host.reorder(&order, focused);
        if let Some(focused) = focused {
            self.host.notify_focus_moved(focused);
        }
        self.element_scratch = order;
    }
}
