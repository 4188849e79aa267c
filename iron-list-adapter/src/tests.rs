use crate::*;

use std::collections::{HashMap, HashSet};
use std::vec::Vec;

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_u64(&mut self, start: u64, end_exclusive: u64) -> u64 {
        start + (self.next_u64() % (end_exclusive - start))
    }
}

/// In-memory host: tracks everything the adapter does to "elements".
struct SimHost {
    height_fn: fn(usize) -> u32,
    viewport: u32,
    offset: i64,
    scroll: i64,
    extent: i64,
    next_id: u64,
    assigned: HashMap<ElementId, usize>,
    placeholders: HashMap<ElementId, u32>,
    hidden: HashMap<ElementId, bool>,
    positions: HashMap<ElementId, (i64, usize)>,
    lazy: HashSet<usize>,
    created: usize,
    discarded: usize,
    updates: usize,
    reorders: Vec<Vec<ElementId>>,
    focus: Option<ElementId>,
    focus_moved: usize,
}

fn sim(viewport: u32, height_fn: fn(usize) -> u32) -> SimHost {
    SimHost {
        height_fn,
        viewport,
        offset: 0,
        scroll: 0,
        extent: 0,
        next_id: 0,
        assigned: HashMap::new(),
        placeholders: HashMap::new(),
        hidden: HashMap::new(),
        positions: HashMap::new(),
        lazy: HashSet::new(),
        created: 0,
        discarded: 0,
        updates: 0,
        reorders: Vec::new(),
        focus: None,
        focus_moved: 0,
    }
}

impl RenderHost for SimHost {
    fn create_elements(&mut self, count: usize, out: &mut alloc::vec::Vec<ElementId>) {
        for _ in 0..count {
            out.push(ElementId(self.next_id));
            self.next_id += 1;
            self.created += 1;
        }
    }

    fn update_element(&mut self, element: ElementId, logical_index: usize) {
        self.assigned.insert(element, logical_index);
        self.updates += 1;
    }

    fn measure(&mut self, element: ElementId) -> u32 {
        if let Some(&size) = self.placeholders.get(&element) {
            return size;
        }
        let logical = self.assigned[&element];
        if self.lazy.contains(&logical) {
            0
        } else {
            (self.height_fn)(logical)
        }
    }

    fn position(&mut self, element: ElementId, main: i64, column: usize) {
        self.positions.insert(element, (main, column));
    }

    fn set_hidden(&mut self, element: ElementId, hidden: bool) {
        self.hidden.insert(element, hidden);
    }

    fn set_placeholder_size(&mut self, element: ElementId, size: u32) {
        self.placeholders.insert(element, size);
    }

    fn clear_placeholder_size(&mut self, element: ElementId) {
        self.placeholders.remove(&element);
    }

    fn discard_elements(&mut self, elements: &[ElementId]) {
        for element in elements {
            self.assigned.remove(element);
            self.positions.remove(element);
            self.discarded += 1;
        }
    }

    fn viewport_size(&mut self) -> u32 {
        self.viewport
    }

    fn list_offset(&mut self) -> i64 {
        self.offset
    }

    fn scroll_position(&mut self) -> i64 {
        self.scroll
    }

    fn set_scroll_position(&mut self, position: i64) {
        self.scroll = position;
    }

    fn set_scroll_extent(&mut self, extent: i64) {
        self.extent = extent;
    }

    fn reorder(&mut self, elements_in_order: &[ElementId], _focused: Option<ElementId>) {
        self.reorders.push(elements_in_order.to_vec());
    }

    fn focused_element(&self) -> Option<ElementId> {
        self.focus
    }

    fn notify_focus_moved(&mut self, _element: ElementId) {
        self.focus_moved += 1;
    }
}

fn h50(_: usize) -> u32 {
    50
}

fn h40(_: usize) -> u32 {
    40
}

fn scroller(viewport: u32, size: usize, height_fn: fn(usize) -> u32) -> VirtualScroller<SimHost> {
    let mut s = VirtualScroller::new(sim(viewport, height_fn), ScrollerConfig::new());
    s.on_container_resize();
    s.set_size(size);
    s.flush();
    s
}

#[test]
fn initial_render_fills_two_viewports() {
    let s = scroller(150, 1000, h50);
    // 150px viewport * max_pages 2 needs 300px of content: 8 slots of 50px
    // after the growth rounds 3 -> 5 -> 8.
    assert_eq!(s.core().physical_count(), 8);
    assert_eq!(s.core().physical_size(), 400);
    assert_eq!(s.host().created, 8);
    assert_eq!(s.host().extent, 50_000);
    assert_eq!(s.first_visible_index(), 0);
    assert_eq!(s.last_visible_index(), 2);
}

#[test]
fn scroll_recycles_trailing_slots() {
    let mut s = scroller(150, 1000, h50);
    s.host_mut().scroll = 300;
    s.on_scroll(0);

    assert_eq!(s.core().virtual_start(), 3);
    assert_eq!(s.first_visible_index(), 6);
    assert!(s.element_for_logical(10).is_some());
    assert!(s.element_for_logical(2).is_none());

    // The invalid-position check finds nothing to repair here.
    s.run_timers(1_000);
    assert_eq!(s.core().virtual_start(), 3);
}

#[test]
fn scroll_to_index_aligns_last_item_bottom() {
    let mut s = scroller(150, 15, h50);
    assert_eq!(s.host().extent, 750);

    s.scroll_to_index(14);
    // 15 items * 50px = 750px total; the scroll position clamps to the
    // extent so the last item's bottom edge meets the viewport bottom.
    assert_eq!(s.host().scroll, 600);
    assert_eq!(s.first_visible_index(), 12);
    assert_eq!(s.core().physical_bottom(), 750);
}

#[test]
fn out_of_range_scroll_to_index_is_clamped() {
    let mut s = scroller(150, 15, h50);
    s.scroll_to_index(10_000);
    assert_eq!(s.host().scroll, 600);

    // Empty list: silently ignored.
    let mut empty = scroller(150, 0, h50);
    empty.scroll_to_index(3);
    assert_eq!(empty.host().scroll, 0);
}

#[test]
fn scroll_to_index_survives_a_window_pushed_below_the_viewport() {
    let mut s = scroller(150, 20, h50);
    s.host_mut().scroll = 850;
    s.on_scroll(0);
    assert_eq!(s.core().virtual_start(), 12);

    // Content inserted above the list pushes the whole window below the
    // viewport, so no rendered slot intersects it anymore.
    s.host_mut().offset = 2_000;
    s.on_container_resize();
    s.scroll_to_index(5);
    assert_eq!(s.core().virtual_start(), 4);
    assert!(s.core().is_index_rendered(5));
}

#[test]
fn size_change_preserves_reading_position() {
    let mut s = scroller(150, 1000, h50);
    s.host_mut().scroll = 5_000;
    s.on_scroll(0);
    assert_eq!(s.first_visible_index(), 100);

    s.set_size(2_000);
    assert_eq!(s.size(), 2_000);
    assert_eq!(s.host().scroll, 5_000);
    assert_eq!(s.first_visible_index(), 100);
    assert_eq!(s.host().extent, 100_000);
}

#[test]
fn shrinking_size_discards_excess_elements() {
    let mut s = scroller(150, 1000, h50);
    assert_eq!(s.core().physical_count(), 8);

    s.set_size(4);
    assert_eq!(s.core().physical_count(), 4);
    assert_eq!(s.host().discarded, 4);
    assert_eq!(s.host().extent, 200);
}

#[test]
fn update_repopulates_only_requested_range() {
    let mut s = scroller(150, 1000, h50);
    let before = s.host().updates;
    s.update(Some(5..8));
    assert_eq!(s.host().updates - before, 3);

    let before = s.host().updates;
    s.update(None);
    assert_eq!(s.host().updates - before, 8);
}

#[test]
fn remap_reaches_both_boundaries_of_a_half_million_items() {
    let mut s = scroller(150, 500_000, h50);
    assert_eq!(s.core().virtual_count(), 100_000);

    s.scroll_to_index(0);
    assert_eq!(s.index_offset(), 0);
    assert_eq!(s.host().scroll, 0);
    assert_eq!(s.first_visible_index(), 0);

    s.scroll_to_index(499_999);
    assert_eq!(s.index_offset(), 400_000);
    assert!(s.element_for_logical(499_999).is_some());
    assert_eq!(s.last_visible_index(), 499_999);
}

#[test]
fn remap_exposes_exact_logical_index_past_the_ceiling() {
    let mut s = scroller(150, 200_000, h50);
    s.scroll_to_index(199_999);
    assert_eq!(s.index_offset(), 100_000);
    assert!(s.element_for_logical(199_999).is_some());
    assert_eq!(s.last_visible_index(), 199_999);
}

#[test]
fn remap_adjust_snaps_and_nudges() {
    let mut remap = IndexRemap::new(100_000);
    remap.set_size(500_000);
    let vc = remap.virtual_count();

    // scroll_to_index re-anchors and suppresses the next adjustment.
    let target = remap.target_for(250_000, 5);
    assert_eq!(target, 50_000);
    assert_eq!(remap.offset(), 200_000);
    let mid = AdjustContext {
        delta: -50,
        scroll_top: 500_000,
        max_scroll_top: 1_000_000,
        first_visible: 50_000,
    };
    assert_eq!(remap.adjust(mid), None); // skipped once
    assert_eq!(remap.adjust(mid), None); // mid-range: nothing to do

    // Near the start the offset walks back in bounded steps, compensated.
    let near_top = AdjustContext {
        delta: -50,
        scroll_top: 500,
        max_scroll_top: 1_000_000,
        first_visible: 800,
    };
    assert_eq!(remap.adjust(near_top), Some(900));
    assert_eq!(remap.offset(), 199_900);

    // At the very top it snaps to zero.
    let top = AdjustContext {
        delta: -10,
        scroll_top: 0,
        max_scroll_top: 1_000_000,
        first_visible: 0,
    };
    assert_eq!(remap.adjust(top), Some(0));
    assert_eq!(remap.offset(), 0);

    // At the very bottom it snaps to the maximum offset.
    let bottom = AdjustContext {
        delta: 10,
        scroll_top: 1_000_000,
        max_scroll_top: 1_000_000,
        first_visible: vc - 5,
    };
    assert_eq!(remap.adjust(bottom), Some(vc - 1));
    assert_eq!(remap.offset(), 400_000);

    // Near the bottom it nudges forward in bounded steps.
    remap.target_for(450_000, 5);
    assert_eq!(remap.offset(), 360_000);
    let _ = remap.adjust(mid); // consume the skip
    let near_bottom = AdjustContext {
        delta: 50,
        scroll_top: 900_000,
        max_scroll_top: 1_000_000,
        first_visible: 99_500,
    };
    assert_eq!(remap.adjust(near_bottom), Some(99_400));
    assert_eq!(remap.offset(), 360_100);

    // A dragged scrollbar thumb recomputes the offset proportionally.
    let huge = AdjustContext {
        delta: 20_000,
        scroll_top: 500_000,
        max_scroll_top: 1_000_000,
        first_visible: 50_000,
    };
    assert_eq!(remap.adjust(huge), None);
    assert_eq!(remap.offset(), 200_000);
}

#[test]
fn remap_target_near_the_end_is_clamped_for_small_ceilings() {
    let mut remap = IndexRemap::new(100);
    remap.set_size(100_000);

    // Far more trailing items than the whole virtual range: the target
    // clamps to the window instead of wrapping.
    let target = remap.target_for(99_000, 50);
    assert_eq!(target, 0);
    assert_eq!(remap.offset(), 99_900);

    // The exact last item stays reachable.
    assert_eq!(remap.target_for(99_999, 50), 99);
    assert_eq!(remap.logical(99), 99_999);
}

#[test]
fn remap_is_inert_below_the_ceiling() {
    let mut remap = IndexRemap::new(100_000);
    remap.set_size(5_000);
    assert!(!remap.active());
    assert_eq!(remap.target_for(4_999, 3), 4_999);
    assert_eq!(remap.offset(), 0);
    let ctx = AdjustContext {
        delta: 100,
        scroll_top: 10,
        max_scroll_top: 1_000,
        first_visible: 0,
    };
    assert_eq!(remap.adjust(ctx), None);
}

#[test]
fn zero_height_elements_get_placeholder_sizes() {
    let mut host = sim(150, h40);
    host.lazy = (0..100).collect();
    let mut s = VirtualScroller::new(host, ScrollerConfig::new());
    s.on_container_resize();
    s.set_size(100);
    s.flush();

    // Nothing has measured yet: every slot carries the default placeholder
    // and is hidden, and the pool did not grow without bound.
    assert_eq!(s.core().physical_count(), 3);
    assert_eq!(s.host().placeholders.len(), 3);
    assert!(s.host().placeholders.values().all(|&size| size == 200));
    assert!(s.host().hidden.values().all(|&hidden| hidden));

    // Content lays out: the next frame clears the placeholders and the pool
    // resumes normal growth.
    s.host_mut().lazy.clear();
    s.run_frame(0);
    assert!(s.host().placeholders.is_empty());
    assert_eq!(s.core().slot_size(0), 40);
    let element = s.element_for_logical(0).unwrap();
    assert_eq!(s.host().hidden[&element], false);

    // A later lazy element gets the rolling average of recent real heights,
    // not the default.
    s.host_mut().lazy.insert(1);
    s.update(Some(1..2));
    assert_eq!(s.host().placeholders.values().copied().collect::<Vec<_>>(), [40]);
}

#[test]
fn wheel_lines_convert_to_pixels_and_scroll() {
    let mut s = scroller(150, 1000, h50);
    assert!(s.on_wheel(WheelEvent::line(3.0), 0));
    assert_eq!(s.host().scroll, 48); // 3 lines * 16px
    assert!(s.on_wheel(WheelEvent::page(1.0), 10));
    assert_eq!(s.host().scroll, 198); // + one viewport
}

#[test]
fn wheel_at_boundary_is_not_consumed() {
    let mut s = scroller(150, 1000, h50);
    assert!(!s.on_wheel(WheelEvent::pixel(-10.0), 0));
    assert_eq!(s.host().scroll, 0);
}

#[test]
fn wheel_deltas_queue_behind_a_pending_frame() {
    let mut s = scroller(150, 1000, h50);
    s.invalidate();
    assert!(s.on_wheel(WheelEvent::pixel(30.0), 0));
    assert!(s.on_wheel(WheelEvent::pixel(20.0), 5));
    assert_eq!(s.host().scroll, 0);
    s.run_frame(16);
    assert_eq!(s.host().scroll, 50);
}

#[test]
fn inertial_tail_is_swallowed_after_yielding() {
    struct Inertial;
    impl PlatformQuirks for Inertial {
        fn has_inertial_scroll(&self) -> bool {
            true
        }
    }

    let mut s = VirtualScroller::with_quirks(sim(150, h50), Inertial, ScrollerConfig::new());
    s.on_container_resize();
    s.set_size(100);
    s.flush();

    // Wheel up at the top yields to an ancestor and opens the ignore window.
    assert!(!s.on_wheel(WheelEvent::pixel(-20.0), 0));
    // The decaying momentum tail is consumed without scrolling anything.
    assert!(s.on_wheel(WheelEvent::pixel(-12.0), 100));
    assert!(s.on_wheel(WheelEvent::pixel(-5.0), 200));
    assert_eq!(s.host().scroll, 0);
    // A fresh gesture in the other direction breaks the window.
    assert!(s.on_wheel(WheelEvent::pixel(40.0), 300));
    assert_eq!(s.host().scroll, 40);
}

#[test]
fn reorder_waits_for_scrollbar_drag_to_end() {
    let cfg = ScrollerConfig::new().with_reorder_elements(true);
    let mut s = VirtualScroller::new(sim(150, h50), cfg);
    s.on_container_resize();
    s.set_size(100);
    s.flush();

    s.host_mut().scroll = 120;
    s.on_scroll(0);
    s.on_scrollbar_drag_start();
    s.run_timers(1_000);
    assert!(s.host().reorders.is_empty());

    s.host_mut().focus = s.element_for_logical(3);
    s.on_scrollbar_drag_end();
    assert_eq!(s.host().reorders.len(), 1);
    assert_eq!(s.host().reorders[0][0], s.element_for_logical(0).unwrap());
    assert_eq!(s.host().focus_moved, 1);
}

#[test]
fn grid_layout_positions_rows_and_columns() {
    let mut s = VirtualScroller::new(sim(120, h40), ScrollerConfig::new());
    s.on_container_resize();
    s.set_grid(3);
    s.set_size(30);
    s.flush();

    assert_eq!(s.core().items_per_row(), 3);
    assert_eq!(s.core().physical_count() % 3, 0);
    assert_eq!(s.host().extent, 400); // 10 rows * 40px

    let row0: Vec<_> = (0..3)
        .map(|logical| s.host().positions[&s.element_for_logical(logical).unwrap()])
        .collect();
    assert_eq!(row0, [(0, 0), (0, 1), (0, 2)]);
    let (main, column) = s.host().positions[&s.element_for_logical(3).unwrap()];
    assert_eq!((main, column), (40, 0));
}

fn hmix(index: usize) -> u32 {
    20 + ((index as u64).wrapping_mul(2654435761) % 80) as u32
}

#[test]
fn randomized_scrolling_keeps_window_consistent() {
    let mut rng = Lcg::new(42);
    let mut s = scroller(200, 500, hmix);

    for step in 0..200u64 {
        let max = (s.core().est_scroll_height() - 200).max(0);
        let target = if max > 0 {
            rng.gen_range_u64(0, max as u64 + 1) as i64
        } else {
            0
        };
        s.host_mut().scroll = target;
        s.on_scroll(step);
        s.run_timers(step + 1_000);

        // Every window index renders on exactly one element.
        let mut seen = HashSet::new();
        for vidx in s.core().virtual_start()..=s.core().virtual_end() {
            let element = s.element_for_logical(vidx).unwrap();
            assert!(seen.insert(element), "element rendered twice");
        }

        // physical_size stays incrementally consistent with slot sizes.
        let mut sum = 0i64;
        for slot in 0..s.core().physical_count() {
            sum += i64::from(s.core().slot_size(slot));
        }
        assert_eq!(s.core().physical_size(), sum);
        assert!(s.host().extent > 0);
    }
}
