// Example: drive the scroller against a simulated host (no real UI).
use std::collections::HashMap;

use iron_list_adapter::{ElementId, RenderHost, ScrollerConfig, VirtualScroller, WheelEvent};

struct PrintHost {
    viewport: u32,
    scroll: i64,
    extent: i64,
    next_id: u64,
    assigned: HashMap<ElementId, usize>,
}

impl RenderHost for PrintHost {
    fn create_elements(&mut self, count: usize, out: &mut Vec<ElementId>) {
        for _ in 0..count {
            out.push(ElementId(self.next_id));
            self.next_id += 1;
        }
    }

    fn update_element(&mut self, element: ElementId, logical_index: usize) {
        self.assigned.insert(element, logical_index);
    }

    fn measure(&mut self, _element: ElementId) -> u32 {
        24
    }

    fn position(&mut self, _element: ElementId, _main: i64, _column: usize) {}

    fn set_hidden(&mut self, _element: ElementId, _hidden: bool) {}

    fn set_placeholder_size(&mut self, _element: ElementId, _size: u32) {}

    fn clear_placeholder_size(&mut self, _element: ElementId) {}

    fn discard_elements(&mut self, elements: &[ElementId]) {
        for element in elements {
            self.assigned.remove(element);
        }
    }

    fn viewport_size(&mut self) -> u32 {
        self.viewport
    }

    fn list_offset(&mut self) -> i64 {
        0
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
}

fn main() {
    let host = PrintHost {
        viewport: 400,
        scroll: 0,
        extent: 0,
        next_id: 0,
        assigned: HashMap::new(),
    };
    let mut scroller = VirtualScroller::new(host, ScrollerConfig::new());
    scroller.on_container_resize();

    // A million items: the index remapper caps the virtual range at 100k.
    scroller.set_size(1_000_000);
    scroller.flush();
    println!(
        "pool={} extent={} visible={}..={}",
        scroller.core().physical_count(),
        scroller.host().extent,
        scroller.first_visible_index(),
        scroller.last_visible_index()
    );

    scroller.host_mut().scroll = 10_000;
    scroller.on_scroll(0);
    println!(
        "after scroll: visible={}..={} offset={}",
        scroller.first_visible_index(),
        scroller.last_visible_index(),
        scroller.index_offset()
    );

    scroller.scroll_to_index(999_999);
    println!(
        "after scroll_to_index(999999): visible={}..={} offset={}",
        scroller.first_visible_index(),
        scroller.last_visible_index(),
        scroller.index_offset()
    );

    scroller.on_wheel(WheelEvent::line(-3.0), 16);
    println!("after wheel up: scroll={}", scroller.host().scroll);
}
