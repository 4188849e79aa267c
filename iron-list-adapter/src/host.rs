use alloc::vec::Vec;

/// Opaque handle to a host-owned renderable element.
///
/// The adapter never interprets the value; it only hands it back to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementId(pub u64);

/// The narrow contract between the windowing engine and its host (a list,
/// grid or table component owning the real elements and scroll container).
///
/// Population (`update_element`) is invoked synchronously and must set the
/// element's content before returning; the adapter measures the element right
/// after. A population callback must not call back into the adapter.
///
/// All pixel values are main-axis: positions are `i64` (repair deltas can go
/// negative), sizes are `u32`.
pub trait RenderHost {
    /// Creates `count` blank pooled elements and appends their ids to `out`.
    fn create_elements(&mut self, count: usize, out: &mut Vec<ElementId>);

    /// Populates one element with the item at `logical_index`.
    fn update_element(&mut self, element: ElementId, logical_index: usize);

    /// Returns the element's current rendered main-axis size. Zero is treated
    /// as "content not laid out yet" and triggers placeholder sizing.
    fn measure(&mut self, element: ElementId) -> u32;

    /// Places an element at a main-axis pixel offset. `column` is always 0 in
    /// linear layout; in grid layout the host derives the cross-axis placement
    /// from it.
    fn position(&mut self, element: ElementId, main: i64, column: usize);

    fn set_hidden(&mut self, element: ElementId, hidden: bool);

    /// Forces a temporary main-axis size on an element whose real content has
    /// not laid out yet.
    fn set_placeholder_size(&mut self, element: ElementId, size: u32);

    fn clear_placeholder_size(&mut self, element: ElementId);

    /// Releases elements when the pool shrinks. Ids passed here are never
    /// used again.
    fn discard_elements(&mut self, elements: &[ElementId]);

    /// Main-axis size of the scrollable viewport.
    fn viewport_size(&mut self) -> u32;

    /// Pixel offset of the list's first item from the scroll origin (content
    /// above the list inside the same scroll container).
    fn list_offset(&mut self) -> i64;

    fn scroll_position(&mut self) -> i64;

    fn set_scroll_position(&mut self, position: i64);

    /// Sets the total scrollable extent (estimated; refined as items get
    /// measured).
    fn set_scroll_extent(&mut self, extent: i64);

    /// Physically reorders elements so their host order matches the window
    /// order. `focused`, when set, is an element in `elements_in_order` that
    /// currently holds focus and must not lose it during the move.
    fn reorder(&mut self, elements_in_order: &[ElementId], focused: Option<ElementId>) {
        let _ = (elements_in_order, focused);
    }

    fn focused_element(&self) -> Option<ElementId> {
        None
    }

    /// Notification that a focused element was moved during reordering, so
    /// the host can repair a missing next/previous focusable sibling.
    fn notify_focus_moved(&mut self, element: ElementId) {
        let _ = element;
    }
}
