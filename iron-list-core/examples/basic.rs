// Example: the recycle loop an adapter runs, without any real elements.
use iron_list_core::{CoreConfig, ListCore, ScrollUpdate};

fn main() {
    let mut core = ListCore::new(CoreConfig::new());
    core.set_viewport(150, 0);
    core.set_virtual_count(10_000);
    core.grow_pool(core.pool_target(6));
    core.update_metrics(None, |_| 50);

    println!("est_scroll_height={}", core.est_scroll_height());

    let mut recycled = Vec::new();
    for scroll_top in [120, 300, 5_000] {
        match core.on_scroll(scroll_top, &mut recycled) {
            ScrollUpdate::Recycle { scrolling_down } => {
                // Recycled slots get new content, then get re-measured.
                core.update_metrics(Some(&recycled), |_| 50);
                println!(
                    "scroll_top={scroll_top}: recycled {} slots (down={scrolling_down})",
                    recycled.len()
                );
            }
            ScrollUpdate::Reseek => {
                core.update_metrics(None, |_| 50);
                println!("scroll_top={scroll_top}: reseek");
            }
            ScrollUpdate::None => {}
        }
        println!(
            "  window=[{}..={}] first_visible={}",
            core.virtual_start(),
            core.virtual_end(),
            core.first_visible_index()
        );
    }
}
