use page_packer_core::packer::Packer;
use page_packer_core::packer::shelf::ShelfPage;
use page_packer_core::prelude::*;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn cfg(w: f64, h: f64, margin: f64, padding: f64) -> PackerConfig {
    PackerConfig::builder()
        .geometry(PageGeometry::new(w, h, margin, padding))
        .build()
}

fn page_ids(result: &PackingResult) -> Vec<Vec<&str>> {
    result
        .pages
        .iter()
        .map(|p| p.items.iter().map(|i| i.id.as_str()).collect())
        .collect()
}

#[test]
fn three_items_on_small_page_get_a_page_each() {
    let items = vec![
        Item::new("a", 100.0, 200.0),
        Item::new("b", 50.0, 50.0),
        Item::new("c", 180.0, 260.0),
    ];
    let result = pack_layout(items, &cfg(210.0, 297.0, 10.0, 5.0)).expect("pack");
    assert_eq!(page_ids(&result), vec![vec!["c"], vec!["a"], vec!["b"]]);

    // c snaps to the usable width minus padding, hanging from the top margin.
    let c = &result.pages[0].items[0];
    assert!(close(c.x, 10.0));
    assert!(close(c.width, 185.0));
    assert!(close(c.top(), 287.0));

    // a is height-bound, b is width-bound.
    let a = &result.pages[1].items[0];
    assert!(close(a.height, 272.0));
    assert!(close(a.width, 136.0));
    assert!(close(a.y, 15.0));
    let b = &result.pages[2].items[0];
    assert!(close(b.width, 185.0));
    assert!(close(b.height, 185.0));
}

#[test]
fn tall_narrow_items_share_a_shelf() {
    let items: Vec<Item> = (0..7).map(|i| Item::new(format!("t{i}"), 10.0, 100.0)).collect();
    let result = pack_layout(items, &cfg(210.0, 297.0, 10.0, 5.0)).expect("pack");

    // Each scales to 27.2 x 272: five fit across the usable width.
    assert_eq!(
        page_ids(&result),
        vec![vec!["t0", "t1", "t2", "t3", "t4"], vec!["t5", "t6"]]
    );
    let first = &result.pages[0].items;
    for pair in first.windows(2) {
        assert!(close(pair[1].x - pair[0].right(), 5.0));
        assert!(close(pair[1].top(), pair[0].top()));
    }
}

#[test]
fn wide_items_stack_as_shelves() {
    let items: Vec<Item> = (0..20).map(|i| Item::new(format!("w{i}"), 100.0, 8.0)).collect();
    let result = pack_layout(items, &cfg(210.0, 297.0, 10.0, 5.0)).expect("pack");

    // 185 x 14.8 per item; 14 shelves fit above the bottom margin.
    let counts: Vec<usize> = result.pages.iter().map(|p| p.items.len()).collect();
    assert_eq!(counts, vec![14, 6]);
    let page = &result.pages[0].items;
    for pair in page.windows(2) {
        assert!(close(pair[1].x, 10.0));
        assert!(close(pair[0].y - pair[1].top(), 5.0), "shelves separated by padding");
    }
}

#[test]
fn extreme_aspect_item_snaps_to_width() {
    let items = vec![Item::new("strip", 10_000.0, 5.0)];
    let result = pack_layout(items, &cfg(100.0, 100.0, 5.0, 2.0)).expect("pack");
    assert_eq!(result.pages.len(), 1);
    let it = &result.pages[0].items[0];
    assert!(close(it.width, 88.0));
    assert!(close(it.height, 0.044));
    assert!(close(it.x, 5.0));
    assert!(close(it.top(), 95.0));
}

#[test]
fn no_items_means_no_pages() {
    let result = pack_layout(Vec::new(), &PackerConfig::default()).expect("pack");
    assert!(result.is_empty());
    assert!(result.pages.is_empty());
    assert!(result.skipped.is_empty());
    assert_eq!(result.meta.unit, "pt");
}

#[test]
fn equal_heights_keep_input_order() {
    let items = vec![
        Item::new("z", 10.0, 100.0),
        Item::new("a", 10.0, 100.0),
        Item::new("m", 10.0, 100.0),
    ];
    let result = pack_layout(items, &cfg(210.0, 297.0, 10.0, 5.0)).expect("pack");
    assert_eq!(page_ids(&result), vec![vec!["z", "a", "m"]]);
}

#[test]
fn sort_orders_pick_different_leaders() {
    // Source height favours "wide"; scaled height favours "tall".
    let items = vec![Item::new("tall", 10.0, 50.0), Item::new("wide", 400.0, 100.0)];
    let base = cfg(210.0, 297.0, 10.0, 5.0);

    let by_source = pack_layout(items.clone(), &base).expect("pack");
    assert_eq!(by_source.pages[0].items[0].id, "wide");

    let mut scaled = base.clone();
    scaled.sort_order = SortOrder::ScaledHeightDesc;
    let by_scaled = pack_layout(items.clone(), &scaled).expect("pack");
    assert_eq!(by_scaled.pages[0].items[0].id, "tall");

    let mut unsorted = base;
    unsorted.sort_order = SortOrder::None;
    let as_given = pack_layout(items, &unsorted).expect("pack");
    assert_eq!(as_given.pages[0].items[0].id, "tall");
}

#[test]
fn shelf_page_rejects_item_hanging_below_margin() {
    let mut page = ShelfPage::new(PageGeometry::new(210.0, 297.0, 10.0, 5.0));
    assert!(page.is_empty());
    let band = page.place("band".into(), 40.0, 10.0).expect("first item");
    assert!(close(band.top(), 287.0));

    // Fits horizontally on the open shelf but would cross the bottom margin.
    assert!(!page.can_place(10.0, 280.0));
    assert!(page.place("pole".into(), 10.0, 280.0).is_none());

    // Still fine for a shorter neighbour.
    let next = page.place("post".into(), 10.0, 200.0).expect("fits on the shelf");
    assert!(close(next.x, 55.0));
    assert!(close(next.top(), 287.0));
}

#[test]
fn fresh_shelf_page_accepts_oversized_item() {
    let mut page = ShelfPage::new(PageGeometry::new(100.0, 100.0, 5.0, 2.0));
    assert!(page.can_place(500.0, 500.0));
    let it = page.place("huge".into(), 500.0, 500.0).expect("first item always placed");
    assert!(close(it.x, 5.0));
    assert!(!page.is_empty());
}
