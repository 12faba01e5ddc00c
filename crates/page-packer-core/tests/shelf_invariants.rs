use page_packer_core::prelude::*;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

const EPS: f64 = 1e-6;

fn random_items(seed: u64, count: usize) -> Vec<Item> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            // Mix of tall, wide and square-ish images
            let w = rng.gen_range(4..=800) as f64;
            let h = rng.gen_range(4..=800) as f64;
            Item::new(format!("img_{}", i), w, h)
        })
        .collect()
}

fn geometry() -> PageGeometry {
    PageGeometry::new(210.0, 297.0, 10.0, 5.0)
}

fn cfg() -> PackerConfig {
    PackerConfig::builder().geometry(geometry()).build()
}

/// Groups the items of a page by shelf (shared top edge).
fn shelves(page: &Page) -> Vec<Vec<&PlacedItem>> {
    let mut out: Vec<(f64, Vec<&PlacedItem>)> = Vec::new();
    for it in &page.items {
        match out.iter_mut().find(|(top, _)| (top - it.top()).abs() < EPS) {
            Some((_, v)) => v.push(it),
            None => out.push((it.top(), vec![it])),
        }
    }
    out.into_iter().map(|(_, v)| v).collect()
}

#[test]
fn every_item_is_placed_exactly_once() {
    let items = random_items(42, 300);
    let result = pack_layout(items.clone(), &cfg()).expect("pack");

    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (_, it) in result.placed() {
        *seen.entry(it.id.as_str()).or_default() += 1;
    }
    assert_eq!(seen.len(), items.len());
    assert!(seen.values().all(|&n| n == 1), "duplicate placement");
    assert_eq!(result.placed_count(), items.len());
    assert!(result.skipped.is_empty());
    assert!(result.pages.iter().all(|p| !p.items.is_empty()));
}

#[test]
fn aspect_ratio_is_preserved() {
    let items = random_items(7, 200);
    let by_id: HashMap<String, Item> = items.iter().map(|i| (i.id.clone(), i.clone())).collect();
    let result = pack_layout(items, &cfg()).expect("pack");
    for (_, placed) in result.placed() {
        let src = &by_id[&placed.id];
        let ratio = placed.width / placed.height;
        assert!(
            (ratio - src.aspect_ratio()).abs() < 1e-9 * src.aspect_ratio().max(1.0),
            "ratio drift for {}: {} vs {}",
            placed.id,
            ratio,
            src.aspect_ratio()
        );
    }
}

#[test]
fn placements_stay_inside_margins() {
    let g = geometry();
    let result = pack_layout(random_items(1234, 250), &cfg()).expect("pack");
    for (page, it) in result.placed() {
        assert!(it.x >= g.margin - EPS, "page {page}: {it:?} left of margin");
        assert!(it.y >= g.margin - EPS, "page {page}: {it:?} below margin");
        assert!(it.right() <= g.page_width - g.margin + EPS, "page {page}: {it:?} past right margin");
        assert!(it.top() <= g.page_height - g.margin + EPS, "page {page}: {it:?} past top margin");
        assert!(it.width > 0.0 && it.height > 0.0);
    }
}

#[test]
fn shelf_neighbours_are_padded_and_pages_disjoint() {
    let g = geometry();
    let result = pack_layout(random_items(99, 400), &cfg()).expect("pack");
    for page in &result.pages {
        for shelf in shelves(page) {
            for pair in shelf.windows(2) {
                let gap = pair[1].x - pair[0].right();
                assert!(gap >= g.padding - EPS, "gap {gap} < padding on page {}", page.id);
            }
        }
        for i in 0..page.items.len() {
            for j in (i + 1)..page.items.len() {
                assert!(
                    !page.items[i].overlaps(&page.items[j]),
                    "{:?} overlaps {:?}",
                    page.items[i],
                    page.items[j]
                );
            }
        }
    }
}

#[test]
fn packing_is_repeatable() {
    let items = random_items(2024, 150);
    let a = pack_layout(items.clone(), &cfg()).expect("pack a");
    let b = pack_layout(items, &cfg()).expect("pack b");
    assert_eq!(a, b);
}

#[test]
fn page_count_never_shrinks_as_items_are_added() {
    // Feed prefixes of an already height-sorted stream so every prefix packs the same way.
    let mut items = random_items(5, 120);
    items.sort_by(|a, b| b.height.total_cmp(&a.height));
    let mut last = 0;
    for n in 0..=items.len() {
        let pages = pack_layout(items[..n].to_vec(), &cfg()).expect("pack").pages.len();
        assert!(pages >= last, "{} items -> {} pages, fewer than {}", n, pages, last);
        last = pages;
    }
}

#[test]
fn page_ids_follow_output_order() {
    let result = pack_layout(random_items(11, 80), &cfg()).expect("pack");
    for (idx, page) in result.pages.iter().enumerate() {
        assert_eq!(page.id, idx);
        assert_eq!(page.width, 210.0);
        assert_eq!(page.height, 297.0);
    }
}
