use crate::model::PackingResult;
use serde_json::{Value, json};

/// Serialize a `PackingResult` as `{ pages, skipped, meta }`.
///
/// Each page carries its size and the placed items in placement order;
/// coordinates are bottom-left origin in the layout unit (`meta.unit`).
pub fn to_json(result: &PackingResult) -> Value {
    let pages_val = result
        .pages
        .iter()
        .map(|p| {
            let items_val: Vec<Value> = p
                .items
                .iter()
                .map(|it| {
                    json!({
                        "id": it.id,
                        "x": it.x,
                        "y": it.y,
                        "width": it.width,
                        "height": it.height,
                    })
                })
                .collect();
            json!({
                "id": p.id,
                "width": p.width,
                "height": p.height,
                "items": items_val,
            })
        })
        .collect::<Vec<_>>();
    json!({
        "pages": pages_val,
        "skipped": &result.skipped,
        "meta": &result.meta,
    })
}

/// Flat summary used by `--export-stats`.
pub fn stats_json(result: &PackingResult) -> Value {
    let stats = result.stats();
    json!({
        "pages": stats.num_pages,
        "items": stats.num_items,
        "skipped": stats.num_skipped,
        "used_area": stats.used_area,
        "usable_area": stats.total_usable_area,
        "occupancy": stats.occupancy,
    })
}
