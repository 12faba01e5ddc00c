use page_packer_core::prelude::*;
use page_packer_core::stats_json;

fn result() -> PackingResult {
    let items = vec![
        Item::new("a", 10.0, 100.0),
        Item::new("b", 10.0, 100.0),
        Item::new("bad", -1.0, 3.0),
    ];
    let cfg = PackerConfig::builder()
        .geometry(PageGeometry::new(210.0, 297.0, 10.0, 5.0))
        .build();
    pack_layout(items, &cfg).expect("pack")
}

#[test]
fn layout_json_shape() {
    let v = to_json(&result());
    let pages = v["pages"].as_array().expect("pages array");
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0]["id"], 0);
    assert_eq!(pages[0]["width"], 210.0);
    let items = pages[0]["items"].as_array().expect("items array");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], "a");
    assert_eq!(items[1]["id"], "b");
    for key in ["x", "y", "width", "height"] {
        assert!(items[0][key].is_f64(), "{key}");
    }

    assert_eq!(v["skipped"][0]["id"], "bad");
    assert_eq!(v["skipped"][0]["stage"], "pack");
    assert_eq!(v["meta"]["unit"], "pt");
    assert_eq!(v["meta"]["app"], "page-packer");
    assert_eq!(v["meta"]["margin"], 10.0);
}

#[test]
fn layout_round_trips_through_serde() {
    let original = result();
    let text = serde_json::to_string(&original).expect("serialize");
    let back: PackingResult = serde_json::from_str(&text).expect("deserialize");
    assert_eq!(back.pages.len(), original.pages.len());
    assert_eq!(back.skipped, original.skipped);
    for ((_, a), (_, b)) in back.placed().zip(original.placed()) {
        assert_eq!(a.id, b.id);
        assert!((a.x - b.x).abs() < 1e-9 && (a.height - b.height).abs() < 1e-9);
    }
}

#[test]
fn stats_json_summary() {
    let v = stats_json(&result());
    assert_eq!(v["pages"], 1);
    assert_eq!(v["items"], 2);
    assert_eq!(v["skipped"], 1);
    assert!(v["occupancy"].as_f64().unwrap() > 0.0);
}

#[test]
fn config_reads_partial_json() {
    let cfg: PackerConfig = serde_json::from_str(
        r#"{"page_width": 300.0, "page_height": 400.0, "margin": 12.0, "padding": 3.0, "sort_order": "scaled_height_desc"}"#,
    )
    .expect("config");
    assert_eq!(cfg.geometry, PageGeometry::new(300.0, 400.0, 12.0, 3.0));
    assert_eq!(cfg.sort_order, SortOrder::ScaledHeightDesc);
    assert_eq!(cfg.quality, 85);
    assert!(cfg.trim);
    assert_eq!(cfg.background, [255, 255, 255]);
    assert_eq!("none".parse::<SortOrder>(), Ok(SortOrder::None));
    assert_eq!("Letter".parse::<PageSize>(), Ok(PageSize::Letter));
    assert!("b5".parse::<PageSize>().is_err());
}
