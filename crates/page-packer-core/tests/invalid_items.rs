use page_packer_core::prelude::*;

#[test]
fn degenerate_items_are_skipped_and_reported() {
    let items = vec![
        Item::new("ok1", 30.0, 40.0),
        Item::new("zero_w", 0.0, 10.0),
        Item::new("neg_h", 10.0, -3.0),
        Item::new("nan", f64::NAN, 10.0),
        Item::new("inf", 10.0, f64::INFINITY),
        Item::new("ok2", 50.0, 20.0),
    ];
    let result = pack_layout(items, &PackerConfig::default()).expect("pack");

    let placed: Vec<&str> = result.placed().map(|(_, it)| it.id.as_str()).collect();
    assert_eq!(placed.len(), 2);
    assert!(placed.contains(&"ok1") && placed.contains(&"ok2"));

    let skipped: Vec<&str> = result.skipped.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(skipped, vec!["zero_w", "neg_h", "nan", "inf"]);
    assert!(result.skipped.iter().all(|d| d.stage == Stage::Pack));
    assert!(result.skipped[0].message.contains("positive"));
}

#[test]
fn only_invalid_items_yields_empty_layout() {
    let items = vec![Item::new("a", 0.0, 0.0), Item::new("b", -1.0, 5.0)];
    let result = pack_layout(items, &PackerConfig::default()).expect("pack");
    assert!(result.is_empty());
    assert_eq!(result.skipped.len(), 2);
    assert_eq!(result.stats().num_skipped, 2);
}

#[test]
fn item_validation_reports_id() {
    let err = Item::new("broken", 5.0, 0.0).validate().unwrap_err();
    match err {
        PagePackerError::InvalidItem { id, .. } => assert_eq!(id, "broken"),
        other => panic!("unexpected error {other:?}"),
    }
    assert!(Item::new("fine", 0.5, 1e6).validate().is_ok());
}

#[test]
fn items_whose_scaled_size_degenerates_are_skipped() {
    let cfg = PackerConfig::builder()
        .geometry(PageGeometry::new(210.0, 297.0, 10.0, 5.0))
        .build();
    let items = vec![
        // scaled height underflows to zero
        Item::new("flat", 1e200, 1e-200),
        // scale factor overflows to infinity
        Item::new("tiny", 1e-310, 1e-310),
        Item::new("ok", 40.0, 30.0),
    ];
    let result = pack_layout(items, &cfg).expect("pack");

    let placed: Vec<&str> = result.placed().map(|(_, it)| it.id.as_str()).collect();
    assert_eq!(placed, vec!["ok"]);
    for (_, it) in result.placed() {
        assert!(it.width.is_finite() && it.width > 0.0);
        assert!(it.height.is_finite() && it.height > 0.0);
    }

    let skipped: Vec<&str> = result.skipped.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(skipped, vec!["flat", "tiny"]);
    assert!(result.skipped.iter().all(|d| d.stage == Stage::Pack));
    assert!(result.skipped[0].message.contains("cannot be scaled"));
}
