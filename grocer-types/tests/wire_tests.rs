use grocer_types::wire::{
    BagLineRecord, BagSnapshotRecord, MutateItemRequest, MutateItemResponse,
};
use grocer_types::{Delivery, Error, ItemId};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn record(item_id: u64, quantity: i64) -> BagLineRecord {
    BagLineRecord {
        item_id,
        quantity,
        stock_limit: 10,
        display_name: format!("Item {item_id}"),
        unit_price: 2.5,
        out_of_stock: false,
    }
}

// ── GET /bag parsing ─────────────────────────────────────────────

#[test]
fn parses_camel_case_bag_body() {
    let body = r#"{
        "expressItems": [
            {"itemId": 42, "quantity": 2, "stockLimit": 10, "displayName": "Milk 1L", "unitPrice": 1.25, "outOfStock": false}
        ],
        "scheduledItems": [
            {"itemId": 7, "quantity": 1, "stockLimit": 2, "displayName": "Coffee", "unitPrice": 8.0, "outOfStock": true}
        ]
    }"#;

    let snapshot = BagSnapshotRecord::from_json(body).unwrap();
    assert_eq!(snapshot.lines().len(), 2);

    let express: Vec<_> = snapshot.express().collect();
    assert_eq!(express.len(), 1);
    assert_eq!(express[0].line.item_id, ItemId::new(42));
    assert_eq!(express[0].line.details.display_name, "Milk 1L");
    assert_eq!(express[0].delivery, Delivery::Express);

    let scheduled: Vec<_> = snapshot.scheduled().collect();
    assert_eq!(scheduled[0].line.details.stock_limit, 2);
    assert_eq!(snapshot.out_of_stock().collect::<Vec<_>>(), vec![ItemId::new(7)]);
}

#[test]
fn missing_lists_default_to_empty() {
    let snapshot = BagSnapshotRecord::from_json("{}").unwrap();
    assert!(snapshot.is_empty());
}

#[test]
fn missing_out_of_stock_defaults_to_false() {
    let body = r#"{"expressItems": [{"itemId": 1, "quantity": 1, "stockLimit": 3, "displayName": "Eggs", "unitPrice": 3.0}]}"#;
    let snapshot = BagSnapshotRecord::from_json(body).unwrap();
    assert!(!snapshot.lines()[0].out_of_stock);
}

#[test]
fn malformed_json_is_a_serialization_error() {
    let result = BagSnapshotRecord::from_json("{\"expressItems\": 5}");
    assert!(matches!(result, Err(Error::Serialization(_))));
}

// ── Validation ───────────────────────────────────────────────────

#[test]
fn rejects_negative_quantity() {
    let rec = BagSnapshotRecord {
        express_items: vec![record(3, -1)],
        scheduled_items: vec![],
    };
    match rec.validate() {
        Err(Error::InvalidField { item_id, field, .. }) => {
            assert_eq!(item_id, 3);
            assert_eq!(field, "quantity");
        }
        other => panic!("expected InvalidField, got {other:?}"),
    }
}

#[test]
fn rejects_zero_item_id() {
    let rec = BagSnapshotRecord {
        express_items: vec![record(0, 1)],
        scheduled_items: vec![],
    };
    assert!(matches!(rec.validate(), Err(Error::InvalidItemId(_))));
}

#[test]
fn rejects_non_finite_price() {
    let mut line = record(4, 1);
    line.unit_price = f64::NAN;
    let rec = BagSnapshotRecord {
        express_items: vec![line],
        scheduled_items: vec![],
    };
    assert!(matches!(
        rec.validate(),
        Err(Error::InvalidField { field: "unitPrice", .. })
    ));
}

#[test]
fn rejects_negative_price() {
    let mut line = record(4, 1);
    line.unit_price = -0.5;
    let rec = BagSnapshotRecord {
        express_items: vec![],
        scheduled_items: vec![line],
    };
    assert!(rec.validate().is_err());
}

#[test]
fn rejects_item_listed_in_both_lists() {
    let rec = BagSnapshotRecord {
        express_items: vec![record(9, 1)],
        scheduled_items: vec![record(9, 2)],
    };
    assert!(matches!(rec.validate(), Err(Error::DuplicateItem(id)) if id == ItemId::new(9)));
}

#[test]
fn zero_quantity_lines_survive_validation() {
    let rec = BagSnapshotRecord {
        express_items: vec![record(5, 0)],
        scheduled_items: vec![],
    };
    let snapshot = rec.validate().unwrap();
    assert_eq!(snapshot.lines()[0].line.quantity, 0);
}

#[test]
fn typed_snapshot_converts_back_to_record() {
    let rec = BagSnapshotRecord {
        express_items: vec![record(1, 2)],
        scheduled_items: vec![record(2, 3)],
    };
    let snapshot = rec.clone().validate().unwrap();
    assert_eq!(BagSnapshotRecord::from(&snapshot), rec);
}

// ── POST /bag/items ──────────────────────────────────────────────

#[test]
fn mutate_request_omits_missing_comment() {
    let json = serde_json::to_value(MutateItemRequest::new(ItemId::new(42), 5)).unwrap();
    assert_eq!(json, serde_json::json!({"itemId": 42, "quantity": 5}));
}

#[test]
fn mutate_request_carries_comment() {
    let req = MutateItemRequest::new(ItemId::new(42), 1).with_comment("ripe ones please");
    let json = serde_json::to_value(&req).unwrap();
    assert_eq!(json["comment"], "ripe ones please");
}

#[test]
fn mutate_response_parses() {
    let resp: MutateItemResponse = serde_json::from_str(r#"{"success": false}"#).unwrap();
    assert!(!resp.success);
}

proptest! {
    #[test]
    fn in_range_lines_always_validate(
        id in 1u64..1_000_000,
        quantity in 0i64..=i64::from(u32::MAX),
        price in 0.0f64..10_000.0,
    ) {
        let mut line = record(id, quantity);
        line.unit_price = price;
        let rec = BagSnapshotRecord { express_items: vec![line], scheduled_items: vec![] };
        let snapshot = rec.validate().unwrap();
        prop_assert_eq!(i64::from(snapshot.lines()[0].line.quantity), quantity);
    }

    #[test]
    fn negative_counts_never_validate(id in 1u64..1_000_000, quantity in i64::MIN..0) {
        let rec = BagSnapshotRecord { express_items: vec![record(id, quantity)], scheduled_items: vec![] };
        prop_assert!(rec.validate().is_err());
    }
}
