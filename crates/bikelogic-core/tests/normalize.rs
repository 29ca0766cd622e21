use bikelogic_core::{
    normalize, AttributeKey, Catalog, Category, Component, FieldValue, InterfaceKey, RawComponent,
};
use proptest::prelude::*;
use serde_json::{json, Value};

fn raw(category: &str, interfaces: Option<Value>, attributes: Option<Value>) -> RawComponent {
    RawComponent {
        id: "part-1".to_string(),
        category: category.to_string(),
        name: "Part".to_string(),
        interfaces,
        attributes,
    }
}

fn renormalize(c: &Component) -> Component {
    normalize(&RawComponent::from(c))
}

#[test]
fn every_batch_shape_lands_on_the_same_component() {
    let direct = normalize(&raw(
        "Cassette",
        Some(json!({ "freehub_mount": "Shimano HG" })),
        Some(json!({ "weight": 250, "price": 89.99, "cogs": [11, 13, 15] })),
    ));
    let encoded = normalize(&raw(
        "cassette",
        Some(Value::String(json!({ "Freehub Body": "Shimano HG" }).to_string())),
        Some(Value::String(
            json!({ "weight_g": "250 g", "price_msrp": "$89.99", "cog_list": "11-13-15" })
                .to_string(),
        )),
    ));
    assert_eq!(direct, encoded);
    assert_eq!(direct.category, Category::Cassette);
    assert_eq!(direct.teeth(AttributeKey::CogList), Some(vec![11, 13, 15]));
}

#[test]
fn normalizing_twice_changes_nothing() {
    let once = normalize(&raw(
        "Wheelset",
        Some(json!({
            "rear_axle": "TA 12x142mm",
            "diameter": 29,
            "freehubs": "Shimano HG, SRAM XDR",
            "valve": "presta"
        })),
        Some(json!({
            "weight_grams": "1,450",
            "msrp": 1299,
            "is_electronic": "no",
            "rim_depth_mm": [35, 40]
        })),
    ));
    assert_eq!(once.interfaces.str(InterfaceKey::RearAxle), Some("TA_12x142mm"));
    assert_eq!(once.attributes.flag(AttributeKey::Electronic), Some(false));
    assert_eq!(renormalize(&once), once);
}

#[test]
fn catalog_accepts_raw_json_pages() {
    let page = json!([
        {
            "id": "tire-1",
            "category": "Tire",
            "name": "Road Tire",
            "interfaces": "{\"diameter\":\"700c\"}",
            "attributes": { "width_mm": 28, "weight": "230g" }
        },
        {
            "id": "mystery-1",
            "category": "Kickstand",
            "interfaces": "{broken"
        }
    ]);
    let catalog = Catalog::from_json(&page.to_string()).unwrap();
    assert_eq!(catalog.len(), 2);

    let tire = catalog.get("tire-1").unwrap();
    assert_eq!(tire.attributes.num(AttributeKey::Width), Some(28.0));
    assert_eq!(tire.weight(), Some(230.0));

    let mystery = catalog.get("mystery-1").unwrap();
    assert!(!mystery.category.is_known());
    assert!(mystery.interfaces.is_empty());
}

#[test]
fn duplicate_ids_in_a_page_are_rejected() {
    let page = json!([
        { "id": "x", "category": "Saddle" },
        { "id": "x", "category": "Stem" }
    ]);
    assert!(Catalog::from_json(&page.to_string()).is_err());
}

#[test]
fn unknown_fields_survive_with_inferred_types() {
    let c = normalize(&raw(
        "Frame",
        None,
        Some(json!({ "colorways": ["black", "sand"], "stack": 565.5, "di2_ready": true })),
    ));
    let unknown = c.attributes.unknown();
    assert!(matches!(unknown.get("colorways"), Some(FieldValue::StrSet(s)) if s.len() == 2));
    assert_eq!(unknown.get("stack"), Some(&FieldValue::Num(565.5)));
    assert_eq!(unknown.get("di2_ready"), Some(&FieldValue::Bool(true)));
}

fn token() -> impl Strategy<Value = String> {
    "[A-Za-z0-9]{1,6}( [A-Za-z0-9]{1,6}){0,2}"
}

proptest! {
    #[test]
    fn normalize_is_idempotent(
        shell in token(),
        protocol in token(),
        freehubs in prop::collection::vec(token(), 0..3),
        weight in prop::option::of(1.0f64..5000.0),
        price in prop::option::of(0.0f64..10000.0),
        cogs in prop::collection::vec(9u32..=52, 0..12),
        extra in prop::option::of(token()),
    ) {
        let mut interfaces = json!({
            "bb_shell": shell,
            "shifting_protocol": protocol,
            "freehub": freehubs,
        });
        if let Some(e) = extra {
            interfaces["Some Extra"] = Value::String(e);
        }
        let attributes = json!({
            "weight_g": weight,
            "price": price.map(|p| format!("${p:.2}")),
            "cogs": cogs,
        });

        let once = normalize(&raw("Frame", Some(interfaces), Some(attributes)));
        prop_assert_eq!(renormalize(&once), once);
    }
}
