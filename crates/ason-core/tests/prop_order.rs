/// Property-based tests for conversion and the partial order.
///
/// Uses `proptest` to generate host values and check that:
/// - ground values survive a trip through ASON and back to JSON
/// - `<` is never true in both directions
/// - equal values are never strictly ordered
/// - for same-kind scalars, equality holds exactly when neither side is less
/// - reflected comparisons agree with the direct ones
/// - list iteration yields every element in order
use proptest::prelude::*;
use serde_json::Value;

use ason_core::{compare, Ason, CmpOp, HostValue};

// ============================================================================
// Strategies
// ============================================================================

fn arb_int() -> impl Strategy<Value = HostValue> {
    prop_oneof![
        (-1000i64..1000).prop_map(HostValue::from),
        any::<i64>().prop_map(HostValue::from),
        any::<u64>().prop_map(HostValue::from),
    ]
}

fn arb_float() -> impl Strategy<Value = HostValue> {
    prop_oneof![
        (-1.0e6f64..1.0e6).prop_map(HostValue::from),
        Just(HostValue::Float(0.5)),
        Just(HostValue::Float(-0.0)),
    ]
}

fn arb_string() -> impl Strategy<Value = HostValue> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,20}".prop_map(HostValue::from),
        Just(HostValue::from("")),
        Just(HostValue::from("quote\"and\\slash")),
        Just(HostValue::from("caf\u{00e9}")),
        Just(HostValue::from("line\nbreak")),
    ]
}

fn arb_scalar() -> impl Strategy<Value = HostValue> {
    prop_oneof![
        Just(HostValue::Null),
        any::<bool>().prop_map(HostValue::from),
        arb_int(),
        arb_float(),
        arb_string(),
    ]
}

fn arb_value() -> impl Strategy<Value = HostValue> {
    arb_scalar().prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(HostValue::List),
            prop::collection::vec(("[a-z_][a-z0-9_]{0,8}", inner), 0..5)
                .prop_map(|pairs| HostValue::map(pairs)),
        ]
    })
}

/// Expected JSON for a generated value: duplicate mapping keys keep the last
/// value, integral floats export as integers.
fn expected_json(value: &HostValue) -> Value {
    match value {
        HostValue::Null => Value::Null,
        HostValue::Bool(b) => Value::Bool(*b),
        HostValue::Int(i) => match i64::try_from(*i) {
            Ok(i) => Value::from(i),
            Err(_) => Value::from(*i as u64),
        },
        HostValue::Float(f) if f.fract() == 0.0 => Value::from(*f as i64),
        HostValue::Float(f) => Value::from(*f),
        HostValue::String(s) => Value::String(s.clone()),
        HostValue::List(items) => Value::Array(items.iter().map(expected_json).collect()),
        HostValue::Map(pairs) => {
            let mut map = serde_json::Map::new();
            for (key, value) in pairs {
                if let HostValue::String(key) = key {
                    map.insert(key.clone(), expected_json(value));
                }
            }
            Value::Object(map)
        }
        other => panic!("generator produced {other:?}"),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn ground_values_export_unchanged(value in arb_value()) {
        let converted = Ason::new(value.clone()).unwrap();
        prop_assert_eq!(converted.to_json(), Some(expected_json(&value)));
    }

    #[test]
    fn conversion_is_deterministic(value in arb_value()) {
        let a = Ason::new(value.clone()).unwrap();
        let b = Ason::new(value).unwrap();
        prop_assert!(a == b);
        prop_assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn never_less_both_ways(a in arb_value(), b in arb_value()) {
        let a = Ason::new(a).unwrap();
        let b = Ason::new(b).unwrap();
        prop_assert!(!(a < b && b < a));
    }

    #[test]
    fn equal_values_are_not_ordered(a in arb_value()) {
        let p = Ason::new(a.clone()).unwrap();
        let q = Ason::new(a).unwrap();
        prop_assert!(p == q);
        prop_assert!(!(p < q) && !(q < p));
        prop_assert!(p <= q && p >= q);
    }

    #[test]
    fn integers_are_totally_ordered(a in -1000i64..1000, b in -1000i64..1000) {
        let p = Ason::new(a).unwrap();
        let q = Ason::new(b).unwrap();
        prop_assert_eq!(p == q, !(p < q) && !(q < p));
        prop_assert_eq!(p < q, a < b);
    }

    #[test]
    fn strings_are_totally_ordered(a in "[a-zA-Z]{0,6}", b in "[a-zA-Z]{0,6}") {
        let p = Ason::new(a.as_str()).unwrap();
        let q = Ason::new(b.as_str()).unwrap();
        prop_assert_eq!(p == q, !(p < q) && !(q < p));
        prop_assert_eq!(p < q, a.as_bytes() < b.as_bytes());
    }

    #[test]
    fn reflection_agrees(a in arb_scalar(), b in arb_scalar()) {
        let wrapped = HostValue::from(Ason::new(b.clone()).unwrap());
        for op in [CmpOp::Eq, CmpOp::Ne, CmpOp::Lt, CmpOp::Le, CmpOp::Gt, CmpOp::Ge] {
            let reflected = compare(&a, &wrapped, op).unwrap();
            let direct = compare(&wrapped, &a, op.transpose()).unwrap();
            prop_assert_eq!(reflected, direct);
        }
    }

    #[test]
    fn lists_iterate_in_order(items in prop::collection::vec(arb_scalar(), 0..8)) {
        let value = Ason::new(HostValue::List(items.clone())).unwrap();
        let yielded: Vec<Ason> = value.iter().unwrap().map(|item| item.into_value()).collect();
        prop_assert_eq!(yielded.len(), items.len());
        for (got, want) in yielded.iter().zip(&items) {
            prop_assert!(*got == Ason::new(want.clone()).unwrap());
        }
    }
}
