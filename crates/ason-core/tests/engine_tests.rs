use ason_core::engine::{self, EngineError, Handle, Op, ReadError, TypeTag};

/// Helper: read an expression with no variables in scope.
fn read(expr: &str) -> Handle {
    engine::parse(expr, None).unwrap()
}

/// Helper: read, then print in canonical form.
fn canonical(expr: &str) -> String {
    engine::print(&read(expr))
}

fn syntax_error(expr: &str) -> String {
    match engine::parse(expr, None) {
        Err(ReadError::Syntax { message, .. }) => message,
        other => panic!("expected a syntax error for {expr:?}, got {other:?}"),
    }
}

// ============================================================================
// Reader and printer
// ============================================================================

#[test]
fn canonical_forms_read_back_unchanged() {
    for expr in [
        "null",
        "true",
        "false",
        "42",
        "-7",
        "1.5",
        "2.0",
        "18446744073709551615",
        r#""a\"b\n""#,
        "[]",
        "[1, 2]",
        "{}",
        r#"{"a": 1}"#,
        r#"{"a": 1, *}"#,
        "{*}",
        "1 | 2",
        "!1",
        "!(1 | 2)",
        "*",
        "U",
        "∅",
    ] {
        assert_eq!(canonical(expr), expr, "canonical form of {expr}");
    }
}

#[test]
fn whitespace_is_insignificant() {
    assert_eq!(canonical("  [ 1 ,2 ]  "), "[1, 2]");
    assert_eq!(canonical("{ \"a\" :1 , * }"), r#"{"a": 1, *}"#);
}

#[test]
fn underscore_reads_as_empty() {
    assert_eq!(canonical("_"), "∅");
}

#[test]
fn identifier_keys_are_quoted() {
    assert_eq!(canonical(r#"{b: "x", a: 1}"#), r#"{"a": 1, "b": "x"}"#);
}

#[test]
fn control_characters_are_escaped() {
    let value = engine::string("tab\there\u{1}");
    assert_eq!(engine::print(&value), r#""tab\there\u0001""#);
}

#[test]
fn exponent_reads_as_float() {
    assert_eq!(engine::type_tag(&read("1e3")), TypeTag::Numeric);
    assert_eq!(canonical("1e3"), "1000.0");
}

#[test]
fn intersection_binds_tighter_than_union() {
    assert_eq!(canonical("1 | 2 & 2"), "1 | 2");
    assert_eq!(canonical("(1 | 2) & 2"), "2");
}

#[test]
fn complement_binds_tightest() {
    // (!1) | 2, and 2 is already outside 1.
    assert_eq!(canonical("!1 | 2"), "!1");
}

#[test]
fn syntax_errors() {
    assert_eq!(syntax_error(""), "unexpected end of expression");
    assert_eq!(syntax_error("[1, 2"), "expected ']'");
    assert_eq!(syntax_error("1 2"), "unexpected trailing input");
    assert_eq!(syntax_error(r#""abc"#), "unterminated string literal");
    assert_eq!(syntax_error("{1: 2}"), "expected object key");
    assert_eq!(syntax_error("@"), "unexpected character '@'");
    assert_eq!(syntax_error("(1 | 2"), "expected ')'");
}

#[test]
fn syntax_error_reports_offset() {
    match engine::parse("[1, 2] ]", None) {
        Err(ReadError::Syntax { pos, .. }) => assert_eq!(pos, 7),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn unknown_name_is_unbound() {
    assert_eq!(
        engine::parse("[1, foo]", None).unwrap_err(),
        ReadError::UnboundVariable("foo".to_string())
    );
}

#[test]
fn identifiers() {
    for name in ["x", "_x", "a1", "snake_case", "X"] {
        assert!(engine::is_identifier(name), "{name} should be an identifier");
    }
    for name in ["", "1x", "a-b", "null", "true", "false", "U", "_", "é"] {
        assert!(!engine::is_identifier(name), "{name} should not be an identifier");
    }
}

// ============================================================================
// Sentinels and constructors
// ============================================================================

#[test]
fn sentinels_are_shared() {
    assert!(Handle::ptr_eq(&engine::null(), &engine::null()));
    assert!(Handle::ptr_eq(&read("null"), &engine::null()));
    assert!(Handle::ptr_eq(&read("true"), &engine::boolean(true)));
    assert!(Handle::ptr_eq(&read("U"), &engine::universe()));
    assert!(Handle::ptr_eq(&read("*"), &engine::wild()));
    assert!(!Handle::ptr_eq(&engine::boolean(true), &engine::boolean(false)));
}

#[test]
fn list_with_empty_position_is_empty() {
    let value = engine::list(vec![engine::int(1), engine::empty()]);
    assert_eq!(engine::type_tag(&value), TypeTag::Empty);
    assert_eq!(canonical("[1, ∅]"), "∅");
}

#[test]
fn object_keeps_last_duplicate() {
    let value = engine::object([
        ("k".to_string(), engine::int(1)),
        ("k".to_string(), engine::int(2)),
    ]);
    assert_eq!(engine::print(&value), r#"{"k": 2}"#);
}

#[test]
fn numbers_compare_across_representations() {
    assert!(engine::structurally_equal(&engine::int(1), &engine::float(1.0)));
    assert!(engine::structurally_equal(&engine::int(7), &engine::uint(7)));
    assert!(!engine::structurally_equal(&engine::int(1), &engine::float(1.5)));
    assert_eq!(engine::as_int(&engine::uint(u64::MAX)), None);
    assert_eq!(engine::as_float(&engine::int(3)), Some(3.0));
}

// ============================================================================
// Union
// ============================================================================

#[test]
fn union_drops_subsumed_members() {
    assert_eq!(canonical("1 | 1"), "1");
    assert_eq!(canonical("[1, 2] | [*, *]"), "[*, *]");
    assert_eq!(canonical(r#"{"a": 1, *} | {"a": 1, "b": 2}"#), r#"{"a": 1, *}"#);
}

#[test]
fn union_with_universe_or_empty() {
    assert_eq!(canonical("1 | U"), "U");
    assert_eq!(canonical("∅ | 3"), "3");
    assert_eq!(canonical("∅ | ∅"), "∅");
}

#[test]
fn union_flattens() {
    let value = read("(1 | 2) | (3 | 4)");
    assert_eq!(engine::print(&value), "1 | 2 | 3 | 4");
    let mut cursor = engine::iterate(&value);
    let mut count = usize::from(cursor.enter());
    while cursor.advance() {
        count += 1;
    }
    assert_eq!(count, 4);
}

// ============================================================================
// Intersection
// ============================================================================

#[test]
fn intersect_lists_position_by_position() {
    assert_eq!(canonical("[1, *] & [*, 2]"), "[1, 2]");
    assert_eq!(canonical("[1, 2] & [1, 2, 3]"), "∅");
    assert_eq!(canonical("[1, 2] & [1, 3]"), "∅");
}

#[test]
fn intersect_distributes_over_union() {
    assert_eq!(canonical("(1 | 2) & 2"), "2");
    assert_eq!(canonical("[1 | 2, 3] & [2, *]"), "[2, 3]");
    assert_eq!(canonical("(1 | 2) & (2 | 3)"), "2");
}

#[test]
fn intersect_objects() {
    assert_eq!(canonical(r#"{"a": 1, *} & {"b": 2, *}"#), r#"{"a": 1, "b": 2, *}"#);
    assert_eq!(canonical(r#"{"a": *, *} & {"a": 1, "b": 2}"#), r#"{"a": 1, "b": 2}"#);
    assert_eq!(canonical(r#"{"c": 3, *} & {"a": 1}"#), "∅");
    assert_eq!(canonical(r#"{"a": 1} & {"a": 2}"#), "∅");
}

#[test]
fn intersect_mismatched_kinds_is_empty() {
    assert_eq!(canonical(r#"1 & "a""#), "∅");
    assert_eq!(canonical("[1] & {}"), "∅");
    assert_eq!(canonical("null & false"), "∅");
}

#[test]
fn intersect_with_universe_and_wild() {
    assert_eq!(canonical("U & [1]"), "[1]");
    assert_eq!(canonical("* & 5"), "5");
}

// ============================================================================
// Complement
// ============================================================================

#[test]
fn complement_reductions() {
    assert_eq!(canonical("!U"), "∅");
    assert_eq!(canonical("!∅"), "U");
    assert_eq!(canonical("!!1"), "1");
}

#[test]
fn intersect_with_complement() {
    assert_eq!(canonical("!1 & 2"), "2");
    assert_eq!(canonical("!1 & 1"), "∅");
    assert_eq!(canonical("!1 & !2"), "!(1 | 2)");
    assert_eq!(canonical("[1, 2] & ![*, 3]"), "[1, 2]");
}

#[test]
fn complement_handle_is_independent() {
    let one = engine::int(1);
    let negated = engine::complement(&one);
    drop(one);
    assert_eq!(engine::type_tag(&negated), TypeTag::Complement);
    assert_eq!(engine::print(&negated), "!1");
}

// ============================================================================
// Join
// ============================================================================

#[test]
fn join_overlays_objects() {
    assert_eq!(canonical(r#"{"a": 1} : {"b": 2}"#), r#"{"a": 1, "b": 2}"#);
    assert_eq!(canonical(r#"{"a": 1} : {"a": 2}"#), r#"{"a": 2}"#);
    assert_eq!(canonical(r#"{"a": 1, *} : {"b": 2}"#), r#"{"a": 1, "b": 2, *}"#);
}

#[test]
fn join_concatenates_lists() {
    assert_eq!(canonical("[1] : [2, 3]"), "[1, 2, 3]");
    assert_eq!(canonical("[] : []"), "[]");
}

#[test]
fn join_of_scalars_is_empty() {
    assert_eq!(canonical("1 : 2"), "∅");
}

#[test]
fn combine_matches_reader() {
    let a = read("[1, *]");
    let b = read("[*, 2]");
    let both = engine::combine(Op::Intersect, &a, &b).unwrap();
    assert!(engine::structurally_equal(&both, &read("[1, 2]")));
    let joined = engine::combine(Op::Join, &a, &b).unwrap();
    assert_eq!(engine::print(&joined), "[1, *, *, 2]");
}

// ============================================================================
// Containment
// ============================================================================

#[test]
fn containment() {
    assert!(engine::represented_in(&read("1"), &read("1 | 2")));
    assert!(engine::represented_in(&read("[1, 2]"), &read("[*, *]")));
    assert!(engine::represented_in(&read("1"), &read("*")));
    assert!(engine::represented_in(&read("*"), &read("U")));
    assert!(engine::represented_in(&read("∅"), &read("1")));
    assert!(engine::represented_in(&read("2"), &read("!1")));
    assert!(engine::represented_in(&read(r#"{"a": 1, "b": 2}"#), &read(r#"{"a": *, *}"#)));
    assert!(!engine::represented_in(&read("U"), &read("*")));
    assert!(!engine::represented_in(&read("[1, 2]"), &read("[*]")));
    assert!(!engine::represented_in(&read("1 | 3"), &read("1 | 2")));
    assert!(!engine::represented_in(&read(r#"{"a": 1, *}"#), &read(r#"{"a": 1}"#)));
}

#[test]
fn union_equality_ignores_member_order() {
    assert!(engine::structurally_equal(&read("1 | 2"), &read("2 | 1")));
    assert!(!engine::structurally_equal(&read("1 | 2"), &read("1 | 3")));
}

// ============================================================================
// Budget
// ============================================================================

#[test]
fn combine_within_reports_exhaustion() {
    let big = read("[1, 2, 3, 4, 5]");
    let result = engine::combine_within(Op::Union, &big, &engine::int(7), 4);
    assert_eq!(result.unwrap_err(), EngineError::Exhausted { limit: 4 });
}

#[test]
fn shortcut_results_still_respect_budget() {
    let big = read("[1, 2, 3, 4, 5]");
    let result = engine::combine_within(Op::Intersect, &engine::universe(), &big, 4);
    assert_eq!(result.unwrap_err(), EngineError::Exhausted { limit: 4 });
}

#[test]
fn reader_respects_budget() {
    let result = engine::parse_within("[1, 2] | 3", None, 2, engine::DEFAULT_MAX_DEPTH);
    assert_eq!(
        result.unwrap_err(),
        ReadError::Engine(EngineError::Exhausted { limit: 2 })
    );
}

#[test]
fn deep_nesting_is_an_error() {
    for (open, close) in [("[", "]"), ("(", ")"), ("{a: ", "}"), ("!", "")] {
        let text = format!("{}1{}", open.repeat(20_000), close.repeat(20_000));
        assert_eq!(
            engine::parse(&text, None).unwrap_err(),
            ReadError::TooDeep {
                limit: engine::DEFAULT_MAX_DEPTH
            },
            "nesting with {open:?}"
        );
    }
}

#[test]
fn nesting_limit_counts_levels_not_items() {
    let limit = engine::DEFAULT_NODE_LIMIT;
    assert!(engine::parse_within("[[1]]", None, limit, 2).is_ok());
    assert_eq!(
        engine::parse_within("[[[1]]]", None, limit, 2).unwrap_err(),
        ReadError::TooDeep { limit: 2 }
    );
    assert!(engine::parse_within("[1, 2] | [3] | ([4])", None, limit, 1).is_ok());
    assert!(engine::parse_within("1", None, limit, 0).is_ok());
}

#[test]
fn complement_restriction_stays_within_caller_budget() {
    // The two values are disjoint only at position 1, and proving it means
    // first meeting the two unions at position 0.
    let a = read("[{x: *, *} | {y: *, *}, 5]");
    let c = read("[{p: *, *} | {q: *, *}, 6]");
    let not_c = engine::complement(&c);

    let roomy = engine::combine_within(Op::Intersect, &a, &not_c, 64).unwrap();
    assert!(engine::structurally_equal(&roomy, &a));

    let tight = engine::combine_within(Op::Intersect, &a, &not_c, 10);
    assert_eq!(tight.unwrap_err(), EngineError::Exhausted { limit: 10 });
}

// ============================================================================
// Cursor
// ============================================================================

#[test]
fn cursor_walks_list() {
    let value = read("[1, 2]");
    let mut cursor = engine::iterate(&value);
    assert!(cursor.value().is_none());
    assert!(cursor.enter());
    assert_eq!(engine::as_int(&cursor.value().unwrap()), Some(1));
    assert_eq!(cursor.key(), None);
    assert!(cursor.advance());
    assert_eq!(engine::as_int(&cursor.value().unwrap()), Some(2));
    assert!(!cursor.advance());
    assert!(cursor.value().is_none());
}

#[test]
fn cursor_walks_object_keys_in_order() {
    let value = read(r#"{"b": 2, "a": 1}"#);
    let mut cursor = engine::iterate(&value);
    assert!(cursor.enter());
    assert_eq!(cursor.key(), Some("a"));
    assert!(cursor.advance());
    assert_eq!(cursor.key(), Some("b"));
    assert!(!cursor.advance());
}

#[test]
fn cursor_over_scalar_has_no_children() {
    let mut cursor = engine::iterate(&engine::int(5));
    assert!(!cursor.enter());
    assert!(cursor.value().is_none());
}
