//! Tests for matcher.rs

use crate::assert_err;
use crate::logging::init_test_logging;
use crate::matcher::{MatchEnv, Matcher, ValueKind};
use serde_json::json;

#[test]
fn any_matches_everything() {
    let m = Matcher::any();
    assert!(m.matches(&json!(null)));
    assert!(m.matches(&json!(true)));
    assert!(m.matches(&json!(5)));
    assert!(m.matches(&json!(2.5)));
    assert!(m.matches(&json!("text")));
    assert!(m.matches(&json!([1, 2, 3])));
    assert!(m.matches(&json!({"a": 1})));
}

#[test]
fn kind_matches_by_category_only() {
    let int_matcher = Matcher::kind(ValueKind::Int);
    assert!(int_matcher.matches(&json!(5)));
    assert!(!int_matcher.matches(&json!("5")));
    assert!(!int_matcher.matches(&json!(5.5)));

    let str_matcher = Matcher::kind(ValueKind::Str);
    assert!(str_matcher.matches(&json!("5")));
    assert!(!str_matcher.matches(&json!(5)));

    // Contents never constrain a kind check.
    assert!(Matcher::kind(ValueKind::Array).matches(&json!([])));
    assert!(Matcher::kind(ValueKind::Array).matches(&json!([1, "two", null])));
    assert!(Matcher::kind(ValueKind::Object).matches(&json!({})));
    assert!(Matcher::kind(ValueKind::Null).matches(&json!(null)));
    assert!(Matcher::kind(ValueKind::Bool).matches(&json!(false)));
}

#[test]
fn value_kind_splits_numbers() {
    assert_eq!(ValueKind::of(&json!(5)), ValueKind::Int);
    assert_eq!(ValueKind::of(&json!(-5)), ValueKind::Int);
    assert_eq!(ValueKind::of(&json!(5.0)), ValueKind::Float);
    assert_eq!(ValueKind::of(&json!(2.5)), ValueKind::Float);
}

#[test]
fn pattern_is_full_match() -> anyhow::Result<()> {
    let m = Matcher::pattern("a.c")?;
    assert!(m.matches(&json!("abc")));
    assert!(m.matches(&json!("axc")));
    // Never a partial match.
    assert!(!m.matches(&json!("abcd")));
    assert!(!m.matches(&json!("xabc")));
    assert!(!m.matches(&json!("ab")));
    Ok(())
}

#[test]
fn pattern_sees_json_text_for_non_strings() -> anyhow::Result<()> {
    // Strings contribute raw contents (no quotes), other values their JSON text.
    assert!(Matcher::pattern("ab*")?.matches(&json!("abbb")));
    assert!(Matcher::pattern(r"\d+")?.matches(&json!(42)));
    assert!(Matcher::pattern("true")?.matches(&json!(true)));
    assert!(Matcher::pattern(r"\[1,2\]")?.matches(&json!([1, 2])));
    Ok(())
}

#[test]
fn pattern_rejects_invalid_regex() {
    assert_err!(Matcher::pattern("a[unclosed"));
}

#[test]
fn var_binding_is_first_write_wins() {
    init_test_logging();
    let env = MatchEnv::new();
    let m1 = env.var("x");
    let m2 = env.var("x");

    // First comparison fixes the expected value and succeeds.
    assert!(m1.matches(&json!(5)));
    // Any matcher over the same name checks against the fixed value.
    assert!(m2.matches(&json!(5)));
    assert!(!m2.matches(&json!(6)));
    // The binding is permanent, including for the matcher that created it.
    assert!(!m1.matches(&json!(6)));
    assert!(m1.matches(&json!(5)));

    assert_eq!(env.bound("x"), Some(json!(5)));
    assert_eq!(env.bound("y"), None);
}

#[test]
fn distinct_vars_bind_independently() {
    let env = MatchEnv::new();
    assert!(env.var("a").matches(&json!(1)));
    assert!(env.var("b").matches(&json!(2)));
    assert!(!env.var("a").matches(&json!(2)));
    assert!(!env.var("b").matches(&json!(1)));
}

#[test]
fn separate_envs_do_not_share_bindings() {
    let env1 = MatchEnv::new();
    let env2 = MatchEnv::new();
    assert!(env1.var("x").matches(&json!(1)));
    // A fresh environment binds fresh.
    assert!(env2.var("x").matches(&json!(2)));
    assert!(!env1.var("x").matches(&json!(2)));
}

#[test]
fn var_binds_structured_values() {
    let env = MatchEnv::new();
    let call_id = json!({"node": "eval", "seq": 7});
    assert!(env.var("call").matches(&call_id));
    assert!(env.var("call").matches(&call_id));
    assert!(!env.var("call").matches(&json!({"node": "eval", "seq": 8})));
}

#[test]
fn matchers_compare_against_values_in_assertions() -> anyhow::Result<()> {
    let env = MatchEnv::new();

    // Matchers slot directly into assert_eq against Values, either side.
    assert_eq!(Matcher::any(), json!("whatever"));
    assert_eq!(json!(5), Matcher::kind(ValueKind::Int));
    assert_eq!(Matcher::pattern("j-[0-9]+")?, json!("j-17"));
    assert_eq!(env.var("id"), json!("j-17"));
    assert_eq!(env.var("id"), json!("j-17"));
    assert_ne!(env.var("id"), json!("j-18"));
    Ok(())
}

#[test]
fn env_is_shared_across_threads() {
    let env = MatchEnv::new();
    assert!(env.var("x").matches(&json!(7)));

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                assert!(env.var("x").matches(&json!(7)));
                assert!(!env.var("x").matches(&json!(8)));
            });
        }
    });
}

#[test]
fn debug_names_the_active_variant() -> anyhow::Result<()> {
    let env = MatchEnv::new();
    assert_eq!(format!("{:?}", Matcher::any()), "Matcher(any)");
    assert_eq!(format!("{:?}", Matcher::kind(ValueKind::Int)), "Matcher(kind=Int)");
    assert_eq!(format!("{:?}", Matcher::pattern("a.c")?), "Matcher(pattern=^(?:a.c)$)");
    assert_eq!(format!("{:?}", env.var("x")), "Matcher(var=x)");
    Ok(())
}
