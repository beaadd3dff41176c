//! Universal laws and round-trips from `spec.md` §8, exercised against the
//! public `structural_types` API rather than inline against the arena
//! internals (see `src/lib.rs`'s `#[cfg(test)]` module for the
//! descriptor-construction-level unit tests).

use structural_types::{ObjectShape, TypeContext, Value};

fn ctx() -> std::rc::Rc<TypeContext> {
    TypeContext::new_root()
}

#[test]
fn union_of_duplicates_matches_the_bare_member() {
    let ctx = ctx();
    let n = ctx.number(None);
    let dup = ctx.union(vec![n, n]);
    assert_eq!(ctx.accepts(dup, &Value::Number(1.0)), ctx.accepts(n, &Value::Number(1.0)));
    assert_eq!(ctx.accepts(dup, &Value::string("x")), ctx.accepts(n, &Value::string("x")));
}

#[test]
fn intersection_with_any_is_identity() {
    let ctx = ctx();
    let n = ctx.number(None);
    let any = ctx.any();
    let combined = ctx.intersection(vec![n, any]);
    assert_eq!(ctx.accepts(combined, &Value::Number(1.0)), ctx.accepts(n, &Value::Number(1.0)));
    assert_eq!(ctx.accepts(combined, &Value::string("x")), ctx.accepts(n, &Value::string("x")));
}

#[test]
fn nullable_accepts_both_absent_forms() {
    let ctx = ctx();
    let n = ctx.nullable(ctx.number(None));
    assert!(ctx.accepts(n, &Value::Null));
    assert!(ctx.accepts(n, &Value::Undefined));
}

#[test]
fn exact_object_vs_object_on_extra_keys() {
    let ctx = ctx();
    let member = |ctx: &std::rc::Rc<TypeContext>| ObjectShape {
        members: vec![ctx.property("a", ctx.number(None), false)],
        ..Default::default()
    };
    let exact = ctx.exact_object(member(&ctx));
    let open = ctx.object(member(&ctx));
    let v = Value::object([("a".into(), Value::Number(1.0)), ("b".into(), Value::Number(2.0))]);
    assert!(!ctx.accepts(exact, &v));
    assert!(ctx.accepts(open, &v));
}

#[test]
fn type_of_round_trips_the_sample_that_produced_it() {
    let ctx = ctx();
    let sample = Value::object([("a".into(), Value::Number(1.0))]);
    let t = ctx.type_of(&sample);
    assert!(ctx.accepts(t, &sample));
}

#[test]
fn fresh_parameter_first_observation_equals_type_of_that_value() {
    let ctx = ctx();
    let p = ctx.type_parameter("T", None);
    let v = Value::Number(1.0);
    let w = Value::Number(2.0);
    assert!(ctx.accepts(p, &v));
    let later = ctx.accepts(p, &w);

    let fresh = ctx.type_parameter("T2", None);
    assert!(ctx.accepts(fresh, &v));
    let type_of_v = ctx.type_of(&v);
    assert_eq!(later, ctx.accepts(type_of_v, &w));
}

#[test]
fn flow_into_sequence_ends_in_a_rejecting_union() {
    let ctx = ctx();
    let p = ctx.type_parameter("T", None);
    let flow = ctx.flow_into(p);
    assert!(ctx.accepts(flow, &Value::Number(1.0)));
    assert!(ctx.accepts(flow, &Value::string("x")));
    assert!(!ctx.accepts(p, &Value::Bool(true)));
}

#[test]
fn accepts_type_checks_structural_subtyping_between_descriptors() {
    let ctx = ctx();
    let wide = ctx.object(ObjectShape {
        members: vec![ctx.property("a", ctx.number(None), false)],
        ..Default::default()
    });
    let narrow = ctx.object(ObjectShape {
        members: vec![
            ctx.property("a", ctx.number(None), false),
            ctx.property("b", ctx.string(None), false),
        ],
        ..Default::default()
    });
    assert!(ctx.accepts_type(wide, narrow));
    assert!(!ctx.accepts_type(narrow, wide));
}

#[test]
fn to_json_tree_matches_to_string_shape_for_a_nullable() {
    let ctx = ctx();
    let n = ctx.nullable(ctx.string(None));
    let tree = ctx.to_json(n);
    assert_eq!(tree["kind"], "nullable");
    assert_eq!(tree["inner"]["kind"], "string");
    assert_eq!(ctx.to_string_of(n), "?string");
}
