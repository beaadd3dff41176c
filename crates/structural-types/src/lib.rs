//! Runtime enforcement of a structural type system: a tree of
//! `TypeContext`s, each backed by a shared arena of `DescriptorData`, that
//! can `accepts`/`check`/`assert` a runtime `Value` against a descriptor
//! built from the factory methods on `TypeContext` (`spec.md` §3/§4).
//!
//! This crate is CORE-A. CORE-B (an annotation-to-descriptor compiler)
//! lives in `structural-convert` and depends on this one.

mod assertion;
mod context;
mod descriptor;
mod dispatch;
mod object_type;
mod reference;
mod to_json;
mod type_parameter;
mod validation;
mod value;
mod value_inference;

pub use context::{AssertionMode, DuplicateNameError, PredicateFn, TypeContext};
pub use descriptor::{
    BoxState, ClassShape, FunctionShape, IndexKeyKind, IndexSignature, Literal, Member,
    ObjectShape, Param, ParametricBody, RefTarget, TypeId, TypeParamState,
};
pub use validation::{PathSegment, TypeError, Validation, ValidationRecord};
pub use value::{FunctionValue, Value};

/// Registers the seed nominal predicates from `spec.md` §4.3/§6:
/// `Array`, `$ReadOnlyArray`, `Map`, `Set`, and `Promise`. Hosts may
/// register additional or overriding predicates on the same context
/// afterward.
pub fn register_seed_predicates(ctx: &std::rc::Rc<TypeContext>) {
    ctx.register_predicate("Array", |v| matches!(v, Value::Array(_)));
    ctx.register_predicate("$ReadOnlyArray", |v| matches!(v, Value::Array(_)));
    ctx.register_predicate("Map", |v| v.is_instance_of("Map"));
    ctx.register_predicate("Set", |v| v.is_instance_of("Set"));
    ctx.register_predicate("Promise", |v| v.is_instance_of("Promise"));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> std::rc::Rc<TypeContext> {
        TypeContext::new_root()
    }

    #[test]
    fn primitive_descriptors_accept_matching_kind_only() {
        let ctx = ctx();
        let number = ctx.number(None);
        assert!(ctx.accepts(number, &Value::Number(1.0)));
        assert!(!ctx.accepts(number, &Value::string("x")));
    }

    #[test]
    fn literal_descriptors_require_exact_value() {
        let ctx = ctx();
        let lit = ctx.string(Some("ok"));
        assert!(ctx.accepts(lit, &Value::string("ok")));
        assert!(!ctx.accepts(lit, &Value::string("no")));
    }

    #[test]
    fn nullable_accepts_null_undefined_and_inner() {
        let ctx = ctx();
        let n = ctx.nullable(ctx.number(None));
        assert!(ctx.accepts(n, &Value::Null));
        assert!(ctx.accepts(n, &Value::Undefined));
        assert!(ctx.accepts(n, &Value::Number(1.0)));
        assert!(!ctx.accepts(n, &Value::string("nope")));
    }

    #[test]
    fn array_checks_every_element() {
        let ctx = ctx();
        let arr = ctx.array(ctx.number(None));
        assert!(ctx.accepts(arr, &Value::Array(vec![Value::Number(1.0), Value::Number(2.0)])));
        assert!(!ctx.accepts(
            arr,
            &Value::Array(vec![Value::Number(1.0), Value::string("bad")])
        ));
    }

    #[test]
    fn exact_object_rejects_additional_properties() {
        let ctx = ctx();
        let shape = ObjectShape {
            members: vec![ctx.property("name", ctx.string(None), false)],
            ..Default::default()
        };
        let exact = ctx.exact_object(shape);
        let ok = Value::object([("name".into(), Value::string("a"))]);
        let extra = Value::object([
            ("name".into(), Value::string("a")),
            ("age".into(), Value::Number(1.0)),
        ]);
        assert!(ctx.accepts(exact, &ok));
        assert!(!ctx.accepts(exact, &extra));
    }

    #[test]
    fn optional_property_may_be_absent() {
        let ctx = ctx();
        let shape = ObjectShape {
            members: vec![ctx.property("nickname", ctx.string(None), true)],
            ..Default::default()
        };
        let obj = ctx.object(shape);
        assert!(ctx.accepts(obj, &Value::object([])));
    }

    #[test]
    fn union_accepts_if_any_branch_does() {
        let ctx = ctx();
        let u = ctx.union(vec![ctx.number(None), ctx.string(None)]);
        assert!(ctx.accepts(u, &Value::Number(1.0)));
        assert!(ctx.accepts(u, &Value::string("x")));
        assert!(!ctx.accepts(u, &Value::Bool(true)));
    }

    #[test]
    fn empty_union_accepts_nothing() {
        let ctx = ctx();
        let u = ctx.union(vec![]);
        assert!(!ctx.accepts(u, &Value::Number(1.0)));
    }

    #[test]
    fn empty_intersection_accepts_everything() {
        let ctx = ctx();
        let i = ctx.intersection(vec![]);
        assert!(ctx.accepts(i, &Value::Number(1.0)));
        assert!(ctx.accepts(i, &Value::Undefined));
    }

    #[test]
    fn over_long_tuple_is_accepted_ignoring_extra_elements() {
        let ctx = ctx();
        let t = ctx.tuple(vec![ctx.number(None), ctx.string(None)]);
        let v = Value::Array(vec![Value::Number(1.0), Value::string("x"), Value::Bool(true)]);
        assert!(ctx.accepts(t, &v));
    }

    #[test]
    fn short_tuple_is_rejected() {
        let ctx = ctx();
        let t = ctx.tuple(vec![ctx.number(None), ctx.string(None)]);
        let v = Value::Array(vec![Value::Number(1.0)]);
        assert!(!ctx.accepts(t, &v));
    }

    #[test]
    fn accepts_matches_collect_errors_negation() {
        let ctx = ctx();
        let n = ctx.number(None);
        let mut validation = Validation::new();
        let failed = ctx.collect_errors(n, &mut validation, &mut Vec::new(), &Value::string("x"));
        assert_eq!(failed, !ctx.accepts(n, &Value::string("x")));
    }

    #[test]
    fn unwrap_is_idempotent_over_a_named_ref() {
        let ctx = ctx();
        let number = ctx.number(None);
        ctx.declare("N", number).unwrap();
        let r = ctx.ref_named("N", vec![]);
        let once = ctx.unwrap(r);
        let twice = ctx.unwrap(once);
        assert_eq!(once, twice);
        assert_eq!(once, number);
    }

    #[test]
    fn declare_is_write_once_per_context() {
        let ctx = ctx();
        let a = ctx.number(None);
        let b = ctx.string(None);
        assert!(ctx.declare("X", a).is_ok());
        assert!(ctx.declare("X", b).is_err());
    }

    #[test]
    fn child_context_shadows_parent_name() {
        let root = ctx();
        let outer = root.number(None);
        root.declare("T", outer).unwrap();
        let child = root.child("inner");
        let inner = child.string(None);
        child.declare("T", inner).unwrap();
        assert_eq!(child.lookup_name("T"), Some(inner));
        assert_eq!(root.lookup_name("T"), Some(outer));
    }

    #[test]
    fn assert_mode_off_never_fails() {
        let ctx = ctx();
        ctx.set_mode(AssertionMode::Off);
        let n = ctx.number(None);
        assert!(ctx.check(n, Value::string("nope")).is_ok());
    }

    #[test]
    fn assert_mode_assert_raises_type_error() {
        let ctx = ctx();
        ctx.set_mode(AssertionMode::Assert);
        let n = ctx.number(None);
        assert!(ctx.check(n, Value::string("nope")).is_err());
    }

    #[test]
    fn warn_never_throws_regardless_of_mode() {
        let ctx = ctx();
        ctx.set_mode(AssertionMode::Assert);
        let n = ctx.number(None);
        assert!(matches!(ctx.warn(n, Value::string("nope")), Value::String(_)));
    }

    #[test]
    fn type_parameter_records_first_observed_shape_then_rejects_conflicts() {
        let ctx = ctx();
        let p = ctx.type_parameter("T", None);
        assert!(ctx.accepts(p, &Value::Number(1.0)));
        // Once recorded, a bare TypeParameter reference compares against it.
        assert!(ctx.accepts(p, &Value::Number(2.0)));
        assert!(!ctx.accepts(p, &Value::string("not a number")));
    }

    #[test]
    fn flow_into_widens_recorded_shape_into_a_union() {
        let ctx = ctx();
        let p = ctx.type_parameter("T", None);
        let flow = ctx.flow_into(p);
        assert!(ctx.accepts(flow, &Value::Number(1.0)));
        assert!(ctx.accepts(flow, &Value::string("x")));
        // A later bare reference sees the widened union and rejects a
        // third, incompatible shape.
        assert!(!ctx.accepts(p, &Value::Bool(true)));
    }

    #[test]
    fn bound_any_accepts_without_recording() {
        let ctx = ctx();
        let any = ctx.any();
        let p = ctx.type_parameter("T", Some(any));
        assert!(ctx.accepts(p, &Value::Number(1.0)));
        assert!(ctx.accepts(p, &Value::string("anything")));
    }

    #[test]
    fn bound_rejects_incompatible_value() {
        let ctx = ctx();
        let bound = ctx.number(None);
        let p = ctx.type_parameter("T", Some(bound));
        assert!(!ctx.accepts(p, &Value::string("nope")));
    }

    #[test]
    fn tie_the_knot_self_referential_list() {
        let ctx = ctx();
        let ctx_for_thunk = ctx.clone();
        let list = ctx.boxed(move |self_id| {
            let next = ctx_for_thunk.nullable(self_id);
            let value = ctx_for_thunk.number(None);
            ctx_for_thunk.object(ObjectShape {
                members: vec![
                    ctx_for_thunk.property("value", value, false),
                    ctx_for_thunk.property("next", next, false),
                ],
                ..Default::default()
            })
        });

        let node2 = Value::object([("value".into(), Value::Number(2.0)), ("next".into(), Value::Null)]);
        let node1 = Value::object([("value".into(), Value::Number(1.0)), ("next".into(), node2)]);
        assert!(ctx.accepts(list, &node1));

        let bad = Value::object([("value".into(), Value::string("x")), ("next".into(), Value::Null)]);
        assert!(!ctx.accepts(list, &bad));
    }

    #[test]
    fn to_json_renders_a_union_as_a_tagged_tree() {
        let ctx = ctx();
        let u = ctx.union(vec![ctx.number(None), ctx.string(None)]);
        let tree = ctx.to_json(u);
        assert_eq!(tree["kind"], "union");
        assert_eq!(tree["members"][0]["kind"], "number");
        assert_eq!(tree["members"][1]["kind"], "string");
    }
}
