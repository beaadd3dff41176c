//! The CORE-A half of `spec.md` §8's seeded end-to-end scenarios —
//! scenarios exercised directly against `TypeContext`'s factory methods,
//! without going through the annotation converter (which has its own
//! seeded-scenario tests in `structural-convert`).

use structural_types::{ObjectShape, TypeContext, Value};

fn ctx() -> std::rc::Rc<TypeContext> {
    TypeContext::new_root()
}

#[test]
fn scenario_4_self_referential_tree_rejects_a_nested_bad_child() {
    // type Tree = {kids: Tree[]}
    let ctx = ctx();
    let ctx_for_thunk = ctx.clone();
    let tree = ctx.boxed(move |self_id| {
        let kids = ctx_for_thunk.array(self_id);
        ctx_for_thunk.object(ObjectShape {
            members: vec![ctx_for_thunk.property("kids", kids, false)],
            ..Default::default()
        })
    });

    let good = Value::object([(
        "kids".into(),
        Value::Array(vec![Value::object([("kids".into(), Value::Array(vec![]))])]),
    )]);
    assert!(ctx.accepts(tree, &good));

    let bad = Value::object([(
        "kids".into(),
        Value::Array(vec![Value::object([(
            "kids".into(),
            Value::Array(vec![Value::Number(42.0)]),
        )])]),
    )]);
    assert!(!ctx.accepts(tree, &bad));
}

#[test]
fn scenario_5_generic_class_box_rejects_a_mismatched_field_assignment() {
    // class Box<T> { v: T }; const b = new Box(3); b.v = "nope" (rejected)
    let ctx = ctx();
    let placeholder = ctx.type_parameter("T", None);
    let body_ctx = ctx.clone();
    let parametric_box = ctx.parametric(vec![placeholder], move |fresh| {
        body_ctx.object(ObjectShape {
            members: vec![body_ctx.property("v", fresh[0], false)],
            ..Default::default()
        })
    });

    let number_ty = ctx.number(None);
    let box_of_number = ctx.ref_direct(parametric_box, vec![number_ty]);

    let ok = Value::object([("v".into(), Value::Number(3.0))]);
    let bad = Value::object([("v".into(), Value::string("nope"))]);
    assert!(ctx.accepts(box_of_number, &ok));
    assert!(!ctx.accepts(box_of_number, &bad));
}
