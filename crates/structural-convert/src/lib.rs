//! The annotation-to-descriptor compiler (CORE-B, `spec.md` §4.4-§4.6):
//! walks an annotation AST and emits the `TypeContext` factory-method calls
//! that build the same structural descriptors CORE-A (`structural-types`)
//! enforces at runtime.

mod ast;
mod context;
mod convert;
mod orchestrator;
mod render;

pub use ast::{
    ClassDecl, Declaration, DeclareFunctionDecl, DeclareModuleDecl, FunctionDecl,
    FunctionTypeAnnotation, ObjectMember, ObjectTypeAnnotation, ParamDecl, Program, PropertyDecl,
    TypeAliasDecl, TypeAnnotation, TypeParamDecl, ValueExpr,
};
pub use context::{ClassStorage, ConversionContext, SymbolClass};
pub use convert::{
    convert, emit_class, emit_declare_function, emit_declare_module, emit_function,
    emit_program, emit_type_alias, ConvertError,
};
pub use orchestrator::{run, ConversionOutput, OrchestratorConfig};
pub use render::{render_annotation, render_program};

#[cfg(test)]
mod tests {
    use super::*;
    use structural_types::{TypeContext, Value};

    #[test]
    fn converts_a_union_field_and_rejects_a_boolean() {
        // `type Thing = { id: number, tag: string | number }` rejecting a
        // boolean `tag` (seeded end-to-end scenario 1).
        let ctx = TypeContext::new_root();
        let cx = ConversionContext::new();
        let body = TypeAnnotation::Object(ObjectTypeAnnotation {
            members: vec![
                ObjectMember::Property {
                    name: "id".to_string(),
                    type_annotation: TypeAnnotation::Number,
                    optional: false,
                },
                ObjectMember::Property {
                    name: "tag".to_string(),
                    type_annotation: TypeAnnotation::Union(vec![TypeAnnotation::String, TypeAnnotation::Number]),
                    optional: false,
                },
            ],
            string_index: None,
            number_index: None,
            call_signature: None,
            exact: false,
        });
        let id = emit_type_alias(
            &ctx,
            &cx,
            &TypeAliasDecl {
                name: "Thing".to_string(),
                type_params: vec![],
                body,
                is_interface: false,
            },
        )
        .unwrap();

        let ok = Value::object([("id".into(), Value::Number(1.0)), ("tag".into(), Value::string("x"))]);
        let bad = Value::object([("id".into(), Value::Number(1.0)), ("tag".into(), Value::Bool(true))]);
        assert!(ctx.accepts(id, &ok));
        assert!(!ctx.accepts(id, &bad));
    }

    #[test]
    fn self_referential_tree_type_round_trips_through_box() {
        // `type Tree = { value: number, children: Array<Tree> }` (seeded
        // end-to-end scenario 4).
        let ctx = TypeContext::new_root();
        let cx = ConversionContext::new();
        let body = TypeAnnotation::Object(ObjectTypeAnnotation {
            members: vec![
                ObjectMember::Property {
                    name: "value".to_string(),
                    type_annotation: TypeAnnotation::Number,
                    optional: false,
                },
                ObjectMember::Property {
                    name: "children".to_string(),
                    type_annotation: TypeAnnotation::Generic {
                        name: "Array".to_string(),
                        args: vec![TypeAnnotation::Generic {
                            name: "Tree".to_string(),
                            args: vec![],
                        }],
                    },
                    optional: false,
                },
            ],
            string_index: None,
            number_index: None,
            call_signature: None,
            exact: false,
        });
        let id = emit_type_alias(
            &ctx,
            &cx,
            &TypeAliasDecl {
                name: "Tree".to_string(),
                type_params: vec![],
                body,
                is_interface: false,
            },
        )
        .unwrap();

        let leaf = Value::object([("value".into(), Value::Number(1.0)), ("children".into(), Value::Array(vec![]))]);
        let tree = Value::object([
            ("value".into(), Value::Number(0.0)),
            ("children".into(), Value::Array(vec![leaf])),
        ]);
        assert!(ctx.accepts(id, &tree));

        let bad = Value::object([("value".into(), Value::string("nope")), ("children".into(), Value::Array(vec![]))]);
        assert!(!ctx.accepts(id, &bad));
    }

    #[test]
    fn array_of_number_parameter_rejects_a_string_element() {
        // `function sum(xs: Array<number>): number` (seeded end-to-end
        // scenario 6).
        let ctx = TypeContext::new_root();
        let cx = ConversionContext::new();
        let func = FunctionDecl {
            name: "sum".to_string(),
            type_params: vec![],
            signature: FunctionTypeAnnotation {
                params: vec![ParamDecl {
                    name: "xs".to_string(),
                    type_annotation: TypeAnnotation::Generic {
                        name: "Array".to_string(),
                        args: vec![TypeAnnotation::Number],
                    },
                    optional: false,
                }],
                rest: None,
                return_type: Some(Box::new(TypeAnnotation::Number)),
            },
        };
        let id = emit_function(&ctx, &cx, &func);
        let ok = ctx.assert_params(id, vec![Value::Array(vec![Value::Number(1.0), Value::Number(2.0)])]);
        assert!(ok.is_ok());
        let bad = ctx.assert_params(
            id,
            vec![Value::Array(vec![Value::Number(1.0), Value::string("nope")])],
        );
        assert!(bad.is_err());
    }

    #[test]
    fn unknown_annotation_kind_degrades_to_any_with_a_diagnostic() {
        let ctx = TypeContext::new_root();
        let cx = ConversionContext::new();
        let id = convert(&ctx, &cx, &TypeAnnotation::Other("JSXElement".to_string()), false);
        assert!(ctx.accepts(id, &Value::Number(1.0)));
        assert!(ctx.accepts(id, &Value::string("anything")));
        let diags = cx.take_diagnostics();
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn declare_module_builds_a_structural_export_surface() {
        let ctx = TypeContext::new_root();
        let cx = ConversionContext::new();
        let decl = DeclareModuleDecl {
            name: "widgets".to_string(),
            exports: vec![("count".to_string(), TypeAnnotation::Number)],
        };
        let id = emit_declare_module(&ctx, &cx, &decl).unwrap();
        let surface = Value::object([("count".into(), Value::Number(3.0))]);
        assert!(ctx.accepts(id, &surface));
    }

    #[test]
    fn render_program_produces_readable_constructor_text() {
        let program = Program {
            declarations: vec![Declaration::TypeAlias(TypeAliasDecl {
                name: "Id".to_string(),
                type_params: vec![],
                body: TypeAnnotation::String,
                is_interface: false,
            })],
        };
        let text = render_program(&program);
        assert!(text.contains("const Id = type"));
    }
}
