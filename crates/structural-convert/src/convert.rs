//! The annotation converter — a dispatch table from `TypeAnnotation` kind
//! to emission rule (`spec.md` §4.5). Builds `TypeId`s directly against a
//! `TypeContext` rather than emitting intermediate source text, since no
//! host transformer consumes that text in this crate (`SPEC_FULL.md` §1);
//! `render` (a separate module) produces the informational pseudo-source
//! text a host's transformed output would contain.

use std::rc::Rc;

use structural_common::diagnostics::codes;
use structural_common::{Diagnostic, Span};
use structural_types::{
    FunctionShape, IndexKeyKind, IndexSignature, ObjectShape, TypeContext, TypeId, Value,
};

use crate::ast::{
    ClassDecl, Declaration, DeclareFunctionDecl, DeclareModuleDecl, FunctionDecl,
    FunctionTypeAnnotation, ObjectMember, Program, TypeAliasDecl, TypeAnnotation, TypeParamDecl,
    ValueExpr,
};
use crate::context::{ConversionContext, SymbolClass};

/// Fatal compile-time failures — duplicate name declarations
/// (`spec.md` §4.3/§7).
#[derive(Debug)]
pub struct ConvertError(pub structural_types::DuplicateNameError);

impl std::fmt::Display for ConvertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ConvertError {}

impl From<structural_types::DuplicateNameError> for ConvertError {
    fn from(err: structural_types::DuplicateNameError) -> Self {
        ConvertError(err)
    }
}

/// Whether the node currently being converted sits in a flowable position
/// (`spec.md` §4.5's flowable-position detection, implemented here as a
/// flag threaded top-down from the one call site that knows it entered a
/// function parameter or class property, rather than a bottom-up parent
/// walk — Rust's AST here has no parent pointers to walk).
type Flowable = bool;

/// Convert one annotation node into a descriptor `TypeId`.
pub fn convert(
    ctx: &Rc<TypeContext>,
    cx: &ConversionContext,
    annotation: &TypeAnnotation,
    flowable: Flowable,
) -> TypeId {
    match annotation {
        TypeAnnotation::Any => ctx.any(),
        TypeAnnotation::Mixed => ctx.mixed(),
        TypeAnnotation::Existential => ctx.existential(),
        TypeAnnotation::Empty => ctx.empty(),
        TypeAnnotation::Void => ctx.void(),
        TypeAnnotation::NullLiteral => ctx.null(),
        TypeAnnotation::Number => ctx.number(None),
        TypeAnnotation::NumberLiteral(n) => ctx.number(Some(*n)),
        TypeAnnotation::String => ctx.string(None),
        TypeAnnotation::StringLiteral(s) => ctx.string(Some(s)),
        TypeAnnotation::Boolean => ctx.boolean(None),
        TypeAnnotation::BooleanLiteral(b) => ctx.boolean(Some(*b)),
        TypeAnnotation::Symbol => ctx.symbol(),

        TypeAnnotation::Nullable(inner) => {
            let inner_id = convert(ctx, cx, inner, flowable);
            ctx.nullable(inner_id)
        }

        TypeAnnotation::Tuple(elems) => {
            let ids = elems.iter().map(|e| convert(ctx, cx, e, flowable)).collect();
            ctx.tuple(ids)
        }

        TypeAnnotation::Union(members) => {
            let ids = members.iter().map(|m| convert(ctx, cx, m, flowable)).collect();
            ctx.union(ids)
        }

        TypeAnnotation::Intersection(members) => {
            let ids = members.iter().map(|m| convert(ctx, cx, m, flowable)).collect();
            ctx.intersection(ids)
        }

        TypeAnnotation::Object(obj) => convert_object(ctx, cx, obj, flowable),

        TypeAnnotation::Function(sig) => convert_function_type(ctx, cx, sig),

        TypeAnnotation::Generic { name, args } => convert_generic(ctx, cx, name, args, flowable),

        TypeAnnotation::Typeof(value_expr) => match annotation_to_value(cx, value_expr) {
            Some(sample) => ctx.type_of(&sample),
            None => {
                cx.push_diagnostic(Diagnostic::warning(
                    codes::UNKNOWN_ANNOTATION_KIND,
                    Span::dummy(),
                    format!(
                        "`typeof {value_expr}` has no bound value sample to resolve against; degrading to any"
                    ),
                ));
                ctx.any()
            }
        },

        TypeAnnotation::Other(label) => {
            cx.push_diagnostic(Diagnostic::warning(
                codes::UNKNOWN_ANNOTATION_KIND,
                Span::dummy(),
                format!("unrecognized annotation kind `{label}`, degrading to any"),
            ));
            ctx.any()
        }
    }
}

/// `annotationToValue` (`spec.md` §4.5): resolve a `typeof` chain's root
/// identifier against a bound sample (`ConversionContext::bind_value_sample`)
/// and walk its member accesses, stopping at the first missing binding or
/// property — a host that never bound a sample for the root name gets `None`
/// rather than a lookup into an empty object.
fn annotation_to_value(cx: &ConversionContext, expr: &ValueExpr) -> Option<Value> {
    match expr {
        ValueExpr::Ident(name) => cx.value_sample(name),
        ValueExpr::Member(base, prop) => {
            let base_value = annotation_to_value(cx, base)?;
            base_value.get_property(prop).cloned()
        }
    }
}

fn convert_object(
    ctx: &Rc<TypeContext>,
    cx: &ConversionContext,
    obj: &crate::ast::ObjectTypeAnnotation,
    flowable: Flowable,
) -> TypeId {
    let members = obj
        .members
        .iter()
        .map(|member| match member {
            ObjectMember::Property {
                name,
                type_annotation,
                optional,
            } => ctx.property(name, convert(ctx, cx, type_annotation, flowable), *optional),
            ObjectMember::Method {
                name,
                signature,
                optional: _,
            } => {
                // A method member is always required structurally
                // (`TypeContext::method` never emits `optional: true` —
                // matches the teacher-style `object()`/`method()` split in
                // `context.rs`); `optional` here only round-trips origin
                // fidelity for callers that inspect the AST directly.
                let sig_id = convert_function_type(ctx, cx, signature);
                ctx.method(name, sig_id)
            }
        })
        .collect();

    let string_index = obj.string_index.as_ref().map(|value_ty| IndexSignature {
        key: IndexKeyKind::String,
        value_type: convert(ctx, cx, value_ty, flowable),
    });
    let number_index = obj.number_index.as_ref().map(|value_ty| IndexSignature {
        key: IndexKeyKind::Number,
        value_type: convert(ctx, cx, value_ty, flowable),
    });
    let call_property = obj
        .call_signature
        .as_ref()
        .map(|sig| ctx.call_property(convert_function_type(ctx, cx, sig)));

    let shape = ObjectShape {
        members,
        string_index,
        number_index,
        call_property,
        exact: obj.exact,
    };

    if obj.exact {
        ctx.exact_object(shape)
    } else {
        ctx.object(shape)
    }
}

fn convert_function_type(ctx: &Rc<TypeContext>, cx: &ConversionContext, sig: &FunctionTypeAnnotation) -> TypeId {
    // Function types are always flowable at their own parameter list,
    // independent of whether the function type itself sits in a flowable
    // position (`spec.md` §4.5).
    let params = sig
        .params
        .iter()
        .map(|p| ctx.param(&p.name, convert(ctx, cx, &p.type_annotation, true), p.optional))
        .collect();
    let rest = sig.rest.as_ref().map(|r| ctx.rest(convert(ctx, cx, r, true)));
    let return_type = sig.return_type.as_ref().map(|r| ctx.return_(convert(ctx, cx, r, false)));
    ctx.function(FunctionShape {
        params,
        rest,
        return_type,
    })
}

fn convert_generic(
    ctx: &Rc<TypeContext>,
    cx: &ConversionContext,
    name: &str,
    args: &[TypeAnnotation],
    flowable: Flowable,
) -> TypeId {
    if name == "Array" && args.len() == 1 {
        let elem = convert(ctx, cx, &args[0], flowable);
        return ctx.array(elem);
    }

    match cx.classify(name) {
        Some(SymbolClass::TypeAlias(id)) => {
            if args.is_empty() {
                id
            } else {
                let instances = args.iter().map(|a| convert(ctx, cx, a, flowable)).collect();
                ctx.ref_direct(id, instances)
            }
        }
        Some(SymbolClass::TypeParameter(id)) => {
            if flowable {
                ctx.flow_into(id)
            } else {
                id
            }
        }
        Some(SymbolClass::ClassTypeParameter { type_id, .. }) => {
            if flowable {
                ctx.flow_into(type_id)
            } else {
                type_id
            }
        }
        None => {
            let instances = args.iter().map(|a| convert(ctx, cx, a, flowable)).collect();
            ctx.ref_named(name, instances)
        }
    }
}

/// Does `body` mention `name` anywhere (a self-reference requiring a
/// `box` thunk, `spec.md` §4.2/§4.5)?
fn references_name(body: &TypeAnnotation, name: &str) -> bool {
    match body {
        TypeAnnotation::Generic { name: n, args } => n == name || args.iter().any(|a| references_name(a, name)),
        TypeAnnotation::Nullable(inner) => references_name(inner, name),
        TypeAnnotation::Tuple(elems) | TypeAnnotation::Union(elems) | TypeAnnotation::Intersection(elems) => {
            elems.iter().any(|e| references_name(e, name))
        }
        TypeAnnotation::Object(obj) => {
            obj.members.iter().any(|m| match m {
                ObjectMember::Property { type_annotation, .. } => references_name(type_annotation, name),
                ObjectMember::Method { signature, .. } => function_type_references(signature, name),
            }) || obj.string_index.as_deref().is_some_and(|t| references_name(t, name))
                || obj.number_index.as_deref().is_some_and(|t| references_name(t, name))
                || obj
                    .call_signature
                    .as_deref()
                    .is_some_and(|sig| function_type_references(sig, name))
        }
        TypeAnnotation::Function(sig) => function_type_references(sig, name),
        _ => false,
    }
}

fn function_type_references(sig: &FunctionTypeAnnotation, name: &str) -> bool {
    sig.params.iter().any(|p| references_name(&p.type_annotation, name))
        || sig.rest.as_deref().is_some_and(|t| references_name(t, name))
        || sig.return_type.as_deref().is_some_and(|t| references_name(t, name))
}

/// `TypeAlias`/`InterfaceDeclaration` emission (`spec.md` §4.5): `const X =
/// type("X", body)`, boxed as a self-receiving thunk when the body
/// references `X` or declares type parameters.
pub fn emit_type_alias(
    ctx: &Rc<TypeContext>,
    cx: &ConversionContext,
    decl: &TypeAliasDecl,
) -> Result<TypeId, ConvertError> {
    let needs_thunk = !decl.type_params.is_empty() || references_name(&decl.body, &decl.name);

    if !needs_thunk {
        let body_id = convert(ctx, cx, &decl.body, false);
        let id = ctx.type_decl(&decl.name, body_id)?;
        cx.declare(&decl.name, SymbolClass::TypeAlias(id));
        return Ok(id);
    }

    let ctx_for_thunk = ctx.clone();
    let cx_for_thunk = cx.clone();
    let decl_for_thunk = decl.clone();

    let alias_id = ctx.boxed(move |self_id| {
        cx_for_thunk.push_scope();
        cx_for_thunk.declare(&decl_for_thunk.name, SymbolClass::TypeAlias(self_id));
        for tp in &decl_for_thunk.type_params {
            let bound = tp.bound.as_ref().map(|b| convert(&ctx_for_thunk, &cx_for_thunk, b, false));
            let param_id = ctx_for_thunk.type_parameter(&tp.name, bound);
            cx_for_thunk.declare(&tp.name, SymbolClass::TypeParameter(param_id));
        }
        let body_id = convert(&ctx_for_thunk, &cx_for_thunk, &decl_for_thunk.body, false);
        cx_for_thunk.pop_scope();
        body_id
    });

    Ok(ctx.declare(&decl.name, alias_id)?)
}

/// `FunctionTypeAnnotation` emission for a standalone function declaration
/// (`spec.md` §4.5): parameters are always flowable; the function's own
/// type parameters get a fresh scope.
///
/// A non-generic function emits a plain `function(...)` descriptor, callable
/// directly against `assertParams`/`assertReturn`. A generic function is
/// wrapped in `ctx.parametric(...)` instead: `assertParams`/`assertReturn`
/// only ever pattern-match a literal `Function` descriptor (`spec.md` §4.2
/// scope discipline), so a caller must instantiate a fresh call through
/// `ctx.unwrap(ctx.application(id, vec![]))` before each call's checkpoints
/// — every instantiation clones brand-new `TypeParameter` state, so two
/// calls to the same converted function never share a `recorded` flow
/// observation.
pub fn emit_function(ctx: &Rc<TypeContext>, cx: &ConversionContext, decl: &FunctionDecl) -> TypeId {
    if decl.type_params.is_empty() {
        cx.push_scope();
        let function_id = convert_function_type(ctx, cx, &decl.signature);
        cx.pop_scope();
        return function_id;
    }

    cx.push_scope();
    let placeholders: Vec<TypeId> = decl
        .type_params
        .iter()
        .map(|tp| {
            let bound = tp.bound.as_ref().map(|b| convert(ctx, cx, b, false));
            let param_id = ctx.type_parameter(&tp.name, bound);
            cx.declare(&tp.name, SymbolClass::TypeParameter(param_id));
            param_id
        })
        .collect();
    cx.pop_scope();

    let ctx_for_body = ctx.clone();
    let cx_for_body = cx.clone();
    let decl_for_body = decl.clone();
    ctx.parametric(placeholders, move |fresh| {
        cx_for_body.push_scope();
        for (tp, &fresh_id) in decl_for_body.type_params.iter().zip(fresh) {
            cx_for_body.declare(&tp.name, SymbolClass::TypeParameter(fresh_id));
        }
        let function_id = convert_function_type(&ctx_for_body, &cx_for_body, &decl_for_body.signature);
        cx_for_body.pop_scope();
        function_id
    })
}

/// `ClassDeclaration` emission (`spec.md` §4.5): `class("Name",
/// ...members)`, boxed as a thunk if parameterized or self-referential
/// (through a property/method type or a superclass reference).
///
/// The class's own name is registered in both the `TypeContext`'s
/// persisting name registry and the current (outer, persisting) lexical
/// scope before returning, so a later sibling declaration's `extends
/// ThisClass` resolves — whether through `cx.classify` (same program, same
/// `ConversionContext`) or through `ctx.ref_named`'s lazy registry lookup
/// (a different scope, or a class declared in a different order).
pub fn emit_class(ctx: &Rc<TypeContext>, cx: &ConversionContext, decl: &ClassDecl) -> Result<TypeId, ConvertError> {
    let self_referential = decl.properties.iter().any(|p| references_name(&p.type_annotation, &decl.name))
        || decl.methods.iter().any(|m| function_type_references(&m.signature, &decl.name));
    let needs_thunk = self_referential || !decl.type_params.is_empty();

    let id = if !needs_thunk {
        build_class_body(ctx, cx, decl, None)
    } else {
        let ctx_for_thunk = ctx.clone();
        let cx_for_thunk = cx.clone();
        let decl_for_thunk = decl.clone();
        ctx.boxed(move |self_id| build_class_body(&ctx_for_thunk, &cx_for_thunk, &decl_for_thunk, Some(self_id)))
    };

    ctx.declare(&decl.name, id)?;
    cx.declare(&decl.name, SymbolClass::TypeAlias(id));
    Ok(id)
}

fn build_class_body(
    ctx: &Rc<TypeContext>,
    cx: &ConversionContext,
    decl: &ClassDecl,
    self_id: Option<TypeId>,
) -> TypeId {
    cx.push_scope();
    if let Some(self_id) = self_id {
        cx.declare(&decl.name, SymbolClass::TypeAlias(self_id));
    }

    let storage = cx.alloc_class_storage();
    for tp in &decl.type_params {
        let bound = tp.bound.as_ref().map(|b| convert(ctx, cx, b, false));
        let param_id = ctx.type_parameter(&tp.name, bound);
        cx.declare(
            &tp.name,
            SymbolClass::ClassTypeParameter {
                type_id: param_id,
                uid: storage.type_parameters_uid,
            },
        );
    }

    let members = decl
        .properties
        .iter()
        .map(|p| ctx.property(&p.name, convert(ctx, cx, &p.type_annotation, true), p.optional))
        .chain(decl.methods.iter().map(|m| {
            let sig_id = convert_function_type(ctx, cx, &m.signature);
            ctx.method(&m.name, sig_id)
        }))
        .collect();
    let body = ctx.object(ObjectShape {
        members,
        ..Default::default()
    });

    let static_members = decl
        .static_properties
        .iter()
        .map(|p| ctx.static_property(&p.name, convert(ctx, cx, &p.type_annotation, false), p.optional))
        .chain(decl.static_methods.iter().map(|m| {
            let sig_id = convert_function_type(ctx, cx, &m.signature);
            ctx.static_method(&m.name, sig_id)
        }))
        .collect();
    let statics = ctx.object(ObjectShape {
        members: static_members,
        ..Default::default()
    });

    let supers = ctx.extends(decl.supers.iter().map(|name| convert_generic(ctx, cx, name, &[], false)));

    cx.pop_scope();
    ctx.class(&decl.name, body, statics, supers)
}

/// `DeclareFunction` emission — see the open-question note on
/// `DeclareFunctionDecl`: emits `declare(name, typeAnnotation)` directly.
pub fn emit_declare_function(
    ctx: &Rc<TypeContext>,
    cx: &ConversionContext,
    decl: &DeclareFunctionDecl,
) -> Result<TypeId, ConvertError> {
    let signature_id = convert_function_type(ctx, cx, &decl.signature);
    Ok(ctx.declare_ambient(&decl.name, signature_id)?)
}

/// `DeclareModule` emission (`spec.md` §4.5): `declare(module("name",
/// (libId) => { body }))`.
pub fn emit_declare_module(
    ctx: &Rc<TypeContext>,
    cx: &ConversionContext,
    decl: &DeclareModuleDecl,
) -> Result<TypeId, ConvertError> {
    let module_ctx = ctx.module(&decl.name);
    let exports: Vec<(String, TypeId)> = decl
        .exports
        .iter()
        .map(|(name, ann)| (name.clone(), convert(&module_ctx, cx, ann, false)))
        .collect();
    let surface = module_ctx.module_exports(exports);
    Ok(ctx.declare(&decl.name, surface)?)
}

/// Convert and emit every top-level declaration in `program`, in order.
pub fn emit_program(
    ctx: &Rc<TypeContext>,
    cx: &ConversionContext,
    program: &Program,
) -> Result<Vec<(String, TypeId)>, ConvertError> {
    let mut emitted = Vec::with_capacity(program.declarations.len());
    for decl in &program.declarations {
        match decl {
            Declaration::TypeAlias(alias) => {
                let id = emit_type_alias(ctx, cx, alias)?;
                emitted.push((alias.name.clone(), id));
            }
            Declaration::Function(func) => {
                let id = emit_function(ctx, cx, func);
                emitted.push((func.name.clone(), id));
            }
            Declaration::Class(class) => {
                let id = emit_class(ctx, cx, class)?;
                emitted.push((class.name.clone(), id));
            }
            Declaration::DeclareFunction(decl_fn) => {
                let id = emit_declare_function(ctx, cx, decl_fn)?;
                emitted.push((decl_fn.name.clone(), id));
            }
            Declaration::DeclareModule(decl_mod) => {
                let id = emit_declare_module(ctx, cx, decl_mod)?;
                emitted.push((decl_mod.name.clone(), id));
            }
        }
    }
    Ok(emitted)
}
