//! Pretty-printing of emitted descriptor-constructor expressions. A host
//! transformer would splice these strings into the source it rewrites; this
//! crate has no such host, so `render` exists purely for CLI/diagnostic
//! display of what `convert` built (`SPEC_FULL.md` §6).

use crate::ast::{
    ClassDecl, Declaration, DeclareFunctionDecl, DeclareModuleDecl, FunctionDecl,
    FunctionTypeAnnotation, ObjectMember, Program, TypeAliasDecl, TypeAnnotation, TypeParamDecl,
};

/// Render a single annotation node as the factory-method call it would
/// become (`spec.md` §6's vocabulary), without resolving names — this is a
/// syntactic rendering, not a semantic one; compare against
/// `TypeContext::to_string_of` for the resolved descriptor's own rendering.
pub fn render_annotation(annotation: &TypeAnnotation) -> String {
    match annotation {
        TypeAnnotation::Any => "any()".to_string(),
        TypeAnnotation::Mixed => "mixed()".to_string(),
        TypeAnnotation::Existential => "existential()".to_string(),
        TypeAnnotation::Empty => "empty()".to_string(),
        TypeAnnotation::Void => "void_()".to_string(),
        TypeAnnotation::NullLiteral => "null_()".to_string(),
        TypeAnnotation::Number => "number()".to_string(),
        TypeAnnotation::NumberLiteral(n) => format!("number({n})"),
        TypeAnnotation::String => "string()".to_string(),
        TypeAnnotation::StringLiteral(s) => format!("string({s:?})"),
        TypeAnnotation::Boolean => "boolean()".to_string(),
        TypeAnnotation::BooleanLiteral(b) => format!("boolean({b})"),
        TypeAnnotation::Symbol => "symbol()".to_string(),
        TypeAnnotation::Nullable(inner) => format!("nullable({})", render_annotation(inner)),
        TypeAnnotation::Tuple(elems) => format!("tuple({})", render_list(elems)),
        TypeAnnotation::Union(members) => format!("union({})", render_list(members)),
        TypeAnnotation::Intersection(members) => format!("intersection({})", render_list(members)),
        TypeAnnotation::Object(obj) => render_object(obj),
        TypeAnnotation::Function(sig) => render_function(sig),
        TypeAnnotation::Generic { name, args } if args.is_empty() => name.clone(),
        TypeAnnotation::Generic { name, args } => format!("{name}<{}>", render_list(args)),
        TypeAnnotation::Typeof(expr) => format!("typeOf({expr})"),
        TypeAnnotation::Other(label) => format!("/* unrecognized: {label} */ any()"),
    }
}

fn render_list(items: &[TypeAnnotation]) -> String {
    items.iter().map(render_annotation).collect::<Vec<_>>().join(", ")
}

fn render_object(obj: &crate::ast::ObjectTypeAnnotation) -> String {
    let mut members: Vec<String> = obj
        .members
        .iter()
        .map(|m| match m {
            ObjectMember::Property {
                name,
                type_annotation,
                optional,
            } => format!(
                "property({name:?}, {}{})",
                render_annotation(type_annotation),
                if *optional { ", optional" } else { "" }
            ),
            ObjectMember::Method { name, signature, .. } => {
                format!("method({name:?}, {})", render_function(signature))
            }
        })
        .collect();
    if let Some(value_ty) = &obj.string_index {
        members.push(format!("indexer(string, {})", render_annotation(value_ty)));
    }
    if let Some(value_ty) = &obj.number_index {
        members.push(format!("indexer(number, {})", render_annotation(value_ty)));
    }
    if let Some(sig) = &obj.call_signature {
        members.push(format!("callProperty({})", render_function(sig)));
    }
    let ctor = if obj.exact { "exactObject" } else { "object" };
    format!("{ctor}({})", members.join(", "))
}

fn render_function(sig: &FunctionTypeAnnotation) -> String {
    let mut parts: Vec<String> = sig
        .params
        .iter()
        .map(|p| {
            format!(
                "param({:?}, {}{})",
                p.name,
                render_annotation(&p.type_annotation),
                if p.optional { ", optional" } else { "" }
            )
        })
        .collect();
    if let Some(rest) = &sig.rest {
        parts.push(format!("rest({})", render_annotation(rest)));
    }
    if let Some(ret) = &sig.return_type {
        parts.push(format!("return_({})", render_annotation(ret)));
    }
    format!("function({})", parts.join(", "))
}

fn render_type_params(type_params: &[TypeParamDecl]) -> String {
    type_params
        .iter()
        .map(|tp| match &tp.bound {
            Some(bound) => format!("typeParameter({:?}, {})", tp.name, render_annotation(bound)),
            None => format!("typeParameter({:?})", tp.name),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_type_alias(decl: &TypeAliasDecl) -> String {
    let ctor = if decl.is_interface { "interface" } else { "type" };
    let body = format!("{ctor}({:?}, {})", decl.name, render_annotation(&decl.body));
    if decl.type_params.is_empty() {
        format!("const {} = {body}", decl.name)
    } else {
        format!(
            "const {} = box(self => {{ /* {} */ {body} }})",
            decl.name,
            render_type_params(&decl.type_params)
        )
    }
}

fn render_function_decl(decl: &FunctionDecl) -> String {
    format!("const {} = {}", decl.name, render_function(&decl.signature))
}

fn render_class(decl: &ClassDecl) -> String {
    let mut members: Vec<String> = decl
        .properties
        .iter()
        .map(|p| format!("property({:?}, {})", p.name, render_annotation(&p.type_annotation)))
        .collect();
    members.extend(decl.methods.iter().map(|m| format!("method({:?}, {})", m.name, render_function(&m.signature))));
    members.extend(
        decl.static_properties
            .iter()
            .map(|p| format!("staticProperty({:?}, {})", p.name, render_annotation(&p.type_annotation))),
    );
    members.extend(
        decl.static_methods
            .iter()
            .map(|m| format!("staticMethod({:?}, {})", m.name, render_function(&m.signature))),
    );
    let supers = if decl.supers.is_empty() {
        String::new()
    } else {
        format!(", extends({})", decl.supers.join(", "))
    };
    format!("const {} = class({:?}, {}{supers})", decl.name, decl.name, members.join(", "))
}

fn render_declare_function(decl: &DeclareFunctionDecl) -> String {
    format!("declare({:?}, {})", decl.name, render_function(&decl.signature))
}

fn render_declare_module(decl: &DeclareModuleDecl) -> String {
    let exports = decl
        .exports
        .iter()
        .map(|(name, ann)| format!("{name:?}: {}", render_annotation(ann)))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "declare(module({:?}, libId => moduleExports({{ {exports} }})))",
        decl.name
    )
}

/// Render every top-level declaration in source order, one line each.
pub fn render_program(program: &Program) -> String {
    program
        .declarations
        .iter()
        .map(|decl| match decl {
            Declaration::TypeAlias(alias) => render_type_alias(alias),
            Declaration::Function(func) => render_function_decl(func),
            Declaration::Class(class) => render_class(class),
            Declaration::DeclareFunction(decl_fn) => render_declare_function(decl_fn),
            Declaration::DeclareModule(decl_mod) => render_declare_module(decl_mod),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
