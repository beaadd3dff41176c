//! The top-level dispatch table: `accepts`, `collectErrors`,
//! `acceptsType`, and `toString`, each a match over `DescriptorData`
//! (`spec.md` §3/§4.1/§7).

use structural_common::limits::MAX_CHECK_DEPTH;

use crate::context::TypeContext;
use crate::descriptor::{DescriptorData, Literal, TypeId};
use crate::validation::{PathSegment, Validation};
use crate::value::Value;

impl TypeContext {
    /// `accepts(value) -> bool`, defined per `spec.md` §7's universal law:
    /// `accepts(v) ≡ !collectErrors(emptyValidation, [], v)`.
    pub fn accepts(&self, id: TypeId, value: &Value) -> bool {
        let mut validation = Validation::new();
        !self.collect_errors(id, &mut validation, &mut Vec::new(), value)
    }

    /// `collectErrors` — returns whether the value failed, recording every
    /// mismatch found along the way into `validation`.
    pub fn collect_errors(
        &self,
        id: TypeId,
        validation: &mut Validation,
        path: &mut Vec<PathSegment>,
        value: &Value,
    ) -> bool {
        self.collect_errors_inner(id, validation, path, value, 0)
    }

    pub(crate) fn collect_errors_inner(
        &self,
        id: TypeId,
        validation: &mut Validation,
        path: &mut Vec<PathSegment>,
        value: &Value,
        depth: u32,
    ) -> bool {
        if depth > MAX_CHECK_DEPTH {
            validation.fail(path, "a non-cyclic type", "a value nested too deeply to check");
            return true;
        }

        match self.engine.get(id) {
            DescriptorData::Any | DescriptorData::Mixed | DescriptorData::Existential => false,

            DescriptorData::Empty => {
                validation.fail(path, "empty (no value satisfies this)", self.describe_value(value));
                true
            }

            DescriptorData::Void => {
                if matches!(value, Value::Undefined) {
                    false
                } else {
                    validation.fail(path, "void", self.describe_value(value));
                    true
                }
            }

            DescriptorData::Null => {
                if matches!(value, Value::Null) {
                    false
                } else {
                    validation.fail(path, "null", self.describe_value(value));
                    true
                }
            }

            DescriptorData::Symbol => {
                if matches!(value, Value::Symbol(_)) {
                    false
                } else {
                    validation.fail(path, "symbol", self.describe_value(value));
                    true
                }
            }

            DescriptorData::Number(literal) => match value {
                Value::Number(n) if matches_literal_number(&literal, *n) => false,
                _ => {
                    validation.fail(path, describe_primitive("number", &literal), self.describe_value(value));
                    true
                }
            },

            DescriptorData::StringType(literal) => match value {
                Value::String(s) if matches_literal_string(&literal, s) => false,
                _ => {
                    validation.fail(path, describe_primitive("string", &literal), self.describe_value(value));
                    true
                }
            },

            DescriptorData::Boolean(literal) => match value {
                Value::Bool(b) if matches_literal_bool(&literal, *b) => false,
                _ => {
                    validation.fail(path, describe_primitive("boolean", &literal), self.describe_value(value));
                    true
                }
            },

            DescriptorData::Nullable(inner) => {
                if value.is_null_or_undefined() {
                    false
                } else {
                    self.collect_errors_inner(inner, validation, path, value, depth + 1)
                }
            }

            DescriptorData::Array(elem) => match value.as_sequence() {
                Some(items) => {
                    let mut failed = false;
                    for (i, item) in items.iter().enumerate() {
                        path.push(PathSegment::Index(i));
                        if self.collect_errors_inner(elem, validation, path, item, depth + 1) {
                            failed = true;
                        }
                        path.pop();
                    }
                    failed
                }
                None => {
                    validation.fail(path, "an array", self.describe_value(value));
                    true
                }
            },

            DescriptorData::Tuple(elems) => match value.as_sequence() {
                Some(items) if items.len() >= elems.len() => {
                    let mut failed = false;
                    for (i, elem_ty) in elems.iter().enumerate() {
                        path.push(PathSegment::Index(i));
                        if self.collect_errors_inner(*elem_ty, validation, path, &items[i], depth + 1) {
                            failed = true;
                        }
                        path.pop();
                    }
                    failed
                }
                _ => {
                    validation.fail(
                        path,
                        format!("a tuple of length >= {}", elems.len()),
                        self.describe_value(value),
                    );
                    true
                }
            },

            DescriptorData::Object(shape) => self.collect_object_errors(&shape, validation, path, value, depth),

            DescriptorData::Function(_) => {
                if value.is_callable() {
                    false
                } else {
                    validation.fail(path, "a function", self.describe_value(value));
                    true
                }
            }

            DescriptorData::Union(members) => {
                if members.is_empty() {
                    validation.fail(path, "(empty union, accepts nothing)", self.describe_value(value));
                    return true;
                }
                for member in &members {
                    let mut scratch = Validation::new();
                    let mut scratch_path = path.clone();
                    if !self.collect_errors_inner(*member, &mut scratch, &mut scratch_path, value, depth + 1) {
                        return false;
                    }
                }
                validation.fail(path, self.to_string_of(id), self.describe_value(value));
                true
            }

            DescriptorData::Intersection(members) => {
                if members.is_empty() {
                    return false;
                }
                for member in &members {
                    if self.collect_errors_inner(*member, validation, path, value, depth + 1) {
                        return true;
                    }
                }
                false
            }

            DescriptorData::Ref { target, instances } => {
                let resolved = self.resolve_ref(&target, &instances);
                self.collect_errors_inner(resolved, validation, path, value, depth + 1)
            }

            DescriptorData::Class(shape) => {
                let name = self.resolve_atom(shape.name);
                if !value.is_instance_of(&name) {
                    validation.fail(path, format!("an instance of {name}"), self.describe_value(value));
                    return true;
                }
                self.collect_errors_inner(shape.body, validation, path, value, depth + 1)
            }

            DescriptorData::Nominal(name_atom) => {
                let name = self.resolve_atom(name_atom);
                match self.lookup_predicate(&name) {
                    Some(predicate) => {
                        if predicate(value) {
                            false
                        } else {
                            validation.fail(path, name, self.describe_value(value));
                            true
                        }
                    }
                    None => {
                        validation.fail(path, format!("registered predicate `{name}`"), "no predicate registered");
                        true
                    }
                }
            }

            DescriptorData::TypeOf(inferred) => self.collect_errors_inner(inferred, validation, path, value, depth + 1),

            DescriptorData::TypeParameter(cell) => {
                self.collect_type_parameter_errors(&cell, validation, path, value, depth)
            }

            DescriptorData::FlowInto(param) => self.collect_flow_into_errors(param, validation, path, value, depth),

            // A bare, uninstantiated generic body accepts defensively —
            // there is no concrete shape yet to check against.
            DescriptorData::Parametric { .. } => false,

            DescriptorData::Application { .. } => {
                let resolved = self.materialize(id);
                self.collect_errors_inner(resolved, validation, path, value, depth + 1)
            }

            DescriptorData::Box(cell) => {
                let resolved = self.resolve_box(id, &cell);
                self.collect_errors_inner(resolved, validation, path, value, depth + 1)
            }
        }
    }

    /// `acceptsType(other) -> bool`: a structural subtype check between two
    /// descriptors, used internally by union normalization and by hosts
    /// that want to compare annotations without a sample value.
    pub fn accepts_type(&self, id: TypeId, other: TypeId) -> bool {
        if id == other {
            return true;
        }

        match self.engine.get(id) {
            DescriptorData::Any | DescriptorData::Mixed | DescriptorData::Existential => true,
            DescriptorData::Empty => false,

            DescriptorData::Union(members) => members.iter().any(|&m| self.accepts_type(m, other)),
            DescriptorData::Intersection(members) => members.iter().all(|&m| self.accepts_type(m, other)),

            DescriptorData::Nullable(inner) => {
                matches!(self.engine.get(other), DescriptorData::Null | DescriptorData::Void)
                    || self.accepts_type(inner, other)
            }

            DescriptorData::Ref { target, instances } => {
                let resolved = self.resolve_ref(&target, &instances);
                self.accepts_type(resolved, other)
            }
            DescriptorData::TypeOf(inner) => self.accepts_type(inner, other),
            DescriptorData::Box(cell) => {
                let resolved = self.resolve_box(id, &cell);
                self.accepts_type(resolved, other)
            }
            DescriptorData::Application { .. } => {
                let resolved = self.materialize(id);
                self.accepts_type(resolved, other)
            }
            DescriptorData::FlowInto(param) => self.accepts_type(param, other),

            DescriptorData::TypeParameter(cell) => {
                let state = cell.borrow().clone();
                if let Some(delegate) = state.delegate {
                    self.accepts_type(delegate, other)
                } else if let Some(recorded) = state.recorded {
                    self.accepts_type(recorded, other)
                } else {
                    false
                }
            }

            DescriptorData::Number(lit) => {
                matches!(self.engine.get(other), DescriptorData::Number(olit) if lit.is_none() || olit == lit)
            }
            DescriptorData::StringType(lit) => {
                matches!(self.engine.get(other), DescriptorData::StringType(olit) if lit.is_none() || olit == lit)
            }
            DescriptorData::Boolean(lit) => {
                matches!(self.engine.get(other), DescriptorData::Boolean(olit) if lit.is_none() || olit == lit)
            }
            DescriptorData::Symbol => matches!(self.engine.get(other), DescriptorData::Symbol),
            DescriptorData::Void => matches!(self.engine.get(other), DescriptorData::Void),
            DescriptorData::Null => matches!(self.engine.get(other), DescriptorData::Null),

            DescriptorData::Array(elem) => match self.engine.get(other) {
                DescriptorData::Array(oelem) => self.accepts_type(elem, oelem),
                _ => false,
            },

            DescriptorData::Tuple(elems) => match self.engine.get(other) {
                DescriptorData::Tuple(oelems) if oelems.len() >= elems.len() => elems
                    .iter()
                    .zip(oelems.iter())
                    .all(|(&a, &b)| self.accepts_type(a, b)),
                _ => false,
            },

            DescriptorData::Object(shape) => match self.engine.get(other) {
                DescriptorData::Object(oshape) => self.object_accepts_type(&shape, &oshape),
                _ => false,
            },

            DescriptorData::Function(_) => matches!(self.engine.get(other), DescriptorData::Function(_)),

            DescriptorData::Class(shape) => match self.engine.get(other) {
                DescriptorData::Class(oshape) => self.class_descriptor_is_subtype(shape.name, &oshape),
                _ => false,
            },

            DescriptorData::Nominal(name) => {
                matches!(self.engine.get(other), DescriptorData::Nominal(oname) if oname == name)
            }

            DescriptorData::Parametric { .. } => false,
        }
    }

    /// An informational rendering of a descriptor, e.g. `number | string`
    /// or `{ name: string, age: number }`. Not parsed back; purely for
    /// diagnostics (`spec.md` §7).
    pub fn to_string_of(&self, id: TypeId) -> String {
        match self.engine.get(id) {
            DescriptorData::Any => "any".to_string(),
            DescriptorData::Mixed => "mixed".to_string(),
            DescriptorData::Existential => "*".to_string(),
            DescriptorData::Empty => "empty".to_string(),
            DescriptorData::Void => "void".to_string(),
            DescriptorData::Null => "null".to_string(),
            DescriptorData::Symbol => "symbol".to_string(),

            DescriptorData::Number(None) => "number".to_string(),
            DescriptorData::Number(Some(Literal::Number(n))) => n.to_string(),
            DescriptorData::Number(Some(_)) => unreachable!("Number literal must be Literal::Number"),

            DescriptorData::StringType(None) => "string".to_string(),
            DescriptorData::StringType(Some(Literal::String(s))) => format!("\"{s}\""),
            DescriptorData::StringType(Some(_)) => unreachable!("StringType literal must be Literal::String"),

            DescriptorData::Boolean(None) => "boolean".to_string(),
            DescriptorData::Boolean(Some(Literal::Bool(b))) => b.to_string(),
            DescriptorData::Boolean(Some(_)) => unreachable!("Boolean literal must be Literal::Bool"),

            DescriptorData::Nullable(inner) => format!("?{}", self.to_string_of(inner)),
            DescriptorData::Array(elem) => format!("Array<{}>", self.to_string_of(elem)),
            DescriptorData::Tuple(elems) => format!(
                "[{}]",
                elems.iter().map(|&e| self.to_string_of(e)).collect::<Vec<_>>().join(", ")
            ),

            DescriptorData::Object(shape) => self.object_to_string(&shape),
            DescriptorData::Function(shape) => self.function_to_string(&shape),

            DescriptorData::Union(members) => members
                .iter()
                .map(|&m| self.to_string_of(m))
                .collect::<Vec<_>>()
                .join(" | "),
            DescriptorData::Intersection(members) => members
                .iter()
                .map(|&m| self.to_string_of(m))
                .collect::<Vec<_>>()
                .join(" & "),

            DescriptorData::Ref { target, instances } => {
                let base_name = match target {
                    crate::descriptor::RefTarget::Named(atom) => self.resolve_atom(atom),
                    crate::descriptor::RefTarget::Direct(id) => self.to_string_of(id),
                };
                if instances.is_empty() {
                    base_name
                } else {
                    format!(
                        "{base_name}<{}>",
                        instances.iter().map(|&i| self.to_string_of(i)).collect::<Vec<_>>().join(", ")
                    )
                }
            }

            DescriptorData::Class(shape) => self.resolve_atom(shape.name),
            DescriptorData::Nominal(name) => self.resolve_atom(name),
            DescriptorData::TypeOf(inner) => format!("typeof({})", self.to_string_of(inner)),
            DescriptorData::TypeParameter(cell) => self.resolve_atom(cell.borrow().id),
            DescriptorData::FlowInto(param) => self.to_string_of(param),

            DescriptorData::Parametric { params, .. } => format!(
                "<{}>",
                params.iter().map(|&p| self.to_string_of(p)).collect::<Vec<_>>().join(", ")
            ),
            DescriptorData::Application { base, args, .. } => format!(
                "{}<{}>",
                self.to_string_of(base),
                args.iter().map(|&a| self.to_string_of(a)).collect::<Vec<_>>().join(", ")
            ),

            DescriptorData::Box(cell) => match &*cell.borrow() {
                crate::descriptor::BoxState::Resolved(id) => self.to_string_of(*id),
                crate::descriptor::BoxState::Pending(_) => "<recursive>".to_string(),
            },
        }
    }

    fn object_to_string(&self, shape: &crate::descriptor::ObjectShape) -> String {
        let mut parts: Vec<String> = shape
            .members
            .iter()
            .map(|m| {
                let name = self.resolve_atom(m.name());
                let optional = if m.is_optional() { "?" } else { "" };
                format!("{name}{optional}: {}", self.to_string_of(m.type_id()))
            })
            .collect();
        if let Some(sig) = &shape.string_index {
            parts.push(format!("[string]: {}", self.to_string_of(sig.value_type)));
        }
        if let Some(sig) = &shape.number_index {
            parts.push(format!("[number]: {}", self.to_string_of(sig.value_type)));
        }
        let braces = if shape.exact { ("{|", "|}") } else { ("{", "}") };
        format!("{} {} {}", braces.0, parts.join(", "), braces.1)
    }

    fn function_to_string(&self, shape: &crate::descriptor::FunctionShape) -> String {
        let mut params: Vec<String> = shape
            .params
            .iter()
            .map(|p| {
                let name = self.resolve_atom(p.name);
                let optional = if p.optional { "?" } else { "" };
                format!("{name}{optional}: {}", self.to_string_of(p.type_id))
            })
            .collect();
        if let Some(rest) = shape.rest {
            params.push(format!("...rest: {}", self.to_string_of(rest)));
        }
        let ret = shape
            .return_type
            .map(|r| self.to_string_of(r))
            .unwrap_or_else(|| "void".to_string());
        format!("({}) => {}", params.join(", "), ret)
    }
}

fn matches_literal_number(literal: &Option<Literal>, n: f64) -> bool {
    match literal {
        None => true,
        Some(Literal::Number(expected)) => *expected == n,
        Some(_) => false,
    }
}

fn matches_literal_string(literal: &Option<Literal>, s: &str) -> bool {
    match literal {
        None => true,
        Some(Literal::String(expected)) => expected.as_ref() == s,
        Some(_) => false,
    }
}

fn matches_literal_bool(literal: &Option<Literal>, b: bool) -> bool {
    match literal {
        None => true,
        Some(Literal::Bool(expected)) => *expected == b,
        Some(_) => false,
    }
}

fn describe_primitive(kind: &str, literal: &Option<Literal>) -> String {
    match literal {
        None => kind.to_string(),
        Some(Literal::Number(n)) => n.to_string(),
        Some(Literal::String(s)) => format!("\"{s}\""),
        Some(Literal::Bool(b)) => b.to_string(),
    }
}
