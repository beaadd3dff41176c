//! `toJSON() -> tree` (`spec.md` §6): a serializable rendering of a
//! descriptor, structurally mirroring `to_string_of` but as a JSON tree
//! instead of flattened text — useful for hosts that want to inspect a
//! descriptor graph programmatically (a language server's hover info, a
//! snapshot test) rather than just display it.

use serde_json::{json, Value as Json};

use crate::context::TypeContext;
use crate::descriptor::{BoxState, DescriptorData, Literal, RefTarget, TypeId};

impl TypeContext {
    /// Serialize the descriptor at `id` into a JSON tree. Cyclic graphs
    /// (`box`-thunked aliases) render their resolved target by `TypeId`
    /// rather than re-descending, so this always terminates.
    pub fn to_json(&self, id: TypeId) -> Json {
        self.to_json_depth(id, 0)
    }

    fn to_json_depth(&self, id: TypeId, depth: u32) -> Json {
        if depth > structural_common::limits::MAX_UNWRAP_DEPTH {
            return json!({ "kind": "recursive", "id": id.0 });
        }

        match self.engine.get(id) {
            DescriptorData::Any => json!({ "kind": "any" }),
            DescriptorData::Mixed => json!({ "kind": "mixed" }),
            DescriptorData::Existential => json!({ "kind": "existential" }),
            DescriptorData::Empty => json!({ "kind": "empty" }),
            DescriptorData::Void => json!({ "kind": "void" }),
            DescriptorData::Null => json!({ "kind": "null" }),
            DescriptorData::Symbol => json!({ "kind": "symbol" }),

            DescriptorData::Number(literal) => json!({
                "kind": "number",
                "literal": literal_json(&literal),
            }),
            DescriptorData::StringType(literal) => json!({
                "kind": "string",
                "literal": literal_json(&literal),
            }),
            DescriptorData::Boolean(literal) => json!({
                "kind": "boolean",
                "literal": literal_json(&literal),
            }),

            DescriptorData::Nullable(inner) => json!({
                "kind": "nullable",
                "inner": self.to_json_depth(inner, depth + 1),
            }),
            DescriptorData::Array(elem) => json!({
                "kind": "array",
                "element": self.to_json_depth(elem, depth + 1),
            }),
            DescriptorData::Tuple(elems) => json!({
                "kind": "tuple",
                "elements": elems.iter().map(|&e| self.to_json_depth(e, depth + 1)).collect::<Vec<_>>(),
            }),

            DescriptorData::Object(shape) => {
                let members = shape
                    .members
                    .iter()
                    .map(|m| {
                        json!({
                            "name": self.resolve_atom(m.name()),
                            "optional": m.is_optional(),
                            "type": self.to_json_depth(m.type_id(), depth + 1),
                        })
                    })
                    .collect::<Vec<_>>();
                json!({
                    "kind": "object",
                    "exact": shape.exact,
                    "members": members,
                    "stringIndex": shape.string_index.as_ref().map(|s| self.to_json_depth(s.value_type, depth + 1)),
                    "numberIndex": shape.number_index.as_ref().map(|s| self.to_json_depth(s.value_type, depth + 1)),
                    "callProperty": shape.call_property.map(|c| self.to_json_depth(c, depth + 1)),
                })
            }

            DescriptorData::Function(shape) => {
                let params = shape
                    .params
                    .iter()
                    .map(|p| {
                        json!({
                            "name": self.resolve_atom(p.name),
                            "optional": p.optional,
                            "type": self.to_json_depth(p.type_id, depth + 1),
                        })
                    })
                    .collect::<Vec<_>>();
                json!({
                    "kind": "function",
                    "params": params,
                    "rest": shape.rest.map(|r| self.to_json_depth(r, depth + 1)),
                    "returnType": shape.return_type.map(|r| self.to_json_depth(r, depth + 1)),
                })
            }

            DescriptorData::Union(members) => json!({
                "kind": "union",
                "members": members.iter().map(|&m| self.to_json_depth(m, depth + 1)).collect::<Vec<_>>(),
            }),
            DescriptorData::Intersection(members) => json!({
                "kind": "intersection",
                "members": members.iter().map(|&m| self.to_json_depth(m, depth + 1)).collect::<Vec<_>>(),
            }),

            DescriptorData::Ref { target, instances } => json!({
                "kind": "ref",
                "target": match target {
                    RefTarget::Named(atom) => json!({ "named": self.resolve_atom(atom) }),
                    RefTarget::Direct(id) => json!({ "direct": self.to_json_depth(id, depth + 1) }),
                },
                "instances": instances.iter().map(|&i| self.to_json_depth(i, depth + 1)).collect::<Vec<_>>(),
            }),

            DescriptorData::Class(shape) => json!({
                "kind": "class",
                "name": self.resolve_atom(shape.name),
                "body": self.to_json_depth(shape.body, depth + 1),
                "statics": self.to_json_depth(shape.statics, depth + 1),
                "supers": shape.supers.iter().map(|&s| self.to_json_depth(s, depth + 1)).collect::<Vec<_>>(),
            }),

            DescriptorData::Nominal(name) => json!({
                "kind": "nominal",
                "name": self.resolve_atom(name),
            }),
            DescriptorData::TypeOf(inner) => json!({
                "kind": "typeof",
                "inferred": self.to_json_depth(inner, depth + 1),
            }),
            DescriptorData::TypeParameter(cell) => {
                let state = cell.borrow();
                json!({
                    "kind": "typeParameter",
                    "name": self.resolve_atom(state.id),
                    "bound": state.bound.map(|b| self.to_json_depth(b, depth + 1)),
                    "recorded": state.recorded.map(|r| self.to_json_depth(r, depth + 1)),
                })
            }
            DescriptorData::FlowInto(param) => json!({
                "kind": "flowInto",
                "param": self.to_json_depth(param, depth + 1),
            }),

            DescriptorData::Parametric { params, .. } => json!({
                "kind": "parametric",
                "params": params.iter().map(|&p| self.to_json_depth(p, depth + 1)).collect::<Vec<_>>(),
            }),
            DescriptorData::Application { base, args, .. } => json!({
                "kind": "application",
                "base": self.to_json_depth(base, depth + 1),
                "args": args.iter().map(|&a| self.to_json_depth(a, depth + 1)).collect::<Vec<_>>(),
            }),

            DescriptorData::Box(cell) => match &*cell.borrow() {
                BoxState::Resolved(inner) => self.to_json_depth(*inner, depth + 1),
                BoxState::Pending(_) => json!({ "kind": "box", "resolved": false }),
            },
        }
    }
}

fn literal_json(literal: &Option<Literal>) -> Json {
    match literal {
        None => Json::Null,
        Some(Literal::Number(n)) => json!(n),
        Some(Literal::String(s)) => json!(s.as_ref()),
        Some(Literal::Bool(b)) => json!(b),
    }
}
