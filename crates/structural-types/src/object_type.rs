//! Object-shape checking: member presence/optionality, index signatures,
//! call signatures, and `exactObject`'s closed-world check
//! (`spec.md` §4.1).

use crate::context::TypeContext;
use crate::descriptor::{ClassShape, ObjectShape};
use crate::validation::{PathSegment, Validation};
use crate::value::Value;

impl TypeContext {
    pub(crate) fn collect_object_errors(
        &self,
        shape: &ObjectShape,
        validation: &mut Validation,
        path: &mut Vec<PathSegment>,
        value: &Value,
        depth: u32,
    ) -> bool {
        if value.is_null_or_undefined() || value.own_keys().is_none() {
            validation.fail(path, "an object", self.describe_value(value));
            return true;
        }

        let mut failed = false;

        for member in &shape.members {
            let name = self.resolve_atom(member.name());
            path.push(PathSegment::Property(name.clone()));
            match value.get_property(&name) {
                Some(v) => {
                    if self.collect_errors_inner(member.type_id(), validation, path, v, depth + 1) {
                        failed = true;
                    }
                }
                None => {
                    if !member.is_optional() {
                        validation.fail(path, self.to_string_of(member.type_id()), "missing property");
                        failed = true;
                    }
                }
            }
            path.pop();
        }

        let own_keys = value.own_keys().unwrap_or_default();

        if let Some(sig) = &shape.string_index {
            for key in &own_keys {
                path.push(PathSegment::Property(key.to_string()));
                if let Some(v) = value.get_property(key) {
                    if self.collect_errors_inner(sig.value_type, validation, path, v, depth + 1) {
                        failed = true;
                    }
                }
                path.pop();
            }
        }

        if let Some(sig) = &shape.number_index {
            for key in &own_keys {
                if key.parse::<f64>().is_err() {
                    continue;
                }
                path.push(PathSegment::Property(key.to_string()));
                if let Some(v) = value.get_property(key) {
                    if self.collect_errors_inner(sig.value_type, validation, path, v, depth + 1) {
                        failed = true;
                    }
                }
                path.pop();
            }
        }

        if let Some(call_sig) = shape.call_property {
            if !value.is_callable() {
                let _ = call_sig; // callability is shape-independent; signature is advisory.
                validation.fail(path, "a callable object", self.describe_value(value));
                failed = true;
            }
        }

        if shape.exact {
            let declared: std::collections::HashSet<String> = shape
                .members
                .iter()
                .map(|m| self.resolve_atom(m.name()))
                .collect();
            for key in &own_keys {
                if !declared.contains(key.as_ref()) {
                    path.push(PathSegment::Property(key.to_string()));
                    validation.fail(path, "no additional properties", "an unexpected own property");
                    path.pop();
                    failed = true;
                }
            }
        }

        failed
    }

    /// Structural subtyping used by `acceptsType`: every non-optional
    /// member of `self` must have a same-named, `acceptsType`-compatible
    /// member in `other`; an optional member may be absent.
    pub(crate) fn object_accepts_type(&self, shape: &ObjectShape, other: &ObjectShape) -> bool {
        shape.members.iter().all(|member| {
            let name = member.name();
            match other.members.iter().find(|m| m.name() == name) {
                Some(other_member) => self.accepts_type(member.type_id(), other_member.type_id()),
                None => member.is_optional(),
            }
        })
    }

    /// Whether `other`'s nominal chain includes `self_name`, either
    /// directly or via its declared `supers`. A super entry is almost
    /// always a `ref` (the superclass is declared elsewhere, possibly not
    /// yet resolved at the point this class was emitted), so each one is
    /// unwrapped before the `Class` match.
    pub(crate) fn class_descriptor_is_subtype(&self, self_name: structural_common::Atom, other: &ClassShape) -> bool {
        if other.name == self_name {
            return true;
        }
        other.supers.iter().any(|&super_id| {
            let super_id = self.unwrap(super_id);
            matches!(self.engine.get(super_id), crate::descriptor::DescriptorData::Class(ref sc) if self.class_descriptor_is_subtype(self_name, sc))
        })
    }
}
