//! `TypeParameter` and `flowInto` dispatch — the five-rule ordering and
//! the monotonic-widening union from `spec.md` §4.2.

use std::collections::HashSet;

use crate::context::TypeContext;
use crate::descriptor::{DescriptorData, TypeId, TypeParamState};
use crate::validation::{PathSegment, Validation};
use crate::value::Value;

impl TypeContext {
    /// `TypeParameter.collectErrors` — the five-rule ordering:
    /// 1. a `delegate` is set: forward unconditionally.
    /// 2. otherwise, `recorded` is set: compare against it.
    /// 3. otherwise, `bound` is `any`-like: accept, record nothing.
    /// 4. otherwise, `bound` is set and rejects: reject.
    /// 5. otherwise (no bound, or bound accepted): record `typeOf(value)`
    ///    and accept.
    pub(crate) fn collect_type_parameter_errors(
        &self,
        cell: &std::cell::RefCell<TypeParamState>,
        validation: &mut Validation,
        path: &mut Vec<PathSegment>,
        value: &Value,
        depth: u32,
    ) -> bool {
        let state = cell.borrow().clone();

        if let Some(delegate) = state.delegate {
            return self.collect_errors_inner(delegate, validation, path, value, depth + 1);
        }

        if let Some(recorded) = state.recorded {
            return self.collect_errors_inner(recorded, validation, path, value, depth + 1);
        }

        if let Some(bound) = state.bound {
            if self.is_any_like(bound) {
                return false;
            }
            let mut scratch = Validation::new();
            let mut scratch_path = path.clone();
            if self.collect_errors_inner(bound, &mut scratch, &mut scratch_path, value, depth + 1) {
                validation.fail(path, self.to_string_of(bound), self.describe_value(value));
                return true;
            }
        }

        let inferred = self.infer_shape(value);
        cell.borrow_mut().recorded = Some(inferred);
        false
    }

    /// `FlowInto(param).collectErrors` — honors `param`'s bound as a gate,
    /// then widens `param`'s `recorded` shape to cover `value` (monotonic:
    /// it only ever grows the recorded union, never narrows it).
    pub(crate) fn collect_flow_into_errors(
        &self,
        param: TypeId,
        validation: &mut Validation,
        path: &mut Vec<PathSegment>,
        value: &Value,
        depth: u32,
    ) -> bool {
        let (target, bound) = match self.engine.get(param) {
            DescriptorData::TypeParameter(cell) => {
                let state = cell.borrow().clone();
                match state.delegate {
                    Some(delegate) => {
                        let delegate_bound = match self.engine.get(delegate) {
                            DescriptorData::TypeParameter(dc) => dc.borrow().bound,
                            _ => None,
                        };
                        (delegate, delegate_bound)
                    }
                    None => (param, state.bound),
                }
            }
            // A FlowInto wrapping something other than a TypeParameter is a
            // converter bug; degrade to a plain `accepts` check rather than
            // panicking on a value at runtime.
            _ => return self.collect_errors_inner(param, validation, path, value, depth + 1),
        };

        if let Some(bound) = bound {
            if !self.is_any_like(bound) {
                let mut scratch = Validation::new();
                let mut scratch_path = path.clone();
                if self.collect_errors_inner(bound, &mut scratch, &mut scratch_path, value, depth + 1) {
                    validation.fail(path, self.to_string_of(bound), self.describe_value(value));
                    return true;
                }
            }
        }

        let sample = self.infer_shape(value);
        self.widen_recorded(target, sample);
        false
    }

    /// Widen `target`'s recorded shape to additionally cover `sample`,
    /// unless it already does.
    pub(crate) fn widen_recorded(&self, target: TypeId, sample: TypeId) {
        let existing = self.engine.with_type_param(target, |cell| cell.borrow().recorded);
        let new_recorded = match existing {
            None => sample,
            Some(existing_id) => {
                if self.accepts_type(existing_id, sample) {
                    existing_id
                } else {
                    self.normalize_union(vec![existing_id, sample])
                }
            }
        };
        self.engine.with_type_param(target, |cell| {
            cell.borrow_mut().recorded = Some(new_recorded);
        });
    }

    /// Flatten nested unions, collapse a literal member when its primitive
    /// supertype is also present (`1 | number` normalizes to `number`), and
    /// dedupe by rendered form. Collapses to the single member directly
    /// when only one survives.
    pub(crate) fn normalize_union(&self, members: Vec<TypeId>) -> TypeId {
        let mut flat = Vec::new();
        for member in members {
            match self.engine.get(member) {
                DescriptorData::Union(inner) => flat.extend(inner),
                _ => flat.push(member),
            }
        }

        let has_number = flat
            .iter()
            .any(|&id| matches!(self.engine.get(id), DescriptorData::Number(None)));
        let has_string = flat
            .iter()
            .any(|&id| matches!(self.engine.get(id), DescriptorData::StringType(None)));
        let has_boolean = flat
            .iter()
            .any(|&id| matches!(self.engine.get(id), DescriptorData::Boolean(None)));

        flat.retain(|&id| match self.engine.get(id) {
            DescriptorData::Number(Some(_)) if has_number => false,
            DescriptorData::StringType(Some(_)) if has_string => false,
            DescriptorData::Boolean(Some(_)) if has_boolean => false,
            _ => true,
        });

        let mut seen = HashSet::new();
        let mut deduped = Vec::new();
        for id in flat {
            if seen.insert(self.to_string_of(id)) {
                deduped.push(id);
            }
        }

        match deduped.len() {
            0 => self.empty(),
            1 => deduped[0],
            _ => self.union(deduped),
        }
    }
}
