//! Resolution of the three "indirect" descriptor variants — `ref`, `box`,
//! and `Application` (an instantiated `parametric`) — plus `unwrap`, the
//! public operation that peels all three (and transparent wrappers like
//! `typeOf`/`flowInto`/an already-recorded `TypeParameter`) down to a
//! concrete descriptor (`spec.md` §4.1/§4.2/§9).

use structural_common::limits::MAX_UNWRAP_DEPTH;

use crate::context::TypeContext;
use crate::descriptor::{BoxState, DescriptorData, RefTarget, TypeId};

impl TypeContext {
    /// Resolve a `ref(target, ...instances)` to the concrete descriptor it
    /// points at, applying `instances` if any were supplied. An unresolved
    /// named reference (a host/config error — the name should have been
    /// registered before first use) falls back to `any` rather than
    /// failing every check that reaches it.
    pub(crate) fn resolve_ref(&self, target: &RefTarget, instances: &[TypeId]) -> TypeId {
        let base = match target {
            RefTarget::Direct(id) => *id,
            RefTarget::Named(name) => {
                let name = self.resolve_atom(*name);
                self.lookup_name(&name).unwrap_or_else(|| {
                    tracing::warn!(name, "unresolved named type reference, falling back to any");
                    self.any()
                })
            }
        };
        if instances.is_empty() {
            base
        } else {
            self.application(base, instances.to_vec())
        }
    }

    /// Force a `box(() => T)` thunk, caching the result in the arena so the
    /// closure runs exactly once per box.
    pub(crate) fn resolve_box(&self, box_id: TypeId, _cell: &std::cell::RefCell<BoxState>) -> TypeId {
        let pending = self
            .engine
            .with_box(box_id, |cell| match &*cell.borrow() {
                BoxState::Resolved(id) => Some(*id),
                BoxState::Pending(thunk) => {
                    let _ = thunk;
                    None
                }
            });
        if let Some(resolved) = pending {
            return resolved;
        }
        let thunk = self
            .engine
            .with_box(box_id, |cell| match &*cell.borrow() {
                BoxState::Pending(thunk) => thunk.clone(),
                BoxState::Resolved(id) => {
                    // Raced with another resolver on the same single-threaded
                    // context — unreachable in practice, but stay correct.
                    let id = *id;
                    std::rc::Rc::new(move |_: TypeId| id) as std::rc::Rc<dyn Fn(TypeId) -> TypeId>
                }
            });
        let resolved = thunk(box_id);
        self.engine.with_box(box_id, |cell| {
            *cell.borrow_mut() = BoxState::Resolved(resolved);
        });
        resolved
    }

    /// Materialize an `Application` (a `parametric` descriptor applied to
    /// concrete type arguments), caching the result.
    pub(crate) fn materialize(&self, app_id: TypeId) -> TypeId {
        if let Some(cached) = self
            .engine
            .with_application(app_id, |_base, _args, cell| *cell.borrow())
        {
            return cached;
        }
        let (base, args) = self
            .engine
            .with_application(app_id, |base, args, _| (base, args.to_vec()));
        let result = self.instantiate(base, &args);
        self.engine.with_application(app_id, |_, _, cell| {
            *cell.borrow_mut() = Some(result);
        });
        result
    }

    /// Apply `args` to `base`. `base` must be a `Parametric` descriptor;
    /// any other base is returned unchanged (applying type arguments to a
    /// non-generic descriptor is a no-op, not an error, matching a
    /// structurally-typed host's leniency).
    fn instantiate(&self, base: TypeId, args: &[TypeId]) -> TypeId {
        match self.engine.get(base) {
            DescriptorData::Parametric { params, body } => {
                let fresh: Vec<TypeId> = params.iter().map(|&p| self.clone_type_parameter(p)).collect();
                for (i, &fresh_param) in fresh.iter().enumerate() {
                    if let Some(&arg) = args.get(i) {
                        self.bind_type_parameter(fresh_param, arg);
                    }
                }
                (body.0)(&fresh)
            }
            _ => base,
        }
    }

    /// Every instantiation gets its own freshly-cloned type-parameter
    /// descriptors, so two applications of the same `parametric` body never
    /// alias each other's `recorded`/`bound` state (`spec.md` §4.2 "scope
    /// discipline").
    fn clone_type_parameter(&self, param: TypeId) -> TypeId {
        let (name, bound) = self
            .engine
            .with_type_param(param, |cell| (cell.borrow().id, cell.borrow().bound));
        self.engine.alloc(DescriptorData::TypeParameter(std::cell::RefCell::new(
            crate::descriptor::TypeParamState {
                id: name,
                bound,
                recorded: None,
                delegate: None,
            },
        )))
    }

    /// Binding-at-application: `bound = intersection(oldBound, arg)`,
    /// except `any`/`mixed`/`existential` act as the identity element so a
    /// parameter's first binding doesn't get wrapped in a needless
    /// intersection (`spec.md` §4.2, resolved as an Open Question — see
    /// `DESIGN.md`).
    fn bind_type_parameter(&self, param: TypeId, arg: TypeId) {
        let existing = self.engine.with_type_param(param, |cell| cell.borrow().bound);
        let new_bound = match existing {
            None => arg,
            Some(old) if self.is_any_like(old) => arg,
            Some(old) => self.intersection(vec![old, arg]),
        };
        self.engine.with_type_param(param, |cell| {
            cell.borrow_mut().bound = Some(new_bound);
        });
    }

    pub(crate) fn is_any_like(&self, id: TypeId) -> bool {
        matches!(
            self.engine.get(id),
            DescriptorData::Any | DescriptorData::Mixed | DescriptorData::Existential
        )
    }

    /// Resolve references/parameters/applications down to a concrete
    /// descriptor. Idempotent: `unwrap(unwrap(id)) == unwrap(id)`.
    pub fn unwrap(&self, id: TypeId) -> TypeId {
        self.unwrap_depth(id, 0)
    }

    fn unwrap_depth(&self, id: TypeId, depth: u32) -> TypeId {
        if depth > MAX_UNWRAP_DEPTH {
            return id;
        }
        match self.engine.get(id) {
            DescriptorData::Ref { target, instances } => {
                let resolved = self.resolve_ref(&target, &instances);
                self.unwrap_depth(resolved, depth + 1)
            }
            DescriptorData::Box(cell) => {
                let resolved = self.resolve_box(id, &cell);
                self.unwrap_depth(resolved, depth + 1)
            }
            DescriptorData::Application { .. } => {
                let resolved = self.materialize(id);
                self.unwrap_depth(resolved, depth + 1)
            }
            DescriptorData::TypeParameter(cell) => {
                let state = cell.borrow().clone();
                if let Some(delegate) = state.delegate {
                    self.unwrap_depth(delegate, depth + 1)
                } else if let Some(recorded) = state.recorded {
                    self.unwrap_depth(recorded, depth + 1)
                } else {
                    id
                }
            }
            DescriptorData::TypeOf(inner) => self.unwrap_depth(inner, depth + 1),
            DescriptorData::FlowInto(param) => self.unwrap_depth(param, depth + 1),
            _ => id,
        }
    }
}
