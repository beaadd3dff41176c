//! `TypeContext` — factory, registry of named types, predicate registry,
//! assertion mode, and the root of a tree of nested contexts
//! (`spec.md` §3/§4.3).
//!
//! The descriptor arena itself lives in `Engine`, shared by `Rc` across an
//! entire `TypeContext` tree so a child context (module → class → method)
//! can allocate descriptors without owning a copy of everything its
//! ancestors already built. Every `TypeContext` method that *records* (a
//! `TypeParameter`'s first observation, `flowInto` widening, `Box`
//! resolution, `Application` materialization) takes `&self`, not `&mut
//! self`: that state lives behind `RefCell`/`Cell` inside the arena, not in
//! the `TypeContext` value itself, because the spec requires a tree of
//! contexts to share one descriptor graph and mutate it from any node.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use structural_common::{Atom, Interner};

use crate::descriptor::{
    BoxState, ClassShape, DescriptorData, FunctionShape, IndexKeyKind, IndexSignature, Literal,
    Member, ObjectShape, Param, ParametricBody, RefTarget, TypeId, TypeParamState,
};
use crate::value::Value;

/// A host-supplied nominal predicate (`spec.md` §6's predicate registry
/// seed: `Array`, `$ReadOnlyArray`, `Map`, `Set`, `Promise`).
pub type PredicateFn = Rc<dyn Fn(&Value) -> bool>;

/// The `{off, warn, assert}` state machine from `spec.md` §4.3.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AssertionMode {
    Off,
    Warn,
    #[default]
    Assert,
}

/// Returned by `TypeContext::declare`/`type_decl` when a name is registered
/// twice in the same context — a fatal configuration error per §4.3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateNameError(pub String);

impl fmt::Display for DuplicateNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type name `{}` is already declared in this scope", self.0)
    }
}

impl std::error::Error for DuplicateNameError {}

/// The shared descriptor arena and string interner for a `TypeContext`
/// tree. Never mutably borrowed across a recursive dispatch call — see
/// `DescriptorData`'s doc comment for why every read takes a shallow clone.
pub(crate) struct Engine {
    arena: RefCell<Vec<DescriptorData>>,
    interner: RefCell<Interner>,
}

impl Engine {
    fn new() -> Self {
        Engine {
            arena: RefCell::new(Vec::new()),
            interner: RefCell::new(Interner::new()),
        }
    }

    pub(crate) fn alloc(&self, data: DescriptorData) -> TypeId {
        let mut arena = self.arena.borrow_mut();
        let id = TypeId(arena.len() as u32);
        arena.push(data);
        id
    }

    /// Push a placeholder slot, returning its id before its real contents
    /// are known — used to "tie the knot" for self-referential aliases
    /// (`spec.md` §4.2/§9: the thunk closure captures this id as `self`).
    pub(crate) fn reserve(&self) -> TypeId {
        self.alloc(DescriptorData::Empty)
    }

    pub(crate) fn set(&self, id: TypeId, data: DescriptorData) {
        self.arena.borrow_mut()[id.0 as usize] = data;
    }

    /// A shallow clone of one arena slot. Cheap (small `Vec<TypeId>`s and
    /// `Atom`s, not deep value data) and safe to hold across recursive
    /// dispatch since it does not keep the arena's `RefCell` borrowed.
    pub(crate) fn get(&self, id: TypeId) -> DescriptorData {
        self.arena.borrow()[id.0 as usize].clone()
    }

    pub(crate) fn with_type_param<R>(
        &self,
        id: TypeId,
        f: impl FnOnce(&RefCell<TypeParamState>) -> R,
    ) -> R {
        let arena = self.arena.borrow();
        match &arena[id.0 as usize] {
            DescriptorData::TypeParameter(cell) => f(cell),
            other => panic!("TypeId {id:?} is not a TypeParameter (found {other:?})"),
        }
    }

    pub(crate) fn with_box<R>(&self, id: TypeId, f: impl FnOnce(&RefCell<BoxState>) -> R) -> R {
        let arena = self.arena.borrow();
        match &arena[id.0 as usize] {
            DescriptorData::Box(cell) => f(cell),
            other => panic!("TypeId {id:?} is not a Box (found {other:?})"),
        }
    }

    pub(crate) fn with_application<R>(
        &self,
        id: TypeId,
        f: impl FnOnce(TypeId, &[TypeId], &RefCell<Option<TypeId>>) -> R,
    ) -> R {
        let arena = self.arena.borrow();
        match &arena[id.0 as usize] {
            DescriptorData::Application {
                base,
                args,
                materialized,
            } => f(*base, args, materialized),
            other => panic!("TypeId {id:?} is not an Application (found {other:?})"),
        }
    }

    pub(crate) fn intern(&self, s: &str) -> Atom {
        self.interner.borrow_mut().intern(s)
    }

    pub(crate) fn resolve(&self, atom: Atom) -> String {
        self.interner.borrow().resolve(atom).to_string()
    }
}

/// A node in the tree of type contexts (module → class → method,
/// `spec.md` §3). Children share the parent's descriptor arena, inherit
/// name/predicate resolution, and may shadow either registry.
pub struct TypeContext {
    pub(crate) engine: Rc<Engine>,
    parent: Option<Rc<TypeContext>>,
    label: String,
    names: RefCell<IndexMap<Atom, TypeId>>,
    predicates: RefCell<FxHashMap<Atom, PredicateFn>>,
    mode: Cell<Option<AssertionMode>>,
}

impl fmt::Debug for TypeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeContext")
            .field("label", &self.label)
            .field("mode", &self.mode.get())
            .finish()
    }
}

impl TypeContext {
    /// Create a fresh root context with its own descriptor arena.
    pub fn new_root() -> Rc<TypeContext> {
        Rc::new(TypeContext {
            engine: Rc::new(Engine::new()),
            parent: None,
            label: "root".to_string(),
            names: RefCell::new(IndexMap::new()),
            predicates: RefCell::new(FxHashMap::default()),
            mode: Cell::new(None),
        })
    }

    /// Create a child scope (e.g. entering a class or method body) sharing
    /// this context's arena. The child's own name/predicate registries
    /// start empty and shadow the parent's on lookup.
    pub fn child(self: &Rc<Self>, label: impl Into<String>) -> Rc<TypeContext> {
        Rc::new(TypeContext {
            engine: self.engine.clone(),
            parent: Some(self.clone()),
            label: label.into(),
            names: RefCell::new(IndexMap::new()),
            predicates: RefCell::new(FxHashMap::default()),
            mode: Cell::new(None),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    // ---------------------------------------------------------------
    // Assertion mode
    // ---------------------------------------------------------------

    /// The effective mode for this context: its own, if set, else the
    /// nearest ancestor's, else `AssertionMode::Assert`.
    pub fn mode(&self) -> AssertionMode {
        if let Some(mode) = self.mode.get() {
            return mode;
        }
        match &self.parent {
            Some(parent) => parent.mode(),
            None => AssertionMode::default(),
        }
    }

    /// Switch modes. Transitions are immediate: the next `check`/
    /// `assertParams`/`assertReturn` call reads the new mode, because
    /// nothing caches it (`spec.md` §4.3).
    pub fn set_mode(&self, mode: AssertionMode) {
        tracing::debug!(context = %self.label, ?mode, "assertion mode changed");
        self.mode.set(Some(mode));
    }

    // ---------------------------------------------------------------
    // Name registry
    // ---------------------------------------------------------------

    /// Register `name` in this context's own registry (write-once).
    pub fn declare(&self, name: &str, type_id: TypeId) -> Result<TypeId, DuplicateNameError> {
        let atom = self.engine.intern(name);
        let mut names = self.names.borrow_mut();
        if names.contains_key(&atom) {
            return Err(DuplicateNameError(name.to_string()));
        }
        names.insert(atom, type_id);
        Ok(type_id)
    }

    /// `type(name, body)` from `spec.md` §6 — named alias declaration.
    /// (`type` is a Rust keyword; `type_decl` is the callable spelling.)
    pub fn type_decl(&self, name: &str, body: TypeId) -> Result<TypeId, DuplicateNameError> {
        self.declare(name, body)
    }

    /// Look up `name` starting at this context and walking up through
    /// parents (a child's own declaration shadows an ancestor's).
    pub fn lookup_name(&self, name: &str) -> Option<TypeId> {
        let atom = self.engine.intern(name);
        if let Some(&id) = self.names.borrow().get(&atom) {
            return Some(id);
        }
        self.parent.as_ref().and_then(|p| p.lookup_name(name))
    }

    // ---------------------------------------------------------------
    // Predicate registry
    // ---------------------------------------------------------------

    /// Register a nominal predicate. Overwrites silently — hosts are
    /// expected to inject environment-specific predicates on top of the
    /// seed set (`spec.md` §4.3).
    pub fn register_predicate(&self, name: &str, f: impl Fn(&Value) -> bool + 'static) {
        let atom = self.engine.intern(name);
        self.predicates.borrow_mut().insert(atom, Rc::new(f));
    }

    pub fn lookup_predicate(&self, name: &str) -> Option<PredicateFn> {
        let atom = self.engine.intern(name);
        if let Some(p) = self.predicates.borrow().get(&atom) {
            return Some(p.clone());
        }
        self.parent.as_ref().and_then(|p| p.lookup_predicate(name))
    }

    // ---------------------------------------------------------------
    // Modules
    // ---------------------------------------------------------------

    /// `declare(module("name", (libId) => { body }))` from `spec.md` §4.5:
    /// a fresh child scope for a `DeclareModule` body.
    pub fn module(self: &Rc<Self>, name: &str) -> Rc<TypeContext> {
        self.child(format!("module:{name}"))
    }

    /// `moduleExports(...)`: the structural surface a module presents to
    /// importers, built from its exported name/type pairs.
    pub fn module_exports(&self, exports: Vec<(String, TypeId)>) -> TypeId {
        let members = exports
            .into_iter()
            .map(|(name, type_id)| Member::Property {
                name: self.engine.intern(&name),
                type_id,
                optional: false,
            })
            .collect();
        self.object(ObjectShape {
            members,
            ..Default::default()
        })
    }

    // ---------------------------------------------------------------
    // Factory methods — `spec.md` §6
    // ---------------------------------------------------------------

    pub fn any(&self) -> TypeId {
        self.engine.alloc(DescriptorData::Any)
    }

    pub fn mixed(&self) -> TypeId {
        self.engine.alloc(DescriptorData::Mixed)
    }

    pub fn existential(&self) -> TypeId {
        self.engine.alloc(DescriptorData::Existential)
    }

    pub fn empty(&self) -> TypeId {
        self.engine.alloc(DescriptorData::Empty)
    }

    pub fn void(&self) -> TypeId {
        self.engine.alloc(DescriptorData::Void)
    }

    pub fn null(&self) -> TypeId {
        self.engine.alloc(DescriptorData::Null)
    }

    pub fn symbol(&self) -> TypeId {
        self.engine.alloc(DescriptorData::Symbol)
    }

    pub fn number(&self, literal: Option<f64>) -> TypeId {
        self.engine
            .alloc(DescriptorData::Number(literal.map(Literal::Number)))
    }

    pub fn string(&self, literal: Option<&str>) -> TypeId {
        self.engine.alloc(DescriptorData::StringType(
            literal.map(|s| Literal::String(s.into())),
        ))
    }

    pub fn boolean(&self, literal: Option<bool>) -> TypeId {
        self.engine
            .alloc(DescriptorData::Boolean(literal.map(Literal::Bool)))
    }

    pub fn nullable(&self, inner: TypeId) -> TypeId {
        self.engine.alloc(DescriptorData::Nullable(inner))
    }

    pub fn array(&self, elem: TypeId) -> TypeId {
        self.engine.alloc(DescriptorData::Array(elem))
    }

    pub fn tuple(&self, elems: Vec<TypeId>) -> TypeId {
        self.engine.alloc(DescriptorData::Tuple(elems))
    }

    pub fn object(&self, mut shape: ObjectShape) -> TypeId {
        shape.exact = false;
        self.engine.alloc(DescriptorData::Object(shape))
    }

    pub fn exact_object(&self, mut shape: ObjectShape) -> TypeId {
        shape.exact = true;
        self.engine.alloc(DescriptorData::Object(shape))
    }

    pub fn function(&self, shape: FunctionShape) -> TypeId {
        self.engine.alloc(DescriptorData::Function(shape))
    }

    pub fn union(&self, members: Vec<TypeId>) -> TypeId {
        self.engine.alloc(DescriptorData::Union(members))
    }

    /// `intersect` is the spec's alias for `intersection`.
    pub fn intersect(&self, members: Vec<TypeId>) -> TypeId {
        self.intersection(members)
    }

    pub fn intersection(&self, members: Vec<TypeId>) -> TypeId {
        self.engine.alloc(DescriptorData::Intersection(members))
    }

    pub fn ref_named(&self, name: &str, instances: Vec<TypeId>) -> TypeId {
        let atom = self.engine.intern(name);
        self.engine.alloc(DescriptorData::Ref {
            target: RefTarget::Named(atom),
            instances,
        })
    }

    pub fn ref_direct(&self, target: TypeId, instances: Vec<TypeId>) -> TypeId {
        self.engine.alloc(DescriptorData::Ref {
            target: RefTarget::Direct(target),
            instances,
        })
    }

    pub fn class(&self, name: &str, body: TypeId, statics: TypeId, supers: Vec<TypeId>) -> TypeId {
        let atom = self.engine.intern(name);
        self.engine.alloc(DescriptorData::Class(ClassShape {
            name: atom,
            body,
            statics,
            supers,
        }))
    }

    /// `nominal("Name")`: a predicate-backed check, independent of shape.
    pub fn nominal(&self, name: &str) -> TypeId {
        let atom = self.engine.intern(name);
        self.engine.alloc(DescriptorData::Nominal(atom))
    }

    /// `typeOf(sample)`: captures the sample's inferred shape now; later
    /// `accepts` calls compare against that frozen shape.
    pub fn type_of(&self, sample: &Value) -> TypeId {
        let inferred = self.infer_shape(sample);
        self.engine.alloc(DescriptorData::TypeOf(inferred))
    }

    /// `box(() => T)`: a thunk resolved on first use, breaking recursive
    /// type graphs. `thunk` receives this box's own `TypeId` so
    /// self-referential aliases can close over it as `self`.
    pub fn boxed(&self, thunk: impl Fn(TypeId) -> TypeId + 'static) -> TypeId {
        self.engine
            .alloc(DescriptorData::Box(RefCell::new(BoxState::Pending(Rc::new(
                thunk,
            )))))
    }

    pub fn flow_into(&self, param: TypeId) -> TypeId {
        self.engine.alloc(DescriptorData::FlowInto(param))
    }

    pub fn type_parameter(&self, name: &str, bound: Option<TypeId>) -> TypeId {
        let atom = self.engine.intern(name);
        self.engine.alloc(DescriptorData::TypeParameter(RefCell::new(
            TypeParamState {
                id: atom,
                bound,
                recorded: None,
                delegate: None,
            },
        )))
    }

    /// A `TypeParameter` that always delegates to `target` — used when the
    /// converter needs a second handle on the same logical parameter (a
    /// class type parameter observed from a nested generic method body).
    /// This is ordering rule 1 of `spec.md` §4.2.
    pub fn type_parameter_alias(&self, name: &str, target: TypeId) -> TypeId {
        let atom = self.engine.intern(name);
        self.engine.alloc(DescriptorData::TypeParameter(RefCell::new(
            TypeParamState {
                id: atom,
                bound: None,
                recorded: None,
                delegate: Some(target),
            },
        )))
    }

    pub fn parametric(
        &self,
        params: Vec<TypeId>,
        body: impl Fn(&[TypeId]) -> TypeId + 'static,
    ) -> TypeId {
        self.engine.alloc(DescriptorData::Parametric {
            params,
            body: ParametricBody(Rc::new(body)),
        })
    }

    pub fn application(&self, base: TypeId, args: Vec<TypeId>) -> TypeId {
        self.engine.alloc(DescriptorData::Application {
            base,
            args,
            materialized: RefCell::new(None),
        })
    }

    /// `declare(name, typeAnnotation)` — an ambient declaration, registered
    /// the same way as `type_decl` (see the `DeclareFunction` quirk in
    /// `DESIGN.md`: it is emitted directly, without the intermediate
    /// `function(...)` wrapper).
    pub fn declare_ambient(&self, name: &str, type_id: TypeId) -> Result<TypeId, DuplicateNameError> {
        self.declare(name, type_id)
    }

    // -- data constructors (no new arena slot; these build values the
    //    factory methods above consume) --

    pub fn property(&self, name: &str, type_id: TypeId, optional: bool) -> Member {
        Member::Property {
            name: self.engine.intern(name),
            type_id,
            optional,
        }
    }

    pub fn static_property(&self, name: &str, type_id: TypeId, optional: bool) -> Member {
        self.property(name, type_id, optional)
    }

    pub fn method(&self, name: &str, signature: TypeId) -> Member {
        Member::Method {
            name: self.engine.intern(name),
            signature,
            optional: false,
        }
    }

    pub fn static_method(&self, name: &str, signature: TypeId) -> Member {
        self.method(name, signature)
    }

    pub fn indexer(&self, key: IndexKeyKind, value_type: TypeId) -> IndexSignature {
        IndexSignature { key, value_type }
    }

    /// Marks an object shape as additionally callable with `signature`.
    pub fn call_property(&self, signature: TypeId) -> TypeId {
        signature
    }

    pub fn param(&self, name: &str, type_id: TypeId, optional: bool) -> Param {
        Param {
            name: self.engine.intern(name),
            type_id,
            optional,
        }
    }

    /// Identity helper kept for emission symmetry with `return_`; `rest`
    /// is a Rust-safe spelling since the signature already reads
    /// `FunctionShape { rest: Option<TypeId>, .. }`.
    pub fn rest(&self, type_id: TypeId) -> TypeId {
        type_id
    }

    /// `return` is a Rust keyword; the callable spelling is `return_`.
    pub fn return_(&self, type_id: TypeId) -> TypeId {
        type_id
    }

    pub fn extends(&self, supers: impl IntoIterator<Item = TypeId>) -> Vec<TypeId> {
        supers.into_iter().collect()
    }

    pub(crate) fn resolve_atom(&self, atom: Atom) -> String {
        self.engine.resolve(atom)
    }
}
