//! Type descriptor variants — the closed tagged union at the center of the
//! system (`spec.md` §3/§4.1, Design Note in §9).
//!
//! Each `TypeId` indexes into a `TypeContext`'s shared arena of
//! `DescriptorData`. Dispatch (`accepts`, `collectErrors`, `acceptsType`,
//! `unwrap`, `toString`) lives on `TypeContext` as a match over the variant
//! rather than as methods on a trait object — the same "closed tagged union
//! with a dispatch table from typeName to handler" shape the teacher uses
//! for its own type representation (`TypeId` + arena in `tsz-solver`).

use std::rc::Rc;

use structural_common::Atom;

/// An opaque handle into a `TypeContext`'s descriptor arena. Cheap to copy,
/// compare, and hash — the currency `accepts`/`collectErrors`/`unwrap`
/// trade in instead of passing descriptor values by value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TypeId(pub(crate) u32);

/// A literal value carried by a primitive descriptor (`v === literal`).
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Number(f64),
    String(Rc<str>),
    Bool(bool),
}

/// An object/interface member.
#[derive(Clone, Debug)]
pub enum Member {
    Property {
        name: Atom,
        type_id: TypeId,
        optional: bool,
    },
    /// A method is a property whose type is itself a `function` descriptor;
    /// kept as a distinct variant only for `toString`/diagnostic fidelity.
    Method {
        name: Atom,
        signature: TypeId,
        optional: bool,
    },
}

impl Member {
    pub fn name(&self) -> Atom {
        match self {
            Member::Property { name, .. } | Member::Method { name, .. } => *name,
        }
    }

    pub fn type_id(&self) -> TypeId {
        match self {
            Member::Property { type_id, .. } => *type_id,
            Member::Method { signature, .. } => *signature,
        }
    }

    pub fn is_optional(&self) -> bool {
        match self {
            Member::Property { optional, .. } | Member::Method { optional, .. } => *optional,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexKeyKind {
    String,
    Number,
    Symbol,
}

#[derive(Clone, Debug)]
pub struct IndexSignature {
    pub key: IndexKeyKind,
    pub value_type: TypeId,
}

/// The shape shared by `object` and `exactObject`.
#[derive(Clone, Debug, Default)]
pub struct ObjectShape {
    pub members: Vec<Member>,
    pub string_index: Option<IndexSignature>,
    pub number_index: Option<IndexSignature>,
    /// The object itself must additionally be callable with this signature.
    pub call_property: Option<TypeId>,
    /// `true` for `exactObject`: no additional own keys beyond `members`.
    pub exact: bool,
}

#[derive(Clone, Debug)]
pub struct Param {
    pub name: Atom,
    pub type_id: TypeId,
    pub optional: bool,
}

/// The shape of a `function(params, rest?, return?)` descriptor. Structural
/// signature matching is not performed by `accepts` — per `spec.md` §4.1,
/// it is only exercised at call sites via `assertParams`/`assertReturn`.
#[derive(Clone, Debug, Default)]
pub struct FunctionShape {
    pub params: Vec<Param>,
    pub rest: Option<TypeId>,
    pub return_type: Option<TypeId>,
}

/// The shape of a `class("Name", ...members, ...supers)` descriptor: a
/// nominal name check plus a structural object body.
#[derive(Clone, Debug)]
pub struct ClassShape {
    pub name: Atom,
    pub body: TypeId,
    /// Static members, built from `staticProperty`/`staticMethod`. Not
    /// consulted by `accepts` (which checks instances), only by
    /// `acceptsType` and by the converter when emitting a class's own
    /// static-member store.
    pub statics: TypeId,
    pub supers: Vec<TypeId>,
}

/// Where a `ref(target, ...instances)` descriptor resolves its target from.
#[derive(Clone, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum RefTarget {
    /// Resolved by name against the context chain at check time (late
    /// binding — used for `ExternalName`s the converter could not classify
    /// at compile time).
    Named(Atom),
    /// A direct descriptor reference, as emitted for resolved aliases and
    /// type parameters.
    Direct(TypeId),
}

/// State owned by a `TypeParameter` descriptor (`spec.md` §3/§4.2).
#[derive(Clone, Debug)]
pub struct TypeParamState {
    pub id: Atom,
    pub bound: Option<TypeId>,
    /// Write-once per activation; set by the first observed value, or
    /// widened into a union by `flowInto`.
    pub recorded: Option<TypeId>,
    /// Set for a `TypeParameter` that stands in for another one elsewhere
    /// in the scope tree (e.g. a class type parameter accessed from a
    /// nested generic method) — `accepts` delegates to it unconditionally.
    /// This is ordering rule 1 of `spec.md` §4.2.
    pub delegate: Option<TypeId>,
}

/// Lazily-resolved state for a `box(() => T)` thunk or a self-referential
/// alias's `(self) => body` thunk.
pub enum BoxState {
    Pending(Rc<dyn Fn(TypeId) -> TypeId>),
    Resolved(TypeId),
}

impl std::fmt::Debug for BoxState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoxState::Pending(_) => write!(f, "BoxState::Pending(..)"),
            BoxState::Resolved(id) => write!(f, "BoxState::Resolved({id:?})"),
        }
    }
}

impl Clone for BoxState {
    fn clone(&self) -> Self {
        match self {
            BoxState::Pending(thunk) => BoxState::Pending(thunk.clone()),
            BoxState::Resolved(id) => BoxState::Resolved(*id),
        }
    }
}

/// The body of a parametric (generic) alias/function/class: a thunk that,
/// given fresh per-instantiation type-parameter ids, builds the concrete
/// descriptor referencing them.
#[derive(Clone)]
pub struct ParametricBody(pub Rc<dyn Fn(&[TypeId]) -> TypeId>);

impl std::fmt::Debug for ParametricBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ParametricBody(..)")
    }
}

/// A closed tagged union of every descriptor variant in `spec.md` §4.1.
///
/// `Clone` is derived so dispatch methods on `TypeContext` can take a cheap
/// shallow snapshot of one arena slot (small `Vec<TypeId>`s and `Atom`s, not
/// deep value data) and drop the arena borrow before recursing — recursive
/// `accepts`/`collectErrors` calls would otherwise re-borrow the same
/// `RefCell`-guarded arena while a borrow from the caller was still live.
#[derive(Debug, Clone)]
pub enum DescriptorData {
    Any,
    Mixed,
    Existential,
    Empty,
    Void,
    Null,
    Number(Option<Literal>),
    StringType(Option<Literal>),
    Boolean(Option<Literal>),
    Symbol,
    Nullable(TypeId),
    Array(TypeId),
    Tuple(Vec<TypeId>),
    Object(ObjectShape),
    Function(FunctionShape),
    Union(Vec<TypeId>),
    Intersection(Vec<TypeId>),
    Ref {
        target: RefTarget,
        instances: Vec<TypeId>,
    },
    Class(ClassShape),
    /// A nominal predicate lookup (`Array`, `Map`, `Set`, `Promise`, or a
    /// host-registered predicate).
    Nominal(Atom),
    /// `typeOf(expr)`: accepts iff the value has the same inferred shape as
    /// the descriptor captured from the sample at construction time.
    TypeOf(TypeId),
    /// A type parameter (`spec.md` §3's "Type parameter" entity).
    TypeParameter(std::cell::RefCell<TypeParamState>),
    /// The write-capable wrapper injected at flowable positions
    /// (`spec.md` §4.2's `flowInto`).
    FlowInto(TypeId),
    /// A parametric alias/function/class body, not yet applied to type
    /// arguments.
    Parametric {
        params: Vec<TypeId>,
        body: ParametricBody,
    },
    /// A materialization of a `Parametric` descriptor for a specific set of
    /// type instances (`spec.md` §3's "Partial (applied) type").
    Application {
        base: TypeId,
        args: Vec<TypeId>,
        materialized: std::cell::RefCell<Option<TypeId>>,
    },
    /// `box(() => T)` / a self-referential alias thunk.
    Box(std::cell::RefCell<BoxState>),
}
