//! `ConversionContext` — symbol classification, lexical scope walking, and
//! per-class uid allocation (`spec.md` §4.4).

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rustc_hash::FxHashMap;

use structural_common::Diagnostic;
use structural_types::{TypeId, Value};

/// How an identifier in annotation position was classified
/// (`spec.md` §4.4's table).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolClass {
    TypeAlias(TypeId),
    TypeParameter(TypeId),
    /// Introduced on the enclosing class declaration. `uid` is the
    /// class's allocated storage tag (see `ClassStorage`); real instance
    /// routing through a per-instance store is a host runtime concern, out
    /// of scope here (`DESIGN.md`).
    ClassTypeParameter { type_id: TypeId, uid: u32 },
}

/// The two uids the converter allocates per class (`spec.md` §4.4): one for
/// static-method contexts, one for the per-instance symbol key used by
/// instance methods. The actual storage mechanism (a host-specific
/// sentinel-symbol property) is the host runtime's concern; this crate
/// only allocates the tags a host would key its store by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassStorage {
    pub type_parameters_uid: u32,
    pub type_parameters_symbol_uid: u32,
}

struct ConversionInner {
    scopes: RefCell<Vec<FxHashMap<String, SymbolClass>>>,
    next_uid: Cell<u32>,
    diagnostics: RefCell<Vec<Diagnostic>>,
    /// Value samples bound by name, for `typeof` annotations to resolve
    /// against (`spec.md` §4.5's `annotationToValue`). A host driving the
    /// converter binds whatever top-level bindings its program has live
    /// values for; a `typeof` chain rooted at an unbound name still
    /// degrades to `any` with a diagnostic.
    value_samples: RefCell<FxHashMap<String, Value>>,
}

/// Cheaply cloneable (an `Rc` handle) so closures built during thunked
/// self-referential conversion can own a copy without borrowing `&self`
/// across a `'static` boundary.
#[derive(Clone)]
pub struct ConversionContext {
    inner: Rc<ConversionInner>,
}

impl ConversionContext {
    pub fn new() -> Self {
        ConversionContext {
            inner: Rc::new(ConversionInner {
                scopes: RefCell::new(vec![FxHashMap::default()]),
                next_uid: Cell::new(0),
                diagnostics: RefCell::new(Vec::new()),
                value_samples: RefCell::new(FxHashMap::default()),
            }),
        }
    }

    /// Bind a live value sample for `name`, so a `typeof name` (or
    /// `typeof name.prop...`) annotation can resolve against it.
    pub fn bind_value_sample(&self, name: &str, value: Value) {
        self.inner.value_samples.borrow_mut().insert(name.to_string(), value);
    }

    pub fn value_sample(&self, name: &str) -> Option<Value> {
        self.inner.value_samples.borrow().get(name).cloned()
    }

    /// Enter a new lexical scope (a parametric alias, function, or class
    /// body) — `spec.md` §4.4's "walk parent paths ... stop at the nearest
    /// enclosing statement that is not itself an annotation".
    pub fn push_scope(&self) {
        self.inner.scopes.borrow_mut().push(FxHashMap::default());
    }

    pub fn pop_scope(&self) {
        self.inner.scopes.borrow_mut().pop();
        debug_assert!(!self.inner.scopes.borrow().is_empty(), "popped the root scope");
    }

    pub fn declare(&self, name: &str, class: SymbolClass) {
        tracing::debug!(name, ?class, "symbol declared in conversion scope");
        self.inner
            .scopes
            .borrow_mut()
            .last_mut()
            .expect("at least one scope")
            .insert(name.to_string(), class);
    }

    /// Classify `name` by walking scopes from innermost to outermost. An
    /// unresolved name is `None`, which the converter treats as
    /// `ExternalName`.
    pub fn classify(&self, name: &str) -> Option<SymbolClass> {
        for scope in self.inner.scopes.borrow().iter().rev() {
            if let Some(class) = scope.get(name) {
                return Some(*class);
            }
        }
        None
    }

    pub fn alloc_class_storage(&self) -> ClassStorage {
        let type_parameters_uid = self.inner.next_uid.get();
        self.inner.next_uid.set(type_parameters_uid + 1);
        let type_parameters_symbol_uid = self.inner.next_uid.get();
        self.inner.next_uid.set(type_parameters_symbol_uid + 1);
        ClassStorage {
            type_parameters_uid,
            type_parameters_symbol_uid,
        }
    }

    pub fn push_diagnostic(&self, diagnostic: Diagnostic) {
        self.inner.diagnostics.borrow_mut().push(diagnostic);
    }

    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.inner.diagnostics.borrow_mut())
    }
}

impl Default for ConversionContext {
    fn default() -> Self {
        Self::new()
    }
}
