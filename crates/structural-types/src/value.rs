//! The runtime value domain checked by type descriptors.
//!
//! The real host (a dynamically-typed language runtime) is out of scope;
//! this is the minimal value shape `accepts`/`collectErrors` need to
//! exercise every descriptor variant in `spec.md` §4.1, including nominal
//! class instances and callables.

use indexmap::IndexMap;
use std::rc::Rc;

/// A runtime value, as seen by the descriptor library.
#[derive(Clone, Debug)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Symbol(Rc<str>),
    Array(Vec<Value>),
    /// A plain object. `IndexMap` preserves insertion order, which matters
    /// for `exactObject`'s "no additional own keys" check and for any
    /// caller that wants to enumerate own keys in declaration order.
    Object(IndexMap<Rc<str>, Value>),
    /// A nominally-tagged object — the result of `new SomeClass(...)` in the
    /// source language. Carries its own class name plus every ancestor in
    /// its `extends`/`implements` chain, so `class("Name").accepts(v)`
    /// can do the nominal half of its check without re-walking a registry.
    Instance {
        class_name: Rc<str>,
        ancestors: Vec<Rc<str>>,
        fields: IndexMap<Rc<str>, Value>,
    },
    Function(Rc<FunctionValue>),
}

/// A callable value. Real invocation is a host concern; the descriptor
/// library only needs arity/callability to validate `function(...)`
/// descriptors and to run `assertParams`/`assertReturn` against supplied
/// argument/return values at a call site.
#[derive(Clone, Debug)]
pub struct FunctionValue {
    pub name: Option<Rc<str>>,
    pub arity: usize,
    pub is_async: bool,
}

impl Value {
    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Value::String(s.into())
    }

    pub fn object(entries: impl IntoIterator<Item = (Rc<str>, Value)>) -> Self {
        Value::Object(entries.into_iter().collect())
    }

    /// The `typeof`-style runtime tag used by primitive descriptors.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Array(_) => "object",
            Value::Object(_) => "object",
            Value::Instance { .. } => "object",
            Value::Function(_) => "function",
        }
    }

    pub fn is_null_or_undefined(&self) -> bool {
        matches!(self, Value::Null | Value::Undefined)
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    /// Elements, if this value is sequence-like (`Array`). Used by `array`
    /// and `tuple` descriptors.
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Own keys, for `exactObject`'s closed-world check and for `indexer`
    /// key coercion. `None` for non-object-shaped values.
    pub fn own_keys(&self) -> Option<Vec<Rc<str>>> {
        match self {
            Value::Object(map) => Some(map.keys().cloned().collect()),
            Value::Instance { fields, .. } => Some(fields.keys().cloned().collect()),
            _ => None,
        }
    }

    pub fn get_property(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(name),
            Value::Instance { fields, .. } => fields.get(name),
            _ => None,
        }
    }

    /// Whether this value's nominal tag matches `name`, either directly or
    /// through its ancestor chain. Used by the `class` descriptor variant.
    pub fn is_instance_of(&self, name: &str) -> bool {
        match self {
            Value::Instance {
                class_name,
                ancestors,
                ..
            } => class_name.as_ref() == name || ancestors.iter().any(|a| a.as_ref() == name),
            _ => false,
        }
    }
}
