//! The `{off, warn, assert}` checkpoint operations from `spec.md` §4.3/§4.6:
//! `check` (mode-aware), `assert`/`warn` (fixed behavior regardless of
//! mode), and the call-boundary checkpoints `assertParams`/`assertReturn`.

use crate::context::{AssertionMode, TypeContext};
use crate::descriptor::{DescriptorData, TypeId};
use crate::validation::{PathSegment, TypeError, Validation};
use crate::value::Value;

impl TypeContext {
    fn enforce(&self, validation: Validation) -> Result<(), TypeError> {
        if validation.is_empty() {
            return Ok(());
        }
        match self.mode() {
            AssertionMode::Off => Ok(()),
            AssertionMode::Warn => {
                for record in validation.records() {
                    tracing::warn!(%record, "structural type check failed");
                }
                Ok(())
            }
            AssertionMode::Assert => Err(TypeError {
                records: validation.into_records(),
            }),
        }
    }

    /// Mode-aware checkpoint: a no-op under `Off`, a warning under `Warn`,
    /// a thrown `TypeError` under `Assert`. This is the operation the
    /// converter injects at a value site, so the same call adapts to
    /// whatever mode is active when it runs.
    pub fn check(&self, id: TypeId, value: Value) -> Result<Value, TypeError> {
        if matches!(self.mode(), AssertionMode::Off) {
            return Ok(value);
        }
        let mut validation = Validation::new();
        self.collect_errors(id, &mut validation, &mut Vec::new(), &value);
        self.enforce(validation)?;
        Ok(value)
    }

    /// Always throws on mismatch, independent of the context's mode.
    pub fn assert(&self, id: TypeId, value: Value) -> Result<Value, TypeError> {
        let mut validation = Validation::new();
        self.collect_errors(id, &mut validation, &mut Vec::new(), &value);
        if validation.is_empty() {
            Ok(value)
        } else {
            Err(TypeError {
                records: validation.into_records(),
            })
        }
    }

    /// Always logs on mismatch and never throws, independent of mode.
    pub fn warn(&self, id: TypeId, value: Value) -> Value {
        let mut validation = Validation::new();
        self.collect_errors(id, &mut validation, &mut Vec::new(), &value);
        for record in validation.records() {
            tracing::warn!(%record, "structural type check failed");
        }
        value
    }

    /// Checks each positional argument (and any `rest` overflow) against a
    /// `function` descriptor's parameter shapes, honoring the current
    /// assertion mode.
    pub fn assert_params(&self, func: TypeId, args: Vec<Value>) -> Result<Vec<Value>, TypeError> {
        if matches!(self.mode(), AssertionMode::Off) {
            return Ok(args);
        }
        let shape = match self.engine.get(func) {
            DescriptorData::Function(shape) => shape,
            _ => return Ok(args),
        };

        let mut validation = Validation::new();
        for (i, param) in shape.params.iter().enumerate() {
            let name = self.resolve_atom(param.name);
            match args.get(i) {
                Some(v) => {
                    let mut path = vec![PathSegment::Param(name)];
                    self.collect_errors(param.type_id, &mut validation, &mut path, v);
                }
                None => {
                    if !param.optional {
                        validation.fail(&[PathSegment::Param(name)], self.to_string_of(param.type_id), "missing argument");
                    }
                }
            }
        }
        if let Some(rest_ty) = shape.rest {
            for (i, v) in args.iter().enumerate().skip(shape.params.len()) {
                let mut path = vec![PathSegment::Param(format!("rest[{}]", i - shape.params.len()))];
                self.collect_errors(rest_ty, &mut validation, &mut path, v);
            }
        }

        self.enforce(validation)?;
        Ok(args)
    }

    /// Checks a function's return value against its declared return type,
    /// honoring the current assertion mode.
    pub fn assert_return(&self, func: TypeId, value: Value) -> Result<Value, TypeError> {
        if matches!(self.mode(), AssertionMode::Off) {
            return Ok(value);
        }
        let shape = match self.engine.get(func) {
            DescriptorData::Function(shape) => shape,
            _ => return Ok(value),
        };

        let mut validation = Validation::new();
        if let Some(return_type) = shape.return_type {
            let mut path = vec![PathSegment::Return];
            self.collect_errors(return_type, &mut validation, &mut path, &value);
        }
        self.enforce(validation)?;
        Ok(value)
    }
}
