//! Shape inference from a sample value (`spec.md` §4.1's `typeOf` and
//! §4.2's type-parameter recording both infer a descriptor from a `Value`
//! rather than from source syntax) and human-readable value descriptions
//! for diagnostics.

use crate::context::TypeContext;
use crate::descriptor::{FunctionShape, Member, ObjectShape, Param};
use crate::value::Value;

impl TypeContext {
    /// Build the most specific descriptor that exactly matches `value`'s
    /// shape. Round-trips with `accepts`: `ctx.accepts(ctx.infer_shape(v),
    /// &v)` is always `true`.
    pub fn infer_shape(&self, value: &Value) -> crate::descriptor::TypeId {
        match value {
            Value::Undefined => self.void(),
            Value::Null => self.null(),
            Value::Bool(_) => self.boolean(None),
            Value::Number(_) => self.number(None),
            Value::String(_) => self.string(None),
            Value::Symbol(_) => self.symbol(),
            Value::Array(items) => {
                if items.is_empty() {
                    self.array(self.empty())
                } else {
                    let member_shapes: Vec<_> = items.iter().map(|v| self.infer_shape(v)).collect();
                    let elem = self.normalize_union(member_shapes);
                    self.array(elem)
                }
            }
            Value::Object(map) => {
                let members = map
                    .iter()
                    .map(|(key, v)| Member::Property {
                        name: self.engine.intern(key),
                        type_id: self.infer_shape(v),
                        optional: false,
                    })
                    .collect();
                self.object(ObjectShape {
                    members,
                    ..Default::default()
                })
            }
            Value::Instance {
                class_name, fields, ..
            } => {
                let members = fields
                    .iter()
                    .map(|(key, v)| Member::Property {
                        name: self.engine.intern(key),
                        type_id: self.infer_shape(v),
                        optional: false,
                    })
                    .collect();
                let body = self.object(ObjectShape {
                    members,
                    ..Default::default()
                });
                let statics = self.object(ObjectShape::default());
                self.class(class_name, body, statics, vec![])
            }
            Value::Function(f) => {
                let params = (0..f.arity)
                    .map(|i| Param {
                        name: self.engine.intern(&format!("arg{i}")),
                        type_id: self.any(),
                        optional: false,
                    })
                    .collect();
                self.function(FunctionShape {
                    params,
                    rest: None,
                    return_type: None,
                })
            }
        }
    }

    /// A short human-readable description of a runtime value, used as the
    /// "actual" side of a `ValidationRecord`.
    pub(crate) fn describe_value(&self, value: &Value) -> String {
        match value {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => format!("boolean ({b})"),
            Value::Number(n) => format!("number ({n})"),
            Value::String(s) => format!("string (\"{s}\")"),
            Value::Symbol(s) => format!("symbol ({s})"),
            Value::Array(items) => format!("array of length {}", items.len()),
            Value::Object(_) => "object".to_string(),
            Value::Instance { class_name, .. } => format!("instance of {class_name}"),
            Value::Function(_) => "function".to_string(),
        }
    }
}
