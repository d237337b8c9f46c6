//! The host-supplied primitive-operation registry (spec §6: "Interface
//! consumed from the collaborator").
//!
//! The evaluator never interprets what a primitive op does; it only knows
//! how many arguments to accumulate before calling out. The actual
//! implementation -- arithmetic, string operations, or an LLM-backed
//! handler -- is supplied by whoever embeds this crate (the session
//! layer, in this workspace).

use rustc_hash::FxHashMap;

use crate::error::EvalError;
use crate::value::Value;

/// A primitive operation's implementation: a function from its argument
/// list, in source order, to a result value.
pub trait PrimitiveHandler {
    fn call(&self, args: &[Value]) -> Result<Value, EvalError>;
}

impl<F> PrimitiveHandler for F
where
    F: Fn(&[Value]) -> Result<Value, EvalError>,
{
    fn call(&self, args: &[Value]) -> Result<Value, EvalError> {
        self(args)
    }
}

/// Looked up by bare name (without the `$prim.` prefix) at the point a
/// saturated `PrimOp` value is applied.
pub trait PrimitiveRegistry {
    fn call(&self, name: &str, args: &[Value]) -> Result<Value, EvalError>;
}

/// A straightforward map-backed [`PrimitiveRegistry`]: the host registers
/// one boxed handler per primitive-op name, and an unregistered name
/// fails with `MissingPrimitive` rather than panicking -- the spec's
/// `prim_op` declarations are allowed to type-check with no handler ever
/// registered (spec invariant 13), so the failure has to be a normal
/// `Result`, discovered only when the operation is actually called.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: FxHashMap<String, Box<dyn PrimitiveHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, handler: impl PrimitiveHandler + 'static) {
        self.handlers.insert(name.into(), Box::new(handler));
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }
}

impl PrimitiveRegistry for HandlerRegistry {
    fn call(&self, name: &str, args: &[Value]) -> Result<Value, EvalError> {
        match self.handlers.get(name) {
            Some(handler) => handler.call(args),
            None => Err(EvalError::MissingPrimitive { name: name.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calling_an_unregistered_primitive_fails() {
        let registry = HandlerRegistry::new();
        let err = registry.call("translate", &[]).unwrap_err();
        assert!(matches!(err, EvalError::MissingPrimitive { ref name } if name == "translate"));
    }

    #[test]
    fn calling_a_registered_primitive_invokes_it() {
        let mut registry = HandlerRegistry::new();
        registry.register("int_plus", |args: &[Value]| match args {
            [Value::Int(a), Value::Int(b)] => Ok(Value::Int(a + b)),
            _ => unreachable!(),
        });
        let result = registry.call("int_plus", &[Value::Int(1), Value::Int(2)]).unwrap();
        assert!(matches!(result, Value::Int(3)));
    }
}
