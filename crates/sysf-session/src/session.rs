//! The session: the one piece of mutable, exclusively-owned state that
//! ties the pipeline crates together across inputs (spec §5, §6).

use std::fmt;

use sysf_common::span::Span;
use sysf_core::module::{LlmMetadata, Module};
use sysf_core::types::Type as CoreType;
use sysf_elab::Elaborator;
use sysf_eval::{Env, EvalError, Evaluator, HandlerRegistry, Value};

use crate::error::SysfError;

const PRELUDE_SOURCE: &str = include_str!("prelude.sysf");

/// The outcome of evaluating a one-off expression: its value plus the
/// type the checker synthesized for it, since a caller printing a REPL
/// result wants both (spec §6 `eval_expression`: "final value
/// (printable)" -- the type is carried alongside for display, not
/// required by the value itself).
#[derive(Debug, Clone)]
pub struct EvalOutcome {
    pub value: Value,
    pub ty: sysf_check::Ty,
}

impl fmt::Display for EvalOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.value, self.ty)
    }
}

/// Owns the persistent [`Module`] and the primitive-operation registry,
/// and drives every input -- the bundled prelude included -- through the
/// same lex/parse/elaborate/check/eval pipeline (spec §4.6: "there is no
/// special-case code path").
pub struct Session {
    module: Module<Value>,
    registry: HandlerRegistry,
}

impl Session {
    /// A session with the default arithmetic handlers registered and the
    /// bundled prelude already loaded. Panics if the prelude itself fails
    /// to load -- that would mean the shipped asset is broken, not that
    /// the caller did anything wrong.
    pub fn new() -> Self {
        let mut session = Session {
            module: Module::new(),
            registry: default_registry(),
        };
        session
            .load_prelude()
            .expect("bundled prelude failed to load");
        session
    }

    /// An empty session with no prelude and no registered primitives, for
    /// tests that want to control every declaration visible to the
    /// pipeline.
    pub fn bare() -> Self {
        Session {
            module: Module::new(),
            registry: HandlerRegistry::new(),
        }
    }

    /// The prelude is one `include_str!`-embedded asset (C11), but the
    /// parser has no statement terminator: two adjacent bare term
    /// declarations are ambiguous (the first's body greedily extends into
    /// an application of the second's name, since an identifier is a
    /// valid continuation of an application chain). `data`/`prim_type`/
    /// `prim_op` declarations don't have this problem -- they're
    /// introduced by dedicated keyword tokens a term's body can never
    /// absorb -- so only declaration-to-declaration adjacency between two
    /// term bindings is unsafe. Splitting the asset into one `load` call
    /// per blank-line-separated declaration sidesteps it entirely and
    /// matches how a REPL would feed in the same declarations one at a
    /// time anyway.
    fn load_prelude(&mut self) -> Result<(), SysfError> {
        for chunk in PRELUDE_SOURCE.split("\n\n") {
            let chunk = chunk.trim();
            if chunk.is_empty() {
                continue;
            }
            self.load(chunk)?;
        }
        Ok(())
    }

    /// Register (or replace) the handler for a primitive operation's bare
    /// name. The host collaborator calls this for every `prim_op` it
    /// intends to back, including LLM-backed ones (spec §6 "Interface
    /// consumed from the collaborator").
    pub fn register_primitive(
        &mut self,
        name: impl Into<String>,
        handler: impl sysf_eval::PrimitiveHandler + 'static,
    ) {
        self.registry.register(name, handler);
    }

    /// Load one input's worth of declarations. On success, every
    /// registry is updated and the accepted top-level names are
    /// returned, in declaration order. On any failure the module is left
    /// byte-for-byte as it was before the call (spec invariant 3).
    pub fn load(&mut self, source: &str) -> Result<Vec<String>, SysfError> {
        let (surface, parse_errors) = sysf_parser::parse(source);
        if !parse_errors.is_empty() {
            return Err(SysfError::Parse(parse_errors));
        }

        let mut elaborator = Elaborator::new(&self.module);
        let terms = elaborator
            .elaborate_program(&surface.decls)
            .map_err(SysfError::Elab)?;
        let scratch = elaborator.into_scratch();

        let mut working = self.module.clone();
        scratch.commit_into(&mut working);

        let mut accepted = Vec::with_capacity(terms.len());
        for term in &terms {
            sysf_check::check_term(&working, &term.body, &term.ty, term.span)
                .map_err(SysfError::Type)?;
            let evaluator = Evaluator::new(&working, &self.registry);
            let value = evaluator
                .eval(&term.body, &Env::empty())
                .map_err(SysfError::Eval)?;
            working.global_values.insert(term.name.clone(), value);
            accepted.push(term.name.clone());
        }

        self.module = working;
        Ok(accepted)
    }

    /// Elaborate, check, and evaluate a single term against the current
    /// module, without touching any registry -- an interactive
    /// expression names nothing for a later input to reference.
    pub fn eval_expression(&self, source: &str) -> Result<EvalOutcome, SysfError> {
        let (surface_term, parse_errors) = sysf_parser::parse_expression(source);
        if !parse_errors.is_empty() {
            return Err(SysfError::Parse(parse_errors));
        }
        let surface_term = surface_term.expect("no parse errors but no term produced");

        let mut elaborator = Elaborator::new(&self.module);
        let core_term = elaborator
            .elaborate_expression(&surface_term)
            .map_err(SysfError::Elab)?;

        let ty = sysf_check::infer_term(&self.module, &core_term, Span::new(0, source.len() as u32))
            .map_err(SysfError::Type)?;

        let evaluator = Evaluator::new(&self.module, &self.registry);
        let value = evaluator
            .eval(&core_term, &Env::empty())
            .map_err(SysfError::Eval)?;

        Ok(EvalOutcome { value, ty })
    }

    /// Looks up a user global or constructor's type under its own name, or
    /// -- since those share this same table under a `$prim.`-prefixed key
    /// (spec §3.3) -- a primitive op's declared type under its bare name.
    pub fn lookup_type(&self, name: &str) -> Option<&CoreType> {
        self.module
            .global_types
            .get(name)
            .or_else(|| self.module.global_types.get(&format!("$prim.{name}")))
    }

    /// `lookup_doc(name, None)` is the declaration's own `-- |` docstring;
    /// `lookup_doc(name, Some(i))` is the `-- ^` doc attached to the
    /// `i`-th (0-based) parameter of its flattened arrow chain.
    pub fn lookup_doc(&self, name: &str, arg_index: Option<usize>) -> Option<&str> {
        let key = match arg_index {
            Some(i) => format!("{name}/arg{i}"),
            None => name.to_string(),
        };
        self.module.docstrings.get(&key).map(String::as_str)
    }

    pub fn list_llm_functions(&self) -> Vec<(&str, &LlmMetadata)> {
        self.module
            .llm_functions
            .iter()
            .map(|(name, meta)| (name.as_str(), meta))
            .collect()
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

/// The arithmetic handlers the prelude's `prim_op` declarations assume
/// are present (spec §4.6). A host embedding this crate is free to
/// override any of these via [`Session::register_primitive`]; they are
/// installed up front only because the prelude otherwise declares
/// operations nothing implements.
fn default_registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry.register("int_plus", |args: &[Value]| match args {
        [Value::Int(a), Value::Int(b)] => Ok(Value::Int(a.wrapping_add(*b))),
        _ => unreachable!("int_plus is declared Int -> Int -> Int"),
    });
    registry.register("int_minus", |args: &[Value]| match args {
        [Value::Int(a), Value::Int(b)] => Ok(Value::Int(a.wrapping_sub(*b))),
        _ => unreachable!("int_minus is declared Int -> Int -> Int"),
    });
    registry.register("int_multiply", |args: &[Value]| match args {
        [Value::Int(a), Value::Int(b)] => Ok(Value::Int(a.wrapping_mul(*b))),
        _ => unreachable!("int_multiply is declared Int -> Int -> Int"),
    });
    registry.register("int_divide", |args: &[Value]| match args {
        [Value::Int(_), Value::Int(0)] => Err(EvalError::DivisionByZero),
        [Value::Int(a), Value::Int(b)] => Ok(Value::Int(a / b)),
        _ => unreachable!("int_divide is declared Int -> Int -> Int"),
    });
    registry
}
