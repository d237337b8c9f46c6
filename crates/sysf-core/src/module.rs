use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::types::Type;

/// Everything the elaborator records about a `data` declaration's
/// constructor: which data type it belongs to, that type's generic
/// parameters, and the constructor's own field types.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstructorInfo {
    pub data_type: String,
    pub type_params: Vec<String>,
    pub field_types: Vec<Type>,
}

impl ConstructorInfo {
    /// The constructor's fully-generalized type: for `T a1 … an = … | Ci f1
    /// … fk | …` this is `∀a1…an. f1 → … → fk → T a1 … an`.
    pub fn scheme(&self) -> Type {
        let result = Type::con(
            self.data_type.clone(),
            self.type_params
                .iter()
                .map(|v| Type::Var(v.clone()))
                .collect(),
        );
        let body = if self.field_types.is_empty() {
            result
        } else {
            Type::arrow(self.field_types.clone(), result)
        };
        Type::foralls(&self.type_params, body)
    }
}

/// A registered `data` declaration's own identity: its generic parameters
/// and the names of its constructors, in declaration order. Used by the
/// checker's lenient exhaustiveness rule, which needs to know the full set
/// of constructors for a scrutinee's data type.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DataTypeInfo {
    pub type_params: Vec<String>,
    pub ctors: Vec<String>,
}

/// A registered `prim_type` declaration: an opaque type constructor with no
/// further structure visible to the checker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimitiveTypeDecl {
    pub name: String,
}

/// Metadata recorded for a `prim_op` whose pragma carries an `LLM` tag.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LlmMetadata {
    pub description: Option<String>,
    pub arg_types: Vec<Type>,
    pub arg_docs: Vec<Option<String>>,
    /// The pragma's remaining key=value pairs, verbatim (e.g. `model`,
    /// `temperature`). The bare `LLM` tag itself is not duplicated here.
    pub tags: FxHashMap<String, String>,
}

/// The mutable aggregate of accepted declarations, shared across every
/// input in a session. `V` is the runtime value representation: `sysf-core`
/// has no dependency on the evaluator, so it is threaded through as a type
/// parameter and instantiated by whichever crate owns `Value`.
#[derive(Debug, Clone, Serialize)]
pub struct Module<V> {
    /// Every global name's type: user globals, constructor schemes, and
    /// primitive ops -- the latter keyed under their `$prim.`-prefixed
    /// name, per spec §3.3.
    pub global_types: FxHashMap<String, Type>,
    /// Populated lazily after a term declaration's body is evaluated.
    /// Never holds primitive ops -- those are dispatched through a
    /// primitive registry supplied by the host, not stored here.
    pub global_values: FxHashMap<String, V>,
    pub constructors: FxHashMap<String, ConstructorInfo>,
    pub data_types: FxHashMap<String, DataTypeInfo>,
    pub primitive_types: FxHashMap<String, PrimitiveTypeDecl>,
    /// Top-level docs keyed by name, and per-parameter docs keyed by
    /// `<name>/arg<i>` (0-based position in the flattened arrow chain).
    pub docstrings: FxHashMap<String, String>,
    pub llm_functions: FxHashMap<String, LlmMetadata>,
}

impl<V> Default for Module<V> {
    fn default() -> Self {
        Module {
            global_types: FxHashMap::default(),
            global_values: FxHashMap::default(),
            constructors: FxHashMap::default(),
            data_types: FxHashMap::default(),
            primitive_types: FxHashMap::default(),
            docstrings: FxHashMap::default(),
            llm_functions: FxHashMap::default(),
        }
    }
}

impl<V> Module<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_data_type(&mut self, name: String, type_params: Vec<String>) {
        self.data_types.entry(name).or_insert_with(|| DataTypeInfo {
            type_params,
            ctors: Vec::new(),
        });
    }

    pub fn register_constructor(&mut self, name: String, info: ConstructorInfo) {
        self.global_types.insert(name.clone(), info.scheme());
        if let Some(data_type) = self.data_types.get_mut(&info.data_type) {
            data_type.ctors.push(name.clone());
        }
        self.constructors.insert(name, info);
    }

    pub fn register_primitive_type(&mut self, decl: PrimitiveTypeDecl) {
        self.primitive_types.insert(decl.name.clone(), decl);
    }

    /// Look up a primitive op's declared type by its bare name (without the
    /// `$prim.` prefix) -- the table itself stores it under the prefixed
    /// key, so this adds the prefix back on before looking it up.
    pub fn primitive_type(&self, name: &str) -> Option<&Type> {
        self.global_types.get(&format!("$prim.{name}"))
    }
}
