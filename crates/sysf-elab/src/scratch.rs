use rustc_hash::FxHashMap;

use sysf_core::{ConstructorInfo, DataTypeInfo, LlmMetadata, Module, PrimitiveTypeDecl, Type};

/// Everything an elaboration pass adds to the module's registries, staged
/// separately from the persistent [`Module`] so that a failing input never
/// leaves a partial update behind (§5: the module is rolled back whole on
/// any error). The session merges a `ScratchModule` into its `Module` only
/// after the elaborated declarations go on to check and evaluate
/// successfully.
#[derive(Debug, Default)]
pub struct ScratchModule {
    pub global_types: FxHashMap<String, Type>,
    pub constructors: FxHashMap<String, ConstructorInfo>,
    pub data_types: FxHashMap<String, DataTypeInfo>,
    pub primitive_types: FxHashMap<String, PrimitiveTypeDecl>,
    pub docstrings: FxHashMap<String, String>,
    pub llm_functions: FxHashMap<String, LlmMetadata>,
}

impl ScratchModule {
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

    /// Is `name` a known data type, either already committed to `module` or
    /// staged in this scratch (so a single input may both declare and use a
    /// new data type)?
    pub fn has_data_type<V>(&self, module: &Module<V>, name: &str) -> bool {
        self.data_types.contains_key(name) || module.data_types.contains_key(name)
    }

    pub fn has_primitive_type<V>(&self, module: &Module<V>, name: &str) -> bool {
        self.primitive_types.contains_key(name) || module.primitive_types.contains_key(name)
    }

    pub fn lookup_global_type<'a, V>(&'a self, module: &'a Module<V>, name: &str) -> Option<&'a Type> {
        self.global_types
            .get(name)
            .or_else(|| module.global_types.get(name))
    }

    pub fn lookup_constructor<'a, V>(
        &'a self,
        module: &'a Module<V>,
        name: &str,
    ) -> Option<&'a ConstructorInfo> {
        self.constructors
            .get(name)
            .or_else(|| module.constructors.get(name))
    }

    /// Merge this scratch into the persistent module after a successful
    /// input. `global_values` is intentionally untouched here: the session
    /// populates it itself once evaluation of the accepted declarations has
    /// actually run.
    pub fn commit_into<V>(self, module: &mut Module<V>) {
        module.global_types.extend(self.global_types);
        module.constructors.extend(self.constructors);
        for (name, info) in self.data_types {
            module
                .data_types
                .entry(name)
                .or_insert_with(|| DataTypeInfo {
                    type_params: info.type_params.clone(),
                    ctors: Vec::new(),
                })
                .ctors
                .extend(info.ctors);
        }
        module.primitive_types.extend(self.primitive_types);
        module.docstrings.extend(self.docstrings);
        module.llm_functions.extend(self.llm_functions);
    }
}
