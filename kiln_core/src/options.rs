use syn::{parse_quote, Path};

/// Names the compiler looks for in source and emits into generated code.
#[derive(Debug, Clone)]
pub struct Options {
    /// Path of the runtime crate in generated code.
    pub runtime: Path,
    /// Item attribute declaring an instance.
    pub marker: String,
    /// Parameter attribute naming the classifier of a dependency.
    pub classifier: String,
    /// Function attribute selecting the constructor of a type.
    pub inject: String,
    /// Trait whose `&dyn` reference is passed through as the scope handle.
    pub scope: String,
    /// Appended to every generated factory name.
    pub suffix: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            runtime: parse_quote!(::kiln),
            marker: "instance".to_string(),
            classifier: "classifier".to_string(),
            inject: "inject".to_string(),
            scope: "Scope".to_string(),
            suffix: "KilnFactory".to_string(),
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn runtime(self, runtime: Path) -> Self {
        Self { runtime, ..self }
    }

    pub fn suffix(self, suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            ..self
        }
    }

    pub fn scope(self, scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            ..self
        }
    }
}
