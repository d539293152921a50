//! Registry of callable functions, keyed by name.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use super::function::Function;

#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<dyn Function>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function, replacing any previous one with the same name.
    pub fn register(&mut self, function: Arc<dyn Function>) {
        self.functions.insert(function.name().to_string(), function);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Function>> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Look up each declared name. Names with no registered function are
    /// dropped so a dangling reference cannot break the conversation.
    pub fn resolve(&self, names: &[String]) -> Vec<Arc<dyn Function>> {
        names
            .iter()
            .filter_map(|name| {
                let found = self.functions.get(name).cloned();
                if found.is_none() {
                    warn!(function = %name, "declared function is not registered, skipping");
                }
                found
            })
            .collect()
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("FunctionRegistry").field("functions", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::{FunctionDefinition, FunctionParameters};

    fn echo(name: &str) -> Arc<dyn Function> {
        Arc::new(FunctionDefinition::new(
            name,
            "echo",
            FunctionParameters::empty(),
            |_args, _ctx| async { Ok("echo".to_string()) },
        ))
    }

    #[test]
    fn resolve_drops_unknown_names_and_keeps_order() {
        let mut registry = FunctionRegistry::new();
        registry.register(echo("a"));
        registry.register(echo("b"));

        let resolved = registry.resolve(&["b".into(), "ghost".into(), "a".into()]);
        let names: Vec<_> = resolved.iter().map(|f| f.name().to_string()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn register_replaces_same_name() {
        let mut registry = FunctionRegistry::new();
        registry.register(echo("a"));
        registry.register(echo("a"));
        assert_eq!(registry.len(), 1);
    }
}
