//! Per-pass compilation context.
//!
//! [`ConstructCtx`] carries the three pieces of state a compilation pass
//! needs: the current-environment binding stack, the fresh-local allocator,
//! and the registry of array types the back end must materialize. It is
//! threaded explicitly through `construct` calls; there is no ambient state.

use std::collections::{BTreeSet, HashMap};

use loft_types::TypeTag;

/// State for one compilation pass over an abstract expression tree.
#[derive(Debug, Default)]
pub struct ConstructCtx {
    /// Variable names bound to the current-environment placeholder,
    /// innermost last.
    env_bindings: Vec<String>,
    /// Next suffix per fresh-local base name.
    counters: HashMap<String, u32>,
    /// Element types whose array types code generation must materialize.
    array_types: BTreeSet<TypeTag>,
}

impl ConstructCtx {
    /// Create a fresh context for one compilation pass.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the current-environment placeholder to `var` for the duration
    /// of `f`.
    ///
    /// The binding is popped on every exit path, including error
    /// propagation out of `f`. Bindings nest LIFO; the innermost one wins.
    /// The outermost binding is the enclosing property-definition
    /// context's responsibility.
    pub fn bind_env<R>(&mut self, var: &str, f: impl FnOnce(&mut Self) -> R) -> R {
        self.env_bindings.push(var.to_owned());
        let result = f(self);
        self.env_bindings.pop();
        result
    }

    /// The variable currently bound to the placeholder, if any.
    pub(crate) fn current_env(&self) -> Option<&str> {
        self.env_bindings.last().map(String::as_str)
    }

    /// Allocate a fresh local name: `base_1`, `base_2`, ... per base name.
    pub(crate) fn fresh_var(&mut self, base: &str) -> String {
        let counter = self.counters.entry(base.to_owned()).or_insert(0);
        *counter += 1;
        format!("{base}_{counter}")
    }

    /// Record that the array type over `element` must be materialized.
    /// Idempotent.
    pub(crate) fn register_array_type(&mut self, element: TypeTag) {
        self.array_types.insert(element);
    }

    /// Element types registered during the pass, in stable order.
    pub fn array_types(&self) -> impl Iterator<Item = &TypeTag> {
        self.array_types.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_var_counts_per_base_name() {
        let mut ctx = ConstructCtx::new();
        assert_eq!(ctx.fresh_var("new_env"), "new_env_1");
        assert_eq!(ctx.fresh_var("group_env"), "group_env_1");
        assert_eq!(ctx.fresh_var("new_env"), "new_env_2");
    }

    #[test]
    fn test_bind_env_nests_and_unwinds() {
        let mut ctx = ConstructCtx::new();
        assert_eq!(ctx.current_env(), None);

        ctx.bind_env("outer", |ctx| {
            assert_eq!(ctx.current_env(), Some("outer"));
            ctx.bind_env("inner", |ctx| {
                assert_eq!(ctx.current_env(), Some("inner"));
            });
            assert_eq!(ctx.current_env(), Some("outer"));
        });
        assert_eq!(ctx.current_env(), None);
    }

    #[test]
    fn test_bind_env_unwinds_on_error_paths() {
        let mut ctx = ConstructCtx::new();
        let result: Result<(), ()> = ctx.bind_env("env_var", |_| Err(()));
        assert!(result.is_err());
        assert_eq!(ctx.current_env(), None);
    }

    #[test]
    fn test_array_type_registration_is_idempotent() {
        let mut ctx = ConstructCtx::new();
        ctx.register_array_type(TypeTag::Element);
        ctx.register_array_type(TypeTag::Element);
        ctx.register_array_type(TypeTag::LexicalEnv);
        let registered: Vec<_> = ctx.array_types().cloned().collect();
        assert_eq!(registered, vec![TypeTag::LexicalEnv, TypeTag::Element]);
    }
}
