//! Action Registry

use crate::{ActionMeta, ActionPlugin, ExecContext};
use blas_core::{BlasError, Operands, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Central action registry
pub struct ActionRegistry {
    actions: HashMap<String, Arc<dyn ActionPlugin>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }

    pub fn with_action<A: ActionPlugin + 'static>(mut self, a: A) -> Self {
        let name = a.meta().name.to_lowercase();
        self.actions.insert(name, Arc::new(a));
        self
    }

    pub fn get_action(&self, name: &str) -> Option<&dyn ActionPlugin> {
        self.actions.get(&name.to_lowercase()).map(|a| a.as_ref())
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Locate `name` and invoke it.
    ///
    /// The flattened argument count is checked against the action's minimum
    /// before it runs. Results are appended to `ret`; on failure the results
    /// already appended stay there.
    pub fn invoke(
        &self,
        name: &str,
        parallel: bool,
        ctx: &ExecContext,
        args: &[Value],
        ret: &mut Vec<Value>,
    ) -> Result<(), BlasError> {
        let action = match self.get_action(name) {
            Some(a) => a,
            None => {
                // Find similar action names for better error message
                let similar = self.find_similar_actions(name);
                let mut err = BlasError::undefined_action(name);
                if !similar.is_empty() {
                    let suggestions: Vec<&str> = similar.iter().take(5).map(|s| s.as_str()).collect();
                    err = err.with_suggestion(format!(
                        "Similar: {}. Use list_actions() for full list.",
                        suggestions.join(", ")
                    ));
                }
                return Err(ctx.failure(name, err));
            }
        };

        let meta = action.meta();
        let count = Operands::flatten(args).len();
        if count < meta.min_args {
            return Err(ctx.failure(meta.name, BlasError::arg_count(meta.name, meta.min_args, count)));
        }

        tracing::debug!(action = meta.name, args = count, parallel, "invoking action");
        let before = ret.len();
        action.execute(parallel, ctx, args, ret).map_err(|e| {
            tracing::warn!(
                action = meta.name,
                code = %e.code,
                appended = ret.len() - before,
                "action failed: {}", e.message
            );
            ctx.failure(meta.name, e)
        })
    }

    /// Find action names similar to the given name (for error suggestions)
    fn find_similar_actions(&self, name: &str) -> Vec<String> {
        let name_lower = name.to_lowercase();
        let mut matches: Vec<(String, usize)> = self.actions.keys()
            .filter_map(|action_name| {
                let score = Self::similarity_score(&name_lower, action_name);
                if score > 0 {
                    Some((action_name.clone(), score))
                } else {
                    None
                }
            })
            .collect();

        // Sort by similarity score (higher = more similar), then by name
        matches.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        matches.into_iter().map(|(name, _)| name).collect()
    }

    /// Score how close `candidate` is to `query`.
    ///
    /// Action names are paths, so the last segment is compared as well as the
    /// full name.
    fn similarity_score(query: &str, candidate: &str) -> usize {
        let leaf = candidate.rsplit('/').next().unwrap_or(candidate);
        let query_leaf = query.rsplit('/').next().unwrap_or(query);
        let mut score = 0;

        if candidate == query || leaf == query_leaf {
            score += 150;
        } else if candidate.starts_with(query) || leaf.starts_with(query_leaf) {
            score += 100;
        } else if candidate.contains(query) || leaf.contains(query_leaf) {
            score += 50;
        } else if query_leaf.contains(leaf) {
            score += 30;
        }

        if score > 0 {
            let len_diff = query_leaf.len().abs_diff(leaf.len());
            if len_diff < 5 {
                score += 5 - len_diff;
            }
        }
        score
    }

    pub fn help(&self, name: Option<&str>) -> Result<serde_json::Value, BlasError> {
        match name {
            Some(n) => self.help_for(n),
            None => Ok(self.general_help()),
        }
    }

    fn help_for(&self, name: &str) -> Result<serde_json::Value, BlasError> {
        let action = self.get_action(name).ok_or_else(|| BlasError::undefined_action(name))?;
        serde_json::to_value(action.meta()).map_err(|e| BlasError::internal(e.to_string()))
    }

    fn general_help(&self) -> serde_json::Value {
        let mut by_category: HashMap<&'static str, Vec<&'static str>> = HashMap::new();
        for action in self.actions.values() {
            let meta = action.meta();
            by_category.entry(meta.category).or_default().push(meta.name);
        }
        for names in by_category.values_mut() {
            names.sort_unstable();
        }
        serde_json::json!({
            "actions": by_category,
            "usage": "Call help('action/name') for detailed help.",
        })
    }

    /// Metadata of every registered action, sorted by name
    pub fn list_actions(&self, category: Option<&str>) -> Vec<ActionMeta> {
        let mut metas: Vec<ActionMeta> = self.actions.values()
            .map(|a| a.meta())
            .filter(|m| category.map_or(true, |c| m.category == c))
            .collect();
        metas.sort_by_key(|m| m.name);
        metas
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blas_core::codes;

    struct Echo;

    impl ActionPlugin for Echo {
        fn meta(&self) -> ActionMeta {
            ActionMeta {
                name: "test/echo",
                description: "Append every flattened argument",
                usage: "echo(x, y, ...)",
                args: &[],
                min_args: 2,
                returns: "Any",
                examples: &[],
                category: "test",
                related: &[],
            }
        }

        fn execute(&self, _parallel: bool, _ctx: &ExecContext, args: &[Value], ret: &mut Vec<Value>) -> Result<(), BlasError> {
            for v in Operands::flatten(args).iter() {
                if v.as_text() == Some("boom") {
                    return Err(BlasError::domain_error("boom"));
                }
                ret.push(v.clone());
            }
            Ok(())
        }
    }

    fn registry() -> ActionRegistry {
        ActionRegistry::new().with_action(Echo)
    }

    #[test]
    fn test_invoke_by_name_case_insensitive() {
        let mut ret = Vec::new();
        registry()
            .invoke("TEST/Echo", false, &ExecContext::empty(), &[Value::from(1.0), Value::from(2.0)], &mut ret)
            .unwrap();
        assert_eq!(ret, vec![Value::from(1.0), Value::from(2.0)]);
    }

    #[test]
    fn test_min_args_counts_flattened() {
        let mut ret = Vec::new();
        let nested = vec![Value::List(vec![Value::from(1.0), Value::from(2.0)])];
        assert!(registry().invoke("test/echo", false, &ExecContext::empty(), &nested, &mut ret).is_ok());

        let err = registry()
            .invoke("test/echo", false, &ExecContext::empty(), &[Value::from(1.0)], &mut ret)
            .unwrap_err();
        assert_eq!(err.code, codes::ARG_COUNT);
    }

    #[test]
    fn test_failure_keeps_partial_results() {
        let mut ret = Vec::new();
        let ctx = ExecContext::new().with_plan("+!go");
        let args = vec![Value::from(1.0), Value::from("boom"), Value::from(3.0)];
        let err = registry().invoke("test/echo", false, &ctx, &args, &mut ret).unwrap_err();
        assert_eq!(ret, vec![Value::from(1.0)]);
        assert_eq!(err.action(), Some("test/echo"));
        assert_eq!(err.context.unwrap().plan.as_deref(), Some("+!go"));
    }

    #[test]
    fn test_unknown_action_suggests_similar() {
        let mut ret = Vec::new();
        let err = registry()
            .invoke("echo", false, &ExecContext::empty(), &[], &mut ret)
            .unwrap_err();
        assert_eq!(err.code, codes::UNDEFINED_ACTION);
        assert!(err.suggestion.unwrap().contains("test/echo"));
    }

    #[test]
    fn test_help_and_listing() {
        let reg = registry();
        let help = reg.help(Some("test/echo")).unwrap();
        assert_eq!(help["min_args"], 2);
        assert!(reg.help(Some("nope")).is_err());
        assert_eq!(reg.list_actions(Some("test")).len(), 1);
        assert!(reg.list_actions(Some("other")).is_empty());
        assert_eq!(reg.help(None).unwrap()["actions"]["test"][0], "test/echo");
    }
}
