//! Execution Context

use blas_core::BlasError;

/// Windows/items needed before a parallel-permitted call fans out
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 2;

/// Execution context passed to actions.
///
/// Actions read it for configuration and use it to decorate failures; they
/// never mutate it.
#[derive(Debug, Clone)]
pub struct ExecContext {
    /// Plan (or rule) the action was invoked from
    pub plan: Option<String>,
    /// Minimum number of independent windows/items worth parallelizing
    pub parallel_threshold: usize,
    /// Seed for randomized algorithms; entropy-seeded when absent
    pub seed: Option<u64>,
}

impl ExecContext {
    pub fn new() -> Self {
        Self {
            plan: None,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            seed: None,
        }
    }

    /// Context with no enclosing plan, as used by direct calls and tests
    pub fn empty() -> Self {
        Self::new()
    }

    pub fn with_plan(mut self, plan: impl Into<String>) -> Self {
        self.plan = Some(plan.into());
        self
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Whether `items` independent units should run on the thread pool
    pub fn fan_out(&self, parallel: bool, items: usize) -> bool {
        parallel && items >= self.parallel_threshold.max(2)
    }

    /// Attach this context to a failure raised by `action`
    pub fn failure(&self, action: &str, err: BlasError) -> BlasError {
        let err = if err.action().is_none() { err.in_action(action) } else { err };
        match &self.plan {
            Some(plan) => err.in_plan(plan.clone()),
            None => err,
        }
    }
}

impl Default for ExecContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_carries_plan_and_action() {
        let ctx = ExecContext::new().with_plan("+!main");
        let err = ctx.failure("math/blas/multiply", BlasError::domain_error("x"));
        let c = err.context.unwrap();
        assert_eq!(c.plan.as_deref(), Some("+!main"));
        assert_eq!(c.action.as_deref(), Some("math/blas/multiply"));
    }

    #[test]
    fn test_failure_keeps_existing_action() {
        let ctx = ExecContext::empty();
        let err = ctx.failure("outer", BlasError::arg_count("inner", 2, 1));
        assert_eq!(err.action(), Some("inner"));
    }

    #[test]
    fn test_fan_out_threshold() {
        let ctx = ExecContext::new().with_parallel_threshold(4);
        assert!(!ctx.fan_out(true, 3));
        assert!(ctx.fan_out(true, 4));
        assert!(!ctx.fan_out(false, 100));
        // A single unit never fans out
        assert!(!ExecContext::new().with_parallel_threshold(0).fan_out(true, 1));
    }
}
