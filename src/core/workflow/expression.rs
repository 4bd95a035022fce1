use rhai::{Engine, Scope};

/// Decides whether an event expression matches a trigger event name.
///
/// Implementations must not fail: any evaluation problem is a non-match.
pub trait ExpressionEvaluator: Send + Sync {
    fn evaluate(&self, expression: &str, trigger_name: &str) -> bool;
}

impl<F> ExpressionEvaluator for F
where
    F: Fn(&str, &str) -> bool + Send + Sync,
{
    fn evaluate(&self, expression: &str, trigger_name: &str) -> bool {
        self(expression, trigger_name)
    }
}

/// Rhai-backed evaluator. The trigger name is bound to the `trigger`
/// variable, so `trigger == "approved"` matches a trigger named `approved`.
pub struct RhaiExpressionEvaluator {
    engine: Engine,
}

impl Default for RhaiExpressionEvaluator {
    fn default() -> Self {
        let mut engine = Engine::new_raw();
        engine.set_max_operations(50_000);
        engine.set_max_call_levels(64);
        engine.set_max_expr_depths(64, 64);
        engine.on_print(|_| {});
        engine.on_debug(|_, _, _| {});
        RhaiExpressionEvaluator { engine }
    }
}

impl RhaiExpressionEvaluator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExpressionEvaluator for RhaiExpressionEvaluator {
    fn evaluate(&self, expression: &str, trigger_name: &str) -> bool {
        let mut scope = Scope::new();
        scope.push_constant("trigger", trigger_name.to_string());
        match self
            .engine
            .eval_expression_with_scope::<bool>(&mut scope, expression)
        {
            Ok(matched) => matched,
            Err(err) => {
                tracing::warn!(expression, trigger = trigger_name, error = %err, "unable to evaluate expression");
                false
            }
        }
    }
}
