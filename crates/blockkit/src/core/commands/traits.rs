//! Command Trait Definition
//!
//! Defines the handler trait every registered command implements, the
//! context handed to it, and the optional description metadata.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;

use crate::core::{engine::BlockEngine, CoreResult};

/// Context passed to every command invocation
#[derive(Clone)]
pub struct CommandContext {
    engine: Arc<dyn BlockEngine>,
}

impl CommandContext {
    pub fn new(engine: Arc<dyn BlockEngine>) -> Self {
        Self { engine }
    }

    /// Host engine the command operates on
    pub fn engine(&self) -> &dyn BlockEngine {
        self.engine.as_ref()
    }
}

impl std::fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext").finish_non_exhaustive()
    }
}

/// Optional metadata consumed by documentation and UI tooling.
///
/// The registry stores it but never interprets it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandDescription {
    /// Group used to cluster commands in menus (e.g. "arrange")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// Argument schema or example
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<serde_json::Value>,

    /// Return value schema or example
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<serde_json::Value>,
}

impl CommandDescription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }

    pub fn with_args(mut self, args: serde_json::Value) -> Self {
        self.args = Some(args);
        self
    }

    pub fn with_returns(mut self, returns: serde_json::Value) -> Self {
        self.returns = Some(returns);
        self
    }
}

/// Trait that all registered commands implement
///
/// # Example
/// ```rust,ignore
/// struct Echo;
///
/// #[async_trait]
/// impl CommandHandler for Echo {
///     async fn call(&self, _ctx: &CommandContext, params: Value) -> CoreResult<Value> {
///         Ok(params)
///     }
/// }
/// ```
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Runs the command.
    ///
    /// Errors are propagated unchanged to the caller of `execute_command`.
    async fn call(
        &self,
        ctx: &CommandContext,
        params: serde_json::Value,
    ) -> CoreResult<serde_json::Value>;
}

/// Handler backed by an async closure
pub struct FnCommand<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> CommandHandler for FnCommand<F>
where
    F: Fn(CommandContext, serde_json::Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CoreResult<serde_json::Value>> + Send + 'static,
{
    async fn call(
        &self,
        ctx: &CommandContext,
        params: serde_json::Value,
    ) -> CoreResult<serde_json::Value> {
        (self.f)(ctx.clone(), params).await
    }
}

/// Wraps an async closure as a command handler
pub fn command_fn<F, Fut>(f: F) -> Arc<dyn CommandHandler>
where
    F: Fn(CommandContext, serde_json::Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CoreResult<serde_json::Value>> + Send + 'static,
{
    Arc::new(FnCommand { f })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::MemoryEngine;

    #[test]
    fn test_description_serialization_skips_empty_fields() {
        let description = CommandDescription::new().with_group("arrange");
        let json = serde_json::to_value(&description).unwrap();
        assert_eq!(json, serde_json::json!({ "group": "arrange" }));
    }

    #[tokio::test]
    async fn test_command_fn_receives_context_and_params() {
        let engine = Arc::new(MemoryEngine::new());
        let block = engine.create_block("graphic");
        let ctx = CommandContext::new(engine);

        let handler = command_fn(|ctx, params| async move {
            let kind = ctx.engine().block_type(params["block"].as_u64().unwrap_or(0))?;
            Ok(serde_json::json!({ "kind": kind }))
        });

        let result = handler
            .call(&ctx, serde_json::json!({ "block": block }))
            .await
            .unwrap();
        assert_eq!(result, serde_json::json!({ "kind": "graphic" }));
    }
}
