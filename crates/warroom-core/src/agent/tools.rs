//! Tool contract for agents.
//!
//! A tool is any asynchronous capability invoked by name with a JSON
//! argument object. Return values are opaque to the runtime beyond being
//! stringified for the truncated observation summary.

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// An external asynchronous capability an agent may invoke by name.
#[async_trait]
pub trait AgentTool: Send + Sync {
    async fn invoke(&self, args: Value) -> Result<Value>;
}

type BoxedToolFn =
    Box<dyn Fn(Value) -> Pin<Box<dyn Future<Output = Result<Value>> + Send>> + Send + Sync>;

/// Adapter that turns an async closure into an [`AgentTool`].
///
/// ```no_run
/// use warroom_core::agent::tools::FnTool;
/// let tool = FnTool::new(|args| async move { Ok(args) });
/// ```
pub struct FnTool {
    func: BoxedToolFn,
}

impl FnTool {
    pub fn new<F, Fut>(func: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        Self {
            func: Box::new(move |args| Box::pin(func(args))),
        }
    }
}

#[async_trait]
impl AgentTool for FnTool {
    async fn invoke(&self, args: Value) -> Result<Value> {
        (self.func)(args).await
    }
}
