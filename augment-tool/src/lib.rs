#![deny(missing_docs)]
//! Tool interface and registry for augment.
//!
//! Tools implement [`ToolDyn`] (or are built from closures with
//! [`ToolFn`]) and are collected in a [`ToolRegistry`], which implements
//! both [`ToolCatalog`] and [`ToolInvoker`].

use async_trait::async_trait;
use augment_core::{ToolCatalog, ToolError, ToolInvoker, ToolOutput, ToolSchema};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Boxed future returned by [`ToolDyn::call`].
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Object-safe tool.
pub trait ToolDyn: Send + Sync {
    /// Unique name.
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// JSON Schema of the arguments.
    fn input_schema(&self) -> serde_json::Value;

    /// Execute with JSON arguments.
    fn call(&self, input: serde_json::Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>>;

    /// Schema handed to providers.
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// A tool backed by an async closure.
pub struct ToolFn<F> {
    name: String,
    description: String,
    input_schema: serde_json::Value,
    handler: F,
}

impl<F, Fut> ToolFn<F>
where
    F: Fn(serde_json::Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ToolOutput, ToolError>> + Send + 'static,
{
    /// Wrap `handler` as a tool.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: serde_json::Value,
        handler: F,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            handler,
        }
    }
}

impl<F, Fut> ToolDyn for ToolFn<F>
where
    F: Fn(serde_json::Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ToolOutput, ToolError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> serde_json::Value {
        self.input_schema.clone()
    }

    fn call(&self, input: serde_json::Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin((self.handler)(input))
    }
}

/// Registry of tools, safe to mutate while sessions hold it.
///
/// Listing order is registration order. Re-registering a name replaces the
/// tool in place.
pub struct ToolRegistry {
    tools: RwLock<Vec<Arc<dyn ToolDyn>>>,
    revision: AtomicU64,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tools: RwLock::new(Vec::new()),
            revision: AtomicU64::new(0),
        }
    }

    /// Register a tool.
    pub fn register(&self, tool: Arc<dyn ToolDyn>) {
        let mut tools = self.tools.write().unwrap_or_else(PoisonError::into_inner);
        match tools.iter().position(|t| t.name() == tool.name()) {
            Some(idx) => tools[idx] = tool,
            None => tools.push(tool),
        }
        self.revision.fetch_add(1, Ordering::SeqCst);
    }

    /// Remove a tool by name. Returns whether it was present.
    pub fn unregister(&self, name: &str) -> bool {
        let mut tools = self.tools.write().unwrap_or_else(PoisonError::into_inner);
        let before = tools.len();
        tools.retain(|t| t.name() != name);
        let removed = tools.len() != before;
        if removed {
            self.revision.fetch_add(1, Ordering::SeqCst);
        }
        removed
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolDyn>> {
        self.tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|t| t.name() == name)
            .cloned()
    }

    /// Schemas of all registered tools.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|t| t.schema())
            .collect()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolCatalog for ToolRegistry {
    async fn list_tools(&self) -> Vec<ToolSchema> {
        self.schemas()
    }

    fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToolInvoker for ToolRegistry {
    async fn call(
        &self,
        name: &str,
        arguments: serde_json::Value,
        call_id: &str,
    ) -> Result<ToolOutput, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        tracing::debug!(tool = name, call_id, "augment.tool.call");
        let result = tool.call(arguments).await;
        if let Err(e) = &result {
            tracing::debug!(tool = name, call_id, error = %e, "augment.tool.failed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn echo() -> Arc<dyn ToolDyn> {
        Arc::new(ToolFn::new(
            "echo",
            "Echoes input",
            json!({"type": "object"}),
            |input: serde_json::Value| async move { Ok::<_, ToolError>(ToolOutput::json(input)) },
        ))
    }

    fn failing() -> Arc<dyn ToolDyn> {
        Arc::new(ToolFn::new(
            "fail",
            "Always fails",
            json!({"type": "object"}),
            |_input: serde_json::Value| async move {
                Err::<ToolOutput, _>(ToolError::ExecutionFailed("nope".into()))
            },
        ))
    }

    #[tokio::test]
    async fn call_registered_tool() {
        let registry = ToolRegistry::new();
        registry.register(echo());
        let out = ToolInvoker::call(&registry, "echo", json!({"a": 1}), "tu_1")
            .await
            .unwrap();
        assert_eq!(out, ToolOutput::json(json!({"a": 1})));
    }

    #[tokio::test]
    async fn unknown_tool_is_not_found() {
        let registry = ToolRegistry::new();
        let err = ToolInvoker::call(&registry, "missing", json!({}), "tu_1")
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound(name) if name == "missing"));
    }

    #[tokio::test]
    async fn tool_failure_propagates() {
        let registry = ToolRegistry::new();
        registry.register(failing());
        let err = ToolInvoker::call(&registry, "fail", json!({}), "tu_1")
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::ExecutionFailed(_)));
    }

    #[tokio::test]
    async fn listing_keeps_registration_order() {
        let registry = ToolRegistry::new();
        registry.register(echo());
        registry.register(failing());
        let names: Vec<String> = registry
            .list_tools()
            .await
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["echo", "fail"]);
    }

    #[test]
    fn revision_tracks_changes() {
        let registry = ToolRegistry::new();
        assert_eq!(registry.revision(), 0);
        registry.register(echo());
        assert_eq!(registry.revision(), 1);
        registry.register(echo());
        assert_eq!(registry.revision(), 2);
        assert_eq!(registry.len(), 1);
        assert!(!registry.unregister("missing"));
        assert_eq!(registry.revision(), 2);
        assert!(registry.unregister("echo"));
        assert_eq!(registry.revision(), 3);
        assert!(registry.is_empty());
    }
}
