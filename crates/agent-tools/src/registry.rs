//! Tool registry

use crate::Tool;
use std::sync::Arc;

/// The set of tools offered to the model
///
/// Populated once at startup and shared read-only afterwards, so no interior
/// locking is needed. Registration order is the order tools are advertised.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any earlier tool with the same name
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        if let Some(slot) = self.tools.iter_mut().find(|t| t.name() == tool.name()) {
            tracing::warn!(tool = tool.name(), "Replacing already registered tool");
            *slot = tool;
        } else {
            self.tools.push(tool);
        }
    }

    /// Builder-style registration
    pub fn with(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    /// All tools in registration order
    pub fn list_tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    /// Names of all tools in registration order
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
