//! Tool registry.
//!
//! The registry is built once at startup and handed to the dispatcher. It
//! decides which tools are offered: the full set in production, or a reduced
//! set where a deployment (or a test) wants fewer.

use crate::mcp::tools::{Tool, ToolDescriptor};

/// The fixed, ordered set of tools a server exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
}

impl ToolRegistry {
    /// A registry offering every known tool, in declaration order.
    #[must_use]
    pub fn full() -> Self {
        Self {
            tools: Tool::ALL.to_vec(),
        }
    }

    /// A registry offering only `tools`, in the given order. Duplicates are dropped.
    #[must_use]
    pub fn with_tools(tools: impl IntoIterator<Item = Tool>) -> Self {
        let mut unique = Vec::new();
        for tool in tools {
            if !unique.contains(&tool) {
                unique.push(tool);
            }
        }
        Self { tools: unique }
    }

    /// Descriptors for `tools/list`, in registry order.
    #[must_use]
    pub fn describe(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|tool| tool.descriptor()).collect()
    }

    /// Resolves a wire name to a registered tool.
    ///
    /// Returns `None` for unknown names and for known tools this registry
    /// does not offer.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Tool> {
        Tool::from_name(name).filter(|tool| self.tools.contains(tool))
    }

    /// Number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns `true` if no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_registry_in_declaration_order() {
        let registry = ToolRegistry::full();
        let names: Vec<_> = registry.describe().iter().map(|d| d.name).collect();
        assert_eq!(names.len(), Tool::ALL.len());
        assert_eq!(&names[..4], ["list_pages", "create_page", "update_page", "delete_page"]);
    }

    #[test]
    fn describe_is_idempotent() {
        let registry = ToolRegistry::full();
        assert_eq!(registry.describe(), registry.describe());
    }

    #[test]
    fn reduced_registry_hides_other_tools() {
        let registry = ToolRegistry::with_tools([Tool::ListPosts, Tool::ListPosts, Tool::GetPost]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup("get_post"), Some(Tool::GetPost));
        assert_eq!(registry.lookup("create_page"), None);
        assert_eq!(registry.lookup("bogus_tool"), None);
    }

    #[test]
    fn lookup_resolves_every_offered_tool() {
        let registry = ToolRegistry::full();
        for tool in Tool::ALL {
            assert_eq!(registry.lookup(tool.name()), Some(tool));
        }
        assert_eq!(registry.lookup("List_Pages"), None);
    }

    #[test]
    fn empty_registry() {
        let registry = ToolRegistry::with_tools(Vec::new());
        assert!(registry.is_empty());
        assert!(registry.describe().is_empty());
    }
}
