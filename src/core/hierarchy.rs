//! Dot-namespaced logger tree
//!
//! Nodes live in an arena; each keeps the index of its nearest registered
//! ancestor, so `Sound.Speaker` hangs off `Sound` if `Sound` is registered and
//! off the root otherwise. Registering an intermediate name later re-parents
//! the descendants that were attached past it.

use super::error::{LoggerError, Result};
use super::handler::Handler;
use super::severity::{LevelSetting, Severity};
use std::collections::HashMap;
use std::sync::Arc;

/// Level used when the chain bottoms out without an explicit setting
pub const ROOT_DEFAULT_LEVEL: Severity = Severity::Warning;

const ROOT: usize = 0;

#[derive(Debug, Clone)]
pub struct LoggerNode {
    pub name: String,
    pub level: LevelSetting,
    pub handlers: Vec<Arc<Handler>>,
    pub propagate: bool,
    parent: Option<usize>,
}

impl LoggerNode {
    fn new(name: String, parent: Option<usize>) -> Self {
        Self {
            name,
            level: LevelSetting::NotSet,
            handlers: Vec::new(),
            propagate: true,
            parent,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Hierarchy {
    nodes: Vec<LoggerNode>,
    index: HashMap<String, usize>,
}

impl Default for Hierarchy {
    fn default() -> Self {
        Self::new()
    }
}

/// `a.b.c` -> `a.b`; `a` -> `None`
fn parent_name(name: &str) -> Option<&str> {
    name.rfind('.').map(|pos| &name[..pos])
}

fn is_descendant_name(candidate: &str, ancestor: &str) -> bool {
    candidate.len() > ancestor.len()
        && candidate.starts_with(ancestor)
        && candidate.as_bytes()[ancestor.len()] == b'.'
}

fn validate_name(name: &str) -> Result<()> {
    if name.split('.').any(str::is_empty) {
        return Err(LoggerError::config(
            "logger",
            format!("invalid logger name '{}'", name),
        ));
    }
    Ok(())
}

impl Hierarchy {
    /// A tree holding only the root, at WARNING with no handlers
    pub fn new() -> Self {
        let mut root = LoggerNode::new(String::new(), None);
        root.level = LevelSetting::Level(ROOT_DEFAULT_LEVEL);
        let mut index = HashMap::new();
        index.insert(String::new(), ROOT);
        Self {
            nodes: vec![root],
            index,
        }
    }

    pub fn root(&self) -> &LoggerNode {
        &self.nodes[ROOT]
    }

    pub fn get(&self, name: &str) -> Option<&LoggerNode> {
        self.index.get(name).map(|&idx| &self.nodes[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Registered names, root excluded, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .index
            .keys()
            .filter(|name| !name.is_empty())
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Index of the nearest registered node at or above `name`
    fn nearest(&self, name: &str) -> usize {
        let mut current = Some(name);
        while let Some(candidate) = current {
            if let Some(&idx) = self.index.get(candidate) {
                return idx;
            }
            current = parent_name(candidate);
        }
        ROOT
    }

    /// Register `name` (and return its node), creating it with NOTSET if absent
    pub fn ensure(&mut self, name: &str) -> Result<&mut LoggerNode> {
        if let Some(&idx) = self.index.get(name) {
            return Ok(&mut self.nodes[idx]);
        }
        validate_name(name)?;

        let parent = self.nearest(name);
        let idx = self.nodes.len();
        self.nodes
            .push(LoggerNode::new(name.to_string(), Some(parent)));
        self.index.insert(name.to_string(), idx);

        // Re-parent descendants that skipped over this name
        for child in 0..idx {
            let Some(current_parent) = self.nodes[child].parent else {
                continue;
            };
            if current_parent == parent && is_descendant_name(&self.nodes[child].name, name) {
                self.nodes[child].parent = Some(idx);
            }
        }

        Ok(&mut self.nodes[idx])
    }

    pub fn root_mut(&mut self) -> &mut LoggerNode {
        &mut self.nodes[ROOT]
    }

    /// Set a node's level, registering it if needed. The root may not be
    /// NOTSET.
    pub fn set_level(&mut self, name: &str, level: LevelSetting) -> Result<()> {
        if name.is_empty() && !level.is_set() {
            return Err(LoggerError::config("root", "root logger level cannot be NOTSET"));
        }
        self.ensure(name)?.level = level;
        Ok(())
    }

    /// First explicit level found walking from `name` towards the root.
    ///
    /// Unregistered names resolve through their nearest registered ancestor.
    pub fn effective_level(&self, name: &str) -> Severity {
        let mut current = Some(self.nearest(name));
        while let Some(idx) = current {
            let node = &self.nodes[idx];
            if let Some(level) = node.level.explicit() {
                return level;
            }
            current = node.parent;
        }
        ROOT_DEFAULT_LEVEL
    }

    /// Handlers a record from `name` reaches: the logger's own, then each
    /// ancestor's, stopping after the first node with `propagate = false`
    pub fn handlers_for(&self, name: &str) -> Vec<Arc<Handler>> {
        let mut handlers = Vec::new();
        let mut current = Some(self.nearest(name));
        while let Some(idx) = current {
            let node = &self.nodes[idx];
            handlers.extend(node.handlers.iter().cloned());
            if !node.propagate {
                break;
            }
            current = node.parent;
        }
        handlers
    }

    /// Name of the parent node, `None` for the root
    pub fn parent_of(&self, name: &str) -> Option<&str> {
        let idx = *self.index.get(name)?;
        self.nodes[idx]
            .parent
            .map(|parent| self.nodes[parent].name.as_str())
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut LoggerNode> {
        self.nodes.iter_mut()
    }

    pub(crate) fn nodes(&self) -> impl Iterator<Item = &LoggerNode> {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_defaults_to_warning() {
        let tree = Hierarchy::new();
        assert_eq!(tree.effective_level(""), Severity::Warning);
        assert_eq!(tree.effective_level("Sound"), Severity::Warning);
        assert!(tree.handlers_for("Sound").is_empty());
    }

    #[test]
    fn test_notset_inherits_from_ancestor() {
        let mut tree = Hierarchy::new();
        tree.set_level("", LevelSetting::Level(Severity::Error)).unwrap();
        tree.ensure("Sound").unwrap();
        assert_eq!(tree.effective_level("Sound"), Severity::Error);

        tree.set_level("Sound", LevelSetting::Level(Severity::Debug)).unwrap();
        tree.ensure("Sound.Speaker").unwrap();
        assert_eq!(tree.effective_level("Sound.Speaker"), Severity::Debug);
        assert_eq!(tree.effective_level("Sound.Speaker.Left"), Severity::Debug);
    }

    #[test]
    fn test_late_intermediate_reparents() {
        let mut tree = Hierarchy::new();
        tree.ensure("a.b.c").unwrap();
        tree.ensure("a.x").unwrap();
        assert_eq!(tree.parent_of("a.b.c"), Some(""));

        tree.set_level("a", LevelSetting::Level(Severity::Info)).unwrap();
        assert_eq!(tree.parent_of("a.b.c"), Some("a"));
        assert_eq!(tree.parent_of("a.x"), Some("a"));
        assert_eq!(tree.effective_level("a.b.c"), Severity::Info);

        tree.ensure("a.b").unwrap();
        assert_eq!(tree.parent_of("a.b.c"), Some("a.b"));
        assert_eq!(tree.parent_of("a.x"), Some("a"));
    }

    #[test]
    fn test_sibling_prefix_is_not_descendant() {
        let mut tree = Hierarchy::new();
        tree.ensure("Sounds").unwrap();
        tree.ensure("Sound").unwrap();
        assert_eq!(tree.parent_of("Sounds"), Some(""));
    }

    #[test]
    fn test_root_cannot_be_notset() {
        let mut tree = Hierarchy::new();
        let err = tree.set_level("", LevelSetting::NotSet).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_invalid_names_rejected() {
        let mut tree = Hierarchy::new();
        assert!(tree.ensure("a..b").is_err());
        assert!(tree.ensure(".a").is_err());
        assert!(tree.ensure("a.").is_err());
    }

    #[test]
    fn test_names_sorted_without_root() {
        let mut tree = Hierarchy::new();
        tree.ensure("Validators").unwrap();
        tree.ensure("Config").unwrap();
        assert_eq!(tree.names(), vec!["Config", "Validators"]);
    }
}
