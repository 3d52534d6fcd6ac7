//! Object-set resolution
//!
//! Turns the include/exclude pattern lists of an [`ObjectSet`] into a
//! deduplicated, order-preserving list of scene handles. Unknown include
//! patterns warn and contribute nothing; unknown exclude patterns are
//! silent.

use indexmap::IndexSet;
use log::warn;
use regex::Regex;

use crate::config::{ObjectSet, ObjectSetType};
use crate::scene::{short_name, NodeHandle, SceneAdapter};

/// Resolves object sets against a scene, applying a namespace prefix to
/// every pattern.
pub struct Gatherer<'a, S: SceneAdapter> {
    scene: &'a S,
    namespace: &'a str,
}

impl<'a, S: SceneAdapter> Gatherer<'a, S> {
    /// Creates a gatherer for the given scene and namespace.
    pub fn new(scene: &'a S, namespace: &'a str) -> Self {
        Gatherer { scene, namespace }
    }

    /// Returns `include \ exclude` for the set, deduplicated by handle, in
    /// include-iteration order.
    ///
    /// The set's own name joins the include patterns as an implicit root;
    /// the exclude side carves from whatever the include side produced and
    /// gets no implicit pattern.
    pub fn gather(&self, set: &ObjectSet) -> Vec<NodeHandle> {
        let included = self.resolve(
            set.include_type,
            &set.name,
            &set.include_objects,
            set.include_children,
            true,
        );
        let excluded = self.resolve(
            set.exclude_type,
            "",
            &set.exclude_objects,
            set.exclude_children,
            false,
        );

        included
            .into_iter()
            .filter(|handle| !excluded.contains(handle))
            .collect()
    }

    fn absolutify(&self, name: &str) -> String {
        if self.namespace.is_empty() {
            name.to_string()
        } else {
            format!("{}:{}", self.namespace, name)
        }
    }

    /// The set's own name acts as an implicit first pattern.
    fn patterns<'p>(root: &'p str, objects: &'p [String]) -> impl Iterator<Item = &'p str> {
        std::iter::once(root)
            .chain(objects.iter().map(String::as_str))
            .filter(|pattern| !pattern.is_empty())
    }

    fn resolve(
        &self,
        mode: ObjectSetType,
        root: &str,
        objects: &[String],
        with_children: bool,
        warn_on_miss: bool,
    ) -> IndexSet<NodeHandle> {
        let mut resolved = IndexSet::new();

        for pattern in Self::patterns(root, objects) {
            let hits = match mode {
                ObjectSetType::Nodes => self.from_name(pattern, with_children),
                ObjectSetType::Layers => self.scene.nodes_in_layer(&self.absolutify(pattern)),
                ObjectSetType::SelectionSets => {
                    self.scene.nodes_in_selection_set(&self.absolutify(pattern))
                }
                ObjectSetType::Regex => self.from_regex(pattern),
            };

            if hits.is_empty() && warn_on_miss {
                warn!("No nodes matched \"{pattern}\"");
            }

            resolved.extend(hits);
        }

        resolved
    }

    fn from_name(&self, pattern: &str, with_children: bool) -> Vec<NodeHandle> {
        let Some(handle) = self.scene.node_by_name(&self.absolutify(pattern)) else {
            return Vec::new();
        };

        let mut hits = vec![handle];
        if with_children {
            self.descend(handle, &mut hits);
        }

        hits
    }

    fn descend(&self, handle: NodeHandle, into: &mut Vec<NodeHandle>) {
        for child in self.scene.children(handle) {
            into.push(child);
            self.descend(child, into);
        }
    }

    fn from_regex(&self, pattern: &str) -> Vec<NodeHandle> {
        let regex = match Regex::new(pattern) {
            Ok(regex) => regex,
            Err(error) => {
                warn!("Skipping malformed pattern \"{pattern}\": {error}");
                return Vec::new();
            }
        };

        let prefix = if self.namespace.is_empty() {
            String::new()
        } else {
            format!("{}:", self.namespace)
        };

        self.scene
            .nodes()
            .into_iter()
            .filter(|handle| {
                let Ok(name) = self.scene.name(*handle) else {
                    return false;
                };
                name.starts_with(&prefix) && regex.is_match(short_name(&name))
            })
            .collect()
    }
}
