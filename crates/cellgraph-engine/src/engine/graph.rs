//! Bidirectional dependency graph over string keys.
//!
//! An edge `(s, t)` means "`t` depends on `s`": `t`'s formula references `s`,
//! so `s` must be evaluated before `t`. For every key we keep both directions:
//!
//! - **dependents** of `s`: every `t` with an edge `(s, t)`
//! - **dependees** of `t`: every `s` with an edge `(s, t)`
//!
//! The graph knows nothing about cells, values or formulas. Keys are opaque and
//! expected to be normalized by the caller.

use std::collections::{HashMap, HashSet};

/// A set of ordered pairs `(s, t)` with O(1) membership queries in both directions.
#[derive(Clone, Debug, Default)]
pub struct DependencyGraph {
    dependents: HashMap<String, HashSet<String>>,
    dependees: HashMap<String, HashSet<String>>,
    size: usize,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `(s, t)` pairs in the graph.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of dependees of `s` (0 for unknown keys).
    pub fn dependee_count(&self, s: &str) -> usize {
        self.dependees.get(s).map_or(0, HashSet::len)
    }

    pub fn has_dependents(&self, s: &str) -> bool {
        self.dependents.get(s).is_some_and(|set| !set.is_empty())
    }

    pub fn has_dependees(&self, s: &str) -> bool {
        self.dependees.get(s).is_some_and(|set| !set.is_empty())
    }

    /// Whether the pair `(s, t)` is present.
    pub fn contains(&self, s: &str, t: &str) -> bool {
        self.dependents.get(s).is_some_and(|set| set.contains(t))
    }

    /// Snapshot of the keys that depend on `s`.
    pub fn dependents(&self, s: &str) -> HashSet<String> {
        self.dependents.get(s).cloned().unwrap_or_default()
    }

    /// Snapshot of the keys that `s` depends on.
    pub fn dependees(&self, s: &str) -> HashSet<String> {
        self.dependees.get(s).cloned().unwrap_or_default()
    }

    /// Borrowing iterator over the dependents of `s`, used by graph walks that
    /// don't need an owned snapshot.
    pub fn iter_dependents<'a>(&'a self, s: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.dependents
            .get(s)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Add the pair `(s, t)`. No-op if it is already present.
    pub fn add_dependency(&mut self, s: &str, t: &str) {
        if self.contains(s, t) {
            return;
        }
        self.dependents
            .entry(s.to_string())
            .or_default()
            .insert(t.to_string());
        self.dependees
            .entry(t.to_string())
            .or_default()
            .insert(s.to_string());
        self.size += 1;
    }

    /// Remove the pair `(s, t)`. No-op if it is absent.
    pub fn remove_dependency(&mut self, s: &str, t: &str) {
        if !self.contains(s, t) {
            return;
        }
        if let Some(set) = self.dependents.get_mut(s) {
            set.remove(t);
            if set.is_empty() {
                self.dependents.remove(s);
            }
        }
        if let Some(set) = self.dependees.get_mut(t) {
            set.remove(s);
            if set.is_empty() {
                self.dependees.remove(t);
            }
        }
        self.size -= 1;
    }

    /// Remove every pair `(s, r)`, then add `(s, t)` for each `t` in `new_dependents`.
    pub fn replace_dependents<I, S>(&mut self, s: &str, new_dependents: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for old in self.dependents(s) {
            self.remove_dependency(s, &old);
        }
        for t in new_dependents {
            self.add_dependency(s, t.as_ref());
        }
    }

    /// Remove every pair `(r, s)`, then add `(t, s)` for each `t` in `new_dependees`.
    pub fn replace_dependees<I, S>(&mut self, s: &str, new_dependees: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for old in self.dependees(s) {
            self.remove_dependency(&old, s);
        }
        for t in new_dependees {
            self.add_dependency(t.as_ref(), s);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_graph() {
        let g = DependencyGraph::new();
        assert_eq!(g.len(), 0);
        assert!(g.is_empty());
        assert!(g.dependents("a").is_empty());
        assert!(g.dependees("a").is_empty());
        assert_eq!(g.dependee_count("a"), 0);
        assert!(!g.has_dependents("a"));
        assert!(!g.has_dependees("a"));
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut g = DependencyGraph::new();
        g.add_dependency("a", "b");
        g.add_dependency("a", "b");
        assert_eq!(g.len(), 1);
        assert_eq!(g.dependents("a"), set(&["b"]));
        assert_eq!(g.dependees("b"), set(&["a"]));
        assert!(g.has_dependents("a"));
        assert!(g.has_dependees("b"));
        assert!(!g.has_dependees("a"));
    }

    #[test]
    fn test_remove_missing_pair_is_noop() {
        let mut g = DependencyGraph::new();
        g.add_dependency("a", "b");
        g.remove_dependency("b", "a");
        g.remove_dependency("x", "y");
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn test_remove_then_add_restores_graph() {
        let mut g = DependencyGraph::new();
        g.add_dependency("a", "b");
        g.add_dependency("a", "c");
        g.add_dependency("d", "c");

        g.remove_dependency("a", "c");
        assert_eq!(g.len(), 2);
        assert_eq!(g.dependees("c"), set(&["d"]));

        g.add_dependency("a", "c");
        assert_eq!(g.len(), 3);
        assert_eq!(g.dependents("a"), set(&["b", "c"]));
        assert_eq!(g.dependees("c"), set(&["a", "d"]));
    }

    #[test]
    fn test_removing_last_edge_drops_keys() {
        let mut g = DependencyGraph::new();
        g.add_dependency("a", "b");
        g.remove_dependency("a", "b");
        assert!(g.is_empty());
        assert!(g.dependents.is_empty());
        assert!(g.dependees.is_empty());
    }

    #[test]
    fn test_self_edge() {
        let mut g = DependencyGraph::new();
        g.add_dependency("a", "a");
        assert_eq!(g.dependents("a"), set(&["a"]));
        assert_eq!(g.dependees("a"), set(&["a"]));
        g.remove_dependency("a", "a");
        assert!(g.is_empty());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut g = DependencyGraph::new();
        g.add_dependency("a", "b");
        let mut snapshot = g.dependents("a");
        snapshot.insert("zzz".to_string());
        assert_eq!(g.dependents("a"), set(&["b"]));
    }

    #[test]
    fn test_replace_dependees() {
        let mut g = DependencyGraph::new();
        g.add_dependency("a", "c");
        g.add_dependency("b", "c");
        g.add_dependency("c", "d");

        g.replace_dependees("c", ["x", "y", "x"]);
        assert_eq!(g.dependees("c"), set(&["x", "y"]));
        assert!(g.dependents("a").is_empty());
        assert_eq!(g.dependents("c"), set(&["d"]));
        assert_eq!(g.len(), 3);
        assert_eq!(g.dependee_count("c"), 2);

        g.replace_dependees("c", Vec::<String>::new());
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn test_replace_dependents() {
        let mut g = DependencyGraph::new();
        g.add_dependency("a", "b");
        g.add_dependency("a", "c");

        g.replace_dependents("a", ["d"]);
        assert_eq!(g.dependents("a"), set(&["d"]));
        assert!(g.dependees("b").is_empty());
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn test_many_edges() {
        let mut g = DependencyGraph::new();
        for i in 0..100 {
            for j in (i + 1)..100 {
                g.add_dependency(&i.to_string(), &j.to_string());
            }
        }
        assert_eq!(g.len(), 100 * 99 / 2);
        assert_eq!(g.dependee_count("99"), 99);
        for i in 0..100 {
            g.remove_dependency(&i.to_string(), "99");
        }
        assert_eq!(g.dependee_count("99"), 0);
        assert_eq!(g.len(), 100 * 99 / 2 - 99);
    }
}
