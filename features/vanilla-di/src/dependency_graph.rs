use std::collections::{BTreeSet, HashSet};

use indexmap::{map::Entry, IndexMap, IndexSet};
use thiserror::Error;

use crate::types::{TypeDescriptor, TypeInfo};

/// Graph of all discovered components
///
/// Nodes are exactly the given descriptors, in declaration order.
/// An edge `dependency -> dependent` exists when the dependent declares the
/// dependency and the dependency is itself a node. Dependencies on types
/// outside the graph are not edges, they are checked at instantiation.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    map: IndexMap<TypeInfo, DependencyGraphEntry>,
}

#[derive(Debug, Clone, Default)]
struct DependencyGraphEntry {
    /// In-graph dependencies, declared order, no repeats
    dependencies: Vec<usize>,
    /// Nodes depending on this one
    dependents: BTreeSet<usize>,
}

impl DependencyGraph {
    pub fn build(descriptors: &[TypeDescriptor]) -> Result<Self, DependencyGraphError> {
        let mut graph = Self::default();

        for descriptor in descriptors {
            match graph.map.entry(descriptor.info) {
                Entry::Occupied(existing) => {
                    return Err(DependencyGraphError::Duplicate(*existing.key()))
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(DependencyGraphEntry::default());
                }
            }
        }

        for (dependent, descriptor) in descriptors.iter().enumerate() {
            for dependency in &descriptor.dependencies {
                let Some(dependency) = graph.map.get_index_of(dependency) else {
                    continue;
                };
                graph.add_edge(dependency, dependent);
            }
        }

        tracing::trace!(
            nodes = graph.len(),
            edges = graph.edge_count(),
            "Built dependency graph"
        );

        Ok(graph)
    }

    fn add_edge(&mut self, dependency: usize, dependent: usize) {
        if !self.map[dependency].dependents.insert(dependent) {
            return;
        }
        self.map[dependent].dependencies.push(dependency);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains(&self, info: &TypeInfo) -> bool {
        self.map.contains_key(info)
    }

    /// All nodes in declaration order
    pub fn nodes(&self) -> impl Iterator<Item = TypeInfo> + '_ {
        self.map.keys().copied()
    }

    /// Nodes constructed from `info`, in declaration order
    pub fn dependents(&self, info: &TypeInfo) -> Vec<TypeInfo> {
        self.map
            .get(info)
            .map(|entry| entry.dependents.iter().map(|&i| self.info(i)).collect())
            .unwrap_or_default()
    }

    /// In-graph dependencies of `info`, in declared order
    pub fn dependencies(&self, info: &TypeInfo) -> Vec<TypeInfo> {
        self.map
            .get(info)
            .map(|entry| entry.dependencies.iter().map(|&i| self.info(i)).collect())
            .unwrap_or_default()
    }

    pub fn has_edge(&self, dependency: &TypeInfo, dependent: &TypeInfo) -> bool {
        match (self.map.get(dependency), self.map.get_index_of(dependent)) {
            (Some(entry), Some(dependent)) => entry.dependents.contains(&dependent),
            _ => false,
        }
    }

    /// Every `(dependency, dependent)` pair
    pub fn edges(&self) -> Vec<(TypeInfo, TypeInfo)> {
        self.map
            .iter()
            .flat_map(|(info, entry)| {
                entry
                    .dependents
                    .iter()
                    .map(move |&dependent| (*info, self.info(dependent)))
            })
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.map.values().map(|entry| entry.dependents.len()).sum()
    }

    /// Finds one closed dependency loop among `unsorted`
    ///
    /// Walks from the first unsorted node along its first unsorted dependency
    /// until a node repeats. Every node left over by the sorter still waits on
    /// another left-over node, so the walk always closes. Returns the loop in
    /// "needs" order (each entry depends on the next, the last on the first),
    /// or an empty list if `unsorted` holds no loop.
    pub fn find_cycle(&self, unsorted: &[TypeInfo]) -> Vec<TypeInfo> {
        let candidates: HashSet<usize> = unsorted
            .iter()
            .filter_map(|info| self.map.get_index_of(info))
            .collect();

        let Some(mut current) = unsorted
            .iter()
            .find_map(|info| self.map.get_index_of(info))
        else {
            return Vec::new();
        };

        let mut path = IndexSet::new();
        loop {
            if let Some(start) = path.get_index_of(&current) {
                return path
                    .iter()
                    .skip(start)
                    .map(|&index| self.info(index))
                    .collect();
            }
            path.insert(current);

            let next = self.map[current]
                .dependencies
                .iter()
                .copied()
                .find(|dependency| candidates.contains(dependency));

            match next {
                Some(next) => current = next,
                None => return Vec::new(),
            }
        }
    }

    pub(crate) fn info(&self, index: usize) -> TypeInfo {
        *self.map.get_index(index).expect("index of a graph node").0
    }

    pub(crate) fn dependents_of(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.map[index].dependents.iter().copied()
    }

    pub(crate) fn in_degrees(&self) -> Vec<usize> {
        self.map
            .values()
            .map(|entry| entry.dependencies.len())
            .collect()
    }
}

#[derive(Error, Debug, Clone)]
pub enum DependencyGraphError {
    #[error("A Type has been registered twice: '{0}'")]
    Duplicate(TypeInfo),
}

#[cfg(test)]
mod tests {
    use super::*;

    struct A;
    struct B;
    struct C;
    struct Outside;

    fn a() -> TypeInfo {
        TypeInfo::of::<A>()
    }
    fn b() -> TypeInfo {
        TypeInfo::of::<B>()
    }
    fn c() -> TypeInfo {
        TypeInfo::of::<C>()
    }

    #[test]
    fn edges_point_from_dependency_to_dependent() {
        let graph = DependencyGraph::build(&[
            TypeDescriptor::new(c(), vec![b()]),
            TypeDescriptor::new(b(), vec![a()]),
            TypeDescriptor::new(a(), vec![]),
        ])
        .unwrap();

        assert_eq!(graph.len(), 3);
        assert!(graph.has_edge(&a(), &b()));
        assert!(graph.has_edge(&b(), &c()));
        assert!(!graph.has_edge(&b(), &a()));
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.nodes().collect::<Vec<_>>(), vec![c(), b(), a()]);
    }

    #[test]
    fn dependencies_outside_the_set_are_not_edges() {
        let graph = DependencyGraph::build(&[TypeDescriptor::new(
            a(),
            vec![TypeInfo::of::<Outside>()],
        )])
        .unwrap();

        assert!(!graph.contains(&TypeInfo::of::<Outside>()));
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.in_degrees(), vec![0]);
    }

    #[test]
    fn repeated_dependency_is_one_edge() {
        let graph = DependencyGraph::build(&[
            TypeDescriptor::new(a(), vec![]),
            TypeDescriptor::new(b(), vec![a(), a()]),
        ])
        .unwrap();

        assert_eq!(graph.edges(), vec![(a(), b())]);
        assert_eq!(graph.in_degrees(), vec![0, 1]);
        assert_eq!(graph.dependencies(&b()), vec![a()]);
        assert_eq!(graph.dependents(&a()), vec![b()]);
    }

    #[test]
    fn self_dependency_is_an_edge() {
        let graph = DependencyGraph::build(&[TypeDescriptor::new(a(), vec![a()])]).unwrap();

        assert!(graph.has_edge(&a(), &a()));
        assert_eq!(graph.find_cycle(&[a()]), vec![a()]);
    }

    #[test]
    fn duplicate_descriptor_is_rejected() {
        let err = DependencyGraph::build(&[
            TypeDescriptor::new(a(), vec![]),
            TypeDescriptor::new(a(), vec![b()]),
        ])
        .unwrap_err();

        assert!(matches!(err, DependencyGraphError::Duplicate(info) if info == a()));
    }

    #[test]
    fn find_cycle_skips_blocked_nodes() {
        // C only waits on the A <-> B loop
        let graph = DependencyGraph::build(&[
            TypeDescriptor::new(c(), vec![a()]),
            TypeDescriptor::new(a(), vec![b()]),
            TypeDescriptor::new(b(), vec![a()]),
        ])
        .unwrap();

        assert_eq!(graph.find_cycle(&[c(), a(), b()]), vec![a(), b()]);
    }

    #[test]
    fn find_cycle_without_loop_is_empty() {
        let graph = DependencyGraph::build(&[
            TypeDescriptor::new(a(), vec![]),
            TypeDescriptor::new(b(), vec![a()]),
        ])
        .unwrap();

        assert!(graph.find_cycle(&[b()]).is_empty());
        assert!(graph.find_cycle(&[]).is_empty());
    }
}
