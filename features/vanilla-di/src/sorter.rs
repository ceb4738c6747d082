use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashSet},
    ops::Deref,
};

use crate::{dependency_graph::DependencyGraph, types::TypeInfo};

/// Which ready component is constructed first when several are ready at once
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TieBreak {
    /// Order in which the components were declared
    #[default]
    Declaration,
    /// Lexical order of the type names, declaration order among equal names
    TypeName,
}

/// Computes construction orders with in-degree elimination (Kahn's algorithm)
#[derive(Debug, Clone, Copy, Default)]
pub struct TopologicalSorter {
    tie_break: TieBreak,
}

impl TopologicalSorter {
    pub fn new(tie_break: TieBreak) -> Self {
        Self { tie_break }
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Sorts the graph, dependencies first
    ///
    /// The result is shorter than the graph iff the graph has a cycle,
    /// see [ConstructionOrder::is_complete].
    pub fn sort(&self, graph: &DependencyGraph) -> ConstructionOrder {
        let ranks = self.ranks(graph);
        let mut in_degree = graph.in_degrees();

        let mut ready: BinaryHeap<Reverse<(usize, usize)>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(index, _)| Reverse((ranks[index], index)))
            .collect();

        let mut order = Vec::with_capacity(graph.len());
        while let Some(Reverse((_, index))) = ready.pop() {
            let info = graph.info(index);
            tracing::trace!(component = info.type_name, position = order.len(), "Sorted");
            order.push(info);

            for dependent in graph.dependents_of(index) {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.push(Reverse((ranks[dependent], dependent)));
                }
            }
        }

        ConstructionOrder(order)
    }

    /// Priority of every node, lower is picked first
    fn ranks(&self, graph: &DependencyGraph) -> Vec<usize> {
        match self.tie_break {
            TieBreak::Declaration => (0..graph.len()).collect(),
            TieBreak::TypeName => {
                let mut by_name: Vec<(&'static str, usize)> = graph
                    .nodes()
                    .enumerate()
                    .map(|(index, info)| (info.type_name, index))
                    .collect();
                by_name.sort_unstable();

                let mut ranks = vec![0; by_name.len()];
                for (rank, (_, index)) in by_name.into_iter().enumerate() {
                    ranks[index] = rank;
                }
                ranks
            }
        }
    }
}

/// Types in the order they are constructed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstructionOrder(Vec<TypeInfo>);

impl ConstructionOrder {
    pub fn new(order: Vec<TypeInfo>) -> Self {
        Self(order)
    }

    /// Whether the order covers the whole graph, i.e. the graph is acyclic
    pub fn is_complete(&self, graph: &DependencyGraph) -> bool {
        self.0.len() == graph.len()
    }

    /// Graph nodes absent from the order, in declaration order
    pub fn missing(&self, graph: &DependencyGraph) -> Vec<TypeInfo> {
        let sorted: HashSet<&TypeInfo> = self.0.iter().collect();
        graph.nodes().filter(|info| !sorted.contains(info)).collect()
    }

    pub fn position(&self, info: &TypeInfo) -> Option<usize> {
        self.0.iter().position(|entry| entry == info)
    }

    pub fn into_inner(self) -> Vec<TypeInfo> {
        self.0
    }
}

impl Deref for ConstructionOrder {
    type Target = [TypeInfo];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a> IntoIterator for &'a ConstructionOrder {
    type Item = &'a TypeInfo;
    type IntoIter = std::slice::Iter<'a, TypeInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::types::TypeDescriptor;

    struct Alpha;
    struct Beta;
    struct Gamma;
    struct Delta;

    fn alpha() -> TypeInfo {
        TypeInfo::of::<Alpha>()
    }
    fn beta() -> TypeInfo {
        TypeInfo::of::<Beta>()
    }
    fn gamma() -> TypeInfo {
        TypeInfo::of::<Gamma>()
    }
    fn delta() -> TypeInfo {
        TypeInfo::of::<Delta>()
    }

    fn graph(descriptors: &[TypeDescriptor]) -> DependencyGraph {
        DependencyGraph::build(descriptors).unwrap()
    }

    #[test]
    fn chain_is_sorted_leaves_first() {
        let graph = graph(&[
            TypeDescriptor::new(gamma(), vec![beta()]),
            TypeDescriptor::new(beta(), vec![alpha()]),
            TypeDescriptor::new(alpha(), vec![]),
        ]);

        let order = TopologicalSorter::default().sort(&graph);

        assert!(order.is_complete(&graph));
        assert_eq!(&*order, &[alpha(), beta(), gamma()]);
    }

    #[test]
    fn diamond_respects_every_edge() {
        let graph = graph(&[
            TypeDescriptor::new(delta(), vec![beta(), gamma()]),
            TypeDescriptor::new(gamma(), vec![alpha()]),
            TypeDescriptor::new(beta(), vec![alpha()]),
            TypeDescriptor::new(alpha(), vec![]),
        ]);

        let order = TopologicalSorter::default().sort(&graph);

        assert!(order.is_complete(&graph));
        for (dependency, dependent) in graph.edges() {
            assert!(order.position(&dependency) < order.position(&dependent));
        }
        // gamma was declared before beta
        assert_eq!(&*order, &[alpha(), gamma(), beta(), delta()]);
    }

    #[rstest]
    #[case::declaration(TieBreak::Declaration, vec![gamma(), alpha(), beta()])]
    #[case::type_name(TieBreak::TypeName, vec![alpha(), beta(), gamma()])]
    fn independent_nodes_follow_tie_break(
        #[case] tie_break: TieBreak,
        #[case] expected: Vec<TypeInfo>,
    ) {
        let graph = graph(&[
            TypeDescriptor::new(gamma(), vec![]),
            TypeDescriptor::new(alpha(), vec![]),
            TypeDescriptor::new(beta(), vec![]),
        ]);

        let sorter = TopologicalSorter::new(tie_break);
        let order = sorter.sort(&graph);

        assert_eq!(sorter.tie_break(), tie_break);
        assert_eq!(order.into_inner(), expected);
    }

    #[test]
    fn released_nodes_compete_with_waiting_ones() {
        // alpha releases beta, which outranks the still waiting gamma
        let graph = graph(&[
            TypeDescriptor::new(alpha(), vec![]),
            TypeDescriptor::new(beta(), vec![alpha()]),
            TypeDescriptor::new(gamma(), vec![]),
        ]);

        let order = TopologicalSorter::default().sort(&graph);

        assert_eq!(&*order, &[alpha(), beta(), gamma()]);
    }

    #[test]
    fn cycle_leaves_order_short() {
        let graph = graph(&[
            TypeDescriptor::new(alpha(), vec![]),
            TypeDescriptor::new(beta(), vec![gamma()]),
            TypeDescriptor::new(gamma(), vec![beta()]),
            TypeDescriptor::new(delta(), vec![gamma()]),
        ]);

        let order = TopologicalSorter::default().sort(&graph);

        assert!(!order.is_complete(&graph));
        assert_eq!(&*order, &[alpha()]);
        assert_eq!(order.missing(&graph), vec![beta(), gamma(), delta()]);
    }

    #[test]
    fn missing_is_empty_for_a_complete_order() {
        let graph = graph(&[
            TypeDescriptor::new(delta(), vec![]),
            TypeDescriptor::new(alpha(), vec![delta()]),
        ]);

        let order = TopologicalSorter::default().sort(&graph);

        assert!(order.missing(&graph).is_empty());
        assert_eq!(
            ConstructionOrder::new(vec![alpha()]).missing(&graph),
            vec![delta()]
        );
    }

    #[test]
    fn self_loop_is_never_ready() {
        let graph = graph(&[TypeDescriptor::new(alpha(), vec![alpha()])]);

        let order = TopologicalSorter::default().sort(&graph);

        assert!(order.is_empty());
        assert!(!order.is_complete(&graph));
    }

    #[test]
    fn empty_graph_is_complete() {
        let graph = DependencyGraph::default();
        let order = TopologicalSorter::default().sort(&graph);
        assert!(order.is_complete(&graph));
    }
}
