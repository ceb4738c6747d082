use std::{collections::HashMap, sync::Arc};

use crate::{
    builder::DiBuilder,
    container::{DiContainer, Registry},
    dependency_graph::DependencyGraph,
    errors::{ConstructorIssue, ResolveError},
    factories::Component,
    sorter::{ConstructionOrder, TopologicalSorter},
    types::{Instance, TypeDescriptor, TypeInfo},
};

/// Constructs components in a given order into a registry
///
/// Every dependency must already be in the registry when its dependent is built,
/// either constructed earlier in the order or seeded beforehand.
#[derive(Debug, Default)]
pub struct Instantiator {
    registry: Registry,
}

impl Instantiator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a registry that already holds some instances
    pub fn with_registry(registry: Registry) -> Self {
        Self { registry }
    }

    /// Constructs every component of `order`
    ///
    /// Types already in the registry are skipped. The first failure aborts
    /// and is returned; the partially filled registry is dropped.
    pub fn instantiate(
        mut self,
        components: &[Component],
        order: &ConstructionOrder,
    ) -> Result<Registry, ResolveError> {
        let by_type: HashMap<TypeInfo, &Component> = components
            .iter()
            .map(|component| (component.info(), component))
            .collect();

        for info in order {
            if self.registry.contains(info) {
                tracing::debug!("Instance of {} already present, skipping", info.type_name);
                continue;
            }

            let component = by_type
                .get(info)
                .ok_or(ResolveError::NoUsableConstructor {
                    component: *info,
                    reason: ConstructorIssue::Missing,
                })?;

            let instance = self.construct(component)?;
            self.registry.put(*info, instance)?;

            tracing::debug!("Constructed instance of {}", info.type_name);
        }

        Ok(self.registry)
    }

    fn construct(&self, component: &Component) -> Result<Instance, ResolveError> {
        let TypeDescriptor { info, dependencies } = component.descriptor();

        let constructor =
            component
                .select_constructor()
                .map_err(|reason| ResolveError::NoUsableConstructor {
                    component: *info,
                    reason,
                })?;

        let args = dependencies
            .iter()
            .map(|dependency| {
                self.registry.get(dependency).cloned().ok_or(
                    ResolveError::UnresolvedDependency {
                        component: *info,
                        missing: *dependency,
                    },
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        constructor
            .construct(&args)
            .map_err(|error| ResolveError::ConstructionFailed {
                component: *info,
                error: Arc::new(error),
            })
    }
}

/// Runs build, sort and instantiation for everything registered on the builder
pub(crate) fn initiate(blueprint: DiBuilder) -> Result<DiContainer, ResolveError> {
    let DiBuilder {
        components,
        instances,
        options,
    } = blueprint;

    let span = tracing::debug_span!(
        "resolve",
        components = components.len(),
        instances = instances.len()
    );
    let _entered = span.enter();

    // Built
    let descriptors: Vec<TypeDescriptor> = components
        .iter()
        .map(|component| component.descriptor().clone())
        .collect();
    let graph = DependencyGraph::build(&descriptors)?;
    tracing::debug!(
        "Dependency graph has {} components and {} edges",
        graph.len(),
        graph.edge_count()
    );

    // Sorted
    let order = TopologicalSorter::new(options.tie_break).sort(&graph);
    if !order.is_complete(&graph) {
        let unsorted = order.missing(&graph);
        let cycle = graph.find_cycle(&unsorted);
        return Err(ResolveError::CycleDetected { unsorted, cycle });
    }
    tracing::debug!(
        "Construction order: {:?}",
        order.iter().map(|info| info.type_name).collect::<Vec<_>>()
    );

    // Pre built instances go in first
    let mut registry = Registry::new();
    for instance in instances {
        registry.put(instance.info, instance)?;
    }

    let registry = Instantiator::with_registry(registry).instantiate(&components, &order)?;
    tracing::debug!("All {} instances constructed", registry.len());

    Ok(DiContainer::new(registry, graph, order))
}
