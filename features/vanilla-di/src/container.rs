use std::{any::type_name, fmt::Debug, ops::Deref, sync::Arc};

use indexmap::{map::Entry, IndexMap};

use crate::{
    dependency_graph::DependencyGraph,
    errors::{RequireError, ResolveError},
    sorter::ConstructionOrder,
    types::{Injectable, Instance, TypeInfo},
};

/// Write-once store of constructed instances, keyed by type
///
/// Iteration follows insertion order.
#[derive(Clone, Default)]
pub struct Registry {
    instances: IndexMap<TypeInfo, Instance>,
}

impl Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.instances.keys().map(|info| info.type_name))
            .finish()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `instance` under `info`
    ///
    /// Fails if `info` already has an instance; the stored one is kept.
    pub fn put(&mut self, info: TypeInfo, instance: Instance) -> Result<(), ResolveError> {
        match self.instances.entry(info) {
            Entry::Occupied(_) => Err(ResolveError::DuplicateRegistration(info)),
            Entry::Vacant(vacant) => {
                vacant.insert(instance);
                Ok(())
            }
        }
    }

    pub fn get(&self, info: &TypeInfo) -> Option<&Instance> {
        self.instances.get(info)
    }

    pub fn contains(&self, info: &TypeInfo) -> bool {
        self.instances.contains_key(info)
    }

    /// All instances in insertion order
    pub fn all(&self) -> Vec<Instance> {
        self.instances.values().cloned().collect()
    }

    /// All held types in insertion order
    pub fn keys(&self) -> impl Iterator<Item = TypeInfo> + '_ {
        self.instances.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Attempts to get the requested type
    pub fn require<T: Injectable>(&self) -> Result<Arc<T>, RequireError> {
        match self.instances.get(&TypeInfo::of::<T>()) {
            Some(instance) => {
                instance
                    .downcast()
                    .map_err(|actual_type| RequireError::DowncastFailed {
                        required_type: type_name::<T>(),
                        actual_type,
                    })
            }
            None => Err(RequireError::TypeMissing(type_name::<T>())),
        }
    }
}

/// Container holding the outcome of one resolution run
#[derive(Clone)]
pub struct DiContainer(pub Arc<DiContainerInner>);
pub struct DiContainerInner {
    registry: Registry,
    graph: DependencyGraph,
    order: ConstructionOrder,
}
impl Debug for DiContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiContainer")
            .field("instances", &self.0.registry)
            .field("edges", &self.0.graph.edge_count())
            .finish()
    }
}

impl DiContainer {
    pub(crate) fn new(registry: Registry, graph: DependencyGraph, order: ConstructionOrder) -> Self {
        Self(Arc::new(DiContainerInner {
            registry,
            graph,
            order,
        }))
    }

    pub fn registry(&self) -> &Registry {
        &self.0.registry
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.0.graph
    }

    /// The order the components were constructed in
    pub fn order(&self) -> &ConstructionOrder {
        &self.0.order
    }

    /// Takes the registry out, cloning it if the container is shared
    pub fn into_registry(self) -> Registry {
        match Arc::try_unwrap(self.0) {
            Ok(inner) => inner.registry,
            Err(shared) => shared.registry.clone(),
        }
    }
}

impl Deref for DiContainer {
    type Target = Registry;

    fn deref(&self) -> &Self::Target {
        &self.0.registry
    }
}
