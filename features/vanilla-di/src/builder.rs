use crate::{
    container::DiContainer,
    errors::ResolveError,
    factories::{Component, Discoverable},
    instantiator,
    sorter::TieBreak,
    types::{Injectable, Instance},
};

/// Settings of a resolution run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Selection among components that are ready at the same time
    pub tie_break: TieBreak,
}

//////////////////////////////////////////////////////////////////////
///
/// Resolution consists of three parts.
/// 1. The DiBuilder where one registers all components and pre built instances
/// 2. Building the dependency graph and sorting it into a construction order
/// 3. Constructing every component in that order into the DiContainer
pub struct DiBuilder {
    /// Registered components, in declaration order
    pub(crate) components: Vec<Component>,
    /// Registered already created instances
    pub(crate) instances: Vec<Instance>,
    pub(crate) options: ResolveOptions,
}
impl Default for DiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DiBuilder {
    pub fn new() -> Self {
        DiBuilder {
            components: Vec::new(),
            instances: Vec::new(),
            options: ResolveOptions::default(),
        }
    }
}
impl DiBuilder {
    /// Adds an instance components can depend on without it being constructed
    pub fn add_instance<T: Injectable>(mut self, instance: T) -> Self {
        self.instances.push(Instance::new(instance));
        self
    }

    pub fn add_component(mut self, component: impl Into<Component>) -> Self {
        self.components.push(component.into());
        self
    }

    pub fn add_components<C: Into<Component>>(
        mut self,
        components: impl IntoIterator<Item = C>,
    ) -> Self {
        self.components
            .extend(components.into_iter().map(Into::into));
        self
    }

    /// Adds the component a [Discoverable] type declares for itself
    pub fn discover<T: Discoverable>(self) -> Self {
        self.add_component(T::component())
    }

    pub fn tie_break(mut self, tie_break: TieBreak) -> Self {
        self.options.tie_break = tie_break;
        self
    }

    pub fn options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Result<DiContainer, ResolveError> {
        instantiator::initiate(self)
    }
}

/// Resolves `components` with default options
pub fn resolve<C: Into<Component>>(
    components: impl IntoIterator<Item = C>,
) -> Result<DiContainer, ResolveError> {
    DiBuilder::new().add_components(components).build()
}
