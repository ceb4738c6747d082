use std::sync::Arc;

use thiserror::Error;

use crate::{
    dependency_graph::DependencyGraphError,
    types::{DynError, TypeInfo},
};

/// Errors of a resolution run
///
/// The first error aborts the run; no partially populated registry is ever returned.
#[derive(Error, Debug, Clone)]
pub enum ResolveError {
    /// The component set itself is malformed
    #[error(transparent)]
    DependencyGraph(#[from] DependencyGraphError),

    /// No construction order covers every component
    ///
    /// `unsorted` holds every type involved in or blocked by a cycle,
    /// `cycle` one closed loop among them.
    #[error("Cycle detected in dependencies of {} - e.g. {}", join(.unsorted), cycle_path(.cycle))]
    CycleDetected {
        unsorted: Vec<TypeInfo>,
        cycle: Vec<TypeInfo>,
    },

    /// The component has no single constructor matching its declared dependencies
    #[error("No usable constructor for '{component}': {reason}")]
    NoUsableConstructor {
        component: TypeInfo,
        reason: ConstructorIssue,
    },

    /// A declared dependency was not in the registry when the component was built
    #[error("'{component}' needs '{missing}' but no instance of it exists")]
    UnresolvedDependency {
        component: TypeInfo,
        missing: TypeInfo,
    },

    /// A second instance was stored for an already populated type
    #[error("An instance of '{0}' has already been registered")]
    DuplicateRegistration(TypeInfo),

    /// The constructor ran and failed
    #[error("Constructor for '{component}' failed - error: {error}")]
    ConstructionFailed {
        component: TypeInfo,
        error: Arc<DynError>,
    },
}

impl ResolveError {
    /// The type the error is attached to
    pub fn component(&self) -> Option<TypeInfo> {
        match self {
            ResolveError::DependencyGraph(DependencyGraphError::Duplicate(info)) => Some(*info),
            ResolveError::CycleDetected { .. } => None,
            ResolveError::NoUsableConstructor { component, .. }
            | ResolveError::UnresolvedDependency { component, .. }
            | ResolveError::ConstructionFailed { component, .. } => Some(*component),
            ResolveError::DuplicateRegistration(info) => Some(*info),
        }
    }
}

/// Why no constructor could be selected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstructorIssue {
    #[error("no constructor registered")]
    Missing,
    #[error("{0} constructors registered, exactly one is required")]
    Ambiguous(usize),
    #[error("declared dependencies [{}] do not match constructor parameters [{}]", join(.declared), join(.parameters))]
    SignatureMismatch {
        declared: Vec<TypeInfo>,
        parameters: Vec<TypeInfo>,
    },
}

/// Errors when requiring a typed instance from a registry
#[derive(Error, Debug, Clone)]
pub enum RequireError {
    /// The required type is not known
    #[error("The required type '{0}' is not in the registry.")]
    TypeMissing(&'static str),

    #[error("Failed to downcast, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        required_type: &'static str,
        actual_type: &'static str,
    },
}

fn join(types: &[TypeInfo]) -> String {
    types
        .iter()
        .map(|info| info.type_name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn cycle_path(cycle: &[TypeInfo]) -> String {
    let mut path: Vec<_> = cycle.iter().map(|info| info.type_name).collect();
    if let Some(first) = cycle.first() {
        path.push(first.type_name);
    }
    path.join(" -> ")
}
