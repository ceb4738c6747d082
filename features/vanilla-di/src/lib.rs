//! Vanilla DI constructs a set of components in dependency order, each exactly once.
//!
//! Every component declares the types its constructor takes. The runtime
//! 1. builds a dependency graph from these declarations,
//! 2. sorts it into a construction order (Kahn's algorithm), failing on cycles,
//! 3. constructs each component from the instances built before it.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use vanilla_di::{resolve, Component};
//!
//! struct LightBulb;
//! struct PowerSwitch {
//!     bulb: Arc<LightBulb>,
//! }
//!
//! let container = resolve([
//!     Component::of::<PowerSwitch>()
//!         .constructor(|bulb: Arc<LightBulb>| PowerSwitch { bulb })
//!         .build(),
//!     Component::of::<LightBulb>().constructor(|| LightBulb).build(),
//! ])
//! .unwrap();
//!
//! let switch = container.require::<PowerSwitch>().unwrap();
//! let bulb = container.require::<LightBulb>().unwrap();
//! assert!(Arc::ptr_eq(&switch.bulb, &bulb));
//! ```
//!
//! Vanilla DI consists of the following parts:
//!
//! 1. Types - type identities, descriptors and type erased instances
//! 2. Factories - components and the constructors building them
//! 3. Dependency Graph - edges from dependencies to their dependents
//! 4. Sorter - the construction order and its tie break
//! 5. Container - the registry of constructed instances
//! 6. Instantiator - constructs components in order
//! 7. Builder - collects components and runs the resolution
//! 8. Errors - everything a run can fail with
//!
//! The library only emits `tracing` events; installing a subscriber is up to the caller.

pub mod builder;
pub mod container;
pub mod dependency_graph;
pub mod errors;
pub mod factories;
pub mod instantiator;
pub mod sorter;
pub mod types;

pub use builder::{resolve, DiBuilder, ResolveOptions};
pub use container::{DiContainer, Registry};
pub use dependency_graph::{DependencyGraph, DependencyGraphError};
pub use errors::{ConstructorIssue, RequireError, ResolveError};
pub use factories::{Component, ComponentBuilder, Constructor, Discoverable, DynConstructor};
pub use instantiator::Instantiator;
pub use sorter::{ConstructionOrder, TieBreak, TopologicalSorter};
pub use types::{DynError, Injectable, Instance, TypeDescriptor, TypeInfo};
