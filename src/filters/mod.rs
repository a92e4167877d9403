//! Filter module.
//!
//! Contains the filter registry, shared resources and built-in filter
//! implementations.

pub mod registry;
pub mod resources;
pub mod builtin;

pub use registry::{FilterFactory, FilterRegistry, RegistryEntry};
pub use resources::Resources;
