//! Pooling - pre-warmed instances per element role.
//!
//! - [`InstancePool`] - populate / spawn / release for one role
//! - [`PoolRegistry`] - the five role pools (page, category, function,
//!   value, toggle), built once from the asset source
//!
//! # Layout in the scene
//!
//! ```text
//! UI Manager
//! ├── Page Pool       (idle page instances, inactive)
//! ├── Category Pool
//! ├── Function Pool
//! ├── Value Pool
//! └── Toggle Pool
//! ```
//!
//! Spawned instances leave their container for whatever parent the caller
//! passes, and return to it on release.

mod instance_pool;
mod registry;

pub use instance_pool::*;
pub use registry::*;
