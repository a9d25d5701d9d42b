//! The security header stack.
//!
//! [`HelmetConfig`] says which units run and with which options,
//! [`Helmet`] is the composed chain, and [`HelmetLayer`] runs it as Tower
//! middleware.

mod config;
mod layer;
mod registry;
mod stack;

pub use config::{HelmetConfig, HelmetConfigBuilder, UnitSetting};
pub use layer::{HelmetLayer, HelmetService, build_helmet_layer};
pub use registry::{BuildFn, REGISTRY, UnitDescriptor, UnitName};
pub use stack::Helmet;
