//! # netcfg_vars
//!
//! Template variable resolution for netcfg-builder.
//!
//! Variables come from an ordered set of loaders held by a
//! [`VariableRegistry`]. Each loader writes into one shared mapping; loaders
//! run sequentially in ascending priority, so later (higher-priority)
//! loaders overwrite earlier ones.
//!
//! # Loaders
//!
//! - **Device**: [`DeviceVariableLoader`] resolves hostname, site, ASN,
//!   interface data, and context data from the inventory
//! - **Static**: [`StaticLoader`] contributes a parsed TOML/YAML/JSON file
//! - **Extra values**: [`ExtraValuesLoader`] applies `key=value` overrides
//! - **Closures**: any `Fn(&mut Variables, &ExtraArgs)` via
//!   [`VariableRegistry::register_fn`]
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use netcfg_vars::{DeviceVariableLoader, ExtraArgs, ExtraValuesLoader, VariableRegistry};
//!
//! let mut registry = VariableRegistry::new();
//! registry.register(0, Arc::new(DeviceVariableLoader::from_env()))?;
//! registry.register_file(5, Path::new("vars/site.yaml"))?;
//! registry.register(9, Arc::new(ExtraValuesLoader))?;
//!
//! let extra = ExtraArgs::new().with_hostname("nyc1rs21");
//! let vars = registry.load_variables(&extra).await?;
//! ```

pub mod context;
pub mod device;
pub mod error;
pub mod files;
pub mod loader;
pub mod registry;

pub use context::{merge_into, ExtraArgs, Variables};
pub use device::{pair_peer, resolve_device, DeviceVariableLoader};
pub use error::{VarsError, VarsResult};
pub use files::{interpolate_value, interpolate_with, is_variable_file, load_directory, load_file};
pub use loader::{ExtraValuesLoader, FnLoader, StaticLoader, VariableLoader};
pub use registry::{VariableRegistry, MAX_PRIORITY};
