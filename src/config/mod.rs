//! Configuration types and loading.
//!
//! - `RulesConfig`: top-level configuration with validation
//! - `LoaderConfig`: where and how rule files are discovered
//! - `ResolverConfig`: limits applied when rendering resolved rules

mod settings;

pub use settings::{CONFIG_FILE, LoaderConfig, ResolverConfig, RulesConfig};
