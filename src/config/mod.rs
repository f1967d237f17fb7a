//! Configuration file loading and application.
mod apply;
mod loader;
pub mod types;

#[cfg(test)]
mod tests;

pub use apply::apply_config;
pub use loader::{has_default_config, load_config};

#[cfg(test)]
pub(crate) use loader::{has_default_config_in, load_config_file};
