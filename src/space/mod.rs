//! Parameter collections and the values bound to them.

pub mod configuration;
pub mod context;
pub mod features;

pub use configuration::{Configuration, ConfigurationSpace};
pub use context::{Binding, Context};
pub use features::{Features, FeaturesSpace};
