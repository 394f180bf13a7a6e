//! Core property management types.

mod builder;
mod prop;
mod prop_builder;
mod registry;
mod resolver;
mod scheduler;
mod validation;

pub use builder::PropRegistryBuilder;
pub use prop::{BoundProp, Prop, PropOptions};
pub use prop_builder::PropBuilder;
pub use registry::PropRegistry;
pub use validation::{Validate, Validator, range};
