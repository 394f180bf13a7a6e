//! Converters between raw source strings and typed property values.
//!
//! A [`Converter`] is chosen when a property is built and decides how the
//! raw string stored in a source becomes the property's value. The registry
//! only ever sees strings; decoding happens inside the property.

mod converter;
mod duration;
mod list;
mod parse;

#[cfg(feature = "json")]
mod json;
#[cfg(feature = "chrono")]
mod timestamp;

pub use converter::{Converter, StringConverter};
pub use duration::DurationConverter;
pub use list::ListConverter;
pub use parse::ParseConverter;

#[cfg(feature = "json")]
pub use json::JsonConverter;
#[cfg(feature = "chrono")]
pub use timestamp::TimestampConverter;
