//! Value objects - immutable types that represent broadcast concepts

mod group;

pub use group::{GroupName, DEFAULT_GROUP, DEFAULT_HUB};
