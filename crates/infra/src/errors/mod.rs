//! Error conversions for infrastructure adapters

mod conversions;

pub use conversions::InfraError;
pub(crate) use conversions::sql_to_cache;
