//! DNS MX resolution.
//!
//! The entry point is [`MxResolver::resolve`], which queries the tokio
//! resolver with bounded timeouts and returns the records sorted by
//! ascending preference. DNS faults never escape: they degrade to an empty
//! answer, with the reason kept in [`MxResolution`].

mod cache;
mod error;
mod options;
mod resolver;
mod types;

pub use cache::MxCache;
pub use error::MxError;
pub use options::ResolverOptions;
pub use resolver::{LookupMx, MxResolver};
pub use types::{MxRecord, MxResolution};

#[cfg(test)]
pub(crate) mod tests;
