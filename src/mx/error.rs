use thiserror::Error;

#[derive(Debug, Error)]
pub enum MxError {
    #[error("resolver initialization failed: {reason}")]
    ResolverInit { reason: String },
}

impl MxError {
    pub(crate) fn resolver_init(err: impl std::fmt::Display) -> Self {
        Self::ResolverInit {
            reason: err.to_string(),
        }
    }
}
