/// Errors that can occur when configuring the autolink transform.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AutolinkError {
    #[error("connected instance must not be empty")]
    EmptyInstance,
    #[error("invalid connected instance {instance:?}: {reason}")]
    InvalidInstance { instance: String, reason: &'static str },
}
