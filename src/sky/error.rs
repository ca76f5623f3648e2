use thiserror::Error;

#[derive(Debug, Error)]
pub enum PropagationError {
    /// Instant too far from the element epoch; silently skipped.
    #[error("date out of range: {0}")]
    OutOfRange(String),
    /// The propagator gave up on these elements.
    #[error("cannot compute position: {0}")]
    Computation(String),
}
