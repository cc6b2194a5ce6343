use thiserror::Error;

/// Failures of a generation pass.
#[derive(Debug, Error, PartialEq)]
pub enum GenerationError {
    /// Rejection sampling hit its attempt cap before accepting a sample
    #[error("rejection sampling stalled after {attempts} attempts ({produced} of {requested} particles placed)")]
    Stalled {
        produced: usize,
        requested: usize,
        attempts: u32,
    },
}
