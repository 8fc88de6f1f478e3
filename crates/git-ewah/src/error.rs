/// Errors produced by EWAH bitmap (de)serialization.
///
/// Contract violations (monotonic-set order, use of a stale iterator) are
/// not represented here: per the builder's invariants those are programming
/// errors and panic via `assert!` rather than returning a `Result`.
#[derive(Debug, thiserror::Error)]
pub enum EwahError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("bitmap too large to serialize: {field} does not fit in 32 bits ({value})")]
    TooLarge { field: &'static str, value: u64 },

    #[error("truncated EWAH stream: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("corrupt EWAH stream: {0}")]
    Corrupt(String),
}
