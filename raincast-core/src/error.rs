use thiserror::Error;

/// Failure kinds surfaced by the core pipeline.
///
/// None of these are retried internally; retry policy, if any, belongs to the
/// caller. Errors are never masked with placeholder values, so a front end can
/// always distinguish "no rain predicted" from "prediction unavailable".
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed place name or out-of-range coordinates, rejected before any
    /// network call is made.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The geocoding source returned no candidates for the given name.
    #[error("no location found for '{0}'")]
    NotFound(String),

    /// Network or transport failure from one of the external APIs.
    #[error("weather source unavailable: {0}")]
    SourceUnavailable(String),

    /// A successful response was missing an expected field or series.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The predictor failed or produced a non-numeric result.
    #[error("prediction failed: {0}")]
    PredictionFailure(String),
}

pub type Result<T> = std::result::Result<T, Error>;
