//! Failure taxonomy for the source paths.
//!
//! Every loader returns a typed error instead of swallowing it; the fallback
//! decision in [`crate::source::load_geography`] consumes the variant and
//! logs it before trying the next source.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    /// Timeout, refused connection or non-2xx status from a remote source.
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body that is not the expected JSON or CSV shape.
    #[error("decode failure for {url}: {message}")]
    Decode { url: String, message: String },

    /// A record missing a field the canonical schema requires. Fails the
    /// whole attempt, never a partial result.
    #[error("municipio {codigo_ibge} missing `{path}`")]
    Schema { codigo_ibge: i32, path: &'static str },

    /// Warehouse connection or query failure. No fallback exists for this
    /// path.
    #[error("warehouse failure: {0}")]
    Connection(#[from] sqlx::Error),
}
