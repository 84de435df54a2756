//! Error types for WordPress API operations.

/// Error from WordPress API operations.
#[derive(Debug, thiserror::Error)]
pub enum WordPressError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed")]
    Request(#[from] ureq::Error),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// JSON serialization error.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    /// XML parsing error.
    #[error("XML parse error")]
    Xml(#[from] quick_xml::Error),

    /// Encoding error during XML parsing.
    #[error("XML encoding error")]
    XmlEncoding(#[from] quick_xml::encoding::EncodingError),

    /// XML-RPC fault response.
    #[error("XML-RPC fault {code}: {message}")]
    Fault {
        /// Fault code.
        code: i64,
        /// Fault description.
        message: String,
    },

    /// Remote call returned a failure result without a fault.
    #[error("remote rejected {0}")]
    Rejected(String),

    /// Response did not have the expected shape.
    #[error("unexpected response: {0}")]
    Protocol(String),
}
