/// Errors surfaced by the integration platform boundary.
///
/// `Clone` because a single in-flight template listing is shared by every
/// caller waiting on it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConnectorError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The platform answered with a non-2xx status code.
    #[error("Connector API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// The response did not have the expected shape.
    #[error("Unexpected connector response: {0}")]
    Decode(String),

    /// The connector rejected the call with a human-readable reason.
    #[error("{0}")]
    Rejected(String),
}

impl ConnectorError {
    /// The message worth showing to a user, without transport prefixes.
    ///
    /// Empty when the upstream gave no reason.
    pub fn user_message(&self) -> &str {
        match self {
            Self::Request(msg) | Self::Decode(msg) | Self::Rejected(msg) => msg,
            Self::Api { message, .. } => message,
        }
    }
}

impl From<reqwest::Error> for ConnectorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}
