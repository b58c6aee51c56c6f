use reqwest::StatusCode;
use thiserror::Error;

/// Why a query did not produce a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No connection could be established, or the request timed out.
    Unreachable,
    /// The agent answered with a 5xx status.
    ServerError,
    /// The agent answered with a 4xx status, including not-found.
    ClientError,
    Unknown,
}

impl ErrorKind {
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::Unreachable => {
                "The search service is unavailable. Check that the agent is running and try again."
            }
            ErrorKind::ServerError => {
                "The search service hit an internal error. Try again in a moment."
            }
            ErrorKind::ClientError => {
                "The search service could not handle that request. Try rephrasing your question."
            }
            ErrorKind::Unknown => "Something unexpected happened. Try again.",
        }
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("agent unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("agent returned HTTP {0}")]
    Status(StatusCode),

    #[error("malformed agent response: {0}")]
    Malformed(String),

    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
}

impl GatewayError {
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            GatewayError::Unreachable(err)
        } else {
            GatewayError::Transport(err)
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Unreachable(_) => ErrorKind::Unreachable,
            GatewayError::Status(status) if status.is_server_error() => ErrorKind::ServerError,
            GatewayError::Status(status) if status.is_client_error() => ErrorKind::ClientError,
            GatewayError::Status(_) | GatewayError::Malformed(_) | GatewayError::Transport(_) => {
                ErrorKind::Unknown
            }
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageSizeError {
    #[error("page size {0} is not one of 10, 20, 30 or 50")]
    Unsupported(usize),

    #[error("'{0}' is not a page size, use 10, 20, 30 or 50")]
    NotANumber(String),
}
