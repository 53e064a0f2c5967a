use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The response did not have the list/map shape a vertex read expects.
    #[error("malformed graph response: {0}")]
    MalformedResponse(String),
    /// Stored properties contradict each other (e.g. parallel arrays of different length).
    #[error("data integrity error: {0}")]
    DataIntegrity(String),
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

pub fn internal_error(message: impl AsRef<str>) -> GraphError {
    GraphError::InternalError(message.as_ref().to_string())
}

pub fn invalid_input(message: impl AsRef<str>) -> GraphError {
    GraphError::InvalidInput(message.as_ref().to_string())
}

pub fn malformed_response(message: impl AsRef<str>) -> GraphError {
    GraphError::MalformedResponse(message.as_ref().to_string())
}

pub fn data_integrity(message: impl AsRef<str>) -> GraphError {
    GraphError::DataIntegrity(message.as_ref().to_string())
}

pub fn from_reqwest_error(details: impl AsRef<str>, err: reqwest::Error) -> GraphError {
    if err.is_timeout() {
        GraphError::Timeout(format!("{}: {err}", details.as_ref()))
    } else if err.is_connect() || err.is_request() {
        GraphError::ConnectionFailed(format!("{}: {err}", details.as_ref()))
    } else if err.is_decode() {
        GraphError::MalformedResponse(format!("{}: {err}", details.as_ref()))
    } else {
        GraphError::InternalError(format!("{}: {err}", details.as_ref()))
    }
}

pub fn error_from_status(status: StatusCode, body: impl AsRef<str>) -> GraphError {
    let body = body.as_ref();
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            GraphError::Timeout(format!("{status}: {body}"))
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            GraphError::AuthenticationFailed(format!("{status}: {body}"))
        }
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            GraphError::InvalidQuery(format!("{status}: {body}"))
        }
        StatusCode::TOO_MANY_REQUESTS
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE => {
            GraphError::ServiceUnavailable(format!("{status}: {body}"))
        }
        _ => GraphError::InternalError(format!("Server error {status}: {body}")),
    }
}
