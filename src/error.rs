use reqwest::StatusCode;
use thiserror::Error;

/// Failures surfaced by the backend client.
///
/// Both endpoints fail the same two ways: the transport broke, or the
/// service answered with a non-success status. There is no retry layer;
/// callers decide whether a failure is shown or swallowed.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The service answered with a non-success status code
    #[error("server responded with {0}")]
    Status(StatusCode),

    /// The request never completed (connect, DNS, timeout, body decode)
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_display() {
        let error = BackendError::Status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.to_string(), "server responded with 500 Internal Server Error");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BackendError>();
    }
}
