use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid node url: {0}")]
    InvalidNodeUrl(#[from] url::ParseError),

    /// Transport failure or a body that is not the expected JSON
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{endpoint} answered {status}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
    },
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = Error::Status {
            endpoint: "/joinNetwork",
            status: StatusCode::BAD_GATEWAY,
        };
        assert_eq!(error.to_string(), "/joinNetwork answered 502 Bad Gateway");

        let error = Error::from(url::Url::parse("nope").unwrap_err());
        assert_eq!(
            error.to_string(),
            "Invalid node url: relative URL without a base"
        );
    }
}
