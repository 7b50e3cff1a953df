use std::path::PathBuf;

use kvtree_core::Error as CoreError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid endpoint: {message}")]
    InvalidEndpoint { message: String },

    #[error("No etcd endpoints configured")]
    NoEndpoints,

    #[error("TLS configuration error: {message}")]
    Tls { message: String },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Gateway returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl Error {
    /// True for errors caused by configuration rather than the cluster.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::UrlParse(_)
                | Error::InvalidEndpoint { .. }
                | Error::NoEndpoints
                | Error::Tls { .. }
                | Error::Io { .. }
        )
    }

    /// True for failures that another endpoint might not have.
    pub(crate) fn is_transport(&self) -> bool {
        match self {
            Error::Http(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }

    /// Convert a listing failure for the core layer.
    pub fn into_fetch(self) -> CoreError {
        if self.is_config() {
            CoreError::config(self.to_string())
        } else {
            CoreError::fetch(self)
        }
    }

    /// Convert a put/delete failure for the core layer.
    pub fn into_store(self) -> CoreError {
        if self.is_config() {
            CoreError::config(self.to_string())
        } else {
            CoreError::store(self)
        }
    }
}

impl From<Error> for CoreError {
    fn from(error: Error) -> Self {
        error.into_fetch()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_display() {
        let e = Error::Status {
            status: 503,
            body: "etcdserver: leader changed".to_string(),
        };
        let display = e.to_string();
        assert!(display.contains("503"));
        assert!(display.contains("leader changed"));
    }

    #[test]
    fn config_errors_map_to_core_config() {
        let core: CoreError = Error::NoEndpoints.into();
        assert!(matches!(core, CoreError::Config { .. }));
    }

    #[test]
    fn cluster_errors_map_to_fetch_or_store() {
        let status = || Error::Status {
            status: 500,
            body: String::new(),
        };
        assert!(matches!(status().into_fetch(), CoreError::Fetch(_)));
        assert!(matches!(status().into_store(), CoreError::Store(_)));
    }

    #[test]
    fn io_error_names_the_file() {
        let e = Error::Io {
            path: PathBuf::from("/etc/etcd/ca.pem"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(e.to_string().contains("/etc/etcd/ca.pem"));
        assert!(e.is_config());
    }
}
