//! Connection settings for the etcd gateway client.
//!
//! Settings are plain values handed to `EtcdClient::new`; nothing is read
//! from process-wide state.

use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::error::Error;

/// Default time allowed to establish a connection to one endpoint.
pub const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(5);

/// Default time allowed for a whole request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client certificate settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    /// PEM CA certificate trusted in addition to the system roots.
    pub ca: Option<PathBuf>,
    /// PEM client certificate.
    pub cert: PathBuf,
    /// PEM (PKCS#8) private key for `cert`.
    pub key: PathBuf,
    /// Skip server certificate verification. On unless `verify_server(true)`.
    pub insecure_skip_verify: bool,
}

impl TlsConfig {
    pub fn new(cert: impl Into<PathBuf>, key: impl Into<PathBuf>) -> Self {
        Self {
            ca: None,
            cert: cert.into(),
            key: key.into(),
            insecure_skip_verify: true,
        }
    }

    pub fn with_ca(mut self, ca: impl Into<PathBuf>) -> Self {
        self.ca = Some(ca.into());
        self
    }

    pub fn verify_server(mut self, verify: bool) -> Self {
        self.insecure_skip_verify = !verify;
        self
    }

    /// Build from optional CA/cert/key paths.
    ///
    /// Returns `None` when neither cert nor key is given; it is an error to
    /// give only one of them.
    pub fn from_parts(
        ca: Option<PathBuf>,
        cert: Option<PathBuf>,
        key: Option<PathBuf>,
    ) -> Result<Option<Self>, Error> {
        match (cert, key) {
            (Some(cert), Some(key)) => {
                let mut tls = TlsConfig::new(cert, key);
                tls.ca = ca;
                Ok(Some(tls))
            }
            (None, None) => Ok(None),
            _ => Err(Error::Tls {
                message: "client certificate and key must be given together".to_string(),
            }),
        }
    }
}

/// Settings for `EtcdClient`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtcdConfig {
    /// Gateway endpoints, tried in order.
    pub endpoints: Vec<String>,
    pub dial_timeout: Duration,
    pub request_timeout: Duration,
    pub tls: Option<TlsConfig>,
}

impl Default for EtcdConfig {
    fn default() -> Self {
        Self {
            endpoints: vec!["127.0.0.1:2379".to_string()],
            dial_timeout: DEFAULT_DIAL_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            tls: None,
        }
    }
}

impl EtcdConfig {
    /// Settings for a comma-separated endpoint list, e.g. `"h1:2379,h2:2379"`.
    pub fn from_endpoints(endpoints: &str) -> Self {
        Self {
            endpoints: endpoints
                .split(',')
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string)
                .collect(),
            ..Default::default()
        }
    }

    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = Some(tls);
        self
    }

    pub fn with_dial_timeout(mut self, timeout: Duration) -> Self {
        self.dial_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Parse the endpoints into base URLs.
    ///
    /// Endpoints without a scheme get `https://` when TLS is configured and
    /// `http://` otherwise. Every URL ends in `/` so API paths join below it.
    pub fn endpoint_urls(&self) -> Result<Vec<Url>, Error> {
        if self.endpoints.is_empty() {
            return Err(Error::NoEndpoints);
        }

        let scheme = if self.tls.is_some() { "https" } else { "http" };
        self.endpoints
            .iter()
            .map(|endpoint| {
                let raw = if endpoint.contains("://") {
                    endpoint.clone()
                } else {
                    format!("{}://{}", scheme, endpoint)
                };
                let mut url = Url::parse(&raw)?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(Error::InvalidEndpoint {
                        message: format!("unsupported scheme in {}", endpoint),
                    });
                }
                if !url.path().ends_with('/') {
                    let path = format!("{}/", url.path());
                    url.set_path(&path);
                }
                Ok(url)
            })
            .collect()
    }
}

/// Read a PEM file, naming it in the error.
pub(crate) fn read_pem(path: &Path) -> Result<Vec<u8>, Error> {
    std::fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}
