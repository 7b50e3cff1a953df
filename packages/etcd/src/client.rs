use reqwest::blocking::Client;
use reqwest::{Certificate, Identity};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use kvtree_core::{Error as CoreError, KeyValueRecord, RecordReader, RecordWriter};

use crate::config::{read_pem, EtcdConfig, TlsConfig};
use crate::error::Error;
use crate::types::{
    Ack, DeleteRangeRequest, DeleteRangeResponse, PutRequest, RangeRequest, RangeResponse,
    DELETE_RANGE_PATH, PUT_PATH, RANGE_PATH,
};

/// A record store backed by an etcd cluster's JSON gateway.
///
/// This store maps record operations to gateway calls:
/// - `list(prefix)` performs a serializable prefix range read
/// - `put(key, value)` writes a single key
/// - `delete(key)` removes a single key
///
/// Endpoints are tried in order. A connect failure or timeout moves on to
/// the next endpoint; any answer from a gateway, including an error status,
/// is final.
///
/// # Example
///
/// ```ignore
/// use kvtree_etcd::{EtcdClient, EtcdConfig};
///
/// let client = EtcdClient::new(&EtcdConfig::from_endpoints("127.0.0.1:2379"))?;
/// for record in client.range("/registry/")? {
///     println!("{} = {}", record.key, record.value);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct EtcdClient {
    client: Client,
    endpoints: Vec<Url>,
}

impl EtcdClient {
    /// Create a client from connection settings.
    pub fn new(config: &EtcdConfig) -> Result<Self, Error> {
        let endpoints = config.endpoint_urls()?;

        let mut builder = Client::builder()
            .connect_timeout(config.dial_timeout)
            .timeout(config.request_timeout);
        if let Some(tls) = &config.tls {
            builder = apply_tls(builder, tls)?;
        }
        let client = builder.build()?;

        log::debug!("etcd client configured for {} endpoint(s)", endpoints.len());
        Ok(Self { client, endpoints })
    }

    /// Create a client with a custom reqwest client.
    pub fn with_client(client: Client, config: &EtcdConfig) -> Result<Self, Error> {
        Ok(Self {
            client,
            endpoints: config.endpoint_urls()?,
        })
    }

    /// The parsed endpoint base URLs, in the order they are tried.
    pub fn endpoints(&self) -> &[Url] {
        &self.endpoints
    }

    /// Fetch every record whose key starts with `prefix`, in key order.
    pub fn range(&self, prefix: &str) -> Result<Vec<KeyValueRecord>, Error> {
        let response: RangeResponse = self.call(RANGE_PATH, &RangeRequest::prefix(prefix))?;
        log::debug!(
            "range {:?} returned {} kvs (more: {})",
            prefix,
            response.kvs.len(),
            response.more
        );
        response
            .kvs
            .into_iter()
            .map(|kv| kv.into_record())
            .collect()
    }

    /// Write `value` at `key`.
    pub fn put_value(&self, key: &str, value: &str) -> Result<(), Error> {
        let _: Ack = self.call(PUT_PATH, &PutRequest::new(key, value))?;
        Ok(())
    }

    /// Delete `key`. Returns whether the key existed.
    pub fn delete_key(&self, key: &str) -> Result<bool, Error> {
        let response: DeleteRangeResponse =
            self.call(DELETE_RANGE_PATH, &DeleteRangeRequest::new(key))?;
        Ok(response.deleted > 0)
    }

    /// POST a JSON body to each endpoint until one answers.
    fn call<Req, Resp>(&self, api_path: &str, body: &Req) -> Result<Resp, Error>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let mut last_error = Error::NoEndpoints;
        for endpoint in &self.endpoints {
            let url = endpoint.join(api_path)?;
            match self.post(url.clone(), body) {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transport() => {
                    log::warn!("etcd endpoint {} unreachable: {}", url, e);
                    last_error = e;
                }
                Err(e) => return Err(e),
            }
        }
        log::error!("all etcd endpoints failed for {}", api_path);
        Err(last_error)
    }

    fn post<Req, Resp>(&self, url: Url, body: &Req) -> Result<Resp, Error>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let response = self.client.post(url).json(body).send()?;

        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(serde_json::from_str(&text)?)
    }
}

fn apply_tls(
    builder: reqwest::blocking::ClientBuilder,
    tls: &TlsConfig,
) -> Result<reqwest::blocking::ClientBuilder, Error> {
    let tls_error = |e: reqwest::Error| Error::Tls {
        message: e.to_string(),
    };

    let mut builder = builder.danger_accept_invalid_certs(tls.insecure_skip_verify);
    if let Some(ca) = &tls.ca {
        let certificate = Certificate::from_pem(&read_pem(ca)?).map_err(tls_error)?;
        builder = builder.add_root_certificate(certificate);
    }

    let cert = read_pem(&tls.cert)?;
    let key = read_pem(&tls.key)?;
    let identity = Identity::from_pkcs8_pem(&cert, &key).map_err(tls_error)?;
    Ok(builder.identity(identity))
}

impl RecordReader for EtcdClient {
    fn list(&mut self, prefix: &str) -> Result<Vec<KeyValueRecord>, CoreError> {
        self.range(prefix).map_err(|e| {
            log::error!("failed to list keys under {:?}: {}", prefix, e);
            e.into_fetch()
        })
    }
}

impl RecordWriter for EtcdClient {
    fn put(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        if key.is_empty() {
            return Err(CoreError::invalid_key("key must not be empty"));
        }
        self.put_value(key, value).map_err(|e| {
            log::error!("failed to put {:?}: {}", key, e);
            e.into_store()
        })
    }

    fn delete(&mut self, key: &str) -> Result<bool, CoreError> {
        if key.is_empty() {
            return Err(CoreError::invalid_key("key must not be empty"));
        }
        self.delete_key(key).map_err(|e| {
            log::error!("failed to delete {:?}: {}", key, e);
            e.into_store()
        })
    }
}
