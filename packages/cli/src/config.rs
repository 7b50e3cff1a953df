//! Command line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use kvtree_etcd::{EtcdConfig, TlsConfig};

use crate::commands::Command;
use crate::error::Error;

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Output {
    /// Human-readable lines and an indented tree
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// kvtree - browse a flat etcd keyspace as a tree
#[derive(Parser, Debug)]
#[command(name = "kvtree")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Comma-separated etcd endpoints
    #[arg(long, env = "KVTREE_ENDPOINTS", default_value = "127.0.0.1:2379")]
    pub endpoints: String,

    /// PEM CA certificate to trust
    #[arg(long, env = "KVTREE_CA", value_name = "FILE")]
    pub ca: Option<PathBuf>,

    /// PEM client certificate
    #[arg(long, env = "KVTREE_CERT", value_name = "FILE")]
    pub cert: Option<PathBuf>,

    /// PEM (PKCS#8) client key
    #[arg(long = "key", env = "KVTREE_KEY", value_name = "FILE")]
    pub tls_key: Option<PathBuf>,

    /// Verify the server certificate when using TLS
    #[arg(long)]
    pub verify_server: bool,

    /// Seconds allowed to connect to one endpoint
    #[arg(long, default_value_t = 5, value_name = "SECS")]
    pub dial_timeout: u64,

    /// Seconds allowed for a whole request
    #[arg(long, default_value_t = 30, value_name = "SECS")]
    pub request_timeout: u64,

    /// Enable debug logging
    #[arg(long, env = "KVTREE_DEBUG")]
    pub debug: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Output::Text, global = true)]
    pub output: Output,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// The client settings these arguments describe.
    pub fn etcd_config(&self) -> Result<EtcdConfig, Error> {
        let mut config = EtcdConfig::from_endpoints(&self.endpoints)
            .with_dial_timeout(Duration::from_secs(self.dial_timeout))
            .with_request_timeout(Duration::from_secs(self.request_timeout));

        let tls = TlsConfig::from_parts(self.ca.clone(), self.cert.clone(), self.tls_key.clone())?;
        if let Some(tls) = tls {
            config = config.with_tls(tls.verify_server(self.verify_server));
        }
        Ok(config)
    }
}
