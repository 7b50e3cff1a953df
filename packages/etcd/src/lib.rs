//! # kvtree-etcd
//!
//! An etcd v3 record store for kvtree, speaking the etcd JSON gateway
//! (`/v3/kv/range`, `/v3/kv/put`, `/v3/kv/deleterange`) over HTTP(S).
//!
//! ```ignore
//! use kvtree_core::build_tree;
//! use kvtree_etcd::{EtcdClient, EtcdConfig};
//!
//! let config = EtcdConfig::from_endpoints("127.0.0.1:2379,127.0.0.1:22379");
//! let mut client = EtcdClient::new(&config)?;
//!
//! // Flat listing
//! let records = client.range("/registry/")?;
//!
//! // Hierarchical view
//! let tree = build_tree(&mut client, "/registry/")?;
//! ```

pub mod config;
pub mod error;
pub mod types;

mod client;

pub use client::EtcdClient;
pub use config::{EtcdConfig, TlsConfig};
pub use error::Error;
