//! # kvtree-cli
//!
//! Browse an etcd keyspace as a tree from the command line.
//!
//! ## Usage
//!
//! ```bash
//! # Flat listing of everything under /registry
//! kvtree --endpoints 10.0.0.1:2379 list /registry
//!
//! # The same keys as a tree, as JSON
//! kvtree -o json tree /registry
//!
//! # Mutations go straight to the cluster
//! kvtree put /app/config/mode production
//! kvtree delete /app/config/mode
//!
//! # Client certificates (endpoints switch to https)
//! kvtree --cert client.pem --key client-key.pem --ca ca.pem tree /
//! ```
//!
//! Every connection flag also reads a `KVTREE_*` environment variable.

pub mod commands;
pub mod config;
pub mod error;
pub mod render;

use std::io::Write;

use kvtree_etcd::EtcdClient;

pub use commands::{execute, Command};
pub use config::{Args, Output};
pub use error::Error;

/// Install the stderr logger. `debug` forces debug level; otherwise
/// `RUST_LOG` applies, defaulting to info.
pub fn init_logging(debug: bool) {
    let env = env_logger::Env::default().default_filter_or("info");
    let mut builder = env_logger::Builder::from_env(env);
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp_millis();
    // A logger may already be installed when embedded in tests.
    let _ = builder.try_init();
}

/// Connect to the configured cluster and run the requested command.
pub fn run(args: &Args) -> Result<(), Error> {
    let config = args.etcd_config()?;
    log::debug!("connecting to {:?}", config.endpoints);
    let mut client = EtcdClient::new(&config)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&args.command, args.output, &mut client, &mut out)?;
    out.flush()?;
    Ok(())
}
