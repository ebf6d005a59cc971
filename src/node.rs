pub mod client;

use crate::node_urls::*;
use trx_types::{Network, TransactionId};

/// A TronGrid-compatible HTTP endpoint bound to one network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    pub network: Network,
    pub url: String,
}

impl Node {
    pub fn default(network: Network) -> Self {
        let (name, url) = match network {
            Network::Mainnet => MAINNET_TRONGRID[0],
            Network::Shasta => SHASTA_TRONGRID[0],
            Network::Nile => NILE_TRONGRID[0],
        };

        Self {
            name: name.to_string(),
            network,
            url: url.to_string(),
        }
    }

    /// Self-hosted or local node; the network still decides the explorer links
    pub fn custom(network: Network, url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            name: url.clone(),
            network,
            url,
        }
    }

    /// `url` joined with `path`, tolerating a trailing slash on the base
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Tronscan link for a transaction on the given network
pub fn explorer_tx_url(network: Network, tx_id: &TransactionId) -> String {
    format!("{}{}", explorer_base(network), tx_id)
}
