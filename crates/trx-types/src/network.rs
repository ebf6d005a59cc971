use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// TRON network presets
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// TRON mainnet
    #[display("mainnet")]
    Mainnet,
    /// Shasta testnet
    #[display("shasta")]
    #[default]
    Shasta,
    /// Nile testnet
    #[display("nile")]
    Nile,
}

impl Network {
    pub const ALL: [Network; 3] = [Network::Mainnet, Network::Shasta, Network::Nile];

    /// Check if this is a test network
    pub fn is_testnet(&self) -> bool {
        !matches!(self, Network::Mainnet)
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "shasta" => Ok(Network::Shasta),
            "nile" => Ok(Network::Nile),
            other => Err(format!(
                "Invalid network: {other}. Valid options: mainnet, shasta, nile"
            )),
        }
    }
}
