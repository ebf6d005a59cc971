use trx_types::Network;

pub const MAINNET_TRONGRID: [(&str, &str); 1] = [("api.trongrid.io", "https://api.trongrid.io")];

pub const SHASTA_TRONGRID: [(&str, &str); 1] =
    [("api.shasta.trongrid.io", "https://api.shasta.trongrid.io")];

pub const NILE_TRONGRID: [(&str, &str); 1] = [("nile.trongrid.io", "https://nile.trongrid.io")];

pub const MAINNET_EXPLORER: &str = "https://tronscan.org/#/transaction/";
pub const SHASTA_EXPLORER: &str = "https://shasta.tronscan.org/#/transaction/";
pub const NILE_EXPLORER: &str = "https://nile.tronscan.org/#/transaction/";

pub fn explorer_base(network: Network) -> &'static str {
    match network {
        Network::Mainnet => MAINNET_EXPLORER,
        Network::Shasta => SHASTA_EXPLORER,
        Network::Nile => NILE_EXPLORER,
    }
}
