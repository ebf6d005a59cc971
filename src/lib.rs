pub mod fee_estimation;
pub mod node;
pub mod node_urls;
pub mod pipeline;
pub mod signer;

// Re-export types from our crates
pub use trx_common::{setup_logging, ErrorKind, Result, TrxError};
pub use trx_types::*;

pub use fee_estimation::FeeEstimator;
pub use node::client::{ClientOptions, LedgerApi, TronGridClient};
pub use node::Node;
pub use pipeline::{
    PipelineConfig, PipelineFailure, PreparedTransfer, Stage, TransferOutcome, TransferPipeline,
    TransferReport, TransferRequest,
};
pub use signer::{Secp256k1Signer, TransactionSigner};

/// Initialize logging for library consumers
pub fn init() -> Result<()> {
    trx_common::setup_logging()?;
    tracing::info!("trx-transfer library initialized");
    Ok(())
}
