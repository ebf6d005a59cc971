pub mod trongrid;

#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;
use trx_common::Result;
use trx_types::{
    Address, Amount, BroadcastResult, ChainFeeParameters, SignedTransaction, TransactionId,
    TransactionLookup, UnsignedTransaction, WireAddress,
};

pub use trongrid::{ClientOptions, TronGridClient};

/// The node endpoints a transfer needs. Implemented over HTTP by [`TronGridClient`]
/// and by in-memory doubles in tests.
#[async_trait]
pub trait LedgerApi: Send + Sync {
    /// Balance of `address`; accounts the ledger has never seen report zero
    async fn get_account_balance(&self, address: &Address) -> Result<Amount>;

    /// Current resource prices. Advisory: failures come back as
    /// [`ChainFeeParameters::fallback`] rather than an error.
    async fn get_chain_fee_parameters(&self) -> ChainFeeParameters;

    /// Ask the node to build an unsigned TRX transfer
    async fn create_transaction(
        &self,
        owner: &WireAddress,
        to: &WireAddress,
        amount: Amount,
    ) -> Result<UnsignedTransaction>;

    /// Submit once. A transport error here does not mean the node refused the transaction.
    async fn broadcast_transaction(&self, signed: &SignedTransaction) -> Result<BroadcastResult>;

    async fn get_transaction_by_id(&self, tx_id: &TransactionId) -> Result<TransactionLookup>;
}
