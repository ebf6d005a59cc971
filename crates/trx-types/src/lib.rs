pub mod address;
pub mod amount;
pub mod fees;
pub mod network;
pub mod transaction;

pub use address::{is_valid_display_address, to_wire_form, Address, AddressError, WireAddress};
pub use amount::{Amount, AmountError};
pub use fees::{ChainFeeParameters, ChainParameter, CostEstimate, EstimateSource, ParameterSource};
pub use network::Network;
pub use transaction::{
    BroadcastResult, RawData, RecoverableSignature, SignedTransaction, TransactionId,
    TransactionLookup, UnsignedTransaction,
};
