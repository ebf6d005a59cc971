//! In-memory ledger and signer doubles for pipeline and estimator tests.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::LedgerApi;
use crate::signer::TransactionSigner;
use trx_common::{Result, TrxError};
use trx_types::{
    Address, Amount, BroadcastResult, ChainFeeParameters, ChainParameter, RecoverableSignature,
    SignedTransaction, TransactionId, TransactionLookup, UnsignedTransaction, WireAddress,
};

pub(crate) const SENDER: &str = "TRXu9WJF61NeEX2RZiefoeq2pKxmXPfdeZ";
pub(crate) const RECEIVER: &str = "TWrW1vQbT9tmCBRrJNbeeuoJ9SbGTjUceK";
pub(crate) const RAW_DATA_HEX: &str = "0a025d8b220876a1d1a1b2c3d4e540f0b6c8e6b5325a67080112630a2d747970652e676f6f676c65617069732e636f6d2f70726f746f636f6c2e5472616e73666572436f6e747261637412320a1541aab8b59ccfa5e3bbe4112afa4497dd1d84b8605f121541e515eedae1b3902cb9207fc61995371eb3303b1718c0843d70d0e1c4e6b532";
pub(crate) const TX_ID: &str = "97babf45f1f685860ea3126a612d30f775c80323d14ac13850fb844398de7f86";

/// Node-shaped transfer whose `txID` is the sha256 of `RAW_DATA_HEX`
pub(crate) fn fixture_json(fee_limit: Option<u64>) -> Value {
    let mut tx = json!({
        "visible": false,
        "txID": TX_ID,
        "raw_data": {
            "contract": [{
                "parameter": {
                    "value": {
                        "amount": 1000000,
                        "owner_address": "41aab8b59ccfa5e3bbe4112afa4497dd1d84b8605f",
                        "to_address": "41e515eedae1b3902cb9207fc61995371eb3303b17"
                    },
                    "type_url": "type.googleapis.com/protocol.TransferContract"
                },
                "type": "TransferContract"
            }],
            "ref_block_bytes": "5d8b",
            "ref_block_hash": "76a1d1a1b2c3d4e5",
            "expiration": 1760659200000u64,
            "timestamp": 1760659140000u64
        },
        "raw_data_hex": RAW_DATA_HEX
    });
    if let Some(fee_limit) = fee_limit {
        tx["raw_data"]["fee_limit"] = json!(fee_limit);
    }
    tx
}

pub(crate) fn fixture_transaction(fee_limit: Option<u64>) -> UnsignedTransaction {
    serde_json::from_value(fixture_json(fee_limit)).expect("fixture parses")
}

pub(crate) fn chain_fees(energy_fee: i64, bandwidth_fee: i64) -> ChainFeeParameters {
    ChainFeeParameters::from_chain_parameters(&[
        ChainParameter {
            key: ChainFeeParameters::ENERGY_FEE_KEY.to_string(),
            value: Some(energy_fee),
        },
        ChainParameter {
            key: ChainFeeParameters::BANDWIDTH_FEE_KEY.to_string(),
            value: Some(bandwidth_fee),
        },
    ])
}

#[derive(Debug, Clone)]
pub(crate) enum BuildBehaviour {
    Succeed { fee_limit: Option<u64> },
    Reject(String),
    NetworkDown,
}

#[derive(Debug, Clone)]
pub(crate) enum BroadcastBehaviour {
    Accept,
    Reject { code: String, message: String },
    LostInTransit,
}

#[derive(Debug, Default)]
pub(crate) struct CallCounts {
    pub balance: AtomicUsize,
    pub parameters: AtomicUsize,
    pub create: AtomicUsize,
    pub broadcast: AtomicUsize,
    pub lookup: AtomicUsize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        [
            &self.balance,
            &self.parameters,
            &self.create,
            &self.broadcast,
            &self.lookup,
        ]
        .iter()
        .map(|c| c.load(Ordering::SeqCst))
        .sum()
    }
}

#[derive(Debug)]
pub(crate) struct MockLedger {
    /// `None` simulates an unreachable node
    pub balance: Option<Amount>,
    pub fee_parameters: ChainFeeParameters,
    pub build: BuildBehaviour,
    pub broadcast: BroadcastBehaviour,
    pub latency: Duration,
    pub calls: CallCounts,
    pub broadcast_bodies: Mutex<Vec<Value>>,
}

impl MockLedger {
    pub fn funded(balance: Amount) -> Self {
        Self {
            balance: Some(balance),
            fee_parameters: chain_fees(420, 1_000),
            build: BuildBehaviour::Succeed { fee_limit: None },
            broadcast: BroadcastBehaviour::Accept,
            latency: Duration::ZERO,
            calls: CallCounts::default(),
            broadcast_bodies: Mutex::new(Vec::new()),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            balance: None,
            fee_parameters: ChainFeeParameters::fallback(),
            build: BuildBehaviour::NetworkDown,
            broadcast: BroadcastBehaviour::LostInTransit,
            ..Self::funded(Amount::ZERO)
        }
    }

    pub fn with_fee_parameters(mut self, fee_parameters: ChainFeeParameters) -> Self {
        self.fee_parameters = fee_parameters;
        self
    }

    pub fn with_build(mut self, build: BuildBehaviour) -> Self {
        self.build = build;
        self
    }

    pub fn with_broadcast(mut self, broadcast: BroadcastBehaviour) -> Self {
        self.broadcast = broadcast;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl LedgerApi for MockLedger {
    async fn get_account_balance(&self, _address: &Address) -> Result<Amount> {
        self.calls.balance.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        self.balance
            .ok_or_else(|| TrxError::Network("connection refused".into()))
    }

    async fn get_chain_fee_parameters(&self) -> ChainFeeParameters {
        self.calls.parameters.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        self.fee_parameters
    }

    async fn create_transaction(
        &self,
        _owner: &WireAddress,
        _to: &WireAddress,
        amount: Amount,
    ) -> Result<UnsignedTransaction> {
        self.calls.create.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        if amount.is_zero() {
            return Err(TrxError::TransactionBuild(
                "Contract validate error : Amount must be greater than 0.".into(),
            ));
        }
        match &self.build {
            BuildBehaviour::Succeed { fee_limit } => Ok(fixture_transaction(*fee_limit)),
            BuildBehaviour::Reject(message) => Err(TrxError::TransactionBuild(message.clone())),
            BuildBehaviour::NetworkDown => Err(TrxError::Network("connection reset".into())),
        }
    }

    async fn broadcast_transaction(&self, signed: &SignedTransaction) -> Result<BroadcastResult> {
        self.calls.broadcast.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        let body = serde_json::to_value(signed)?;
        self.broadcast_bodies
            .lock()
            .expect("mock lock poisoned")
            .push(body);

        match &self.broadcast {
            BroadcastBehaviour::Accept => Ok(BroadcastResult::from_response(
                json!({"result": true, "txid": signed.tx_id().to_hex()}),
            )),
            BroadcastBehaviour::Reject { code, message } => {
                Ok(BroadcastResult::from_response(json!({
                    "code": code,
                    "txid": signed.tx_id().to_hex(),
                    "message": hex::encode(message),
                })))
            }
            BroadcastBehaviour::LostInTransit => {
                Err(TrxError::Network("connection reset by peer".into()))
            }
        }
    }

    async fn get_transaction_by_id(&self, tx_id: &TransactionId) -> Result<TransactionLookup> {
        self.calls.lookup.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        let bodies = self.broadcast_bodies.lock().expect("mock lock poisoned");
        let response = bodies
            .iter()
            .find(|body| body["txID"] == json!(tx_id.to_hex()))
            .cloned()
            .unwrap_or_else(|| json!({}));
        Ok(TransactionLookup::from_response(response))
    }
}

/// Signer that never touches a key: a fixed, well-formed signature or a scripted failure
#[derive(Debug, Default)]
pub(crate) struct FakeSigner {
    pub fail: bool,
    /// Account the fake key claims; `None` skips the sender check
    pub address: Option<Address>,
    pub calls: AtomicUsize,
}

impl FakeSigner {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn owning(address: &str) -> Self {
        Self {
            address: Some(Address::from_string(address).expect("fixture address")),
            ..Self::default()
        }
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TransactionSigner for FakeSigner {
    fn sign(&self, transaction: UnsignedTransaction) -> Result<SignedTransaction> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(TrxError::Signing("fake signer refused".into()));
        }
        let signature = RecoverableSignature::new([0x11; 32], [0x22; 32], 0);
        Ok(SignedTransaction::new(transaction, signature))
    }

    fn address(&self) -> Option<Address> {
        self.address.clone()
    }
}
