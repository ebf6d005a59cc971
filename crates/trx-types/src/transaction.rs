use derive_more::{Display, From, Into};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Raw ECDSA recovery ids 0/1 are sent as 27/28
pub const RECOVERY_MARKER_OFFSET: u8 = 27;

/// 32-byte transaction identifier, the sha256 of the protobuf-encoded raw data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, From, Into)]
pub struct TransactionId([u8; 32]);

impl TransactionId {
    pub fn from_hex(hex_str: &str) -> Result<Self, eyre::Error> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(hex_str.trim(), &mut bytes)?;
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for TransactionId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for TransactionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TransactionId::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// `raw_data` of a node-built transaction. Only the fields we read are typed;
/// everything else is carried through untouched so the broadcast body matches what the node built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Transaction as returned by `/wallet/createtransaction`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    #[serde(rename = "txID")]
    pub tx_id: TransactionId,
    pub raw_data: RawData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_data_hex: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UnsignedTransaction {
    /// Advisory fee limit set by the node, if any
    pub fn fee_limit(&self) -> Option<crate::Amount> {
        self.raw_data.fee_limit.map(crate::Amount::from_sun)
    }

    pub fn expiration(&self) -> Option<Timestamp> {
        self.raw_data
            .expiration
            .and_then(|ms| Timestamp::from_millisecond(ms).ok())
    }

    /// `None` when the node did not include `raw_data_hex`
    pub fn tx_id_matches_raw_data(&self) -> Option<bool> {
        let raw_hex = self.raw_data_hex.as_ref()?;
        let matches = match hex::decode(raw_hex) {
            Ok(raw) => Sha256::digest(&raw).as_slice() == self.tx_id.as_bytes(),
            Err(_) => false,
        };
        Some(matches)
    }
}

/// 65-byte `r || s || v` signature where `v` is the offset recovery marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecoverableSignature {
    r: [u8; 32],
    s: [u8; 32],
    v: u8,
}

impl RecoverableSignature {
    pub fn new(r: [u8; 32], s: [u8; 32], recovery_id: u8) -> Self {
        Self {
            r,
            s,
            v: recovery_id + RECOVERY_MARKER_OFFSET,
        }
    }

    pub fn r(&self) -> &[u8; 32] {
        &self.r
    }

    pub fn s(&self) -> &[u8; 32] {
        &self.s
    }

    /// Marker byte as sent on the wire (0x1b or 0x1c)
    pub fn v(&self) -> u8 {
        self.v
    }

    /// Raw recovery id (0 or 1), accepting either marker convention
    pub fn recovery_id(&self) -> Option<u8> {
        match self.v {
            0 | 1 => Some(self.v),
            27 | 28 => Some(self.v - RECOVERY_MARKER_OFFSET),
            _ => None,
        }
    }

    pub fn to_bytes(&self) -> [u8; 65] {
        let mut bytes = [0u8; 65];
        bytes[..32].copy_from_slice(&self.r);
        bytes[32..64].copy_from_slice(&self.s);
        bytes[64] = self.v;
        bytes
    }

    /// 130 hex characters
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, eyre::Error> {
        let mut bytes = [0u8; 65];
        hex::decode_to_slice(hex_str.trim(), &mut bytes)?;
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Ok(Self { r, s, v: bytes[64] })
    }
}

impl std::fmt::Display for RecoverableSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for RecoverableSignature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for RecoverableSignature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RecoverableSignature::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Unsigned transaction plus its signatures, serialized as the broadcast body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedTransaction {
    #[serde(flatten)]
    pub transaction: UnsignedTransaction,
    pub signature: Vec<RecoverableSignature>,
}

impl SignedTransaction {
    pub fn new(mut transaction: UnsignedTransaction, signature: RecoverableSignature) -> Self {
        // a stale signature list from the node would otherwise serialize twice
        transaction.extra.remove("signature");
        Self {
            transaction,
            signature: vec![signature],
        }
    }

    pub fn tx_id(&self) -> TransactionId {
        self.transaction.tx_id
    }
}

/// Response of `/wallet/broadcasttransaction`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastResult {
    pub success: bool,
    pub txid: Option<String>,
    pub code: Option<String>,
    pub message: Option<String>,
    pub raw_response: Value,
}

impl BroadcastResult {
    pub fn from_response(raw_response: Value) -> Self {
        let text = |key: &str| raw_response.get(key).and_then(Value::as_str).map(String::from);
        Self {
            success: raw_response.get("result").and_then(Value::as_bool) == Some(true),
            txid: text("txid"),
            code: text("code"),
            message: text("message"),
            raw_response,
        }
    }

    /// The node hex-encodes most error messages; decode them when possible
    pub fn message_text(&self) -> Option<String> {
        let message = self.message.as_ref()?;
        let decoded = hex::decode(message)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .filter(|text| !text.is_empty());
        Some(decoded.unwrap_or_else(|| message.clone()))
    }
}

/// Response of `/wallet/gettransactionbyid`
#[derive(Debug, Clone, PartialEq, Display)]
#[display("found={found} contract_result={contract_result:?}")]
pub struct TransactionLookup {
    pub found: bool,
    pub contract_result: Option<String>,
    pub raw_response: Value,
}

impl TransactionLookup {
    pub fn from_response(raw_response: Value) -> Self {
        let found = raw_response.get("txID").is_some();
        let contract_result = raw_response
            .get("ret")
            .and_then(|ret| ret.get(0))
            .and_then(|ret| ret.get("contractRet"))
            .and_then(Value::as_str)
            .map(String::from);
        Self {
            found,
            contract_result,
            raw_response,
        }
    }
}
