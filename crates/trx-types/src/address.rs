use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Every mainnet and testnet display address starts with this character
pub const ADDRESS_PREFIX: char = 'T';

/// Length of a display (base58check) address
pub const DISPLAY_ADDRESS_LEN: usize = 34;

/// Version byte carried at the front of every wire address
pub const ADDRESS_VERSION_BYTE: u8 = 0x41;

/// Length of a wire address in bytes: version byte plus 20-byte account hash
pub const WIRE_ADDRESS_LEN: usize = 21;

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Address validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("Empty address string")]
    EmptyAddress,

    #[error("Invalid address format: {0}")]
    InvalidFormat(String),

    #[error("Address checksum mismatch: {0}")]
    BadChecksum(String),

    #[error("Address version byte is not 0x41: {0}")]
    WrongVersion(String),

    #[error("Decoded address is {actual} bytes, need at least 21")]
    TooShort { actual: usize },

    #[error("Invalid wire address hex: {0}")]
    InvalidHex(String),
}

/// Syntactic check only: prefix, length and base58 alphabet.
/// Checksum and version are verified by [`to_wire_form`].
pub fn is_valid_display_address(s: &str) -> bool {
    !s.is_empty()
        && s.starts_with(ADDRESS_PREFIX)
        && s.len() == DISPLAY_ADDRESS_LEN
        && s.chars().all(|c| BASE58_ALPHABET.contains(c))
}

/// Decode a display address into the 21-byte form the node's HTTP API takes
pub fn to_wire_form(display: &str) -> Result<WireAddress, AddressError> {
    let payload = bs58::decode(display)
        .with_check(Some(ADDRESS_VERSION_BYTE))
        .into_vec()
        .map_err(|err| match err {
            bs58::decode::Error::InvalidChecksum { .. } => {
                AddressError::BadChecksum(display.to_string())
            }
            bs58::decode::Error::InvalidVersion { .. } => {
                AddressError::WrongVersion(display.to_string())
            }
            _ => AddressError::InvalidFormat(display.to_string()),
        })?;

    if payload.len() < WIRE_ADDRESS_LEN {
        return Err(AddressError::TooShort {
            actual: payload.len(),
        });
    }

    let mut bytes = [0u8; WIRE_ADDRESS_LEN];
    bytes.copy_from_slice(&payload[..WIRE_ADDRESS_LEN]);
    Ok(WireAddress(bytes))
}

/// Hex account identifier used in node API request bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WireAddress([u8; WIRE_ADDRESS_LEN]);

impl WireAddress {
    pub fn from_bytes(bytes: [u8; WIRE_ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, AddressError> {
        let mut bytes = [0u8; WIRE_ADDRESS_LEN];
        hex::decode_to_slice(hex_str.trim(), &mut bytes)
            .map_err(|_| AddressError::InvalidHex(hex_str.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; WIRE_ADDRESS_LEN] {
        &self.0
    }

    /// 42 lowercase hex characters
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Re-encode as a base58check display address
    pub fn to_display(&self) -> String {
        bs58::encode(self.0).with_check().into_string()
    }
}

impl std::fmt::Display for WireAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for WireAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for WireAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        WireAddress::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A validated TRON address, carrying both representations
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
#[display("{display}")]
pub struct Address {
    display: String,
    wire: WireAddress,
}

impl Address {
    /// Parse a display address. The syntactic check runs before any decoding.
    pub fn from_string(address_str: &str) -> Result<Self, AddressError> {
        let address_str = address_str.trim();
        if address_str.is_empty() {
            return Err(AddressError::EmptyAddress);
        }
        if !is_valid_display_address(address_str) {
            return Err(AddressError::InvalidFormat(address_str.to_string()));
        }

        let wire = to_wire_form(address_str)?;
        Ok(Self {
            display: address_str.to_string(),
            wire,
        })
    }

    pub fn from_wire(wire: WireAddress) -> Self {
        Self {
            display: wire.to_display(),
            wire,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.display
    }

    pub fn wire(&self) -> &WireAddress {
        &self.wire
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.display)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Address::from_string(&s).map_err(serde::de::Error::custom)
    }
}
