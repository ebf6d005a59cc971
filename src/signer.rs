use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};
use tracing::debug;

use trx_common::{Result, TrxError};
use trx_types::address::{ADDRESS_VERSION_BYTE, WIRE_ADDRESS_LEN};
use trx_types::{
    Address, RecoverableSignature, SignedTransaction, TransactionId, UnsignedTransaction,
    WireAddress,
};

/// Produces the signature the node expects over a transaction id
pub trait TransactionSigner: Send + Sync {
    fn sign(&self, transaction: UnsignedTransaction) -> Result<SignedTransaction>;

    /// Account the signatures belong to, when the signer can tell
    fn address(&self) -> Option<Address> {
        None
    }
}

/// TRON account of a public key: version byte plus the last 20 bytes of
/// keccak-256 over the uncompressed point without its 0x04 tag
pub fn address_of(verifying_key: &VerifyingKey) -> Address {
    let point = verifying_key.to_encoded_point(false);
    let hash = Keccak256::digest(&point.as_bytes()[1..]);

    let mut bytes = [0u8; WIRE_ADDRESS_LEN];
    bytes[0] = ADDRESS_VERSION_BYTE;
    bytes[1..].copy_from_slice(&hash[12..]);
    Address::from_wire(WireAddress::from_bytes(bytes))
}

/// secp256k1 signer over a caller-held private key. The key is zeroized on drop.
pub struct Secp256k1Signer {
    signing_key: SigningKey,
}

impl Secp256k1Signer {
    /// Parse a 64-character hex private key, with or without a `0x` prefix
    pub fn from_hex(private_key: &str) -> Result<Self> {
        let private_key = private_key.trim();
        let private_key = private_key
            .strip_prefix("0x")
            .or_else(|| private_key.strip_prefix("0X"))
            .unwrap_or(private_key);

        let mut bytes = [0u8; 32];
        hex::decode_to_slice(private_key, &mut bytes)
            .map_err(|_| TrxError::Signing("private key must be 32 bytes of hex".into()))?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let signing_key = SigningKey::from_slice(bytes)
            .map_err(|_| TrxError::Signing("private key is not a valid secp256k1 scalar".into()))?;
        Ok(Self { signing_key })
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Sign a 32-byte digest as-is. The transaction id already is the digest, so no re-hashing.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Result<RecoverableSignature> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(digest)
            .map_err(|e| TrxError::Signing(e.to_string()))?;

        // low-S is required; flipping s mirrors R, so the y parity flips with it
        let (signature, recovery_id) = match signature.normalize_s() {
            Some(normalized) => (
                normalized,
                RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced()),
            ),
            None => (signature, recovery_id),
        };

        let bytes = signature.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        Ok(RecoverableSignature::new(r, s, recovery_id.to_byte()))
    }
}

impl TransactionSigner for Secp256k1Signer {
    fn sign(&self, transaction: UnsignedTransaction) -> Result<SignedTransaction> {
        if transaction.tx_id_matches_raw_data() == Some(false) {
            return Err(TrxError::Signing(format!(
                "transaction id {} does not match raw_data_hex",
                transaction.tx_id
            )));
        }

        let signature = self.sign_digest(transaction.tx_id.as_bytes())?;
        debug!(tx_id = %transaction.tx_id, v = signature.v(), "transaction signed");
        Ok(SignedTransaction::new(transaction, signature))
    }

    fn address(&self) -> Option<Address> {
        Some(address_of(self.verifying_key()))
    }
}

impl std::fmt::Debug for Secp256k1Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secp256k1Signer")
            .field(
                "public_key",
                &hex::encode(self.verifying_key().to_sec1_bytes()),
            )
            .finish_non_exhaustive()
    }
}

/// Sign with a one-off key
pub fn sign_transaction(
    transaction: UnsignedTransaction,
    private_key: &str,
) -> Result<SignedTransaction> {
    Secp256k1Signer::from_hex(private_key)?.sign(transaction)
}

fn split_signature(signature: &RecoverableSignature) -> Option<(Signature, RecoveryId)> {
    let bytes = signature.to_bytes();
    let sig = Signature::from_slice(&bytes[..64]).ok()?;
    let recovery_id = RecoveryId::from_byte(signature.recovery_id()?)?;
    Some((sig, recovery_id))
}

/// Recover the public key that produced `signature` over `tx_id`
pub fn recover_verifying_key(
    tx_id: &TransactionId,
    signature: &RecoverableSignature,
) -> Option<VerifyingKey> {
    let (sig, recovery_id) = split_signature(signature)?;
    VerifyingKey::recover_from_prehash(tx_id.as_bytes(), &sig, recovery_id).ok()
}

/// Check `signature` against `tx_id` and the expected public key, including the recovery marker
pub fn verify_signature(
    tx_id: &TransactionId,
    signature: &RecoverableSignature,
    verifying_key: &VerifyingKey,
) -> bool {
    let Some((sig, _)) = split_signature(signature) else {
        return false;
    };
    verifying_key
        .verify_prehash(tx_id.as_bytes(), &sig)
        .is_ok()
        && recover_verifying_key(tx_id, signature).as_ref() == Some(verifying_key)
}
