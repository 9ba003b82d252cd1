use alloy_primitives::{hex, Address, Bytes, B256, U256};
use k256::ecdsa::SigningKey;

use crate::{public_key_to_address, to_eth_signed_message_hash};

/// The order of the secp256k1 group.
const SECP256K1_ORDER: [u8; 32] =
    hex!("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141");

/// Returns the malleated form `(r, n - s, v ^ 1)` of an `r ++ s ++ v` signature, which `ecrecover`
/// resolves to the same signer.
pub fn to_high_s(signature: &[u8]) -> Bytes {
    let mut malleated = signature.to_vec();
    let s = U256::from_be_slice(&signature[32..64]);
    let order = U256::from_be_bytes(SECP256K1_ORDER);
    malleated[32..64].copy_from_slice(&(order - s).to_be_bytes::<32>());
    malleated[64] = if signature[64] == 27 { 28 } else { 27 };
    malleated.into()
}

/// A secp256k1 key producing owner signatures in the `r ++ s ++ v` layout with `v` in
/// `{27, 28}`.
#[derive(Debug, Clone, derive_more::Deref)]
pub struct TestSigner {
    #[deref]
    key: SigningKey,
}

impl TestSigner {
    /// Creates the signer whose secret scalar is `scalar`.
    pub fn from_scalar(scalar: u64) -> Self {
        let key = SigningKey::from_slice(&U256::from(scalar).to_be_bytes::<32>())
            .expect("scalar must be non-zero");
        Self { key }
    }

    /// Returns the signer's address.
    pub fn address(&self) -> Address {
        public_key_to_address(self.key.verifying_key())
    }

    /// Signs `digest` as is.
    pub fn sign_digest(&self, digest: B256) -> Bytes {
        let (signature, recovery_id) =
            self.key.sign_prehash_recoverable(digest.as_slice()).expect("signing failed");
        let mut bytes = signature.to_bytes().to_vec();
        bytes.push(27 + recovery_id.to_byte());
        bytes.into()
    }

    /// Signs the EIP-191 digest of an operation hash, as the owner of an account does.
    pub fn sign_user_op_hash(&self, user_op_hash: B256) -> Bytes {
        self.sign_digest(to_eth_signed_message_hash(user_op_hash))
    }
}
