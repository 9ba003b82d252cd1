//! Owner signature recovery.
//!
//! Signatures are 65 bytes: `r` (32 bytes) ++ `s` (32 bytes) ++ `v` (1 byte). Recovery never
//! fails loudly; anything that cannot be recovered yields [`Address::ZERO`], which is never
//! accepted as a signer.

use alloy_primitives::{eip191_hash_message, keccak256, Address, B256};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

use crate::{constants::SIGNATURE_LENGTH, ValidationCode};

/// Returns the digest the owner signs for an operation hash:
/// `keccak256("\x19Ethereum Signed Message:\n32" ++ hash)`.
pub fn to_eth_signed_message_hash(hash: B256) -> B256 {
    eip191_hash_message(hash)
}

/// Recovers the signer of `digest` (`ecrecover`).
///
/// Both halves of the curve order are accepted for `s`: a high-s signature is normalized and its
/// recovery id flipped, which recovers the same key.
///
/// Returns [`Address::ZERO`] if the signature is not exactly 65 bytes long, if `v` is not 27 or
/// 28 after adding 27 to values below 27, or if the signature does not recover to a key.
pub fn recover_signer(digest: B256, signature: &[u8]) -> Address {
    if signature.len() != SIGNATURE_LENGTH {
        return Address::ZERO;
    }

    let mut v = signature[64];
    if v < 27 {
        v += 27;
    }
    if v != 27 && v != 28 {
        return Address::ZERO;
    }

    let Ok(mut signature) = Signature::from_slice(&signature[..64]) else {
        return Address::ZERO;
    };
    let mut parity = v - 27;
    if let Some(normalized) = signature.normalize_s() {
        signature = normalized;
        parity ^= 1;
    }
    let Some(recovery_id) = RecoveryId::from_byte(parity) else {
        return Address::ZERO;
    };
    let Ok(key) = VerifyingKey::recover_from_prehash(digest.as_slice(), &signature, recovery_id)
    else {
        return Address::ZERO;
    };

    public_key_to_address(&key)
}

/// Derives the address of a public key: the last 20 bytes of the keccak hash of the
/// uncompressed point without its `0x04` prefix.
pub fn public_key_to_address(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

/// Checks that `signature` over the EIP-191 digest of `user_op_hash` was produced by `owner`.
pub fn validate_signature(owner: Address, user_op_hash: B256, signature: &[u8]) -> ValidationCode {
    let signer = recover_signer(to_eth_signed_message_hash(user_op_hash), signature);
    if !signer.is_zero() && signer == owner {
        ValidationCode::Success
    } else {
        ValidationCode::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{to_high_s, TestSigner};
    use alloy_primitives::{address, b256};
    use rstest::rstest;

    const HASH: B256 = b256!("1111111111111111111111111111111111111111111111111111111111111111");

    #[test]
    fn test_well_known_key_address() {
        // The secp256k1 key with scalar 1.
        let signer = TestSigner::from_scalar(1);
        assert_eq!(signer.address(), address!("7E5F4552091A69125d5DfCb7b8C2659029395Bdf"));
    }

    #[test]
    fn test_eth_signed_message_hash_prefix() {
        let mut preimage = b"\x19Ethereum Signed Message:\n32".to_vec();
        preimage.extend_from_slice(HASH.as_slice());
        assert_eq!(to_eth_signed_message_hash(HASH), keccak256(preimage));
    }

    #[test]
    fn test_recover_owner_signature() {
        let signer = TestSigner::from_scalar(7);
        let digest = to_eth_signed_message_hash(HASH);
        let signature = signer.sign_digest(digest);
        assert_eq!(signature.len(), 65);
        assert!(signature[64] == 27 || signature[64] == 28);
        assert_eq!(recover_signer(digest, &signature), signer.address());
    }

    #[test]
    fn test_v_below_27_is_normalized() {
        let signer = TestSigner::from_scalar(7);
        let digest = to_eth_signed_message_hash(HASH);
        let mut signature = signer.sign_digest(digest).to_vec();
        signature[64] -= 27;
        assert_eq!(recover_signer(digest, &signature), signer.address());
    }

    #[test]
    fn test_high_s_signature_recovers_signer() {
        let signer = TestSigner::from_scalar(7);
        let digest = to_eth_signed_message_hash(HASH);
        let signature = signer.sign_digest(digest);
        let high_s = to_high_s(&signature);

        assert_ne!(high_s, signature);
        assert!(Signature::from_slice(&high_s[..64]).unwrap().normalize_s().is_some());
        assert_eq!(recover_signer(digest, &high_s), signer.address());

        // `v` below 27 is normalized for the high-s form too.
        let mut high_s = high_s.to_vec();
        high_s[64] -= 27;
        assert_eq!(recover_signer(digest, &high_s), signer.address());
    }

    #[rstest]
    #[case::too_short(64)]
    #[case::too_long(66)]
    #[case::empty(0)]
    fn test_wrong_length_recovers_zero(#[case] len: usize) {
        let signer = TestSigner::from_scalar(7);
        let digest = to_eth_signed_message_hash(HASH);
        let mut signature = signer.sign_digest(digest).to_vec();
        signature.resize(len, 0);
        assert_eq!(recover_signer(digest, &signature), Address::ZERO);
    }

    #[rstest]
    #[case(29)]
    #[case(35)]
    #[case(255)]
    fn test_invalid_v_recovers_zero(#[case] v: u8) {
        let signer = TestSigner::from_scalar(7);
        let digest = to_eth_signed_message_hash(HASH);
        let mut signature = signer.sign_digest(digest).to_vec();
        signature[64] = v;
        assert_eq!(recover_signer(digest, &signature), Address::ZERO);
    }

    #[test]
    fn test_zero_signature_recovers_zero() {
        let mut signature = [0u8; 65];
        signature[64] = 27;
        assert_eq!(recover_signer(HASH, &signature), Address::ZERO);
    }

    #[test]
    fn test_validate_signature() {
        let owner = TestSigner::from_scalar(7);
        let other = TestSigner::from_scalar(8);

        let signature = owner.sign_user_op_hash(HASH);
        assert_eq!(validate_signature(owner.address(), HASH, &signature), ValidationCode::Success);
        assert_eq!(validate_signature(other.address(), HASH, &signature), ValidationCode::Failed);

        // Signing the raw hash instead of its EIP-191 digest does not validate.
        let raw = owner.sign_digest(HASH);
        assert_eq!(validate_signature(owner.address(), HASH, &raw), ValidationCode::Failed);

        // A malformed signature never matches, not even an unset owner.
        assert_eq!(validate_signature(Address::ZERO, HASH, &[0u8; 10]), ValidationCode::Failed);
    }
}
