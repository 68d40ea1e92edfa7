//! # Signature Recovery (secp256k1)
//!
//! Recovers a signer identity from an operation digest and an ECDSA
//! signature. This is the trusted cryptographic primitive behind
//! operation validation.
//!
//! ## Design
//!
//! - Recovery is a pure function with no side effects.
//! - A malformed signature yields `None` rather than an error: callers must
//!   check membership of the recovered identity anyway, which naturally
//!   rejects failed recoveries since they match no member.
//! - The raw digest is canonicalized with a domain-separation prefix before
//!   recovery, so signatures over account operations can never collide with
//!   signatures over arbitrary transactions.
//!
//! ## Security Notes
//!
//! - **Malleability (EIP-2)**: S must be strictly below the curve half-order.
//! - **Scalar range**: R and S must be in [1, n-1].
//! - **Constant-time checks**: range comparisons use the `subtle` crate.

use crate::domain::value_objects::{Address, EcdsaSignature, Hash};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};
use subtle::{Choice, ConstantTimeEq};

/// secp256k1 curve order n.
const SECP256K1_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// Half of the secp256k1 curve order (malleability bound).
const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

/// Domain-separation prefix applied to every operation digest before
/// recovery (personal-sign convention over a 32-byte payload).
const SIGNED_DIGEST_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

// =============================================================================
// HASHING
// =============================================================================

/// Keccak-256 hash function.
#[must_use]
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    Hash::new(hash)
}

/// Canonicalizes an operation digest for signing.
///
/// Applies the domain-separation prefix and re-hashes, so the value members
/// actually sign is bound to this account protocol.
#[must_use]
pub fn signed_operation_digest(digest: &Hash) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(SIGNED_DIGEST_PREFIX);
    hasher.update(digest.as_bytes());
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    Hash::new(hash)
}

// =============================================================================
// RECOVERY
// =============================================================================

/// Recovers the signer identity from an operation digest and signature.
///
/// The digest is canonicalized with [`signed_operation_digest`] before
/// recovery. Returns `None` for any malformed signature:
/// out-of-range R or S, high S (malleable), invalid recovery id, or a
/// signature that does not recover to a valid public key.
#[must_use]
pub fn recover_signer(digest: &Hash, signature: &EcdsaSignature) -> Option<Address> {
    if !is_valid_scalar(&signature.r) || !is_valid_scalar(&signature.s) {
        return None;
    }
    if !is_low_s(&signature.s) {
        return None;
    }

    let recovery_id = parse_recovery_id(signature.v)?;

    let mut sig_bytes = [0u8; 64];
    sig_bytes[..32].copy_from_slice(&signature.r);
    sig_bytes[32..].copy_from_slice(&signature.s);
    let sig = Signature::from_slice(&sig_bytes).ok()?;

    let bound = signed_operation_digest(digest);
    let recovered_key =
        VerifyingKey::recover_from_prehash(bound.as_bytes(), &sig, recovery_id).ok()?;

    Some(address_from_pubkey(&recovered_key))
}

/// Derives the 20-byte identity from a secp256k1 public key:
/// the last 20 bytes of the Keccak-256 hash of the uncompressed key.
#[must_use]
pub fn address_from_pubkey(public_key: &VerifyingKey) -> Address {
    let encoded = public_key.to_encoded_point(false);
    let hash = keccak256(&encoded.as_bytes()[1..]); // skip 0x04 prefix

    let mut address = [0u8; 20];
    address.copy_from_slice(&hash.as_bytes()[12..]);
    Address::new(address)
}

// =============================================================================
// SCALAR VALIDATION
// =============================================================================

/// Constant-time check that `scalar` is in [1, n-1].
fn is_valid_scalar(scalar: &[u8; 32]) -> bool {
    let mut is_zero = Choice::from(1u8);
    for &byte in scalar {
        is_zero &= byte.ct_eq(&0u8);
    }

    let below_order = ct_less_than(scalar, &SECP256K1_ORDER);
    let valid = !is_zero & below_order;
    valid.into()
}

/// Constant-time check that S is strictly below the half-order (EIP-2).
fn is_low_s(s: &[u8; 32]) -> bool {
    ct_less_than(s, &SECP256K1_HALF_ORDER).into()
}

/// Constant-time big-endian `lhs < rhs` over 32-byte values.
///
/// No early returns: both "less" and "greater" are accumulated so the
/// running time does not depend on where the values diverge.
fn ct_less_than(lhs: &[u8; 32], rhs: &[u8; 32]) -> Choice {
    let mut less = Choice::from(0u8);
    let mut greater = Choice::from(0u8);

    for i in 0..32 {
        let not_decided = !(less | greater);
        let byte_less = Choice::from(u8::from(lhs[i] < rhs[i]));
        let byte_greater = Choice::from(u8::from(lhs[i] > rhs[i]));

        less |= not_decided & byte_less;
        greater |= not_decided & byte_greater;
    }

    less
}

/// Parses a recovery id from a v value. Valid: 0, 1, 27, 28.
fn parse_recovery_id(v: u8) -> Option<RecoveryId> {
    let id = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        _ => return None,
    };
    RecoveryId::try_from(id).ok()
}

/// Computes n - s (used by the signing helper to normalize high-S values).
#[cfg(any(test, feature = "test-helpers"))]
#[must_use]
fn invert_s(s: &[u8; 32]) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut borrow: i32 = 0;

    for i in (0..32).rev() {
        let diff = i32::from(SECP256K1_ORDER[i]) - i32::from(s[i]) - borrow;
        if diff < 0 {
            result[i] = (diff + 256) as u8;
            borrow = 1;
        } else {
            result[i] = diff as u8;
            borrow = 0;
        }
    }

    result
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    //! Keypair generation and signing, for tests only.

    use super::*;
    use k256::ecdsa::SigningKey;

    /// Generates a fresh secp256k1 keypair and the derived identity.
    pub fn generate_keypair() -> (SigningKey, Address) {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        let address = address_from_pubkey(signing_key.verifying_key());
        (signing_key, address)
    }

    /// Signs an operation digest the way a member's wallet would:
    /// canonicalizes with the domain-separation prefix, signs the prehash,
    /// and normalizes S to the low half (EIP-2).
    pub fn sign_digest(digest: &Hash, key: &SigningKey) -> EcdsaSignature {
        let bound = signed_operation_digest(digest);
        let (sig, recid) = key
            .sign_prehash_recoverable(bound.as_bytes())
            .expect("signing failed");

        let sig_bytes = sig.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&sig_bytes[..32]);
        s.copy_from_slice(&sig_bytes[32..]);

        if is_low_s(&s) {
            EcdsaSignature::new(r, s, recid.to_byte() + 27)
        } else {
            // Flip S into the low half and the recovery id with it.
            let v = if recid.to_byte() == 0 { 28 } else { 27 };
            EcdsaSignature::new(r, invert_s(&s), v)
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
