//! Owner signatures (ed25519)

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

use crate::error::TransitionError;
use crate::types::Address;

/// Address of the owner holding `key`.
pub fn address_of(key: &SigningKey) -> Address {
    key.verifying_key().to_bytes()
}

/// Sign `message` as the owner of `key`.
pub fn sign(key: &SigningKey, message: &[u8]) -> Signature {
    key.sign(message)
}

/// Check that `owner` signed `message`.
pub fn verify_owner_signature(
    owner: &Address,
    message: &[u8],
    signature: &Signature,
) -> Result<(), TransitionError> {
    let invalid = || TransitionError::SignatureInvalid {
        owner: hex::encode(owner),
    };
    let key = VerifyingKey::from_bytes(owner).map_err(|_| invalid())?;
    key.verify(message, signature).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_signature_round_trip() {
        let mut rng = StdRng::seed_from_u64(1);
        let key = SigningKey::generate(&mut rng);
        let signature = sign(&key, b"hello");

        assert!(verify_owner_signature(&address_of(&key), b"hello", &signature).is_ok());
        assert!(verify_owner_signature(&address_of(&key), b"other", &signature).is_err());
    }

    #[test]
    fn test_signature_from_other_owner_rejected() {
        let mut rng = StdRng::seed_from_u64(2);
        let key = SigningKey::generate(&mut rng);
        let other = SigningKey::generate(&mut rng);
        let signature = sign(&key, b"hello");

        let err = verify_owner_signature(&address_of(&other), b"hello", &signature).unwrap_err();
        assert!(matches!(err, TransitionError::SignatureInvalid { .. }));
    }
}
