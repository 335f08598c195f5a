//! Content hashing and the toy signature scheme used to authorize transfers.
//!
//! WARNING: `XorScheme` is NOT secure. The private key is a trivial function
//! of the public key, so anyone can forge a signature for anyone. It only
//! keeps the sign-with-private / verify-with-public interface so a real
//! asymmetric scheme can be dropped in behind `SignatureScheme`.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

use crate::codec;

/// Length in bytes of generated public and private keys.
pub const KEY_LEN: usize = 10;

/// A SHA-256 content digest.
pub type Digest = [u8; 32];

/// The scheme every node signs and verifies with.
pub const SCHEME: XorScheme = XorScheme;

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicKey(#[serde(with = "hex")] Vec<u8>);

impl PublicKey {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        hex::decode(s.trim()).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(Vec<u8>);

impl PrivateKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}

/// Sender signature over a transaction. Empty for freshly minted coins.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(#[serde(with = "hex")] Vec<u8>);

impl Signature {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", hex::encode(&self.0))
    }
}

#[derive(Debug, Clone)]
pub struct KeyPair {
    pub public: PublicKey,
    pub private: PrivateKey,
}

/// Signing contract shared by every node. Implementations must make
/// `verify(m, sign(m, private), public)` hold for a generated pair.
pub trait SignatureScheme {
    fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> KeyPair;
    fn sign(&self, message: &[u8], key: &PrivateKey) -> Signature;
    fn verify(&self, message: &[u8], signature: &Signature, key: &PublicKey) -> bool;
}

/// Repeating-key XOR over the message digest. Insecure, see module docs.
#[derive(Debug, Clone, Copy, Default)]
pub struct XorScheme;

impl XorScheme {
    /// `private[i] = public[i] ^ (i mod 256)`. Anyone holding the public
    /// key can do this, which is exactly why the scheme is a toy.
    fn private_key_for(public: &PublicKey) -> PrivateKey {
        let bytes = public
            .as_bytes()
            .iter()
            .enumerate()
            .map(|(i, b)| b ^ (i % 256) as u8)
            .collect();
        PrivateKey(bytes)
    }
}

impl SignatureScheme for XorScheme {
    fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> KeyPair {
        let mut bytes = vec![0u8; KEY_LEN];
        rng.fill_bytes(&mut bytes);
        let public = PublicKey(bytes);
        let private = Self::private_key_for(&public);
        KeyPair { public, private }
    }

    fn sign(&self, message: &[u8], key: &PrivateKey) -> Signature {
        let digest = hash_bytes(message);
        let bytes = digest
            .iter()
            .zip(key.as_bytes().iter().cycle())
            .map(|(d, k)| d ^ k)
            .collect();
        Signature(bytes)
    }

    fn verify(&self, message: &[u8], signature: &Signature, key: &PublicKey) -> bool {
        if key.as_bytes().is_empty() || signature.as_bytes().len() != 32 {
            return false;
        }
        let expected = self.sign(message, &Self::private_key_for(key));
        expected == *signature
    }
}

pub fn hash_bytes(input: &[u8]) -> Digest {
    Sha256::digest(input).into()
}

/// Digest of an entity's canonical serialization.
pub fn hash<T: Serialize + ?Sized>(entity: &T) -> Digest {
    hash_bytes(&codec::encode(entity))
}

pub fn hash_hex<T: Serialize + ?Sized>(entity: &T) -> String {
    hex::encode(hash(entity))
}

/// True when `entity` hashes to the hex digest `expected`.
pub fn hash_check<T: Serialize + ?Sized>(entity: &T, expected: &str) -> bool {
    match hex::decode(expected) {
        Ok(bytes) => bytes == hash(entity),
        Err(_) => false,
    }
}

pub fn sign<T: Serialize + ?Sized>(entity: &T, key: &PrivateKey) -> Signature {
    SCHEME.sign(&codec::encode(entity), key)
}

pub fn verify<T: Serialize + ?Sized>(entity: &T, signature: &Signature, key: &PublicKey) -> bool {
    SCHEME.verify(&codec::encode(entity), signature, key)
}

pub fn generate_keypair<R: Rng + ?Sized>(rng: &mut R) -> KeyPair {
    SCHEME.generate(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn private_key_is_derived_from_public_key() {
        let mut rng = StdRng::seed_from_u64(7);
        let pair = generate_keypair(&mut rng);
        assert_eq!(pair.public.as_bytes().len(), KEY_LEN);
        for (i, (p, s)) in pair
            .public
            .as_bytes()
            .iter()
            .zip(pair.private.as_bytes())
            .enumerate()
        {
            assert_eq!(*s, p ^ i as u8);
        }
    }

    #[test]
    fn signature_verifies_with_matching_public_key() {
        let mut rng = StdRng::seed_from_u64(1);
        let pair = generate_keypair(&mut rng);
        let sig = sign("transfer", &pair.private);
        assert_eq!(sig.as_bytes().len(), 32);
        assert!(verify("transfer", &sig, &pair.public));
    }

    #[test]
    fn signature_fails_for_other_key_or_message() {
        let mut rng = StdRng::seed_from_u64(2);
        let alice = generate_keypair(&mut rng);
        let bob = generate_keypair(&mut rng);
        let sig = sign("transfer", &alice.private);
        assert!(!verify("transfer", &sig, &bob.public));
        assert!(!verify("tampered", &sig, &alice.public));
    }

    #[test]
    fn malformed_inputs_fail_verification() {
        let mut rng = StdRng::seed_from_u64(3);
        let pair = generate_keypair(&mut rng);
        let empty_key = PublicKey::from_bytes(Vec::new());
        assert!(!verify("m", &Signature::empty(), &empty_key));
        assert!(!verify("m", &Signature::empty(), &pair.public));
        assert!(!verify("m", &Signature::from_bytes(vec![0; 5]), &pair.public));
    }

    #[test]
    fn hash_check_accepts_either_case() {
        let digest = hash_hex("entity");
        assert!(hash_check("entity", &digest));
        assert!(hash_check("entity", &digest.to_uppercase()));
        assert!(!hash_check("entity", "aaaaaaaaaa"));
        assert!(!hash_check("entity", "not hex"));
    }

    #[test]
    fn public_key_hex_round_trips() {
        let key = PublicKey::from_hex("00ff10").unwrap();
        assert_eq!(key.as_bytes(), &[0x00, 0xff, 0x10]);
        assert_eq!(key.to_string(), "00ff10");
        assert!(PublicKey::from_hex("zz").is_err());
    }
}
