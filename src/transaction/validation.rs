use super::Coin;
use crate::crypto;
use crate::error::TxChainError;

/// Check that successive versions of one coin form an unbroken chain of
/// authorized transfers. Versions must be in the order they entered blocks.
///
/// Scans from the oldest transfer forward and reports the first failure:
/// each version must name the digest of its predecessor and be signed by
/// the predecessor's receiver.
pub fn validate_versions<'a, I>(versions: I) -> Result<(), TxChainError>
where
    I: IntoIterator<Item = &'a Coin>,
{
    let mut prev: Option<&Coin> = None;
    for (version, coin) in versions.into_iter().enumerate() {
        if let Some(prev) = prev {
            if !crypto::hash_check(prev, &coin.tx.prev_hash) {
                return Err(TxChainError::PrevHashMismatch {
                    coin: coin.id,
                    version,
                });
            }
            if !crypto::verify(&coin.tx, &coin.sender_signature, prev.owner()) {
                return Err(TxChainError::SignatureInvalid {
                    coin: coin.id,
                    version,
                });
            }
        }
        prev = Some(coin);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{KeyPair, generate_keypair};
    use crate::transaction::model::Transaction;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn parties(seed: u64) -> (StdRng, KeyPair, KeyPair, KeyPair) {
        let mut rng = StdRng::seed_from_u64(seed);
        let a = generate_keypair(&mut rng);
        let b = generate_keypair(&mut rng);
        let c = generate_keypair(&mut rng);
        (rng, a, b, c)
    }

    #[test]
    fn honest_history_validates() {
        let (mut rng, a, b, c) = parties(20);
        let v0 = Coin::mint(a.public.clone(), &mut rng);
        let v1 = v0.transfer(&a.private, b.public.clone());
        let v2 = v1.transfer(&b.private, c.public.clone());
        assert_eq!(validate_versions([&v0, &v1, &v2]), Ok(()));
    }

    #[test]
    fn single_version_is_trivially_valid() {
        let (mut rng, a, _, _) = parties(21);
        let v0 = Coin::mint(a.public, &mut rng);
        assert_eq!(validate_versions([&v0]), Ok(()));
        assert_eq!(validate_versions(std::iter::empty::<&Coin>()), Ok(()));
    }

    #[test]
    fn altered_previous_hash_is_rejected() {
        let (mut rng, a, b, _) = parties(22);
        let v0 = Coin::mint(a.public.clone(), &mut rng);
        let mut v1 = v0.transfer(&a.private, b.public.clone());
        v1.tx.prev_hash = "aaaaaaaaaa".into();
        assert_eq!(
            validate_versions([&v0, &v1]),
            Err(TxChainError::PrevHashMismatch {
                coin: v0.id,
                version: 1
            })
        );
    }

    #[test]
    fn signature_by_non_owner_is_rejected() {
        let (mut rng, a, b, c) = parties(23);
        let v0 = Coin::mint(a.public.clone(), &mut rng);
        // c signs away a's coin
        let v1 = v0.transfer(&c.private, b.public.clone());
        assert_eq!(
            validate_versions([&v0, &v1]),
            Err(TxChainError::SignatureInvalid {
                coin: v0.id,
                version: 1
            })
        );
    }

    #[test]
    fn first_failure_from_the_oldest_transfer_wins() {
        let (mut rng, a, b, c) = parties(24);
        let v0 = Coin::mint(a.public.clone(), &mut rng);
        let v1 = v0.transfer(&c.private, b.public.clone());
        let mut v2 = v1.transfer(&b.private, c.public.clone());
        v2.tx = Transaction {
            prev_hash: String::new(),
            receiver_public_key: c.public.clone(),
        };
        let err = validate_versions([&v0, &v1, &v2]).unwrap_err();
        assert_eq!(err.code(), 2);
    }
}
