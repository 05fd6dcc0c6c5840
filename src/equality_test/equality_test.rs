// ===========================================================================
// Orchestration du test d'égalité
//
//   A : round 1  ->  B : round 2  ->  A : rounds 3, 4, 5  ->  B : round 6
//   ->  A : round 7  ->  appelant : déchiffrement (1 = égal, 0 = différent)
//
// Chaque round dépend strictement du précédent. Tout message qui traverse
// la frontière A/B passe par l'encodage binaire, comme sur un transport.
// ===========================================================================

use num_traits::{One, Zero};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::paillier::p_keygen::{KeyPair, Ciphertext};
use crate::equality_test::params::ProtocolParams;
use crate::equality_test::messages::{encode_message, decode_message};
use crate::equality_test::party_a::PartyA;
use crate::equality_test::party_b::PartyB;
use crate::crypto_error::CryptoError;

fn relay<M: Serialize + DeserializeOwned>(label: &str, msg: &M) -> Result<M, CryptoError> {
    let bytes = encode_message(msg)?;
    debug!(message = label, bytes = bytes.len(), "message relayé");
    decode_message(&bytes)
}

/// Exécute les rounds 1 à 7 et retourne E([a == b]) sans le déchiffrer.
pub fn run_equality_protocol(
    keys: &KeyPair,
    a_enc: &Ciphertext,
    b_enc: &Ciphertext,
    params: ProtocolParams,
) -> Result<Ciphertext, CryptoError> {
    let mut party_a = PartyA::new(keys.public(), params, a_enc.clone(), b_enc.clone())?;
    let party_b = PartyB::new(keys, params.l);

    let x = relay("x_enc", &party_a.round1_mask_difference()?)?;
    let x_bits = relay("x_bits_enc", &party_b.round2_decompose_bits(&x)?)?;
    let rx_enc = party_a.round3_unmask_bits(&x_bits)?;
    party_a.round4_flip_coin()?;
    let c_list = relay("c_list", &party_a.round5_build_candidates(&rx_enc)?)?;
    let delta_b = relay("deltaB_enc", &party_b.round6_scan_for_zero(&c_list)?)?;

    party_a.round7_reconcile(&delta_b)
}

/// Test d'égalité complet : vrai si et seulement si a == b.
///
/// a et b doivent être dans [0, 2^l) ; au-delà le résultat n'est pas défini.
pub fn equality_test(
    keys: &KeyPair,
    a_enc: &Ciphertext,
    b_enc: &Ciphertext,
    params: ProtocolParams,
) -> Result<bool, CryptoError> {
    let result_enc = run_equality_protocol(keys, a_enc, b_enc, params)?;
    let bit = keys.decrypt(&result_enc)?;

    if bit.is_one() {
        Ok(true)
    } else if bit.is_zero() {
        Ok(false)
    } else {
        Err(CryptoError::ProtocolError("le résultat déchiffré n'est pas un bit".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paillier::p_keygen::p_keygen;
    use num_bigint::BigUint;
    use rand::Rng;

    fn run(kp: &KeyPair, a: u64, b: u64) -> bool {
        let pk = kp.public();
        equality_test(kp, &pk.encrypt_u64(a).unwrap(), &pk.encrypt_u64(b).unwrap(), ProtocolParams::default())
            .unwrap()
    }

    #[test]
    fn test_equal_values() {
        let kp = p_keygen(256).unwrap();
        assert!(run(&kp, 5, 5));
    }

    #[test]
    fn test_different_values() {
        let kp = p_keygen(256).unwrap();
        assert!(!run(&kp, 5, 9));
    }

    #[test]
    fn test_range_edges() {
        let kp = p_keygen(256).unwrap();
        let top = (1u64 << 10) - 1;
        assert!(run(&kp, 0, 0));
        assert!(run(&kp, top, top));
        assert!(!run(&kp, 0, top));
        assert!(!run(&kp, top, 0));
        assert!(!run(&kp, 512, 0));
        assert!(!run(&kp, 1, 0));
    }

    #[test]
    fn test_monte_carlo_no_false_results() {
        let kp = p_keygen(256).unwrap();
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let a = rng.gen_range(0..1024u64);
            assert!(run(&kp, a, a), "faux négatif pour a = b = {a}");

            let b = loop {
                let b = rng.gen_range(0..1024u64);
                if b != a {
                    break b;
                }
            };
            assert!(!run(&kp, a, b), "faux positif pour a = {a}, b = {b}");
        }
    }

    #[test]
    fn test_encrypted_result_is_fresh_bit() {
        let kp = p_keygen(256).unwrap();
        let pk = kp.public();
        let a = pk.encrypt_u64(77).unwrap();
        let res1 = run_equality_protocol(&kp, &a, &a, ProtocolParams::default()).unwrap();
        let res2 = run_equality_protocol(&kp, &a, &a, ProtocolParams::default()).unwrap();
        assert_ne!(res1, res2);
        assert_eq!(kp.decrypt(&res1).unwrap(), BigUint::one());
        assert_eq!(kp.decrypt(&res2).unwrap(), BigUint::one());
    }

    #[test]
    fn test_rejects_invalid_ciphertexts() {
        let kp = p_keygen(256).unwrap();
        let pk = kp.public();
        let ok = pk.encrypt_u64(1).unwrap();
        let r = equality_test(&kp, &pk.n_squared, &ok, ProtocolParams::default());
        assert!(matches!(r, Err(CryptoError::ProtocolError(_))));
    }

    #[test]
    fn test_rejects_mask_wider_than_modulus() {
        let kp = p_keygen(32).unwrap();
        let pk = kp.public();
        let c = pk.encrypt_u64(1).unwrap();
        let r = equality_test(&kp, &c, &c, ProtocolParams::default());
        assert!(matches!(r, Err(CryptoError::InvalidParameter(_))));
    }

    #[test]
    fn test_small_parameters() {
        let kp = p_keygen(128).unwrap();
        let pk = kp.public();
        let params = ProtocolParams::new(4, 16);
        for a in 0..16u64 {
            for b in [a, (a + 1) % 16, (a + 7) % 16] {
                let res = equality_test(&kp, &pk.encrypt_u64(a).unwrap(), &pk.encrypt_u64(b).unwrap(), params)
                    .unwrap();
                assert_eq!(res, a == b, "a = {a}, b = {b}");
            }
        }
    }
}
