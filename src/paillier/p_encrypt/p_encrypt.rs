use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::One;
use rand_core::OsRng;
use crate::paillier::p_keygen::{PublicKey, Ciphertext};
use crate::crypto_error::CryptoError;

// ---------------------------------------------------------------------------
// Chiffrement Paillier : c = g^m * r^n  mod n²
//
// r est tiré uniformément dans [1, n-1] à CHAQUE appel (jamais de cache) :
// deux chiffrements du même m diffèrent avec probabilité écrasante.
// ---------------------------------------------------------------------------
pub fn p_encrypt(m: &BigUint, pk: &PublicKey) -> Result<Ciphertext, CryptoError> {
    if m >= &pk.n {
        return Err(CryptoError::MessageOutOfRange);
    }

    let mut rng = OsRng;

    // r dans Z*_n : indispensable pour les petits modules de test
    let r = loop {
        let candidate = rng.gen_biguint_range(&BigUint::one(), &pk.n);
        if candidate.gcd(&pk.n).is_one() {
            break candidate;
        }
    };

    let g_m = pk.g.modpow(m, &pk.n_squared);
    let r_n = r.modpow(&pk.n, &pk.n_squared);

    Ok((g_m * r_n) % &pk.n_squared)
}

impl PublicKey {
    pub fn encrypt(&self, m: &BigUint) -> Result<Ciphertext, CryptoError> {
        p_encrypt(m, self)
    }

    /// Chiffre une petite constante (0, 1, bits…)
    pub fn encrypt_u64(&self, m: u64) -> Result<Ciphertext, CryptoError> {
        p_encrypt(&BigUint::from(m), self)
    }
}
