// ===========================================================================
// Opérateurs homomorphes Paillier
//
// Fonctions pures de (chiffrés, scalaire, n²) : aucune n'utilise la clé
// secrète, toute partie qui ne détient que la clé publique peut les appeler.
// Les résultats en clair sont implicitement réduits mod n.
// ===========================================================================

use num_bigint::BigUint;
use num_traits::One;
use crate::paillier::math::mod_inverse;
use crate::paillier::p_keygen::{PublicKey, Ciphertext};
use crate::crypto_error::CryptoError;

/// E(m1) · E(m2) mod n²  ->  E(m1 + m2 mod n)
pub fn secure_add(c1: &Ciphertext, c2: &Ciphertext, pk: &PublicKey) -> Result<Ciphertext, CryptoError> {
    pk.check_ciphertext(c1)?;
    pk.check_ciphertext(c2)?;
    Ok((c1 * c2) % &pk.n_squared)
}

/// E(m)^s mod n²  ->  E(m · s mod n)
pub fn secure_scalar_mul(c: &Ciphertext, s: &BigUint, pk: &PublicKey) -> Result<Ciphertext, CryptoError> {
    pk.check_ciphertext(c)?;
    Ok(c.modpow(s, &pk.n_squared))
}

/// E(m1) · E(m2)^(n-1) mod n²  ->  E(m1 - m2 mod n)
///
/// n-1 est le représentant de -1 mod n.
pub fn secure_sub(c1: &Ciphertext, c2: &Ciphertext, pk: &PublicKey) -> Result<Ciphertext, CryptoError> {
    let minus_one = &pk.n - BigUint::one();
    let negated = secure_scalar_mul(c2, &minus_one, pk)?;
    secure_add(c1, &negated, pk)
}

/// Inverse de c dans le groupe multiplicatif mod n²  ->  E(-m mod n)
pub fn ciphertext_inverse(c: &Ciphertext, pk: &PublicKey) -> Result<Ciphertext, CryptoError> {
    pk.check_ciphertext(c)?;
    mod_inverse(c, &pk.n_squared)
}

impl PublicKey {
    pub fn secure_add(&self, c1: &Ciphertext, c2: &Ciphertext) -> Result<Ciphertext, CryptoError> {
        secure_add(c1, c2, self)
    }

    pub fn secure_scalar_mul(&self, c: &Ciphertext, s: &BigUint) -> Result<Ciphertext, CryptoError> {
        secure_scalar_mul(c, s, self)
    }

    pub fn secure_sub(&self, c1: &Ciphertext, c2: &Ciphertext) -> Result<Ciphertext, CryptoError> {
        secure_sub(c1, c2, self)
    }

    pub fn inverse(&self, c: &Ciphertext) -> Result<Ciphertext, CryptoError> {
        ciphertext_inverse(c, self)
    }
}
