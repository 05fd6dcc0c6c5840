use num_bigint::BigUint;
use crate::paillier::math::l_function;
use crate::paillier::p_keygen::{PublicKey, SecretKey, KeyPair, Ciphertext};
use crate::crypto_error::CryptoError;

// ---------------------------------------------------------------------------
// Déchiffrement : m = L(c^lambda mod n²) * mu  mod n
//
// L est une division exacte : si (u-1) mod n != 0, c n'est pas un chiffré
// sous cette clé et on retourne DecryptionError plutôt qu'un m tronqué.
// ---------------------------------------------------------------------------
pub fn p_decrypt(c: &Ciphertext, pk: &PublicKey, sk: &SecretKey) -> Result<BigUint, CryptoError> {
    pk.check_ciphertext(c)?;

    let u = c.modpow(&sk.lambda, &pk.n_squared);
    let l_u = l_function(&u, &pk.n)?;

    Ok((l_u * &sk.mu) % &pk.n)
}

impl KeyPair {
    pub fn decrypt(&self, c: &Ciphertext) -> Result<BigUint, CryptoError> {
        p_decrypt(c, &self.public_key, &self.secret_key)
    }
}
