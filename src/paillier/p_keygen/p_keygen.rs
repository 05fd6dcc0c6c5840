use std::fmt;
use std::time::Instant;
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use tracing::{info, warn};
use zeroize::Zeroize;
use crate::paillier::math::{mod_inverse, generate_prime, MIN_KEY_BITS};
use crate::crypto_error::CryptoError;

/// Taille de module en dessous de laquelle les clés ne servent qu'aux tests
pub const RECOMMENDED_KEY_BITS: u64 = 2048;

/// Un chiffré Paillier : élément de Z*_{n²}. Jamais modifié en place,
/// chaque opération homomorphe produit une nouvelle valeur.
pub type Ciphertext = BigUint;

// ============================================================================
// Clé publique Paillier — poignée publique : chiffrement + opérations
// homomorphes. Suffit à la partie A du protocole d'égalité.
// ============================================================================
#[derive(Clone, Debug, PartialEq)]
pub struct PublicKey {
    pub n:         BigUint,
    pub g:         BigUint,
    pub n_squared: BigUint,
}

impl PublicKey {
    /// Construit la clé publique (n, g = n+1, n²) à partir du seul module n
    pub fn from_modulus(n: BigUint) -> Self {
        let g = &n + BigUint::one();
        let n_squared = &n * &n;
        PublicKey { n, g, n_squared }
    }

    /// Vérifie 0 <= c < n²
    pub fn check_ciphertext(&self, c: &Ciphertext) -> Result<(), CryptoError> {
        if c >= &self.n_squared {
            return Err(CryptoError::CiphertextOutOfRange);
        }
        Ok(())
    }

    /// Vrai si c est dans [0, n²) et inversible mod n² (gcd(c, n) = 1)
    pub fn is_valid_ciphertext(&self, c: &Ciphertext) -> bool {
        c < &self.n_squared && c.gcd(&self.n).is_one()
    }
}

// ============================================================================
// Clé secrète Paillier — ZEROISÉE À LA DESTRUCTION
// ============================================================================
#[derive(Clone)]
pub struct SecretKey {
    pub lambda: BigUint,
    pub mu:     BigUint,
}

// lambda et mu ne doivent jamais finir dans un log
impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("lambda", &"<masqué>")
            .field("mu", &"<masqué>")
            .finish()
    }
}

// Efface un BigUint au mieux. num-bigint n'expose pas son buffer interne :
// assign_from_slice vide le Vec de limbes (capacité conservée) puis le
// réécrit avec autant de limbes nuls qu'il en contenait, avant la
// normalisation. Aucune garantie contre une copie antérieure du buffer
// (réallocation, clone).
pub(crate) fn zeroize_biguint(value: &mut BigUint) {
    let limbs = value.iter_u32_digits().len();
    if limbs > 0 {
        value.assign_from_slice(&vec![0u32; limbs]);
    }
    value.set_zero();
}

impl Zeroize for SecretKey {
    fn zeroize(&mut self) {
        zeroize_biguint(&mut self.lambda);
        zeroize_biguint(&mut self.mu);
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

// ============================================================================
// Paire de clés — poignée privée : ajoute le déchiffrement.
// Créée une fois par session, immuable ensuite (pas de rotation).
// ============================================================================
#[derive(Clone, Debug)]
pub struct KeyPair {
    pub public_key: PublicKey,
    pub secret_key: SecretKey,
}

impl KeyPair {
    /// Alias de p_keygen : nouveau cryptosystème de `bits` bits
    pub fn generate(bits: u64) -> Result<Self, CryptoError> {
        p_keygen(bits)
    }

    pub fn public(&self) -> &PublicKey {
        &self.public_key
    }
}

// ============================================================================
// Génération de clés Paillier (variante simplifiée g = n+1)
//
//   p, q premiers distincts de bits/2 bits (nouveau tirage tant que p == q)
//   n = p·q, n² , g = n+1
//   lambda = (p-1)(q-1)
//   mu     = lambda^-1 mod n
//
// Avec g = n+1 : (n+1)^lambda mod n² = 1 + lambda·n, donc
// L(g^lambda mod n²) = lambda mod n et mu est directement l'inverse de lambda.
// gcd(lambda, n) = 1 car p et q ont la même taille : p ne peut pas diviser q-1.
// ============================================================================
pub fn p_keygen(bits: u64) -> Result<KeyPair, CryptoError> {
    if bits < MIN_KEY_BITS {
        return Err(CryptoError::InvalidParameter(format!(
            "taille de clé {bits} bits insuffisante, minimum requis : {MIN_KEY_BITS} bits"
        )));
    }
    if bits % 2 != 0 {
        return Err(CryptoError::InvalidParameter(format!(
            "taille de clé {bits} bits impaire, une taille paire est requise"
        )));
    }
    if bits < RECOMMENDED_KEY_BITS {
        warn!(bits, "module inférieur à {RECOMMENDED_KEY_BITS} bits : réservé aux tests");
    }

    let start = Instant::now();
    let half = bits / 2;

    let p = generate_prime(half)?;
    let mut q = generate_prime(half)?;
    while p == q {
        q = generate_prime(half)?;
    }

    let n      = &p * &q;
    let lambda = (&p - BigUint::one()) * (&q - BigUint::one());
    let mu     = mod_inverse(&lambda, &n)?;

    let public_key = PublicKey::from_modulus(n);

    info!(
        bits,
        modulus_bits = public_key.n.bits(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "clés Paillier générées"
    );

    Ok(KeyPair {
        public_key,
        secret_key: SecretKey { lambda, mu },
    })
}
