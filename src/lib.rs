// Déclaration des modules
pub mod crypto_error;
pub mod paillier;
pub mod key_management;
pub mod equality_test;

pub use crate::paillier::math;
pub use crate::paillier::p_keygen;
pub use crate::paillier::p_encrypt;
pub use crate::paillier::p_decrypt;
pub use crate::paillier::p_homomorphic;

// Fonctions mathématiques principales
pub use crate::paillier::math::{l_function, mod_inverse, generate_prime, MIN_KEY_BITS};

// Types depuis keygen : PublicKey = poignée publique, KeyPair = poignée privée
pub use p_keygen::{PublicKey, SecretKey, KeyPair, Ciphertext, RECOMMENDED_KEY_BITS};

// Opérateurs homomorphes
pub use p_homomorphic::{secure_add, secure_scalar_mul, secure_sub, ciphertext_inverse};

// Protocole d'égalité
pub use crate::equality_test::equality_test::{equality_test, run_equality_protocol};
pub use crate::equality_test::{ProtocolParams, PartyA, PartyB};

// Erreur centralisée
pub use crypto_error::CryptoError;
