pub mod p_keygen;

pub use p_keygen::{PublicKey, SecretKey, KeyPair, Ciphertext, p_keygen, RECOMMENDED_KEY_BITS};
