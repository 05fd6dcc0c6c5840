pub mod p_homomorphic;

pub use p_homomorphic::{secure_add, secure_scalar_mul, secure_sub, ciphertext_inverse};
