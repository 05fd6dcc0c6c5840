// Réexporte les primitives arithmétiques utilisées par Paillier et le protocole

mod math;

pub use math::{
    l_function, mod_inverse, generate_prime, is_probable_prime,
    MIN_KEY_BITS, MILLER_RABIN_ROUNDS,
};
