use num_bigint::{BigInt, BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use rand_core::OsRng;
use rand_core::RngCore;
use crate::crypto_error::CryptoError;

// Taille minimale du module n en bits : deux premiers distincts de 4 bits
// (11 et 13) existent, en dessous la boucle p != q ne termine pas.
pub const MIN_KEY_BITS: u64 = 8;

// Nombre de témoins Miller-Rabin par candidat
pub const MILLER_RABIN_ROUNDS: u32 = 20;

// ---------------------------------------------------------------------------
// Crible préliminaire : premiers impairs < 1000
// ---------------------------------------------------------------------------
const SMALL_PRIMES: &[u32] = &[
      3,   5,   7,  11,  13,  17,  19,  23,  29,  31,  37,  41,  43,  47,
     53,  59,  61,  67,  71,  73,  79,  83,  89,  97, 101, 103, 107, 109,
    113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191,
    193, 197, 199, 211, 223, 227, 229, 233, 239, 241, 251, 257, 263, 269,
    271, 277, 281, 283, 293, 307, 311, 313, 317, 331, 337, 347, 349, 353,
    359, 367, 373, 379, 383, 389, 397, 401, 409, 419, 421, 431, 433, 439,
    443, 449, 457, 461, 463, 467, 479, 487, 491, 499, 503, 509, 521, 523,
    541, 547, 557, 563, 569, 571, 577, 587, 593, 599, 601, 607, 613, 617,
    619, 631, 641, 643, 647, 653, 659, 661, 673, 677, 683, 691, 701, 709,
    719, 727, 733, 739, 743, 751, 757, 761, 769, 773, 787, 797, 809, 811,
    821, 823, 827, 829, 839, 853, 857, 859, 863, 877, 881, 883, 887, 907,
    911, 919, 929, 937, 941, 947, 953, 967, 971, 977, 983, 991, 997,
];

// ---------------------------------------------------------------------------
// Fonction L(u) = (u-1)/n, division entière EXACTE.
//
// Pour un chiffré valide, u = c^lambda mod n² vérifie u ≡ 1 (mod n).
// Un reste non nul signifie que c n'est pas un chiffré sous cette clé :
// on refuse au lieu de tronquer.
// ---------------------------------------------------------------------------
pub fn l_function(u: &BigUint, n: &BigUint) -> Result<BigUint, CryptoError> {
    if u.is_zero() {
        return Err(CryptoError::DecryptionError);
    }
    let (quotient, remainder) = (u - BigUint::one()).div_rem(n);
    if !remainder.is_zero() {
        return Err(CryptoError::DecryptionError);
    }
    Ok(quotient)
}

// ---------------------------------------------------------------------------
// Inverse modulaire de a mod m (Euclide étendu itératif).
//
//   - m == 0            -> Err(InvalidParameter)
//   - m == 1            -> 0
//   - gcd(a, m) != 1    -> Err(NonInvertible), jamais de valeur arbitraire
// ---------------------------------------------------------------------------
pub fn mod_inverse(a: &BigUint, m: &BigUint) -> Result<BigUint, CryptoError> {
    if m.is_zero() {
        return Err(CryptoError::InvalidParameter("module nul pour l'inverse".into()));
    }
    if m.is_one() {
        return Ok(BigUint::zero());
    }
    if !a.gcd(m).is_one() {
        return Err(CryptoError::NonInvertible);
    }

    let m0 = BigInt::from(m.clone());
    let mut a = BigInt::from(a % m);
    let mut m = m0.clone();
    let mut x0 = BigInt::zero();
    let mut x1 = BigInt::one();

    while a > BigInt::one() {
        let q = &a / &m;

        // m devient le reste, comme dans l'algorithme d'Euclide
        let t = m.clone();
        m = &a % &m;
        a = t;

        let t = x0.clone();
        x0 = &x1 - &q * &x0;
        x1 = t;
    }

    if x1.is_negative() {
        x1 += &m0;
    }

    x1.to_biguint().ok_or(CryptoError::NegativeConversion)
}

// ---------------------------------------------------------------------------
// Premier aléatoire d'exactement `nbits` bits (bit de poids fort forcé).
// ---------------------------------------------------------------------------
pub fn generate_prime(nbits: u64) -> Result<BigUint, CryptoError> {
    if nbits < MIN_KEY_BITS / 2 {
        return Err(CryptoError::InvalidParameter(format!(
            "premiers de {nbits} bits trop petits, minimum {} bits",
            MIN_KEY_BITS / 2
        )));
    }

    let mut rng = OsRng;

    loop {
        let mut candidate = rng.gen_biguint(nbits);
        candidate.set_bit(nbits - 1, true);
        candidate.set_bit(0, true);

        if has_small_factor(&candidate) {
            continue;
        }
        if is_probable_prime(&candidate, MILLER_RABIN_ROUNDS, &mut rng) {
            debug_assert_eq!(candidate.bits(), nbits);
            return Ok(candidate);
        }
    }
}

// Vrai si n est un multiple strict d'un petit premier de la table
fn has_small_factor(n: &BigUint) -> bool {
    SMALL_PRIMES.iter().any(|&sp| {
        let bp = BigUint::from(sp);
        n != &bp && (n % &bp).is_zero()
    })
}

pub fn is_probable_prime(n: &BigUint, rounds: u32, rng: &mut impl RngCore) -> bool {
    let two = BigUint::from(2u32);
    if n < &two { return false; }
    if n == &two { return true; }
    if n.is_even() { return false; }
    if SMALL_PRIMES.iter().any(|&p| n == &BigUint::from(p)) { return true; }
    if has_small_factor(n) { return false; }

    let n_minus_1 = n - BigUint::one();
    let mut d = n_minus_1.clone();
    let mut r = 0u32;
    while d.is_even() {
        d >>= 1;
        r += 1;
    }

    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(&two, &n_minus_1);
        let mut x = a.modpow(&d, n);
        if x.is_one() || x == n_minus_1 {
            continue 'witness;
        }
        for _ in 1..r {
            x = (&x * &x) % n;
            if x == n_minus_1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}
