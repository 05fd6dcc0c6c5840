use serde::{Serialize, Deserialize};
use crate::paillier::p_keygen::PublicKey;
use crate::crypto_error::CryptoError;

/// Longueur en bits des valeurs comparées par défaut
pub const DEFAULT_L: u32 = 10;
/// Marge statistique par défaut du masque r
pub const DEFAULT_K: u32 = 40;

/// Paramètres d'une session de test d'égalité.
///
/// `l` : les valeurs comparées sont dans [0, 2^l).
/// `k` : sécurité statistique ; le masque r est tiré dans [0, 2^(l+k+1)).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolParams {
    pub l: u32,
    pub k: u32,
}

impl Default for ProtocolParams {
    fn default() -> Self {
        ProtocolParams { l: DEFAULT_L, k: DEFAULT_K }
    }
}

impl ProtocolParams {
    pub fn new(l: u32, k: u32) -> Self {
        ProtocolParams { l, k }
    }

    /// Largeur du masque r : l + k + 1 bits
    pub fn mask_bits(&self) -> u64 {
        u64::from(self.l) + u64::from(self.k) + 1
    }

    /// Borne le côté haut : r + (a - b) < 2^(l+k+2) <= 2^(bits(n)-1) <= n,
    /// donc x = a - b + r ne dépasse jamais n. Le côté bas n'est pas borné :
    /// x reboucle sous zéro quand r < b - a, probabilité <= 2^-(k+1).
    pub fn validate(&self, pk: &PublicKey) -> Result<(), CryptoError> {
        if self.l == 0 {
            return Err(CryptoError::InvalidParameter("l doit être >= 1".into()));
        }
        let modulus_bits = pk.n.bits();
        if self.mask_bits() + 2 > modulus_bits {
            return Err(CryptoError::InvalidParameter(format!(
                "masque de {} bits trop large pour un module de {} bits",
                self.mask_bits(),
                modulus_bits
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;
    use num_traits::One;

    fn key_of_bits(bits: u64) -> PublicKey {
        PublicKey::from_modulus((BigUint::one() << (bits - 1)) + 1u32)
    }

    #[test]
    fn test_default_params() {
        let p = ProtocolParams::default();
        assert_eq!((p.l, p.k), (10, 40));
        assert_eq!(p.mask_bits(), 51);
    }

    #[test]
    fn test_validate_mask_width_boundary() {
        let p = ProtocolParams::default();
        assert!(p.validate(&key_of_bits(53)).is_ok());
        assert!(matches!(p.validate(&key_of_bits(52)), Err(CryptoError::InvalidParameter(_))));
    }

    #[test]
    fn test_accepted_width_bounds_upper_side() {
        let p = ProtocolParams::default();
        let pk = key_of_bits(53);
        assert!(p.validate(&pk).is_ok());
        let max_r = (BigUint::one() << p.mask_bits()) - 1u32;
        let max_diff = (BigUint::one() << p.l) - 1u32;
        assert!(max_r + max_diff < pk.n);
    }

    #[test]
    fn test_validate_rejects_zero_length() {
        let p = ProtocolParams::new(0, 40);
        assert!(matches!(p.validate(&key_of_bits(512)), Err(CryptoError::InvalidParameter(_))));
    }
}
