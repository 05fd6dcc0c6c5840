// ===========================================================================
// Partie B — détient la paire de clés (poignée privée)
//
//   Round 2 : déchiffre x = a - b + r et renvoie E(x_0), …, E(x_{l-1})
//   Round 6 : déchiffre TOUS les candidats, delta_B = 1 si l'un vaut 0
//
// Aucun état persistant entre les rounds.
// ===========================================================================

use num_bigint::BigUint;
use num_traits::Zero;
use tracing::debug;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::paillier::p_keygen::{KeyPair, Ciphertext};
use crate::equality_test::messages::{MaskedDifference, EncryptedBits, CandidateList, EncryptedIndicator};
use crate::crypto_error::CryptoError;

pub struct PartyB<'a> {
    keys: &'a KeyPair,
    l:    u32,
}

impl<'a> PartyB<'a> {
    pub fn new(keys: &'a KeyPair, l: u32) -> Self {
        PartyB { keys, l }
    }

    // -----------------------------------------------------------------------
    // Round 2 — décomposition binaire chiffrée, indice 0 = poids faible
    // -----------------------------------------------------------------------
    pub fn round2_decompose_bits(&self, msg: &MaskedDifference) -> Result<EncryptedBits, CryptoError> {
        let x = self.keys.decrypt(&msg.x_enc)?;
        let pk = self.keys.public();

        let encrypt_bit = |i: u32| pk.encrypt_u64(u64::from(x.bit(u64::from(i))));

        #[cfg(feature = "parallel")]
        let bits = (0..self.l).into_par_iter().map(encrypt_bit).collect::<Result<Vec<_>, _>>()?;
        #[cfg(not(feature = "parallel"))]
        let bits = (0..self.l).map(encrypt_bit).collect::<Result<Vec<_>, _>>()?;

        debug!(round = 2, bits = bits.len(), "décomposition binaire envoyée");
        Ok(EncryptedBits { bits })
    }

    // -----------------------------------------------------------------------
    // Round 6 — recherche d'un candidat nul
    //
    // Pas de sortie anticipée : tous les candidats sont déchiffrés.
    // -----------------------------------------------------------------------
    pub fn round6_scan_for_zero(&self, msg: &CandidateList) -> Result<EncryptedIndicator, CryptoError> {
        if msg.candidates.len() != self.l as usize {
            return Err(CryptoError::ProtocolError(format!(
                "c_list : {} candidats reçus, {} attendus",
                msg.candidates.len(),
                self.l
            )));
        }

        let decrypt = |c: &Ciphertext| self.keys.decrypt(c);

        #[cfg(feature = "parallel")]
        let plain = msg.candidates.par_iter().map(decrypt).collect::<Result<Vec<BigUint>, _>>()?;
        #[cfg(not(feature = "parallel"))]
        let plain = msg.candidates.iter().map(decrypt).collect::<Result<Vec<BigUint>, _>>()?;

        let found_zero = plain.iter().fold(false, |acc, m| acc | m.is_zero());
        let delta_b_enc = self.keys.public().encrypt_u64(u64::from(found_zero))?;

        debug!(round = 6, candidates = plain.len(), "indicateur chiffré envoyé");
        Ok(EncryptedIndicator { delta_b_enc })
    }
}
