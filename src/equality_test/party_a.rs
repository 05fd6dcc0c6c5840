// ===========================================================================
// Partie A — détient E(a), E(b) et la SEULE clé publique
//
//   Round 1 : x = E(a) ⊖ E(b) ⊕ E(r),   r <- [0, 2^(l+k+1))
//   Round 3 : rx_i = E(x_i)            si r_i = 0
//             rx_i = E(1) ⊕ E(x_i)^-1  si r_i = 1      (rx_i = x_i XOR r_i)
//   Round 4 : pièce delta
//   Round 5 : l candidats masqués puis permutés
//   Round 7 : E(delta_B) si delta = 0, sinon E(1 - delta_B)
//
// Les secrets de session (r, delta) sont effacés quand A est détruite.
// ===========================================================================

use num_bigint::{BigUint, RandBigInt};
use num_traits::One;
use rand::Rng;
use rand::seq::SliceRandom;
use rand_core::OsRng;
use tracing::debug;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::paillier::p_keygen::{PublicKey, Ciphertext};
use crate::paillier::p_keygen::p_keygen::zeroize_biguint;
use crate::equality_test::params::ProtocolParams;
use crate::equality_test::messages::{MaskedDifference, EncryptedBits, CandidateList, EncryptedIndicator};
use crate::crypto_error::CryptoError;

/// Avancement de A dans la session : chaque round exige l'étape précédente
/// et ne peut être joué qu'une fois.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Fresh,
    Masked,
    Unmasked,
    CoinFlipped,
    CandidatesSent,
    Done,
}

pub struct PartyA<'a> {
    pk:     &'a PublicKey,
    params: ProtocolParams,
    a_enc:  Ciphertext,
    b_enc:  Ciphertext,
    stage:  Stage,
    r:      Option<BigUint>,
    delta:  Option<bool>,
}

impl<'a> PartyA<'a> {
    pub fn new(
        pk: &'a PublicKey,
        params: ProtocolParams,
        a_enc: Ciphertext,
        b_enc: Ciphertext,
    ) -> Result<Self, CryptoError> {
        params.validate(pk)?;
        for (name, c) in [("a_enc", &a_enc), ("b_enc", &b_enc)] {
            if !pk.is_valid_ciphertext(c) {
                return Err(CryptoError::ProtocolError(format!(
                    "{name} n'est pas un chiffré valide sous ce module"
                )));
            }
        }
        Ok(PartyA { pk, params, a_enc, b_enc, stage: Stage::Fresh, r: None, delta: None })
    }

    pub fn params(&self) -> ProtocolParams {
        self.params
    }

    fn expect_stage(&self, round: u8, expected: Stage) -> Result<(), CryptoError> {
        if self.stage != expected {
            return Err(CryptoError::ProtocolError(format!(
                "round {round} hors séquence : étape courante {:?}, {:?} attendue",
                self.stage, expected
            )));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Round 1 — différence masquée E(a - b + r)
    // -----------------------------------------------------------------------
    pub fn round1_mask_difference(&mut self) -> Result<MaskedDifference, CryptoError> {
        self.expect_stage(1, Stage::Fresh)?;
        let mut rng = OsRng;
        let r = rng.gen_biguint(self.params.mask_bits());

        let r_enc = self.pk.encrypt(&r)?;
        let diff = self.pk.secure_sub(&self.a_enc, &self.b_enc)?;
        let x_enc = self.pk.secure_add(&diff, &r_enc)?;

        self.r = Some(r);
        self.stage = Stage::Masked;
        debug!(round = 1, mask_bits = self.params.mask_bits(), "différence masquée envoyée");
        Ok(MaskedDifference { x_enc })
    }

    // -----------------------------------------------------------------------
    // Round 3 — démasquage bit à bit : rx_i chiffre x_i XOR r_i
    // -----------------------------------------------------------------------
    pub fn round3_unmask_bits(&mut self, msg: &EncryptedBits) -> Result<Vec<Ciphertext>, CryptoError> {
        self.expect_stage(3, Stage::Masked)?;
        let r = self.r.as_ref().ok_or_else(|| {
            CryptoError::ProtocolError("round 3 demandé avant le round 1".into())
        })?;
        self.check_vector("x_bits_enc", &msg.bits)?;

        let pk = self.pk;
        let unmask = |(i, x_i): (usize, &Ciphertext)| -> Result<Ciphertext, CryptoError> {
            if r.bit(i as u64) {
                let enc_one = pk.encrypt_u64(1)?;
                let x_i_inv = pk.inverse(x_i)?;
                pk.secure_add(&enc_one, &x_i_inv)
            } else {
                Ok(x_i.clone())
            }
        };

        #[cfg(feature = "parallel")]
        let rx_enc = msg.bits.par_iter().enumerate().map(unmask).collect::<Result<Vec<_>, _>>()?;
        #[cfg(not(feature = "parallel"))]
        let rx_enc = msg.bits.iter().enumerate().map(unmask).collect::<Result<Vec<_>, _>>()?;

        self.stage = Stage::Unmasked;
        debug!(round = 3, bits = rx_enc.len(), "bits démasqués");
        Ok(rx_enc)
    }

    // -----------------------------------------------------------------------
    // Round 4 — pièce équilibrée delta
    // -----------------------------------------------------------------------
    pub fn round4_flip_coin(&mut self) -> Result<(), CryptoError> {
        self.expect_stage(4, Stage::Unmasked)?;
        self.delta = Some(OsRng.gen::<bool>());
        self.stage = Stage::CoinFlipped;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Round 5 — candidats
    //
    // Accumulateur P <- 2P + rx_j (homomorphe : acc · acc · rx_j).
    //
    // delta = 0 : un seul candidat porteur, E(s · Σ 2^(l-1-i) rx_i), nul
    //             ssi tous les rx_i sont nuls (a == b) ; les l-1 autres sont
    //             des chiffrés frais de valeurs dans [1, 2^l].
    // delta = 1 : c_i = E(s_i · (rx_i - 1 + 2 · Σ_{j>i} 2^(l-1-j) rx_j)),
    //             nul ssi i est le bit de poids fort non nul de rx (a != b).
    //
    // Les s, s_i sont tirés dans [1, 2^l] ; la liste est ensuite permutée
    // uniformément, l'indice d'origine ne doit pas fuir.
    // -----------------------------------------------------------------------
    pub fn round5_build_candidates(&mut self, rx_enc: &[Ciphertext]) -> Result<CandidateList, CryptoError> {
        self.expect_stage(5, Stage::CoinFlipped)?;
        let delta = self.delta.ok_or_else(|| {
            CryptoError::ProtocolError("round 5 demandé avant le tirage de delta".into())
        })?;
        self.check_vector("rx_enc", rx_enc)?;

        let pk = self.pk;
        let l = self.params.l as usize;
        let mut rng = OsRng;
        let blind_upper = (BigUint::one() << self.params.l) + 1u32;
        let mut blind = || rng.gen_biguint_range(&BigUint::one(), &blind_upper);

        let mut candidates = Vec::with_capacity(l);

        if !delta {
            let mut acc = BigUint::one();
            for rx_i in rx_enc {
                let t = pk.secure_add(&acc, rx_i)?;
                acc = pk.secure_add(&acc, &t)?;
            }
            candidates.push(pk.secure_scalar_mul(&acc, &blind())?);
            for _ in 1..l {
                candidates.push(pk.encrypt(&blind())?);
            }
        } else {
            let enc_minus_one = pk.encrypt(&(&pk.n - 1u32))?;
            let two = BigUint::from(2u32);
            for i in 0..l {
                let mut prod = BigUint::one();
                for rx_j in &rx_enc[i + 1..] {
                    let t = pk.secure_add(&prod, rx_j)?;
                    prod = pk.secure_add(&prod, &t)?;
                }
                let prod_sq = pk.secure_scalar_mul(&prod, &two)?;
                let c_i = pk.secure_add(&enc_minus_one, &rx_enc[i])?;
                let c_i = pk.secure_add(&c_i, &prod_sq)?;
                candidates.push(pk.secure_scalar_mul(&c_i, &blind())?);
            }
        }

        candidates.shuffle(&mut OsRng);
        self.stage = Stage::CandidatesSent;

        debug!(round = 5, candidates = candidates.len(), "liste de candidats permutée");
        Ok(CandidateList { candidates })
    }

    // -----------------------------------------------------------------------
    // Round 7 — réconciliation : résultat chiffré E([a == b])
    // -----------------------------------------------------------------------
    pub fn round7_reconcile(&mut self, msg: &EncryptedIndicator) -> Result<Ciphertext, CryptoError> {
        self.expect_stage(7, Stage::CandidatesSent)?;
        let delta = self.delta.ok_or_else(|| {
            CryptoError::ProtocolError("round 7 demandé avant le tirage de delta".into())
        })?;
        if !self.pk.is_valid_ciphertext(&msg.delta_b_enc) {
            return Err(CryptoError::ProtocolError("deltaB_enc n'est pas un chiffré valide".into()));
        }

        let result = if delta {
            let enc_one = self.pk.encrypt_u64(1)?;
            let inv = self.pk.inverse(&msg.delta_b_enc)?;
            self.pk.secure_add(&enc_one, &inv)?
        } else {
            msg.delta_b_enc.clone()
        };

        self.stage = Stage::Done;
        debug!(round = 7, "résultat réconcilié");
        Ok(result)
    }

    fn check_vector(&self, name: &str, cts: &[Ciphertext]) -> Result<(), CryptoError> {
        if cts.len() != self.params.l as usize {
            return Err(CryptoError::ProtocolError(format!(
                "{name} : {} entrées reçues, {} attendues",
                cts.len(),
                self.params.l
            )));
        }
        if let Some(i) = cts.iter().position(|c| !self.pk.is_valid_ciphertext(c)) {
            return Err(CryptoError::ProtocolError(format!(
                "{name}[{i}] n'est pas un chiffré valide"
            )));
        }
        Ok(())
    }
}

impl Drop for PartyA<'_> {
    fn drop(&mut self) {
        if let Some(r) = self.r.as_mut() {
            zeroize_biguint(r);
        }
        self.r = None;
        self.delta = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paillier::p_keygen::{p_keygen, KeyPair};
    use num_traits::Zero;

    fn keys() -> KeyPair {
        p_keygen(256).unwrap()
    }

    fn enc_bits(kp: &KeyPair, value: u64, l: u32) -> Vec<Ciphertext> {
        (0..l).map(|i| kp.public_key.encrypt_u64((value >> i) & 1).unwrap()).collect()
    }

    fn decrypt_all(kp: &KeyPair, cts: &[Ciphertext]) -> Vec<BigUint> {
        cts.iter().map(|c| kp.decrypt(c).unwrap()).collect()
    }

    fn party<'a>(kp: &'a KeyPair, a: u64, b: u64) -> PartyA<'a> {
        let pk = &kp.public_key;
        PartyA::new(pk, ProtocolParams::default(), pk.encrypt_u64(a).unwrap(), pk.encrypt_u64(b).unwrap())
            .unwrap()
    }

    // Place A juste avant le round 5 avec une pièce imposée
    fn force_coin(a: &mut PartyA<'_>, delta: bool) {
        a.delta = Some(delta);
        a.stage = Stage::CoinFlipped;
    }

    #[test]
    fn test_round1_hides_difference_behind_mask() {
        let kp = keys();
        let mut a = party(&kp, 700, 12);
        let msg = a.round1_mask_difference().unwrap();
        let r = a.r.clone().unwrap();
        assert!(r.bits() <= 51);
        assert_eq!(kp.decrypt(&msg.x_enc).unwrap(), r + 688u32);
    }

    #[test]
    fn test_round3_xors_with_mask_bits() {
        let kp = keys();
        let mut a = party(&kp, 3, 3);
        a.round1_mask_difference().unwrap();
        let x: u64 = 0b10_1100_1011;
        let rx = a.round3_unmask_bits(&EncryptedBits { bits: enc_bits(&kp, x, 10) }).unwrap();
        let r = a.r.clone().unwrap();
        for (i, bit) in decrypt_all(&kp, &rx).into_iter().enumerate() {
            let expected = ((x >> i) & 1) ^ u64::from(r.bit(i as u64));
            assert_eq!(bit, BigUint::from(expected), "bit {i}");
        }
    }

    #[test]
    fn test_round5_without_coin_flip_has_single_carrier() {
        let kp = keys();
        let mut a = party(&kp, 1, 1);
        force_coin(&mut a, false);

        let zeros = enc_bits(&kp, 0, 10);
        let plain = decrypt_all(&kp, &a.round5_build_candidates(&zeros).unwrap().candidates);
        assert_eq!(plain.len(), 10);
        assert_eq!(plain.iter().filter(|m| m.is_zero()).count(), 1);

        let bound = BigUint::one() << 10u32;
        force_coin(&mut a, false);
        let plain = decrypt_all(&kp, &a.round5_build_candidates(&enc_bits(&kp, 0b100, 10)).unwrap().candidates);
        assert!(plain.iter().all(|m| !m.is_zero()));
        // les leurres sont dans [1, 2^l]
        assert!(plain.iter().filter(|m| **m <= bound).count() >= 9);
    }

    #[test]
    fn test_round5_with_coin_flip_flags_top_set_bit() {
        let kp = keys();
        let mut a = party(&kp, 1, 1);

        for rx in [1u64, 0b10_0000_0000, 0b01_0110_0111] {
            force_coin(&mut a, true);
            let plain = decrypt_all(&kp, &a.round5_build_candidates(&enc_bits(&kp, rx, 10)).unwrap().candidates);
            assert_eq!(plain.iter().filter(|m| m.is_zero()).count(), 1, "rx = {rx:#b}");
        }
        force_coin(&mut a, true);
        let plain = decrypt_all(&kp, &a.round5_build_candidates(&enc_bits(&kp, 0, 10)).unwrap().candidates);
        assert!(plain.iter().all(|m| !m.is_zero()));
    }

    #[test]
    fn test_round5_carrier_position_is_uniform() {
        let kp = keys();
        let mut a = party(&kp, 1, 1);
        let zeros = enc_bits(&kp, 0, 10);
        let mut seen = [0u32; 10];

        for _ in 0..200 {
            force_coin(&mut a, false);
            let plain = decrypt_all(&kp, &a.round5_build_candidates(&zeros).unwrap().candidates);
            let pos = plain.iter().position(|m| m.is_zero()).unwrap();
            seen[pos] += 1;
        }
        // P(un indice jamais atteint) <= 10 · 0.9^200
        assert!(seen.iter().all(|&count| count > 0), "positions du porteur : {seen:?}");
    }

    #[test]
    fn test_round7_applies_coin() {
        let kp = keys();
        let mut a = party(&kp, 1, 1);
        for (delta, delta_b, expected) in [(false, 0u64, 0u64), (false, 1, 1), (true, 0, 1), (true, 1, 0)] {
            a.delta = Some(delta);
            a.stage = Stage::CandidatesSent;
            let msg = EncryptedIndicator { delta_b_enc: kp.public_key.encrypt_u64(delta_b).unwrap() };
            let res = a.round7_reconcile(&msg).unwrap();
            assert_eq!(kp.decrypt(&res).unwrap(), BigUint::from(expected));
        }
    }

    fn is_protocol_error<T>(r: Result<T, CryptoError>) -> bool {
        matches!(r, Err(CryptoError::ProtocolError(_)))
    }

    #[test]
    fn test_rounds_out_of_order_are_rejected() {
        let kp = keys();
        let mut a = party(&kp, 1, 2);
        let bits = EncryptedBits { bits: enc_bits(&kp, 0, 10) };
        let ind = EncryptedIndicator { delta_b_enc: kp.public_key.encrypt_u64(0).unwrap() };

        assert!(is_protocol_error(a.round3_unmask_bits(&bits)));
        assert!(is_protocol_error(a.round4_flip_coin()));
        assert!(is_protocol_error(a.round5_build_candidates(&bits.bits)));
        assert!(is_protocol_error(a.round7_reconcile(&ind)));

        a.round1_mask_difference().unwrap();
        // le masque ne peut pas être remplacé en cours de session
        let r = a.r.clone();
        assert!(is_protocol_error(a.round1_mask_difference()));
        assert_eq!(a.r, r);
        // pièce tirée sans le round 3 : le round 5 reste refusé
        assert!(is_protocol_error(a.round4_flip_coin()));
        assert!(is_protocol_error(a.round5_build_candidates(&bits.bits)));

        let rx = a.round3_unmask_bits(&bits).unwrap();
        assert!(is_protocol_error(a.round3_unmask_bits(&bits)));
        assert!(is_protocol_error(a.round5_build_candidates(&rx)));
        assert!(is_protocol_error(a.round7_reconcile(&ind)));

        a.round4_flip_coin().unwrap();
        assert!(is_protocol_error(a.round4_flip_coin()));
        assert!(is_protocol_error(a.round7_reconcile(&ind)));

        a.round5_build_candidates(&rx).unwrap();
        assert!(is_protocol_error(a.round5_build_candidates(&rx)));

        a.round7_reconcile(&ind).unwrap();
        assert!(is_protocol_error(a.round7_reconcile(&ind)));
        assert!(is_protocol_error(a.round1_mask_difference()));
    }

    #[test]
    fn test_malformed_round_inputs_are_rejected() {
        let kp = keys();
        let mut a = party(&kp, 1, 2);
        a.round1_mask_difference().unwrap();

        let short = EncryptedBits { bits: enc_bits(&kp, 0, 9) };
        assert!(matches!(a.round3_unmask_bits(&short), Err(CryptoError::ProtocolError(_))));
        let rx = a.round3_unmask_bits(&EncryptedBits { bits: enc_bits(&kp, 0, 10) }).unwrap();
        a.round4_flip_coin().unwrap();

        let mut bad = rx.clone();
        bad[4] = kp.public_key.n.clone();
        assert!(matches!(a.round5_build_candidates(&bad), Err(CryptoError::ProtocolError(_))));
        a.round5_build_candidates(&rx).unwrap();

        let ind = EncryptedIndicator { delta_b_enc: kp.public_key.n_squared.clone() };
        assert!(matches!(a.round7_reconcile(&ind), Err(CryptoError::ProtocolError(_))));
    }

    #[test]
    fn test_new_rejects_invalid_inputs() {
        let kp = keys();
        let pk = &kp.public_key;
        let good = pk.encrypt_u64(5).unwrap();
        let r = PartyA::new(pk, ProtocolParams::default(), pk.n_squared.clone(), good.clone());
        assert!(matches!(r, Err(CryptoError::ProtocolError(_))));
        let r = PartyA::new(pk, ProtocolParams::default(), good.clone(), BigUint::zero());
        assert!(matches!(r, Err(CryptoError::ProtocolError(_))));
        let r = PartyA::new(pk, ProtocolParams::new(10, 250), good.clone(), good);
        assert!(matches!(r, Err(CryptoError::InvalidParameter(_))));
    }
}
