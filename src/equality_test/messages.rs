// ===========================================================================
// Messages échangés entre A et B
//
// Seule la forme des messages est fixée ici ; le transport (socket, QUIC…)
// est externe et doit préserver l'ordre et l'intégrité de chaque round.
// Encodage binaire compact via bincode.
// ===========================================================================

use serde::{Serialize, Deserialize};
use serde::de::DeserializeOwned;
use crate::paillier::p_keygen::Ciphertext;
use crate::crypto_error::CryptoError;

/// Round 1, A -> B : E(a - b + r)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaskedDifference {
    pub x_enc: Ciphertext,
}

/// Round 2, B -> A : E(x_i) pour i = 0..l, indice 0 = bit de poids faible
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EncryptedBits {
    pub bits: Vec<Ciphertext>,
}

/// Round 5, A -> B : l candidats, ordre aléatoire
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateList {
    pub candidates: Vec<Ciphertext>,
}

/// Round 6, B -> A : E(delta_B), delta_B = 1 si un candidat vaut 0
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EncryptedIndicator {
    pub delta_b_enc: Ciphertext,
}

pub fn encode_message<M: Serialize>(msg: &M) -> Result<Vec<u8>, CryptoError> {
    bincode::serialize(msg)
        .map_err(|e| CryptoError::ProtocolError(format!("encodage du message : {e}")))
}

pub fn decode_message<M: DeserializeOwned>(bytes: &[u8]) -> Result<M, CryptoError> {
    bincode::deserialize(bytes)
        .map_err(|e| CryptoError::ProtocolError(format!("message mal formé : {e}")))
}
