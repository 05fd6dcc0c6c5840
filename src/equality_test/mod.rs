// Test d'égalité sécurisé à deux parties sur des chiffrés Paillier.
//
// A détient E(a) et E(b) et seulement la clé publique ; B détient la clé
// privée. Six rounds strictement séquentiels, un seul bit appris : a == b.

pub mod params;
pub mod messages;
pub mod party_a;
pub mod party_b;
pub mod equality_test;

pub use params::{ProtocolParams, DEFAULT_L, DEFAULT_K};
pub use messages::{
    MaskedDifference, EncryptedBits, CandidateList, EncryptedIndicator,
    encode_message, decode_message,
};
pub use party_a::PartyA;
pub use party_b::PartyB;
pub use equality_test::{equality_test, run_equality_protocol};
