// ===========================================================================
// Gestion centralisée des erreurs cryptographiques
//
// Aucun module de la bibliothèque ne panique : chaque opération qui pourrait
// produire une valeur fausse (inverse inexistant, division L non exacte,
// message hors domaine, round du protocole mal formé) retourne une Err(...)
// à l'appelant immédiat. Aucune nouvelle tentative automatique, sauf la
// collision p == q dans la génération de clés.
// ===========================================================================

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum CryptoError {
    // --- Erreurs de paramètres d'entrée ---
    /// Paramètre de génération de clé ou de protocole invalide
    InvalidParameter(String),
    /// Le message m est >= n (hors domaine plaintext Paillier)
    MessageOutOfRange,
    /// Le chiffré c est >= n² (hors domaine ciphertext Paillier)
    CiphertextOutOfRange,

    // --- Erreurs mathématiques ---
    /// c^lambda mod n² ne donne pas un L(u) exact : chiffré invalide pour cette clé
    DecryptionError,
    /// L'inverse modulaire n'existe pas (gcd != 1)
    NonInvertible,
    /// Conversion BigInt -> BigUint échouée (résultat négatif — invariant interne)
    NegativeConversion,

    // --- Erreurs du protocole d'égalité ---
    /// Entrée de round mal formée ou incohérente (longueur, ordre des rounds…)
    ProtocolError(String),

    // --- Erreurs de stockage / parsing des clés ---
    /// Parsing hexadécimal invalide dans un champ de clé JSON
    HexParseError,
    /// Champ hex trop long (conversion BigUint coûteuse)
    HexFieldTooLong { actual: usize, maximum: usize },
    /// n_squared != n*n ou g != n+1 au chargement : fichier corrompu ou falsifié
    KeyCoherenceError,
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::InvalidParameter(msg) =>
                write!(f, "Paramètre invalide : {msg}"),
            CryptoError::MessageOutOfRange =>
                write!(f, "Le message doit être dans [0, n)"),
            CryptoError::CiphertextOutOfRange =>
                write!(f, "Le chiffré doit être dans [0, n²)"),
            CryptoError::DecryptionError =>
                write!(f, "Déchiffrement impossible : L(c^lambda mod n²) n'est pas exact"),
            CryptoError::NonInvertible =>
                write!(f, "Impossible de calculer l'inverse modulaire (gcd != 1)"),
            CryptoError::NegativeConversion =>
                write!(f, "Conversion interne BigInt -> BigUint : résultat négatif inattendu"),
            CryptoError::ProtocolError(msg) =>
                write!(f, "Erreur de protocole : {msg}"),
            CryptoError::HexParseError =>
                write!(f, "Parsing hexadécimal invalide dans le fichier de clés"),
            CryptoError::HexFieldTooLong { actual, maximum } =>
                write!(f, "Champ hexadécimal trop long : {actual} caractères (maximum autorisé : {maximum})"),
            CryptoError::KeyCoherenceError =>
                write!(f, "Fichier de clés incohérent : n_squared != n*n ou g != n+1"),
        }
    }
}

impl std::error::Error for CryptoError {}
