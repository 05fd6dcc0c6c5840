// ============================================================================
// Export / import des clés Paillier en JSON (champs hexadécimaux)
//
// Clé publique (n, g, n²) : partageable avec toute partie qui chiffre ou
// calcule sur des chiffrés. Clé secrète (lambda, mu) : réservée à la partie
// qui déchiffre.
//
// Au chargement, la taille du fichier et la longueur de chaque champ sont
// bornées AVANT toute conversion, puis la cohérence n² = n·n, g = n+1 est
// vérifiée.
// ============================================================================

use std::fs;
use std::io;
use std::path::Path;
use num_bigint::BigUint;
use num_traits::{Num, One};
use serde::{Serialize, Deserialize};
use serde::de::DeserializeOwned;
use crate::paillier::p_keygen::{PublicKey, SecretKey, KeyPair};
use crate::crypto_error::CryptoError;

/// Taille maximale d'un fichier de clés JSON en octets (32 Ko)
const MAX_KEY_FILE_BYTES: u64 = 32_768;

/// Longueur maximale d'un champ hex : n² d'une clé 4096 bits = 2048 caractères, plus marge
const MAX_HEX_FIELD_LEN: usize = 3_072;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PublicKeyJson {
    pub n:         String,
    pub g:         String,
    pub n_squared: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SecretKeyJson {
    pub lambda: String,
    pub mu:     String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct KeyPairJson {
    pub public_key: PublicKeyJson,
    pub secret_key: SecretKeyJson,
}

pub fn biguint_to_hex(value: &BigUint) -> String {
    value.to_str_radix(16).to_uppercase()
}

pub fn hex_to_biguint(hex_str: &str) -> Result<BigUint, CryptoError> {
    if hex_str.len() > MAX_HEX_FIELD_LEN {
        return Err(CryptoError::HexFieldTooLong {
            actual:  hex_str.len(),
            maximum: MAX_HEX_FIELD_LEN,
        });
    }
    BigUint::from_str_radix(hex_str, 16).map_err(|_| CryptoError::HexParseError)
}

impl From<&PublicKey> for PublicKeyJson {
    fn from(pk: &PublicKey) -> Self {
        PublicKeyJson {
            n:         biguint_to_hex(&pk.n),
            g:         biguint_to_hex(&pk.g),
            n_squared: biguint_to_hex(&pk.n_squared),
        }
    }
}

impl From<&SecretKey> for SecretKeyJson {
    fn from(sk: &SecretKey) -> Self {
        SecretKeyJson {
            lambda: biguint_to_hex(&sk.lambda),
            mu:     biguint_to_hex(&sk.mu),
        }
    }
}

impl From<&KeyPair> for KeyPairJson {
    fn from(kp: &KeyPair) -> Self {
        KeyPairJson {
            public_key: (&kp.public_key).into(),
            secret_key: (&kp.secret_key).into(),
        }
    }
}

impl TryFrom<&PublicKeyJson> for PublicKey {
    type Error = CryptoError;

    fn try_from(json: &PublicKeyJson) -> Result<Self, Self::Error> {
        let n         = hex_to_biguint(&json.n)?;
        let g         = hex_to_biguint(&json.g)?;
        let n_squared = hex_to_biguint(&json.n_squared)?;

        if n <= BigUint::one() || n_squared != &n * &n || g != &n + BigUint::one() {
            return Err(CryptoError::KeyCoherenceError);
        }
        Ok(PublicKey { n, g, n_squared })
    }
}

impl TryFrom<&SecretKeyJson> for SecretKey {
    type Error = CryptoError;

    fn try_from(json: &SecretKeyJson) -> Result<Self, Self::Error> {
        Ok(SecretKey {
            lambda: hex_to_biguint(&json.lambda)?,
            mu:     hex_to_biguint(&json.mu)?,
        })
    }
}

impl TryFrom<&KeyPairJson> for KeyPair {
    type Error = CryptoError;

    fn try_from(json: &KeyPairJson) -> Result<Self, Self::Error> {
        let public_key = PublicKey::try_from(&json.public_key)?;
        let secret_key = SecretKey::try_from(&json.secret_key)?;

        // lambda · mu ≡ 1 (mod n) : la clé secrète correspond bien à n
        if (&secret_key.lambda * &secret_key.mu) % &public_key.n != BigUint::one() {
            return Err(CryptoError::KeyCoherenceError);
        }
        Ok(KeyPair { public_key, secret_key })
    }
}

fn invalid_data(e: CryptoError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e.to_string())
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> io::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, serde_json::to_string_pretty(value)?)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> io::Result<T> {
    let size = fs::metadata(path)?.len();
    if size > MAX_KEY_FILE_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Fichier de clés trop grand : {size} octets (maximum : {MAX_KEY_FILE_BYTES})"),
        ));
    }
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Clé publique seule, au format JSON, pour la transmettre à la partie A
pub fn export_public_key(pk: &PublicKey) -> io::Result<String> {
    Ok(serde_json::to_string_pretty(&PublicKeyJson::from(pk))?)
}

pub fn import_public_key(json: &str) -> io::Result<PublicKey> {
    if json.len() as u64 > MAX_KEY_FILE_BYTES {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "clé publique JSON trop grande"));
    }
    let parsed: PublicKeyJson = serde_json::from_str(json)?;
    PublicKey::try_from(&parsed).map_err(invalid_data)
}

pub fn save_keypair_json(kp: &KeyPair, path: impl AsRef<Path>) -> io::Result<()> {
    write_json(&KeyPairJson::from(kp), path.as_ref())
}

pub fn load_keypair_json(path: impl AsRef<Path>) -> io::Result<KeyPair> {
    let json: KeyPairJson = read_json(path.as_ref())?;
    KeyPair::try_from(&json).map_err(invalid_data)
}

pub fn save_public_key_json(pk: &PublicKey, path: impl AsRef<Path>) -> io::Result<()> {
    write_json(&PublicKeyJson::from(pk), path.as_ref())
}

pub fn load_public_key_json(path: impl AsRef<Path>) -> io::Result<PublicKey> {
    let json: PublicKeyJson = read_json(path.as_ref())?;
    PublicKey::try_from(&json).map_err(invalid_data)
}
