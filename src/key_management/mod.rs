pub mod key_storage;

pub use key_storage::{
    PublicKeyJson, SecretKeyJson, KeyPairJson,
    biguint_to_hex, hex_to_biguint,
    export_public_key, import_public_key,
    save_keypair_json, load_keypair_json,
    save_public_key_json, load_public_key_json,
};
