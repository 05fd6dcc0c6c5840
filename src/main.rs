// =========================================================
// Démonstration — Paillier + test d'égalité sécurisé (EQT)
//
//   1. Chargement ou génération des clés
//   2. Auto-test : chiffrement, addition, multiplication scalaire,
//      soustraction homomorphes
//   3. `--trials` tests d'égalité sur des valeurs aléatoires de l bits,
//      plus un cas forcé a == b
// =========================================================

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use num_bigint::{BigUint, RandBigInt};
use rand_core::OsRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use paillier_eqt::key_management::{load_keypair_json, save_keypair_json, save_public_key_json};
use paillier_eqt::{equality_test, CryptoError, KeyPair, ProtocolParams, RECOMMENDED_KEY_BITS};

#[derive(Parser, Debug)]
#[command(about = "Auto-test Paillier et test d'égalité sécurisé à deux parties")]
struct Opt {
    /// Taille du module n en bits (paire)
    #[arg(long, default_value_t = RECOMMENDED_KEY_BITS)]
    bits: u64,
    /// Longueur en bits des valeurs comparées
    #[arg(long, default_value_t = paillier_eqt::equality_test::DEFAULT_L)]
    l: u32,
    /// Marge statistique du masque
    #[arg(long, default_value_t = paillier_eqt::equality_test::DEFAULT_K)]
    k: u32,
    /// Nombre de tests d'égalité aléatoires
    #[arg(long, default_value_t = 1)]
    trials: u32,
    /// Fichier JSON de la paire de clés (chargé s'il existe, créé sinon)
    #[arg(long)]
    keys: Option<PathBuf>,
}

// ─────────────────────────────────────────────────────────
// Erreur applicative : CryptoError et io::Error propagées via ?
// ─────────────────────────────────────────────────────────

#[derive(Debug)]
enum AppError {
    Crypto(CryptoError),
    Io(std::io::Error),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Crypto(e) => write!(f, "Erreur cryptographique : {}", e),
            AppError::Io(e)     => write!(f, "Erreur I/O : {}", e),
        }
    }
}

impl From<CryptoError> for AppError {
    fn from(e: CryptoError) -> Self { AppError::Crypto(e) }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self { AppError::Io(e) }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let opt = Opt::parse();
    if let Err(e) = run(&opt) {
        eprintln!("\n[ERREUR] {}\n", e);
        std::process::exit(1);
    }
}

fn run(opt: &Opt) -> Result<(), AppError> {
    let params = ProtocolParams::new(opt.l, opt.k);

    let (kp, duree_keygen) = charger_ou_generer_cles(opt)?;
    params.validate(kp.public())?;
    info!(modulus_bits = kp.public_key.n.bits(), l = params.l, k = params.k, "session prête");

    let echecs_auto_test = auto_test(&kp)?;
    let (egalites, duree_eqt) = demonstration_egalite(&kp, params, opt.trials)?;

    println!("\n==============================================");
    println!("    RÉSUMÉ");
    println!("==============================================");
    match duree_keygen {
        Some(d) => println!("  Génération des clés    : {:.3?}", d),
        None    => println!("  Génération des clés    : —  (chargées depuis le disque)"),
    }
    println!("  Auto-test              : {} échec(s)", echecs_auto_test);
    println!("  Tests d'égalité        : {} exécution(s), {} égalité(s)", opt.trials + 1, egalites);
    println!("  Durée moyenne EQT      : {:.3?}", duree_eqt / (opt.trials + 1));
    println!("==============================================");

    Ok(())
}

// ─────────────────────────────────────────────────────────
// Clés : chargement ou génération + sauvegarde
// ─────────────────────────────────────────────────────────

fn charger_ou_generer_cles(opt: &Opt) -> Result<(KeyPair, Option<Duration>), AppError> {
    if let Some(path) = opt.keys.as_ref().filter(|p| p.exists()) {
        println!("\n  Clés existantes détectées — chargement de {}", path.display());
        return Ok((load_keypair_json(path)?, None));
    }

    println!("\n  Génération des clés ({} bits)...", opt.bits);
    let t  = Instant::now();
    let kp = KeyPair::generate(opt.bits)?;
    let d  = t.elapsed();

    if let Some(path) = &opt.keys {
        save_keypair_json(&kp, path)?;
        save_public_key_json(&kp.public_key, path.with_extension("pub.json"))?;
        println!("  Clés sauvegardées dans {}", path.display());
    }
    Ok((kp, Some(d)))
}

// ─────────────────────────────────────────────────────────
// Auto-test des opérations homomorphes
// ─────────────────────────────────────────────────────────

fn verifier(libelle: &str, ok: bool) -> u32 {
    if ok {
        println!("  [OK]     {}", libelle);
        0
    } else {
        println!("  [ÉCHEC]  {}", libelle);
        1
    }
}

fn auto_test(kp: &KeyPair) -> Result<u32, AppError> {
    println!("\n==============================================");
    println!("    Auto-test Paillier");
    println!("==============================================");

    let pk  = kp.public();
    let n   = &pk.n;
    let mut rng = OsRng;
    let mut echecs = 0;

    let m1 = rng.gen_biguint_below(n);
    let m2 = rng.gen_biguint_below(n);
    let c1 = pk.encrypt(&m1)?;
    let c2 = pk.encrypt(&m2)?;

    echecs += verifier("Chiffrement / déchiffrement", kp.decrypt(&c1)? == m1);

    let somme = kp.decrypt(&pk.secure_add(&c1, &c2)?)?;
    echecs += verifier("Addition homomorphe", somme == (&m1 + &m2) % n);

    let s = rng.gen_biguint_below(n);
    let produit = kp.decrypt(&pk.secure_scalar_mul(&c1, &s)?)?;
    echecs += verifier("Multiplication scalaire homomorphe", produit == (&m1 * &s) % n);

    let (grand, petit, c_grand, c_petit) = if m1 >= m2 { (&m1, &m2, &c1, &c2) } else { (&m2, &m1, &c2, &c1) };
    let difference = kp.decrypt(&pk.secure_sub(c_grand, c_petit)?)?;
    echecs += verifier("Soustraction homomorphe", difference == grand - petit);

    Ok(echecs)
}

// ─────────────────────────────────────────────────────────
// Tests d'égalité
// ─────────────────────────────────────────────────────────

fn demonstration_egalite(kp: &KeyPair, params: ProtocolParams, trials: u32) -> Result<(u32, Duration), AppError> {
    println!("\n==============================================");
    println!("    Test d'égalité sécurisé (l = {}, k = {})", params.l, params.k);
    println!("==============================================");

    let pk = kp.public();
    let mut rng = OsRng;
    let mut egalites = 0;
    let mut total = Duration::ZERO;

    // Dernier passage : cas forcé a == b
    for essai in 0..=trials {
        let a: BigUint = rng.gen_biguint(u64::from(params.l));
        let b: BigUint = if essai == trials { a.clone() } else { rng.gen_biguint(u64::from(params.l)) };

        let a_enc = pk.encrypt(&a)?;
        let b_enc = pk.encrypt(&b)?;

        let t = Instant::now();
        let egal = equality_test(kp, &a_enc, &b_enc, params)?;
        total += t.elapsed();

        let attendu = a == b;
        let verdict = if egal { "égaux" } else { "différents" };
        let statut  = if egal == attendu { "OK" } else { "INCOHÉRENT" };
        println!("  a = {:>6}  b = {:>6}  ->  {:<10} [{}]", a, b, verdict, statut);

        if egal {
            egalites += 1;
        }
    }

    Ok((egalites, total))
}
