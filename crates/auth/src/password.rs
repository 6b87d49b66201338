//! Passwort-Hashing mit Argon2id
//!
//! Stellt sichere Passwort-Hashfunktionen mit Argon2id bereit.
//! Argon2id ist der empfohlene Algorithmus gemaess OWASP-Richtlinien.
//!
//! Hashing ist bewusst teuer; die async-Aufrufer im Kern lagern es ueber
//! [`hashen_blockierend`] / [`verifizieren_blockierend`] auf den
//! Blocking-Pool von tokio aus.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params, Version,
};

use crate::error::{AuthError, AuthResult};

/// Mindestlaenge fuer neue Passwoerter (Registrierung, Reset)
pub const MIN_PASSWORT_LAENGE: usize = 8;

/// Einweg-Hashfunktion fuer Passwoerter
///
/// Der Vergleich in [`PasswortHasher::verifizieren`] muss in konstanter Zeit
/// erfolgen.
pub trait PasswortHasher: Send + Sync + 'static {
    /// Erzeugt einen gesalzenen Hash (PHC-String)
    fn hashen(&self, passwort: &str) -> AuthResult<String>;

    /// Prueft ein Passwort gegen einen gespeicherten Hash
    fn verifizieren(&self, passwort: &str, hash: &str) -> AuthResult<bool>;
}

/// Argon2id-Hasher mit konfigurierbaren Kosten
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Argon2id-Parameter fuer sicheres Passwort-Hashing
    ///
    /// Werte gemaess OWASP-Empfehlungen (Stand 2024):
    /// - Speicher: 64 MiB
    /// - Iterationen: 3
    /// - Parallelismus: 1
    pub fn neu() -> Self {
        let params = Params::new(
            64 * 1024, // m_cost: 64 MiB
            3,         // t_cost: 3 Iterationen
            1,         // p_cost: 1 Thread
            None,      // output_len: Standard (32 Bytes)
        )
        .unwrap_or_default();
        Self { params }
    }

    /// Hasher mit eigenen Kosten (Speicher in KiB)
    pub fn mit_parametern(m_cost: u32, t_cost: u32, p_cost: u32) -> AuthResult<Self> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| AuthError::konfiguration(format!("Argon2-Parameter ungueltig: {e}")))?;
        Ok(Self { params })
    }

    fn instanz(&self) -> Argon2<'static> {
        Argon2::new(
            argon2::Algorithm::Argon2id,
            Version::V0x13,
            self.params.clone(),
        )
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::neu()
    }
}

impl PasswortHasher for Argon2Hasher {
    fn hashen(&self, passwort: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.instanz()
            .hash_password(passwort.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::PasswortHashing(e.to_string()))
    }

    fn verifizieren(&self, passwort: &str, hash: &str) -> AuthResult<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AuthError::PasswortHashing(format!("Ungueltiges Hash-Format: {e}")))?;

        // Die Parameter stehen im PHC-String; verify_password vergleicht
        // in konstanter Zeit.
        match self.instanz().verify_password(passwort.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::PasswortHashing(e.to_string())),
        }
    }
}

/// Prueft die Mindestanforderungen an ein neues Passwort
pub fn passwort_pruefen(passwort: &str) -> AuthResult<()> {
    if passwort.chars().count() < MIN_PASSWORT_LAENGE {
        return Err(AuthError::PasswortUngueltig(format!(
            "mindestens {MIN_PASSWORT_LAENGE} Zeichen erforderlich"
        )));
    }
    Ok(())
}

/// Hasht auf dem Blocking-Pool
pub(crate) async fn hashen_blockierend<H: PasswortHasher>(
    hasher: &Arc<H>,
    passwort: &str,
) -> AuthResult<String> {
    let hasher = Arc::clone(hasher);
    let passwort = passwort.to_owned();
    tokio::task::spawn_blocking(move || hasher.hashen(&passwort))
        .await
        .map_err(|e| AuthError::intern(format!("Hashing-Task abgebrochen: {e}")))?
}

/// Verifiziert auf dem Blocking-Pool
pub(crate) async fn verifizieren_blockierend<H: PasswortHasher>(
    hasher: &Arc<H>,
    passwort: &str,
    hash: &str,
) -> AuthResult<bool> {
    let hasher = Arc::clone(hasher);
    let passwort = passwort.to_owned();
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || hasher.verifizieren(&passwort, &hash))
        .await
        .map_err(|e| AuthError::intern(format!("Verifikations-Task abgebrochen: {e}")))?
}
