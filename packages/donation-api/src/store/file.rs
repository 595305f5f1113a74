//! Store file persistence: AES-256-GCM encrypted for production, plaintext for dev.

use std::path::{Path, PathBuf};
use tracing::info;

use super::Db;

/// Whole-store snapshot file. Donation records carry donor PII (phone, PAN,
/// address), so production deployments set an encryption key.
pub struct StoreFile {
    path: PathBuf,
    encryption_key: Option<[u8; 32]>,
}

impl StoreFile {
    pub fn new_plaintext(path: PathBuf) -> Self {
        Self {
            path,
            encryption_key: None,
        }
    }

    pub fn new_encrypted(path: PathBuf, key_b64: &str) -> Result<Self, crate::Error> {
        let key_bytes = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, key_b64)
            .map_err(|e| crate::Error::Config(format!("Invalid store key base64: {e}")))?;

        if key_bytes.len() != 32 {
            return Err(crate::Error::Config(format!(
                "Store key must be 32 bytes, got {}",
                key_bytes.len()
            )));
        }

        let mut key = [0u8; 32];
        key.copy_from_slice(&key_bytes);

        Ok(Self {
            path,
            encryption_key: Some(key),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_encrypted(&self) -> bool {
        self.encryption_key.is_some()
    }

    /// Serialize the snapshot into the on-disk representation.
    pub fn encode(&self, db: &Db) -> Result<Vec<u8>, crate::Error> {
        let json = serde_json::to_string_pretty(db)
            .map_err(|e| crate::Error::Storage(format!("Failed to serialize store: {e}")))?;

        match &self.encryption_key {
            Some(key) => encrypt_aes256gcm(key, json.as_bytes()),
            None => Ok(json.into_bytes()),
        }
    }

    /// Atomic write: tmp + rename.
    pub fn write(&self, data: &[u8]) -> Result<(), crate::Error> {
        let tmp = self.path.with_extension("tmp");
        if let Some(parent) = tmp.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    crate::Error::Storage(format!("Failed to create store directory: {e}"))
                })?;
            }
        }
        std::fs::write(&tmp, data)
            .map_err(|e| crate::Error::Storage(format!("Failed to write store: {e}")))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| crate::Error::Storage(format!("Failed to rename store: {e}")))?;
        Ok(())
    }

    pub fn load(&self) -> Result<Db, crate::Error> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "No store file found, starting empty");
            return Ok(Db::default());
        }

        let data = std::fs::read(&self.path)
            .map_err(|e| crate::Error::Storage(format!("Failed to read store: {e}")))?;

        let json_bytes = match &self.encryption_key {
            Some(key) => decrypt_aes256gcm(key, &data)?,
            None => data,
        };

        let db: Db = serde_json::from_slice(&json_bytes)
            .map_err(|e| crate::Error::Storage(format!("Failed to parse store: {e}")))?;

        info!(
            path = %self.path.display(),
            foundations = db.foundations.len(),
            donations = db.donations.len(),
            csr_donations = db.csr_donations.len(),
            "Store loaded"
        );
        Ok(db)
    }
}

fn encrypt_aes256gcm(key: &[u8; 32], plaintext: &[u8]) -> Result<Vec<u8>, crate::Error> {
    use aes_gcm::aead::{Aead, KeyInit};
    use aes_gcm::{Aes256Gcm, Nonce};

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| crate::Error::Config(format!("AES init failed: {e}")))?;

    let mut nonce_bytes = [0u8; 12];
    use rand::RngCore;
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| crate::Error::Storage(format!("Encryption failed: {e}")))?;

    // Nonce is stored in front of the ciphertext.
    let mut result = Vec::with_capacity(12 + ciphertext.len());
    result.extend_from_slice(&nonce_bytes);
    result.extend_from_slice(&ciphertext);
    Ok(result)
}

fn decrypt_aes256gcm(key: &[u8; 32], data: &[u8]) -> Result<Vec<u8>, crate::Error> {
    use aes_gcm::aead::{Aead, KeyInit};
    use aes_gcm::{Aes256Gcm, Nonce};

    if data.len() < 12 {
        return Err(crate::Error::Storage(
            "Encrypted store too short (missing nonce)".into(),
        ));
    }

    let (nonce_bytes, ciphertext) = data.split_at(12);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| crate::Error::Config(format!("AES init failed: {e}")))?;

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|e| crate::Error::Storage(format!("Decryption failed (wrong key?): {e}")))
}
