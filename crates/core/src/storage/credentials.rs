use serde::{Deserialize, Serialize};
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

use crate::errors::CoreError;

use super::encryption::{self, KdfParams};
use super::format;

/// Where the CryptoRank API key lives between sessions.
///
/// One secret, three operations. Implementations must never log the key.
pub trait CredentialStore: Send + Sync {
    /// The stored key, or `None` when none has been saved.
    fn load(&self) -> Result<Option<String>, CoreError>;

    /// Save (or replace) the key. Surrounding whitespace is trimmed; an empty
    /// key is rejected.
    fn store(&mut self, api_key: &str) -> Result<(), CoreError>;

    /// Forget the key. Clearing an empty store is not an error.
    fn clear(&mut self) -> Result<(), CoreError>;
}

/// Trim a user-entered key and reject blanks.
pub fn normalize_key(api_key: &str) -> Result<String, CoreError> {
    let trimmed = api_key.trim();
    if trimmed.is_empty() {
        return Err(CoreError::ValidationError("API key must not be empty".into()));
    }
    Ok(trimmed.to_string())
}

/// Plaintext inside the vault.
#[derive(Serialize, Deserialize)]
struct VaultPayload {
    provider: String,
    api_key: String,
}

const VAULT_PROVIDER: &str = "cryptorank";

/// Seal an API key into portable vault bytes.
///
/// Flow: key → bincode → AES-256-GCM(Argon2id(password)) → VCDK bytes.
/// Frontends without a filesystem (WASM) keep these bytes themselves.
pub fn seal_api_key(api_key: &str, password: &str, params: &KdfParams) -> Result<Vec<u8>, CoreError> {
    let payload = VaultPayload {
        provider: VAULT_PROVIDER.to_string(),
        api_key: normalize_key(api_key)?,
    };
    let plaintext = bincode::serialize(&payload)
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize credentials: {e}")))?;
    let sealed = encryption::seal(&plaintext, password, params)?;
    Ok(format::encode(params, &sealed))
}

/// Open vault bytes produced by [`seal_api_key`].
pub fn open_api_key(data: &[u8], password: &str) -> Result<String, CoreError> {
    let (params, sealed) = format::decode(data)?;
    let plaintext = encryption::open(&sealed, password, &params)?;
    let payload: VaultPayload = bincode::deserialize(&plaintext)
        .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize credentials: {e}")))?;
    Ok(payload.api_key)
}

/// Keeps the key in memory only; gone when the process exits.
#[derive(Default)]
pub struct MemoryCredentialStore {
    api_key: Option<String>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for MemoryCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCredentialStore")
            .field("has_key", &self.api_key.is_some())
            .finish()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<String>, CoreError> {
        Ok(self.api_key.clone())
    }

    fn store(&mut self, api_key: &str) -> Result<(), CoreError> {
        self.api_key = Some(normalize_key(api_key)?);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), CoreError> {
        self.api_key = None;
        Ok(())
    }
}

/// Password-sealed vault file on disk (native only).
/// A missing file means "no key".
#[cfg(not(target_arch = "wasm32"))]
pub struct EncryptedFileCredentialStore {
    path: PathBuf,
    password: String,
    kdf_params: KdfParams,
}

#[cfg(not(target_arch = "wasm32"))]
impl EncryptedFileCredentialStore {
    pub fn new(path: impl Into<PathBuf>, password: impl Into<String>) -> Self {
        Self::with_kdf_params(path, password, KdfParams::default())
    }

    pub fn with_kdf_params(
        path: impl Into<PathBuf>,
        password: impl Into<String>,
        kdf_params: KdfParams,
    ) -> Self {
        Self {
            path: path.into(),
            password: password.into(),
            kdf_params,
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl std::fmt::Debug for EncryptedFileCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedFileCredentialStore")
            .field("path", &self.path)
            .field("kdf_params", &self.kdf_params)
            .finish_non_exhaustive()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl CredentialStore for EncryptedFileCredentialStore {
    fn load(&self) -> Result<Option<String>, CoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(&self.path)?;
        open_api_key(&bytes, &self.password).map(Some)
    }

    fn store(&mut self, api_key: &str) -> Result<(), CoreError> {
        let bytes = seal_api_key(api_key, &self.password, &self.kdf_params)?;
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), CoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
