use crate::errors::CoreError;
use super::encryption::{KdfParams, Sealed};

/// Magic bytes identifying a credential vault file.
pub const MAGIC: &[u8; 4] = b"VCDK";

/// Current vault format version.
pub const CURRENT_VERSION: u16 = 1;

/// Header size in bytes:
/// magic(4) + version(2) + kdf_params(12) + salt(16) + nonce(12) + ciphertext_len(8) = 54
pub const HEADER_SIZE: usize = 54;

/// Serialize a sealed payload with its KDF parameters.
///
/// Layout:
/// ```text
/// [VCDK: 4B] [version: 2B LE] [memory_cost: 4B LE] [time_cost: 4B LE]
/// [parallelism: 4B LE] [salt: 16B] [nonce: 12B] [ciphertext_len: 8B LE]
/// [ciphertext: variable]
/// ```
pub fn encode(kdf_params: &KdfParams, sealed: &Sealed) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_SIZE + sealed.ciphertext.len());
    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&CURRENT_VERSION.to_le_bytes());
    buf.extend_from_slice(&kdf_params.memory_cost.to_le_bytes());
    buf.extend_from_slice(&kdf_params.time_cost.to_le_bytes());
    buf.extend_from_slice(&kdf_params.parallelism.to_le_bytes());
    buf.extend_from_slice(&sealed.salt);
    buf.extend_from_slice(&sealed.nonce);
    buf.extend_from_slice(&(sealed.ciphertext.len() as u64).to_le_bytes());
    buf.extend_from_slice(&sealed.ciphertext);
    buf
}

/// Parse vault bytes back into KDF parameters and the sealed payload.
pub fn decode(data: &[u8]) -> Result<(KdfParams, Sealed), CoreError> {
    if data.len() < HEADER_SIZE {
        return Err(CoreError::InvalidFileFormat(
            "File too small to be a credential vault".into(),
        ));
    }
    if &data[0..4] != MAGIC {
        return Err(CoreError::InvalidFileFormat(
            "Invalid magic bytes — not a credential vault".into(),
        ));
    }

    let version = u16::from_le_bytes([data[4], data[5]]);
    if version == 0 || version > CURRENT_VERSION {
        return Err(CoreError::UnsupportedVersion(version));
    }

    let memory_cost = read_u32(data, 6)?;
    let time_cost = read_u32(data, 10)?;
    let parallelism = read_u32(data, 14)?;

    // Reject parameters a crafted file could use to exhaust memory or CPU.
    if !(8..=1_048_576).contains(&memory_cost) {
        return Err(CoreError::InvalidFileFormat(format!(
            "KDF memory_cost out of safe range: {memory_cost} KiB (expected 8..1048576)"
        )));
    }
    if !(1..=20).contains(&time_cost) {
        return Err(CoreError::InvalidFileFormat(format!(
            "KDF time_cost out of safe range: {time_cost} (expected 1..20)"
        )));
    }
    if !(1..=16).contains(&parallelism) {
        return Err(CoreError::InvalidFileFormat(format!(
            "KDF parallelism out of safe range: {parallelism} (expected 1..16)"
        )));
    }

    let mut salt = [0u8; 16];
    salt.copy_from_slice(&data[18..34]);
    let mut nonce = [0u8; 12];
    nonce.copy_from_slice(&data[34..46]);

    let len_bytes: [u8; 8] = data[46..54]
        .try_into()
        .map_err(|_| CoreError::InvalidFileFormat("Failed to read ciphertext length".into()))?;
    let ciphertext_len = u64::from_le_bytes(len_bytes);

    let available = (data.len() - HEADER_SIZE) as u64;
    if available < ciphertext_len {
        return Err(CoreError::InvalidFileFormat(format!(
            "File truncated: expected {ciphertext_len} bytes of ciphertext, got {available}"
        )));
    }
    let end = HEADER_SIZE + ciphertext_len as usize;

    Ok((
        KdfParams {
            memory_cost,
            time_cost,
            parallelism,
        },
        Sealed {
            salt,
            nonce,
            ciphertext: data[HEADER_SIZE..end].to_vec(),
        },
    ))
}

fn read_u32(data: &[u8], offset: usize) -> Result<u32, CoreError> {
    let bytes: [u8; 4] = data[offset..offset + 4]
        .try_into()
        .map_err(|_| CoreError::InvalidFileFormat(format!("Failed to read u32 at offset {offset}")))?;
    Ok(u32::from_le_bytes(bytes))
}
