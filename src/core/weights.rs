//! Weight tables as opaque blobs. Zero-copy views plus a BLAKE3 fingerprint.
//!
//! Fingerprint construction, per table in declaration order:
//! `len:u64le || raw bytes`, all into one hasher. Order and boundaries both bind.

use zerocopy::{FromBytes, IntoBytes};

use super::error::ModelError;
use super::fixed::Fixed;

pub type Fingerprint = [u8; 32];

/// View a blob (e.g. `include_bytes!` output) as a table. Host byte order.
///
/// Fails on a length that isn't a multiple of 4 or a pointer that isn't 4-aligned.
#[inline]
pub fn table_from_bytes(bytes: &[u8]) -> Result<&[Fixed], ModelError> {
    <[Fixed]>::ref_from_bytes(bytes).map_err(|_| ModelError::MalformedTable)
}

/// Raw bytes of a table, for export or hashing.
#[inline(always)]
pub fn table_as_bytes(table: &[Fixed]) -> &[u8] {
    table.as_bytes()
}

/// Fingerprint an ordered set of tables.
#[inline]
pub fn fingerprint(tables: &[&[Fixed]]) -> Fingerprint {
    let mut hasher = blake3::Hasher::new();
    for table in tables {
        hasher.update(&(table.len() as u64).to_le_bytes());
        hasher.update(table.as_bytes());
    }
    *hasher.finalize().as_bytes()
}

/// Check bound tables against the fingerprint shipped with them. Constant-time compare.
#[inline]
pub fn verify_fingerprint(tables: &[&[Fixed]], expected: &Fingerprint) -> Result<(), ModelError> {
    let computed = fingerprint(tables);
    let mut diff = 0u8;
    for i in 0..32 {
        diff |= computed[i] ^ expected[i];
    }
    if diff == 0 {
        Ok(())
    } else {
        Err(ModelError::FingerprintMismatch)
    }
}
