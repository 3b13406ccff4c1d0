//! Secure random token strings.
//!
//! Token values are drawn straight from the OS CSPRNG and mapped onto a
//! 62-symbol alphanumeric alphabet, so they can be copied into a shell
//! command without quoting.

use crate::error::{Error, Result};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;

/// Symbols a token value may contain.
pub const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generate a random alphanumeric string of exactly `length` symbols.
///
/// Each byte is reduced modulo 62, so the first eight symbols are slightly
/// more likely than the rest.
pub fn generate_token(length: usize) -> Result<String> {
    if length == 0 {
        return Ok(String::new());
    }

    let mut bytes = vec![0u8; length];
    OsRng.try_fill_bytes(&mut bytes).map_err(Error::Generation)?;

    let token = bytes
        .iter()
        .map(|b| ALPHABET[(*b as usize) % ALPHABET.len()] as char)
        .collect();

    bytes.zeroize();
    Ok(token)
}

/// Whether every character of `value` belongs to [`ALPHABET`].
pub fn is_token_symbols(value: &str) -> bool {
    value.bytes().all(|b| ALPHABET.contains(&b))
}
