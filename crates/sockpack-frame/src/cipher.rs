use std::fmt;

use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};

use crate::error::{FrameError, Result};

/// Key size for ChaCha20-Poly1305 (256 bits).
pub const KEY_SIZE: usize = 32;

/// Nonce size (96 bits), prepended to every sealed payload.
pub const NONCE_SIZE: usize = 12;

/// Poly1305 authentication tag size.
pub const TAG_SIZE: usize = 16;

/// Authenticated symmetric encryption applied to whole frame payloads.
///
/// Constructed once at startup and shared by reference across connections;
/// the cipher holds no mutable state and is safe to use from many workers.
/// Sealed payload layout: `nonce(12) || ciphertext || tag(16)`, with a fresh
/// random nonce per message.
pub struct MessageCipher {
    inner: ChaCha20Poly1305,
}

impl MessageCipher {
    /// Build a cipher from a 256-bit key.
    pub fn new(key: &[u8; KEY_SIZE]) -> Self {
        Self {
            inner: ChaCha20Poly1305::new(Key::from_slice(key)),
        }
    }

    /// Generate a fresh random key and the cipher for it.
    ///
    /// Key distribution is up to the caller.
    pub fn generate() -> ([u8; KEY_SIZE], Self) {
        let key = ChaCha20Poly1305::generate_key(&mut OsRng);
        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(&key);
        (bytes, Self::new(&bytes))
    }

    /// Seal a payload.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = self
            .inner
            .encrypt(&nonce, plaintext)
            .map_err(|_| FrameError::EncryptionFailed)?;

        let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    /// Open a sealed payload. Fails on wrong key, tampering, or short input.
    pub fn decrypt(&self, sealed: &[u8]) -> Result<Vec<u8>> {
        if sealed.len() < NONCE_SIZE + TAG_SIZE {
            return Err(FrameError::DecryptionFailed);
        }
        let (nonce, ciphertext) = sealed.split_at(NONCE_SIZE);
        self.inner
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| FrameError::DecryptionFailed)
    }
}

impl fmt::Debug for MessageCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never expose key material.
        f.debug_struct("MessageCipher").finish_non_exhaustive()
    }
}
