use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use hmac::Hmac;
use rand::RngCore;
use sha2::Sha256;

use hotbind_common::PlatformError;

type HmacSha256 = Hmac<Sha256>;

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const DEFAULT_ITERATIONS: u32 = 100_000;

/// Symmetric text encryption keyed by a caller-supplied secret.
///
/// Only invoked for descriptors marked encrypted. Implementations must be
/// deterministic in the sense that `decrypt(encrypt(p, s), s) == p`.
pub trait Cipher: Send + Sync {
    fn encrypt(&self, plaintext: &str, secret: &str) -> Result<String, PlatformError>;
    fn decrypt(&self, ciphertext: &str, secret: &str) -> Result<String, PlatformError>;
}

/// AES-256-GCM with a PBKDF2-HMAC-SHA256 key derived from the secret.
///
/// Output is base64 of `salt || nonce || ciphertext+tag`. Every call to
/// [`Cipher::encrypt`] draws a fresh salt and nonce.
#[derive(Debug, Clone, Copy)]
pub struct AesGcmCipher {
    iterations: u32,
}

impl AesGcmCipher {
    pub fn new() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }

    /// Override the PBKDF2 round count. Both sides must agree on it.
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    fn derive_key(&self, secret: &str, salt: &[u8]) -> Result<Aes256Gcm, PlatformError> {
        let mut key = [0u8; 32];
        pbkdf2::pbkdf2::<HmacSha256>(secret.as_bytes(), salt, self.iterations, &mut key)
            .map_err(|e| pe(&e))?;
        Aes256Gcm::new_from_slice(&key).map_err(|e| pe(&e))
    }
}

impl Default for AesGcmCipher {
    fn default() -> Self {
        Self::new()
    }
}

impl Cipher for AesGcmCipher {
    fn encrypt(&self, plaintext: &str, secret: &str) -> Result<String, PlatformError> {
        let mut rng = rand::thread_rng();
        let mut salt = [0u8; SALT_LEN];
        let mut iv = [0u8; NONCE_LEN];
        rng.fill_bytes(&mut salt);
        rng.fill_bytes(&mut iv);

        let cipher = self.derive_key(secret, &salt)?;
        let ct = cipher
            .encrypt(Nonce::from_slice(&iv), plaintext.as_bytes())
            .map_err(|e| pe(&e))?;

        let mut blob = Vec::with_capacity(SALT_LEN + NONCE_LEN + ct.len());
        blob.extend_from_slice(&salt);
        blob.extend_from_slice(&iv);
        blob.extend_from_slice(&ct);
        Ok(B64.encode(blob))
    }

    fn decrypt(&self, ciphertext: &str, secret: &str) -> Result<String, PlatformError> {
        let blob = B64.decode(ciphertext.trim()).map_err(|e| pe(&e))?;
        if blob.len() < SALT_LEN + NONCE_LEN + TAG_LEN {
            return Err(PlatformError::CryptoError("ciphertext too short".into()));
        }
        let (salt, rest) = blob.split_at(SALT_LEN);
        let (iv, ct) = rest.split_at(NONCE_LEN);

        let cipher = self.derive_key(secret, salt)?;
        let plain = cipher
            .decrypt(Nonce::from_slice(iv), ct)
            .map_err(|e| pe(&e))?;
        String::from_utf8(plain).map_err(|e| pe(&e))
    }
}

/// Shorthand to convert any Display error into PlatformError::CryptoError.
fn pe(e: &dyn std::fmt::Display) -> PlatformError {
    PlatformError::CryptoError(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> AesGcmCipher {
        AesGcmCipher::with_iterations(1_000)
    }

    #[test]
    fn roundtrip_encrypt_decrypt() {
        let cipher = fast();
        let ct = cipher.encrypt("port = 8080", "hunter2").unwrap();
        assert_ne!(ct, "port = 8080");
        assert_eq!(cipher.decrypt(&ct, "hunter2").unwrap(), "port = 8080");
    }

    #[test]
    fn wrong_secret_fails() {
        let cipher = fast();
        let ct = cipher.encrypt("payload", "right").unwrap();
        assert!(cipher.decrypt(&ct, "wrong").is_err());
    }

    #[test]
    fn salt_and_nonce_are_fresh_per_call() {
        let cipher = fast();
        let a = cipher.encrypt("same", "secret").unwrap();
        let b = cipher.encrypt("same", "secret").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn truncated_ciphertext_is_rejected() {
        let cipher = fast();
        let short = B64.encode([0u8; 10]);
        let err = cipher.decrypt(&short, "secret").unwrap_err();
        assert!(err.to_string().contains("too short"));
    }

    #[test]
    fn tampered_ciphertext_is_rejected() {
        let cipher = fast();
        let ct = cipher.encrypt("payload", "secret").unwrap();
        let mut blob = B64.decode(&ct).unwrap();
        let last = blob.len() - 1;
        blob[last] ^= 0xff;
        assert!(cipher.decrypt(&B64.encode(blob), "secret").is_err());
    }

    #[test]
    fn iterations_mismatch_fails() {
        let ct = AesGcmCipher::with_iterations(1_000)
            .encrypt("payload", "secret")
            .unwrap();
        assert!(AesGcmCipher::with_iterations(2_000)
            .decrypt(&ct, "secret")
            .is_err());
    }
}
