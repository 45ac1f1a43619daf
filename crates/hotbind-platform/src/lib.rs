pub mod crypto;
pub mod paths;

pub use crypto::{AesGcmCipher, Cipher};
pub use paths::{canonical_path, ensure_parent_dir, user_config_dir, DEFAULT_CONFIG_DIR};
