mod ensure;
mod resolve;

pub use ensure::ensure_parent_dir;
pub use resolve::{canonical_path, user_config_dir, DEFAULT_CONFIG_DIR};
