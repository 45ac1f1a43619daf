//! Load and save orchestration.
//!
//! Loading reads the file with shared access, retrying while another
//! process holds it locked, then decrypts and decodes it. Saving encodes,
//! optionally adds the comment header, encrypts, and replaces the target
//! through a colocated temporary file and an atomic rename.

mod atomic;
mod engine;
mod retry;


pub use engine::{Loaded, PersistenceEngine};
pub use retry::RetryPolicy;
