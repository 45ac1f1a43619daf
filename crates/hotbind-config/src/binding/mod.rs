//! Per-type bindings between a settings type and its file.
//!
//! [`Singleton`] replaces the held value on reload; [`Shared`] mutates it in
//! place. Each bound type has its own lock and unrelated types never contend.

mod registry;
mod shared;
mod singleton;


pub use shared::{Shared, SharedRef};
pub use singleton::Singleton;
