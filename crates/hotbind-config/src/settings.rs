//! Per-type capabilities of a bindable settings struct.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::descriptor::Descriptor;

/// Human-readable description of one serialized field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDoc {
    pub name: &'static str,
    pub description: &'static str,
}

impl FieldDoc {
    pub const fn new(name: &'static str, description: &'static str) -> Self {
        Self { name, description }
    }
}

/// A type that can be bound to a config file.
///
/// Every hook has a default, so an empty `impl Settings for T {}` is enough
/// for plain serde structs.
pub trait Settings: Serialize + DeserializeOwned + Default + Send + Sync + 'static {
    /// Field descriptions rendered into the comment header of saved files.
    fn field_docs() -> &'static [FieldDoc] {
        &[]
    }

    /// Runs after every load, including loads that produced a default.
    fn after_load(&mut self) {}

    /// Copy a freshly loaded value into `self` without replacing `self`.
    ///
    /// Used by [`crate::Shared`] to keep outstanding references valid. The
    /// default assigns every field; override it to keep runtime-only state.
    fn write_back(&mut self, fresh: Self) {
        *self = fresh;
    }
}

/// A settings type that knows its own file, as required by [`crate::Singleton`].
pub trait ConfigFile: Settings {
    fn descriptor() -> Descriptor;
}
