//! In-place binding: one long-lived instance, updated field by field.

use std::any::type_name;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::{Arc, Weak};

use hotbind_common::ConfigError;
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tracing::{info, warn};

use super::registry;
use crate::descriptor::Descriptor;
use crate::persistence::{Loaded, PersistenceEngine};
use crate::settings::Settings;
use crate::watcher::ChangeWatcher;

/// The one instance of `T` handed out by [`Shared::current`].
///
/// Reloads and saves take the write lock to copy new values in. Do not hold
/// a guard across [`Shared::save`], [`Shared::save_current`],
/// [`Shared::reload`] or [`Shared::bind`] on the same thread; the
/// read-only calls (`current`, `is_new`, `path`) never wait on it.
pub type SharedRef<T> = Arc<RwLock<T>>;

/// Binding for types that are held by reference elsewhere.
///
/// The instance returned by [`Shared::current`] is never replaced. Reloads
/// and saves copy their values into it through [`Settings::write_back`], so
/// every holder sees the new values without asking again.
pub struct Shared<T>(PhantomData<fn() -> T>);

struct SharedSlot<T> {
    /// Serializes load, save and reload for this type.
    op: Mutex<()>,
    /// Held only briefly, never while waiting on the instance lock.
    state: Mutex<SharedState<T>>,
    revision: watch::Sender<u64>,
}

struct SharedState<T> {
    binding: Option<Arc<Binding>>,
    instance: Option<SharedRef<T>>,
    is_new: bool,
}

struct Binding {
    descriptor: Descriptor,
    engine: PersistenceEngine,
    watcher: Arc<ChangeWatcher>,
}

fn unbound<T>() -> ConfigError {
    ConfigError::Unbound {
        type_name: type_name::<T>(),
    }
}

impl<T: Settings> SharedSlot<T> {
    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    fn binding(&self) -> Result<Arc<Binding>, ConfigError> {
        self.state.lock().binding.clone().ok_or_else(unbound::<T>)
    }

    fn held(&self) -> Option<SharedRef<T>> {
        self.state.lock().instance.clone()
    }

    /// Copy `fresh` into the held instance, creating it on first use.
    /// Caller holds `op`.
    fn install(&self, fresh: T, is_new: bool) -> SharedRef<T> {
        let held = match self.held() {
            Some(held) => {
                held.write().write_back(fresh);
                held
            }
            None => {
                let held = Arc::new(RwLock::new(fresh));
                self.state.lock().instance = Some(held.clone());
                held
            }
        };
        self.state.lock().is_new = is_new;
        self.bump();
        held
    }

    /// Load the bound file and copy it into the held instance. Caller
    /// holds `op`.
    fn reload_op(&self) -> Result<SharedRef<T>, ConfigError> {
        let binding = self.binding()?;
        let Loaded { mut model, is_new } = binding.engine.load::<T>(&binding.descriptor)?;
        model.after_load();
        Ok(self.install(model, is_new))
    }

    /// Write the held instance, or a default, to a file that does not
    /// exist. Caller holds `op`.
    fn materialize(&self, binding: &Binding) -> Result<(), ConfigError> {
        match self.held() {
            Some(held) => {
                let current = held.read();
                binding.engine.save(&*current, &binding.descriptor, None)?;
            }
            None => {
                let mut model = T::default();
                model.after_load();
                binding.engine.save(&model, &binding.descriptor, None)?;
                self.state.lock().instance = Some(Arc::new(RwLock::new(model)));
            }
        }
        self.state.lock().is_new = true;
        info!(type_name = type_name::<T>(), "materialized default config file");
        Ok(())
    }

    fn on_file_changed(&self) {
        let _op = self.op.lock();
        match self.reload_op() {
            Ok(_) => info!(type_name = type_name::<T>(), "config written back in place"),
            Err(e) => warn!(
                type_name = type_name::<T>(),
                "config reload failed, keeping current values: {e}"
            ),
        }
    }
}

impl<T: Settings> Shared<T> {
    fn slot() -> Arc<SharedSlot<T>> {
        registry::slot(|| SharedSlot::<T> {
            op: Mutex::new(()),
            state: Mutex::new(SharedState {
                binding: None,
                instance: None,
                is_new: false,
            }),
            revision: watch::channel(0).0,
        })
    }

    /// Bind `T` to the file described by `descriptor` and start watching it.
    ///
    /// A missing file is created from `T::default()`, or from the held
    /// instance when `T` was bound before. Binding again replaces the
    /// previous file; the held instance survives and takes the new file's
    /// values.
    pub fn bind(descriptor: Descriptor) -> Result<(), ConfigError> {
        let slot = Self::slot();
        let engine = PersistenceEngine::for_descriptor(&descriptor)?;
        let path = descriptor.resolve()?.to_path_buf();

        let weak: Weak<SharedSlot<T>> = Arc::downgrade(&slot);
        let watcher = Arc::new(ChangeWatcher::for_descriptor(&descriptor, move || {
            if let Some(slot) = weak.upgrade() {
                slot.on_file_changed();
            }
        })?);
        let binding = Arc::new(Binding {
            descriptor,
            engine,
            watcher: watcher.clone(),
        });

        let previous = {
            let _op = slot.op.lock();
            let previous = slot.state.lock().binding.replace(binding.clone());

            let outcome = if !path.exists() {
                slot.materialize(&binding)
            } else if slot.held().is_some() {
                slot.reload_op().map(|_| ())
            } else {
                Ok(())
            };
            if let Err(e) = outcome {
                slot.state.lock().binding = previous;
                return Err(e);
            }
            previous
        };

        // The replaced watcher may be waiting on the op lock.
        if let Some(old) = previous {
            old.watcher.stop();
        }
        if let Err(e) = watcher.start() {
            warn!(type_name = type_name::<T>(), "config watcher failed to start: {e}");
        }
        info!(type_name = type_name::<T>(), path = %path.display(), "config bound");
        Ok(())
    }

    /// The shared instance. Every call returns the same `Arc`.
    pub fn current() -> Result<SharedRef<T>, ConfigError> {
        let slot = Self::slot();
        if let Some(held) = slot.held() {
            return Ok(held);
        }
        let _op = slot.op.lock();
        match slot.held() {
            Some(held) => Ok(held),
            None => slot.reload_op(),
        }
    }

    /// Persist `model`, or `T::default()` when `None`, then copy it into the
    /// held instance.
    ///
    /// Fails with [`ConfigError::Unbound`] if [`Shared::bind`] was never
    /// called for `T`.
    pub fn save(model: Option<T>) -> Result<(), ConfigError> {
        let slot = Self::slot();
        let _op = slot.op.lock();
        let binding = slot.binding()?;
        let model = model.unwrap_or_default();

        binding.watcher.mark_file_changed();
        let result = binding.engine.save(&model, &binding.descriptor, None);
        binding.watcher.mark_write_complete();
        result?;

        slot.install(model, false);
        Ok(())
    }

    /// Persist the held instance as it is now.
    pub fn save_current() -> Result<(), ConfigError> {
        let slot = Self::slot();
        let _op = slot.op.lock();
        let binding = slot.binding()?;
        let held = match slot.held() {
            Some(held) => held,
            None => slot.reload_op()?,
        };

        binding.watcher.mark_file_changed();
        let result = {
            let current = held.read();
            binding.engine.save(&*current, &binding.descriptor, None)
        };
        binding.watcher.mark_write_complete();
        result?;

        slot.state.lock().is_new = false;
        Ok(())
    }

    /// Re-read the bound file now and copy it into the held instance.
    pub fn reload() -> Result<SharedRef<T>, ConfigError> {
        let slot = Self::slot();
        let _op = slot.op.lock();
        slot.reload_op()
    }

    /// Whether the last load found no usable file.
    pub fn is_new() -> bool {
        Self::slot().state.lock().is_new
    }

    /// Resolved path of the bound file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let binding = Self::slot().binding()?;
        Ok(binding.descriptor.resolve()?.to_path_buf())
    }

    /// Receiver whose value increments after every reload or save.
    pub fn subscribe() -> watch::Receiver<u64> {
        Self::slot().revision.subscribe()
    }

    /// Stop watching the bound file. The held instance stays available.
    pub fn stop() {
        if let Ok(binding) = Self::slot().binding() {
            binding.watcher.stop();
        }
    }

    pub fn is_watching() -> bool {
        Self::slot()
            .binding()
            .is_ok_and(|binding| binding.watcher.is_watching())
    }
}
