//! Reference-replacing binding.

use std::any::type_name;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use arc_swap::ArcSwap;
use hotbind_common::ConfigError;
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{info, warn};

use super::registry;
use crate::persistence::{Loaded, PersistenceEngine};
use crate::settings::ConfigFile;
use crate::watcher::ChangeWatcher;
use crate::Descriptor;

/// Process-wide binding of `T` to the file named by [`ConfigFile::descriptor`].
///
/// The first access loads the file (materializing it from `T::default()`
/// if missing) and starts watching it. Each external edit loads a new value
/// and swaps it in; values already handed out stay as they were.
///
/// ```rust,no_run
/// # use hotbind_config::*;
/// # #[derive(Default, serde::Serialize, serde::Deserialize)] struct App { port: u16 }
/// # impl Settings for App {}
/// # impl ConfigFile for App { fn descriptor() -> Descriptor { Descriptor::new("app", Format::Json) } }
/// let before = Singleton::<App>::get()?;
/// // ... someone edits config/app.json ...
/// let after = Singleton::<App>::get()?;
/// # Ok::<(), ConfigError>(())
/// ```
pub struct Singleton<T>(PhantomData<fn() -> T>);

struct SingletonSlot<T> {
    lock: Mutex<()>,
    live: OnceLock<Live<T>>,
}

struct Live<T> {
    descriptor: Descriptor,
    engine: PersistenceEngine,
    current: ArcSwap<T>,
    is_new: AtomicBool,
    updates: watch::Sender<Arc<T>>,
    watcher: ChangeWatcher,
}

impl<T: ConfigFile> SingletonSlot<T> {
    fn get_or_init(self: &Arc<Self>) -> Result<&Live<T>, ConfigError> {
        if let Some(live) = self.live.get() {
            return Ok(live);
        }

        let _guard = self.lock.lock();
        if let Some(live) = self.live.get() {
            return Ok(live);
        }

        let descriptor = T::descriptor();
        let engine = PersistenceEngine::for_descriptor(&descriptor)?;
        let Loaded { mut model, is_new } = engine.load::<T>(&descriptor)?;
        model.after_load();
        if is_new {
            engine.save(&model, &descriptor, None)?;
            info!(type_name = type_name::<T>(), "materialized default config file");
        }

        let weak: Weak<Self> = Arc::downgrade(self);
        let watcher = ChangeWatcher::for_descriptor(&descriptor, move || {
            if let Some(slot) = weak.upgrade() {
                slot.on_file_changed();
            }
        })?;

        let model = Arc::new(model);
        let live = Live {
            descriptor,
            engine,
            current: ArcSwap::new(model.clone()),
            is_new: AtomicBool::new(is_new),
            updates: watch::channel(model).0,
            watcher,
        };
        let live = self.live.get_or_init(|| live);

        if let Err(e) = live.watcher.start() {
            warn!(type_name = type_name::<T>(), "config watcher failed to start: {e}");
        }
        Ok(live)
    }

    /// Load from disk and swap the result in. Caller holds `self.lock`.
    fn load_into(&self, live: &Live<T>) -> Result<Arc<T>, ConfigError> {
        let Loaded { mut model, is_new } = live.engine.load::<T>(&live.descriptor)?;
        model.after_load();
        let model = Arc::new(model);
        live.current.store(model.clone());
        live.is_new.store(is_new, Ordering::Release);
        live.updates.send_replace(model.clone());
        Ok(model)
    }

    fn on_file_changed(&self) {
        let Some(live) = self.live.get() else {
            return;
        };
        let _guard = self.lock.lock();
        match self.load_into(live) {
            Ok(_) => info!(type_name = type_name::<T>(), "config reloaded"),
            Err(e) => warn!(
                type_name = type_name::<T>(),
                "config reload failed, keeping current value: {e}"
            ),
        }
    }

    /// Persist `model`, suppressing the watcher around the write.
    fn persist(&self, live: &Live<T>, model: &T) -> Result<(), ConfigError> {
        live.watcher.mark_file_changed();
        let result = live.engine.save(model, &live.descriptor, None);
        live.watcher.mark_write_complete();
        result?;
        live.is_new.store(false, Ordering::Release);
        Ok(())
    }
}

impl<T: ConfigFile> Singleton<T> {
    fn slot() -> Arc<SingletonSlot<T>> {
        registry::slot(|| SingletonSlot::<T> {
            lock: Mutex::new(()),
            live: OnceLock::new(),
        })
    }

    fn with_live<R>(
        f: impl FnOnce(&SingletonSlot<T>, &Live<T>) -> Result<R, ConfigError>,
    ) -> Result<R, ConfigError> {
        let slot = Self::slot();
        let live = slot.get_or_init()?;
        f(&*slot, live)
    }

    /// The current value, initializing the binding on first call.
    pub fn get() -> Result<Arc<T>, ConfigError> {
        Self::with_live(|_, live| Ok(live.current.load_full()))
    }

    /// Whether the last load found no usable file.
    pub fn is_new() -> Result<bool, ConfigError> {
        Self::with_live(|_, live| Ok(live.is_new.load(Ordering::Acquire)))
    }

    /// Resolved path of the bound file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Self::with_live(|_, live| Ok(live.descriptor.resolve()?.to_path_buf()))
    }

    /// Write the current value back to disk.
    pub fn save() -> Result<(), ConfigError> {
        Self::with_live(|slot, live| {
            let _guard = slot.lock.lock();
            slot.persist(live, &live.current.load_full())
        })
    }

    /// Apply `f` to a copy of the current value, save it, then swap it in.
    ///
    /// Nothing is swapped if the save fails.
    pub fn update(f: impl FnOnce(&mut T)) -> Result<Arc<T>, ConfigError>
    where
        T: Clone,
    {
        Self::with_live(|slot, live| {
            let _guard = slot.lock.lock();
            let mut next = T::clone(&live.current.load());
            f(&mut next);
            slot.persist(live, &next)?;
            let next = Arc::new(next);
            live.current.store(next.clone());
            live.updates.send_replace(next.clone());
            Ok(next)
        })
    }

    /// Re-read the file now instead of waiting for the watcher.
    pub fn reload() -> Result<Arc<T>, ConfigError> {
        Self::with_live(|slot, live| {
            let _guard = slot.lock.lock();
            slot.load_into(live)
        })
    }

    /// Receiver that observes every value swapped in after this call.
    pub fn subscribe() -> Result<watch::Receiver<Arc<T>>, ConfigError> {
        Self::with_live(|_, live| Ok(live.updates.subscribe()))
    }

    /// Stop watching the file. The held value stays available.
    pub fn stop() {
        if let Some(live) = Self::slot().live.get() {
            live.watcher.stop();
        }
    }

    /// Whether the file is currently being watched.
    pub fn is_watching() -> bool {
        Self::slot()
            .live
            .get()
            .is_some_and(|live| live.watcher.is_watching())
    }
}
