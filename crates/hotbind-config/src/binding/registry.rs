//! Process-wide map from slot type to its single instance.

use std::any::{Any, TypeId};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;

type Slot = Arc<dyn Any + Send + Sync>;

fn slots() -> &'static DashMap<TypeId, Slot> {
    static SLOTS: OnceLock<DashMap<TypeId, Slot>> = OnceLock::new();
    SLOTS.get_or_init(DashMap::new)
}

/// The one `S` for this process, created by `make` on first use.
///
/// `make` runs while the map shard is locked and must not call back in.
pub(crate) fn slot<S: Send + Sync + 'static>(make: impl FnOnce() -> S) -> Arc<S> {
    let entry = slots()
        .entry(TypeId::of::<S>())
        .or_insert_with(|| Arc::new(make()) as Slot)
        .clone();
    match entry.downcast::<S>() {
        Ok(slot) => slot,
        Err(_) => unreachable!("slots are keyed by their own TypeId"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Marker(AtomicUsize);

    #[test]
    fn same_type_gets_same_slot() {
        let a = slot(|| Marker(AtomicUsize::new(0)));
        let b = slot(|| Marker(AtomicUsize::new(99)));
        a.0.fetch_add(1, Ordering::SeqCst);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(b.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn different_types_get_different_slots() {
        struct Other(u8);
        let other = slot(|| Other(7));
        assert_eq!(other.0, 7);
    }
}
