//! Instance lifecycle: spawn, one-shot initialization, duplication,
//! destruction, stale detection.

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use stowage_foundation::{ErrorKind, InstanceId, TagRegistry};
use stowage_fragments::{
    DefinitionBuilder, DefinitionRegistry, Fragment, HookContext, InstanceStore, Lifecycle,
};

/// Counts hook invocations so ordering and exactly-once are observable.
#[derive(Debug, Default)]
struct Probe {
    created: AtomicU32,
    initialized: AtomicU32,
}

#[derive(Debug)]
struct Probed {
    probe: Arc<Probe>,
}

impl Fragment for Probed {
    fn name(&self) -> &'static str {
        "probed"
    }

    fn on_instance_created(&self, _ctx: &mut HookContext<'_>, _instance: InstanceId) {
        self.probe.created.fetch_add(1, Ordering::Relaxed);
    }

    fn on_instance_initialized(&self, _ctx: &mut HookContext<'_>, _instance: InstanceId) {
        self.probe.initialized.fetch_add(1, Ordering::Relaxed);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn probed_world() -> (DefinitionRegistry, InstanceStore, Arc<Probe>) {
    let mut tags = TagRegistry::new();
    let name = tags.intern("item/probe");
    let probe = Arc::new(Probe::default());

    let mut registry = DefinitionRegistry::new();
    registry
        .register(DefinitionBuilder::new(name).with_fragment(Probed {
            probe: Arc::clone(&probe),
        }))
        .unwrap();

    (registry, InstanceStore::new(), probe)
}

#[test]
fn lifecycle_transitions_exactly_once() {
    let (registry, mut store, probe) = probed_world();
    let def = registry.iter().next().unwrap().id();

    let id = store.spawn(&registry, def).unwrap();
    assert_eq!(store.get(id).unwrap().lifecycle(), Lifecycle::Uninitialized);
    assert_eq!(probe.created.load(Ordering::Relaxed), 1);
    assert_eq!(probe.initialized.load(Ordering::Relaxed), 0);

    store.initialize(&registry, id).unwrap();
    assert_eq!(store.get(id).unwrap().lifecycle(), Lifecycle::Initialized);
    assert_eq!(probe.initialized.load(Ordering::Relaxed), 1);

    // A second transition is a structured error and fires nothing.
    let err = store.initialize(&registry, id).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::AlreadyInitialized(_)));
    assert_eq!(probe.initialized.load(Ordering::Relaxed), 1);
}

#[test]
fn duplicate_runs_the_copy_through_the_full_lifecycle() {
    let (registry, mut store, probe) = probed_world();
    let def = registry.iter().next().unwrap().id();

    let source = store.spawn(&registry, def).unwrap();
    store.initialize(&registry, source).unwrap();

    let copy = store.duplicate(&registry, source).unwrap();
    assert!(store.get(copy).unwrap().is_initialized());
    assert_eq!(probe.created.load(Ordering::Relaxed), 2);
    assert_eq!(probe.initialized.load(Ordering::Relaxed), 2);
}

#[test]
fn stale_ids_are_rejected_everywhere() {
    let (registry, mut store, _probe) = probed_world();
    let def = registry.iter().next().unwrap().id();

    let id = store.spawn(&registry, def).unwrap();
    store.destroy(id).unwrap();
    // Reuse the index so the stale id points at a live record.
    let replacement = store.spawn(&registry, def).unwrap();
    assert_eq!(replacement.index, id.index);

    assert!(matches!(
        store.get(id).unwrap_err().kind,
        ErrorKind::StaleInstance(_)
    ));
    assert!(matches!(
        store.initialize(&registry, id).unwrap_err().kind,
        ErrorKind::StaleInstance(_)
    ));
    assert!(matches!(
        store.duplicate(&registry, id).unwrap_err().kind,
        ErrorKind::StaleInstance(_)
    ));
    assert!(matches!(
        store.destroy(id).unwrap_err().kind,
        ErrorKind::StaleInstance(_)
    ));
}

#[test]
fn never_allocated_ids_are_not_found() {
    let (registry, mut store, _probe) = probed_world();
    let bogus = InstanceId::new(999, 1);

    assert!(!store.exists(bogus));
    assert!(matches!(
        store.get(bogus).unwrap_err().kind,
        ErrorKind::InstanceNotFound(_)
    ));
    assert!(matches!(
        store.initialize(&registry, bogus).unwrap_err().kind,
        ErrorKind::InstanceNotFound(_)
    ));
}
