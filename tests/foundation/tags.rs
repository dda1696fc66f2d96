//! Integration tests for tag interning.

use stowage_foundation::{TagId, TagRegistry};

#[test]
fn reserved_slot_kinds_are_stable() {
    // Container configurations rely on these ids being fixed across
    // registries (authority and client intern independently).
    let a = TagRegistry::new();
    let b = TagRegistry::new();

    assert_eq!(a.resolve(TagId::SLOT_MAIN), b.resolve(TagId::SLOT_MAIN));
    assert_eq!(
        a.resolve(TagId::SLOT_CLOTHES),
        b.resolve(TagId::SLOT_CLOTHES)
    );
}

#[test]
fn same_intern_order_gives_same_ids() {
    let mut a = TagRegistry::new();
    let mut b = TagRegistry::new();

    let names = ["durability", "warmth", "ammo/count"];
    let ids_a: Vec<_> = names.iter().map(|n| a.intern(n)).collect();
    let ids_b: Vec<_> = names.iter().map(|n| b.intern(n)).collect();

    assert_eq!(ids_a, ids_b);
}

#[test]
fn interning_is_idempotent_across_many_calls() {
    let mut registry = TagRegistry::new();
    let first = registry.intern("weight");

    for _ in 0..100 {
        assert_eq!(registry.intern("weight"), first);
    }
    assert_eq!(registry.len(), 3); // two reserved + one interned
}
