//! The slot assignment protocol end to end.

use std::sync::Arc;

use stowage_foundation::{ContainerId, DefinitionId, ErrorKind, InstanceId, TagId, TagRegistry};
use stowage_fragments::{DefinitionBuilder, DefinitionRegistry};
use stowage_inventory::{AccessPolicy, Agent, AgentId, ContainerConfig, Manager};

struct World {
    manager: Manager,
    owner: Agent,
    backpack: ContainerId,
    crate_def: DefinitionId,
}

fn world() -> World {
    let mut tags = TagRegistry::new();
    let crate_tag = tags.intern("item/crate");

    let mut registry = DefinitionRegistry::new();
    let crate_def = registry.register(DefinitionBuilder::new(crate_tag)).unwrap();

    let mut manager = Manager::new(Arc::new(registry));
    let owner = Agent::new(AgentId(1));
    let backpack = manager
        .create_container(
            owner.id,
            AccessPolicy::Private,
            &ContainerConfig::new()
                .with_array(TagId::SLOT_MAIN, 3)
                .with_array(TagId::SLOT_CLOTHES, 1),
        )
        .unwrap();

    World {
        manager,
        owner,
        backpack,
        crate_def,
    }
}

fn item(w: &mut World) -> InstanceId {
    let id = w.manager.spawn_instance(w.crate_def).unwrap();
    w.manager.initialize_instance(id).unwrap();
    id
}

#[test]
fn fill_then_drain_a_container() {
    let mut w = world();
    let items: Vec<_> = (0..3).map(|_| item(&mut w)).collect();

    for (i, &id) in items.iter().enumerate() {
        let addr = w.manager.add(w.backpack, id, TagId::SLOT_MAIN, None).unwrap();
        assert_eq!(addr.index as usize, i);
    }

    // Array is full now.
    let extra = item(&mut w);
    assert!(matches!(
        w.manager
            .add(w.backpack, extra, TagId::SLOT_MAIN, None)
            .unwrap_err()
            .kind,
        ErrorKind::NoEmptySlot(_)
    ));

    for (i, &id) in items.iter().enumerate() {
        let removed = w
            .manager
            .remove(w.backpack, TagId::SLOT_MAIN, i as u32)
            .unwrap();
        assert_eq!(removed, id);
    }
    assert_eq!(
        w.manager
            .container(w.backpack)
            .unwrap()
            .array(TagId::SLOT_MAIN)
            .unwrap()
            .occupied_count(),
        0
    );
}

#[test]
fn freed_slot_is_reused_by_auto_index() {
    let mut w = world();
    let a = item(&mut w);
    let b = item(&mut w);
    let c = item(&mut w);

    w.manager.add(w.backpack, a, TagId::SLOT_MAIN, None).unwrap();
    w.manager.add(w.backpack, b, TagId::SLOT_MAIN, None).unwrap();
    w.manager.remove(w.backpack, TagId::SLOT_MAIN, 0).unwrap();

    // Auto-index picks the leftmost hole, not the end.
    let addr = w.manager.add(w.backpack, c, TagId::SLOT_MAIN, None).unwrap();
    assert_eq!(addr.index, 0);
}

#[test]
fn unknown_kind_and_container_are_rejected() {
    let mut w = world();
    let a = item(&mut w);
    let mut tags = TagRegistry::new();
    let bogus_kind = tags.intern("slot/vehicle");

    assert!(matches!(
        w.manager
            .add(w.backpack, a, bogus_kind, None)
            .unwrap_err()
            .kind,
        ErrorKind::UnknownSlotKind(_)
    ));
    assert!(matches!(
        w.manager
            .add(ContainerId(99), a, TagId::SLOT_MAIN, None)
            .unwrap_err()
            .kind,
        ErrorKind::ContainerNotFound(_)
    ));
}

#[test]
fn an_instance_is_never_in_two_slots() {
    let mut w = world();
    let a = item(&mut w);

    w.manager.add(w.backpack, a, TagId::SLOT_MAIN, Some(0)).unwrap();

    // Same container, different kind.
    assert!(matches!(
        w.manager
            .add(w.backpack, a, TagId::SLOT_CLOTHES, None)
            .unwrap_err()
            .kind,
        ErrorKind::InstanceAlreadySlotted(_)
    ));

    // Exactly one slot holds the instance.
    let container = w.manager.container(w.backpack).unwrap();
    let holding: usize = container
        .arrays()
        .map(|array| array.occupied().filter(|(_, id)| *id == a).count())
        .sum();
    assert_eq!(holding, 1);
}

#[test]
fn transfer_within_one_container_changes_kind() {
    let mut w = world();
    let a = item(&mut w);
    let owner = w.owner.clone();

    let from = w.manager.add(w.backpack, a, TagId::SLOT_MAIN, None).unwrap();
    let to = w
        .manager
        .transfer(w.backpack, from, w.backpack, TagId::SLOT_CLOTHES, None, &owner)
        .unwrap();

    assert_eq!(to.kind, TagId::SLOT_CLOTHES);
    let container = w.manager.container(w.backpack).unwrap();
    assert_eq!(
        container.array(TagId::SLOT_MAIN).unwrap().occupied_count(),
        0
    );
    assert_eq!(
        container.array(TagId::SLOT_CLOTHES).unwrap().get(0).unwrap(),
        Some(a)
    );
}

#[test]
fn public_container_accepts_strangers() {
    let mut w = world();
    let a = item(&mut w);
    let from = w.manager.add(w.backpack, a, TagId::SLOT_MAIN, None).unwrap();

    let drop_zone = w
        .manager
        .create_container(
            AgentId(50),
            AccessPolicy::Public,
            &ContainerConfig::new().with_array(TagId::SLOT_MAIN, 2),
        )
        .unwrap();

    // The mover owns the backpack; the drop zone is public.
    let owner = w.owner.clone();
    w.manager
        .transfer(w.backpack, from, drop_zone, TagId::SLOT_MAIN, None, &owner)
        .unwrap();

    // A stranger can pull from the public container into... nothing they
    // own here, so pulling back into the private backpack is denied.
    let stranger = Agent::new(AgentId(99));
    let err = w
        .manager
        .transfer(
            drop_zone,
            stowage_foundation::SlotAddr::new(TagId::SLOT_MAIN, 0),
            w.backpack,
            TagId::SLOT_MAIN,
            None,
            &stranger,
        )
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::AccessDenied { .. }));
}

#[test]
fn events_sequence_matches_operation_order() {
    let mut w = world();
    let a = item(&mut w);
    let b = item(&mut w);
    let owner = w.owner.clone();

    let addr_a = w.manager.add(w.backpack, a, TagId::SLOT_MAIN, None).unwrap();
    let addr_b = w.manager.add(w.backpack, b, TagId::SLOT_MAIN, None).unwrap();
    w.manager
        .swap(w.backpack, addr_a, w.backpack, addr_b, &owner)
        .unwrap();
    w.manager.remove(w.backpack, addr_a.kind, addr_a.index).unwrap();

    let types: Vec<_> = w
        .manager
        .events()
        .iter()
        .map(|r| r.event.event_type())
        .collect();
    assert_eq!(
        types,
        vec!["slot-filled", "slot-filled", "swapped", "slot-cleared"]
    );

    let seqs: Vec<_> = w.manager.events().iter().map(|r| r.seq).collect();
    assert_eq!(seqs, vec![0, 1, 2, 3]);
}
