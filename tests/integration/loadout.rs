//! A survival loadout scenario across all layers.

use std::any::Any;
use std::sync::Arc;

use stowage_foundation::{InstanceId, SlotAddr, TagId, TagRegistry, Value};
use stowage_fragments::{DefinitionBuilder, DefinitionRegistry, Fragment, HookContext};
use stowage_inventory::{
    AccessPolicy, Agent, AgentId, ContainerConfig, ContainerReplica, LocalsReplica, Manager,
};

/// Wearables grant warmth while slotted in a clothes slot.
#[derive(Debug)]
struct Wearable {
    warmth_tag: TagId,
    worn_tag: TagId,
    warmth: f64,
}

impl Fragment for Wearable {
    fn name(&self) -> &'static str {
        "wearable"
    }

    fn on_instance_initialized(&self, ctx: &mut HookContext<'_>, _instance: InstanceId) {
        // Seed-if-absent so duplicated instances keep their copied values.
        if !ctx.locals.contains(self.warmth_tag) {
            ctx.locals.set(self.warmth_tag, self.warmth);
        }
        ctx.locals.set(self.worn_tag, false);
    }

    fn on_added_to_slot(&self, ctx: &mut HookContext<'_>, _instance: InstanceId, slot: SlotAddr) {
        ctx.locals.set(self.worn_tag, slot.kind == TagId::SLOT_CLOTHES);
    }

    fn on_removed_from_slot(
        &self,
        ctx: &mut HookContext<'_>,
        _instance: InstanceId,
        _slot: SlotAddr,
    ) {
        ctx.locals.set(self.worn_tag, false);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct Scenario {
    manager: Manager,
    player: Agent,
    warmth: TagId,
    worn: TagId,
    coat_def: stowage_foundation::DefinitionId,
}

fn scenario() -> Scenario {
    let mut tags = TagRegistry::new();
    let warmth = tags.intern("warmth");
    let worn = tags.intern("worn");
    let coat_tag = tags.intern("item/coat");

    let mut registry = DefinitionRegistry::new();
    let coat_def = registry
        .register(DefinitionBuilder::new(coat_tag).with_fragment(Wearable {
            warmth_tag: warmth,
            worn_tag: worn,
            warmth: 0.6,
        }))
        .unwrap();

    Scenario {
        manager: Manager::new(Arc::new(registry)),
        player: Agent::new(AgentId(1)),
        warmth,
        worn,
        coat_def,
    }
}

#[test]
fn pick_up_wear_and_stash_a_coat() {
    let mut s = scenario();
    let coat_def = s.coat_def;

    // Player inventory: general slots plus worn clothes; a world chest.
    let player_inv = s
        .manager
        .create_container(
            s.player.id,
            AccessPolicy::Private,
            &ContainerConfig::new()
                .with_array(TagId::SLOT_MAIN, 6)
                .with_array(TagId::SLOT_CLOTHES, 2),
        )
        .unwrap();
    let chest = s
        .manager
        .create_container(
            AgentId(0),
            AccessPolicy::Public,
            &ContainerConfig::new().with_array(TagId::SLOT_MAIN, 8),
        )
        .unwrap();

    // The coat starts in the chest.
    let coat = s.manager.spawn_instance(coat_def).unwrap();
    s.manager.initialize_instance(coat).unwrap();
    let chest_slot = s.manager.add(chest, coat, TagId::SLOT_MAIN, None).unwrap();
    assert_eq!(
        s.manager.local(coat, s.worn).unwrap(),
        Some(&Value::Bool(false))
    );

    // Loot it into the backpack, then wear it.
    let player = s.player.clone();
    let pocket = s
        .manager
        .transfer(chest, chest_slot, player_inv, TagId::SLOT_MAIN, None, &player)
        .unwrap();
    assert_eq!(
        s.manager.local(coat, s.worn).unwrap(),
        Some(&Value::Bool(false))
    );

    s.manager
        .transfer(player_inv, pocket, player_inv, TagId::SLOT_CLOTHES, None, &player)
        .unwrap();
    assert_eq!(
        s.manager.local(coat, s.worn).unwrap(),
        Some(&Value::Bool(true))
    );
    assert_eq!(
        s.manager.local(coat, s.warmth).unwrap(),
        Some(&Value::Float(0.6))
    );

    // The event stream tells the whole story.
    let types: Vec<_> = s
        .manager
        .events()
        .iter()
        .map(|r| r.event.event_type())
        .collect();
    assert_eq!(types, vec!["slot-filled", "transferred", "transferred"]);
}

#[test]
fn client_views_mirror_the_whole_scenario() {
    let mut s = scenario();
    let coat_def = s.coat_def;

    let player_inv = s
        .manager
        .create_container(
            s.player.id,
            AccessPolicy::Private,
            &ContainerConfig::new()
                .with_array(TagId::SLOT_MAIN, 6)
                .with_array(TagId::SLOT_CLOTHES, 2),
        )
        .unwrap();

    let coat = s.manager.spawn_instance(coat_def).unwrap();
    s.manager.initialize_instance(coat).unwrap();

    let mut inv_view = ContainerReplica::new(player_inv);
    let mut coat_view = LocalsReplica::new(coat);

    let sync = |manager: &Manager,
                inv_view: &mut ContainerReplica,
                coat_view: &mut LocalsReplica| {
        let delta = manager
            .collect_container_delta(player_inv, &inv_view.cursors())
            .unwrap();
        inv_view.apply(&delta).unwrap();
        let delta = manager
            .collect_locals_delta(coat, coat_view.cursor())
            .unwrap();
        coat_view.apply(&delta).unwrap();
    };

    sync(&s.manager, &mut inv_view, &mut coat_view);
    assert_eq!(coat_view.get(s.worn), Some(&Value::Bool(false)));

    let player = s.player.clone();
    let pocket = s
        .manager
        .add(player_inv, coat, TagId::SLOT_MAIN, None)
        .unwrap();
    s.manager
        .transfer(player_inv, pocket, player_inv, TagId::SLOT_CLOTHES, None, &player)
        .unwrap();

    sync(&s.manager, &mut inv_view, &mut coat_view);

    // The client sees the coat worn, the pocket empty, and the hook-driven
    // local data that came with it.
    assert_eq!(inv_view.slot(TagId::SLOT_MAIN, pocket.index), None);
    assert_eq!(inv_view.slot(TagId::SLOT_CLOTHES, 0), Some(coat));
    assert_eq!(coat_view.get(s.worn), Some(&Value::Bool(true)));

    // A UI snapshot taken now survives further authority churn.
    let snapshot = coat_view.snapshot();
    s.manager
        .set_local(coat, s.warmth, 0.1)
        .unwrap();
    sync(&s.manager, &mut inv_view, &mut coat_view);
    assert_eq!(snapshot.get(&s.warmth), Some(&Value::Float(0.6)));
    assert_eq!(coat_view.get(s.warmth), Some(&Value::Float(0.1)));
}

#[test]
fn duplicated_coat_is_independent_but_identically_dressed() {
    let mut s = scenario();

    let coat = s.manager.spawn_instance(s.coat_def).unwrap();
    s.manager.initialize_instance(coat).unwrap();
    s.manager.set_local(coat, s.warmth, 0.9).unwrap();

    let copy = s.manager.duplicate_instance(coat).unwrap();
    assert_eq!(
        s.manager.local(copy, s.warmth).unwrap(),
        Some(&Value::Float(0.9))
    );

    // Wearing the copy does not touch the original.
    let player_inv = s
        .manager
        .create_container(
            s.player.id,
            AccessPolicy::Private,
            &ContainerConfig::new().with_array(TagId::SLOT_CLOTHES, 2),
        )
        .unwrap();
    s.manager
        .add(player_inv, copy, TagId::SLOT_CLOTHES, None)
        .unwrap();

    assert_eq!(
        s.manager.local(copy, s.worn).unwrap(),
        Some(&Value::Bool(true))
    );
    assert_eq!(
        s.manager.local(coat, s.worn).unwrap(),
        Some(&Value::Bool(false))
    );
}
