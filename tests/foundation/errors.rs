//! Integration tests for the error taxonomy.

use stowage_foundation::{
    ContainerId, DefinitionId, Error, ErrorKind, InstanceId, TagId, ValueKind,
};

#[test]
fn every_kind_renders_a_message() {
    let errors = vec![
        Error::definition_not_found(DefinitionId(1)),
        Error::duplicate_definition(TagId::SLOT_MAIN),
        Error::fragment_not_found(DefinitionId(1), "Wearable"),
        Error::instance_not_found(InstanceId::new(1, 1)),
        Error::stale_instance(InstanceId::new(1, 3)),
        Error::already_initialized(InstanceId::new(1, 1)),
        Error::uninitialized(InstanceId::new(1, 1)),
        Error::instance_already_slotted(InstanceId::new(1, 1)),
        Error::container_not_found(ContainerId(2)),
        Error::unknown_slot_kind(TagId::SLOT_CLOTHES),
        Error::duplicate_slot_kind(TagId::SLOT_MAIN),
        Error::no_empty_slot(TagId::SLOT_MAIN),
        Error::slot_occupied(TagId::SLOT_MAIN, 2),
        Error::slot_empty(TagId::SLOT_MAIN, 2),
        Error::index_out_of_range(9, 4),
        Error::access_denied(ContainerId(0), 7),
        Error::type_mismatch(ValueKind::Int, ValueKind::Bool),
        Error::replication_gap(1, 3),
        Error::internal("wat"),
    ];

    for error in errors {
        assert!(!format!("{error}").is_empty());
    }
}

#[test]
fn kinds_support_pattern_matching() {
    let err = Error::slot_occupied(TagId::SLOT_MAIN, 5);
    match err.kind {
        ErrorKind::SlotOccupied { kind, index } => {
            assert_eq!(kind, TagId::SLOT_MAIN);
            assert_eq!(index, 5);
        }
        other => panic!("unexpected kind: {other}"),
    }
}

#[test]
fn error_implements_std_error() {
    fn assert_error<E: std::error::Error>(_: &E) {}
    let err = Error::internal("boxed");
    assert_error(&err);

    let boxed: Box<dyn std::error::Error> = Box::new(err);
    assert!(format!("{boxed}").contains("boxed"));
}
