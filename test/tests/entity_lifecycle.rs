/// Entity slot lifecycle across packets: leave, re-entry, deletion lists

use netprop::{PropertyValue, ReplayConfig, ReplayDriver};
use netprop_test::{unit_replay, Event, EventLog, PacketBuilder, Patch, UNIT_CLASS};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn replay_with_units(ids: &[u32]) -> (ReplayDriver, EventLog) {
    init_logger();

    let mut driver = ReplayDriver::new(ReplayConfig::default()).unwrap();
    let mut log = EventLog::new();
    driver.apply_all(&unit_replay(), &mut log).unwrap();

    let mut packet = PacketBuilder::new(3);
    for id in ids {
        packet = packet.enter(*id, UNIT_CLASS, 0, Patch::new());
    }
    driver.apply(&packet.full(), &mut log).unwrap();
    log.events.clear();
    (driver, log)
}

fn health(driver: &ReplayDriver, id: u32) -> Option<i64> {
    driver
        .state()?
        .entity(id)?
        .property_by_name("DT_Unit.m_iHealth")
        .and_then(PropertyValue::as_int)
}

#[test]
fn empty_delta_keeps_values() {
    let (mut driver, mut log) = replay_with_units(&[2]);

    let packet = PacketBuilder::new(3).delta(2, Patch::new()).delta_update(&[]);
    driver.apply(&packet, &mut log).unwrap();

    assert_eq!(health(&driver, 2), Some(100));
    assert!(matches!(log.events.as_slice(), [Event::Updated { id: 2, .. }]));
}

#[test]
fn leave_without_delete_keeps_entity() {
    let (mut driver, mut log) = replay_with_units(&[2]);

    let packet = PacketBuilder::new(3).leave(2, false).delta_update(&[]);
    driver.apply(&packet, &mut log).unwrap();

    assert!(log.events.is_empty());
    assert_eq!(health(&driver, 2), Some(100));
}

#[test]
fn leave_with_delete_clears_slot() {
    let (mut driver, mut log) = replay_with_units(&[2, 3]);

    let packet = PacketBuilder::new(3).leave(3, true).delta_update(&[]);
    driver.apply(&packet, &mut log).unwrap();

    assert_eq!(log.deleted(), vec![3]);
    assert_eq!(health(&driver, 3), None);
    assert_eq!(health(&driver, 2), Some(100));
}

#[test]
fn reentry_on_occupied_slot_replaces_entity() {
    let (mut driver, mut log) = replay_with_units(&[6]);

    let packet = PacketBuilder::new(3)
        .enter(6, UNIT_CLASS, 2, Patch::new().field(0, 1, 8))
        .delta_update(&[]);
    driver.apply(&packet, &mut log).unwrap();

    assert_eq!(log.events.len(), 2);
    assert_eq!(log.events[0], Event::Deleted { id: 6 });
    assert!(matches!(log.events[1], Event::Created { id: 6, .. }));

    let entity = driver.state().unwrap().entity(6).unwrap();
    assert_eq!(entity.serial(), 2);
    assert_eq!(health(&driver, 6), Some(1));
}

#[test]
fn trailing_deletion_list_runs_after_entries() {
    let (mut driver, mut log) = replay_with_units(&[1, 7, 9]);

    let packet = PacketBuilder::new(3)
        .delta(7, Patch::new().field(0, 5, 8))
        .delta_update(&[1, 9]);
    driver.apply(&packet, &mut log).unwrap();

    assert!(matches!(log.events[0], Event::Updated { id: 7, .. }));
    assert_eq!(log.deleted(), vec![1, 9]);

    let state = driver.state().unwrap();
    assert_eq!(state.entities().len(), 1);
    assert_eq!(health(&driver, 7), Some(5));
}

#[test]
fn deleting_empty_slot_is_not_fatal() {
    let (mut driver, mut log) = replay_with_units(&[]);

    let packet = PacketBuilder::new(3).delta_update(&[12]);
    driver.apply(&packet, &mut log).unwrap();

    assert!(log.events.is_empty());
}

#[test]
fn full_update_ignores_trailing_bits() {
    let (mut driver, mut log) = replay_with_units(&[0]);

    // a full packet never reads a deletion list, even when bits follow
    let packet = PacketBuilder::new(3)
        .delta(0, Patch::new().field(1, 77, 8))
        .delta_update(&[0]);
    let netprop::Record::PacketEntities(mut record) = packet else {
        unreachable!()
    };
    record.is_delta = false;
    driver
        .apply(&netprop::Record::PacketEntities(record), &mut log)
        .unwrap();

    assert!(log.deleted().is_empty());
    let mana = driver
        .state()
        .unwrap()
        .entity(0)
        .unwrap()
        .property_by_name("DT_Unit.m_iMana")
        .cloned();
    assert_eq!(mana, Some(PropertyValue::Int(77)));
}
