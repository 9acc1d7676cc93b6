/// String table creation and incremental updates through the driver

use netprop::{Record, ReplayConfig, ReplayDriver, ReplayError, Violation};
use netprop_test::{server_info, EventLog, StringTableBuilder};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn driver() -> ReplayDriver {
    init_logger();

    let mut driver = ReplayDriver::new(ReplayConfig::default()).unwrap();
    driver
        .apply(&server_info(16), &mut EventLog::new())
        .unwrap();
    driver
}

fn models() -> Record {
    StringTableBuilder::new(3)
        .next(Some(b"models/hero.mdl"), None)
        .next(Some(b"models/creep.mdl"), Some(b"\x01\x02"))
        .create("modelprecache", 8)
}

#[test]
fn create_then_append_and_fill() {
    let mut driver = driver();
    let mut log = EventLog::new();
    driver.apply(&models(), &mut log).unwrap();

    let update = StringTableBuilder::new(3)
        .at(0, None, Some(b"hero"))
        .at(2, Some(b"models/tower.mdl"), None)
        .update(0);
    driver.apply(&update, &mut log).unwrap();

    let tables = driver.state().unwrap().string_tables();
    assert_eq!(tables.len(), 1);
    let table = tables.get_by_name("modelprecache").unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(table.get(0).unwrap().value, b"hero".to_vec());
    assert_eq!(table.get(1).unwrap().value, vec![1, 2]);
    assert_eq!(
        table.get_by_key(b"models/tower.mdl").unwrap().key,
        b"models/tower.mdl".to_vec()
    );
    assert!(log.events.is_empty());
}

#[test]
fn overwriting_a_value_is_fatal() {
    let mut driver = driver();
    driver.apply(&models(), &mut EventLog::new()).unwrap();

    let update = StringTableBuilder::new(3)
        .at(1, None, Some(b"again"))
        .update(0);
    let result = driver.apply(&update, &mut EventLog::new());

    assert!(matches!(
        result,
        Err(ReplayError::FormatViolation {
            violation: Violation::ValueAlreadySet { entry_id: 1, .. },
            ..
        })
    ));
}

#[test]
fn skipping_an_entry_id_is_fatal() {
    let mut driver = driver();
    driver.apply(&models(), &mut EventLog::new()).unwrap();

    let update = StringTableBuilder::new(3)
        .at(4, Some(b"models/far.mdl"), None)
        .update(0);
    let result = driver.apply(&update, &mut EventLog::new());

    assert!(matches!(
        result,
        Err(ReplayError::FormatViolation {
            violation: Violation::EntryIdGap {
                entry_id: 4,
                count: 2,
                ..
            },
            ..
        })
    ));
}

#[test]
fn tables_are_numbered_in_creation_order() {
    let mut driver = driver();
    driver.apply(&models(), &mut EventLog::new()).unwrap();
    driver
        .apply(
            &StringTableBuilder::new(2).create("userinfo", 4),
            &mut EventLog::new(),
        )
        .unwrap();

    let update = StringTableBuilder::new(2)
        .next(Some(b"player"), Some(b"\x2a"))
        .update(1);
    driver.apply(&update, &mut EventLog::new()).unwrap();

    let tables = driver.state().unwrap().string_tables();
    assert_eq!(tables.get(1).unwrap().name(), "userinfo");
    assert_eq!(tables.get(1).unwrap().len(), 1);
    assert_eq!(tables.get(0).unwrap().len(), 2);
}
