/// End to end replay: schema records, baseline string table, then packets
/// that create and update an entity, checked through the observer.

use netprop::{PropertyValue, Record, ReplayConfig, ReplayDriver};
use netprop_test::{unit_replay, Event, EventLog, PacketBuilder, Patch, UNIT_CLASS};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn health_and_mana(health: i64, mana: i64) -> Vec<(String, PropertyValue)> {
    vec![
        ("DT_Unit.m_iHealth".to_string(), PropertyValue::Int(health)),
        ("DT_Unit.m_iMana".to_string(), PropertyValue::Int(mana)),
    ]
}

#[test]
fn baseline_then_in_place_update() {
    init_logger();

    let mut records = unit_replay();
    records.push(Record::Tick(1));
    records.push(
        PacketBuilder::new(3)
            .enter(5, UNIT_CLASS, 7, Patch::new())
            .full(),
    );
    records.push(Record::Tick(2));
    records.push(
        PacketBuilder::new(3)
            .delta(5, Patch::new().field(0, 42, 8))
            .delta_update(&[]),
    );

    let mut driver = ReplayDriver::new(ReplayConfig::default()).unwrap();
    let mut log = EventLog::new();
    driver.apply_all(&records, &mut log).unwrap();

    assert_eq!(
        log.events,
        vec![
            Event::Tick(1),
            Event::Created {
                id: 5,
                class_id: UNIT_CLASS,
                properties: health_and_mana(100, 50),
            },
            Event::Tick(2),
            Event::Updated {
                id: 5,
                properties: health_and_mana(42, 50),
            },
        ]
    );

    let entity = driver.state().unwrap().entity(5).unwrap();
    assert_eq!(entity.serial(), 7);
    assert_eq!(entity.schema().name(), "DT_Unit");
}

#[test]
fn enter_delta_overrides_baseline() {
    init_logger();

    let mut records = unit_replay();
    records.push(
        PacketBuilder::new(3)
            .enter(0, UNIT_CLASS, 0, Patch::new().field(1, 9, 8))
            .enter(4, UNIT_CLASS, 1, Patch::new())
            .full(),
    );

    let mut driver = ReplayDriver::new(ReplayConfig::default()).unwrap();
    driver.apply_all(&records, &mut EventLog::new()).unwrap();

    let state = driver.state().unwrap();
    let mana = |id: u32| {
        state
            .entity(id)
            .and_then(|entity| entity.property_by_name("DT_Unit.m_iMana"))
            .and_then(PropertyValue::as_int)
    };
    assert_eq!(mana(0), Some(9));
    assert_eq!(mana(4), Some(50));
    assert_eq!(state.entities().len(), 2);
}

#[test]
fn schema_compiles_on_class_info() {
    init_logger();

    let records = unit_replay();
    let mut driver = ReplayDriver::new(ReplayConfig::default()).unwrap();
    driver.apply_all(&records[..2], &mut EventLog::new()).unwrap();
    assert!(!driver.state().unwrap().is_compiled());

    driver.apply_all(&records[2..], &mut EventLog::new()).unwrap();
    let state = driver.state().unwrap();
    assert!(state.is_compiled());
    assert_eq!(state.class_bits(), 3);

    let schema = state.flat_schema("DT_Unit").unwrap();
    let names: Vec<&str> = schema.props().iter().map(|prop| prop.name.as_str()).collect();
    assert_eq!(names, vec!["DT_Unit.m_iHealth", "DT_Unit.m_iMana"]);
}
