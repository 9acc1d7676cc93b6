use netprop::{
    ClassEntry, ClassInfoRecord, PropFlags, Record, SendPropRecord, SendTableRecord,
    ServerInfoRecord,
};

use super::{Patch, StringTableBuilder};

/// Class id of the unit class registered by [`unit_replay`]
pub const UNIT_CLASS: u32 = 3;

pub fn server_info(max_classes: u32) -> Record {
    Record::ServerInfo(ServerInfoRecord { max_classes })
}

/// Unsigned integer prop of the given width
pub fn int_prop(name: &str, num_bits: u32) -> SendPropRecord {
    SendPropRecord {
        type_tag: 0,
        var_name: name.to_string(),
        flags: PropFlags::UNSIGNED.bits(),
        num_bits,
        ..SendPropRecord::default()
    }
}

pub fn send_table(name: &str, props: Vec<SendPropRecord>) -> Record {
    Record::SendTable(SendTableRecord {
        name: name.to_string(),
        needs_decoder: true,
        props,
    })
}

pub fn class_info(classes: &[(u32, &str, &str)]) -> Record {
    Record::ClassInfo(ClassInfoRecord {
        classes: classes
            .iter()
            .map(|(class_id, table_name, name)| ClassEntry {
                class_id: *class_id,
                table_name: table_name.to_string(),
                name: name.to_string(),
            })
            .collect(),
    })
}

/// Records for a replay with one `DT_Unit` class holding 8 bit `m_iHealth`
/// and `m_iMana`, and a baseline of health 100, mana 50. Eight classes
/// make the class id 3 bits wide.
pub fn unit_replay() -> Vec<Record> {
    let baseline = Patch::new().field(0, 100, 8).field(1, 50, 8).to_bytes();

    vec![
        server_info(8),
        send_table(
            "DT_Unit",
            vec![int_prop("m_iHealth", 8), int_prop("m_iMana", 8)],
        ),
        class_info(&[(UNIT_CLASS, "DT_Unit", "CDOTA_BaseNPC")]),
        StringTableBuilder::new(6)
            .next(Some(UNIT_CLASS.to_string().as_bytes()), Some(baseline.as_slice()))
            .create("instancebaseline", 64),
    ]
}
