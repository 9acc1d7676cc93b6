//! Already-deserialized input records. Container framing and message
//! decoding happen upstream; the decoder only ever sees these.

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerInfoRecord {
    /// Number of networked classes; fixes the width of class indices
    pub max_classes: u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SendPropRecord {
    pub type_tag: u32,
    pub var_name: String,
    pub flags: u32,
    pub priority: u32,
    /// Nested table name, or the excluded prop's table for exclude props
    pub dt_name: String,
    pub num_elements: u32,
    pub low_value: f32,
    pub high_value: f32,
    pub num_bits: u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SendTableRecord {
    pub name: String,
    pub needs_decoder: bool,
    pub props: Vec<SendPropRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassEntry {
    pub class_id: u32,
    pub table_name: String,
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassInfoRecord {
    pub classes: Vec<ClassEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PacketEntitiesRecord {
    pub is_delta: bool,
    pub updated_entries: u32,
    pub entity_data: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CreateStringTableRecord {
    pub name: String,
    pub max_entries: u32,
    pub flags: u32,
    pub fixed_size: bool,
    pub payload_size: u32,
    pub payload_bits: u32,
    pub entry_count: u32,
    pub string_data: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateStringTableRecord {
    pub table_id: usize,
    pub changed_count: u32,
    pub string_data: Vec<u8>,
}

/// One input record, in stream order
#[derive(Clone, Debug, PartialEq)]
pub enum Record {
    ServerInfo(ServerInfoRecord),
    SendTable(SendTableRecord),
    ClassInfo(ClassInfoRecord),
    CreateStringTable(CreateStringTableRecord),
    UpdateStringTable(UpdateStringTableRecord),
    PacketEntities(PacketEntitiesRecord),
    Tick(u32),
}
