use netprop_serde::{BitReader, SerdeErr};
use thiserror::Error;

pub type ReplayResult<T> = Result<T, ReplayError>;

/// Fatal decode errors. The replay format has no resynchronization points,
/// so every one of these aborts the replay.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    /// More bits were requested than remain in the current buffer
    #[error("Stream overrun at bit {position}: requested {requested} bits but only {remaining} remain")]
    StreamOverrun {
        position: usize,
        requested: usize,
        remaining: usize,
    },

    /// The stream or schema contradicts the format
    #[error("Format violation {}: {violation}", describe_position(.position))]
    FormatViolation {
        position: Option<usize>,
        violation: Violation,
    },

    /// The stream takes a branch of the format whose semantics are not validated
    #[error("Unsupported feature at bit {position}: {feature}")]
    UnsupportedFeature { position: usize, feature: Feature },
}

fn describe_position(position: &Option<usize>) -> String {
    match position {
        Some(position) => format!("at bit {}", position),
        None => "during schema compilation".to_string(),
    }
}

impl ReplayError {
    /// A violation found while decoding, located at the reader's cursor
    pub fn violation(reader: &BitReader, violation: Violation) -> Self {
        Self::FormatViolation {
            position: Some(reader.position()),
            violation,
        }
    }

    /// A violation found outside of any bit stream
    pub fn schema(violation: Violation) -> Self {
        Self::FormatViolation {
            position: None,
            violation,
        }
    }

    pub fn unsupported(reader: &BitReader, feature: Feature) -> Self {
        Self::UnsupportedFeature {
            position: reader.position(),
            feature,
        }
    }

    /// Bit position the error was raised at, if it came from a stream
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::StreamOverrun { position, .. } => Some(*position),
            Self::FormatViolation { position, .. } => *position,
            Self::UnsupportedFeature { position, .. } => Some(*position),
        }
    }
}

impl From<SerdeErr> for ReplayError {
    fn from(error: SerdeErr) -> Self {
        match error {
            SerdeErr::Overrun {
                position,
                requested,
                remaining,
            } => Self::StreamOverrun {
                position,
                requested,
                remaining,
            },
            SerdeErr::WidthTooLarge {
                position,
                requested,
            } => Self::FormatViolation {
                position: Some(position),
                violation: Violation::ReadWidthTooLarge { requested },
            },
        }
    }
}

/// The specific contradiction behind a [`ReplayError::FormatViolation`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    /// A single read wider than 32 bits was requested
    #[error("read of {requested} bits exceeds the 32 bit maximum")]
    ReadWidthTooLarge { requested: u32 },

    /// Configuration asks for more entity slots than the hard bound allows
    #[error("entity capacity {capacity} exceeds the maximum of {max}")]
    EntityCapacityTooLarge { capacity: usize, max: usize },

    /// A record needing server info arrived before it
    #[error("server info has not been received")]
    ServerInfoMissing,

    /// Server info was received twice for the same replay
    #[error("server info was already received")]
    ServerInfoRepeated,

    /// Server info declared zero classes
    #[error("server info declares max_classes = 0")]
    InvalidMaxClasses,

    /// Send prop carries a type tag outside the known set
    #[error("prop '{table}.{prop}' has unknown type tag {tag}")]
    UnknownTypeTag {
        table: String,
        prop: String,
        tag: u32,
    },

    /// A send table with this name was already registered
    #[error("send table '{name}' registered twice")]
    DuplicateSendTable { name: String },

    /// A nested-table reference or class names a send table that does not exist
    #[error("send table '{name}' does not exist")]
    UnknownSendTable { name: String },

    /// A send table (indirectly) nests itself
    #[error("send table '{name}' nests itself")]
    RecursiveSendTable { name: String },

    /// Array prop without a preceding element descriptor in its table
    #[error("array prop '{table}.{prop}' has no preceding element prop")]
    ArrayWithoutElement { table: String, prop: String },

    /// Prop index points past the end of its table
    #[error("table '{table}' has no prop at index {index}")]
    MissingProp { table: String, index: usize },

    /// Prop bit width is outside what its type can decode
    #[error("prop '{prop}' has invalid bit width {num_bits}")]
    InvalidBitWidth { prop: String, num_bits: u32 },

    /// Class id registered twice
    #[error("class {class_id} registered twice")]
    DuplicateClass { class_id: u32 },

    /// Packet entities arrived before the send tables were compiled
    #[error("send tables have not been compiled")]
    SchemaNotCompiled,

    /// Enter-PVS referenced an unknown class
    #[error("class {class_id} does not exist")]
    UnknownClass { class_id: u32 },

    /// Class names a send table without a compiled flat schema
    #[error("class {class_id} has no flat schema for table '{table}'")]
    MissingFlatSchema { class_id: u32, table: String },

    /// The baseline string table has not been created
    #[error("baseline string table '{name}' does not exist")]
    MissingBaselineTable { name: String },

    /// No baseline entry exists for the class
    #[error("no baseline for class {class_id}")]
    MissingBaseline { class_id: u32 },

    /// Entity id beyond the slot pool
    #[error("entity {entity_id} is outside the {capacity} entity slots")]
    EntityIdOutOfRange { entity_id: u32, capacity: usize },

    /// Update targeted an empty slot
    #[error("entity {entity_id} was updated before it was created")]
    EntityNotCreated { entity_id: u32 },

    /// Leave-PVS flag on a full (non-delta) packet
    #[error("entity {entity_id} left PVS in a full update")]
    LeaveOnFullUpdate { entity_id: u32 },

    /// Field index list pointed past the entity's flat schema
    #[error("entity {entity_id} field index {field_index} exceeds {prop_count} props")]
    FieldIndexOutOfRange {
        entity_id: u32,
        field_index: u32,
        prop_count: usize,
    },

    /// Field index list stepped past the largest representable index
    #[error("field index {field_index} does not fit in 32 bits")]
    FieldIndexOverflow { field_index: i64 },

    /// String property longer than the allowed maximum
    #[error("string of length {length} exceeds maximum {max}")]
    StringTooLong { length: usize, max: usize },

    /// A string table with this name already exists
    #[error("string table '{name}' created twice")]
    DuplicateStringTable { name: String },

    /// Update referenced a string table id that was never created
    #[error("string table {table_id} does not exist")]
    UnknownStringTable { table_id: usize },

    /// String table declared zero max entries
    #[error("string table '{table}' declares max_entries = 0")]
    InvalidMaxEntries { table: String },

    /// Entry id at or beyond the table's max entries
    #[error("string table '{table}' entry {entry_id} exceeds max entries {max_entries}")]
    EntryIdOutOfRange {
        table: String,
        entry_id: u32,
        max_entries: u32,
    },

    /// Entry id skips past the next free entry
    #[error("string table '{table}' entry {entry_id} skips past entry count {count}")]
    EntryIdGap {
        table: String,
        entry_id: u32,
        count: usize,
    },

    /// In-place update sent a key differing from the stored one
    #[error("string table '{table}' entry {entry_id} key mismatch: stored '{stored}', received '{received}'")]
    KeyMismatch {
        table: String,
        entry_id: u32,
        stored: String,
        received: String,
    },

    /// In-place update tried to overwrite a non-empty value
    #[error("string table '{table}' entry {entry_id} already has a value")]
    ValueAlreadySet { table: String, entry_id: u32 },

    /// Append without a key
    #[error("string table '{table}' entry {entry_id} appended without a key")]
    MissingKey { table: String, entry_id: u32 },

    /// Key of an append already exists in the table
    #[error("string table '{table}' already has key '{key}'")]
    DuplicateKey { table: String, key: String },

    /// Entry payload longer than the allowed maximum
    #[error("string table '{table}' value of {length} bytes exceeds maximum {max}")]
    ValueTooLong {
        table: String,
        length: usize,
        max: usize,
    },

    /// Key back-reference points past the key history
    #[error("string table '{table}' key references history slot {from_index} of {history_len}")]
    KeyHistoryOutOfRange {
        table: String,
        from_index: usize,
        history_len: usize,
    },

    /// Key back-reference copies more bytes than the referenced key holds
    #[error("string table '{table}' key copies {from_length} bytes from a {key_length} byte key")]
    KeyPrefixTooLong {
        table: String,
        from_length: usize,
        key_length: usize,
    },
}

/// Branches of the format that are permitted but whose semantics are unverified
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Feature {
    /// CoordMp and CoordMp-low-precision float encodings
    #[error("{variant} float encoding on prop '{prop}'")]
    CoordMpFloat { prop: String, variant: &'static str },

    /// Int64 props encoded against the tick count
    #[error("tickcount-encoded int64 prop '{prop}'")]
    TickcountInt64 { prop: String },

    /// Key flagged as dictionary-encoded in a dictionary-mode update
    #[error("dictionary-encoded key in string table '{table}'")]
    DictionaryEncodedKey { table: String },
}
