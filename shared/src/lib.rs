//! # Netprop
//! Decodes the entity state of a recorded match: compiles the replay's send
//! tables into flat per-class schemas, then applies baseline and delta
//! entity updates and string table changes, reporting every change to a
//! [`ReplayObserver`].

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use netprop_serde::{BitReader, BitWrite, BitWriter, SerdeErr};

mod config;
mod constants;
mod error;
mod ordered_map;
mod property;
mod protocol;
mod schema;
mod string_table;
mod world;

pub use config::ReplayConfig;
pub use constants::{
    bits_for_count, CHANGES_OFTEN_PRIORITY, DEFAULT_ENTITY_CAPACITY, DELETED_ENTITY_ID_BITS,
    ENTITY_SERIAL_BITS, FIELD_LIST_TERMINATOR, INSTANCE_BASELINE_TABLE, KEY_HISTORY_SIZE,
    MAX_ENTITY_CAPACITY, MAX_KEY_SIZE, MAX_STRING_LENGTH, MAX_VALUE_SIZE, STRING_LENGTH_BITS,
    VALUE_LENGTH_BITS,
};
pub use error::{Feature, ReplayError, ReplayResult, Violation};
pub use ordered_map::{OrderedMap, OrderedMapError};
pub use property::{
    codec::{read_float, read_int, read_int64, read_string, read_vector2, read_vector3},
    PropertyCodec, PropertyValue,
};
pub use protocol::{
    ClassEntry, ClassInfoRecord, CreateStringTableRecord, LoggingObserver, NullObserver,
    PacketEntitiesRecord, Record, ReplayDriver, ReplayObserver, ReplayState, SendPropRecord,
    SendTableRecord, ServerInfoRecord, UpdateStringTableRecord,
};
pub use schema::{
    ClassDescriptor, FlatProp, FlatSchema, FlatSchemas, PropDescriptor, PropFlags, PropRef,
    PropType, SchemaCompiler, SchemaGroup, SchemaTable, SendTables,
};
pub use string_table::{StringTable, StringTableEntry, StringTableFlags, StringTableStore};
pub use world::{read_field_list, write_field_list, Entity, EntitySnapshotStore};
