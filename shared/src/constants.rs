/// Hard upper bound on the entity slot pool, whatever the configuration says.
pub const MAX_ENTITY_CAPACITY: usize = 0x3FFF;

/// Default slot count; ids in the trailing deletion list are 11 bits wide.
pub const DEFAULT_ENTITY_CAPACITY: usize = 1 << DELETED_ENTITY_ID_BITS;

/// Priority of the bucket that also captures every changes-often prop.
pub const CHANGES_OFTEN_PRIORITY: u32 = 64;

/// Varint value terminating a field index list.
pub const FIELD_LIST_TERMINATOR: u32 = 0x3FFF;

pub const ENTITY_SERIAL_BITS: u32 = 10;
pub const DELETED_ENTITY_ID_BITS: u32 = 11;

pub const STRING_LENGTH_BITS: u32 = 9;
pub const MAX_STRING_LENGTH: usize = 0x200;

pub const VALUE_LENGTH_BITS: u32 = 14;
pub const MAX_VALUE_SIZE: usize = 0x4000;
pub const MAX_KEY_SIZE: usize = 0x400;

pub const KEY_HISTORY_SIZE: usize = 32;
pub const KEY_HISTORY_INDEX_BITS: u32 = 5;
pub const KEY_HISTORY_LENGTH_BITS: u32 = 5;

pub const INSTANCE_BASELINE_TABLE: &str = "instancebaseline";

/// Number of bits needed to address `count` distinct values, i.e.
/// `ceil(log2(count))`. One value needs zero bits.
pub fn bits_for_count(count: u32) -> u32 {
    if count <= 1 {
        return 0;
    }
    32 - (count - 1).leading_zeros()
}
