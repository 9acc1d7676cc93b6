use std::default::Default;

use crate::{
    constants::{
        DEFAULT_ENTITY_CAPACITY, INSTANCE_BASELINE_TABLE, KEY_HISTORY_SIZE, MAX_ENTITY_CAPACITY,
        MAX_KEY_SIZE, MAX_STRING_LENGTH, MAX_VALUE_SIZE,
    },
    error::{ReplayError, ReplayResult, Violation},
};

/// Contains Config properties which will be used while decoding a replay
#[derive(Clone, Debug)]
pub struct ReplayConfig {
    /// Number of entity slots. Ids at or above this are rejected. Must not
    /// exceed [`MAX_ENTITY_CAPACITY`].
    pub entity_capacity: usize,
    /// Name of the string table holding per-class baselines
    pub baseline_table_name: String,
    /// Longest string property accepted, in bytes
    pub max_string_length: usize,
    /// Longest string table value accepted, in bytes
    pub max_value_size: usize,
    /// Buffer size for null-terminated string table keys
    pub max_key_size: usize,
    /// Number of recent keys available for substring back-references
    pub key_history_size: usize,
}

impl ReplayConfig {
    pub fn validate(&self) -> ReplayResult<()> {
        if self.entity_capacity > MAX_ENTITY_CAPACITY {
            return Err(ReplayError::schema(Violation::EntityCapacityTooLarge {
                capacity: self.entity_capacity,
                max: MAX_ENTITY_CAPACITY,
            }));
        }
        Ok(())
    }
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            entity_capacity: DEFAULT_ENTITY_CAPACITY,
            baseline_table_name: INSTANCE_BASELINE_TABLE.to_string(),
            max_string_length: MAX_STRING_LENGTH,
            max_value_size: MAX_VALUE_SIZE,
            max_key_size: MAX_KEY_SIZE,
            key_history_size: KEY_HISTORY_SIZE,
        }
    }
}
