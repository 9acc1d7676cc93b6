use std::collections::VecDeque;

use log::{debug, trace};
use netprop_serde::BitReader;

use crate::{
    config::ReplayConfig,
    constants::{KEY_HISTORY_INDEX_BITS, KEY_HISTORY_LENGTH_BITS, VALUE_LENGTH_BITS},
    error::{Feature, ReplayError, ReplayResult, Violation},
    ordered_map::OrderedMap,
    string_table::table::{StringTable, StringTableFlags},
};

/// Every string table of a replay, addressable by name or by creation order
/// (the table id used by update records).
pub struct StringTableStore {
    tables: OrderedMap<String, StringTable>,
    max_value_size: usize,
    max_key_size: usize,
    key_history_size: usize,
}

impl StringTableStore {
    pub fn new(config: &ReplayConfig) -> Self {
        Self {
            tables: OrderedMap::new(),
            max_value_size: config.max_value_size,
            max_key_size: config.max_key_size,
            key_history_size: config.key_history_size,
        }
    }

    /// Registers a new table and returns its id.
    pub fn create_table(&mut self, table: StringTable) -> ReplayResult<usize> {
        let name = table.name().to_string();
        debug!(
            "string table '{}' created, {} entries max",
            name,
            table.max_entries()
        );
        self.tables
            .insert(name.clone(), table)
            .map_err(|_| ReplayError::schema(Violation::DuplicateStringTable { name }))
    }

    pub fn get(&self, table_id: usize) -> Option<&StringTable> {
        self.tables.get_at(table_id)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&StringTable> {
        self.tables.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StringTable> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Applies `num_entries` entry changes encoded in `data` to table
    /// `table_id`. Tables flagged [`StringTableFlags::SKIP`] are left alone.
    pub fn apply_update(&mut self, table_id: usize, num_entries: u32, data: &[u8]) -> ReplayResult<()> {
        let limits = EntryLimits {
            max_key_size: self.max_key_size,
            max_value_size: self.max_value_size,
        };
        let history_size = self.key_history_size;

        let Some(table) = self.tables.get_at_mut(table_id) else {
            return Err(ReplayError::schema(Violation::UnknownStringTable { table_id }));
        };
        if table.flags().contains(StringTableFlags::SKIP) {
            trace!("skipping update of string table '{}'", table.name());
            return Ok(());
        }

        let mut reader = BitReader::new(data);
        let dictionary_mode = reader.read_bit()?;
        let mut history: VecDeque<Vec<u8>> = VecDeque::with_capacity(history_size);
        let mut entry_id: i64 = -1;

        for _ in 0..num_entries {
            entry_id = if reader.read_bit()? {
                entry_id + 1
            } else {
                i64::from(reader.read_bits(table.entry_bits())?)
            };
            if entry_id >= i64::from(table.max_entries()) {
                return Err(ReplayError::violation(
                    &reader,
                    Violation::EntryIdOutOfRange {
                        table: table.name().to_string(),
                        entry_id: entry_id as u32,
                        max_entries: table.max_entries(),
                    },
                ));
            }

            let key = if reader.read_bit()? {
                let key = limits.read_key(&mut reader, table, &history, dictionary_mode)?;
                if history.len() >= history_size {
                    history.pop_front();
                }
                history.push_back(key.clone());
                Some(key)
            } else {
                None
            };

            let value = if reader.read_bit()? {
                Some(limits.read_value(&mut reader, table)?)
            } else {
                None
            };

            table.apply_entry(&reader, entry_id as u32, key, value)?;
        }

        trace!(
            "string table '{}' now holds {} entries",
            table.name(),
            table.len()
        );
        Ok(())
    }
}

#[derive(Clone, Copy)]
struct EntryLimits {
    max_key_size: usize,
    max_value_size: usize,
}

impl EntryLimits {
    /// Reads a key, either whole or as a prefix of a recent key plus a tail.
    /// In dictionary mode every key starts with one extra bit; only a clear
    /// bit is decodable.
    fn read_key(
        &self,
        reader: &mut BitReader,
        table: &StringTable,
        history: &VecDeque<Vec<u8>>,
        dictionary_mode: bool,
    ) -> ReplayResult<Vec<u8>> {
        if dictionary_mode && reader.read_bit()? {
            return Err(ReplayError::unsupported(
                reader,
                Feature::DictionaryEncodedKey {
                    table: table.name().to_string(),
                },
            ));
        }

        if !reader.read_bit()? {
            return Ok(reader.read_cstring(self.max_key_size)?);
        }

        let from_index = reader.read_bits(KEY_HISTORY_INDEX_BITS)? as usize;
        let from_length = reader.read_bits(KEY_HISTORY_LENGTH_BITS)? as usize;

        let Some(source) = history.get(from_index) else {
            return Err(ReplayError::violation(
                reader,
                Violation::KeyHistoryOutOfRange {
                    table: table.name().to_string(),
                    from_index,
                    history_len: history.len(),
                },
            ));
        };
        if from_length > source.len() {
            return Err(ReplayError::violation(
                reader,
                Violation::KeyPrefixTooLong {
                    table: table.name().to_string(),
                    from_length,
                    key_length: source.len(),
                },
            ));
        }

        let mut key = source[..from_length].to_vec();
        let tail = reader.read_cstring(self.max_key_size.saturating_sub(from_length))?;
        key.extend_from_slice(&tail);
        Ok(key)
    }

    fn read_value(&self, reader: &mut BitReader, table: &StringTable) -> ReplayResult<Vec<u8>> {
        let bit_length = if table.is_fixed_size() {
            table.payload_bit_length()
        } else {
            reader.read_bits(VALUE_LENGTH_BITS)? as usize * 8
        };

        let length = (bit_length + 7) / 8;
        if length > self.max_value_size {
            return Err(ReplayError::violation(
                reader,
                Violation::ValueTooLong {
                    table: table.name().to_string(),
                    length,
                    max: self.max_value_size,
                },
            ));
        }

        Ok(reader.read_raw(bit_length)?)
    }
}
