use bitflags::bitflags;
use netprop_serde::BitReader;

use crate::{
    constants::bits_for_count,
    error::{ReplayError, ReplayResult, Violation},
    ordered_map::OrderedMap,
};

bitflags! {
    /// String table flags as sent on creation
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StringTableFlags: u32 {
        /// Precache-only tables; their updates carry nothing this decoder needs
        const SKIP = 1 << 1;
        const FIXED_LENGTH = 1 << 3;
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StringTableEntry {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

/// A named, insertion-ordered key/value table. Entries are addressed by
/// their insertion position, which is also their entry id on the wire.
#[derive(Clone, Debug)]
pub struct StringTable {
    name: String,
    max_entries: u32,
    fixed_size: bool,
    payload_size: u32,
    payload_bits: u32,
    flags: StringTableFlags,
    entry_bits: u32,
    entries: OrderedMap<Vec<u8>, StringTableEntry>,
}

impl StringTable {
    pub fn new(
        name: &str,
        max_entries: u32,
        fixed_size: bool,
        payload_size: u32,
        payload_bits: u32,
        flags: StringTableFlags,
    ) -> ReplayResult<Self> {
        if max_entries == 0 {
            return Err(ReplayError::schema(Violation::InvalidMaxEntries {
                table: name.to_string(),
            }));
        }

        Ok(Self {
            name: name.to_string(),
            max_entries,
            fixed_size: fixed_size || flags.contains(StringTableFlags::FIXED_LENGTH),
            payload_size,
            payload_bits,
            flags,
            entry_bits: bits_for_count(max_entries),
            entries: OrderedMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_entries(&self) -> u32 {
        self.max_entries
    }

    /// Width of an explicit entry id
    pub fn entry_bits(&self) -> u32 {
        self.entry_bits
    }

    pub fn flags(&self) -> StringTableFlags {
        self.flags
    }

    pub fn is_fixed_size(&self) -> bool {
        self.fixed_size
    }

    /// Bit length of every value in a fixed-size table
    pub fn payload_bit_length(&self) -> usize {
        if self.payload_bits > 0 {
            self.payload_bits as usize
        } else {
            self.payload_size as usize * 8
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, entry_id: usize) -> Option<&StringTableEntry> {
        self.entries.get_at(entry_id)
    }

    pub fn get_by_key(&self, key: &[u8]) -> Option<&StringTableEntry> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StringTableEntry> {
        self.entries.values()
    }

    /// Applies one decoded entry. Ids below the current count update in place,
    /// the id equal to the count appends, anything else is a gap.
    pub(crate) fn apply_entry(
        &mut self,
        reader: &BitReader,
        entry_id: u32,
        key: Option<Vec<u8>>,
        value: Option<Vec<u8>>,
    ) -> ReplayResult<()> {
        let count = self.entries.len();
        let index = entry_id as usize;

        if index > count {
            return Err(ReplayError::violation(
                reader,
                Violation::EntryIdGap {
                    table: self.name.clone(),
                    entry_id,
                    count,
                },
            ));
        }

        if index == count {
            let Some(key) = key else {
                return Err(ReplayError::violation(
                    reader,
                    Violation::MissingKey {
                        table: self.name.clone(),
                        entry_id,
                    },
                ));
            };
            let duplicate = || {
                ReplayError::violation(
                    reader,
                    Violation::DuplicateKey {
                        table: self.name.clone(),
                        key: String::from_utf8_lossy(&key).into_owned(),
                    },
                )
            };
            if self.entries.contains_key(&key) {
                return Err(duplicate());
            }
            let entry = StringTableEntry {
                key: key.clone(),
                value: value.unwrap_or_default(),
            };
            self.entries
                .insert(key.clone(), entry)
                .map_err(|_| duplicate())?;
            return Ok(());
        }

        let name = &self.name;
        let Some(entry) = self.entries.get_at_mut(index) else {
            return Err(ReplayError::violation(
                reader,
                Violation::EntryIdGap {
                    table: name.clone(),
                    entry_id,
                    count,
                },
            ));
        };

        if let Some(key) = key {
            if key != entry.key {
                return Err(ReplayError::violation(
                    reader,
                    Violation::KeyMismatch {
                        table: name.clone(),
                        entry_id,
                        stored: String::from_utf8_lossy(&entry.key).into_owned(),
                        received: String::from_utf8_lossy(&key).into_owned(),
                    },
                ));
            }
        }

        if let Some(value) = value {
            // an empty stored value cannot be told apart from one never sent
            if !entry.value.is_empty() {
                return Err(ReplayError::violation(
                    reader,
                    Violation::ValueAlreadySet {
                        table: name.clone(),
                        entry_id,
                    },
                ));
            }
            entry.value = value;
        }

        Ok(())
    }
}
