use netprop::{
    BitWrite, BitWriter, CreateStringTableRecord, Record, UpdateStringTableRecord,
    VALUE_LENGTH_BITS,
};

/// Writes string table entry lists. Every entry uses a whole key; entries
/// without an explicit id follow the previous one.
pub struct StringTableBuilder {
    writer: BitWriter,
    entry_bits: u32,
    count: u32,
}

impl StringTableBuilder {
    pub fn new(entry_bits: u32) -> Self {
        let mut writer = BitWriter::new();
        // dictionary mode off
        writer.write_bit(false);
        Self {
            writer,
            entry_bits,
            count: 0,
        }
    }

    pub fn next(mut self, key: Option<&[u8]>, value: Option<&[u8]>) -> Self {
        self.writer.write_bit(true);
        self.body(key, value);
        self
    }

    pub fn at(mut self, entry_id: u32, key: Option<&[u8]>, value: Option<&[u8]>) -> Self {
        self.writer.write_bit(false);
        self.writer.write_bits(entry_id, self.entry_bits);
        self.body(key, value);
        self
    }

    fn body(&mut self, key: Option<&[u8]>, value: Option<&[u8]>) {
        self.count += 1;
        match key {
            Some(key) => {
                self.writer.write_bit(true);
                self.writer.write_bit(false);
                self.writer.write_cstring(key);
            }
            None => self.writer.write_bit(false),
        }
        match value {
            Some(value) => {
                self.writer.write_bit(true);
                self.writer.write_bits(value.len() as u32, VALUE_LENGTH_BITS);
                self.writer.write_bytes(value);
            }
            None => self.writer.write_bit(false),
        }
    }

    pub fn create(self, name: &str, max_entries: u32) -> Record {
        Record::CreateStringTable(CreateStringTableRecord {
            name: name.to_string(),
            max_entries,
            entry_count: self.count,
            string_data: self.writer.to_bytes(),
            ..CreateStringTableRecord::default()
        })
    }

    pub fn update(self, table_id: usize) -> Record {
        Record::UpdateStringTable(UpdateStringTableRecord {
            table_id,
            changed_count: self.count,
            string_data: self.writer.to_bytes(),
        })
    }
}
