use netprop::{
    write_field_list, BitWrite, BitWriter, PacketEntitiesRecord, Record, DELETED_ENTITY_ID_BITS,
    ENTITY_SERIAL_BITS,
};

/// Field index list followed by one fixed-width unsigned value per field
#[derive(Clone, Debug, Default)]
pub struct Patch {
    fields: Vec<(u32, u32, u32)>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, index: u32, value: u32, bits: u32) -> Self {
        self.fields.push((index, value, bits));
        self
    }

    pub fn write(&self, writer: &mut BitWriter) {
        let indices: Vec<u32> = self.fields.iter().map(|(index, _, _)| *index).collect();
        write_field_list(writer, &indices);
        for (_, value, bits) in &self.fields {
            writer.write_bits(*value, *bits);
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = BitWriter::new();
        self.write(&mut writer);
        writer.to_bytes()
    }
}

/// Assembles a packet entities record. Entries must be added in ascending id
/// order.
pub struct PacketBuilder {
    writer: BitWriter,
    class_bits: u32,
    last_id: i64,
    entries: u32,
}

impl PacketBuilder {
    pub fn new(class_bits: u32) -> Self {
        Self {
            writer: BitWriter::new(),
            class_bits,
            last_id: -1,
            entries: 0,
        }
    }

    fn header(&mut self, id: u32) {
        let skip = i64::from(id) - self.last_id - 1;
        assert!(skip >= 0, "entity ids must ascend");
        self.writer.write_var_uint(skip as u32);
        self.last_id = i64::from(id);
        self.entries += 1;
    }

    pub fn enter(mut self, id: u32, class_id: u32, serial: u32, delta: Patch) -> Self {
        self.header(id);
        self.writer.write_bit(false);
        self.writer.write_bit(true);
        self.writer.write_bits(class_id, self.class_bits);
        self.writer.write_bits(serial, ENTITY_SERIAL_BITS);
        delta.write(&mut self.writer);
        self
    }

    pub fn delta(mut self, id: u32, delta: Patch) -> Self {
        self.header(id);
        self.writer.write_bit(false);
        self.writer.write_bit(false);
        delta.write(&mut self.writer);
        self
    }

    pub fn leave(mut self, id: u32, delete: bool) -> Self {
        self.header(id);
        self.writer.write_bit(true);
        self.writer.write_bit(delete);
        self
    }

    /// A full update: no trailing deletion list
    pub fn full(self) -> Record {
        Record::PacketEntities(PacketEntitiesRecord {
            is_delta: false,
            updated_entries: self.entries,
            entity_data: self.writer.to_bytes(),
        })
    }

    /// A delta update ending with the explicit deletion list
    pub fn delta_update(mut self, deletions: &[u32]) -> Record {
        for id in deletions {
            self.writer.write_bit(true);
            self.writer.write_bits(*id, DELETED_ENTITY_ID_BITS);
        }
        self.writer.write_bit(false);

        Record::PacketEntities(PacketEntitiesRecord {
            is_delta: true,
            updated_entries: self.entries,
            entity_data: self.writer.to_bytes(),
        })
    }
}
