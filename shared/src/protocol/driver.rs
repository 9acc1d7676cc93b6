use std::rc::Rc;

use log::{debug, trace};
use netprop_serde::BitReader;

use crate::{
    config::ReplayConfig,
    constants::{bits_for_count, DELETED_ENTITY_ID_BITS, ENTITY_SERIAL_BITS},
    error::{ReplayError, ReplayResult, Violation},
    ordered_map::OrderedMap,
    protocol::{
        observer::ReplayObserver,
        records::{
            ClassInfoRecord, CreateStringTableRecord, PacketEntitiesRecord, Record,
            SendTableRecord, ServerInfoRecord, UpdateStringTableRecord,
        },
    },
    schema::{ClassDescriptor, FlatSchema, FlatSchemas, SchemaCompiler, SchemaTable, SendTables},
    string_table::{StringTable, StringTableFlags, StringTableStore},
    world::{Entity, EntitySnapshotStore},
};

enum EntityUpdate {
    Enter,
    Leave { delete: bool },
    Delta,
}

fn read_update_kind(reader: &mut BitReader) -> ReplayResult<EntityUpdate> {
    if !reader.read_bit()? {
        if reader.read_bit()? {
            Ok(EntityUpdate::Enter)
        } else {
            Ok(EntityUpdate::Delta)
        }
    } else {
        let delete = reader.read_bit()?;
        Ok(EntityUpdate::Leave { delete })
    }
}

/// Everything known about one replay: schema, classes, string tables and
/// entity slots. Created from the server info record.
pub struct ReplayState {
    config: ReplayConfig,
    max_classes: u32,
    class_bits: u32,
    send_tables: SendTables,
    classes: OrderedMap<u32, ClassDescriptor>,
    schemas: Option<FlatSchemas>,
    string_tables: StringTableStore,
    entities: EntitySnapshotStore,
}

impl ReplayState {
    pub fn new(server_info: &ServerInfoRecord, config: ReplayConfig) -> ReplayResult<Self> {
        config.validate()?;
        if server_info.max_classes == 0 {
            return Err(ReplayError::schema(Violation::InvalidMaxClasses));
        }

        Ok(Self {
            max_classes: server_info.max_classes,
            class_bits: bits_for_count(server_info.max_classes),
            send_tables: SendTables::new(),
            classes: OrderedMap::new(),
            schemas: None,
            string_tables: StringTableStore::new(&config),
            entities: EntitySnapshotStore::new(&config),
            config,
        })
    }

    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    pub fn max_classes(&self) -> u32 {
        self.max_classes
    }

    /// Width of the class index sent with every entering entity
    pub fn class_bits(&self) -> u32 {
        self.class_bits
    }

    pub fn send_tables(&self) -> &SendTables {
        &self.send_tables
    }

    pub fn class(&self, class_id: u32) -> Option<&ClassDescriptor> {
        self.classes.get(&class_id)
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassDescriptor> {
        self.classes.values()
    }

    pub fn is_compiled(&self) -> bool {
        self.schemas.is_some()
    }

    /// Flat schema compiled for the named send table
    pub fn flat_schema(&self, table_name: &str) -> Option<&Rc<FlatSchema>> {
        self.schemas.as_ref()?.get(table_name)
    }

    pub fn string_tables(&self) -> &StringTableStore {
        &self.string_tables
    }

    pub fn entities(&self) -> &EntitySnapshotStore {
        &self.entities
    }

    pub fn entity(&self, id: u32) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Dispatches one record.
    pub fn apply(&mut self, record: &Record, observer: &mut dyn ReplayObserver) -> ReplayResult<()> {
        match record {
            Record::ServerInfo(_) => Err(ReplayError::schema(Violation::ServerInfoRepeated)),
            Record::SendTable(record) => self.register_send_table(record).map(|_| ()),
            Record::ClassInfo(record) => self.register_classes(record),
            Record::CreateStringTable(record) => self.create_string_table(record).map(|_| ()),
            Record::UpdateStringTable(record) => self.update_string_table(record),
            Record::PacketEntities(record) => self.apply_packet_entities(record, observer),
            Record::Tick(tick) => {
                observer.on_tick(*tick);
                Ok(())
            }
        }
    }

    pub fn register_send_table(&mut self, record: &SendTableRecord) -> ReplayResult<usize> {
        let table = SchemaTable::from_record(record)?;
        trace!("send table '{}' with {} props", table.name, table.props().len());
        self.send_tables.insert(table)
    }

    /// Registers every class, then compiles the send tables received so far.
    pub fn register_classes(&mut self, record: &ClassInfoRecord) -> ReplayResult<()> {
        for entry in &record.classes {
            let class = ClassDescriptor::new(entry.class_id, &entry.table_name, &entry.name);
            self.classes
                .insert(entry.class_id, class)
                .map_err(|_| {
                    ReplayError::schema(Violation::DuplicateClass {
                        class_id: entry.class_id,
                    })
                })?;
        }
        debug!("{} classes registered", self.classes.len());

        self.compile()
    }

    /// Compiles every registered send table. Only the first call does work.
    pub fn compile(&mut self) -> ReplayResult<()> {
        if self.schemas.is_some() {
            return Ok(());
        }

        let schemas = SchemaCompiler::new(&self.send_tables).compile_all()?;
        self.schemas = Some(schemas);
        Ok(())
    }

    pub fn create_string_table(&mut self, record: &CreateStringTableRecord) -> ReplayResult<usize> {
        let table = StringTable::new(
            &record.name,
            record.max_entries,
            record.fixed_size,
            record.payload_size,
            record.payload_bits,
            StringTableFlags::from_bits_retain(record.flags),
        )?;

        let table_id = self.string_tables.create_table(table)?;
        self.string_tables
            .apply_update(table_id, record.entry_count, &record.string_data)?;
        Ok(table_id)
    }

    pub fn update_string_table(&mut self, record: &UpdateStringTableRecord) -> ReplayResult<()> {
        self.string_tables
            .apply_update(record.table_id, record.changed_count, &record.string_data)
    }

    /// Walks the entity headers of one packet, creating, updating and
    /// deleting entities in order, then the trailing deletion list of a delta
    /// packet.
    pub fn apply_packet_entities(
        &mut self,
        record: &PacketEntitiesRecord,
        observer: &mut dyn ReplayObserver,
    ) -> ReplayResult<()> {
        let Some(schemas) = self.schemas.as_ref() else {
            return Err(ReplayError::schema(Violation::SchemaNotCompiled));
        };

        let mut reader = BitReader::new(&record.entity_data);
        let mut cursor: i64 = -1;

        for _ in 0..record.updated_entries {
            cursor += i64::from(reader.read_var_uint()?) + 1;
            // out of range ids are rejected by the store
            let entity_id = u32::try_from(cursor).unwrap_or(u32::MAX);

            match read_update_kind(&mut reader)? {
                EntityUpdate::Enter => {
                    let class_id = reader.read_bits(self.class_bits)?;
                    let serial = reader.read_bits(ENTITY_SERIAL_BITS)?;
                    trace!("entity {} enters as class {}", entity_id, class_id);

                    let Some(class) = self.classes.get(&class_id) else {
                        return Err(ReplayError::violation(
                            &reader,
                            Violation::UnknownClass { class_id },
                        ));
                    };
                    let Some(schema) = schemas.get(class.table_name.as_str()) else {
                        return Err(ReplayError::violation(
                            &reader,
                            Violation::MissingFlatSchema {
                                class_id,
                                table: class.table_name.clone(),
                            },
                        ));
                    };

                    let baseline_table = &self.config.baseline_table_name;
                    let Some(baselines) = self.string_tables.get_by_name(baseline_table) else {
                        return Err(ReplayError::violation(
                            &reader,
                            Violation::MissingBaselineTable {
                                name: baseline_table.clone(),
                            },
                        ));
                    };
                    let Some(baseline) = baselines.get_by_key(class_id.to_string().as_bytes())
                    else {
                        return Err(ReplayError::violation(
                            &reader,
                            Violation::MissingBaseline { class_id },
                        ));
                    };

                    let entity = Entity::new(entity_id, class_id, serial, Rc::clone(schema));
                    self.entities.create(
                        &self.send_tables,
                        entity,
                        &mut BitReader::new(&baseline.value),
                        &mut reader,
                        observer,
                    )?;
                }
                EntityUpdate::Leave { delete } => {
                    if !record.is_delta {
                        return Err(ReplayError::violation(
                            &reader,
                            Violation::LeaveOnFullUpdate { entity_id },
                        ));
                    }
                    if delete {
                        self.entities.delete(&reader, entity_id, observer)?;
                    }
                }
                EntityUpdate::Delta => {
                    self.entities
                        .update(&self.send_tables, entity_id, &mut reader, observer)?;
                }
            }
        }

        if record.is_delta {
            while reader.read_bit()? {
                let entity_id = reader.read_bits(DELETED_ENTITY_ID_BITS)?;
                self.entities.delete(&reader, entity_id, observer)?;
            }
        }

        Ok(())
    }
}

/// Feeds records into a [`ReplayState`], creating it from the first server
/// info record.
pub struct ReplayDriver {
    config: ReplayConfig,
    state: Option<ReplayState>,
}

impl ReplayDriver {
    pub fn new(config: ReplayConfig) -> ReplayResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: None,
        })
    }

    pub fn state(&self) -> Option<&ReplayState> {
        self.state.as_ref()
    }

    pub fn apply(&mut self, record: &Record, observer: &mut dyn ReplayObserver) -> ReplayResult<()> {
        match (record, self.state.as_mut()) {
            (Record::Tick(tick), None) => {
                observer.on_tick(*tick);
                Ok(())
            }
            (Record::ServerInfo(server_info), None) => {
                debug!("server info: {} classes", server_info.max_classes);
                self.state = Some(ReplayState::new(server_info, self.config.clone())?);
                Ok(())
            }
            (_, None) => Err(ReplayError::schema(Violation::ServerInfoMissing)),
            (record, Some(state)) => state.apply(record, observer),
        }
    }

    /// Applies records in order, stopping at the first error.
    pub fn apply_all<'r>(
        &mut self,
        records: impl IntoIterator<Item = &'r Record>,
        observer: &mut dyn ReplayObserver,
    ) -> ReplayResult<()> {
        for record in records {
            self.apply(record, observer)?;
        }
        Ok(())
    }
}
