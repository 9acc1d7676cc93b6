use std::rc::Rc;

use log::{trace, warn};
use netprop_serde::BitReader;

use crate::{
    config::ReplayConfig,
    error::{ReplayError, ReplayResult, Violation},
    property::PropertyCodec,
    protocol::ReplayObserver,
    schema::SendTables,
    world::{entity::Entity, field_list::read_field_list},
};

/// Fixed pool of entity slots, indexed by entity id. The pool never grows:
/// ids at or beyond the configured capacity are rejected.
pub struct EntitySnapshotStore {
    slots: Vec<Option<Entity>>,
    codec: PropertyCodec,
}

impl EntitySnapshotStore {
    pub fn new(config: &ReplayConfig) -> Self {
        Self {
            slots: (0..config.entity_capacity).map(|_| None).collect(),
            codec: PropertyCodec::new(config),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn get(&self, id: u32) -> Option<&Entity> {
        self.slots.get(id as usize).and_then(Option::as_ref)
    }

    /// Every occupied slot, in id order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.slots.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Fills the slot of `entity`: the baseline is applied in full, then the
    /// delta on top of it. A slot still occupied by an earlier entity is
    /// reported deleted first.
    pub fn create(
        &mut self,
        tables: &SendTables,
        mut entity: Entity,
        baseline: &mut BitReader,
        delta: &mut BitReader,
        observer: &mut dyn ReplayObserver,
    ) -> ReplayResult<()> {
        let index = self.slot_index(delta, entity.id())?;

        if let Some(stale) = self.slots[index].take() {
            warn!(
                "entity {} created over a live entity of class {}",
                stale.id(),
                stale.class_id()
            );
            observer.on_entity_deleted(&stale);
        }

        self.apply_patch(tables, &mut entity, baseline)?;
        self.apply_patch(tables, &mut entity, delta)?;

        trace!(
            "created entity {} as {} (serial {})",
            entity.id(),
            entity.schema().name(),
            entity.serial()
        );
        observer.on_entity_created(&entity);
        self.slots[index] = Some(entity);
        Ok(())
    }

    /// Applies a delta to an existing entity.
    pub fn update(
        &mut self,
        tables: &SendTables,
        id: u32,
        delta: &mut BitReader,
        observer: &mut dyn ReplayObserver,
    ) -> ReplayResult<()> {
        let index = self.slot_index(delta, id)?;

        let Some(mut entity) = self.slots[index].take() else {
            return Err(ReplayError::violation(
                delta,
                Violation::EntityNotCreated { entity_id: id },
            ));
        };

        let result = self.apply_patch(tables, &mut entity, delta);
        if result.is_ok() {
            observer.on_entity_updated(&entity);
        }
        self.slots[index] = Some(entity);
        result.map(|_| ())
    }

    /// Clears the slot. Deleting an empty slot only logs a warning.
    pub fn delete(
        &mut self,
        reader: &BitReader,
        id: u32,
        observer: &mut dyn ReplayObserver,
    ) -> ReplayResult<()> {
        let index = self.slot_index(reader, id)?;

        match self.slots[index].take() {
            Some(entity) => {
                trace!("deleted entity {}", id);
                observer.on_entity_deleted(&entity);
            }
            None => warn!("delete of empty entity slot {}", id),
        }
        Ok(())
    }

    /// Decodes a field index list, then one value per listed field.
    /// Returns the number of fields written.
    pub fn apply_patch(
        &self,
        tables: &SendTables,
        entity: &mut Entity,
        reader: &mut BitReader,
    ) -> ReplayResult<usize> {
        let fields = read_field_list(reader)?;
        let schema = Rc::clone(entity.schema());

        for field in &fields {
            let index = *field as usize;
            let Some(flat) = schema.prop(index) else {
                return Err(ReplayError::violation(
                    reader,
                    Violation::FieldIndexOutOfRange {
                        entity_id: entity.id(),
                        field_index: *field,
                        prop_count: schema.len(),
                    },
                ));
            };
            let Some(table) = tables.table_at(flat.prop.table) else {
                return Err(ReplayError::violation(
                    reader,
                    Violation::MissingProp {
                        table: schema.name().to_string(),
                        index: flat.prop.index,
                    },
                ));
            };

            let value = self.codec.decode(reader, table, flat.prop.index)?;
            trace!("entity {} {} = {}", entity.id(), flat.name, value);
            entity.set_property(index, value);
        }

        Ok(fields.len())
    }

    fn slot_index(&self, reader: &BitReader, id: u32) -> ReplayResult<usize> {
        let index = id as usize;
        if index >= self.slots.len() {
            return Err(ReplayError::violation(
                reader,
                Violation::EntityIdOutOfRange {
                    entity_id: id,
                    capacity: self.slots.len(),
                },
            ));
        }
        Ok(index)
    }
}
