use log::info;

use crate::world::Entity;

/// Receives every state change of a replay, synchronously and in decode
/// order. All methods default to doing nothing.
pub trait ReplayObserver {
    fn on_tick(&mut self, _tick: u32) {}

    fn on_entity_created(&mut self, _entity: &Entity) {}

    fn on_entity_updated(&mut self, _entity: &Entity) {}

    /// Called before the slot is cleared, so `entity` still holds its last state
    fn on_entity_deleted(&mut self, _entity: &Entity) {}
}

/// Discards every notification
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl ReplayObserver for NullObserver {}

/// Logs every notification at `info` level, properties included
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingObserver;

impl LoggingObserver {
    fn log_entity(action: &str, entity: &Entity) {
        info!(
            "{} entity {} ({}, class {})",
            action,
            entity.id(),
            entity.schema().name(),
            entity.class_id()
        );
        for (name, value) in entity.properties() {
            info!("  {} = {}", name, value);
        }
    }
}

impl ReplayObserver for LoggingObserver {
    fn on_tick(&mut self, tick: u32) {
        info!("tick {}", tick);
    }

    fn on_entity_created(&mut self, entity: &Entity) {
        Self::log_entity("created", entity);
    }

    fn on_entity_updated(&mut self, entity: &Entity) {
        Self::log_entity("updated", entity);
    }

    fn on_entity_deleted(&mut self, entity: &Entity) {
        info!("deleted entity {}", entity.id());
    }
}
