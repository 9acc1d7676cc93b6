use netprop::{Entity, PropertyValue, ReplayObserver};

/// One observer notification, with the entity state captured at that moment
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Tick(u32),
    Created {
        id: u32,
        class_id: u32,
        properties: Vec<(String, PropertyValue)>,
    },
    Updated {
        id: u32,
        properties: Vec<(String, PropertyValue)>,
    },
    Deleted {
        id: u32,
    },
}

/// Records every notification in order
#[derive(Default)]
pub struct EventLog {
    pub events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(entity: &Entity) -> Vec<(String, PropertyValue)> {
        entity
            .properties()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    /// Ids of deleted entities, in notification order
    pub fn deleted(&self) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Deleted { id } => Some(*id),
                _ => None,
            })
            .collect()
    }
}

impl ReplayObserver for EventLog {
    fn on_tick(&mut self, tick: u32) {
        self.events.push(Event::Tick(tick));
    }

    fn on_entity_created(&mut self, entity: &Entity) {
        self.events.push(Event::Created {
            id: entity.id(),
            class_id: entity.class_id(),
            properties: Self::snapshot(entity),
        });
    }

    fn on_entity_updated(&mut self, entity: &Entity) {
        self.events.push(Event::Updated {
            id: entity.id(),
            properties: Self::snapshot(entity),
        });
    }

    fn on_entity_deleted(&mut self, entity: &Entity) {
        self.events.push(Event::Deleted { id: entity.id() });
    }
}
