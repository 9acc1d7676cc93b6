use std::rc::Rc;

use crate::{property::PropertyValue, schema::FlatSchema};

/// One occupied entity slot: the class it was created as and the latest
/// decoded value of every property it has received.
#[derive(Clone, Debug)]
pub struct Entity {
    id: u32,
    class_id: u32,
    serial: u32,
    schema: Rc<FlatSchema>,
    properties: Vec<Option<PropertyValue>>,
}

impl Entity {
    pub fn new(id: u32, class_id: u32, serial: u32, schema: Rc<FlatSchema>) -> Self {
        let properties = vec![None; schema.len()];
        Self {
            id,
            class_id,
            serial,
            schema,
            properties,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn class_id(&self) -> u32 {
        self.class_id
    }

    /// Serial number sent on enter; informational only
    pub fn serial(&self) -> u32 {
        self.serial
    }

    pub fn schema(&self) -> &Rc<FlatSchema> {
        &self.schema
    }

    /// Value at flat schema index `index`, if one has been received
    pub fn property(&self, index: usize) -> Option<&PropertyValue> {
        self.properties.get(index).and_then(Option::as_ref)
    }

    /// Value by qualified `<table>.<prop>` name
    pub fn property_by_name(&self, name: &str) -> Option<&PropertyValue> {
        self.property(self.schema.index_of(name)?)
    }

    /// Every received property with its qualified name, in flat schema order
    pub fn properties(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.schema
            .props()
            .iter()
            .zip(self.properties.iter())
            .filter_map(|(flat, value)| Some((flat.name.as_str(), value.as_ref()?)))
    }

    pub(crate) fn set_property(&mut self, index: usize, value: PropertyValue) {
        if let Some(slot) = self.properties.get_mut(index) {
            *slot = Some(value);
        }
    }
}
