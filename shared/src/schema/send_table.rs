use crate::{
    error::{ReplayError, ReplayResult, Violation},
    ordered_map::OrderedMap,
    protocol::records::SendTableRecord,
    schema::send_prop::{PropDescriptor, PropRef, PropType},
};

/// A send table exactly as declared: props in declaration order.
#[derive(Clone, Debug, PartialEq)]
pub struct SchemaTable {
    pub name: String,
    pub needs_decoder: bool,
    props: Vec<PropDescriptor>,
}

impl SchemaTable {
    pub fn new(name: &str, needs_decoder: bool, props: Vec<PropDescriptor>) -> Self {
        Self {
            name: name.to_string(),
            needs_decoder,
            props,
        }
    }

    pub fn from_record(record: &SendTableRecord) -> ReplayResult<Self> {
        let props = record
            .props
            .iter()
            .map(|prop| PropDescriptor::from_record(&record.name, prop))
            .collect::<ReplayResult<Vec<_>>>()?;

        Ok(Self::new(&record.name, record.needs_decoder, props))
    }

    pub fn props(&self) -> &[PropDescriptor] {
        &self.props
    }

    pub fn prop(&self, index: usize) -> Option<&PropDescriptor> {
        self.props.get(index)
    }

    /// Element descriptor of the `Array` prop at `index`: the prop declared
    /// immediately before it.
    pub fn element_of(&self, index: usize) -> ReplayResult<&PropDescriptor> {
        let element = index
            .checked_sub(1)
            .and_then(|element_index| self.props.get(element_index));

        match (self.props.get(index), element) {
            (Some(prop), Some(element)) if prop.prop_type == PropType::Array => Ok(element),
            (prop, _) => Err(ReplayError::schema(Violation::ArrayWithoutElement {
                table: self.name.clone(),
                prop: prop.map(|prop| prop.name.clone()).unwrap_or_default(),
            })),
        }
    }
}

/// Registry of every send table received for a replay, addressable by name
/// or by registration position.
#[derive(Clone, Debug, Default)]
pub struct SendTables {
    tables: OrderedMap<String, SchemaTable>,
}

impl SendTables {
    pub fn new() -> Self {
        Self {
            tables: OrderedMap::new(),
        }
    }

    pub fn insert(&mut self, table: SchemaTable) -> ReplayResult<usize> {
        let name = table.name.clone();
        self.tables
            .insert(name.clone(), table)
            .map_err(|_| ReplayError::schema(Violation::DuplicateSendTable { name }))
    }

    pub fn get(&self, name: &str) -> Option<&SchemaTable> {
        self.tables.get(name)
    }

    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.tables.position_of(name)
    }

    /// Position of the named table, failing when it was never registered.
    pub fn require(&self, name: &str) -> ReplayResult<usize> {
        self.position_of(name).ok_or_else(|| {
            ReplayError::schema(Violation::UnknownSendTable {
                name: name.to_string(),
            })
        })
    }

    pub fn table_at(&self, position: usize) -> Option<&SchemaTable> {
        self.tables.get_at(position)
    }

    pub fn prop(&self, prop_ref: PropRef) -> Option<&PropDescriptor> {
        self.table_at(prop_ref.table)?.prop(prop_ref.index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SchemaTable> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
