use std::collections::HashMap;

use crate::schema::send_prop::PropRef;

/// A prop as it appears in a flattened schema
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlatProp {
    pub prop: PropRef,
    /// `<owning table>.<prop name>`
    pub name: String,
}

/// Informational grouping of flat props by the nested table they came from.
/// `start` and `count` index the flattened list before priority sorting.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchemaGroup {
    pub table: String,
    pub start: usize,
    pub count: usize,
    pub children: Vec<SchemaGroup>,
}

/// Fully inlined, priority-ordered prop list of one send table. Field
/// indices in entity updates address this list.
#[derive(Clone, Debug)]
pub struct FlatSchema {
    name: String,
    props: Vec<FlatProp>,
    lookup: HashMap<String, usize>,
    root: SchemaGroup,
}

impl FlatSchema {
    pub fn new(name: &str, props: Vec<FlatProp>, root: SchemaGroup) -> Self {
        let mut lookup = HashMap::with_capacity(props.len());
        for (index, prop) in props.iter().enumerate() {
            // the same table may be reached twice; the first one wins
            lookup.entry(prop.name.clone()).or_insert(index);
        }

        Self {
            name: name.to_string(),
            props,
            lookup,
            root,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn props(&self) -> &[FlatProp] {
        &self.props
    }

    pub fn prop(&self, index: usize) -> Option<&FlatProp> {
        self.props.get(index)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    pub fn root(&self) -> &SchemaGroup {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }
}
