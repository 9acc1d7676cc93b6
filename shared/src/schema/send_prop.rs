use bitflags::bitflags;

use crate::{
    constants::CHANGES_OFTEN_PRIORITY,
    error::{ReplayError, ReplayResult, Violation},
    protocol::records::SendPropRecord,
};

/// Wire type of a send prop
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropType {
    Int,
    Float,
    Vector3,
    Vector2,
    String,
    Array,
    NestedTable,
    Int64,
}

impl PropType {
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            0 => Some(Self::Int),
            1 => Some(Self::Float),
            2 => Some(Self::Vector3),
            3 => Some(Self::Vector2),
            4 => Some(Self::String),
            5 => Some(Self::Array),
            6 => Some(Self::NestedTable),
            7 => Some(Self::Int64),
            _ => None,
        }
    }

    pub fn tag(self) -> u32 {
        match self {
            Self::Int => 0,
            Self::Float => 1,
            Self::Vector3 => 2,
            Self::Vector2 => 3,
            Self::String => 4,
            Self::Array => 5,
            Self::NestedTable => 6,
            Self::Int64 => 7,
        }
    }
}

bitflags! {
    /// Send prop flags, bit positions as they appear on the wire
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PropFlags: u32 {
        const UNSIGNED = 1 << 0;
        const COORD = 1 << 1;
        const NO_SCALE = 1 << 2;
        const ROUND_DOWN = 1 << 3;
        const ROUND_UP = 1 << 4;
        const NORMAL = 1 << 5;
        const EXCLUDE = 1 << 6;
        const XYZE = 1 << 7;
        const INSIDE_ARRAY = 1 << 8;
        const PROXY_ALWAYS_YES = 1 << 9;
        const IS_VECTOR_ELEM = 1 << 10;
        const COLLAPSIBLE = 1 << 11;
        const COORD_MP = 1 << 12;
        const COORD_MP_LOW_PRECISION = 1 << 13;
        const COORD_MP_INTEGRAL = 1 << 14;
        const CELL_COORD = 1 << 15;
        const CELL_COORD_LOW_PRECISION = 1 << 16;
        const CELL_COORD_INTEGRAL = 1 << 17;
        const CHANGES_OFTEN = 1 << 18;
        const ENCODED_AGAINST_TICKCOUNT = 1 << 19;
    }
}

/// One property declaration inside a send table.
///
/// An `Array` prop's element type is the prop declared immediately before it
/// in the same table; see [`SchemaTable::element_of`](super::SchemaTable::element_of).
#[derive(Clone, Debug, PartialEq)]
pub struct PropDescriptor {
    pub prop_type: PropType,
    pub name: String,
    pub flags: PropFlags,
    pub priority: u32,
    /// Referenced table for `NestedTable` props; for `Exclude` props, the
    /// table owning the excluded prop
    pub table_name: String,
    pub num_elements: u32,
    pub low_value: f32,
    pub high_value: f32,
    pub num_bits: u32,
}

impl PropDescriptor {
    pub fn new(prop_type: PropType, name: &str) -> Self {
        Self {
            prop_type,
            name: name.to_string(),
            flags: PropFlags::empty(),
            priority: 0,
            table_name: String::new(),
            num_elements: 0,
            low_value: 0.0,
            high_value: 0.0,
            num_bits: 0,
        }
    }

    pub fn from_record(table: &str, record: &SendPropRecord) -> ReplayResult<Self> {
        let Some(prop_type) = PropType::from_tag(record.type_tag) else {
            return Err(ReplayError::schema(Violation::UnknownTypeTag {
                table: table.to_string(),
                prop: record.var_name.clone(),
                tag: record.type_tag,
            }));
        };

        Ok(Self {
            prop_type,
            name: record.var_name.clone(),
            flags: PropFlags::from_bits_retain(record.flags),
            priority: record.priority,
            table_name: record.dt_name.clone(),
            num_elements: record.num_elements,
            low_value: record.low_value,
            high_value: record.high_value,
            num_bits: record.num_bits,
        })
    }

    pub fn with_flags(mut self, flags: PropFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_bits(mut self, num_bits: u32) -> Self {
        self.num_bits = num_bits;
        self
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_range(mut self, low_value: f32, high_value: f32) -> Self {
        self.low_value = low_value;
        self.high_value = high_value;
        self
    }

    pub fn with_table(mut self, table_name: &str) -> Self {
        self.table_name = table_name.to_string();
        self
    }

    pub fn with_elements(mut self, num_elements: u32) -> Self {
        self.num_elements = num_elements;
        self
    }

    pub fn is_unsigned(&self) -> bool {
        self.flags.contains(PropFlags::UNSIGNED)
    }

    /// Whether the prop is placed by the priority bucket `priority`.
    /// Changes-often props belong to bucket 64 whatever they declare.
    pub fn in_bucket(&self, priority: u32) -> bool {
        if self.flags.contains(PropFlags::CHANGES_OFTEN) {
            priority == CHANGES_OFTEN_PRIORITY
        } else {
            self.priority == priority
        }
    }
}

/// Stable address of a prop: the owning table's registry position plus the
/// prop's declaration index inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PropRef {
    pub table: usize,
    pub index: usize,
}
