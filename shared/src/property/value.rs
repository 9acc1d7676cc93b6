use std::{borrow::Cow, fmt};

use crate::schema::PropType;

/// A decoded property, tagged like the prop that produced it
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    /// Sign-extended when the prop is signed, zero-extended otherwise
    Int(i64),
    Float(f32),
    Vector3([f32; 3]),
    Vector2([f32; 2]),
    String(Vec<u8>),
    Array {
        element_type: PropType,
        elements: Vec<PropertyValue>,
    },
    /// Two's-complement bit pattern of the decoded 64-bit value
    Int64(i64),
}

impl PropertyValue {
    pub fn prop_type(&self) -> PropType {
        match self {
            Self::Int(_) => PropType::Int,
            Self::Float(_) => PropType::Float,
            Self::Vector3(_) => PropType::Vector3,
            Self::Vector2(_) => PropType::Vector2,
            Self::String(_) => PropType::String,
            Self::Array { .. } => PropType::Array,
            Self::Int64(_) => PropType::Int64,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_vector3(&self) -> Option<[f32; 3]> {
        match self {
            Self::Vector3(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_vector2(&self) -> Option<[f32; 2]> {
        match self {
            Self::Vector2(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// String contents with invalid UTF-8 replaced
    pub fn to_string_lossy(&self) -> Option<Cow<'_, str>> {
        self.as_bytes().map(String::from_utf8_lossy)
    }

    pub fn as_elements(&self) -> Option<&[PropertyValue]> {
        match self {
            Self::Array { elements, .. } => Some(elements),
            _ => None,
        }
    }

    pub fn as_int64(&self) -> Option<i64> {
        match self {
            Self::Int64(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) | Self::Int64(value) => write!(f, "{}", value),
            Self::Float(value) => write!(f, "{}", value),
            Self::Vector3([x, y, z]) => write!(f, "({}, {}, {})", x, y, z),
            Self::Vector2([x, y]) => write!(f, "({}, {})", x, y),
            Self::String(value) => write!(f, "{:?}", String::from_utf8_lossy(value)),
            Self::Array { elements, .. } => {
                write!(f, "[")?;
                for (index, element) in elements.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
        }
    }
}
