use netprop_serde::BitReader;

use crate::{
    config::ReplayConfig,
    constants::{bits_for_count, STRING_LENGTH_BITS},
    error::{Feature, ReplayError, ReplayResult, Violation},
    property::value::PropertyValue,
    schema::{PropDescriptor, PropFlags, PropType, SchemaTable},
};

const COORD_INTEGER_BITS: u32 = 14;
const COORD_FRACTION_BITS: u32 = 5;
const COORD_MP_INTEGRAL_BITS: u32 = 12;
const NORMAL_MAGNITUDE_BITS: u32 = 11;
const NORMAL_RESOLUTION: f64 = 1.0 / 2048.0;
const CELL_COORD_FRACTION_BITS: u32 = 5;
const CELL_COORD_LOW_PRECISION_FRACTION_BITS: u32 = 3;
const INT64_HIGH_BITS: u32 = 32;

/// Decodes property values off a bit stream. Holds only limits; all decode
/// state lives in the reader.
#[derive(Clone, Debug)]
pub struct PropertyCodec {
    max_string_length: usize,
}

impl PropertyCodec {
    pub fn new(config: &ReplayConfig) -> Self {
        Self {
            max_string_length: config.max_string_length,
        }
    }

    /// Decodes the prop declared at `index` in `table`. Arrays decode their
    /// elements with the prop declared right before them.
    pub fn decode(
        &self,
        reader: &mut BitReader,
        table: &SchemaTable,
        index: usize,
    ) -> ReplayResult<PropertyValue> {
        let Some(prop) = table.prop(index) else {
            return Err(ReplayError::violation(
                reader,
                Violation::MissingProp {
                    table: table.name.clone(),
                    index,
                },
            ));
        };

        let value = match prop.prop_type {
            PropType::Int => PropertyValue::Int(read_int(reader, prop)?),
            PropType::Float => PropertyValue::Float(read_float(reader, prop)?),
            PropType::Vector3 => PropertyValue::Vector3(read_vector3(reader, prop)?),
            PropType::Vector2 => PropertyValue::Vector2(read_vector2(reader, prop)?),
            PropType::String => {
                PropertyValue::String(read_string(reader, self.max_string_length)?)
            }
            PropType::Array => self.read_array(reader, table, index)?,
            PropType::Int64 => PropertyValue::Int64(read_int64(reader, prop)?),
            PropType::NestedTable => {
                // nested tables are flattened away before decoding
                return Err(ReplayError::violation(
                    reader,
                    Violation::UnknownTypeTag {
                        table: table.name.clone(),
                        prop: prop.name.clone(),
                        tag: prop.prop_type.tag(),
                    },
                ));
            }
        };

        Ok(value)
    }

    fn read_array(
        &self,
        reader: &mut BitReader,
        table: &SchemaTable,
        index: usize,
    ) -> ReplayResult<PropertyValue> {
        let element = table.element_of(index)?;
        let array = table.prop(index).map(|prop| prop.num_elements).unwrap_or(0);

        let count = reader.read_bits(bits_for_count(array.saturating_add(1)))?;
        let mut elements = Vec::with_capacity(count as usize);
        for _ in 0..count {
            elements.push(self.decode(reader, table, index - 1)?);
        }

        Ok(PropertyValue::Array {
            element_type: element.prop_type,
            elements,
        })
    }
}

pub fn read_int(reader: &mut BitReader, prop: &PropDescriptor) -> ReplayResult<i64> {
    if prop.flags.contains(PropFlags::ENCODED_AGAINST_TICKCOUNT) {
        let value = reader.read_var35()?;
        if prop.is_unsigned() {
            return Ok(i64::from(value));
        }
        // zig-zag
        let decoded = (value & 1).wrapping_neg() ^ (value >> 1);
        return Ok(i64::from(decoded as i32));
    }

    let value = reader.read_bits(prop.num_bits)?;
    if prop.is_unsigned() || prop.num_bits == 0 {
        return Ok(i64::from(value));
    }

    let signer = 0x8000_0000u32 >> (32 - prop.num_bits);
    let extended = (value ^ signer).wrapping_sub(signer);
    Ok(i64::from(extended as i32))
}

/// Float decode; the first matching encoding flag wins.
pub fn read_float(reader: &mut BitReader, prop: &PropDescriptor) -> ReplayResult<f32> {
    let flags = prop.flags;

    if flags.contains(PropFlags::COORD) {
        read_coord(reader)
    } else if flags.contains(PropFlags::COORD_MP) {
        Err(coord_mp_unsupported(reader, prop, "CoordMp"))
    } else if flags.contains(PropFlags::COORD_MP_LOW_PRECISION) {
        Err(coord_mp_unsupported(reader, prop, "CoordMpLowPrecision"))
    } else if flags.contains(PropFlags::COORD_MP_INTEGRAL) {
        read_coord_mp_integral(reader)
    } else if flags.contains(PropFlags::NO_SCALE) {
        Ok(f32::from_bits(reader.read_bits(32)?))
    } else if flags.contains(PropFlags::NORMAL) {
        read_normal(reader)
    } else if flags.contains(PropFlags::CELL_COORD) {
        read_cell_coord(reader, prop.num_bits, CELL_COORD_FRACTION_BITS)
    } else if flags.contains(PropFlags::CELL_COORD_LOW_PRECISION) {
        read_cell_coord(reader, prop.num_bits, CELL_COORD_LOW_PRECISION_FRACTION_BITS)
    } else if flags.contains(PropFlags::CELL_COORD_INTEGRAL) {
        let value = reader.read_bits(prop.num_bits)?;
        Ok(unsigned_to_f64(value) as f32)
    } else {
        read_ranged(reader, prop)
    }
}

fn coord_mp_unsupported(
    reader: &BitReader,
    prop: &PropDescriptor,
    variant: &'static str,
) -> ReplayError {
    ReplayError::unsupported(
        reader,
        Feature::CoordMpFloat {
            prop: prop.name.clone(),
            variant,
        },
    )
}

fn read_coord(reader: &mut BitReader) -> ReplayResult<f32> {
    let has_integer = reader.read_bit()?;
    let has_fraction = reader.read_bit()?;

    if !has_integer && !has_fraction {
        return Ok(0.0);
    }

    let negative = reader.read_bit()?;
    let integer = if has_integer {
        reader.read_bits(COORD_INTEGER_BITS)? + 1
    } else {
        0
    };
    let fraction = if has_fraction {
        reader.read_bits(COORD_FRACTION_BITS)?
    } else {
        0
    };

    let value = f64::from(integer) + f64::from(fraction) / 32.0;
    let value = if negative { -value } else { value };
    Ok(value as f32)
}

/// The leading in-bounds bit is read but never changes the magnitude width.
fn read_coord_mp_integral(reader: &mut BitReader) -> ReplayResult<f32> {
    let _in_bounds = reader.read_bit()?;
    let has_value = reader.read_bit()?;

    if !has_value {
        return Ok(0.0);
    }

    // low bit is the sign
    let value = reader.read_bits(COORD_MP_INTEGRAL_BITS)?;
    let magnitude = f64::from((value >> 1) + 1);

    let value = if value & 1 == 1 { -magnitude } else { magnitude };
    Ok(value as f32)
}

fn read_normal(reader: &mut BitReader) -> ReplayResult<f32> {
    let negative = reader.read_bit()?;
    let magnitude = reader.read_bits(NORMAL_MAGNITUDE_BITS)?;

    let value = unsigned_to_f64(magnitude) * NORMAL_RESOLUTION;
    let value = if negative { -value } else { value };
    Ok(value as f32)
}

fn read_cell_coord(reader: &mut BitReader, num_bits: u32, fraction_bits: u32) -> ReplayResult<f32> {
    let integer = reader.read_bits(num_bits)?;
    let fraction = reader.read_bits(fraction_bits)?;

    let resolution = 1.0 / f64::from(1u32 << fraction_bits);
    Ok((f64::from(integer) + f64::from(fraction) * resolution) as f32)
}

fn read_ranged(reader: &mut BitReader, prop: &PropDescriptor) -> ReplayResult<f32> {
    let raw = reader.read_bits(prop.num_bits)?;
    let divisor = ((1u64 << prop.num_bits) - 1) as f32;
    if divisor == 0.0 {
        return Ok(prop.low_value);
    }

    let fraction = raw as f32 / divisor;
    Ok(fraction * (prop.high_value - prop.low_value) + prop.low_value)
}

/// Reads the raw bits as a signed word, then adds 2^32 back when bit 31 was set.
fn unsigned_to_f64(raw: u32) -> f64 {
    let mut value = f64::from(raw as i32);
    if value < 0.0 {
        value += 4_294_967_296.0;
    }
    value
}

pub fn read_vector3(reader: &mut BitReader, prop: &PropDescriptor) -> ReplayResult<[f32; 3]> {
    let x = read_float(reader, prop)?;
    let y = read_float(reader, prop)?;

    let z = if prop.flags.contains(PropFlags::NORMAL) {
        let negative = reader.read_bit()?;
        let length = x * x + y * y;
        let z = if length >= 1.0 {
            0.0
        } else {
            (1.0 - length).sqrt()
        };
        if negative {
            -z
        } else {
            z
        }
    } else {
        read_float(reader, prop)?
    };

    Ok([x, y, z])
}

pub fn read_vector2(reader: &mut BitReader, prop: &PropDescriptor) -> ReplayResult<[f32; 2]> {
    let x = read_float(reader, prop)?;
    let y = read_float(reader, prop)?;
    Ok([x, y])
}

pub fn read_string(reader: &mut BitReader, max_length: usize) -> ReplayResult<Vec<u8>> {
    let length = reader.read_bits(STRING_LENGTH_BITS)? as usize;
    if length > max_length {
        return Err(ReplayError::violation(
            reader,
            Violation::StringTooLong {
                length,
                max: max_length,
            },
        ));
    }

    Ok(reader.read_raw(length * 8)?)
}

pub fn read_int64(reader: &mut BitReader, prop: &PropDescriptor) -> ReplayResult<i64> {
    if prop.flags.contains(PropFlags::ENCODED_AGAINST_TICKCOUNT) {
        return Err(ReplayError::unsupported(
            reader,
            Feature::TickcountInt64 {
                prop: prop.name.clone(),
            },
        ));
    }

    let signed = !prop.is_unsigned();
    let header_bits = INT64_HIGH_BITS + u32::from(signed);
    if prop.num_bits < header_bits || prop.num_bits > 64 {
        return Err(ReplayError::violation(
            reader,
            Violation::InvalidBitWidth {
                prop: prop.name.clone(),
                num_bits: prop.num_bits,
            },
        ));
    }

    let negative = signed && reader.read_bit()?;
    let high = u64::from(reader.read_bits(INT64_HIGH_BITS)?);
    let low = u64::from(reader.read_bits(prop.num_bits - header_bits)?);

    let mut value = (high << 32) | low;
    if negative {
        value = value.wrapping_neg();
    }

    Ok(value as i64)
}
