use netprop_serde::{BitReader, BitWrite};

use crate::{
    constants::FIELD_LIST_TERMINATOR,
    error::{ReplayError, ReplayResult, Violation},
};

/// Reads a delta-coded list of flat schema indices up to its terminator.
///
/// Each step is either a single set bit meaning "the next index", or a clear
/// bit followed by a var35 gap. A gap of [`FIELD_LIST_TERMINATOR`] ends the
/// list.
pub fn read_field_list(reader: &mut BitReader) -> ReplayResult<Vec<u32>> {
    let mut fields = Vec::new();
    let mut previous: i64 = -1;

    loop {
        let next = if reader.read_bit()? {
            previous + 1
        } else {
            let delta = reader.read_var35()?;
            if delta == FIELD_LIST_TERMINATOR {
                return Ok(fields);
            }
            previous + i64::from(delta) + 1
        };

        let Ok(field) = u32::try_from(next) else {
            return Err(ReplayError::violation(
                reader,
                Violation::FieldIndexOverflow { field_index: next },
            ));
        };
        fields.push(field);
        previous = next;
    }
}

/// Writes `fields`, which must be strictly ascending, followed by the
/// terminator.
pub fn write_field_list<W: BitWrite>(writer: &mut W, fields: &[u32]) {
    let mut previous: i64 = -1;

    for field in fields {
        let field = i64::from(*field);
        if field == previous + 1 {
            writer.write_bit(true);
        } else {
            writer.write_bit(false);
            writer.write_var35((field - previous - 1) as u32);
        }
        previous = field;
    }

    writer.write_bit(false);
    writer.write_var35(FIELD_LIST_TERMINATOR);
}
