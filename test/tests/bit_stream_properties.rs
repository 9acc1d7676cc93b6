/// Property tests for the bit stream primitives
///
/// Key invariants:
/// 1. Any value written at any bit alignment reads back unchanged
/// 2. Both varint encodings decode what the writer produced, for every width class
/// 3. Field index lists survive a write/read cycle

use netprop::{read_field_list, write_field_list};
use netprop_serde::{BitReader, BitWrite, BitWriter};
use proptest::prelude::*;

fn width_and_value() -> impl Strategy<Value = (u32, u32)> {
    (1u32..=32).prop_flat_map(|bits| {
        let max = if bits == 32 { u32::MAX } else { (1u32 << bits) - 1 };
        (Just(bits), 0..=max)
    })
}

// one value from each var_uint extension class, plus the edges between them
fn var_uint_value() -> impl Strategy<Value = u32> {
    prop_oneof![
        0u32..16,
        16u32..256,
        256u32..4096,
        4096u32..=u32::MAX,
        Just(15u32),
        Just(255u32),
        Just(4095u32),
        Just(u32::MAX),
    ]
}

proptest! {
    #[test]
    fn read_bits_at_any_alignment((bits, value) in width_and_value(), offset in 0u32..8) {
        let mut writer = BitWriter::new();
        writer.write_bits(0, offset);
        writer.write_bits(value, bits);
        let buffer = writer.to_bytes();

        let mut reader = BitReader::new(&buffer);
        reader.read_bits(offset).unwrap();
        prop_assert_eq!(reader.read_bits(bits).unwrap(), value);
        prop_assert_eq!(reader.position(), (offset + bits) as usize);
    }

    #[test]
    fn var_uint_reads_back(value in var_uint_value(), offset in 0u32..8) {
        let mut writer = BitWriter::new();
        writer.write_bits(0, offset);
        writer.write_var_uint(value);
        let buffer = writer.to_bytes();

        let mut reader = BitReader::new(&buffer);
        reader.read_bits(offset).unwrap();
        prop_assert_eq!(reader.read_var_uint().unwrap(), value);
    }

    #[test]
    fn var35_reads_back(value in any::<u32>()) {
        let mut writer = BitWriter::new();
        writer.write_var35(value);
        let buffer = writer.to_bytes();

        let mut reader = BitReader::new(&buffer);
        prop_assert_eq!(reader.read_var35().unwrap(), value);
        prop_assert_eq!(reader.position(), buffer.len() * 8);
    }

    #[test]
    fn var35_stops_after_five_groups(groups in proptest::collection::vec(0u8..0x80, 5)) {
        // continuation bit set on all five groups; a sixth byte must stay unread
        let mut buffer: Vec<u8> = groups.iter().map(|group| group | 0x80).collect();
        buffer.push(0xFF);

        let mut reader = BitReader::new(&buffer);
        let expected = groups
            .iter()
            .enumerate()
            .fold(0u32, |value, (index, group)| {
                value | u32::from(*group).wrapping_shl(7 * index as u32)
            });
        prop_assert_eq!(reader.read_var35().unwrap(), expected);
        prop_assert_eq!(reader.position(), 40);
    }

    #[test]
    fn field_lists_read_back(mut indices in proptest::collection::vec(0u32..2000, 0..40)) {
        indices.sort_unstable();
        indices.dedup();

        let mut writer = BitWriter::new();
        write_field_list(&mut writer, &indices);
        let buffer = writer.to_bytes();

        prop_assert_eq!(read_field_list(&mut BitReader::new(&buffer)).unwrap(), indices);
    }
}
