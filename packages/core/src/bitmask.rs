//! Generic helpers for the bitmask and CC-list wire formats shared by
//! several command classes (most notably Security 2's KEX dialog and
//! `CommandsSupportedReport`/`Report`).

use crate::definitions::command_classes::{CommandClasses, COMMAND_CLASS_SUPPORT_CONTROL_MARK};
use crate::parse::bytes::{be_u16, be_u8};
use crate::parse::ParseResult;
use bytes::{Bytes, BytesMut};

/// Encodes a set of small integer values (e.g. KEX scheme numbers, security
/// class numbers) as a little-endian bitmask, one bit per value, LSB of
/// byte 0 representing `start_value`.
pub fn encode_bit_mask(values: &[u8], max_value: u8, start_value: u8) -> Vec<u8> {
    let num_bits = (max_value - start_value + 1) as usize;
    let num_bytes = num_bits.div_ceil(8);
    let mut ret = vec![0u8; num_bytes];
    for &value in values {
        if value < start_value || value > max_value {
            continue;
        }
        let bit = (value - start_value) as usize;
        ret[bit / 8] |= 1 << (bit % 8);
    }
    ret
}

/// Decodes a bitmask produced by [`encode_bit_mask`] back into the list of
/// values whose bit was set, in ascending order.
pub fn parse_bit_mask(mask: &[u8], start_value: u8) -> Vec<u8> {
    let mut ret = Vec::new();
    for (byte_index, byte) in mask.iter().enumerate() {
        for bit in 0..8 {
            if byte & (1 << bit) != 0 {
                ret.push(start_value + (byte_index * 8 + bit) as u8);
            }
        }
    }
    ret
}

fn parse_one_cc_id(input: &mut Bytes) -> ParseResult<u16> {
    // Caller guarantees `input` is non-empty.
    let first = input[0];
    if CommandClasses::is_extended(first) {
        be_u16(input)
    } else {
        be_u8(input).map(|b| b as u16)
    }
}

fn encode_one_cc_id(cc: CommandClasses, output: &mut BytesMut) {
    use bytes::BufMut;
    if cc.is_extended_cc() {
        output.put_u16(cc as u16);
    } else {
        output.put_u8(cc as u8);
    }
}

/// Parses a `supportedCC...controlledCC` list as used by
/// `CommandsSupportedReport`/`Security2CCCommandsSupportedReport`: a run of
/// supported command class IDs, an optional `MARK` byte, then a run of
/// controlled command class IDs. Unknown command class IDs are skipped.
pub fn parse_cc_list(input: &mut Bytes) -> ParseResult<(Vec<CommandClasses>, Vec<CommandClasses>)> {
    let mut supported = Vec::new();
    let mut controlled = Vec::new();
    let mut seen_mark = false;
    while !input.is_empty() {
        if input[0] == COMMAND_CLASS_SUPPORT_CONTROL_MARK {
            let _ = be_u8(input)?;
            seen_mark = true;
            continue;
        }
        let id = parse_one_cc_id(input)?;
        if let Ok(cc) = CommandClasses::try_from(id) {
            if seen_mark {
                controlled.push(cc);
            } else {
                supported.push(cc);
            }
        }
    }
    Ok((supported, controlled))
}

/// Serializes a CC list in the same format read by [`parse_cc_list`].
pub fn encode_cc_list(supported: &[CommandClasses], controlled: &[CommandClasses], output: &mut BytesMut) {
    for &cc in supported {
        encode_one_cc_id(cc, output);
    }
    if !controlled.is_empty() {
        use bytes::BufMut;
        output.put_u8(COMMAND_CLASS_SUPPORT_CONTROL_MARK);
        for &cc in controlled {
            encode_one_cc_id(cc, output);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_bit_mask_round_trip() {
        let values = vec![1u8, 3, 8];
        let encoded = encode_bit_mask(&values, 8, 1);
        let decoded = parse_bit_mask(&encoded, 1);
        assert_eq!(decoded, values);
    }

    #[test]
    fn test_bit_mask_kex_scheme_popcount() {
        // KEX_SCHEME_1 lives at bit 1; KEXSet must select exactly one bit.
        let encoded = encode_bit_mask(&[1], 7, 0);
        let decoded = parse_bit_mask(&encoded, 0);
        assert_eq!(decoded, vec![1]);
        assert_eq!(decoded.len(), 1);
    }

    #[test]
    fn test_cc_list_round_trip() {
        let supported = vec![CommandClasses::Basic, CommandClasses::Security2];
        let controlled = vec![CommandClasses::Version];
        let mut buf = BytesMut::new();
        encode_cc_list(&supported, &controlled, &mut buf);
        let mut input = buf.freeze();
        let (parsed_supported, parsed_controlled) = parse_cc_list(&mut input).unwrap();
        assert_eq!(parsed_supported, supported);
        assert_eq!(parsed_controlled, controlled);
    }

    #[test]
    fn test_cc_list_no_controlled() {
        let supported = vec![CommandClasses::Basic];
        let mut buf = BytesMut::new();
        encode_cc_list(&supported, &[], &mut buf);
        let mut input = buf.freeze();
        let (parsed_supported, parsed_controlled) = parse_cc_list(&mut input).unwrap();
        assert_eq!(parsed_supported, supported);
        assert!(parsed_controlled.is_empty());
    }
}
