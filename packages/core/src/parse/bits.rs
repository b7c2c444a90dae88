use super::{ParseError, ParseResult, Parser};
use crate::parse::Needed;
use bytes::{Buf, Bytes};
use std::ops::{Add, Shl, Shr};

// Bit-level parsers operate on a (Bytes, usize) pair, where the usize is the
// number of bits already consumed from the first byte of the input. It is
// always in the range 0..=7.
pub type BitInput = (Bytes, usize);

/// Takes `count` bits from the input and interprets them as a big-endian
/// unsigned integer of type `O`.
pub fn take<O, C>(count: C) -> impl Parser<BitInput, O>
where
    O: From<u8> + Add<O, Output = O> + Shl<usize, Output = O> + Shr<usize, Output = O>,
    C: Into<usize>,
{
    let count: usize = count.into();
    move |(input, bit_offset): &mut BitInput| {
        if count == 0 {
            return Ok(0u8.into());
        }

        let mut offset = *bit_offset;

        let needed_bytes = (count + offset).div_ceil(8);
        if input.remaining() < needed_bytes {
            return Err(ParseError::Incomplete(Needed::Size(
                needed_bytes - input.remaining(),
            )));
        }

        let mut ret: O = 0u8.into();
        let mut remaining = count;
        let mut skip_bytes: usize = 0;

        for byte in input.iter().take(needed_bytes) {
            // Discard all bits left of the offset
            let val: O = if offset == 0 {
                *byte
            } else {
                (*byte << offset) >> offset
            }
            .into();

            if remaining <= 8 - offset {
                // There are bits on the right we're not interested in, e.g.
                // remaining = 5, offset = 2
                // ..xxxxx.
                ret = (ret << remaining) + (val >> (8 - offset - remaining));
                offset += remaining;
            } else {
                // There are no remaining bits on the right, e.g.
                // remaining = 6, offset = 2
                // ..xxxxxx
                // or the remaining bits span multiple bytes, e.g.
                // remaining = 7, offset = 2
                // ..xxxxxx | x.......
                ret = (ret << (8 - offset)) + val;
                offset = 0;
                skip_bytes += 1;
            }

            remaining -= 8 - offset;
            if remaining == 0 {
                break;
            }
        }

        input.advance(skip_bytes);
        *bit_offset = offset;

        Ok(ret)
    }
}

/// Wrapper around bit-level parsers to operate on `Bytes`.
/// Parsing starts at bit-offset 0 and discards the partially consumed byte
/// once the wrapped parser is done with it.
pub fn bits<O, P>(parser: P) -> impl Parser<Bytes, O>
where
    P: Parser<BitInput, O>,
{
    move |input: &mut Bytes| {
        let mut bit_input: BitInput = (input.clone(), 0usize);

        let ret = parser.parse(&mut bit_input)?;

        let (mut bytes, offset) = bit_input;
        if offset > 0 {
            bytes.advance(1);
        }
        *input = bytes;

        Ok(ret)
    }
}

pub fn bool(input: &mut BitInput) -> ParseResult<bool> {
    let value: u8 = take(1usize).parse(input)?;
    Ok(value != 0)
}

macro_rules! impl_bit_parsable_for_ux {
    ($base:ty, $($width: expr),*) => {
        $(
            paste::item! {
                impl super::BitParsable for ux::[<u $width>] {
                    fn parse(i: &mut BitInput) -> ParseResult<Self> {
                        let value: $base = take($width as usize).parse(i)?;
                        Ok(Self::new(value))
                    }
                }
            }
        )*
    };
}

impl_bit_parsable_for_ux!(u8, 1, 2, 3, 4, 5, 6, 7);
impl_bit_parsable_for_ux!(u16, 9, 10, 11, 12, 13, 14, 15);
