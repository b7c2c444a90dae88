use bytes::{Bytes, BytesMut};
use custom_debug_derive::Debug;
use zwave_core::definitions::CommandClasses;
use zwave_core::parse::bytes::{be_u16, be_u8, rest};
use zwave_core::parse::ParseResult;
use zwave_core::serialize::Serializable;

#[derive(Debug, Clone, PartialEq)]
pub struct CCRaw {
    pub cc_id: CommandClasses,
    pub cc_command: Option<u8>,
    // #[debug(with = "hex_fmt")]
    pub payload: Bytes,
}

impl CCRaw {
    pub fn parse(i: &mut Bytes) -> ParseResult<Self> {
        // Peek the first byte to determine whether this CC id is a plain
        // one-byte id or an extended two-byte one, without consuming it
        // twice.
        let first = *i.first().ok_or(zwave_core::parse::ParseError::Incomplete(
            zwave_core::parse::Needed::Size(1),
        ))?;
        let cc_id = if CommandClasses::is_extended(first) {
            let raw = be_u16(i)?;
            CommandClasses::try_from(raw)
                .map_err(|_| zwave_core::parse::ParseError::recoverable(()))?
        } else {
            let raw = be_u8(i)? as u16;
            CommandClasses::try_from(raw)
                .map_err(|_| zwave_core::parse::ParseError::recoverable(()))?
        };

        // All CCs except NoOperation have a CC command
        let cc_command = match cc_id {
            CommandClasses::NoOperation => None,
            _ => Some(be_u8(i)?),
        };
        let payload = rest(i)?;

        Ok(Self {
            cc_id,
            cc_command,
            payload,
        })
    }
}

impl Serializable for CCRaw {
    fn serialize(&self, output: &mut BytesMut) {
        use zwave_core::serialize::bytes::be_u8;

        if self.cc_id.is_extended_cc() {
            zwave_core::serialize::bytes::be_u16(self.cc_id as u16).serialize(output);
        } else {
            be_u8(self.cc_id as u8).serialize(output);
        }
        if let Some(cc_command) = self.cc_command {
            be_u8(cc_command).serialize(output);
        }
        output.extend_from_slice(&self.payload);
    }
}
