//! Key Exchange (KEX) bootstrap dialog (spec.md §4.6, component C6).
//!
//! Each message here is a small codec plus a semantic role in the
//! multi-message handshake that negotiates an S2 scheme/ECDH profile,
//! exchanges ECDH public keys, and transfers network keys. The dialog
//! itself (which message follows which) is sequenced by the interview
//! driver (C7) and the controller commands layer; this module only
//! defines the wire format and the few comparisons the spec calls out
//! (echo equality, grant bitmask popcount).

use bytes::{Bytes, BytesMut};
use proc_macros::{CCValues, TryFromRepr};
use typed_builder::TypedBuilder;
use zwave_core::bitmask::{encode_bit_mask, parse_bit_mask};
use zwave_core::parse::bytes::{be_u8, complete::take};
use zwave_core::parse::{fail_validation, validate};
use zwave_core::prelude::*;
use zwave_core::serialize::{self, SerializableWith, DEFAULT_CAPACITY};

use super::security2::Security2CCCommand;

use crate::commandclass::*;

/// The public-key size for Curve25519 (the only ECDH profile the dialog
/// currently offers, per §4.6 byte 2 "ECDH profile bitmask starting at
/// Curve25519").
pub const PUBLIC_KEY_SIZE: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromRepr)]
#[repr(u8)]
pub enum KexScheme {
    KexScheme1 = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromRepr)]
#[repr(u8)]
pub enum EcdhProfile {
    Curve25519 = 0,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromRepr)]
#[repr(u8)]
pub enum KexFailType {
    Kex = 1,
    Scheme = 2,
    Curves = 3,
    Decrypt = 5,
    WrongSecurityLevel = 6,
    KeyNotGranted = 7,
    NoVerify = 8,
    Cancel = 9,
    Auth = 10,
    Get = 11,
    Verify = 12,
    Report = 13,
}

// ---------------------------------------------------------------------
// KEXGet
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default, TypedBuilder, CCValues)]
pub struct Security2CCKEXGet {}

impl CCBase for Security2CCKEXGet {
    fn expects_response(&self) -> bool {
        true
    }

    fn test_response(&self, response: &CC) -> bool {
        matches!(response, CC::Security2CCKEXReport(_))
    }
}

impl CCId for Security2CCKEXGet {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Security2
    }

    fn cc_command(&self) -> Option<u8> {
        Some(Security2CCCommand::KEXGet as _)
    }
}

impl CCParsable for Security2CCKEXGet {
    fn parse(_i: &mut Bytes, _ctx: CCParsingContext) -> zwave_core::parse::ParseResult<Self> {
        Ok(Self {})
    }
}

impl SerializableWith<&CCEncodingContext> for Security2CCKEXGet {
    fn serialize(&self, _output: &mut BytesMut, _ctx: &CCEncodingContext) {}
}

impl ToLogPayload for Security2CCKEXGet {
    fn to_log_payload(&self) -> LogPayload {
        LogPayload::empty()
    }
}

// ---------------------------------------------------------------------
// KEXReport / KEXSet — shared byte layout (§4.6)
// ---------------------------------------------------------------------

/// The byte-for-byte payload shared by `KEXReport` and `KEXSet`, modulo
/// the echo bit, which both commands carry at bit 0 of byte 0.
fn parse_kex_record(
    i: &mut Bytes,
) -> zwave_core::parse::ParseResult<(bool, bool, Vec<u8>, Vec<u8>, Vec<u8>)> {
    let flags = be_u8(i)?;
    let echo = flags & 0b0000_0001 != 0;
    let request_or_permit_csa = flags & 0b0000_0010 != 0;
    let scheme_mask = take(1usize).parse(i)?;
    let profile_mask = take(1usize).parse(i)?;
    let class_mask = take(1usize).parse(i)?;
    Ok((
        echo,
        request_or_permit_csa,
        scheme_mask.to_vec(),
        profile_mask.to_vec(),
        class_mask.to_vec(),
    ))
}

fn serialize_kex_record(
    echo: bool,
    request_or_permit_csa: bool,
    schemes: &[u8],
    profiles: &[u8],
    classes: &[u8],
    output: &mut BytesMut,
) {
    use serialize::bytes::be_u8;

    let mut flags = 0u8;
    if echo {
        flags |= 0b0000_0001;
    }
    if request_or_permit_csa {
        flags |= 0b0000_0010;
    }
    be_u8(flags).serialize(output);
    be_u8(encode_bit_mask(schemes, 7, 0).first().copied().unwrap_or(0)).serialize(output);
    be_u8(
        encode_bit_mask(profiles, 7, 0)
            .first()
            .copied()
            .unwrap_or(0),
    )
    .serialize(output);
    be_u8(encode_bit_mask(classes, 7, 0).first().copied().unwrap_or(0)).serialize(output);
}

/// All-but-the-echo-bit bytes of a KEXReport/KEXSet, used for the
/// echo-equality check (§8 property 8, §4.6 "must equal the original
/// byte-for-byte (excluding the echo bit)").
fn kex_record_bytes_ignoring_echo(
    request_or_permit_csa: bool,
    schemes: &[u8],
    profiles: &[u8],
    classes: &[u8],
) -> Vec<u8> {
    let mut buf = BytesMut::new();
    serialize_kex_record(false, request_or_permit_csa, schemes, profiles, classes, &mut buf);
    buf.to_vec()
}

#[derive(Debug, Clone, PartialEq, TypedBuilder, CCValues)]
pub struct Security2CCKEXReport {
    pub echo: bool,
    pub request_csa: bool,
    pub supported_kex_schemes: Vec<u8>,
    pub supported_ecdh_profiles: Vec<u8>,
    pub requested_keys: Vec<u8>,
}

impl Security2CCKEXReport {
    /// True iff `self` and `other` describe the same scheme/profile/class
    /// offer, ignoring each one's echo bit.
    pub fn equals_ignoring_echo(&self, other: &Self) -> bool {
        kex_record_bytes_ignoring_echo(
            self.request_csa,
            &self.supported_kex_schemes,
            &self.supported_ecdh_profiles,
            &self.requested_keys,
        ) == kex_record_bytes_ignoring_echo(
            other.request_csa,
            &other.supported_kex_schemes,
            &other.supported_ecdh_profiles,
            &other.requested_keys,
        )
    }
}

impl CCBase for Security2CCKEXReport {}

impl CCId for Security2CCKEXReport {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Security2
    }

    fn cc_command(&self) -> Option<u8> {
        Some(Security2CCCommand::KEXReport as _)
    }
}

impl CCParsable for Security2CCKEXReport {
    fn parse(i: &mut Bytes, _ctx: CCParsingContext) -> zwave_core::parse::ParseResult<Self> {
        let (echo, request_csa, scheme_mask, profile_mask, class_mask) = parse_kex_record(i)?;
        Ok(Self {
            echo,
            request_csa,
            supported_kex_schemes: parse_bit_mask(&scheme_mask, 0),
            supported_ecdh_profiles: parse_bit_mask(&profile_mask, 0),
            requested_keys: parse_bit_mask(&class_mask, 0),
        })
    }
}

impl SerializableWith<&CCEncodingContext> for Security2CCKEXReport {
    fn serialize(&self, output: &mut BytesMut, _ctx: &CCEncodingContext) {
        serialize_kex_record(
            self.echo,
            self.request_csa,
            &self.supported_kex_schemes,
            &self.supported_ecdh_profiles,
            &self.requested_keys,
            output,
        );
    }
}

impl ToLogPayload for Security2CCKEXReport {
    fn to_log_payload(&self) -> LogPayload {
        LogPayloadDict::new()
            .with_entry("echo", self.echo)
            .with_entry("request CSA", self.request_csa)
            .with_entry(
                "supported schemes",
                format!("{:?}", self.supported_kex_schemes),
            )
            .with_entry(
                "supported ECDH profiles",
                format!("{:?}", self.supported_ecdh_profiles),
            )
            .with_entry("requested keys", format!("{:?}", self.requested_keys))
            .into()
    }
}

#[derive(Debug, Clone, PartialEq, TypedBuilder, CCValues)]
pub struct Security2CCKEXSet {
    pub echo: bool,
    pub permit_csa: bool,
    pub selected_kex_scheme: u8,
    pub selected_ecdh_profile: u8,
    pub granted_keys: Vec<u8>,
}

impl Security2CCKEXSet {
    pub fn equals_ignoring_echo(&self, other: &Self) -> bool {
        kex_record_bytes_ignoring_echo(
            self.permit_csa,
            &[self.selected_kex_scheme],
            &[self.selected_ecdh_profile],
            &self.granted_keys,
        ) == kex_record_bytes_ignoring_echo(
            other.permit_csa,
            &[other.selected_kex_scheme],
            &[other.selected_ecdh_profile],
            &other.granted_keys,
        )
    }
}

impl CCBase for Security2CCKEXSet {
    fn expects_response(&self) -> bool {
        // Only the bootstrap-completing echoed KEXSet expects a KEXReport
        // echo back; the caller tracks this via the dialog state, not the
        // codec itself.
        false
    }
}

impl CCId for Security2CCKEXSet {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Security2
    }

    fn cc_command(&self) -> Option<u8> {
        Some(Security2CCCommand::KEXSet as _)
    }
}

impl CCParsable for Security2CCKEXSet {
    fn parse(i: &mut Bytes, _ctx: CCParsingContext) -> zwave_core::parse::ParseResult<Self> {
        let (echo, permit_csa, scheme_mask, profile_mask, class_mask) = parse_kex_record(i)?;
        let schemes = parse_bit_mask(&scheme_mask, 0);
        validate(schemes.len() == 1, "KEXSet must select exactly one KEX scheme")?;
        let profiles = parse_bit_mask(&profile_mask, 0);
        validate(profiles.len() == 1, "KEXSet must select exactly one ECDH profile")?;
        Ok(Self {
            echo,
            permit_csa,
            selected_kex_scheme: schemes[0],
            selected_ecdh_profile: profiles[0],
            granted_keys: parse_bit_mask(&class_mask, 0),
        })
    }
}

impl SerializableWith<&CCEncodingContext> for Security2CCKEXSet {
    fn serialize(&self, output: &mut BytesMut, _ctx: &CCEncodingContext) {
        serialize_kex_record(
            self.echo,
            self.permit_csa,
            &[self.selected_kex_scheme],
            &[self.selected_ecdh_profile],
            &self.granted_keys,
            output,
        );
    }
}

impl ToLogPayload for Security2CCKEXSet {
    fn to_log_payload(&self) -> LogPayload {
        LogPayloadDict::new()
            .with_entry("echo", self.echo)
            .with_entry("permit CSA", self.permit_csa)
            .with_entry("selected scheme", self.selected_kex_scheme)
            .with_entry("selected ECDH profile", self.selected_ecdh_profile)
            .with_entry("granted keys", format!("{:?}", self.granted_keys))
            .into()
    }
}

// ---------------------------------------------------------------------
// KEXFail
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, TypedBuilder, CCValues)]
pub struct Security2CCKEXFail {
    pub kex_fail_type: KexFailType,
}

impl CCBase for Security2CCKEXFail {}

impl CCId for Security2CCKEXFail {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Security2
    }

    fn cc_command(&self) -> Option<u8> {
        Some(Security2CCCommand::KEXFail as _)
    }
}

impl CCParsable for Security2CCKEXFail {
    fn parse(i: &mut Bytes, _ctx: CCParsingContext) -> zwave_core::parse::ParseResult<Self> {
        let raw = be_u8(i)?;
        let Ok(kex_fail_type) = KexFailType::try_from(raw) else {
            return fail_validation(format!("Unknown KEXFail reason {:#04x}", raw));
        };
        Ok(Self { kex_fail_type })
    }
}

impl SerializableWith<&CCEncodingContext> for Security2CCKEXFail {
    fn serialize(&self, output: &mut BytesMut, _ctx: &CCEncodingContext) {
        use serialize::bytes::be_u8;
        be_u8(self.kex_fail_type as u8).serialize(output);
    }
}

impl ToLogPayload for Security2CCKEXFail {
    fn to_log_payload(&self) -> LogPayload {
        LogPayloadDict::new()
            .with_entry("reason", format!("{:?}", self.kex_fail_type))
            .into()
    }
}

/// True iff a `KEXFail` with this reason must itself be S2-encapsulated,
/// per §4.3's requires-encapsulation policy.
pub fn kex_fail_requires_encapsulation(reason: KexFailType) -> bool {
    matches!(
        reason,
        KexFailType::Decrypt
            | KexFailType::WrongSecurityLevel
            | KexFailType::KeyNotGranted
            | KexFailType::NoVerify
    )
}

// ---------------------------------------------------------------------
// PublicKeyReport
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, TypedBuilder, CCValues)]
pub struct Security2CCPublicKeyReport {
    pub including_node: bool,
    pub public_key: Vec<u8>,
}

impl CCBase for Security2CCPublicKeyReport {}

impl CCId for Security2CCPublicKeyReport {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Security2
    }

    fn cc_command(&self) -> Option<u8> {
        Some(Security2CCCommand::PublicKeyReport as _)
    }
}

impl CCParsable for Security2CCPublicKeyReport {
    fn parse(i: &mut Bytes, _ctx: CCParsingContext) -> zwave_core::parse::ParseResult<Self> {
        let flags = be_u8(i)?;
        let including_node = flags & 0b0000_0001 != 0;
        let public_key = take(PUBLIC_KEY_SIZE).parse(i)?.to_vec();
        Ok(Self {
            including_node,
            public_key,
        })
    }
}

impl SerializableWith<&CCEncodingContext> for Security2CCPublicKeyReport {
    fn serialize(&self, output: &mut BytesMut, _ctx: &CCEncodingContext) {
        use serialize::bytes::{be_u8, slice};
        be_u8(if self.including_node { 1 } else { 0 }).serialize(output);
        slice(&self.public_key).serialize(output);
    }
}

impl ToLogPayload for Security2CCPublicKeyReport {
    fn to_log_payload(&self) -> LogPayload {
        LogPayloadDict::new()
            .with_entry("including node", self.including_node)
            .with_entry("public key", format!("0x{}", hex::encode(&self.public_key)))
            .into()
    }
}

// ---------------------------------------------------------------------
// NetworkKeyGet / NetworkKeyReport / NetworkKeyVerify
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, TypedBuilder, CCValues)]
pub struct Security2CCNetworkKeyGet {
    pub requested_key: u8,
}

impl CCBase for Security2CCNetworkKeyGet {
    fn expects_response(&self) -> bool {
        true
    }

    fn test_response(&self, response: &CC) -> bool {
        matches!(response, CC::Security2CCNetworkKeyReport(_))
    }
}

impl CCId for Security2CCNetworkKeyGet {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Security2
    }

    fn cc_command(&self) -> Option<u8> {
        Some(Security2CCCommand::NetworkKeyGet as _)
    }
}

impl CCParsable for Security2CCNetworkKeyGet {
    fn parse(i: &mut Bytes, _ctx: CCParsingContext) -> zwave_core::parse::ParseResult<Self> {
        let requested_key = be_u8(i)?;
        Ok(Self { requested_key })
    }
}

impl SerializableWith<&CCEncodingContext> for Security2CCNetworkKeyGet {
    fn serialize(&self, output: &mut BytesMut, _ctx: &CCEncodingContext) {
        use serialize::bytes::be_u8;
        be_u8(self.requested_key).serialize(output);
    }
}

impl ToLogPayload for Security2CCNetworkKeyGet {
    fn to_log_payload(&self) -> LogPayload {
        LogPayloadDict::new()
            .with_entry("requested key", self.requested_key)
            .into()
    }
}

/// Transfers the permanent network key for one security class, encrypted
/// under the temp key during bootstrap. Per spec.md §9's open question,
/// the upstream source only implements the TX (controller-sends)
/// direction; this supplements a parse (RX) direction as well, so the
/// same struct round-trips when this crate acts as the joining node.
#[derive(Debug, Clone, PartialEq, TypedBuilder, CCValues)]
pub struct Security2CCNetworkKeyReport {
    pub granted_key: u8,
    pub network_key: Vec<u8>,
}

impl CCBase for Security2CCNetworkKeyReport {}

impl CCId for Security2CCNetworkKeyReport {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Security2
    }

    fn cc_command(&self) -> Option<u8> {
        Some(Security2CCCommand::NetworkKeyReport as _)
    }
}

impl CCParsable for Security2CCNetworkKeyReport {
    fn parse(i: &mut Bytes, _ctx: CCParsingContext) -> zwave_core::parse::ParseResult<Self> {
        let granted_key = be_u8(i)?;
        let network_key = take(16usize).parse(i)?.to_vec();
        Ok(Self {
            granted_key,
            network_key,
        })
    }
}

impl SerializableWith<&CCEncodingContext> for Security2CCNetworkKeyReport {
    fn serialize(&self, output: &mut BytesMut, _ctx: &CCEncodingContext) {
        use serialize::bytes::{be_u8, slice};
        be_u8(self.granted_key).serialize(output);
        slice(&self.network_key).serialize(output);
    }
}

impl ToLogPayload for Security2CCNetworkKeyReport {
    fn to_log_payload(&self) -> LogPayload {
        LogPayloadDict::new()
            .with_entry("granted key", self.granted_key)
            .with_entry("network key", "(hidden)")
            .into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, TypedBuilder, CCValues)]
pub struct Security2CCNetworkKeyVerify {}

impl CCBase for Security2CCNetworkKeyVerify {}

impl CCId for Security2CCNetworkKeyVerify {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Security2
    }

    fn cc_command(&self) -> Option<u8> {
        Some(Security2CCCommand::NetworkKeyVerify as _)
    }
}

impl CCParsable for Security2CCNetworkKeyVerify {
    fn parse(_i: &mut Bytes, _ctx: CCParsingContext) -> zwave_core::parse::ParseResult<Self> {
        Ok(Self {})
    }
}

impl SerializableWith<&CCEncodingContext> for Security2CCNetworkKeyVerify {
    fn serialize(&self, _output: &mut BytesMut, _ctx: &CCEncodingContext) {}
}

impl ToLogPayload for Security2CCNetworkKeyVerify {
    fn to_log_payload(&self) -> LogPayload {
        LogPayload::empty()
    }
}

// ---------------------------------------------------------------------
// TransferEnd
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, TypedBuilder, CCValues)]
pub struct Security2CCTransferEnd {
    pub key_verified: bool,
    pub key_request_complete: bool,
}

impl CCBase for Security2CCTransferEnd {}

impl CCId for Security2CCTransferEnd {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Security2
    }

    fn cc_command(&self) -> Option<u8> {
        Some(Security2CCCommand::TransferEnd as _)
    }
}

impl CCParsable for Security2CCTransferEnd {
    fn parse(i: &mut Bytes, _ctx: CCParsingContext) -> zwave_core::parse::ParseResult<Self> {
        let flags = be_u8(i)?;
        Ok(Self {
            key_verified: flags & 0b0000_0001 != 0,
            key_request_complete: flags & 0b0000_0010 != 0,
        })
    }
}

impl SerializableWith<&CCEncodingContext> for Security2CCTransferEnd {
    fn serialize(&self, output: &mut BytesMut, _ctx: &CCEncodingContext) {
        use serialize::bytes::be_u8;
        let mut flags = 0u8;
        if self.key_verified {
            flags |= 0b0000_0001;
        }
        if self.key_request_complete {
            flags |= 0b0000_0010;
        }
        be_u8(flags).serialize(output);
    }
}

impl ToLogPayload for Security2CCTransferEnd {
    fn to_log_payload(&self) -> LogPayload {
        LogPayloadDict::new()
            .with_entry("key verified", self.key_verified)
            .with_entry("key request complete", self.key_request_complete)
            .into()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_kex_set_requires_single_scheme_bit() {
        let mut buf = BytesMut::new();
        use serialize::bytes::be_u8;
        be_u8(0u8).serialize(&mut buf); // flags
        be_u8(0b0000_0110u8).serialize(&mut buf); // two scheme bits set: invalid
        be_u8(0b0000_0001u8).serialize(&mut buf);
        be_u8(0b0000_0010u8).serialize(&mut buf);
        let mut input = buf.freeze();
        let ctx = CCParsingContext::builder().build();
        assert!(Security2CCKEXSet::parse(&mut input, ctx).is_err());
    }

    #[test]
    fn test_kex_report_echo_equality_ignores_echo_bit() {
        let a = Security2CCKEXReport {
            echo: false,
            request_csa: true,
            supported_kex_schemes: vec![1],
            supported_ecdh_profiles: vec![0],
            requested_keys: vec![2, 3],
        };
        let b = Security2CCKEXReport {
            echo: true,
            ..a.clone()
        };
        assert!(a.equals_ignoring_echo(&b));

        let c = Security2CCKEXReport {
            requested_keys: vec![2],
            ..a.clone()
        };
        assert!(!a.equals_ignoring_echo(&c));
    }

    #[test]
    fn test_kex_fail_encapsulation_policy() {
        assert!(kex_fail_requires_encapsulation(KexFailType::Decrypt));
        assert!(kex_fail_requires_encapsulation(KexFailType::NoVerify));
        assert!(!kex_fail_requires_encapsulation(KexFailType::Kex));
    }

    #[test]
    fn test_transfer_end_round_trip() {
        let mut buf = BytesMut::new();
        let ctx = CCEncodingContext::builder().build();
        let cc = Security2CCTransferEnd {
            key_verified: true,
            key_request_complete: false,
        };
        cc.serialize(&mut buf, &ctx);
        let mut input = buf.freeze();
        let parse_ctx = CCParsingContext::builder().build();
        let parsed = Security2CCTransferEnd::parse(&mut input, parse_ctx).unwrap();
        assert_eq!(parsed, cc);
    }
}
