use bytes::{Bytes, BytesMut};
use proc_macros::{CCValues, TryFromRepr};
use typed_builder::TypedBuilder;
use zwave_core::parse::bytes::{be_u8, complete::take};
use zwave_core::parse::{bits, fail_validation, validate};
use zwave_core::prelude::*;
use zwave_core::security::{decrypt_aes_128_ccm, encrypt_aes_128_ccm, SPANState, SecurityClass, MAC_SIZE};
use zwave_core::serialize::{self, SerializableWith, DEFAULT_CAPACITY};

use crate::commandclass::*;
use crate::commandclass_raw::CCRaw;

/// Byte size of an S2 entropy input / SPAN nonce, per the manager.
const EI_SIZE: usize = 16;
/// AES-CCM only consumes a 13-byte nonce, while the SPAN rng produces 16
/// bytes at a time (`SecurityManager2::next_nonce`). The upstream protocol
/// truncates to the first 13 bytes of the SPAN output; this is the same
/// convention real-world S2 stacks use and is applied consistently on both
/// the encrypt and decrypt sides below.
const CCM_NONCE_SIZE: usize = 13;

fn ccm_nonce(span_nonce: &[u8]) -> &[u8] {
    &span_nonce[..CCM_NONCE_SIZE]
}

#[derive(Debug, Clone, Copy, PartialEq, TryFromRepr)]
#[repr(u8)]
pub enum Security2CCCommand {
    NonceGet = 0x01,
    NonceReport = 0x02,
    MessageEncapsulation = 0x03,
    KEXGet = 0x04,
    KEXReport = 0x05,
    KEXSet = 0x06,
    KEXFail = 0x07,
    PublicKeyReport = 0x08,
    NetworkKeyGet = 0x09,
    NetworkKeyReport = 0x0a,
    NetworkKeyVerify = 0x0b,
    TransferEnd = 0x0c,
    CommandsSupportedGet = 0x0d,
    CommandsSupportedReport = 0x0e,
}

// ---------------------------------------------------------------------
// 4.1 Extension codec (C2)
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, TryFromRepr)]
#[repr(u8)]
pub enum Security2ExtensionType {
    SPAN = 1,
    MPAN = 2,
    MGRP = 3,
    MOS = 4,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Security2Extension {
    Span { sender_ei: Vec<u8> },
    Mgrp { group_id: u8 },
    Mpan { body: Vec<u8> },
    Mos,
}

impl Security2Extension {
    fn extension_type(&self) -> Security2ExtensionType {
        match self {
            Security2Extension::Span { .. } => Security2ExtensionType::SPAN,
            Security2Extension::Mgrp { .. } => Security2ExtensionType::MGRP,
            Security2Extension::Mpan { .. } => Security2ExtensionType::MPAN,
            Security2Extension::Mos => Security2ExtensionType::MOS,
        }
    }

    /// Encrypted extensions (currently just MPAN) live in the ciphertext;
    /// everything else is carried in the unencrypted prefix.
    fn is_encrypted(&self) -> bool {
        matches!(self, Security2Extension::Mpan { .. })
    }

    fn body(&self) -> Vec<u8> {
        match self {
            Security2Extension::Span { sender_ei } => sender_ei.clone(),
            Security2Extension::Mgrp { group_id } => vec![*group_id],
            Security2Extension::Mpan { body } => body.clone(),
            Security2Extension::Mos => vec![],
        }
    }
}

const EXTENSION_CRITICAL_BIT: u8 = 0b0000_0001;
const EXTENSION_ENCRYPTED_BIT: u8 = 0b0000_0010;
const EXTENSION_MORE_TO_FOLLOW_BIT: u8 = 0b0000_0100;
const EXTENSION_TYPE_SHIFT: u8 = 3;

fn is_critical_extension(ext_type: u8) -> bool {
    matches!(
        Security2ExtensionType::try_from(ext_type),
        Ok(Security2ExtensionType::SPAN) | Ok(Security2ExtensionType::MGRP)
    )
}

/// Parses one or more extension TLVs, stopping after the first one whose
/// MoreToFollow bit is clear. Returns the extensions and whether any of
/// them was a MOS (multicast out-of-sync) marker.
fn parse_extensions(input: &mut Bytes) -> zwave_core::parse::ParseResult<Vec<Security2Extension>> {
    let mut ret = Vec::new();
    loop {
        let length = be_u8(input)?;
        validate(length >= 2, "Extension length must be at least 2")?;
        let flags = be_u8(input)?;
        let ext_type = flags >> EXTENSION_TYPE_SHIFT;
        let critical = flags & EXTENSION_CRITICAL_BIT != 0;
        let more_to_follow = flags & EXTENSION_MORE_TO_FOLLOW_BIT != 0;
        let body = take((length - 2) as usize).parse(input)?;

        let parsed = match Security2ExtensionType::try_from(ext_type) {
            Ok(Security2ExtensionType::SPAN) => {
                validate(body.len() == EI_SIZE, "SPAN extension must carry a 16-byte EI")?;
                Some(Security2Extension::Span {
                    sender_ei: body.to_vec(),
                })
            }
            Ok(Security2ExtensionType::MGRP) => {
                validate(body.len() == 1, "MGRP extension must carry one group id byte")?;
                Some(Security2Extension::Mgrp { group_id: body[0] })
            }
            Ok(Security2ExtensionType::MPAN) => Some(Security2Extension::Mpan {
                body: body.to_vec(),
            }),
            Ok(Security2ExtensionType::MOS) => Some(Security2Extension::Mos),
            Err(_) => {
                if critical {
                    return fail_validation(format!(
                        "Unsupported critical extension type {:#04x}",
                        ext_type
                    ));
                }
                None
            }
        };
        if let Some(parsed) = parsed {
            ret.push(parsed);
        }

        if !more_to_follow {
            break;
        }
    }
    Ok(ret)
}

/// Serializes a list of extensions, patching the MoreToFollow bit so that
/// only the last item has it clear.
fn encode_extensions(extensions: &[Security2Extension], output: &mut BytesMut) {
    use serialize::bytes::{be_u8, slice};

    for (index, ext) in extensions.iter().enumerate() {
        let more_to_follow = index + 1 < extensions.len();
        let body = ext.body();
        let length = (body.len() + 2) as u8;
        let mut flags = (ext.extension_type() as u8) << EXTENSION_TYPE_SHIFT;
        if is_critical_extension(ext.extension_type() as u8) {
            flags |= EXTENSION_CRITICAL_BIT;
        }
        if ext.is_encrypted() {
            flags |= EXTENSION_ENCRYPTED_BIT;
        }
        if more_to_follow {
            flags |= EXTENSION_MORE_TO_FOLLOW_BIT;
        }

        be_u8(length).serialize(output);
        be_u8(flags).serialize(output);
        slice(&body).serialize(output);
    }
}

// ---------------------------------------------------------------------
// NonceGet / NonceReport (4.4)
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default, TypedBuilder, CCValues)]
pub struct Security2CCNonceGet {}

impl CCBase for Security2CCNonceGet {
    fn expects_response(&self) -> bool {
        true
    }

    fn test_response(&self, response: &CC) -> bool {
        matches!(response, CC::Security2CCNonceReport(_))
    }
}

impl CCId for Security2CCNonceGet {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Security2
    }

    fn cc_command(&self) -> Option<u8> {
        Some(Security2CCCommand::NonceGet as _)
    }
}

impl CCParsable for Security2CCNonceGet {
    fn parse(_i: &mut Bytes, _ctx: CCParsingContext) -> zwave_core::parse::ParseResult<Self> {
        Ok(Self {})
    }
}

impl SerializableWith<&CCEncodingContext> for Security2CCNonceGet {
    fn serialize(&self, _output: &mut BytesMut, _ctx: &CCEncodingContext) {}
}

impl ToLogPayload for Security2CCNonceGet {
    fn to_log_payload(&self) -> LogPayload {
        LogPayload::empty()
    }
}

#[derive(Debug, Clone, PartialEq, TypedBuilder, CCValues)]
pub struct Security2CCNonceReport {
    /// Sender-offering-SPAN: this report carries a fresh `receiverEI`.
    pub sos: bool,
    /// Multicast-out-of-sync: the multicast SPAN needs to be resynced.
    /// Always false here; multicast SPAN is out of scope.
    #[builder(default)]
    pub mos: bool,
    #[builder(default, setter(strip_option))]
    pub receiver_ei: Option<Vec<u8>>,
}

impl CCBase for Security2CCNonceReport {}

impl CCId for Security2CCNonceReport {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Security2
    }

    fn cc_command(&self) -> Option<u8> {
        Some(Security2CCCommand::NonceReport as _)
    }
}

impl CCParsable for Security2CCNonceReport {
    fn parse(i: &mut Bytes, _ctx: CCParsingContext) -> zwave_core::parse::ParseResult<Self> {
        let (mos, sos, _reserved) = bits((
            zwave_core::parse::bits::bool,
            zwave_core::parse::bits::bool,
            zwave_core::parse::bits::take(6usize),
        ))
        .parse(i)?;
        validate(sos || mos, "At least one of SOS/MOS must be set")?;
        let receiver_ei = if sos {
            Some(take(EI_SIZE).parse(i)?.to_vec())
        } else {
            None
        };
        Ok(Self {
            sos,
            mos,
            receiver_ei,
        })
    }
}

impl SerializableWith<&CCEncodingContext> for Security2CCNonceReport {
    fn serialize(&self, output: &mut BytesMut, _ctx: &CCEncodingContext) {
        use serialize::{bits::bits, bytes::slice};

        let mos = self.mos;
        let sos = self.sos;
        bits(move |bo| {
            mos.write(bo);
            sos.write(bo);
            zwave_core::serialize::bits::bits(|bo| {
                ux::u6::new(0).write(bo);
            })
            .serialize_bits(bo);
        })
        .serialize(output);

        if let Some(ei) = &self.receiver_ei {
            slice(ei).serialize(output);
        }
    }
}

impl ToLogPayload for Security2CCNonceReport {
    fn to_log_payload(&self) -> LogPayload {
        let mut dict = LogPayloadDict::new()
            .with_entry("SOS", self.sos)
            .with_entry("MOS", self.mos);
        if let Some(ei) = &self.receiver_ei {
            dict = dict.with_entry("receiver EI", format!("0x{}", hex::encode(ei)));
        }
        dict.into()
    }
}

// ---------------------------------------------------------------------
// CommandsSupportedGet / CommandsSupportedReport (used by the interview
// driver, C7, for security-class discovery per §4.7/S-5)
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default, TypedBuilder, CCValues)]
pub struct Security2CCCommandsSupportedGet {}

impl CCBase for Security2CCCommandsSupportedGet {
    fn expects_response(&self) -> bool {
        true
    }

    fn test_response(&self, response: &CC) -> bool {
        matches!(response, CC::Security2CCCommandsSupportedReport(_))
    }
}

impl CCId for Security2CCCommandsSupportedGet {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Security2
    }

    fn cc_command(&self) -> Option<u8> {
        Some(Security2CCCommand::CommandsSupportedGet as _)
    }
}

impl CCParsable for Security2CCCommandsSupportedGet {
    fn parse(_i: &mut Bytes, _ctx: CCParsingContext) -> zwave_core::parse::ParseResult<Self> {
        Ok(Self {})
    }
}

impl SerializableWith<&CCEncodingContext> for Security2CCCommandsSupportedGet {
    fn serialize(&self, _output: &mut BytesMut, _ctx: &CCEncodingContext) {}
}

impl ToLogPayload for Security2CCCommandsSupportedGet {
    fn to_log_payload(&self) -> LogPayload {
        LogPayload::empty()
    }
}

#[derive(Debug, Clone, PartialEq, TypedBuilder, CCValues)]
pub struct Security2CCCommandsSupportedReport {
    pub supported_cc_s: Vec<CommandClasses>,
}

impl CCBase for Security2CCCommandsSupportedReport {}

impl CCId for Security2CCCommandsSupportedReport {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Security2
    }

    fn cc_command(&self) -> Option<u8> {
        Some(Security2CCCommand::CommandsSupportedReport as _)
    }
}

impl CCParsable for Security2CCCommandsSupportedReport {
    fn parse(i: &mut Bytes, _ctx: CCParsingContext) -> zwave_core::parse::ParseResult<Self> {
        // This report has no MARK/controlled section - it is a plain run
        // of supported CC ids until the payload ends.
        let (supported_cc_s, _) = zwave_core::bitmask::parse_cc_list(i)?;
        Ok(Self { supported_cc_s })
    }
}

impl SerializableWith<&CCEncodingContext> for Security2CCCommandsSupportedReport {
    fn serialize(&self, output: &mut BytesMut, _ctx: &CCEncodingContext) {
        zwave_core::bitmask::encode_cc_list(&self.supported_cc_s, &[], output);
    }
}

impl ToLogPayload for Security2CCCommandsSupportedReport {
    fn to_log_payload(&self) -> LogPayload {
        LogPayloadDict::new()
            .with_entry(
                "supported CCs",
                self.supported_cc_s
                    .iter()
                    .map(|cc| cc.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            )
            .into()
    }
}

/// Whether `cc` must be S2-encapsulated before being sent, per §4.3
/// "Requires-encapsulation policy". `cc` is S0-encapsulated iff its
/// `Security` encapsulation flag is set AND it is not an S0 command AND
/// (if it is itself an S2 command) it is one of the commands that are
/// always encapsulated.
pub fn requires_security2_encapsulation(
    cc_id: CommandClasses,
    command: Option<Security2CCCommand>,
) -> bool {
    use Security2CCCommand::*;

    if cc_id != CommandClasses::Security2 {
        // Non-S2 commands follow the generic `Security` flag, which this
        // helper does not have visibility into; callers consult the CC
        // metadata for that case and only call this helper for S2 ones.
        return false;
    }

    match command {
        Some(CommandsSupportedGet | CommandsSupportedReport) => true,
        Some(NetworkKeyGet | NetworkKeyReport | NetworkKeyVerify) => true,
        Some(TransferEnd) => true,
        // KEXSet/KEXReport with echo=true and KEXFail with a subset of
        // reasons are encapsulated too; since the echo bit and fail reason
        // aren't visible from the command id alone, callers that know
        // they're constructing an echoed/qualifying message should
        // encapsulate directly rather than relying on this helper.
        _ => false,
    }
}

// ---------------------------------------------------------------------
// Message Encapsulation (C5)
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Security2CCMessageEncapsulationState {
    Complete {
        encapsulated: Box<CC>,
    },
    Raw {
        sequence_number: u8,
        unencrypted_extensions: Vec<Security2Extension>,
        encrypted_extensions: Vec<Security2Extension>,
        cc_slice: Bytes,
    },
}

#[derive(Debug, Clone, PartialEq, CCValues)]
pub struct Security2CCMessageEncapsulation {
    state: Security2CCMessageEncapsulationState,
}

impl Security2CCMessageEncapsulation {
    pub fn new(encapsulated: CC) -> Self {
        Self {
            state: Security2CCMessageEncapsulationState::Complete {
                encapsulated: Box::new(encapsulated),
            },
        }
    }

    /// The decapsulated command, if this instance has already been parsed
    /// or constructed from one. `None` for an instance that's still `Raw`.
    pub fn encapsulated(&self) -> Option<&CC> {
        match &self.state {
            Security2CCMessageEncapsulationState::Complete { encapsulated } => Some(encapsulated),
            _ => None,
        }
    }
}

impl CCBase for Security2CCMessageEncapsulation {
    fn expects_response(&self) -> bool {
        match &self.state {
            Security2CCMessageEncapsulationState::Complete { encapsulated } => {
                encapsulated.expects_response()
            }
            _ => false,
        }
    }

    fn test_response(&self, response: &CC) -> bool {
        let Security2CCMessageEncapsulationState::Complete { encapsulated: sent } = &self.state
        else {
            return false;
        };
        let CC::Security2CCMessageEncapsulation(received_cc) = response else {
            return false;
        };
        let Security2CCMessageEncapsulationState::Complete {
            encapsulated: received,
        } = &received_cc.state
        else {
            return false;
        };
        sent.test_response(received)
    }
}

impl CCId for Security2CCMessageEncapsulation {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Security2
    }

    fn cc_command(&self) -> Option<u8> {
        Some(Security2CCCommand::MessageEncapsulation as _)
    }
}

/// Associated authenticated data per §4.3: an 8-byte prefix (sending node,
/// destination, homeId, message length) followed by the plaintext
/// unencrypted-payload prefix exactly as it appears on the wire.
fn build_aad(
    sending_node_id: NodeId,
    destination_id: NodeId,
    home_id: u32,
    message_length: u16,
    unencrypted_prefix: &[u8],
) -> Vec<u8> {
    let mut aad = Vec::with_capacity(8 + unencrypted_prefix.len());
    aad.push(u8::from(sending_node_id));
    aad.push(u8::from(destination_id));
    aad.extend_from_slice(&home_id.to_be_bytes());
    aad.extend_from_slice(&message_length.to_be_bytes());
    aad.extend_from_slice(unencrypted_prefix);
    aad
}

fn unencrypted_prefix(
    sequence_number: u8,
    has_unencrypted_extensions: bool,
    has_encrypted_extensions: bool,
    unencrypted_extensions: &[Security2Extension],
) -> Vec<u8> {
    let mut out = BytesMut::new();
    use serialize::bytes::be_u8;
    be_u8(sequence_number).serialize(&mut out);
    let mut flags = 0u8;
    if has_unencrypted_extensions {
        flags |= 0b0000_0001;
    }
    if has_encrypted_extensions {
        flags |= 0b0000_0010;
    }
    be_u8(flags).serialize(&mut out);
    encode_extensions(unencrypted_extensions, &mut out);
    out.to_vec()
}

impl CCParsable for Security2CCMessageEncapsulation {
    fn parse(i: &mut Bytes, mut ctx: CCParsingContext) -> zwave_core::parse::ParseResult<Self> {
        let peer = ctx.source_node_id;
        let own_node_id = ctx.own_node_id;
        let home_id = ctx.home_id;

        let Some(sec_man) = ctx.security_manager2.take() else {
            return fail_validation(
                "Secure commands (S2) can only be decoded when a SecurityManager2 is available",
            );
        };

        let full_payload = i.clone();
        let sequence_number = be_u8(i)?;
        let (_reserved, has_encrypted_extensions, has_unencrypted_extensions) =
            bits((zwave_core::parse::bits::take(6usize), zwave_core::parse::bits::bool, zwave_core::parse::bits::bool)).parse(i)?;

        {
            let mut mgr = sec_man.write().unwrap();
            if mgr.is_duplicate_singlecast(peer, sequence_number) {
                return fail_validation("Duplicate sequence number (Security2CC_CannotDecode)");
            }
            if mgr.security_class_for(peer).is_none() {
                return fail_validation(
                    "No S2 security class granted for this peer (Security2CC_NoSPAN)",
                );
            }
        }

        let unencrypted_extensions = if has_unencrypted_extensions {
            parse_extensions(i)?
        } else {
            Vec::new()
        };

        validate(
            i.len() >= MAC_SIZE,
            "Incomplete Security 2 encapsulation payload",
        )?;
        let ciphertext_len = i.len() - MAC_SIZE;
        let ciphertext = take(ciphertext_len).parse(i)?;
        let auth_tag = take(MAC_SIZE).parse(i)?;

        let destination_id = own_node_id;
        let message_length = full_payload.len() as u16;
        let prefix = unencrypted_prefix(
            sequence_number,
            has_unencrypted_extensions,
            has_encrypted_extensions,
            &unencrypted_extensions,
        );
        let aad = build_aad(peer, destination_id, home_id, message_length, &prefix);

        let sender_ei = unencrypted_extensions.iter().find_map(|ext| match ext {
            Security2Extension::Span { sender_ei } => Some(sender_ei.clone()),
            _ => None,
        });

        let mut mgr = sec_man.write().unwrap();
        let plaintext = decrypt_with_retry(
            &mut mgr,
            peer,
            sequence_number,
            sender_ei.as_deref(),
            &ciphertext,
            &aad,
            &auth_tag,
        )?;
        mgr.store_sequence_number(peer, sequence_number);
        drop(mgr);

        let mut plaintext = Bytes::from(plaintext);
        let encrypted_extensions = if has_encrypted_extensions {
            parse_extensions(&mut plaintext)?
        } else {
            Vec::new()
        };
        let cc_slice = zwave_core::parse::bytes::rest(&mut plaintext)?;

        Ok(Self {
            state: Security2CCMessageEncapsulationState::Raw {
                sequence_number,
                unencrypted_extensions,
                encrypted_extensions,
                cc_slice,
            },
        })
    }
}

/// Tries to decrypt `ciphertext` against the SPAN reachable by draining up
/// to `DECRYPT_ATTEMPTS` nonces from `mgr`'s established SPAN for `peer`,
/// using `key_ccm`. This is the "fresh-nonce search" shared by the
/// already-established and newly-initialized SPAN cases.
fn try_decrypt_advancing(
    mgr: &mut zwave_core::security::SecurityManager2,
    peer: NodeId,
    key_ccm: &[u8],
    ciphertext: &[u8],
    aad: &[u8],
    auth_tag: &[u8],
) -> Option<Vec<u8>> {
    const DECRYPT_ATTEMPTS: usize = zwave_core::security::DECRYPT_ATTEMPTS;
    for _ in 0..DECRYPT_ATTEMPTS {
        let nonce = mgr.next_nonce(peer, false);
        if let Some(plaintext) = decrypt_aes_128_ccm(key_ccm, ccm_nonce(&nonce), ciphertext, aad, auth_tag) {
            return Some(plaintext);
        }
    }
    None
}

/// Resolves a nonce candidate per §4.3 RX step 6 and attempts decryption,
/// rolling state back on every failed attempt.
fn decrypt_with_retry(
    mgr: &mut zwave_core::security::SecurityManager2,
    peer: NodeId,
    seq: u8,
    sender_ei: Option<&[u8]>,
    ciphertext: &[u8],
    aad: &[u8],
    auth_tag: &[u8],
) -> zwave_core::parse::ParseResult<Vec<u8>> {
    let state = mgr.span_state(peer);

    // `RemoteEI` is treated identically to `None` here: spec.md §9 flags
    // this as an explicit open question ("the specs are not clear") and
    // directs implementers to keep the conservative behavior rather than
    // invent a distinguishing rule.
    if matches!(state, SPANState::None | SPANState::RemoteEI { .. }) {
        return fail_validation("No usable SPAN state for peer (Security2CC_NoSPAN)");
    }

    if let SPANState::Established(_) = &state {
        let keys = mgr.get_keys_for_node(peer).map_err(|e| {
            zwave_core::parse::ParseError::from(zwave_core::parse::ErrorContext::from(e.to_string()))
        })?;
        let key_ccm = keys.key_ccm().to_vec();

        // Attempt 1: the previous-SPAN window (§8 S-4 / testable property 4).
        // Only valid for the immediately-next sequence number (spec.md
        // §4.3 step 6 / §8): `current_span_nonce` itself gates on
        // `seq == previousSeq + 1`, so an out-of-order arrival beyond that
        // falls straight through to the fresh-nonce search below even if a
        // `currentSPAN` is still within its grace period.
        if let Some(current) = mgr.current_span_nonce(peer, seq) {
            if let Some(plaintext) =
                decrypt_aes_128_ccm(&key_ccm, ccm_nonce(&current), ciphertext, aad, auth_tag)
            {
                mgr.clear_current_span(peer);
                return Ok(plaintext);
            }
            mgr.clear_current_span(peer);
        }

        if let Some(plaintext) = try_decrypt_advancing(mgr, peer, &key_ccm, ciphertext, aad, auth_tag) {
            return Ok(plaintext);
        }

        return fail_validation(
            "CCM authentication failed after all decrypt attempts (Security2CC_CannotDecode)",
        );
    }

    // `LocalEI`: this is the very first message after we offered our
    // receiverEI via NonceReport. The peer's senderEI rides along on the
    // SPAN extension; we must derive the SPAN before we can try anything.
    let SPANState::LocalEI { receiver_ei } = state else {
        unreachable!("only None, RemoteEI, Established and LocalEI are possible SPAN states");
    };
    let Some(sender_ei) = sender_ei else {
        return fail_validation("LocalEI state but no SPAN extension on the wire (Security2CC_NoSPAN)");
    };

    if mgr.is_temp_peer(peer) {
        mgr.initialize_temp_span(peer, sender_ei, &receiver_ei)
            .map_err(|e| {
                zwave_core::parse::ParseError::from(zwave_core::parse::ErrorContext::from(e.to_string()))
            })?;
        let temp_keys_ccm = {
            let SPANState::Established(_) = mgr.temp_span_state(peer) else {
                unreachable!("just initialized");
            };
            // Temp SPAN advancement reuses `next_nonce`'s established-SPAN
            // contract, but operates on the *temp* key material, so we
            // fetch the key separately rather than through
            // `get_keys_for_node` (which only knows granted network keys).
            mgr.temp_key_ccm()
                .expect("temp keys must be set before a temp SPAN can be initialized")
                .to_vec()
        };
        if let Some(nonce) = mgr.next_temp_nonce(peer) {
            if let Some(plaintext) =
                decrypt_aes_128_ccm(&temp_keys_ccm, ccm_nonce(&nonce), ciphertext, aad, auth_tag)
            {
                return Ok(plaintext);
            }
        }
        // Restore the pre-trial state so a subsequent retry over the
        // granted-class set (below) starts from a clean LocalEI.
        mgr.set_span_state(peer, SPANState::LocalEI { receiver_ei: receiver_ei.clone() });
    }

    for class in SecurityClass::s2_classes_ascending() {
        if mgr.is_class_known_not_granted(peer, class) {
            continue;
        }
        if !mgr.has_keys_for_security_class(class) {
            continue;
        }
        if mgr
            .initialize_span(peer, class, sender_ei, &receiver_ei)
            .is_err()
        {
            continue;
        }
        let key_ccm = mgr
            .get_keys_for_security_class(class)
            .expect("just checked has_keys_for_security_class")
            .key_ccm()
            .to_vec();
        if let Some(plaintext) = try_decrypt_advancing(mgr, peer, &key_ccm, ciphertext, aad, auth_tag) {
            mgr.grant_security_class(peer, class);
            return Ok(plaintext);
        }
        mgr.set_span_state(peer, SPANState::LocalEI { receiver_ei: receiver_ei.clone() });
    }

    fail_validation("CCM authentication failed for all plausible security classes (Security2CC_CannotDecode)")
}

impl SerializableWith<&CCEncodingContext> for Security2CCMessageEncapsulation {
    fn serialize(&self, output: &mut BytesMut, ctx: &CCEncodingContext) {
        let sec_man = ctx
            .security_manager2
            .as_ref()
            .expect("Secure commands (S2) can only be serialized when a SecurityManager2 is available");
        let peer = ctx.node_id;

        let mut mgr = sec_man.write().unwrap();

        // A freshly-constructed (`Complete`) encapsulation has no wire
        // representation yet: the inner command still needs to be
        // flattened to bytes and a sequence number allocated. This mirrors
        // how `SecurityCCCommandEncapsulationSequence` (S0, security.rs)
        // computes `cc_slice` from `encapsulated_cc.as_raw(&ctx).as_bytes()`
        // right before encoding, rather than at construction time.
        let (sequence_number, mut unencrypted_extensions, encrypted_extensions, cc_slice) =
            match &self.state {
                Security2CCMessageEncapsulationState::Raw {
                    sequence_number,
                    unencrypted_extensions,
                    encrypted_extensions,
                    cc_slice,
                } => (
                    *sequence_number,
                    unencrypted_extensions.clone(),
                    encrypted_extensions.clone(),
                    cc_slice.clone(),
                ),
                Security2CCMessageEncapsulationState::Complete { encapsulated } => (
                    mgr.peek_sequence_number(peer),
                    Vec::new(),
                    Vec::new(),
                    encapsulated.as_raw(ctx).as_bytes(),
                ),
            };
        // The sequence number is only materialized lazily (§4.5); once this
        // encapsulation is actually being turned into wire bytes, the
        // allocation is committed so the next outgoing encapsulation for
        // this peer gets a fresh one.
        mgr.reset_sequence_number(peer);

        // Establish SPAN if we're holding the peer's senderEI but no
        // established SPAN yet (§4.3 TX step 2).
        match mgr.span_state(peer) {
            SPANState::RemoteEI { receiver_ei } => {
                let sender_ei = mgr.generate_nonce(None).to_vec();
                let class = mgr
                    .security_class_for(peer)
                    .unwrap_or(SecurityClass::S2Unauthenticated);
                if mgr.is_temp_peer(peer) {
                    mgr.initialize_temp_span(peer, &sender_ei, &receiver_ei)
                        .expect("temp keys must be set before encapsulating under them");
                } else {
                    mgr.initialize_span(peer, class, &sender_ei, &receiver_ei)
                        .expect("network keys must be configured for the granted class");
                }
                unencrypted_extensions.push(Security2Extension::Span { sender_ei });
            }
            SPANState::None | SPANState::LocalEI { .. } => {
                panic!(
                    "no SPAN; receiver's nonce required (caller must have received a NonceReport first)"
                );
            }
            SPANState::Established(_) => {}
        }

        let has_unencrypted_extensions = !unencrypted_extensions.is_empty();
        let has_encrypted_extensions = !encrypted_extensions.is_empty();

        let mut plaintext = BytesMut::new();
        encode_extensions(&encrypted_extensions, &mut plaintext);
        plaintext.extend_from_slice(&cc_slice);

        let iv = ccm_nonce(&mgr.next_nonce(peer, true)).to_vec();
        let keys = mgr
            .get_keys_for_node(peer)
            .expect("key set must exist for the peer's granted class before encapsulating");
        let key_ccm = keys.key_ccm().to_vec();
        drop(mgr);

        let prefix = unencrypted_prefix(
            sequence_number,
            has_unencrypted_extensions,
            has_encrypted_extensions,
            &unencrypted_extensions,
        );

        // messageLength is only known once the ciphertext length is known,
        // which depends on the plaintext length (they're equal for CCM);
        // the 8-byte AAD prefix plus the unencrypted prefix plus ciphertext
        // plus the 8-byte tag gives the total frame length.
        let message_length =
            (prefix.len() + plaintext.len() + MAC_SIZE) as u16;
        let aad = build_aad(ctx.own_node_id, peer, ctx.home_id, message_length, &prefix);

        let result = encrypt_aes_128_ccm(&key_ccm, &iv, &plaintext, &aad);

        output.extend_from_slice(&prefix);
        output.extend_from_slice(&result.ciphertext);
        output.extend_from_slice(&result.auth_tag);
    }
}

impl ToLogPayload for Security2CCMessageEncapsulation {
    fn to_log_payload(&self) -> LogPayload {
        match &self.state {
            Security2CCMessageEncapsulationState::Complete { encapsulated } => {
                LogPayloadDict::new().with_nested(encapsulated.to_log_payload()).into()
            }
            Security2CCMessageEncapsulationState::Raw {
                sequence_number,
                cc_slice,
                ..
            } => LogPayloadDict::new()
                .with_entry("sequence number", *sequence_number)
                .with_entry("payload", format!("0x{}", hex::encode(cc_slice)))
                .into(),
        }
    }
}

impl CCSession for Security2CCMessageEncapsulation {
    fn session_id(&self) -> Option<u32> {
        None
    }

    fn is_session_complete(&self, _other_ccs: &[CC]) -> bool {
        true
    }

    fn merge_session(&mut self, ctx: CCParsingContext, _other_ccs: Vec<CC>) -> ParseResult<()> {
        if let Security2CCMessageEncapsulationState::Raw { cc_slice, .. } = &self.state {
            let mut full_slice = cc_slice.clone();
            let encapsulated_raw = CCRaw::parse(&mut full_slice)?;
            let encapsulated = CC::try_from_raw(encapsulated_raw, ctx)?;
            self.state = Security2CCMessageEncapsulationState::Complete {
                encapsulated: Box::new(encapsulated),
            };
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_extension_round_trip() {
        let extensions = vec![
            Security2Extension::Span {
                sender_ei: vec![0x55; EI_SIZE],
            },
            Security2Extension::Mgrp { group_id: 3 },
        ];
        let mut buf = BytesMut::new();
        encode_extensions(&extensions, &mut buf);
        let mut input = buf.freeze();
        let parsed = parse_extensions(&mut input).unwrap();
        assert_eq!(parsed, extensions);
    }

    #[test]
    fn test_unknown_noncritical_extension_is_skipped() {
        // type 31 (unused), non-critical, no more-to-follow
        let mut buf = BytesMut::new();
        use serialize::bytes::be_u8;
        let flags = 31u8 << EXTENSION_TYPE_SHIFT;
        be_u8(3u8).serialize(&mut buf);
        be_u8(flags).serialize(&mut buf);
        be_u8(0xAA).serialize(&mut buf);
        let mut input = buf.freeze();
        let parsed = parse_extensions(&mut input).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_nonce_report_requires_sos_or_mos() {
        let mut buf = BytesMut::new();
        use serialize::bytes::be_u8;
        be_u8(0u8).serialize(&mut buf); // all flags clear: neither SOS nor MOS
        let mut input = buf.freeze();
        let ctx = CCParsingContext::builder().build();
        let result = Security2CCNonceReport::parse(&mut input, ctx);
        assert!(result.is_err());
    }

    use std::collections::BTreeMap;
    use std::sync::{Arc, RwLock};
    use zwave_core::security::{NetworkKeySet, SecurityManager2, SecurityManager2Options};

    const CONTROLLER_ID: u16 = 1;
    const NODE_ID: u16 = 5;
    const HOME_ID: u32 = 0xDEAD_BEEF;

    fn manager(own_node_id: u16) -> SecurityManager2 {
        let mut network_keys = BTreeMap::new();
        network_keys.insert(
            SecurityClass::S2AccessControl,
            NetworkKeySet::new(vec![0x42; 16]),
        );
        SecurityManager2::new(SecurityManager2Options {
            own_node_id: NodeId::from(own_node_id),
            network_keys,
        })
    }

    /// Wires up a controller and a node whose SPANs are mutually
    /// established, mirroring S-1/S-2: the node already answered a
    /// `NonceGet` with a `NonceReport(SOS)`, so the node sits in `LocalEI`
    /// and the controller - having stored that `receiverEI` - sits in
    /// `RemoteEI`, both ready to derive the same SPAN.
    fn established_pair() -> (SecurityManager2, SecurityManager2) {
        let mut controller = manager(CONTROLLER_ID);
        let mut node = manager(NODE_ID);

        let peer_of_controller = NodeId::from(NODE_ID);
        let peer_of_node = NodeId::from(CONTROLLER_ID);

        let receiver_ei = node.generate_nonce(Some(peer_of_node));
        controller.store_remote_ei(peer_of_controller, receiver_ei.to_vec());
        // The node already knows which class it expects to use once the
        // controller's senderEI arrives; the controller likewise already
        // considers this peer granted (post-bootstrap steady state).
        controller.grant_security_class(peer_of_controller, SecurityClass::S2AccessControl);

        (controller, node)
    }

    #[test]
    fn test_round_trip_singlecast() {
        let (controller, node) = established_pair();
        let controller = Arc::new(RwLock::new(controller));
        let node = Arc::new(RwLock::new(node));

        let inner = CC::BasicCCGet(BasicCCGet::default());
        let msg = Security2CCMessageEncapsulation::new(inner.clone());

        let enc_ctx = CCEncodingContext::builder()
            .node_id(NodeId::from(NODE_ID))
            .own_node_id(NodeId::from(CONTROLLER_ID))
            .home_id(HOME_ID)
            .security_manager2(controller.clone())
            .build();
        let mut wire = BytesMut::new();
        msg.serialize(&mut wire, &enc_ctx);
        let mut wire = wire.freeze();

        let make_parse_ctx = || {
            CCParsingContext::builder()
                .source_node_id(NodeId::from(CONTROLLER_ID))
                .own_node_id(NodeId::from(NODE_ID))
                .home_id(HOME_ID)
                .security_manager2(node.clone())
                .build()
        };
        let mut decoded =
            Security2CCMessageEncapsulation::parse(&mut wire, make_parse_ctx()).unwrap();
        decoded.merge_session(make_parse_ctx(), vec![]).unwrap();

        assert_eq!(decoded.encapsulated(), Some(&inner));
        // The node must now have granted the class it successfully
        // decrypted under, and recorded the sequence number for dedup.
        assert_eq!(
            node.read().unwrap().security_class_for(NodeId::from(CONTROLLER_ID)),
            Some(SecurityClass::S2AccessControl)
        );
    }

    #[test]
    fn test_duplicate_rejected() {
        let (controller, node) = established_pair();
        let controller = Arc::new(RwLock::new(controller));
        let node = Arc::new(RwLock::new(node));

        let inner = CC::BasicCCGet(BasicCCGet::default());
        let msg = Security2CCMessageEncapsulation::new(inner);

        let enc_ctx = CCEncodingContext::builder()
            .node_id(NodeId::from(NODE_ID))
            .own_node_id(NodeId::from(CONTROLLER_ID))
            .home_id(HOME_ID)
            .security_manager2(controller)
            .build();
        let mut wire = BytesMut::new();
        msg.serialize(&mut wire, &enc_ctx);
        let wire = wire.freeze();

        let parse_ctx = || {
            CCParsingContext::builder()
                .source_node_id(NodeId::from(CONTROLLER_ID))
                .own_node_id(NodeId::from(NODE_ID))
                .home_id(HOME_ID)
                .security_manager2(node.clone())
                .build()
        };

        let mut first = wire.clone();
        assert!(Security2CCMessageEncapsulation::parse(&mut first, parse_ctx()).is_ok());

        // Replaying the exact same bytes must be rejected (§8 testable
        // property 3): the node already stored this sequence number.
        let mut replay = wire;
        assert!(Security2CCMessageEncapsulation::parse(&mut replay, parse_ctx()).is_err());
    }

    #[test]
    fn test_authenticated_binding_rejects_tampered_aad() {
        // Directly exercises property 5: any AAD byte change must break
        // authentication, even with a bit-identical ciphertext/tag.
        let key = vec![0x11; 16];
        let mut mgr = manager(CONTROLLER_ID);
        let peer = NodeId::from(NODE_ID);
        mgr.initialize_span(peer, SecurityClass::S2AccessControl, &[0x55; 16], &[0xAA; 16])
            .unwrap();
        let iv = ccm_nonce(&mgr.next_nonce(peer, false)).to_vec();

        let plaintext = b"hello z-wave".to_vec();
        let aad = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
        let result = encrypt_aes_128_ccm(&key, &iv, &plaintext, &aad);

        assert_eq!(
            decrypt_aes_128_ccm(&key, &iv, &result.ciphertext, &aad, &result.auth_tag),
            Some(plaintext)
        );

        let mut tampered_aad = aad.clone();
        tampered_aad[3] ^= 0x01;
        assert_eq!(
            decrypt_aes_128_ccm(&key, &iv, &result.ciphertext, &tampered_aad, &result.auth_tag),
            None
        );
    }

    #[test]
    fn test_decrypt_retry_advances_through_lost_nonces() {
        // S-3: the peer's message at nonce index k+2 must still decode
        // after two intervening nonces (k, k+1) were consumed without a
        // matching message ever arriving (e.g. lost in flight).
        let key = vec![0x22; 16];
        let mut mgr = manager(CONTROLLER_ID);
        let peer = NodeId::from(NODE_ID);
        mgr.initialize_span(peer, SecurityClass::S2AccessControl, &[0x66; 16], &[0xBB; 16])
            .unwrap();

        // Burn two nonces (k, k+1) as if they were used and lost.
        let _k = mgr.next_nonce(peer, false);
        let _k1 = mgr.next_nonce(peer, false);

        // The sender encrypted under k+2: predict it the same way the
        // sender would, by peeking at a *separate* manager seeded
        // identically (modeling the sender's own view of the same SPAN).
        let mut sender_view = manager(NODE_ID);
        sender_view
            .initialize_span(
                NodeId::from(CONTROLLER_ID),
                SecurityClass::S2AccessControl,
                &[0x66; 16],
                &[0xBB; 16],
            )
            .unwrap();
        let _ = sender_view.next_nonce(NodeId::from(CONTROLLER_ID), false);
        let _ = sender_view.next_nonce(NodeId::from(CONTROLLER_ID), false);
        let nonce_k2 = sender_view.next_nonce(NodeId::from(CONTROLLER_ID), false);

        let aad = vec![9u8; 8];
        let plaintext = b"commands supported get".to_vec();
        let result = encrypt_aes_128_ccm(&key, ccm_nonce(&nonce_k2), &plaintext, &aad);

        let decrypted = try_decrypt_advancing(
            &mut mgr,
            peer,
            &key,
            &result.ciphertext,
            &aad,
            &result.auth_tag,
        );
        assert_eq!(decrypted, Some(plaintext));
    }

    #[test]
    fn test_previous_span_accepted_for_immediate_next_seq() {
        // S-4: a `currentSPAN` recorded while sending our own message is
        // accepted for the peer's very next (prev+1) incoming sequence
        // number without needing to search forward.
        let key = vec![0x33; 16];
        let mut mgr = manager(CONTROLLER_ID);
        let peer = NodeId::from(NODE_ID);
        mgr.initialize_span(peer, SecurityClass::S2AccessControl, &[0x77; 16], &[0xCC; 16])
            .unwrap();

        // Simulate our own outgoing message consuming nonce ν and
        // recording it as `currentSPAN`.
        let nu = mgr.next_nonce(peer, true);
        mgr.store_sequence_number(peer, 0x80);

        let aad = vec![7u8; 8];
        let plaintext = b"reply".to_vec();
        let result = encrypt_aes_128_ccm(&key, ccm_nonce(&nu), &plaintext, &aad);

        // The incoming message's sequence number is exactly previousSeq + 1.
        let decrypted = decrypt_with_retry(
            &mut mgr,
            peer,
            0x81,
            None,
            &result.ciphertext,
            &aad,
            &result.auth_tag,
        )
        .unwrap();
        assert_eq!(decrypted, plaintext);
        // The previous-SPAN window is one-shot: it must be cleared after use.
        assert!(mgr.current_span_nonce(peer, 0x81).is_none());
    }

    #[test]
    fn test_previous_span_skipped_for_non_consecutive_seq() {
        // S-4: "if instead seq had been 0x82, the current-SPAN branch is
        // skipped" - the adjacency check itself must reject the nonce, not
        // a manual test-side override.
        let key = vec![0x44; 16];
        let mut mgr = manager(CONTROLLER_ID);
        let peer = NodeId::from(NODE_ID);
        mgr.initialize_span(peer, SecurityClass::S2AccessControl, &[0x88; 16], &[0xDD; 16])
            .unwrap();

        let nu = mgr.next_nonce(peer, true);
        // Last accepted incoming sequence number is far from the upcoming
        // message's sequence number (0x82), so seq != previousSeq + 1.
        mgr.store_sequence_number(peer, 0x10);

        let aad = vec![7u8; 8];
        let plaintext = b"reply".to_vec();
        let result = encrypt_aes_128_ccm(&key, ccm_nonce(&nu), &plaintext, &aad);

        // The currentSPAN nonce (ν) is still live and unexpired, but
        // `seq` (0x82) is not `previousSeq + 1` (0x11), so the
        // previous-SPAN branch must be skipped and the fresh-nonce search
        // (which starts past ν, already consumed) must fail to find it.
        let decrypted = decrypt_with_retry(
            &mut mgr,
            peer,
            0x82,
            None,
            &result.ciphertext,
            &aad,
            &result.auth_tag,
        );
        assert!(decrypted.is_err());
    }
}
