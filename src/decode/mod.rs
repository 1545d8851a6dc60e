//! Structural decoder: walks a DER byte stream into a typed `Profile`.
//!
//! Dispatch is by outer context-specific tag number (`consts::PeTag`); each
//! submodule owns the sub-field schema for one family of Profile Elements.
//! Every decoder captures the outer TLV's raw bytes onto the produced
//! `ProfileElement` before returning, so the encoder's raw-bytes fast path
//! is always available immediately after a fresh decode.

mod aka;
mod cdma;
mod codes;
mod end;
mod filesystem;
mod gfm;
mod header;
mod rfm;
mod security;

use std::{error, fmt};

use crate::consts::PeTag;
use crate::model::{ElementValue, Profile, ProfileElement};
use crate::tlv::{TlvCursor, TlvError, TlvHeader};

/// Errors raised while walking a DER byte stream into a `Profile`.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    Tlv(TlvError),
    UnknownPeTag(u8),
    InvalidValue(&'static str),
    TrailingData,
}

impl From<TlvError> for DecodeError {
    fn from(e: TlvError) -> Self {
        DecodeError::Tlv(e)
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tlv(e) => write!(f, "TLV error: {e}"),
            Self::UnknownPeTag(tag) => write!(f, "unknown profile element tag {tag}"),
            Self::InvalidValue(what) => write!(f, "invalid value: {what}"),
            Self::TrailingData => f.write_str("trailing data after End profile element"),
        }
    }
}

impl error::Error for DecodeError {}

/// A thin wrapper bundling a TLV header with the cursor it was read from
/// and the header's value bytes, so per-PE decoders don't need to thread
/// three arguments around.
pub(crate) struct Tlv<'input> {
    pub header: TlvHeader,
    pub value: &'input [u8],
}

impl<'input> Tlv<'input> {
    fn read_outer(cursor: &mut TlvCursor<'input>) -> Result<(Self, &'input [u8]), DecodeError> {
        let header = cursor.next()?;
        let raw = cursor.raw_of(&header);
        let value = cursor.value_of(&header);
        Ok((Tlv { header, value }, raw))
    }

    /// Reads every inner TLV in `self.value` into a `Vec`, failing on the
    /// first truncated/malformed triple.
    pub(crate) fn inner_tlvs(&self) -> Result<Vec<(TlvHeader, &'input [u8])>, DecodeError> {
        let mut cursor = TlvCursor::new(self.value);
        let mut out = Vec::new();
        while !cursor.is_at_end() {
            let header = cursor.next()?;
            let value = cursor.value_of(&header);
            out.push((header, value));
        }
        Ok(out)
    }
}

impl Profile {
    /// Decodes a full DER byte stream into a `Profile`. Trailing bytes
    /// after the `End` PE are rejected (`DecodeError::TrailingData`) —
    /// the format's own sentinel makes a silently-truncating reader a
    /// correctness hazard rather than a convenience.
    pub fn decode(bytes: &[u8]) -> Result<Profile, DecodeError> {
        let mut profile = Profile::new();
        let mut cursor = TlvCursor::new(bytes);
        let mut seen_end = false;

        while !cursor.is_at_end() {
            if seen_end {
                return Err(DecodeError::TrailingData);
            }
            let (tlv, raw) = Tlv::read_outer(&mut cursor)?;
            if tlv.header.tag_number > u32::from(u8::MAX) {
                return Err(DecodeError::UnknownPeTag(0));
            }
            let tag = tlv.header.tag_number as u8;
            let value = decode_element(tag, &tlv)?;
            if matches!(value, ElementValue::End) {
                seen_end = true;
            }
            profile.push(ProfileElement::with_raw(tag, value, raw.to_vec()));
        }

        Ok(profile)
    }
}

fn decode_element(tag: u8, tlv: &Tlv<'_>) -> Result<ElementValue, DecodeError> {
    let pe_tag = PeTag::try_from(tag).map_err(|_| DecodeError::UnknownPeTag(tag))?;
    match pe_tag {
        PeTag::ProfileHeader => header::decode(tlv),
        PeTag::Mf
        | PeTag::Telecom
        | PeTag::Usim
        | PeTag::OptUsim
        | PeTag::Isim
        | PeTag::OptIsim
        | PeTag::Csim
        | PeTag::OptCsim
        | PeTag::GsmAccess
        | PeTag::Df5gs
        | PeTag::DfSaip => filesystem::decode_dedicated_file(pe_tag, tlv),
        PeTag::PukCodes => codes::decode_puk_codes(tlv),
        PeTag::PinCodes => codes::decode_pin_codes(tlv),
        PeTag::AkaParameter => aka::decode(tlv),
        PeTag::CdmaParameter => cdma::decode(tlv),
        PeTag::GenericFileManagement => gfm::decode(tlv),
        PeTag::GenericFileManagementList => gfm::decode_list(tlv),
        PeTag::SecurityDomain => security::decode(tlv).map(ElementValue::SecurityDomain),
        PeTag::Application => security::decode(tlv).map(ElementValue::Application),
        PeTag::Rfm => rfm::decode(tlv),
        PeTag::End => end::decode(tlv),
    }
}

