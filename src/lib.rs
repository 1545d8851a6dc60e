//! Codec and mutation engine for GSMA SGP.22/SAIP eSIM profile packages:
//! a DER-encoded sequence of Profile Elements, a textual ASN.1 value
//! notation for the same tree, and a builder that personalizes a template
//! profile with a subscriber's ICCID/IMSI/keys/PIN codes.
//!
//! The crate is organized around one shared model (`model::Profile`) with
//! independent front ends/back ends converging on it:
//!
//! - `decode`/`encode` — the binary DER codec.
//! - `text` — the ASN.1 value-notation parser and generator.
//! - `builder` — template cloning, sanitization, and personalization.
//!
//! `tlv` and `primitives` are the shared low-level layers everything above
//! sits on; `consts` holds the format's tag tables and named constants.

pub mod builder;
pub mod consts;
pub mod decode;
pub mod encode;
mod model;
pub mod primitives;
pub mod text;
mod tlv;

pub use builder::{AppletConfig, BuildConfig, BuildError, IsimConfig};
pub use decode::DecodeError;
pub use model::{
    AkaParameter, AlgoConfiguration, CdmaParameter, DedicatedFile, EfOperation, ElementValue,
    ElementaryFile, FileDescriptor, FileManagementCmd, FillEntry, GenericFileManagement,
    KeyComponent, PinCodes, PinConfig, Profile, ProfileElement, ProfileHeader, ProprietaryEfInfo,
    PukCodes, Rfm, SdKey, SecurityDomainOrApplication,
};
pub use primitives::PrimitiveError;
pub use text::{Generator, Parser, TextError};
pub use tlv::{Class, TlvError};

/// Decodes a full DER-encoded Profile Package. Thin wrapper around
/// `Profile::decode` kept at the crate root so callers who only need the
/// binary codec don't have to reach into `decode`.
pub fn decode_bytes(bytes: &[u8]) -> Result<Profile, DecodeError> {
    Profile::decode(bytes)
}

/// Encodes a `Profile` back to DER bytes.
#[must_use]
pub fn encode_to_vec(profile: &Profile) -> Vec<u8> {
    profile.encode()
}

/// Parses a value-notation text document into a `Profile`.
pub fn parse_text(input: &str) -> Result<Profile, TextError> {
    Parser::parse(input)
}

/// Generates the value-notation text form of a `Profile`.
#[must_use]
pub fn generate_text(profile: &Profile) -> String {
    Generator::generate(profile)
}

/// Result of `sniff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Binary,
    Text,
    Unknown,
}

/// Cheap heuristic for telling a binary Profile Package apart from its
/// text notation without attempting a full parse: DER always opens with a
/// context-specific constructed outer tag (`0xA0..=0xBF`, the only class/
/// form/tag-number combination an outer Profile Element tag ever takes);
/// value notation always opens with an ASCII identifier or `{` once
/// leading whitespace is stripped.
#[must_use]
pub fn sniff(input: &[u8]) -> Format {
    match input.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b) if (0xA0..=0xBF).contains(b) => Format::Binary,
        Some(b) if b.is_ascii_alphabetic() || *b == b'{' => Format::Text,
        _ => Format::Unknown,
    }
}
