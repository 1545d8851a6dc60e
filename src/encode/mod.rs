//! Structural encoder: the symmetric counterpart to `decode`. Emits DER in
//! exactly the element order held by a `Profile`.
//!
//! Each element takes the raw-bytes fast path when a cache is present
//! (`ProfileElement::raw`), otherwise it is re-serialized from the typed
//! model through the per-PE encoders below. Re-encoding a `Profile` built
//! entirely by this crate's own decoder or builder cannot fail, so this
//! layer is infallible — any invariant violation here is a programming
//! error, not a reportable condition, matching the format's own encoding
//! policy ("encoding of a valid in-memory Profile cannot fail").

mod aka;
mod cdma;
mod codes;
mod filesystem;
mod gfm;
mod header;
mod rfm;
mod security;

use crate::consts::PeTag;
use crate::model::{ElementValue, Profile, ProfileElement};
use crate::tlv::{write_context, Form};

impl Profile {
    /// Encodes the profile back to DER bytes.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for element in &self.elements {
            encode_element(&mut out, element);
        }
        out
    }
}

fn encode_element(out: &mut Vec<u8>, element: &ProfileElement) {
    if let Some(raw) = &element.raw {
        out.extend_from_slice(raw);
        return;
    }

    let value_bytes = encode_value(element.tag, &element.value);
    let form = match &element.value {
        ElementValue::End => Form::Primitive,
        _ => Form::Constructed,
    };
    write_context(out, form, u32::from(element.tag), &value_bytes);
}

fn encode_value(tag: u8, value: &ElementValue) -> Vec<u8> {
    match value {
        ElementValue::Header(h) => header::encode(h),
        ElementValue::Df(df) => {
            let pe_tag = PeTag::try_from(tag).expect("Df element carries a valid PE tag");
            filesystem::encode_dedicated_file(pe_tag, df)
        }
        ElementValue::PukCodes(p) => codes::encode_puk_codes(p),
        ElementValue::PinCodes(p) => codes::encode_pin_codes(p),
        ElementValue::GenericFileManagement(g) => gfm::encode_single(g),
        ElementValue::GenericFileManagementList(list) => gfm::encode_list(list),
        ElementValue::AkaParameter(a) => aka::encode(a),
        ElementValue::CdmaParameter(c) => cdma::encode(c),
        ElementValue::SecurityDomain(s) | ElementValue::Application(s) => security::encode(s),
        ElementValue::Rfm(r) => rfm::encode(r),
        ElementValue::End => Vec::new(),
    }
}

/// Tag number used as a sentinel when a `Profile` built purely from the
/// typed model (no decode step) needs an `End` element pushed during the
/// builder's applet-add step.
#[must_use]
pub fn end_tag() -> u8 {
    PeTag::End as u8
}
