use super::{DecodeError, Tlv};
use crate::model::{ElementValue, Rfm};
use crate::tlv::{Class, TlvCursor};

const TAG_HEADER_OR_TAR_LIST: u32 = 0;

/// Disambiguates `[0] header` from `[0] tarList` by probing the first
/// token inside the tag-0 value: context-specific framing means a header
/// record; anything else means a flat list of raw TAR octet strings.
pub(crate) fn decode(tlv: &Tlv<'_>) -> Result<ElementValue, DecodeError> {
    let mut rfm = Rfm::default();

    for (inner, value) in tlv.inner_tlvs()? {
        if inner.tag_number != TAG_HEADER_OR_TAR_LIST {
            continue;
        }
        let mut probe = TlvCursor::new(value);
        if probe.is_at_end() {
            continue;
        }
        let first = probe.next()?;
        if first.class == Class::ContextSpecific {
            rfm.header = Some(value.to_vec());
        } else {
            let mut cursor = TlvCursor::new(value);
            while !cursor.is_at_end() {
                let entry = cursor.next()?;
                rfm.tar_list.push(cursor.value_of(&entry).to_vec());
            }
        }
    }

    Ok(ElementValue::Rfm(rfm))
}
