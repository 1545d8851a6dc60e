use super::{DecodeError, Tlv};
use crate::consts::PIN_BUFFER_LEN;
use crate::model::{ElementValue, PinCodes, PinConfig, PukCodes};
use crate::tlv::TlvCursor;

/// The `pinCodes` field is itself a CHOICE between `[0] pinconfig` and
/// `[1] pincodesUncompressed`; both arms decode to the same `PINConfig`
/// list, so the outer tag distinguishing them is not retained separately —
/// only the raw-bytes cache preserves which arm a given input used.
const TAG_PIN_CONFIG: u32 = 0;
const TAG_PIN_CODES_UNCOMPRESSED: u32 = 1;

fn decode_entries(value: &[u8]) -> Result<Vec<PinConfig>, DecodeError> {
    let mut entries = Vec::new();
    let mut cursor = TlvCursor::new(value);
    while !cursor.is_at_end() {
        let inner = cursor.next()?;
        let inner_value = cursor.value_of(&inner);
        let mut buf = [0xFFu8; PIN_BUFFER_LEN];
        let n = inner_value.len().min(PIN_BUFFER_LEN);
        buf[..n].copy_from_slice(&inner_value[..n]);
        entries.push(PinConfig {
            key_ref: inner.tag_number as u8,
            value: buf,
        });
    }
    Ok(entries)
}

pub(crate) fn decode_pin_codes(tlv: &Tlv<'_>) -> Result<ElementValue, DecodeError> {
    let mut codes = PinCodes::default();
    for (inner, value) in tlv.inner_tlvs()? {
        match inner.tag_number {
            TAG_PIN_CONFIG | TAG_PIN_CODES_UNCOMPRESSED => {
                codes.entries = decode_entries(value)?;
            }
            _ => {}
        }
    }
    Ok(ElementValue::PinCodes(codes))
}

pub(crate) fn decode_puk_codes(tlv: &Tlv<'_>) -> Result<ElementValue, DecodeError> {
    let entries = decode_entries(tlv.value)?;
    Ok(ElementValue::PukCodes(PukCodes { entries }))
}
