use crate::model::{PinCodes, PinConfig, PukCodes};
use crate::tlv::{write_context, Form};

fn encode_entries(entries: &[PinConfig]) -> Vec<u8> {
    let mut out = Vec::new();
    for entry in entries {
        write_context(&mut out, Form::Primitive, u32::from(entry.key_ref), &entry.value);
    }
    out
}

pub(crate) fn encode_pin_codes(codes: &PinCodes) -> Vec<u8> {
    let mut out = Vec::new();
    write_context(&mut out, Form::Constructed, 0, &encode_entries(&codes.entries));
    out
}

pub(crate) fn encode_puk_codes(codes: &PukCodes) -> Vec<u8> {
    encode_entries(&codes.entries)
}
