use crate::model::CdmaParameter;
use crate::tlv::{write_context, Form};

pub(crate) fn encode(cdma: &CdmaParameter) -> Vec<u8> {
    let mut out = Vec::new();
    for (&tag, value) in &cdma.fields {
        write_context(&mut out, Form::Primitive, tag, value);
    }
    out
}
