use crate::model::Rfm;
use crate::tlv::{write_context, Form};

pub(crate) fn encode(rfm: &Rfm) -> Vec<u8> {
    let mut out = Vec::new();
    if let Some(header) = &rfm.header {
        write_context(&mut out, Form::Constructed, 0, header);
    } else if !rfm.tar_list.is_empty() {
        let mut entries = Vec::new();
        for tar in &rfm.tar_list {
            crate::tlv::write_tlv(&mut entries, crate::tlv::Class::Universal, Form::Primitive, 4, tar);
        }
        write_context(&mut out, Form::Constructed, 0, &entries);
    }
    out
}
