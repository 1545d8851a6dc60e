use crate::consts::{named_ef, PeTag};
use crate::model::{DedicatedFile, EfOperation, ElementaryFile, FileDescriptor};
use crate::primitives::encode_oid;
use crate::tlv::{write_context, write_tlv, Class, Form};

pub(crate) fn encode_dedicated_file(pe_tag: PeTag, df: &DedicatedFile) -> Vec<u8> {
    let mut out = Vec::new();
    if !df.template_oid.is_empty() {
        write_context(&mut out, Form::Primitive, 0, &encode_oid(&df.template_oid));
    }
    if let Some(fd) = &df.file_descriptor {
        write_context(&mut out, Form::Constructed, 1, &encode_file_descriptor(fd));
    }
    for (name, ef) in &df.named_efs {
        let tag = named_ef::sub_tag(pe_tag, name).unwrap_or(2);
        write_context(&mut out, Form::Constructed, tag, &encode_elementary_file(ef));
    }
    for (key, ef) in &df.additional_efs {
        let tag: u32 = key
            .strip_prefix("tag_")
            .and_then(|n| n.parse().ok())
            .unwrap_or(2);
        write_context(&mut out, Form::Constructed, tag, &encode_elementary_file(ef));
    }
    out
}

pub(crate) fn encode_file_descriptor(fd: &FileDescriptor) -> Vec<u8> {
    let mut out = Vec::new();
    if !fd.file_descriptor_bytes.is_empty() {
        write_context(&mut out, Form::Primitive, 0, &fd.file_descriptor_bytes);
    }
    write_context(&mut out, Form::Primitive, 1, &fd.file_id);
    if !fd.df_name.is_empty() {
        write_context(&mut out, Form::Primitive, 2, &fd.df_name);
    }
    write_context(&mut out, Form::Primitive, 3, &[fd.lcsi]);
    if !fd.security_attributes.is_empty() {
        write_context(&mut out, Form::Primitive, 4, &fd.security_attributes);
    }
    if let Some(short_ef_id) = fd.short_ef_id {
        write_context(&mut out, Form::Primitive, 5, &[short_ef_id]);
    }
    if let Some(size) = fd.ef_file_size {
        write_context(&mut out, Form::Primitive, 6, &crate::primitives::encode_integer(size));
    }
    if let Some(pin_status) = &fd.pin_status_template_do {
        write_tlv(&mut out, Class::Private, Form::Primitive, 6, pin_status);
    }
    if let Some(link_path) = &fd.link_path {
        write_tlv(&mut out, Class::Private, Form::Primitive, 7, link_path);
    }
    out
}

pub(crate) fn encode_elementary_file(ef: &ElementaryFile) -> Vec<u8> {
    let mut out = Vec::new();
    for op in &ef.raw {
        match op {
            EfOperation::DoNotCreate => write_context(&mut out, Form::Primitive, 0, &[]),
            EfOperation::Descriptor(fd) => {
                write_context(&mut out, Form::Constructed, 1, &encode_file_descriptor(fd));
            }
            EfOperation::FillFileOffset(offset) => {
                write_context(&mut out, Form::Primitive, 2, &crate::primitives::encode_integer(*offset));
            }
            EfOperation::FillFileContent(content) => {
                write_context(&mut out, Form::Primitive, 3, content);
            }
        }
    }
    out
}
