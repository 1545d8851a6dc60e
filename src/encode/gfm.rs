use crate::consts::gfm_tag;
use crate::model::{FileManagementCmd, GenericFileManagement};
use crate::tlv::{write_tlv, Class, Form};

fn encode_cmd(cmd: &FileManagementCmd) -> Vec<u8> {
    let mut out = Vec::new();
    if let Some(path) = &cmd.file_path {
        write_tlv(&mut out, Class::ContextSpecific, Form::Primitive, u32::from(gfm_tag::FILE_PATH & 0x1F), path);
    }
    if let Some(fcp) = &cmd.create_fcp {
        write_tlv(&mut out, Class::Application, Form::Constructed, u32::from(gfm_tag::CREATE_FCP & 0x1F), fcp);
    }
    if let Some(content) = &cmd.fill_file_content {
        write_tlv(
            &mut out,
            Class::ContextSpecific,
            Form::Primitive,
            u32::from(gfm_tag::FILL_FILE_CONTENT & 0x1F),
            content,
        );
    }
    if let Some(offset) = cmd.fill_file_offset {
        write_tlv(
            &mut out,
            Class::ContextSpecific,
            Form::Primitive,
            u32::from(gfm_tag::FILL_FILE_OFFSET & 0x1F),
            &crate::primitives::encode_integer(offset),
        );
    }
    out
}

pub(crate) fn encode_single(gfm: &GenericFileManagement) -> Vec<u8> {
    let mut out = Vec::new();
    for cmd in &gfm.commands {
        let body = encode_cmd(cmd);
        write_tlv(&mut out, Class::ContextSpecific, Form::Constructed, 0, &body);
    }
    out
}

pub(crate) fn encode_list(entries: &[GenericFileManagement]) -> Vec<u8> {
    let mut out = Vec::new();
    for entry in entries {
        let body = encode_single(entry);
        write_tlv(&mut out, Class::ContextSpecific, Form::Constructed, 5, &body);
    }
    out
}
