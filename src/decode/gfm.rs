use super::{DecodeError, Tlv};
use crate::consts::gfm_tag;
use crate::model::{ElementValue, FileManagementCmd, GenericFileManagement};
use crate::tlv::{Class, Form, TlvCursor};

fn decode_cmd(value: &[u8]) -> Result<FileManagementCmd, DecodeError> {
    let mut cmd = FileManagementCmd::default();
    let mut cursor = TlvCursor::new(value);
    while !cursor.is_at_end() {
        let inner = cursor.next()?;
        let inner_value = cursor.value_of(&inner);
        match (inner.class, inner.form, inner.tag_number) {
            (Class::ContextSpecific, Form::Primitive, n) if n as u8 == gfm_tag::FILE_PATH & 0x1F => {
                cmd.file_path = Some(inner_value.to_vec());
            }
            (Class::Application, Form::Constructed, n) if n as u8 == gfm_tag::CREATE_FCP & 0x1F => {
                cmd.create_fcp = Some(inner_value.to_vec());
            }
            (Class::ContextSpecific, Form::Primitive, n) if n as u8 == gfm_tag::FILL_FILE_CONTENT & 0x1F => {
                cmd.fill_file_content = Some(inner_value.to_vec());
            }
            (Class::ContextSpecific, Form::Primitive, n) if n as u8 == gfm_tag::FILL_FILE_OFFSET & 0x1F => {
                cmd.fill_file_offset = Some(crate::primitives::decode_integer(inner_value));
            }
            _ => {}
        }
    }
    Ok(cmd)
}

fn decode_single(value: &[u8]) -> Result<GenericFileManagement, DecodeError> {
    let mut gfm = GenericFileManagement::default();
    let mut cursor = TlvCursor::new(value);
    while !cursor.is_at_end() {
        let inner = cursor.next()?;
        let inner_value = cursor.value_of(&inner);
        gfm.commands.push(decode_cmd(inner_value)?);
    }
    Ok(gfm)
}

pub(crate) fn decode(tlv: &Tlv<'_>) -> Result<ElementValue, DecodeError> {
    let gfm = decode_single(tlv.value)?;
    Ok(ElementValue::GenericFileManagement(gfm))
}

/// Decodes the `GenericFileManagementList` wrapper: repeated
/// `GenericFileManagement` entries when a template carries more than one.
pub(crate) fn decode_list(tlv: &Tlv<'_>) -> Result<ElementValue, DecodeError> {
    let mut entries = Vec::new();
    for (_, value) in tlv.inner_tlvs()? {
        entries.push(decode_single(value)?);
    }
    Ok(ElementValue::GenericFileManagementList(entries))
}
