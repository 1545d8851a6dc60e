use super::{DecodeError, Tlv};
use crate::consts::{ef_choice, file_descriptor_tag, named_ef, PeTag, DEFAULT_LCSI};
use crate::model::{DedicatedFile, EfOperation, ElementValue, ElementaryFile, FileDescriptor};
use crate::primitives::decode_oid;
use crate::tlv::{Class, TlvCursor};

const TAG_TEMPLATE_OID: u32 = 0;
const TAG_FILE_DESCRIPTOR: u32 = 1;
const TAG_FIRST_EF: u32 = 2;

/// Shared decoder for MasterFile/Telecom/USIM/OptUSIM/ISIM/OptISIM/CSIM/
/// OptCSIM/GSMAccess/DF5GS/DFSAIP: a template OID, one FileDescriptor
/// wrapper, then a run of elementary files keyed by sub-tag. Sub-tags this
/// crate gives a symbolic name to (`consts::named_ef`) land in `named_efs`;
/// every other sub-tag lands in `additional_efs` keyed by `"tag_<n>"`, the
/// fallback the format specifies for genuinely unrecognized sub-tags.
pub(crate) fn decode_dedicated_file(pe_tag: PeTag, tlv: &Tlv<'_>) -> Result<ElementValue, DecodeError> {
    let mut df = DedicatedFile::default();

    for (inner, value) in tlv.inner_tlvs()? {
        match inner.tag_number {
            TAG_TEMPLATE_OID => df.template_oid = decode_oid(value),
            TAG_FILE_DESCRIPTOR => {
                df.file_descriptor = Some(decode_file_descriptor(value)?);
            }
            n if n >= TAG_FIRST_EF => {
                let ef = decode_elementary_file(value)?;
                match named_ef::name_for(pe_tag, n) {
                    Some(name) => df.named_efs.insert(name.to_string(), ef),
                    None => df.additional_efs.insert(format!("tag_{n}"), ef),
                };
            }
            _ => {}
        }
    }

    Ok(ElementValue::Df(df))
}

/// Decodes `FileDescriptor` sub-fields. Context-specific tags carry the
/// ordinary FCP fields; private-class tags 6/7 carry
/// `pinStatusTemplateDO`/`linkPath` and are distinguished by class, not
/// tag number, since they share numeric values with unrelated
/// context-specific fields.
pub(crate) fn decode_file_descriptor(value: &[u8]) -> Result<FileDescriptor, DecodeError> {
    let mut fd = FileDescriptor {
        lcsi: DEFAULT_LCSI,
        ..Default::default()
    };

    let mut cursor = TlvCursor::new(value);
    while !cursor.is_at_end() {
        let inner = cursor.next()?;
        let inner_value = cursor.value_of(&inner);
        match (inner.class, inner.tag_number) {
            (Class::Private, file_descriptor_tag::PIN_STATUS_TEMPLATE_DO) => {
                fd.pin_status_template_do = Some(inner_value.to_vec());
            }
            (Class::Private, file_descriptor_tag::LINK_PATH) => {
                fd.link_path = Some(inner_value.to_vec());
            }
            (Class::ContextSpecific, 0) => fd.file_descriptor_bytes = inner_value.to_vec(),
            (Class::ContextSpecific, 1) => {
                fd.file_id = [
                    *inner_value.first().unwrap_or(&0),
                    *inner_value.get(1).unwrap_or(&0),
                ];
            }
            (Class::ContextSpecific, 2) => fd.df_name = inner_value.to_vec(),
            (Class::ContextSpecific, 3) => {
                fd.lcsi = *inner_value.first().unwrap_or(&DEFAULT_LCSI);
            }
            (Class::ContextSpecific, 4) => fd.security_attributes = inner_value.to_vec(),
            (Class::ContextSpecific, 5) => fd.short_ef_id = inner_value.first().copied(),
            (Class::ContextSpecific, 6) => {
                fd.ef_file_size = Some(crate::primitives::decode_integer(inner_value));
            }
            _ => {}
        }
    }

    Ok(fd)
}

/// Decodes an `ElementaryFile`: `SEQUENCE OF CHOICE` with sub-tags 0..3.
/// `FillFileOffset` sets a running offset consumed by the next
/// `FillFileContent`, matching the format's own description.
pub(crate) fn decode_elementary_file(value: &[u8]) -> Result<ElementaryFile, DecodeError> {
    let mut ef = ElementaryFile::default();
    let mut cursor = TlvCursor::new(value);

    while !cursor.is_at_end() {
        let inner = cursor.next()?;
        let inner_value = cursor.value_of(&inner);
        let op = match inner.tag_number {
            ef_choice::DO_NOT_CREATE => EfOperation::DoNotCreate,
            ef_choice::FILE_DESCRIPTOR => {
                let fd = decode_file_descriptor(inner_value)?;
                ef.file_descriptor = Some(fd.clone());
                EfOperation::Descriptor(fd)
            }
            ef_choice::FILL_FILE_OFFSET => {
                EfOperation::FillFileOffset(crate::primitives::decode_integer(inner_value))
            }
            ef_choice::FILL_FILE_CONTENT => EfOperation::FillFileContent(inner_value.to_vec()),
            _ => continue,
        };
        ef.raw.push(op);
    }

    ef.recompute_fill_contents();
    Ok(ef)
}
