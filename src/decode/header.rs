use super::{DecodeError, Tlv};
use crate::model::{ElementValue, ProfileHeader};
use crate::primitives::{decode_bcd_plain, decode_oid};
use crate::tlv::Class;

/// Sub-tags 0..9: major/minor version, profile type, ICCID, mandatory
/// services bitmap (as a set of inner NULL tags), mandatory GFSTE OIDs.
const TAG_MAJOR_VERSION: u32 = 0;
const TAG_MINOR_VERSION: u32 = 1;
const TAG_PROFILE_TYPE: u32 = 2;
const TAG_ICCID: u32 = 3;
const TAG_MANDATORY_SERVICES: u32 = 4;
const TAG_MANDATORY_GFSTE: u32 = 5;

pub(crate) fn decode(tlv: &Tlv<'_>) -> Result<ElementValue, DecodeError> {
    let mut header = ProfileHeader::default();

    for (inner, value) in tlv.inner_tlvs()? {
        match inner.tag_number {
            TAG_MAJOR_VERSION => header.major_version = crate::primitives::decode_integer(value),
            TAG_MINOR_VERSION => header.minor_version = crate::primitives::decode_integer(value),
            TAG_PROFILE_TYPE => {
                header.profile_type = String::from_utf8_lossy(value).into_owned();
            }
            TAG_ICCID => header.iccid = decode_bcd_plain(value),
            TAG_MANDATORY_SERVICES => {
                let mut cursor = crate::tlv::TlvCursor::new(value);
                while !cursor.is_at_end() {
                    let service = cursor.next()?;
                    header.mandatory_services.push(service.tag_number as u8);
                }
            }
            TAG_MANDATORY_GFSTE => {
                let mut cursor = crate::tlv::TlvCursor::new(value);
                while !cursor.is_at_end() {
                    let oid_header = cursor.next()?;
                    let oid_bytes = cursor.value_of(&oid_header);
                    header.mandatory_gfste_oids.push(decode_oid(oid_bytes));
                }
            }
            _ if inner.class == Class::Universal => {}
            _ => {}
        }
    }

    Ok(ElementValue::Header(header))
}
