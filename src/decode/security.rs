use super::{DecodeError, Tlv};
use crate::consts::gp_tag;
use crate::model::{KeyComponent, SdKey, SecurityDomainOrApplication};
use crate::tlv::{Class, Form, TlvCursor};

/// AIDs are APPLICATION-class tag 15 (`0x4F`); which role a given AID plays
/// (load package / class / instance / extradite-SD) is disambiguated
/// purely by the order it occurs within the instance record, since nothing
/// else distinguishes the four otherwise-identical TLVs.
const AID_TAG_NUMBER: u32 = gp_tag::AID;
const UNIVERSAL_SEQUENCE: u32 = 16;

pub(crate) fn decode(tlv: &Tlv<'_>) -> Result<SecurityDomainOrApplication, DecodeError> {
    let mut record = SecurityDomainOrApplication::default();
    let mut aid_count = 0u32;

    let mut cursor = TlvCursor::new(tlv.value);
    while !cursor.is_at_end() {
        let inner = cursor.next()?;
        let inner_value = cursor.value_of(&inner);

        if inner.class == Class::Application && inner.tag_number == AID_TAG_NUMBER {
            aid_count += 1;
            match aid_count {
                1 => record.load_package_aid = Some(inner_value.to_vec()),
                2 => record.class_aid = Some(inner_value.to_vec()),
                3 => record.instance_aid = inner_value.to_vec(),
                _ => record.extradite_security_domain_aid = Some(inner_value.to_vec()),
            }
            continue;
        }

        if inner.class == Class::Private {
            match inner.tag_number as u8 {
                gp_tag::PRIVILEGES => record.privileges = inner_value.to_vec(),
                gp_tag::APPLICATION_PARAMETERS => {
                    record.application_parameters = Some(inner_value.to_vec());
                }
                gp_tag::SYSTEM_SPECIFIC_PARAMETERS => {
                    record.system_specific_parameters = Some(inner_value.to_vec());
                }
                gp_tag::NON_VOLATILE_MEMORY_LIMIT => {
                    record.non_volatile_memory_limit = Some(inner_value.to_vec());
                }
                gp_tag::VOLATILE_MEMORY_LIMIT => {
                    record.volatile_memory_limit = Some(inner_value.to_vec());
                }
                gp_tag::VOLATILE_MEMORY_LIMIT_FOR_RECOVERY => {
                    record.volatile_memory_limit_for_recovery = Some(inner_value.to_vec());
                }
                gp_tag::C9_PARAMS => record.c9_params = Some(inner_value.to_vec()),
                _ => {}
            }
            continue;
        }

        if inner.class == Class::Universal
            && inner.form == Form::Constructed
            && inner.tag_number == UNIVERSAL_SEQUENCE
        {
            if is_key_sequence(inner_value)? {
                record.keys.push(decode_sd_key(inner_value)?);
            } else {
                record.process_data = decode_process_data(inner_value)?;
            }
            continue;
        }

        if inner.class == Class::ContextSpecific && inner.tag_number == 0 {
            record.life_cycle_state = inner_value.first().copied().unwrap_or(record.life_cycle_state);
        }
    }

    Ok(record)
}

fn is_key_sequence(value: &[u8]) -> Result<bool, DecodeError> {
    if value.is_empty() {
        return Ok(false);
    }
    let mut cursor = TlvCursor::new(value);
    let first = cursor.next()?;
    Ok(first.class == Class::Private)
}

fn decode_process_data(value: &[u8]) -> Result<Vec<Vec<u8>>, DecodeError> {
    let mut entries = Vec::new();
    let mut cursor = TlvCursor::new(value);
    while !cursor.is_at_end() {
        let inner = cursor.next()?;
        entries.push(cursor.value_of(&inner).to_vec());
    }
    Ok(entries)
}

/// SDKey: GP tags `0x95 keyUsageQualifier`, `0x96 keyAccess`, `0x82
/// keyIdentifier`, `0x83 keyVersionNumber`, and a `SEQUENCE (0x30)` of
/// `KeyComponent`.
fn decode_sd_key(value: &[u8]) -> Result<SdKey, DecodeError> {
    let mut key = SdKey::default();
    let mut cursor = TlvCursor::new(value);
    while !cursor.is_at_end() {
        let inner = cursor.next()?;
        let inner_value = cursor.value_of(&inner);
        if inner.class == Class::Private {
            match inner.tag_number as u8 {
                gp_tag::KEY_USAGE_QUALIFIER => {
                    key.key_usage_qualifier = inner_value.first().copied();
                }
                gp_tag::KEY_ACCESS => key.key_access = inner_value.first().copied(),
                gp_tag::KEY_IDENTIFIER => {
                    key.key_identifier = inner_value.first().copied().unwrap_or(0);
                }
                gp_tag::KEY_VERSION_NUMBER => {
                    key.key_version_number = inner_value.first().copied().unwrap_or(0);
                }
                _ => {}
            }
        } else if inner.class == Class::Universal
            && inner.form == Form::Constructed
            && inner.tag_number == UNIVERSAL_SEQUENCE
        {
            key.components.push(decode_key_component(inner_value)?);
        }
    }
    Ok(key)
}

fn decode_key_component(value: &[u8]) -> Result<KeyComponent, DecodeError> {
    let mut component = KeyComponent {
        mac_length: gp_tag::DEFAULT_MAC_LENGTH,
        ..Default::default()
    };
    let mut cursor = TlvCursor::new(value);
    while !cursor.is_at_end() {
        let inner = cursor.next()?;
        let inner_value = cursor.value_of(&inner);
        match inner.tag_number {
            gp_tag::KEY_COMPONENT_TYPE => {
                component.key_type = inner_value.first().copied().unwrap_or(0);
            }
            gp_tag::KEY_COMPONENT_DATA => component.key_data = inner_value.to_vec(),
            gp_tag::KEY_COMPONENT_MAC_LENGTH => {
                component.mac_length = inner_value
                    .first()
                    .copied()
                    .unwrap_or(gp_tag::DEFAULT_MAC_LENGTH);
            }
            _ => {}
        }
    }
    Ok(component)
}
