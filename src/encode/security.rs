use crate::consts::gp_tag;
use crate::model::{KeyComponent, SdKey, SecurityDomainOrApplication};
use crate::tlv::{write_context, write_tlv, Class, Form};

pub(crate) fn encode(record: &SecurityDomainOrApplication) -> Vec<u8> {
    let mut out = Vec::new();

    if let Some(aid) = &record.load_package_aid {
        write_tlv(&mut out, Class::Application, Form::Primitive, gp_tag::AID, aid);
    }
    if let Some(aid) = &record.class_aid {
        write_tlv(&mut out, Class::Application, Form::Primitive, gp_tag::AID, aid);
    }
    write_tlv(&mut out, Class::Application, Form::Primitive, gp_tag::AID, &record.instance_aid);
    if let Some(aid) = &record.extradite_security_domain_aid {
        write_tlv(&mut out, Class::Application, Form::Primitive, gp_tag::AID, aid);
    }

    write_context(&mut out, Form::Primitive, 0, &[record.life_cycle_state]);

    if !record.privileges.is_empty() {
        write_tlv(&mut out, Class::Private, Form::Primitive, u32::from(gp_tag::PRIVILEGES), &record.privileges);
    }
    if let Some(params) = &record.application_parameters {
        write_tlv(&mut out, Class::Private, Form::Constructed, u32::from(gp_tag::APPLICATION_PARAMETERS), params);
    }
    if let Some(params) = &record.system_specific_parameters {
        write_tlv(&mut out, Class::Private, Form::Primitive, u32::from(gp_tag::SYSTEM_SPECIFIC_PARAMETERS), params);
    }
    if let Some(limit) = &record.non_volatile_memory_limit {
        write_tlv(&mut out, Class::Private, Form::Primitive, u32::from(gp_tag::NON_VOLATILE_MEMORY_LIMIT), limit);
    }
    if let Some(limit) = &record.volatile_memory_limit {
        write_tlv(&mut out, Class::Private, Form::Primitive, u32::from(gp_tag::VOLATILE_MEMORY_LIMIT), limit);
    }
    if let Some(limit) = &record.volatile_memory_limit_for_recovery {
        write_tlv(
            &mut out,
            Class::Private,
            Form::Primitive,
            u32::from(gp_tag::VOLATILE_MEMORY_LIMIT_FOR_RECOVERY),
            limit,
        );
    }
    if let Some(c9) = &record.c9_params {
        write_tlv(&mut out, Class::Private, Form::Primitive, u32::from(gp_tag::C9_PARAMS), c9);
    }

    if !record.process_data.is_empty() {
        let mut entries = Vec::new();
        for entry in &record.process_data {
            write_tlv(&mut entries, Class::Universal, Form::Primitive, 4, entry);
        }
        write_tlv(&mut out, Class::Universal, Form::Constructed, 16, &entries);
    }

    for key in &record.keys {
        write_tlv(&mut out, Class::Universal, Form::Constructed, 16, &encode_sd_key(key));
    }

    out
}

fn encode_sd_key(key: &SdKey) -> Vec<u8> {
    let mut out = Vec::new();
    if let Some(qualifier) = key.key_usage_qualifier {
        write_tlv(&mut out, Class::Private, Form::Primitive, u32::from(gp_tag::KEY_USAGE_QUALIFIER), &[qualifier]);
    }
    if let Some(access) = key.key_access {
        write_tlv(&mut out, Class::Private, Form::Primitive, u32::from(gp_tag::KEY_ACCESS), &[access]);
    }
    write_tlv(&mut out, Class::Private, Form::Primitive, u32::from(gp_tag::KEY_IDENTIFIER), &[key.key_identifier]);
    write_tlv(
        &mut out,
        Class::Private,
        Form::Primitive,
        u32::from(gp_tag::KEY_VERSION_NUMBER),
        &[key.key_version_number],
    );
    for component in &key.components {
        write_tlv(&mut out, Class::Universal, Form::Constructed, 16, &encode_key_component(component));
    }
    out
}

fn encode_key_component(component: &KeyComponent) -> Vec<u8> {
    let mut out = Vec::new();
    write_context(&mut out, Form::Primitive, gp_tag::KEY_COMPONENT_TYPE, &[component.key_type]);
    write_context(&mut out, Form::Primitive, gp_tag::KEY_COMPONENT_DATA, &component.key_data);
    write_context(&mut out, Form::Primitive, gp_tag::KEY_COMPONENT_MAC_LENGTH, &[component.mac_length]);
    out
}
