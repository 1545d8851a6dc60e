use crate::model::ProfileHeader;
use crate::primitives::{encode_bcd_plain, encode_integer, encode_oid};
use crate::tlv::{write_context, Form};

pub(crate) fn encode(header: &ProfileHeader) -> Vec<u8> {
    let mut out = Vec::new();
    write_context(&mut out, Form::Primitive, 0, &encode_integer(header.major_version));
    write_context(&mut out, Form::Primitive, 1, &encode_integer(header.minor_version));
    write_context(&mut out, Form::Primitive, 2, header.profile_type.as_bytes());
    write_context(&mut out, Form::Primitive, 3, &encode_bcd_plain(&header.iccid));

    if !header.mandatory_services.is_empty() {
        let mut services = Vec::new();
        for &service in &header.mandatory_services {
            write_context(&mut services, Form::Primitive, u32::from(service), &[]);
        }
        write_context(&mut out, Form::Constructed, 4, &services);
    }

    if !header.mandatory_gfste_oids.is_empty() {
        let mut oids = Vec::new();
        for oid in &header.mandatory_gfste_oids {
            let body = encode_oid(oid);
            write_context(&mut oids, Form::Primitive, 0, &body);
        }
        write_context(&mut out, Form::Constructed, 5, &oids);
    }

    out
}
