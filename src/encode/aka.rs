use crate::model::{AkaParameter, AlgoConfiguration};
use crate::tlv::{write_context, Form};

fn encode_field_list(cfg: &AlgoConfiguration) -> Vec<u8> {
    let mut out = Vec::new();
    write_context(&mut out, Form::Primitive, 0, &[cfg.algorithm_id]);
    write_context(&mut out, Form::Primitive, 1, &[cfg.options]);
    if !cfg.key.is_empty() {
        write_context(&mut out, Form::Primitive, 2, &cfg.key);
    }
    if !cfg.opc.is_empty() {
        write_context(&mut out, Form::Primitive, 3, &cfg.opc);
    }
    if let Some(rotation) = cfg.rotation_constant {
        write_context(&mut out, Form::Primitive, 4, &[rotation]);
    }
    if let Some(xoring) = &cfg.xoring_constant {
        write_context(&mut out, Form::Primitive, 5, xoring);
    }
    if let Some(rounds) = cfg.keccak_rounds {
        write_context(&mut out, Form::Primitive, 6, &crate::primitives::encode_integer(rounds));
    }
    out
}

fn encode_algo_configuration(cfg: &AlgoConfiguration) -> Vec<u8> {
    let fields = encode_field_list(cfg);
    if cfg.wrapped {
        let mut wrapped = Vec::new();
        write_context(&mut wrapped, Form::Constructed, 0, &fields);
        wrapped
    } else {
        fields
    }
}

pub(crate) fn encode(aka: &AkaParameter) -> Vec<u8> {
    let mut out = Vec::new();
    write_context(&mut out, Form::Constructed, 0, &encode_algo_configuration(&aka.algo_configuration));
    write_context(&mut out, Form::Primitive, 1, &[aka.sqn_options]);
    if !aka.sqn_delta.is_empty() {
        write_context(&mut out, Form::Primitive, 2, &aka.sqn_delta);
    }
    if !aka.sqn_age_limit.is_empty() {
        write_context(&mut out, Form::Primitive, 3, &aka.sqn_age_limit);
    }
    if !aka.initial_sqn_values.is_empty() {
        let mut values = Vec::new();
        for sqn in &aka.initial_sqn_values {
            write_context(&mut values, Form::Primitive, 0, sqn);
        }
        write_context(&mut out, Form::Constructed, 4, &values);
    }
    out
}
