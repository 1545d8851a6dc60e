use super::{DecodeError, Tlv};
use crate::model::{AkaParameter, AlgoConfiguration, ElementValue};
use crate::tlv::{Class, Form, TlvCursor};

const TAG_ALGO_CONFIGURATION: u32 = 0;
const TAG_SQN_OPTIONS: u32 = 1;
const TAG_SQN_DELTA: u32 = 2;
const TAG_SQN_AGE_LIMIT: u32 = 3;
const TAG_INITIAL_SQN_VALUES: u32 = 4;

const TAG_ALGORITHM_ID: u32 = 0;
const TAG_OPTIONS: u32 = 1;
const TAG_KEY: u32 = 2;
const TAG_OPC: u32 = 3;
const TAG_ROTATION_CONSTANT: u32 = 4;
const TAG_XORING_CONSTANT: u32 = 5;
const TAG_KECCAK_ROUNDS: u32 = 6;

pub(crate) fn decode(tlv: &Tlv<'_>) -> Result<ElementValue, DecodeError> {
    let mut aka = AkaParameter::default();

    for (inner, value) in tlv.inner_tlvs()? {
        match inner.tag_number {
            TAG_ALGO_CONFIGURATION => aka.algo_configuration = decode_algo_configuration(value)?,
            TAG_SQN_OPTIONS => aka.sqn_options = value.first().copied().unwrap_or(0),
            TAG_SQN_DELTA => aka.sqn_delta = value.to_vec(),
            TAG_SQN_AGE_LIMIT => aka.sqn_age_limit = value.to_vec(),
            TAG_INITIAL_SQN_VALUES => {
                let mut cursor = TlvCursor::new(value);
                while !cursor.is_at_end() {
                    let entry = cursor.next()?;
                    aka.initial_sqn_values.push(cursor.value_of(&entry).to_vec());
                }
            }
            _ => {}
        }
    }

    Ok(ElementValue::AkaParameter(aka))
}

/// Probes the first inner field of `algoConfiguration`'s value: a
/// context-specific, constructed tag `[0]` indicates the wrapper CHOICE
/// arm (an extra nesting level around the real field list); anything else
/// is the direct-fields arm.
fn decode_algo_configuration(value: &[u8]) -> Result<AlgoConfiguration, DecodeError> {
    let mut cursor = TlvCursor::new(value);
    if cursor.is_at_end() {
        return Ok(AlgoConfiguration::default());
    }
    let first = cursor.next()?;
    let is_wrapper =
        first.class == Class::ContextSpecific && first.form == Form::Constructed && first.tag_number == 0;

    let field_bytes: &[u8] = if is_wrapper {
        cursor.value_of(&first)
    } else {
        value
    };

    let mut cfg = AlgoConfiguration {
        wrapped: is_wrapper,
        ..Default::default()
    };
    let mut field_cursor = TlvCursor::new(field_bytes);
    while !field_cursor.is_at_end() {
        let field = field_cursor.next()?;
        let field_value = field_cursor.value_of(&field);
        match field.tag_number {
            TAG_ALGORITHM_ID => cfg.algorithm_id = field_value.first().copied().unwrap_or(0),
            TAG_OPTIONS => cfg.options = field_value.first().copied().unwrap_or(0),
            TAG_KEY => cfg.key = field_value.to_vec(),
            TAG_OPC => cfg.opc = field_value.to_vec(),
            TAG_ROTATION_CONSTANT => cfg.rotation_constant = field_value.first().copied(),
            TAG_XORING_CONSTANT => cfg.xoring_constant = Some(field_value.to_vec()),
            TAG_KECCAK_ROUNDS => {
                cfg.keccak_rounds = Some(crate::primitives::decode_integer(field_value));
            }
            _ => {}
        }
    }

    Ok(cfg)
}
