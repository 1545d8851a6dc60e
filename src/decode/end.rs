use super::{DecodeError, Tlv};
use crate::model::ElementValue;

/// The sentinel `End` PE: no remaining bytes to decode, an empty or NULL
/// value. Any content present is ignored — the format's own description
/// treats `End` as a pure marker.
pub(crate) fn decode(_tlv: &Tlv<'_>) -> Result<ElementValue, DecodeError> {
    Ok(ElementValue::End)
}
