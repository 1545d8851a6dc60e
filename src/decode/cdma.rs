use super::{DecodeError, Tlv};
use crate::model::{CdmaParameter, ElementValue};

/// `CDMAParameter`'s body is named by the format but never specified in
/// detail, so it decodes permissively into a sub-tag → bytes map rather
/// than a fixed schema; `ssd`/`imsi_m`/`imsi_t`/`akey` on `CdmaParameter`
/// give named access to the fields test vectors agree on.
pub(crate) fn decode(tlv: &Tlv<'_>) -> Result<ElementValue, DecodeError> {
    let mut cdma = CdmaParameter::default();
    for (inner, value) in tlv.inner_tlvs()? {
        cdma.fields.insert(inner.tag_number, value.to_vec());
    }
    Ok(ElementValue::CdmaParameter(cdma))
}
