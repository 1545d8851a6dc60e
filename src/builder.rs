//! Profile mutator & builder: turns a decoded template `Profile` plus a
//! `BuildConfig` into a fresh, personalized `Profile`. Three steps, each a
//! small state machine over the typed model rather than the byte stream:
//! clone the template (via encode-then-decode, so the result owns its own
//! copy of every buffer), sanitize it (blank the secrets a template
//! shouldn't leak into a build), then apply the requested configuration.
//!
//! Every mutator here follows the same rule: touch the typed field, then
//! call `Profile::touch` on the owning element's index so the encoder's
//! raw-bytes fast path can't reproduce stale bytes.

use std::{error, fmt};

use crate::consts::{
    apdu, store_data_tag, AlgorithmId, KeyRef, PeTag, DEFAULT_AMF, PIN_BUFFER_LEN, PIN_PAD_BYTE,
};
use crate::model::{ElementValue, Profile, ProfileElement, SecurityDomainOrApplication};
use crate::primitives::{self, PrimitiveError};

/// Errors raised while building a personalized profile from a template.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildError {
    BadHex,
    BadLength { field: &'static str, expected: &'static [usize] },
    MissingApp(&'static str),
    MissingAka,
    MissingPin,
    OutOfRange(&'static str),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadHex => f.write_str("malformed hex input"),
            Self::BadLength { field, expected } => {
                write!(f, "{field} must be one of {expected:?} bytes long")
            }
            Self::MissingApp(app) => write!(f, "template has no {app} profile element"),
            Self::MissingAka => f.write_str("template has no AKAParameter profile element"),
            Self::MissingPin => f.write_str("template has no PINCodes/PUKCodes profile element"),
            Self::OutOfRange(what) => write!(f, "{what} out of range"),
        }
    }
}

impl error::Error for BuildError {}

impl From<PrimitiveError> for BuildError {
    fn from(_: PrimitiveError) -> Self {
        BuildError::OutOfRange("string value")
    }
}

/// ISIM identity fields applied by `applyISIMConfig`. `impu` is a list
/// since a single ISIM application may register more than one public
/// identity; all supplied values overwrite whatever the template carried.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IsimConfig {
    pub impi: Option<String>,
    pub impu: Vec<String>,
    pub domain: Option<String>,
}

/// A new `Application` instance to add, built from a CAP file's AID plus
/// the Milenage personalization data for the card's Java Card applet
/// (as opposed to the profile's own native `AKAParameter` element).
///
/// `cap` is carried through unused by this crate: loading and verifying
/// the CAP file itself is a GlobalPlatform card-management concern this
/// crate does not perform, but callers building a full installation
/// package alongside the profile may want the bytes available next to the
/// generated `Application` element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppletConfig {
    pub cap: Vec<u8>,
    pub instance_aid: Vec<u8>,
    pub applet_auth: bool,
    pub amf: Option<[u8; 2]>,
    pub sqn: Option<Vec<u8>>,
    pub op: Option<Vec<u8>>,
}

/// Personalization inputs for one build. Every field is optional: a field
/// left `None` leaves the corresponding template value untouched (beyond
/// whatever `sanitize` already blanked).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BuildConfig {
    pub iccid: Option<String>,
    pub imsi: Option<String>,
    pub ki: Option<Vec<u8>>,
    pub opc: Option<Vec<u8>>,
    /// Overrides `AKAParameter.algoConfiguration.algorithmID` directly.
    /// Only consulted in non-applet-auth mode; applet-auth mode always
    /// sets `UsimTest` once it delegates to the applet's own Milenage keys.
    pub algorithm_id: Option<u8>,
    pub pin1: Option<String>,
    pub pin2: Option<String>,
    pub adm1: Option<String>,
    pub adm2: Option<String>,
    pub puk1: Option<String>,
    pub puk2: Option<String>,
    pub isim: Option<IsimConfig>,
    pub applet: Option<AppletConfig>,
}

fn encode_pin_value(s: &str) -> Result<[u8; PIN_BUFFER_LEN], BuildError> {
    if s.len() > PIN_BUFFER_LEN {
        return Err(BuildError::OutOfRange("PIN/PUK/ADM value"));
    }
    let mut buf = [PIN_PAD_BYTE; PIN_BUFFER_LEN];
    buf[..s.len()].copy_from_slice(s.as_bytes());
    Ok(buf)
}

fn push_store_data_apdu(out: &mut Vec<Vec<u8>>, tag: u8, value: &[u8]) {
    let mut data = vec![tag, value.len() as u8];
    data.extend_from_slice(value);
    let mut apdu = vec![apdu::CLA, apdu::INS_STORE_DATA, apdu::P1, apdu::P2, data.len() as u8];
    apdu.extend(data);
    out.push(apdu);
}

/// Parses one STORE DATA APDU back into its `(tag, value)` personalization
/// field, the inverse of `push_store_data_apdu`.
fn parse_store_data_apdu(apdu: &[u8]) -> Option<(u8, Vec<u8>)> {
    let data = apdu.get(5..)?;
    let tag = *data.first()?;
    let len = usize::from(*data.get(1)?);
    let value = data.get(2..2 + len)?.to_vec();
    Some((tag, value))
}

impl Profile {
    /// Drops the raw-bytes cache for `elements[idx]`. No-op if `idx` is out
    /// of bounds, so callers can pass an `Option<usize>` convenience index
    /// without an extra guard.
    fn touch(&mut self, idx: usize) {
        if let Some(element) = self.elements.get_mut(idx) {
            element.invalidate();
        }
    }

    /// Deep-copies this profile by re-encoding it to DER and decoding the
    /// result fresh. `Profile` built purely by this crate's own decoder or
    /// builder always round-trips, so a decode failure here is a
    /// programming error, not a reportable condition — the same invariant
    /// the encoder itself relies on.
    #[must_use]
    pub fn clone_template(&self) -> Profile {
        let bytes = self.encode();
        Profile::decode(&bytes).expect("a profile built by this crate always round-trips")
    }

    /// Blanks every secret a template shouldn't leak into a build: AKA
    /// keys/OPc, the USIM/OptUSIM IMSI, and PIN/PUK/ADM values. Idempotent:
    /// calling it twice in a row produces the same profile as calling it
    /// once.
    pub fn sanitize(&mut self) {
        let aka_idxs = self.aka_parameter_idxs.clone();
        for aka in self.aka_parameters_mut() {
            let key_len = aka.algo_configuration.key.len();
            aka.algo_configuration.key = vec![0u8; key_len];
            let opc_len = aka.algo_configuration.opc.len();
            aka.algo_configuration.opc = vec![0u8; opc_len];
        }
        for idx in aka_idxs {
            self.touch(idx);
        }

        for idx in [self.usim_idx, self.opt_usim_idx].into_iter().flatten() {
            if let ElementValue::Df(df) = &mut self.elements[idx].value {
                if let Some(ef) = df.named_efs.get_mut("imsi") {
                    ef.replace_with_content(Vec::new());
                }
            }
            self.touch(idx);
        }

        if let Some(idx) = self.pin_codes_idx {
            if let ElementValue::PinCodes(p) = &mut self.elements[idx].value {
                for entry in &mut p.entries {
                    entry.value = [PIN_PAD_BYTE; PIN_BUFFER_LEN];
                }
            }
            self.touch(idx);
        }
        if let Some(idx) = self.puk_codes_idx {
            if let ElementValue::PukCodes(p) = &mut self.elements[idx].value {
                for entry in &mut p.entries {
                    entry.value = [PIN_PAD_BYTE; PIN_BUFFER_LEN];
                }
            }
            self.touch(idx);
        }
    }

    /// `SetICCID`: strips non-digits, writes the digit string into
    /// `Header.iccid` (plain BCD on the wire), and mirrors the same digits
    /// into `MF.EF_ICCID` when present, using the swapped-BCD convention
    /// the on-card ICCID file actually uses (see `named_ef` and
    /// DESIGN.md's "ICCID nibble order" entry).
    pub fn set_iccid(&mut self, iccid: &str) -> Result<(), BuildError> {
        let digits: String = iccid.chars().filter(char::is_ascii_digit).collect();
        let header_idx = self.header_idx.ok_or(BuildError::MissingApp("ProfileHeader"))?;
        if let ElementValue::Header(h) = &mut self.elements[header_idx].value {
            h.iccid = digits.clone();
        }
        self.touch(header_idx);

        if let Some(mf_idx) = self.mf_idx {
            if let ElementValue::Df(df) = &mut self.elements[mf_idx].value {
                if let Some(ef) = df.named_efs.get_mut("iccid") {
                    ef.set_content(primitives::encode_swapped_bcd(&digits));
                }
            }
            self.touch(mf_idx);
        }
        Ok(())
    }

    /// `SetIMSI`: writes the IMSI EF content format into `USIM.EF_IMSI`.
    /// Fails with `MissingApp` when the template has no USIM application —
    /// OptUSIM is left alone, matching the read side's USIM-only
    /// `get_imsi`.
    pub fn set_imsi(&mut self, imsi: &str) -> Result<(), BuildError> {
        let usim_idx = self.usim_idx.ok_or(BuildError::MissingApp("USIM"))?;
        let content = primitives::encode_imsi(imsi);
        if let ElementValue::Df(df) = &mut self.elements[usim_idx].value {
            let ef = df.named_efs.entry("imsi".to_string()).or_default();
            ef.set_content(content);
        }
        self.touch(usim_idx);
        Ok(())
    }

    /// `SetKi`: writes to the first `AKAParameter.algoConfiguration.key`.
    /// Fails with `MissingAka` when the template has no AKA parameter
    /// element, `BadLength` when `ki` is not 16 or 32 bytes.
    pub fn set_ki(&mut self, ki: &[u8]) -> Result<(), BuildError> {
        if ki.len() != 16 && ki.len() != 32 {
            return Err(BuildError::BadLength { field: "ki", expected: &[16, 32] });
        }
        let idx = *self.aka_parameter_idxs.first().ok_or(BuildError::MissingAka)?;
        if let ElementValue::AkaParameter(a) = &mut self.elements[idx].value {
            a.algo_configuration.key = ki.to_vec();
        }
        self.touch(idx);
        Ok(())
    }

    /// `SetOPC`: writes to the first `AKAParameter.algoConfiguration.opc`.
    pub fn set_opc(&mut self, opc: &[u8]) -> Result<(), BuildError> {
        let idx = *self.aka_parameter_idxs.first().ok_or(BuildError::MissingAka)?;
        if let ElementValue::AkaParameter(a) = &mut self.elements[idx].value {
            a.algo_configuration.opc = opc.to_vec();
        }
        self.touch(idx);
        Ok(())
    }

    /// `SetPUK`: writes one PUK entry by key reference. Kept distinct from
    /// `apply_security_codes`' PIN handling since PUK and PIN live in
    /// separate Profile Elements (`TagPukCodes`/`TagPinCodes`).
    pub fn set_puk(&mut self, key_ref: u8, puk: &str) -> Result<(), BuildError> {
        let value = encode_pin_value(puk)?;
        let idx = self.puk_codes_idx.ok_or(BuildError::MissingPin)?;
        if let ElementValue::PukCodes(p) = &mut self.elements[idx].value {
            p.set(key_ref, value);
        }
        self.touch(idx);
        Ok(())
    }

    fn apply_security_codes(&mut self, cfg: &BuildConfig) -> Result<(), BuildError> {
        let pins: &[(Option<&String>, u8)] = &[
            (cfg.pin1.as_ref(), KeyRef::PinAppl1 as u8),
            (cfg.pin2.as_ref(), KeyRef::SecondPinAppl1 as u8),
            (cfg.adm1.as_ref(), KeyRef::Adm1 as u8),
            (cfg.adm2.as_ref(), KeyRef::Adm2 as u8),
        ];
        let mut touched = false;
        for (value, key_ref) in pins {
            let Some(value) = value else { continue };
            let encoded = encode_pin_value(value)?;
            let idx = self.pin_codes_idx.ok_or(BuildError::MissingPin)?;
            if let ElementValue::PinCodes(p) = &mut self.elements[idx].value {
                p.set(*key_ref, encoded);
            }
            touched = true;
        }
        if touched {
            if let Some(idx) = self.pin_codes_idx {
                self.touch(idx);
            }
        }

        if let Some(puk1) = &cfg.puk1 {
            self.set_puk(KeyRef::puk_appl1(), puk1)?;
        }
        if let Some(puk2) = &cfg.puk2 {
            self.set_puk(KeyRef::second_puk_appl1(), puk2)?;
        }
        Ok(())
    }

    /// `applyISIMConfig`: writes IMPI/IMPU/DOMAIN UTF-8 TLVs into the
    /// respective EFs' `FillContents[0]`, clearing each EF's `raw` op list
    /// so the encoder re-serializes from the typed model rather than
    /// reproducing whatever op sequence the template used.
    fn apply_isim_config(&mut self, isim: &IsimConfig) -> Result<(), BuildError> {
        let isim_idx = self.isim_idx.ok_or(BuildError::MissingApp("ISIM"))?;
        if let ElementValue::Df(df) = &mut self.elements[isim_idx].value {
            if let Some(impi) = &isim.impi {
                let content = primitives::encode_utf8_tlv(impi)?;
                df.named_efs.entry("impi".to_string()).or_default().replace_with_content(content);
            }
            if !isim.impu.is_empty() {
                let mut content = Vec::new();
                for entry in &isim.impu {
                    content.extend(primitives::encode_utf8_tlv(entry)?);
                }
                df.named_efs.entry("impu".to_string()).or_default().replace_with_content(content);
            }
            if let Some(domain) = &isim.domain {
                let content = primitives::encode_utf8_tlv(domain)?;
                df.named_efs.entry("domain".to_string()).or_default().replace_with_content(content);
            }
        }
        self.touch(isim_idx);
        Ok(())
    }

    /// Scans every `Application` record's STORE DATA personalization
    /// APDUs for a Ki/OPc pair (the "MilenageUSIM personalization block"),
    /// returning the first complete pair found.
    fn find_applet_milenage_params(&self) -> Option<(Vec<u8>, Vec<u8>)> {
        for app in self.applications() {
            let mut ki = None;
            let mut opc = None;
            for entry in &app.process_data {
                let Some((tag, value)) = parse_store_data_apdu(entry) else { continue };
                if tag == store_data_tag::KI {
                    ki = Some(value);
                } else if tag == store_data_tag::OPC {
                    opc = Some(value);
                }
            }
            if let (Some(ki), Some(opc)) = (ki, opc) {
                return Some((ki, opc));
            }
        }
        None
    }

    /// Applet add: builds a new `Application` instance record — default
    /// privileges `00 00 00`, life-cycle state `0x07` ("selectable"),
    /// `C9` parameters `81 00` — with one STORE DATA APDU per Milenage
    /// personalization field (Ki mandatory, OPc/OP/AMF/SQN as supplied;
    /// AMF defaults to `80 00`). The new element is inserted just before
    /// `End` when present, otherwise appended.
    fn add_applet(
        &mut self,
        applet: &AppletConfig,
        ki: Option<&[u8]>,
        opc: Option<&[u8]>,
    ) -> Result<(), BuildError> {
        let ki = ki.ok_or(BuildError::OutOfRange("ki required to personalize a new applet"))?;
        if ki.len() != 16 && ki.len() != 32 {
            return Err(BuildError::BadLength { field: "ki", expected: &[16, 32] });
        }

        let mut record = SecurityDomainOrApplication::with_defaults(applet.instance_aid.clone());

        let mut apdus = Vec::new();
        push_store_data_apdu(&mut apdus, store_data_tag::KI, ki);
        if let Some(opc) = opc.filter(|o| !o.is_empty()) {
            push_store_data_apdu(&mut apdus, store_data_tag::OPC, opc);
        }
        if let Some(op) = &applet.op {
            push_store_data_apdu(&mut apdus, store_data_tag::OP, op);
        }
        let amf = applet.amf.unwrap_or(DEFAULT_AMF);
        push_store_data_apdu(&mut apdus, store_data_tag::AMF, &amf);
        if let Some(sqn) = &applet.sqn {
            push_store_data_apdu(&mut apdus, store_data_tag::SQN, sqn);
        }
        record.process_data = apdus;

        let element = ProfileElement::new(PeTag::Application as u8, ElementValue::Application(record));
        match self.end_idx {
            Some(end_idx) => self.elements.insert(end_idx, element),
            None => self.elements.push(element),
        }
        self.reindex();
        Ok(())
    }

    /// Applies a `BuildConfig` to an already-sanitized profile. Not public
    /// on its own — use `Profile::build`, which sequences clone, sanitize,
    /// and apply in the order the format requires.
    fn apply(&mut self, cfg: &BuildConfig) -> Result<(), BuildError> {
        if let Some(iccid) = &cfg.iccid {
            self.set_iccid(iccid)?;
        }
        if let Some(imsi) = &cfg.imsi {
            self.set_imsi(imsi)?;
        }

        if let Some(applet_cfg) = &cfg.applet {
            self.add_applet(applet_cfg, cfg.ki.as_deref(), cfg.opc.as_deref())?;
        }

        let applet_auth = cfg.applet.as_ref().is_some_and(|a| a.applet_auth);
        if applet_auth {
            let (ki, opc) = self
                .find_applet_milenage_params()
                .ok_or(BuildError::MissingApp("applet Milenage personalization block"))?;
            self.set_ki(&ki)?;
            self.set_opc(&opc)?;
            let idxs = self.aka_parameter_idxs.clone();
            for aka in self.aka_parameters_mut() {
                aka.algo_configuration.algorithm_id = AlgorithmId::UsimTest as u8;
            }
            for idx in idxs {
                self.touch(idx);
            }
        } else {
            if let Some(ki) = &cfg.ki {
                self.set_ki(ki)?;
            }
            if let Some(opc) = &cfg.opc {
                self.set_opc(opc)?;
            }
            if let Some(algorithm_id) = cfg.algorithm_id {
                let idxs = self.aka_parameter_idxs.clone();
                for aka in self.aka_parameters_mut() {
                    aka.algo_configuration.algorithm_id = algorithm_id;
                }
                for idx in idxs {
                    self.touch(idx);
                }
            }
        }

        self.apply_security_codes(cfg)?;
        if let Some(isim) = &cfg.isim {
            self.apply_isim_config(isim)?;
        }
        Ok(())
    }

    /// Builds a personalized profile from `template`: clone, sanitize,
    /// apply, in that order. `template` itself is never mutated.
    pub fn build(template: &Profile, cfg: &BuildConfig) -> Result<Profile, BuildError> {
        let mut profile = template.clone_template();
        profile.sanitize();
        profile.apply(cfg)?;
        Ok(profile)
    }

    #[must_use]
    pub fn get_iccid(&self) -> Option<String> {
        self.header().map(|h| h.iccid.clone())
    }

    #[must_use]
    pub fn get_imsi(&self) -> Option<String> {
        let ef = self.usim()?.named_efs.get("imsi")?;
        let entry = ef.fill_contents.first()?;
        primitives::decode_imsi(&entry.content).ok()
    }

    #[must_use]
    pub fn get_ki(&self) -> Option<Vec<u8>> {
        self.aka_parameters().first().map(|a| a.algo_configuration.key.clone())
    }

    #[must_use]
    pub fn get_opc(&self) -> Option<Vec<u8>> {
        self.aka_parameters().first().map(|a| a.algo_configuration.opc.clone())
    }

    #[must_use]
    pub fn get_pin(&self, key_ref: u8) -> Option<[u8; PIN_BUFFER_LEN]> {
        self.pin_codes()?.find(key_ref).map(|e| e.value)
    }

    #[must_use]
    pub fn get_puk(&self, key_ref: u8) -> Option<[u8; PIN_BUFFER_LEN]> {
        self.puk_codes()?.find(key_ref).map(|e| e.value)
    }
}
