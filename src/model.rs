//! The in-memory `Profile` model: the typed tree that the binary decoder,
//! the text parser, the encoder, the text generator, and the builder all
//! share. Nothing in this module knows about DER or value notation — it is
//! pure data plus the small amount of bookkeeping (`reindex`,
//! `check_invariants`) that keeps the convenience indices honest.

use std::collections::BTreeMap;

/// One Profile Element: a tag number, its typed payload, and an optional
/// snapshot of the original outer TLV bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileElement {
    pub tag: u8,
    pub value: ElementValue,
    /// Full outer TLV bytes (header + value) captured at decode time.
    /// `None` once the element has been invalidated by a mutation, or for
    /// an element that was never decoded from bytes in the first place.
    pub raw: Option<Vec<u8>>,
}

impl ProfileElement {
    #[must_use]
    pub fn new(tag: u8, value: ElementValue) -> Self {
        Self { tag, value, raw: None }
    }

    #[must_use]
    pub fn with_raw(tag: u8, value: ElementValue, raw: Vec<u8>) -> Self {
        Self { tag, value, raw: Some(raw) }
    }

    /// Drops the raw-bytes cache for this element, forcing the encoder onto
    /// the full re-serialization path. This is the crate's realization of
    /// the "invalidate(tag)" contract: consuming the cache rather than
    /// flipping a separate dirty flag, so there is nothing that can go
    /// stale.
    pub fn invalidate(&mut self) {
        self.raw = None;
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.raw.is_none()
    }
}

/// The closed set of Profile Element payload kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    Header(ProfileHeader),
    Df(DedicatedFile),
    PukCodes(PukCodes),
    PinCodes(PinCodes),
    GenericFileManagement(GenericFileManagement),
    GenericFileManagementList(Vec<GenericFileManagement>),
    AkaParameter(AkaParameter),
    CdmaParameter(CdmaParameter),
    SecurityDomain(SecurityDomainOrApplication),
    Application(SecurityDomainOrApplication),
    Rfm(Rfm),
    End,
}

/// `ProfileHeader` — sub-tags 0..9.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfileHeader {
    pub major_version: u64,
    pub minor_version: u64,
    pub profile_type: String,
    pub iccid: String,
    /// Inner NULL-tag numbers found under `mandatoryServices`, in decode order.
    pub mandatory_services: Vec<u8>,
    /// Mandatory GFSTE OID list, each OID as its decoded component sequence.
    pub mandatory_gfste_oids: Vec<Vec<u64>>,
}

/// A dedicated file PE: MasterFile, Telecom, USIM, OptUSIM, ISIM, OptISIM,
/// CSIM, OptCSIM, GSMAccess, DF5GS, DFSAIP all share this shape. Which kind
/// it is is determined entirely by the outer PE tag (see `consts::PeTag`),
/// not by anything inside this struct.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DedicatedFile {
    pub template_oid: Vec<u64>,
    pub file_descriptor: Option<FileDescriptor>,
    /// Named elementary files, keyed by their symbolic name (e.g. "iccid",
    /// "imsi") for the handful the format names explicitly.
    pub named_efs: BTreeMap<String, ElementaryFile>,
    /// Elementary files under sub-tags this crate does not give a symbolic
    /// name to, keyed by `"tag_<n>"`.
    pub additional_efs: BTreeMap<String, ElementaryFile>,
}

/// Mirrors ISO-7816 FCP.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FileDescriptor {
    pub file_descriptor_bytes: Vec<u8>,
    pub file_id: [u8; 2],
    pub df_name: Vec<u8>,
    pub lcsi: u8,
    pub security_attributes: Vec<u8>,
    pub short_ef_id: Option<u8>,
    pub ef_file_size: Option<u64>,
    pub pin_status_template_do: Option<Vec<u8>>,
    pub link_path: Option<Vec<u8>>,
    pub proprietary_ef_info: Option<ProprietaryEfInfo>,
}

impl FileDescriptor {
    #[must_use]
    pub fn with_default_lcsi() -> Self {
        Self {
            lcsi: crate::consts::DEFAULT_LCSI,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProprietaryEfInfo {
    pub fill_pattern: Option<Vec<u8>>,
    pub repeat_pattern: Option<Vec<u8>>,
}

/// One `SEQUENCE OF CHOICE` entry inside an `ElementaryFile`.
#[derive(Debug, Clone, PartialEq)]
pub enum EfOperation {
    DoNotCreate,
    Descriptor(FileDescriptor),
    FillFileOffset(u64),
    FillFileContent(Vec<u8>),
}

/// One denormalized fill entry: an absolute offset plus content bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct FillEntry {
    pub offset: u64,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementaryFile {
    pub file_descriptor: Option<FileDescriptor>,
    /// Source-of-truth operation sequence, in template order.
    pub raw: Vec<EfOperation>,
    /// Derived view: offset + content, recomputed from `raw`'s running
    /// fill-offset rule whenever `raw` is rebuilt from scratch.
    pub fill_contents: Vec<FillEntry>,
}

impl ElementaryFile {
    /// Recomputes `fill_contents` from `raw`, applying the running-offset
    /// rule: a `FillFileOffset` sets the offset the next `FillFileContent`
    /// is recorded at; absent an explicit offset, content is appended
    /// immediately following the previous entry.
    pub fn recompute_fill_contents(&mut self) {
        self.fill_contents.clear();
        let mut next_offset: u64 = 0;
        for op in &self.raw {
            match op {
                EfOperation::FillFileOffset(offset) => next_offset = *offset,
                EfOperation::FillFileContent(content) => {
                    self.fill_contents.push(FillEntry {
                        offset: next_offset,
                        content: content.clone(),
                    });
                    next_offset += content.len() as u64;
                }
                EfOperation::DoNotCreate | EfOperation::Descriptor(_) => {}
            }
        }
    }

    /// Replaces (or appends) the first `FillFileContent` operation in `raw`
    /// with `content`, preserving any other ops (e.g. a leading
    /// `fileDescriptor`) and their order. Used by mutators that mirror a
    /// scalar value into an EF without disturbing the rest of its template
    /// operation sequence, e.g. ICCID/IMSI.
    pub fn set_content(&mut self, content: Vec<u8>) {
        if let Some(op) = self.raw.iter_mut().find(|op| matches!(op, EfOperation::FillFileContent(_))) {
            *op = EfOperation::FillFileContent(content);
        } else {
            self.raw.push(EfOperation::FillFileContent(content));
        }
        self.recompute_fill_contents();
    }

    /// Replaces the entire operation sequence with a single `FillFileContent`
    /// op, discarding any other ops the template carried. Used where the
    /// format calls for the encoder to "re-serialize from the typed model"
    /// rather than reproduce the template's op sequence, e.g. ISIM identity
    /// fields.
    pub fn replace_with_content(&mut self, content: Vec<u8>) {
        self.raw = vec![EfOperation::FillFileContent(content)];
        self.recompute_fill_contents();
    }
}

/// One PIN/PUK configuration entry, keyed by a one-byte key reference.
#[derive(Debug, Clone, PartialEq)]
pub struct PinConfig {
    pub key_ref: u8,
    pub value: [u8; crate::consts::PIN_BUFFER_LEN],
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PinCodes {
    pub entries: Vec<PinConfig>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PukCodes {
    pub entries: Vec<PinConfig>,
}

impl PinCodes {
    #[must_use]
    pub fn find(&self, key_ref: u8) -> Option<&PinConfig> {
        self.entries.iter().find(|e| e.key_ref == key_ref)
    }

    pub fn set(&mut self, key_ref: u8, value: [u8; crate::consts::PIN_BUFFER_LEN]) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.key_ref == key_ref) {
            entry.value = value;
        } else {
            self.entries.push(PinConfig { key_ref, value });
        }
    }
}

impl PukCodes {
    #[must_use]
    pub fn find(&self, key_ref: u8) -> Option<&PinConfig> {
        self.entries.iter().find(|e| e.key_ref == key_ref)
    }

    pub fn set(&mut self, key_ref: u8, value: [u8; crate::consts::PIN_BUFFER_LEN]) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.key_ref == key_ref) {
            entry.value = value;
        } else {
            self.entries.push(PinConfig { key_ref, value });
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlgoConfiguration {
    pub algorithm_id: u8,
    pub options: u8,
    pub key: Vec<u8>,
    pub opc: Vec<u8>,
    pub rotation_constant: Option<u8>,
    pub xoring_constant: Option<Vec<u8>>,
    pub keccak_rounds: Option<u64>,
    /// Whether this value was decoded from the `[0]`/`[1]` wrapper CHOICE
    /// arm rather than the direct-fields arm, so the encoder can reproduce
    /// the same arm on re-emission when there is no raw cache to fall
    /// back to.
    pub wrapped: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AkaParameter {
    pub algo_configuration: AlgoConfiguration,
    pub sqn_options: u8,
    pub sqn_delta: Vec<u8>,
    pub sqn_age_limit: Vec<u8>,
    pub initial_sqn_values: Vec<Vec<u8>>,
}

/// CDMA authentication parameters. The format names this PE and the
/// `Profile` convenience slot but leaves its body otherwise undocumented,
/// so fields are kept as a permissive sub-tag map with named accessors for
/// the ones test vectors agree on.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CdmaParameter {
    pub fields: BTreeMap<u32, Vec<u8>>,
}

impl CdmaParameter {
    const SSD: u32 = 0;
    const IMSI_M: u32 = 1;
    const IMSI_T: u32 = 2;
    const AKEY: u32 = 3;

    #[must_use]
    pub fn ssd(&self) -> Option<&[u8]> {
        self.fields.get(&Self::SSD).map(Vec::as_slice)
    }

    #[must_use]
    pub fn imsi_m(&self) -> Option<&[u8]> {
        self.fields.get(&Self::IMSI_M).map(Vec::as_slice)
    }

    #[must_use]
    pub fn imsi_t(&self) -> Option<&[u8]> {
        self.fields.get(&Self::IMSI_T).map(Vec::as_slice)
    }

    #[must_use]
    pub fn akey(&self) -> Option<&[u8]> {
        self.fields.get(&Self::AKEY).map(Vec::as_slice)
    }
}

/// One file-path-plus-operation command inside `GenericFileManagement`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FileManagementCmd {
    pub file_path: Option<Vec<u8>>,
    pub create_fcp: Option<Vec<u8>>,
    pub fill_file_content: Option<Vec<u8>>,
    pub fill_file_offset: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenericFileManagement {
    pub commands: Vec<FileManagementCmd>,
}

/// An ordered personalization APDU data block inside a `ProcessData`
/// sequence.
pub type ProcessDataEntry = Vec<u8>;

/// `SecurityDomain` and `Application` share the same record shape; which
/// one a given `ElementValue` variant represents is carried by the
/// enclosing variant, not by a field here.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SecurityDomainOrApplication {
    pub load_package_aid: Option<Vec<u8>>,
    pub class_aid: Option<Vec<u8>>,
    pub instance_aid: Vec<u8>,
    pub extradite_security_domain_aid: Option<Vec<u8>>,
    pub privileges: Vec<u8>,
    pub life_cycle_state: u8,
    /// GP private tag `C9` parameters, raw bytes.
    pub c9_params: Option<Vec<u8>>,
    pub application_parameters: Option<Vec<u8>>,
    pub system_specific_parameters: Option<Vec<u8>>,
    pub non_volatile_memory_limit: Option<Vec<u8>>,
    pub volatile_memory_limit: Option<Vec<u8>>,
    pub volatile_memory_limit_for_recovery: Option<Vec<u8>>,
    pub process_data: Vec<ProcessDataEntry>,
    pub keys: Vec<SdKey>,
}

impl SecurityDomainOrApplication {
    #[must_use]
    pub fn with_defaults(instance_aid: Vec<u8>) -> Self {
        Self {
            instance_aid,
            privileges: vec![0x00, 0x00, 0x00],
            life_cycle_state: crate::consts::DEFAULT_LIFE_CYCLE_STATE,
            c9_params: Some(vec![0x81, 0x00]),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeyComponent {
    pub key_type: u8,
    pub key_data: Vec<u8>,
    pub mac_length: u8,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SdKey {
    pub key_usage_qualifier: Option<u8>,
    pub key_access: Option<u8>,
    pub key_identifier: u8,
    pub key_version_number: u8,
    pub components: Vec<KeyComponent>,
}

/// `RFM` — Remote File Management configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rfm {
    pub header: Option<Vec<u8>>,
    pub tar_list: Vec<Vec<u8>>,
}

/// The root aggregate: an ordered sequence of elements plus convenience
/// indices into it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Profile {
    pub elements: Vec<ProfileElement>,
    pub header_idx: Option<usize>,
    pub mf_idx: Option<usize>,
    pub puk_codes_idx: Option<usize>,
    pub pin_codes_idx: Option<usize>,
    pub telecom_idx: Option<usize>,
    pub usim_idx: Option<usize>,
    pub opt_usim_idx: Option<usize>,
    pub isim_idx: Option<usize>,
    pub opt_isim_idx: Option<usize>,
    pub csim_idx: Option<usize>,
    pub opt_csim_idx: Option<usize>,
    pub gsm_access_idx: Option<usize>,
    pub aka_parameter_idxs: Vec<usize>,
    pub cdma_parameter_idx: Option<usize>,
    pub df_5gs_idx: Option<usize>,
    pub df_saip_idx: Option<usize>,
    pub generic_file_management_idx: Option<usize>,
    pub security_domain_idxs: Vec<usize>,
    pub rfm_idxs: Vec<usize>,
    pub application_idxs: Vec<usize>,
    pub end_idx: Option<usize>,
}

impl Profile {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an element and updates the relevant convenience index(es).
    /// This is the only way builder code should add elements, so that the
    /// indices can never drift from the vector.
    pub fn push(&mut self, element: ProfileElement) {
        let idx = self.elements.len();
        self.record_index(element.tag, idx);
        self.elements.push(element);
    }

    fn record_index(&mut self, tag: u8, idx: usize) {
        use crate::consts::PeTag;
        match PeTag::try_from(tag) {
            Ok(PeTag::ProfileHeader) => self.header_idx = Some(idx),
            Ok(PeTag::Mf) => self.mf_idx = Some(idx),
            Ok(PeTag::PukCodes) => self.puk_codes_idx = Some(idx),
            Ok(PeTag::PinCodes) => self.pin_codes_idx = Some(idx),
            Ok(PeTag::Telecom) => self.telecom_idx = Some(idx),
            Ok(PeTag::Usim) => self.usim_idx = Some(idx),
            Ok(PeTag::OptUsim) => self.opt_usim_idx = Some(idx),
            Ok(PeTag::Isim) => self.isim_idx = Some(idx),
            Ok(PeTag::OptIsim) => self.opt_isim_idx = Some(idx),
            Ok(PeTag::Csim) => self.csim_idx = Some(idx),
            Ok(PeTag::OptCsim) => self.opt_csim_idx = Some(idx),
            Ok(PeTag::GsmAccess) => self.gsm_access_idx = Some(idx),
            Ok(PeTag::AkaParameter) => self.aka_parameter_idxs.push(idx),
            Ok(PeTag::CdmaParameter) => self.cdma_parameter_idx = Some(idx),
            Ok(PeTag::Df5gs) => self.df_5gs_idx = Some(idx),
            Ok(PeTag::DfSaip) => self.df_saip_idx = Some(idx),
            Ok(PeTag::GenericFileManagement | PeTag::GenericFileManagementList) => {
                self.generic_file_management_idx = Some(idx)
            }
            Ok(PeTag::SecurityDomain) => self.security_domain_idxs.push(idx),
            Ok(PeTag::Rfm) => self.rfm_idxs.push(idx),
            Ok(PeTag::Application) => self.application_idxs.push(idx),
            Ok(PeTag::End) => self.end_idx = Some(idx),
            Err(_) => {}
        }
    }

    /// Fully recomputes every convenience index from `elements`. Used after
    /// bulk mutation (e.g. inserting an `Application` PE before `End`)
    /// where tracking the shift by hand would be error-prone.
    pub fn reindex(&mut self) {
        let elements = std::mem::take(&mut self.elements);
        *self = Profile::new();
        for element in elements {
            let tag = element.tag;
            let idx = self.elements.len();
            self.elements.push(element);
            self.record_index(tag, idx);
        }
    }

    /// Verifies every convenience index either is `None`/empty or points
    /// at an element actually present in `elements` with a matching tag
    /// family. Intended for tests, not the hot path.
    #[must_use]
    pub fn check_invariants(&self) -> bool {
        let in_bounds = |idx: Option<usize>| idx.is_none_or(|i| i < self.elements.len());
        let all_in_bounds =
            |idxs: &[usize]| idxs.iter().all(|&i| i < self.elements.len());

        in_bounds(self.header_idx)
            && in_bounds(self.mf_idx)
            && in_bounds(self.puk_codes_idx)
            && in_bounds(self.pin_codes_idx)
            && in_bounds(self.telecom_idx)
            && in_bounds(self.usim_idx)
            && in_bounds(self.opt_usim_idx)
            && in_bounds(self.isim_idx)
            && in_bounds(self.opt_isim_idx)
            && in_bounds(self.csim_idx)
            && in_bounds(self.opt_csim_idx)
            && in_bounds(self.gsm_access_idx)
            && all_in_bounds(&self.aka_parameter_idxs)
            && in_bounds(self.cdma_parameter_idx)
            && in_bounds(self.df_5gs_idx)
            && in_bounds(self.df_saip_idx)
            && in_bounds(self.generic_file_management_idx)
            && all_in_bounds(&self.security_domain_idxs)
            && all_in_bounds(&self.rfm_idxs)
            && all_in_bounds(&self.application_idxs)
            && in_bounds(self.end_idx)
    }

    #[must_use]
    pub fn header(&self) -> Option<&ProfileHeader> {
        match self.header_idx.map(|i| &self.elements[i].value) {
            Some(ElementValue::Header(h)) => Some(h),
            _ => None,
        }
    }

    pub fn header_mut(&mut self) -> Option<&mut ProfileHeader> {
        let idx = self.header_idx?;
        match &mut self.elements[idx].value {
            ElementValue::Header(h) => Some(h),
            _ => None,
        }
    }

    #[must_use]
    pub fn mf(&self) -> Option<&DedicatedFile> {
        self.df_at(self.mf_idx)
    }

    #[must_use]
    pub fn usim(&self) -> Option<&DedicatedFile> {
        self.df_at(self.usim_idx)
    }

    pub fn usim_mut(&mut self) -> Option<&mut DedicatedFile> {
        self.df_at_mut(self.usim_idx)
    }

    pub fn mf_mut(&mut self) -> Option<&mut DedicatedFile> {
        self.df_at_mut(self.mf_idx)
    }

    fn df_at(&self, idx: Option<usize>) -> Option<&DedicatedFile> {
        match idx.map(|i| &self.elements[i].value) {
            Some(ElementValue::Df(df)) => Some(df),
            _ => None,
        }
    }

    fn df_at_mut(&mut self, idx: Option<usize>) -> Option<&mut DedicatedFile> {
        let idx = idx?;
        match &mut self.elements[idx].value {
            ElementValue::Df(df) => Some(df),
            _ => None,
        }
    }

    #[must_use]
    pub fn aka_parameters(&self) -> Vec<&AkaParameter> {
        self.aka_parameter_idxs
            .iter()
            .filter_map(|&i| match &self.elements[i].value {
                ElementValue::AkaParameter(a) => Some(a),
                _ => None,
            })
            .collect()
    }

    pub fn aka_parameters_mut(&mut self) -> Vec<&mut AkaParameter> {
        let idxs = self.aka_parameter_idxs.clone();
        self.elements
            .iter_mut()
            .enumerate()
            .filter(|(i, _)| idxs.contains(i))
            .filter_map(|(_, e)| match &mut e.value {
                ElementValue::AkaParameter(a) => Some(a),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn pin_codes(&self) -> Option<&PinCodes> {
        match self.pin_codes_idx.map(|i| &self.elements[i].value) {
            Some(ElementValue::PinCodes(p)) => Some(p),
            _ => None,
        }
    }

    pub fn pin_codes_mut(&mut self) -> Option<&mut PinCodes> {
        let idx = self.pin_codes_idx?;
        match &mut self.elements[idx].value {
            ElementValue::PinCodes(p) => Some(p),
            _ => None,
        }
    }

    #[must_use]
    pub fn puk_codes(&self) -> Option<&PukCodes> {
        match self.puk_codes_idx.map(|i| &self.elements[i].value) {
            Some(ElementValue::PukCodes(p)) => Some(p),
            _ => None,
        }
    }

    pub fn puk_codes_mut(&mut self) -> Option<&mut PukCodes> {
        let idx = self.puk_codes_idx?;
        match &mut self.elements[idx].value {
            ElementValue::PukCodes(p) => Some(p),
            _ => None,
        }
    }

    #[must_use]
    pub fn applications(&self) -> Vec<&SecurityDomainOrApplication> {
        self.application_idxs
            .iter()
            .filter_map(|&i| match &self.elements[i].value {
                ElementValue::Application(a) => Some(a),
                _ => None,
            })
            .collect()
    }
}
