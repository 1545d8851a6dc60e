//! Tag tables and named constants for the Profile Element format: the
//! outer PE tag map, mandatory-service identifiers, PIN/PUK key
//! references, algorithm IDs, and the GlobalPlatform private tags used
//! inside SecurityDomain/Application records.

use num_enum::TryFromPrimitive;

/// Outer context-specific tag numbers identifying each kind of Profile
/// Element. Numeric values for `End`, `GenericFileManagementList`,
/// `SecurityDomain`, `RFM`, and `Application` are this crate's concrete
/// choice among the SAIP-revision-dependent assignments the format leaves
/// to implementers (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum PeTag {
    ProfileHeader = 0,
    Mf = 1,
    PukCodes = 2,
    PinCodes = 3,
    Telecom = 4,
    GenericFileManagement = 5,
    GsmAccess = 7,
    Usim = 8,
    OptUsim = 9,
    Isim = 10,
    OptIsim = 11,
    Csim = 12,
    OptCsim = 13,
    AkaParameter = 22,
    CdmaParameter = 23,
    Df5gs = 24,
    DfSaip = 25,
    End = 26,
    GenericFileManagementList = 54,
    SecurityDomain = 55,
    Rfm = 56,
    Application = 29,
}

/// Inner NULL-tag identifiers for `ProfileHeader.mandatoryServices`. Only
/// the subset the format calls out by name carries a symbolic constant;
/// any other tag in `[1..29]` is still recorded, just without a name.
pub mod mandatory_service {
    pub const USIM: u8 = 1;
    pub const ISIM: u8 = 2;
    pub const CSIM: u8 = 3;
    pub const USIM_TEST_ALGORITHM: u8 = 17;
    pub const BER_TLV: u8 = 18;
    pub const GET_IDENTITY: u8 = 21;
    pub const PROFILE_A_X25519: u8 = 22;
    pub const PROFILE_B_P256: u8 = 23;
}

/// One-byte key references used by `PINCodes`/`PUKCodes` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum KeyRef {
    PinAppl1 = 0x01,
    SecondPinAppl1 = 0x81,
    Adm1 = 0x0A,
    Adm2 = 0x0B,
}

impl KeyRef {
    #[must_use]
    pub fn puk_appl1() -> u8 {
        0x01
    }

    #[must_use]
    pub fn second_puk_appl1() -> u8 {
        0x81
    }
}

/// `AKAParameter.algoConfiguration.algorithmID` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum AlgorithmId {
    Milenage = 1,
    Tuak = 2,
    UsimTest = 3,
}

/// Default LCSI byte for a `FileDescriptor` when absent from the input.
pub const DEFAULT_LCSI: u8 = 0x05;

/// Default life-cycle state for a newly built `Application`/`SecurityDomain`
/// instance record: "selectable".
pub const DEFAULT_LIFE_CYCLE_STATE: u8 = 0x07;

/// Fixed buffer length for PIN/PUK/ADM values; unused trailing bytes are
/// padded with `PIN_PAD_BYTE`.
pub const PIN_BUFFER_LEN: usize = 8;
pub const PIN_PAD_BYTE: u8 = 0xFF;

/// `ElementaryFile` inner CHOICE sub-tags.
pub mod ef_choice {
    pub const DO_NOT_CREATE: u32 = 0;
    pub const FILE_DESCRIPTOR: u32 = 1;
    pub const FILL_FILE_OFFSET: u32 = 2;
    pub const FILL_FILE_CONTENT: u32 = 3;
}

/// Private-class `FileDescriptor` field tags.
pub mod file_descriptor_tag {
    pub const PIN_STATUS_TEMPLATE_DO: u32 = 6;
    pub const LINK_PATH: u32 = 7;
}

/// IMPLICIT tags inside `GenericFileManagement.FileManagementCMD`.
pub mod gfm_tag {
    pub const FILE_PATH: u8 = 0x80;
    pub const CREATE_FCP: u8 = 0x62;
    pub const FILL_FILE_CONTENT: u8 = 0x82;
    pub const FILL_FILE_OFFSET: u8 = 0x83;
}

/// GlobalPlatform private-class tags used by `SecurityDomain`/`Application`.
pub mod gp_tag {
    /// Application-class AID tag (shared by package/class/instance/SD AIDs).
    pub const AID: u32 = 15;
    pub const PRIVILEGES: u8 = 0xC1;
    pub const C9_PARAMS: u8 = 0xC9;
    pub const APPLICATION_PARAMETERS: u8 = 0xEA;
    pub const SYSTEM_SPECIFIC_PARAMETERS: u8 = 0xCF;
    pub const NON_VOLATILE_MEMORY_LIMIT: u8 = 0xC6;
    pub const VOLATILE_MEMORY_LIMIT: u8 = 0xC7;
    pub const VOLATILE_MEMORY_LIMIT_FOR_RECOVERY: u8 = 0xC8;

    pub const KEY_USAGE_QUALIFIER: u8 = 0x95;
    pub const KEY_ACCESS: u8 = 0x96;
    pub const KEY_IDENTIFIER: u8 = 0x82;
    pub const KEY_VERSION_NUMBER: u8 = 0x83;

    pub const KEY_COMPONENT_TYPE: u32 = 0;
    pub const KEY_COMPONENT_DATA: u32 = 6;
    pub const KEY_COMPONENT_MAC_LENGTH: u32 = 7;
    pub const DEFAULT_MAC_LENGTH: u8 = 8;
}

/// STORE DATA APDU tags for Milenage personalization.
pub mod store_data_tag {
    pub const KI: u8 = 0x01;
    pub const OPC: u8 = 0x02;
    pub const OP: u8 = 0x03;
    pub const AMF: u8 = 0x04;
    pub const SQN: u8 = 0x05;
}

/// Default Authentication Management Field used when the config does not
/// override it.
pub const DEFAULT_AMF: [u8; 2] = [0x80, 0x00];

/// APDU header bytes for a STORE DATA command.
pub mod apdu {
    pub const CLA: u8 = 0x80;
    pub const INS_STORE_DATA: u8 = 0xE2;
    pub const P1: u8 = 0x00;
    pub const P2: u8 = 0x00;
}

/// Named elementary-file sub-tags within a `DedicatedFile`. The public format
/// description gives no authoritative per-PE EF schedule (see
/// `decode::filesystem`'s module doc), so this crate assigns the handful of
/// EFs the builder needs to address by name — ICCID under MF, IMSI under
/// USIM/OptUSIM, IMPI/IMPU/DOMAIN under ISIM/OptISIM — concrete sub-tag
/// numbers, documented as this crate's own choice in DESIGN.md. Any other
/// sub-tag still round-trips via `additional_efs`.
pub mod named_ef {
    use super::PeTag;

    #[must_use]
    pub fn sub_tag(pe_tag: PeTag, name: &str) -> Option<u32> {
        match (pe_tag, name) {
            (PeTag::Mf, "iccid") => Some(2),
            (PeTag::Usim | PeTag::OptUsim, "imsi") => Some(2),
            (PeTag::Isim | PeTag::OptIsim, "impi") => Some(2),
            (PeTag::Isim | PeTag::OptIsim, "impu") => Some(3),
            (PeTag::Isim | PeTag::OptIsim, "domain") => Some(4),
            _ => None,
        }
    }

    #[must_use]
    pub fn name_for(pe_tag: PeTag, sub_tag: u32) -> Option<&'static str> {
        match (pe_tag, sub_tag) {
            (PeTag::Mf, 2) => Some("iccid"),
            (PeTag::Usim | PeTag::OptUsim, 2) => Some("imsi"),
            (PeTag::Isim | PeTag::OptIsim, 2) => Some("impi"),
            (PeTag::Isim | PeTag::OptIsim, 3) => Some("impu"),
            (PeTag::Isim | PeTag::OptIsim, 4) => Some("domain"),
            _ => None,
        }
    }
}

/// Text-notation choice-name ↔ PE tag mapping, used by both the parser and
/// the generator so the two stay in lock-step.
pub const CHOICE_NAMES: &[(&str, u8)] = &[
    ("header", PeTag::ProfileHeader as u8),
    ("mf", PeTag::Mf as u8),
    ("pukCodes", PeTag::PukCodes as u8),
    ("pinCodes", PeTag::PinCodes as u8),
    ("telecom", PeTag::Telecom as u8),
    ("usim", PeTag::Usim as u8),
    ("opt-usim", PeTag::OptUsim as u8),
    ("isim", PeTag::Isim as u8),
    ("opt-isim", PeTag::OptIsim as u8),
    ("csim", PeTag::Csim as u8),
    ("opt-csim", PeTag::OptCsim as u8),
    ("gsm-access", PeTag::GsmAccess as u8),
    ("akaParameter", PeTag::AkaParameter as u8),
    ("cdmaParameter", PeTag::CdmaParameter as u8),
    ("df-5gs", PeTag::Df5gs as u8),
    ("df-saip", PeTag::DfSaip as u8),
    ("genericFileManagement", PeTag::GenericFileManagement as u8),
    ("securityDomain", PeTag::SecurityDomain as u8),
    ("rfm", PeTag::Rfm as u8),
    ("application", PeTag::Application as u8),
    ("end", PeTag::End as u8),
];

#[must_use]
pub fn choice_name_for_tag(tag: u8) -> Option<&'static str> {
    CHOICE_NAMES.iter().find(|(_, t)| *t == tag).map(|(n, _)| *n)
}

#[must_use]
pub fn tag_for_choice_name(name: &str) -> Option<u8> {
    CHOICE_NAMES.iter().find(|(n, _)| *n == name).map(|(_, t)| *t)
}

/// Named key references recognized by the text parser.
pub const NAMED_KEY_REFS: &[(&str, u8)] = &[
    ("pinAppl1", 0x01),
    ("secondPINAppl1", 0x81),
    ("adm1", 0x0A),
    ("adm2", 0x0B),
    ("pukAppl1", 0x01),
    ("secondPUKAppl1", 0x81),
];

#[must_use]
pub fn named_key_ref(name: &str) -> Option<u8> {
    NAMED_KEY_REFS.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
}

/// Named algorithm IDs recognized by the text parser.
pub const NAMED_ALGORITHM_IDS: &[(&str, u8)] = &[
    ("milenage", AlgorithmId::Milenage as u8),
    ("tuak", AlgorithmId::Tuak as u8),
    ("usim-test-algorithm", AlgorithmId::UsimTest as u8),
];

#[must_use]
pub fn named_algorithm_id(name: &str) -> Option<u8> {
    NAMED_ALGORITHM_IDS.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
}
