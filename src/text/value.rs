//! A generic value tree that both the text parser and the text generator
//! convert `ElementValue` through, so the grammar for "a PE body" only has
//! to be written once regardless of which of the 20 PE kinds it is.

use std::collections::BTreeMap;

use super::TextError;
use crate::model::{
    AkaParameter, AlgoConfiguration, CdmaParameter, DedicatedFile, EfOperation, ElementValue,
    ElementaryFile, FileDescriptor, FileManagementCmd, GenericFileManagement, KeyComponent,
    PinCodes, PinConfig, ProfileHeader, PukCodes, Rfm, SdKey, SecurityDomainOrApplication,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Number(u64),
    Hex(Vec<u8>),
    Str(String),
    List(Vec<Value>),
    Fields(Vec<(String, Value)>),
}

impl Value {
    fn field<'a>(&'a self, name: &str) -> Option<&'a Value> {
        match self {
            Value::Fields(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    fn number(&self) -> u64 {
        match self {
            Value::Number(n) => *n,
            _ => 0,
        }
    }

    fn hex(&self) -> Vec<u8> {
        match self {
            Value::Hex(bytes) => bytes.clone(),
            _ => Vec::new(),
        }
    }

    fn string(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            _ => String::new(),
        }
    }

    fn list(&self) -> &[Value] {
        match self {
            Value::List(items) => items,
            _ => &[],
        }
    }
}

fn field_number(fields: &Value, name: &str) -> u64 {
    fields.field(name).map(Value::number).unwrap_or(0)
}

fn field_hex(fields: &Value, name: &str) -> Vec<u8> {
    fields.field(name).map(Value::hex).unwrap_or_default()
}

fn field_string(fields: &Value, name: &str) -> String {
    fields.field(name).map(Value::string).unwrap_or_default()
}

fn field_list<'a>(fields: &'a Value, name: &str) -> &'a [Value] {
    fields.field(name).map(Value::list).unwrap_or(&[])
}

pub(crate) fn element_value_to_value(value: &ElementValue) -> Value {
    match value {
        ElementValue::Header(h) => header_to_value(h),
        ElementValue::Df(df) => df_to_value(df),
        ElementValue::PinCodes(p) => pin_codes_to_value(p),
        ElementValue::PukCodes(p) => puk_codes_to_value(p),
        ElementValue::GenericFileManagement(g) => gfm_to_value(g),
        ElementValue::GenericFileManagementList(list) => {
            Value::Fields(vec![(
                "entries".into(),
                Value::List(list.iter().map(gfm_to_value).collect()),
            )])
        }
        ElementValue::AkaParameter(a) => aka_to_value(a),
        ElementValue::CdmaParameter(c) => cdma_to_value(c),
        ElementValue::SecurityDomain(s) | ElementValue::Application(s) => security_to_value(s),
        ElementValue::Rfm(r) => rfm_to_value(r),
        ElementValue::End => Value::Null,
    }
}

pub(crate) fn value_to_element_value(tag: u8, value: &Value) -> Result<ElementValue, TextError> {
    use crate::consts::PeTag;
    let pe_tag = PeTag::try_from(tag).map_err(|_| TextError::UnknownSymbol(format!("tag_{tag}")))?;
    Ok(match pe_tag {
        PeTag::ProfileHeader => ElementValue::Header(value_to_header(value)),
        PeTag::Mf
        | PeTag::Telecom
        | PeTag::Usim
        | PeTag::OptUsim
        | PeTag::Isim
        | PeTag::OptIsim
        | PeTag::Csim
        | PeTag::OptCsim
        | PeTag::GsmAccess
        | PeTag::Df5gs
        | PeTag::DfSaip => ElementValue::Df(value_to_df(value)),
        PeTag::PukCodes => ElementValue::PukCodes(value_to_puk_codes(value)),
        PeTag::PinCodes => ElementValue::PinCodes(value_to_pin_codes(value)),
        PeTag::AkaParameter => ElementValue::AkaParameter(value_to_aka(value)),
        PeTag::CdmaParameter => ElementValue::CdmaParameter(value_to_cdma(value)),
        PeTag::GenericFileManagement => ElementValue::GenericFileManagement(value_to_gfm(value)),
        PeTag::GenericFileManagementList => {
            let entries = field_list(value, "entries").iter().map(value_to_gfm).collect();
            ElementValue::GenericFileManagementList(entries)
        }
        PeTag::SecurityDomain => ElementValue::SecurityDomain(value_to_security(value)),
        PeTag::Application => ElementValue::Application(value_to_security(value)),
        PeTag::Rfm => ElementValue::Rfm(value_to_rfm(value)),
        PeTag::End => ElementValue::End,
    })
}

fn header_to_value(h: &ProfileHeader) -> Value {
    Value::Fields(vec![
        ("majorVersion".into(), Value::Number(h.major_version)),
        ("minorVersion".into(), Value::Number(h.minor_version)),
        ("profileType".into(), Value::Str(h.profile_type.clone())),
        ("iccid".into(), Value::Str(h.iccid.clone())),
        (
            "mandatoryServices".into(),
            Value::List(h.mandatory_services.iter().map(|&s| Value::Number(u64::from(s))).collect()),
        ),
        (
            "mandatoryGfsteOids".into(),
            Value::List(
                h.mandatory_gfste_oids
                    .iter()
                    .map(|oid| {
                        Value::Str(
                            oid.iter()
                                .map(u64::to_string)
                                .collect::<Vec<_>>()
                                .join("."),
                        )
                    })
                    .collect(),
            ),
        ),
    ])
}

fn value_to_header(value: &Value) -> ProfileHeader {
    let oids = field_list(value, "mandatoryGfsteOids")
        .iter()
        .map(|v| {
            v.string()
                .split('.')
                .filter_map(|part| part.parse().ok())
                .collect()
        })
        .collect();
    ProfileHeader {
        major_version: field_number(value, "majorVersion"),
        minor_version: field_number(value, "minorVersion"),
        profile_type: field_string(value, "profileType"),
        iccid: field_string(value, "iccid"),
        mandatory_services: field_list(value, "mandatoryServices")
            .iter()
            .map(|v| v.number() as u8)
            .collect(),
        mandatory_gfste_oids: oids,
    }
}

fn file_descriptor_to_value(fd: &FileDescriptor) -> Value {
    Value::Fields(vec![
        ("fileDescriptorBytes".into(), Value::Hex(fd.file_descriptor_bytes.clone())),
        ("fileId".into(), Value::Hex(fd.file_id.to_vec())),
        ("dfName".into(), Value::Hex(fd.df_name.clone())),
        ("lcsi".into(), Value::Number(u64::from(fd.lcsi))),
        ("securityAttributes".into(), Value::Hex(fd.security_attributes.clone())),
        (
            "shortEfId".into(),
            fd.short_ef_id.map(|v| Value::Number(u64::from(v))).unwrap_or(Value::Null),
        ),
        (
            "efFileSize".into(),
            fd.ef_file_size.map(Value::Number).unwrap_or(Value::Null),
        ),
        (
            "pinStatusTemplateDO".into(),
            fd.pin_status_template_do.clone().map(Value::Hex).unwrap_or(Value::Null),
        ),
        ("linkPath".into(), fd.link_path.clone().map(Value::Hex).unwrap_or(Value::Null)),
    ])
}

fn value_to_file_descriptor(value: &Value) -> FileDescriptor {
    let file_id_bytes = field_hex(value, "fileId");
    FileDescriptor {
        file_descriptor_bytes: field_hex(value, "fileDescriptorBytes"),
        file_id: [
            file_id_bytes.first().copied().unwrap_or(0),
            file_id_bytes.get(1).copied().unwrap_or(0),
        ],
        df_name: field_hex(value, "dfName"),
        lcsi: field_number(value, "lcsi") as u8,
        security_attributes: field_hex(value, "securityAttributes"),
        short_ef_id: value.field("shortEfId").and_then(|v| match v {
            Value::Number(n) => Some(*n as u8),
            _ => None,
        }),
        ef_file_size: value.field("efFileSize").and_then(|v| match v {
            Value::Number(n) => Some(*n),
            _ => None,
        }),
        pin_status_template_do: value.field("pinStatusTemplateDO").and_then(|v| match v {
            Value::Hex(b) => Some(b.clone()),
            _ => None,
        }),
        link_path: value.field("linkPath").and_then(|v| match v {
            Value::Hex(b) => Some(b.clone()),
            _ => None,
        }),
        proprietary_ef_info: None,
    }
}

fn ef_to_value(ef: &ElementaryFile) -> Value {
    let ops = ef
        .raw
        .iter()
        .map(|op| match op {
            EfOperation::DoNotCreate => Value::Fields(vec![("doNotCreate".into(), Value::Null)]),
            EfOperation::Descriptor(fd) => {
                Value::Fields(vec![("fileDescriptor".into(), file_descriptor_to_value(fd))])
            }
            EfOperation::FillFileOffset(offset) => {
                Value::Fields(vec![("fillFileOffset".into(), Value::Number(*offset))])
            }
            EfOperation::FillFileContent(content) => {
                Value::Fields(vec![("fillFileContent".into(), Value::Hex(content.clone()))])
            }
        })
        .collect();
    Value::Fields(vec![("raw".into(), Value::List(ops))])
}

fn value_to_ef(value: &Value) -> ElementaryFile {
    let mut ef = ElementaryFile::default();
    for op_value in field_list(value, "raw") {
        if let Some(v) = op_value.field("doNotCreate") {
            if matches!(v, Value::Null) {
                ef.raw.push(EfOperation::DoNotCreate);
                continue;
            }
        }
        if let Some(v) = op_value.field("fileDescriptor") {
            let fd = value_to_file_descriptor(v);
            ef.file_descriptor = Some(fd.clone());
            ef.raw.push(EfOperation::Descriptor(fd));
            continue;
        }
        if let Some(v) = op_value.field("fillFileOffset") {
            ef.raw.push(EfOperation::FillFileOffset(v.number()));
            continue;
        }
        if let Some(v) = op_value.field("fillFileContent") {
            ef.raw.push(EfOperation::FillFileContent(v.hex()));
        }
    }
    ef.recompute_fill_contents();
    ef
}

fn df_to_value(df: &DedicatedFile) -> Value {
    let mut efs = Vec::new();
    for (key, ef) in df.named_efs.iter().chain(df.additional_efs.iter()) {
        efs.push(Value::Fields(vec![
            ("name".into(), Value::Str(key.clone())),
            ("file".into(), ef_to_value(ef)),
        ]));
    }
    Value::Fields(vec![
        (
            "templateOid".into(),
            Value::Str(df.template_oid.iter().map(u64::to_string).collect::<Vec<_>>().join(".")),
        ),
        (
            "fileDescriptor".into(),
            df.file_descriptor.as_ref().map(file_descriptor_to_value).unwrap_or(Value::Null),
        ),
        ("efs".into(), Value::List(efs)),
    ])
}

fn value_to_df(value: &Value) -> DedicatedFile {
    let mut df = DedicatedFile::default();
    let oid_str = field_string(value, "templateOid");
    if !oid_str.is_empty() {
        df.template_oid = oid_str.split('.').filter_map(|p| p.parse().ok()).collect();
    }
    if let Some(fd_value) = value.field("fileDescriptor") {
        if !matches!(fd_value, Value::Null) {
            df.file_descriptor = Some(value_to_file_descriptor(fd_value));
        }
    }
    for entry in field_list(value, "efs") {
        let name = field_string(entry, "name");
        let ef = entry.field("file").map(value_to_ef).unwrap_or_default();
        if name.starts_with("tag_") {
            df.additional_efs.insert(name, ef);
        } else {
            df.named_efs.insert(name, ef);
        }
    }
    df
}

fn pin_entry_to_value(entry: &PinConfig) -> Value {
    Value::Fields(vec![
        ("keyRef".into(), Value::Number(u64::from(entry.key_ref))),
        ("value".into(), Value::Hex(entry.value.to_vec())),
    ])
}

fn value_to_pin_entry(value: &Value) -> PinConfig {
    let bytes = field_hex(value, "value");
    let mut buf = [0xFFu8; crate::consts::PIN_BUFFER_LEN];
    let n = bytes.len().min(buf.len());
    buf[..n].copy_from_slice(&bytes[..n]);
    PinConfig {
        key_ref: field_number(value, "keyRef") as u8,
        value: buf,
    }
}

fn pin_codes_to_value(codes: &PinCodes) -> Value {
    Value::Fields(vec![(
        "entries".into(),
        Value::List(codes.entries.iter().map(pin_entry_to_value).collect()),
    )])
}

fn value_to_pin_codes(value: &Value) -> PinCodes {
    PinCodes {
        entries: field_list(value, "entries").iter().map(value_to_pin_entry).collect(),
    }
}

fn puk_codes_to_value(codes: &PukCodes) -> Value {
    Value::Fields(vec![(
        "entries".into(),
        Value::List(codes.entries.iter().map(pin_entry_to_value).collect()),
    )])
}

fn value_to_puk_codes(value: &Value) -> PukCodes {
    PukCodes {
        entries: field_list(value, "entries").iter().map(value_to_pin_entry).collect(),
    }
}

fn algo_configuration_to_value(cfg: &AlgoConfiguration) -> Value {
    Value::Fields(vec![
        ("algorithmId".into(), Value::Number(u64::from(cfg.algorithm_id))),
        ("options".into(), Value::Number(u64::from(cfg.options))),
        ("key".into(), Value::Hex(cfg.key.clone())),
        ("opc".into(), Value::Hex(cfg.opc.clone())),
        (
            "rotationConstant".into(),
            cfg.rotation_constant.map(|v| Value::Number(u64::from(v))).unwrap_or(Value::Null),
        ),
        (
            "xoringConstant".into(),
            cfg.xoring_constant.clone().map(Value::Hex).unwrap_or(Value::Null),
        ),
        (
            "keccakRounds".into(),
            cfg.keccak_rounds.map(Value::Number).unwrap_or(Value::Null),
        ),
        ("wrapped".into(), Value::Number(u64::from(cfg.wrapped))),
    ])
}

fn value_to_algo_configuration(value: &Value) -> AlgoConfiguration {
    AlgoConfiguration {
        algorithm_id: field_number(value, "algorithmId") as u8,
        options: field_number(value, "options") as u8,
        key: field_hex(value, "key"),
        opc: field_hex(value, "opc"),
        rotation_constant: value.field("rotationConstant").and_then(|v| match v {
            Value::Number(n) => Some(*n as u8),
            _ => None,
        }),
        xoring_constant: value.field("xoringConstant").and_then(|v| match v {
            Value::Hex(b) => Some(b.clone()),
            _ => None,
        }),
        keccak_rounds: value.field("keccakRounds").and_then(|v| match v {
            Value::Number(n) => Some(*n),
            _ => None,
        }),
        wrapped: field_number(value, "wrapped") != 0,
    }
}

fn aka_to_value(aka: &AkaParameter) -> Value {
    Value::Fields(vec![
        ("algoConfiguration".into(), algo_configuration_to_value(&aka.algo_configuration)),
        ("sqnOptions".into(), Value::Number(u64::from(aka.sqn_options))),
        ("sqnDelta".into(), Value::Hex(aka.sqn_delta.clone())),
        ("sqnAgeLimit".into(), Value::Hex(aka.sqn_age_limit.clone())),
        (
            "initialSqnValues".into(),
            Value::List(aka.initial_sqn_values.iter().cloned().map(Value::Hex).collect()),
        ),
    ])
}

fn value_to_aka(value: &Value) -> AkaParameter {
    AkaParameter {
        algo_configuration: value
            .field("algoConfiguration")
            .map(value_to_algo_configuration)
            .unwrap_or_default(),
        sqn_options: field_number(value, "sqnOptions") as u8,
        sqn_delta: field_hex(value, "sqnDelta"),
        sqn_age_limit: field_hex(value, "sqnAgeLimit"),
        initial_sqn_values: field_list(value, "initialSqnValues").iter().map(Value::hex).collect(),
    }
}

fn cdma_to_value(cdma: &CdmaParameter) -> Value {
    let entries = cdma
        .fields
        .iter()
        .map(|(&tag, bytes)| {
            Value::Fields(vec![
                ("tag".into(), Value::Number(u64::from(tag))),
                ("value".into(), Value::Hex(bytes.clone())),
            ])
        })
        .collect();
    Value::Fields(vec![("fields".into(), Value::List(entries))])
}

fn value_to_cdma(value: &Value) -> CdmaParameter {
    let mut fields = BTreeMap::new();
    for entry in field_list(value, "fields") {
        fields.insert(field_number(entry, "tag") as u32, field_hex(entry, "value"));
    }
    CdmaParameter { fields }
}

fn cmd_to_value(cmd: &FileManagementCmd) -> Value {
    Value::Fields(vec![
        ("filePath".into(), cmd.file_path.clone().map(Value::Hex).unwrap_or(Value::Null)),
        ("createFcp".into(), cmd.create_fcp.clone().map(Value::Hex).unwrap_or(Value::Null)),
        (
            "fillFileContent".into(),
            cmd.fill_file_content.clone().map(Value::Hex).unwrap_or(Value::Null),
        ),
        (
            "fillFileOffset".into(),
            cmd.fill_file_offset.map(Value::Number).unwrap_or(Value::Null),
        ),
    ])
}

fn value_to_cmd(value: &Value) -> FileManagementCmd {
    FileManagementCmd {
        file_path: value.field("filePath").and_then(|v| match v {
            Value::Hex(b) => Some(b.clone()),
            _ => None,
        }),
        create_fcp: value.field("createFcp").and_then(|v| match v {
            Value::Hex(b) => Some(b.clone()),
            _ => None,
        }),
        fill_file_content: value.field("fillFileContent").and_then(|v| match v {
            Value::Hex(b) => Some(b.clone()),
            _ => None,
        }),
        fill_file_offset: value.field("fillFileOffset").and_then(|v| match v {
            Value::Number(n) => Some(*n),
            _ => None,
        }),
    }
}

fn gfm_to_value(gfm: &GenericFileManagement) -> Value {
    Value::Fields(vec![(
        "commands".into(),
        Value::List(gfm.commands.iter().map(cmd_to_value).collect()),
    )])
}

fn value_to_gfm(value: &Value) -> GenericFileManagement {
    GenericFileManagement {
        commands: field_list(value, "commands").iter().map(value_to_cmd).collect(),
    }
}

fn key_component_to_value(component: &KeyComponent) -> Value {
    Value::Fields(vec![
        ("keyType".into(), Value::Number(u64::from(component.key_type))),
        ("keyData".into(), Value::Hex(component.key_data.clone())),
        ("macLength".into(), Value::Number(u64::from(component.mac_length))),
    ])
}

fn value_to_key_component(value: &Value) -> KeyComponent {
    KeyComponent {
        key_type: field_number(value, "keyType") as u8,
        key_data: field_hex(value, "keyData"),
        mac_length: field_number(value, "macLength") as u8,
    }
}

fn sd_key_to_value(key: &SdKey) -> Value {
    Value::Fields(vec![
        (
            "keyUsageQualifier".into(),
            key.key_usage_qualifier.map(|v| Value::Number(u64::from(v))).unwrap_or(Value::Null),
        ),
        (
            "keyAccess".into(),
            key.key_access.map(|v| Value::Number(u64::from(v))).unwrap_or(Value::Null),
        ),
        ("keyIdentifier".into(), Value::Number(u64::from(key.key_identifier))),
        ("keyVersionNumber".into(), Value::Number(u64::from(key.key_version_number))),
        (
            "components".into(),
            Value::List(key.components.iter().map(key_component_to_value).collect()),
        ),
    ])
}

fn value_to_sd_key(value: &Value) -> SdKey {
    SdKey {
        key_usage_qualifier: value.field("keyUsageQualifier").and_then(|v| match v {
            Value::Number(n) => Some(*n as u8),
            _ => None,
        }),
        key_access: value.field("keyAccess").and_then(|v| match v {
            Value::Number(n) => Some(*n as u8),
            _ => None,
        }),
        key_identifier: field_number(value, "keyIdentifier") as u8,
        key_version_number: field_number(value, "keyVersionNumber") as u8,
        components: field_list(value, "components").iter().map(value_to_key_component).collect(),
    }
}

fn security_to_value(record: &SecurityDomainOrApplication) -> Value {
    Value::Fields(vec![
        (
            "loadPackageAid".into(),
            record.load_package_aid.clone().map(Value::Hex).unwrap_or(Value::Null),
        ),
        ("classAid".into(), record.class_aid.clone().map(Value::Hex).unwrap_or(Value::Null)),
        ("instanceAid".into(), Value::Hex(record.instance_aid.clone())),
        (
            "extraditeSecurityDomainAid".into(),
            record
                .extradite_security_domain_aid
                .clone()
                .map(Value::Hex)
                .unwrap_or(Value::Null),
        ),
        ("privileges".into(), Value::Hex(record.privileges.clone())),
        ("lifeCycleState".into(), Value::Number(u64::from(record.life_cycle_state))),
        ("c9Params".into(), record.c9_params.clone().map(Value::Hex).unwrap_or(Value::Null)),
        (
            "applicationParameters".into(),
            record.application_parameters.clone().map(Value::Hex).unwrap_or(Value::Null),
        ),
        (
            "systemSpecificParameters".into(),
            record.system_specific_parameters.clone().map(Value::Hex).unwrap_or(Value::Null),
        ),
        (
            "nonVolatileMemoryLimit".into(),
            record.non_volatile_memory_limit.clone().map(Value::Hex).unwrap_or(Value::Null),
        ),
        (
            "volatileMemoryLimit".into(),
            record.volatile_memory_limit.clone().map(Value::Hex).unwrap_or(Value::Null),
        ),
        (
            "volatileMemoryLimitForRecovery".into(),
            record
                .volatile_memory_limit_for_recovery
                .clone()
                .map(Value::Hex)
                .unwrap_or(Value::Null),
        ),
        (
            "processData".into(),
            Value::List(record.process_data.iter().cloned().map(Value::Hex).collect()),
        ),
        (
            "keys".into(),
            Value::List(record.keys.iter().map(sd_key_to_value).collect()),
        ),
    ])
}

fn value_to_security(value: &Value) -> SecurityDomainOrApplication {
    SecurityDomainOrApplication {
        load_package_aid: value.field("loadPackageAid").and_then(|v| match v {
            Value::Hex(b) => Some(b.clone()),
            _ => None,
        }),
        class_aid: value.field("classAid").and_then(|v| match v {
            Value::Hex(b) => Some(b.clone()),
            _ => None,
        }),
        instance_aid: field_hex(value, "instanceAid"),
        extradite_security_domain_aid: value.field("extraditeSecurityDomainAid").and_then(|v| match v {
            Value::Hex(b) => Some(b.clone()),
            _ => None,
        }),
        privileges: field_hex(value, "privileges"),
        life_cycle_state: field_number(value, "lifeCycleState") as u8,
        c9_params: value.field("c9Params").and_then(|v| match v {
            Value::Hex(b) => Some(b.clone()),
            _ => None,
        }),
        application_parameters: value.field("applicationParameters").and_then(|v| match v {
            Value::Hex(b) => Some(b.clone()),
            _ => None,
        }),
        system_specific_parameters: value.field("systemSpecificParameters").and_then(|v| match v {
            Value::Hex(b) => Some(b.clone()),
            _ => None,
        }),
        non_volatile_memory_limit: value.field("nonVolatileMemoryLimit").and_then(|v| match v {
            Value::Hex(b) => Some(b.clone()),
            _ => None,
        }),
        volatile_memory_limit: value.field("volatileMemoryLimit").and_then(|v| match v {
            Value::Hex(b) => Some(b.clone()),
            _ => None,
        }),
        volatile_memory_limit_for_recovery: value
            .field("volatileMemoryLimitForRecovery")
            .and_then(|v| match v {
                Value::Hex(b) => Some(b.clone()),
                _ => None,
            }),
        process_data: field_list(value, "processData").iter().map(Value::hex).collect(),
        keys: field_list(value, "keys").iter().map(value_to_sd_key).collect(),
    }
}

fn rfm_to_value(rfm: &Rfm) -> Value {
    Value::Fields(vec![
        ("header".into(), rfm.header.clone().map(Value::Hex).unwrap_or(Value::Null)),
        (
            "tarList".into(),
            Value::List(rfm.tar_list.iter().cloned().map(Value::Hex).collect()),
        ),
    ])
}

fn value_to_rfm(value: &Value) -> Rfm {
    Rfm {
        header: value.field("header").and_then(|v| match v {
            Value::Hex(b) => Some(b.clone()),
            _ => None,
        }),
        tar_list: field_list(value, "tarList").iter().map(Value::hex).collect(),
    }
}
