//! Scenario and property tests exercising the crate end to end: the TLV
//! codec, the primitive codecs, the binary decoder/encoder, the text
//! notation front end, and the builder. All tests live in this one
//! integration file against the crate's public API — there are no
//! `#[cfg(test)]` modules under `src/`.

use esim_profile::consts::{AlgorithmId, KeyRef, PeTag, PIN_BUFFER_LEN, PIN_PAD_BYTE};
use esim_profile::{
    primitives, AkaParameter, AlgoConfiguration, AppletConfig, BuildConfig, DedicatedFile,
    ElementValue, ElementaryFile, PinCodes, PinConfig, Profile, ProfileElement, ProfileHeader,
};

/// S1 — minimal profile: a `ProfileHeader` (major=2, minor=3,
/// profileType="Test", ICCID swapped... no, plain-BCD "89000123456789012341")
/// followed by `End`.
const S1_MINIMAL_PROFILE: &[u8] = &[
    0xA0, 0x18, 0x80, 0x01, 0x02, 0x81, 0x01, 0x03, 0x82, 0x04, b'T', b'e', b's', b't', 0x83, 0x0A, 0x89, 0x00, 0x01,
    0x23, 0x45, 0x67, 0x89, 0x01, 0x23, 0x41, 0x9A, 0x00,
];

#[test]
fn s1_minimal_profile_decodes() {
    let profile = Profile::decode(S1_MINIMAL_PROFILE).unwrap();
    assert_eq!(profile.elements.len(), 2);
    let header = profile.header().unwrap();
    assert_eq!(header.major_version, 2);
    assert_eq!(header.minor_version, 3);
    assert_eq!(header.profile_type, "Test");
    assert_eq!(header.iccid, "89000123456789012341");
    assert!(profile.end_idx.is_some());
}

/// Invariant 1 — binary round-trip: decode(encode(decode(bytes))) ==
/// decode(bytes) for a fresh decode (raw-bytes cache intact).
#[test]
fn binary_round_trip_is_byte_identical_on_fresh_decode() {
    let profile = Profile::decode(S1_MINIMAL_PROFILE).unwrap();
    assert_eq!(profile.encode(), S1_MINIMAL_PROFILE);
}

/// Invariant 1, continued — once every element has been invalidated (no
/// raw cache at all), re-encoding from the typed model alone must still
/// reproduce byte-identical output, since nothing in the header's fields
/// changed.
#[test]
fn binary_round_trip_survives_full_invalidation() {
    let mut profile = Profile::decode(S1_MINIMAL_PROFILE).unwrap();
    for element in &mut profile.elements {
        element.invalidate();
    }
    assert_eq!(profile.encode(), S1_MINIMAL_PROFILE);
}

/// Invariant 3 — cross round-trip: decode -> generate text -> parse text
/// -> encode reproduces the original bytes.
#[test]
fn cross_round_trip_binary_text_binary() {
    let profile = Profile::decode(S1_MINIMAL_PROFILE).unwrap();
    let text = esim_profile::generate_text(&profile);
    let reparsed = esim_profile::parse_text(&text).unwrap();
    assert_eq!(reparsed.encode(), S1_MINIMAL_PROFILE);
}

/// Invariant 2 — text round-trip: generate -> parse -> generate produces
/// the same text up to the format's own normalization (whitespace,
/// trailing commas).
#[test]
fn text_round_trip_is_stable_under_normalize() {
    let profile = Profile::decode(S1_MINIMAL_PROFILE).unwrap();
    let first = esim_profile::generate_text(&profile);
    let reparsed = esim_profile::parse_text(&first).unwrap();
    let second = esim_profile::generate_text(&reparsed);
    assert_eq!(esim_profile::text::normalize(&first), esim_profile::text::normalize(&second));
}

/// The generator's output is exactly the `valueN ProfileElement ::=
/// choice-name : body` statement form the conformant grammar requires —
/// not this crate's own invented dialect.
#[test]
fn generated_text_uses_the_conformant_statement_grammar() {
    let profile = Profile::decode(S1_MINIMAL_PROFILE).unwrap();
    let text = esim_profile::generate_text(&profile);
    assert!(text.contains("value1 ProfileElement ::= header :"));
    assert!(text.contains("value2 ProfileElement ::= end :"));
}

/// A real conformant value-notation document — not wrapped in an extra
/// outer `{ }` the way this crate's text dialect once required — parses
/// successfully and reproduces the same `Profile` the binary decoder does.
#[test]
fn parses_genuinely_conformant_statement_form() {
    let text = "value1 ProfileElement ::= header : { majorVersion: 2, minorVersion: 3, profileType: \"Test\", iccid: \"89000123456789012341\" }\nvalue2 ProfileElement ::= end : NULL\n";
    let profile = esim_profile::parse_text(text).unwrap();
    assert_eq!(profile.elements.len(), 2);
    assert_eq!(profile.header().unwrap().profile_type, "Test");
    assert!(profile.end_idx.is_some());
}

/// The lexer's `--` comment handling and escaped-string handling are
/// exercised through the real statement grammar rather than by poking at
/// the (private) lexer directly.
#[test]
fn parses_comments_and_escaped_strings_in_statement_form() {
    let text = "value1 ProfileElement ::= header : { -- a trailing comment\n  profileType: \"Test\\\"Quote\", iccid: \"89000123456789012341\" }\nvalue2 ProfileElement ::= end : NULL\n";
    let profile = esim_profile::parse_text(text).unwrap();
    assert_eq!(profile.header().unwrap().profile_type, "Test\"Quote");
}

#[test]
fn decode_rejects_trailing_data_after_end() {
    let mut bytes = S1_MINIMAL_PROFILE.to_vec();
    bytes.push(0x00);
    let err = Profile::decode(&bytes).unwrap_err();
    assert_eq!(err, esim_profile::DecodeError::TrailingData);
}

#[test]
fn decode_rejects_indefinite_length() {
    let bytes = [0xA0, 0x80, 0x00, 0x00];
    let err = Profile::decode(&bytes).unwrap_err();
    assert_eq!(err, esim_profile::DecodeError::Tlv(esim_profile::TlvError::IndefiniteLength));
}

#[test]
fn decode_rejects_truncated_value() {
    let bytes = [0xA0, 0x05, 0x01];
    let err = Profile::decode(&bytes).unwrap_err();
    assert_eq!(err, esim_profile::DecodeError::Tlv(esim_profile::TlvError::Truncated));
}

#[test]
fn sniff_tells_binary_from_text() {
    assert_eq!(esim_profile::sniff(S1_MINIMAL_PROFILE), esim_profile::Format::Binary);
    let text = esim_profile::generate_text(&Profile::decode(S1_MINIMAL_PROFILE).unwrap());
    assert_eq!(esim_profile::sniff(text.as_bytes()), esim_profile::Format::Text);
    assert_eq!(esim_profile::sniff(&[]), esim_profile::Format::Unknown);
}

/// RFM's outer PE tag (56) exceeds the single-byte tag-number range
/// (0..=30, `0x1F` is the multi-byte escape), and a long enough `tarList`
/// pushes the inner value past the 127-byte short-form length boundary —
/// this one profile exercises both the multi-byte tag codec and the
/// long-form length codec, on both the encode and decode side.
#[test]
fn rfm_exercises_multi_byte_tag_and_long_form_length() {
    let tars: Vec<String> = (0u8..50).map(|i| format!("'{i:02X}{i:02X}{i:02X}'H")).collect();
    let text = format!(
        "value1 ProfileElement ::= rfm : {{ tarList: {{ {} }} }}\nvalue2 ProfileElement ::= end : NULL\n",
        tars.join(", ")
    );
    let profile = esim_profile::parse_text(&text).unwrap();
    assert_eq!(profile.rfm_idxs.len(), 1);

    let bytes = profile.encode();
    assert_eq!(bytes[0], 0xBF, "multi-byte tag escape in the context/constructed tag byte");
    assert_eq!(bytes[1], 56, "tag number continuation byte for RFM's tag 56");
    assert_ne!(bytes[2] & 0x80, 0, "inner value exceeds 127 bytes, so length must use long form");

    let redecoded = Profile::decode(&bytes).unwrap();
    assert_eq!(redecoded.rfm_idxs.len(), 1);
    match &redecoded.elements[redecoded.rfm_idxs[0]].value {
        ElementValue::Rfm(rfm) => assert_eq!(rfm.tar_list.len(), 50),
        other => panic!("expected Rfm, got {other:?}"),
    }
}

/// S7 — build: a template with a placeholder all-zero Ki, personalized
/// with a full `BuildConfig`, must read back exactly what was configured
/// and re-decode identically from its own DER encoding.
#[test]
fn s7_build_scenario() {
    let template_text = "value1 ProfileElement ::= header : { majorVersion: 2, minorVersion: 3, profileType: \"Test\", iccid: \"89000000000000000000\" }\n\
         value2 ProfileElement ::= usim : { efs: { { name: \"imsi\", file: { raw: {} } } } }\n\
         value3 ProfileElement ::= akaParameter : { algoConfiguration: { algorithmId: milenage, key: '00000000000000000000000000000000'H } }\n\
         value4 ProfileElement ::= end : NULL\n";
    let template = esim_profile::parse_text(template_text).expect("template text parses");

    let ki: Vec<u8> = (0x01..=0x10).collect();
    let opc: Vec<u8> = (0x11..=0x20).collect();
    let cfg = BuildConfig {
        iccid: Some("89012345678901234567".to_string()),
        imsi: Some("001010123456789".to_string()),
        ki: Some(ki.clone()),
        opc: Some(opc.clone()),
        ..Default::default()
    };

    let built = Profile::build(&template, &cfg).expect("build succeeds");
    assert_eq!(built.get_iccid().as_deref(), Some("89012345678901234567"));
    assert_eq!(built.get_imsi().as_deref(), Some("001010123456789"));
    assert_eq!(built.get_ki(), Some(ki));
    assert_eq!(built.get_opc(), Some(opc));

    let bytes = built.encode();
    let redecoded = Profile::decode(&bytes).expect("built profile re-decodes");
    assert_eq!(redecoded.get_iccid(), built.get_iccid());
    assert_eq!(redecoded.get_imsi(), built.get_imsi());
    assert_eq!(redecoded.get_ki(), built.get_ki());
}

/// Invariant 4 — idempotent sanitize, exercised through the public API
/// against a template parsed from text instead of hand-built in Rust.
#[test]
fn sanitize_twice_equals_sanitize_once() {
    let text = "value1 ProfileElement ::= akaParameter : { algoConfiguration: { algorithmId: milenage, key: 'AABBCCDDEEFF00112233445566778899'H, opc: '00112233445566778899AABBCCDDEEFF'H } }\n\
         value2 ProfileElement ::= end : NULL\n";
    let mut once = esim_profile::parse_text(text).unwrap();
    once.sanitize();
    let mut twice = esim_profile::parse_text(text).unwrap();
    twice.sanitize();
    twice.sanitize();
    assert_eq!(once, twice);
}

/// Invariant 5 — build purity: building from a template never mutates it,
/// even when the build also adds a new `Application` element.
#[test]
fn build_purity_with_applet_add() {
    let text = "value1 ProfileElement ::= akaParameter : { algoConfiguration: { algorithmId: milenage, key: '00000000000000000000000000000000'H } }\n\
         value2 ProfileElement ::= end : NULL\n";
    let template = esim_profile::parse_text(text).unwrap();
    let before = template.clone();

    let cfg = BuildConfig {
        ki: Some(vec![0x42; 16]),
        applet: Some(AppletConfig {
            instance_aid: vec![0xA0, 0x00, 0x00, 0x00, 0x09, 0x99],
            ..Default::default()
        }),
        ..Default::default()
    };
    let built = Profile::build(&template, &cfg).unwrap();

    assert_eq!(template, before);
    assert_eq!(built.applications().len(), 1);
    assert!(matches!(built.elements.last().unwrap().value, ElementValue::End));
}

// --- consts: tag tables -----------------------------------------------

#[test]
fn choice_name_roundtrip() {
    for &(name, tag) in esim_profile::consts::CHOICE_NAMES {
        assert_eq!(esim_profile::consts::tag_for_choice_name(name), Some(tag));
        assert_eq!(esim_profile::consts::choice_name_for_tag(tag), Some(name));
    }
}

#[test]
fn pe_tag_try_from() {
    use std::convert::TryFrom;
    assert_eq!(PeTag::try_from(0).unwrap(), PeTag::ProfileHeader);
    assert_eq!(PeTag::try_from(26).unwrap(), PeTag::End);
    assert!(PeTag::try_from(200).is_err());
}

// --- primitives: integer, OID, BCD, IMSI, UTF-8 TLV --------------------

#[test]
fn integer_law_roundtrip() {
    for n in [0u64, 1, 127, 128, 255, 256, 65535, 1 << 40] {
        assert_eq!(primitives::decode_integer(&primitives::encode_integer(n)), n);
    }
}

#[test]
fn integer_boundaries_match_scenario_s5() {
    assert_eq!(primitives::encode_integer(128), vec![0x00, 0x80]);
    assert_eq!(primitives::encode_integer(127), vec![0x7F]);
}

#[test]
fn oid_decode_matches_scenario_s6() {
    let oid = primitives::decode_oid(&[0x67, 0x81, 0x0F, 0x01, 0x02, 0x01]);
    assert_eq!(oid, vec![2, 23, 143, 1, 2, 1]);
}

#[test]
fn oid_law_roundtrip() {
    let cases: &[&[u64]] = &[&[1, 2, 840, 113549], &[0, 39], &[2, 5, 29]];
    for oid in cases {
        let encoded = primitives::encode_oid(oid);
        assert_eq!(primitives::decode_oid(&encoded), *oid);
    }
}

#[test]
fn swapped_bcd_matches_scenario_s2() {
    let decoded = primitives::decode_swapped_bcd(&[0x98, 0x00, 0x10, 0x32, 0x54, 0x76, 0x98, 0x10, 0x32, 0x14]);
    assert_eq!(decoded, "89000123456789012341");
}

#[test]
fn bcd_law_roundtrip() {
    for digits in ["1", "12", "89000123456789012341", "4"] {
        let encoded = primitives::encode_swapped_bcd(digits);
        assert_eq!(primitives::decode_swapped_bcd(&encoded), digits);
    }
}

#[test]
fn odd_digit_count_pads_with_f_nibble() {
    let encoded = primitives::encode_swapped_bcd("123");
    assert_eq!(encoded, vec![0x21, 0xF3]);
}

#[test]
fn imsi_matches_scenario_s3() {
    let decoded = primitives::decode_imsi(&[0x08, 0x09, 0x10, 0x10, 0x10, 0x32, 0x54, 0x76, 0x98]).unwrap();
    assert_eq!(decoded, "001010123456789");
}

#[test]
fn imsi_roundtrip_even_and_odd() {
    for imsi in ["001010123456789", "00101012345678"] {
        let encoded = primitives::encode_imsi(imsi);
        assert_eq!(primitives::decode_imsi(&encoded).unwrap(), imsi);
    }
}

#[test]
fn plain_bcd_not_swapped() {
    // "89" in plain order is 0x89, in swapped order it's 0x98.
    assert_eq!(primitives::encode_bcd_plain("89"), vec![0x89]);
    assert_eq!(primitives::encode_swapped_bcd("89"), vec![0x98]);
}

#[test]
fn utf8_tlv_roundtrip() {
    let encoded = primitives::encode_utf8_tlv("Test").unwrap();
    assert_eq!(encoded, vec![0x80, 0x04, b'T', b'e', b's', b't']);
    let (s, consumed) = primitives::decode_utf8_tlv(&encoded).unwrap();
    assert_eq!(s, "Test");
    assert_eq!(consumed, encoded.len());
}

// --- builder: template cloning, sanitization, personalization ----------

fn template_with_usim_and_aka() -> Profile {
    let mut profile = Profile::new();
    profile.push(ProfileElement::new(
        PeTag::ProfileHeader as u8,
        ElementValue::Header(ProfileHeader { iccid: "89000000000000000000".to_string(), ..Default::default() }),
    ));
    profile.push(ProfileElement::new(PeTag::Mf as u8, ElementValue::Df(DedicatedFile::default())));

    let mut usim = DedicatedFile::default();
    usim.named_efs.insert("imsi".to_string(), ElementaryFile::default());
    profile.push(ProfileElement::new(PeTag::Usim as u8, ElementValue::Df(usim)));

    profile.push(ProfileElement::new(
        PeTag::AkaParameter as u8,
        ElementValue::AkaParameter(AkaParameter {
            algo_configuration: AlgoConfiguration {
                algorithm_id: AlgorithmId::Milenage as u8,
                key: vec![0xAB; 16],
                opc: vec![0xCD; 16],
                ..Default::default()
            },
            ..Default::default()
        }),
    ));
    profile.push(ProfileElement::new(
        PeTag::PinCodes as u8,
        ElementValue::PinCodes(PinCodes {
            entries: vec![PinConfig { key_ref: KeyRef::PinAppl1 as u8, value: [0x31, 0x32, 0x33, 0x34, 0xFF, 0xFF, 0xFF, 0xFF] }],
        }),
    ));
    profile.push(ProfileElement::new(PeTag::End as u8, ElementValue::End));
    profile.reindex();
    profile
}

#[test]
fn build_does_not_mutate_template() {
    let template = template_with_usim_and_aka();
    let before = template.clone();
    let cfg = BuildConfig { iccid: Some("89111111111111111111".to_string()), ..Default::default() };
    let _ = Profile::build(&template, &cfg).unwrap();
    assert_eq!(template, before);
}

#[test]
fn sanitize_is_idempotent() {
    let mut once = template_with_usim_and_aka();
    once.sanitize();
    let mut twice = template_with_usim_and_aka();
    twice.sanitize();
    twice.sanitize();
    assert_eq!(once, twice);
}

#[test]
fn sanitize_clears_secrets() {
    let mut profile = template_with_usim_and_aka();
    profile.sanitize();
    assert_eq!(profile.get_ki(), Some(vec![0u8; 16]));
    assert_eq!(profile.get_opc(), Some(vec![0u8; 16]));
    assert_eq!(profile.get_pin(KeyRef::PinAppl1 as u8), Some([PIN_PAD_BYTE; PIN_BUFFER_LEN]));
}

#[test]
fn set_iccid_strips_non_digits_and_mirrors_to_mf() {
    let mut profile = template_with_usim_and_aka();
    if let Some(mf) = profile.mf_mut() {
        mf.named_efs.insert("iccid".to_string(), ElementaryFile::default());
    }
    profile.set_iccid("89-01 23").unwrap();
    assert_eq!(profile.get_iccid().as_deref(), Some("890123"));
    let mirrored = &profile.mf().unwrap().named_efs["iccid"];
    assert_eq!(mirrored.fill_contents[0].content, primitives::encode_swapped_bcd("890123"));
}

#[test]
fn set_imsi_round_trips_through_get_imsi() {
    let mut profile = template_with_usim_and_aka();
    profile.set_imsi("001010123456789").unwrap();
    assert_eq!(profile.get_imsi().as_deref(), Some("001010123456789"));
}

#[test]
fn set_ki_rejects_bad_length() {
    let mut profile = template_with_usim_and_aka();
    let err = profile.set_ki(&[0u8; 10]).unwrap_err();
    assert_eq!(err, esim_profile::BuildError::BadLength { field: "ki", expected: &[16, 32] });
}

#[test]
fn set_imsi_without_usim_is_missing_app() {
    let mut profile = Profile::new();
    profile.push(ProfileElement::new(PeTag::End as u8, ElementValue::End));
    profile.reindex();
    assert_eq!(profile.set_imsi("001010123456789"), Err(esim_profile::BuildError::MissingApp("USIM")));
}

#[test]
fn build_sets_ki_and_invalidates_raw() {
    let template = template_with_usim_and_aka();
    let cfg = BuildConfig { ki: Some(vec![0x11; 16]), opc: Some(vec![0x22; 16]), ..Default::default() };
    let built = Profile::build(&template, &cfg).unwrap();
    assert_eq!(built.get_ki(), Some(vec![0x11; 16]));
    assert_eq!(built.get_opc(), Some(vec![0x22; 16]));
    let idx = built.aka_parameter_idxs[0];
    assert!(built.elements[idx].raw.is_none());
}

#[test]
fn build_is_pure_given_same_config() {
    let template = template_with_usim_and_aka();
    let cfg = BuildConfig {
        iccid: Some("8900000000000000001".to_string()),
        imsi: Some("001010123456789".to_string()),
        ki: Some(vec![0xAA; 16]),
        opc: Some(vec![0xBB; 16]),
        ..Default::default()
    };
    let a = Profile::build(&template, &cfg).unwrap();
    let b = Profile::build(&template, &cfg).unwrap();
    assert_eq!(a.encode(), b.encode());
}

#[test]
fn applet_auth_pulls_ki_opc_from_applet_and_switches_algorithm() {
    let template = template_with_usim_and_aka();
    let cfg = BuildConfig {
        ki: Some(vec![0x01; 16]),
        opc: Some(vec![0x02; 16]),
        applet: Some(AppletConfig {
            instance_aid: vec![0xA0, 0x00, 0x00, 0x00, 0x03],
            applet_auth: true,
            ..Default::default()
        }),
        ..Default::default()
    };
    let built = Profile::build(&template, &cfg).unwrap();
    assert_eq!(built.get_ki(), Some(vec![0x01; 16]));
    assert_eq!(built.get_opc(), Some(vec![0x02; 16]));
    assert_eq!(built.aka_parameters()[0].algo_configuration.algorithm_id, AlgorithmId::UsimTest as u8);
    assert_eq!(built.applications().len(), 1);
}

#[test]
fn applet_add_inserts_before_end() {
    let template = template_with_usim_and_aka();
    let end_idx = template.end_idx.unwrap();
    let cfg = BuildConfig {
        ki: Some(vec![0x03; 16]),
        applet: Some(AppletConfig { instance_aid: vec![0xA0, 0x00, 0x00, 0x00, 0x04], ..Default::default() }),
        ..Default::default()
    };
    let built = Profile::build(&template, &cfg).unwrap();
    assert!(matches!(built.elements[end_idx].value, ElementValue::Application(_)));
    assert!(matches!(built.elements.last().unwrap().value, ElementValue::End));
}
