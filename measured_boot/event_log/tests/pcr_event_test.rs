/*
 * Copyright (c) Huawei Technologies Co., Ltd. 2025. All rights reserved.
 * Global Trust Authority is licensed under the Mulan PSL v2.
 * You can use this software according to the terms and conditions of the Mulan PSL v2.
 * You may obtain a copy of Mulan PSL v2 at:
 *     http://license.coscl.org.cn/MulanPSL2
 * THIS SOFTWARE IS PROVIDED ON AN "AS IS" BASIS, WITHOUT WARRANTIES OF ANY KIND, EITHER EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO NON-INFRINGEMENT, MERCHANTABILITY OR FIT FOR A PARTICULAR
 * PURPOSE.
 * See the Mulan PSL v2 for more details.
 */

use tpm_event_log::event::parser::{parse_tcg_pcr_event, parse_tcg_pcr_event2};
use tpm_event_log::event::render::event_data_string;
use tpm_event_log::{
    digest_size, event_type_name, txt_event_type_name, AlgorithmId, ByteReader, DecoderConfig, EventLogError,
    PcrEvent, TcgEfiSpecIdEventAlgorithmSize,
};

mod utils;
use utils::*;

fn spec_algorithms() -> Vec<TcgEfiSpecIdEventAlgorithmSize> {
    vec![
        TcgEfiSpecIdEventAlgorithmSize { algorithm_id: TPM_ALG_SHA1, digest_size: 20 },
        TcgEfiSpecIdEventAlgorithmSize { algorithm_id: TPM_ALG_SHA256, digest_size: 32 },
    ]
}

#[test]
fn test_digest_size_table() {
    assert_eq!(digest_size(0x0004), Some(20));
    assert_eq!(digest_size(0x000B), Some(32));
    assert_eq!(digest_size(0x000C), Some(48));
    assert_eq!(digest_size(0x000D), Some(64));
    assert_eq!(digest_size(0x0012), Some(32));
    assert_eq!(digest_size(0x0099), None);

    assert_eq!(AlgorithmId::try_from(0x000Bu16).unwrap(), AlgorithmId::Sha256);
    assert!(matches!(AlgorithmId::try_from(0x0099u16), Err(EventLogError::UnknownAlgorithm(0x0099))));
    assert_eq!(AlgorithmId::Sm3.to_string(), "sm3");
    assert_eq!(AlgorithmId::Sha384.digest_label(), "SHA384");
}

#[test]
fn test_event_type_names() {
    assert_eq!(event_type_name(EV_SEPARATOR), "EV_SEPARATOR");
    assert_eq!(event_type_name(EV_NO_ACTION), "EV_NO_ACTION");
    assert_eq!(event_type_name(EV_EFI_ACTION), "EV_EFI_ACTION");
    assert_eq!(event_type_name(0x800000E0), "EV_EFI_VARIABLE_AUTHORITY");
    assert_eq!(event_type_name(0x0000ABCD), "");
    // TXT codes are not part of the BIOS/EFI namespace
    assert_eq!(event_type_name(0x402), "");

    assert_eq!(txt_event_type_name(0x402), "EVTYPE_HASH_START");
    assert_eq!(txt_event_type_name(0x40A), "EVTYPE_BIOSAC_REG_DATA");
    assert_eq!(txt_event_type_name(0x4FF), "EVTYPE_CAP_VALUE");
    assert_eq!(txt_event_type_name(0x405), "");
}

#[test]
fn test_parse_legacy_event() {
    let data = legacy_event(7, EV_ACTION, sha1_of(0xAB), b"Calling EFI Application");
    let mut reader = ByteReader::from_bytes(&data);

    let event = parse_tcg_pcr_event(&mut reader, AlgorithmId::Sha1, &DecoderConfig::default()).unwrap();
    assert_eq!(event.pcr_index(), 7);
    assert_eq!(event.event_type(), EV_ACTION);
    assert_eq!(event.digests().len(), 1);
    assert_eq!(event.digests()[0].algorithm_id, AlgorithmId::Sha1);
    assert_eq!(event.digests()[0].digest, vec![0xAB; 20]);
    assert_eq!(event.event_name(), "EV_ACTION");
    assert_eq!(event.event_data_string(), "Calling EFI Application");
    assert!(reader.is_end());
}

#[test]
fn test_parse_single_digest_event() {
    let data = single_digest_event(17, 0x402, &digest_of(32, 0x11), &[]);
    let mut reader = ByteReader::from_bytes(&data);

    let event = parse_tcg_pcr_event(&mut reader, AlgorithmId::Sha256, &DecoderConfig::default()).unwrap();
    assert_eq!(event.digest.algorithm_id, AlgorithmId::Sha256);
    assert_eq!(event.digest.digest.len(), 32);
    assert!(event.event.is_empty());
    assert!(reader.is_end());
}

#[test]
fn test_parse_agile_event_keeps_digest_order() {
    let data = agile_event(
        0,
        EV_SEPARATOR,
        &[(TPM_ALG_SHA256, digest_of(32, 0x22)), (TPM_ALG_SHA1, digest_of(20, 0x11))],
        &[0, 0, 0, 0],
    );
    let mut reader = ByteReader::from_bytes(&data);

    let event = parse_tcg_pcr_event2(&mut reader, &[], &DecoderConfig::default()).unwrap();
    let algorithms: Vec<AlgorithmId> = event.digests.iter().map(|d| d.algorithm_id).collect();
    assert_eq!(algorithms, vec![AlgorithmId::Sha256, AlgorithmId::Sha1]);
    assert_eq!(event.digests[0].digest, vec![0x22; 32]);
    assert_eq!(event.digests[1].digest, vec![0x11; 20]);
    assert_eq!(event.event_data_string(), "0x00000000");
    assert!(reader.is_end());
}

#[test]
fn test_agile_event_disagreeing_with_spec_id_still_decodes() {
    let data = agile_event(1, EV_POST_CODE, &[(TPM_ALG_SHA384, digest_of(48, 0x33))], b"ACPI DATA");
    let event = parse_tcg_pcr_event2(&mut ByteReader::from_bytes(&data), &spec_algorithms(), &DecoderConfig::default())
        .unwrap();
    assert_eq!(event.digests.len(), 1);
    assert_eq!(event.digests[0].algorithm_id, AlgorithmId::Sha384);
}

#[test]
fn test_agile_event_with_unknown_algorithm_fails() {
    let data = agile_event(0, EV_SEPARATOR, &[(0x0099, digest_of(16, 0x00))], &[0, 0, 0, 0]);
    let result = parse_tcg_pcr_event2(&mut ByteReader::from_bytes(&data), &[], &DecoderConfig::default());
    assert!(matches!(result, Err(EventLogError::UnknownAlgorithm(0x0099))));
}

#[test]
fn test_agile_digest_count_beyond_buffer_is_truncated() {
    let mut data = agile_event(0, EV_SEPARATOR, &[(TPM_ALG_SHA1, digest_of(20, 0x00))], &[]);
    data[8..12].copy_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
    let result = parse_tcg_pcr_event2(&mut ByteReader::from_bytes(&data), &[], &DecoderConfig::default());
    assert!(result.unwrap_err().is_truncated());
}

#[test]
fn test_agile_event_without_digests_fails() {
    let data = agile_event(0, EV_POST_CODE, &[], b"x");
    let result = parse_tcg_pcr_event2(&mut ByteReader::from_bytes(&data), &spec_algorithms(), &DecoderConfig::default());
    assert!(matches!(result, Err(EventLogError::ZeroCount { field: "digest_count" })));
}

#[test]
fn test_agile_digest_count_above_cap() {
    let digests: Vec<(u16, Vec<u8>)> = (0..3).map(|i| (TPM_ALG_SHA1, digest_of(20, i))).collect();
    let data = agile_event(0, EV_SEPARATOR, &digests, &[]);
    let config = DecoderConfig { max_digest_count: 2, ..DecoderConfig::default() };
    let result = parse_tcg_pcr_event2(&mut ByteReader::from_bytes(&data), &[], &config);
    assert!(matches!(result, Err(EventLogError::LimitExceeded { field: "digest_count", value: 3, limit: 2 })));
}

#[test]
fn test_event_size_beyond_buffer_is_truncated() {
    let mut data = legacy_event(0, EV_ACTION, sha1_of(0x00), b"abc");
    // drop the last payload byte
    data.pop();
    let result = parse_tcg_pcr_event(&mut ByteReader::from_bytes(&data), AlgorithmId::Sha1, &DecoderConfig::default());
    match result {
        Err(EventLogError::Truncated { requested, available, .. }) => {
            assert_eq!(requested, 3);
            assert_eq!(available, 2);
        },
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_event_size_above_cap() {
    let data = legacy_event(0, EV_ACTION, sha1_of(0x00), &[b'x'; 64]);
    let config = DecoderConfig { max_event_data_size: 32, ..DecoderConfig::default() };
    let result = parse_tcg_pcr_event(&mut ByteReader::from_bytes(&data), AlgorithmId::Sha1, &config);
    assert!(matches!(result, Err(EventLogError::LimitExceeded { field: "event_size", .. })));
}

#[test]
fn test_unknown_event_type_decodes_digest_and_data() {
    let data = legacy_event(3, 0x0000ABCD, sha1_of(0x5A), &[0xDE, 0xAD]);
    let event = parse_tcg_pcr_event(&mut ByteReader::from_bytes(&data), AlgorithmId::Sha1, &DecoderConfig::default())
        .unwrap();
    assert_eq!(event.event_name(), "");
    assert_eq!(event.event_data_string(), "");
    assert_eq!(event.digest.digest, vec![0x5A; 20]);
    assert_eq!(event.event, vec![0xDE, 0xAD]);
}

#[test]
fn test_legacy_event_text_rendering() {
    let data = legacy_event(0, EV_SEPARATOR, sha1_of(0x01), &[0, 0, 0, 0]);
    let event = parse_tcg_pcr_event(&mut ByteReader::from_bytes(&data), AlgorithmId::Sha1, &DecoderConfig::default())
        .unwrap();
    let expected = format!(
        "PCR: 0\nEvent Name: EV_SEPARATOR\nEvent Data: 0x00000000\nSHA1 Digest: {}",
        "01".repeat(20)
    );
    assert_eq!(event.to_string(), expected);
}

#[test]
fn test_agile_event_text_rendering_strips_control_characters() {
    let data = agile_event(
        5,
        EV_NO_ACTION,
        &[(TPM_ALG_SHA1, digest_of(20, 0x00)), (TPM_ALG_SM3, digest_of(32, 0xFF))],
        b"line\r\nbreak\0",
    );
    let event = parse_tcg_pcr_event2(&mut ByteReader::from_bytes(&data), &[], &DecoderConfig::default()).unwrap();
    let expected = format!(
        "PCR: 5\nEvent Name: EV_NO_ACTION\nEvent Data: linebreak\nSHA1 Digest: {}\nSM3 Digest: {}",
        "00".repeat(20),
        "ff".repeat(32)
    );
    assert_eq!(event.to_string(), expected);
}

#[test]
fn test_render_s_crtm_version() {
    let guid = [
        0x33, 0x22, 0x11, 0x00, 0x55, 0x44, 0x77, 0x66,
        0x88, 0x99, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF,
    ];
    assert_eq!(
        event_data_string(EV_S_CRTM_VERSION, &guid).as_deref(),
        Some("00112233-4455-6677-8899-aabbccddeeff")
    );

    let ucs2 = [b'1', 0, b'.', 0, b'0', 0, 0, 0];
    assert_eq!(event_data_string(EV_S_CRTM_VERSION, &ucs2).as_deref(), Some("1.0"));
}

#[test]
fn test_render_firmware_blob() {
    let mut blob = Vec::new();
    blob.extend_from_slice(&0xFF00_0000u64.to_le_bytes());
    blob.extend_from_slice(&0x10_0000u64.to_le_bytes());
    assert_eq!(
        event_data_string(EV_EFI_PLATFORM_FIRMWARE_BLOB, &blob).as_deref(),
        Some("base: 0xff000000, length: 0x100000")
    );
    // a payload that does not fit the layout renders as nothing
    assert_eq!(event_data_string(EV_EFI_PLATFORM_FIRMWARE_BLOB, &[1, 2, 3]), None);
}

#[test]
fn test_render_unknown_type() {
    assert_eq!(event_data_string(0x0000ABCD, b"anything"), None);
}
