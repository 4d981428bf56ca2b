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

#![allow(dead_code)]

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::Write;

pub const TPM_ALG_SHA1: u16 = 0x0004;
pub const TPM_ALG_SHA256: u16 = 0x000B;
pub const TPM_ALG_SHA384: u16 = 0x000C;
pub const TPM_ALG_SM3: u16 = 0x0012;

pub const EV_POST_CODE: u32 = 0x00000001;
pub const EV_NO_ACTION: u32 = 0x00000003;
pub const EV_SEPARATOR: u32 = 0x00000004;
pub const EV_ACTION: u32 = 0x00000005;
pub const EV_S_CRTM_VERSION: u32 = 0x00000008;
pub const EV_EFI_ACTION: u32 = 0x80000007;
pub const EV_EFI_PLATFORM_FIRMWARE_BLOB: u32 = 0x80000008;

/// Size of a legacy record with `data_len` bytes of event data
pub fn legacy_event_size(data_len: usize) -> usize {
    4 + 4 + 20 + 4 + data_len
}

/// Encode a TCG_PCR_EVENT record with a SHA-1 digest
pub fn legacy_event(pcr_index: u32, event_type: u32, digest: [u8; 20], data: &[u8]) -> Vec<u8> {
    single_digest_event(pcr_index, event_type, &digest, data)
}

/// Encode a TCG_PCR_EVENT record with a digest of any width
pub fn single_digest_event(pcr_index: u32, event_type: u32, digest: &[u8], data: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.write_u32::<LittleEndian>(pcr_index).unwrap();
    buf.write_u32::<LittleEndian>(event_type).unwrap();
    buf.write_all(digest).unwrap();
    buf.write_u32::<LittleEndian>(data.len() as u32).unwrap();
    buf.write_all(data).unwrap();
    buf
}

/// Encode a TCG_PCR_EVENT2 record
pub fn agile_event(pcr_index: u32, event_type: u32, digests: &[(u16, Vec<u8>)], data: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.write_u32::<LittleEndian>(pcr_index).unwrap();
    buf.write_u32::<LittleEndian>(event_type).unwrap();
    buf.write_u32::<LittleEndian>(digests.len() as u32).unwrap();
    for (algorithm_id, digest) in digests {
        buf.write_u16::<LittleEndian>(*algorithm_id).unwrap();
        buf.write_all(digest).unwrap();
    }
    buf.write_u32::<LittleEndian>(data.len() as u32).unwrap();
    buf.write_all(data).unwrap();
    buf
}

fn signature(text: &str) -> [u8; 16] {
    let mut sig = [0u8; 16];
    sig[..text.len()].copy_from_slice(text.as_bytes());
    sig
}

fn spec_id_header(buf: &mut Vec<u8>, text: &str) {
    buf.write_all(&signature(text)).unwrap();
    // platform class
    buf.write_u32::<LittleEndian>(0).unwrap();
    // spec version minor, major, errata, uintn size
    buf.write_all(&[0, 2, 0, 2]).unwrap();
}

/// Payload of a crypto agile spec ID event ("Spec ID Event03")
pub fn efi_spec_id_payload(algorithms: &[(u16, u16)], vendor_info: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();
    spec_id_header(&mut buf, "Spec ID Event03");
    buf.write_u32::<LittleEndian>(algorithms.len() as u32).unwrap();
    for (algorithm_id, digest_size) in algorithms {
        buf.write_u16::<LittleEndian>(*algorithm_id).unwrap();
        buf.write_u16::<LittleEndian>(*digest_size).unwrap();
    }
    buf.write_u32::<LittleEndian>(vendor_info.len() as u32).unwrap();
    buf.write_all(vendor_info).unwrap();
    buf
}

/// Payload of a legacy spec ID event ("Spec ID Event00")
pub fn bios_spec_id_payload(vendor_info: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();
    spec_id_header(&mut buf, "Spec ID Event00");
    buf.write_u8(vendor_info.len() as u8).unwrap();
    buf.write_all(vendor_info).unwrap();
    buf
}

/// Encode a 44-byte TXT 1.2 event log container header
pub fn txt_container(size: u32, pcr_events_offset: u32, next_event_offset: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.write_all(&signature("TXT Event Log")).unwrap();
    buf.write_all(&[0xEE; 12]).unwrap();
    // container version 1.0, pcr event version 1.0
    buf.write_all(&[1, 0, 1, 0]).unwrap();
    buf.write_u32::<LittleEndian>(size).unwrap();
    buf.write_u32::<LittleEndian>(pcr_events_offset).unwrap();
    buf.write_u32::<LittleEndian>(next_event_offset).unwrap();
    buf
}

/// Encode a 40-byte TXT heap event log descriptor
pub fn heap_descr(alg: u16, phys_addr: u64, size: u64, pcr_events_offset: u64, next_event_offset: u64) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.write_u16::<LittleEndian>(alg).unwrap();
    buf.write_u16::<LittleEndian>(0xFFFF).unwrap();
    buf.write_u64::<LittleEndian>(phys_addr).unwrap();
    buf.write_u64::<LittleEndian>(size).unwrap();
    buf.write_u64::<LittleEndian>(pcr_events_offset).unwrap();
    buf.write_u64::<LittleEndian>(next_event_offset).unwrap();
    buf
}

/// Digest filled with one byte value
pub fn digest_of(size: usize, value: u8) -> Vec<u8> {
    vec![value; size]
}

pub fn sha1_of(value: u8) -> [u8; 20] {
    [value; 20]
}
