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

//! Spec ID Event Parsing
//!
//! A spec ID event is the payload of the first `EV_NO_ACTION` record of a TCG log. Its
//! signature tells which record layout the rest of the log uses, so the decoders here probe
//! rather than assume: a signature that does not match yields `SpecIdMatch::NotThisFormat`
//! and the reader is put back where the probe started.

use std::io::{Read, Seek};

use crate::byte_reader::{ByteParseable, ByteReader};
use crate::config::{check_limit, DecoderConfig};
use crate::error::EventLogError;
use crate::event::model::{
    digest_size, SpecIdEvent, SpecIdMatch, TcgBiosSpecIdEvent, TcgEfiSpecIdEvent,
    TcgEfiSpecIdEventAlgorithmSize, SPEC_ID_SIGNATURE_SIZE, TCG_BIOS_SPEC_ID_SIGNATURE,
    TCG_EFI_SPEC_ID_SIGNATURE,
};

// algorithmId (2 bytes) + digestSize (2 bytes)
const ALGORITHM_SIZE_ENTRY_SIZE: u64 = 4;

/// Fields shared by both spec ID layouts, directly after the signature
struct SpecIdHeader {
    platform_class: u32,
    spec_version_minor: u8,
    spec_version_major: u8,
    spec_errata: u8,
    uintn_size: u8,
}

impl ByteParseable for SpecIdHeader {
    fn parse_from<R: Read + Seek>(parser: &mut ByteReader<R>) -> Result<Self, EventLogError> {
        Ok(SpecIdHeader {
            platform_class: parser.read_u32()?,
            spec_version_minor: parser.read_u8()?,
            spec_version_major: parser.read_u8()?,
            spec_errata: parser.read_u8()?,
            uintn_size: parser.read_u8()?,
        })
    }
}

impl ByteParseable for TcgEfiSpecIdEventAlgorithmSize {
    /// Parses one `(algorithmId, digestSize)` entry
    ///
    /// Known algorithms must declare the size from the digest table; unknown ids are kept as-is.
    fn parse_from<R: Read + Seek>(parser: &mut ByteReader<R>) -> Result<Self, EventLogError> {
        let algorithm_id: u16 = parser.read_u16()?;
        let declared: u16 = parser.read_u16()?;
        if let Some(expected) = digest_size(algorithm_id) {
            if expected != declared as usize {
                return Err(EventLogError::DigestSizeMismatch {
                    algorithm_id,
                    declared,
                    expected: expected as u16,
                });
            }
        }
        Ok(TcgEfiSpecIdEventAlgorithmSize { algorithm_id, digest_size: declared })
    }
}

/// Read the 16-byte signature and compare it to `expected` with NUL padding trimmed.
///
/// On mismatch the reader is rewound to `start` and `None` is returned.
fn match_signature<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    expected: &str,
) -> Result<Option<String>, EventLogError> {
    let start = reader.position();
    let raw: [u8; SPEC_ID_SIGNATURE_SIZE] = reader.read_array()?;
    let signature = String::from_utf8_lossy(&raw).trim_end_matches('\0').to_string();
    if signature != expected {
        reader.set_position(start)?;
        return Ok(None);
    }
    Ok(Some(signature))
}

/// Decode a legacy spec ID event ("Spec ID Event00") with explicit limits
pub fn parse_tcg_bios_spec_id_event_with_config<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    config: &DecoderConfig,
) -> Result<SpecIdMatch<TcgBiosSpecIdEvent>, EventLogError> {
    let signature = match match_signature(reader, TCG_BIOS_SPEC_ID_SIGNATURE)? {
        Some(signature) => signature,
        None => return Ok(SpecIdMatch::NotThisFormat),
    };

    let header = SpecIdHeader::parse_from(reader)?;
    let vendor_info_size: u8 = reader.read_u8()?;
    check_limit("vendor_info_size", vendor_info_size as u64, config.max_vendor_info_size)?;
    let vendor_info = reader.read_bytes(vendor_info_size as usize)?;

    log::debug!("Decoded legacy spec ID event, platform class {}", header.platform_class);
    Ok(SpecIdMatch::Matched(TcgBiosSpecIdEvent {
        signature,
        platform_class: header.platform_class,
        spec_version_minor: header.spec_version_minor,
        spec_version_major: header.spec_version_major,
        spec_errata: header.spec_errata,
        uintn_size: header.uintn_size,
        vendor_info_size,
        vendor_info,
    }))
}

/// Decode a crypto-agile spec ID event ("Spec ID Event03") with explicit limits
///
/// # Errors
/// * `Truncated` - the algorithm list or vendor info runs past the end of the reader
/// * `ZeroCount` - `numberOfAlgorithms` is zero
/// * `LimitExceeded` - `numberOfAlgorithms` or `vendorInfoSize` is above the configured cap
/// * `DigestSizeMismatch` - a known algorithm declares the wrong digest size
pub fn parse_tcg_efi_spec_id_event_with_config<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    config: &DecoderConfig,
) -> Result<SpecIdMatch<TcgEfiSpecIdEvent>, EventLogError> {
    let signature = match match_signature(reader, TCG_EFI_SPEC_ID_SIGNATURE)? {
        Some(signature) => signature,
        None => return Ok(SpecIdMatch::NotThisFormat),
    };

    let header = SpecIdHeader::parse_from(reader)?;

    let number_of_algorithms: u32 = reader.read_u32()?;
    if number_of_algorithms == 0 {
        return Err(EventLogError::ZeroCount { field: "number_of_algorithms" });
    }
    reader.ensure_available(number_of_algorithms as u64 * ALGORITHM_SIZE_ENTRY_SIZE)?;
    check_limit("number_of_algorithms", number_of_algorithms as u64, config.max_algorithm_count)?;

    let mut digest_sizes: Vec<TcgEfiSpecIdEventAlgorithmSize> = Vec::with_capacity(number_of_algorithms as usize);
    for _ in 0..number_of_algorithms {
        digest_sizes.push(TcgEfiSpecIdEventAlgorithmSize::parse_from(reader)?);
    }

    let vendor_info_size: u32 = reader.read_u32()?;
    reader.ensure_available(vendor_info_size as u64)?;
    check_limit("vendor_info_size", vendor_info_size as u64, config.max_vendor_info_size)?;
    let vendor_info = reader.read_bytes(vendor_info_size as usize)?;

    log::debug!(
        "Decoded crypto agile spec ID event with algorithms {:?}",
        digest_sizes.iter().map(|a| a.algorithm_id).collect::<Vec<_>>()
    );
    Ok(SpecIdMatch::Matched(TcgEfiSpecIdEvent {
        signature,
        platform_class: header.platform_class,
        spec_version_minor: header.spec_version_minor,
        spec_version_major: header.spec_version_major,
        spec_errata: header.spec_errata,
        uintn_size: header.uintn_size,
        number_of_algorithms,
        digest_sizes,
        vendor_info_size,
        vendor_info,
    }))
}

/// Decode a legacy spec ID event using the default limits
pub fn parse_tcg_bios_spec_id_event<R: Read + Seek>(
    reader: &mut ByteReader<R>,
) -> Result<SpecIdMatch<TcgBiosSpecIdEvent>, EventLogError> {
    parse_tcg_bios_spec_id_event_with_config(reader, &DecoderConfig::default())
}

/// Decode a crypto-agile spec ID event using the default limits
pub fn parse_tcg_efi_spec_id_event<R: Read + Seek>(
    reader: &mut ByteReader<R>,
) -> Result<SpecIdMatch<TcgEfiSpecIdEvent>, EventLogError> {
    parse_tcg_efi_spec_id_event_with_config(reader, &DecoderConfig::default())
}

/// Try the crypto-agile layout first, then the legacy one
pub fn probe_spec_id_event<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    config: &DecoderConfig,
) -> Result<SpecIdMatch<SpecIdEvent>, EventLogError> {
    if let SpecIdMatch::Matched(event) = parse_tcg_efi_spec_id_event_with_config(reader, config)? {
        return Ok(SpecIdMatch::Matched(SpecIdEvent::Efi(event)));
    }
    if let SpecIdMatch::Matched(event) = parse_tcg_bios_spec_id_event_with_config(reader, config)? {
        return Ok(SpecIdMatch::Matched(SpecIdEvent::Bios(event)));
    }
    Ok(SpecIdMatch::NotThisFormat)
}
