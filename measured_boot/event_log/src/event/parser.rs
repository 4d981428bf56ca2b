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

//! PCR Event Parsing Module
//!
//! This module decodes the two measurement record shapes found in event logs:
//! - `TCG_PCR_EVENT`: one digest, SHA-1 in TCG 1.2 logs or the descriptor algorithm in TXT heap logs
//! - `TCG_PCR_EVENT2`: a counted list of `(algorithmId, digest)` pairs
//!
//! It also defines the `PcrEvent` trait shared by both record shapes and their text rendering.

use std::fmt;
use std::io::{Read, Seek};

use crate::byte_reader::ByteReader;
use crate::config::{check_limit, DecoderConfig};
use crate::error::EventLogError;
use crate::event::model::{
    event_type_name, AlgorithmId, BiosEventType, LogFormat, MeasurementEvent, PcrDigestValue,
    TcgEfiSpecIdEventAlgorithmSize, TcgPcrEvent, TcgPcrEvent2,
};
use crate::event::render::{bytes_to_string, event_data_string, strip_control_characters};

/// Common view over legacy and crypto-agile measurement records
pub trait PcrEvent {
    fn pcr_index(&self) -> u32;

    fn event_type(&self) -> u32;

    /// Digests in stream order
    fn digests(&self) -> &[PcrDigestValue];

    /// Raw event payload
    fn event_data(&self) -> &[u8];

    /// Event type name, empty when the code is not in the BIOS or EFI tables
    fn event_name(&self) -> String {
        event_type_name(self.event_type())
    }

    /// `EV_NO_ACTION` payloads are shown as text; every other type goes through the renderer.
    fn event_data_string(&self) -> String {
        if self.event_type() == BiosEventType::EvNoAction as u32 {
            return bytes_to_string(self.event_data());
        }
        event_data_string(self.event_type(), self.event_data()).unwrap_or_default()
    }
}

impl PcrEvent for TcgPcrEvent {
    fn pcr_index(&self) -> u32 {
        self.pcr_index
    }

    fn event_type(&self) -> u32 {
        self.event_type
    }

    fn digests(&self) -> &[PcrDigestValue] {
        std::slice::from_ref(&self.digest)
    }

    fn event_data(&self) -> &[u8] {
        &self.event
    }
}

impl PcrEvent for TcgPcrEvent2 {
    fn pcr_index(&self) -> u32 {
        self.pcr_index
    }

    fn event_type(&self) -> u32 {
        self.event_type
    }

    fn digests(&self) -> &[PcrDigestValue] {
        &self.digests
    }

    fn event_data(&self) -> &[u8] {
        &self.event
    }
}

impl PcrEvent for MeasurementEvent {
    fn pcr_index(&self) -> u32 {
        match self {
            MeasurementEvent::Legacy(event) => event.pcr_index(),
            MeasurementEvent::Agile(event) => event.pcr_index(),
        }
    }

    fn event_type(&self) -> u32 {
        match self {
            MeasurementEvent::Legacy(event) => event.event_type(),
            MeasurementEvent::Agile(event) => event.event_type(),
        }
    }

    fn digests(&self) -> &[PcrDigestValue] {
        match self {
            MeasurementEvent::Legacy(event) => event.digests(),
            MeasurementEvent::Agile(event) => event.digests(),
        }
    }

    fn event_data(&self) -> &[u8] {
        match self {
            MeasurementEvent::Legacy(event) => event.event_data(),
            MeasurementEvent::Agile(event) => event.event_data(),
        }
    }
}

/// Text block of one event: PCR, name, data, then one line per digest
fn write_event<E: PcrEvent + ?Sized>(event: &E, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "PCR: {}", event.pcr_index())?;
    writeln!(f, "Event Name: {}", event.event_name())?;
    write!(f, "Event Data: {}", strip_control_characters(&event.event_data_string()))?;
    for digest in event.digests() {
        write!(f, "\n{} Digest: {}", digest.algorithm_id.digest_label(), digest.hex())?;
    }
    Ok(())
}

impl fmt::Display for TcgPcrEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_event(self, f)
    }
}

impl fmt::Display for TcgPcrEvent2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_event(self, f)
    }
}

impl fmt::Display for MeasurementEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_event(self, f)
    }
}

/// Read `eventSize` and the payload it announces
fn read_event_data<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    config: &DecoderConfig,
) -> Result<Vec<u8>, EventLogError> {
    let event_size: u32 = reader.read_u32()?;
    reader.ensure_available(event_size as u64)?;
    check_limit("event_size", event_size as u64, config.max_event_data_size)?;
    reader.read_bytes(event_size as usize)
}

/// Decode one `TCG_PCR_EVENT` whose digest is `digest_algorithm` sized
///
/// # Errors
/// * `Truncated` - the record runs past the reader limit
/// * `LimitExceeded` - `eventSize` is above the configured cap
pub fn parse_tcg_pcr_event<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    digest_algorithm: AlgorithmId,
    config: &DecoderConfig,
) -> Result<TcgPcrEvent, EventLogError> {
    let pcr_index: u32 = reader.read_u32()?;
    let event_type: u32 = reader.read_u32()?;
    let digest = reader.read_bytes(digest_algorithm.digest_size())?;
    let event = read_event_data(reader, config)?;

    Ok(TcgPcrEvent {
        pcr_index,
        event_type,
        digest: PcrDigestValue::new(digest_algorithm, digest),
        event,
    })
}

/// Decode one `TCG_PCR_EVENT2`
///
/// `spec_algorithms` is the algorithm list announced by the spec ID event. Records that
/// disagree with it are still decoded; the disagreement is only logged.
///
/// # Errors
/// * `UnknownAlgorithm` - a digest uses an algorithm id whose size is not known
/// * `ZeroCount` - `digestCount` is zero
/// * `Truncated` - the record runs past the reader limit
/// * `LimitExceeded` - `digestCount` or `eventSize` is above the configured cap
pub fn parse_tcg_pcr_event2<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    spec_algorithms: &[TcgEfiSpecIdEventAlgorithmSize],
    config: &DecoderConfig,
) -> Result<TcgPcrEvent2, EventLogError> {
    let pcr_index: u32 = reader.read_u32()?;
    let event_type: u32 = reader.read_u32()?;

    let digest_count: u32 = reader.read_u32()?;
    if digest_count == 0 {
        return Err(EventLogError::ZeroCount { field: "digest_count" });
    }
    // every digest needs at least its 2-byte algorithm id
    reader.ensure_available(digest_count as u64 * 2)?;
    check_limit("digest_count", digest_count as u64, config.max_digest_count)?;
    if !spec_algorithms.is_empty() && digest_count as usize != spec_algorithms.len() {
        log::warn!(
            "Event at PCR {} carries {} digests but the spec ID event announces {}",
            pcr_index, digest_count, spec_algorithms.len()
        );
    }

    let mut digests: Vec<PcrDigestValue> = Vec::with_capacity(digest_count as usize);
    for index in 0..digest_count as usize {
        let algorithm_id_raw: u16 = reader.read_u16()?;
        let algorithm_id = AlgorithmId::try_from(algorithm_id_raw)?;
        if let Some(expected) = spec_algorithms.get(index) {
            if expected.algorithm_id != algorithm_id_raw {
                log::warn!(
                    "Digest {} of event at PCR {} uses algorithm 0x{:04x}, spec ID event announces 0x{:04x}",
                    index, pcr_index, algorithm_id_raw, expected.algorithm_id
                );
            }
        }
        let digest = reader.read_bytes(algorithm_id.digest_size())?;
        digests.push(PcrDigestValue::new(algorithm_id, digest));
    }

    let event = read_event_data(reader, config)?;

    Ok(TcgPcrEvent2 {
        pcr_index,
        event_type,
        digests,
        event,
    })
}

/// Decode one record in the layout selected by `format`
pub fn parse_event<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    format: &LogFormat,
    config: &DecoderConfig,
) -> Result<MeasurementEvent, EventLogError> {
    match format {
        LogFormat::Sha1 => parse_tcg_pcr_event(reader, AlgorithmId::Sha1, config).map(MeasurementEvent::Legacy),
        LogFormat::SingleDigest(algorithm) => {
            parse_tcg_pcr_event(reader, *algorithm, config).map(MeasurementEvent::Legacy)
        },
        LogFormat::CryptoAgile(algorithms) => {
            parse_tcg_pcr_event2(reader, algorithms, config).map(MeasurementEvent::Agile)
        },
    }
}
