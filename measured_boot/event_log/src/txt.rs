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

//! Intel TXT event logs
//!
//! Two headers bound a run of `TCG_PCR_EVENT` records:
//! - the TXT 1.2 event log container, whose offsets are absolute in the source
//! - the TXT heap event log descriptor, whose offsets are relative to the event log buffer
//!   it describes (the region at `phys_addr`, supplied by the caller)

use std::io::{Read, Seek};

use crate::byte_reader::{ByteParseable, ByteReader};
use crate::error::EventLogError;
use crate::event::log::{EventLog, EventLogDecoder};
use crate::event::model::{AlgorithmId, LogFormat};

pub const TXT_CONTAINER_SIGNATURE_SIZE: usize = 16;
const TXT_CONTAINER_RESERVED_SIZE: usize = 12;

/// TXT 1.2 event log container header (44 bytes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxtEventLogContainer {
    pub signature: [u8; TXT_CONTAINER_SIGNATURE_SIZE],
    pub container_ver_major: u8,
    pub container_ver_minor: u8,
    pub pcr_event_ver_major: u8,
    pub pcr_event_ver_minor: u8,
    pub size: u32,
    pub pcr_events_offset: u32,
    pub next_event_offset: u32,
}

impl TxtEventLogContainer {
    /// Signature as text, NUL padding removed
    pub fn signature_string(&self) -> String {
        String::from_utf8_lossy(&self.signature).trim_end_matches('\0').to_string()
    }
}

impl ByteParseable for TxtEventLogContainer {
    /// Fields are read in declared order; the reserved bytes are read and discarded
    fn parse_from<R: Read + Seek>(parser: &mut ByteReader<R>) -> Result<Self, EventLogError> {
        let signature: [u8; TXT_CONTAINER_SIGNATURE_SIZE] = parser.read_array()?;
        let _reserved: [u8; TXT_CONTAINER_RESERVED_SIZE] = parser.read_array()?;
        Ok(Self {
            signature,
            container_ver_major: parser.read_u8()?,
            container_ver_minor: parser.read_u8()?,
            pcr_event_ver_major: parser.read_u8()?,
            pcr_event_ver_minor: parser.read_u8()?,
            size: parser.read_u32()?,
            pcr_events_offset: parser.read_u32()?,
            next_event_offset: parser.read_u32()?,
        })
    }
}

/// TXT heap event log descriptor (40 bytes)
///
/// The log it describes holds single-digest records hashed with `alg`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxtHeapEventLogDescr {
    pub alg: u16,
    pub phys_addr: u64,
    pub size: u64,
    pub pcr_events_offset: u64,
    pub next_event_offset: u64,
}

impl ByteParseable for TxtHeapEventLogDescr {
    fn parse_from<R: Read + Seek>(parser: &mut ByteReader<R>) -> Result<Self, EventLogError> {
        let alg: u16 = parser.read_u16()?;
        let _reserved: u16 = parser.read_u16()?;
        Ok(Self {
            alg,
            phys_addr: parser.read_u64()?,
            size: parser.read_u64()?,
            pcr_events_offset: parser.read_u64()?,
            next_event_offset: parser.read_u64()?,
        })
    }
}

fn check_next_event_offset(next_event_offset: u64, size: u64) -> Result<(), EventLogError> {
    if next_event_offset > size {
        return Err(EventLogError::OutOfBounds { offset: next_event_offset, limit: size });
    }
    Ok(())
}

impl EventLogDecoder {
    /// Decode a TXT 1.2 event log whose container header starts at the current position
    ///
    /// # Errors
    /// * `OutOfBounds` - `nextEventOffset` lies beyond the container size or the source
    /// * Any record decoding error
    pub fn decode_txt12_log<R: Read + Seek>(&self, reader: &mut ByteReader<R>) -> Result<EventLog, EventLogError> {
        let container = TxtEventLogContainer::parse_from(reader)?;
        log::debug!(
            "TXT container {:?} v{}.{}, events [{}, {})",
            container.signature_string(),
            container.container_ver_major,
            container.container_ver_minor,
            container.pcr_events_offset,
            container.next_event_offset
        );
        check_next_event_offset(container.next_event_offset as u64, container.size as u64)?;

        self.assemble(
            reader,
            container.pcr_events_offset as u64,
            container.next_event_offset as u64,
            &LogFormat::Sha1,
        )
    }

    /// Decode the event log described by a TXT heap descriptor
    ///
    /// `buffer` reads the event log buffer itself; the descriptor offsets are relative to it.
    ///
    /// # Errors
    /// * `UnknownAlgorithm` - `descr.alg` is not a known digest algorithm
    /// * `OutOfBounds` - `nextEventOffset` lies beyond the descriptor size or the buffer
    /// * Any record decoding error
    pub fn decode_txt_heap_log<R: Read + Seek>(
        &self,
        descr: &TxtHeapEventLogDescr,
        buffer: &mut ByteReader<R>,
    ) -> Result<EventLog, EventLogError> {
        let algorithm = AlgorithmId::try_from(descr.alg)?;
        check_next_event_offset(descr.next_event_offset, descr.size)?;
        log::debug!(
            "TXT heap log at 0x{:x} ({}), events [{}, {})",
            descr.phys_addr, algorithm, descr.pcr_events_offset, descr.next_event_offset
        );

        self.assemble(
            buffer,
            descr.pcr_events_offset,
            descr.next_event_offset,
            &LogFormat::SingleDigest(algorithm),
        )
    }
}
