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

//! Measured boot event log decoding
//!
//! Decodes PC client TCG logs (TCG 1.2 and crypto agile), Intel TXT 1.2 logs and TXT heap
//! logs into an ordered list of measurement events. The library only decodes: it never
//! recomputes digests and never writes logs.
//!
//! # Example
//! ```no_run
//! use std::fs::File;
//! use tpm_event_log::{parse_tcg_log, ByteReader};
//!
//! let file = File::open("/sys/kernel/security/tpm0/binary_bios_measurements").unwrap();
//! let mut reader = ByteReader::new(file).unwrap();
//! let log = parse_tcg_log(&mut reader).unwrap();
//! println!("{}", log);
//! ```

pub mod byte_reader;
pub mod config;
pub mod error;
pub mod event;
pub mod txt;

use std::io::{Read, Seek};

pub use byte_reader::{ByteParseable, ByteReader};
pub use config::DecoderConfig;
pub use error::EventLogError;
pub use event::log::{EventLog, EventLogDecoder};
pub use event::model::{
    digest_size, event_type_name, txt_event_type_name, AlgorithmId, BiosEventType, EfiEventType,
    LogFormat, MeasurementEvent, PcrDigestValue, SpecIdEvent, SpecIdMatch, TcgBiosSpecIdEvent,
    TcgEfiSpecIdEvent, TcgEfiSpecIdEventAlgorithmSize, TcgPcrEvent, TcgPcrEvent2, TxtEventType,
};
pub use event::parser::PcrEvent;
pub use txt::{TxtEventLogContainer, TxtHeapEventLogDescr};

/// Decode a PC client TCG log with the default limits
pub fn parse_tcg_log<R: Read + Seek>(reader: &mut ByteReader<R>) -> Result<EventLog, EventLogError> {
    EventLogDecoder::default().decode_tcg_log(reader)
}

/// Decode a TXT 1.2 event log with the default limits
pub fn parse_txt12_log<R: Read + Seek>(reader: &mut ByteReader<R>) -> Result<EventLog, EventLogError> {
    EventLogDecoder::default().decode_txt12_log(reader)
}

/// Decode a TXT heap event log with the default limits
pub fn parse_txt_heap_log<R: Read + Seek>(
    descr: &TxtHeapEventLogDescr,
    buffer: &mut ByteReader<R>,
) -> Result<EventLog, EventLogError> {
    EventLogDecoder::default().decode_txt_heap_log(descr, buffer)
}
