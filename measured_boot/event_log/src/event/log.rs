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

//! Event Log Assembly
//! Including the decoded log type, the record loop and serialization.
//!
//! Main features include:
//! - Decoding every record of a byte range `[start, end)` in stream order
//! - Detecting the record layout of a PC client TCG log from its spec ID event
//! - Rendering a log as text blocks or as a JSON array
//!
//! Decoding is all-or-nothing: the first failing record aborts the whole log.

use std::fmt;
use std::io::{Read, Seek};

use serde_json::{json, Value};

use crate::byte_reader::ByteReader;
use crate::config::DecoderConfig;
use crate::error::EventLogError;
use crate::event::model::{
    AlgorithmId, BiosEventType, LogFormat, MeasurementEvent, SpecIdEvent, SpecIdMatch,
    SPEC_ID_SIGNATURE_SIZE,
};
use crate::event::parser::{parse_event, parse_tcg_pcr_event, PcrEvent};
use crate::event::spec_id::probe_spec_id_event;

/// Decoded measurement log
///
/// # Fields
/// * `format` - Record layout every event was decoded with
/// * `spec_id_event` - Spec ID preamble, only present for PC client TCG logs that carry one
/// * `events` - Events in on-disk order; the spec ID record itself is kept as the first event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLog {
    pub format: LogFormat,
    pub spec_id_event: Option<SpecIdEvent>,
    pub events: Vec<MeasurementEvent>,
}

impl EventLog {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MeasurementEvent> {
        self.events.iter()
    }

    /// Converts the event log to a JSON array, one object per event
    pub fn to_json_value(&self) -> Value {
        let entries = self.events.iter().enumerate().map(|(event_number, event)| {
            let digests: Vec<Value> = event.digests().iter().map(|digest| {
                json!({
                    "hash_id": digest.algorithm_id.to_string(),
                    "digest": digest.hex(),
                })
            }).collect();

            json!({
                "event_number": event_number,
                "pcr_index": event.pcr_index(),
                "event_type": event.event_type(),
                "event_name": event.event_name(),
                "digests": digests,
                "event_data": event.event_data_string(),
            })
        }).collect::<Vec<Value>>();

        Value::Array(entries)
    }
}

impl<'a> IntoIterator for &'a EventLog {
    type Item = &'a MeasurementEvent;
    type IntoIter = std::slice::Iter<'a, MeasurementEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

impl fmt::Display for EventLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, event) in self.events.iter().enumerate() {
            if index > 0 {
                write!(f, "\n\n")?;
            }
            write!(f, "{}", event)?;
        }
        Ok(())
    }
}

/// Drives the record decoders over a byte source
#[derive(Debug, Clone, Default)]
pub struct EventLogDecoder {
    config: DecoderConfig,
}

impl EventLogDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode every record of `[start, end)` with the layout given by `format`
    ///
    /// The reader limit is narrowed to `end` for the duration of the call, so a record whose
    /// declared length crosses `end` fails with `Truncated` instead of reading into whatever
    /// follows the range. The previous limit is restored before returning.
    ///
    /// # Errors
    /// * `OutOfBounds` - `end` lies beyond the source, or `start` lies beyond `end`
    /// * Any error of the record decoder; no partial log is returned
    pub fn assemble<R: Read + Seek>(
        &self,
        reader: &mut ByteReader<R>,
        start: u64,
        end: u64,
        format: &LogFormat,
    ) -> Result<EventLog, EventLogError> {
        let saved_limit = reader.limit();
        reader.set_limit(end)?;

        let mut events = Vec::new();
        let result = reader
            .set_position(start)
            .and_then(|_| self.decode_records(reader, format, &mut events));
        reader.set_limit(saved_limit)?;
        result?;

        Ok(EventLog {
            format: format.clone(),
            spec_id_event: None,
            events,
        })
    }

    fn decode_records<R: Read + Seek>(
        &self,
        reader: &mut ByteReader<R>,
        format: &LogFormat,
        events: &mut Vec<MeasurementEvent>,
    ) -> Result<(), EventLogError> {
        while !reader.is_end() {
            let offset = reader.position();
            let event = parse_event(reader, format, &self.config).map_err(|e| {
                log::error!("Failed to decode event {} at offset {}: {}", events.len(), offset, e);
                e
            })?;
            log::debug!(
                "Decoded event {} at offset {}: PCR {}, type 0x{:x}",
                events.len(), offset, event.pcr_index(), event.event_type()
            );
            events.push(event);
        }
        Ok(())
    }

    /// Decode a PC client TCG log (for example `binary_bios_measurements`) from the current
    /// position to the end of the reader
    ///
    /// The first record always uses the SHA-1 layout. When it is an `EV_NO_ACTION` carrying a
    /// crypto-agile spec ID event, the remaining records are decoded as `TCG_PCR_EVENT2` with
    /// the announced algorithm list; otherwise the whole log is SHA-1.
    pub fn decode_tcg_log<R: Read + Seek>(&self, reader: &mut ByteReader<R>) -> Result<EventLog, EventLogError> {
        let start = reader.position();
        let first = parse_tcg_pcr_event(reader, AlgorithmId::Sha1, &self.config).map_err(|e| {
            log::error!("Failed to decode event 0 at offset {}: {}", start, e);
            e
        })?;

        let mut spec_id_event = None;
        if first.event_type == BiosEventType::EvNoAction as u32 && first.event.len() >= SPEC_ID_SIGNATURE_SIZE {
            let mut payload = ByteReader::from_bytes(&first.event);
            if let SpecIdMatch::Matched(event) = probe_spec_id_event(&mut payload, &self.config)? {
                spec_id_event = Some(event);
            }
        }

        let format = match &spec_id_event {
            Some(SpecIdEvent::Efi(event)) => LogFormat::CryptoAgile(event.digest_sizes.clone()),
            _ => LogFormat::Sha1,
        };
        log::debug!("Detected TCG log format: {}", format);

        let mut events = vec![MeasurementEvent::Legacy(first)];
        self.decode_records(reader, &format, &mut events)?;

        Ok(EventLog {
            format,
            spec_id_event,
            events,
        })
    }
}
