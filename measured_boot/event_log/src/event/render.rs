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

//! Event Data Rendering
//!
//! Turns the opaque payload of a measurement record into a short human readable string.
//! The payload layout is chosen by event type:
//! - action and IPL strings
//! - separator values
//! - S-CRTM version (GUID or UCS-2 string)
//! - platform firmware blobs (v1 and v2)
//! - UEFI image load events
//! - UEFI variable events
//! - GPT events
//! - PC client tagged events
//!
//! Rendering never fails the decode: a payload that does not fit its expected layout renders as `None`.

use std::io::{Read, Seek};
use std::mem::size_of;

use crate::byte_reader::{ByteParseable, ByteReader, UEFI_GUID_SIZE};
use crate::error::EventLogError;
use crate::event::model::{BiosEventType, EfiEventType};

// GPT header signature, "EFI PART"
const GPT_SIGNATURE_SIZE: usize = 8;

pub struct UefiPlatformFirmwareBlobEvent {
    pub blob_base: u64,
    pub blob_length: u64,
}

pub struct UefiPlatformFirmwareBlobEvent2 {
    pub blob_description: String,
    pub blob_base: u64,
    pub blob_length: u64,
}

pub struct UefiImageLoadEvent {
    pub image_location_in_memory: u64,
    pub image_length_in_memory: u64,
    pub image_link_time_address: u64,
    pub device_path: Vec<u8>,
}

pub struct UefiVariableDataEvent {
    pub variable_name: String,
    pub unicode_name: String,
    pub variable_data_length: u64,
}

/// GPT header fields that are rendered; the rest of the header is skipped
pub struct UefiGptDataEvent {
    pub disk_guid: String,
    pub number_of_partitions: u64,
}

pub struct PcClientTaggedEvent {
    pub tagged_event_id: u32,
    pub tagged_event_data: Vec<u8>,
}

impl ByteParseable for UefiPlatformFirmwareBlobEvent {
    fn parse_from<R: Read + Seek>(parser: &mut ByteReader<R>) -> Result<Self, EventLogError> {
        Ok(Self {
            blob_base: parser.read_u64()?,
            blob_length: parser.read_u64()?,
        })
    }
}

impl ByteParseable for UefiPlatformFirmwareBlobEvent2 {
    /// Compared to version 1, adds a length-prefixed description
    fn parse_from<R: Read + Seek>(parser: &mut ByteReader<R>) -> Result<Self, EventLogError> {
        let blob_description_size: u8 = parser.read_u8()?;
        let blob_description = parser.read_bytes(blob_description_size as usize)?;
        Ok(Self {
            blob_description: String::from_utf8_lossy(&blob_description).to_string(),
            blob_base: parser.read_u64()?,
            blob_length: parser.read_u64()?,
        })
    }
}

impl ByteParseable for UefiImageLoadEvent {
    fn parse_from<R: Read + Seek>(parser: &mut ByteReader<R>) -> Result<Self, EventLogError> {
        let image_location_in_memory: u64 = parser.read_u64()?;
        let image_length_in_memory: u64 = parser.read_u64()?;
        let image_link_time_address: u64 = parser.read_u64()?;
        let length_of_device_path: u64 = parser.read_u64()?;
        parser.ensure_available(length_of_device_path)?;
        let device_path = parser.read_bytes(length_of_device_path as usize)?;
        Ok(Self {
            image_location_in_memory,
            image_length_in_memory,
            image_link_time_address,
            device_path,
        })
    }
}

impl ByteParseable for UefiVariableDataEvent {
    /// GUID, name length in UTF-16 code units, data length in bytes, then the name
    fn parse_from<R: Read + Seek>(parser: &mut ByteReader<R>) -> Result<Self, EventLogError> {
        let variable_name: String = parser.read_guid()?;
        let unicode_name_length: u64 = parser.read_u64()?;
        let variable_data_length: u64 = parser.read_u64()?;
        parser.ensure_available(unicode_name_length.saturating_mul(2))?;
        let unicode_name: String = parser.read_unicode_name(unicode_name_length as usize)?;
        Ok(Self {
            variable_name,
            unicode_name,
            variable_data_length,
        })
    }
}

impl ByteParseable for UefiGptDataEvent {
    fn parse_from<R: Read + Seek>(parser: &mut ByteReader<R>) -> Result<Self, EventLogError> {
        let _signature: [u8; GPT_SIGNATURE_SIZE] = parser.read_array()?;
        // revision, header size, header crc32, reserved
        parser.read_bytes(size_of::<u32>() * 4)?;
        // my lba, alternate lba, first and last usable lba
        parser.read_bytes(size_of::<u64>() * 4)?;
        let disk_guid: String = parser.read_guid()?;
        // partition entries lba, entry count, entry size, entry array crc32
        parser.read_bytes(size_of::<u64>() + size_of::<u32>() * 3)?;
        let number_of_partitions: u64 = parser.read_u64()?;
        Ok(Self { disk_guid, number_of_partitions })
    }
}

impl ByteParseable for PcClientTaggedEvent {
    fn parse_from<R: Read + Seek>(parser: &mut ByteReader<R>) -> Result<Self, EventLogError> {
        let tagged_event_id: u32 = parser.read_u32()?;
        let tagged_event_data_size: u32 = parser.read_u32()?;
        let tagged_event_data = parser.read_bytes(tagged_event_data_size as usize)?;
        Ok(Self { tagged_event_id, tagged_event_data })
    }
}

/// Interpret bytes as text, dropping trailing NUL padding
pub fn bytes_to_string(data: &[u8]) -> String {
    String::from_utf8_lossy(data).trim_end_matches('\0').to_string()
}

/// Remove control characters so a rendered payload stays on one line
pub fn strip_control_characters(value: &str) -> String {
    value.chars().filter(|c| !c.is_control()).collect()
}

fn render_firmware_blob(parser: &mut ByteReader<impl Read + Seek>) -> Result<String, EventLogError> {
    let blob = UefiPlatformFirmwareBlobEvent::parse_from(parser)?;
    Ok(format!("base: 0x{:x}, length: 0x{:x}", blob.blob_base, blob.blob_length))
}

fn render_firmware_blob2(parser: &mut ByteReader<impl Read + Seek>) -> Result<String, EventLogError> {
    let blob = UefiPlatformFirmwareBlobEvent2::parse_from(parser)?;
    Ok(format!(
        "{}, base: 0x{:x}, length: 0x{:x}",
        blob.blob_description, blob.blob_base, blob.blob_length
    ))
}

/// POST code payloads are either a blob (16 bytes) or a free-form string
fn render_post_code(parser: &mut ByteReader<impl Read + Seek>) -> Result<String, EventLogError> {
    if parser.remaining() == size_of::<UefiPlatformFirmwareBlobEvent>() as u64 {
        return render_firmware_blob(parser);
    }
    Ok(bytes_to_string(&parser.read_remaining()?))
}

fn render_s_crtm_version(parser: &mut ByteReader<impl Read + Seek>) -> Result<String, EventLogError> {
    if parser.remaining() == UEFI_GUID_SIZE as u64 {
        return parser.read_guid();
    }
    parser.read_ucs2_string()
}

fn render_separator(parser: &mut ByteReader<impl Read + Seek>) -> Result<String, EventLogError> {
    if parser.remaining() == size_of::<u32>() as u64 {
        return Ok(format!("0x{:08x}", parser.read_u32()?));
    }
    Ok(hex::encode(parser.read_remaining()?))
}

fn render_image_load(parser: &mut ByteReader<impl Read + Seek>) -> Result<String, EventLogError> {
    let image = UefiImageLoadEvent::parse_from(parser)?;
    Ok(format!(
        "location: 0x{:x}, length: 0x{:x}, link time address: 0x{:x}, device path: {}",
        image.image_location_in_memory,
        image.image_length_in_memory,
        image.image_link_time_address,
        hex::encode(image.device_path)
    ))
}

fn render_variable(parser: &mut ByteReader<impl Read + Seek>) -> Result<String, EventLogError> {
    let variable = UefiVariableDataEvent::parse_from(parser)?;
    Ok(format!(
        "{} {} ({} bytes)",
        variable.variable_name, variable.unicode_name, variable.variable_data_length
    ))
}

fn render_gpt(parser: &mut ByteReader<impl Read + Seek>) -> Result<String, EventLogError> {
    let gpt = UefiGptDataEvent::parse_from(parser)?;
    Ok(format!("disk guid: {}, partitions: {}", gpt.disk_guid, gpt.number_of_partitions))
}

fn render_tagged(parser: &mut ByteReader<impl Read + Seek>) -> Result<String, EventLogError> {
    let tagged = PcClientTaggedEvent::parse_from(parser)?;
    Ok(format!(
        "tagged event id: 0x{:x}, data: {}",
        tagged.tagged_event_id,
        hex::encode(tagged.tagged_event_data)
    ))
}

fn render_text(parser: &mut ByteReader<impl Read + Seek>) -> Result<String, EventLogError> {
    Ok(bytes_to_string(&parser.read_remaining()?))
}

/// Render the payload of an event of type `event_type`
///
/// # Returns
/// * `Some(String)` - The rendered payload
/// * `None` - The type has no known payload layout, or the payload does not fit it
pub fn event_data_string(event_type: u32, event_data: &[u8]) -> Option<String> {
    let mut parser = ByteReader::from_bytes(event_data);

    let rendered = if let Some(bios) = BiosEventType::from_u32(event_type) {
        match bios {
            BiosEventType::EvNoAction
            | BiosEventType::EvAction
            | BiosEventType::EvIpl
            | BiosEventType::EvOmitBootDeviceEvents
            | BiosEventType::EvCompactHash => render_text(&mut parser),
            BiosEventType::EvPostCode | BiosEventType::EvPostCode2 | BiosEventType::EvSCrtmContents => {
                render_post_code(&mut parser)
            },
            BiosEventType::EvSeparator => render_separator(&mut parser),
            BiosEventType::EvSCrtmVersion => render_s_crtm_version(&mut parser),
            BiosEventType::EvEventTag => render_tagged(&mut parser),
            _ => return None,
        }
    } else if let Some(efi) = EfiEventType::from_u32(event_type) {
        match efi {
            EfiEventType::EvEfiAction | EfiEventType::EvEfiHcrtmEvent => render_text(&mut parser),
            EfiEventType::EvEfiPlatformFirmwareBlob => render_firmware_blob(&mut parser),
            EfiEventType::EvEfiPlatformFirmwareBlob2 => render_firmware_blob2(&mut parser),
            EfiEventType::EvEfiBootServicesApplication
            | EfiEventType::EvEfiBootServicesDriver
            | EfiEventType::EvEfiRuntimeServicesDriver => render_image_load(&mut parser),
            EfiEventType::EvEfiVariableDriverConfig
            | EfiEventType::EvEfiVariableBoot
            | EfiEventType::EvEfiVariableBoot2
            | EfiEventType::EvEfiVariableAuthority
            | EfiEventType::EvEfiSpdmDevicePolicy
            | EfiEventType::EvEfiSpdmDeviceAuthority => render_variable(&mut parser),
            EfiEventType::EvEfiGptEvent | EfiEventType::EvEfiGptEvent2 => render_gpt(&mut parser),
            _ => return None,
        }
    } else {
        return None;
    };

    match rendered {
        Ok(value) => Some(value),
        Err(e) => {
            log::debug!("Event data of type 0x{:x} could not be rendered: {}", event_type, e);
            None
        },
    }
}
