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

//! Byte Reader Module
//!
//! This module provides the primitive reads used by every event log decoder:
//! little-endian fixed-width integers, length-prefixed byte runs, GUIDs and UCS-2 strings,
//! plus positioned seeks over any seekable byte source.
//!
//! The module contains two main components:
//! - `ByteReader`: A bounded reader over a `Read + Seek` source (file, in-memory buffer, ...)
//! - `ByteParseable`: A parseable trait; types implementing this trait can be decoded directly from a reader
//!
//! Every read is checked against the reader limit before any buffer is allocated, so a corrupt
//! length field turns into `EventLogError::Truncated` instead of a huge allocation.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use uuid::Uuid;

use crate::error::EventLogError;

/// UEFI GUID size
pub const UEFI_GUID_SIZE: usize = 16;

/// Bounded binary reader
///
/// Wraps a seekable source and tracks the current offset together with a read limit.
/// The limit starts at the source length and can be narrowed with [`ByteReader::set_limit`]
/// so that a decoder can never consume bytes beyond a container-declared end offset.
pub struct ByteReader<R> {
    source: R,
    position: u64,
    length: u64,
    limit: u64,
}

/// Trait for types that can be parsed from a byte stream
///
/// # Example
///
/// ```rust ignore
/// use tpm_event_log::{ByteReader, ByteParseable, EventLogError};
///
/// struct Separator {
///     value: u32,
/// }
///
/// impl ByteParseable for Separator {
///     fn parse_from<R: Read + Seek>(parser: &mut ByteReader<R>) -> Result<Self, EventLogError> {
///         Ok(Self { value: parser.read_u32()? })
///     }
/// }
/// ```
pub trait ByteParseable: Sized {
    /// Parse an instance of the current type from a byte reader
    ///
    /// # Errors
    ///
    /// Returns `EventLogError::Truncated` when the reader runs out of bytes, or a decoder
    /// specific error when the content is malformed
    fn parse_from<R: Read + Seek>(parser: &mut ByteReader<R>) -> Result<Self, EventLogError>;
}

impl<'a> ByteReader<Cursor<&'a [u8]>> {
    /// Create a reader over an in-memory buffer
    pub fn from_bytes(data: &'a [u8]) -> Self {
        let length = data.len() as u64;
        Self {
            source: Cursor::new(data),
            position: 0,
            length,
            limit: length,
        }
    }
}

impl<R: Read + Seek> ByteReader<R> {
    /// Create a reader over a seekable source
    ///
    /// The source length is measured once; reading starts at the source's current offset.
    ///
    /// # Errors
    /// * Returns `EventLogError::Io` when the source cannot be seeked
    pub fn new(mut source: R) -> Result<Self, EventLogError> {
        let position = source.stream_position()?;
        let length = source.seek(SeekFrom::End(0))?;
        source.seek(SeekFrom::Start(position))?;
        Ok(Self {
            source,
            position,
            length,
            limit: length,
        })
    }

    /// Get the current position (byte offset from the start of the source)
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Set position
    ///
    /// # Errors
    /// * Returns `EventLogError::OutOfBounds` when the position lies beyond the current limit
    pub fn set_position(&mut self, pos: u64) -> Result<(), EventLogError> {
        self.seek(SeekFrom::Start(pos)).map(|_| ())
    }

    /// Seek relative to the start, the current position or the limit
    ///
    /// # Returns
    /// * `Result<u64, EventLogError>` - The new position
    ///
    /// # Errors
    /// * Returns `EventLogError::OutOfBounds` when the target falls outside `[0, limit]`
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64, EventLogError> {
        let target: i128 = match pos {
            SeekFrom::Start(offset) => offset as i128,
            SeekFrom::Current(delta) => self.position as i128 + delta as i128,
            SeekFrom::End(delta) => self.limit as i128 + delta as i128,
        };
        if target < 0 || target > self.limit as i128 {
            return Err(EventLogError::OutOfBounds {
                offset: u64::try_from(target.max(0)).unwrap_or(u64::MAX),
                limit: self.limit,
            });
        }

        let target = target as u64;
        self.source.seek(SeekFrom::Start(target))?;
        self.position = target;
        Ok(target)
    }

    /// Current read limit
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Narrow (or widen) the readable window to `[0, end)`
    ///
    /// # Errors
    /// * Returns `EventLogError::OutOfBounds` when `end` lies beyond the source length
    pub fn set_limit(&mut self, end: u64) -> Result<(), EventLogError> {
        if end > self.length {
            return Err(EventLogError::OutOfBounds { offset: end, limit: self.length });
        }
        self.limit = end;
        Ok(())
    }

    /// Get the number of unread bytes before the limit
    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.position)
    }

    /// Check if the limit has been reached
    pub fn is_end(&self) -> bool {
        self.position >= self.limit
    }

    /// Get the total source length
    pub fn get_length(&self) -> u64 {
        self.length
    }

    /// Release the underlying source
    pub fn into_inner(self) -> R {
        self.source
    }

    /// Fail with `Truncated` unless `length` more bytes can be read
    pub fn ensure_available(&self, length: u64) -> Result<(), EventLogError> {
        let available = self.remaining();
        if length > available {
            return Err(EventLogError::truncated(self.position, length, available));
        }
        Ok(())
    }

    fn map_read_error(&self, err: io::Error, requested: u64) -> EventLogError {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            EventLogError::truncated(self.position, requested, self.remaining())
        } else {
            EventLogError::Io(err)
        }
    }

    /// Read a u8 value
    ///
    /// # Errors
    /// * Returns `EventLogError::Truncated` when no byte is left before the limit
    pub fn read_u8(&mut self) -> Result<u8, EventLogError> {
        self.ensure_available(1)?;
        let value = self.source.read_u8().map_err(|e| self.map_read_error(e, 1))?;
        self.position += 1;
        Ok(value)
    }

    /// Read a u16 value (little-endian)
    ///
    /// # Errors
    /// * Returns `EventLogError::Truncated` when fewer than 2 bytes are left before the limit
    pub fn read_u16(&mut self) -> Result<u16, EventLogError> {
        self.ensure_available(2)?;
        let value = self.source.read_u16::<LittleEndian>().map_err(|e| self.map_read_error(e, 2))?;
        self.position += 2;
        Ok(value)
    }

    /// Read a u32 value (little-endian)
    ///
    /// # Errors
    /// * Returns `EventLogError::Truncated` when fewer than 4 bytes are left before the limit
    pub fn read_u32(&mut self) -> Result<u32, EventLogError> {
        self.ensure_available(4)?;
        let value = self.source.read_u32::<LittleEndian>().map_err(|e| self.map_read_error(e, 4))?;
        self.position += 4;
        Ok(value)
    }

    /// Read a u64 value (little-endian)
    ///
    /// # Errors
    /// * Returns `EventLogError::Truncated` when fewer than 8 bytes are left before the limit
    pub fn read_u64(&mut self) -> Result<u64, EventLogError> {
        self.ensure_available(8)?;
        let value = self.source.read_u64::<LittleEndian>().map_err(|e| self.map_read_error(e, 8))?;
        self.position += 8;
        Ok(value)
    }

    /// Read bytes of specified length
    ///
    /// The length is checked against the remaining bytes before the buffer is allocated.
    ///
    /// # Errors
    /// * Returns `EventLogError::Truncated` when the requested number of bytes exceeds the remaining bytes
    pub fn read_bytes(&mut self, length: usize) -> Result<Vec<u8>, EventLogError> {
        self.ensure_available(length as u64)?;
        let mut buffer: Vec<u8> = vec![0u8; length];
        self.source.read_exact(&mut buffer)
            .map_err(|e| self.map_read_error(e, length as u64))?;
        self.position += length as u64;
        Ok(buffer)
    }

    /// Read a fixed-size byte array
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], EventLogError> {
        self.ensure_available(N as u64)?;
        let mut buffer = [0u8; N];
        self.source.read_exact(&mut buffer)
            .map_err(|e| self.map_read_error(e, N as u64))?;
        self.position += N as u64;
        Ok(buffer)
    }

    /// Read every byte up to the limit
    pub fn read_remaining(&mut self) -> Result<Vec<u8>, EventLogError> {
        let remaining = self.remaining() as usize;
        self.read_bytes(remaining)
    }

    /// Read GUID (16 bytes, mixed-endian UEFI layout)
    ///
    /// # Returns
    /// * `Result<String, EventLogError>` - The GUID in canonical lower-case form
    pub fn read_guid(&mut self) -> Result<String, EventLogError> {
        let guid_bytes: [u8; UEFI_GUID_SIZE] = self.read_array()?;
        Ok(Uuid::from_bytes_le(guid_bytes).to_string())
    }

    /// Read Unicode name
    ///
    /// Reads `length` UTF-16LE code units, stopping early at a NUL character
    pub fn read_unicode_name(&mut self, length: usize) -> Result<String, EventLogError> {
        self.ensure_available((length as u64).saturating_mul(2))?;
        let mut unicode_name = String::new();
        for _ in 0..length {
            let char_code = self.read_u16()?;
            if char_code == 0 {
                break;
            }
            unicode_name.push(std::char::from_u32(char_code as u32).unwrap_or('?'));
        }
        Ok(unicode_name)
    }

    /// Read UCS-2 (UTF-16LE) string
    ///
    /// Reads code units until the limit or a NUL terminator
    pub fn read_ucs2_string(&mut self) -> Result<String, EventLogError> {
        let mut unicode_str = String::new();
        while self.remaining() >= 2 {
            let code_unit = self.read_u16()?;
            if code_unit == 0 {
                break;
            }
            unicode_str.push(std::char::from_u32(code_unit as u32).unwrap_or('\u{FFFD}'));
        }
        Ok(unicode_str)
    }
}
