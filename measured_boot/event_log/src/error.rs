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

//! Error type shared by every decoding stage.
//!
//! All variants except `Config` abort the decode call that raised them; no partially
//! assembled log is ever handed back to the caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventLogError {
    /// The input ended before a declared-length field could be read in full.
    #[error("Truncated input: requested {requested} bytes at offset {offset} but only {available} bytes remain")]
    Truncated {
        offset: u64,
        requested: u64,
        available: u64,
    },

    /// A seek or declared range falls outside the readable region.
    #[error("Offset {offset} is out of bounds (limit {limit})")]
    OutOfBounds { offset: u64, limit: u64 },

    /// A digest declares an algorithm whose size is not known, so the rest of the record
    /// cannot be walked.
    #[error("Unknown digest algorithm: 0x{0:04X}")]
    UnknownAlgorithm(u16),

    #[error("Digest size mismatch for algorithm 0x{algorithm_id:04X}: declared {declared}, expected {expected}")]
    DigestSizeMismatch {
        algorithm_id: u16,
        declared: u16,
        expected: u16,
    },

    #[error("Field {field} value {value} exceeds configured limit {limit}")]
    LimitExceeded {
        field: &'static str,
        value: u64,
        limit: u64,
    },

    /// A count field that must announce at least one entry is zero.
    #[error("Field {field} must not be zero")]
    ZeroCount { field: &'static str },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl EventLogError {
    pub(crate) fn truncated(offset: u64, requested: u64, available: u64) -> Self {
        EventLogError::Truncated { offset, requested, available }
    }

    /// Whether the error was caused by the input ending early.
    pub fn is_truncated(&self) -> bool {
        matches!(self, EventLogError::Truncated { .. })
    }
}
