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

//! Decoder limits
//!
//! Caps applied to length fields read from the log before anything is allocated.
//! Values can be loaded from a YAML file; missing keys fall back to the defaults.

use serde::Deserialize;
use std::path::PathBuf;

use crate::error::EventLogError;

pub const DEFAULT_MAX_EVENT_DATA_SIZE: u32 = 16 * 1024 * 1024;
pub const DEFAULT_MAX_DIGEST_COUNT: u32 = 8;
pub const DEFAULT_MAX_ALGORITHM_COUNT: u32 = 8;
pub const DEFAULT_MAX_VENDOR_INFO_SIZE: u32 = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Largest `eventSize` accepted for a single record
    pub max_event_data_size: u32,
    /// Largest `digestCount` accepted in a crypto-agile record
    pub max_digest_count: u32,
    /// Largest `numberOfAlgorithms` accepted in a spec ID event
    pub max_algorithm_count: u32,
    pub max_vendor_info_size: u32,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_event_data_size: DEFAULT_MAX_EVENT_DATA_SIZE,
            max_digest_count: DEFAULT_MAX_DIGEST_COUNT,
            max_algorithm_count: DEFAULT_MAX_ALGORITHM_COUNT,
            max_vendor_info_size: DEFAULT_MAX_VENDOR_INFO_SIZE,
        }
    }
}

impl DecoderConfig {
    pub fn from_yaml(path: impl Into<PathBuf>) -> Result<Self, EventLogError> {
        let path = path.into();
        let config_str = std::fs::read_to_string(&path)
            .map_err(|e| EventLogError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_yaml_str(&config_str)
    }

    pub fn from_yaml_str(config_str: &str) -> Result<Self, EventLogError> {
        serde_yaml::from_str(config_str)
            .map_err(|e| EventLogError::Config(format!("Failed to parse decoder config: {}", e)))
    }
}

/// Reject `value` when it exceeds `limit`
pub(crate) fn check_limit(field: &'static str, value: u64, limit: u32) -> Result<(), EventLogError> {
    if value > limit as u64 {
        return Err(EventLogError::LimitExceeded { field, value, limit: limit as u64 });
    }
    Ok(())
}
