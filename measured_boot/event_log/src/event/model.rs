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

//! Event Type Definitions
//!
//! This module defines the digest algorithm table, the event type enumerations and the record
//! structures produced by the decoders.
//! Three disjoint event type namespaces exist: legacy BIOS types, EFI types and Intel TXT types.

use std::fmt;

use crate::error::EventLogError;

pub const SPEC_ID_SIGNATURE_SIZE: usize = 16;
pub const SHA1_DIGEST_SIZE: usize = 20;

/// Identifier of the legacy (TCG 1.2 / BIOS) spec ID event, NUL padding removed
pub const TCG_BIOS_SPEC_ID_SIGNATURE: &str = "Spec ID Event00";

/// Identifier of the crypto-agile (TCG 2.0 / EFI) spec ID event, NUL padding removed
pub const TCG_EFI_SPEC_ID_SIGNATURE: &str = "Spec ID Event03";

/// TPM digest algorithm identifiers known to the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum AlgorithmId {
    Sha1 = 0x0004,
    Sha256 = 0x000B,
    Sha384 = 0x000C,
    Sha512 = 0x000D,
    Sm3 = 0x0012,
}

impl TryFrom<u16> for AlgorithmId {
    type Error = EventLogError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0x0004 => Ok(AlgorithmId::Sha1),
            0x000B => Ok(AlgorithmId::Sha256),
            0x000C => Ok(AlgorithmId::Sha384),
            0x000D => Ok(AlgorithmId::Sha512),
            0x0012 => Ok(AlgorithmId::Sm3),
            _ => Err(EventLogError::UnknownAlgorithm(value)),
        }
    }
}

impl AlgorithmId {
    pub fn digest_size(&self) -> usize {
        match self {
            AlgorithmId::Sha1 => 20,
            AlgorithmId::Sha256 => 32,
            AlgorithmId::Sha384 => 48,
            AlgorithmId::Sha512 => 64,
            AlgorithmId::Sm3 => 32,
        }
    }

    /// Label used in the text rendering of a digest line
    pub fn digest_label(&self) -> &'static str {
        match self {
            AlgorithmId::Sha1 => "SHA1",
            AlgorithmId::Sha256 => "SHA256",
            AlgorithmId::Sha384 => "SHA384",
            AlgorithmId::Sha512 => "SHA512",
            AlgorithmId::Sm3 => "SM3",
        }
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlgorithmId::Sha1 => write!(f, "sha1"),
            AlgorithmId::Sha256 => write!(f, "sha256"),
            AlgorithmId::Sha384 => write!(f, "sha384"),
            AlgorithmId::Sha512 => write!(f, "sha512"),
            AlgorithmId::Sm3 => write!(f, "sm3"),
        }
    }
}

/// Digest length in bytes for a raw algorithm id, `None` when the id is not in the table
pub fn digest_size(algorithm_id: u16) -> Option<usize> {
    AlgorithmId::try_from(algorithm_id).ok().map(|alg| alg.digest_size())
}

/// Legacy BIOS event types (TCG PC Client)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum BiosEventType {
    EvPrebootCert = 0x00000000,
    EvPostCode = 0x00000001,
    EvUnused = 0x00000002,
    EvNoAction = 0x00000003,
    EvSeparator = 0x00000004,
    EvAction = 0x00000005,
    EvEventTag = 0x00000006,
    EvSCrtmContents = 0x00000007,
    EvSCrtmVersion = 0x00000008,
    EvCpuMicrocode = 0x00000009,
    EvPlatformConfigFlags = 0x0000000A,
    EvTableOfDevices = 0x0000000B,
    EvCompactHash = 0x0000000C,
    EvIpl = 0x0000000D,
    EvIplPartitionData = 0x0000000E,
    EvNonhostCode = 0x0000000F,
    EvNonhostConfig = 0x00000010,
    EvNonhostInfo = 0x00000011,
    EvOmitBootDeviceEvents = 0x00000012,
    EvPostCode2 = 0x00000013,
}

impl BiosEventType {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0x00000000 => Some(Self::EvPrebootCert),
            0x00000001 => Some(Self::EvPostCode),
            0x00000002 => Some(Self::EvUnused),
            0x00000003 => Some(Self::EvNoAction),
            0x00000004 => Some(Self::EvSeparator),
            0x00000005 => Some(Self::EvAction),
            0x00000006 => Some(Self::EvEventTag),
            0x00000007 => Some(Self::EvSCrtmContents),
            0x00000008 => Some(Self::EvSCrtmVersion),
            0x00000009 => Some(Self::EvCpuMicrocode),
            0x0000000A => Some(Self::EvPlatformConfigFlags),
            0x0000000B => Some(Self::EvTableOfDevices),
            0x0000000C => Some(Self::EvCompactHash),
            0x0000000D => Some(Self::EvIpl),
            0x0000000E => Some(Self::EvIplPartitionData),
            0x0000000F => Some(Self::EvNonhostCode),
            0x00000010 => Some(Self::EvNonhostConfig),
            0x00000011 => Some(Self::EvNonhostInfo),
            0x00000012 => Some(Self::EvOmitBootDeviceEvents),
            0x00000013 => Some(Self::EvPostCode2),
            _ => None,
        }
    }
}

impl fmt::Display for BiosEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::EvPrebootCert => "EV_PREBOOT_CERT",
            Self::EvPostCode => "EV_POST_CODE",
            Self::EvUnused => "EV_UNUSED",
            Self::EvNoAction => "EV_NO_ACTION",
            Self::EvSeparator => "EV_SEPARATOR",
            Self::EvAction => "EV_ACTION",
            Self::EvEventTag => "EV_EVENT_TAG",
            Self::EvSCrtmContents => "EV_S_CRTM_CONTENTS",
            Self::EvSCrtmVersion => "EV_S_CRTM_VERSION",
            Self::EvCpuMicrocode => "EV_CPU_MICROCODE",
            Self::EvPlatformConfigFlags => "EV_PLATFORM_CONFIG_FLAGS",
            Self::EvTableOfDevices => "EV_TABLE_OF_DEVICES",
            Self::EvCompactHash => "EV_COMPACT_HASH",
            Self::EvIpl => "EV_IPL",
            Self::EvIplPartitionData => "EV_IPL_PARTITION_DATA",
            Self::EvNonhostCode => "EV_NONHOST_CODE",
            Self::EvNonhostConfig => "EV_NONHOST_CONFIG",
            Self::EvNonhostInfo => "EV_NONHOST_INFO",
            Self::EvOmitBootDeviceEvents => "EV_OMIT_BOOT_DEVICE_EVENTS",
            Self::EvPostCode2 => "EV_POST_CODE2",
        };
        f.write_str(name)
    }
}

/// EFI event types (TCG PC Client Platform Firmware Profile)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum EfiEventType {
    EvEfiEventBase = 0x80000000,
    EvEfiVariableDriverConfig = 0x80000001,
    EvEfiVariableBoot = 0x80000002,
    EvEfiBootServicesApplication = 0x80000003,
    EvEfiBootServicesDriver = 0x80000004,
    EvEfiRuntimeServicesDriver = 0x80000005,
    EvEfiGptEvent = 0x80000006,
    EvEfiAction = 0x80000007,
    EvEfiPlatformFirmwareBlob = 0x80000008,
    EvEfiHandoffTables = 0x80000009,
    EvEfiPlatformFirmwareBlob2 = 0x8000000A,
    EvEfiHandoffTables2 = 0x8000000B,
    EvEfiVariableBoot2 = 0x8000000C,
    EvEfiGptEvent2 = 0x8000000D,
    EvEfiHcrtmEvent = 0x80000010,
    EvEfiVariableAuthority = 0x800000E0,
    EvEfiSpdmFirmwareBlob = 0x800000E1,
    EvEfiSpdmFirmwareConfig = 0x800000E2,
    EvEfiSpdmDevicePolicy = 0x800000E3,
    EvEfiSpdmDeviceAuthority = 0x800000E4,
}

impl EfiEventType {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0x80000000 => Some(Self::EvEfiEventBase),
            0x80000001 => Some(Self::EvEfiVariableDriverConfig),
            0x80000002 => Some(Self::EvEfiVariableBoot),
            0x80000003 => Some(Self::EvEfiBootServicesApplication),
            0x80000004 => Some(Self::EvEfiBootServicesDriver),
            0x80000005 => Some(Self::EvEfiRuntimeServicesDriver),
            0x80000006 => Some(Self::EvEfiGptEvent),
            0x80000007 => Some(Self::EvEfiAction),
            0x80000008 => Some(Self::EvEfiPlatformFirmwareBlob),
            0x80000009 => Some(Self::EvEfiHandoffTables),
            0x8000000A => Some(Self::EvEfiPlatformFirmwareBlob2),
            0x8000000B => Some(Self::EvEfiHandoffTables2),
            0x8000000C => Some(Self::EvEfiVariableBoot2),
            0x8000000D => Some(Self::EvEfiGptEvent2),
            0x80000010 => Some(Self::EvEfiHcrtmEvent),
            0x800000E0 => Some(Self::EvEfiVariableAuthority),
            0x800000E1 => Some(Self::EvEfiSpdmFirmwareBlob),
            0x800000E2 => Some(Self::EvEfiSpdmFirmwareConfig),
            0x800000E3 => Some(Self::EvEfiSpdmDevicePolicy),
            0x800000E4 => Some(Self::EvEfiSpdmDeviceAuthority),
            _ => None,
        }
    }
}

impl fmt::Display for EfiEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::EvEfiEventBase => "EV_EFI_EVENT_BASE",
            Self::EvEfiVariableDriverConfig => "EV_EFI_VARIABLE_DRIVER_CONFIG",
            Self::EvEfiVariableBoot => "EV_EFI_VARIABLE_BOOT",
            Self::EvEfiBootServicesApplication => "EV_EFI_BOOT_SERVICES_APPLICATION",
            Self::EvEfiBootServicesDriver => "EV_EFI_BOOT_SERVICES_DRIVER",
            Self::EvEfiRuntimeServicesDriver => "EV_EFI_RUNTIME_SERVICES_DRIVER",
            Self::EvEfiGptEvent => "EV_EFI_GPT_EVENT",
            Self::EvEfiAction => "EV_EFI_ACTION",
            Self::EvEfiPlatformFirmwareBlob => "EV_EFI_PLATFORM_FIRMWARE_BLOB",
            Self::EvEfiHandoffTables => "EV_EFI_HANDOFF_TABLES",
            Self::EvEfiPlatformFirmwareBlob2 => "EV_EFI_PLATFORM_FIRMWARE_BLOB2",
            Self::EvEfiHandoffTables2 => "EV_EFI_HANDOFF_TABLES2",
            Self::EvEfiVariableBoot2 => "EV_EFI_VARIABLE_BOOT2",
            Self::EvEfiGptEvent2 => "EV_EFI_GPT_EVENT2",
            Self::EvEfiHcrtmEvent => "EV_EFI_HCRTM_EVENT",
            Self::EvEfiVariableAuthority => "EV_EFI_VARIABLE_AUTHORITY",
            Self::EvEfiSpdmFirmwareBlob => "EV_EFI_SPDM_FIRMWARE_BLOB",
            Self::EvEfiSpdmFirmwareConfig => "EV_EFI_SPDM_FIRMWARE_CONFIG",
            Self::EvEfiSpdmDevicePolicy => "EV_EFI_SPDM_DEVICE_POLICY",
            Self::EvEfiSpdmDeviceAuthority => "EV_EFI_SPDM_DEVICE_AUTHORITY",
        };
        f.write_str(name)
    }
}

/// Intel TXT event types, as logged by SINIT/ACM into the TXT event log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum TxtEventType {
    EvTypeBase = 0x400,
    EvTypePcrMapping = 0x401,
    EvTypeHashStart = 0x402,
    EvTypeCombinedHash = 0x403,
    EvTypeMleHash = 0x404,
    EvTypeBiosAcRegData = 0x40A,
    EvTypeCpuScrtmStat = 0x40B,
    EvTypeLcpControlHash = 0x40C,
    EvTypeElementsHash = 0x40D,
    EvTypeStmHash = 0x40E,
    EvTypeOsSinitDataCapHash = 0x40F,
    EvTypeSinitPubKeyHash = 0x410,
    EvTypeLcpHash = 0x411,
    EvTypeLcpDetailsHash = 0x412,
    EvTypeLcpAuthoritiesHash = 0x413,
    EvTypeNvInfoHash = 0x414,
    EvTypeColdBootBiosHash = 0x415,
    EvTypeKmHash = 0x416,
    EvTypeBpmHash = 0x417,
    EvTypeKmInfoHash = 0x418,
    EvTypeBpmInfoHash = 0x419,
    EvTypeBootPolHash = 0x41A,
    EvTypeRandomValue = 0x4FE,
    EvTypeCapValue = 0x4FF,
}

impl TxtEventType {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0x400 => Some(Self::EvTypeBase),
            0x401 => Some(Self::EvTypePcrMapping),
            0x402 => Some(Self::EvTypeHashStart),
            0x403 => Some(Self::EvTypeCombinedHash),
            0x404 => Some(Self::EvTypeMleHash),
            0x40A => Some(Self::EvTypeBiosAcRegData),
            0x40B => Some(Self::EvTypeCpuScrtmStat),
            0x40C => Some(Self::EvTypeLcpControlHash),
            0x40D => Some(Self::EvTypeElementsHash),
            0x40E => Some(Self::EvTypeStmHash),
            0x40F => Some(Self::EvTypeOsSinitDataCapHash),
            0x410 => Some(Self::EvTypeSinitPubKeyHash),
            0x411 => Some(Self::EvTypeLcpHash),
            0x412 => Some(Self::EvTypeLcpDetailsHash),
            0x413 => Some(Self::EvTypeLcpAuthoritiesHash),
            0x414 => Some(Self::EvTypeNvInfoHash),
            0x415 => Some(Self::EvTypeColdBootBiosHash),
            0x416 => Some(Self::EvTypeKmHash),
            0x417 => Some(Self::EvTypeBpmHash),
            0x418 => Some(Self::EvTypeKmInfoHash),
            0x419 => Some(Self::EvTypeBpmInfoHash),
            0x41A => Some(Self::EvTypeBootPolHash),
            0x4FE => Some(Self::EvTypeRandomValue),
            0x4FF => Some(Self::EvTypeCapValue),
            _ => None,
        }
    }
}

impl fmt::Display for TxtEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::EvTypeBase => "EVTYPE_BASE",
            Self::EvTypePcrMapping => "EVTYPE_PCRMAPPING",
            Self::EvTypeHashStart => "EVTYPE_HASH_START",
            Self::EvTypeCombinedHash => "EVTYPE_COMBINED_HASH",
            Self::EvTypeMleHash => "EVTYPE_MLE_HASH",
            Self::EvTypeBiosAcRegData => "EVTYPE_BIOSAC_REG_DATA",
            Self::EvTypeCpuScrtmStat => "EVTYPE_CPU_SCRTM_STAT",
            Self::EvTypeLcpControlHash => "EVTYPE_LCP_CONTROL_HASH",
            Self::EvTypeElementsHash => "EVTYPE_ELEMENTS_HASH",
            Self::EvTypeStmHash => "EVTYPE_STM_HASH",
            Self::EvTypeOsSinitDataCapHash => "EVTYPE_OSSINITDATA_CAP_HASH",
            Self::EvTypeSinitPubKeyHash => "EVTYPE_SINIT_PUBKEY_HASH",
            Self::EvTypeLcpHash => "EVTYPE_LCP_HASH",
            Self::EvTypeLcpDetailsHash => "EVTYPE_LCP_DETAILS_HASH",
            Self::EvTypeLcpAuthoritiesHash => "EVTYPE_LCP_AUTHORITIES_HASH",
            Self::EvTypeNvInfoHash => "EVTYPE_NV_INFO_HASH",
            Self::EvTypeColdBootBiosHash => "EVTYPE_COLD_BOOT_BIOS_HASH",
            Self::EvTypeKmHash => "EVTYPE_KM_HASH",
            Self::EvTypeBpmHash => "EVTYPE_BPM_HASH",
            Self::EvTypeKmInfoHash => "EVTYPE_KM_INFO_HASH",
            Self::EvTypeBpmInfoHash => "EVTYPE_BPM_INFO_HASH",
            Self::EvTypeBootPolHash => "EVTYPE_BOOT_POL_HASH",
            Self::EvTypeRandomValue => "EVTYPE_RANDOM_VALUE",
            Self::EvTypeCapValue => "EVTYPE_CAP_VALUE",
        };
        f.write_str(name)
    }
}

/// Resolve an event type code against the BIOS table, then the EFI table.
/// Unknown codes resolve to an empty string.
pub fn event_type_name(event_type: u32) -> String {
    if let Some(bios) = BiosEventType::from_u32(event_type) {
        return bios.to_string();
    }
    if let Some(efi) = EfiEventType::from_u32(event_type) {
        return efi.to_string();
    }
    String::new()
}

/// Resolve an Intel TXT event type code, empty for unknown codes
pub fn txt_event_type_name(event_type: u32) -> String {
    TxtEventType::from_u32(event_type)
        .map(|t| t.to_string())
        .unwrap_or_default()
}

/// One digest of a measurement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcrDigestValue {
    pub algorithm_id: AlgorithmId,
    pub digest: Vec<u8>,
}

impl PcrDigestValue {
    pub fn new(algorithm_id: AlgorithmId, digest: Vec<u8>) -> Self {
        Self { algorithm_id, digest }
    }

    pub fn hex(&self) -> String {
        hex::encode(&self.digest)
    }
}

/// Single-digest PCR event (TCG_PCR_EVENT)
///
/// The digest is SHA-1 for TCG 1.2 and TXT 1.2 logs; TXT heap logs carry the
/// descriptor's algorithm instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcgPcrEvent {
    pub pcr_index: u32,
    pub event_type: u32,
    pub digest: PcrDigestValue,
    pub event: Vec<u8>,
}

/// Crypto-agile PCR event (TCG_PCR_EVENT2)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcgPcrEvent2 {
    pub pcr_index: u32,
    pub event_type: u32,
    pub digests: Vec<PcrDigestValue>,
    pub event: Vec<u8>,
}

/// A decoded measurement record of either shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeasurementEvent {
    Legacy(TcgPcrEvent),
    Agile(TcgPcrEvent2),
}

/// Algorithm entry of the crypto-agile spec ID event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcgEfiSpecIdEventAlgorithmSize {
    pub algorithm_id: u16,
    pub digest_size: u16,
}

/// Legacy spec ID event ("Spec ID Event00")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcgBiosSpecIdEvent {
    pub signature: String,
    pub platform_class: u32,
    pub spec_version_minor: u8,
    pub spec_version_major: u8,
    pub spec_errata: u8,
    pub uintn_size: u8,
    pub vendor_info_size: u8,
    pub vendor_info: Vec<u8>,
}

/// Crypto-agile spec ID event ("Spec ID Event03")
///
/// `digest_sizes` keeps stream order; every later agile record is expected to carry one
/// digest per entry, in the same order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcgEfiSpecIdEvent {
    pub signature: String,
    pub platform_class: u32,
    pub spec_version_minor: u8,
    pub spec_version_major: u8,
    pub spec_errata: u8,
    pub uintn_size: u8,
    pub number_of_algorithms: u32,
    pub digest_sizes: Vec<TcgEfiSpecIdEventAlgorithmSize>,
    pub vendor_info_size: u32,
    pub vendor_info: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecIdEvent {
    Bios(TcgBiosSpecIdEvent),
    Efi(TcgEfiSpecIdEvent),
}

/// Outcome of probing a buffer for a spec ID event
///
/// `NotThisFormat` is not a failure: the signature simply belongs to another dialect.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecIdMatch<T> {
    Matched(T),
    NotThisFormat,
}

impl<T> SpecIdMatch<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            SpecIdMatch::Matched(value) => Some(value),
            SpecIdMatch::NotThisFormat => None,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, SpecIdMatch::Matched(_))
    }
}

/// Record layout used for every event of a log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    /// TCG_PCR_EVENT with a 20-byte SHA-1 digest
    Sha1,
    /// TCG_PCR_EVENT layout with one digest of the given algorithm (TXT heap logs)
    SingleDigest(AlgorithmId),
    /// TCG_PCR_EVENT2 records; the list comes from the spec ID event
    CryptoAgile(Vec<TcgEfiSpecIdEventAlgorithmSize>),
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Sha1 => write!(f, "TCG 1.2 (sha1)"),
            LogFormat::SingleDigest(alg) => write!(f, "single digest ({})", alg),
            LogFormat::CryptoAgile(algorithms) => write!(f, "crypto agile ({} algorithms)", algorithms.len()),
        }
    }
}
