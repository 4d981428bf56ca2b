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

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum LogCommands {
    /// PC client TCG log, e.g. /sys/kernel/security/tpm0/binary_bios_measurements
    Tcg {
        /// Event log file
        file: PathBuf,
    },

    /// Intel TXT 1.2 event log starting with its container header
    Txt {
        /// Event log file
        file: PathBuf,
    },

    /// Intel TXT heap event log
    TxtHeap {
        /// File holding the 40-byte heap event log descriptor
        descriptor: PathBuf,

        /// Dump of the event log buffer the descriptor points to
        buffer: PathBuf,
    },
}
