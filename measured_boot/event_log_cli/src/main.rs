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

mod commands;

use clap::Parser;
use commands::LogCommands;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tpm_event_log::{
    ByteParseable, ByteReader, DecoderConfig, EventLog, EventLogDecoder, EventLogError, TxtHeapEventLogDescr,
};

#[derive(Parser)]
#[clap(author, version, about = "Decode measured boot event logs", long_about = None)]
struct Cli {
    /// Print the log as JSON instead of text blocks
    #[clap(long)]
    json: bool,

    /// YAML file with decoder limits
    #[clap(short, long)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: LogCommands,
}

fn open_reader(path: &Path) -> Result<ByteReader<File>, EventLogError> {
    let file = File::open(path)?;
    ByteReader::new(file)
}

fn decode(command: &LogCommands, decoder: &EventLogDecoder) -> Result<EventLog, EventLogError> {
    match command {
        LogCommands::Tcg { file } => decoder.decode_tcg_log(&mut open_reader(file)?),
        LogCommands::Txt { file } => decoder.decode_txt12_log(&mut open_reader(file)?),
        LogCommands::TxtHeap { descriptor, buffer } => {
            let descr = TxtHeapEventLogDescr::parse_from(&mut open_reader(descriptor)?)?;
            decoder.decode_txt_heap_log(&descr, &mut open_reader(buffer)?)
        },
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match DecoderConfig::from_yaml(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("error: {}", e);
                return ExitCode::FAILURE;
            },
        },
        None => DecoderConfig::default(),
    };
    let decoder = EventLogDecoder::new(config);

    let event_log = match decode(&cli.command, &decoder) {
        Ok(event_log) => event_log,
        Err(e) => {
            log::error!("Failed to decode event log: {}", e);
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        },
    };
    log::info!("Decoded {} events ({})", event_log.len(), event_log.format);

    if cli.json {
        match serde_json::to_string_pretty(&event_log.to_json_value()) {
            Ok(output) => println!("{}", output),
            Err(e) => {
                eprintln!("error: {}", e);
                return ExitCode::FAILURE;
            },
        }
    } else {
        println!("{}", event_log);
    }
    ExitCode::SUCCESS
}
