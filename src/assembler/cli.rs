// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Command-line interface parsing.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "gekkoforge",
    version = VERSION,
    about = "Assembler for the PowerPC Gekko/Broadway instruction set (GameCube/Wii)"
)]
pub struct Cli {
    #[arg(
        value_name = "FILE",
        long_help = "Input assembly file. Reads standard input when omitted or when FILE is '-'."
    )]
    pub input: Option<PathBuf>,

    #[arg(
        short = 'b',
        long = "base",
        value_name = "ADDR",
        default_value = "0x80003100",
        value_parser = parse_address,
        long_help = "Base virtual address of the first output block. Accepts decimal or 0x-prefixed hex."
    )]
    pub base: u32,

    #[arg(
        long = "format",
        value_enum,
        default_value_t = OutputFormat::Text,
        long_help = "Select output format. text prints address-tagged words; json emits machine-readable blocks."
    )]
    pub format: OutputFormat,

    #[arg(
        long = "no-color",
        action = ArgAction::SetTrue,
        long_help = "Disable ANSI color in diagnostics."
    )]
    pub no_color: bool,
}

fn parse_address(text: &str) -> Result<u32, String> {
    let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else {
        text.parse()
    };
    parsed.map_err(|_| format!("'{text}' is not a valid 32-bit address"))
}
