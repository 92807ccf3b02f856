// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// CLI entrypoint for gekkoforge.

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::Path;
use std::process;

use clap::Parser;
use serde_json::json;

use gekkoforge::assembler::cli::{Cli, OutputFormat};
use gekkoforge::core::report::render_error;
use gekkoforge::{assemble, Block};

fn read_input(cli: &Cli) -> io::Result<String> {
    match cli.input.as_deref() {
        Some(path) if path != Path::new("-") => fs::read_to_string(path),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn print_text(blocks: &[Block]) {
    for block in blocks {
        println!("{:08x}:", block.address);
        for (i, word) in block.bytes.chunks(4).enumerate() {
            if i != 0 && i % 4 == 0 {
                println!();
            }
            let hex: String = word.iter().map(|b| format!("{b:02x}")).collect();
            print!("  {hex}");
        }
        if !block.bytes.is_empty() {
            println!();
        }
    }
}

fn print_json(blocks: &[Block]) {
    let payload = json!({
        "blocks": blocks
            .iter()
            .map(|block| {
                let hex: String = block.bytes.iter().map(|b| format!("{b:02x}")).collect();
                json!({ "address": block.address, "bytes": hex })
            })
            .collect::<Vec<_>>(),
    });
    println!("{payload}");
}

fn main() {
    let cli = Cli::parse();

    let source = match read_input(&cli) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: failed to read input: {err}");
            process::exit(2);
        }
    };

    let use_color = !cli.no_color && io::stderr().is_terminal();

    match assemble(&source, cli.base) {
        Ok(blocks) => match cli.format {
            OutputFormat::Text => print_text(&blocks),
            OutputFormat::Json => print_json(&blocks),
        },
        Err(err) => {
            match cli.format {
                OutputFormat::Json => {
                    let payload = json!({
                        "error": {
                            "message": err.message,
                            "line": err.line,
                            "col": err.col,
                            "len": err.len,
                            "source_line": err.source_line.trim_end_matches('\n'),
                        }
                    });
                    println!("{payload}");
                }
                OutputFormat::Text => eprintln!("{}", render_error(&err, use_color)),
            }
            process::exit(1);
        }
    }
}
