/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use wasmc::ast::Program;

/// Assembles a Why-ISA program, given as a JSON-encoded AST, into its
/// object-file bytes.
#[derive(Parser, Debug)]
#[command(name = "wasmc", version, about)]
struct Opts {
    /// Path to the JSON-encoded program to assemble.
    #[arg(short, long)]
    input: PathBuf,

    /// Path to write the assembled object to.
    #[arg(short, long)]
    output: PathBuf,

    /// Also print a hex dump of the assembled object to stdout.
    #[arg(long)]
    hex: bool,
}

fn main() -> Result<()> {
    let opts = Opts::parse();

    let source = fs::read_to_string(&opts.input)
        .with_context(|| format!("failed to read `{}`", opts.input.display()))?;
    let program: Program = serde_json::from_str(&source)
        .with_context(|| format!("failed to parse `{}` as a program", opts.input.display()))?;

    let result = wasmc::assemble(&program)?;

    fs::write(&opts.output, &result.rom)
        .with_context(|| format!("failed to write `{}`", opts.output.display()))?;

    if opts.hex {
        print!("{}", wasmc::hexdump::format(&result.rom));
    }

    for symbol in &result.unknown_symbols {
        eprintln!("warning: symbol `{}` is referenced but never defined", symbol);
    }

    Ok(())
}
