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

//! A two-pass assembler core for the Why instruction set: takes a parsed
//! [`ast::Program`] and produces the final object bytes (the
//! `meta || code || data || symbols || debug` layout) plus any symbols that
//! were referenced but never defined.
//!
//! This crate does not parse assembly text itself — callers hand it an
//! already-constructed [`ast::Program`], typically deserialized from JSON
//! (see `wasmc`'s `--input` flag in `main.rs`).

pub mod assembler;
pub mod ast;
pub mod errors;
pub mod hexdump;
pub mod interner;
pub mod registers;
pub mod util;

use anyhow::{Context, Result};

pub use assembler::AssembleOutput;

/// Runs the full assembler pipeline over `program` and returns the
/// assembled bytes along with the names of symbols that were referenced
/// but never defined.
pub fn assemble(program: &ast::Program) -> Result<AssembleOutput> {
    assembler::assemble(program).context("failed to assemble program")
}
