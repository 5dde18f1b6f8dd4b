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

//! Serializes the debug section: declared Filename/Function
//! records, followed by Location records synthesized from the "bang"
//! back-references carried on the final, expanded instruction stream.

use crate::ast::{DebugRecord, InstructionNode};
use crate::errors::AssemblyError;

const MAX_RUN: u32 = 255;
const MAX_U24: u32 = 0xff_ffff;

fn append_length_prefixed(out: &mut Vec<u8>, tag: u8, text: &str) -> Result<(), AssemblyError> {
    let bytes = text.as_bytes();
    if bytes.len() as u32 > MAX_U24 {
        return Err(AssemblyError::debug(format!(
            "debug string of {} bytes exceeds the 24-bit length field",
            bytes.len()
        )));
    }
    let len = bytes.len() as u32;
    out.push(tag);
    out.push(((len >> 16) & 0xff) as u8);
    out.push(((len >> 8) & 0xff) as u8);
    out.push((len & 0xff) as u8);
    out.extend_from_slice(bytes);
    while out.len() % 8 != 0 {
        out.push(0);
    }
    Ok(())
}

fn append_location(
    out: &mut Vec<u8>,
    file_index: u32,
    line: u32,
    column: u32,
    count: u8,
    func_index: u32,
    address: u64,
) -> Result<(), AssemblyError> {
    if file_index > MAX_U24 {
        return Err(AssemblyError::debug("location file index exceeds the 24-bit field"));
    }
    if column > MAX_U24 {
        return Err(AssemblyError::debug("location column exceeds the 24-bit field"));
    }
    out.push(3);
    out.push(((file_index >> 16) & 0xff) as u8);
    out.push(((file_index >> 8) & 0xff) as u8);
    out.push((file_index & 0xff) as u8);
    out.extend_from_slice(&line.to_be_bytes());
    out.push(((column >> 16) & 0xff) as u8);
    out.push(((column >> 8) & 0xff) as u8);
    out.push((column & 0xff) as u8);
    out.push(count);
    out.extend_from_slice(&func_index.to_be_bytes());
    out.extend_from_slice(&address.to_be_bytes());
    Ok(())
}

/// `instructions` is the fully expanded, address-assigned instruction
/// stream in program order: `(absolute_address, node)`.
pub fn encode(
    declared: &[DebugRecord],
    instructions: &[(u64, InstructionNode)],
) -> Result<Vec<u8>, AssemblyError> {
    let mut out = Vec::new();

    for record in declared {
        match record {
            DebugRecord::Filename(text) => append_length_prefixed(&mut out, 1, text)?,
            DebugRecord::Function(text) => append_length_prefixed(&mut out, 2, text)?,
            DebugRecord::Location { .. } => {}
        }
    }

    let mut i = 0;
    while i < instructions.len() {
        let bang = match instructions[i].1.header().bang {
            Some(bang) => bang,
            None => {
                i += 1;
                continue;
            }
        };

        let (file_index, line, column, func_index) = match declared.get(bang as usize) {
            Some(DebugRecord::Location { file_index, line, column, func_index }) => {
                (*file_index, *line, *column, *func_index)
            }
            _ => {
                return Err(AssemblyError::debug(format!(
                    "bang {} does not reference a Location debug record",
                    bang
                )))
            }
        };

        let address = instructions[i].0;
        let mut count: u32 = 0;
        loop {
            count += 1;
            i += 1;
            if count > MAX_RUN {
                return Err(AssemblyError::debug(format!(
                    "{} consecutive instructions share bang {}, more than the 255 a Location run allows",
                    count, bang
                )));
            }
            if i >= instructions.len() || instructions[i].1.header().bang != Some(bang) {
                break;
            }
        }

        append_location(&mut out, file_index, line, column, count as u8, func_index, address)?;
    }

    Ok(out)
}
