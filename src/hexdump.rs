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

//! The `--hex` debug view of an assembled object: eight bytes per line,
//! each byte as two lowercase hex digits, no separators.

use std::fmt::Write as _;

/// Formats `bytes` as lowercase hex, eight bytes (16 hex chars) per line.
/// A final partial line (fewer than eight bytes) is still newline-terminated.
pub fn format(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2 + bytes.len() / 8 + 1);
    for chunk in bytes.chunks(8) {
        for byte in chunk {
            let _ = write!(out, "{:02x}", byte);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_produces_empty_output() {
        assert_eq!(format(&[]), "");
    }

    #[test]
    fn full_line_has_no_separators_and_one_newline() {
        let bytes = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        assert_eq!(format(&bytes), "0102030405060708\n");
    }

    #[test]
    fn partial_final_line_is_still_newline_terminated() {
        let bytes = [0xff, 0x00];
        assert_eq!(format(&bytes), "ff00\n");
    }

    #[test]
    fn multiple_lines_wrap_every_eight_bytes() {
        let bytes = [0u8; 9];
        assert_eq!(format(&bytes), "0000000000000000\n00\n");
    }
}
