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

//! Relocation metadata: a record of where a label-dependent value was
//! written, so a downstream linker can patch it if sections are rebased.

/// Which slot shape a relocation applies to: `Lower4`/`Upper4` are the
/// 32-bit immediate field of an I-type instruction (`Upper4` only for
/// `Lui`), `Full` is an 8-byte `.value` data word holding a label's address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelocationKind {
    Lower4,
    Upper4,
    Full,
}

/// `symbol_index` is `-1` when the relocation was created for a `.value`
/// directive: there `offset` carries the evaluated value itself and no
/// particular symbol-table slot is implicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub kind: RelocationKind,
    pub symbol_index: i32,
    pub offset: i64,
    pub section_offset: u64,
}

impl Relocation {
    pub fn for_instruction(kind: RelocationKind, symbol_index: usize, section_offset: u64) -> Self {
        Self { kind, symbol_index: symbol_index as i32, offset: 0, section_offset }
    }

    pub fn for_value_directive(kind: RelocationKind, section_offset: u64) -> Self {
        Self { kind, symbol_index: -1, offset: 0, section_offset }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_relocation_carries_its_symbol_index() {
        let reloc = Relocation::for_instruction(RelocationKind::Upper4, 3, 16);
        assert_eq!(reloc.symbol_index, 3);
        assert_eq!(reloc.offset, 0);
        assert_eq!(reloc.section_offset, 16);
    }

    #[test]
    fn value_directive_relocation_has_no_symbol() {
        let reloc = Relocation::for_value_directive(RelocationKind::Full, 8);
        assert_eq!(reloc.symbol_index, -1);
    }
}
