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

#![allow(dead_code)]

use std::collections::HashMap;

/// Index of `$0`, the hardwired zero register.
pub const ZERO_INDEX: u8 = 0;
/// Index of `$a0`, the first argument register.
pub const ARGUMENT_BASE_INDEX: u8 = 23;
/// How many argument registers (`$a0`..`$af`) exist.
pub const ARGUMENT_REGISTER_COUNT: usize = 16;
/// Index of `$m7`, the assembler's scratch register. Free for the assembler
/// to clobber during pseudo-instruction expansion.
pub const SCRATCH_INDEX: u8 = 109;
/// Index of `$rt`, the return-address register pushed around `call` lowering.
pub const RETURN_ADDR_INDEX: u8 = 4;

/// The canonical 128-entry register file, name and index bound together.
/// Order and indices are load-bearing: `$m7` must land on index 109, `$0` on
/// index 0, and `$a0..$af` must be contiguous starting at `ARGUMENT_BASE_INDEX`.
pub const REGISTER_NAMES: [&str; 128] = [
    "$0", "$g", "$sp", "$fp", "$rt", "$lo", "$hi", "$r0", "$r1", "$r2", "$r3", "$r4", "$r5", "$r6",
    "$r7", "$r8", "$r9", "$ra", "$rb", "$rc", "$rd", "$re", "$rf", "$a0", "$a1", "$a2", "$a3",
    "$a4", "$a5", "$a6", "$a7", "$a8", "$a9", "$aa", "$ab", "$ac", "$ad", "$ae", "$af", "$t0",
    "$t1", "$t2", "$t3", "$t4", "$t5", "$t6", "$t7", "$t8", "$t9", "$ta", "$tb", "$tc", "$td",
    "$te", "$tf", "$t10", "$t11", "$t12", "$t13", "$t14", "$t15", "$t16", "$s0", "$s1", "$s2",
    "$s3", "$s4", "$s5", "$s6", "$s7", "$s8", "$s9", "$sa", "$sb", "$sc", "$sd", "$se", "$sf",
    "$s10", "$s11", "$s12", "$s13", "$s14", "$s15", "$s16", "$k0", "$k1", "$k2", "$k3", "$k4",
    "$k5", "$k6", "$k7", "$k8", "$k9", "$ka", "$kb", "$kc", "$kd", "$ke", "$kf", "$st", "$m0",
    "$m1", "$m2", "$m3", "$m4", "$m5", "$m6", "$m7", "$m8", "$m9", "$ma", "$mb", "$mc", "$md",
    "$me", "$mf", "$f0", "$f1", "$f2", "$f3", "$e0", "$e1", "$e2", "$e3", "$e4", "$e5",
];

/// Bidirectional name <-> index mapping over the architectural register file.
#[derive(Debug)]
pub struct RegisterTable {
    by_name: HashMap<&'static str, u8>,
}

impl RegisterTable {
    pub fn new() -> Self {
        let mut by_name = HashMap::with_capacity(REGISTER_NAMES.len());
        for (index, name) in REGISTER_NAMES.iter().enumerate() {
            by_name.insert(*name, index as u8);
        }
        Self { by_name }
    }

    pub fn index_of(&self, name: &str) -> Option<u8> {
        self.by_name.get(name).copied()
    }

    pub fn name_of(&self, index: u8) -> Option<&'static str> {
        REGISTER_NAMES.get(index as usize).copied()
    }

    pub fn contains(&self, index: u8) -> bool {
        (index as usize) < REGISTER_NAMES.len()
    }
}

impl Default for RegisterTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_register_is_index_zero() {
        let table = RegisterTable::new();
        assert_eq!(table.index_of("$0"), Some(0));
    }

    #[test]
    fn scratch_register_is_index_109() {
        let table = RegisterTable::new();
        assert_eq!(table.index_of("$m7"), Some(SCRATCH_INDEX));
        assert_eq!(table.name_of(SCRATCH_INDEX), Some("$m7"));
    }

    #[test]
    fn argument_registers_are_contiguous() {
        let table = RegisterTable::new();
        for i in 0..ARGUMENT_REGISTER_COUNT as u8 {
            let name = table.name_of(ARGUMENT_BASE_INDEX + i).unwrap();
            assert_eq!(table.index_of(name), Some(ARGUMENT_BASE_INDEX + i));
        }
    }

    #[test]
    fn table_has_exactly_128_entries() {
        assert_eq!(REGISTER_NAMES.len(), 128);
    }

    #[test]
    fn unknown_name_is_none() {
        let table = RegisterTable::new();
        assert_eq!(table.index_of("$bogus"), None);
    }
}
