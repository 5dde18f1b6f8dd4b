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

//! Field validation and bit-packing for the three 64-bit instruction shapes.
//! The shifts here are load-bearing and must not drift from the encoding's
//! field layout.

use crate::ast::Condition;
use crate::errors::AssemblyError;
use crate::registers::RegisterTable;

use super::constants::FUNCT_MAX;

pub fn lookup_register(table: &RegisterTable, name: &str) -> Result<u8, AssemblyError> {
    table
        .index_of(name)
        .ok_or_else(|| AssemblyError::encoding(format!("unknown register `{}`", name)))
}

pub fn validate_funct(funct: u16) -> Result<u16, AssemblyError> {
    if funct > FUNCT_MAX {
        return Err(AssemblyError::encoding(format!(
            "funct {:#x} exceeds the 12-bit field width",
            funct
        )));
    }
    Ok(funct)
}

/// R-type's `cond` field is only 2 bits wide; `Condition::Negative` doesn't
/// fit and is rejected rather than silently truncated.
pub fn cond_bits_r(condition: Condition) -> Result<u8, AssemblyError> {
    let bits = condition.bits();
    if bits > 0b11 {
        return Err(AssemblyError::encoding(format!(
            "condition {:?} does not fit in the 2-bit R-type field",
            condition
        )));
    }
    Ok(bits)
}

/// I/J-type's `cond` field is 4 bits wide; every `Condition` variant fits.
pub fn cond_bits_wide(condition: Condition) -> u8 {
    condition.bits()
}

/// Packs the R-type shape: `opcode[12] | rt[7] | rs[7] | rd[7] | cond[2] |
/// flags[2] | funct[12]`.
pub fn pack_r(opcode: u16, rt: u8, rs: u8, rd: u8, cond: u8, flags: u8, funct: u16) -> u64 {
    (funct as u64)
        | ((flags as u64) << 12)
        | ((cond as u64) << 14)
        | ((rd as u64) << 31)
        | ((rs as u64) << 38)
        | ((rt as u64) << 45)
        | ((opcode as u64) << 52)
}

/// Packs the I-type shape: `opcode[12] | cond[4] | flags[2] | rs[7] | rd[7] |
/// immediate[32]`.
pub fn pack_i(opcode: u16, rs: u8, rd: u8, flags: u8, cond: u8, immediate: u32) -> u64 {
    (immediate as u64)
        | ((rd as u64) << 32)
        | ((rs as u64) << 39)
        | ((flags as u64) << 46)
        | ((cond as u64) << 48)
        | ((opcode as u64) << 52)
}

/// Packs the J-type shape: `opcode[12] | rs[7] | link[1] | reserved | cond[10]
/// | flags[2] | address[32]`. `cond` is `u16` to hold the field's full 10-bit
/// width (unlike R/I-type's 2- and 4-bit `cond`, which fit in `u8`).
pub fn pack_j(opcode: u16, rs: u8, link: bool, cond: u16, flags: u8, address: u32) -> u64 {
    (address as u64)
        | ((flags as u64) << 32)
        | ((cond as u64) << 34)
        | ((if link { 1 } else { 0 }) << 44)
        | ((rs as u64) << 45)
        | ((opcode as u64) << 52)
}

/// Unpacks an R-type word into `(opcode, rt, rs, rd, cond, flags, funct)`.
/// Exists for the round-trip test property; the encoder itself never needs
/// to decode its own output.
#[cfg(test)]
pub fn unpack_r(word: u64) -> (u16, u8, u8, u8, u8, u8, u16) {
    let funct = (word & 0xfff) as u16;
    let flags = ((word >> 12) & 0x3) as u8;
    let cond = ((word >> 14) & 0x3) as u8;
    let rd = ((word >> 31) & 0x7f) as u8;
    let rs = ((word >> 38) & 0x7f) as u8;
    let rt = ((word >> 45) & 0x7f) as u8;
    let opcode = ((word >> 52) & 0xfff) as u16;
    (opcode, rt, rs, rd, cond, flags, funct)
}

#[cfg(test)]
pub fn unpack_i(word: u64) -> (u16, u8, u8, u8, u8, u32) {
    let immediate = (word & 0xffff_ffff) as u32;
    let rd = ((word >> 32) & 0x7f) as u8;
    let rs = ((word >> 39) & 0x7f) as u8;
    let flags = ((word >> 46) & 0x3) as u8;
    let cond = ((word >> 48) & 0xf) as u8;
    let opcode = ((word >> 52) & 0xfff) as u16;
    (opcode, rs, rd, flags, cond, immediate)
}

#[cfg(test)]
pub fn unpack_j(word: u64) -> (u16, u8, bool, u16, u8, u32) {
    let address = (word & 0xffff_ffff) as u32;
    let flags = ((word >> 32) & 0x3) as u8;
    let cond = ((word >> 34) & 0x3ff) as u16;
    let link = ((word >> 44) & 0x1) != 0;
    let rs = ((word >> 45) & 0x7f) as u8;
    let opcode = ((word >> 52) & 0xfff) as u16;
    (opcode, rs, link, cond, flags, address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn r_type_round_trips() {
        let word = pack_r(0x123, 5, 6, 7, 0b10, 0b01, 0xabc);
        assert_eq!(unpack_r(word), (0x123, 5, 6, 7, 0b10, 0b01, 0xabc));
    }

    #[test]
    fn i_type_round_trips() {
        let word = pack_i(0x456, 9, 10, 0b11, 0b1010, 0xdeadbeef);
        assert_eq!(unpack_i(word), (0x456, 9, 10, 0b11, 0b1010, 0xdeadbeef));
    }

    #[test]
    fn j_type_round_trips() {
        let word = pack_j(0x789, 42, true, 0b0101010101, 0b10, 0x1234_5678);
        assert_eq!(unpack_j(word), (0x789, 42, true, 0b0101010101, 0b10, 0x1234_5678));
    }

    #[test]
    fn negative_condition_rejected_in_r_type() {
        assert!(cond_bits_r(Condition::Negative).is_err());
    }

    #[test]
    fn funct_over_max_rejected() {
        assert!(validate_funct(FUNCT_MAX + 1).is_err());
        assert!(validate_funct(FUNCT_MAX).is_ok());
    }
}
