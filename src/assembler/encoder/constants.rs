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

// R-type family opcodes: one opcode shared by an operator group, dispatched
// by funct.
pub const OP_RMATH: u16 = 0x001;
pub const OP_RLOGIC: u16 = 0x002;
pub const OP_RCOMP: u16 = 0x003;
pub const OP_REXT: u16 = 0x004;
pub const OP_RJUMP: u16 = 0x005;
pub const OP_RMEM: u16 = 0x006;
pub const OP_PRINT: u16 = 0x007;
pub const OP_IO: u16 = 0x008;

// I-type arithmetic: own opcode per operator.
pub const OP_ADDI: u16 = 0x010;
pub const OP_SUBI: u16 = 0x011;
pub const OP_MULTI: u16 = 0x012;
pub const OP_MULTUI: u16 = 0x013;
pub const OP_SLLI: u16 = 0x014;
pub const OP_SRLI: u16 = 0x015;
pub const OP_SRAI: u16 = 0x016;
pub const OP_MODI: u16 = 0x017;
pub const OP_DIVI: u16 = 0x018;
pub const OP_DIVUI: u16 = 0x019;

// I-type comparison: own opcode per (operator, unsigned) pair.
pub const OP_LTI: u16 = 0x020;
pub const OP_LTIU: u16 = 0x021;
pub const OP_LEQI: u16 = 0x022;
pub const OP_LEQIU: u16 = 0x023;
pub const OP_EQI: u16 = 0x024;
pub const OP_EQIU: u16 = 0x025;

// Single-purpose I/J-type opcodes.
pub const OP_SET: u16 = 0x030;
pub const OP_LI: u16 = 0x031;
pub const OP_LUI: u16 = 0x032;
pub const OP_SI: u16 = 0x033;
pub const OP_CMPI: u16 = 0x034;
pub const OP_J: u16 = 0x035;

// Nullary traps, encoded as I-type with every operand field zeroed.
pub const OP_NOP: u16 = 0x040;
pub const OP_HALT: u16 = 0x041;
pub const OP_RET: u16 = 0x042;
pub const OP_SLEEP: u16 = 0x043;
pub const OP_PAGE: u16 = 0x044;
pub const OP_QUERY: u16 = 0x045;
pub const OP_SVPG: u16 = 0x046;

// OP_RMATH functs.
pub const FUNCT_ADD: u16 = 0;
pub const FUNCT_SUB: u16 = 1;
pub const FUNCT_MULT: u16 = 2;
pub const FUNCT_MULTU: u16 = 3;
pub const FUNCT_SLL: u16 = 4;
pub const FUNCT_SRL: u16 = 5;
pub const FUNCT_SRA: u16 = 6;
pub const FUNCT_MOD: u16 = 7;
pub const FUNCT_DIV: u16 = 8;
pub const FUNCT_DIVU: u16 = 9;

// OP_RLOGIC functs.
pub const FUNCT_OR: u16 = 0;
pub const FUNCT_AND: u16 = 1;
pub const FUNCT_XOR: u16 = 2;
pub const FUNCT_NOR: u16 = 3;
pub const FUNCT_NAND: u16 = 4;
pub const FUNCT_XNOR: u16 = 5;
pub const FUNCT_NOT: u16 = 6;

// OP_RCOMP functs, one per (operator, unsigned) pair.
pub const FUNCT_LT: u16 = 0;
pub const FUNCT_LTU: u16 = 1;
pub const FUNCT_LEQ: u16 = 2;
pub const FUNCT_LEQU: u16 = 3;
pub const FUNCT_EQ: u16 = 4;
pub const FUNCT_EQU: u16 = 5;

// OP_REXT functs.
pub const FUNCT_MULTHI: u16 = 0;
pub const FUNCT_MULTLO: u16 = 1;
pub const FUNCT_SEL: u16 = 2;

// OP_RJUMP functs: whether the jump links the return address into `$rt`.
pub const FUNCT_JUMP_PLAIN: u16 = 0;
pub const FUNCT_JUMP_LINK: u16 = 1;

// OP_PRINT functs.
pub const FUNCT_PRINT_CHAR: u16 = 0;
pub const FUNCT_PRINT_INT: u16 = 1;

/// Widest legal funct value (12 bits).
pub const FUNCT_MAX: u16 = 0xfff;
