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

//! Bit-exact encoding of primitive instruction nodes into 64-bit words.
//! By the time a node reaches [`encode_instruction`] every
//! label immediate has already been substituted by the driver's label
//! expansion pass; pseudo-instructions never reach here,
//! they're lowered away first (see [`crate::assembler::expansion`]).

pub mod constants;
pub mod utility_functions;

use constants::*;
use utility_functions::*;

use crate::ast::{
    Condition, ICompOp, IMathOp, Immediate, InstructionNode, MemOp, MemSize, NullaryOp, PrintKind,
    RCompOp, RExtOp, RLogicOp, RMathOp,
};
use crate::errors::AssemblyError;
use crate::registers::RegisterTable;

fn immediate_value(imm: &Immediate) -> Result<u32, AssemblyError> {
    match imm {
        Immediate::Number(n) => Ok(*n as u32),
        Immediate::Char(c) => Ok(*c as u32),
        Immediate::Label(name) => Err(AssemblyError::encoding(format!(
            "label `{}` was not resolved before encoding",
            name
        ))),
    }
}

fn rmath_funct(op: RMathOp) -> u16 {
    match op {
        RMathOp::Add => FUNCT_ADD,
        RMathOp::Sub => FUNCT_SUB,
        RMathOp::Mult => FUNCT_MULT,
        RMathOp::MultU => FUNCT_MULTU,
        RMathOp::Sll => FUNCT_SLL,
        RMathOp::Srl => FUNCT_SRL,
        RMathOp::Sra => FUNCT_SRA,
        RMathOp::Mod => FUNCT_MOD,
        RMathOp::Div => FUNCT_DIV,
        RMathOp::DivU => FUNCT_DIVU,
    }
}

fn rlogic_funct(op: RLogicOp) -> u16 {
    match op {
        RLogicOp::Or => FUNCT_OR,
        RLogicOp::And => FUNCT_AND,
        RLogicOp::Xor => FUNCT_XOR,
        RLogicOp::Nor => FUNCT_NOR,
        RLogicOp::Nand => FUNCT_NAND,
        RLogicOp::Xnor => FUNCT_XNOR,
        RLogicOp::Not => FUNCT_NOT,
    }
}

fn rcomp_funct(op: RCompOp, unsigned: bool) -> u16 {
    match (op, unsigned) {
        (RCompOp::Lt, false) => FUNCT_LT,
        (RCompOp::Lt, true) => FUNCT_LTU,
        (RCompOp::Leq, false) => FUNCT_LEQ,
        (RCompOp::Leq, true) => FUNCT_LEQU,
        (RCompOp::Eq, false) => FUNCT_EQ,
        (RCompOp::Eq, true) => FUNCT_EQU,
    }
}

fn rext_funct(op: RExtOp) -> u16 {
    match op {
        RExtOp::MultHi => FUNCT_MULTHI,
        RExtOp::MultLo => FUNCT_MULTLO,
        RExtOp::Sel => FUNCT_SEL,
    }
}

fn imath_opcode(op: IMathOp) -> u16 {
    match op {
        IMathOp::Add => OP_ADDI,
        IMathOp::Sub => OP_SUBI,
        IMathOp::Mult => OP_MULTI,
        IMathOp::MultU => OP_MULTUI,
        IMathOp::Sll => OP_SLLI,
        IMathOp::Srl => OP_SRLI,
        IMathOp::Sra => OP_SRAI,
        IMathOp::Mod => OP_MODI,
        IMathOp::Div => OP_DIVI,
        IMathOp::DivU => OP_DIVUI,
    }
}

fn icomp_opcode(op: ICompOp, unsigned: bool) -> u16 {
    match (op, unsigned) {
        (ICompOp::Lt, false) => OP_LTI,
        (ICompOp::Lt, true) => OP_LTIU,
        (ICompOp::Leq, false) => OP_LEQI,
        (ICompOp::Leq, true) => OP_LEQIU,
        (ICompOp::Eq, false) => OP_EQI,
        (ICompOp::Eq, true) => OP_EQIU,
    }
}

/// `op * 3 + size`: a 3x3 grid of (load/store/copy) x (byte/half/word),
/// folded into the 12-bit funct field the same way the other R-type families
/// fold their operator onto it.
fn rmem_funct(op: MemOp, size: MemSize) -> u16 {
    let op_index = match op {
        MemOp::Load => 0,
        MemOp::Store => 1,
        MemOp::Copy => 2,
    };
    let size_index = match size {
        MemSize::Byte => 0,
        MemSize::Half => 1,
        MemSize::Word => 2,
    };
    op_index * 3 + size_index
}

fn nullary_opcode(op: NullaryOp) -> u16 {
    match op {
        NullaryOp::Nop => OP_NOP,
        NullaryOp::Halt => OP_HALT,
        NullaryOp::Ret => OP_RET,
        NullaryOp::Sleep => OP_SLEEP,
        NullaryOp::Page => OP_PAGE,
        NullaryOp::Query => OP_QUERY,
        NullaryOp::Svpg => OP_SVPG,
    }
}

/// Encodes one already-expanded, already-resolved instruction node into its
/// 64-bit word. Registers are looked up by name against `registers`; any
/// name not in the 128-entry table is a fatal [`AssemblyError::Encoding`].
pub fn encode_instruction(
    node: &InstructionNode,
    registers: &RegisterTable,
) -> Result<u64, AssemblyError> {
    let flags = node.header().flags.bits();

    match node {
        InstructionNode::RMath { rs, rt, rd, op, condition, .. } => {
            let rs = lookup_register(registers, rs)?;
            let rt = lookup_register(registers, rt)?;
            let rd = lookup_register(registers, rd)?;
            let cond = cond_bits_r(*condition)?;
            let funct = validate_funct(rmath_funct(*op))?;
            Ok(pack_r(OP_RMATH, rt, rs, rd, cond, flags, funct))
        }
        InstructionNode::RLogic { rs, rt, rd, op, condition, .. } => {
            let rs = lookup_register(registers, rs)?;
            let rt = lookup_register(registers, rt)?;
            let rd = lookup_register(registers, rd)?;
            let cond = cond_bits_r(*condition)?;
            let funct = validate_funct(rlogic_funct(*op))?;
            Ok(pack_r(OP_RLOGIC, rt, rs, rd, cond, flags, funct))
        }
        InstructionNode::RComp { rs, rt, rd, op, unsigned, condition, .. } => {
            let rs = lookup_register(registers, rs)?;
            let rt = lookup_register(registers, rt)?;
            let rd = lookup_register(registers, rd)?;
            let cond = cond_bits_r(*condition)?;
            let funct = validate_funct(rcomp_funct(*op, *unsigned))?;
            Ok(pack_r(OP_RCOMP, rt, rs, rd, cond, flags, funct))
        }
        InstructionNode::RExt { rs, rt, rd, op, condition, .. } => {
            let rs = lookup_register(registers, rs)?;
            let rt = lookup_register(registers, rt)?;
            let rd = lookup_register(registers, rd)?;
            let cond = cond_bits_r(*condition)?;
            let funct = validate_funct(rext_funct(*op))?;
            Ok(pack_r(OP_REXT, rt, rs, rd, cond, flags, funct))
        }
        InstructionNode::RJump { rs, rd, link, condition, .. } => {
            let rs = lookup_register(registers, rs)?;
            let rd = lookup_register(registers, rd)?;
            let cond = cond_bits_r(*condition)?;
            let funct = if *link { FUNCT_JUMP_LINK } else { FUNCT_JUMP_PLAIN };
            Ok(pack_r(OP_RJUMP, 0, rs, rd, cond, flags, funct))
        }
        InstructionNode::IMath { rs, rd, op, imm, condition, .. } => {
            let rs = lookup_register(registers, rs)?;
            let rd = lookup_register(registers, rd)?;
            let cond = cond_bits_wide(*condition);
            let immediate = immediate_value(imm)?;
            Ok(pack_i(imath_opcode(*op), rs, rd, flags, cond, immediate))
        }
        InstructionNode::IComp { rs, rd, op, imm, unsigned, condition, .. } => {
            let rs = lookup_register(registers, rs)?;
            let rd = lookup_register(registers, rd)?;
            let cond = cond_bits_wide(*condition);
            let immediate = immediate_value(imm)?;
            Ok(pack_i(icomp_opcode(*op, *unsigned), rs, rd, flags, cond, immediate))
        }
        InstructionNode::Set { rd, imm, .. } => {
            let rd = lookup_register(registers, rd)?;
            let immediate = immediate_value(imm)?;
            Ok(pack_i(OP_SET, 0, rd, flags, 0, immediate))
        }
        InstructionNode::Li { rd, imm, .. } => {
            let rd = lookup_register(registers, rd)?;
            let immediate = immediate_value(imm)?;
            Ok(pack_i(OP_LI, 0, rd, flags, 0, immediate))
        }
        InstructionNode::Lui { rd, imm, .. } => {
            let rd = lookup_register(registers, rd)?;
            let immediate = immediate_value(imm)?;
            Ok(pack_i(OP_LUI, 0, rd, flags, 0, immediate))
        }
        InstructionNode::Si { rs, imm, .. } => {
            let rs = lookup_register(registers, rs)?;
            let immediate = immediate_value(imm)?;
            Ok(pack_i(OP_SI, rs, 0, flags, 0, immediate))
        }
        InstructionNode::Cmpi { rs, imm, condition, .. } => {
            let rs = lookup_register(registers, rs)?;
            let cond = cond_bits_wide(*condition);
            let immediate = immediate_value(imm)?;
            Ok(pack_i(OP_CMPI, rs, 0, flags, cond, immediate))
        }
        InstructionNode::J { addr, rs, link, condition, .. } => {
            let rs = match rs {
                Some(name) => lookup_register(registers, name)?,
                None => 0,
            };
            let cond = cond_bits_wide(*condition);
            let address = immediate_value(addr)?;
            Ok(pack_j(OP_J, rs, *link, cond as u16, flags, address))
        }
        InstructionNode::Memory { rs, rd, size, op, .. } => {
            let rs = lookup_register(registers, rs)?;
            let rd = lookup_register(registers, rd)?;
            let funct = validate_funct(rmem_funct(*op, *size))?;
            Ok(pack_r(OP_RMEM, 0, rs, rd, 0, flags, funct))
        }
        InstructionNode::Print { rs, kind, .. } => {
            let rs = lookup_register(registers, rs)?;
            let funct = match kind {
                PrintKind::Char => FUNCT_PRINT_CHAR,
                PrintKind::Int => FUNCT_PRINT_INT,
            };
            Ok(pack_r(OP_PRINT, 0, rs, 0, 0, flags, funct))
        }
        InstructionNode::Io { ident, .. } => {
            if ident.is_some() {
                return Err(AssemblyError::structural(
                    "Io node with a pending ident reached the encoder unexpanded",
                ));
            }
            Ok(pack_r(OP_IO, 0, 0, 0, 0, flags, 0))
        }
        InstructionNode::Nullary { op, .. } => Ok(pack_i(nullary_opcode(*op), 0, 0, flags, 0, 0)),

        InstructionNode::Mv { .. }
        | InstructionNode::PseudoPrint { .. }
        | InstructionNode::StringPrint { .. }
        | InstructionNode::Jeq { .. }
        | InstructionNode::Call { .. } => Err(AssemblyError::structural(
            "pseudo-instruction reached the encoder unexpanded",
        )),
    }
}
