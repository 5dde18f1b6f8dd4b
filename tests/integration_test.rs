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

//! End-to-end coverage of representative assembly scenarios, built as
//! `Program` values directly (there is no text-format parser in this
//! crate's scope, so there is nothing to feed through a lexer here).

use wasmc::ast::{
    Arg, Condition, Directive, Expr, Immediate, InstructionNode, MetaSection, NodeHeader, Program,
    RegOrImm, RLogicOp, SectionKind, TextItem,
};
use wasmc::registers::RegisterTable;

fn meta() -> MetaSection {
    MetaSection {
        name: "demo".to_string(),
        version: "0.1".to_string(),
        author: "tester".to_string(),
        orcid: "0000-0001-2345-6789".to_string(),
    }
}

fn program(text: Vec<TextItem>) -> Program {
    Program { meta: meta(), include: Vec::new(), text, debug: Vec::new() }
}

#[test]
fn orcid_with_dashes_normalizes_to_sixteen_digits() {
    let output = wasmc::assemble(&program(Vec::new())).unwrap();
    // meta offsets (40) + 16-byte orcid + "demo\0" (5) + "0.1\0" (4) +
    // "tester\0" (7) = 40 + 16 + 16 = 72, padded to 8 already.
    let offset_symbols = u64::from_le_bytes(output.rom[0..8].try_into().unwrap());
    assert_eq!(offset_symbols, 72);
}

#[test]
fn mv_expansion_emits_a_single_or_instruction() {
    let node = InstructionNode::Mv {
        header: NodeHeader { labels: vec!["entry".to_string()], ..NodeHeader::default() },
        rs: "$t0".to_string(),
        rd: "$t1".to_string(),
    };
    let out = wasmc::assemble(&program(vec![TextItem::Section(SectionKind::Code), TextItem::Instruction(node)]))
        .unwrap();
    let offset_code = u64::from_le_bytes(out.rom[8..16].try_into().unwrap());
    let offset_data = u64::from_le_bytes(out.rom[16..24].try_into().unwrap());
    assert_eq!(offset_data - offset_code, 8);

    let word = u64::from_le_bytes(out.rom[offset_code as usize..offset_code as usize + 8].try_into().unwrap());
    let registers = RegisterTable::new();
    assert_eq!((word >> 52) & 0xfff, wasmc::assembler::encoder::constants::OP_RLOGIC as u64);
    assert_eq!(word & 0xfff, wasmc::assembler::encoder::constants::FUNCT_OR as u64);
    assert_eq!((word >> 38) & 0x7f, registers.index_of("$t0").unwrap() as u64);
    assert_eq!((word >> 45) & 0x7f, registers.index_of("$0").unwrap() as u64);
    assert_eq!((word >> 31) & 0x7f, registers.index_of("$t1").unwrap() as u64);
}

#[test]
fn call_in_a_subroutine_lowers_to_nine_instructions() {
    let call = InstructionNode::Call {
        header: NodeHeader { labels: vec!["entry".to_string()], in_subroutine: true, ..NodeHeader::default() },
        function: Immediate::Label("foo".to_string()),
        args: vec![Arg::Number(42), Arg::Register("$t0".to_string())],
    };
    let target = InstructionNode::RLogic {
        header: NodeHeader { labels: vec!["foo".to_string()], ..NodeHeader::default() },
        rs: "$0".to_string(),
        rt: "$0".to_string(),
        rd: "$0".to_string(),
        op: RLogicOp::Or,
        condition: Condition::None,
    };
    let out = wasmc::assemble(&program(vec![
        TextItem::Section(SectionKind::Code),
        TextItem::Instruction(call),
        TextItem::Instruction(target),
    ]))
    .unwrap();
    let offset_code = u64::from_le_bytes(out.rom[8..16].try_into().unwrap());
    let offset_data = u64::from_le_bytes(out.rom[16..24].try_into().unwrap());
    assert_eq!((offset_data - offset_code) / 8, 10);
    assert!(out.unknown_symbols.is_empty());
}

#[test]
fn value_directive_referencing_an_undefined_label_patches_zero() {
    let program = program(vec![
        TextItem::Section(SectionKind::Data),
        TextItem::Label("ptr".to_string()),
        TextItem::Directive(Directive::Value { expr: Expr::Label("nowhere".to_string()), width: 8 }),
    ]);
    // `nowhere` is never defined, but `findAllLabels` still gives it a
    // skeleton symbol-table entry (address 0), so evaluating the `.value`
    // expression against the finished table succeeds rather than erroring.
    let out = wasmc::assemble(&program).unwrap();
    let offset_data = u64::from_le_bytes(out.rom[16..24].try_into().unwrap());
    let value = u64::from_le_bytes(out.rom[offset_data as usize..offset_data as usize + 8].try_into().unwrap());
    assert_eq!(value, 0);
}

#[test]
fn jeq_with_immediate_sides_resolves_forward_label() {
    let jeq = InstructionNode::Jeq {
        header: NodeHeader::default(),
        addr: RegOrImm::Immediate(Immediate::Label("target".to_string())),
        rs: "$t0".to_string(),
        rt: RegOrImm::Immediate(Immediate::Number(0)),
        link: false,
    };
    let marker = InstructionNode::RLogic {
        header: NodeHeader { labels: vec!["target".to_string()], ..NodeHeader::default() },
        rs: "$0".to_string(),
        rt: "$0".to_string(),
        rd: "$0".to_string(),
        op: RLogicOp::Or,
        condition: Condition::None,
    };
    let out = wasmc::assemble(&program(vec![
        TextItem::Section(SectionKind::Code),
        TextItem::Instruction(jeq),
        TextItem::Instruction(marker),
    ]))
    .unwrap();
    assert!(out.unknown_symbols.is_empty());
}

#[test]
fn hex_dump_output_matches_assembled_length() {
    let out = wasmc::assemble(&program(Vec::new())).unwrap();
    let dump = wasmc::hexdump::format(&out.rom);
    let hex_chars: usize = dump.chars().filter(|c| c.is_ascii_hexdigit()).count();
    assert_eq!(hex_chars, out.rom.len() * 2);
}
