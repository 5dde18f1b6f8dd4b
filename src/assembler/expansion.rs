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

//! Lowers pseudo-instructions to sequences of primitive R/I/J nodes.
//! The first emitted primitive always inherits the source
//! node's labels and bang so a downstream label reference or debug record
//! still lands on the right address; every other emitted primitive gets a
//! bare header carrying only `in_subroutine` forward.

use crate::ast::{
    Arg, Condition, Immediate, InstructionNode, MemOp, MemSize, NodeHeader, RCompOp, RegOrImm,
    RLogicOp,
};
use crate::errors::AssemblyError;
use crate::registers::ARGUMENT_REGISTER_COUNT;

const SCRATCH: &str = "$m7";
const STACK_POINTER: &str = "$sp";
const RETURN_ADDR: &str = "$rt";

fn bare_header(in_subroutine: bool) -> NodeHeader {
    NodeHeader { in_subroutine, ..NodeHeader::default() }
}

fn argument_register(index: usize) -> String {
    format!("$a{:x}", index)
}

/// Fixed mapping from `io` mnemonic to the numeric id lowered into `$a0`
/// ahead of an `io` trap. Not specified exhaustively by the architecture;
/// this is the assembler's own table.
fn io_id(ident: &str) -> Option<u32> {
    match ident {
        "read" => Some(0),
        "write" => Some(1),
        "open" => Some(2),
        "close" => Some(3),
        "getsize" => Some(4),
        "getargc" => Some(5),
        "getargvsize" => Some(6),
        "getargv" => Some(7),
        "exit" => Some(8),
        _ => None,
    }
}

fn load_immediate(imm: &Immediate, rd: &str, header: NodeHeader) -> InstructionNode {
    match imm {
        Immediate::Label(_) => InstructionNode::Li { header, rd: rd.to_string(), imm: imm.clone() },
        _ => InstructionNode::Set { header, rd: rd.to_string(), imm: imm.clone() },
    }
}

fn seq(rs: &str, rt: &str, rd: &str, header: NodeHeader) -> InstructionNode {
    InstructionNode::RComp {
        header,
        rs: rs.to_string(),
        rt: rt.to_string(),
        rd: rd.to_string(),
        op: RCompOp::Eq,
        unsigned: false,
        condition: Condition::None,
    }
}

/// Expands one instruction node into the primitives that will actually be
/// encoded. Non-pseudo nodes pass through unchanged as a single-element
/// vector.
pub fn expand(node: &InstructionNode) -> Result<Vec<InstructionNode>, AssemblyError> {
    if !node.is_pseudo() {
        return Ok(vec![node.clone()]);
    }

    let in_subroutine = node.header().in_subroutine;
    let first_header = node.header().clone();

    let out = match node {
        InstructionNode::Mv { rs, rd, .. } => {
            vec![InstructionNode::RLogic {
                header: first_header.clone(),
                rs: rs.clone(),
                rt: "$0".to_string(),
                rd: rd.clone(),
                op: RLogicOp::Or,
                condition: Condition::None,
            }]
        }

        InstructionNode::PseudoPrint { ch, .. } => vec![
            InstructionNode::Set {
                header: first_header.clone(),
                rd: SCRATCH.to_string(),
                imm: Immediate::Char(*ch),
            },
            InstructionNode::Print {
                header: bare_header(in_subroutine),
                rs: SCRATCH.to_string(),
                kind: crate::ast::PrintKind::Char,
            },
        ],

        InstructionNode::StringPrint { text, .. } => {
            let mut primitives = Vec::new();
            if !text.is_empty() {
                let mut chars = text.chars();
                let first_char = chars.next().unwrap();
                let mut last_char = char::from_u32((first_char as u32).wrapping_sub(1)).unwrap_or('\u{0}');
                let mut first = true;
                for ch in text.chars() {
                    if ch != last_char {
                        let header = if first { first_header.clone() } else { bare_header(in_subroutine) };
                        primitives.push(InstructionNode::Set {
                            header,
                            rd: SCRATCH.to_string(),
                            imm: Immediate::Char(ch),
                        });
                        first = false;
                        last_char = ch;
                    }
                    primitives.push(InstructionNode::Print {
                        header: bare_header(in_subroutine),
                        rs: SCRATCH.to_string(),
                        kind: crate::ast::PrintKind::Char,
                    });
                }
            }
            primitives
        }

        InstructionNode::Jeq { addr, rs, rt, link, .. } => {
            let mut primitives = Vec::new();
            match (addr, rt) {
                (RegOrImm::Register(addr_reg), RegOrImm::Register(rt_reg)) => {
                    primitives.push(seq(rs, rt_reg, SCRATCH, first_header.clone()));
                    primitives.push(InstructionNode::RJump {
                        header: bare_header(in_subroutine),
                        rs: SCRATCH.to_string(),
                        rd: addr_reg.clone(),
                        link: *link,
                        condition: Condition::Nonzero,
                    });
                }
                (RegOrImm::Register(addr_reg), RegOrImm::Immediate(imm)) => {
                    primitives.push(load_immediate(imm, SCRATCH, first_header.clone()));
                    primitives.push(seq(rs, SCRATCH, SCRATCH, bare_header(in_subroutine)));
                    primitives.push(InstructionNode::RJump {
                        header: bare_header(in_subroutine),
                        rs: SCRATCH.to_string(),
                        rd: addr_reg.clone(),
                        link: *link,
                        condition: Condition::Nonzero,
                    });
                }
                (RegOrImm::Immediate(addr_imm), RegOrImm::Register(rt_reg)) => {
                    primitives.push(seq(rs, rt_reg, SCRATCH, first_header.clone()));
                    primitives.push(InstructionNode::J {
                        header: bare_header(in_subroutine),
                        addr: addr_imm.clone(),
                        rs: Some(SCRATCH.to_string()),
                        link: *link,
                        condition: Condition::Nonzero,
                    });
                }
                (RegOrImm::Immediate(addr_imm), RegOrImm::Immediate(imm)) => {
                    primitives.push(load_immediate(imm, SCRATCH, first_header.clone()));
                    primitives.push(seq(rs, SCRATCH, SCRATCH, bare_header(in_subroutine)));
                    primitives.push(InstructionNode::J {
                        header: bare_header(in_subroutine),
                        addr: addr_imm.clone(),
                        rs: Some(SCRATCH.to_string()),
                        link: *link,
                        condition: Condition::Nonzero,
                    });
                }
            }
            primitives
        }

        InstructionNode::Io { ident, .. } => match ident {
            None => vec![InstructionNode::Io { header: first_header.clone(), ident: None }],
            Some(name) => {
                let id = io_id(name)
                    .ok_or_else(|| AssemblyError::structural(format!("unknown io ident `{}`", name)))?;
                vec![
                    InstructionNode::Set {
                        header: first_header.clone(),
                        rd: "$a0".to_string(),
                        imm: Immediate::Number(id as i32),
                    },
                    InstructionNode::Io { header: bare_header(in_subroutine), ident: None },
                ]
            }
        },

        InstructionNode::Call { function, args, .. } => {
            if args.len() > ARGUMENT_REGISTER_COUNT {
                return Err(AssemblyError::encoding(format!(
                    "call passes {} arguments, more than the {} argument registers",
                    args.len(),
                    ARGUMENT_REGISTER_COUNT
                )));
            }

            let mut pushed = Vec::new();
            if in_subroutine {
                pushed.push(RETURN_ADDR.to_string());
            }
            for i in 0..args.len() {
                pushed.push(argument_register(i));
            }

            // `first_header`'s labels/bang must land on whichever primitive is
            // emitted first overall (push, else argument materialization,
            // else the bare `J`) — not specifically on the first push, which
            // doesn't exist for a zero-argument top-level call.
            let mut first_header = Some(first_header);
            let mut take_header = || first_header.take().unwrap_or_else(|| bare_header(in_subroutine));

            let mut primitives = Vec::new();
            for reg in &pushed {
                primitives.push(InstructionNode::Memory {
                    header: take_header(),
                    rs: reg.clone(),
                    rd: STACK_POINTER.to_string(),
                    size: MemSize::Word,
                    op: MemOp::Store,
                });
            }

            for (i, arg) in args.iter().enumerate() {
                let target = argument_register(i);
                let header = take_header();
                primitives.push(match arg {
                    Arg::Register(source) => InstructionNode::RLogic {
                        header,
                        rs: source.clone(),
                        rt: "$0".to_string(),
                        rd: target,
                        op: RLogicOp::Or,
                        condition: Condition::None,
                    },
                    Arg::AddressOf(label) => InstructionNode::Set {
                        header,
                        rd: target,
                        imm: Immediate::Label(label.clone()),
                    },
                    Arg::ValueAt(label) => InstructionNode::Li {
                        header,
                        rd: target,
                        imm: Immediate::Label(label.clone()),
                    },
                    Arg::Number(n) => InstructionNode::Set {
                        header,
                        rd: target,
                        imm: Immediate::Number(*n as i32),
                    },
                });
            }

            primitives.push(InstructionNode::J {
                header: take_header(),
                addr: function.clone(),
                rs: None,
                link: true,
                condition: Condition::None,
            });

            for reg in pushed.iter().rev() {
                primitives.push(InstructionNode::Memory {
                    header: bare_header(in_subroutine),
                    rs: reg.clone(),
                    rd: STACK_POINTER.to_string(),
                    size: MemSize::Word,
                    op: MemOp::Load,
                });
            }

            primitives
        }

        _ => unreachable!("is_pseudo() guards every pseudo variant above"),
    };

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeHeader;

    #[test]
    fn mv_expands_to_single_or_instruction() {
        let node = InstructionNode::Mv {
            header: NodeHeader::default(),
            rs: "$t0".to_string(),
            rd: "$t1".to_string(),
        };
        let expanded = expand(&node).unwrap();
        assert_eq!(expanded.len(), 1);
        match &expanded[0] {
            InstructionNode::RLogic { rs, rt, rd, op, .. } => {
                assert_eq!(rs, "$t0");
                assert_eq!(rt, "$0");
                assert_eq!(rd, "$t1");
                assert_eq!(*op, RLogicOp::Or);
            }
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn string_print_emits_one_print_per_char() {
        let node = InstructionNode::StringPrint { header: NodeHeader::default(), text: "aab".to_string() };
        let expanded = expand(&node).unwrap();
        let print_count = expanded
            .iter()
            .filter(|n| matches!(n, InstructionNode::Print { .. }))
            .count();
        assert_eq!(print_count, 3);
        let set_count = expanded.iter().filter(|n| matches!(n, InstructionNode::Set { .. })).count();
        assert_eq!(set_count, 2); // 'a' then 'b', no new Set for the repeated 'a'
    }

    #[test]
    fn empty_string_print_emits_nothing() {
        let node = InstructionNode::StringPrint { header: NodeHeader::default(), text: String::new() };
        assert!(expand(&node).unwrap().is_empty());
    }

    #[test]
    fn call_with_two_args_in_subroutine_emits_nine_instructions() {
        let node = InstructionNode::Call {
            header: NodeHeader { in_subroutine: true, ..NodeHeader::default() },
            function: Immediate::Label("foo".to_string()),
            args: vec![Arg::Number(42), Arg::Register("$t0".to_string())],
        };
        let expanded = expand(&node).unwrap();
        assert_eq!(expanded.len(), 9);
    }

    #[test]
    fn zero_arg_call_outside_a_subroutine_labels_its_only_emitted_instruction() {
        // No pushes (not in a subroutine, no args) and no argument
        // materialization: the label must land on the terminal `J`, the
        // only primitive this call emits.
        let node = InstructionNode::Call {
            header: NodeHeader { labels: vec!["entry".to_string()], ..NodeHeader::default() },
            function: Immediate::Label("init".to_string()),
            args: Vec::new(),
        };
        let expanded = expand(&node).unwrap();
        assert_eq!(expanded.len(), 1);
        match &expanded[0] {
            InstructionNode::J { header, .. } => {
                assert_eq!(header.labels, vec!["entry".to_string()]);
            }
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn call_rejects_too_many_arguments() {
        let args = (0..17).map(|i| Arg::Number(i)).collect();
        let node = InstructionNode::Call {
            header: NodeHeader::default(),
            function: Immediate::Label("foo".to_string()),
            args,
        };
        assert!(expand(&node).is_err());
    }

    #[test]
    fn io_with_known_ident_loads_id_into_a0() {
        let node = InstructionNode::Io { header: NodeHeader::default(), ident: Some("write".to_string()) };
        let expanded = expand(&node).unwrap();
        assert_eq!(expanded.len(), 2);
        match &expanded[0] {
            InstructionNode::Set { rd, imm, .. } => {
                assert_eq!(rd, "$a0");
                assert_eq!(*imm, Immediate::Number(1));
            }
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn io_with_unknown_ident_is_an_error() {
        let node = InstructionNode::Io { header: NodeHeader::default(), ident: Some("frobnicate".to_string()) };
        assert!(expand(&node).is_err());
    }

    #[test]
    fn non_pseudo_node_passes_through_unchanged() {
        let node = InstructionNode::Nullary { header: NodeHeader::default(), op: crate::ast::NullaryOp::Nop };
        let expanded = expand(&node).unwrap();
        assert_eq!(expanded.len(), 1);
    }
}
