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

//! The typed AST the assembler consumes. Building this tree from source text
//! is out of scope (that's the upstream parser's job); this crate's public
//! boundary starts here, at a [`Program`] that's already been lexed, parsed
//! and shaped into typed nodes.

use serde::{Deserialize, Serialize};

/// A register operand as carried by the AST: the upstream parser has already
/// resolved the textual name (`$t3`, `$a0`, ...) but we keep the name around
/// since it's what error messages and the symbol/relocation machinery want
/// to print. Validated against [`crate::registers::RegisterTable`] at encode
/// time, not at deserialization time.
pub type RegisterName = String;

/// A tagged immediate value: a signed 32-bit number, a single character
/// (stored as its code point), or a reference to a not-yet-resolved label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Immediate {
    Number(i32),
    Char(char),
    Label(String),
}

/// One of the five branch conditions. Encoded as 2 bits in R-type words and
/// 4 bits in I/J-type words; `Negative` does not fit the 2-bit R-type field
/// and is rejected there with an `EncodingError`, not silently truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    None,
    Zero,
    Nonzero,
    Positive,
    Negative,
}

impl Condition {
    pub fn bits(self) -> u8 {
        match self {
            Condition::None => 0,
            Condition::Zero => 1,
            Condition::Nonzero => 2,
            Condition::Positive => 3,
            Condition::Negative => 4,
        }
    }
}

impl Default for Condition {
    fn default() -> Self {
        Condition::None
    }
}

/// Linker flags packed into every instruction header. `Ignore` on input;
/// the driver assigns `KnownSymbol`/`UnknownSymbol` during label expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkerFlags {
    Ignore,
    KnownSymbol,
    UnknownSymbol,
    SymbolId,
}

impl LinkerFlags {
    pub fn bits(self) -> u8 {
        match self {
            LinkerFlags::Ignore => 0,
            LinkerFlags::KnownSymbol => 1,
            LinkerFlags::UnknownSymbol => 2,
            LinkerFlags::SymbolId => 3,
        }
    }
}

impl Default for LinkerFlags {
    fn default() -> Self {
        LinkerFlags::Ignore
    }
}

/// Header shared by every instruction node: source labels anchored here, an
/// optional debug back-reference ("bang"), linker flags, and whether this
/// instruction lives inside a subroutine (affects `call` lowering).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeHeader {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub bang: Option<u32>,
    #[serde(default)]
    pub flags: LinkerFlags,
    #[serde(default)]
    pub in_subroutine: bool,
}

/// R-type arithmetic operators (`OP_RMATH`). Funct values are part of the
/// wire format and must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RMathOp {
    Add,
    Sub,
    Mult,
    MultU,
    Sll,
    Srl,
    Sra,
    Mod,
    Div,
    DivU,
}

/// R-type bitwise/logic operators (`OP_RLOGIC`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RLogicOp {
    Or,
    And,
    Xor,
    Nor,
    Nand,
    Xnor,
    Not,
}

/// R-type comparison operators (`OP_RCOMP`). `>=`/`>` are canonicalized to
/// `<=`/`<` with an operand swap before this node is ever encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RCompOp {
    Lt,
    Leq,
    Eq,
}

/// R-type extended operators (`OP_REXT`): wide multiply result halves and
/// conditional register select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RExtOp {
    MultHi,
    MultLo,
    Sel,
}

/// I-type arithmetic operators; each carries its own opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IMathOp {
    Add,
    Sub,
    Mult,
    MultU,
    Sll,
    Srl,
    Sra,
    Mod,
    Div,
    DivU,
}

/// I-type comparison operators; each carries its own opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ICompOp {
    Lt,
    Leq,
    Eq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemSize {
    Byte,
    Half,
    Word,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemOp {
    Load,
    Store,
    Copy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrintKind {
    Char,
    Int,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NullaryOp {
    Nop,
    Halt,
    Ret,
    Sleep,
    Page,
    Query,
    Svpg,
}

/// Either side of a `jeq` pseudo-instruction's register-or-immediate slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum RegOrImm {
    Register(RegisterName),
    Immediate(Immediate),
}

/// One argument to a `call` pseudo-instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Arg {
    Register(RegisterName),
    AddressOf(String),
    ValueAt(String),
    Number(i64),
}

/// The full instruction node model: one tagged enum per family (R, I, J,
/// Memory, nullary trap, Pseudo), each variant carrying a shared
/// [`NodeHeader`] plus its own operand fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op")]
pub enum InstructionNode {
    RMath {
        header: NodeHeader,
        rs: RegisterName,
        rt: RegisterName,
        rd: RegisterName,
        op: RMathOp,
        condition: Condition,
    },
    RLogic {
        header: NodeHeader,
        rs: RegisterName,
        rt: RegisterName,
        rd: RegisterName,
        op: RLogicOp,
        condition: Condition,
    },
    RComp {
        header: NodeHeader,
        rs: RegisterName,
        rt: RegisterName,
        rd: RegisterName,
        op: RCompOp,
        unsigned: bool,
        condition: Condition,
    },
    RExt {
        header: NodeHeader,
        rs: RegisterName,
        rt: RegisterName,
        rd: RegisterName,
        op: RExtOp,
        condition: Condition,
    },
    /// Register-indirect jump, used directly for `jr`/`jrl` (rs == `$0`)
    /// and for the `jrc`/`jrlc` lowering of `jeq`.
    RJump {
        header: NodeHeader,
        rs: RegisterName,
        rd: RegisterName,
        link: bool,
        condition: Condition,
    },
    IMath {
        header: NodeHeader,
        rs: RegisterName,
        rd: RegisterName,
        op: IMathOp,
        imm: Immediate,
        condition: Condition,
    },
    IComp {
        header: NodeHeader,
        rs: RegisterName,
        rd: RegisterName,
        op: ICompOp,
        imm: Immediate,
        unsigned: bool,
        condition: Condition,
    },
    /// `rd <- imm` where `imm` is a plain number (never a label).
    Set {
        header: NodeHeader,
        rd: RegisterName,
        imm: Immediate,
    },
    /// `rd <- imm`, where `imm` may be a label (resolved to its address).
    Li {
        header: NodeHeader,
        rd: RegisterName,
        imm: Immediate,
    },
    /// `rd <- imm`, upper half. Distinguished from `Li` only for relocation
    /// purposes: label immediates here take an `Upper4` relocation.
    Lui {
        header: NodeHeader,
        rd: RegisterName,
        imm: Immediate,
    },
    /// `[rs] <- imm`
    Si {
        header: NodeHeader,
        rs: RegisterName,
        imm: Immediate,
    },
    Cmpi {
        header: NodeHeader,
        rs: RegisterName,
        imm: Immediate,
        condition: Condition,
    },
    /// Unconditional or register-guarded jump to a 32-bit address.
    J {
        header: NodeHeader,
        addr: Immediate,
        rs: Option<RegisterName>,
        link: bool,
        condition: Condition,
    },
    Memory {
        header: NodeHeader,
        rs: RegisterName,
        rd: RegisterName,
        size: MemSize,
        op: MemOp,
    },
    Print {
        header: NodeHeader,
        rs: RegisterName,
        kind: PrintKind,
    },
    Io {
        header: NodeHeader,
        ident: Option<String>,
    },
    Nullary {
        header: NodeHeader,
        op: NullaryOp,
    },

    // --- pseudo-instructions, lowered during expansion ---
    Mv {
        header: NodeHeader,
        rs: RegisterName,
        rd: RegisterName,
    },
    PseudoPrint {
        header: NodeHeader,
        ch: char,
    },
    StringPrint {
        header: NodeHeader,
        text: String,
    },
    Jeq {
        header: NodeHeader,
        addr: RegOrImm,
        rs: RegisterName,
        rt: RegOrImm,
        link: bool,
    },
    Call {
        header: NodeHeader,
        function: Immediate,
        args: Vec<Arg>,
    },
}

impl InstructionNode {
    pub fn header(&self) -> &NodeHeader {
        match self {
            InstructionNode::RMath { header, .. }
            | InstructionNode::RLogic { header, .. }
            | InstructionNode::RComp { header, .. }
            | InstructionNode::RExt { header, .. }
            | InstructionNode::RJump { header, .. }
            | InstructionNode::IMath { header, .. }
            | InstructionNode::IComp { header, .. }
            | InstructionNode::Set { header, .. }
            | InstructionNode::Li { header, .. }
            | InstructionNode::Lui { header, .. }
            | InstructionNode::Si { header, .. }
            | InstructionNode::Cmpi { header, .. }
            | InstructionNode::J { header, .. }
            | InstructionNode::Memory { header, .. }
            | InstructionNode::Print { header, .. }
            | InstructionNode::Io { header, .. }
            | InstructionNode::Nullary { header, .. }
            | InstructionNode::Mv { header, .. }
            | InstructionNode::PseudoPrint { header, .. }
            | InstructionNode::StringPrint { header, .. }
            | InstructionNode::Jeq { header, .. }
            | InstructionNode::Call { header, .. } => header,
        }
    }

    pub fn header_mut(&mut self) -> &mut NodeHeader {
        match self {
            InstructionNode::RMath { header, .. }
            | InstructionNode::RLogic { header, .. }
            | InstructionNode::RComp { header, .. }
            | InstructionNode::RExt { header, .. }
            | InstructionNode::RJump { header, .. }
            | InstructionNode::IMath { header, .. }
            | InstructionNode::IComp { header, .. }
            | InstructionNode::Set { header, .. }
            | InstructionNode::Li { header, .. }
            | InstructionNode::Lui { header, .. }
            | InstructionNode::Si { header, .. }
            | InstructionNode::Cmpi { header, .. }
            | InstructionNode::J { header, .. }
            | InstructionNode::Memory { header, .. }
            | InstructionNode::Print { header, .. }
            | InstructionNode::Io { header, .. }
            | InstructionNode::Nullary { header, .. }
            | InstructionNode::Mv { header, .. }
            | InstructionNode::PseudoPrint { header, .. }
            | InstructionNode::StringPrint { header, .. }
            | InstructionNode::Jeq { header, .. }
            | InstructionNode::Call { header, .. } => header,
        }
    }

    /// Whether this node carries a single immediate that might be a label
    /// reference needing fixup in `expandLabels`/`processRelocation`. Pseudo
    /// nodes never reach this point: they're gone by the time labels are
    /// expanded.
    pub fn immediate_mut(&mut self) -> Option<&mut Immediate> {
        match self {
            InstructionNode::IMath { imm, .. }
            | InstructionNode::IComp { imm, .. }
            | InstructionNode::Set { imm, .. }
            | InstructionNode::Li { imm, .. }
            | InstructionNode::Lui { imm, .. }
            | InstructionNode::Si { imm, .. }
            | InstructionNode::Cmpi { imm, .. }
            | InstructionNode::J { addr: imm, .. } => Some(imm),
            _ => None,
        }
    }

    pub fn is_lui(&self) -> bool {
        matches!(self, InstructionNode::Lui { .. })
    }

    /// True for nodes that must be lowered by the expansion pass before
    /// they can be encoded. `Io` is only a pseudo-instruction when it still
    /// carries a mnemonic ident to resolve; a bare `io` with no ident is
    /// already primitive.
    pub fn is_pseudo(&self) -> bool {
        matches!(
            self,
            InstructionNode::Mv { .. }
                | InstructionNode::PseudoPrint { .. }
                | InstructionNode::StringPrint { .. }
                | InstructionNode::Jeq { .. }
                | InstructionNode::Call { .. }
        ) || matches!(self, InstructionNode::Io { ident: Some(_), .. })
    }
}

/// A declared symbol type from a `.type` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclaredType {
    Function,
    Instruction,
    Object,
    Unknown,
}

/// Arithmetic-expression AST for `.size`/`.value` directives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Expr {
    Number(i64),
    Label(String),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionKind {
    Code,
    Data,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "directive")]
pub enum Directive {
    StringLit { text: String, null_terminate: bool },
    Type { symbol: String, ty: DeclaredType },
    Size { symbol: String, expr: Expr },
    Value { expr: Expr, width: u8 },
    Align { alignment: u32 },
    Fill { count: u32, value: u8 },
}

/// One entry of the `.text` section's body: a section switch, a label
/// anchor, a directive, or an instruction to encode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "item")]
pub enum TextItem {
    Section(SectionKind),
    Label(String),
    Directive(Directive),
    Instruction(InstructionNode),
}

/// A debug-section record as declared in source. `Location` carries only
/// the fields the AST knows about; `count` and `address` are synthesized by
/// the driver once the instruction stream is expanded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum DebugRecord {
    Filename(String),
    Function(String),
    Location {
        file_index: u32,
        line: u32,
        column: u32,
        func_index: u32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaSection {
    #[serde(default = "default_unknown_field")]
    pub name: String,
    #[serde(default = "default_unknown_field")]
    pub version: String,
    #[serde(default = "default_unknown_field")]
    pub author: String,
    #[serde(default = "default_orcid")]
    pub orcid: String,
}

fn default_unknown_field() -> String {
    "?".to_string()
}

fn default_orcid() -> String {
    "0000000000000000".to_string()
}

impl Default for MetaSection {
    fn default() -> Self {
        Self {
            name: default_unknown_field(),
            version: default_unknown_field(),
            author: default_unknown_field(),
            orcid: default_orcid(),
        }
    }
}

/// The root AST node. Accepted as-is: the `.include` section exists purely
/// so a round-tripped upstream AST doesn't fail deserialization; the
/// assembler treats it as a no-op.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub meta: MetaSection,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub text: Vec<TextItem>,
    #[serde(default)]
    pub debug: Vec<DebugRecord>,
}
