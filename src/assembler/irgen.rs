// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! The IR-building visitor.
//!
//! Drives two modes of expression evaluation. Directive operands are
//! evaluated immediately on a typed stack whose element type is chosen by
//! the directive (`.byte` -> u8, `.double` -> f64, ...); symbols referenced
//! there must already be defined. Instruction operands are recorded as
//! deferred programs and resolved by a second pass after parsing, which is
//! what makes forward label references work.

use std::collections::{HashMap, HashSet};

use crate::core::error::{AsmError, AsmErrorKind};
use crate::core::expr_vm::{
    ErrSite, ExprOp, ExprProgram, SymbolResolver, SymbolUse, SymbolValue, VmError,
};
use crate::core::parser::{AsmOp, ParenKind, ParseState, Terminal, Visitor};
use crate::core::tokenizer::{convert_string_literal, Token};
use crate::gekko::directive::Directive;
use crate::gekko::table::ParseInfo;

/// One instruction in the IR. Operand values live in the shared operand
/// pool so the second pass can resolve them after parsing.
#[derive(Debug, Clone)]
pub struct GekkoInstruction {
    /// Mnemonic-variant index (`row * 4 + variant_bits`).
    pub mnemonic_index: usize,
    pub op_index: usize,
    pub op_count: usize,
    /// Literal text of the line, for error reporting.
    pub raw_text: String,
    pub line_number: usize,
    pub is_extended: bool,
}

#[derive(Debug)]
pub enum Chunk {
    Insts(Vec<GekkoInstruction>),
    Bytes(Vec<u8>),
    Pad(usize),
}

impl Chunk {
    pub fn size(&self) -> usize {
        match self {
            Chunk::Insts(insts) => insts.len() * 4,
            Chunk::Bytes(bytes) => bytes.len(),
            Chunk::Pad(count) => *count,
        }
    }
}

#[derive(Debug)]
pub struct IrBlock {
    pub address: u32,
    pub chunks: Vec<Chunk>,
}

impl IrBlock {
    fn new(address: u32) -> Self {
        Self {
            address,
            chunks: Vec::new(),
        }
    }

    pub fn end_address(&self) -> u32 {
        self.chunks
            .iter()
            .fold(self.address, |acc, chunk| acc.wrapping_add(chunk.size() as u32))
    }
}

/// A resolved operand: its span within the source line and its value.
/// Constructed in one place by the second pass, never rewritten.
#[derive(Debug, Clone, Copy)]
pub struct OperandSlot {
    pub col: usize,
    pub len: usize,
    pub value: u32,
}

impl OperandSlot {
    fn new(col: usize, len: usize, value: u32) -> Self {
        Self { col, len, value }
    }
}

#[derive(Debug, Default)]
pub struct GekkoIr {
    pub blocks: Vec<IrBlock>,
    pub operand_pool: Vec<OperandSlot>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum EvalMode {
    RelDoublePass,
    AbsSinglePass,
}

/// Typed evaluation stack for directive operands. A tagged union keeps the
/// "this operator isn't defined on this type" cases explicit.
enum EvalStack {
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

const UNDERFLOW: &str = "Internal error: expression stack underflow";

macro_rules! int_binary {
    ($vec:expr, $t:ty, $op:expr) => {{
        let rhs = $vec.pop().ok_or(UNDERFLOW.to_string())?;
        let lhs = $vec.pop().ok_or(UNDERFLOW.to_string())?;
        let bits = <$t>::BITS;
        let result: $t = match $op {
            AsmOp::Or => lhs | rhs,
            AsmOp::Xor => lhs ^ rhs,
            AsmOp::And => lhs & rhs,
            AsmOp::Lsh => {
                if rhs >= bits as $t {
                    0
                } else {
                    lhs << rhs
                }
            }
            AsmOp::Rsh => {
                if rhs >= bits as $t {
                    0
                } else {
                    lhs >> rhs
                }
            }
            AsmOp::Add => lhs.wrapping_add(rhs),
            AsmOp::Sub => lhs.wrapping_sub(rhs),
            AsmOp::Mul => lhs.wrapping_mul(rhs),
            AsmOp::Div => {
                if rhs == 0 {
                    return Err("Division by zero".to_string());
                }
                lhs / rhs
            }
            AsmOp::Neg | AsmOp::Not => {
                return Err("Internal error: unary operator on binary path".to_string())
            }
        };
        $vec.push(result);
        Ok(())
    }};
}

macro_rules! float_binary {
    ($vec:expr, $op:expr) => {{
        let rhs = $vec.pop().ok_or(UNDERFLOW.to_string())?;
        let lhs = $vec.pop().ok_or(UNDERFLOW.to_string())?;
        let result = match $op {
            AsmOp::Add => lhs + rhs,
            AsmOp::Sub => lhs - rhs,
            AsmOp::Mul => lhs * rhs,
            AsmOp::Div => lhs / rhs,
            _ => {
                return Err(format!(
                    "Operator '{}' is not defined on floating-point values",
                    op_str($op)
                ))
            }
        };
        $vec.push(result);
        Ok(())
    }};
}

fn op_str(op: AsmOp) -> &'static str {
    match op {
        AsmOp::Or => "|",
        AsmOp::Xor => "^",
        AsmOp::And => "&",
        AsmOp::Lsh => "<<",
        AsmOp::Rsh => ">>",
        AsmOp::Add => "+",
        AsmOp::Sub => "-",
        AsmOp::Mul => "*",
        AsmOp::Div => "/",
        AsmOp::Neg => "-",
        AsmOp::Not => "~",
    }
}

impl EvalStack {
    fn for_directive(directive: Directive) -> Self {
        match directive {
            Directive::Byte => EvalStack::U8(Vec::new()),
            Directive::Byte2 => EvalStack::U16(Vec::new()),
            Directive::Byte4
            | Directive::Locate
            | Directive::PadAlign
            | Directive::Align
            | Directive::Zeros
            | Directive::Skip => EvalStack::U32(Vec::new()),
            Directive::Byte8 | Directive::DefVar => EvalStack::U64(Vec::new()),
            Directive::Float => EvalStack::F32(Vec::new()),
            Directive::Double => EvalStack::F64(Vec::new()),
            Directive::Ascii | Directive::Asciz => EvalStack::U8(Vec::new()),
        }
    }

    fn push_cast(&mut self, val: u64) {
        match self {
            EvalStack::U8(v) => v.push(val as u8),
            EvalStack::U16(v) => v.push(val as u16),
            EvalStack::U32(v) => v.push(val as u32),
            EvalStack::U64(v) => v.push(val),
            EvalStack::F32(v) => v.push(val as f32),
            EvalStack::F64(v) => v.push(val as f64),
        }
    }

    fn push_token(&mut self, tok: &Token<'_>) -> Result<(), String> {
        let bad = || "Internal error: token not evaluatable in this directive".to_string();
        match self {
            EvalStack::U8(v) => v.push(tok.eval_u8().ok_or_else(bad)?),
            EvalStack::U16(v) => v.push(tok.eval_u16().ok_or_else(bad)?),
            EvalStack::U32(v) => v.push(tok.eval_u32().ok_or_else(bad)?),
            EvalStack::U64(v) => v.push(tok.eval_u64().ok_or_else(bad)?),
            EvalStack::F32(v) => v.push(tok.eval_f32().ok_or_else(bad)?),
            EvalStack::F64(v) => v.push(tok.eval_f64().ok_or_else(bad)?),
        }
        Ok(())
    }

    fn binary(&mut self, op: AsmOp) -> Result<(), String> {
        match self {
            EvalStack::U8(v) => int_binary!(v, u8, op),
            EvalStack::U16(v) => int_binary!(v, u16, op),
            EvalStack::U32(v) => int_binary!(v, u32, op),
            EvalStack::U64(v) => int_binary!(v, u64, op),
            EvalStack::F32(v) => float_binary!(v, op),
            EvalStack::F64(v) => float_binary!(v, op),
        }
    }

    fn unary(&mut self, op: AsmOp) -> Result<(), String> {
        macro_rules! int_unary {
            ($vec:expr) => {{
                let top = $vec.last_mut().ok_or(UNDERFLOW.to_string())?;
                match op {
                    AsmOp::Neg => *top = top.wrapping_neg(),
                    AsmOp::Not => *top = !*top,
                    _ => {
                        return Err("Internal error: binary operator on unary path".to_string())
                    }
                }
                Ok(())
            }};
        }
        match self {
            EvalStack::U8(v) => int_unary!(v),
            EvalStack::U16(v) => int_unary!(v),
            EvalStack::U32(v) => int_unary!(v),
            EvalStack::U64(v) => int_unary!(v),
            EvalStack::F32(v) => match op {
                AsmOp::Neg => {
                    let top = v.last_mut().ok_or(UNDERFLOW.to_string())?;
                    *top = -*top;
                    Ok(())
                }
                _ => Err(format!(
                    "Operator '{}' is not defined on floating-point values",
                    op_str(op)
                )),
            },
            EvalStack::F64(v) => match op {
                AsmOp::Neg => {
                    let top = v.last_mut().ok_or(UNDERFLOW.to_string())?;
                    *top = -*top;
                    Ok(())
                }
                _ => Err(format!(
                    "Operator '{}' is not defined on floating-point values",
                    op_str(op)
                )),
            },
        }
    }

    /// Rel-conv close in a directive: subtract the current address.
    fn sub_address(&mut self, addr: u32) -> Result<(), String> {
        self.push_cast(addr as u64);
        self.binary(AsmOp::Sub)
    }
}

trait EmitBytes {
    fn emit_be(self, out: &mut Vec<u8>);
}

macro_rules! impl_emit_int {
    ($t:ty) => {
        impl EmitBytes for $t {
            fn emit_be(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_be_bytes());
            }
        }
    };
}

impl_emit_int!(u8);
impl_emit_int!(u16);
impl_emit_int!(u32);
impl_emit_int!(u64);

impl EmitBytes for f32 {
    fn emit_be(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_bits().to_be_bytes());
    }
}

impl EmitBytes for f64 {
    fn emit_be(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_bits().to_be_bytes());
    }
}

struct Fixup {
    site: ErrSite,
    program: ExprProgram,
}

struct SymTables<'a> {
    labels: &'a HashMap<String, u32>,
    constants: &'a HashMap<String, u64>,
}

impl SymbolResolver for SymTables<'_> {
    fn lookup(&self, name: &str) -> Option<SymbolValue> {
        if let Some(&addr) = self.labels.get(name) {
            return Some(SymbolValue::Address(addr));
        }
        self.constants.get(name).map(|&v| SymbolValue::Constant(v))
    }
}

pub struct IrBuilder {
    ir: GekkoIr,

    build_inst: Option<GekkoInstruction>,
    operand_scan_begin: usize,

    labels: HashMap<String, u32>,
    constants: HashMap<String, u64>,
    symset: HashSet<String>,

    mode: EvalMode,

    // Relative-double-pass state
    rel_ops: Vec<ExprOp>,
    fixups: Vec<Fixup>,
    operand_str_start: usize,

    // Absolute-single-pass state
    eval_stack: EvalStack,
    string_lit: String,
    active_directive: Option<Directive>,
    active_var: Option<String>,
}

impl IrBuilder {
    pub fn new(base_address: u32) -> Self {
        let mut ir = GekkoIr::default();
        ir.blocks.push(IrBlock::new(base_address));
        Self {
            ir,
            build_inst: None,
            operand_scan_begin: 0,
            labels: HashMap::new(),
            constants: HashMap::new(),
            symset: HashSet::new(),
            mode: EvalMode::RelDoublePass,
            rel_ops: Vec::new(),
            fixups: Vec::new(),
            operand_str_start: 0,
            eval_stack: EvalStack::U32(Vec::new()),
            string_lit: String::new(),
            active_directive: None,
            active_var: None,
        }
    }

    pub fn into_ir(self) -> GekkoIr {
        self.ir
    }

    fn active_block(&mut self) -> &mut IrBlock {
        self.ir.blocks.last_mut().expect("a block always exists")
    }

    fn current_address(&self) -> u32 {
        self.ir.blocks.last().expect("a block always exists").end_address()
    }

    fn bytes_chunk(&mut self) -> &mut Vec<u8> {
        let block = self.active_block();
        if !matches!(block.chunks.last(), Some(Chunk::Bytes(_))) {
            block.chunks.push(Chunk::Bytes(Vec::new()));
        }
        match block.chunks.last_mut() {
            Some(Chunk::Bytes(bytes)) => bytes,
            _ => unreachable!(),
        }
    }

    fn insts_chunk(&mut self) -> &mut Vec<GekkoInstruction> {
        let block = self.active_block();
        if !matches!(block.chunks.last(), Some(Chunk::Insts(_))) {
            block.chunks.push(Chunk::Insts(Vec::new()));
        }
        match block.chunks.last_mut() {
            Some(Chunk::Insts(insts)) => insts,
            _ => unreachable!(),
        }
    }

    fn pad_chunk(&mut self) -> &mut usize {
        let block = self.active_block();
        if !matches!(block.chunks.last(), Some(Chunk::Pad(_))) {
            block.chunks.push(Chunk::Pad(0));
        }
        match block.chunks.last_mut() {
            Some(Chunk::Pad(count)) => count,
            _ => unreachable!(),
        }
    }

    fn add_bytes<T: EmitBytes>(&mut self, val: T) {
        val.emit_be(self.bytes_chunk());
    }

    fn add_string_bytes(&mut self, null_term: bool) {
        let literal = std::mem::take(&mut self.string_lit);
        let bytes = self.bytes_chunk();
        convert_string_literal(&literal, bytes);
        if null_term {
            bytes.push(0);
        }
    }

    fn start_block(&mut self, address: u32) {
        self.ir.blocks.push(IrBlock::new(address));
    }

    fn start_block_align(&mut self, bits: u32) {
        let align_mask = (1u32 << bits) - 1;
        let current = self.current_address();
        if current & align_mask != 0 {
            self.start_block(current.wrapping_add(1u32 << bits) & !align_mask);
        }
    }

    fn pad_align(&mut self, bits: u32) {
        let align_mask = (1u32 << bits) - 1;
        let current = self.current_address();
        if current & align_mask != 0 {
            *self.pad_chunk() += ((1 << bits) - (current & align_mask)) as usize;
        }
    }

    fn pad_space(&mut self, space: usize) {
        *self.pad_chunk() += space;
    }

    fn err_site(&self, state: &ParseState<'_>, col: usize, len: usize) -> ErrSite {
        ErrSite {
            source_line: state
                .lexer
                .current_line()
                .trim_end_matches('\n')
                .to_string(),
            line: state.lexer.line_number(),
            col,
            len,
        }
    }

    /// Run every deferred operand program, materializing the operand pool.
    fn run_fixups(&mut self, state: &mut ParseState<'_>) {
        let tables = SymTables {
            labels: &self.labels,
            constants: &self.constants,
        };
        for fixup in &self.fixups {
            match fixup.program.evaluate(&tables) {
                Ok(value) => self.ir.operand_pool.push(OperandSlot::new(
                    fixup.site.col,
                    fixup.site.len,
                    value,
                )),
                Err(VmError::Failed(err)) => {
                    state.error = Some(err);
                    return;
                }
                Err(VmError::Message(message)) => {
                    state.error = Some(AsmError::new(
                        AsmErrorKind::Expression,
                        message,
                        fixup.site.source_line.clone(),
                        fixup.site.line,
                        fixup.site.col,
                        fixup.site.len,
                    ));
                    return;
                }
            }
        }
    }

    fn lookup_symbol(&self, name: &str) -> Option<u64> {
        if let Some(&addr) = self.labels.get(name) {
            return Some(addr as u64);
        }
        self.constants.get(name).copied()
    }

    /// Evaluate a terminal in relative (instruction-operand) mode.
    fn eval_terminal_rel(&mut self, state: &mut ParseState<'_>, terminal: Terminal, tok: &Token<'_>) {
        match terminal {
            Terminal::Hex
            | Terminal::Dec
            | Terminal::Oct
            | Terminal::Bin
            | Terminal::Gpr
            | Terminal::Fpr
            | Terminal::Spr
            | Terminal::CrField
            | Terminal::Lt
            | Terminal::Gt
            | Terminal::Eq
            | Terminal::So => match tok.eval_u32() {
                Some(val) => self.rel_ops.push(ExprOp::PushLit(val)),
                None => state.emit_error_here(
                    AsmErrorKind::Internal,
                    "Internal error: literal token failed to evaluate".to_string(),
                ),
            },

            Terminal::Dot => {
                let addr = self.current_address();
                self.rel_ops.push(ExprOp::PushLit(addr));
            }

            Terminal::Id => {
                // Labels resolve relative to the referencing instruction;
                // constants resolve to their value. Forward references defer
                // to the second pass with identical semantics.
                let source_address = self.current_address();
                if let Some(&addr) = self.labels.get(tok.text) {
                    self.rel_ops
                        .push(ExprOp::PushLit(addr.wrapping_sub(source_address)));
                } else if let Some(&val) = self.constants.get(tok.text) {
                    self.rel_ops.push(ExprOp::PushLit(val as u32));
                } else {
                    let col = state.lexer.col_number();
                    let site = self.err_site(state, col, tok.text.len());
                    self.rel_ops.push(ExprOp::PushSymbol(SymbolUse {
                        name: tok.text.to_string(),
                        absolute: false,
                        source_address,
                        site,
                    }));
                }
            }

            Terminal::Flt | Terminal::Str => state.emit_error_here(
                AsmErrorKind::Internal,
                "Internal error: unexpected terminal in instruction operand".to_string(),
            ),
        }
    }

    /// Evaluate a terminal in absolute (directive) mode.
    fn eval_terminal_abs(&mut self, state: &mut ParseState<'_>, terminal: Terminal, tok: &Token<'_>) {
        let result = match terminal {
            Terminal::Dot => {
                let addr = self.current_address();
                self.eval_stack.push_cast(addr as u64);
                Ok(())
            }
            Terminal::Id => match self.lookup_symbol(tok.text) {
                Some(val) => {
                    self.eval_stack.push_cast(val);
                    Ok(())
                }
                None => {
                    state.emit_error_here(
                        AsmErrorKind::Symbol,
                        format!("Undefined reference to Label/Constant '{}'", tok.text),
                    );
                    return;
                }
            },
            _ => self.eval_stack.push_token(tok),
        };
        if let Err(message) = result {
            state.emit_error_here(AsmErrorKind::Expression, message);
        }
    }

    fn abs_result(&mut self, state: &mut ParseState<'_>, result: Result<(), String>) {
        if let Err(message) = result {
            let kind = if message.starts_with("Internal") {
                AsmErrorKind::Internal
            } else {
                AsmErrorKind::Expression
            };
            state.emit_error_here(kind, message);
        }
    }

    /// Resolve a symbol for `@ha`/`@l` in absolute mode and push the chosen
    /// half. The half is extracted from the full value before the stack
    /// narrows it to the directive's width.
    fn push_symbol_half_abs(&mut self, state: &mut ParseState<'_>, id: &str, hi: bool) {
        match self.lookup_symbol(id) {
            Some(val) => {
                let half = if hi {
                    ((val >> 16) + ((val >> 15) & 1)) & 0xffff
                } else {
                    val & 0xffff
                };
                self.eval_stack.push_cast(half);
            }
            None => {
                state.emit_error_here(
                    AsmErrorKind::Symbol,
                    format!("Undefined reference to Label/Constant '{id}'"),
                );
            }
        }
    }

    fn u32_stack_top(&self) -> Option<u32> {
        match &self.eval_stack {
            EvalStack::U32(v) => v.last().copied(),
            _ => None,
        }
    }

    fn u64_stack_top(&self) -> Option<u64> {
        match &self.eval_stack {
            EvalStack::U64(v) => v.last().copied(),
            _ => None,
        }
    }
}

impl<'src> Visitor<'src> for IrBuilder {
    fn on_directive_pre(&mut self, _state: &mut ParseState<'src>, directive: Directive) {
        self.mode = EvalMode::AbsSinglePass;
        self.active_directive = Some(directive);
        self.eval_stack = EvalStack::for_directive(directive);
    }

    fn on_directive_post(&mut self, state: &mut ParseState<'src>, directive: Directive) {
        match directive {
            // Data directives are flushed by on_resolved_expr_post
            Directive::Byte | Directive::Byte2 | Directive::Byte4 | Directive::Byte8 => {}
            Directive::Float | Directive::Double => {}

            Directive::DefVar => {
                let name = self.active_var.take();
                let value = self.u64_stack_top();
                match (name, value) {
                    (Some(name), Some(value)) => {
                        self.constants.insert(name, value);
                    }
                    _ => state.emit_error_here(
                        AsmErrorKind::Internal,
                        "Internal error: .defvar finished without a value".to_string(),
                    ),
                }
            }

            Directive::Locate => match self.u32_stack_top() {
                Some(addr) => self.start_block(addr),
                None => state.emit_error_here(
                    AsmErrorKind::Internal,
                    "Internal error: .locate finished without a value".to_string(),
                ),
            },

            Directive::Zeros => match self.u32_stack_top() {
                Some(count) => self.pad_space(count as usize),
                None => state.emit_error_here(
                    AsmErrorKind::Internal,
                    "Internal error: .zeros finished without a value".to_string(),
                ),
            },

            Directive::Skip => match self.u32_stack_top() {
                Some(count) => {
                    let next = self.current_address().wrapping_add(count);
                    self.start_block(next);
                }
                None => state.emit_error_here(
                    AsmErrorKind::Internal,
                    "Internal error: .skip finished without a value".to_string(),
                ),
            },

            Directive::PadAlign | Directive::Align => match self.u32_stack_top() {
                Some(bits) if bits < 32 => {
                    if directive == Directive::PadAlign {
                        self.pad_align(bits);
                    } else {
                        self.start_block_align(bits);
                    }
                }
                Some(_) => state.emit_error_here(
                    AsmErrorKind::Directive,
                    "Alignment must be less than 32 bits".to_string(),
                ),
                None => state.emit_error_here(
                    AsmErrorKind::Internal,
                    "Internal error: alignment directive without a value".to_string(),
                ),
            },

            Directive::Ascii => self.add_string_bytes(false),
            Directive::Asciz => self.add_string_bytes(true),
        }
        self.active_directive = None;
    }

    fn on_instruction_pre(&mut self, state: &mut ParseState<'src>, info: &ParseInfo, extended: bool) {
        self.mode = EvalMode::RelDoublePass;
        self.build_inst = Some(GekkoInstruction {
            mnemonic_index: info.index,
            op_index: 0,
            op_count: 0,
            raw_text: state
                .lexer
                .current_line()
                .trim_end_matches('\n')
                .to_string(),
            line_number: state.lexer.line_number(),
            is_extended: extended,
        });
        self.operand_scan_begin = self.fixups.len();
    }

    fn on_instruction_post(&mut self, state: &mut ParseState<'src>, _info: &ParseInfo, _extended: bool) {
        match self.build_inst.take() {
            Some(mut inst) => {
                inst.op_index = self.operand_scan_begin;
                inst.op_count = self.fixups.len() - self.operand_scan_begin;
                self.insts_chunk().push(inst);
            }
            None => state.emit_error_here(
                AsmErrorKind::Internal,
                "Internal error: instruction finished before it started".to_string(),
            ),
        }
    }

    fn on_operand_pre(&mut self, state: &mut ParseState<'src>) {
        self.operand_str_start = state.lexer.col_number();
    }

    fn on_operand_post(&mut self, state: &mut ParseState<'src>) {
        let end = state.lexer.col_number();
        let site = self.err_site(
            state,
            self.operand_str_start,
            end.saturating_sub(self.operand_str_start),
        );
        let mut program = ExprProgram::default();
        for op in self.rel_ops.drain(..) {
            program.push(op);
        }
        self.fixups.push(Fixup { site, program });
    }

    fn on_resolved_expr_post(&mut self, _state: &mut ParseState<'src>) {
        match self.active_directive {
            Some(Directive::Byte) => {
                if let EvalStack::U8(v) = &mut self.eval_stack {
                    let vals = std::mem::take(v);
                    vals.into_iter().for_each(|val| self.add_bytes(val));
                }
            }
            Some(Directive::Byte2) => {
                if let EvalStack::U16(v) = &mut self.eval_stack {
                    let vals = std::mem::take(v);
                    vals.into_iter().for_each(|val| self.add_bytes(val));
                }
            }
            Some(Directive::Byte4) => {
                if let EvalStack::U32(v) = &mut self.eval_stack {
                    let vals = std::mem::take(v);
                    vals.into_iter().for_each(|val| self.add_bytes(val));
                }
            }
            Some(Directive::Byte8) => {
                if let EvalStack::U64(v) = &mut self.eval_stack {
                    let vals = std::mem::take(v);
                    vals.into_iter().for_each(|val| self.add_bytes(val));
                }
            }
            Some(Directive::Float) => {
                if let EvalStack::F32(v) = &mut self.eval_stack {
                    let vals = std::mem::take(v);
                    vals.into_iter().for_each(|val| self.add_bytes(val));
                }
            }
            Some(Directive::Double) => {
                if let EvalStack::F64(v) = &mut self.eval_stack {
                    let vals = std::mem::take(v);
                    vals.into_iter().for_each(|val| self.add_bytes(val));
                }
            }
            _ => {}
        }
    }

    fn on_operator(&mut self, state: &mut ParseState<'src>, operation: AsmOp) {
        match self.mode {
            EvalMode::RelDoublePass => match operation {
                AsmOp::Neg | AsmOp::Not => self.rel_ops.push(ExprOp::Unary(operation)),
                _ => self.rel_ops.push(ExprOp::Binary(operation)),
            },
            EvalMode::AbsSinglePass => {
                let result = match operation {
                    AsmOp::Neg | AsmOp::Not => self.eval_stack.unary(operation),
                    _ => self.eval_stack.binary(operation),
                };
                self.abs_result(state, result);
            }
        }
    }

    fn on_terminal(&mut self, state: &mut ParseState<'src>, terminal: Terminal, tok: &Token<'src>) {
        if terminal == Terminal::Str {
            self.string_lit = tok.text.to_string();
            return;
        }
        match self.mode {
            EvalMode::RelDoublePass => self.eval_terminal_rel(state, terminal, tok),
            EvalMode::AbsSinglePass => self.eval_terminal_abs(state, terminal, tok),
        }
    }

    fn on_hi_addr(&mut self, state: &mut ParseState<'src>, id: &'src str) {
        match self.mode {
            EvalMode::RelDoublePass => {
                let col = state.lexer.col_number();
                let site = self.err_site(state, col, id.len());
                self.rel_ops.push(ExprOp::PushSymbol(SymbolUse {
                    name: id.to_string(),
                    absolute: true,
                    source_address: self.current_address(),
                    site,
                }));
                self.rel_ops.push(ExprOp::HiHalf);
            }
            EvalMode::AbsSinglePass => self.push_symbol_half_abs(state, id, true),
        }
    }

    fn on_lo_addr(&mut self, state: &mut ParseState<'src>, id: &'src str) {
        match self.mode {
            EvalMode::RelDoublePass => {
                let col = state.lexer.col_number();
                let site = self.err_site(state, col, id.len());
                self.rel_ops.push(ExprOp::PushSymbol(SymbolUse {
                    name: id.to_string(),
                    absolute: true,
                    source_address: self.current_address(),
                    site,
                }));
                self.rel_ops.push(ExprOp::LoHalf);
            }
            EvalMode::AbsSinglePass => self.push_symbol_half_abs(state, id, false),
        }
    }

    fn on_close_paren(&mut self, state: &mut ParseState<'src>, kind: ParenKind) {
        if kind != ParenKind::RelConv {
            return;
        }
        let addr = self.current_address();
        match self.mode {
            EvalMode::RelDoublePass => self.rel_ops.push(ExprOp::SubSelf(addr)),
            EvalMode::AbsSinglePass => {
                let result = self.eval_stack.sub_address(addr);
                self.abs_result(state, result);
            }
        }
    }

    fn on_label_decl(&mut self, state: &mut ParseState<'src>, name: &'src str) {
        if self.symset.contains(name) {
            state.emit_error_here(
                AsmErrorKind::Symbol,
                format!("Label/Constant {name} is already defined"),
            );
            return;
        }
        let address = self.current_address();
        self.labels.insert(name.to_string(), address);
        self.symset.insert(name.to_string());
    }

    fn on_var_decl(&mut self, state: &mut ParseState<'src>, name: &'src str) {
        if self.symset.contains(name) {
            state.emit_error_here(
                AsmErrorKind::Symbol,
                format!("Label/Constant {name} is already defined"),
            );
            return;
        }
        self.active_var = Some(name.to_string());
        self.symset.insert(name.to_string());
    }

    fn post_parse_action(&mut self, state: &mut ParseState<'src>) {
        self.run_fixups(state);
    }
}
