// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Deferred-evaluation programs for instruction operands.
//!
//! Instruction operands may reference labels that are not defined yet, so
//! the IR generator records each operand as a small postfix program instead
//! of a value. After the whole source has been parsed, a second pass
//! interprets every program in order; the first failed symbol lookup wins.
//! A flat opcode stream keeps memory deterministic where a stack of
//! closures would not.

use crate::core::error::{AsmError, AsmErrorKind};
use crate::core::parser::AsmOp;

/// What a symbol name resolved to.
#[derive(Debug, Clone, Copy)]
pub enum SymbolValue {
    /// A label: an address within the program being assembled.
    Address(u32),
    /// A `.defvar` constant.
    Constant(u64),
}

pub trait SymbolResolver {
    fn lookup(&self, name: &str) -> Option<SymbolValue>;
}

/// Position info captured when the symbol reference was parsed, used to
/// report an unresolved symbol after the second pass.
#[derive(Debug, Clone)]
pub struct ErrSite {
    pub source_line: String,
    pub line: usize,
    pub col: usize,
    pub len: usize,
}

#[derive(Debug, Clone)]
pub struct SymbolUse {
    pub name: String,
    /// Absolute references yield the symbol value itself; relative ones
    /// yield the distance from the referencing instruction.
    pub absolute: bool,
    pub source_address: u32,
    pub site: ErrSite,
}

#[derive(Debug, Clone)]
pub enum ExprOp {
    PushLit(u32),
    PushSymbol(SymbolUse),
    Binary(AsmOp),
    Unary(AsmOp),
    /// Carry-adjusted high half: `((v >> 16) + ((v >> 15) & 1)) & 0xffff`,
    /// the form `addis`/`addi` pairing expects.
    HiHalf,
    LoHalf,
    /// Rel-conv group: subtract the recorded instruction address.
    SubSelf(u32),
}

#[derive(Debug)]
pub enum VmError {
    /// A symbol failed to resolve; carries the full positioned error.
    Failed(AsmError),
    /// An arithmetic failure with no position of its own; the caller
    /// attaches the operand's span.
    Message(String),
}

#[derive(Debug, Clone, Default)]
pub struct ExprProgram {
    ops: Vec<ExprOp>,
}

impl ExprProgram {
    pub fn push(&mut self, op: ExprOp) {
        self.ops.push(op);
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn evaluate(&self, resolver: &dyn SymbolResolver) -> Result<u32, VmError> {
        let mut stack: Vec<u32> = Vec::with_capacity(4);
        fn pop(stack: &mut Vec<u32>) -> Result<u32, VmError> {
            stack
                .pop()
                .ok_or_else(|| VmError::Message("Internal error: malformed operand expression".to_string()))
        }

        for op in &self.ops {
            match op {
                ExprOp::PushLit(lit) => stack.push(*lit),

                ExprOp::PushSymbol(sym) => match resolver.lookup(&sym.name) {
                    Some(SymbolValue::Address(addr)) => {
                        if sym.absolute {
                            stack.push(addr);
                        } else {
                            stack.push(addr.wrapping_sub(sym.source_address));
                        }
                    }
                    Some(SymbolValue::Constant(val)) => stack.push(val as u32),
                    None => {
                        return Err(VmError::Failed(AsmError::new(
                            AsmErrorKind::Symbol,
                            format!("Unresolved symbol '{}'", sym.name),
                            sym.site.source_line.clone(),
                            sym.site.line,
                            sym.site.col,
                            sym.site.len,
                        )))
                    }
                },

                ExprOp::Binary(op) => {
                    let rhs = pop(&mut stack)?;
                    let lhs = pop(&mut stack)?;
                    stack.push(apply_binary(*op, lhs, rhs)?);
                }

                ExprOp::Unary(op) => {
                    let val = pop(&mut stack)?;
                    stack.push(match op {
                        AsmOp::Neg => val.wrapping_neg(),
                        AsmOp::Not => !val,
                        _ => return Err(VmError::Message(format!("'{op:?}' is not unary"))),
                    });
                }

                ExprOp::HiHalf => {
                    let val = pop(&mut stack)?;
                    stack.push((val >> 16).wrapping_add((val >> 15) & 1) & 0xffff);
                }

                ExprOp::LoHalf => {
                    let val = pop(&mut stack)?;
                    stack.push(val & 0xffff);
                }

                ExprOp::SubSelf(addr) => {
                    let val = pop(&mut stack)?;
                    stack.push(val.wrapping_sub(*addr));
                }
            }
        }

        debug_assert_eq!(stack.len(), 1);
        pop(&mut stack)
    }
}

fn apply_binary(op: AsmOp, lhs: u32, rhs: u32) -> Result<u32, VmError> {
    Ok(match op {
        AsmOp::Or => lhs | rhs,
        AsmOp::Xor => lhs ^ rhs,
        AsmOp::And => lhs & rhs,
        AsmOp::Lsh => {
            if rhs >= 32 {
                0
            } else {
                lhs << rhs
            }
        }
        AsmOp::Rsh => {
            if rhs >= 32 {
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
                return Err(VmError::Message("Division by zero".to_string()));
            }
            lhs / rhs
        }
        AsmOp::Neg | AsmOp::Not => return Err(VmError::Message(format!("'{op:?}' is not binary"))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Symbols {
        labels: HashMap<&'static str, u32>,
    }

    impl SymbolResolver for Symbols {
        fn lookup(&self, name: &str) -> Option<SymbolValue> {
            self.labels.get(name).copied().map(SymbolValue::Address)
        }
    }

    fn site() -> ErrSite {
        ErrSite {
            source_line: "b target".to_string(),
            line: 0,
            col: 2,
            len: 6,
        }
    }

    fn sym(name: &str, absolute: bool, source_address: u32) -> ExprOp {
        ExprOp::PushSymbol(SymbolUse {
            name: name.to_string(),
            absolute,
            source_address,
            site: site(),
        })
    }

    #[test]
    fn relative_symbol_yields_displacement() {
        let symbols = Symbols {
            labels: HashMap::from([("target", 0x8000_3140)]),
        };
        let mut prog = ExprProgram::default();
        prog.push(sym("target", false, 0x8000_3100));
        assert_eq!(prog.evaluate(&symbols).unwrap(), 0x40);
    }

    #[test]
    fn postfix_arithmetic() {
        let symbols = Symbols {
            labels: HashMap::new(),
        };
        let mut prog = ExprProgram::default();
        prog.push(ExprOp::PushLit(6));
        prog.push(ExprOp::PushLit(3));
        prog.push(ExprOp::Binary(AsmOp::Mul));
        prog.push(ExprOp::PushLit(2));
        prog.push(ExprOp::Binary(AsmOp::Sub));
        prog.push(ExprOp::Unary(AsmOp::Neg));
        assert_eq!(prog.evaluate(&symbols).unwrap(), (-16i32) as u32);
    }

    #[test]
    fn hi_half_carries_when_bit15_set() {
        let symbols = Symbols {
            labels: HashMap::from([("data", 0x8041_8000)]),
        };
        let mut prog = ExprProgram::default();
        prog.push(sym("data", true, 0));
        prog.push(ExprOp::HiHalf);
        assert_eq!(prog.evaluate(&symbols).unwrap(), 0x8042);

        let mut prog = ExprProgram::default();
        prog.push(ExprOp::PushLit(0x8041_7fff));
        prog.push(ExprOp::HiHalf);
        assert_eq!(prog.evaluate(&symbols).unwrap(), 0x8041);
    }

    #[test]
    fn unresolved_symbol_reports_site() {
        let symbols = Symbols {
            labels: HashMap::new(),
        };
        let mut prog = ExprProgram::default();
        prog.push(sym("target", false, 0));
        match prog.evaluate(&symbols) {
            Err(VmError::Failed(err)) => {
                assert!(err.message.contains("target"));
                assert_eq!(err.col, 2);
            }
            other => panic!("expected failed lookup, got {other:?}"),
        }
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let symbols = Symbols {
            labels: HashMap::new(),
        };
        let mut prog = ExprProgram::default();
        prog.push(ExprOp::PushLit(1));
        prog.push(ExprOp::PushLit(0));
        prog.push(ExprOp::Binary(AsmOp::Div));
        assert!(matches!(prog.evaluate(&symbols), Err(VmError::Message(_))));
    }
}
