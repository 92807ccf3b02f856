// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Public assembly surface: parse to IR, resolve operands, encode blocks.

pub mod cli;
pub mod irgen;

#[cfg(test)]
mod tests;

use crate::core::error::{AsmError, AsmErrorKind};
use crate::core::parser;
use crate::gekko::encoder;
use crate::gekko::operand::{OperandList, MAX_OPERANDS};
use irgen::{Chunk, GekkoIr, IrBuilder};

/// One contiguous run of output bytes with its load address. Instruction
/// words are big-endian.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub address: u32,
    pub bytes: Vec<u8>,
}

/// Assemble `source` with the first block based at `base_address`.
///
/// Returns the assembled blocks in source order; `.locate`, `.align` and
/// `.skip` start new blocks. On failure the first error is returned and no
/// partial output is produced.
pub fn assemble(source: &str, base_address: u32) -> Result<Vec<Block>, AsmError> {
    let ir = parse_to_ir(source, base_address)?;
    encode_ir(&ir)
}

/// Parse and run operand fix-ups, producing the block/chunk IR.
pub fn parse_to_ir(source: &str, base_address: u32) -> Result<GekkoIr, AsmError> {
    let mut builder = IrBuilder::new(base_address);
    match parser::parse_with_visitor(source, &mut builder) {
        Some(err) => Err(err),
        None => Ok(builder.into_ir()),
    }
}

fn encode_ir(ir: &GekkoIr) -> Result<Vec<Block>, AsmError> {
    let mut blocks = Vec::new();

    for ir_block in &ir.blocks {
        let mut bytes = Vec::new();
        for chunk in &ir_block.chunks {
            match chunk {
                Chunk::Bytes(data) => bytes.extend_from_slice(data),
                Chunk::Pad(count) => bytes.resize(bytes.len() + count, 0),
                Chunk::Insts(insts) => {
                    for inst in insts {
                        let mut vals = [0u32; MAX_OPERANDS];
                        for (slot, val) in ir
                            .operand_pool
                            .iter()
                            .skip(inst.op_index)
                            .take(inst.op_count)
                            .zip(vals.iter_mut())
                        {
                            *val = slot.value;
                        }
                        let ops = OperandList::from_slice(&vals[..inst.op_count.min(MAX_OPERANDS)]);
                        let word = encoder::encode(inst.mnemonic_index, inst.is_extended, &ops)
                            .map_err(|err| {
                                AsmError::new(
                                    AsmErrorKind::Encoding,
                                    err.message,
                                    inst.raw_text.clone(),
                                    inst.line_number,
                                    0,
                                    inst.raw_text.len(),
                                )
                            })?;
                        bytes.extend_from_slice(&word.to_be_bytes());
                    }
                }
            }
        }
        if !bytes.is_empty() {
            blocks.push(Block {
                address: ir_block.address,
                bytes,
            });
        }
    }

    Ok(blocks)
}
