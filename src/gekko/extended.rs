// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Extended (pseudo) mnemonics.
//!
//! Each row names an extended mnemonic, the basic mnemonic it lowers to and
//! the operand transformer that rewrites the parsed operand list into the
//! form the basic mnemonic expects. The transformer set is a closed
//! enumeration so the table stays plain data. Branch rows come in three
//! spellings: bare, `-` (static not-taken hint, the default encoding) and
//! `+` (taken hint, BO y-bit set), per user-manual appendix E.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::gekko::operand::OperandList;
use crate::gekko::table::{
    spr_bitswap, GekkoMnemonic, ParseAlg, ParseInfo, VariantFamily, VARIANT_PERMUTATIONS,
};

/// Operand rewrites used by extended mnemonics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Xform {
    /// `subi rD, rA, v` -> `addi rD, rA, -v`
    NegSimm,
    /// `sub rD, rA, rB` -> `subf rD, rB, rA` (also `la`'s `d(rA)` flip)
    SwapAB,
    /// `cmpwi [crf,] rA, v` -> `cmpi crf, 0, rA, v`
    CmpWordMode,
    /// Insert a constant before `at`.
    Insert { at: usize, val: u32 },
    /// Insert BO at 0 and BI at 1 (counter-only branches).
    FillBoBi { bo: u32, bi: u32 },
    /// Condition branches: default the cr field, scale it to a bit index,
    /// add the condition bit and prepend BO.
    CondBranch { bo: u32, cond: u32, params: usize },
    /// `tw`/`twi` sugar: prepend the TO mask.
    TrapTo(u32),
    /// `trap` -> `tw 31, 0, 0`
    Trap,
    /// `nop` -> `ori 0, 0, 0`
    Nop,
    /// `crset crbD` -> `creqv crbD, crbD, crbD`
    CrSame,
    /// `crmove crbD, crbA` -> `cror crbD, crbA, crbA` (also `mr`, `not`)
    DupOp1At2,
    /// `mtsprg n, rS` / `mfsprg rD, n`: fold the register number into the
    /// bit-swapped SPRG base.
    SprgAt(usize),
    /// BAT pseudo-ops: fold the pair number into the bit-swapped SPR
    /// (`spr = base + 2n`, swapped as a whole).
    BatSprAt { at: usize, base: u32 },
    /// `mtspr`/`mfspr`/`mftb`: bit-swap the caller's SPR value in place.
    BitswapAt(usize),
    /// Rotate-and-mask sugar over `rlwinm`/`rlwimi`/`rlwnm`.
    Extlwi,
    Extrwi,
    Inslwi,
    Insrwi,
    Rotlwi,
    Rotrwi,
    Rotlw,
    Slwi,
    Srwi,
    Clrlwi,
    Clrrwi,
    Clrlslwi,
}

impl Xform {
    pub fn apply(self, ops: &mut OperandList) {
        match self {
            Xform::NegSimm => ops[2] = ops[2].wrapping_neg(),

            Xform::SwapAB => {
                let tmp = ops[1];
                ops[1] = ops[2];
                ops[2] = tmp;
            }

            Xform::CmpWordMode => {
                if ops.count() == 2 {
                    ops.insert(0, 0);
                }
                ops.insert(1, 0);
            }

            Xform::Insert { at, val } => ops.insert(at, val),

            Xform::FillBoBi { bo, bi } => {
                ops.insert(0, bo);
                ops.insert(1, bi);
            }

            Xform::CondBranch { bo, cond, params } => {
                if ops.count() < params {
                    ops.insert(0, 0);
                }
                ops[0] = (ops[0] << 2) | cond;
                ops.insert(0, bo);
            }

            Xform::TrapTo(to) => ops.insert(0, to),

            Xform::Trap => {
                ops.insert(0, 31);
                ops.insert(1, 0);
                ops.insert(2, 0);
            }

            Xform::Nop => {
                ops.insert(0, 0);
                ops.insert(1, 0);
                ops.insert(2, 0);
            }

            Xform::CrSame => {
                let crb = ops[0];
                ops.insert(1, crb);
                ops.insert(2, crb);
            }

            Xform::DupOp1At2 => {
                let src = ops[1];
                ops.insert(2, src);
            }

            Xform::SprgAt(at) => ops[at] = spr_bitswap(ops[at].wrapping_add(272)),

            Xform::BatSprAt { at, base } => {
                ops[at] = spr_bitswap(base.wrapping_add(2 * ops[at]));
            }

            Xform::BitswapAt(at) => ops[at] = spr_bitswap(ops[at]),

            Xform::Extlwi => {
                let (n, b) = (ops[2], ops[3]);
                ops[2] = b;
                ops[3] = 0;
                ops.insert(4, n.wrapping_sub(1));
            }
            Xform::Extrwi => {
                let (n, b) = (ops[2], ops[3]);
                ops[2] = b.wrapping_add(n);
                ops[3] = 32u32.wrapping_sub(n);
                ops.insert(4, 31);
            }
            Xform::Inslwi => {
                let (n, b) = (ops[2], ops[3]);
                ops[2] = 32u32.wrapping_sub(b);
                ops[3] = b;
                ops.insert(4, b.wrapping_add(n).wrapping_sub(1));
            }
            Xform::Insrwi => {
                let (n, b) = (ops[2], ops[3]);
                ops[2] = 32u32.wrapping_sub(b.wrapping_add(n));
                ops[3] = b;
                ops.insert(4, b.wrapping_add(n).wrapping_sub(1));
            }
            Xform::Rotlwi => {
                ops.insert(3, 0);
                ops.insert(4, 31);
            }
            Xform::Rotrwi => {
                let n = ops[2];
                ops[2] = 32u32.wrapping_sub(n);
                ops.insert(3, 0);
                ops.insert(4, 31);
            }
            Xform::Rotlw => {
                ops.insert(3, 0);
                ops.insert(4, 31);
            }
            Xform::Slwi => {
                let n = ops[2];
                ops.insert(3, 0);
                ops.insert(4, 31u32.wrapping_sub(n));
            }
            Xform::Srwi => {
                let n = ops[2];
                ops[2] = 32u32.wrapping_sub(n);
                ops.insert(3, n);
                ops.insert(4, 31);
            }
            Xform::Clrlwi => {
                let n = ops[2];
                ops[2] = 0;
                ops.insert(3, n);
                ops.insert(4, 31);
            }
            Xform::Clrrwi => {
                let n = ops[2];
                ops[2] = 0;
                ops.insert(3, 0);
                ops.insert(4, 31u32.wrapping_sub(n));
            }
            Xform::Clrlslwi => {
                let (b, n) = (ops[2], ops[3]);
                ops[2] = n;
                ops[3] = b.wrapping_sub(n);
                ops.insert(4, 31u32.wrapping_sub(n));
            }
        }
    }
}

pub struct ExtendedRow {
    pub name: &'static str,
    pub family: VariantFamily,
    pub alg: ParseAlg,
    pub base: GekkoMnemonic,
    pub xform: Xform,
}

/// Descriptor resolved from an extended mnemonic-variant index: the basic
/// mnemonic-variant index to encode as, and the operand transformer.
#[derive(Debug, Clone, Copy)]
pub struct ExtMnemonicDesc {
    pub mnemonic_index: usize,
    pub xform: Xform,
}

pub fn ext_mnemonic_desc(index: usize) -> Option<ExtMnemonicDesc> {
    let row = EXTENDED.get(index / VARIANT_PERMUTATIONS)?;
    let variant = index % VARIANT_PERMUTATIONS;
    row.family.variant_bits(variant)?;
    Some(ExtMnemonicDesc {
        mnemonic_index: row.base.index() + variant,
        xform: row.xform,
    })
}

pub fn extended_row(index: usize) -> Option<&'static ExtendedRow> {
    EXTENDED.get(index / VARIANT_PERMUTATIONS)
}

macro_rules! ext {
    ($name:literal, $family:ident, $alg:ident, $base:ident, $xform:expr) => {
        ExtendedRow {
            name: $name,
            family: VariantFamily::$family,
            alg: ParseAlg::$alg,
            base: GekkoMnemonic::$base,
            xform: $xform,
        }
    };
}

macro_rules! bo {
    ($val:literal) => {
        Xform::Insert { at: 0, val: $val }
    };
}

macro_rules! bobi {
    ($bo:literal, $bi:literal) => {
        Xform::FillBoBi { bo: $bo, bi: $bi }
    };
}

macro_rules! cond {
    ($bo:literal, $cond:literal, $params:literal) => {
        Xform::CondBranch {
            bo: $bo,
            cond: $cond,
            params: $params,
        }
    };
}

#[rustfmt::skip]
pub static EXTENDED: [ExtendedRow; 265] = [
    // E.2.1 subtract immediate
    ext!("subi", Plain, Op3, Addi, Xform::NegSimm),
    ext!("subis", Plain, Op3, Addis, Xform::NegSimm),
    ext!("subic", Plain, Op3, Addic, Xform::NegSimm),
    ext!("subic.", Plain, Op3, AddicDot, Xform::NegSimm),

    // E.2.2 subtract
    ext!("sub", OeRc, Op3, Subf, Xform::SwapAB),
    ext!("subc", OeRc, Op3, Subfc, Xform::SwapAB),

    // E.3.2 word compares
    ext!("cmpwi", Plain, Op2Or3, Cmpi, Xform::CmpWordMode),
    ext!("cmpw", Plain, Op2Or3, Cmp, Xform::CmpWordMode),
    ext!("cmplwi", Plain, Op2Or3, Cmpli, Xform::CmpWordMode),
    ext!("cmplw", Plain, Op2Or3, Cmpl, Xform::CmpWordMode),

    // E.4.2 rotate/shift sugar
    ext!("extlwi", Rc, Op4, Rlwinm, Xform::Extlwi),
    ext!("extrwi", Rc, Op4, Rlwinm, Xform::Extrwi),
    ext!("inslwi", Rc, Op4, Rlwimi, Xform::Inslwi),
    ext!("insrwi", Rc, Op4, Rlwimi, Xform::Insrwi),
    ext!("rotlwi", Rc, Op3, Rlwinm, Xform::Rotlwi),
    ext!("rotrwi", Rc, Op3, Rlwinm, Xform::Rotrwi),
    ext!("rotlw", Rc, Op3, Rlwnm, Xform::Rotlw),
    ext!("slwi", Rc, Op3, Rlwinm, Xform::Slwi),
    ext!("srwi", Rc, Op3, Rlwinm, Xform::Srwi),
    ext!("clrlwi", Rc, Op3, Rlwinm, Xform::Clrlwi),
    ext!("clrrwi", Rc, Op3, Rlwinm, Xform::Clrrwi),
    ext!("clrlslwi", Rc, Op4, Rlwinm, Xform::Clrlslwi),

    // E.5.2 condition-bit and counter branches
    ext!("bt", AaLk, Op2, Bc, bo!(12)),
    ext!("bf", AaLk, Op2, Bc, bo!(4)),
    ext!("bdnz", AaLk, Op1, Bc, bobi!(16, 0)),
    ext!("bdnzt", AaLk, Op2, Bc, bo!(8)),
    ext!("bdnzf", AaLk, Op2, Bc, bo!(0)),
    ext!("bdz", AaLk, Op1, Bc, bobi!(18, 0)),
    ext!("bdzt", AaLk, Op2, Bc, bo!(10)),
    ext!("bdzf", AaLk, Op2, Bc, bo!(2)),
    ext!("bt-", AaLk, Op2, Bc, bo!(12)),
    ext!("bf-", AaLk, Op2, Bc, bo!(4)),
    ext!("bdnz-", AaLk, Op1, Bc, bobi!(16, 0)),
    ext!("bdnzt-", AaLk, Op2, Bc, bo!(8)),
    ext!("bdnzf-", AaLk, Op2, Bc, bo!(0)),
    ext!("bdz-", AaLk, Op1, Bc, bobi!(18, 0)),
    ext!("bdzt-", AaLk, Op2, Bc, bo!(10)),
    ext!("bdzf-", AaLk, Op2, Bc, bo!(2)),
    ext!("bt+", AaLk, Op2, Bc, bo!(13)),
    ext!("bf+", AaLk, Op2, Bc, bo!(5)),
    ext!("bdnz+", AaLk, Op1, Bc, bobi!(17, 0)),
    ext!("bdnzt+", AaLk, Op2, Bc, bo!(9)),
    ext!("bdnzf+", AaLk, Op2, Bc, bo!(1)),
    ext!("bdz+", AaLk, Op1, Bc, bobi!(19, 0)),
    ext!("bdzt+", AaLk, Op2, Bc, bo!(11)),
    ext!("bdzf+", AaLk, Op2, Bc, bo!(3)),

    ext!("blr", Lk, None, Bclr, bobi!(20, 0)),
    ext!("bctr", Lk, None, Bcctr, bobi!(20, 0)),
    ext!("btlr", Lk, Op1, Bclr, bo!(12)),
    ext!("btctr", Lk, Op1, Bcctr, bo!(12)),
    ext!("bflr", Lk, Op1, Bclr, bo!(4)),
    ext!("bfctr", Lk, Op1, Bcctr, bo!(4)),
    ext!("bdnzlr", Lk, None, Bclr, bobi!(16, 0)),
    ext!("bdnztlr", Lk, Op1, Bclr, bo!(8)),
    ext!("bdnzflr", Lk, Op1, Bclr, bo!(0)),
    ext!("bdzlr", Lk, None, Bclr, bobi!(18, 0)),
    ext!("bdztlr", Lk, Op1, Bclr, bo!(10)),
    ext!("bdzflr", Lk, Op1, Bclr, bo!(2)),
    ext!("btlr-", Lk, Op1, Bclr, bo!(12)),
    ext!("btctr-", Lk, Op1, Bcctr, bo!(12)),
    ext!("bflr-", Lk, Op1, Bclr, bo!(4)),
    ext!("bfctr-", Lk, Op1, Bcctr, bo!(4)),
    ext!("bdnzlr-", Lk, None, Bclr, bobi!(16, 0)),
    ext!("bdnztlr-", Lk, Op1, Bclr, bo!(8)),
    ext!("bdnzflr-", Lk, Op1, Bclr, bo!(0)),
    ext!("bdzlr-", Lk, None, Bclr, bobi!(18, 0)),
    ext!("bdztlr-", Lk, Op1, Bclr, bo!(10)),
    ext!("bdzflr-", Lk, Op1, Bclr, bo!(2)),
    ext!("btlr+", Lk, Op1, Bclr, bo!(13)),
    ext!("btctr+", Lk, Op1, Bcctr, bo!(13)),
    ext!("bflr+", Lk, Op1, Bclr, bo!(5)),
    ext!("bfctr+", Lk, Op1, Bcctr, bo!(5)),
    ext!("bdnzlr+", Lk, None, Bclr, bobi!(17, 0)),
    ext!("bdnztlr+", Lk, Op1, Bclr, bo!(9)),
    ext!("bdnzflr+", Lk, Op1, Bclr, bo!(1)),
    ext!("bdzlr+", Lk, None, Bclr, bobi!(19, 0)),
    ext!("bdztlr+", Lk, Op1, Bclr, bo!(11)),
    ext!("bdzflr+", Lk, Op1, Bclr, bo!(3)),

    // E.5.3 condition branches
    ext!("blt", AaLk, Op1Or2, Bc, cond!(12, 0, 2)),
    ext!("ble", AaLk, Op1Or2, Bc, cond!(4, 1, 2)),
    ext!("beq", AaLk, Op1Or2, Bc, cond!(12, 2, 2)),
    ext!("bge", AaLk, Op1Or2, Bc, cond!(4, 0, 2)),
    ext!("bgt", AaLk, Op1Or2, Bc, cond!(12, 1, 2)),
    ext!("bnl", AaLk, Op1Or2, Bc, cond!(4, 0, 2)),
    ext!("bne", AaLk, Op1Or2, Bc, cond!(4, 2, 2)),
    ext!("bng", AaLk, Op1Or2, Bc, cond!(4, 1, 2)),
    ext!("bso", AaLk, Op1Or2, Bc, cond!(12, 3, 2)),
    ext!("bns", AaLk, Op1Or2, Bc, cond!(4, 3, 2)),
    ext!("bun", AaLk, Op1Or2, Bc, cond!(12, 3, 2)),
    ext!("bnu", AaLk, Op1Or2, Bc, cond!(4, 3, 2)),
    ext!("blt-", AaLk, Op1Or2, Bc, cond!(12, 0, 2)),
    ext!("ble-", AaLk, Op1Or2, Bc, cond!(4, 1, 2)),
    ext!("beq-", AaLk, Op1Or2, Bc, cond!(12, 2, 2)),
    ext!("bge-", AaLk, Op1Or2, Bc, cond!(4, 0, 2)),
    ext!("bgt-", AaLk, Op1Or2, Bc, cond!(12, 1, 2)),
    ext!("bnl-", AaLk, Op1Or2, Bc, cond!(4, 0, 2)),
    ext!("bne-", AaLk, Op1Or2, Bc, cond!(4, 2, 2)),
    ext!("bng-", AaLk, Op1Or2, Bc, cond!(4, 1, 2)),
    ext!("bso-", AaLk, Op1Or2, Bc, cond!(12, 3, 2)),
    ext!("bns-", AaLk, Op1Or2, Bc, cond!(4, 3, 2)),
    ext!("bun-", AaLk, Op1Or2, Bc, cond!(12, 3, 2)),
    ext!("bnu-", AaLk, Op1Or2, Bc, cond!(4, 3, 2)),
    ext!("blt+", AaLk, Op1Or2, Bc, cond!(13, 0, 2)),
    ext!("ble+", AaLk, Op1Or2, Bc, cond!(5, 1, 2)),
    ext!("beq+", AaLk, Op1Or2, Bc, cond!(13, 2, 2)),
    ext!("bge+", AaLk, Op1Or2, Bc, cond!(5, 0, 2)),
    ext!("bgt+", AaLk, Op1Or2, Bc, cond!(13, 1, 2)),
    ext!("bnl+", AaLk, Op1Or2, Bc, cond!(5, 0, 2)),
    ext!("bne+", AaLk, Op1Or2, Bc, cond!(5, 2, 2)),
    ext!("bng+", AaLk, Op1Or2, Bc, cond!(5, 1, 2)),
    ext!("bso+", AaLk, Op1Or2, Bc, cond!(13, 3, 2)),
    ext!("bns+", AaLk, Op1Or2, Bc, cond!(5, 3, 2)),
    ext!("bun+", AaLk, Op1Or2, Bc, cond!(13, 3, 2)),
    ext!("bnu+", AaLk, Op1Or2, Bc, cond!(5, 3, 2)),

    ext!("bltlr", Lk, NoneOrOp1, Bclr, cond!(12, 0, 1)),
    ext!("bltctr", Lk, NoneOrOp1, Bcctr, cond!(12, 0, 1)),
    ext!("blelr", Lk, NoneOrOp1, Bclr, cond!(4, 1, 1)),
    ext!("blectr", Lk, NoneOrOp1, Bcctr, cond!(4, 1, 1)),
    ext!("beqlr", Lk, NoneOrOp1, Bclr, cond!(12, 2, 1)),
    ext!("beqctr", Lk, NoneOrOp1, Bcctr, cond!(12, 2, 1)),
    ext!("bgelr", Lk, NoneOrOp1, Bclr, cond!(4, 0, 1)),
    ext!("bgectr", Lk, NoneOrOp1, Bcctr, cond!(4, 0, 1)),
    ext!("bgtlr", Lk, NoneOrOp1, Bclr, cond!(12, 1, 1)),
    ext!("bgtctr", Lk, NoneOrOp1, Bcctr, cond!(12, 1, 1)),
    ext!("bnllr", Lk, NoneOrOp1, Bclr, cond!(4, 0, 1)),
    ext!("bnlctr", Lk, NoneOrOp1, Bcctr, cond!(4, 0, 1)),
    ext!("bnelr", Lk, NoneOrOp1, Bclr, cond!(4, 2, 1)),
    ext!("bnectr", Lk, NoneOrOp1, Bcctr, cond!(4, 2, 1)),
    ext!("bnglr", Lk, NoneOrOp1, Bclr, cond!(4, 1, 1)),
    ext!("bngctr", Lk, NoneOrOp1, Bcctr, cond!(4, 1, 1)),
    ext!("bsolr", Lk, NoneOrOp1, Bclr, cond!(12, 3, 1)),
    ext!("bsoctr", Lk, NoneOrOp1, Bcctr, cond!(12, 3, 1)),
    ext!("bnslr", Lk, NoneOrOp1, Bclr, cond!(4, 3, 1)),
    ext!("bnsctr", Lk, NoneOrOp1, Bcctr, cond!(4, 3, 1)),
    ext!("bunlr", Lk, NoneOrOp1, Bclr, cond!(12, 3, 1)),
    ext!("bunctr", Lk, NoneOrOp1, Bcctr, cond!(12, 3, 1)),
    ext!("bnulr", Lk, NoneOrOp1, Bclr, cond!(4, 3, 1)),
    ext!("bnuctr", Lk, NoneOrOp1, Bcctr, cond!(4, 3, 1)),
    ext!("bltlr-", Lk, NoneOrOp1, Bclr, cond!(12, 0, 1)),
    ext!("bltctr-", Lk, NoneOrOp1, Bcctr, cond!(12, 0, 1)),
    ext!("blelr-", Lk, NoneOrOp1, Bclr, cond!(4, 1, 1)),
    ext!("blectr-", Lk, NoneOrOp1, Bcctr, cond!(4, 1, 1)),
    ext!("beqlr-", Lk, NoneOrOp1, Bclr, cond!(12, 2, 1)),
    ext!("beqctr-", Lk, NoneOrOp1, Bcctr, cond!(12, 2, 1)),
    ext!("bgelr-", Lk, NoneOrOp1, Bclr, cond!(4, 0, 1)),
    ext!("bgectr-", Lk, NoneOrOp1, Bcctr, cond!(4, 0, 1)),
    ext!("bgtlr-", Lk, NoneOrOp1, Bclr, cond!(12, 1, 1)),
    ext!("bgtctr-", Lk, NoneOrOp1, Bcctr, cond!(12, 1, 1)),
    ext!("bnllr-", Lk, NoneOrOp1, Bclr, cond!(4, 0, 1)),
    ext!("bnlctr-", Lk, NoneOrOp1, Bcctr, cond!(4, 0, 1)),
    ext!("bnelr-", Lk, NoneOrOp1, Bclr, cond!(4, 2, 1)),
    ext!("bnectr-", Lk, NoneOrOp1, Bcctr, cond!(4, 2, 1)),
    ext!("bnglr-", Lk, NoneOrOp1, Bclr, cond!(4, 1, 1)),
    ext!("bngctr-", Lk, NoneOrOp1, Bcctr, cond!(4, 1, 1)),
    ext!("bsolr-", Lk, NoneOrOp1, Bclr, cond!(12, 3, 1)),
    ext!("bsoctr-", Lk, NoneOrOp1, Bcctr, cond!(12, 3, 1)),
    ext!("bnslr-", Lk, NoneOrOp1, Bclr, cond!(4, 3, 1)),
    ext!("bnsctr-", Lk, NoneOrOp1, Bcctr, cond!(4, 3, 1)),
    ext!("bunlr-", Lk, NoneOrOp1, Bclr, cond!(12, 3, 1)),
    ext!("bunctr-", Lk, NoneOrOp1, Bcctr, cond!(12, 3, 1)),
    ext!("bnulr-", Lk, NoneOrOp1, Bclr, cond!(4, 3, 1)),
    ext!("bnuctr-", Lk, NoneOrOp1, Bcctr, cond!(4, 3, 1)),
    ext!("bltlr+", Lk, NoneOrOp1, Bclr, cond!(13, 0, 1)),
    ext!("bltctr+", Lk, NoneOrOp1, Bcctr, cond!(13, 0, 1)),
    ext!("blelr+", Lk, NoneOrOp1, Bclr, cond!(5, 1, 1)),
    ext!("blectr+", Lk, NoneOrOp1, Bcctr, cond!(5, 1, 1)),
    ext!("beqlr+", Lk, NoneOrOp1, Bclr, cond!(13, 2, 1)),
    ext!("beqctr+", Lk, NoneOrOp1, Bcctr, cond!(13, 2, 1)),
    ext!("bgelr+", Lk, NoneOrOp1, Bclr, cond!(5, 0, 1)),
    ext!("bgectr+", Lk, NoneOrOp1, Bcctr, cond!(5, 0, 1)),
    ext!("bgtlr+", Lk, NoneOrOp1, Bclr, cond!(13, 1, 1)),
    ext!("bgtctr+", Lk, NoneOrOp1, Bcctr, cond!(13, 1, 1)),
    ext!("bnllr+", Lk, NoneOrOp1, Bclr, cond!(5, 0, 1)),
    ext!("bnlctr+", Lk, NoneOrOp1, Bcctr, cond!(5, 0, 1)),
    ext!("bnelr+", Lk, NoneOrOp1, Bclr, cond!(5, 2, 1)),
    ext!("bnectr+", Lk, NoneOrOp1, Bcctr, cond!(5, 2, 1)),
    ext!("bnglr+", Lk, NoneOrOp1, Bclr, cond!(5, 1, 1)),
    ext!("bngctr+", Lk, NoneOrOp1, Bcctr, cond!(5, 1, 1)),
    ext!("bsolr+", Lk, NoneOrOp1, Bclr, cond!(13, 3, 1)),
    ext!("bsoctr+", Lk, NoneOrOp1, Bcctr, cond!(13, 3, 1)),
    ext!("bnslr+", Lk, NoneOrOp1, Bclr, cond!(5, 3, 1)),
    ext!("bnsctr+", Lk, NoneOrOp1, Bcctr, cond!(5, 3, 1)),
    ext!("bunlr+", Lk, NoneOrOp1, Bclr, cond!(13, 3, 1)),
    ext!("bunctr+", Lk, NoneOrOp1, Bcctr, cond!(13, 3, 1)),
    ext!("bnulr+", Lk, NoneOrOp1, Bclr, cond!(5, 3, 1)),
    ext!("bnuctr+", Lk, NoneOrOp1, Bcctr, cond!(5, 3, 1)),

    // E.6 condition-register sugar
    ext!("crset", Plain, Op1, Creqv, Xform::CrSame),
    ext!("crclr", Plain, Op1, Crxor, Xform::CrSame),
    ext!("crmove", Plain, Op2, Cror, Xform::DupOp1At2),
    ext!("crnot", Plain, Op2, Crnor, Xform::DupOp1At2),

    // E.7 traps
    ext!("twlt", Plain, Op2, Tw, Xform::TrapTo(16)),
    ext!("twlti", Plain, Op2, Twi, Xform::TrapTo(16)),
    ext!("twle", Plain, Op2, Tw, Xform::TrapTo(20)),
    ext!("twlei", Plain, Op2, Twi, Xform::TrapTo(20)),
    ext!("tweq", Plain, Op2, Tw, Xform::TrapTo(4)),
    ext!("tweqi", Plain, Op2, Twi, Xform::TrapTo(4)),
    ext!("twge", Plain, Op2, Tw, Xform::TrapTo(12)),
    ext!("twgei", Plain, Op2, Twi, Xform::TrapTo(12)),
    ext!("twgt", Plain, Op2, Tw, Xform::TrapTo(8)),
    ext!("twgti", Plain, Op2, Twi, Xform::TrapTo(8)),
    ext!("twnl", Plain, Op2, Tw, Xform::TrapTo(12)),
    ext!("twnli", Plain, Op2, Twi, Xform::TrapTo(12)),
    ext!("twne", Plain, Op2, Tw, Xform::TrapTo(24)),
    ext!("twnei", Plain, Op2, Twi, Xform::TrapTo(24)),
    ext!("twng", Plain, Op2, Tw, Xform::TrapTo(20)),
    ext!("twngi", Plain, Op2, Twi, Xform::TrapTo(20)),
    ext!("twllt", Plain, Op2, Tw, Xform::TrapTo(2)),
    ext!("twllti", Plain, Op2, Twi, Xform::TrapTo(2)),
    ext!("twlle", Plain, Op2, Tw, Xform::TrapTo(6)),
    ext!("twllei", Plain, Op2, Twi, Xform::TrapTo(6)),
    ext!("twlge", Plain, Op2, Tw, Xform::TrapTo(5)),
    ext!("twlgei", Plain, Op2, Twi, Xform::TrapTo(5)),
    ext!("twlgt", Plain, Op2, Tw, Xform::TrapTo(1)),
    ext!("twlgti", Plain, Op2, Twi, Xform::TrapTo(1)),
    ext!("twlnl", Plain, Op2, Tw, Xform::TrapTo(5)),
    ext!("twlnli", Plain, Op2, Twi, Xform::TrapTo(5)),
    ext!("twlng", Plain, Op2, Tw, Xform::TrapTo(6)),
    ext!("twlngi", Plain, Op2, Twi, Xform::TrapTo(6)),
    ext!("trap", Plain, None, Tw, Xform::Trap),

    // E.8 special-purpose register moves
    ext!("mtxer", Plain, Op1, MtsprNobitswap, Xform::Insert { at: 0, val: spr_bitswap(1) }),
    ext!("mfxer", Plain, Op1, MfsprNobitswap, Xform::Insert { at: 1, val: spr_bitswap(1) }),
    ext!("mtlr", Plain, Op1, MtsprNobitswap, Xform::Insert { at: 0, val: spr_bitswap(8) }),
    ext!("mflr", Plain, Op1, MfsprNobitswap, Xform::Insert { at: 1, val: spr_bitswap(8) }),
    ext!("mtctr", Plain, Op1, MtsprNobitswap, Xform::Insert { at: 0, val: spr_bitswap(9) }),
    ext!("mfctr", Plain, Op1, MfsprNobitswap, Xform::Insert { at: 1, val: spr_bitswap(9) }),
    ext!("mtdsisr", Plain, Op1, MtsprNobitswap, Xform::Insert { at: 0, val: spr_bitswap(18) }),
    ext!("mfdsisr", Plain, Op1, MfsprNobitswap, Xform::Insert { at: 1, val: spr_bitswap(18) }),
    ext!("mtdar", Plain, Op1, MtsprNobitswap, Xform::Insert { at: 0, val: spr_bitswap(19) }),
    ext!("mfdar", Plain, Op1, MfsprNobitswap, Xform::Insert { at: 1, val: spr_bitswap(19) }),
    ext!("mtdec", Plain, Op1, MtsprNobitswap, Xform::Insert { at: 0, val: spr_bitswap(22) }),
    ext!("mfdec", Plain, Op1, MfsprNobitswap, Xform::Insert { at: 1, val: spr_bitswap(22) }),
    ext!("mtsdr1", Plain, Op1, MtsprNobitswap, Xform::Insert { at: 0, val: spr_bitswap(25) }),
    ext!("mfsdr1", Plain, Op1, MfsprNobitswap, Xform::Insert { at: 1, val: spr_bitswap(25) }),
    ext!("mtsrr0", Plain, Op1, MtsprNobitswap, Xform::Insert { at: 0, val: spr_bitswap(26) }),
    ext!("mfsrr0", Plain, Op1, MfsprNobitswap, Xform::Insert { at: 1, val: spr_bitswap(26) }),
    ext!("mtsrr1", Plain, Op1, MtsprNobitswap, Xform::Insert { at: 0, val: spr_bitswap(27) }),
    ext!("mfsrr1", Plain, Op1, MfsprNobitswap, Xform::Insert { at: 1, val: spr_bitswap(27) }),
    ext!("mtasr", Plain, Op1, MtsprNobitswap, Xform::Insert { at: 0, val: spr_bitswap(280) }),
    ext!("mfasr", Plain, Op1, MfsprNobitswap, Xform::Insert { at: 1, val: spr_bitswap(280) }),
    ext!("mtear", Plain, Op1, MtsprNobitswap, Xform::Insert { at: 0, val: spr_bitswap(282) }),
    ext!("mfear", Plain, Op1, MfsprNobitswap, Xform::Insert { at: 1, val: spr_bitswap(282) }),
    ext!("mttbl", Plain, Op1, MtsprNobitswap, Xform::Insert { at: 0, val: spr_bitswap(284) }),
    ext!("mftbl", Plain, Op1, MfsprNobitswap, Xform::Insert { at: 1, val: spr_bitswap(268) }),
    ext!("mttbu", Plain, Op1, MtsprNobitswap, Xform::Insert { at: 0, val: spr_bitswap(285) }),
    ext!("mftbu", Plain, Op1, MfsprNobitswap, Xform::Insert { at: 1, val: spr_bitswap(269) }),
    ext!("mtsprg", Plain, Op2, MtsprNobitswap, Xform::SprgAt(0)),
    ext!("mfsprg", Plain, Op2, MfsprNobitswap, Xform::SprgAt(1)),
    ext!("mtibatu", Plain, Op2, MtsprNobitswap, Xform::BatSprAt { at: 0, base: 528 }),
    ext!("mfibatu", Plain, Op2, MfsprNobitswap, Xform::BatSprAt { at: 1, base: 528 }),
    ext!("mtibatl", Plain, Op2, MtsprNobitswap, Xform::BatSprAt { at: 0, base: 529 }),
    ext!("mfibatl", Plain, Op2, MfsprNobitswap, Xform::BatSprAt { at: 1, base: 529 }),
    ext!("mtdbatu", Plain, Op2, MtsprNobitswap, Xform::BatSprAt { at: 0, base: 536 }),
    ext!("mfdbatu", Plain, Op2, MfsprNobitswap, Xform::BatSprAt { at: 1, base: 536 }),
    ext!("mtdbatl", Plain, Op2, MtsprNobitswap, Xform::BatSprAt { at: 0, base: 537 }),
    ext!("mfdbatl", Plain, Op2, MfsprNobitswap, Xform::BatSprAt { at: 1, base: 537 }),

    // E.9 recommended simplified mnemonics
    ext!("nop", Plain, None, Ori, Xform::Nop),
    ext!("li", Plain, Op2, Addi, Xform::Insert { at: 1, val: 0 }),
    ext!("lis", Plain, Op2, Addis, Xform::Insert { at: 1, val: 0 }),
    ext!("la", Plain, Op1Off1, Addi, Xform::SwapAB),
    ext!("mr", Rc, Op2, Or, Xform::DupOp1At2),
    ext!("not", Rc, Op2, Nor, Xform::DupOp1At2),
    ext!("mtcr", Plain, Op1, Mtcrf, Xform::Insert { at: 0, val: 0xff }),

    // Generic SPR moves taking a numeric (or named) SPR operand
    ext!("mfspr", Plain, Op2, MfsprNobitswap, Xform::BitswapAt(1)),
    ext!("mftb", Plain, Op2, MftbNobitswap, Xform::BitswapAt(1)),
    ext!("mtspr", Plain, Op2, MtsprNobitswap, Xform::BitswapAt(0)),
];

/// Extended mnemonic names (with variant suffixes) to their parse info.
pub fn extended_tokens() -> &'static HashMap<String, ParseInfo> {
    static MAP: OnceLock<HashMap<String, ParseInfo>> = OnceLock::new();
    MAP.get_or_init(|| {
        let mut map = HashMap::new();
        for (row_index, row) in EXTENDED.iter().enumerate() {
            for &(suffix, variant) in row.family.suffixes() {
                map.insert(
                    format!("{}{}", row.name, suffix),
                    ParseInfo {
                        index: row_index * VARIANT_PERMUTATIONS + variant,
                        alg: row.alg,
                    },
                );
            }
        }
        map
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gekko::table::mnemonic_desc;

    fn lower(name: &str, operands: &[u32]) -> (usize, OperandList) {
        let info = extended_tokens().get(name).expect("known extended");
        let desc = ext_mnemonic_desc(info.index).expect("valid variant");
        let mut ops = OperandList::from_slice(operands);
        desc.xform.apply(&mut ops);
        (desc.mnemonic_index, ops)
    }

    #[test]
    fn mr_lowers_to_or_with_duplicated_source() {
        let (index, ops) = lower("mr", &[5, 6]);
        assert_eq!(index, GekkoMnemonic::Or.index());
        assert_eq!(ops.as_slice(), &[5, 6, 6]);
    }

    #[test]
    fn subi_negates_the_immediate() {
        let (index, ops) = lower("subi", &[3, 4, 1]);
        assert_eq!(index, GekkoMnemonic::Addi.index());
        assert_eq!(ops.as_slice(), &[3, 4, 0xffff_ffff]);
    }

    #[test]
    fn cmpwi_defaults_the_cr_field() {
        let (_, ops) = lower("cmpwi", &[4, 100]);
        assert_eq!(ops.as_slice(), &[0, 0, 4, 100]);
        let (_, ops) = lower("cmpwi", &[3, 4, 100]);
        assert_eq!(ops.as_slice(), &[3, 0, 4, 100]);
    }

    #[test]
    fn blt_scales_the_cr_field() {
        let (index, ops) = lower("blt", &[0x40]);
        assert_eq!(index, GekkoMnemonic::Bc.index());
        assert_eq!(ops.as_slice(), &[12, 0, 0x40]);
        let (_, ops) = lower("blt", &[1, 0x40]);
        assert_eq!(ops.as_slice(), &[12, 4, 0x40]);
    }

    #[test]
    fn predict_hint_bumps_bo() {
        let (_, ops) = lower("blt+", &[0x40]);
        assert_eq!(ops.as_slice(), &[13, 0, 0x40]);
        let (_, ops) = lower("bdnz+", &[0x40]);
        assert_eq!(ops.as_slice(), &[17, 0, 0x40]);
    }

    #[test]
    fn link_variant_carries_into_base() {
        let info = extended_tokens().get("blrl").expect("blrl");
        let desc = ext_mnemonic_desc(info.index).unwrap();
        assert_eq!(desc.mnemonic_index, GekkoMnemonic::Bclr.index() + 1);
        let base = mnemonic_desc(desc.mnemonic_index).unwrap();
        assert_eq!(base.initial & 1, 1);
    }

    #[test]
    fn slwi_builds_the_rlwinm_mask() {
        let (index, ops) = lower("slwi", &[3, 4, 5]);
        assert_eq!(index, GekkoMnemonic::Rlwinm.index());
        assert_eq!(ops.as_slice(), &[3, 4, 5, 0, 26]);
    }

    #[test]
    fn srwi_rotates_left_by_complement() {
        let (_, ops) = lower("srwi", &[3, 4, 5]);
        assert_eq!(ops.as_slice(), &[3, 4, 27, 5, 31]);
    }

    #[test]
    fn bat_pseudo_swaps_the_selected_pair() {
        // mtibatu 1, r4: architectural SPR 530, bit-swapped into the field
        let (_, ops) = lower("mtibatu", &[1, 4]);
        assert_eq!(ops.as_slice(), &[spr_bitswap(530), 4]);
        assert_eq!(ops.count(), 2);
    }

    #[test]
    fn sprg_pseudo_folds_register_number() {
        let (_, ops) = lower("mtsprg", &[2, 7]);
        assert_eq!(ops.as_slice(), &[spr_bitswap(274), 7]);
        let (_, ops) = lower("mfsprg", &[7, 2]);
        assert_eq!(ops.as_slice(), &[7, spr_bitswap(274)]);
    }

    #[test]
    fn mtspr_bitswaps_in_place() {
        let (_, ops) = lower("mtspr", &[1, 3]);
        assert_eq!(ops.as_slice(), &[0x20, 3]);
    }

    #[test]
    fn trap_is_tw_31_0_0() {
        let (index, ops) = lower("trap", &[]);
        assert_eq!(index, GekkoMnemonic::Tw.index());
        assert_eq!(ops.as_slice(), &[31, 0, 0]);
    }

    #[test]
    fn record_form_of_plain_extended_does_not_exist() {
        // "nop" is plain; its record-bit slot is vacant
        let info = extended_tokens().get("nop").unwrap();
        assert!(ext_mnemonic_desc(info.index + 1).is_none());
    }
}
