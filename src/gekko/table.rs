// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Static tables for every basic Gekko/Broadway mnemonic.
//!
//! Rows follow the opcode maps in the Gekko user manual, chapter 12
//! (sections A-2 through A-32). A mnemonic-variant index is
//! `row * VARIANT_PERMUTATIONS + variant_bits`; the four slots per row
//! accommodate the largest variant family (`AA|LK`).

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::gekko::operand::OperandDesc;

pub const VARIANT_PERMUTATIONS: usize = 4;

/// Generate an inclusive mask [left, right] with MSB=0, LSB=31.
pub const fn mask(left: u32, right: u32) -> u32 {
    ((((1u64) << (32 - left)) - 1) & !(((1u64) << (31 - right)) - 1)) as u32
}

pub const fn insert_val(val: u32, left: u32, right: u32) -> u32 {
    (val << (31 - right)) & mask(left, right)
}

pub const fn insert_opcode(opcode: u32) -> u32 {
    insert_val(opcode, 0, 5)
}

/// The 10-bit SPR field is encoded with its upper and lower 5 bits
/// transposed.
pub const fn spr_bitswap(spr: u32) -> u32 {
    ((spr & 0b00000_11111) << 5) | ((spr & 0b11111_00000) >> 5)
}

// Variant bits within the instruction word.
const RC_BIT: u32 = insert_val(1, 31, 31);
const OE_BIT: u32 = insert_val(1, 21, 21);
const LK_BIT: u32 = insert_val(1, 31, 31);
const AA_BIT: u32 = insert_val(1, 30, 30);

// All operand fields as referenced by the Gekko/Broadway user manual,
// section 12.1.2.
const fn od(m: u32, shift: u32, is_signed: bool) -> OperandDesc {
    OperandDesc::new(m, shift, is_signed)
}

pub const A: OperandDesc = od(mask(11, 15), 16, false);
pub const B: OperandDesc = od(mask(16, 20), 11, false);
pub const BD: OperandDesc = od(mask(16, 29), 0, true);
pub const BI: OperandDesc = od(mask(11, 15), 16, false);
pub const BO: OperandDesc = od(mask(6, 10), 21, false);
pub const C: OperandDesc = od(mask(21, 25), 6, false);
pub const CRBA: OperandDesc = od(mask(11, 15), 16, false);
pub const CRBB: OperandDesc = od(mask(16, 20), 11, false);
pub const CRBD: OperandDesc = od(mask(6, 10), 21, false);
pub const CRFD: OperandDesc = od(mask(6, 8), 23, false);
pub const CRFS: OperandDesc = od(mask(11, 13), 18, false);
pub const CRM: OperandDesc = od(mask(12, 19), 12, false);
pub const D: OperandDesc = od(mask(6, 10), 21, false);
pub const FM: OperandDesc = od(mask(7, 14), 17, false);
pub const I1: OperandDesc = od(mask(16, 16), 15, false);
pub const I2: OperandDesc = od(mask(21, 21), 10, false);
pub const IMM: OperandDesc = od(mask(16, 19), 12, false);
pub const L: OperandDesc = od(mask(10, 10), 21, false);
pub const LI: OperandDesc = od(mask(6, 29), 0, true);
pub const MB: OperandDesc = od(mask(21, 25), 6, false);
pub const ME: OperandDesc = od(mask(26, 30), 1, false);
pub const NB: OperandDesc = od(mask(16, 20), 11, false);
pub const OFFD: OperandDesc = od(mask(16, 31), 0, true);
pub const OFFD_PS: OperandDesc = od(mask(19, 31), 0, true);
pub const S: OperandDesc = od(mask(6, 10), 21, false);
pub const SH: OperandDesc = od(mask(16, 20), 11, false);
pub const SIMM: OperandDesc = od(mask(16, 31), 0, true);
pub const SPR: OperandDesc = od(mask(11, 20), 11, false);
pub const SR: OperandDesc = od(mask(12, 15), 16, false);
pub const TO: OperandDesc = od(mask(6, 10), 21, false);
pub const TPR: OperandDesc = od(mask(11, 20), 11, false);
pub const UIMM: OperandDesc = od(mask(16, 31), 0, false);
pub const W1: OperandDesc = od(mask(17, 19), 12, false);
pub const W2: OperandDesc = od(mask(22, 24), 7, false);

/// Operand-list shapes the parser can recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseAlg {
    None,
    Op1,
    NoneOrOp1,
    Op1Off1,
    Op2,
    Op1Or2,
    Op3,
    Op2Or3,
    Op4,
    Op5,
    Op1Off1Op2,
}

/// What the parser needs to know about a mnemonic: its variant index and
/// how to parse its operand list.
#[derive(Debug, Clone, Copy)]
pub struct ParseInfo {
    pub index: usize,
    pub alg: ParseAlg,
}

/// Which trailing-flag variants a mnemonic family emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantFamily {
    Plain,
    Rc,
    OeRc,
    Lk,
    AaLk,
}

impl VariantFamily {
    pub fn suffixes(self) -> &'static [(&'static str, usize)] {
        match self {
            VariantFamily::Plain => &[("", 0)],
            VariantFamily::Rc => &[("", 0), (".", 1)],
            VariantFamily::OeRc => &[("", 0), (".", 1), ("o", 2), ("o.", 3)],
            VariantFamily::Lk => &[("", 0), ("l", 1)],
            VariantFamily::AaLk => &[("", 0), ("l", 1), ("a", 2), ("la", 3)],
        }
    }

    /// Instruction-word bits for a variant slot, or `None` when the family
    /// has no such variant.
    pub fn variant_bits(self, variant: usize) -> Option<u32> {
        match (self, variant) {
            (_, 0) => Some(0),
            (VariantFamily::Rc, 1) => Some(RC_BIT),
            (VariantFamily::OeRc, 1) => Some(RC_BIT),
            (VariantFamily::OeRc, 2) => Some(OE_BIT),
            (VariantFamily::OeRc, 3) => Some(RC_BIT | OE_BIT),
            (VariantFamily::Lk, 1) => Some(LK_BIT),
            (VariantFamily::AaLk, 1) => Some(LK_BIT),
            (VariantFamily::AaLk, 2) => Some(AA_BIT),
            (VariantFamily::AaLk, 3) => Some(AA_BIT | LK_BIT),
            _ => None,
        }
    }
}

/// All basic mnemonics, in user-manual table order. The discriminant is the
/// row index into [`BASIC`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[rustfmt::skip]
pub enum GekkoMnemonic {
    // A-2
    Add, Addc, Adde, Addi, Addic, AddicDot, Addis, Addme, Addze, Divw, Divwu,
    Mulhw, Mulhwu, Mulli, Mullw, Neg, Subf, Subfc, Subfe, Subfic, Subfme, Subfze,
    // A-3
    Cmp, Cmpi, Cmpl, Cmpli,
    // A-4
    And, Andc, AndiDot, AndisDot, Cntlzw, Eqv, Extsb, Extsh, Nand, Nor, Or, Orc,
    Ori, Oris, Xor, Xori, Xoris,
    // A-5
    Rlwimi, Rlwinm, Rlwnm,
    // A-6
    Slw, Sraw, Srawi, Srw,
    // A-7
    Fadd, Fadds, Fdiv, Fdivs, Fmul, Fmuls, Fres, Frsqrte, Fsub, Fsubs, Fsel,
    // A-8
    Fmadd, Fmadds, Fmsub, Fmsubs, Fnmadd, Fnmadds, Fnmsub, Fnmsubs,
    // A-9
    Fctiw, Fctiwz, Frsp,
    // A-10
    Fcmpo, Fcmpu,
    // A-11
    Mcrfs, Mffs, Mtfsb0, Mtfsb1, Mtfsf, Mtfsfi,
    // A-12
    Lbz, Lbzu, Lbzux, Lbzx, Lha, Lhau, Lhaux, Lhax, Lhz, Lhzu, Lhzux, Lhzx,
    Lwz, Lwzu, Lwzux, Lwzx,
    // A-13
    Stb, Stbu, Stbux, Stbx, Sth, Sthu, Sthux, Sthx, Stw, Stwu, Stwux, Stwx,
    // A-14
    Lhbrx, Lwbrx, Sthbrx, Stwbrx,
    // A-15
    Lmw, Stmw,
    // A-16
    Lswi, Lswx, Stswi, Stswx,
    // A-17
    Eieio, Isync, Lwarx, StwcxDot, Sync,
    // A-18
    Lfd, Lfdu, Lfdux, Lfdx, Lfs, Lfsu, Lfsux, Lfsx,
    // A-19
    Stfd, Stfdu, Stfdux, Stfdx, Stfiwx, Stfs, Stfsu, Stfsux, Stfsx,
    // A-20
    Fabs, Fmr, Fnabs, Fneg,
    // A-21
    B, Bc, Bcctr, Bclr,
    // A-22
    Crand, Crandc, Creqv, Crnand, Crnor, Cror, Crorc, Crxor, Mcrf,
    // A-23
    Rfi, Sc,
    // A-24
    Tw, Twi,
    // A-25
    Mcrxr, Mfcr, Mfmsr, MfsprNobitswap, MftbNobitswap, Mtcrf, Mtmsr, MtsprNobitswap,
    // A-26
    Dcbf, Dcbi, Dcbst, Dcbt, Dcbtst, Dcbz, Icbi,
    // A-27
    Mfsr, Mfsrin, Mtsr, Mtsrin,
    // A-28
    Tlbie, Tlbsync,
    // A-29
    Eciwx, Ecowx,
    // A-30
    PsqLx, PsqStx, PsqLux, PsqStux, PsqL, PsqLu, PsqSt, PsqStu,
    // A-31
    PsDiv, PsSub, PsAdd, PsSel, PsRes, PsMul, PsRsqrte, PsMsub, PsMadd,
    PsNmsub, PsNmadd, PsNeg, PsMr, PsNabs, PsAbs,
    // A-32
    PsSum0, PsSum1, PsMuls0, PsMuls1, PsMadds0, PsMadds1, PsCmpu0, PsCmpo0,
    PsCmpu1, PsCmpo1, PsMerge00, PsMerge01, PsMerge10, PsMerge11, DcbzL,
}

impl GekkoMnemonic {
    /// The plain-variant mnemonic index for this row.
    pub const fn index(self) -> usize {
        self as usize * VARIANT_PERMUTATIONS
    }
}

pub struct MnemonicRow {
    pub mn: GekkoMnemonic,
    pub name: &'static str,
    pub family: VariantFamily,
    pub alg: ParseAlg,
    /// Initial word bits: primary opcode, function code and any baked-in
    /// flag bits (`stwcx.`).
    pub initial: u32,
    pub operands: &'static [OperandDesc],
}

/// The machine-code template for one mnemonic variant.
#[derive(Debug, Clone, Copy)]
pub struct MnemonicDesc {
    pub initial: u32,
    pub operands: &'static [OperandDesc],
}

/// Look up the descriptor for a mnemonic-variant index. `None` means the
/// variant does not exist for this mnemonic (e.g. a record bit applied to a
/// plain mnemonic).
pub fn mnemonic_desc(index: usize) -> Option<MnemonicDesc> {
    let row = BASIC.get(index / VARIANT_PERMUTATIONS)?;
    let bits = row.family.variant_bits(index % VARIANT_PERMUTATIONS)?;
    Some(MnemonicDesc {
        initial: row.initial | bits,
        operands: row.operands,
    })
}

pub fn mnemonic_row(index: usize) -> Option<&'static MnemonicRow> {
    BASIC.get(index / VARIANT_PERMUTATIONS)
}

macro_rules! row {
    ($mn:ident, $name:literal, $family:ident, $alg:ident, $opcode:literal, $extra:expr,
     [$($op:expr),*]) => {
        MnemonicRow {
            mn: GekkoMnemonic::$mn,
            name: $name,
            family: VariantFamily::$family,
            alg: ParseAlg::$alg,
            initial: insert_opcode($opcode) | $extra,
            operands: &[$($op),*],
        }
    };
}

/// Every basic mnemonic Broadway/Gekko supports.
#[rustfmt::skip]
pub static BASIC: [MnemonicRow; 222] = [
    // A-2
    row!(Add, "add", OeRc, Op3, 31, insert_val(266, 22, 30), [D, A, B]),
    row!(Addc, "addc", OeRc, Op3, 31, insert_val(10, 22, 30), [D, A, B]),
    row!(Adde, "adde", OeRc, Op3, 31, insert_val(138, 22, 30), [D, A, B]),
    row!(Addi, "addi", Plain, Op3, 14, 0, [D, A, SIMM]),
    row!(Addic, "addic", Plain, Op3, 12, 0, [D, A, SIMM]),
    row!(AddicDot, "addic.", Plain, Op3, 13, 0, [D, A, SIMM]),
    row!(Addis, "addis", Plain, Op3, 15, 0, [D, A, SIMM]),
    row!(Addme, "addme", OeRc, Op2, 31, insert_val(234, 22, 30), [D, A]),
    row!(Addze, "addze", OeRc, Op2, 31, insert_val(202, 22, 30), [D, A]),
    row!(Divw, "divw", OeRc, Op3, 31, insert_val(491, 22, 30), [D, A, B]),
    row!(Divwu, "divwu", OeRc, Op3, 31, insert_val(459, 22, 30), [D, A, B]),
    row!(Mulhw, "mulhw", Rc, Op3, 31, insert_val(75, 22, 30), [D, A, B]),
    row!(Mulhwu, "mulhwu", Rc, Op3, 31, insert_val(11, 22, 30), [D, A, B]),
    row!(Mulli, "mulli", Plain, Op3, 7, 0, [D, A, SIMM]),
    row!(Mullw, "mullw", OeRc, Op3, 31, insert_val(235, 22, 30), [D, A, B]),
    row!(Neg, "neg", OeRc, Op2, 31, insert_val(104, 22, 30), [D, A]),
    row!(Subf, "subf", OeRc, Op3, 31, insert_val(40, 22, 30), [D, A, B]),
    row!(Subfc, "subfc", OeRc, Op3, 31, insert_val(8, 22, 30), [D, A, B]),
    row!(Subfe, "subfe", OeRc, Op3, 31, insert_val(136, 22, 30), [D, A, B]),
    row!(Subfic, "subfic", Plain, Op3, 8, 0, [D, A, SIMM]),
    row!(Subfme, "subfme", OeRc, Op2, 31, insert_val(232, 22, 30), [D, A]),
    row!(Subfze, "subfze", OeRc, Op2, 31, insert_val(200, 22, 30), [D, A]),

    // A-3
    row!(Cmp, "cmp", Plain, Op4, 31, insert_val(0, 21, 30), [CRFD, L, A, B]),
    row!(Cmpi, "cmpi", Plain, Op4, 11, 0, [CRFD, L, A, SIMM]),
    row!(Cmpl, "cmpl", Plain, Op4, 31, insert_val(32, 21, 30), [CRFD, L, A, B]),
    row!(Cmpli, "cmpli", Plain, Op4, 10, 0, [CRFD, L, A, UIMM]),

    // A-4
    row!(And, "and", Rc, Op3, 31, insert_val(28, 21, 30), [A, S, B]),
    row!(Andc, "andc", Rc, Op3, 31, insert_val(60, 21, 30), [A, S, B]),
    row!(AndiDot, "andi.", Plain, Op3, 28, 0, [A, S, UIMM]),
    row!(AndisDot, "andis.", Plain, Op3, 29, 0, [A, S, UIMM]),
    row!(Cntlzw, "cntlzw", Rc, Op2, 31, insert_val(26, 21, 30), [A, S]),
    row!(Eqv, "eqv", Rc, Op3, 31, insert_val(284, 21, 30), [A, S, B]),
    row!(Extsb, "extsb", Rc, Op2, 31, insert_val(954, 21, 30), [A, S]),
    row!(Extsh, "extsh", Rc, Op2, 31, insert_val(922, 21, 30), [A, S]),
    row!(Nand, "nand", Rc, Op3, 31, insert_val(476, 21, 30), [A, S, B]),
    row!(Nor, "nor", Rc, Op3, 31, insert_val(124, 21, 30), [A, S, B]),
    row!(Or, "or", Rc, Op3, 31, insert_val(444, 21, 30), [A, S, B]),
    row!(Orc, "orc", Rc, Op3, 31, insert_val(412, 21, 30), [A, S, B]),
    row!(Ori, "ori", Plain, Op3, 24, 0, [A, S, UIMM]),
    row!(Oris, "oris", Plain, Op3, 25, 0, [A, S, UIMM]),
    row!(Xor, "xor", Rc, Op3, 31, insert_val(316, 21, 30), [A, S, B]),
    row!(Xori, "xori", Plain, Op3, 26, 0, [A, S, UIMM]),
    row!(Xoris, "xoris", Plain, Op3, 27, 0, [A, S, UIMM]),

    // A-5
    row!(Rlwimi, "rlwimi", Rc, Op5, 20, 0, [A, S, SH, MB, ME]),
    row!(Rlwinm, "rlwinm", Rc, Op5, 21, 0, [A, S, SH, MB, ME]),
    row!(Rlwnm, "rlwnm", Rc, Op5, 23, 0, [A, S, B, MB, ME]),

    // A-6
    row!(Slw, "slw", Rc, Op3, 31, insert_val(24, 21, 30), [A, S, B]),
    row!(Sraw, "sraw", Rc, Op3, 31, insert_val(792, 21, 30), [A, S, B]),
    row!(Srawi, "srawi", Rc, Op3, 31, insert_val(824, 21, 30), [A, S, SH]),
    row!(Srw, "srw", Rc, Op3, 31, insert_val(536, 21, 30), [A, S, B]),

    // A-7
    row!(Fadd, "fadd", Rc, Op3, 63, insert_val(21, 26, 30), [D, A, B]),
    row!(Fadds, "fadds", Rc, Op3, 59, insert_val(21, 26, 30), [D, A, B]),
    row!(Fdiv, "fdiv", Rc, Op3, 63, insert_val(18, 26, 30), [D, A, B]),
    row!(Fdivs, "fdivs", Rc, Op3, 59, insert_val(18, 26, 30), [D, A, B]),
    row!(Fmul, "fmul", Rc, Op3, 63, insert_val(25, 26, 30), [D, A, C]),
    row!(Fmuls, "fmuls", Rc, Op3, 59, insert_val(25, 26, 30), [D, A, C]),
    row!(Fres, "fres", Rc, Op2, 59, insert_val(24, 26, 30), [D, B]),
    row!(Frsqrte, "frsqrte", Rc, Op2, 63, insert_val(26, 26, 30), [D, B]),
    row!(Fsub, "fsub", Rc, Op3, 63, insert_val(20, 26, 30), [D, A, B]),
    row!(Fsubs, "fsubs", Rc, Op3, 59, insert_val(20, 26, 30), [D, A, B]),
    row!(Fsel, "fsel", Rc, Op4, 63, insert_val(23, 26, 30), [D, A, C, B]),

    // A-8
    row!(Fmadd, "fmadd", Rc, Op4, 63, insert_val(29, 26, 30), [D, A, C, B]),
    row!(Fmadds, "fmadds", Rc, Op4, 59, insert_val(29, 26, 30), [D, A, C, B]),
    row!(Fmsub, "fmsub", Rc, Op4, 63, insert_val(28, 26, 30), [D, A, C, B]),
    row!(Fmsubs, "fmsubs", Rc, Op4, 59, insert_val(28, 26, 30), [D, A, C, B]),
    row!(Fnmadd, "fnmadd", Rc, Op4, 63, insert_val(31, 26, 30), [D, A, C, B]),
    row!(Fnmadds, "fnmadds", Rc, Op4, 59, insert_val(31, 26, 30), [D, A, C, B]),
    row!(Fnmsub, "fnmsub", Rc, Op4, 63, insert_val(30, 26, 30), [D, A, C, B]),
    row!(Fnmsubs, "fnmsubs", Rc, Op4, 59, insert_val(30, 26, 30), [D, A, C, B]),

    // A-9
    row!(Fctiw, "fctiw", Rc, Op2, 63, insert_val(14, 21, 30), [D, B]),
    row!(Fctiwz, "fctiwz", Rc, Op2, 63, insert_val(15, 21, 30), [D, B]),
    row!(Frsp, "frsp", Rc, Op2, 63, insert_val(12, 21, 30), [D, B]),

    // A-10
    row!(Fcmpo, "fcmpo", Plain, Op3, 63, insert_val(32, 21, 30), [CRFD, A, B]),
    row!(Fcmpu, "fcmpu", Plain, Op3, 63, insert_val(0, 21, 30), [CRFD, A, B]),

    // A-11
    row!(Mcrfs, "mcrfs", Plain, Op2, 63, insert_val(64, 21, 30), [CRFD, CRFS]),
    row!(Mffs, "mffs", Rc, Op1, 63, insert_val(583, 21, 30), [D]),
    row!(Mtfsb0, "mtfsb0", Rc, Op1, 63, insert_val(70, 21, 30), [CRBD]),
    row!(Mtfsb1, "mtfsb1", Rc, Op1, 63, insert_val(38, 21, 30), [CRBD]),
    row!(Mtfsf, "mtfsf", Rc, Op2, 63, insert_val(711, 21, 30), [FM, B]),
    row!(Mtfsfi, "mtfsfi", Rc, Op2, 63, insert_val(134, 21, 30), [CRFD, IMM]),

    // A-12
    row!(Lbz, "lbz", Plain, Op1Off1, 34, 0, [D, OFFD, A]),
    row!(Lbzu, "lbzu", Plain, Op1Off1, 35, 0, [D, OFFD, A]),
    row!(Lbzux, "lbzux", Plain, Op3, 31, insert_val(119, 21, 30), [D, A, B]),
    row!(Lbzx, "lbzx", Plain, Op3, 31, insert_val(87, 21, 30), [D, A, B]),
    row!(Lha, "lha", Plain, Op1Off1, 42, 0, [D, OFFD, A]),
    row!(Lhau, "lhau", Plain, Op1Off1, 43, 0, [D, OFFD, A]),
    row!(Lhaux, "lhaux", Plain, Op3, 31, insert_val(375, 21, 30), [D, A, B]),
    row!(Lhax, "lhax", Plain, Op3, 31, insert_val(343, 21, 30), [D, A, B]),
    row!(Lhz, "lhz", Plain, Op1Off1, 40, 0, [D, OFFD, A]),
    row!(Lhzu, "lhzu", Plain, Op1Off1, 41, 0, [D, OFFD, A]),
    row!(Lhzux, "lhzux", Plain, Op3, 31, insert_val(311, 21, 30), [D, A, B]),
    row!(Lhzx, "lhzx", Plain, Op3, 31, insert_val(279, 21, 30), [D, A, B]),
    row!(Lwz, "lwz", Plain, Op1Off1, 32, 0, [D, OFFD, A]),
    row!(Lwzu, "lwzu", Plain, Op1Off1, 33, 0, [D, OFFD, A]),
    row!(Lwzux, "lwzux", Plain, Op3, 31, insert_val(55, 21, 30), [D, A, B]),
    row!(Lwzx, "lwzx", Plain, Op3, 31, insert_val(23, 21, 30), [D, A, B]),

    // A-13
    row!(Stb, "stb", Plain, Op1Off1, 38, 0, [S, OFFD, A]),
    row!(Stbu, "stbu", Plain, Op1Off1, 39, 0, [S, OFFD, A]),
    row!(Stbux, "stbux", Plain, Op3, 31, insert_val(247, 21, 30), [S, A, B]),
    row!(Stbx, "stbx", Plain, Op3, 31, insert_val(215, 21, 30), [S, A, B]),
    row!(Sth, "sth", Plain, Op1Off1, 44, 0, [S, OFFD, A]),
    row!(Sthu, "sthu", Plain, Op1Off1, 45, 0, [S, OFFD, A]),
    row!(Sthux, "sthux", Plain, Op3, 31, insert_val(439, 21, 30), [S, A, B]),
    row!(Sthx, "sthx", Plain, Op3, 31, insert_val(407, 21, 30), [S, A, B]),
    row!(Stw, "stw", Plain, Op1Off1, 36, 0, [S, OFFD, A]),
    row!(Stwu, "stwu", Plain, Op1Off1, 37, 0, [S, OFFD, A]),
    row!(Stwux, "stwux", Plain, Op3, 31, insert_val(183, 21, 30), [S, A, B]),
    row!(Stwx, "stwx", Plain, Op3, 31, insert_val(151, 21, 30), [S, A, B]),

    // A-14
    row!(Lhbrx, "lhbrx", Plain, Op3, 31, insert_val(790, 21, 30), [D, A, B]),
    row!(Lwbrx, "lwbrx", Plain, Op3, 31, insert_val(534, 21, 30), [D, A, B]),
    row!(Sthbrx, "sthbrx", Plain, Op3, 31, insert_val(918, 21, 30), [S, A, B]),
    row!(Stwbrx, "stwbrx", Plain, Op3, 31, insert_val(662, 21, 30), [S, A, B]),

    // A-15
    row!(Lmw, "lmw", Plain, Op1Off1, 46, 0, [D, OFFD, A]),
    row!(Stmw, "stmw", Plain, Op1Off1, 47, 0, [S, OFFD, A]),

    // A-16
    row!(Lswi, "lswi", Plain, Op3, 31, insert_val(597, 21, 30), [D, A, NB]),
    row!(Lswx, "lswx", Plain, Op3, 31, insert_val(533, 21, 30), [D, A, B]),
    row!(Stswi, "stswi", Plain, Op3, 31, insert_val(725, 21, 30), [S, A, NB]),
    row!(Stswx, "stswx", Plain, Op3, 31, insert_val(661, 21, 30), [S, A, B]),

    // A-17
    row!(Eieio, "eieio", Plain, None, 31, insert_val(854, 21, 30), []),
    row!(Isync, "isync", Plain, None, 19, insert_val(150, 21, 30), []),
    row!(Lwarx, "lwarx", Plain, Op3, 31, insert_val(20, 21, 30), [D, A, B]),
    row!(StwcxDot, "stwcx.", Plain, Op3, 31,
         insert_val(150, 21, 30) | insert_val(1, 31, 31), [S, A, B]),
    row!(Sync, "sync", Plain, None, 31, insert_val(598, 21, 30), []),

    // A-18
    row!(Lfd, "lfd", Plain, Op1Off1, 50, 0, [D, OFFD, A]),
    row!(Lfdu, "lfdu", Plain, Op1Off1, 51, 0, [D, OFFD, A]),
    row!(Lfdux, "lfdux", Plain, Op3, 31, insert_val(631, 21, 30), [D, A, B]),
    row!(Lfdx, "lfdx", Plain, Op3, 31, insert_val(599, 21, 30), [D, A, B]),
    row!(Lfs, "lfs", Plain, Op1Off1, 48, 0, [D, OFFD, A]),
    row!(Lfsu, "lfsu", Plain, Op1Off1, 49, 0, [D, OFFD, A]),
    row!(Lfsux, "lfsux", Plain, Op3, 31, insert_val(567, 21, 30), [D, A, B]),
    row!(Lfsx, "lfsx", Plain, Op3, 31, insert_val(535, 21, 30), [D, A, B]),

    // A-19
    row!(Stfd, "stfd", Plain, Op1Off1, 54, 0, [S, OFFD, A]),
    row!(Stfdu, "stfdu", Plain, Op1Off1, 55, 0, [S, OFFD, A]),
    row!(Stfdux, "stfdux", Plain, Op3, 31, insert_val(759, 21, 30), [S, A, B]),
    row!(Stfdx, "stfdx", Plain, Op3, 31, insert_val(727, 21, 30), [S, A, B]),
    row!(Stfiwx, "stfiwx", Plain, Op3, 31, insert_val(983, 21, 30), [S, A, B]),
    row!(Stfs, "stfs", Plain, Op1Off1, 52, 0, [S, OFFD, A]),
    row!(Stfsu, "stfsu", Plain, Op1Off1, 53, 0, [S, OFFD, A]),
    row!(Stfsux, "stfsux", Plain, Op3, 31, insert_val(695, 21, 30), [S, A, B]),
    row!(Stfsx, "stfsx", Plain, Op3, 31, insert_val(663, 21, 30), [S, A, B]),

    // A-20
    row!(Fabs, "fabs", Rc, Op2, 63, insert_val(264, 21, 30), [D, B]),
    row!(Fmr, "fmr", Rc, Op2, 63, insert_val(72, 21, 30), [D, B]),
    row!(Fnabs, "fnabs", Rc, Op2, 63, insert_val(136, 21, 30), [D, B]),
    row!(Fneg, "fneg", Rc, Op2, 63, insert_val(40, 21, 30), [D, B]),

    // A-21
    row!(B, "b", AaLk, Op1, 18, 0, [LI]),
    row!(Bc, "bc", AaLk, Op3, 16, 0, [BO, BI, BD]),
    row!(Bcctr, "bcctr", Lk, Op2, 19, insert_val(528, 21, 30), [BO, BI]),
    row!(Bclr, "bclr", Lk, Op2, 19, insert_val(16, 21, 30), [BO, BI]),

    // A-22
    row!(Crand, "crand", Plain, Op3, 19, insert_val(257, 21, 30), [CRBD, CRBA, CRBB]),
    row!(Crandc, "crandc", Plain, Op3, 19, insert_val(129, 21, 30), [CRBD, CRBA, CRBB]),
    row!(Creqv, "creqv", Plain, Op3, 19, insert_val(289, 21, 30), [CRBD, CRBA, CRBB]),
    row!(Crnand, "crnand", Plain, Op3, 19, insert_val(225, 21, 30), [CRBD, CRBA, CRBB]),
    row!(Crnor, "crnor", Plain, Op3, 19, insert_val(33, 21, 30), [CRBD, CRBA, CRBB]),
    row!(Cror, "cror", Plain, Op3, 19, insert_val(449, 21, 30), [CRBD, CRBA, CRBB]),
    row!(Crorc, "crorc", Plain, Op3, 19, insert_val(417, 21, 30), [CRBD, CRBA, CRBB]),
    row!(Crxor, "crxor", Plain, Op3, 19, insert_val(193, 21, 30), [CRBD, CRBA, CRBB]),
    row!(Mcrf, "mcrf", Plain, Op2, 19, insert_val(0, 21, 30), [CRFD, CRFS]),

    // A-23
    row!(Rfi, "rfi", Plain, None, 19, insert_val(50, 21, 30), []),
    row!(Sc, "sc", Plain, None, 17, insert_val(1, 30, 30), []),

    // A-24
    row!(Tw, "tw", Plain, Op3, 31, insert_val(4, 21, 30), [TO, A, B]),
    row!(Twi, "twi", Plain, Op3, 3, 0, [TO, A, SIMM]),

    // A-25
    row!(Mcrxr, "mcrxr", Plain, Op1, 31, insert_val(512, 21, 30), [CRFD]),
    row!(Mfcr, "mfcr", Plain, Op1, 31, insert_val(19, 21, 30), [D]),
    row!(Mfmsr, "mfmsr", Plain, Op1, 31, insert_val(83, 21, 30), [D]),
    row!(MfsprNobitswap, "mfspr_nobitswap", Plain, Op2, 31, insert_val(339, 21, 30), [D, SPR]),
    row!(MftbNobitswap, "mftb_nobitswap", Plain, Op2, 31, insert_val(371, 21, 30), [D, TPR]),
    row!(Mtcrf, "mtcrf", Plain, Op2, 31, insert_val(144, 21, 30), [CRM, S]),
    row!(Mtmsr, "mtmsr", Plain, Op1, 31, insert_val(146, 21, 30), [S]),
    row!(MtsprNobitswap, "mtspr_nobitswap", Plain, Op2, 31, insert_val(467, 21, 30), [SPR, D]),

    // A-26
    row!(Dcbf, "dcbf", Plain, Op2, 31, insert_val(86, 21, 30), [A, B]),
    row!(Dcbi, "dcbi", Plain, Op2, 31, insert_val(470, 21, 30), [A, B]),
    row!(Dcbst, "dcbst", Plain, Op2, 31, insert_val(54, 21, 30), [A, B]),
    row!(Dcbt, "dcbt", Plain, Op2, 31, insert_val(278, 21, 30), [A, B]),
    row!(Dcbtst, "dcbtst", Plain, Op2, 31, insert_val(246, 21, 30), [A, B]),
    row!(Dcbz, "dcbz", Plain, Op2, 31, insert_val(1014, 21, 30), [A, B]),
    row!(Icbi, "icbi", Plain, Op2, 31, insert_val(982, 21, 30), [A, B]),

    // A-27
    row!(Mfsr, "mfsr", Plain, Op2, 31, insert_val(595, 21, 30), [D, SR]),
    row!(Mfsrin, "mfsrin", Plain, Op2, 31, insert_val(659, 21, 30), [D, B]),
    row!(Mtsr, "mtsr", Plain, Op2, 31, insert_val(210, 21, 30), [SR, S]),
    row!(Mtsrin, "mtsrin", Plain, Op2, 31, insert_val(242, 21, 30), [S, B]),

    // A-28
    row!(Tlbie, "tlbie", Plain, Op1, 31, insert_val(306, 21, 30), [B]),
    row!(Tlbsync, "tlbsync", Plain, None, 31, insert_val(566, 21, 30), []),

    // A-29
    row!(Eciwx, "eciwx", Plain, Op3, 31, insert_val(310, 21, 30), [D, A, B]),
    row!(Ecowx, "ecowx", Plain, Op3, 31, insert_val(438, 21, 30), [S, A, B]),

    // A-30
    row!(PsqLx, "psq_lx", Plain, Op5, 4, insert_val(6, 25, 30), [D, A, B, I2, W2]),
    row!(PsqStx, "psq_stx", Plain, Op5, 4, insert_val(7, 25, 30), [S, A, B, I2, W2]),
    row!(PsqLux, "psq_lux", Plain, Op5, 4, insert_val(38, 25, 30), [D, A, B, I2, W2]),
    row!(PsqStux, "psq_stux", Plain, Op5, 4, insert_val(39, 25, 30), [S, A, B, I2, W2]),
    row!(PsqL, "psq_l", Plain, Op1Off1Op2, 56, 0, [D, OFFD_PS, A, I1, W1]),
    row!(PsqLu, "psq_lu", Plain, Op1Off1Op2, 57, 0, [D, OFFD_PS, A, I1, W1]),
    row!(PsqSt, "psq_st", Plain, Op1Off1Op2, 60, 0, [S, OFFD_PS, A, I1, W1]),
    row!(PsqStu, "psq_stu", Plain, Op1Off1Op2, 61, 0, [S, OFFD_PS, A, I1, W1]),

    // A-31
    row!(PsDiv, "ps_div", Rc, Op3, 4, insert_val(18, 26, 30), [D, A, B]),
    row!(PsSub, "ps_sub", Rc, Op3, 4, insert_val(20, 26, 30), [D, A, B]),
    row!(PsAdd, "ps_add", Rc, Op3, 4, insert_val(21, 26, 30), [D, A, B]),
    row!(PsSel, "ps_sel", Rc, Op4, 4, insert_val(23, 26, 30), [D, A, C, B]),
    row!(PsRes, "ps_res", Rc, Op2, 4, insert_val(24, 26, 30), [D, B]),
    row!(PsMul, "ps_mul", Rc, Op3, 4, insert_val(25, 26, 30), [D, A, C]),
    row!(PsRsqrte, "ps_rsqrte", Rc, Op2, 4, insert_val(26, 26, 30), [D, B]),
    row!(PsMsub, "ps_msub", Rc, Op4, 4, insert_val(28, 26, 30), [D, A, C, B]),
    row!(PsMadd, "ps_madd", Rc, Op4, 4, insert_val(29, 26, 30), [D, A, C, B]),
    row!(PsNmsub, "ps_nmsub", Rc, Op4, 4, insert_val(30, 26, 30), [D, A, C, B]),
    row!(PsNmadd, "ps_nmadd", Rc, Op4, 4, insert_val(31, 26, 30), [D, A, C, B]),
    row!(PsNeg, "ps_neg", Rc, Op2, 4, insert_val(40, 21, 30), [D, B]),
    row!(PsMr, "ps_mr", Rc, Op2, 4, insert_val(72, 21, 30), [D, B]),
    row!(PsNabs, "ps_nabs", Rc, Op2, 4, insert_val(136, 21, 30), [D, B]),
    row!(PsAbs, "ps_abs", Plain, Op2, 4, insert_val(264, 21, 30), [D, B]),

    // A-32
    row!(PsSum0, "ps_sum0", Rc, Op4, 4, insert_val(10, 26, 30), [D, A, C, B]),
    row!(PsSum1, "ps_sum1", Rc, Op4, 4, insert_val(11, 26, 30), [D, A, C, B]),
    row!(PsMuls0, "ps_muls0", Rc, Op3, 4, insert_val(12, 26, 30), [D, A, C]),
    row!(PsMuls1, "ps_muls1", Rc, Op3, 4, insert_val(13, 26, 30), [D, A, C]),
    row!(PsMadds0, "ps_madds0", Rc, Op4, 4, insert_val(14, 26, 30), [D, A, C, B]),
    row!(PsMadds1, "ps_madds1", Rc, Op4, 4, insert_val(15, 26, 30), [D, A, C, B]),
    row!(PsCmpu0, "ps_cmpu0", Plain, Op3, 4, insert_val(0, 21, 30), [CRFD, A, B]),
    row!(PsCmpo0, "ps_cmpo0", Plain, Op3, 4, insert_val(32, 21, 30), [CRFD, A, B]),
    row!(PsCmpu1, "ps_cmpu1", Plain, Op3, 4, insert_val(64, 21, 30), [CRFD, A, B]),
    row!(PsCmpo1, "ps_cmpo1", Plain, Op3, 4, insert_val(96, 21, 30), [CRFD, A, B]),
    row!(PsMerge00, "ps_merge00", Rc, Op3, 4, insert_val(528, 21, 30), [D, A, B]),
    row!(PsMerge01, "ps_merge01", Rc, Op3, 4, insert_val(560, 21, 30), [D, A, B]),
    row!(PsMerge10, "ps_merge10", Rc, Op3, 4, insert_val(592, 21, 30), [D, A, B]),
    row!(PsMerge11, "ps_merge11", Rc, Op3, 4, insert_val(624, 21, 30), [D, A, B]),
    row!(DcbzL, "dcbz_l", Plain, Op2, 4, insert_val(1014, 21, 30), [A, B]),
];

/// Named special-purpose registers and their SPR numbers.
#[rustfmt::skip]
static SPRG_NAMES: [(&str, u32); 69] = [
    ("xer", 1), ("lr", 8), ("ctr", 9), ("dsisr", 18),
    ("dar", 19), ("dec", 22), ("sdr1", 25), ("srr0", 26),
    ("srr1", 27), ("sprg0", 272), ("sprg1", 273), ("sprg2", 274),
    ("sprg3", 275), ("ear", 282), ("tbl", 284), ("tbu", 285),
    ("ibat0u", 528), ("ibat0l", 529), ("ibat1u", 530), ("ibat1l", 531),
    ("ibat2u", 532), ("ibat2l", 533), ("ibat3u", 534), ("ibat3l", 535),
    ("dbat0u", 536), ("dbat0l", 537), ("dbat1u", 538), ("dbat1l", 539),
    ("dbat2u", 540), ("dbat2l", 541), ("dbat3u", 542), ("dbat3l", 543),
    ("gqr0", 912), ("gqr1", 913), ("gqr2", 914), ("gqr3", 915),
    ("gqr4", 916), ("gqr5", 917), ("gqr6", 918), ("gqr7", 919),
    ("hid2", 920), ("wpar", 921), ("dma_u", 922), ("dma_l", 923),
    ("ummcr0", 936), ("upmc1", 937), ("upmc2", 938), ("usia", 939),
    ("ummcr1", 940), ("upmc3", 941), ("upmc4", 942), ("usda", 943),
    ("mmcr0", 952), ("pmc1", 953), ("pmc2", 954), ("sia", 955),
    ("mmcr1", 956), ("pmc3", 957), ("pmc4", 958), ("sda", 959),
    ("hid0", 1008), ("hid1", 1009), ("iabr", 1010), ("dabr", 1013),
    ("l2cr", 1017), ("ictc", 1019), ("thrm1", 1020), ("thrm2", 1021),
    ("thrm3", 1022),
];

pub fn sprg_value(name: &str) -> Option<u32> {
    static MAP: OnceLock<HashMap<&'static str, u32>> = OnceLock::new();
    MAP.get_or_init(|| SPRG_NAMES.iter().copied().collect())
        .get(name)
        .copied()
}

/// Basic mnemonic names (with variant suffixes) to their parse info.
pub fn mnemonic_tokens() -> &'static HashMap<String, ParseInfo> {
    static MAP: OnceLock<HashMap<String, ParseInfo>> = OnceLock::new();
    MAP.get_or_init(|| {
        let mut map = HashMap::new();
        for (row_index, row) in BASIC.iter().enumerate() {
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

pub use crate::gekko::extended::extended_tokens;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_discriminants_match_row_order() {
        for (i, row) in BASIC.iter().enumerate() {
            assert_eq!(row.mn as usize, i, "row {i} ('{}') out of order", row.name);
        }
    }

    #[test]
    fn mask_is_msb_zero_numbered() {
        assert_eq!(mask(0, 5), 0xfc00_0000);
        assert_eq!(mask(16, 31), 0x0000_ffff);
        assert_eq!(mask(6, 29), 0x03ff_fffc);
        assert_eq!(mask(31, 31), 1);
    }

    #[test]
    fn spr_bitswap_transposes_halves() {
        assert_eq!(spr_bitswap(1), 0x20);
        assert_eq!(spr_bitswap(0x20), 1);
        assert_eq!(spr_bitswap(spr_bitswap(917)), 917);
    }

    #[test]
    fn variant_lookup_honours_families() {
        // add has all four OE/Rc slots
        let add = GekkoMnemonic::Add.index();
        assert!(mnemonic_desc(add).is_some());
        assert!(mnemonic_desc(add + 3).is_some());
        // addi is plain: record bit slot does not exist
        let addi = GekkoMnemonic::Addi.index();
        assert!(mnemonic_desc(addi).is_some());
        assert!(mnemonic_desc(addi + 1).is_none());
        // bclr links but never takes AA
        let bclr = GekkoMnemonic::Bclr.index();
        assert!(mnemonic_desc(bclr + 1).is_some());
        assert!(mnemonic_desc(bclr + 2).is_none());
    }

    #[test]
    fn variant_bits_land_in_the_word() {
        let add_o_dot = mnemonic_desc(GekkoMnemonic::Add.index() + 3).unwrap();
        let plain = mnemonic_desc(GekkoMnemonic::Add.index()).unwrap();
        assert_eq!(add_o_dot.initial, plain.initial | 1 | (1 << 10));

        let bla = mnemonic_desc(GekkoMnemonic::B.index() + 3).unwrap();
        assert_eq!(bla.initial, insert_opcode(18) | 3);
    }

    #[test]
    fn token_map_expands_suffixes() {
        let map = mnemonic_tokens();
        assert!(map.contains_key("add"));
        assert!(map.contains_key("addo."));
        assert!(map.contains_key("stwcx."));
        assert!(map.contains_key("bla"));
        assert!(!map.contains_key("addio"));
        let info = map.get("add.").unwrap();
        assert_eq!(info.index, GekkoMnemonic::Add.index() + 1);
    }

    #[test]
    fn sprg_lookup() {
        assert_eq!(sprg_value("xer"), Some(1));
        assert_eq!(sprg_value("gqr7"), Some(919));
        assert_eq!(sprg_value("thrm3"), Some(1022));
        assert_eq!(sprg_value("nosuch"), None);
    }
}
