// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Packs a mnemonic-variant index and operand list into a 32-bit
//! instruction word.

use crate::gekko::extended::{ext_mnemonic_desc, extended_row};
use crate::gekko::operand::OperandList;
use crate::gekko::table::{mnemonic_desc, mnemonic_row};

/// An encoding failure. Position info is attached by the caller, which
/// knows the instruction's line.
#[derive(Debug, Clone)]
pub struct EncodeError {
    pub message: String,
}

impl EncodeError {
    fn new(message: String) -> Self {
        Self { message }
    }
}

/// Encode one instruction. For extended mnemonics the operand transformer
/// runs first, then the basic descriptor validates and packs each field.
pub fn encode(
    mnemonic_index: usize,
    is_extended: bool,
    operands: &OperandList,
) -> Result<u32, EncodeError> {
    let mut ops = *operands;

    let index = if is_extended {
        match ext_mnemonic_desc(mnemonic_index) {
            Some(desc) => {
                desc.xform.apply(&mut ops);
                desc.mnemonic_index
            }
            None => {
                let name = extended_row(mnemonic_index)
                    .map(|row| row.name)
                    .unwrap_or("?");
                return Err(EncodeError::new(format!(
                    "Mnemonic '{name}' does not support this variant"
                )));
            }
        }
    } else {
        mnemonic_index
    };

    let desc = match mnemonic_desc(index) {
        Some(desc) => desc,
        None => {
            let name = mnemonic_row(index).map(|row| row.name).unwrap_or("?");
            return Err(EncodeError::new(format!(
                "Mnemonic '{name}' does not support this variant"
            )));
        }
    };

    if ops.overfill() {
        return Err(EncodeError::new(
            "Internal error: operand list overflowed its capacity".to_string(),
        ));
    }
    if ops.count() != desc.operands.len() {
        return Err(EncodeError::new(format!(
            "Internal error: expected {} operands, parsed {}",
            desc.operands.len(),
            ops.count()
        )));
    }

    let mut word = desc.initial;
    for (i, field) in desc.operands.iter().enumerate() {
        let val = ops[i];
        if !field.fits(val) {
            return Err(operand_error(i, val, field));
        }
        word |= field.fit(val);
    }
    Ok(word)
}

fn operand_error(
    i: usize,
    val: u32,
    field: &crate::gekko::operand::OperandDesc,
) -> EncodeError {
    let pos = i + 1;
    if field.is_signed {
        let max = field.max_val();
        let min = field.min_val();
        let in_range = val <= max || val >= min;
        if in_range {
            return EncodeError::new(format!(
                "Unaligned value for operand {pos}: low bits of {:#x} must be zero",
                val
            ));
        }
        if (val as i32) >= 0 {
            EncodeError::new(format!(
                "Value is too large for operand {pos}: {:#x} > {:#x}",
                val, max
            ))
        } else {
            EncodeError::new(format!(
                "Value is too small for operand {pos}: {} < {}",
                val as i32, min as i32
            ))
        }
    } else {
        EncodeError::new(format!(
            "Value is too large for operand {pos}: {:#x} > {:#x}",
            val,
            field.max_val()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gekko::table::{extended_tokens, mnemonic_tokens, GekkoMnemonic};

    fn encode_basic(name: &str, operands: &[u32]) -> Result<u32, EncodeError> {
        let info = mnemonic_tokens().get(name).expect("known mnemonic");
        encode(info.index, false, &OperandList::from_slice(operands))
    }

    fn encode_ext(name: &str, operands: &[u32]) -> Result<u32, EncodeError> {
        let info = extended_tokens().get(name).expect("known extended");
        encode(info.index, true, &OperandList::from_slice(operands))
    }

    #[test]
    fn basic_arithmetic_words() {
        assert_eq!(encode_basic("addi", &[3, 0, 1]).unwrap(), 0x3860_0001);
        assert_eq!(encode_basic("addi", &[3, 3, 0xffff_ffff]).unwrap(), 0x3863_ffff);
        assert_eq!(encode_basic("addi", &[3, 4, 0xffff_ffff]).unwrap(), 0x3864_ffff);
        assert_eq!(encode_basic("add", &[3, 4, 5]).unwrap(), 0x7c64_2a14);
        assert_eq!(encode_basic("add.", &[3, 4, 5]).unwrap(), 0x7c64_2a15);
        assert_eq!(encode_basic("addo", &[3, 4, 5]).unwrap(), 0x7c64_2e14);
    }

    #[test]
    fn extended_words_match_their_expansion() {
        assert_eq!(encode_ext("nop", &[]).unwrap(), 0x6000_0000);
        assert_eq!(encode_ext("li", &[3, 1]).unwrap(), 0x3860_0001);
        assert_eq!(encode_ext("blr", &[]).unwrap(), 0x4e80_0020);
        assert_eq!(
            encode_ext("mr", &[5, 6]).unwrap(),
            encode_basic("or", &[5, 6, 6]).unwrap()
        );
        assert_eq!(
            encode_ext("mtxer", &[3]).unwrap(),
            encode_ext("mtspr", &[1, 3]).unwrap()
        );
        assert_eq!(encode_ext("trap", &[]).unwrap(), 0x7fe0_0008);
    }

    #[test]
    fn simm_range_is_enforced() {
        assert!(encode_basic("addi", &[3, 4, 32767]).is_ok());
        let err = encode_basic("addi", &[3, 4, 32768]).unwrap_err();
        assert!(err.message.contains("too large"), "{}", err.message);
        assert!(encode_basic("addi", &[3, 4, (-32768i32) as u32]).is_ok());
        let err = encode_basic("addi", &[3, 4, (-32769i32) as u32]).unwrap_err();
        assert!(err.message.contains("too small"), "{}", err.message);
    }

    #[test]
    fn branch_displacement_range_and_alignment() {
        assert_eq!(encode_basic("b", &[0x01ff_fffc]).unwrap(), 0x49ff_fffc);
        assert!(encode_basic("b", &[0x0200_0000]).is_err());
        let err = encode_basic("b", &[0x2]).unwrap_err();
        assert!(err.message.contains("Unaligned"), "{}", err.message);
    }

    #[test]
    fn paired_single_displacement_is_twelve_bits() {
        // lwz takes a full signed 16-bit displacement
        assert!(encode_basic("lwz", &[1, 4, 2]).is_ok());
        assert!(encode_basic("lwz", &[1, 0x1000, 2]).is_ok());
        // psq_l's field is 12 bits; 0x1000 no longer fits
        assert!(encode_basic("psq_l", &[1, 4, 2, 0, 0]).is_ok());
        let err = encode_basic("psq_l", &[1, 0x1000, 2, 0, 0]).unwrap_err();
        assert!(err.message.contains("too large"), "{}", err.message);
    }

    #[test]
    fn overfilled_list_is_refused() {
        let mut ops = OperandList::from_slice(&[1, 2, 3, 4, 5]);
        ops.insert(0, 6);
        assert!(ops.overfill());
        let info = mnemonic_tokens().get("rlwinm").unwrap();
        let err = encode(info.index, false, &ops).unwrap_err();
        assert!(err.message.contains("overflow"), "{}", err.message);
    }

    #[test]
    fn missing_variant_is_reported() {
        // addi is plain; fabricate its record-bit slot
        let err = encode(
            GekkoMnemonic::Addi.index() + 1,
            false,
            &OperandList::from_slice(&[3, 4, 5]),
        )
        .unwrap_err();
        assert!(err.message.contains("does not support"), "{}", err.message);
    }
}
