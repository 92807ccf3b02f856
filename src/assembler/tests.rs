// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

use super::*;

const BASE: u32 = 0x8000_3100;

fn assemble_at(src: &str, base: u32) -> Vec<Block> {
    match assemble(src, base) {
        Ok(blocks) => blocks,
        Err(err) => panic!("assembly failed for {src:?}: {} (line {})", err.message, err.line),
    }
}

fn block_words(block: &Block) -> Vec<u32> {
    assert_eq!(block.bytes.len() % 4, 0, "block is not word-sized");
    block
        .bytes
        .chunks(4)
        .map(|w| u32::from_be_bytes([w[0], w[1], w[2], w[3]]))
        .collect()
}

fn words(src: &str) -> Vec<u32> {
    let blocks = assemble_at(src, BASE);
    assert_eq!(blocks.len(), 1, "expected a single block for {src:?}");
    block_words(&blocks[0])
}

fn first_word(src: &str) -> u32 {
    words(src)[0]
}

fn asm_err(src: &str) -> AsmError {
    match assemble(src, BASE) {
        Ok(_) => panic!("expected {src:?} to fail"),
        Err(err) => err,
    }
}

#[test]
fn reference_instructions() {
    assert_eq!(first_word("nop"), 0x6000_0000);
    assert_eq!(first_word("li r3, 1"), 0x3860_0001);
    assert_eq!(first_word("addi r3, r3, -1"), 0x3863_ffff);
    assert_eq!(first_word("addi r3, r4, -1"), 0x3864_ffff);
    assert_eq!(first_word("blr"), 0x4e80_0020);
    assert_eq!(first_word("add r3, r4, r5"), 0x7c64_2a14);
    assert_eq!(first_word("lwz r1, 4(r2)"), 0x8022_0004);
    assert_eq!(first_word("stwu r1, -16(r1)"), 0x9421_fff0);
    assert_eq!(first_word("mflr r0"), 0x7c08_02a6);
    assert_eq!(first_word("mtlr r0"), 0x7c08_03a6);
    assert_eq!(first_word("sc"), 0x4400_0002);
    assert_eq!(first_word("ps_add f1, f2, f3"), 0x1022_182a);
}

#[test]
fn record_overflow_and_link_variants() {
    assert_eq!(first_word("add. r3, r4, r5"), 0x7c64_2a15);
    assert_eq!(first_word("addo r3, r4, r5"), 0x7c64_2e14);
    assert_eq!(first_word("addo. r3, r4, r5"), 0x7c64_2e15);
    assert_eq!(first_word("blrl"), 0x4e80_0021);
    // The record bit on a mnemonic without an Rc form is unknown
    let err = asm_err("addi. r3, r4, 5");
    assert!(err.message.contains("Unknown or unsupported mnemonic"));
}

#[test]
fn branch_binds_label_before_instruction() {
    let blocks = assemble_at("target:\nb target", BASE);
    assert_eq!(block_words(&blocks[0]), vec![0x4800_0000]);
}

#[test]
fn forward_references_encode_like_backward_ones() {
    // Forward: branch at BASE, label at BASE+4
    let fwd = assemble_at("b target\ntarget:\nnop", BASE);
    assert_eq!(block_words(&fwd[0])[0], 0x4800_0004);
    // Backward: label at BASE, branch at BASE+4
    let bwd = assemble_at("target:\nnop\nb target", BASE);
    assert_eq!(block_words(&bwd[0])[1], 0x4bff_fffc);
}

#[test]
fn signed_immediate_boundaries() {
    assert_eq!(first_word("addi r3, r4, 32767"), 0x3864_7fff);
    assert_eq!(first_word("addi r3, r4, -32768"), 0x3864_8000);
    assert!(asm_err("addi r3, r4, 32768").message.contains("too large"));
    assert!(asm_err("addi r3, r4, -32769").message.contains("too small"));
}

#[test]
fn paired_single_displacement_boundaries() {
    assert_eq!(first_word("psq_l f1, 4(r2), 0, 0"), 0xe022_0004);
    assert!(asm_err("psq_l f1, 0x1000(r2), 0, 0")
        .message
        .contains("too large"));
}

#[test]
fn branch_displacement_boundaries() {
    let blocks = assemble_at("b .+0x01fffffc", 0);
    assert_eq!(block_words(&blocks[0]), vec![0x49ff_fffc]);
    let err = assemble("b .+0x02000000", 0).unwrap_err();
    assert!(err.message.contains("too large"));
    assert!(assemble("b .+2", 0).unwrap_err().message.contains("Unaligned"));
}

#[test]
fn extended_mnemonics_match_their_expansions() {
    assert_eq!(first_word("mr r5, r6"), first_word("or r5, r6, r6"));
    assert_eq!(first_word("mtspr 1, r3"), first_word("mtxer r3"));
    assert_eq!(first_word("mtspr xer, r3"), first_word("mtxer r3"));
    assert_eq!(first_word("slwi r3, r4, 5"), first_word("rlwinm r3, r4, 5, 0, 26"));
    assert_eq!(first_word("srwi r3, r4, 5"), first_word("rlwinm r3, r4, 27, 5, 31"));
    assert_eq!(first_word("sub r3, r4, r5"), first_word("subf r3, r5, r4"));
    assert_eq!(first_word("subi r3, r4, 1"), first_word("addi r3, r4, -1"));
    assert_eq!(first_word("crset 2"), 0x4c42_1242);
    assert_eq!(first_word("trap"), 0x7fe0_0008);
    assert_eq!(first_word("twgti r4, 5"), 0x0d04_0005);
    assert_eq!(first_word("la r3, 8(r4)"), first_word("addi r3, r4, 8"));
}

#[test]
fn condition_and_counter_branches() {
    assert_eq!(words("blt target\ntarget:\nnop")[0], 0x4180_0004);
    assert_eq!(words("beq cr5, target\ntarget:\nnop")[0], 0x4196_0004);
    assert_eq!(words("bdnz target\ntarget:\nnop")[0], 0x4200_0004);
    // Taken-hint spellings bump BO's y bit
    assert_eq!(words("blt+ target\ntarget:\nnop")[0], 0x41a0_0004);
    assert_eq!(words("blt- target\ntarget:\nnop")[0], 0x4180_0004);
    assert_eq!(first_word("bltlr"), 0x4d80_0020);
    assert_eq!(first_word("bltlr cr1"), 0x4d84_0020);
}

#[test]
fn data_directives_emit_big_endian() {
    let blocks = assemble_at(".4byte 0xdeadbeef", BASE);
    assert_eq!(blocks[0].bytes, vec![0xde, 0xad, 0xbe, 0xef]);

    let blocks = assemble_at(".byte 1, 2, 0xff\n.2byte 0x1234\n.8byte 0x0102030405060708", BASE);
    assert_eq!(
        blocks[0].bytes,
        vec![1, 2, 0xff, 0x12, 0x34, 1, 2, 3, 4, 5, 6, 7, 8]
    );
}

#[test]
fn float_directives_emit_ieee754() {
    let blocks = assemble_at(".float 1.0, -1.5\n.double 1.0", BASE);
    let mut expect = Vec::new();
    expect.extend_from_slice(&0x3f80_0000u32.to_be_bytes());
    expect.extend_from_slice(&0xbfc0_0000u32.to_be_bytes());
    expect.extend_from_slice(&0x3ff0_0000_0000_0000u64.to_be_bytes());
    assert_eq!(blocks[0].bytes, expect);
}

#[test]
fn directive_expressions_fold() {
    let blocks = assemble_at(".4byte 1+2*3, 0x10|1, 0xff&0x0f, 1<<4, ~0, -1, (2+3)*2", BASE);
    let vals: Vec<u32> = block_words(&blocks[0]);
    assert_eq!(vals, vec![7, 0x11, 0x0f, 0x10, 0xffff_ffff, 0xffff_ffff, 10]);
}

#[test]
fn byte_directive_truncates_to_width() {
    let blocks = assemble_at(".byte 0x1ff", BASE);
    assert_eq!(blocks[0].bytes, vec![0xff]);
}

#[test]
fn ascii_and_asciz() {
    let blocks = assemble_at(".ascii \"hi\"", BASE);
    assert_eq!(blocks[0].bytes, b"hi");
    let blocks = assemble_at(".asciz \"a\\tb\\x41\\102\\n\"", BASE);
    assert_eq!(blocks[0].bytes, b"a\tbAB\n\0");
}

#[test]
fn defvar_constants() {
    assert_eq!(words(".defvar five, 5\nli r3, five")[0], 0x3860_0005);
    assert_eq!(
        words(".defvar base, 0x100\n.defvar off, base+0x20\nli r3, off")[0],
        0x3860_0120
    );
}

#[test]
fn hi_and_lo_halves() {
    // @ha carries when bit 15 of the low half is set
    let blocks = assemble_at(".defvar addr, 0x80418000\n.2byte addr@ha\n.2byte addr@l", BASE);
    assert_eq!(blocks[0].bytes, vec![0x80, 0x42, 0x80, 0x00]);

    let blocks = assemble_at(".defvar addr, 0x80417ffc\n.2byte addr@ha", BASE);
    assert_eq!(blocks[0].bytes, vec![0x80, 0x41]);

    // In instruction operands via the deferred pass
    assert_eq!(
        words(".defvar v, 0x00418000\nlis r3, v@ha")[0],
        0x3c60_0042
    );
    assert_eq!(
        words(".defvar v, 0x80418000\nori r3, r3, v@l")[0],
        0x6063_8000
    );
    assert_eq!(
        words(".defvar v, 0x80417ffc\nlwz r3, v@l(r4)")[0],
        0x8064_7ffc
    );
}

#[test]
fn rel_conv_produces_displacements() {
    assert_eq!(first_word("b `0x80003110`"), 0x4800_0010);
    let blocks = assemble_at("b `.`", 0x8000_0000);
    assert_eq!(block_words(&blocks[0]), vec![0x4800_0000]);
}

#[test]
fn dot_is_the_current_address() {
    let blocks = assemble_at("b .", 0);
    assert_eq!(block_words(&blocks[0]), vec![0x4800_0000]);
    let blocks = assemble_at(".4byte .", BASE);
    assert_eq!(block_words(&blocks[0]), vec![BASE]);
}

#[test]
fn locate_starts_new_blocks_in_order() {
    let blocks = assemble_at("nop\n.locate 0x80004000\nblr", BASE);
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].address, BASE);
    assert_eq!(block_words(&blocks[0]), vec![0x6000_0000]);
    assert_eq!(blocks[1].address, 0x8000_4000);
    assert_eq!(block_words(&blocks[1]), vec![0x4e80_0020]);
}

#[test]
fn align_starts_an_aligned_block() {
    let blocks = assemble_at(".byte 1\n.align 3\nnop", BASE);
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].bytes, vec![1]);
    assert_eq!(blocks[1].address, 0x8000_3108);

    // Already aligned: no new block
    let blocks = assemble_at(".4byte 1\n.align 2\nnop", BASE);
    assert_eq!(blocks.len(), 1);
}

#[test]
fn label_after_align_binds_to_the_aligned_base() {
    let blocks = assemble_at(".byte 1\n.align 2\nlab:\nb lab", BASE);
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[1].address, 0x8000_3104);
    assert_eq!(block_words(&blocks[1]), vec![0x4800_0000]);
}

#[test]
fn padalign_pads_within_the_block() {
    let blocks = assemble_at(".byte 1\n.padalign 2\n.4byte 0xdeadbeef", BASE);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].bytes, vec![1, 0, 0, 0, 0xde, 0xad, 0xbe, 0xef]);
}

#[test]
fn zeros_and_skip() {
    let blocks = assemble_at(".byte 1\n.zeros 3\n.byte 2", BASE);
    assert_eq!(blocks[0].bytes, vec![1, 0, 0, 0, 2]);

    let blocks = assemble_at(".byte 1\n.skip 7\n.byte 2", BASE);
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].bytes, vec![1]);
    assert_eq!(blocks[1].address, BASE + 8);
    assert_eq!(blocks[1].bytes, vec![2]);
}

#[test]
fn chunks_merge_across_kinds() {
    let blocks = assemble_at("nop\n.4byte 1\nnop", BASE);
    assert_eq!(block_words(&blocks[0]), vec![0x6000_0000, 1, 0x6000_0000]);
}

#[test]
fn empty_and_label_only_sources() {
    assert!(assemble_at("", BASE).is_empty());
    assert!(assemble_at("\n\n\n", BASE).is_empty());
    assert!(assemble_at("lonely:", BASE).is_empty());
}

#[test]
fn assembly_is_deterministic() {
    let src = "top:\nlis r3, top@ha\naddi r3, r3, 4\nb top\n.4byte 0x12345678";
    assert_eq!(assemble(src, BASE).unwrap(), assemble(src, BASE).unwrap());
}

#[test]
fn duplicate_symbols_are_rejected() {
    let err = asm_err("a:\na:");
    assert!(err.message.contains("already defined"));
    let err = asm_err("a:\n.defvar a, 1");
    assert!(err.message.contains("already defined"));
    assert_eq!(err.line, 1);
}

#[test]
fn undefined_symbols_are_reported() {
    // Instruction operands are diagnosed after the second pass
    let err = asm_err("b nowhere");
    assert!(err.message.contains("Unresolved symbol 'nowhere'"));
    assert_eq!(err.line, 0);
    assert_eq!(err.col, 2);

    // Directive operands are diagnosed immediately
    let err = asm_err(".4byte nosym");
    assert!(err.message.contains("Undefined reference"));
}

#[test]
fn lexical_errors_carry_their_own_reason() {
    let err = asm_err(".ascii \"abc");
    assert!(err.message.contains("No terminating"));
    let err = asm_err(".float 1.x");
    assert!(err.message.contains("No numeric value after decimal point"));
    let err = asm_err("li r3, 1 $ 2");
    assert!(err.message.contains("Unrecognized character"));
}

#[test]
fn syntax_errors_report_position() {
    let err = asm_err("addi r3, r4");
    assert!(err.message.contains("Expected"), "{}", err.message);
    assert_eq!(err.line, 0);

    let err = asm_err("nop nop");
    assert!(err.message.contains("where line should have ended"));

    let err = asm_err("xyzzy r1");
    assert!(err.message.contains("Unknown or unsupported mnemonic"));

    let err = asm_err(".wat 1");
    assert!(err.message.contains("Unknown assembler directive"));
    assert_eq!(err.source_line, ".wat 1");
}

#[test]
fn division_by_zero_in_directives() {
    let err = asm_err(".4byte 1/0");
    assert!(err.message.contains("Division by zero"));
}

#[test]
fn division_by_zero_in_operands_is_deferred() {
    let err = asm_err("li r3, 1/0");
    assert!(err.message.contains("Division by zero"));
}

#[test]
fn compare_pseudo_ops_default_cr0() {
    assert_eq!(first_word("cmpwi r4, 100"), 0x2c04_0064);
    assert_eq!(first_word("cmpwi cr1, r4, 100"), 0x2c84_0064);
    assert_eq!(first_word("cmplw cr1, r4, r5"), first_word("cmpl cr1, 0, r4, r5"));
}

#[test]
fn cr_bit_names_evaluate() {
    assert_eq!(first_word("crset eq"), first_word("crset 2"));
    assert_eq!(
        words("bt eq, target\ntarget:\nnop")[0],
        words("bt 2, target\ntarget:\nnop")[0]
    );
}

#[test]
fn sprg_moves() {
    assert_eq!(first_word("mtsprg 2, r7"), first_word("mtspr sprg2, r7"));
    assert_eq!(first_word("mfsprg r7, 2"), first_word("mfspr r7, sprg2"));
    assert_eq!(first_word("mtibatu 0, r4"), first_word("mtspr ibat0u, r4"));
    assert_eq!(first_word("mtibatu 1, r4"), first_word("mtspr ibat1u, r4"));
    assert_eq!(first_word("mfdbatl r4, 3"), first_word("mfspr r4, dbat3l"));
}

#[test]
fn block_address_spans_whole_range() {
    let blocks = assemble_at(".locate 0xfffffffc\n.4byte 1", BASE);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].address, 0xffff_fffc);
}
