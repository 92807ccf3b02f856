// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// End-to-end assembly of a program exercising labels, extended mnemonics,
// data directives and block layout together.

use gekkoforge::{assemble, parse_with_visitor, Block, ParseState, Visitor};

fn words(block: &Block) -> Vec<u32> {
    block
        .bytes
        .chunks(4)
        .map(|w| u32::from_be_bytes([w[0], w[1], w[2], w[3]]))
        .collect()
}

#[test]
fn memcpy_like_routine() {
    let src = "\
.defvar count, 4
copy:
    mtctr r5
    subi r3, r3, 1
    subi r4, r4, 1
loop:
    lbzu r0, 1(r4)
    stbu r0, 1(r3)
    bdnz loop
    blr
";
    let blocks = assemble(src, 0x8000_3100).expect("assembles");
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].address, 0x8000_3100);
    assert_eq!(
        words(&blocks[0]),
        vec![
            0x7ca9_03a6, // mtctr r5
            0x3863_ffff, // subi r3, r3, 1
            0x3884_ffff, // subi r4, r4, 1
            0x8c04_0001, // lbzu r0, 1(r4)
            0x9c03_0001, // stbu r0, 1(r3)
            0x4200_fff8, // bdnz loop (-8)
            0x4e80_0020, // blr
        ]
    );
}

#[test]
fn mixed_code_and_data_blocks() {
    let src = "\
.locate 0x00300000
message:
.asciz \"ok\"
.padalign 2
entry:
    lis r3, message@ha
    addi r3, r3, message@l
    blr
";
    let blocks = assemble(src, 0).expect("assembles");
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].address, 0x0030_0000);
    let bytes = &blocks[0].bytes;
    assert_eq!(&bytes[..4], b"ok\0\0");
    assert_eq!(
        bytes[4..]
            .chunks(4)
            .map(|w| u32::from_be_bytes([w[0], w[1], w[2], w[3]]))
            .collect::<Vec<_>>(),
        vec![
            0x3c60_0030, // lis r3, 0x30 (no carry, low half is 0x0000)
            0x3863_0000, // addi r3, r3, 0
            0x4e80_0020, // blr
        ]
    );
}

#[test]
fn errors_stop_assembly_with_position() {
    let src = "nop\nnop\naddi r3, r4, 0x12345\n";
    let err = assemble(src, 0).unwrap_err();
    assert_eq!(err.line, 2);
    assert!(err.message.contains("too large"));
    assert_eq!(err.source_line, "addi r3, r4, 0x12345");
}

#[test]
fn visitor_entry_point_is_reusable() {
    // A trivial visitor that counts instructions, the way a highlighter
    // would consume the parser without building IR.
    #[derive(Default)]
    struct Counter {
        instructions: usize,
        labels: usize,
    }

    impl<'s> Visitor<'s> for Counter {
        fn on_instruction_pre(
            &mut self,
            _state: &mut ParseState<'s>,
            _info: &gekkoforge::gekko::table::ParseInfo,
            _extended: bool,
        ) {
            self.instructions += 1;
        }
        fn on_label_decl(&mut self, _state: &mut ParseState<'s>, _name: &'s str) {
            self.labels += 1;
        }
    }

    let mut counter = Counter::default();
    let err = parse_with_visitor("top:\nnop\nb top\n", &mut counter);
    assert!(err.is_none());
    assert_eq!(counter.instructions, 2);
    assert_eq!(counter.labels, 1);
}
