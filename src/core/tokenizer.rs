// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Tokenizer for Gekko assembly source.
//!
//! Tokens are produced on demand into a lookahead deque. The identifier
//! match rule is settable because mnemonics may contain `+`, `-` and `.`
//! (`bdnztlr+`, `stwcx.`) while directive names may start with a digit
//! (`.2byte`); changing the rule feeds any lexed lookahead back into the
//! source so the new rule re-scans it.

use std::collections::VecDeque;

use crate::gekko::table::sprg_value;

/// A byte span within a line: starting column and length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Interval {
    pub begin: usize,
    pub len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Invalid,
    Identifier,
    StringLit,
    HexLit,
    DecimalLit,
    OctalLit,
    BinaryLit,
    FloatLit,
    Gpr,
    Fpr,
    CrField,
    Spr,
    Lt,
    Gt,
    Eq,
    So,
    // EOL separates instructions, a la ';'
    Eol,
    Eof,
    Dot,
    Colon,
    Comma,
    Lparen,
    Rparen,
    Pipe,
    Caret,
    Ampersand,
    Lsh,
    Rsh,
    Plus,
    Minus,
    Star,
    Slash,
    Tilde,
    Grave,
    At,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Invalid => "Invalid",
            TokenKind::Identifier => "Identifier",
            TokenKind::StringLit => "String Literal",
            TokenKind::HexLit => "Hexadecimal Literal",
            TokenKind::DecimalLit => "Decimal Literal",
            TokenKind::OctalLit => "Octal Literal",
            TokenKind::BinaryLit => "Binary Literal",
            TokenKind::FloatLit => "Float Literal",
            TokenKind::Gpr => "GPR",
            TokenKind::Fpr => "FPR",
            TokenKind::CrField => "CR Field",
            TokenKind::Spr => "SPR",
            TokenKind::Lt | TokenKind::Gt | TokenKind::Eq | TokenKind::So => "CR Bit",
            TokenKind::Eol => "End of Line",
            TokenKind::Eof => "End of File",
            TokenKind::Dot => ".",
            TokenKind::Colon => ":",
            TokenKind::Comma => ",",
            TokenKind::Lparen => "(",
            TokenKind::Rparen => ")",
            TokenKind::Pipe => "|",
            TokenKind::Caret => "^",
            TokenKind::Ampersand => "&",
            TokenKind::Lsh => "<<",
            TokenKind::Rsh => ">>",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Tilde => "~",
            TokenKind::Grave => "`",
            TokenKind::At => "@",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub invalid_reason: &'static str,
    /// Within an invalid token, the erroneous sub-range.
    pub invalid_region: Interval,
}

fn nib(c: u8) -> u32 {
    match c {
        b'a'..=b'f' => (c - b'a' + 10) as u32,
        b'A'..=b'F' => (c - b'A' + 10) as u32,
        _ => (c - b'0') as u32,
    }
}

macro_rules! impl_eval_int {
    ($fn_name:ident, $t:ty) => {
        pub fn $fn_name(&self) -> Option<$t> {
            let fold = |skip: usize, radix: $t| -> $t {
                self.text.bytes().skip(skip).fold(0 as $t, |acc, c| {
                    acc.wrapping_mul(radix).wrapping_add(nib(c) as $t)
                })
            };
            match self.kind {
                TokenKind::HexLit => Some(fold(2, 16)),
                TokenKind::DecimalLit => Some(fold(0, 10)),
                TokenKind::OctalLit => Some(fold(1, 8)),
                TokenKind::BinaryLit => Some(fold(2, 2)),
                TokenKind::Gpr | TokenKind::Fpr => Some(fold(1, 10)),
                TokenKind::CrField => Some(fold(2, 10)),
                TokenKind::Spr => sprg_value(self.text).map(|v| v as $t),
                TokenKind::Lt => Some(0),
                TokenKind::Gt => Some(1),
                TokenKind::Eq => Some(2),
                TokenKind::So => Some(3),
                _ => None,
            }
        }
    };
}

impl<'a> Token<'a> {
    pub fn val_str(&self) -> &'a str {
        match self.kind {
            TokenKind::Eol => "<EOL>",
            TokenKind::Eof => "<EOF>",
            _ => self.text,
        }
    }

    impl_eval_int!(eval_u8, u8);
    impl_eval_int!(eval_u16, u16);
    impl_eval_int!(eval_u32, u32);
    impl_eval_int!(eval_u64, u64);

    pub fn eval_f32(&self) -> Option<f32> {
        match self.kind {
            TokenKind::FloatLit => self.text.parse().ok(),
            _ => None,
        }
    }

    pub fn eval_f64(&self) -> Option<f64> {
        match self.kind {
            TokenKind::FloatLit => self.text.parse().ok(),
            _ => None,
        }
    }
}

/// Convert a string literal (including its quotes) into raw data bytes,
/// applying C-style escapes. Octal escapes take at most three digits, hex
/// escapes take any number of digits and keep the low eight bits.
pub fn convert_string_literal(literal: &str, out: &mut Vec<u8>) {
    let bytes = literal.as_bytes();
    debug_assert!(bytes.len() >= 2);
    let mut i = 1;
    let end = bytes.len() - 1;
    while i < end {
        if bytes[i] != b'\\' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        i += 1;
        match bytes[i] {
            b'0'..=b'7' => {
                let mut val: u32 = 0;
                let mut digits = 0;
                while i < end && digits < 3 && (b'0'..=b'7').contains(&bytes[i]) {
                    val = (val << 3) + (bytes[i] - b'0') as u32;
                    i += 1;
                    digits += 1;
                }
                out.push(val as u8);
            }
            b'x' => {
                i += 1;
                let mut val: u32 = 0;
                while i < end && bytes[i].is_ascii_hexdigit() {
                    val = (val << 4) + nib(bytes[i]);
                    i += 1;
                }
                out.push(val as u8);
            }
            c => {
                out.push(match c {
                    b'a' => 0x07,
                    b'b' => 0x08,
                    b'f' => 0x0c,
                    b'n' => 0x0a,
                    b'r' => 0x0d,
                    b't' => 0x09,
                    b'v' => 0x0b,
                    // \' \" \? \\ and unknown escapes pass through
                    _ => c,
                });
                i += 1;
            }
        }
    }
}

//////////////////
// LEXER TABLES //
//////////////////

// In place of regexes, explicit DFAs match the two complex lexemes. This
// also lets match failures carry a reason.
pub struct DfaNode {
    pub edges: &'static [(fn(char) -> bool, usize)],
    /// `None` marks a final node; otherwise the reason the match is invalid.
    pub failure: Option<&'static str>,
}

fn t_plus_or_minus(c: char) -> bool {
    c == '+' || c == '-'
}
fn t_digit(c: char) -> bool {
    c.is_ascii_digit()
}
fn t_e(c: char) -> bool {
    c == 'e'
}
fn t_dot(c: char) -> bool {
    c == '.'
}
fn t_normal(c: char) -> bool {
    c != '\n' && c != '"' && c != '\\'
}
fn t_newline(c: char) -> bool {
    c == '\n'
}
fn t_octal(c: char) -> bool {
    ('0'..='7').contains(&c)
}
fn t_hex(c: char) -> bool {
    c.is_ascii_hexdigit()
}
fn t_normal_minus_octal(c: char) -> bool {
    t_normal(c) && !t_octal(c)
}
fn t_normal_minus_hex(c: char) -> bool {
    t_normal(c) && !t_hex(c)
}
fn t_escape(c: char) -> bool {
    c == '\\'
}
fn t_single_escape(c: char) -> bool {
    !t_octal(c) && c != 'x' && c != '\n'
}
fn t_hexstart(c: char) -> bool {
    c == 'x'
}
fn t_quote(c: char) -> bool {
    c == '"'
}

// Floating point strings accepted by str::parse::<f32/f64>
// regex: [+-]?(\d+(\.\d+)?|\.\d+)(e[+-]?\d+)?
pub static FLOAT_DFA: [DfaNode; 10] = [
    /* 0 */
    DfaNode {
        edges: &[(t_plus_or_minus, 1), (t_digit, 2), (t_dot, 5)],
        failure: Some("Invalid float: No numeric value"),
    },
    /* 1 */
    DfaNode {
        edges: &[(t_digit, 2), (t_dot, 5)],
        failure: Some("Invalid float: No numeric value"),
    },
    /* 2 */
    DfaNode {
        edges: &[(t_digit, 2), (t_dot, 3)],
        failure: None,
    },
    /* 3 */
    DfaNode {
        edges: &[(t_digit, 4)],
        failure: Some("Invalid float: No numeric value after decimal point"),
    },
    /* 4 */
    DfaNode {
        edges: &[(t_digit, 4), (t_e, 7)],
        failure: None,
    },
    /* 5 */
    DfaNode {
        edges: &[(t_digit, 6)],
        failure: Some("Invalid float: No numeric value after decimal point"),
    },
    /* 6 */
    DfaNode {
        edges: &[(t_digit, 6), (t_e, 7)],
        failure: None,
    },
    /* 7 */
    DfaNode {
        edges: &[(t_digit, 9), (t_plus_or_minus, 8)],
        failure: Some("Invalid float: No numeric value following exponent signifier"),
    },
    /* 8 */
    DfaNode {
        edges: &[(t_digit, 9)],
        failure: Some("Invalid float: No numeric value following exponent signifier"),
    },
    /* 9 */
    DfaNode {
        edges: &[(t_digit, 9)],
        failure: None,
    },
];

// C-style strings
// regex: "([^\\\n]|\\([0-7]{1,3}|x[0-9a-fA-F]+|[^x0-7\n]))*"
pub static STRING_DFA: [DfaNode; 8] = [
    // Base character check
    /* 0 */
    DfaNode {
        edges: &[(t_normal, 0), (t_newline, 1), (t_quote, 2), (t_escape, 3)],
        failure: Some("Invalid string: No terminating \""),
    },
    // Unescaped newline
    /* 1 */
    DfaNode {
        edges: &[],
        failure: Some("Invalid string: No terminating \""),
    },
    // String end
    /* 2 */
    DfaNode {
        edges: &[],
        failure: None,
    },
    // Escape character breakout
    /* 3 */
    DfaNode {
        edges: &[
            (t_single_escape, 0),
            (t_newline, 1),
            (t_octal, 4),
            (t_hexstart, 6),
        ],
        failure: Some("Invalid string: No terminating \""),
    },
    // Octal characters, at most 3
    /* 4 */
    DfaNode {
        edges: &[
            (t_normal_minus_octal, 0),
            (t_newline, 1),
            (t_quote, 2),
            (t_escape, 3),
            (t_octal, 5),
        ],
        failure: Some("Invalid string: No terminating \""),
    },
    /* 5 */
    DfaNode {
        edges: &[(t_normal, 0), (t_newline, 1), (t_quote, 2), (t_escape, 3)],
        failure: Some("Invalid string: No terminating \""),
    },
    // Hex characters, 1 or more
    /* 6 */
    DfaNode {
        edges: &[(t_hex, 7)],
        failure: Some("Invalid string: bad hex escape"),
    },
    /* 7 */
    DfaNode {
        edges: &[
            (t_normal_minus_hex, 0),
            (t_newline, 1),
            (t_quote, 2),
            (t_escape, 3),
            (t_hex, 7),
        ],
        failure: Some("Invalid string: No terminating \""),
    },
];

///////////
// LEXER //
///////////

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorPos {
    pub index: usize,
    pub line: usize,
    pub col: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentRule {
    Typical,
    /// Mnemonics can contain `+`, `-`, or `.` for branch prediction hints
    /// and the record bit.
    Mnemonic,
    /// Directives can start with a digit.
    Directive,
}

pub struct Lexer<'a> {
    source: &'a str,
    pos: CursorPos,
    scan_pos: CursorPos,
    lookahead: VecDeque<(CursorPos, Token<'a>)>,
    rule: IdentRule,
}

fn single_char_token(c: char) -> TokenKind {
    match c {
        ',' => TokenKind::Comma,
        '(' => TokenKind::Lparen,
        ')' => TokenKind::Rparen,
        '|' => TokenKind::Pipe,
        '^' => TokenKind::Caret,
        '&' => TokenKind::Ampersand,
        '+' => TokenKind::Plus,
        '-' => TokenKind::Minus,
        '*' => TokenKind::Star,
        '/' => TokenKind::Slash,
        '~' => TokenKind::Tilde,
        '@' => TokenKind::At,
        ':' => TokenKind::Colon,
        '`' => TokenKind::Grave,
        '.' => TokenKind::Dot,
        '\0' => TokenKind::Eof,
        '\n' => TokenKind::Eol,
        _ => TokenKind::Invalid,
    }
}

fn valid_regnum(rn: &str) -> bool {
    let b = rn.as_bytes();
    match b {
        [d] => d.is_ascii_digit(),
        [d0, d1] if d0.is_ascii_digit() && d1.is_ascii_digit() => match d0 {
            b'1' | b'2' => true,
            b'3' => *d1 <= b'1',
            _ => false,
        },
        _ => false,
    }
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: CursorPos::default(),
            scan_pos: CursorPos::default(),
            lookahead: VecDeque::new(),
            rule: IdentRule::Typical,
        }
    }

    pub fn line_number(&self) -> usize {
        match self.lookahead.front() {
            Some((tag, _)) => tag.line,
            None => self.pos.line,
        }
    }

    pub fn col_number(&self) -> usize {
        match self.lookahead.front() {
            Some((tag, _)) => tag.col,
            None => self.pos.col,
        }
    }

    /// The full text of the line the lexer is currently positioned on.
    pub fn current_line(&self) -> &'a str {
        let line_index = match self.lookahead.front() {
            Some((tag, _)) => tag.index,
            None => self.pos.index,
        };
        let before = &self.source[..line_index.min(self.source.len())];
        let begin = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let rest = &self.source[begin..];
        let end = match rest.find('\n') {
            Some(i) => begin + i + 1,
            None => self.source.len(),
        };
        &self.source[begin..end]
    }

    /// Changing the identifier rule invalidates lexed lookahead so the new
    /// rule re-scans it.
    pub fn set_ident_rule(&mut self, rule: IdentRule) {
        self.feedback_tokens();
        self.rule = rule;
    }

    fn feedback_tokens(&mut self) {
        if let Some(&(tag, _)) = self.lookahead.front() {
            self.pos = tag;
            self.scan_pos = tag;
            self.lookahead.clear();
        }
    }

    fn ensure(&mut self, n: usize) {
        while self.lookahead.len() < n {
            let p = self.pos;
            let tok = self.lex_single();
            self.lookahead.push_back((p, tok));
        }
    }

    pub fn lookahead(&mut self) -> Token<'a> {
        self.ensure(1);
        self.lookahead[0].1
    }

    pub fn lookahead_kind(&mut self) -> TokenKind {
        self.lookahead().kind
    }

    pub fn lookahead_nth(&mut self, n: usize) -> Token<'a> {
        self.ensure(n + 1);
        self.lookahead[n].1
    }

    /// Floats are only lexed in one place (`.float`/`.double` operands), so
    /// an explicit "lex a float now" entry point is acceptable.
    pub fn lookahead_float(&mut self) -> Token<'a> {
        self.feedback_tokens();
        self.skip_ws();

        let pos_pre = self.pos;
        self.scan_start();
        let failure = self.run_dfa(&FLOAT_DFA);

        // Lex at least a single char on no match so errors make sense
        if self.scan_pos.index == pos_pre.index {
            self.step();
        }

        let text = self.scan_finish_out();
        let tok = match failure {
            None => Token {
                kind: TokenKind::FloatLit,
                text,
                invalid_reason: "",
                invalid_region: Interval::default(),
            },
            Some(reason) => Token {
                kind: TokenKind::Invalid,
                text,
                invalid_reason: reason,
                invalid_region: Interval {
                    begin: 0,
                    len: text.len(),
                },
            },
        };
        self.lookahead.push_back((pos_pre, tok));
        tok
    }

    pub fn eat(&mut self) {
        if self.lookahead.pop_front().is_none() {
            self.lex_single();
        }
    }

    pub fn eat_and_reset(&mut self) {
        self.eat();
        self.set_ident_rule(IdentRule::Typical);
    }

    pub fn eat_n(&mut self, n: usize) {
        let mut consumed = 0;
        while consumed < n && self.lookahead.pop_front().is_some() {
            consumed += 1;
        }
        for _ in consumed..n {
            self.lex_single();
        }
    }

    fn run_dfa(&mut self, dfa: &[DfaNode]) -> Option<&'static str> {
        let mut index = 0;
        loop {
            let c = self.peek();
            if c == '\0' {
                break;
            }
            let node = &dfa[index];
            let mut found = false;
            for &(test, next) in node.edges {
                if test(c) {
                    index = next;
                    found = true;
                    break;
                }
            }
            if !found {
                break;
            }
            self.step();
        }
        dfa[index].failure
    }

    fn skip_ws(&mut self) {
        self.scan_start();
        while {
            let c = self.peek();
            c != '\n' && c != '\0' && c.is_whitespace()
        } {
            self.step();
        }
        self.scan_finish();
    }

    fn ident_head_extra(&self, c: char) -> bool {
        match self.rule {
            IdentRule::Typical | IdentRule::Mnemonic => false,
            IdentRule::Directive => c.is_ascii_digit(),
        }
    }

    fn ident_extra(&self, c: char) -> bool {
        match self.rule {
            IdentRule::Typical | IdentRule::Directive => false,
            IdentRule::Mnemonic => c == '+' || c == '-' || c == '.',
        }
    }

    fn scan_start(&mut self) {
        self.scan_pos = self.pos;
    }

    fn scan_finish(&mut self) {
        self.pos = self.scan_pos;
    }

    fn scan_finish_out(&mut self) -> &'a str {
        let start = self.pos.index;
        self.pos = self.scan_pos;
        &self.source[start..self.scan_pos.index]
    }

    fn peek(&self) -> char {
        self.source[self.scan_pos.index..].chars().next().unwrap_or('\0')
    }

    fn step(&mut self) -> char {
        let c = self.peek();
        if c == '\0' {
            return c;
        }
        if c == '\n' {
            self.scan_pos.line += 1;
            self.scan_pos.col = 0;
        } else {
            self.scan_pos.col += 1;
        }
        self.scan_pos.index += c.len_utf8();
        self.peek()
    }

    fn lex_string_lit(&mut self) -> (TokenKind, &'static str, Interval) {
        // The open quote has already been matched
        let string_start = self.scan_pos.index - 1;
        match self.run_dfa(&STRING_DFA) {
            None => (TokenKind::StringLit, "", Interval::default()),
            Some(reason) => (
                TokenKind::Invalid,
                reason,
                Interval {
                    begin: 0,
                    len: self.scan_pos.index - string_start,
                },
            ),
        }
    }

    fn classify_alnum(&self) -> TokenKind {
        let alnum = &self.source[self.pos.index..self.scan_pos.index];
        let head = alnum.as_bytes()[0];
        if head == b'r' && valid_regnum(&alnum[1..]) {
            TokenKind::Gpr
        } else if head == b'f' && valid_regnum(&alnum[1..]) {
            TokenKind::Fpr
        } else if alnum.len() == 3
            && alnum.starts_with("cr")
            && (b'0'..=b'7').contains(&alnum.as_bytes()[2])
        {
            TokenKind::CrField
        } else if alnum == "lt" {
            TokenKind::Lt
        } else if alnum == "gt" {
            TokenKind::Gt
        } else if alnum == "eq" {
            TokenKind::Eq
        } else if alnum == "so" {
            TokenKind::So
        } else if sprg_value(alnum).is_some() {
            TokenKind::Spr
        } else {
            TokenKind::Identifier
        }
    }

    fn lex_single(&mut self) -> Token<'a> {
        self.skip_ws();

        self.scan_start();
        let h = self.peek();

        let mut invalid_reason = "";
        let mut invalid_region = Interval::default();

        let mut c = self.step();

        let kind = if h.is_ascii_alphabetic() || h == '_' || self.ident_head_extra(h) {
            while c.is_ascii_alphanumeric() || c == '_' || self.ident_extra(c) {
                c = self.step();
            }
            self.classify_alnum()
        } else if h == '"' {
            let (kind, reason, region) = self.lex_string_lit();
            invalid_reason = reason;
            invalid_region = region;
            kind
        } else if h == '0' {
            match c {
                'x' => {
                    self.step();
                    while self.peek().is_ascii_hexdigit() {
                        self.step();
                    }
                    TokenKind::HexLit
                }
                'b' => {
                    self.step();
                    while matches!(self.peek(), '0' | '1') {
                        self.step();
                    }
                    TokenKind::BinaryLit
                }
                '0'..='7' => {
                    while t_octal(self.peek()) {
                        self.step();
                    }
                    TokenKind::OctalLit
                }
                _ => TokenKind::DecimalLit,
            }
        } else if h.is_ascii_digit() {
            while self.peek().is_ascii_digit() {
                self.step();
            }
            TokenKind::DecimalLit
        } else if h == '<' || h == '>' {
            // Two-character shift operators; a lone angle is invalid
            if c == h {
                self.step();
                if h == '<' {
                    TokenKind::Lsh
                } else {
                    TokenKind::Rsh
                }
            } else {
                invalid_reason = "Unrecognized character";
                invalid_region = Interval { begin: 0, len: 1 };
                TokenKind::Invalid
            }
        } else {
            let kind = single_char_token(h);
            if kind == TokenKind::Invalid {
                invalid_reason = "Unrecognized character";
                invalid_region = Interval { begin: 0, len: 1 };
            }
            kind
        };

        let tok = Token {
            kind,
            text: self.scan_finish_out(),
            invalid_reason,
            invalid_region,
        };
        self.skip_ws();
        tok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(src);
        let mut out = Vec::new();
        loop {
            let tok = lexer.lookahead();
            out.push(tok.kind);
            if tok.kind == TokenKind::Eof {
                return out;
            }
            lexer.eat();
        }
    }

    #[test]
    fn classifies_registers_and_builtins() {
        assert_eq!(
            kinds("r0 r31 f15 cr7 lt gt eq so xer sprg3 label"),
            vec![
                TokenKind::Gpr,
                TokenKind::Gpr,
                TokenKind::Fpr,
                TokenKind::CrField,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Eq,
                TokenKind::So,
                TokenKind::Spr,
                TokenKind::Spr,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn out_of_range_regnum_is_identifier() {
        assert_eq!(kinds("r32")[0], TokenKind::Identifier);
        assert_eq!(kinds("f40")[0], TokenKind::Identifier);
        assert_eq!(kinds("cr8")[0], TokenKind::Identifier);
        assert_eq!(kinds("r007")[0], TokenKind::Identifier);
    }

    #[test]
    fn numeric_literal_bases() {
        let mut lexer = Lexer::new("0x1f 0b101 017 42 0");
        assert_eq!(lexer.lookahead().eval_u32(), Some(0x1f));
        lexer.eat();
        assert_eq!(lexer.lookahead().eval_u32(), Some(5));
        lexer.eat();
        assert_eq!(lexer.lookahead().eval_u32(), Some(0o17));
        lexer.eat();
        assert_eq!(lexer.lookahead().eval_u32(), Some(42));
        lexer.eat();
        let zero = lexer.lookahead();
        assert_eq!(zero.kind, TokenKind::DecimalLit);
        assert_eq!(zero.eval_u32(), Some(0));
    }

    #[test]
    fn eval_narrows_with_wrapping() {
        let mut lexer = Lexer::new("0x1ff");
        let tok = lexer.lookahead();
        assert_eq!(tok.eval_u8(), Some(0xff));
        assert_eq!(tok.eval_u16(), Some(0x1ff));
    }

    #[test]
    fn shift_operators_require_doubling() {
        assert_eq!(
            kinds("1 << 2 >> 3")[1..4],
            [TokenKind::Lsh, TokenKind::DecimalLit, TokenKind::Rsh]
        );
        let mut lexer = Lexer::new("1 < 2");
        lexer.eat();
        let bad = lexer.lookahead();
        assert_eq!(bad.kind, TokenKind::Invalid);
        assert_eq!(bad.invalid_reason, "Unrecognized character");
    }

    #[test]
    fn mnemonic_rule_accepts_suffix_punctuation() {
        let mut lexer = Lexer::new("stwcx. r3");
        // Typical rule splits the dot off
        assert_eq!(lexer.lookahead().text, "stwcx");
        lexer.set_ident_rule(IdentRule::Mnemonic);
        // Rule change rewinds the lookahead and re-scans
        assert_eq!(lexer.lookahead().text, "stwcx.");
        lexer.set_ident_rule(IdentRule::Typical);
        assert_eq!(lexer.lookahead().text, "stwcx");
    }

    #[test]
    fn directive_rule_accepts_leading_digit() {
        let mut lexer = Lexer::new("2byte");
        lexer.set_ident_rule(IdentRule::Directive);
        let tok = lexer.lookahead();
        assert_eq!(tok.kind, TokenKind::Identifier);
        assert_eq!(tok.text, "2byte");
    }

    #[test]
    fn float_lexing_reports_reasons() {
        let mut lexer = Lexer::new("1.5e3");
        assert_eq!(lexer.lookahead_float().kind, TokenKind::FloatLit);

        let mut lexer = Lexer::new("1.x");
        let tok = lexer.lookahead_float();
        assert_eq!(tok.kind, TokenKind::Invalid);
        assert_eq!(
            tok.invalid_reason,
            "Invalid float: No numeric value after decimal point"
        );

        let mut lexer = Lexer::new("1.5e+");
        let tok = lexer.lookahead_float();
        assert_eq!(
            tok.invalid_reason,
            "Invalid float: No numeric value following exponent signifier"
        );
    }

    #[test]
    fn string_literals_and_failures() {
        let mut lexer = Lexer::new("\"ab\\n\\x41\\101\"");
        assert_eq!(lexer.lookahead().kind, TokenKind::StringLit);

        let mut lexer = Lexer::new("\"oops\n\"");
        let tok = lexer.lookahead();
        assert_eq!(tok.kind, TokenKind::Invalid);
        assert_eq!(tok.invalid_reason, "Invalid string: No terminating \"");

        let mut lexer = Lexer::new("\"\\xg\"");
        assert_eq!(
            lexer.lookahead().invalid_reason,
            "Invalid string: bad hex escape"
        );
    }

    #[test]
    fn string_conversion_applies_escapes() {
        let mut out = Vec::new();
        convert_string_literal("\"a\\t\\x41\\102\\\\\"", &mut out);
        assert_eq!(out, b"a\tAB\\");
    }

    #[test]
    fn octal_escape_capped_at_three_digits() {
        let mut out = Vec::new();
        convert_string_literal("\"\\1234\"", &mut out);
        assert_eq!(out, &[0o123, b'4']);
    }

    #[test]
    fn tracks_lines_and_columns() {
        let mut lexer = Lexer::new("a\n  b");
        lexer.eat(); // a
        lexer.eat(); // EOL
        let tok = lexer.lookahead();
        assert_eq!(tok.text, "b");
        assert_eq!(lexer.line_number(), 1);
        assert_eq!(lexer.col_number(), 2);
        assert_eq!(lexer.current_line(), "  b");
    }
}
