// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Event-driven recursive-descent parser.
//!
//! No AST is built; every syntactic event is dispatched to a [`Visitor`].
//! The IR generator and a syntax highlighter are both visitors over the
//! same grammar. Callbacks must not re-enter the parser; they may inspect
//! the lexer position and set the error slot through [`ParseState`].

use crate::core::error::{AsmError, AsmErrorKind};
use crate::core::tokenizer::{IdentRule, Lexer, Token, TokenKind};
use crate::gekko::directive::Directive;
use crate::gekko::table::{extended_tokens, mnemonic_tokens, ParseAlg, ParseInfo};

/// Expression operators, dispatched after both operands have fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsmOp {
    Or,
    Xor,
    And,
    Lsh,
    Rsh,
    Add,
    Sub,
    Mul,
    Div,
    Neg,
    Not,
}

/// Terminal categories, dispatched before the token is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Hex,
    Dec,
    Oct,
    Bin,
    Flt,
    Str,
    Id,
    Gpr,
    Fpr,
    Spr,
    CrField,
    Lt,
    Gt,
    Eq,
    So,
    Dot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParenKind {
    Normal,
    /// Backtick group: the enclosed value is converted to an offset from
    /// the current instruction address.
    RelConv,
}

pub struct ParseState<'src> {
    pub lexer: Lexer<'src>,
    pub error: Option<AsmError>,
    pub eof: bool,
}

impl<'src> ParseState<'src> {
    pub fn new(input: &'src str) -> Self {
        Self {
            lexer: Lexer::new(input),
            error: None,
            eof: false,
        }
    }

    pub fn has_token(&mut self, kind: TokenKind) -> bool {
        self.lexer.lookahead_kind() == kind
    }

    pub fn parse_token(&mut self, kind: TokenKind) {
        let tok = self.lexer.lookahead();
        if tok.kind == kind {
            self.lexer.eat();
        } else {
            self.emit_error_here(
                AsmErrorKind::Syntax,
                format!("Expected '{}' but found '{}'", kind.as_str(), tok.val_str()),
            );
        }
    }

    /// Materialize an error at the lexer's current position. If the current
    /// token is itself invalid, its own reason and sub-range win over the
    /// grammar-level message.
    pub fn emit_error_here(&mut self, kind: AsmErrorKind, message: String) {
        let tok = self.lexer.lookahead();
        let source_line = self.lexer.current_line().trim_end_matches('\n');
        if tok.kind == TokenKind::Invalid {
            self.error = Some(AsmError::new(
                AsmErrorKind::Lexical,
                tok.invalid_reason,
                source_line,
                self.lexer.line_number(),
                self.lexer.col_number() + tok.invalid_region.begin,
                tok.invalid_region.len,
            ));
        } else {
            self.error = Some(AsmError::new(
                kind,
                message,
                source_line,
                self.lexer.line_number(),
                self.lexer.col_number(),
                tok.text.len(),
            ));
        }
    }
}

/// Skeleton callbacks invoked as the parser recognises points of interest.
///
/// `pre` callbacks fire before the head of the nonterminal is parsed, `post`
/// callbacks after it has been fully parsed. Token callbacks fire before the
/// token is consumed.
#[allow(unused_variables)]
pub trait Visitor<'src> {
    fn on_directive_pre(&mut self, state: &mut ParseState<'src>, directive: Directive) {}
    fn on_directive_post(&mut self, state: &mut ParseState<'src>, directive: Directive) {}
    fn on_instruction_pre(&mut self, state: &mut ParseState<'src>, info: &ParseInfo, extended: bool) {
    }
    fn on_instruction_post(
        &mut self,
        state: &mut ParseState<'src>,
        info: &ParseInfo,
        extended: bool,
    ) {
    }
    fn on_operand_pre(&mut self, state: &mut ParseState<'src>) {}
    fn on_operand_post(&mut self, state: &mut ParseState<'src>) {}
    fn on_resolved_expr_pre(&mut self, state: &mut ParseState<'src>) {}
    fn on_resolved_expr_post(&mut self, state: &mut ParseState<'src>) {}
    fn on_operator(&mut self, state: &mut ParseState<'src>, operation: AsmOp) {}
    fn on_terminal(&mut self, state: &mut ParseState<'src>, terminal: Terminal, tok: &Token<'src>) {
    }
    fn on_hi_addr(&mut self, state: &mut ParseState<'src>, id: &'src str) {}
    fn on_lo_addr(&mut self, state: &mut ParseState<'src>, id: &'src str) {}
    fn on_open_paren(&mut self, state: &mut ParseState<'src>, kind: ParenKind) {}
    fn on_close_paren(&mut self, state: &mut ParseState<'src>, kind: ParenKind) {}
    fn on_label_decl(&mut self, state: &mut ParseState<'src>, name: &'src str) {}
    fn on_var_decl(&mut self, state: &mut ParseState<'src>, name: &'src str) {}
    fn on_error(&mut self, state: &mut ParseState<'src>) {}
    fn post_parse_action(&mut self, state: &mut ParseState<'src>) {}
}

/// The set of tokens an operand can start with; used to recognise "no
/// operands present" for mnemonics that allow zero.
fn match_operand_first(tok: &Token<'_>) -> bool {
    matches!(
        tok.kind,
        TokenKind::Minus
            | TokenKind::Tilde
            | TokenKind::Lparen
            | TokenKind::Grave
            | TokenKind::Identifier
            | TokenKind::DecimalLit
            | TokenKind::OctalLit
            | TokenKind::HexLit
            | TokenKind::BinaryLit
            | TokenKind::Dot
    )
}

fn parse_imm<'s, V: Visitor<'s>>(state: &mut ParseState<'s>, v: &mut V) {
    let tok = state.lexer.lookahead();
    match tok.kind {
        TokenKind::HexLit => v.on_terminal(state, Terminal::Hex, &tok),
        TokenKind::DecimalLit => v.on_terminal(state, Terminal::Dec, &tok),
        TokenKind::OctalLit => v.on_terminal(state, Terminal::Oct, &tok),
        TokenKind::BinaryLit => v.on_terminal(state, Terminal::Bin, &tok),
        _ => {
            state.emit_error_here(
                AsmErrorKind::Syntax,
                format!("Invalid {} with value '{}'", tok.kind.as_str(), tok.val_str()),
            );
            return;
        }
    }
    if state.error.is_some() {
        return;
    }
    state.lexer.eat();
}

fn parse_id<'s, V: Visitor<'s>>(state: &mut ParseState<'s>, v: &mut V) {
    let tok = state.lexer.lookahead();
    if tok.kind == TokenKind::Identifier {
        v.on_terminal(state, Terminal::Id, &tok);
        if state.error.is_some() {
            return;
        }
        state.lexer.eat();
    } else {
        state.emit_error_here(
            AsmErrorKind::Syntax,
            format!("Expected an identifier, but found '{}'", tok.val_str()),
        );
    }
}

fn parse_id_location<'s, V: Visitor<'s>>(state: &mut ParseState<'s>, v: &mut V) {
    let tok0 = state.lexer.lookahead_nth(0);
    let tok1 = state.lexer.lookahead_nth(1);
    let tok2 = state.lexer.lookahead_nth(2);

    if tok1.kind == TokenKind::At {
        if tok2.text == "ha" {
            v.on_hi_addr(state, tok0.text);
            if state.error.is_some() {
                return;
            }
            state.lexer.eat_n(3);
            return;
        } else if tok2.text == "l" {
            v.on_lo_addr(state, tok0.text);
            if state.error.is_some() {
                return;
            }
            state.lexer.eat_n(3);
            return;
        }
    }

    parse_id(state, v);
}

fn parse_ppc_builtin<'s, V: Visitor<'s>>(state: &mut ParseState<'s>, v: &mut V) {
    let tok = state.lexer.lookahead();
    match tok.kind {
        TokenKind::Gpr => v.on_terminal(state, Terminal::Gpr, &tok),
        TokenKind::Fpr => v.on_terminal(state, Terminal::Fpr, &tok),
        TokenKind::Spr => v.on_terminal(state, Terminal::Spr, &tok),
        TokenKind::CrField => v.on_terminal(state, Terminal::CrField, &tok),
        TokenKind::Lt => v.on_terminal(state, Terminal::Lt, &tok),
        TokenKind::Gt => v.on_terminal(state, Terminal::Gt, &tok),
        TokenKind::Eq => v.on_terminal(state, Terminal::Eq, &tok),
        TokenKind::So => v.on_terminal(state, Terminal::So, &tok),
        _ => {
            state.emit_error_here(
                AsmErrorKind::Syntax,
                format!("Unexpected token '{}' in ppc builtin", tok.val_str()),
            );
        }
    }
    if state.error.is_some() {
        return;
    }
    state.lexer.eat();
}

fn parse_baseexpr<'s, V: Visitor<'s>>(state: &mut ParseState<'s>, v: &mut V) {
    match state.lexer.lookahead_kind() {
        TokenKind::HexLit | TokenKind::DecimalLit | TokenKind::OctalLit | TokenKind::BinaryLit => {
            parse_imm(state, v);
        }

        TokenKind::Identifier => parse_id_location(state, v),

        TokenKind::Gpr
        | TokenKind::Fpr
        | TokenKind::Spr
        | TokenKind::CrField
        | TokenKind::Lt
        | TokenKind::Gt
        | TokenKind::Eq
        | TokenKind::So => parse_ppc_builtin(state, v),

        TokenKind::Dot => {
            let tok = state.lexer.lookahead();
            v.on_terminal(state, Terminal::Dot, &tok);
            if state.error.is_some() {
                return;
            }
            state.lexer.eat();
        }

        _ => {
            let tok = state.lexer.lookahead();
            state.emit_error_here(
                AsmErrorKind::Syntax,
                format!("Unexpected token '{}' in expression", tok.val_str()),
            );
        }
    }
}

fn parse_paren<'s, V: Visitor<'s>>(state: &mut ParseState<'s>, v: &mut V) {
    if state.has_token(TokenKind::Lparen) {
        v.on_open_paren(state, ParenKind::Normal);
        if state.error.is_some() {
            return;
        }

        state.lexer.eat();
        parse_bitor(state, v);
        if state.error.is_some() {
            return;
        }

        if state.has_token(TokenKind::Rparen) {
            v.on_close_paren(state, ParenKind::Normal);
        }
        state.parse_token(TokenKind::Rparen);
    } else if state.has_token(TokenKind::Grave) {
        v.on_open_paren(state, ParenKind::RelConv);

        state.lexer.eat();
        parse_bitor(state, v);
        if state.error.is_some() {
            return;
        }

        if state.has_token(TokenKind::Grave) {
            v.on_close_paren(state, ParenKind::RelConv);
        }
        state.parse_token(TokenKind::Grave);
    } else {
        parse_baseexpr(state, v);
    }
}

fn parse_unary<'s, V: Visitor<'s>>(state: &mut ParseState<'s>, v: &mut V) {
    let kind = state.lexer.lookahead_kind();
    if kind == TokenKind::Minus || kind == TokenKind::Tilde {
        state.lexer.eat();
        parse_unary(state, v);
        if state.error.is_some() {
            return;
        }

        if kind == TokenKind::Minus {
            v.on_operator(state, AsmOp::Neg);
        } else {
            v.on_operator(state, AsmOp::Not);
        }
    } else {
        parse_paren(state, v);
    }
}

macro_rules! binary_level {
    ($name:ident, $next:ident, $(($kind:path, $op:expr)),+) => {
        fn $name<'s, V: Visitor<'s>>(state: &mut ParseState<'s>, v: &mut V) {
            $next(state, v);
            if state.error.is_some() {
                return;
            }

            loop {
                let kind = state.lexer.lookahead_kind();
                let op = match kind {
                    $($kind => $op,)+
                    _ => break,
                };
                state.lexer.eat();
                $next(state, v);
                if state.error.is_some() {
                    return;
                }
                v.on_operator(state, op);
            }
        }
    };
}

binary_level!(
    parse_multiplication,
    parse_unary,
    (TokenKind::Star, AsmOp::Mul),
    (TokenKind::Slash, AsmOp::Div)
);
binary_level!(
    parse_addition,
    parse_multiplication,
    (TokenKind::Plus, AsmOp::Add),
    (TokenKind::Minus, AsmOp::Sub)
);
binary_level!(
    parse_shift,
    parse_addition,
    (TokenKind::Lsh, AsmOp::Lsh),
    (TokenKind::Rsh, AsmOp::Rsh)
);
binary_level!(parse_bitand, parse_shift, (TokenKind::Ampersand, AsmOp::And));
binary_level!(parse_bitxor, parse_bitand, (TokenKind::Caret, AsmOp::Xor));
binary_level!(parse_bitor, parse_bitxor, (TokenKind::Pipe, AsmOp::Or));

fn parse_operand<'s, V: Visitor<'s>>(state: &mut ParseState<'s>, v: &mut V) {
    v.on_operand_pre(state);
    parse_bitor(state, v);
    if state.error.is_some() {
        return;
    }
    v.on_operand_post(state);
}

#[derive(Clone, Copy)]
enum ParseStep {
    Operand,
    Comma,
    Lparen,
    Rparen,
    OptComma,
}

fn parse_operand_list<'s, V: Visitor<'s>>(state: &mut ParseState<'s>, v: &mut V, alg: ParseAlg) {
    use ParseStep::*;

    if alg == ParseAlg::None {
        return;
    }
    if alg == ParseAlg::NoneOrOp1 {
        let tok = state.lexer.lookahead();
        if match_operand_first(&tok) {
            parse_operand(state, v);
        }
        return;
    }

    let steps: &[ParseStep] = match alg {
        ParseAlg::Op1 => &[Operand],
        ParseAlg::Op1Or2 => &[Operand, OptComma, Operand],
        ParseAlg::Op2Or3 => &[Operand, Comma, Operand, OptComma, Operand],
        ParseAlg::Op1Off1 => &[Operand, Comma, Operand, Lparen, Operand, Rparen],
        ParseAlg::Op2 => &[Operand, Comma, Operand],
        ParseAlg::Op3 => &[Operand, Comma, Operand, Comma, Operand],
        ParseAlg::Op4 => &[Operand, Comma, Operand, Comma, Operand, Comma, Operand],
        ParseAlg::Op5 => &[
            Operand, Comma, Operand, Comma, Operand, Comma, Operand, Comma, Operand,
        ],
        ParseAlg::Op1Off1Op2 => &[
            Operand, Comma, Operand, Lparen, Operand, Rparen, Comma, Operand, Comma, Operand,
        ],
        ParseAlg::None | ParseAlg::NoneOrOp1 => unreachable!(),
    };

    for step in steps {
        match step {
            Operand => parse_operand(state, v),
            Comma => state.parse_token(TokenKind::Comma),
            Lparen => state.parse_token(TokenKind::Lparen),
            Rparen => state.parse_token(TokenKind::Rparen),
            OptComma => {
                if state.has_token(TokenKind::Comma) {
                    state.parse_token(TokenKind::Comma);
                } else {
                    return;
                }
            }
        }
        if state.error.is_some() {
            return;
        }
    }
}

fn parse_instruction<'s, V: Visitor<'s>>(state: &mut ParseState<'s>, v: &mut V) {
    state.lexer.set_ident_rule(IdentRule::Mnemonic);

    let mnemonic_token = state.lexer.lookahead();
    if mnemonic_token.kind != TokenKind::Identifier {
        state.lexer.set_ident_rule(IdentRule::Typical);
        return;
    }

    let (info, is_extended) = match mnemonic_tokens().get(mnemonic_token.text) {
        Some(info) => (*info, false),
        None => match extended_tokens().get(mnemonic_token.text) {
            Some(info) => (*info, true),
            None => {
                state.emit_error_here(
                    AsmErrorKind::Syntax,
                    format!(
                        "Unknown or unsupported mnemonic '{}'",
                        mnemonic_token.val_str()
                    ),
                );
                return;
            }
        },
    };

    v.on_instruction_pre(state, &info, is_extended);

    state.lexer.eat_and_reset();

    parse_operand_list(state, v, info.alg);
    if state.error.is_some() {
        return;
    }

    v.on_instruction_post(state, &info, is_extended);
}

fn parse_label<'s, V: Visitor<'s>>(state: &mut ParseState<'s>, v: &mut V) {
    let tok0 = state.lexer.lookahead_nth(0);
    let tok1 = state.lexer.lookahead_nth(1);

    if tok0.kind == TokenKind::Identifier && tok1.kind == TokenKind::Colon {
        v.on_label_decl(state, tok0.text);
        if state.error.is_some() {
            return;
        }
        state.lexer.eat_n(2);
    }
}

fn parse_resolved_expr<'s, V: Visitor<'s>>(state: &mut ParseState<'s>, v: &mut V) {
    v.on_resolved_expr_pre(state);
    parse_bitor(state, v);
    if state.error.is_some() {
        return;
    }
    v.on_resolved_expr_post(state);
}

fn parse_expression_list<'s, V: Visitor<'s>>(state: &mut ParseState<'s>, v: &mut V) {
    parse_resolved_expr(state, v);
    if state.error.is_some() {
        return;
    }

    while state.has_token(TokenKind::Comma) {
        state.lexer.eat();
        parse_resolved_expr(state, v);
        if state.error.is_some() {
            return;
        }
    }
}

fn parse_float<'s, V: Visitor<'s>>(state: &mut ParseState<'s>, v: &mut V) {
    let flt_token = state.lexer.lookahead_float();
    if flt_token.kind != TokenKind::FloatLit {
        state.emit_error_here(
            AsmErrorKind::Syntax,
            "Invalid floating point literal".to_string(),
        );
        return;
    }
    v.on_terminal(state, Terminal::Flt, &flt_token);
    state.lexer.eat();
}

fn parse_float_list<'s, V: Visitor<'s>>(state: &mut ParseState<'s>, v: &mut V) {
    parse_float(state, v);
    if state.error.is_some() {
        return;
    }

    while state.has_token(TokenKind::Comma) {
        state.lexer.eat();
        parse_float(state, v);
        if state.error.is_some() {
            return;
        }
    }
}

fn parse_defvar<'s, V: Visitor<'s>>(state: &mut ParseState<'s>, v: &mut V) {
    let tok = state.lexer.lookahead();
    if tok.kind == TokenKind::Identifier {
        v.on_var_decl(state, tok.text);
        if state.error.is_some() {
            return;
        }
        state.lexer.eat();

        state.parse_token(TokenKind::Comma);
        if state.error.is_some() {
            return;
        }

        parse_resolved_expr(state, v);
    } else {
        state.emit_error_here(
            AsmErrorKind::Syntax,
            format!("Expected an identifier, but found '{}'", tok.val_str()),
        );
    }
}

fn parse_string<'s, V: Visitor<'s>>(state: &mut ParseState<'s>, v: &mut V) {
    let tok = state.lexer.lookahead();
    if tok.kind == TokenKind::StringLit {
        v.on_terminal(state, Terminal::Str, &tok);
        state.lexer.eat();
    } else {
        state.emit_error_here(
            AsmErrorKind::Syntax,
            format!("Expected a string literal, but found '{}'", tok.val_str()),
        );
    }
}

fn parse_directive<'s, V: Visitor<'s>>(state: &mut ParseState<'s>, v: &mut V) {
    state.lexer.set_ident_rule(IdentRule::Directive);
    let tok = state.lexer.lookahead();
    if tok.kind != TokenKind::Identifier {
        state.emit_error_here(
            AsmErrorKind::Syntax,
            format!("Unexpected token '{}' in directive type", tok.val_str()),
        );
        return;
    }

    let directive = match Directive::lookup(tok.text) {
        Some(d) => d,
        None => {
            state.emit_error_here(
                AsmErrorKind::Syntax,
                format!("Unknown assembler directive '{}'", tok.val_str()),
            );
            return;
        }
    };

    v.on_directive_pre(state, directive);

    state.lexer.eat_and_reset();
    match directive {
        Directive::Byte | Directive::Byte2 | Directive::Byte4 | Directive::Byte8 => {
            parse_expression_list(state, v);
        }

        Directive::Float | Directive::Double => parse_float_list(state, v),

        Directive::Locate | Directive::Zeros | Directive::Skip => parse_resolved_expr(state, v),

        Directive::PadAlign | Directive::Align => parse_imm(state, v),

        Directive::DefVar => parse_defvar(state, v),

        Directive::Ascii | Directive::Asciz => parse_string(state, v),
    }

    if state.error.is_some() {
        return;
    }

    v.on_directive_post(state, directive);
}

fn parse_line<'s, V: Visitor<'s>>(state: &mut ParseState<'s>, v: &mut V) {
    if state.has_token(TokenKind::Dot) {
        state.parse_token(TokenKind::Dot);
        parse_directive(state, v);
    } else {
        parse_instruction(state, v);
    }
}

fn parse_program<'s, V: Visitor<'s>>(state: &mut ParseState<'s>, v: &mut V) {
    if state.lexer.lookahead_kind() == TokenKind::Eof {
        state.eof = true;
        return;
    }
    parse_label(state, v);
    if state.error.is_some() {
        return;
    }
    parse_line(state, v);
    if state.error.is_some() {
        return;
    }

    while !state.eof && state.error.is_none() {
        let tok = state.lexer.lookahead();
        if tok.kind == TokenKind::Eof {
            state.eof = true;
        } else if tok.kind == TokenKind::Eol {
            state.lexer.eat();
            parse_label(state, v);
            if state.error.is_some() {
                return;
            }
            parse_line(state, v);
        } else {
            state.emit_error_here(
                AsmErrorKind::Syntax,
                format!(
                    "Unexpected token '{}' where line should have ended",
                    tok.val_str()
                ),
            );
        }
    }
}

/// Parse `input`, dispatching events to `visitor`. Returns the first error,
/// if any. This is the reusable entry point consumed by the IR generator
/// and by syntax highlighting.
pub fn parse_with_visitor<'s, V: Visitor<'s>>(input: &'s str, visitor: &mut V) -> Option<AsmError> {
    let mut state = ParseState::new(input);
    parse_program(&mut state, visitor);

    if state.error.is_none() {
        visitor.post_parse_action(&mut state);
    }
    if state.error.is_some() {
        visitor.on_error(&mut state);
    }
    state.error
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct EventLog {
        events: Vec<String>,
    }

    impl<'s> Visitor<'s> for EventLog {
        fn on_instruction_pre(
            &mut self,
            _state: &mut ParseState<'s>,
            info: &ParseInfo,
            extended: bool,
        ) {
            self.events.push(format!("inst({},{})", info.index, extended));
        }
        fn on_operand_pre(&mut self, _state: &mut ParseState<'s>) {
            self.events.push("op<".to_string());
        }
        fn on_operand_post(&mut self, _state: &mut ParseState<'s>) {
            self.events.push("op>".to_string());
        }
        fn on_operator(&mut self, _state: &mut ParseState<'s>, operation: AsmOp) {
            self.events.push(format!("{operation:?}"));
        }
        fn on_terminal(
            &mut self,
            _state: &mut ParseState<'s>,
            _terminal: Terminal,
            tok: &Token<'s>,
        ) {
            self.events.push(format!("t({})", tok.text));
        }
        fn on_label_decl(&mut self, _state: &mut ParseState<'s>, name: &'s str) {
            self.events.push(format!("label({name})"));
        }
        fn on_hi_addr(&mut self, _state: &mut ParseState<'s>, id: &'s str) {
            self.events.push(format!("ha({id})"));
        }
        fn on_close_paren(&mut self, _state: &mut ParseState<'s>, kind: ParenKind) {
            self.events.push(format!("close({kind:?})"));
        }
    }

    fn run(src: &str) -> (EventLog, Option<AsmError>) {
        let mut log = EventLog::default();
        let err = parse_with_visitor(src, &mut log);
        (log, err)
    }

    #[test]
    fn operators_fire_after_operands() {
        let (log, err) = run("li r3, 1 + 2 * 3");
        assert!(err.is_none());
        let tail = &log.events[log.events.len() - 6..];
        assert_eq!(tail, &["t(1)", "t(2)", "t(3)", "Mul", "Add", "op>"]);
    }

    #[test]
    fn label_and_hiaddr_events() {
        let (log, err) = run("top:\nlis r4, top@ha");
        assert!(err.is_none());
        assert!(log.events.contains(&"label(top)".to_string()));
        assert!(log.events.contains(&"ha(top)".to_string()));
    }

    #[test]
    fn relconv_paren_event() {
        let (log, err) = run("b `0x80003110`");
        assert!(err.is_none());
        assert!(log.events.contains(&"close(RelConv)".to_string()));
    }

    #[test]
    fn unknown_mnemonic_errors() {
        let (_, err) = run("frobnicate r1");
        let err = err.expect("should fail");
        assert!(err.message.contains("Unknown or unsupported mnemonic"));
        assert_eq!(err.line, 0);
    }

    #[test]
    fn trailing_garbage_errors() {
        let (_, err) = run("nop nop");
        let err = err.expect("should fail");
        assert!(err.message.contains("where line should have ended"));
    }

    #[test]
    fn optional_operand_accepted() {
        // blr takes no operands; bltlr optionally takes a cr field
        assert!(run("blr").1.is_none());
        assert!(run("bltlr").1.is_none());
        assert!(run("bltlr cr3").1.is_none());
    }

    #[test]
    fn mem_operand_shape() {
        let (log, err) = run("lwz r1, 4(r2)");
        assert!(err.is_none());
        // Three operands fire: target register, displacement, base register
        assert_eq!(
            log.events[1..],
            [
                "op<", "t(r1)", "op>", "op<", "t(4)", "op>", "op<", "t(r2)", "op>"
            ]
        );
    }
}
