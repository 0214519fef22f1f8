// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

use std::fmt::{Display, Formatter};
use crate::lexer::{CaretCol, CaretLine, ChannelId, Pos, PosSpan};
use crate::TokenId;

/// Kind of the token produced at the end of the input. The stream repeats it indefinitely.
pub const EOF: TokenId = TokenId::MAX;
/// Channel of the tokens seen by the parser.
pub const DEFAULT_CHANNEL: ChannelId = 0;
/// Channel of whitespace and comments: kept in the stream, ignored by the parser.
pub const HIDDEN_CHANNEL: ChannelId = 1;

/// Escapes the whitespace characters that would break a one-line message: `\n`, `\r` and `\t`.
pub fn escape_ws(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            _ => result.push(c),
        }
    }
    result
}

/// Token produced by the lexer.
///
/// * `start`, `stop`: byte offsets of the text in the source (`stop` is exclusive)
/// * `line`: 1-based line of the first character
/// * `column`: 0-based column of the first character, in characters
/// * `index`: position of the token in the stream buffer, hidden tokens included
///
/// A token is immutable once it's been emitted, except for its kind, which a classifier may
/// change once with [`reclassify`](Token::reclassify) before the token reaches the stream.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Token {
    pub kind: TokenId,
    pub channel: ChannelId,
    pub text: String,
    pub start: usize,
    pub stop: usize,
    pub line: CaretLine,
    pub column: CaretCol,
    pub index: usize,
    reclassified: bool,
}

impl Token {
    pub fn new(kind: TokenId, channel: ChannelId, text: String, start: usize, pos: Pos) -> Self {
        let stop = start + text.len();
        Token { kind, channel, text, start, stop, line: pos.line(), column: pos.col(), index: 0, reclassified: false }
    }

    /// Creates the end-of-input token at byte offset `start`.
    pub fn eof(start: usize, pos: Pos) -> Self {
        Token::new(EOF, DEFAULT_CHANNEL, String::new(), start, pos)
    }

    /// Creates a token that isn't in the source, at the position of `at`. Used for the tokens
    /// assumed by the recovery and for the implicit closing of unterminated regions.
    pub fn conjured(kind: TokenId, text: String, at: &Token) -> Self {
        Token {
            kind,
            channel: DEFAULT_CHANNEL,
            text,
            start: at.start,
            stop: at.start,
            line: at.line,
            column: at.column,
            index: at.index,
            reclassified: true,
        }
    }

    /// Changes the kind of the token. This is only possible once: later calls return `false`
    /// and leave the kind unchanged.
    pub fn reclassify(&mut self, kind: TokenId) -> bool {
        if self.reclassified {
            false
        } else {
            self.kind = kind;
            self.reclassified = true;
            true
        }
    }

    pub fn is_reclassified(&self) -> bool {
        self.reclassified
    }

    pub fn is_eof(&self) -> bool {
        self.kind == EOF
    }

    pub fn is_hidden(&self) -> bool {
        self.channel != DEFAULT_CHANNEL
    }

    pub fn pos(&self) -> Pos {
        Pos(self.line, self.column)
    }

    /// Span of the token text, from its first to its last character. Empty tokens have an
    /// empty span.
    pub fn span(&self) -> PosSpan {
        if self.text.is_empty() {
            return PosSpan::empty();
        }
        let mut last = self.pos();
        for c in self.text.chars().take(self.text.chars().count() - 1) {
            if c == '\n' {
                last = Pos(last.line() + 1, 0);
            } else {
                last = Pos(last.line(), last.col() + 1);
            }
        }
        PosSpan::new(self.pos(), last)
    }

    /// Text shown in error messages: the token text, or `<EOF>`.
    pub fn display_text(&self) -> String {
        if self.is_eof() {
            "<EOF>".to_string()
        } else {
            escape_ws(&self.text)
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[@{},{}:{}='{}',<{}>{},{}:{}]",
               self.index, self.start, self.stop as isize - 1, self.display_text(), self.kind,
               if self.channel != DEFAULT_CHANNEL { format!(",channel={}", self.channel) } else { String::new() },
               self.line, self.column)
    }
}
