// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

use crate::error::ParseError;
use crate::lexer::Lexer;
use crate::token::{Token, DEFAULT_CHANNEL, EOF};
use crate::TokenId;

/// Read access to the upcoming token kinds, as needed by the prediction.
pub trait Lookahead {
    /// Kind of the `k`-th token ahead on the default channel; `la(1)` is the current token.
    /// Returns `EOF` past the end of the input.
    fn la(&mut self, k: usize) -> TokenId;
}

/// View of a [Lookahead] that ignores its first `shift` tokens. It's used to check whether
/// a decision succeeds if the current token is deleted.
pub struct Shifted<'a, L: Lookahead + ?Sized> {
    inner: &'a mut L,
    shift: usize,
}

impl<'a, L: Lookahead + ?Sized> Shifted<'a, L> {
    pub fn new(inner: &'a mut L, shift: usize) -> Self {
        Shifted { inner, shift }
    }
}

impl<L: Lookahead + ?Sized> Lookahead for Shifted<'_, L> {
    fn la(&mut self, k: usize) -> TokenId {
        self.inner.la(k + self.shift)
    }
}

/// Fixed sequence of token kinds, followed by `EOF`.
pub struct TokenSlice<'a>(pub &'a [TokenId]);

impl Lookahead for TokenSlice<'_> {
    fn la(&mut self, k: usize) -> TokenId {
        if k == 0 { return EOF }
        self.0.get(k - 1).copied().unwrap_or(EOF)
    }
}

// ---------------------------------------------------------------------------------------------

/// Buffered stream of tokens produced lazily by a [Lexer].
///
/// All the tokens are kept until the end of the parse, including those of the hidden channels;
/// `peek`, `la` and `consume` only see the default channel.
pub struct TokenStream<'g, 's> {
    lexer: Lexer<'g, 's>,
    /// all the tokens, hidden included; `tokens[i].index == i`
    tokens: Vec<Token>,
    /// indices in `tokens` of the default-channel tokens
    on_channel: Vec<usize>,
    /// index in `on_channel` of the current token
    p: usize,
    eof: bool,
}

impl<'g, 's> TokenStream<'g, 's> {
    pub fn new(lexer: Lexer<'g, 's>) -> Self {
        TokenStream { lexer, tokens: Vec::new(), on_channel: Vec::new(), p: 0, eof: false }
    }

    pub fn source(&self) -> &'s str {
        self.lexer.source()
    }

    /// Lexes until `n` default-channel tokens are available, or until `EOF`.
    fn fill(&mut self, n: usize) {
        while !self.eof && self.on_channel.len() < n {
            let token = self.lexer.next_token();
            if token.channel == DEFAULT_CHANNEL {
                self.on_channel.push(self.tokens.len());
            }
            self.eof = token.is_eof();
            self.tokens.push(token);
        }
    }

    /// Returns the `k`-th token ahead on the default channel, where `peek(1)` is the current
    /// token. Past the end of the input, the `EOF` token is returned.
    ///
    /// `k` must be at least 1.
    pub fn peek(&mut self, k: usize) -> &Token {
        let i = self.p + k.max(1) - 1;
        self.fill(i + 1);
        let i = i.min(self.on_channel.len().saturating_sub(1));
        &self.tokens[self.on_channel[i]]
    }

    /// Position of the current token in the default-channel sequence.
    pub fn index(&self) -> usize {
        self.p
    }

    /// Index in the buffer of the current token.
    pub fn token_index(&mut self) -> usize {
        self.peek(1).index
    }

    /// Consumes the current token and returns it. The `EOF` token is never consumed, so
    /// `consume` returns it indefinitely at the end.
    pub fn consume(&mut self) -> Token {
        let token = self.peek(1).clone();
        if !token.is_eof() {
            self.p += 1;
        }
        token
    }

    /// Last consumed token.
    pub fn previous(&self) -> Option<&Token> {
        if self.p == 0 {
            None
        } else {
            self.on_channel.get(self.p - 1).map(|&i| &self.tokens[i])
        }
    }

    /// Tokens of other channels between the current token and the default-channel token before it.
    pub fn hidden_before(&mut self) -> &[Token] {
        let current = self.token_index();
        let previous = self.previous().map(|t| t.index + 1).unwrap_or(0);
        &self.tokens[previous..current]
    }

    /// Takes the lexer errors found so far.
    pub fn take_lexer_errors(&mut self) -> Vec<ParseError> {
        self.lexer.take_errors()
    }

    pub fn lexer(&self) -> &Lexer<'g, 's> {
        &self.lexer
    }

    /// Lexes the rest of the input and returns all the tokens with the remaining lexer errors.
    pub fn finish(mut self) -> (Vec<Token>, Vec<ParseError>) {
        self.fill(usize::MAX);
        let errors = self.lexer.take_errors();
        (self.tokens, errors)
    }
}

impl Lookahead for TokenStream<'_, '_> {
    fn la(&mut self, k: usize) -> TokenId {
        if k == 0 {
            return self.previous().map(|t| t.kind).unwrap_or(EOF);
        }
        self.peek(k).kind
    }
}

#[cfg(test)]
mod tests {
    use crate::lexer::{no_classifier, Lexer, LexerSpec};
    use crate::token::{EOF, HIDDEN_CHANNEL};
    use crate::{term, CollectJoin};
    use super::*;

    const ID: TokenId = 0;
    const COMMA: TokenId = 1;
    const WS: TokenId = 2;

    fn spec() -> LexerSpec {
        LexerSpec::builder()
            .rule("ID", "[a-z]+", term!(=ID))
            .rule("COMMA", ",", term!(=COMMA))
            .rule("WS", r"\s+", term!(=WS) + term!(#HIDDEN_CHANNEL))
            .build()
            .expect("lexer spec should build")
    }

    #[test]
    fn test_peek_consume() {
        let spec = spec();
        let mut stream = TokenStream::new(Lexer::new(&spec, "a, b  c", no_classifier()));
        assert_eq!(stream.peek(1).text, "a");
        assert_eq!(stream.peek(3).text, "b");
        assert_eq!(stream.la(4), ID);
        assert_eq!(stream.la(5), EOF);
        assert_eq!(stream.la(9), EOF);
        assert!(stream.previous().is_none());
        assert_eq!(stream.consume().text, "a");
        assert_eq!(stream.consume().kind, COMMA);
        assert_eq!(stream.previous().map(|t| t.text.as_str()), Some(","));
        assert_eq!(stream.hidden_before().iter().map(|t| t.text.as_str()).to_vec(), vec![" "]);
        assert_eq!((stream.index(), stream.token_index()), (2, 3));
        assert_eq!(stream.consume().text, "b");
        assert_eq!(stream.consume().text, "c");
        assert!(stream.consume().is_eof());
        assert!(stream.consume().is_eof());
        assert_eq!(stream.index(), 4);
        let (tokens, errors) = stream.finish();
        assert!(errors.is_empty());
        let kinds = tokens.iter().map(|t| t.kind).to_vec();
        assert_eq!(kinds, vec![ID, COMMA, WS, ID, WS, ID, EOF]);
        for (i, t) in tokens.iter().enumerate() {
            assert_eq!(t.index, i, "test {i} failed");
        }
    }

    #[test]
    fn test_shifted() {
        let kinds = [ID, COMMA, ID];
        let mut slice = TokenSlice(&kinds);
        assert_eq!((slice.la(1), slice.la(3), slice.la(4)), (ID, ID, EOF));
        let mut shifted = Shifted::new(&mut slice, 1);
        assert_eq!((shifted.la(1), shifted.la(2), shifted.la(3)), (COMMA, ID, EOF));
    }
}
