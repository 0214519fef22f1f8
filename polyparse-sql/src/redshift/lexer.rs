// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

//! Vocabulary and lexer of the Redshift SQL dialect. Keywords are case-insensitive; quoted
//! identifiers keep their case.

use polyparse_core::fixed_sym_table::FixedSymTable;
use polyparse_core::lexer::LexerSpec;
use polyparse_core::token::HIDDEN_CHANNEL;
use polyparse_core::{term, ContractError, TokenId};
use crate::lexicon::keyword_rules;

pub const SELECT: TokenId = 0;
pub const DISTINCT: TokenId = 1;
pub const ALL: TokenId = 2;
pub const AS: TokenId = 3;
pub const FROM: TokenId = 4;
pub const WHERE: TokenId = 5;
pub const GROUP: TokenId = 6;
pub const BY: TokenId = 7;
pub const HAVING: TokenId = 8;
pub const ORDER: TokenId = 9;
pub const ASC: TokenId = 10;
pub const DESC: TokenId = 11;
pub const LIMIT: TokenId = 12;
pub const OFFSET: TokenId = 13;
pub const UNION: TokenId = 14;
pub const INTERSECT: TokenId = 15;
pub const EXCEPT: TokenId = 16;
pub const JOIN: TokenId = 17;
pub const INNER: TokenId = 18;
pub const LEFT: TokenId = 19;
pub const RIGHT: TokenId = 20;
pub const FULL: TokenId = 21;
pub const OUTER: TokenId = 22;
pub const CROSS: TokenId = 23;
pub const ON: TokenId = 24;
pub const USING: TokenId = 25;
pub const AND: TokenId = 26;
pub const OR: TokenId = 27;
pub const NOT: TokenId = 28;
pub const IN: TokenId = 29;
pub const IS: TokenId = 30;
pub const NULL: TokenId = 31;
pub const LIKE: TokenId = 32;
pub const BETWEEN: TokenId = 33;
pub const EXISTS: TokenId = 34;
pub const CASE: TokenId = 35;
pub const WHEN: TokenId = 36;
pub const THEN: TokenId = 37;
pub const ELSE: TokenId = 38;
pub const END: TokenId = 39;
pub const CAST: TokenId = 40;
pub const TRUE: TokenId = 41;
pub const FALSE: TokenId = 42;
pub const INSERT: TokenId = 43;
pub const INTO: TokenId = 44;
pub const VALUES: TokenId = 45;
pub const DEFAULT: TokenId = 46;
pub const DELETE: TokenId = 47;
pub const UPDATE: TokenId = 48;
pub const SET: TokenId = 49;
pub const CREATE: TokenId = 50;
pub const TEMP: TokenId = 51;
pub const TEMPORARY: TokenId = 52;
pub const TABLE: TokenId = 53;
pub const IF: TokenId = 54;
pub const DROP: TokenId = 55;
pub const CASCADE: TokenId = 56;
pub const RESTRICT: TokenId = 57;
pub const PRIMARY: TokenId = 58;
pub const KEY: TokenId = 59;
pub const UNIQUE: TokenId = 60;
pub const FOREIGN: TokenId = 61;
pub const REFERENCES: TokenId = 62;
pub const ENCODE: TokenId = 63;
pub const IDENTITY: TokenId = 64;
pub const DISTSTYLE: TokenId = 65;
pub const DISTKEY: TokenId = 66;
pub const SORTKEY: TokenId = 67;
pub const COMPOUND: TokenId = 68;
pub const INTERLEAVED: TokenId = 69;
pub const EVEN: TokenId = 70;
pub const AUTO: TokenId = 71;
pub const COPY: TokenId = 72;
pub const UNLOAD: TokenId = 73;
pub const TO: TokenId = 74;
pub const IAM_ROLE: TokenId = 75;
pub const CREDENTIALS: TokenId = 76;
pub const FORMAT: TokenId = 77;
pub const DELIMITER: TokenId = 78;
pub const REGION: TokenId = 79;
pub const IGNOREHEADER: TokenId = 80;
pub const LPAREN: TokenId = 81;
pub const RPAREN: TokenId = 82;
pub const COMMA: TokenId = 83;
pub const SEMI: TokenId = 84;
pub const DOT: TokenId = 85;
pub const STAR: TokenId = 86;
pub const PLUS: TokenId = 87;
pub const MINUS: TokenId = 88;
pub const SLASH: TokenId = 89;
pub const PERCENT: TokenId = 90;
pub const CONCAT: TokenId = 91;
pub const EQ: TokenId = 92;
pub const NEQ: TokenId = 93;
pub const LTE: TokenId = 94;
pub const GTE: TokenId = 95;
pub const LT: TokenId = 96;
pub const GT: TokenId = 97;
pub const DCOLON: TokenId = 98;
pub const STRING: TokenId = 99;
pub const NUMBER: TokenId = 100;
pub const QUOTED_ID: TokenId = 101;
pub const ID: TokenId = 102;
pub const WS: TokenId = 103;
pub const LINE_COMMENT: TokenId = 104;
pub const BLOCK_COMMENT: TokenId = 105;

static TERMINALS: [(&str, Option<&str>); 106] = [
    ("SELECT", Some("SELECT")),
    ("DISTINCT", Some("DISTINCT")),
    ("ALL", Some("ALL")),
    ("AS", Some("AS")),
    ("FROM", Some("FROM")),
    ("WHERE", Some("WHERE")),
    ("GROUP", Some("GROUP")),
    ("BY", Some("BY")),
    ("HAVING", Some("HAVING")),
    ("ORDER", Some("ORDER")),
    ("ASC", Some("ASC")),
    ("DESC", Some("DESC")),
    ("LIMIT", Some("LIMIT")),
    ("OFFSET", Some("OFFSET")),
    ("UNION", Some("UNION")),
    ("INTERSECT", Some("INTERSECT")),
    ("EXCEPT", Some("EXCEPT")),
    ("JOIN", Some("JOIN")),
    ("INNER", Some("INNER")),
    ("LEFT", Some("LEFT")),
    ("RIGHT", Some("RIGHT")),
    ("FULL", Some("FULL")),
    ("OUTER", Some("OUTER")),
    ("CROSS", Some("CROSS")),
    ("ON", Some("ON")),
    ("USING", Some("USING")),
    ("AND", Some("AND")),
    ("OR", Some("OR")),
    ("NOT", Some("NOT")),
    ("IN", Some("IN")),
    ("IS", Some("IS")),
    ("NULL", Some("NULL")),
    ("LIKE", Some("LIKE")),
    ("BETWEEN", Some("BETWEEN")),
    ("EXISTS", Some("EXISTS")),
    ("CASE", Some("CASE")),
    ("WHEN", Some("WHEN")),
    ("THEN", Some("THEN")),
    ("ELSE", Some("ELSE")),
    ("END", Some("END")),
    ("CAST", Some("CAST")),
    ("TRUE", Some("TRUE")),
    ("FALSE", Some("FALSE")),
    ("INSERT", Some("INSERT")),
    ("INTO", Some("INTO")),
    ("VALUES", Some("VALUES")),
    ("DEFAULT", Some("DEFAULT")),
    ("DELETE", Some("DELETE")),
    ("UPDATE", Some("UPDATE")),
    ("SET", Some("SET")),
    ("CREATE", Some("CREATE")),
    ("TEMP", Some("TEMP")),
    ("TEMPORARY", Some("TEMPORARY")),
    ("TABLE", Some("TABLE")),
    ("IF", Some("IF")),
    ("DROP", Some("DROP")),
    ("CASCADE", Some("CASCADE")),
    ("RESTRICT", Some("RESTRICT")),
    ("PRIMARY", Some("PRIMARY")),
    ("KEY", Some("KEY")),
    ("UNIQUE", Some("UNIQUE")),
    ("FOREIGN", Some("FOREIGN")),
    ("REFERENCES", Some("REFERENCES")),
    ("ENCODE", Some("ENCODE")),
    ("IDENTITY", Some("IDENTITY")),
    ("DISTSTYLE", Some("DISTSTYLE")),
    ("DISTKEY", Some("DISTKEY")),
    ("SORTKEY", Some("SORTKEY")),
    ("COMPOUND", Some("COMPOUND")),
    ("INTERLEAVED", Some("INTERLEAVED")),
    ("EVEN", Some("EVEN")),
    ("AUTO", Some("AUTO")),
    ("COPY", Some("COPY")),
    ("UNLOAD", Some("UNLOAD")),
    ("TO", Some("TO")),
    ("IAM_ROLE", Some("IAM_ROLE")),
    ("CREDENTIALS", Some("CREDENTIALS")),
    ("FORMAT", Some("FORMAT")),
    ("DELIMITER", Some("DELIMITER")),
    ("REGION", Some("REGION")),
    ("IGNOREHEADER", Some("IGNOREHEADER")),
    ("LEFT_PAREN", Some("(")),
    ("RIGHT_PAREN", Some(")")),
    ("COMMA", Some(",")),
    ("SEMI", Some(";")),
    ("DOT", Some(".")),
    ("STAR", Some("*")),
    ("PLUS", Some("+")),
    ("MINUS", Some("-")),
    ("SLASH", Some("/")),
    ("PERCENT", Some("%")),
    ("CONCAT", Some("||")),
    ("EQUAL", Some("=")),
    ("NOT_EQUAL", Some("<>")),
    ("LESS_EQUAL", Some("<=")),
    ("GREATER_EQUAL", Some(">=")),
    ("LESS", Some("<")),
    ("GREATER", Some(">")),
    ("TYPECAST", Some("::")),
    ("STRING_LITERAL", None),
    ("NUMERIC_LITERAL", None),
    ("QUOTED_IDENTIFIER", None),
    ("IDENTIFIER", None),
    ("WHITESPACE", None),
    ("LINE_COMMENT", None),
    ("BLOCK_COMMENT", None),
];

pub fn vocabulary() -> FixedSymTable {
    FixedSymTable::from_terminals(&TERMINALS)
}

pub fn lexer_spec() -> Result<LexerSpec, ContractError> {
    let hidden = term!(#HIDDEN_CHANNEL);
    let builder = LexerSpec::builder()
        .mode("DEFAULT_MODE")
        .rule("WHITESPACE", r"[ \t\r\n\f]+", term!(=WS) + hidden.clone())
        .rule("LINE_COMMENT", r"--[^\r\n]*", term!(=LINE_COMMENT) + hidden.clone())
        .rule("BLOCK_COMMENT", r"/\*[\s\S]*?\*/", term!(=BLOCK_COMMENT) + hidden);
    keyword_rules(builder, &TERMINALS[..=IGNOREHEADER as usize])
        .rule("LEFT_PAREN", r"\(", term!(=LPAREN))
        .rule("RIGHT_PAREN", r"\)", term!(=RPAREN))
        .rule("COMMA", ",", term!(=COMMA))
        .rule("SEMI", ";", term!(=SEMI))
        .rule("DOT", r"\.", term!(=DOT))
        .rule("STAR", r"\*", term!(=STAR))
        .rule("PLUS", r"\+", term!(=PLUS))
        .rule("MINUS", "-", term!(=MINUS))
        .rule("SLASH", "/", term!(=SLASH))
        .rule("PERCENT", "%", term!(=PERCENT))
        .rule("CONCAT", r"\|\|", term!(=CONCAT))
        .rule("EQUAL", "=", term!(=EQ))
        .rule("NOT_EQUAL", "<>|!=", term!(=NEQ))
        .rule("LESS_EQUAL", "<=", term!(=LTE))
        .rule("GREATER_EQUAL", ">=", term!(=GTE))
        .rule("LESS", "<", term!(=LT))
        .rule("GREATER", ">", term!(=GT))
        .rule("TYPECAST", "::", term!(=DCOLON))
        .rule("STRING_LITERAL", r"'(?:[^'\\]|''|\\[\s\S])*'", term!(=STRING))
        .rule("NUMERIC_LITERAL", r"(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?", term!(=NUMBER))
        .rule("QUOTED_IDENTIFIER", r#""(?:[^"]|"")+""#, term!(=QUOTED_ID))
        .rule("IDENTIFIER", r"[a-zA-Z_][a-zA-Z0-9_$]*", term!(=ID))
        .build()
}
