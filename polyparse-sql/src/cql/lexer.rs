// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

//! Vocabulary and lexer of the Cassandra query language. Keywords are case-insensitive.

use polyparse_core::fixed_sym_table::FixedSymTable;
use polyparse_core::lexer::LexerSpec;
use polyparse_core::token::HIDDEN_CHANNEL;
use polyparse_core::{term, ContractError, TokenId};
use crate::lexicon::keyword_rules;

pub const SELECT: TokenId = 0;
pub const DISTINCT: TokenId = 1;
pub const AS: TokenId = 2;
pub const FROM: TokenId = 3;
pub const WHERE: TokenId = 4;
pub const AND: TokenId = 5;
pub const IN: TokenId = 6;
pub const ORDER: TokenId = 7;
pub const BY: TokenId = 8;
pub const ASC: TokenId = 9;
pub const DESC: TokenId = 10;
pub const LIMIT: TokenId = 11;
pub const ALLOW: TokenId = 12;
pub const FILTERING: TokenId = 13;
pub const INSERT: TokenId = 14;
pub const INTO: TokenId = 15;
pub const VALUES: TokenId = 16;
pub const IF: TokenId = 17;
pub const NOT: TokenId = 18;
pub const EXISTS: TokenId = 19;
pub const USING: TokenId = 20;
pub const TTL: TokenId = 21;
pub const TIMESTAMP: TokenId = 22;
pub const UPDATE: TokenId = 23;
pub const SET: TokenId = 24;
pub const DELETE: TokenId = 25;
pub const USE: TokenId = 26;
pub const CREATE: TokenId = 27;
pub const KEYSPACE: TokenId = 28;
pub const WITH: TokenId = 29;
pub const TABLE: TokenId = 30;
pub const PRIMARY: TokenId = 31;
pub const KEY: TokenId = 32;
pub const DROP: TokenId = 33;
pub const TRUNCATE: TokenId = 34;
pub const CLUSTERING: TokenId = 35;
pub const TRUE: TokenId = 36;
pub const FALSE: TokenId = 37;
pub const NULL: TokenId = 38;
pub const LPAREN: TokenId = 39;
pub const RPAREN: TokenId = 40;
pub const LBRACE: TokenId = 41;
pub const RBRACE: TokenId = 42;
pub const LBRACKET: TokenId = 43;
pub const RBRACKET: TokenId = 44;
pub const COMMA: TokenId = 45;
pub const SEMI: TokenId = 46;
pub const COLON: TokenId = 47;
pub const DOT: TokenId = 48;
pub const STAR: TokenId = 49;
pub const EQ: TokenId = 50;
pub const NEQ: TokenId = 51;
pub const LTE: TokenId = 52;
pub const GTE: TokenId = 53;
pub const LT: TokenId = 54;
pub const GT: TokenId = 55;
pub const QMARK: TokenId = 56;
pub const STRING: TokenId = 57;
pub const UUID: TokenId = 58;
pub const FLOAT: TokenId = 59;
pub const INTEGER: TokenId = 60;
pub const QUOTED_ID: TokenId = 61;
pub const ID: TokenId = 62;
pub const WS: TokenId = 63;
pub const LINE_COMMENT: TokenId = 64;
pub const BLOCK_COMMENT: TokenId = 65;

static TERMINALS: [(&str, Option<&str>); 66] = [
    ("K_SELECT", Some("SELECT")),
    ("K_DISTINCT", Some("DISTINCT")),
    ("K_AS", Some("AS")),
    ("K_FROM", Some("FROM")),
    ("K_WHERE", Some("WHERE")),
    ("K_AND", Some("AND")),
    ("K_IN", Some("IN")),
    ("K_ORDER", Some("ORDER")),
    ("K_BY", Some("BY")),
    ("K_ASC", Some("ASC")),
    ("K_DESC", Some("DESC")),
    ("K_LIMIT", Some("LIMIT")),
    ("K_ALLOW", Some("ALLOW")),
    ("K_FILTERING", Some("FILTERING")),
    ("K_INSERT", Some("INSERT")),
    ("K_INTO", Some("INTO")),
    ("K_VALUES", Some("VALUES")),
    ("K_IF", Some("IF")),
    ("K_NOT", Some("NOT")),
    ("K_EXISTS", Some("EXISTS")),
    ("K_USING", Some("USING")),
    ("K_TTL", Some("TTL")),
    ("K_TIMESTAMP", Some("TIMESTAMP")),
    ("K_UPDATE", Some("UPDATE")),
    ("K_SET", Some("SET")),
    ("K_DELETE", Some("DELETE")),
    ("K_USE", Some("USE")),
    ("K_CREATE", Some("CREATE")),
    ("K_KEYSPACE", Some("KEYSPACE")),
    ("K_WITH", Some("WITH")),
    ("K_TABLE", Some("TABLE")),
    ("K_PRIMARY", Some("PRIMARY")),
    ("K_KEY", Some("KEY")),
    ("K_DROP", Some("DROP")),
    ("K_TRUNCATE", Some("TRUNCATE")),
    ("K_CLUSTERING", Some("CLUSTERING")),
    ("K_TRUE", Some("TRUE")),
    ("K_FALSE", Some("FALSE")),
    ("K_NULL", Some("NULL")),
    ("LR_BRACKET", Some("(")),
    ("RR_BRACKET", Some(")")),
    ("LC_BRACKET", Some("{")),
    ("RC_BRACKET", Some("}")),
    ("LS_BRACKET", Some("[")),
    ("RS_BRACKET", Some("]")),
    ("COMMA", Some(",")),
    ("SEMI", Some(";")),
    ("COLON", Some(":")),
    ("DOT", Some(".")),
    ("STAR", Some("*")),
    ("OPERATOR_EQ", Some("=")),
    ("OPERATOR_NEQ", Some("!=")),
    ("OPERATOR_LTE", Some("<=")),
    ("OPERATOR_GTE", Some(">=")),
    ("OPERATOR_LT", Some("<")),
    ("OPERATOR_GT", Some(">")),
    ("QMARK", Some("?")),
    ("STRING_LITERAL", None),
    ("UUID", None),
    ("FLOAT_LITERAL", None),
    ("DECIMAL_LITERAL", None),
    ("QUOTED_ID", None),
    ("OBJECT_NAME", None),
    ("SPACE", None),
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
        .rule("SPACE", r"[ \t\r\n\f]+", term!(=WS) + hidden.clone())
        .rule("LINE_COMMENT", r"(?:--|//)[^\r\n]*", term!(=LINE_COMMENT) + hidden.clone())
        .rule("BLOCK_COMMENT", r"/\*[\s\S]*?\*/", term!(=BLOCK_COMMENT) + hidden);
    keyword_rules(builder, &TERMINALS[..=NULL as usize])
        .rule("LR_BRACKET", r"\(", term!(=LPAREN))
        .rule("RR_BRACKET", r"\)", term!(=RPAREN))
        .rule("LC_BRACKET", r"\{", term!(=LBRACE))
        .rule("RC_BRACKET", r"\}", term!(=RBRACE))
        .rule("LS_BRACKET", r"\[", term!(=LBRACKET))
        .rule("RS_BRACKET", r"\]", term!(=RBRACKET))
        .rule("COMMA", ",", term!(=COMMA))
        .rule("SEMI", ";", term!(=SEMI))
        .rule("COLON", ":", term!(=COLON))
        .rule("DOT", r"\.", term!(=DOT))
        .rule("STAR", r"\*", term!(=STAR))
        .rule("OPERATOR_EQ", "=", term!(=EQ))
        .rule("OPERATOR_NEQ", "!=", term!(=NEQ))
        .rule("OPERATOR_LTE", "<=", term!(=LTE))
        .rule("OPERATOR_GTE", ">=", term!(=GTE))
        .rule("OPERATOR_LT", "<", term!(=LT))
        .rule("OPERATOR_GT", ">", term!(=GT))
        .rule("QMARK", r"\?", term!(=QMARK))
        .rule("STRING_LITERAL", "'(?:[^']|'')*'", term!(=STRING))
        .rule("UUID", "[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}", term!(=UUID))
        .rule("FLOAT_LITERAL", r"-?[0-9]+\.[0-9]+(?:[eE][+-]?[0-9]+)?", term!(=FLOAT))
        .rule("DECIMAL_LITERAL", "-?[0-9]+", term!(=INTEGER))
        .rule("QUOTED_ID", r#""(?:[^"]|"")+""#, term!(=QUOTED_ID))
        .rule("OBJECT_NAME", "[a-zA-Z][a-zA-Z0-9_]*", term!(=ID))
        .build()
}
