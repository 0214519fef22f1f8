// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

//! Rules of the grammar-description language (ANTLR v4 syntax).
//!
//! The rules follow the usual ANTLR v4 grammar of grammars, with a few alternatives factored
//! so that two tokens of lookahead are enough in most places:
//!
//! ```text
//! grammarSpec       : grammarDecl prequelConstruct* rules modeSpec* EOF ;
//! grammarDecl       : grammarType identifier ';' ;
//! grammarType       : 'lexer' 'grammar' | 'parser' 'grammar' | 'grammar' ;
//! prequelConstruct  : optionsSpec | delegateGrammars | tokensSpec | channelsSpec | action_ ;
//! optionsSpec       : 'options {' (option ';')* '}' ;
//! ...
//! lexerAlt          : lexerElements lexerCommands? ;
//! lexerElements     : lexerElement* ;
//! setElement        : characterRange | TOKEN_REF elementOptions? | STRING_LITERAL elementOptions? | LEXER_CHAR_SET ;
//! actionBlock       : ACTION ;
//! argActionBlock    : '[' ARGUMENT_CONTENT* ']' ;
//! ```

use once_cell::sync::Lazy;
use polyparse_core::grammar::{group_of, opt, plus, star};
use polyparse_core::token::EOF;
use polyparse_core::{parse, seq, ContractError, Grammar, GrammarBuilder, ParseResult};
use crate::classifier::new_classifier;
use crate::lexer::*;

pub const GRAMMAR_NAME: &str = "ANTLRv4";
pub const START_RULE: &str = "grammarSpec";

static G4_GRAMMAR: Lazy<Result<Grammar, ContractError>> = Lazy::new(build_grammar);

/// Grammar table of the grammar-description language, built on first use.
pub fn grammar() -> Result<&'static Grammar, ContractError> {
    G4_GRAMMAR.as_ref().map_err(|e| e.clone())
}

/// Parses a grammar description. Malformed input is reported in the result; the only error is
/// a grammar table that can't be built.
pub fn parse_grammar(source: &str) -> Result<ParseResult, ContractError> {
    Ok(parse(grammar()?, source))
}

pub fn build_grammar() -> Result<Grammar, ContractError> {
    GrammarBuilder::new(GRAMMAR_NAME, vocabulary(), lexer_spec()?)
        .lookahead(2)
        .classifier(new_classifier)

        // grammar declaration, prequel and modes
        .rule("grammarSpec", vec![seq!["grammarDecl", star(seq!["prequelConstruct"]), "rules", star(seq!["modeSpec"]), EOF]])
        .rule("grammarDecl", vec![seq!["grammarType", "identifier", SEMI]])
        .rule("grammarType", vec![seq![LEXER, GRAMMAR], seq![PARSER, GRAMMAR], seq![GRAMMAR]])
        .rule("prequelConstruct", vec![
            seq!["optionsSpec"],
            seq!["delegateGrammars"],
            seq!["tokensSpec"],
            seq!["channelsSpec"],
            seq!["action_"],
        ])
        .rule("optionsSpec", vec![seq![OPTIONS, star(seq!["option", SEMI]), RBRACE]])
        .rule("option", vec![seq!["identifier", ASSIGN, "optionValue"]])
        .rule("optionValue", vec![
            seq!["identifier", star(seq![DOT, "identifier"])],
            seq![STRING_LITERAL],
            seq!["actionBlock"],
            seq![INT],
        ])
        .rule("delegateGrammars", vec![seq![IMPORT, "delegateGrammar", star(seq![COMMA, "delegateGrammar"]), SEMI]])
        .rule("delegateGrammar", vec![seq!["identifier", opt(seq![ASSIGN, "identifier"])]])
        .rule("tokensSpec", vec![seq![TOKENS, opt(seq!["idList"]), RBRACE]])
        .rule("channelsSpec", vec![seq![CHANNELS, opt(seq!["idList"]), RBRACE]])
        .rule("idList", vec![seq!["identifier", star(seq![COMMA, "identifier"]), opt(seq![COMMA])]])
        .rule("action_", vec![seq![AT, opt(seq!["actionScopeName", COLONCOLON]), "identifier", "actionBlock"]])
        .rule("actionScopeName", vec![seq!["identifier"], seq![LEXER], seq![PARSER]])
        .rule("actionBlock", vec![seq![ACTION]])
        .rule("argActionBlock", vec![seq![BEGIN_ARGUMENT, star(seq![ARGUMENT_CONTENT]), END_ARGUMENT]])
        .rule("modeSpec", vec![seq![MODE, "identifier", SEMI, star(seq!["lexerRuleSpec"])]])

        // parser rules
        .rule("rules", vec![seq![star(seq!["ruleSpec"])]])
        .rule("ruleSpec", vec![seq!["parserRuleSpec"], seq!["lexerRuleSpec"]])
        .rule("parserRuleSpec", vec![seq![
            opt(seq!["ruleModifiers"]), RULE_REF, opt(seq!["argActionBlock"]), opt(seq!["ruleReturns"]),
            opt(seq!["throwsSpec"]), opt(seq!["localsSpec"]), star(seq!["rulePrequel"]),
            COLON, "ruleBlock", SEMI, "exceptionGroup",
        ]])
        .rule("exceptionGroup", vec![seq![star(seq!["exceptionHandler"]), opt(seq!["finallyClause"])]])
        .rule("exceptionHandler", vec![seq![CATCH, "argActionBlock", "actionBlock"]])
        .rule("finallyClause", vec![seq![FINALLY, "actionBlock"]])
        .rule("rulePrequel", vec![seq!["optionsSpec"], seq!["ruleAction"]])
        .rule("ruleReturns", vec![seq![RETURNS, "argActionBlock"]])
        .rule("throwsSpec", vec![seq![THROWS, "qualifiedIdentifier", star(seq![COMMA, "qualifiedIdentifier"])]])
        .rule("localsSpec", vec![seq![LOCALS, "argActionBlock"]])
        .rule("ruleAction", vec![seq![AT, "identifier", "actionBlock"]])
        .rule("ruleModifiers", vec![seq![plus(seq!["ruleModifier"])]])
        .rule("ruleModifier", vec![seq![PUBLIC], seq![PRIVATE], seq![PROTECTED], seq![FRAGMENT]])
        .rule("ruleBlock", vec![seq!["ruleAltList"]])
        .rule("ruleAltList", vec![seq!["labeledAlt", star(seq![OR, "labeledAlt"])]])
        .rule("labeledAlt", vec![seq!["alternative", opt(seq![POUND, "identifier"])]])

        // lexer rules
        .rule("lexerRuleSpec", vec![seq![opt(seq![FRAGMENT]), TOKEN_REF, opt(seq!["optionsSpec"]), COLON, "lexerRuleBlock", SEMI]])
        .rule("lexerRuleBlock", vec![seq!["lexerAltList"]])
        .rule("lexerAltList", vec![seq!["lexerAlt", star(seq![OR, "lexerAlt"])]])
        .rule("lexerAlt", vec![seq!["lexerElements", opt(seq!["lexerCommands"])]])
        .rule("lexerElements", vec![seq![star(seq!["lexerElement"])]])
        .rule("lexerElement", vec![
            seq!["lexerAtom", opt(seq!["ebnfSuffix"])],
            seq!["lexerBlock", opt(seq!["ebnfSuffix"])],
            seq!["actionBlock", opt(seq![QUESTION])],
        ])
        .rule("lexerBlock", vec![seq![LPAREN, "lexerAltList", RPAREN]])
        .rule("lexerCommands", vec![seq![RARROW, "lexerCommand", star(seq![COMMA, "lexerCommand"])]])
        .rule("lexerCommand", vec![seq!["lexerCommandName", opt(seq![LPAREN, "lexerCommandExpr", RPAREN])]])
        .rule("lexerCommandName", vec![seq!["identifier"], seq![MODE]])
        .rule("lexerCommandExpr", vec![seq!["identifier"], seq![INT]])

        // alternatives and elements
        .rule("altList", vec![seq!["alternative", star(seq![OR, "alternative"])]])
        .rule("alternative", vec![seq![opt(seq!["elementOptions"]), plus(seq!["element"])], seq![]])
        .rule("element", vec![
            seq!["labeledElement", opt(seq!["ebnfSuffix"])],
            seq!["atom", opt(seq!["ebnfSuffix"])],
            seq!["ebnf"],
            seq!["actionBlock", opt(seq![QUESTION, opt(seq!["predicateOptions"])])],
        ])
        .rule("predicateOptions", vec![seq![LT, "predicateOption", star(seq![COMMA, "predicateOption"]), GT]])
        .rule("predicateOption", vec![seq![
            "identifier",
            opt(seq![ASSIGN, group_of(vec![seq!["actionBlock"], seq!["identifier"], seq![STRING_LITERAL]])]),
        ]])
        .rule("labeledElement", vec![seq![
            "identifier",
            group_of(vec![seq![ASSIGN], seq![PLUS_ASSIGN]]),
            group_of(vec![seq!["atom"], seq!["block"]]),
        ]])
        .rule("ebnf", vec![seq!["block", opt(seq!["blockSuffix"])]])
        .rule("blockSuffix", vec![seq!["ebnfSuffix"]])
        .rule("ebnfSuffix", vec![
            seq![QUESTION, opt(seq![QUESTION])],
            seq![STAR, opt(seq![QUESTION])],
            seq![PLUS, opt(seq![QUESTION])],
        ])
        .rule("lexerAtom", vec![
            seq!["characterRange"],
            seq!["terminalDef"],
            seq!["notSet"],
            seq![LEXER_CHAR_SET],
            seq![DOT, opt(seq!["elementOptions"])],
        ])
        .rule("atom", vec![
            seq!["terminalDef"],
            seq!["ruleref"],
            seq!["notSet"],
            seq![DOT, opt(seq!["elementOptions"])],
        ])
        .rule("notSet", vec![seq![NOT, "setElement"], seq![NOT, "blockSet"]])
        .rule("blockSet", vec![seq![LPAREN, "setElement", star(seq![OR, "setElement"]), RPAREN]])
        .rule("setElement", vec![
            seq!["characterRange"],
            seq![TOKEN_REF, opt(seq!["elementOptions"])],
            seq![STRING_LITERAL, opt(seq!["elementOptions"])],
            seq![LEXER_CHAR_SET],
        ])
        .rule("block", vec![seq![
            LPAREN, opt(seq![opt(seq!["optionsSpec"]), star(seq!["ruleAction"]), COLON]), "altList", RPAREN,
        ]])
        .rule("ruleref", vec![seq![RULE_REF, opt(seq!["argActionBlock"]), opt(seq!["elementOptions"])]])
        .rule("characterRange", vec![seq![STRING_LITERAL, RANGE, STRING_LITERAL]])
        .rule("terminalDef", vec![
            seq![TOKEN_REF, opt(seq!["elementOptions"])],
            seq![STRING_LITERAL, opt(seq!["elementOptions"])],
        ])
        .rule("elementOptions", vec![seq![LT, "elementOption", star(seq![COMMA, "elementOption"]), GT]])
        .rule("elementOption", vec![seq![
            "identifier",
            opt(seq![ASSIGN, group_of(vec![seq!["identifier"], seq![STRING_LITERAL]])]),
        ]])
        .rule("identifier", vec![seq![RULE_REF], seq![TOKEN_REF]])
        .rule("qualifiedIdentifier", vec![seq!["identifier", star(seq![DOT, "identifier"])]])
        .build()
}
