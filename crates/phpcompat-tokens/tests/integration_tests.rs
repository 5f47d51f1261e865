//! Integration tests for token navigation

use phpcompat_core::{TargetRange, VersionGate};
use phpcompat_tokens::{legacy_keyword, Lexer, NumericEvaluator, NumericValue, Scan, TokenKind, TokenStream};
use pretty_assertions::assert_eq;

fn stream(source: &str) -> TokenStream {
    Lexer::new(source).tokenize().unwrap()
}

fn position_of(stream: &TokenStream, text: &str) -> usize {
    stream.iter().position(|t| t.text == text).unwrap()
}

#[test]
fn argument_extraction_ignores_nested_commas_and_trailing_comma() {
    let s = stream("<?php foo($a, [1,2,3], bar(1,2), $c,);");
    let call = position_of(&s, "foo");

    assert!(s.is_call_site(call));

    let raw: Vec<String> = s.call_arguments(call).into_iter().map(|a| a.raw).collect();
    assert_eq!(raw, vec!["$a", "[1,2,3]", "bar(1,2)", "$c"]);
    assert_eq!(s.argument_count(call), 4);
}

#[test]
fn argument_spans_point_at_tokens() {
    let s = stream("<?php str_replace( 'a', 'b', $subject );");
    let call = position_of(&s, "str_replace");
    let third = s.argument_at(call, 3).unwrap();

    assert_eq!(third.start, third.end);
    assert_eq!(s[third.start].kind, TokenKind::Variable);
}

#[test]
fn negative_literal_determinism() {
    let s = stream("<?php $a = - 1; $b = -$x; $c = intval(3) & $b;");
    let gate = VersionGate::new(TargetRange::parse("7.0").unwrap());
    let evaluator = NumericEvaluator::new(&s, &gate);

    let spans: Vec<(usize, usize)> = s
        .iter()
        .enumerate()
        .filter(|(_, t)| t.kind == TokenKind::Equal)
        .map(|(eq, _)| {
            let end = s.find_next(&[TokenKind::Semicolon], eq, None, Scan::Flat).unwrap();
            (eq + 1, end - 1)
        })
        .collect();

    assert_eq!(evaluator.evaluate(spans[0].0, spans[0].1, false), NumericValue::Number(-1.0));
    assert_eq!(evaluator.evaluate(spans[1].0, spans[1].1, false), NumericValue::Undetermined);
    assert_eq!(evaluator.is_negative(spans[2].0, spans[2].1, false), None);
}

#[test]
fn scopes_follow_nested_declarations() {
    let source = r#"<?php
namespace App {
    class Service {
        public function run() {
            $f = function () {
                return [1, 2];
            };
        }
    }
}
"#;
    let s = stream(source);
    let ret = s.iter().position(|t| t.kind == TokenKind::Return).unwrap();
    let owners: Vec<TokenKind> = s[ret].enclosing_scopes.iter().map(|&o| s[o].kind).collect();

    assert_eq!(
        owners,
        vec![TokenKind::Namespace, TokenKind::Class, TokenKind::Function, TokenKind::Closure]
    );
    assert_eq!(s.enclosing_oo_scope(ret).map(|o| s[o].kind), Some(TokenKind::Class));
    assert!(!s.is_global_scope(ret));
}

#[test]
fn legacy_tokenizer_round_trip() {
    let source = "<?php goto end; yield $x;";
    let modern = stream(source);
    let legacy = Lexer::new(source)
        .with_parser_version(phpcompat_core::Version::new(5, 2))
        .tokenize()
        .unwrap();

    assert!(modern.iter().any(|t| t.kind == TokenKind::Goto));
    assert!(legacy.iter().all(|t| t.kind != TokenKind::Goto));

    let goto = position_of(&legacy, "goto");
    let yield_kw = position_of(&legacy, "yield");
    assert_eq!(legacy_keyword(&legacy, goto), Some(TokenKind::Goto));
    assert_eq!(legacy_keyword(&legacy, yield_kw), Some(TokenKind::Yield));
}

#[test]
fn attribute_brackets_are_matched() {
    let s = stream("<?php #[Route('/a', methods: ['GET'])] function a() {}");
    let attribute = s.iter().position(|t| t.kind == TokenKind::Attribute).unwrap();
    let closer = s.closer_of(attribute).unwrap();

    assert_eq!(s[closer].kind, TokenKind::CloseSquareBracket);
    assert_eq!(s.next_non_empty_kind(closer), Some(TokenKind::Function));
}
