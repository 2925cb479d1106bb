//! Token-level cases: character references, raw text end-tag matching,
//! doctype variants, and attribute handling.

use gumtree::{Error, State, Token, Tokenizer};
use pretty_assertions::assert_eq;

fn tokens(input: &str) -> Vec<Token> {
    Tokenizer::new(input)
        .infallible()
        .filter(|t| !matches!(t, Token::Eof))
        .collect()
}

fn text_of(input: &str) -> String {
    let mut out = String::new();
    for token in tokens(input) {
        if let Token::String(s) = token {
            out.push_str(&s);
        }
    }
    out
}

fn errors_of(input: &str) -> Vec<Error> {
    tokens(input)
        .into_iter()
        .filter_map(|t| match t {
            Token::Error(e) => Some(e.code),
            _ => None,
        })
        .collect()
}

#[test]
fn named_reference_with_semicolon() {
    assert_eq!(text_of("&amp;"), "&");
    assert_eq!(text_of("&CounterClockwiseContourIntegral;"), "\u{2233}");
    assert_eq!(errors_of("&amp;"), vec![]);
}

#[test]
fn named_reference_without_semicolon_is_legacy() {
    assert_eq!(text_of("&amp"), "&");
    assert_eq!(
        errors_of("&amp"),
        vec![Error::MissingSemicolonAfterCharacterReference]
    );
}

#[test]
fn longest_match_leaves_the_tail() {
    // &notit; resolves &not and leaves "it;" literal
    assert_eq!(text_of("&notit;"), "\u{ac}it;");
    // &notin; is its own entity
    assert_eq!(text_of("&notin;"), "\u{2209}");
}

#[test]
fn unknown_reference_stays_literal() {
    assert_eq!(text_of("&xyzzy"), "&xyzzy");
    assert_eq!(errors_of("&xyzzy"), vec![]);
    // with a semicolon it is an error
    assert_eq!(text_of("&xyzzy;"), "&xyzzy;");
    assert_eq!(errors_of("&xyzzy;"), vec![Error::UnknownNamedCharacterReference]);
}

#[test]
fn legacy_reference_in_attribute_depends_on_next_char() {
    // followed by alphanumeric: stays literal, no error
    let first_tokens = tokens("<a href=\"?a=b&notc=d\">");
    match &first_tokens[0] {
        Token::StartTag(tag) => assert_eq!(tag.attribute("href"), Some("?a=b&notc=d")),
        other => panic!("unexpected {:?}", other),
    }

    // followed by something else: resolves with an error
    let toks = tokens("<a href=\"?a=b&not(\">");
    match &toks
        .iter()
        .find(|t| matches!(t, Token::StartTag(_)))
        .unwrap()
    {
        Token::StartTag(tag) => assert_eq!(tag.attribute("href"), Some("?a=b\u{ac}(")),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn numeric_references() {
    assert_eq!(text_of("&#65;&#x42;&#X43;"), "ABC");
    assert_eq!(text_of("&#0;"), "\u{fffd}");
    assert!(errors_of("&#0;").contains(&Error::NullCharacterReference));
    // windows-1252 aliasing
    assert_eq!(text_of("&#x80;"), "\u{20ac}");
    assert!(errors_of("&#x80;").contains(&Error::ControlCharacterReference));
    assert_eq!(text_of("&#x110000;"), "\u{fffd}");
    assert!(errors_of("&#x110000;").contains(&Error::CharacterReferenceOutsideUnicodeRange));
    assert_eq!(text_of("&#xD800;"), "\u{fffd}");
    assert!(errors_of("&#xD800;").contains(&Error::SurrogateCharacterReference));
    assert!(errors_of("&#x;").contains(&Error::AbsenceOfDigitsInNumericCharacterReference));
}

#[test]
fn rcdata_matches_only_the_appropriate_end_tag() {
    let mut tokenizer = Tokenizer::new("</other></title>x");
    tokenizer.set_state(State::RcData);
    tokenizer.set_last_start_tag(Some("title"));
    let tokens: Vec<Token> = tokenizer
        .infallible()
        .filter(|t| !matches!(t, Token::Eof | Token::Error(_)))
        .collect();
    assert_eq!(tokens.len(), 3);
    assert!(matches!(&tokens[0], Token::String(s) if s == "</other>"));
    assert!(matches!(&tokens[1], Token::EndTag(tag) if tag.name == "title"));
    assert!(matches!(&tokens[2], Token::String(s) if s == "x"));
}

#[test]
fn script_data_double_escape() {
    // the <script> inside a script-data comment keeps </script> from
    // ending the element
    let mut tokenizer = Tokenizer::new("<!--<script>--></script>x");
    tokenizer.set_state(State::ScriptData);
    tokenizer.set_last_start_tag(Some("script"));
    let mut saw_end_tag = false;
    let mut text = String::new();
    for token in tokenizer.infallible() {
        match token {
            Token::EndTag(_) => saw_end_tag = true,
            Token::String(s) if !saw_end_tag => text.push_str(&s),
            _ => {}
        }
    }
    assert!(saw_end_tag);
    assert_eq!(text, "<!--<script>-->");
}

#[test]
fn doctype_variants() {
    match &tokens("<!DOCTYPE html>")[0] {
        Token::Doctype(d) => {
            assert_eq!(d.name.as_deref(), Some("html"));
            assert!(!d.force_quirks);
            assert_eq!(d.public_identifier, None);
        }
        other => panic!("unexpected {:?}", other),
    }

    match &tokens("<!doctype html public \"p\" 's'>")[0] {
        Token::Doctype(d) => {
            assert_eq!(d.public_identifier.as_deref(), Some("p"));
            assert_eq!(d.system_identifier.as_deref(), Some("s"));
        }
        other => panic!("unexpected {:?}", other),
    }

    // truncated doctype forces quirks
    let toks = tokens("<!DOCTYPE");
    assert!(matches!(&toks[..], [Token::Error(_), Token::Doctype(d)] if d.force_quirks));
}

#[test]
fn comment_oddities() {
    assert!(matches!(
        &tokens("<!---->")[0],
        Token::Comment(s) if s.is_empty()
    ));
    assert!(errors_of("<!--a<!--b-->").contains(&Error::NestedComment));
    assert!(errors_of("<?php ?>")
        .contains(&Error::UnexpectedQuestionMarkInsteadOfTagName));
    // bogus comment keeps the content
    assert!(tokens("<?php ?>")
        .iter()
        .any(|t| matches!(t, Token::Comment(s) if s == "?php ?")));
}

#[test]
fn cdata_outside_foreign_content_is_a_bogus_comment() {
    let toks = tokens("<![CDATA[x]]>");
    assert!(errors_of("<![CDATA[x]]>").contains(&Error::CdataInHtmlContent));
    assert!(toks
        .iter()
        .any(|t| matches!(t, Token::Comment(s) if s == "[CDATA[x]]")));
}

#[test]
fn cdata_passes_through_when_allowed() {
    let mut tokenizer = Tokenizer::new("<![CDATA[x]]>");
    tokenizer.set_cdata_allowed(true);
    let text: String = tokenizer
        .infallible()
        .filter_map(|t| match t {
            Token::String(s) => Some(s),
            _ => None,
        })
        .collect();
    assert_eq!(text, "x");
}

#[test]
fn null_handling_depends_on_state() {
    // data state keeps the NUL (with an error); rawtext replaces it
    assert_eq!(text_of("\u{0}"), "\u{0}");
    let mut tokenizer = Tokenizer::new("\u{0}");
    tokenizer.set_state(State::RawText);
    let text: String = tokenizer
        .infallible()
        .filter_map(|t| match t {
            Token::String(s) => Some(s),
            _ => None,
        })
        .collect();
    assert_eq!(text, "\u{fffd}");
}

#[test]
fn attribute_values_unquoted_and_quoted() {
    let toks = tokens("<a one=1 two='2' three=\"3\" four>");
    match &toks[0] {
        Token::StartTag(tag) => {
            assert_eq!(tag.attribute("one"), Some("1"));
            assert_eq!(tag.attribute("two"), Some("2"));
            assert_eq!(tag.attribute("three"), Some("3"));
            assert_eq!(tag.attribute("four"), Some(""));
            assert!(!tag.self_closing);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn end_tag_with_attributes_is_an_error() {
    assert!(errors_of("</p x=1>").contains(&Error::EndTagWithAttributes));
    assert!(errors_of("</p/>").contains(&Error::EndTagWithTrailingSolidus));
}

#[test]
fn eof_token_is_emitted_once() {
    let all: Vec<Token> = Tokenizer::new("x").infallible().collect();
    assert_eq!(
        all.iter().filter(|t| matches!(t, Token::Eof)).count(),
        1
    );
    assert!(matches!(all.last(), Some(Token::Eof)));
}
