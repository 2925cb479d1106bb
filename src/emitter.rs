use std::collections::VecDeque;
use std::mem;

use crate::error::{Error, ParseError, Position};

/// An emitter is an object providing methods to the tokenizer to produce
/// tokens.
///
/// Domain-specific applications of the tokenizer can implement this trait to
/// customize per-token allocations, or avoid them altogether.
///
/// An emitter is assumed to have these internal states:
///
/// * _last start tag_: the most recently emitted start tag's name
/// * _current token_: a tag, doctype or comment token under construction
/// * _current attribute_: the attribute name/value pair under construction
///
/// The methods describe the behavior the WHATWG spec expects. An emitter
/// that ignores errors can implement `emit_error` as a noop; an emitter
/// that ignores attributes can make the attribute methods noops. The state
/// machine does need a functional `current_is_appropriate_end_tag_token`
/// to transition correctly.
pub trait Emitter {
    /// The token type this emitter produces, and that
    /// [`crate::Tokenizer`] yields when used as an iterator.
    type Token;

    /// Set the name of the _last start tag_.
    ///
    /// Used by fragment parsing and the html5lib harness; this does *not*
    /// touch the current tag's name.
    fn set_last_start_tag(&mut self, last_start_tag: Option<&str>);

    /// The state machine has reached the end of the file.
    fn emit_eof(&mut self);

    /// A (recoverable) parse error.
    fn emit_error(&mut self, error: ParseError);

    /// The tokenizer reports the input cursor here before every machine
    /// step, so errors the emitter raises on its own (duplicate attributes,
    /// end tags with attributes) carry a position too.
    fn set_position(&mut self, _position: Position) {}

    /// After every machine step, the tokenizer calls this method to retrieve
    /// a token for its iterator interface.
    fn pop_token(&mut self) -> Option<Self::Token>;

    /// Emit a run of characters as character tokens.
    fn emit_string(&mut self, s: &str);

    /// Set the _current token_ to a start tag.
    fn init_start_tag(&mut self);

    /// Set the _current token_ to an end tag.
    fn init_end_tag(&mut self);

    /// Set the _current token_ to a comment.
    fn init_comment(&mut self);

    /// Set the _current token_ to a new doctype token with empty name, no
    /// public/system identifier and force-quirks off.
    fn init_doctype(&mut self);

    /// Emit the _current token_, which must be a tag.
    ///
    /// Folds the current attribute into the tag first (dropping duplicates
    /// with [`Error::DuplicateAttribute`]) and, for a start tag, updates the
    /// _last start tag_.
    fn emit_current_tag(&mut self);

    /// Emit the _current token_, which must be a comment.
    fn emit_current_comment(&mut self);

    /// Emit the _current token_, which must be a doctype.
    fn emit_current_doctype(&mut self);

    /// Set the self-closing flag of the current tag. On an end tag this is
    /// [`Error::EndTagWithTrailingSolidus`] instead.
    fn set_self_closing(&mut self);

    /// Set the force-quirks flag of the current doctype.
    fn set_force_quirks(&mut self);

    /// Append to the current tag's name.
    fn push_tag_name(&mut self, s: &str);

    /// Append to the current comment's data.
    fn push_comment(&mut self, s: &str);

    /// Append to the current doctype's name.
    fn push_doctype_name(&mut self, s: &str);

    /// Start a fresh _current attribute_, folding the previous one into the
    /// current tag per the duplicate rule.
    fn init_attribute(&mut self);

    /// Append to the current attribute's name.
    fn push_attribute_name(&mut self, s: &str);

    /// Append to the current attribute's value.
    fn push_attribute_value(&mut self, s: &str);

    /// Set the current doctype's public identifier to the empty string.
    fn init_doctype_public_identifier(&mut self);

    /// Set the current doctype's system identifier to the empty string.
    fn init_doctype_system_identifier(&mut self);

    /// Append to the current doctype's public identifier.
    fn push_doctype_public_identifier(&mut self, s: &str);

    /// Append to the current doctype's system identifier.
    fn push_doctype_system_identifier(&mut self, s: &str);

    /// True iff the current token is an end tag whose name equals the
    /// _last start tag_. See the spec's "appropriate end tag token".
    fn current_is_appropriate_end_tag_token(&mut self) -> bool;
}

/// A start tag such as `<p>` or `<a href="x">`.
#[derive(Debug, Default, Eq, PartialEq, Clone)]
pub struct StartTag {
    /// The tag name, lowercased.
    pub name: String,

    /// The attributes, in source order. Duplicates are dropped during
    /// tokenization, first occurrence wins.
    pub attributes: Vec<(String, String)>,

    /// Whether the tag was written `<br/>`-style. The tree constructor
    /// acknowledges this flag; unacknowledged flags are a parse error.
    pub self_closing: bool,
}

impl StartTag {
    /// Look up an attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// An end tag such as `</p>`.
#[derive(Debug, Default, Eq, PartialEq, Clone)]
pub struct EndTag {
    /// The tag name, lowercased.
    pub name: String,
}

/// A doctype token, e.g. `<!DOCTYPE html>`.
#[derive(Debug, Default, Eq, PartialEq, Clone)]
pub struct Doctype {
    /// The doctype's name, if any. For HTML documents this is "html".
    pub name: Option<String>,

    /// The public identifier, `None` when absent (distinct from empty).
    pub public_identifier: Option<String>,

    /// The system identifier, `None` when absent (distinct from empty).
    pub system_identifier: Option<String>,

    /// The force-quirks flag.
    pub force_quirks: bool,
}

/// The token type produced by [`DefaultEmitter`].
#[derive(Debug, Eq, PartialEq, Clone)]
pub enum Token {
    /// A start tag.
    StartTag(StartTag),
    /// An end tag.
    EndTag(EndTag),
    /// A run of character data.
    String(String),
    /// A comment.
    Comment(String),
    /// A doctype declaration.
    Doctype(Doctype),
    /// A parse error. The stream continues after errors.
    Error(ParseError),
    /// End of input. Emitted exactly once, as the last token.
    Eof,
}

/// The default implementation of [`Emitter`].
#[derive(Debug, Default)]
pub struct DefaultEmitter {
    current_characters: String,
    current_token: Option<Token>,
    last_start_tag: String,
    current_attribute: Option<(String, String)>,
    end_tag_attribute_names: Vec<String>,
    emitted_tokens: VecDeque<Token>,
    position: Position,
}

impl DefaultEmitter {
    fn emit_token(&mut self, token: Token) {
        self.flush_current_characters();
        self.emitted_tokens.push_front(token);
    }

    fn flush_current_attribute(&mut self) {
        if let Some((name, value)) = self.current_attribute.take() {
            match self.current_token {
                Some(Token::StartTag(ref mut tag)) => {
                    if tag.attributes.iter().any(|(k, _)| *k == name) {
                        self.push_error(Error::DuplicateAttribute);
                    } else {
                        tag.attributes.push((name, value));
                    }
                }
                Some(Token::EndTag(_)) => {
                    if self.end_tag_attribute_names.contains(&name) {
                        self.push_error(Error::DuplicateAttribute);
                    } else {
                        self.end_tag_attribute_names.push(name);
                    }
                }
                _ => debug_assert!(false),
            }
        }
    }

    fn flush_current_characters(&mut self) {
        if self.current_characters.is_empty() {
            return;
        }

        let s = mem::take(&mut self.current_characters);
        self.emitted_tokens.push_front(Token::String(s));
    }

    // Error raised from within the emitter itself; the position is the
    // cursor the tokenizer last reported through set_position.
    fn push_error(&mut self, code: Error) {
        self.emitted_tokens.push_front(Token::Error(ParseError {
            code,
            position: self.position,
        }));
    }
}

impl Emitter for DefaultEmitter {
    type Token = Token;

    fn set_last_start_tag(&mut self, last_start_tag: Option<&str>) {
        self.last_start_tag.clear();
        self.last_start_tag
            .push_str(last_start_tag.unwrap_or_default());
    }

    fn emit_eof(&mut self) {
        self.flush_current_characters();
        self.emit_token(Token::Eof);
    }

    fn emit_error(&mut self, error: ParseError) {
        // bypass character flushing: errors are not character data
        self.emitted_tokens.push_front(Token::Error(error));
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    fn pop_token(&mut self) -> Option<Self::Token> {
        self.emitted_tokens.pop_back()
    }

    fn emit_string(&mut self, s: &str) {
        self.current_characters.push_str(s);
    }

    fn init_start_tag(&mut self) {
        self.current_token = Some(Token::StartTag(StartTag::default()));
    }

    fn init_end_tag(&mut self) {
        self.current_token = Some(Token::EndTag(EndTag::default()));
        self.end_tag_attribute_names.clear();
    }

    fn init_comment(&mut self) {
        self.current_token = Some(Token::Comment(String::new()));
    }

    fn init_doctype(&mut self) {
        self.current_token = Some(Token::Doctype(Doctype::default()));
    }

    fn emit_current_tag(&mut self) {
        self.flush_current_attribute();
        let mut token = self.current_token.take().unwrap();
        match token {
            Token::EndTag(_) => {
                if !self.end_tag_attribute_names.is_empty() {
                    self.push_error(Error::EndTagWithAttributes);
                }
                self.end_tag_attribute_names.clear();
                self.set_last_start_tag(None);
            }
            Token::StartTag(ref mut tag) => {
                let name = tag.name.clone();
                self.set_last_start_tag(Some(&name));
            }
            _ => debug_assert!(false),
        }
        self.emit_token(token);
    }

    fn emit_current_comment(&mut self) {
        let comment = self.current_token.take().unwrap();
        debug_assert!(matches!(comment, Token::Comment(_)));
        self.emit_token(comment);
    }

    fn emit_current_doctype(&mut self) {
        let doctype = self.current_token.take().unwrap();
        debug_assert!(matches!(doctype, Token::Doctype(_)));
        self.emit_token(doctype);
    }

    fn set_self_closing(&mut self) {
        match self.current_token {
            Some(Token::StartTag(ref mut tag)) => {
                tag.self_closing = true;
            }
            Some(Token::EndTag(_)) => {
                self.push_error(Error::EndTagWithTrailingSolidus);
            }
            _ => debug_assert!(false),
        }
    }

    fn set_force_quirks(&mut self) {
        match self.current_token {
            Some(Token::Doctype(ref mut doctype)) => doctype.force_quirks = true,
            _ => debug_assert!(false),
        }
    }

    fn push_tag_name(&mut self, s: &str) {
        match self.current_token {
            Some(
                Token::StartTag(StartTag { ref mut name, .. })
                | Token::EndTag(EndTag { ref mut name, .. }),
            ) => {
                name.push_str(s);
            }
            _ => debug_assert!(false),
        }
    }

    fn push_comment(&mut self, s: &str) {
        match self.current_token {
            Some(Token::Comment(ref mut data)) => data.push_str(s),
            _ => debug_assert!(false),
        }
    }

    fn push_doctype_name(&mut self, s: &str) {
        match self.current_token {
            Some(Token::Doctype(ref mut doctype)) => {
                doctype.name.get_or_insert_with(String::new).push_str(s)
            }
            _ => debug_assert!(false),
        }
    }

    fn init_attribute(&mut self) {
        self.flush_current_attribute();
        self.current_attribute = Some(Default::default());
    }

    fn push_attribute_name(&mut self, s: &str) {
        self.current_attribute.as_mut().unwrap().0.push_str(s);
    }

    fn push_attribute_value(&mut self, s: &str) {
        self.current_attribute.as_mut().unwrap().1.push_str(s);
    }

    fn init_doctype_public_identifier(&mut self) {
        if let Some(Token::Doctype(ref mut doctype)) = self.current_token {
            doctype.public_identifier = Some(String::new());
        } else {
            debug_assert!(false);
        }
    }

    fn init_doctype_system_identifier(&mut self) {
        if let Some(Token::Doctype(ref mut doctype)) = self.current_token {
            doctype.system_identifier = Some(String::new());
        } else {
            debug_assert!(false);
        }
    }

    fn push_doctype_public_identifier(&mut self, s: &str) {
        if let Some(Token::Doctype(Doctype {
            public_identifier: Some(ref mut id),
            ..
        })) = self.current_token
        {
            id.push_str(s);
        } else {
            debug_assert!(false);
        }
    }

    fn push_doctype_system_identifier(&mut self, s: &str) {
        if let Some(Token::Doctype(Doctype {
            system_identifier: Some(ref mut id),
            ..
        })) = self.current_token
        {
            id.push_str(s);
        } else {
            debug_assert!(false);
        }
    }

    fn current_is_appropriate_end_tag_token(&mut self) -> bool {
        match self.current_token {
            Some(Token::EndTag(ref tag)) => {
                !self.last_start_tag.is_empty() && self.last_start_tag == tag.name
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_keep_source_order() {
        let mut emitter = DefaultEmitter::default();
        emitter.init_start_tag();
        emitter.push_tag_name("a");
        for name in &["z", "m", "a"] {
            emitter.init_attribute();
            emitter.push_attribute_name(name);
            emitter.push_attribute_value("1");
        }
        emitter.emit_current_tag();
        match emitter.pop_token().unwrap() {
            Token::StartTag(tag) => {
                let names: Vec<_> = tag.attributes.iter().map(|(k, _)| k.as_str()).collect();
                assert_eq!(names, vec!["z", "m", "a"]);
            }
            other => panic!("unexpected token {:?}", other),
        }
    }

    #[test]
    fn duplicate_attribute_first_wins() {
        let mut emitter = DefaultEmitter::default();
        emitter.init_start_tag();
        emitter.push_tag_name("a");
        for value in &["first", "second"] {
            emitter.init_attribute();
            emitter.push_attribute_name("x");
            emitter.push_attribute_value(value);
        }
        emitter.emit_current_tag();
        let mut saw_error = false;
        let mut tag = None;
        while let Some(token) = emitter.pop_token() {
            match token {
                Token::Error(e) => {
                    assert_eq!(e.code, Error::DuplicateAttribute);
                    saw_error = true;
                }
                Token::StartTag(t) => tag = Some(t),
                _ => {}
            }
        }
        assert!(saw_error);
        assert_eq!(tag.unwrap().attribute("x"), Some("first"));
    }
}
