use crate::emitter::Emitter;
use crate::entities;
use crate::error::Error;
use crate::machine_helper::{
    cont, enter_state, eof, error, exit_state, mutate_character_reference, read_char,
    reconsume_in, switch_to,
};
use crate::reader::Reader;
use crate::tokenizer::Tokenizer;
use crate::utils::{ctostr, ControlToken, MachineState as State};

#[inline]
fn is_whitespace(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\x0C' | ' ')
}

/// The shared tail of the RCDATA/RAWTEXT/script-data end tag name states:
/// either the end tag matches the last start tag and tag parsing continues,
/// or everything consumed so far is re-emitted as text.
fn consume_end_tag_name<R: Reader, E: Emitter>(
    slf: &mut Tokenizer<R, E>,
    c: Option<char>,
    fallback: State,
) -> Result<ControlToken, R::Error> {
    match c {
        Some(x) if x.is_ascii_alphabetic() => {
            slf.emitter
                .push_tag_name(ctostr!(x.to_ascii_lowercase()));
            slf.helper.temporary_buffer.push(x);
            cont!()
        }
        Some(x @ ('\t' | '\n' | '\x0C' | ' ' | '/' | '>')) => {
            if slf.emitter.current_is_appropriate_end_tag_token() {
                match x {
                    '/' => switch_to!(slf, State::SelfClosingStartTag),
                    '>' => {
                        slf.emitter.emit_current_tag();
                        switch_to!(slf, State::Data)
                    }
                    _ => switch_to!(slf, State::BeforeAttributeName),
                }
            } else {
                slf.emitter.emit_string("</");
                slf.helper.flush_buffer_characters(&mut slf.emitter);
                reconsume_in!(slf, Some(x), fallback)
            }
        }
        c => {
            slf.emitter.emit_string("</");
            slf.helper.flush_buffer_characters(&mut slf.emitter);
            reconsume_in!(slf, c, fallback)
        }
    }
}

/// Run one step of the state machine: consume zero or more characters and
/// make zero or more emitter calls. The tokenizer's iterator keeps calling
/// this until a token is available.
pub(crate) fn consume<R: Reader, E: Emitter>(
    slf: &mut Tokenizer<R, E>,
) -> Result<ControlToken, R::Error> {
    match slf.helper.state {
        State::Data => match read_char!(slf)? {
            Some('&') => enter_state!(slf, State::CharacterReference),
            Some('<') => switch_to!(slf, State::TagOpen),
            Some('\0') => {
                error!(slf, Error::UnexpectedNullCharacter);
                slf.emitter.emit_string("\0");
                cont!()
            }
            Some(x) => {
                slf.emitter.emit_string(ctostr!(x));
                cont!()
            }
            None => eof!(),
        },
        State::RcData => match read_char!(slf)? {
            Some('&') => enter_state!(slf, State::CharacterReference),
            Some('<') => switch_to!(slf, State::RcDataLessThanSign),
            Some('\0') => {
                error!(slf, Error::UnexpectedNullCharacter);
                slf.emitter.emit_string("\u{fffd}");
                cont!()
            }
            Some(x) => {
                slf.emitter.emit_string(ctostr!(x));
                cont!()
            }
            None => eof!(),
        },
        State::RawText => match read_char!(slf)? {
            Some('<') => switch_to!(slf, State::RawTextLessThanSign),
            Some('\0') => {
                error!(slf, Error::UnexpectedNullCharacter);
                slf.emitter.emit_string("\u{fffd}");
                cont!()
            }
            Some(x) => {
                slf.emitter.emit_string(ctostr!(x));
                cont!()
            }
            None => eof!(),
        },
        State::ScriptData => match read_char!(slf)? {
            Some('<') => switch_to!(slf, State::ScriptDataLessThanSign),
            Some('\0') => {
                error!(slf, Error::UnexpectedNullCharacter);
                slf.emitter.emit_string("\u{fffd}");
                cont!()
            }
            Some(x) => {
                slf.emitter.emit_string(ctostr!(x));
                cont!()
            }
            None => eof!(),
        },
        State::PlainText => match read_char!(slf)? {
            Some('\0') => {
                error!(slf, Error::UnexpectedNullCharacter);
                slf.emitter.emit_string("\u{fffd}");
                cont!()
            }
            Some(x) => {
                slf.emitter.emit_string(ctostr!(x));
                cont!()
            }
            None => eof!(),
        },
        State::TagOpen => match read_char!(slf)? {
            Some('!') => switch_to!(slf, State::MarkupDeclarationOpen),
            Some('/') => switch_to!(slf, State::EndTagOpen),
            Some(x) if x.is_ascii_alphabetic() => {
                slf.emitter.init_start_tag();
                reconsume_in!(slf, Some(x), State::TagName)
            }
            c @ Some('?') => {
                error!(slf, Error::UnexpectedQuestionMarkInsteadOfTagName);
                slf.emitter.init_comment();
                reconsume_in!(slf, c, State::BogusComment)
            }
            None => {
                error!(slf, Error::EofBeforeTagName);
                slf.emitter.emit_string("<");
                eof!()
            }
            c @ Some(_) => {
                error!(slf, Error::InvalidFirstCharacterOfTagName);
                slf.emitter.emit_string("<");
                reconsume_in!(slf, c, State::Data)
            }
        },
        State::EndTagOpen => match read_char!(slf)? {
            Some(x) if x.is_ascii_alphabetic() => {
                slf.emitter.init_end_tag();
                reconsume_in!(slf, Some(x), State::TagName)
            }
            Some('>') => {
                error!(slf, Error::MissingEndTagName);
                switch_to!(slf, State::Data)
            }
            None => {
                error!(slf, Error::EofBeforeTagName);
                slf.emitter.emit_string("</");
                eof!()
            }
            c @ Some(_) => {
                error!(slf, Error::InvalidFirstCharacterOfTagName);
                slf.emitter.init_comment();
                reconsume_in!(slf, c, State::BogusComment)
            }
        },
        State::TagName => match read_char!(slf)? {
            Some(x) if is_whitespace(x) => switch_to!(slf, State::BeforeAttributeName),
            Some('/') => switch_to!(slf, State::SelfClosingStartTag),
            Some('>') => {
                slf.emitter.emit_current_tag();
                switch_to!(slf, State::Data)
            }
            Some('\0') => {
                error!(slf, Error::UnexpectedNullCharacter);
                slf.emitter.push_tag_name("\u{fffd}");
                cont!()
            }
            Some(x) => {
                slf.emitter.push_tag_name(ctostr!(x.to_ascii_lowercase()));
                cont!()
            }
            None => {
                error!(slf, Error::EofInTag);
                eof!()
            }
        },
        State::RcDataLessThanSign => match read_char!(slf)? {
            Some('/') => {
                slf.helper.temporary_buffer.clear();
                switch_to!(slf, State::RcDataEndTagOpen)
            }
            c => {
                slf.emitter.emit_string("<");
                reconsume_in!(slf, c, State::RcData)
            }
        },
        State::RcDataEndTagOpen => match read_char!(slf)? {
            Some(x) if x.is_ascii_alphabetic() => {
                slf.emitter.init_end_tag();
                reconsume_in!(slf, Some(x), State::RcDataEndTagName)
            }
            c => {
                slf.emitter.emit_string("</");
                reconsume_in!(slf, c, State::RcData)
            }
        },
        State::RcDataEndTagName => {
            let c = read_char!(slf)?;
            consume_end_tag_name(slf, c, State::RcData)
        }
        State::RawTextLessThanSign => match read_char!(slf)? {
            Some('/') => {
                slf.helper.temporary_buffer.clear();
                switch_to!(slf, State::RawTextEndTagOpen)
            }
            c => {
                slf.emitter.emit_string("<");
                reconsume_in!(slf, c, State::RawText)
            }
        },
        State::RawTextEndTagOpen => match read_char!(slf)? {
            Some(x) if x.is_ascii_alphabetic() => {
                slf.emitter.init_end_tag();
                reconsume_in!(slf, Some(x), State::RawTextEndTagName)
            }
            c => {
                slf.emitter.emit_string("</");
                reconsume_in!(slf, c, State::RawText)
            }
        },
        State::RawTextEndTagName => {
            let c = read_char!(slf)?;
            consume_end_tag_name(slf, c, State::RawText)
        }
        State::ScriptDataLessThanSign => match read_char!(slf)? {
            Some('/') => {
                slf.helper.temporary_buffer.clear();
                switch_to!(slf, State::ScriptDataEndTagOpen)
            }
            Some('!') => {
                slf.emitter.emit_string("<!");
                switch_to!(slf, State::ScriptDataEscapeStart)
            }
            c => {
                slf.emitter.emit_string("<");
                reconsume_in!(slf, c, State::ScriptData)
            }
        },
        State::ScriptDataEndTagOpen => match read_char!(slf)? {
            Some(x) if x.is_ascii_alphabetic() => {
                slf.emitter.init_end_tag();
                reconsume_in!(slf, Some(x), State::ScriptDataEndTagName)
            }
            c => {
                slf.emitter.emit_string("</");
                reconsume_in!(slf, c, State::ScriptData)
            }
        },
        State::ScriptDataEndTagName => {
            let c = read_char!(slf)?;
            consume_end_tag_name(slf, c, State::ScriptData)
        }
        State::ScriptDataEscapeStart => match read_char!(slf)? {
            Some('-') => {
                slf.emitter.emit_string("-");
                switch_to!(slf, State::ScriptDataEscapeStartDash)
            }
            c => reconsume_in!(slf, c, State::ScriptData),
        },
        State::ScriptDataEscapeStartDash => match read_char!(slf)? {
            Some('-') => {
                slf.emitter.emit_string("-");
                switch_to!(slf, State::ScriptDataEscapedDashDash)
            }
            c => reconsume_in!(slf, c, State::ScriptData),
        },
        State::ScriptDataEscaped => match read_char!(slf)? {
            Some('-') => {
                slf.emitter.emit_string("-");
                switch_to!(slf, State::ScriptDataEscapedDash)
            }
            Some('<') => switch_to!(slf, State::ScriptDataEscapedLessThanSign),
            Some('\0') => {
                error!(slf, Error::UnexpectedNullCharacter);
                slf.emitter.emit_string("\u{fffd}");
                cont!()
            }
            Some(x) => {
                slf.emitter.emit_string(ctostr!(x));
                cont!()
            }
            None => {
                error!(slf, Error::EofInScriptHtmlCommentLikeText);
                eof!()
            }
        },
        State::ScriptDataEscapedDash => match read_char!(slf)? {
            Some('-') => {
                slf.emitter.emit_string("-");
                switch_to!(slf, State::ScriptDataEscapedDashDash)
            }
            Some('<') => switch_to!(slf, State::ScriptDataEscapedLessThanSign),
            Some('\0') => {
                error!(slf, Error::UnexpectedNullCharacter);
                slf.emitter.emit_string("\u{fffd}");
                switch_to!(slf, State::ScriptDataEscaped)
            }
            Some(x) => {
                slf.emitter.emit_string(ctostr!(x));
                switch_to!(slf, State::ScriptDataEscaped)
            }
            None => {
                error!(slf, Error::EofInScriptHtmlCommentLikeText);
                eof!()
            }
        },
        State::ScriptDataEscapedDashDash => match read_char!(slf)? {
            Some('-') => {
                slf.emitter.emit_string("-");
                cont!()
            }
            Some('<') => switch_to!(slf, State::ScriptDataEscapedLessThanSign),
            Some('>') => {
                slf.emitter.emit_string(">");
                switch_to!(slf, State::ScriptData)
            }
            Some('\0') => {
                error!(slf, Error::UnexpectedNullCharacter);
                slf.emitter.emit_string("\u{fffd}");
                switch_to!(slf, State::ScriptDataEscaped)
            }
            Some(x) => {
                slf.emitter.emit_string(ctostr!(x));
                switch_to!(slf, State::ScriptDataEscaped)
            }
            None => {
                error!(slf, Error::EofInScriptHtmlCommentLikeText);
                eof!()
            }
        },
        State::ScriptDataEscapedLessThanSign => match read_char!(slf)? {
            Some('/') => {
                slf.helper.temporary_buffer.clear();
                switch_to!(slf, State::ScriptDataEscapedEndTagOpen)
            }
            Some(x) if x.is_ascii_alphabetic() => {
                slf.helper.temporary_buffer.clear();
                slf.emitter.emit_string("<");
                reconsume_in!(slf, Some(x), State::ScriptDataDoubleEscapeStart)
            }
            c => {
                slf.emitter.emit_string("<");
                reconsume_in!(slf, c, State::ScriptDataEscaped)
            }
        },
        State::ScriptDataEscapedEndTagOpen => match read_char!(slf)? {
            Some(x) if x.is_ascii_alphabetic() => {
                slf.emitter.init_end_tag();
                reconsume_in!(slf, Some(x), State::ScriptDataEscapedEndTagName)
            }
            c => {
                slf.emitter.emit_string("</");
                reconsume_in!(slf, c, State::ScriptDataEscaped)
            }
        },
        State::ScriptDataEscapedEndTagName => {
            let c = read_char!(slf)?;
            consume_end_tag_name(slf, c, State::ScriptDataEscaped)
        }
        State::ScriptDataDoubleEscapeStart => match read_char!(slf)? {
            Some(x) if is_whitespace(x) || x == '/' || x == '>' => {
                if slf.helper.temporary_buffer == "script" {
                    slf.emitter.emit_string(ctostr!(x));
                    switch_to!(slf, State::ScriptDataDoubleEscaped)
                } else {
                    slf.emitter.emit_string(ctostr!(x));
                    switch_to!(slf, State::ScriptDataEscaped)
                }
            }
            Some(x) if x.is_ascii_alphabetic() => {
                slf.helper.temporary_buffer.push(x.to_ascii_lowercase());
                slf.emitter.emit_string(ctostr!(x));
                cont!()
            }
            c => reconsume_in!(slf, c, State::ScriptDataEscaped),
        },
        State::ScriptDataDoubleEscaped => match read_char!(slf)? {
            Some('-') => {
                slf.emitter.emit_string("-");
                switch_to!(slf, State::ScriptDataDoubleEscapedDash)
            }
            Some('<') => {
                slf.emitter.emit_string("<");
                switch_to!(slf, State::ScriptDataDoubleEscapedLessThanSign)
            }
            Some('\0') => {
                error!(slf, Error::UnexpectedNullCharacter);
                slf.emitter.emit_string("\u{fffd}");
                cont!()
            }
            Some(x) => {
                slf.emitter.emit_string(ctostr!(x));
                cont!()
            }
            None => {
                error!(slf, Error::EofInScriptHtmlCommentLikeText);
                eof!()
            }
        },
        State::ScriptDataDoubleEscapedDash => match read_char!(slf)? {
            Some('-') => {
                slf.emitter.emit_string("-");
                switch_to!(slf, State::ScriptDataDoubleEscapedDashDash)
            }
            Some('<') => {
                slf.emitter.emit_string("<");
                switch_to!(slf, State::ScriptDataDoubleEscapedLessThanSign)
            }
            Some('\0') => {
                error!(slf, Error::UnexpectedNullCharacter);
                slf.emitter.emit_string("\u{fffd}");
                switch_to!(slf, State::ScriptDataDoubleEscaped)
            }
            Some(x) => {
                slf.emitter.emit_string(ctostr!(x));
                switch_to!(slf, State::ScriptDataDoubleEscaped)
            }
            None => {
                error!(slf, Error::EofInScriptHtmlCommentLikeText);
                eof!()
            }
        },
        State::ScriptDataDoubleEscapedDashDash => match read_char!(slf)? {
            Some('-') => {
                slf.emitter.emit_string("-");
                cont!()
            }
            Some('<') => {
                slf.emitter.emit_string("<");
                switch_to!(slf, State::ScriptDataDoubleEscapedLessThanSign)
            }
            Some('>') => {
                slf.emitter.emit_string(">");
                switch_to!(slf, State::ScriptData)
            }
            Some('\0') => {
                error!(slf, Error::UnexpectedNullCharacter);
                slf.emitter.emit_string("\u{fffd}");
                switch_to!(slf, State::ScriptDataDoubleEscaped)
            }
            Some(x) => {
                slf.emitter.emit_string(ctostr!(x));
                switch_to!(slf, State::ScriptDataDoubleEscaped)
            }
            None => {
                error!(slf, Error::EofInScriptHtmlCommentLikeText);
                eof!()
            }
        },
        State::ScriptDataDoubleEscapedLessThanSign => match read_char!(slf)? {
            Some('/') => {
                slf.helper.temporary_buffer.clear();
                slf.emitter.emit_string("/");
                switch_to!(slf, State::ScriptDataDoubleEscapeEnd)
            }
            c => reconsume_in!(slf, c, State::ScriptDataDoubleEscaped),
        },
        State::ScriptDataDoubleEscapeEnd => match read_char!(slf)? {
            Some(x) if is_whitespace(x) || x == '/' || x == '>' => {
                if slf.helper.temporary_buffer == "script" {
                    slf.emitter.emit_string(ctostr!(x));
                    switch_to!(slf, State::ScriptDataEscaped)
                } else {
                    slf.emitter.emit_string(ctostr!(x));
                    switch_to!(slf, State::ScriptDataDoubleEscaped)
                }
            }
            Some(x) if x.is_ascii_alphabetic() => {
                slf.helper.temporary_buffer.push(x.to_ascii_lowercase());
                slf.emitter.emit_string(ctostr!(x));
                cont!()
            }
            c => reconsume_in!(slf, c, State::ScriptDataDoubleEscaped),
        },
        State::BeforeAttributeName => match read_char!(slf)? {
            Some(x) if is_whitespace(x) => cont!(),
            c @ (Some('/') | Some('>') | None) => {
                reconsume_in!(slf, c, State::AfterAttributeName)
            }
            Some('=') => {
                error!(slf, Error::UnexpectedEqualsSignBeforeAttributeName);
                slf.emitter.init_attribute();
                slf.emitter.push_attribute_name("=");
                switch_to!(slf, State::AttributeName)
            }
            c @ Some(_) => {
                slf.emitter.init_attribute();
                reconsume_in!(slf, c, State::AttributeName)
            }
        },
        State::AttributeName => match read_char!(slf)? {
            c @ (Some('/') | Some('>') | None) => {
                reconsume_in!(slf, c, State::AfterAttributeName)
            }
            Some(x) if is_whitespace(x) => {
                reconsume_in!(slf, Some(x), State::AfterAttributeName)
            }
            Some('=') => switch_to!(slf, State::BeforeAttributeValue),
            Some('\0') => {
                error!(slf, Error::UnexpectedNullCharacter);
                slf.emitter.push_attribute_name("\u{fffd}");
                cont!()
            }
            Some(x @ ('"' | '\'' | '<')) => {
                error!(slf, Error::UnexpectedCharacterInAttributeName);
                slf.emitter.push_attribute_name(ctostr!(x));
                cont!()
            }
            Some(x) => {
                slf.emitter
                    .push_attribute_name(ctostr!(x.to_ascii_lowercase()));
                cont!()
            }
        },
        State::AfterAttributeName => match read_char!(slf)? {
            Some(x) if is_whitespace(x) => cont!(),
            Some('/') => switch_to!(slf, State::SelfClosingStartTag),
            Some('=') => switch_to!(slf, State::BeforeAttributeValue),
            Some('>') => {
                slf.emitter.emit_current_tag();
                switch_to!(slf, State::Data)
            }
            None => {
                error!(slf, Error::EofInTag);
                eof!()
            }
            c @ Some(_) => {
                slf.emitter.init_attribute();
                reconsume_in!(slf, c, State::AttributeName)
            }
        },
        State::BeforeAttributeValue => match read_char!(slf)? {
            Some(x) if is_whitespace(x) => cont!(),
            Some('"') => switch_to!(slf, State::AttributeValueDoubleQuoted),
            Some('\'') => switch_to!(slf, State::AttributeValueSingleQuoted),
            Some('>') => {
                error!(slf, Error::MissingAttributeValue);
                slf.emitter.emit_current_tag();
                switch_to!(slf, State::Data)
            }
            c => reconsume_in!(slf, c, State::AttributeValueUnquoted),
        },
        State::AttributeValueDoubleQuoted => match read_char!(slf)? {
            Some('"') => switch_to!(slf, State::AfterAttributeValueQuoted),
            Some('&') => enter_state!(slf, State::CharacterReference),
            Some('\0') => {
                error!(slf, Error::UnexpectedNullCharacter);
                slf.emitter.push_attribute_value("\u{fffd}");
                cont!()
            }
            Some(x) => {
                slf.emitter.push_attribute_value(ctostr!(x));
                cont!()
            }
            None => {
                error!(slf, Error::EofInTag);
                eof!()
            }
        },
        State::AttributeValueSingleQuoted => match read_char!(slf)? {
            Some('\'') => switch_to!(slf, State::AfterAttributeValueQuoted),
            Some('&') => enter_state!(slf, State::CharacterReference),
            Some('\0') => {
                error!(slf, Error::UnexpectedNullCharacter);
                slf.emitter.push_attribute_value("\u{fffd}");
                cont!()
            }
            Some(x) => {
                slf.emitter.push_attribute_value(ctostr!(x));
                cont!()
            }
            None => {
                error!(slf, Error::EofInTag);
                eof!()
            }
        },
        State::AttributeValueUnquoted => match read_char!(slf)? {
            Some(x) if is_whitespace(x) => switch_to!(slf, State::BeforeAttributeName),
            Some('&') => enter_state!(slf, State::CharacterReference),
            Some('>') => {
                slf.emitter.emit_current_tag();
                switch_to!(slf, State::Data)
            }
            Some('\0') => {
                error!(slf, Error::UnexpectedNullCharacter);
                slf.emitter.push_attribute_value("\u{fffd}");
                cont!()
            }
            Some(x @ ('"' | '\'' | '<' | '=' | '`')) => {
                error!(slf, Error::UnexpectedCharacterInUnquotedAttributeValue);
                slf.emitter.push_attribute_value(ctostr!(x));
                cont!()
            }
            Some(x) => {
                slf.emitter.push_attribute_value(ctostr!(x));
                cont!()
            }
            None => {
                error!(slf, Error::EofInTag);
                eof!()
            }
        },
        State::AfterAttributeValueQuoted => match read_char!(slf)? {
            Some(x) if is_whitespace(x) => switch_to!(slf, State::BeforeAttributeName),
            Some('/') => switch_to!(slf, State::SelfClosingStartTag),
            Some('>') => {
                slf.emitter.emit_current_tag();
                switch_to!(slf, State::Data)
            }
            None => {
                error!(slf, Error::EofInTag);
                eof!()
            }
            c => {
                error!(slf, Error::MissingWhitespaceBetweenAttributes);
                reconsume_in!(slf, c, State::BeforeAttributeName)
            }
        },
        State::SelfClosingStartTag => match read_char!(slf)? {
            Some('>') => {
                slf.emitter.set_self_closing();
                slf.emitter.emit_current_tag();
                switch_to!(slf, State::Data)
            }
            None => {
                error!(slf, Error::EofInTag);
                eof!()
            }
            c => {
                error!(slf, Error::UnexpectedSolidusInTag);
                reconsume_in!(slf, c, State::BeforeAttributeName)
            }
        },
        State::BogusComment => match read_char!(slf)? {
            Some('>') => {
                slf.emitter.emit_current_comment();
                switch_to!(slf, State::Data)
            }
            None => {
                slf.emitter.emit_current_comment();
                eof!()
            }
            Some('\0') => {
                error!(slf, Error::UnexpectedNullCharacter);
                slf.emitter.push_comment("\u{fffd}");
                cont!()
            }
            Some(x) => {
                slf.emitter.push_comment(ctostr!(x));
                cont!()
            }
        },
        State::MarkupDeclarationOpen => {
            if slf.input.try_read_string(&mut slf.emitter, "--", true)? {
                slf.emitter.init_comment();
                switch_to!(slf, State::CommentStart)
            } else if slf.input.try_read_string(&mut slf.emitter, "doctype", false)? {
                switch_to!(slf, State::Doctype)
            } else if slf.input.try_read_string(&mut slf.emitter, "[CDATA[", true)? {
                if slf.cdata_allowed {
                    switch_to!(slf, State::CdataSection)
                } else {
                    error!(slf, Error::CdataInHtmlContent);
                    slf.emitter.init_comment();
                    slf.emitter.push_comment("[CDATA[");
                    switch_to!(slf, State::BogusComment)
                }
            } else {
                error!(slf, Error::IncorrectlyOpenedComment);
                slf.emitter.init_comment();
                switch_to!(slf, State::BogusComment)
            }
        }
        State::CommentStart => match read_char!(slf)? {
            Some('-') => switch_to!(slf, State::CommentStartDash),
            Some('>') => {
                error!(slf, Error::AbruptClosingOfEmptyComment);
                slf.emitter.emit_current_comment();
                switch_to!(slf, State::Data)
            }
            c => reconsume_in!(slf, c, State::Comment),
        },
        State::CommentStartDash => match read_char!(slf)? {
            Some('-') => switch_to!(slf, State::CommentEnd),
            Some('>') => {
                error!(slf, Error::AbruptClosingOfEmptyComment);
                slf.emitter.emit_current_comment();
                switch_to!(slf, State::Data)
            }
            None => {
                error!(slf, Error::EofInComment);
                slf.emitter.emit_current_comment();
                eof!()
            }
            c => {
                slf.emitter.push_comment("-");
                reconsume_in!(slf, c, State::Comment)
            }
        },
        State::Comment => match read_char!(slf)? {
            Some('<') => {
                slf.emitter.push_comment("<");
                switch_to!(slf, State::CommentLessThanSign)
            }
            Some('-') => switch_to!(slf, State::CommentEndDash),
            Some('\0') => {
                error!(slf, Error::UnexpectedNullCharacter);
                slf.emitter.push_comment("\u{fffd}");
                cont!()
            }
            Some(x) => {
                slf.emitter.push_comment(ctostr!(x));
                cont!()
            }
            None => {
                error!(slf, Error::EofInComment);
                slf.emitter.emit_current_comment();
                eof!()
            }
        },
        State::CommentLessThanSign => match read_char!(slf)? {
            Some('!') => {
                slf.emitter.push_comment("!");
                switch_to!(slf, State::CommentLessThanSignBang)
            }
            Some('<') => {
                slf.emitter.push_comment("<");
                cont!()
            }
            c => reconsume_in!(slf, c, State::Comment),
        },
        State::CommentLessThanSignBang => match read_char!(slf)? {
            Some('-') => switch_to!(slf, State::CommentLessThanSignBangDash),
            c => reconsume_in!(slf, c, State::Comment),
        },
        State::CommentLessThanSignBangDash => match read_char!(slf)? {
            Some('-') => switch_to!(slf, State::CommentLessThanSignBangDashDash),
            c => reconsume_in!(slf, c, State::CommentEndDash),
        },
        State::CommentLessThanSignBangDashDash => match read_char!(slf)? {
            c @ (Some('>') | None) => reconsume_in!(slf, c, State::CommentEnd),
            c => {
                error!(slf, Error::NestedComment);
                reconsume_in!(slf, c, State::CommentEnd)
            }
        },
        State::CommentEndDash => match read_char!(slf)? {
            Some('-') => switch_to!(slf, State::CommentEnd),
            None => {
                error!(slf, Error::EofInComment);
                slf.emitter.emit_current_comment();
                eof!()
            }
            c => {
                slf.emitter.push_comment("-");
                reconsume_in!(slf, c, State::Comment)
            }
        },
        State::CommentEnd => match read_char!(slf)? {
            Some('>') => {
                slf.emitter.emit_current_comment();
                switch_to!(slf, State::Data)
            }
            Some('!') => switch_to!(slf, State::CommentEndBang),
            Some('-') => {
                slf.emitter.push_comment("-");
                cont!()
            }
            None => {
                error!(slf, Error::EofInComment);
                slf.emitter.emit_current_comment();
                eof!()
            }
            c => {
                slf.emitter.push_comment("--");
                reconsume_in!(slf, c, State::Comment)
            }
        },
        State::CommentEndBang => match read_char!(slf)? {
            Some('-') => {
                slf.emitter.push_comment("--!");
                switch_to!(slf, State::CommentEndDash)
            }
            Some('>') => {
                error!(slf, Error::IncorrectlyClosedComment);
                slf.emitter.emit_current_comment();
                switch_to!(slf, State::Data)
            }
            None => {
                error!(slf, Error::EofInComment);
                slf.emitter.emit_current_comment();
                eof!()
            }
            c => {
                slf.emitter.push_comment("--!");
                reconsume_in!(slf, c, State::Comment)
            }
        },
        State::Doctype => match read_char!(slf)? {
            Some(x) if is_whitespace(x) => switch_to!(slf, State::BeforeDoctypeName),
            c @ Some('>') => reconsume_in!(slf, c, State::BeforeDoctypeName),
            None => {
                error!(slf, Error::EofInDoctype);
                slf.emitter.init_doctype();
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                eof!()
            }
            c => {
                error!(slf, Error::MissingWhitespaceBeforeDoctypeName);
                reconsume_in!(slf, c, State::BeforeDoctypeName)
            }
        },
        State::BeforeDoctypeName => match read_char!(slf)? {
            Some(x) if is_whitespace(x) => cont!(),
            Some('\0') => {
                error!(slf, Error::UnexpectedNullCharacter);
                slf.emitter.init_doctype();
                slf.emitter.push_doctype_name("\u{fffd}");
                switch_to!(slf, State::DoctypeName)
            }
            Some('>') => {
                error!(slf, Error::MissingDoctypeName);
                slf.emitter.init_doctype();
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                switch_to!(slf, State::Data)
            }
            None => {
                error!(slf, Error::EofInDoctype);
                slf.emitter.init_doctype();
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                eof!()
            }
            Some(x) => {
                slf.emitter.init_doctype();
                slf.emitter
                    .push_doctype_name(ctostr!(x.to_ascii_lowercase()));
                switch_to!(slf, State::DoctypeName)
            }
        },
        State::DoctypeName => match read_char!(slf)? {
            Some(x) if is_whitespace(x) => switch_to!(slf, State::AfterDoctypeName),
            Some('>') => {
                slf.emitter.emit_current_doctype();
                switch_to!(slf, State::Data)
            }
            Some('\0') => {
                error!(slf, Error::UnexpectedNullCharacter);
                slf.emitter.push_doctype_name("\u{fffd}");
                cont!()
            }
            Some(x) => {
                slf.emitter
                    .push_doctype_name(ctostr!(x.to_ascii_lowercase()));
                cont!()
            }
            None => {
                error!(slf, Error::EofInDoctype);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                eof!()
            }
        },
        State::AfterDoctypeName => match read_char!(slf)? {
            Some(x) if is_whitespace(x) => cont!(),
            Some('>') => {
                slf.emitter.emit_current_doctype();
                switch_to!(slf, State::Data)
            }
            None => {
                error!(slf, Error::EofInDoctype);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                eof!()
            }
            c => {
                slf.input.unread_char(c);
                if slf.input.try_read_string(&mut slf.emitter, "public", false)? {
                    switch_to!(slf, State::AfterDoctypePublicKeyword)
                } else if slf.input.try_read_string(&mut slf.emitter, "system", false)? {
                    switch_to!(slf, State::AfterDoctypeSystemKeyword)
                } else {
                    error!(slf, Error::InvalidCharacterSequenceAfterDoctypeName);
                    slf.emitter.set_force_quirks();
                    switch_to!(slf, State::BogusDoctype)
                }
            }
        },
        State::AfterDoctypePublicKeyword => match read_char!(slf)? {
            Some(x) if is_whitespace(x) => switch_to!(slf, State::BeforeDoctypePublicIdentifier),
            Some('"') => {
                error!(slf, Error::MissingWhitespaceAfterDoctypePublicKeyword);
                slf.emitter.init_doctype_public_identifier();
                switch_to!(slf, State::DoctypePublicIdentifierDoubleQuoted)
            }
            Some('\'') => {
                error!(slf, Error::MissingWhitespaceAfterDoctypePublicKeyword);
                slf.emitter.init_doctype_public_identifier();
                switch_to!(slf, State::DoctypePublicIdentifierSingleQuoted)
            }
            Some('>') => {
                error!(slf, Error::MissingDoctypePublicIdentifier);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                switch_to!(slf, State::Data)
            }
            None => {
                error!(slf, Error::EofInDoctype);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                eof!()
            }
            c => {
                error!(slf, Error::MissingQuoteBeforeDoctypePublicIdentifier);
                slf.emitter.set_force_quirks();
                reconsume_in!(slf, c, State::BogusDoctype)
            }
        },
        State::BeforeDoctypePublicIdentifier => match read_char!(slf)? {
            Some(x) if is_whitespace(x) => cont!(),
            Some('"') => {
                slf.emitter.init_doctype_public_identifier();
                switch_to!(slf, State::DoctypePublicIdentifierDoubleQuoted)
            }
            Some('\'') => {
                slf.emitter.init_doctype_public_identifier();
                switch_to!(slf, State::DoctypePublicIdentifierSingleQuoted)
            }
            Some('>') => {
                error!(slf, Error::MissingDoctypePublicIdentifier);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                switch_to!(slf, State::Data)
            }
            None => {
                error!(slf, Error::EofInDoctype);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                eof!()
            }
            c => {
                error!(slf, Error::MissingQuoteBeforeDoctypePublicIdentifier);
                slf.emitter.set_force_quirks();
                reconsume_in!(slf, c, State::BogusDoctype)
            }
        },
        State::DoctypePublicIdentifierDoubleQuoted => match read_char!(slf)? {
            Some('"') => switch_to!(slf, State::AfterDoctypePublicIdentifier),
            Some('\0') => {
                error!(slf, Error::UnexpectedNullCharacter);
                slf.emitter.push_doctype_public_identifier("\u{fffd}");
                cont!()
            }
            Some('>') => {
                error!(slf, Error::AbruptDoctypePublicIdentifier);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                switch_to!(slf, State::Data)
            }
            Some(x) => {
                slf.emitter.push_doctype_public_identifier(ctostr!(x));
                cont!()
            }
            None => {
                error!(slf, Error::EofInDoctype);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                eof!()
            }
        },
        State::DoctypePublicIdentifierSingleQuoted => match read_char!(slf)? {
            Some('\'') => switch_to!(slf, State::AfterDoctypePublicIdentifier),
            Some('\0') => {
                error!(slf, Error::UnexpectedNullCharacter);
                slf.emitter.push_doctype_public_identifier("\u{fffd}");
                cont!()
            }
            Some('>') => {
                error!(slf, Error::AbruptDoctypePublicIdentifier);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                switch_to!(slf, State::Data)
            }
            Some(x) => {
                slf.emitter.push_doctype_public_identifier(ctostr!(x));
                cont!()
            }
            None => {
                error!(slf, Error::EofInDoctype);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                eof!()
            }
        },
        State::AfterDoctypePublicIdentifier => match read_char!(slf)? {
            Some(x) if is_whitespace(x) => {
                switch_to!(slf, State::BetweenDoctypePublicAndSystemIdentifiers)
            }
            Some('>') => {
                slf.emitter.emit_current_doctype();
                switch_to!(slf, State::Data)
            }
            Some('"') => {
                error!(
                    slf,
                    Error::MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers
                );
                slf.emitter.init_doctype_system_identifier();
                switch_to!(slf, State::DoctypeSystemIdentifierDoubleQuoted)
            }
            Some('\'') => {
                error!(
                    slf,
                    Error::MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers
                );
                slf.emitter.init_doctype_system_identifier();
                switch_to!(slf, State::DoctypeSystemIdentifierSingleQuoted)
            }
            None => {
                error!(slf, Error::EofInDoctype);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                eof!()
            }
            c => {
                error!(slf, Error::MissingQuoteBeforeDoctypeSystemIdentifier);
                slf.emitter.set_force_quirks();
                reconsume_in!(slf, c, State::BogusDoctype)
            }
        },
        State::BetweenDoctypePublicAndSystemIdentifiers => match read_char!(slf)? {
            Some(x) if is_whitespace(x) => cont!(),
            Some('>') => {
                slf.emitter.emit_current_doctype();
                switch_to!(slf, State::Data)
            }
            Some('"') => {
                slf.emitter.init_doctype_system_identifier();
                switch_to!(slf, State::DoctypeSystemIdentifierDoubleQuoted)
            }
            Some('\'') => {
                slf.emitter.init_doctype_system_identifier();
                switch_to!(slf, State::DoctypeSystemIdentifierSingleQuoted)
            }
            None => {
                error!(slf, Error::EofInDoctype);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                eof!()
            }
            c => {
                error!(slf, Error::MissingQuoteBeforeDoctypeSystemIdentifier);
                slf.emitter.set_force_quirks();
                reconsume_in!(slf, c, State::BogusDoctype)
            }
        },
        State::AfterDoctypeSystemKeyword => match read_char!(slf)? {
            Some(x) if is_whitespace(x) => switch_to!(slf, State::BeforeDoctypeSystemIdentifier),
            Some('"') => {
                error!(slf, Error::MissingWhitespaceAfterDoctypeSystemKeyword);
                slf.emitter.init_doctype_system_identifier();
                switch_to!(slf, State::DoctypeSystemIdentifierDoubleQuoted)
            }
            Some('\'') => {
                error!(slf, Error::MissingWhitespaceAfterDoctypeSystemKeyword);
                slf.emitter.init_doctype_system_identifier();
                switch_to!(slf, State::DoctypeSystemIdentifierSingleQuoted)
            }
            Some('>') => {
                error!(slf, Error::MissingDoctypeSystemIdentifier);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                switch_to!(slf, State::Data)
            }
            None => {
                error!(slf, Error::EofInDoctype);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                eof!()
            }
            c => {
                error!(slf, Error::MissingQuoteBeforeDoctypeSystemIdentifier);
                slf.emitter.set_force_quirks();
                reconsume_in!(slf, c, State::BogusDoctype)
            }
        },
        State::BeforeDoctypeSystemIdentifier => match read_char!(slf)? {
            Some(x) if is_whitespace(x) => cont!(),
            Some('"') => {
                slf.emitter.init_doctype_system_identifier();
                switch_to!(slf, State::DoctypeSystemIdentifierDoubleQuoted)
            }
            Some('\'') => {
                slf.emitter.init_doctype_system_identifier();
                switch_to!(slf, State::DoctypeSystemIdentifierSingleQuoted)
            }
            Some('>') => {
                error!(slf, Error::MissingDoctypeSystemIdentifier);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                switch_to!(slf, State::Data)
            }
            None => {
                error!(slf, Error::EofInDoctype);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                eof!()
            }
            c => {
                error!(slf, Error::MissingQuoteBeforeDoctypeSystemIdentifier);
                slf.emitter.set_force_quirks();
                reconsume_in!(slf, c, State::BogusDoctype)
            }
        },
        State::DoctypeSystemIdentifierDoubleQuoted => match read_char!(slf)? {
            Some('"') => switch_to!(slf, State::AfterDoctypeSystemIdentifier),
            Some('\0') => {
                error!(slf, Error::UnexpectedNullCharacter);
                slf.emitter.push_doctype_system_identifier("\u{fffd}");
                cont!()
            }
            Some('>') => {
                error!(slf, Error::AbruptDoctypeSystemIdentifier);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                switch_to!(slf, State::Data)
            }
            Some(x) => {
                slf.emitter.push_doctype_system_identifier(ctostr!(x));
                cont!()
            }
            None => {
                error!(slf, Error::EofInDoctype);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                eof!()
            }
        },
        State::DoctypeSystemIdentifierSingleQuoted => match read_char!(slf)? {
            Some('\'') => switch_to!(slf, State::AfterDoctypeSystemIdentifier),
            Some('\0') => {
                error!(slf, Error::UnexpectedNullCharacter);
                slf.emitter.push_doctype_system_identifier("\u{fffd}");
                cont!()
            }
            Some('>') => {
                error!(slf, Error::AbruptDoctypeSystemIdentifier);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                switch_to!(slf, State::Data)
            }
            Some(x) => {
                slf.emitter.push_doctype_system_identifier(ctostr!(x));
                cont!()
            }
            None => {
                error!(slf, Error::EofInDoctype);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                eof!()
            }
        },
        State::AfterDoctypeSystemIdentifier => match read_char!(slf)? {
            Some(x) if is_whitespace(x) => cont!(),
            Some('>') => {
                slf.emitter.emit_current_doctype();
                switch_to!(slf, State::Data)
            }
            None => {
                error!(slf, Error::EofInDoctype);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                eof!()
            }
            c => {
                error!(slf, Error::UnexpectedCharacterAfterDoctypeSystemIdentifier);
                reconsume_in!(slf, c, State::BogusDoctype)
            }
        },
        State::BogusDoctype => match read_char!(slf)? {
            Some('>') => {
                slf.emitter.emit_current_doctype();
                switch_to!(slf, State::Data)
            }
            Some('\0') => {
                error!(slf, Error::UnexpectedNullCharacter);
                cont!()
            }
            Some(_) => cont!(),
            None => {
                slf.emitter.emit_current_doctype();
                eof!()
            }
        },
        State::CdataSection => match read_char!(slf)? {
            Some(']') => switch_to!(slf, State::CdataSectionBracket),
            Some(x) => {
                slf.emitter.emit_string(ctostr!(x));
                cont!()
            }
            None => {
                error!(slf, Error::EofInCdata);
                eof!()
            }
        },
        State::CdataSectionBracket => match read_char!(slf)? {
            Some(']') => switch_to!(slf, State::CdataSectionEnd),
            c => {
                slf.emitter.emit_string("]");
                reconsume_in!(slf, c, State::CdataSection)
            }
        },
        State::CdataSectionEnd => match read_char!(slf)? {
            Some(']') => {
                slf.emitter.emit_string("]");
                cont!()
            }
            Some('>') => switch_to!(slf, State::Data),
            c => {
                slf.emitter.emit_string("]]");
                reconsume_in!(slf, c, State::CdataSection)
            }
        },
        State::CharacterReference => {
            slf.helper.temporary_buffer.clear();
            slf.helper.temporary_buffer.push('&');
            match read_char!(slf)? {
                Some(x) if x.is_ascii_alphanumeric() => {
                    reconsume_in!(slf, Some(x), State::NamedCharacterReference)
                }
                Some('#') => {
                    slf.helper.temporary_buffer.push('#');
                    switch_to!(slf, State::NumericCharacterReference)
                }
                c => {
                    slf.helper
                        .flush_code_points_consumed_as_character_reference(&mut slf.emitter);
                    let return_state = slf.helper.pop_return_state();
                    reconsume_in!(slf, c, return_state)
                }
            }
        }
        State::NamedCharacterReference => {
            // Longest-match resolution: consume while the candidate is still
            // a prefix of some identifier, remember the last exact match,
            // and push back whatever trails it. The unread stack is bounded
            // by entities::MAX_NAME_LEN.
            let mut candidate = String::new();
            let mut matched: Option<(usize, &'static str)> = None;
            loop {
                let c = read_char!(slf)?;
                match c {
                    Some(x) if x.is_ascii_alphanumeric() || x == ';' => {
                        candidate.push(x);
                        if !entities::is_prefix(&candidate) {
                            candidate.pop();
                            slf.input.unread_char(Some(x));
                            break;
                        }
                        if let Some(value) = entities::lookup(&candidate) {
                            matched = Some((candidate.len(), value));
                        }
                        if x == ';' {
                            break;
                        }
                    }
                    c => {
                        slf.input.unread_char(c);
                        break;
                    }
                }
            }
            debug_assert!(candidate.len() <= entities::MAX_NAME_LEN);

            match matched {
                Some((match_len, value)) => {
                    let with_semicolon = candidate[..match_len].ends_with(';');
                    for x in candidate[match_len..].chars().rev() {
                        slf.input.unread_char(Some(x));
                    }
                    // historical quirk: a legacy reference inside an
                    // attribute value stays literal when followed by `=` or
                    // an alphanumeric
                    let keep_literal = if !with_semicolon
                        && slf.helper.is_consumed_as_part_of_an_attribute()
                    {
                        let next = read_char!(slf)?;
                        slf.input.unread_char(next);
                        matches!(next, Some(x) if x == '=' || x.is_ascii_alphanumeric())
                    } else {
                        false
                    };

                    if keep_literal {
                        slf.helper
                            .temporary_buffer
                            .push_str(&candidate[..match_len]);
                    } else {
                        if !with_semicolon {
                            error!(slf, Error::MissingSemicolonAfterCharacterReference);
                        }
                        slf.helper.temporary_buffer.clear();
                        slf.helper.temporary_buffer.push_str(value);
                    }
                    slf.helper
                        .flush_code_points_consumed_as_character_reference(&mut slf.emitter);
                    exit_state!(slf)
                }
                None => {
                    slf.helper.temporary_buffer.push_str(&candidate);
                    slf.helper
                        .flush_code_points_consumed_as_character_reference(&mut slf.emitter);
                    switch_to!(slf, State::AmbiguousAmpersand)
                }
            }
        }
        State::AmbiguousAmpersand => match read_char!(slf)? {
            Some(x) if x.is_ascii_alphanumeric() => {
                if slf.helper.is_consumed_as_part_of_an_attribute() {
                    slf.emitter.push_attribute_value(ctostr!(x));
                } else {
                    slf.emitter.emit_string(ctostr!(x));
                }
                cont!()
            }
            c @ Some(';') => {
                error!(slf, Error::UnknownNamedCharacterReference);
                let return_state = slf.helper.pop_return_state();
                reconsume_in!(slf, c, return_state)
            }
            c => {
                let return_state = slf.helper.pop_return_state();
                reconsume_in!(slf, c, return_state)
            }
        },
        State::NumericCharacterReference => {
            slf.helper.character_reference_code = 0;
            match read_char!(slf)? {
                Some(x @ ('x' | 'X')) => {
                    slf.helper.temporary_buffer.push(x);
                    switch_to!(slf, State::HexadecimalCharacterReferenceStart)
                }
                Some(x) if x.is_ascii_digit() => {
                    reconsume_in!(slf, Some(x), State::DecimalCharacterReference)
                }
                c => {
                    error!(slf, Error::AbsenceOfDigitsInNumericCharacterReference);
                    slf.helper
                        .flush_code_points_consumed_as_character_reference(&mut slf.emitter);
                    let return_state = slf.helper.pop_return_state();
                    reconsume_in!(slf, c, return_state)
                }
            }
        }
        State::HexadecimalCharacterReferenceStart => match read_char!(slf)? {
            Some(x) if x.is_ascii_hexdigit() => {
                reconsume_in!(slf, Some(x), State::HexadecimalCharacterReference)
            }
            c => {
                error!(slf, Error::AbsenceOfDigitsInNumericCharacterReference);
                slf.helper
                    .flush_code_points_consumed_as_character_reference(&mut slf.emitter);
                let return_state = slf.helper.pop_return_state();
                reconsume_in!(slf, c, return_state)
            }
        },
        State::HexadecimalCharacterReference => match read_char!(slf)? {
            Some(x) if x.is_ascii_digit() => {
                mutate_character_reference!(slf, *16 + x - 0x0030);
                cont!()
            }
            Some(x @ 'A'..='F') => {
                mutate_character_reference!(slf, *16 + x - 0x0037);
                cont!()
            }
            Some(x @ 'a'..='f') => {
                mutate_character_reference!(slf, *16 + x - 0x0057);
                cont!()
            }
            Some(';') => switch_to!(slf, State::NumericCharacterReferenceEnd),
            c => {
                error!(slf, Error::MissingSemicolonAfterCharacterReference);
                reconsume_in!(slf, c, State::NumericCharacterReferenceEnd)
            }
        },
        State::DecimalCharacterReference => match read_char!(slf)? {
            Some(x) if x.is_ascii_digit() => {
                mutate_character_reference!(slf, *10 + x - 0x0030);
                cont!()
            }
            Some(';') => switch_to!(slf, State::NumericCharacterReferenceEnd),
            c => {
                error!(slf, Error::MissingSemicolonAfterCharacterReference);
                reconsume_in!(slf, c, State::NumericCharacterReferenceEnd)
            }
        },
        State::NumericCharacterReferenceEnd => {
            // consumes nothing; maps the accumulated number to a scalar
            let mut code = slf.helper.character_reference_code;
            match code {
                0x00 => {
                    error!(slf, Error::NullCharacterReference);
                    code = 0xfffd;
                }
                0x11_0000.. => {
                    error!(slf, Error::CharacterReferenceOutsideUnicodeRange);
                    code = 0xfffd;
                }
                0xd800..=0xdfff => {
                    error!(slf, Error::SurrogateCharacterReference);
                    code = 0xfffd;
                }
                x if x & 0xfffe == 0xfffe || (0xfdd0..=0xfdef).contains(&x) => {
                    error!(slf, Error::NoncharacterCharacterReference);
                }
                0x0d | 0x01..=0x08 | 0x0b | 0x0e..=0x1f | 0x7f..=0x9f => {
                    error!(slf, Error::ControlCharacterReference);
                    code = match code {
                        0x80 => 0x20ac,
                        0x82 => 0x201a,
                        0x83 => 0x0192,
                        0x84 => 0x201e,
                        0x85 => 0x2026,
                        0x86 => 0x2020,
                        0x87 => 0x2021,
                        0x88 => 0x02c6,
                        0x89 => 0x2030,
                        0x8a => 0x0160,
                        0x8b => 0x2039,
                        0x8c => 0x0152,
                        0x8e => 0x017d,
                        0x91 => 0x2018,
                        0x92 => 0x2019,
                        0x93 => 0x201c,
                        0x94 => 0x201d,
                        0x95 => 0x2022,
                        0x96 => 0x2013,
                        0x97 => 0x2014,
                        0x98 => 0x02dc,
                        0x99 => 0x2122,
                        0x9a => 0x0161,
                        0x9b => 0x203a,
                        0x9c => 0x0153,
                        0x9e => 0x017e,
                        0x9f => 0x0178,
                        x => x,
                    };
                }
                _ => {}
            }
            slf.helper.temporary_buffer.clear();
            slf.helper
                .temporary_buffer
                .push(char::from_u32(code).unwrap_or('\u{fffd}'));
            slf.helper
                .flush_code_points_consumed_as_character_reference(&mut slf.emitter);
            exit_state!(slf)
        }
    }
}
