use std::fmt;

/// A 1-based (line, column) location in the input stream.
///
/// Columns count code points after newline normalization, so CRLF advances
/// the line counter exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Position {
    /// Line number, starting at 1.
    pub line: u64,
    /// Column number, starting at 1.
    pub column: u64,
}

impl Position {
    pub(crate) fn start() -> Self {
        Position { line: 1, column: 1 }
    }

    pub(crate) fn advance(&mut self, c: char) {
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A parse error record: an error code plus where in the input it happened.
///
/// Parse errors never abort parsing. They accumulate, in source order, on
/// the [`crate::Document`] (or whatever the [`crate::TreeSink`] does with
/// them).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseError {
    /// What went wrong.
    pub code: Error,
    /// Where it went wrong.
    pub position: Position,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.code, self.position)
    }
}

macro_rules! impl_error {
    ($(
        $string:literal <=> $variant:ident,
    )*) => {
        /// All parse error codes this parser can emit.
        ///
        /// The tokenizer-stage variants correspond one-to-one to the
        /// [parse errors](https://html.spec.whatwg.org/#parse-errors) named
        /// in the WHATWG spec; the tree-stage variants use the html5lib
        /// vocabulary for errors the spec only calls "parse error".
        #[derive(Debug, Eq, PartialEq, Clone, Copy)]
        pub enum Error {
            $(
                #[doc = "The `"]
                #[doc = $string]
                #[doc = "` error."]
                $variant
            ),*
        }

        impl std::str::FromStr for Error {
            type Err = ();

            /// Parse a `kebab-case` error code as written in the WHATWG spec
            /// into an enum variant.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $string => Ok(Self::$variant), )*
                    _ => Err(())
                }
            }
        }

        impl Error {
            /// Convert an enum variant back into the `kebab-case` error code
            /// as written in the WHATWG spec.
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match *self {
                    $( Self::$variant => $string, )*
                }
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

impl_error! {
    // tokenizer stage
    "abrupt-closing-of-empty-comment" <=> AbruptClosingOfEmptyComment,
    "abrupt-doctype-public-identifier" <=> AbruptDoctypePublicIdentifier,
    "abrupt-doctype-system-identifier" <=> AbruptDoctypeSystemIdentifier,
    "absence-of-digits-in-numeric-character-reference" <=> AbsenceOfDigitsInNumericCharacterReference,
    "cdata-in-html-content" <=> CdataInHtmlContent,
    "character-reference-outside-unicode-range" <=> CharacterReferenceOutsideUnicodeRange,
    "control-character-in-input-stream" <=> ControlCharacterInInputStream,
    "control-character-reference" <=> ControlCharacterReference,
    "duplicate-attribute" <=> DuplicateAttribute,
    "end-tag-with-attributes" <=> EndTagWithAttributes,
    "end-tag-with-trailing-solidus" <=> EndTagWithTrailingSolidus,
    "eof-before-tag-name" <=> EofBeforeTagName,
    "eof-in-cdata" <=> EofInCdata,
    "eof-in-comment" <=> EofInComment,
    "eof-in-doctype" <=> EofInDoctype,
    "eof-in-script-html-comment-like-text" <=> EofInScriptHtmlCommentLikeText,
    "eof-in-tag" <=> EofInTag,
    "incorrectly-closed-comment" <=> IncorrectlyClosedComment,
    "incorrectly-opened-comment" <=> IncorrectlyOpenedComment,
    "invalid-character-sequence-after-doctype-name" <=> InvalidCharacterSequenceAfterDoctypeName,
    "invalid-first-character-of-tag-name" <=> InvalidFirstCharacterOfTagName,
    "missing-attribute-value" <=> MissingAttributeValue,
    "missing-doctype-name" <=> MissingDoctypeName,
    "missing-doctype-public-identifier" <=> MissingDoctypePublicIdentifier,
    "missing-doctype-system-identifier" <=> MissingDoctypeSystemIdentifier,
    "missing-end-tag-name" <=> MissingEndTagName,
    "missing-quote-before-doctype-public-identifier" <=> MissingQuoteBeforeDoctypePublicIdentifier,
    "missing-quote-before-doctype-system-identifier" <=> MissingQuoteBeforeDoctypeSystemIdentifier,
    "missing-semicolon-after-character-reference" <=> MissingSemicolonAfterCharacterReference,
    "missing-whitespace-after-doctype-public-keyword" <=> MissingWhitespaceAfterDoctypePublicKeyword,
    "missing-whitespace-after-doctype-system-keyword" <=> MissingWhitespaceAfterDoctypeSystemKeyword,
    "missing-whitespace-before-doctype-name" <=> MissingWhitespaceBeforeDoctypeName,
    "missing-whitespace-between-attributes" <=> MissingWhitespaceBetweenAttributes,
    "missing-whitespace-between-doctype-public-and-system-identifiers" <=> MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers,
    "nested-comment" <=> NestedComment,
    "noncharacter-character-reference" <=> NoncharacterCharacterReference,
    "noncharacter-in-input-stream" <=> NoncharacterInInputStream,
    "null-character-reference" <=> NullCharacterReference,
    "surrogate-character-reference" <=> SurrogateCharacterReference,
    "surrogate-in-input-stream" <=> SurrogateInInputStream,
    "unexpected-character-after-doctype-system-identifier" <=> UnexpectedCharacterAfterDoctypeSystemIdentifier,
    "unexpected-character-in-attribute-name" <=> UnexpectedCharacterInAttributeName,
    "unexpected-character-in-unquoted-attribute-value" <=> UnexpectedCharacterInUnquotedAttributeValue,
    "unexpected-equals-sign-before-attribute-name" <=> UnexpectedEqualsSignBeforeAttributeName,
    "unexpected-null-character" <=> UnexpectedNullCharacter,
    "unexpected-question-mark-instead-of-tag-name" <=> UnexpectedQuestionMarkInsteadOfTagName,
    "unexpected-solidus-in-tag" <=> UnexpectedSolidusInTag,
    "unknown-named-character-reference" <=> UnknownNamedCharacterReference,
    // tree construction stage
    "expected-doctype-but-got-chars" <=> ExpectedDoctypeButGotChars,
    "expected-doctype-but-got-end-tag" <=> ExpectedDoctypeButGotEndTag,
    "expected-doctype-but-got-eof" <=> ExpectedDoctypeButGotEof,
    "expected-doctype-but-got-start-tag" <=> ExpectedDoctypeButGotStartTag,
    "unknown-doctype" <=> UnknownDoctype,
    "unexpected-doctype" <=> UnexpectedDoctype,
    "non-void-html-element-start-tag-with-trailing-solidus" <=> NonVoidHtmlElementStartTagWithTrailingSolidus,
    "unexpected-start-tag" <=> UnexpectedStartTag,
    "unexpected-start-tag-ignored" <=> UnexpectedStartTagIgnored,
    "unexpected-start-tag-implies-end-tag" <=> UnexpectedStartTagImpliesEndTag,
    "unexpected-end-tag" <=> UnexpectedEndTag,
    "unexpected-end-tag-ignored" <=> UnexpectedEndTagIgnored,
    "unexpected-character" <=> UnexpectedCharacter,
    "end-tag-too-early" <=> EndTagTooEarly,
    "adoption-agency-mismatched-tags" <=> AdoptionAgencyMismatchedTags,
    "unexpected-character-in-table" <=> UnexpectedCharacterInTable,
    "unexpected-cell-end-tag" <=> UnexpectedCellEndTag,
    "unexpected-form-in-table" <=> UnexpectedFormInTable,
    "eof-with-unclosed-elements" <=> EofWithUnclosedElements,
    "two-heads-are-not-better-than-one" <=> TwoHeadsAreNotBetterThanOne,
    "deprecated-tag" <=> DeprecatedTag,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_codes() {
        for code in &[
            Error::DuplicateAttribute,
            Error::ExpectedDoctypeButGotStartTag,
            Error::EofInTag,
        ] {
            assert_eq!(code.as_str().parse::<Error>().unwrap(), *code);
        }
    }

    #[test]
    fn position_ordering() {
        let mut p = Position::start();
        p.advance('a');
        let q = p;
        p.advance('\n');
        assert!(q < p);
        assert_eq!(p, Position { line: 2, column: 1 });
    }
}
