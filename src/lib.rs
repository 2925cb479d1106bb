#![deny(missing_docs)]
// This is an HTML parser. HTML can be untrusted input from the internet.
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod dom;
mod emitter;
mod entities;
mod error;
mod input;
mod machine;
mod machine_helper;
mod never;
mod reader;
mod sink;
mod state;
mod tokenizer;
mod treebuilder;
mod utils;

pub use dom::{Attribute, Document, Namespace, Node, NodeData, NodeId, QualName, QuirksMode};
pub use emitter::{DefaultEmitter, Doctype, Emitter, EndTag, StartTag, Token};
pub use error::{Error, ParseError, Position};
pub use never::Never;
pub use reader::{IoReader, Readable, Reader, StringReader};
pub use sink::{NodeOrText, TreeSink};
pub use state::State;
pub use tokenizer::{InfallibleTokenizer, Tokenizer};
pub use treebuilder::TreeBuilder;

use treebuilder::char_class;

/// Options for a parse. The defaults match what a scripting-capable
/// browser would do.
#[derive(Debug, Clone)]
pub struct ParseOpts {
    /// Whether scripting is enabled for the document. This does not run
    /// any scripts, it only controls how `<noscript>` is parsed.
    pub scripting_enabled: bool,

    /// Parse as an `iframe srcdoc` document: no missing-doctype error and
    /// no quirks mode.
    pub iframe_srcdoc: bool,

    /// When false, [`Document::namespace_url`] reports the empty string
    /// for HTML elements instead of the XHTML namespace URI. Parsing is
    /// unaffected.
    pub namespace_html_elements: bool,
}

impl Default for ParseOpts {
    fn default() -> Self {
        ParseOpts {
            scripting_enabled: true,
            iframe_srcdoc: false,
            namespace_html_elements: true,
        }
    }
}

/// A full parser: tokenizer and tree constructor wired together.
///
/// [`parse`] and [`parse_fragment`] cover the common cases; construct a
/// `Parser` directly to build into your own [`TreeSink`] or to handle
/// fallible readers.
pub struct Parser<R: Reader, S: TreeSink> {
    tokenizer: Tokenizer<R, DefaultEmitter>,
    builder: TreeBuilder<S>,
}

impl<R: Reader, S: TreeSink> Parser<R, S> {
    /// A parser for a complete document.
    pub fn new<'a, I: Readable<'a, Reader = R>>(input: I, sink: S, opts: &ParseOpts) -> Self {
        Parser {
            tokenizer: Tokenizer::new(input),
            builder: TreeBuilder::new(sink, opts.scripting_enabled, opts.iframe_srcdoc),
        }
    }

    /// A parser for a fragment with the given context element name.
    ///
    /// The context decides the initial tokenizer state (`<title>` context
    /// parses RCDATA, `<script>` script data, and so on) and the initial
    /// insertion mode. The parsed nodes end up as children of a root
    /// `html` element handed to the sink.
    pub fn new_fragment<'a, I: Readable<'a, Reader = R>>(
        input: I,
        sink: S,
        context: QualName,
        opts: &ParseOpts,
    ) -> Self {
        let mut tokenizer = Tokenizer::new(input);
        if context.ns == Namespace::Html {
            let state = match context.local.as_str() {
                "title" | "textarea" => Some(State::RcData),
                "style" | "xmp" | "iframe" | "noembed" | "noframes" => Some(State::RawText),
                "noscript" if opts.scripting_enabled => Some(State::RawText),
                "script" => Some(State::ScriptData),
                "plaintext" => Some(State::PlainText),
                _ => None,
            };
            if let Some(state) = state {
                tokenizer.set_state(state);
            }
            tokenizer.set_last_start_tag(Some(&context.local));
        }
        let builder = TreeBuilder::new_fragment(sink, context, opts.scripting_enabled);
        let mut parser = Parser { tokenizer, builder };
        parser.sync();
        parser
    }

    /// Run the parse to completion and return the sink's output.
    ///
    /// Reader errors (I/O, invalid UTF-8) abort the parse and are handed
    /// back untranslated; parse errors never do.
    pub fn run(mut self) -> Result<S::Output, R::Error> {
        loop {
            match self.tokenizer.next() {
                None => break,
                Some(Err(e)) => return Err(e),
                Some(Ok(token)) => self.feed(token),
            }
            if self.builder.is_done() {
                break;
            }
        }
        Ok(self.builder.finish())
    }

    fn feed(&mut self, token: Token) {
        self.builder.set_position(self.tokenizer.position());
        match token {
            Token::Error(e) => self.builder.record_error(e),
            Token::String(s) => {
                // the tree stage wants maximal runs of one character class
                for run in split_char_runs(s) {
                    self.builder.process_token(Token::String(run));
                }
            }
            token => self.builder.process_token(token),
        }
        self.sync();
    }

    // the two back-channels of the tokenizer/constructor coupling
    fn sync(&mut self) {
        if let Some(state) = self.builder.take_tokenizer_state() {
            self.tokenizer.set_state(state);
        }
        self.tokenizer
            .set_cdata_allowed(self.builder.adjusted_current_node_is_foreign());
    }
}

fn split_char_runs(s: String) -> Vec<String> {
    let mut runs: Vec<String> = Vec::new();
    for c in s.chars() {
        match runs.last_mut() {
            Some(run) if char_class(run.chars().next().unwrap()) == char_class(c) => {
                run.push(c);
            }
            _ => runs.push(c.to_string()),
        }
    }
    runs
}

/// Parse a complete HTML document from an infallible input.
///
/// Never fails and never panics; malformed input is repaired per the
/// standard's recovery rules and reported in [`Document::errors`].
pub fn parse<'a, I>(input: I, opts: &ParseOpts) -> Document
where
    I: Readable<'a>,
    I::Reader: Reader<Error = Never>,
{
    match try_parse(input, opts) {
        Ok(document) => document,
        Err(never) => match never {},
    }
}

/// Parse a complete HTML document from a fallible input, such as an
/// [`IoReader`].
pub fn try_parse<'a, I>(input: I, opts: &ParseOpts) -> Result<Document, <I::Reader as Reader>::Error>
where
    I: Readable<'a>,
{
    let mut sink = Document::default();
    sink.set_namespace_html_elements(opts.namespace_html_elements);
    Parser::new(input, sink, opts).run()
}

/// Parse an HTML fragment in the given context element, per the HTML
/// fragment parsing algorithm. The result's root is a
/// [`NodeData::Fragment`] holding the parsed nodes.
pub fn parse_fragment<'a, I>(input: I, context: QualName, opts: &ParseOpts) -> Document
where
    I: Readable<'a>,
    I::Reader: Reader<Error = Never>,
{
    match try_parse_fragment(input, context, opts) {
        Ok(document) => document,
        Err(never) => match never {},
    }
}

/// Fallible-input variant of [`parse_fragment`].
pub fn try_parse_fragment<'a, I>(
    input: I,
    context: QualName,
    opts: &ParseOpts,
) -> Result<Document, <I::Reader as Reader>::Error>
where
    I: Readable<'a>,
{
    let mut sink = Document::default();
    sink.set_namespace_html_elements(opts.namespace_html_elements);
    let parser = Parser::new_fragment(input, sink, context, opts);
    let root = parser.builder.fragment_root().cloned();
    let mut document = parser.run()?;
    if let Some(root) = root {
        document.reroot_as_fragment(root);
    }
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_runs_split_by_class() {
        let runs = split_char_runs("a \0\0b".to_owned());
        assert_eq!(runs, vec!["a", " ", "\0\0", "b"]);
    }
}
