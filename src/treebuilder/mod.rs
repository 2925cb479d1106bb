//! Tree construction: the insertion-mode state machine that consumes the
//! tokenizer's output and mutates a growing tree through a [`TreeSink`].

mod actions;
pub(crate) mod foreign;
pub(crate) mod quirks;
pub(crate) mod scopes;

use crate::dom::{Namespace, QualName, QuirksMode};
use crate::emitter::{StartTag, Token};
use crate::error::{Error, ParseError, Position};
use crate::sink::{NodeOrText, TreeSink};
use crate::state::State;

/// The insertion modes of the standard, one variant per mode.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum InsertionMode {
    Initial,
    BeforeHtml,
    BeforeHead,
    InHead,
    InHeadNoscript,
    AfterHead,
    InBody,
    Text,
    InTable,
    InTableText,
    InCaption,
    InColumnGroup,
    InTableBody,
    InRow,
    InCell,
    InSelect,
    InSelectInTable,
    InTemplate,
    AfterBody,
    InFrameset,
    AfterFrameset,
    AfterAfterBody,
    AfterAfterFrameset,
}

/// Character tokens reach the tree stage as maximal runs of one class.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum CharClass {
    Null,
    Whitespace,
    Other,
}

pub(crate) fn char_class(c: char) -> CharClass {
    match c {
        '\0' => CharClass::Null,
        '\t' | '\n' | '\x0C' | '\r' | ' ' => CharClass::Whitespace,
        _ => CharClass::Other,
    }
}

fn run_class(s: &str) -> CharClass {
    debug_assert!(!s.is_empty());
    char_class(s.chars().next().unwrap())
}

/// An entry on the stack of open elements. The element's name and its
/// integration-point status are cached here so scope checks never have to
/// ask the sink.
pub(crate) struct StackEntry<Handle> {
    pub(crate) handle: Handle,
    pub(crate) name: QualName,
    pub(crate) html_integration_point: bool,
}

/// An entry in the list of active formatting elements. Elements keep the
/// start tag they were created from, for the Noah's Ark comparison and for
/// reconstruction.
pub(crate) enum FormatEntry<Handle> {
    Marker,
    Element(FormatElement<Handle>),
}

pub(crate) struct FormatElement<Handle> {
    pub(crate) handle: Handle,
    pub(crate) name: QualName,
    pub(crate) tag: StartTag,
}

/// The tree constructor. Fed tokens by [`crate::Parser`]; builds through
/// any [`TreeSink`].
pub struct TreeBuilder<S: TreeSink> {
    pub(crate) sink: S,
    mode: InsertionMode,
    original_mode: Option<InsertionMode>,
    document: S::Handle,
    open_elements: Vec<StackEntry<S::Handle>>,
    active_formatting: Vec<FormatEntry<S::Handle>>,
    head_element: Option<S::Handle>,
    form_element: Option<S::Handle>,
    template_modes: Vec<InsertionMode>,
    pending_table_text: Vec<String>,
    pending_table_text_is_whitespace: bool,
    frameset_ok: bool,
    foster_parenting: bool,
    scripting: bool,
    iframe_srcdoc: bool,
    fragment_context: Option<QualName>,
    html_root: Option<S::Handle>,
    quirks: QuirksMode,
    ignore_lf: bool,
    pending_self_closing: bool,
    position: Position,
    tokenizer_state_request: Option<State>,
    done: bool,
}

impl<S: TreeSink> TreeBuilder<S> {
    /// A tree builder for a full document parse.
    pub fn new(mut sink: S, scripting: bool, iframe_srcdoc: bool) -> Self {
        let document = sink.document();
        TreeBuilder {
            sink,
            mode: InsertionMode::Initial,
            original_mode: None,
            document,
            open_elements: Vec::new(),
            active_formatting: Vec::new(),
            head_element: None,
            form_element: None,
            template_modes: Vec::new(),
            pending_table_text: Vec::new(),
            pending_table_text_is_whitespace: true,
            frameset_ok: true,
            foster_parenting: false,
            scripting,
            iframe_srcdoc,
            fragment_context: None,
            html_root: None,
            quirks: QuirksMode::NoQuirks,
            ignore_lf: false,
            pending_self_closing: false,
            position: Position::start(),
            tokenizer_state_request: None,
            done: false,
        }
    }

    /// A tree builder for a fragment parse with the given context element
    /// name. Creates the root `html` element and picks the initial
    /// insertion mode from the context.
    pub fn new_fragment(sink: S, context: QualName, scripting: bool) -> Self {
        let mut builder = TreeBuilder::new(sink, scripting, false);
        let root = builder
            .sink
            .create_element(QualName::html("html"), Vec::new());
        let document = builder.document.clone();
        builder
            .sink
            .append(&document, NodeOrText::AppendNode(root.clone()));
        builder.push_stack(root.clone(), QualName::html("html"), false);
        if context.is_html("template") {
            builder.template_modes.push(InsertionMode::InTemplate);
        }
        builder.fragment_context = Some(context);
        builder.html_root = Some(root);
        builder.reset_insertion_mode();
        builder
    }

    /// The root `html` element of a fragment parse.
    pub(crate) fn fragment_root(&self) -> Option<&S::Handle> {
        self.html_root.as_ref()
    }

    /// The position of the token about to be processed, stamped onto every
    /// tree-construction error.
    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// Forward a tokenizer-stage error to the sink.
    pub fn record_error(&mut self, error: ParseError) {
        self.sink.parse_error(error);
    }

    /// The content-model switch requested while processing the last token,
    /// if any. The driver applies it to the tokenizer before pulling the
    /// next token.
    pub fn take_tokenizer_state(&mut self) -> Option<State> {
        self.tokenizer_state_request.take()
    }

    /// Whether parsing has been stopped by an EOF token.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Consume the builder and return the finished tree.
    pub fn finish(self) -> S::Output {
        self.sink.finish()
    }

    /// Process one token. Character tokens must arrive as uniform runs of
    /// one [`CharClass`] (the driver splits them).
    pub fn process_token(&mut self, mut token: Token) {
        if self.ignore_lf {
            // the newline immediately after <pre>, <listing> and <textarea>
            // is dropped; any token kills the flag
            self.ignore_lf = false;
            if let Token::String(ref mut s) = token {
                if s.starts_with('\n') {
                    s.remove(0);
                }
                if s.is_empty() {
                    return;
                }
            }
        }

        let starts_self_closing =
            matches!(token, Token::StartTag(ref tag) if tag.self_closing);
        if starts_self_closing {
            self.pending_self_closing = true;
        }

        self.dispatch(token);

        if starts_self_closing && self.pending_self_closing {
            self.pending_self_closing = false;
            self.parse_error(Error::NonVoidHtmlElementStartTagWithTrailingSolidus);
        }
    }

    fn acknowledge_self_closing(&mut self) {
        self.pending_self_closing = false;
    }

    /// The tree construction dispatcher: HTML rules or foreign content.
    fn dispatch(&mut self, token: Token) {
        let html_rules = match self.adjusted_current() {
            None => true,
            Some((name, html_ip)) => {
                name.ns == Namespace::Html
                    || (scopes::mathml_text_integration_point(name)
                        && match token {
                            Token::StartTag(ref tag) => {
                                !matches!(tag.name.as_str(), "mglyph" | "malignmark")
                            }
                            Token::String(_) => true,
                            _ => false,
                        })
                    || (name.ns == Namespace::MathMl
                        && name.local == "annotation-xml"
                        && matches!(token, Token::StartTag(ref tag) if tag.name == "svg"))
                    || (html_ip && matches!(token, Token::StartTag(_) | Token::String(_)))
                    || matches!(token, Token::Eof)
            }
        };

        if html_rules {
            self.step(self.mode, token);
        } else {
            self.step_foreign(token);
        }
    }

    fn step(&mut self, mode: InsertionMode, token: Token) {
        match mode {
            InsertionMode::Initial => self.mode_initial(token),
            InsertionMode::BeforeHtml => self.mode_before_html(token),
            InsertionMode::BeforeHead => self.mode_before_head(token),
            InsertionMode::InHead => self.mode_in_head(token),
            InsertionMode::InHeadNoscript => self.mode_in_head_noscript(token),
            InsertionMode::AfterHead => self.mode_after_head(token),
            InsertionMode::InBody => self.mode_in_body(token),
            InsertionMode::Text => self.mode_text(token),
            InsertionMode::InTable => self.mode_in_table(token),
            InsertionMode::InTableText => self.mode_in_table_text(token),
            InsertionMode::InCaption => self.mode_in_caption(token),
            InsertionMode::InColumnGroup => self.mode_in_column_group(token),
            InsertionMode::InTableBody => self.mode_in_table_body(token),
            InsertionMode::InRow => self.mode_in_row(token),
            InsertionMode::InCell => self.mode_in_cell(token),
            InsertionMode::InSelect => self.mode_in_select(token),
            InsertionMode::InSelectInTable => self.mode_in_select_in_table(token),
            InsertionMode::InTemplate => self.mode_in_template(token),
            InsertionMode::AfterBody => self.mode_after_body(token),
            InsertionMode::InFrameset => self.mode_in_frameset(token),
            InsertionMode::AfterFrameset => self.mode_after_frameset(token),
            InsertionMode::AfterAfterBody => self.mode_after_after_body(token),
            InsertionMode::AfterAfterFrameset => self.mode_after_after_frameset(token),
        }
    }

    // ---- 13.2.6.4.1 the "initial" insertion mode --------------------------

    fn mode_initial(&mut self, token: Token) {
        match token {
            Token::String(ref s) if run_class(s) == CharClass::Whitespace => {}
            Token::Comment(data) => {
                let document = self.document.clone();
                self.append_comment_to(document, &data);
            }
            Token::Doctype(doctype) => {
                if !quirks::is_conforming(&doctype) {
                    self.parse_error(Error::UnknownDoctype);
                }
                self.sink.append_doctype_to_document(
                    doctype.name.clone().unwrap_or_default(),
                    doctype.public_identifier.clone(),
                    doctype.system_identifier.clone(),
                );
                let mode = quirks::quirks_mode(&doctype, self.iframe_srcdoc);
                self.quirks = mode;
                self.sink.set_quirks_mode(mode);
                self.set_mode(InsertionMode::BeforeHtml);
            }
            token => {
                if !self.iframe_srcdoc {
                    self.parse_error(match token {
                        Token::StartTag(_) => Error::ExpectedDoctypeButGotStartTag,
                        Token::EndTag(_) => Error::ExpectedDoctypeButGotEndTag,
                        Token::Eof => Error::ExpectedDoctypeButGotEof,
                        _ => Error::ExpectedDoctypeButGotChars,
                    });
                    self.quirks = QuirksMode::Quirks;
                    self.sink.set_quirks_mode(QuirksMode::Quirks);
                }
                self.set_mode(InsertionMode::BeforeHtml);
                self.process_token(token);
            }
        }
    }

    // ---- 13.2.6.4.2 "before html" -----------------------------------------

    fn mode_before_html(&mut self, token: Token) {
        match token {
            Token::Doctype(_) => self.parse_error(Error::UnexpectedDoctype),
            Token::Comment(data) => {
                let document = self.document.clone();
                self.append_comment_to(document, &data);
            }
            Token::String(ref s) if run_class(s) == CharClass::Whitespace => {}
            Token::StartTag(ref tag) if tag.name == "html" => {
                let (handle, name, _) = self.create_element_for(tag, Namespace::Html);
                let document = self.document.clone();
                self.sink
                    .append(&document, NodeOrText::AppendNode(handle.clone()));
                self.push_stack(handle, name, false);
                self.set_mode(InsertionMode::BeforeHead);
            }
            Token::EndTag(ref tag)
                if !matches!(tag.name.as_str(), "head" | "body" | "html" | "br") =>
            {
                self.parse_error(Error::UnexpectedEndTag);
            }
            token => {
                let (handle, name, _) =
                    self.create_element_for(&phantom_tag("html"), Namespace::Html);
                let document = self.document.clone();
                self.sink
                    .append(&document, NodeOrText::AppendNode(handle.clone()));
                self.push_stack(handle, name, false);
                self.set_mode(InsertionMode::BeforeHead);
                self.process_token(token);
            }
        }
    }

    // ---- 13.2.6.4.3 "before head" -----------------------------------------

    fn mode_before_head(&mut self, token: Token) {
        match token {
            Token::String(ref s) if run_class(s) == CharClass::Whitespace => {}
            Token::Comment(data) => self.insert_comment(&data),
            Token::Doctype(_) => self.parse_error(Error::UnexpectedDoctype),
            Token::StartTag(ref tag) if tag.name == "html" => {
                self.step(InsertionMode::InBody, token);
            }
            Token::StartTag(ref tag) if tag.name == "head" => {
                let head = self.insert_html_element(tag);
                self.head_element = Some(head);
                self.set_mode(InsertionMode::InHead);
            }
            Token::EndTag(ref tag)
                if !matches!(tag.name.as_str(), "head" | "body" | "html" | "br") =>
            {
                self.parse_error(Error::UnexpectedEndTag);
            }
            token => {
                let head = self.insert_phantom("head");
                self.head_element = Some(head);
                self.set_mode(InsertionMode::InHead);
                self.process_token(token);
            }
        }
    }

    // ---- 13.2.6.4.4 "in head" ---------------------------------------------

    fn mode_in_head(&mut self, token: Token) {
        match token {
            Token::String(ref s) if run_class(s) == CharClass::Whitespace => {
                self.insert_characters(s);
            }
            Token::Comment(data) => self.insert_comment(&data),
            Token::Doctype(_) => self.parse_error(Error::UnexpectedDoctype),
            Token::StartTag(ref tag) if tag.name == "html" => {
                self.step(InsertionMode::InBody, token);
            }
            Token::StartTag(ref tag)
                if matches!(tag.name.as_str(), "base" | "basefont" | "bgsound" | "link") =>
            {
                self.insert_html_element(tag);
                self.pop();
                self.acknowledge_self_closing();
            }
            Token::StartTag(ref tag) if tag.name == "meta" => {
                // charset handling lives in the decoding collaborator, not
                // here
                self.insert_html_element(tag);
                self.pop();
                self.acknowledge_self_closing();
            }
            Token::StartTag(ref tag) if tag.name == "title" => {
                self.parse_raw_data(tag, State::RcData);
            }
            Token::StartTag(ref tag) if tag.name == "noscript" && self.scripting => {
                self.parse_raw_data(tag, State::RawText);
            }
            Token::StartTag(ref tag) if matches!(tag.name.as_str(), "noframes" | "style") => {
                self.parse_raw_data(tag, State::RawText);
            }
            Token::StartTag(ref tag) if tag.name == "noscript" => {
                self.insert_html_element(tag);
                self.set_mode(InsertionMode::InHeadNoscript);
            }
            Token::StartTag(ref tag) if tag.name == "script" => {
                self.parse_raw_data(tag, State::ScriptData);
            }
            Token::EndTag(ref tag) if tag.name == "head" => {
                self.pop();
                self.set_mode(InsertionMode::AfterHead);
            }
            Token::StartTag(ref tag) if tag.name == "template" => {
                self.insert_html_element(tag);
                self.push_marker();
                self.frameset_ok = false;
                self.set_mode(InsertionMode::InTemplate);
                self.template_modes.push(InsertionMode::InTemplate);
            }
            Token::EndTag(ref tag) if tag.name == "template" => {
                if !self.stack_has_template() {
                    self.parse_error(Error::UnexpectedEndTag);
                    return;
                }
                self.generate_implied_end_tags_thoroughly();
                if !self.current_is_html("template") {
                    self.parse_error(Error::EndTagTooEarly);
                }
                self.pop_until_one_of(&["template"]);
                self.clear_formatting_to_marker();
                self.template_modes.pop();
                self.reset_insertion_mode();
            }
            Token::StartTag(ref tag) if tag.name == "head" => {
                self.parse_error(Error::TwoHeadsAreNotBetterThanOne);
            }
            Token::EndTag(ref tag) if !matches!(tag.name.as_str(), "body" | "html" | "br") => {
                self.parse_error(Error::UnexpectedEndTag);
            }
            token => {
                self.pop();
                self.set_mode(InsertionMode::AfterHead);
                self.process_token(token);
            }
        }
    }

    // ---- 13.2.6.4.5 "in head noscript" ------------------------------------

    fn mode_in_head_noscript(&mut self, token: Token) {
        match token {
            Token::Doctype(_) => self.parse_error(Error::UnexpectedDoctype),
            Token::StartTag(ref tag) if tag.name == "html" => {
                self.step(InsertionMode::InBody, token);
            }
            Token::EndTag(ref tag) if tag.name == "noscript" => {
                self.pop();
                self.set_mode(InsertionMode::InHead);
            }
            Token::String(ref s) if run_class(s) == CharClass::Whitespace => {
                self.step(InsertionMode::InHead, token);
            }
            Token::Comment(_) => self.step(InsertionMode::InHead, token),
            Token::StartTag(ref tag)
                if matches!(
                    tag.name.as_str(),
                    "basefont" | "bgsound" | "link" | "meta" | "noframes" | "style"
                ) =>
            {
                self.step(InsertionMode::InHead, token);
            }
            Token::StartTag(ref tag) if matches!(tag.name.as_str(), "head" | "noscript") => {
                self.parse_error(Error::UnexpectedStartTag);
            }
            Token::EndTag(ref tag) if tag.name != "br" => {
                self.parse_error(Error::UnexpectedEndTag);
            }
            token => {
                // reached by other start tags, </br>, character data and EOF
                self.parse_error(match token {
                    Token::StartTag(_) => Error::UnexpectedStartTag,
                    Token::EndTag(_) => Error::UnexpectedEndTag,
                    Token::Eof => Error::EofWithUnclosedElements,
                    _ => Error::UnexpectedCharacter,
                });
                self.pop();
                self.set_mode(InsertionMode::InHead);
                self.process_token(token);
            }
        }
    }

    // ---- 13.2.6.4.6 "after head" ------------------------------------------

    fn mode_after_head(&mut self, token: Token) {
        match token {
            Token::String(ref s) if run_class(s) == CharClass::Whitespace => {
                self.insert_characters(s);
            }
            Token::Comment(data) => self.insert_comment(&data),
            Token::Doctype(_) => self.parse_error(Error::UnexpectedDoctype),
            Token::StartTag(ref tag) if tag.name == "html" => {
                self.step(InsertionMode::InBody, token);
            }
            Token::StartTag(ref tag) if tag.name == "body" => {
                self.insert_html_element(tag);
                self.frameset_ok = false;
                self.set_mode(InsertionMode::InBody);
            }
            Token::StartTag(ref tag) if tag.name == "frameset" => {
                self.insert_html_element(tag);
                self.set_mode(InsertionMode::InFrameset);
            }
            Token::StartTag(ref tag)
                if matches!(
                    tag.name.as_str(),
                    "base"
                        | "basefont"
                        | "bgsound"
                        | "link"
                        | "meta"
                        | "noframes"
                        | "script"
                        | "style"
                        | "template"
                        | "title"
                ) =>
            {
                self.parse_error(Error::UnexpectedStartTag);
                let head = self
                    .head_element
                    .clone()
                    .expect("after-head mode without a head element");
                self.push_stack(head.clone(), QualName::html("head"), false);
                self.step(InsertionMode::InHead, token);
                self.remove_from_stack(&head);
            }
            Token::EndTag(ref tag) if tag.name == "template" => {
                self.step(InsertionMode::InHead, token);
            }
            Token::StartTag(ref tag) if tag.name == "head" => {
                self.parse_error(Error::TwoHeadsAreNotBetterThanOne);
            }
            Token::EndTag(ref tag) if !matches!(tag.name.as_str(), "body" | "html" | "br") => {
                self.parse_error(Error::UnexpectedEndTag);
            }
            token => {
                self.insert_phantom("body");
                self.set_mode(InsertionMode::InBody);
                self.process_token(token);
            }
        }
    }

    // ---- 13.2.6.4.7 "in body" ---------------------------------------------

    fn mode_in_body(&mut self, token: Token) {
        match token {
            Token::String(ref s) => match run_class(s) {
                CharClass::Null => self.parse_error(Error::UnexpectedNullCharacter),
                CharClass::Whitespace => {
                    self.reconstruct_formatting();
                    self.insert_characters(s);
                }
                CharClass::Other => {
                    self.reconstruct_formatting();
                    self.insert_characters(s);
                    self.frameset_ok = false;
                }
            },
            Token::Comment(data) => self.insert_comment(&data),
            Token::Doctype(_) => self.parse_error(Error::UnexpectedDoctype),
            Token::StartTag(tag) => self.in_body_start_tag(tag),
            Token::EndTag(tag) => self.in_body_end_tag(tag),
            Token::Eof => {
                if !self.template_modes.is_empty() {
                    self.mode_in_template(Token::Eof);
                    return;
                }
                if self.open_elements.iter().any(|e| {
                    !(e.name.ns == Namespace::Html
                        && matches!(
                            e.name.local.as_str(),
                            "dd" | "dt"
                                | "li"
                                | "optgroup"
                                | "option"
                                | "p"
                                | "rb"
                                | "rp"
                                | "rt"
                                | "rtc"
                                | "tbody"
                                | "td"
                                | "tfoot"
                                | "th"
                                | "thead"
                                | "tr"
                                | "body"
                                | "html"
                        ))
                }) {
                    self.parse_error(Error::EofWithUnclosedElements);
                }
                self.done = true;
            }
            Token::Error(_) => debug_assert!(false, "errors are filtered by the parser"),
        }
    }

    fn in_body_start_tag(&mut self, tag: StartTag) {
        match tag.name.as_str() {
            "html" => {
                self.parse_error(Error::UnexpectedStartTag);
                if !self.stack_has_template() {
                    let root = self.open_elements[0].handle.clone();
                    self.sink
                        .add_attrs_if_missing(&root, Self::html_attributes(&tag));
                }
            }
            "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script"
            | "style" | "template" | "title" => {
                self.step(InsertionMode::InHead, Token::StartTag(tag));
            }
            "body" => {
                self.parse_error(Error::UnexpectedStartTag);
                let body_is_second = self
                    .open_elements
                    .get(1)
                    .map_or(false, |e| e.name.is_html("body"));
                if body_is_second && !self.stack_has_template() {
                    self.frameset_ok = false;
                    let body = self.open_elements[1].handle.clone();
                    self.sink
                        .add_attrs_if_missing(&body, Self::html_attributes(&tag));
                }
            }
            "frameset" => {
                self.parse_error(Error::UnexpectedStartTag);
                let body_is_second = self
                    .open_elements
                    .get(1)
                    .map_or(false, |e| e.name.is_html("body"));
                if body_is_second && self.frameset_ok {
                    let body = self.open_elements[1].handle.clone();
                    self.sink.remove_from_parent(&body);
                    self.open_elements.truncate(1);
                    self.insert_html_element(&tag);
                    self.set_mode(InsertionMode::InFrameset);
                }
            }
            "address" | "article" | "aside" | "blockquote" | "center" | "details" | "dialog"
            | "dir" | "div" | "dl" | "fieldset" | "figcaption" | "figure" | "footer"
            | "header" | "hgroup" | "main" | "menu" | "nav" | "ol" | "p" | "search"
            | "section" | "summary" | "ul" => {
                if self.has_in_scope(scopes::button_scope, "p") {
                    self.close_p_element();
                }
                self.insert_html_element(&tag);
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                if self.has_in_scope(scopes::button_scope, "p") {
                    self.close_p_element();
                }
                if self.current_name().map_or(false, |n| {
                    n.ns == Namespace::Html
                        && matches!(n.local.as_str(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
                }) {
                    self.parse_error(Error::UnexpectedStartTagImpliesEndTag);
                    self.pop();
                }
                self.insert_html_element(&tag);
            }
            "pre" | "listing" => {
                if self.has_in_scope(scopes::button_scope, "p") {
                    self.close_p_element();
                }
                self.insert_html_element(&tag);
                self.ignore_lf = true;
                self.frameset_ok = false;
            }
            "form" => {
                if self.form_element.is_some() && !self.stack_has_template() {
                    self.parse_error(Error::UnexpectedStartTag);
                    return;
                }
                if self.has_in_scope(scopes::button_scope, "p") {
                    self.close_p_element();
                }
                let form = self.insert_html_element(&tag);
                if !self.stack_has_template() {
                    self.form_element = Some(form);
                }
            }
            "li" => {
                self.frameset_ok = false;
                for idx in (0..self.open_elements.len()).rev() {
                    let name = self.open_elements[idx].name.clone();
                    if name.is_html("li") {
                        self.generate_implied_end_tags(Some("li"));
                        if !self.current_is_html("li") {
                            self.parse_error(Error::UnexpectedStartTagImpliesEndTag);
                        }
                        self.pop_until_one_of(&["li"]);
                        break;
                    }
                    if scopes::is_special(&name)
                        && !(name.ns == Namespace::Html
                            && matches!(name.local.as_str(), "address" | "div" | "p"))
                    {
                        break;
                    }
                }
                if self.has_in_scope(scopes::button_scope, "p") {
                    self.close_p_element();
                }
                self.insert_html_element(&tag);
            }
            "dd" | "dt" => {
                self.frameset_ok = false;
                for idx in (0..self.open_elements.len()).rev() {
                    let name = self.open_elements[idx].name.clone();
                    if name.is_html("dd") || name.is_html("dt") {
                        let local = name.local.clone();
                        self.generate_implied_end_tags(Some(&local));
                        if !self.current_is_html(&local) {
                            self.parse_error(Error::UnexpectedStartTagImpliesEndTag);
                        }
                        self.pop_until_one_of(&[local.as_str()]);
                        break;
                    }
                    if scopes::is_special(&name)
                        && !(name.ns == Namespace::Html
                            && matches!(name.local.as_str(), "address" | "div" | "p"))
                    {
                        break;
                    }
                }
                if self.has_in_scope(scopes::button_scope, "p") {
                    self.close_p_element();
                }
                self.insert_html_element(&tag);
            }
            "plaintext" => {
                if self.has_in_scope(scopes::button_scope, "p") {
                    self.close_p_element();
                }
                self.insert_html_element(&tag);
                self.request_tokenizer_state(State::PlainText);
            }
            "button" => {
                if self.has_in_scope(scopes::default_scope, "button") {
                    self.parse_error(Error::UnexpectedStartTagImpliesEndTag);
                    self.generate_implied_end_tags(None);
                    self.pop_until_one_of(&["button"]);
                }
                self.reconstruct_formatting();
                self.insert_html_element(&tag);
                self.frameset_ok = false;
            }
            "a" => {
                if let Some(idx) = self.formatting_index("a") {
                    let handle = match &self.active_formatting[idx] {
                        FormatEntry::Element(elem) => elem.handle.clone(),
                        FormatEntry::Marker => unreachable!(),
                    };
                    self.parse_error(Error::UnexpectedStartTagImpliesEndTag);
                    self.adoption_agency("a");
                    self.remove_from_formatting(&handle);
                    self.remove_from_stack(&handle);
                }
                self.reconstruct_formatting();
                let handle = self.insert_html_element(&tag);
                self.push_formatting(handle, QualName::html("a"), tag);
            }
            "b" | "big" | "code" | "em" | "font" | "i" | "s" | "small" | "strike" | "strong"
            | "tt" | "u" => {
                self.reconstruct_formatting();
                let name = QualName::html(tag.name.clone());
                let handle = self.insert_html_element(&tag);
                self.push_formatting(handle, name, tag);
            }
            "nobr" => {
                self.reconstruct_formatting();
                if self.has_in_scope(scopes::default_scope, "nobr") {
                    self.parse_error(Error::UnexpectedStartTagImpliesEndTag);
                    self.adoption_agency("nobr");
                    self.reconstruct_formatting();
                }
                let handle = self.insert_html_element(&tag);
                self.push_formatting(handle, QualName::html("nobr"), tag);
            }
            "applet" | "marquee" | "object" => {
                self.reconstruct_formatting();
                self.insert_html_element(&tag);
                self.push_marker();
                self.frameset_ok = false;
            }
            "table" => {
                if self.quirks != QuirksMode::Quirks
                    && self.has_in_scope(scopes::button_scope, "p")
                {
                    self.close_p_element();
                }
                self.insert_html_element(&tag);
                self.frameset_ok = false;
                self.set_mode(InsertionMode::InTable);
            }
            "area" | "br" | "embed" | "img" | "keygen" | "wbr" => {
                self.reconstruct_formatting();
                self.insert_html_element(&tag);
                self.pop();
                self.acknowledge_self_closing();
                self.frameset_ok = false;
            }
            "input" => {
                self.reconstruct_formatting();
                let hidden = tag
                    .attribute("type")
                    .map_or(false, |t| t.eq_ignore_ascii_case("hidden"));
                self.insert_html_element(&tag);
                self.pop();
                self.acknowledge_self_closing();
                if !hidden {
                    self.frameset_ok = false;
                }
            }
            "param" | "source" | "track" => {
                self.insert_html_element(&tag);
                self.pop();
                self.acknowledge_self_closing();
            }
            "hr" => {
                if self.has_in_scope(scopes::button_scope, "p") {
                    self.close_p_element();
                }
                self.insert_html_element(&tag);
                self.pop();
                self.acknowledge_self_closing();
                self.frameset_ok = false;
            }
            "image" => {
                self.parse_error(Error::DeprecatedTag);
                let mut tag = tag;
                tag.name = "img".to_owned();
                self.process_token(Token::StartTag(tag));
            }
            "textarea" => {
                self.insert_html_element(&tag);
                self.ignore_lf = true;
                self.request_tokenizer_state(State::RcData);
                self.original_mode = Some(self.mode);
                self.frameset_ok = false;
                self.set_mode(InsertionMode::Text);
            }
            "xmp" => {
                if self.has_in_scope(scopes::button_scope, "p") {
                    self.close_p_element();
                }
                self.reconstruct_formatting();
                self.frameset_ok = false;
                self.parse_raw_data(&tag, State::RawText);
            }
            "iframe" => {
                self.frameset_ok = false;
                self.parse_raw_data(&tag, State::RawText);
            }
            "noembed" => {
                self.parse_raw_data(&tag, State::RawText);
            }
            "noscript" if self.scripting => {
                self.parse_raw_data(&tag, State::RawText);
            }
            "select" => {
                self.reconstruct_formatting();
                self.insert_html_element(&tag);
                self.frameset_ok = false;
                let mode = if matches!(
                    self.mode,
                    InsertionMode::InTable
                        | InsertionMode::InCaption
                        | InsertionMode::InTableBody
                        | InsertionMode::InRow
                        | InsertionMode::InCell
                ) {
                    InsertionMode::InSelectInTable
                } else {
                    InsertionMode::InSelect
                };
                self.set_mode(mode);
            }
            "optgroup" | "option" => {
                if self.current_is_html("option") {
                    self.pop();
                }
                self.reconstruct_formatting();
                self.insert_html_element(&tag);
            }
            "rb" | "rtc" => {
                if self.has_in_scope(scopes::default_scope, "ruby") {
                    self.generate_implied_end_tags(None);
                    if !self.current_is_html("ruby") {
                        self.parse_error(Error::UnexpectedStartTag);
                    }
                }
                self.insert_html_element(&tag);
            }
            "rp" | "rt" => {
                if self.has_in_scope(scopes::default_scope, "ruby") {
                    self.generate_implied_end_tags(Some("rtc"));
                    if !self.current_is_html("rtc") && !self.current_is_html("ruby") {
                        self.parse_error(Error::UnexpectedStartTag);
                    }
                }
                self.insert_html_element(&tag);
            }
            "math" => {
                self.reconstruct_formatting();
                self.insert_foreign_element(&tag, Namespace::MathMl);
                if tag.self_closing {
                    self.pop();
                    self.acknowledge_self_closing();
                }
            }
            "svg" => {
                self.reconstruct_formatting();
                self.insert_foreign_element(&tag, Namespace::Svg);
                if tag.self_closing {
                    self.pop();
                    self.acknowledge_self_closing();
                }
            }
            "caption" | "col" | "colgroup" | "frame" | "head" | "tbody" | "td" | "tfoot"
            | "th" | "thead" | "tr" => {
                self.parse_error(Error::UnexpectedStartTagIgnored);
            }
            _ => {
                self.reconstruct_formatting();
                self.insert_html_element(&tag);
            }
        }
    }

    fn in_body_end_tag(&mut self, tag: crate::emitter::EndTag) {
        match tag.name.as_str() {
            "template" => self.step(InsertionMode::InHead, Token::EndTag(tag)),
            "body" => {
                if !self.has_in_scope(scopes::default_scope, "body") {
                    self.parse_error(Error::UnexpectedEndTag);
                    return;
                }
                self.check_body_end();
                self.set_mode(InsertionMode::AfterBody);
            }
            "html" => {
                if !self.has_in_scope(scopes::default_scope, "body") {
                    self.parse_error(Error::UnexpectedEndTag);
                    return;
                }
                self.check_body_end();
                self.set_mode(InsertionMode::AfterBody);
                self.process_token(Token::EndTag(tag));
            }
            "address" | "article" | "aside" | "blockquote" | "button" | "center" | "details"
            | "dialog" | "dir" | "div" | "dl" | "fieldset" | "figcaption" | "figure"
            | "footer" | "header" | "hgroup" | "listing" | "main" | "menu" | "nav" | "ol"
            | "pre" | "search" | "section" | "summary" | "ul" => {
                if !self.has_in_scope(scopes::default_scope, &tag.name) {
                    self.parse_error(Error::UnexpectedEndTag);
                    return;
                }
                self.generate_implied_end_tags(None);
                if !self.current_is_html(&tag.name) {
                    self.parse_error(Error::EndTagTooEarly);
                }
                self.pop_until_one_of(&[tag.name.as_str()]);
            }
            "form" => {
                if !self.stack_has_template() {
                    let node = self.form_element.take();
                    let node = match node {
                        Some(node) if self.has_node_in_scope(scopes::default_scope, &node) => {
                            node
                        }
                        _ => {
                            self.parse_error(Error::UnexpectedEndTag);
                            return;
                        }
                    };
                    self.generate_implied_end_tags(None);
                    let is_current = self
                        .current()
                        .map_or(false, |e| self.sink.same_node(&e.handle, &node));
                    if !is_current {
                        self.parse_error(Error::EndTagTooEarly);
                    }
                    self.remove_from_stack(&node);
                } else {
                    if !self.has_in_scope(scopes::default_scope, "form") {
                        self.parse_error(Error::UnexpectedEndTag);
                        return;
                    }
                    self.generate_implied_end_tags(None);
                    if !self.current_is_html("form") {
                        self.parse_error(Error::EndTagTooEarly);
                    }
                    self.pop_until_one_of(&["form"]);
                }
            }
            "p" => {
                if !self.has_in_scope(scopes::button_scope, "p") {
                    self.parse_error(Error::UnexpectedEndTag);
                    self.insert_phantom("p");
                }
                self.close_p_element();
            }
            "li" => {
                if !self.has_in_scope(scopes::list_item_scope, "li") {
                    self.parse_error(Error::UnexpectedEndTag);
                    return;
                }
                self.generate_implied_end_tags(Some("li"));
                if !self.current_is_html("li") {
                    self.parse_error(Error::EndTagTooEarly);
                }
                self.pop_until_one_of(&["li"]);
            }
            "dd" | "dt" => {
                if !self.has_in_scope(scopes::default_scope, &tag.name) {
                    self.parse_error(Error::UnexpectedEndTag);
                    return;
                }
                self.generate_implied_end_tags(Some(&tag.name));
                if !self.current_is_html(&tag.name) {
                    self.parse_error(Error::EndTagTooEarly);
                }
                self.pop_until_one_of(&[tag.name.as_str()]);
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];
                if !self.has_any_in_scope(scopes::default_scope, HEADINGS) {
                    self.parse_error(Error::UnexpectedEndTag);
                    return;
                }
                self.generate_implied_end_tags(None);
                if !self.current_is_html(&tag.name) {
                    self.parse_error(Error::EndTagTooEarly);
                }
                self.pop_until_one_of(HEADINGS);
            }
            "a" | "b" | "big" | "code" | "em" | "font" | "i" | "nobr" | "s" | "small"
            | "strike" | "strong" | "tt" | "u" => {
                self.adoption_agency(&tag.name);
            }
            "applet" | "marquee" | "object" => {
                if !self.has_in_scope(scopes::default_scope, &tag.name) {
                    self.parse_error(Error::UnexpectedEndTag);
                    return;
                }
                self.generate_implied_end_tags(None);
                if !self.current_is_html(&tag.name) {
                    self.parse_error(Error::EndTagTooEarly);
                }
                self.pop_until_one_of(&[tag.name.as_str()]);
                self.clear_formatting_to_marker();
            }
            "br" => {
                self.parse_error(Error::UnexpectedEndTag);
                self.reconstruct_formatting();
                self.insert_phantom("br");
                self.pop();
                self.frameset_ok = false;
            }
            _ => self.in_body_any_other_end_tag(&tag.name),
        }
    }

    fn check_body_end(&mut self) {
        if self.open_elements.iter().any(|e| {
            !(e.name.ns == Namespace::Html
                && matches!(
                    e.name.local.as_str(),
                    "dd" | "dt"
                        | "li"
                        | "optgroup"
                        | "option"
                        | "p"
                        | "rb"
                        | "rp"
                        | "rt"
                        | "rtc"
                        | "tbody"
                        | "td"
                        | "tfoot"
                        | "th"
                        | "thead"
                        | "tr"
                        | "body"
                        | "html"
                ))
        }) {
            self.parse_error(Error::EndTagTooEarly);
        }
    }

    // ---- 13.2.6.4.8 "text" ------------------------------------------------

    fn mode_text(&mut self, token: Token) {
        match token {
            Token::String(ref s) => self.insert_characters(s),
            Token::Eof => {
                self.parse_error(Error::EofWithUnclosedElements);
                self.pop();
                let mode = self.original_mode.take().expect("text mode without origin");
                self.set_mode(mode);
                self.process_token(Token::Eof);
            }
            Token::EndTag(_) => {
                // script execution would hook in here; parsing-wise every
                // end tag closes the raw text element the same way
                self.pop();
                let mode = self.original_mode.take().expect("text mode without origin");
                self.set_mode(mode);
            }
            _ => debug_assert!(false, "impossible token in text mode"),
        }
    }

    // ---- 13.2.6.4.9 "in table" --------------------------------------------

    fn mode_in_table(&mut self, token: Token) {
        match token {
            Token::String(_)
                if self.current_name().map_or(false, |n| {
                    n.ns == Namespace::Html
                        && matches!(
                            n.local.as_str(),
                            "table" | "tbody" | "template" | "tfoot" | "thead" | "tr"
                        )
                }) =>
            {
                self.pending_table_text.clear();
                self.pending_table_text_is_whitespace = true;
                self.original_mode = Some(self.mode);
                self.set_mode(InsertionMode::InTableText);
                self.step(InsertionMode::InTableText, token);
            }
            Token::Comment(data) => self.insert_comment(&data),
            Token::Doctype(_) => self.parse_error(Error::UnexpectedDoctype),
            Token::StartTag(ref tag) if tag.name == "caption" => {
                self.clear_stack_to_table_context();
                self.push_marker();
                self.insert_html_element(tag);
                self.set_mode(InsertionMode::InCaption);
            }
            Token::StartTag(ref tag) if tag.name == "colgroup" => {
                self.clear_stack_to_table_context();
                self.insert_html_element(tag);
                self.set_mode(InsertionMode::InColumnGroup);
            }
            Token::StartTag(ref tag) if tag.name == "col" => {
                self.clear_stack_to_table_context();
                self.insert_phantom("colgroup");
                self.set_mode(InsertionMode::InColumnGroup);
                self.process_token(token);
            }
            Token::StartTag(ref tag)
                if matches!(tag.name.as_str(), "tbody" | "tfoot" | "thead") =>
            {
                self.clear_stack_to_table_context();
                self.insert_html_element(tag);
                self.set_mode(InsertionMode::InTableBody);
            }
            Token::StartTag(ref tag) if matches!(tag.name.as_str(), "td" | "th" | "tr") => {
                self.clear_stack_to_table_context();
                self.insert_phantom("tbody");
                self.set_mode(InsertionMode::InTableBody);
                self.process_token(token);
            }
            Token::StartTag(ref tag) if tag.name == "table" => {
                self.parse_error(Error::UnexpectedStartTagImpliesEndTag);
                if self.has_in_scope(scopes::table_scope, "table") {
                    self.pop_until_one_of(&["table"]);
                    self.reset_insertion_mode();
                    self.process_token(token);
                }
            }
            Token::EndTag(ref tag) if tag.name == "table" => {
                if !self.has_in_scope(scopes::table_scope, "table") {
                    self.parse_error(Error::UnexpectedEndTag);
                    return;
                }
                self.pop_until_one_of(&["table"]);
                self.reset_insertion_mode();
            }
            Token::EndTag(ref tag)
                if matches!(
                    tag.name.as_str(),
                    "body" | "caption" | "col" | "colgroup" | "html" | "tbody" | "td"
                        | "tfoot" | "th" | "thead" | "tr"
                ) =>
            {
                self.parse_error(Error::UnexpectedEndTag);
            }
            Token::StartTag(ref tag)
                if matches!(tag.name.as_str(), "style" | "script" | "template") =>
            {
                self.step(InsertionMode::InHead, token);
            }
            Token::EndTag(ref tag) if tag.name == "template" => {
                self.step(InsertionMode::InHead, token);
            }
            Token::StartTag(ref tag)
                if tag.name == "input"
                    && tag
                        .attribute("type")
                        .map_or(false, |t| t.eq_ignore_ascii_case("hidden")) =>
            {
                self.parse_error(Error::UnexpectedStartTag);
                self.insert_html_element(tag);
                self.pop();
                self.acknowledge_self_closing();
            }
            Token::StartTag(ref tag) if tag.name == "form" => {
                self.parse_error(Error::UnexpectedFormInTable);
                if !self.stack_has_template() && self.form_element.is_none() {
                    let form = self.insert_html_element(tag);
                    self.form_element = Some(form);
                    self.pop();
                }
            }
            Token::Eof => self.mode_in_body(token),
            token => {
                self.parse_error(Error::UnexpectedCharacterInTable);
                self.foster_parenting = true;
                self.mode_in_body(token);
                self.foster_parenting = false;
            }
        }
    }

    // ---- 13.2.6.4.10 "in table text" --------------------------------------

    fn mode_in_table_text(&mut self, token: Token) {
        match token {
            Token::String(s) => match run_class(&s) {
                CharClass::Null => self.parse_error(Error::UnexpectedNullCharacter),
                CharClass::Whitespace => self.pending_table_text.push(s),
                CharClass::Other => {
                    self.pending_table_text_is_whitespace = false;
                    self.pending_table_text.push(s);
                }
            },
            token => {
                self.flush_pending_table_text();
                let mode = self
                    .original_mode
                    .take()
                    .expect("table text mode without origin");
                self.set_mode(mode);
                self.process_token(token);
            }
        }
    }

    fn flush_pending_table_text(&mut self) {
        let runs = std::mem::take(&mut self.pending_table_text);
        let only_whitespace = self.pending_table_text_is_whitespace;
        self.pending_table_text_is_whitespace = true;
        if only_whitespace {
            for run in &runs {
                self.insert_characters(run);
            }
        } else {
            for run in &runs {
                self.parse_error(Error::UnexpectedCharacterInTable);
                self.foster_parenting = true;
                self.reconstruct_formatting();
                self.insert_characters(run);
                if run_class(run) == CharClass::Other {
                    self.frameset_ok = false;
                }
                self.foster_parenting = false;
            }
        }
    }

    // ---- 13.2.6.4.11 "in caption" -----------------------------------------

    fn mode_in_caption(&mut self, token: Token) {
        let ends_caption = match token {
            Token::StartTag(ref tag) => matches!(
                tag.name.as_str(),
                "caption" | "col" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead"
                    | "tr"
            ),
            Token::EndTag(ref tag) => tag.name == "table",
            _ => false,
        };

        match token {
            Token::EndTag(ref tag) if tag.name == "caption" => {
                if !self.has_in_scope(scopes::table_scope, "caption") {
                    self.parse_error(Error::UnexpectedEndTag);
                    return;
                }
                self.generate_implied_end_tags(None);
                if !self.current_is_html("caption") {
                    self.parse_error(Error::EndTagTooEarly);
                }
                self.pop_until_one_of(&["caption"]);
                self.clear_formatting_to_marker();
                self.set_mode(InsertionMode::InTable);
            }
            token if ends_caption => {
                if !self.has_in_scope(scopes::table_scope, "caption") {
                    self.parse_error(Error::UnexpectedStartTag);
                    return;
                }
                self.generate_implied_end_tags(None);
                if !self.current_is_html("caption") {
                    self.parse_error(Error::EndTagTooEarly);
                }
                self.pop_until_one_of(&["caption"]);
                self.clear_formatting_to_marker();
                self.set_mode(InsertionMode::InTable);
                self.process_token(token);
            }
            Token::EndTag(ref tag)
                if matches!(
                    tag.name.as_str(),
                    "body" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot" | "th"
                        | "thead" | "tr"
                ) =>
            {
                self.parse_error(Error::UnexpectedEndTag);
            }
            token => self.mode_in_body(token),
        }
    }

    // ---- 13.2.6.4.12 "in column group" ------------------------------------

    fn mode_in_column_group(&mut self, token: Token) {
        match token {
            Token::String(ref s) if run_class(s) == CharClass::Whitespace => {
                self.insert_characters(s);
            }
            Token::Comment(data) => self.insert_comment(&data),
            Token::Doctype(_) => self.parse_error(Error::UnexpectedDoctype),
            Token::StartTag(ref tag) if tag.name == "html" => {
                self.step(InsertionMode::InBody, token);
            }
            Token::StartTag(ref tag) if tag.name == "col" => {
                self.insert_html_element(tag);
                self.pop();
                self.acknowledge_self_closing();
            }
            Token::EndTag(ref tag) if tag.name == "colgroup" => {
                if !self.current_is_html("colgroup") {
                    self.parse_error(Error::UnexpectedEndTag);
                    return;
                }
                self.pop();
                self.set_mode(InsertionMode::InTable);
            }
            Token::EndTag(ref tag) if tag.name == "col" => {
                self.parse_error(Error::UnexpectedEndTag);
            }
            Token::StartTag(ref tag) if tag.name == "template" => {
                self.step(InsertionMode::InHead, token);
            }
            Token::EndTag(ref tag) if tag.name == "template" => {
                self.step(InsertionMode::InHead, token);
            }
            Token::Eof => self.mode_in_body(token),
            token => {
                if !self.current_is_html("colgroup") {
                    self.parse_error(Error::UnexpectedStartTag);
                    return;
                }
                self.pop();
                self.set_mode(InsertionMode::InTable);
                self.process_token(token);
            }
        }
    }

    // ---- 13.2.6.4.13 "in table body" --------------------------------------

    fn mode_in_table_body(&mut self, token: Token) {
        match token {
            Token::StartTag(ref tag) if tag.name == "tr" => {
                self.clear_stack_to_table_body_context();
                self.insert_html_element(tag);
                self.set_mode(InsertionMode::InRow);
            }
            Token::StartTag(ref tag) if matches!(tag.name.as_str(), "th" | "td") => {
                self.parse_error(Error::UnexpectedStartTagImpliesEndTag);
                self.clear_stack_to_table_body_context();
                self.insert_phantom("tr");
                self.set_mode(InsertionMode::InRow);
                self.process_token(token);
            }
            Token::EndTag(ref tag)
                if matches!(tag.name.as_str(), "tbody" | "tfoot" | "thead") =>
            {
                if !self.has_in_scope(scopes::table_scope, &tag.name) {
                    self.parse_error(Error::UnexpectedEndTag);
                    return;
                }
                self.clear_stack_to_table_body_context();
                self.pop();
                self.set_mode(InsertionMode::InTable);
            }
            Token::StartTag(ref tag)
                if matches!(
                    tag.name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead"
                ) =>
            {
                self.end_table_body_and_reprocess(token);
            }
            Token::EndTag(ref tag) if tag.name == "table" => {
                self.end_table_body_and_reprocess(token);
            }
            Token::EndTag(ref tag)
                if matches!(
                    tag.name.as_str(),
                    "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th" | "tr"
                ) =>
            {
                self.parse_error(Error::UnexpectedEndTag);
            }
            token => self.mode_in_table(token),
        }
    }

    fn end_table_body_and_reprocess(&mut self, token: Token) {
        if !self.has_any_in_scope(scopes::table_scope, &["tbody", "thead", "tfoot"]) {
            self.parse_error(Error::UnexpectedEndTag);
            return;
        }
        self.clear_stack_to_table_body_context();
        self.pop();
        self.set_mode(InsertionMode::InTable);
        self.process_token(token);
    }

    // ---- 13.2.6.4.14 "in row" ---------------------------------------------

    fn mode_in_row(&mut self, token: Token) {
        match token {
            Token::StartTag(ref tag) if matches!(tag.name.as_str(), "th" | "td") => {
                self.clear_stack_to_table_row_context();
                self.insert_html_element(tag);
                self.set_mode(InsertionMode::InCell);
                self.push_marker();
            }
            Token::EndTag(ref tag) if tag.name == "tr" => {
                if !self.has_in_scope(scopes::table_scope, "tr") {
                    self.parse_error(Error::UnexpectedEndTag);
                    return;
                }
                self.clear_stack_to_table_row_context();
                self.pop();
                self.set_mode(InsertionMode::InTableBody);
            }
            Token::StartTag(ref tag)
                if matches!(
                    tag.name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead" | "tr"
                ) =>
            {
                self.end_row_and_reprocess(token);
            }
            Token::EndTag(ref tag) if tag.name == "table" => {
                self.end_row_and_reprocess(token);
            }
            Token::EndTag(ref tag)
                if matches!(tag.name.as_str(), "tbody" | "tfoot" | "thead") =>
            {
                if !self.has_in_scope(scopes::table_scope, &tag.name) {
                    self.parse_error(Error::UnexpectedEndTag);
                    return;
                }
                if !self.has_in_scope(scopes::table_scope, "tr") {
                    return;
                }
                self.clear_stack_to_table_row_context();
                self.pop();
                self.set_mode(InsertionMode::InTableBody);
                self.process_token(token);
            }
            Token::EndTag(ref tag)
                if matches!(
                    tag.name.as_str(),
                    "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th"
                ) =>
            {
                self.parse_error(Error::UnexpectedEndTag);
            }
            token => self.mode_in_table(token),
        }
    }

    fn end_row_and_reprocess(&mut self, token: Token) {
        if !self.has_in_scope(scopes::table_scope, "tr") {
            self.parse_error(Error::UnexpectedEndTag);
            return;
        }
        self.clear_stack_to_table_row_context();
        self.pop();
        self.set_mode(InsertionMode::InTableBody);
        self.process_token(token);
    }

    // ---- 13.2.6.4.15 "in cell" --------------------------------------------

    fn mode_in_cell(&mut self, token: Token) {
        match token {
            Token::EndTag(ref tag) if matches!(tag.name.as_str(), "td" | "th") => {
                if !self.has_in_scope(scopes::table_scope, &tag.name) {
                    self.parse_error(Error::UnexpectedEndTag);
                    return;
                }
                self.generate_implied_end_tags(None);
                if !self.current_is_html(&tag.name) {
                    self.parse_error(Error::UnexpectedCellEndTag);
                }
                self.pop_until_one_of(&[tag.name.as_str()]);
                self.clear_formatting_to_marker();
                self.set_mode(InsertionMode::InRow);
            }
            Token::StartTag(ref tag)
                if matches!(
                    tag.name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "td" | "tfoot" | "th"
                        | "thead" | "tr"
                ) =>
            {
                if !self.has_any_in_scope(scopes::table_scope, &["td", "th"]) {
                    self.parse_error(Error::UnexpectedStartTag);
                    return;
                }
                self.close_the_cell();
                self.process_token(token);
            }
            Token::EndTag(ref tag)
                if matches!(
                    tag.name.as_str(),
                    "body" | "caption" | "col" | "colgroup" | "html"
                ) =>
            {
                self.parse_error(Error::UnexpectedEndTag);
            }
            Token::EndTag(ref tag)
                if matches!(tag.name.as_str(), "table" | "tbody" | "tfoot" | "thead" | "tr") =>
            {
                if !self.has_in_scope(scopes::table_scope, &tag.name) {
                    self.parse_error(Error::UnexpectedEndTag);
                    return;
                }
                self.close_the_cell();
                self.process_token(token);
            }
            token => self.mode_in_body(token),
        }
    }

    // ---- 13.2.6.4.16 "in select" ------------------------------------------

    fn mode_in_select(&mut self, token: Token) {
        match token {
            Token::String(ref s) => match run_class(s) {
                CharClass::Null => self.parse_error(Error::UnexpectedNullCharacter),
                _ => self.insert_characters(s),
            },
            Token::Comment(data) => self.insert_comment(&data),
            Token::Doctype(_) => self.parse_error(Error::UnexpectedDoctype),
            Token::StartTag(ref tag) if tag.name == "html" => {
                self.step(InsertionMode::InBody, token);
            }
            Token::StartTag(ref tag) if tag.name == "option" => {
                if self.current_is_html("option") {
                    self.pop();
                }
                self.insert_html_element(tag);
            }
            Token::StartTag(ref tag) if tag.name == "optgroup" => {
                if self.current_is_html("option") {
                    self.pop();
                }
                if self.current_is_html("optgroup") {
                    self.pop();
                }
                self.insert_html_element(tag);
            }
            Token::StartTag(ref tag) if tag.name == "hr" => {
                if self.current_is_html("option") {
                    self.pop();
                }
                if self.current_is_html("optgroup") {
                    self.pop();
                }
                self.insert_html_element(tag);
                self.pop();
                self.acknowledge_self_closing();
            }
            Token::EndTag(ref tag) if tag.name == "optgroup" => {
                if self.current_is_html("option")
                    && self
                        .open_elements
                        .iter()
                        .rev()
                        .nth(1)
                        .map_or(false, |e| e.name.is_html("optgroup"))
                {
                    self.pop();
                }
                if self.current_is_html("optgroup") {
                    self.pop();
                } else {
                    self.parse_error(Error::UnexpectedEndTag);
                }
            }
            Token::EndTag(ref tag) if tag.name == "option" => {
                if self.current_is_html("option") {
                    self.pop();
                } else {
                    self.parse_error(Error::UnexpectedEndTag);
                }
            }
            Token::EndTag(ref tag) if tag.name == "select" => {
                if !self.has_in_scope(scopes::select_scope, "select") {
                    self.parse_error(Error::UnexpectedEndTag);
                    return;
                }
                self.pop_until_one_of(&["select"]);
                self.reset_insertion_mode();
            }
            Token::StartTag(ref tag) if tag.name == "select" => {
                self.parse_error(Error::UnexpectedStartTagImpliesEndTag);
                if self.has_in_scope(scopes::select_scope, "select") {
                    self.pop_until_one_of(&["select"]);
                    self.reset_insertion_mode();
                }
            }
            Token::StartTag(ref tag)
                if matches!(tag.name.as_str(), "input" | "keygen" | "textarea") =>
            {
                self.parse_error(Error::UnexpectedStartTagImpliesEndTag);
                if !self.has_in_scope(scopes::select_scope, "select") {
                    return;
                }
                self.pop_until_one_of(&["select"]);
                self.reset_insertion_mode();
                self.process_token(token);
            }
            Token::StartTag(ref tag) if matches!(tag.name.as_str(), "script" | "template") => {
                self.step(InsertionMode::InHead, token);
            }
            Token::EndTag(ref tag) if tag.name == "template" => {
                self.step(InsertionMode::InHead, token);
            }
            Token::Eof => self.mode_in_body(token),
            Token::StartTag(_) => self.parse_error(Error::UnexpectedStartTagIgnored),
            Token::EndTag(_) => self.parse_error(Error::UnexpectedEndTagIgnored),
            Token::Error(_) => debug_assert!(false, "errors are filtered by the parser"),
        }
    }

    // ---- 13.2.6.4.17 "in select in table" ---------------------------------

    fn mode_in_select_in_table(&mut self, token: Token) {
        match token {
            Token::StartTag(ref tag)
                if matches!(
                    tag.name.as_str(),
                    "caption" | "table" | "tbody" | "tfoot" | "thead" | "tr" | "td" | "th"
                ) =>
            {
                self.parse_error(Error::UnexpectedStartTagImpliesEndTag);
                self.pop_until_one_of(&["select"]);
                self.reset_insertion_mode();
                self.process_token(token);
            }
            Token::EndTag(ref tag)
                if matches!(
                    tag.name.as_str(),
                    "caption" | "table" | "tbody" | "tfoot" | "thead" | "tr" | "td" | "th"
                ) =>
            {
                self.parse_error(Error::UnexpectedEndTag);
                if !self.has_in_scope(scopes::table_scope, &tag.name) {
                    return;
                }
                self.pop_until_one_of(&["select"]);
                self.reset_insertion_mode();
                self.process_token(token);
            }
            token => self.mode_in_select(token),
        }
    }

    // ---- 13.2.6.4.18 "in template" ----------------------------------------

    fn mode_in_template(&mut self, token: Token) {
        match token {
            Token::String(_) | Token::Comment(_) | Token::Doctype(_) => {
                self.mode_in_body(token);
            }
            Token::StartTag(ref tag)
                if matches!(
                    tag.name.as_str(),
                    "base"
                        | "basefont"
                        | "bgsound"
                        | "link"
                        | "meta"
                        | "noframes"
                        | "script"
                        | "style"
                        | "template"
                        | "title"
                ) =>
            {
                self.step(InsertionMode::InHead, token);
            }
            Token::EndTag(ref tag) if tag.name == "template" => {
                self.step(InsertionMode::InHead, token);
            }
            Token::StartTag(ref tag)
                if matches!(
                    tag.name.as_str(),
                    "caption" | "colgroup" | "tbody" | "tfoot" | "thead"
                ) =>
            {
                self.retarget_template(InsertionMode::InTable, token);
            }
            Token::StartTag(ref tag) if tag.name == "col" => {
                self.retarget_template(InsertionMode::InColumnGroup, token);
            }
            Token::StartTag(ref tag) if tag.name == "tr" => {
                self.retarget_template(InsertionMode::InTableBody, token);
            }
            Token::StartTag(ref tag) if matches!(tag.name.as_str(), "td" | "th") => {
                self.retarget_template(InsertionMode::InRow, token);
            }
            Token::StartTag(_) => {
                self.retarget_template(InsertionMode::InBody, token);
            }
            Token::EndTag(_) => self.parse_error(Error::UnexpectedEndTag),
            Token::Eof => {
                if !self.stack_has_template() {
                    self.done = true;
                    return;
                }
                self.parse_error(Error::EofWithUnclosedElements);
                self.pop_until_one_of(&["template"]);
                self.clear_formatting_to_marker();
                self.template_modes.pop();
                self.reset_insertion_mode();
                self.process_token(token);
            }
            Token::Error(_) => debug_assert!(false, "errors are filtered by the parser"),
        }
    }

    fn retarget_template(&mut self, mode: InsertionMode, token: Token) {
        self.template_modes.pop();
        self.template_modes.push(mode);
        self.set_mode(mode);
        self.process_token(token);
    }

    // ---- 13.2.6.4.19 "after body" -----------------------------------------

    fn mode_after_body(&mut self, token: Token) {
        match token {
            Token::String(ref s) if run_class(s) == CharClass::Whitespace => {
                self.step(InsertionMode::InBody, token);
            }
            Token::Comment(data) => {
                let root = self.open_elements[0].handle.clone();
                self.append_comment_to(root, &data);
            }
            Token::Doctype(_) => self.parse_error(Error::UnexpectedDoctype),
            Token::StartTag(ref tag) if tag.name == "html" => {
                self.step(InsertionMode::InBody, token);
            }
            Token::EndTag(ref tag) if tag.name == "html" => {
                if self.fragment_context.is_some() {
                    self.parse_error(Error::UnexpectedEndTag);
                    return;
                }
                self.set_mode(InsertionMode::AfterAfterBody);
            }
            Token::Eof => self.done = true,
            token => {
                self.parse_error(Error::UnexpectedStartTag);
                self.set_mode(InsertionMode::InBody);
                self.process_token(token);
            }
        }
    }

    // ---- 13.2.6.4.20 "in frameset" ----------------------------------------

    fn mode_in_frameset(&mut self, token: Token) {
        match token {
            Token::String(ref s) if run_class(s) == CharClass::Whitespace => {
                self.insert_characters(s);
            }
            Token::Comment(data) => self.insert_comment(&data),
            Token::Doctype(_) => self.parse_error(Error::UnexpectedDoctype),
            Token::StartTag(ref tag) if tag.name == "html" => {
                self.step(InsertionMode::InBody, token);
            }
            Token::StartTag(ref tag) if tag.name == "frameset" => {
                self.insert_html_element(tag);
            }
            Token::EndTag(ref tag) if tag.name == "frameset" => {
                if self.open_elements.len() == 1 {
                    self.parse_error(Error::UnexpectedEndTag);
                    return;
                }
                self.pop();
                if self.fragment_context.is_none() && !self.current_is_html("frameset") {
                    self.set_mode(InsertionMode::AfterFrameset);
                }
            }
            Token::StartTag(ref tag) if tag.name == "frame" => {
                self.insert_html_element(tag);
                self.pop();
                self.acknowledge_self_closing();
            }
            Token::StartTag(ref tag) if tag.name == "noframes" => {
                self.step(InsertionMode::InHead, token);
            }
            Token::Eof => {
                if self.open_elements.len() != 1 {
                    self.parse_error(Error::EofWithUnclosedElements);
                }
                self.done = true;
            }
            _ => self.parse_error(Error::UnexpectedStartTagIgnored),
        }
    }

    // ---- 13.2.6.4.21 "after frameset" -------------------------------------

    fn mode_after_frameset(&mut self, token: Token) {
        match token {
            Token::String(ref s) if run_class(s) == CharClass::Whitespace => {
                self.insert_characters(s);
            }
            Token::Comment(data) => self.insert_comment(&data),
            Token::Doctype(_) => self.parse_error(Error::UnexpectedDoctype),
            Token::StartTag(ref tag) if tag.name == "html" => {
                self.step(InsertionMode::InBody, token);
            }
            Token::EndTag(ref tag) if tag.name == "html" => {
                self.set_mode(InsertionMode::AfterAfterFrameset);
            }
            Token::StartTag(ref tag) if tag.name == "noframes" => {
                self.step(InsertionMode::InHead, token);
            }
            Token::Eof => self.done = true,
            _ => self.parse_error(Error::UnexpectedStartTagIgnored),
        }
    }

    // ---- 13.2.6.4.22 "after after body" -----------------------------------

    fn mode_after_after_body(&mut self, token: Token) {
        match token {
            Token::Comment(data) => {
                let document = self.document.clone();
                self.append_comment_to(document, &data);
            }
            Token::Doctype(_) => self.step(InsertionMode::InBody, token),
            Token::String(ref s) if run_class(s) == CharClass::Whitespace => {
                self.step(InsertionMode::InBody, token);
            }
            Token::StartTag(ref tag) if tag.name == "html" => {
                self.step(InsertionMode::InBody, token);
            }
            Token::Eof => self.done = true,
            token => {
                self.parse_error(Error::UnexpectedStartTag);
                self.set_mode(InsertionMode::InBody);
                self.process_token(token);
            }
        }
    }

    // ---- 13.2.6.4.23 "after after frameset" -------------------------------

    fn mode_after_after_frameset(&mut self, token: Token) {
        match token {
            Token::Comment(data) => {
                let document = self.document.clone();
                self.append_comment_to(document, &data);
            }
            Token::Doctype(_) => self.step(InsertionMode::InBody, token),
            Token::String(ref s) if run_class(s) == CharClass::Whitespace => {
                self.step(InsertionMode::InBody, token);
            }
            Token::StartTag(ref tag) if tag.name == "html" => {
                self.step(InsertionMode::InBody, token);
            }
            Token::StartTag(ref tag) if tag.name == "noframes" => {
                self.step(InsertionMode::InHead, token);
            }
            Token::Eof => self.done = true,
            _ => self.parse_error(Error::UnexpectedStartTagIgnored),
        }
    }

    // ---- 13.2.6.5 the rules for parsing tokens in foreign content ---------

    fn step_foreign(&mut self, token: Token) {
        match token {
            Token::String(ref s) => match run_class(s) {
                CharClass::Null => {
                    self.parse_error(Error::UnexpectedNullCharacter);
                    let replaced: String = s.chars().map(|_| '\u{fffd}').collect();
                    self.insert_characters(&replaced);
                }
                CharClass::Whitespace => self.insert_characters(s),
                CharClass::Other => {
                    self.insert_characters(s);
                    self.frameset_ok = false;
                }
            },
            Token::Comment(data) => self.insert_comment(&data),
            Token::Doctype(_) => self.parse_error(Error::UnexpectedDoctype),
            Token::StartTag(ref tag) if foreign::is_breakout_tag(tag) => {
                self.parse_error(Error::UnexpectedStartTag);
                self.pop_foreign_and_reprocess(token);
            }
            Token::EndTag(ref tag) if matches!(tag.name.as_str(), "br" | "p") => {
                self.parse_error(Error::UnexpectedEndTag);
                self.pop_foreign_and_reprocess(token);
            }
            Token::StartTag(tag) => {
                let ns = self
                    .adjusted_current()
                    .map(|(name, _)| name.ns)
                    .unwrap_or(Namespace::Html);
                self.insert_foreign_element(&tag, ns);
                if tag.self_closing {
                    if tag.name == "script" && ns == Namespace::Svg {
                        // script execution is out of scope, the pop is all
                        // that is left of it
                        self.acknowledge_self_closing();
                        self.pop();
                    } else {
                        self.pop();
                        self.acknowledge_self_closing();
                    }
                }
            }
            Token::EndTag(tag) => {
                if tag.name == "script"
                    && self
                        .current_name()
                        .map_or(false, |n| n.ns == Namespace::Svg && n.local == "script")
                {
                    self.pop();
                    return;
                }
                let mut idx = self.open_elements.len() - 1;
                if !self.open_elements[idx]
                    .name
                    .local
                    .eq_ignore_ascii_case(&tag.name)
                {
                    self.parse_error(Error::UnexpectedEndTag);
                }
                loop {
                    if idx == 0 {
                        return;
                    }
                    if self.open_elements[idx]
                        .name
                        .local
                        .eq_ignore_ascii_case(&tag.name)
                    {
                        self.open_elements.truncate(idx);
                        return;
                    }
                    idx -= 1;
                    if self.open_elements[idx].name.ns == Namespace::Html {
                        self.step(self.mode, Token::EndTag(tag));
                        return;
                    }
                }
            }
            Token::Eof => debug_assert!(false, "EOF always takes the HTML branch"),
            Token::Error(_) => debug_assert!(false, "errors are filtered by the parser"),
        }
    }

    fn pop_foreign_and_reprocess(&mut self, token: Token) {
        while let Some(entry) = self.current() {
            if entry.name.ns == Namespace::Html
                || entry.html_integration_point
                || scopes::mathml_text_integration_point(&entry.name)
            {
                break;
            }
            self.pop();
        }
        self.process_token(token);
    }
}

fn phantom_tag(name: &str) -> StartTag {
    StartTag {
        name: name.to_owned(),
        ..StartTag::default()
    }
}
