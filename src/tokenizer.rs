use crate::emitter::{DefaultEmitter, Emitter};
use crate::error::Position;
use crate::input::InputStream;
use crate::machine;
use crate::machine_helper::MachineHelper;
use crate::never::Never;
use crate::reader::{Readable, Reader};
use crate::state::State;
use crate::utils::{ControlToken, MachineState};

/// An HTML tokenizer. See crate-level docs for basic usage.
///
/// Yields tokens through its [`Iterator`] impl. The tree constructor (or
/// any other driver) talks back through three small channels:
/// [`set_state`](Tokenizer::set_state) for the content model,
/// [`set_last_start_tag`](Tokenizer::set_last_start_tag) for end-tag
/// matching in RCDATA/RAWTEXT/script data, and
/// [`set_cdata_allowed`](Tokenizer::set_cdata_allowed) for the
/// foreign-content CDATA rule. The machine pauses after every emitted
/// token, so a state set while handling token *n* takes effect before
/// token *n + 1* is produced.
pub struct Tokenizer<R: Reader, E: Emitter = DefaultEmitter> {
    eof: bool,
    pub(crate) emitter: E,
    pub(crate) input: InputStream<R>,
    pub(crate) helper: MachineHelper,
    pub(crate) cdata_allowed: bool,
}

impl<R: Reader> Tokenizer<R> {
    /// Create a new tokenizer from some input.
    ///
    /// `input` can be `&str`, `&String` or `&[u8]` out of the box; see
    /// [`crate::Readable`] for plugging in other types.
    pub fn new<'a, S: Readable<'a, Reader = R>>(input: S) -> Self {
        Tokenizer::<S::Reader>::new_with_emitter(input, DefaultEmitter::default())
    }
}

impl<R: Reader, E: Emitter> Tokenizer<R, E> {
    /// Construct a new tokenizer from some input and a custom emitter.
    pub fn new_with_emitter<'a, S: Readable<'a, Reader = R>>(input: S, emitter: E) -> Self {
        Tokenizer {
            eof: false,
            emitter,
            input: InputStream::new(input.to_reader()),
            helper: MachineHelper::default(),
            cdata_allowed: false,
        }
    }

    /// Override the tokenizer's state, one of the content models of the
    /// standard. The tree constructor calls this after `<title>`,
    /// `<textarea>` (RCDATA), `<style>`, `<xmp>`, … (RAWTEXT), `<script>`
    /// and `<plaintext>`.
    pub fn set_state(&mut self, state: State) {
        self.helper.switch_to(match state {
            State::Data => MachineState::Data,
            State::PlainText => MachineState::PlainText,
            State::RcData => MachineState::RcData,
            State::RawText => MachineState::RawText,
            State::ScriptData => MachineState::ScriptData,
            State::CdataSection => MachineState::CdataSection,
        });
    }

    /// Override the _last start tag_, against which `</...>` is matched in
    /// RCDATA/RAWTEXT/script data. Fragment parsing seeds this with the
    /// context element's name.
    pub fn set_last_start_tag(&mut self, last_start_tag: Option<&str>) {
        self.emitter.set_last_start_tag(last_start_tag);
    }

    /// Whether `<![CDATA[` opens a real CDATA section. True exactly when
    /// the adjusted current node is a foreign (non-HTML) element; outside
    /// of a tree constructor there is no such thing and the default is
    /// false, turning CDATA into a bogus comment with an error.
    pub fn set_cdata_allowed(&mut self, allowed: bool) {
        self.cdata_allowed = allowed;
    }

    /// The current input cursor, for error records of a driving parser.
    pub fn position(&self) -> Position {
        self.input.position()
    }
}

impl<R: Reader, E: Emitter> Iterator for Tokenizer<R, E> {
    type Item = Result<E::Token, R::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.emitter.pop_token() {
                break Some(Ok(token));
            } else if !self.eof {
                self.emitter.set_position(self.input.position());
                match machine::consume(self) {
                    Ok(ControlToken::Continue) => (),
                    Ok(ControlToken::Eof) => {
                        self.eof = true;
                        self.emitter.emit_eof();
                    }
                    Err(e) => break Some(Err(e)),
                }
            } else {
                break None;
            }
        }
    }
}

/// A tokenizer that directly yields tokens instead of `Result<Token, _>`,
/// for inputs that cannot fail.
///
/// This is the return value of [`Tokenizer::infallible`].
pub struct InfallibleTokenizer<R: Reader<Error = Never>, E: Emitter>(Tokenizer<R, E>);

impl<R: Reader<Error = Never>, E: Emitter> Tokenizer<R, E> {
    /// Statically assert that this iterator is infallible.
    ///
    /// Call this to get rid of error handling when parsing HTML from
    /// strings.
    pub fn infallible(self) -> InfallibleTokenizer<R, E> {
        InfallibleTokenizer(self)
    }
}

impl<R: Reader<Error = Never>, E: Emitter> Iterator for InfallibleTokenizer<R, E> {
    type Item = E::Token;

    fn next(&mut self) -> Option<Self::Item> {
        match self.0.next()? {
            Ok(token) => Some(token),
            Err(e) => match e {},
        }
    }
}
