/// States that the tokenizer can be switched to from the outside.
///
/// These are the content models of the HTML standard: the tree constructor
/// (or any other driver) picks one after certain start tags have been
/// emitted, and the html5lib tokenizer tests use them as initial states.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum State {
    /// The data state.
    Data,
    /// The plain text state.
    PlainText,
    /// The RCDATA state.
    RcData,
    /// The raw text state.
    RawText,
    /// The script data state.
    ScriptData,
    /// The CDATA section state.
    CdataSection,
}
