//! Runs the html5lib-tests tokenizer fixtures, when a checkout is present
//! at tests/html5lib-tests. Without the fixtures this harness is a no-op.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use glob::glob;
use libtest_mimic::{Arguments, Trial};
use pretty_assertions::assert_eq;
use serde::Deserialize;

use gumtree::{Doctype, EndTag, StartTag, State, Token, Tokenizer};

#[derive(Clone)]
struct ExpectedOutputTokens(Vec<Token>);

impl<'de> Deserialize<'de> for ExpectedOutputTokens {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // tag each array by its leading string constant
        macro_rules! def_const {
            ($str:expr, $ty:ident) => {
                #[derive(Deserialize)]
                enum $ty {
                    #[serde(rename = $str)]
                    $ty,
                }
            };
        }

        def_const!("DOCTYPE", DoctypeConst);
        def_const!("StartTag", StartTagConst);
        def_const!("EndTag", EndTagConst);
        def_const!("Comment", CommentConst);
        def_const!("Character", CharacterConst);

        type Attributes = BTreeMap<String, String>;

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OutputToken {
            // "DOCTYPE", name, public_id, system_id, correctness
            Doctype(
                DoctypeConst,
                Option<String>,
                Option<String>,
                Option<String>,
                bool,
            ),
            // "StartTag", name, attributes, self_closing?
            StartTag(StartTagConst, String, Attributes),
            StartTag2(StartTagConst, String, Attributes, bool),
            // "EndTag", name
            EndTag(EndTagConst, String),
            // "Comment", data
            Comment(CommentConst, String),
            // "Character", data
            Character(CharacterConst, String),
        }

        Ok(ExpectedOutputTokens(
            Vec::deserialize(deserializer)?
                .into_iter()
                .map(|token| match token {
                    OutputToken::Doctype(_, name, public_identifier, system_identifier, ok) => {
                        Token::Doctype(Doctype {
                            name,
                            public_identifier,
                            system_identifier,
                            force_quirks: !ok,
                        })
                    }
                    OutputToken::StartTag(_, name, attributes) => Token::StartTag(StartTag {
                        self_closing: false,
                        name,
                        attributes: attributes.into_iter().collect(),
                    }),
                    OutputToken::StartTag2(_, name, attributes, self_closing) => {
                        Token::StartTag(StartTag {
                            self_closing,
                            name,
                            attributes: attributes.into_iter().collect(),
                        })
                    }
                    OutputToken::EndTag(_, name) => Token::EndTag(EndTag { name }),
                    OutputToken::Comment(_, data) => Token::Comment(data),
                    OutputToken::Character(_, data) => Token::String(data),
                })
                .collect(),
        ))
    }
}

#[derive(Clone)]
struct InitialState(State);

impl<'de> Deserialize<'de> for InitialState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        enum RawInitialState {
            #[serde(rename = "Data state")]
            Data,
            #[serde(rename = "PLAINTEXT state")]
            PlainText,
            #[serde(rename = "RCDATA state")]
            RcData,
            #[serde(rename = "RAWTEXT state")]
            RawText,
            #[serde(rename = "Script data state")]
            ScriptData,
            #[serde(rename = "CDATA section state")]
            CdataSection,
        }

        Ok(Self(match RawInitialState::deserialize(deserializer)? {
            RawInitialState::Data => State::Data,
            RawInitialState::PlainText => State::PlainText,
            RawInitialState::RcData => State::RcData,
            RawInitialState::RawText => State::RawText,
            RawInitialState::ScriptData => State::ScriptData,
            RawInitialState::CdataSection => State::CdataSection,
        }))
    }
}

fn initial_states_default() -> Vec<InitialState> {
    vec![InitialState(State::Data)]
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
struct TestFileEntry {
    description: String,
    input: String,
    output: ExpectedOutputTokens,
    #[serde(default = "initial_states_default")]
    initial_states: Vec<InitialState>,
    #[serde(default)]
    double_escaped: bool,
    #[serde(default)]
    last_start_tag: Option<String>,
    #[serde(default)]
    errors: Vec<ExpectedError>,
}

#[derive(Deserialize, Debug, Eq, PartialEq, Clone)]
struct ExpectedError {
    code: String,
}

#[derive(Deserialize)]
struct TestFile {
    tests: Vec<TestFileEntry>,
}

/// Implements the `\uXXXX` escapes of doubleEscaped tests. Returns `None`
/// for lone surrogates, which a char-based pipeline cannot represent.
fn unescape(data: &str) -> Option<String> {
    let mut out = String::new();
    let mut chars = data.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('u') => {}
            other => panic!("unexpected escape: {:?}", other),
        }
        let hex: String = (0..4).map(|_| chars.next().expect("eof in \\u")).collect();
        let code = u32::from_str_radix(&hex, 16).expect("bad hex in \\u");
        match char::from_u32(code) {
            Some(c) => out.push(c),
            None => return None,
        }
    }

    Some(out)
}

fn produce_testcases_from_file(tests: &mut Vec<Trial>, path: &Path) {
    let fname = path.file_name().unwrap().to_str().unwrap().to_owned();

    if matches!(
        fname.as_str(),
        // "Coercing an HTML DOM into an infoset" is not implemented
        "xmlViolation.test"
        // surrogates cannot appear in a char-based input stream
        | "unicodeCharsProblematic.test"
    ) {
        return;
    }

    let f = File::open(path).unwrap();
    let bf = BufReader::new(f);
    let TestFile {
        tests: declarations,
    } = serde_json::from_reader(bf).unwrap();

    for (test_i, mut declaration) in declarations.into_iter().enumerate() {
        if declaration.double_escaped {
            declaration.input = match unescape(&declaration.input) {
                Some(input) => input,
                None => continue,
            };

            let mut ok = true;
            declaration.output.0 = declaration
                .output
                .0
                .into_iter()
                .filter_map(|token| {
                    let mapped = match token {
                        Token::String(x) => unescape(&x).map(Token::String),
                        Token::Comment(x) => unescape(&x).map(Token::Comment),
                        token => Some(token),
                    };
                    if mapped.is_none() {
                        ok = false;
                    }
                    mapped
                })
                .collect();
            if !ok {
                continue;
            }
        }

        for state in declaration.initial_states.clone() {
            let declaration = declaration.clone();
            let name = format!("{}:{}:{:?}", fname, test_i, state.0);
            tests.push(Trial::test(name, move || {
                run_test(&declaration, state.0);
                Ok(())
            }));
        }
    }
}

fn run_test(declaration: &TestFileEntry, state: State) {
    let mut tokenizer = Tokenizer::new(&declaration.input);
    tokenizer.set_state(state);
    tokenizer.set_last_start_tag(declaration.last_start_tag.as_deref());

    let mut actual_tokens: Vec<Token> = Vec::new();
    let mut actual_errors = Vec::new();

    for token in tokenizer.infallible() {
        match token {
            Token::Error(e) => actual_errors.push(ExpectedError {
                code: e.code.as_str().to_owned(),
            }),
            Token::Eof => {}
            Token::String(s) => {
                // adjacent character tokens are coalesced for comparison
                if let Some(Token::String(last)) = actual_tokens.last_mut() {
                    last.push_str(&s);
                } else {
                    actual_tokens.push(Token::String(s));
                }
            }
            token => actual_tokens.push(token),
        }
    }

    let expected: Vec<Token> = declaration
        .output
        .0
        .iter()
        .cloned()
        .map(sort_tag_attributes)
        .collect();
    let actual: Vec<Token> = actual_tokens.into_iter().map(sort_tag_attributes).collect();
    assert_eq!(actual, expected, "{}", declaration.description);

    let expected_errors: Vec<&str> = declaration.errors.iter().map(|e| e.code.as_str()).collect();
    let actual_errors: Vec<&str> = actual_errors.iter().map(|e| e.code.as_str()).collect();
    assert_eq!(actual_errors, expected_errors, "{}", declaration.description);
}

/// Attribute order is not part of the tokenizer tests' contract.
fn sort_tag_attributes(token: Token) -> Token {
    match token {
        Token::StartTag(mut tag) => {
            tag.attributes.sort();
            Token::StartTag(tag)
        }
        token => token,
    }
}

fn main() {
    let args = Arguments::from_args();

    let mut tests = Vec::new();
    if let Ok(entries) = glob("tests/html5lib-tests/tokenizer/*.test") {
        for entry in entries.flatten() {
            produce_testcases_from_file(&mut tests, &entry);
        }
    }

    libtest_mimic::run(&args, tests).exit();
}
