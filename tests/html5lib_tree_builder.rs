//! Runs the html5lib-tests tree-construction fixtures, when a checkout is
//! present at tests/html5lib-tests. Without the fixtures this harness is
//! a no-op.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use glob::glob;
use libtest_mimic::{Arguments, Trial};
use pretty_assertions::assert_eq;

use gumtree::{parse, parse_fragment, Namespace, ParseOpts, QualName};

mod testutils;

#[derive(Default, Debug, Clone)]
struct Testcase {
    data: String,
    errors: Option<String>,
    new_errors: Option<String>,
    document_fragment: Option<String>,
    script_off: Option<String>,
    script_on: Option<String>,
    document: Option<String>,
}

impl Testcase {
    fn parse(path: &Path, iter: &mut impl Iterator<Item = std::io::Result<Vec<u8>>>) -> Option<Self> {
        let mut rv = Testcase::default();
        let mut current_field: Option<&mut String> = Some(&mut rv.data);
        let mut has_errors = false;

        for line in iter {
            let line = String::from_utf8(line.unwrap()).unwrap();

            match line.as_str() {
                "#data" => {
                    if let Some(ref mut field) = current_field {
                        if field.ends_with("\n\n") {
                            field.pop();
                        }

                        if has_errors {
                            return Some(rv);
                        }
                    }
                }
                "#errors" => {
                    current_field = Some(rv.errors.get_or_insert_with(Default::default));
                    has_errors = true;
                }
                "#new-errors" => {
                    current_field = Some(rv.new_errors.get_or_insert_with(Default::default))
                }
                "#document-fragment" => {
                    current_field = Some(rv.document_fragment.get_or_insert_with(Default::default))
                }
                "#script-on" => {
                    current_field = Some(rv.script_on.get_or_insert_with(Default::default))
                }
                "#script-off" => {
                    current_field = Some(rv.script_off.get_or_insert_with(Default::default))
                }
                "#document" => {
                    current_field = Some(rv.document.get_or_insert_with(Default::default))
                }
                x => match current_field {
                    Some(ref mut current_field) => {
                        current_field.push_str(x);
                        current_field.push('\n');
                    }
                    None => {
                        panic!("{:?}: unexpected line: {:?}", path, x);
                    }
                },
            }
        }

        if rv.document.is_some() {
            Some(rv)
        } else {
            None
        }
    }
}

fn fragment_context(spec: &str) -> QualName {
    let spec = spec.trim();
    match spec.split_once(' ') {
        Some(("svg", local)) => QualName::new(Namespace::Svg, local),
        Some(("math", local)) => QualName::new(Namespace::MathMl, local),
        _ => QualName::html(spec),
    }
}

fn produce_testcases_from_file(tests: &mut Vec<Trial>, path: &Path) {
    let fname = path.file_name().unwrap().to_str().unwrap().to_owned();

    let mut lines_iter = BufReader::new(File::open(path).unwrap()).split(b'\n');

    let mut i = 0;

    while let Some(testcase) = Testcase::parse(path, &mut lines_iter) {
        i += 1;

        // if script-on/off is not provided, the test may run either way
        if testcase.script_on.is_none() {
            tests.push(build_test(testcase.clone(), &fname, i, false));
        }

        if testcase.script_off.is_none() {
            tests.push(build_test(testcase, &fname, i, true));
        }
    }
}

fn build_test(testcase: Testcase, fname: &str, i: usize, scripting: bool) -> Trial {
    let scripting_text = if scripting { "script-on" } else { "script-off" };
    Trial::test(format!("{}:{}:{}", fname, i, scripting_text), move || {
        let mut opts = ParseOpts::default();
        opts.scripting_enabled = scripting;

        let input = testcase.data.trim_end_matches('\n');

        let document = match testcase.document_fragment {
            Some(ref context) => parse_fragment(input, fragment_context(context), &opts),
            None => parse(input, &opts),
        };

        let actual = testutils::dump_document(&document);
        assert_eq!(actual, testcase.document.clone().unwrap());
        Ok(())
    })
}

fn main() {
    let args = Arguments::from_args();
    let mut tests = Vec::new();

    if let Ok(entries) = glob("tests/html5lib-tests/tree-construction/*.dat") {
        for entry in entries.flatten() {
            produce_testcases_from_file(&mut tests, &entry);
        }
    }

    libtest_mimic::run(&args, tests).exit();
}
