//! Property tests: the parser is a total function with the invariants the
//! tree model promises, on arbitrary input.

use gumtree::{parse, Document, NodeData, NodeId, ParseOpts};
use proptest::prelude::*;

fn walk(doc: &Document, id: NodeId, visit: &mut impl FnMut(&Document, NodeId)) {
    visit(doc, id);
    for &child in doc[id].children() {
        walk(doc, child, visit);
    }
    if let NodeData::Element {
        template_contents: Some(contents),
        ..
    } = doc[id].data()
    {
        walk(doc, *contents, visit);
    }
}

proptest! {
    #[test]
    fn parse_is_total(input in ".*") {
        // returns a document for every input, no panic
        let _ = parse(input.as_str(), &ParseOpts::default());
    }

    #[test]
    fn root_is_a_single_html_element(input in ".*") {
        let doc = parse(input.as_str(), &ParseOpts::default());
        let elements: Vec<NodeId> = doc[doc.root()]
            .children()
            .iter()
            .copied()
            .filter(|&id| matches!(doc[id].data(), NodeData::Element { .. }))
            .collect();
        prop_assert_eq!(elements.len(), 1);
        match doc[elements[0]].data() {
            NodeData::Element { name, .. } => {
                prop_assert_eq!(name.local.as_str(), "html");
                prop_assert_eq!(name.ns.url(), "http://www.w3.org/1999/xhtml");
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn attributes_are_unique(input in ".*") {
        let doc = parse(input.as_str(), &ParseOpts::default());
        let mut ok = true;
        walk(&doc, doc.root(), &mut |doc, id| {
            if let NodeData::Element { attrs, .. } = doc[id].data() {
                for (i, a) in attrs.iter().enumerate() {
                    for b in &attrs[i + 1..] {
                        if a.name.ns == b.name.ns && a.name.local == b.name.local {
                            ok = false;
                        }
                    }
                }
            }
        });
        prop_assert!(ok);
    }

    #[test]
    fn no_adjacent_text_children(input in ".*") {
        let doc = parse(input.as_str(), &ParseOpts::default());
        let mut ok = true;
        walk(&doc, doc.root(), &mut |doc, id| {
            let children = doc[id].children();
            for pair in children.windows(2) {
                if matches!(doc[pair[0]].data(), NodeData::Text { .. })
                    && matches!(doc[pair[1]].data(), NodeData::Text { .. })
                {
                    ok = false;
                }
            }
        });
        prop_assert!(ok);
    }

    #[test]
    fn errors_are_ordered(input in ".*") {
        let doc = parse(input.as_str(), &ParseOpts::default());
        let positions: Vec<_> = doc.errors.iter().map(|e| e.position).collect();
        prop_assert!(positions.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn newline_conventions_are_equivalent(input in "[a-z<>/&#; \n]*") {
        let unix = parse(input.as_str(), &ParseOpts::default());
        let with_crlf = input.replace('\n', "\r\n");
        let dos = parse(with_crlf.as_str(), &ParseOpts::default());
        let with_cr = input.replace('\n', "\r");
        let mac = parse(with_cr.as_str(), &ParseOpts::default());
        prop_assert_eq!(dump(&unix), dump(&dos));
        prop_assert_eq!(dump(&unix), dump(&mac));
    }
}

fn dump(doc: &Document) -> String {
    let mut out = String::new();
    fn node(doc: &Document, id: NodeId, out: &mut String) {
        match doc[id].data() {
            NodeData::Document => out.push_str("#document"),
            NodeData::Fragment => out.push_str("#fragment"),
            NodeData::Doctype { name, .. } => {
                out.push_str("!");
                out.push_str(name);
            }
            NodeData::Text { contents } => {
                out.push_str("\"");
                out.push_str(contents);
                out.push_str("\"");
            }
            NodeData::Comment { contents } => {
                out.push_str("<!--");
                out.push_str(contents);
                out.push_str("-->");
            }
            NodeData::Element { name, .. } => {
                out.push_str("<");
                out.push_str(&name.local);
                out.push_str(">");
            }
        }
        out.push('(');
        for &child in doc[id].children() {
            node(doc, child, out);
        }
        out.push(')');
    }
    node(doc, doc.root(), &mut out);
    out
}
