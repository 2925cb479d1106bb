//! Shared helpers for the integration tests: the html5lib tree-dump
//! format over the arena document.

use gumtree::{Document, Namespace, NodeData, NodeId};

/// Serialize a parsed document (or fragment) in the html5lib-tests
/// tree-construction dump format.
pub fn dump_document(doc: &Document) -> String {
    let mut buf = String::new();
    for &child in doc[doc.root()].children() {
        serialize(doc, &mut buf, 1, child);
    }
    buf
}

fn indent_line(buf: &mut String, indent: usize) {
    buf.push('|');
    for _ in 0..indent {
        buf.push(' ');
    }
}

fn serialize(doc: &Document, buf: &mut String, indent: usize, id: NodeId) {
    let node = &doc[id];
    match node.data() {
        NodeData::Document | NodeData::Fragment => panic!("should not reach a root node"),

        NodeData::Doctype {
            name,
            public_id,
            system_id,
        } => {
            indent_line(buf, indent);
            buf.push_str("<!DOCTYPE ");
            buf.push_str(name);
            if public_id.is_some() || system_id.is_some() {
                buf.push_str(&format!(
                    " \"{}\" \"{}\"",
                    public_id.as_deref().unwrap_or(""),
                    system_id.as_deref().unwrap_or("")
                ));
            }
            buf.push_str(">\n");
        }

        NodeData::Text { contents } => {
            indent_line(buf, indent);
            buf.push('"');
            buf.push_str(contents);
            buf.push_str("\"\n");
        }

        NodeData::Comment { contents } => {
            indent_line(buf, indent);
            buf.push_str("<!-- ");
            buf.push_str(contents);
            buf.push_str(" -->\n");
        }

        NodeData::Element { name, attrs, .. } => {
            indent_line(buf, indent);
            buf.push('<');
            match name.ns {
                Namespace::Svg => buf.push_str("svg "),
                Namespace::MathMl => buf.push_str("math "),
                _ => (),
            }
            buf.push_str(&name.local);
            buf.push_str(">\n");

            let mut attrs: Vec<_> = attrs.iter().collect();
            attrs.sort_by(|x, y| x.name.local.cmp(&y.name.local));

            for attr in attrs {
                indent_line(buf, indent + 2);
                match attr.name.ns {
                    Namespace::XLink => buf.push_str("xlink "),
                    Namespace::Xml => buf.push_str("xml "),
                    Namespace::XmlNs => buf.push_str("xmlns "),
                    _ => (),
                }
                buf.push_str(&format!("{}=\"{}\"\n", attr.name.local, attr.value));
            }
        }
    }

    for &child in node.children().iter() {
        serialize(doc, buf, indent + 2, child);
    }

    if let NodeData::Element {
        template_contents: Some(contents),
        ..
    } = node.data()
    {
        indent_line(buf, indent + 2);
        buf.push_str("content\n");
        for &child in doc[*contents].children().iter() {
            serialize(doc, buf, indent + 4, child);
        }
    }
}
