//! Scope predicates over the stack of open elements, and the
//! special-element set that terminates "any other end tag" searches.

use crate::dom::{Namespace, QualName};

pub(crate) fn html_default_scope(name: &QualName) -> bool {
    name.ns == Namespace::Html
        && matches!(
            name.local.as_str(),
            "applet"
                | "caption"
                | "html"
                | "table"
                | "td"
                | "th"
                | "marquee"
                | "object"
                | "template"
        )
}

pub(crate) fn default_scope(name: &QualName) -> bool {
    // the MathML terminator set is the text integration points plus
    // annotation-xml, which is not one
    html_default_scope(name)
        || (name.ns == Namespace::MathMl
            && matches!(
                name.local.as_str(),
                "mi" | "mo" | "mn" | "ms" | "mtext" | "annotation-xml"
            ))
        || svg_html_integration_point(name)
}

pub(crate) fn mathml_text_integration_point(name: &QualName) -> bool {
    name.ns == Namespace::MathMl
        && matches!(name.local.as_str(), "mi" | "mo" | "mn" | "ms" | "mtext")
}

pub(crate) fn svg_html_integration_point(name: &QualName) -> bool {
    name.ns == Namespace::Svg
        && matches!(name.local.as_str(), "foreignObject" | "desc" | "title")
}

pub(crate) fn list_item_scope(name: &QualName) -> bool {
    default_scope(name) || (name.ns == Namespace::Html && matches!(name.local.as_str(), "ol" | "ul"))
}

pub(crate) fn button_scope(name: &QualName) -> bool {
    default_scope(name) || name.is_html("button")
}

pub(crate) fn table_scope(name: &QualName) -> bool {
    name.ns == Namespace::Html && matches!(name.local.as_str(), "html" | "table" | "template")
}

pub(crate) fn select_scope(name: &QualName) -> bool {
    !(name.ns == Namespace::Html && matches!(name.local.as_str(), "optgroup" | "option"))
}

/// The "special" category: elements that stop the generic end-tag search
/// and that count as breaking a formatting element run for the adoption
/// agency's furthest block.
pub(crate) fn is_special(name: &QualName) -> bool {
    match name.ns {
        Namespace::Html => matches!(
            name.local.as_str(),
            "address"
                | "applet"
                | "area"
                | "article"
                | "aside"
                | "base"
                | "basefont"
                | "bgsound"
                | "blockquote"
                | "body"
                | "br"
                | "button"
                | "caption"
                | "center"
                | "col"
                | "colgroup"
                | "dd"
                | "details"
                | "dir"
                | "div"
                | "dl"
                | "dt"
                | "embed"
                | "fieldset"
                | "figcaption"
                | "figure"
                | "footer"
                | "form"
                | "frame"
                | "frameset"
                | "h1"
                | "h2"
                | "h3"
                | "h4"
                | "h5"
                | "h6"
                | "head"
                | "header"
                | "hgroup"
                | "hr"
                | "html"
                | "iframe"
                | "img"
                | "input"
                | "keygen"
                | "li"
                | "link"
                | "listing"
                | "main"
                | "marquee"
                | "menu"
                | "meta"
                | "nav"
                | "noembed"
                | "noframes"
                | "noscript"
                | "object"
                | "ol"
                | "p"
                | "param"
                | "plaintext"
                | "pre"
                | "script"
                | "search"
                | "section"
                | "select"
                | "source"
                | "style"
                | "summary"
                | "table"
                | "tbody"
                | "td"
                | "template"
                | "textarea"
                | "tfoot"
                | "th"
                | "thead"
                | "title"
                | "tr"
                | "track"
                | "ul"
                | "wbr"
                | "xmp"
        ),
        Namespace::MathMl => matches!(
            name.local.as_str(),
            "mi" | "mo" | "mn" | "ms" | "mtext" | "annotation-xml"
        ),
        Namespace::Svg => matches!(name.local.as_str(), "foreignObject" | "desc" | "title"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integration_points_are_namespaced() {
        assert!(svg_html_integration_point(&QualName::new(
            Namespace::Svg,
            "foreignObject"
        )));
        assert!(!svg_html_integration_point(&QualName::html("foreignObject")));
        assert!(mathml_text_integration_point(&QualName::new(
            Namespace::MathMl,
            "mi"
        )));
        assert!(!mathml_text_integration_point(&QualName::html("mi")));
    }

    #[test]
    fn button_scope_extends_default_scope() {
        assert!(button_scope(&QualName::html("button")));
        assert!(button_scope(&QualName::html("table")));
        assert!(!button_scope(&QualName::html("div")));
    }

    #[test]
    fn annotation_xml_terminates_scope_but_is_no_integration_point() {
        let name = QualName::new(Namespace::MathMl, "annotation-xml");
        assert!(default_scope(&name));
        assert!(list_item_scope(&name));
        assert!(!mathml_text_integration_point(&name));
    }
}
