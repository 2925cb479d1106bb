//! Quirks-mode classification from the doctype, per the fixed prefix
//! tables in the "initial" insertion mode.

use crate::dom::QuirksMode;
use crate::emitter::Doctype;

fn starts_with_ignore_ascii_case(haystack: &str, prefix: &str) -> bool {
    haystack
        .get(..prefix.len())
        .map_or(false, |h| h.eq_ignore_ascii_case(prefix))
}

const QUIRKY_PUBLIC_PREFIXES: &[&str] = &[
    "+//Silmaril//dtd html Pro v0r11 19970101//",
    "-//AS//DTD HTML 3.0 asWedit + extensions//",
    "-//AdvaSoft Ltd//DTD HTML 3.0 asWedit + extensions//",
    "-//IETF//DTD HTML 2.0 Level 1//",
    "-//IETF//DTD HTML 2.0 Level 2//",
    "-//IETF//DTD HTML 2.0 Strict Level 1//",
    "-//IETF//DTD HTML 2.0 Strict Level 2//",
    "-//IETF//DTD HTML 2.0 Strict//",
    "-//IETF//DTD HTML 2.0//",
    "-//IETF//DTD HTML 2.1E//",
    "-//IETF//DTD HTML 3.0//",
    "-//IETF//DTD HTML 3.2 Final//",
    "-//IETF//DTD HTML 3.2//",
    "-//IETF//DTD HTML 3//",
    "-//IETF//DTD HTML Level 0//",
    "-//IETF//DTD HTML Level 1//",
    "-//IETF//DTD HTML Level 2//",
    "-//IETF//DTD HTML Level 3//",
    "-//IETF//DTD HTML Strict Level 0//",
    "-//IETF//DTD HTML Strict Level 1//",
    "-//IETF//DTD HTML Strict Level 2//",
    "-//IETF//DTD HTML Strict Level 3//",
    "-//IETF//DTD HTML Strict//",
    "-//IETF//DTD HTML//",
    "-//Metrius//DTD Metrius Presentational//",
    "-//Microsoft//DTD Internet Explorer 2.0 HTML Strict//",
    "-//Microsoft//DTD Internet Explorer 2.0 HTML//",
    "-//Microsoft//DTD Internet Explorer 2.0 Tables//",
    "-//Microsoft//DTD Internet Explorer 3.0 HTML Strict//",
    "-//Microsoft//DTD Internet Explorer 3.0 HTML//",
    "-//Microsoft//DTD Internet Explorer 3.0 Tables//",
    "-//Netscape Comm. Corp.//DTD HTML//",
    "-//Netscape Comm. Corp.//DTD Strict HTML//",
    "-//O'Reilly and Associates//DTD HTML 2.0//",
    "-//O'Reilly and Associates//DTD HTML Extended 1.0//",
    "-//O'Reilly and Associates//DTD HTML Extended Relaxed 1.0//",
    "-//SQ//DTD HTML 2.0 HoTMetaL + extensions//",
    "-//SoftQuad Software//DTD HoTMetaL PRO 6.0::19990601::extensions to HTML 4.0//",
    "-//SoftQuad//DTD HoTMetaL PRO 4.0::19971010::extensions to HTML 4.0//",
    "-//Spyglass//DTD HTML 2.0 Extended//",
    "-//Sun Microsystems Corp.//DTD HotJava HTML//",
    "-//Sun Microsystems Corp.//DTD HotJava Strict HTML//",
    "-//W3C//DTD HTML 3 1995-03-24//",
    "-//W3C//DTD HTML 3.2 Draft//",
    "-//W3C//DTD HTML 3.2 Final//",
    "-//W3C//DTD HTML 3.2//",
    "-//W3C//DTD HTML 3.2S Draft//",
    "-//W3C//DTD HTML 4.0 Frameset//",
    "-//W3C//DTD HTML 4.0 Transitional//",
    "-//W3C//DTD HTML Experimental 19960712//",
    "-//W3C//DTD HTML Experimental 970421//",
    "-//W3C//DTD W3 HTML//",
    "-//W3O//DTD W3 HTML 3.0//",
    "-//WebTechs//DTD Mozilla HTML 2.0//",
    "-//WebTechs//DTD Mozilla HTML//",
];

const QUIRKY_PUBLIC_MATCHES: &[&str] = &[
    "-//W3O//DTD W3 HTML Strict 3.0//EN//",
    "-/W3C/DTD HTML 4.0 Transitional/EN",
    "HTML",
];

/// Whether the doctype is one of the conforming forms; anything else is an
/// `unknown-doctype` parse error (but may still be no-quirks).
pub(crate) fn is_conforming(doctype: &Doctype) -> bool {
    doctype.name.as_deref() == Some("html")
        && doctype.public_identifier.is_none()
        && matches!(
            doctype.system_identifier.as_deref(),
            None | Some("about:legacy-compat")
        )
}

/// The quirks mode a doctype selects. `iframe_srcdoc` documents are never
/// switched out of no-quirks.
pub(crate) fn quirks_mode(doctype: &Doctype, iframe_srcdoc: bool) -> QuirksMode {
    if iframe_srcdoc {
        return QuirksMode::NoQuirks;
    }

    let public = doctype.public_identifier.as_deref();
    let system = doctype.system_identifier.as_deref();
    let public_str = public.unwrap_or("");

    let quirky = doctype.force_quirks
        || !matches!(doctype.name.as_deref(), Some(name) if name.eq_ignore_ascii_case("html"))
        || QUIRKY_PUBLIC_MATCHES
            .iter()
            .any(|m| public_str.eq_ignore_ascii_case(m))
        || matches!(system, Some(s) if s.eq_ignore_ascii_case(
            "http://www.ibm.com/data/dtd/v11/ibmxhtml1-transitional.dtd"
        ))
        || QUIRKY_PUBLIC_PREFIXES
            .iter()
            .any(|p| starts_with_ignore_ascii_case(public_str, p))
        || (system.is_none()
            && (starts_with_ignore_ascii_case(public_str, "-//W3C//DTD HTML 4.01 Frameset//")
                || starts_with_ignore_ascii_case(
                    public_str,
                    "-//W3C//DTD HTML 4.01 Transitional//",
                )));

    if quirky {
        return QuirksMode::Quirks;
    }

    let limited = starts_with_ignore_ascii_case(public_str, "-//W3C//DTD XHTML 1.0 Frameset//")
        || starts_with_ignore_ascii_case(public_str, "-//W3C//DTD XHTML 1.0 Transitional//")
        || (system.is_some()
            && (starts_with_ignore_ascii_case(public_str, "-//W3C//DTD HTML 4.01 Frameset//")
                || starts_with_ignore_ascii_case(
                    public_str,
                    "-//W3C//DTD HTML 4.01 Transitional//",
                )));

    if limited {
        QuirksMode::LimitedQuirks
    } else {
        QuirksMode::NoQuirks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctype(name: &str, public: Option<&str>, system: Option<&str>) -> Doctype {
        Doctype {
            name: Some(name.to_owned()),
            public_identifier: public.map(str::to_owned),
            system_identifier: system.map(str::to_owned),
            force_quirks: false,
        }
    }

    #[test]
    fn modern_doctype_is_no_quirks() {
        let d = doctype("html", None, None);
        assert!(is_conforming(&d));
        assert_eq!(quirks_mode(&d, false), QuirksMode::NoQuirks);
    }

    #[test]
    fn html32_is_quirks() {
        let d = doctype("html", Some("-//W3C//DTD HTML 3.2 Final//EN"), None);
        assert!(!is_conforming(&d));
        assert_eq!(quirks_mode(&d, false), QuirksMode::Quirks);
    }

    #[test]
    fn html401_transitional_with_system_is_limited_quirks() {
        let d = doctype(
            "html",
            Some("-//W3C//DTD HTML 4.01 Transitional//EN"),
            Some("http://www.w3.org/TR/html4/loose.dtd"),
        );
        assert_eq!(quirks_mode(&d, false), QuirksMode::LimitedQuirks);
    }

    #[test]
    fn html401_transitional_without_system_is_quirks() {
        let d = doctype("html", Some("-//W3C//DTD HTML 4.01 Transitional//EN"), None);
        assert_eq!(quirks_mode(&d, false), QuirksMode::Quirks);
    }

    #[test]
    fn srcdoc_documents_stay_no_quirks() {
        let d = doctype("html", Some("HTML"), None);
        assert_eq!(quirks_mode(&d, true), QuirksMode::NoQuirks);
    }
}
