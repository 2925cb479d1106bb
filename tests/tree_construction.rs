//! End-to-end tree construction scenarios: literal inputs against
//! html5lib-format tree dumps.

use gumtree::{
    parse, parse_fragment, Error, Namespace, NodeData, ParseOpts, QualName, QuirksMode,
};
use pretty_assertions::assert_eq;

mod testutils;

fn dump(input: &str) -> String {
    testutils::dump_document(&parse(input, &ParseOpts::default()))
}

fn error_codes(input: &str) -> Vec<Error> {
    parse(input, &ParseOpts::default())
        .errors
        .iter()
        .map(|e| e.code)
        .collect()
}

#[test]
fn minimal_well_formed_document() {
    let doc = parse(
        "<!DOCTYPE html><html><body><p>hi</p></body></html>",
        &ParseOpts::default(),
    );
    assert_eq!(
        testutils::dump_document(&doc),
        "| <!DOCTYPE html>\n\
         | <html>\n\
         |   <head>\n\
         |   <body>\n\
         |     <p>\n\
         |       \"hi\"\n"
    );
    assert_eq!(doc.errors, vec![]);
    assert_eq!(doc.quirks_mode, QuirksMode::NoQuirks);
}

#[test]
fn implied_head_and_body() {
    let doc = parse("<p>hi</p>", &ParseOpts::default());
    assert_eq!(
        testutils::dump_document(&doc),
        "| <html>\n\
         |   <head>\n\
         |   <body>\n\
         |     <p>\n\
         |       \"hi\"\n"
    );
    assert!(doc
        .errors
        .iter()
        .any(|e| e.code == Error::ExpectedDoctypeButGotStartTag));
    assert_eq!(doc.quirks_mode, QuirksMode::Quirks);
}

#[test]
fn adoption_agency_reconstructs_formatting() {
    assert_eq!(
        dump("<!DOCTYPE html><p>1<b>2<i>3</b>4</i>5</p>"),
        "| <!DOCTYPE html>\n\
         | <html>\n\
         |   <head>\n\
         |   <body>\n\
         |     <p>\n\
         |       \"1\"\n\
         |       <b>\n\
         |         \"2\"\n\
         |         <i>\n\
         |           \"3\"\n\
         |       <i>\n\
         |         \"4\"\n\
         |       \"5\"\n"
    );
}

#[test]
fn adoption_agency_misnested_b_p() {
    // the classic <b><p></b> case: b gets split around the block
    assert_eq!(
        dump("<!DOCTYPE html><b>1<p>2</b>3</p>"),
        "| <!DOCTYPE html>\n\
         | <html>\n\
         |   <head>\n\
         |   <body>\n\
         |     <b>\n\
         |       \"1\"\n\
         |     <p>\n\
         |       <b>\n\
         |         \"2\"\n\
         |       \"3\"\n"
    );
}

#[test]
fn foster_parenting_moves_text_before_table() {
    assert_eq!(
        dump("<!DOCTYPE html><table>abc<tr><td>x</table>"),
        "| <!DOCTYPE html>\n\
         | <html>\n\
         |   <head>\n\
         |   <body>\n\
         |     \"abc\"\n\
         |     <table>\n\
         |       <tbody>\n\
         |         <tr>\n\
         |           <td>\n\
         |             \"x\"\n"
    );
}

#[test]
fn whitespace_stays_inside_the_table() {
    assert_eq!(
        dump("<!DOCTYPE html><table> <tr><td>x</td></tr></table>"),
        "| <!DOCTYPE html>\n\
         | <html>\n\
         |   <head>\n\
         |   <body>\n\
         |     <table>\n\
         |       \" \"\n\
         |       <tbody>\n\
         |         <tr>\n\
         |           <td>\n\
         |             \"x\"\n"
    );
}

#[test]
fn svg_keeps_its_case_and_namespace() {
    assert_eq!(
        dump("<!DOCTYPE html><svg><g><foreignObject><p>hi</p></foreignObject></g></svg>"),
        "| <!DOCTYPE html>\n\
         | <html>\n\
         |   <head>\n\
         |   <body>\n\
         |     <svg svg>\n\
         |       <svg g>\n\
         |         <svg foreignObject>\n\
         |           <p>\n\
         |             \"hi\"\n"
    );
}

#[test]
fn svg_attributes_are_case_adjusted() {
    assert_eq!(
        dump("<!DOCTYPE html><svg viewbox=\"0 0 1 1\"><image xlink:href=\"#a\"/></svg>"),
        "| <!DOCTYPE html>\n\
         | <html>\n\
         |   <head>\n\
         |   <body>\n\
         |     <svg svg>\n\
         |       viewBox=\"0 0 1 1\"\n\
         |       <svg image>\n\
         |         xlink href=\"#a\"\n"
    );
}

#[test]
fn mathml_closes_cleanly_before_html_block() {
    assert_eq!(
        dump("<!DOCTYPE html><math><mi>x</mi></math><div>y</div>"),
        "| <!DOCTYPE html>\n\
         | <html>\n\
         |   <head>\n\
         |   <body>\n\
         |     <math math>\n\
         |       <math mi>\n\
         |         \"x\"\n\
         |     <div>\n\
         |       \"y\"\n"
    );
}

#[test]
fn template_children_go_into_contents() {
    assert_eq!(
        dump("<!DOCTYPE html><template><p>x</p></template>"),
        "| <!DOCTYPE html>\n\
         | <html>\n\
         |   <head>\n\
         |     <template>\n\
         |       content\n\
         |         <p>\n\
         |           \"x\"\n\
         |   <body>\n"
    );
}

#[test]
fn quirks_modes_from_legacy_doctypes() {
    let doc = parse(
        "<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 3.2 Final//EN\"><p>x",
        &ParseOpts::default(),
    );
    assert_eq!(doc.quirks_mode, QuirksMode::Quirks);

    let doc = parse(
        "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Transitional//EN\" \
         \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd\"><p>x",
        &ParseOpts::default(),
    );
    assert_eq!(doc.quirks_mode, QuirksMode::LimitedQuirks);
}

#[test]
fn quirks_mode_changes_p_table_nesting() {
    // in quirks mode <table> does not close an open <p>
    let quirky = dump("<p><table><td>x</table>");
    assert!(quirky.contains(
        "|     <p>\n\
         |       <table>\n"
    ));

    let standards = dump("<!DOCTYPE html><p><table><td>x</table>");
    assert!(standards.contains(
        "|     <p>\n\
         |     <table>\n"
    ));
}

#[test]
fn optional_tags_do_not_change_the_tree() {
    let implicit = parse("<p>hi</p>", &ParseOpts::default());
    let explicit = parse(
        "<html><head></head><body><p>hi</p></body></html>",
        &ParseOpts::default(),
    );
    assert_eq!(
        testutils::dump_document(&implicit),
        testutils::dump_document(&explicit)
    );
}

#[test]
fn newline_conventions_are_equivalent() {
    let unix = dump("<!DOCTYPE html><pre>a\nb</pre>");
    let dos = dump("<!DOCTYPE html><pre>a\r\nb</pre>");
    let mac = dump("<!DOCTYPE html><pre>a\rb</pre>");
    assert_eq!(unix, dos);
    assert_eq!(unix, mac);
}

#[test]
fn newline_after_pre_is_dropped() {
    assert_eq!(
        dump("<!DOCTYPE html><pre>\nkeep</pre>"),
        "| <!DOCTYPE html>\n\
         | <html>\n\
         |   <head>\n\
         |   <body>\n\
         |     <pre>\n\
         |       \"keep\"\n"
    );
}

#[test]
fn end_br_is_treated_as_start_br() {
    let doc = parse("<!DOCTYPE html></br>", &ParseOpts::default());
    assert_eq!(
        testutils::dump_document(&doc),
        "| <!DOCTYPE html>\n\
         | <html>\n\
         |   <head>\n\
         |   <body>\n\
         |     <br>\n"
    );
    assert!(doc.errors.iter().any(|e| e.code == Error::UnexpectedEndTag));
}

#[test]
fn noscript_parsing_depends_on_scripting_flag() {
    let mut opts = ParseOpts::default();
    opts.scripting_enabled = true;
    let scripted = parse("<!DOCTYPE html><noscript><p>x</p></noscript>", &opts);
    // with scripting on, noscript content is raw text
    assert!(testutils::dump_document(&scripted).contains("\"<p>x</p>\""));

    opts.scripting_enabled = false;
    let unscripted = parse("<!DOCTYPE html><noscript><p>x</p></noscript>", &opts);
    assert!(testutils::dump_document(&unscripted).contains("<p>"));
}

#[test]
fn fragment_in_tr_context() {
    let frag = parse_fragment("<td>a</td><td>b</td>", QualName::html("tr"), &ParseOpts::default());
    assert_eq!(
        testutils::dump_document(&frag),
        "| <td>\n\
         |   \"a\"\n\
         | <td>\n\
         |   \"b\"\n"
    );
}

#[test]
fn fragment_in_title_context_is_rcdata() {
    let frag = parse_fragment("<b>x</b>&amp;", QualName::html("title"), &ParseOpts::default());
    assert_eq!(testutils::dump_document(&frag), "| \"<b>x</b>&\"\n");
}

#[test]
fn fragment_in_svg_context() {
    let frag = parse_fragment(
        "<circle r=\"1\"/>",
        QualName::new(Namespace::Svg, "svg"),
        &ParseOpts::default(),
    );
    assert_eq!(
        testutils::dump_document(&frag),
        "| <svg circle>\n\
         |   r=\"1\"\n"
    );
}

#[test]
fn document_root_is_single_html_element() {
    for input in &["", "x", "</html>", "<!-- c -->", "<td>", "\u{0}"] {
        let doc = parse(*input, &ParseOpts::default());
        let elements: Vec<_> = doc[doc.root()]
            .children()
            .iter()
            .filter(|&&id| matches!(doc[id].data(), NodeData::Element { .. }))
            .collect();
        assert_eq!(elements.len(), 1, "input: {:?}", input);
    }
}

#[test]
fn eof_in_unclosed_elements_is_reported() {
    assert!(error_codes("<!DOCTYPE html><div>").contains(&Error::EofWithUnclosedElements));
    assert!(!error_codes("<!DOCTYPE html><p>").contains(&Error::EofWithUnclosedElements));
}

#[test]
fn unacknowledged_self_closing_flag_is_reported() {
    assert!(error_codes("<!DOCTYPE html><div/>x</div>")
        .contains(&Error::NonVoidHtmlElementStartTagWithTrailingSolidus));
    assert!(!error_codes("<!DOCTYPE html><br/>")
        .contains(&Error::NonVoidHtmlElementStartTagWithTrailingSolidus));
}

#[test]
fn errors_are_ordered_by_position() {
    let doc = parse("<p x=1 x=2>&bogus;<b></p></b>", &ParseOpts::default());
    let positions: Vec<_> = doc.errors.iter().map(|e| e.position).collect();
    let mut sorted = positions.clone();
    sorted.sort();
    assert_eq!(positions, sorted);
}

#[test]
fn comments_land_where_they_appear() {
    assert_eq!(
        dump("<!-- pre --><!DOCTYPE html><html><head><!-- in-head --></head><body><p>x</p><!-- post --></body></html>"),
        "| <!--  pre  -->\n\
         | <!DOCTYPE html>\n\
         | <html>\n\
         |   <head>\n\
         |     <!--  in-head  -->\n\
         |   <body>\n\
         |     <p>\n\
         |       \"x\"\n\
         |     <!--  post  -->\n"
    );
}

#[test]
fn select_in_table_recovers() {
    assert_eq!(
        dump("<!DOCTYPE html><table><tr><td><select><td>y</table>"),
        "| <!DOCTYPE html>\n\
         | <html>\n\
         |   <head>\n\
         |   <body>\n\
         |     <table>\n\
         |       <tbody>\n\
         |         <tr>\n\
         |           <td>\n\
         |             <select>\n\
         |           <td>\n\
         |             \"y\"\n"
    );
}

#[test]
fn frameset_replaces_body_when_ok() {
    assert_eq!(
        dump("<!DOCTYPE html><frameset><frame></frameset>"),
        "| <!DOCTYPE html>\n\
         | <html>\n\
         |   <head>\n\
         |   <frameset>\n\
         |     <frame>\n"
    );
}
