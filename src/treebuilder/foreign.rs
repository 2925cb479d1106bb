//! The fixed case- and namespace-adjustment tables for foreign (SVG and
//! MathML) content, and the set of start tags that break out of it.

use crate::dom::{Attribute, Namespace, QualName};
use crate::emitter::StartTag;

/// SVG element names are matched lowercased but created with their
/// canonical camelCase form.
pub(crate) fn adjust_svg_tag_name(name: &str) -> &str {
    match name {
        "altglyph" => "altGlyph",
        "altglyphdef" => "altGlyphDef",
        "altglyphitem" => "altGlyphItem",
        "animatecolor" => "animateColor",
        "animatemotion" => "animateMotion",
        "animatetransform" => "animateTransform",
        "clippath" => "clipPath",
        "feblend" => "feBlend",
        "fecolormatrix" => "feColorMatrix",
        "fecomponenttransfer" => "feComponentTransfer",
        "fecomposite" => "feComposite",
        "feconvolvematrix" => "feConvolveMatrix",
        "fediffuselighting" => "feDiffuseLighting",
        "fedisplacementmap" => "feDisplacementMap",
        "fedistantlight" => "feDistantLight",
        "fedropshadow" => "feDropShadow",
        "feflood" => "feFlood",
        "fefunca" => "feFuncA",
        "fefuncb" => "feFuncB",
        "fefuncg" => "feFuncG",
        "fefuncr" => "feFuncR",
        "fegaussianblur" => "feGaussianBlur",
        "feimage" => "feImage",
        "femerge" => "feMerge",
        "femergenode" => "feMergeNode",
        "femorphology" => "feMorphology",
        "feoffset" => "feOffset",
        "fepointlight" => "fePointLight",
        "fespecularlighting" => "feSpecularLighting",
        "fespotlight" => "feSpotLight",
        "fetile" => "feTile",
        "feturbulence" => "feTurbulence",
        "foreignobject" => "foreignObject",
        "glyphref" => "glyphRef",
        "lineargradient" => "linearGradient",
        "radialgradient" => "radialGradient",
        "textpath" => "textPath",
        other => other,
    }
}

fn adjust_svg_attribute_name(name: &str) -> &str {
    match name {
        "attributename" => "attributeName",
        "attributetype" => "attributeType",
        "basefrequency" => "baseFrequency",
        "baseprofile" => "baseProfile",
        "calcmode" => "calcMode",
        "clippathunits" => "clipPathUnits",
        "diffuseconstant" => "diffuseConstant",
        "edgemode" => "edgeMode",
        "filterunits" => "filterUnits",
        "glyphref" => "glyphRef",
        "gradienttransform" => "gradientTransform",
        "gradientunits" => "gradientUnits",
        "kernelmatrix" => "kernelMatrix",
        "kernelunitlength" => "kernelUnitLength",
        "keypoints" => "keyPoints",
        "keysplines" => "keySplines",
        "keytimes" => "keyTimes",
        "lengthadjust" => "lengthAdjust",
        "limitingconeangle" => "limitingConeAngle",
        "markerheight" => "markerHeight",
        "markerunits" => "markerUnits",
        "markerwidth" => "markerWidth",
        "maskcontentunits" => "maskContentUnits",
        "maskunits" => "maskUnits",
        "numoctaves" => "numOctaves",
        "pathlength" => "pathLength",
        "patterncontentunits" => "patternContentUnits",
        "patterntransform" => "patternTransform",
        "patternunits" => "patternUnits",
        "pointsatx" => "pointsAtX",
        "pointsaty" => "pointsAtY",
        "pointsatz" => "pointsAtZ",
        "preservealpha" => "preserveAlpha",
        "preserveaspectratio" => "preserveAspectRatio",
        "primitiveunits" => "primitiveUnits",
        "refx" => "refX",
        "refy" => "refY",
        "repeatcount" => "repeatCount",
        "repeatdur" => "repeatDur",
        "requiredextensions" => "requiredExtensions",
        "requiredfeatures" => "requiredFeatures",
        "specularconstant" => "specularConstant",
        "specularexponent" => "specularExponent",
        "spreadmethod" => "spreadMethod",
        "startoffset" => "startOffset",
        "stddeviation" => "stdDeviation",
        "stitchtiles" => "stitchTiles",
        "surfacescale" => "surfaceScale",
        "systemlanguage" => "systemLanguage",
        "tablevalues" => "tableValues",
        "targetx" => "targetX",
        "targety" => "targetY",
        "textlength" => "textLength",
        "viewbox" => "viewBox",
        "viewtarget" => "viewTarget",
        "xchannelselector" => "xChannelSelector",
        "ychannelselector" => "yChannelSelector",
        "zoomandpan" => "zoomAndPan",
        other => other,
    }
}

/// The "adjust foreign attributes" table: namespaced attributes keep their
/// prefix and get a real namespace.
fn adjust_foreign_attribute(name: &str) -> Option<QualName> {
    let (prefix, ns, local) = match name {
        "xlink:actuate" | "xlink:arcrole" | "xlink:href" | "xlink:role" | "xlink:show"
        | "xlink:title" | "xlink:type" => {
            ("xlink", Namespace::XLink, &name["xlink:".len()..])
        }
        "xml:lang" | "xml:space" => ("xml", Namespace::Xml, &name["xml:".len()..]),
        "xmlns" => {
            return Some(QualName {
                prefix: None,
                ns: Namespace::XmlNs,
                local: "xmlns".to_owned(),
            })
        }
        "xmlns:xlink" => ("xmlns", Namespace::XmlNs, "xlink"),
        _ => return None,
    };
    Some(QualName {
        prefix: Some(prefix.to_owned()),
        ns,
        local: local.to_owned(),
    })
}

/// Convert a token's attributes into element attributes for the given
/// element namespace, applying the MathML, SVG and foreign adjustment
/// tables.
pub(crate) fn adjust_attributes(ns: Namespace, tag: &StartTag) -> Vec<Attribute> {
    tag.attributes
        .iter()
        .map(|(name, value)| {
            let qual = match ns {
                Namespace::MathMl | Namespace::Svg => {
                    if let Some(qual) = adjust_foreign_attribute(name) {
                        qual
                    } else {
                        let local = match ns {
                            Namespace::MathMl if name == "definitionurl" => {
                                "definitionURL".to_owned()
                            }
                            Namespace::Svg => adjust_svg_attribute_name(name).to_owned(),
                            _ => name.clone(),
                        };
                        QualName {
                            prefix: None,
                            ns: Namespace::None,
                            local,
                        }
                    }
                }
                _ => QualName {
                    prefix: None,
                    ns: Namespace::None,
                    local: name.clone(),
                },
            };
            Attribute {
                name: qual,
                value: value.clone(),
            }
        })
        .collect()
}

/// Start tags that end foreign content and get reprocessed as HTML.
/// `<font>` only counts when it carries one of the presentational
/// attributes.
pub(crate) fn is_breakout_tag(tag: &StartTag) -> bool {
    match tag.name.as_str() {
        "b" | "big" | "blockquote" | "body" | "br" | "center" | "code" | "dd" | "div" | "dl"
        | "dt" | "em" | "embed" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "head" | "hr"
        | "i" | "img" | "li" | "listing" | "menu" | "meta" | "nobr" | "ol" | "p" | "pre"
        | "ruby" | "s" | "small" | "span" | "strong" | "strike" | "sub" | "sup" | "table"
        | "tt" | "u" | "ul" | "var" => true,
        "font" => tag
            .attributes
            .iter()
            .any(|(name, _)| matches!(name.as_str(), "color" | "face" | "size")),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn svg_camel_case_restored() {
        assert_eq!(adjust_svg_tag_name("foreignobject"), "foreignObject");
        assert_eq!(adjust_svg_tag_name("glyphref"), "glyphRef");
        assert_eq!(adjust_svg_tag_name("circle"), "circle");
    }

    #[test]
    fn xlink_href_gets_namespace_and_prefix() {
        let mut tag = StartTag::default();
        tag.name = "image".to_owned();
        tag.attributes
            .push(("xlink:href".to_owned(), "#x".to_owned()));
        let attrs = adjust_attributes(Namespace::Svg, &tag);
        assert_eq!(attrs[0].name.ns, Namespace::XLink);
        assert_eq!(attrs[0].name.prefix.as_deref(), Some("xlink"));
        assert_eq!(attrs[0].name.local, "href");
    }

    #[test]
    fn font_breakout_needs_presentational_attribute() {
        let mut plain = StartTag::default();
        plain.name = "font".to_owned();
        assert!(!is_breakout_tag(&plain));
        plain.attributes.push(("color".to_owned(), "red".to_owned()));
        assert!(is_breakout_tag(&plain));
    }
}
