//! JavaScript evaluated inside the page. Everything the resolver needs comes
//! back from these two calls; no DOM data is pulled element by element.
use inkwell_config::FontFamilySource;

const CONTENT_FUNCTION: &str = r#"(div) => {
    const fontFamily = __FONT_FAMILY__;
    const textTags = div.querySelectorAll(__TEXT_SELECTOR__);
    const text = Array.from(textTags)
        .map((el) => (el.textContent || "").trim())
        .join("\n");
    return { text, fontFamily };
}"#;

/// One-argument function applied to the content container.
///
/// Returns `{ text, fontFamily }`; empty elements keep their (empty) line.
pub fn content_function(text_selector: &str, source: FontFamilySource) -> String {
    let font_family = match source {
        FontFamilySource::Inline => "div.style.fontFamily",
        FontFamilySource::Computed => "window.getComputedStyle(div).fontFamily",
    };
    // A JSON string is a valid JS string literal.
    let selector_literal =
        serde_json::to_string(text_selector).unwrap_or_else(|_| "\"p\"".to_string());

    CONTENT_FUNCTION
        .replace("__FONT_FAMILY__", font_family)
        .replace("__TEXT_SELECTOR__", &selector_literal)
}

/// Function body collecting the `src` of every `@font-face` rule whose family is
/// `arguments[0]`, in sheet order then rule order.
///
/// Sheets whose rules cannot be read (cross-origin) contribute nothing.
pub const FONT_SOURCES_SCRIPT: &str = r#"
const fontKey = arguments[0];
const sources = [];
for (const sheet of Array.from(document.styleSheets)) {
    let rules;
    try {
        rules = sheet.cssRules;
    } catch (e) {
        continue;
    }
    if (!rules) continue;
    for (const rule of Array.from(rules)) {
        if (!(rule instanceof CSSFontFaceRule)) continue;
        const family = rule.style
            .getPropertyValue("font-family")
            .replace(/["']/g, "")
            .trim();
        if (family === fontKey) {
            sources.push(rule.style.getPropertyValue("src"));
        }
    }
}
return sources;
"#;
