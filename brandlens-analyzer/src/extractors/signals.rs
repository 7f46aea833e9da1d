//! Browser-side signal collection
//!
//! Each collector runs one script in the page (WebDriver `execute/sync`
//! function bodies, hence the `return`) and parses its JSON result. Collectors
//! never fail: a broken script or unexpected shape is logged and replaced by
//! a per-signal fallback so the strategy can still decide something.

use crate::services::BrowserSession;
use crate::types::{ColorSignal, ExtractionError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

/// Every distinct font family used by any element
pub const FONT_SCRIPT: &str = r#"
const families = new Set();
for (const element of document.querySelectorAll('*')) {
    const chain = window.getComputedStyle(element).fontFamily;
    if (!chain || chain === 'inherit') {
        continue;
    }
    for (const raw of chain.split(',')) {
        const font = raw.trim().replace(/['"]/g, '');
        if (font && !font.includes('inherit') && !font.includes('initial')) {
            families.add(font);
        }
    }
}
return Array.from(families);
"#;

/// Computed text/background/border colors of every element plus link colors
pub const COLOR_SCRIPT: &str = r#"
const colors = { textColors: [], backgroundColors: [], borderColors: [], linkColors: [] };
const visible = (value) => value && value !== 'rgba(0, 0, 0, 0)' && value !== 'transparent';
for (const element of document.querySelectorAll('*')) {
    const style = window.getComputedStyle(element);
    if (visible(style.color)) colors.textColors.push(style.color);
    if (visible(style.backgroundColor)) colors.backgroundColors.push(style.backgroundColor);
    if (visible(style.borderColor)) colors.borderColors.push(style.borderColor);
    if (element.tagName === 'A') colors.linkColors.push(style.color);
}
return colors;
"#;

/// Stylesheet rules that set a color property
pub const CSS_RULES_SCRIPT: &str = r#"
const props = ['color', 'background-color', 'background', 'border-color', 'fill', 'stroke'];
const rules = [];
for (const sheet of Array.from(document.styleSheets)) {
    let sheetRules;
    try {
        sheetRules = Array.from(sheet.cssRules || sheet.rules || []);
    } catch (e) {
        continue; // cross-origin sheet
    }
    for (const rule of sheetRules) {
        if (!rule.style || !rule.selectorText) continue;
        const text = rule.cssText;
        if (!props.some((p) => rule.style[p] || text.includes(p + ':'))) continue;
        rules.push({
            selector: rule.selectorText,
            cssText: text,
            color: rule.style.color || '',
            backgroundColor: rule.style.backgroundColor || '',
            borderColor: rule.style.borderColor || ''
        });
    }
}
return rules;
"#;

/// Elements with inline color styles or legacy color attributes
pub const HTML_COLORS_SCRIPT: &str = r#"
const found = [];
for (const element of document.querySelectorAll('*[style], *[color], *[bgcolor]')) {
    const style = element.getAttribute('style') || '';
    const color = element.getAttribute('color') || '';
    const bgcolor = element.getAttribute('bgcolor') || '';
    if (!style.includes('color') && !color && !bgcolor) continue;
    found.push({
        tagName: element.tagName.toLowerCase(),
        className: element.getAttribute('class') || '',
        id: element.id || '',
        style: style,
        color: color,
        bgcolor: bgcolor,
        text: (element.textContent || '').substring(0, 100)
    });
}
return found;
"#;

/// Computed styles of brand-relevant elements, at most 10 per selector
pub const COMPUTED_STYLES_SCRIPT: &str = r#"
const selectors = [
    'h1, h2, h3, h4, h5, h6',
    'a',
    'button',
    '.btn, [class*="button"]',
    '[class*="primary"], [class*="secondary"]',
    'nav',
    'header',
    'footer',
    '.logo, [class*="logo"]',
    '[class*="brand"]'
];
const styles = [];
for (const selector of selectors) {
    const elements = Array.from(document.querySelectorAll(selector)).slice(0, 10);
    for (const element of elements) {
        const style = window.getComputedStyle(element);
        styles.push({
            selector: selector,
            tagName: element.tagName.toLowerCase(),
            className: element.getAttribute('class') || '',
            id: element.id || '',
            color: style.color,
            backgroundColor: style.backgroundColor,
            borderColor: style.borderColor,
            fontFamily: style.fontFamily,
            text: (element.textContent || '').substring(0, 50)
        });
    }
}
return styles;
"#;

/// A stylesheet rule that sets a color
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CssRule {
    pub selector: String,
    pub css_text: String,
    pub color: String,
    pub background_color: String,
    pub border_color: String,
}

/// An element carrying inline color information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HtmlColorElement {
    pub tag_name: String,
    pub class_name: String,
    pub id: String,
    pub style: String,
    pub color: String,
    pub bgcolor: String,
    pub text: String,
}

/// Computed style snapshot of one key element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComputedStyle {
    pub selector: String,
    pub tag_name: String,
    pub class_name: String,
    pub id: String,
    pub color: String,
    pub background_color: String,
    pub border_color: String,
    pub font_family: String,
    pub text: String,
}

/// Raw font list reported when the font scan fails
pub fn fallback_fonts() -> Value {
    json!(["Arial", "sans-serif"])
}

/// Run `script` and parse its result as `T`
async fn evaluate_as<T: DeserializeOwned>(
    session: &mut BrowserSession,
    script: &str,
) -> Result<T, ExtractionError> {
    let value = session.evaluate(script).await?;
    serde_json::from_value(value)
        .map_err(|e| ExtractionError::Script(format!("Unexpected script result: {}", e)))
}

/// Raw font families as returned by the page
///
/// The value is kept as JSON so `fonts::classify_value` decides whether it is
/// usable; on script failure this is `["Arial", "sans-serif"]`.
pub async fn collect_fonts(session: &mut BrowserSession) -> Value {
    match session.evaluate(FONT_SCRIPT).await {
        Ok(fonts) => {
            let count = fonts.as_array().map_or(0, Vec::len);
            info!(count, "Extracted font families");
            fonts
        }
        Err(e) => {
            warn!(error = %e, "Font scan failed, using fallback fonts");
            fallback_fonts()
        }
    }
}

/// Per-category computed colors, or the canned signal on failure
pub async fn collect_colors(session: &mut BrowserSession) -> ColorSignal {
    match evaluate_as::<ColorSignal>(session, COLOR_SCRIPT).await {
        Ok(colors) => {
            info!(
                text = colors.text_colors.len(),
                background = colors.background_colors.len(),
                border = colors.border_colors.len(),
                link = colors.link_colors.len(),
                "Extracted colors"
            );
            colors
        }
        Err(e) => {
            warn!(error = %e, "Color scan failed, using fallback colors");
            ColorSignal::fallback()
        }
    }
}

/// Stylesheet color rules, empty on failure
pub async fn collect_css_rules(session: &mut BrowserSession) -> Vec<CssRule> {
    collect_list(session, CSS_RULES_SCRIPT, "CSS color rules").await
}

/// Inline-colored elements, empty on failure
pub async fn collect_html_colors(session: &mut BrowserSession) -> Vec<HtmlColorElement> {
    collect_list(session, HTML_COLORS_SCRIPT, "HTML color elements").await
}

/// Key element computed styles, empty on failure
pub async fn collect_computed_styles(session: &mut BrowserSession) -> Vec<ComputedStyle> {
    collect_list(session, COMPUTED_STYLES_SCRIPT, "computed styles").await
}

async fn collect_list<T: DeserializeOwned>(
    session: &mut BrowserSession,
    script: &str,
    label: &str,
) -> Vec<T> {
    match evaluate_as::<Vec<T>>(session, script).await {
        Ok(items) => {
            info!(count = items.len(), "Extracted {}", label);
            items
        }
        Err(e) => {
            warn!(error = %e, "Failed to extract {}", label);
            Vec::new()
        }
    }
}
