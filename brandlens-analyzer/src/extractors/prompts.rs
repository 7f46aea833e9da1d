//! Prompts for the color-judging model

use super::signals::{ComputedStyle, CssRule, HtmlColorElement};

/// CSS rules summarised in the CSS prompt
pub const MAX_PROMPT_CSS_RULES: usize = 20;
/// Inline-colored elements summarised in the CSS prompt
pub const MAX_PROMPT_HTML_ELEMENTS: usize = 20;
/// Computed styles summarised in the CSS prompt
pub const MAX_PROMPT_COMPUTED_STYLES: usize = 30;

const ROLE_GUIDE: &str = "\
Assign exactly four roles:

1. primaryColor - the brand's signature accent.
   Check the logo, header, primary buttons and calls to action first.
2. secondaryColor - the main body text color.
   It is drawn on top of backgroundColor, so the pair must contrast strongly.
3. backgroundColor - the color behind the main content.
   Usually the largest flat area: near-white on light themes, near-black on dark ones.
4. linkColor - the color of clickable text.
   Look at inline links and navigation items; if links are not distinctive, use the color most inline links share.

Rules:
- Prefer colors repeated across several prominent elements over one-off accents.
- Ignore plain white or black for primaryColor unless the brand clearly uses them as its identity.
- Answer in uppercase #RRGGBB hex only (for example #1A73E8).
- Return a single JSON object with the keys primaryColor, secondaryColor, backgroundColor and linkColor.
";

/// Prompt for the CSS strategy: a text summary of the collected styles
pub fn css_prompt(
    css_rules: &[CssRule],
    html_colors: &[HtmlColorElement],
    computed_styles: &[ComputedStyle],
) -> String {
    let rules = css_rules
        .iter()
        .take(MAX_PROMPT_CSS_RULES)
        .map(|r| format!("- {} {{ color: {}; background: {} }}", r.selector, r.color, r.background_color))
        .collect::<Vec<_>>()
        .join("\n");

    let elements = html_colors
        .iter()
        .take(MAX_PROMPT_HTML_ELEMENTS)
        .map(|e| format!("- <{}> style=\"{}\" color=\"{}\"", e.tag_name, e.style, e.color))
        .collect::<Vec<_>>()
        .join("\n");

    let styles = computed_styles
        .iter()
        .take(MAX_PROMPT_COMPUTED_STYLES)
        .map(|s| {
            format!(
                "- {}.{} color: {}; background: {}",
                s.tag_name, s.class_name, s.color, s.background_color
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are identifying a website's brand colors from its styles.\n\n\
         ## Stylesheet rules that set colors\n{}\n\n\
         ## Elements with inline color styling\n{}\n\n\
         ## Computed styles of headings, links, buttons, navigation and logos\n{}\n\n{}",
        or_none(rules),
        or_none(elements),
        or_none(styles),
        ROLE_GUIDE
    )
}

/// Prompt for the raw screenshot strategy
pub fn screenshot_prompt() -> String {
    format!(
        "You are identifying a website's brand colors from a screenshot of its page.\n\n\
         Read the visual hierarchy: logo and company name, main buttons, navigation, \
         content backgrounds and text links.\n\
         If a cookie banner, ad or modal dims the page, judge the colors as they would \
         look without the overlay.\n\n{}",
        ROLE_GUIDE
    )
}

/// Prompt for the palette legend strategy
///
/// `colors` are the legend swatches, left to right.
pub fn palette_prompt(colors: &[String]) -> String {
    let legend = colors
        .iter()
        .enumerate()
        .map(|(i, hex)| format!("{}. {}", i + 1, hex))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are identifying a website's brand colors.\n\n\
         The image shows a screenshot of the page on top and a palette legend strip below it. \
         The legend holds one swatch per dominant color, left to right, in this order:\n{}\n\n\
         Use the screenshot to decide which role each color plays, and pick every role \
         from the legend colors listed above.\n\
         If a cookie banner, ad or modal dims the page, pick the legend color closest to \
         how the element would look without the overlay.\n\n{}",
        legend, ROLE_GUIDE
    )
}

fn or_none(section: String) -> String {
    if section.is_empty() {
        "(none found)".to_string()
    } else {
        section
    }
}
