use std::borrow::Cow;

use once_cell::sync::Lazy;
use quick_xml::escape::{resolve_html5_entity, unescape_with};
use regex::Regex;

static HTML_TAG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

static PARAGRAPH_BREAK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</p>|<p(\s[^>]*)?>|<br\s*/?>").expect("break pattern is valid"));

static ENTITY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#?[A-Za-z0-9]+;").expect("entity pattern is valid"));

static CODE_FENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*\s*\n?(.*?)\n?\s*```\s*$").expect("fence pattern is valid")
});

/// Decodes named (HTML5) and numeric character references one at a time;
/// bare ampersands and unknown references are kept as written.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    ENTITY_REGEX.replace_all(text, |caps: &regex::Captures| {
        let reference = &caps[0];
        unescape_with(reference, resolve_html5_entity)
            .map(Cow::into_owned)
            .unwrap_or_else(|_| reference.to_string())
    })
}

/// Strips tags, decodes entities and trims.
pub fn clean_html(text: &str) -> String {
    let without_tags = HTML_TAG_REGEX.replace_all(text, "");
    decode_entities(&without_tags).trim().to_string()
}

/// Turns `<p>`, `</p>` and `<br>` into newlines so paragraph structure
/// survives plain-text rendering.
pub fn normalize_breaks(text: &str) -> String {
    PARAGRAPH_BREAK_REGEX.replace_all(text, "\n").into_owned()
}

/// Models often wrap JSON replies in a markdown code block.
pub fn strip_code_fences(text: &str) -> &str {
    CODE_FENCE_REGEX
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(text)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_trivia_style_entities() {
        assert_eq!(
            decode_entities("Which &quot;planet&quot; isn&#039;t a gas giant?"),
            "Which \"planet\" isn't a gas giant?"
        );
        assert_eq!(decode_entities("Pok&eacute;mon &amp; friends"), "Pokémon & friends");
    }

    #[test]
    fn unresolvable_reference_is_left_alone() {
        assert_eq!(decode_entities("fish & chips"), "fish & chips");
        assert_eq!(decode_entities("&bogus; &amp;"), "&bogus; &");
    }

    #[test]
    fn bare_ampersand_does_not_block_other_references() {
        assert_eq!(
            decode_entities("Tom & Jerry &quot;classic&quot;"),
            "Tom & Jerry \"classic\""
        );
        assert_eq!(decode_entities("R&D &#8211; &#x41;"), "R&D \u{2013} A");
    }

    #[test]
    fn clean_html_strips_tags() {
        assert_eq!(
            clean_html("<span class=\"searchmatch\">Rust</span> is a <b>language</b> &amp; more "),
            "Rust is a language & more"
        );
    }

    #[test]
    fn normalize_breaks_handles_paragraph_markup() {
        assert_eq!(normalize_breaks("<p>One</p><p>Two<br>Three<br/>"), "\nOne\n\nTwo\nThree\n");
    }

    #[test]
    fn strip_code_fences_unwraps_json_block() {
        let reply = "```json\n{\"cards\": []}\n```";
        assert_eq!(strip_code_fences(reply), "{\"cards\": []}");
        assert_eq!(strip_code_fences("{\"cards\": []}"), "{\"cards\": []}");
    }
}
