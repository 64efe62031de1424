use regex::Regex;
use std::sync::OnceLock;

fn hyphen_split_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([A-Z])-\s+([A-Z])").expect("invalid regex"))
}

/// Collapse all whitespace runs (including embedded newlines) to single
/// spaces and trim the ends.
pub fn squash_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Repair artifacts the table extractor leaves in particulars text: stray
/// commas after signs and hyphenated words split across line breaks.
pub fn clean_particulars(text: &str) -> String {
    let squashed = squash_spaces(text);
    let repaired = squashed.replace("+ ,", "+").replace("- ,", "-");
    hyphen_split_re()
        .replace_all(&repaired, "${1}-${2}")
        .into_owned()
}
