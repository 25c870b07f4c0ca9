//! Derivation of human readable names from domain slugs.
//!
//! Slugs such as `ai-ml` become `Ai Ml`; the community created for that slug
//! is called `Ai Ml Community`.

const SEPARATORS: [char; 2] = ['-', '_'];
const COMMUNITY_SUFFIX: &str = " Community";
const DESCRIPTION_PREFIX: &str = "Connect with professionals and enthusiasts in ";

/// Replaces separators with spaces and uppercases the first letter of every word.
///
/// Characters other than the first of each whitespace-delimited word are kept as-is.
pub fn display_name(slug: &str) -> String {
    let mut out = String::with_capacity(slug.len());
    let mut at_word_start = true;
    for ch in slug.chars() {
        let ch = if SEPARATORS.contains(&ch) { ' ' } else { ch };
        if ch.is_whitespace() {
            at_word_start = true;
            out.push(ch);
        } else if at_word_start {
            at_word_start = false;
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Name given to the community auto-created for `slug`.
pub fn community_name(slug: &str) -> String {
    let mut name = display_name(slug);
    name.push_str(COMMUNITY_SUFFIX);
    name
}

/// Description given to the community auto-created for `slug`.
pub fn community_description(slug: &str) -> String {
    format!("{DESCRIPTION_PREFIX}{}", display_name(slug))
}
