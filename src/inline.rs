//! Inline markup transformation: one line of Markdown → escaped HTML.
//!
//! The transformer runs a fixed pipeline over each piece of inline text.
//! Order matters — later passes depend on earlier ones having produced inert
//! output:
//!
//! 1. Code spans are stashed behind placeholder tokens (content HTML-escaped
//!    up front) so nothing inside backticks is ever parsed as markup.
//! 2. Math spans (`$$...$$`) are stashed with their content kept raw for
//!    client-side LaTeX rendering.
//! 3. The remaining text is HTML-escaped. Placeholders use a control-character
//!    marker that escaping never produces, so they survive untouched.
//! 4. Wiki embeds, images, links, emphasis, and wiki-links are rewritten on
//!    the escaped text.
//! 5. Math placeholders are restored, then code placeholders last.
//!
//! Link targets discovered along the way are appended to the caller's
//! [`LinkSink`] with their *raw* (unescaped) text — resolution against the
//! vault happens in a later pass, after the whole page graph exists.

use regex::{Captures, Regex};
use std::sync::OnceLock;

const CODE_MARK: char = '\u{1}';
const MATH_MARK: char = '\u{2}';

/// Accumulates categorized link references during inline rendering.
///
/// The three lists are disjoint and preserve document order. Targets are
/// stored exactly as written in the source.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LinkSink {
    /// Targets of `[[...]]` wiki-links.
    pub wiki: Vec<String>,
    /// Relative file references from `[label](path)` links.
    pub local: Vec<String>,
    /// Absolute URLs (`http://`, `https://`, `mailto:`).
    pub external: Vec<String>,
}

impl LinkSink {
    /// Append all entries from `other`, preserving order.
    pub fn absorb(&mut self, other: LinkSink) {
        self.wiki.extend(other.wiki);
        self.local.extend(other.local);
        self.external.extend(other.external);
    }
}

/// True when a URL should be treated as external rather than a vault file.
pub fn is_external_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://") || url.starts_with("mailto:")
}

/// True when a reference names an Excalidraw diagram rather than an image.
pub fn is_excalidraw_target(target: &str) -> bool {
    let lower = target.to_ascii_lowercase();
    lower.ends_with(".excalidraw") || lower.ends_with(".excalidraw.md")
}

/// Escape `&`, `<`, `>`, and `"` only. Slashes and apostrophes pass through
/// untouched — link targets and image sources must survive byte-for-byte so
/// the resolution pass (and any unresolved fallback) sees the original
/// reference string.
pub(crate) fn escape(text: &str) -> String {
    html_escape::encode_text(text).replace('"', "&quot;")
}

/// Recover the raw source text from a fragment of escaped inline text.
fn unescape(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

/// Render one line or paragraph of Markdown as inline HTML.
///
/// Discovered link targets are appended to `links`. The returned HTML is safe
/// to embed directly into a block element.
pub fn render_inline(text: &str, links: &mut LinkSink) -> String {
    static RE_CODE: OnceLock<Regex> = OnceLock::new();
    static RE_MATH: OnceLock<Regex> = OnceLock::new();
    static RE_WIKI_IMAGE: OnceLock<Regex> = OnceLock::new();
    static RE_MD_IMAGE: OnceLock<Regex> = OnceLock::new();
    static RE_MD_LINK: OnceLock<Regex> = OnceLock::new();
    static RE_BOLD_STAR: OnceLock<Regex> = OnceLock::new();
    static RE_BOLD_UNDER: OnceLock<Regex> = OnceLock::new();
    static RE_ITALIC_STAR: OnceLock<Regex> = OnceLock::new();
    static RE_ITALIC_UNDER: OnceLock<Regex> = OnceLock::new();
    static RE_STRIKE: OnceLock<Regex> = OnceLock::new();
    static RE_UNDERLINE: OnceLock<Regex> = OnceLock::new();
    static RE_WIKI_LINK: OnceLock<Regex> = OnceLock::new();

    let re_code = RE_CODE.get_or_init(|| Regex::new(r"`([^`]+)`").unwrap());
    let re_math = RE_MATH.get_or_init(|| Regex::new(r"\$\$(.*?)\$\$").unwrap());
    let re_wiki_image =
        RE_WIKI_IMAGE.get_or_init(|| Regex::new(r"!\[\[([^\]|]*)(?:\|([^\]]*))?\]\]").unwrap());
    let re_md_image = RE_MD_IMAGE.get_or_init(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").unwrap());
    let re_md_link = RE_MD_LINK.get_or_init(|| Regex::new(r"\[([^\]]*)\]\(([^)]+)\)").unwrap());
    let re_bold_star = RE_BOLD_STAR.get_or_init(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
    let re_bold_under = RE_BOLD_UNDER.get_or_init(|| Regex::new(r"__([^_]+)__").unwrap());
    // Bold runs first and consumes doubled delimiters, so a single-delimiter
    // match here cannot sit inside a bold span.
    let re_italic_star = RE_ITALIC_STAR.get_or_init(|| Regex::new(r"\*([^*]+)\*").unwrap());
    let re_italic_under = RE_ITALIC_UNDER.get_or_init(|| Regex::new(r"\b_([^_]+)_\b").unwrap());
    let re_strike = RE_STRIKE.get_or_init(|| Regex::new(r"~~([^~]+)~~").unwrap());
    let re_underline = RE_UNDERLINE.get_or_init(|| Regex::new(r"==([^=]+)==").unwrap());
    let re_wiki_link =
        RE_WIKI_LINK.get_or_init(|| Regex::new(r"\[\[([^\]|]*)(?:\|([^\]]*))?\]\]").unwrap());

    // 1. Stash code spans, escaping their content up front.
    let mut code_stash: Vec<String> = Vec::new();
    let text = re_code
        .replace_all(text, |caps: &Captures| {
            code_stash.push(escape(&caps[1]));
            format!("{CODE_MARK}{}{CODE_MARK}", code_stash.len() - 1)
        })
        .into_owned();

    // 2. Stash math spans with raw content.
    let mut math_stash: Vec<String> = Vec::new();
    let text = re_math
        .replace_all(&text, |caps: &Captures| {
            math_stash.push(caps[1].to_string());
            format!("{MATH_MARK}{}{MATH_MARK}", math_stash.len() - 1)
        })
        .into_owned();

    // 3. Escape everything else. From here on the text is attribute-safe.
    let mut text = escape(&text);

    // 4a. Wiki image embeds.
    text = re_wiki_image
        .replace_all(&text, |caps: &Captures| {
            let target = caps.get(1).map_or("", |m| m.as_str());
            let alias = caps.get(2).map_or(target, |m| m.as_str());
            let raw_target = unescape(target);
            if is_excalidraw_target(&raw_target) {
                format!("<div class=\"excalidraw-embed\" data-source=\"{target}\"></div>")
            } else {
                format!("<img class=\"wiki-image\" src=\"{target}\" alt=\"{alias}\">")
            }
        })
        .into_owned();

    // 4b. Standard Markdown images.
    text = re_md_image
        .replace_all(&text, "<img src=\"$2\" alt=\"$1\">")
        .into_owned();

    // 4c. Standard Markdown links, classified by URL scheme only.
    text = re_md_link
        .replace_all(&text, |caps: &Captures| {
            let label = &caps[1];
            let url = &caps[2];
            let raw_url = unescape(url);
            if is_external_url(&raw_url) {
                links.external.push(raw_url);
                format!("<a class=\"external-link\" href=\"{url}\">{label}</a>")
            } else {
                links.local.push(raw_url);
                format!("<a class=\"local-link\" href=\"{url}\">{label}</a>")
            }
        })
        .into_owned();

    // 4d. Emphasis.
    text = re_bold_star
        .replace_all(&text, "<strong>$1</strong>")
        .into_owned();
    text = re_bold_under
        .replace_all(&text, "<strong>$1</strong>")
        .into_owned();
    text = re_italic_star.replace_all(&text, "<em>$1</em>").into_owned();
    text = re_italic_under
        .replace_all(&text, "<em>$1</em>")
        .into_owned();
    text = re_strike.replace_all(&text, "<del>$1</del>").into_owned();
    text = re_underline.replace_all(&text, "<u>$1</u>").into_owned();

    // 4e. Wiki-links last. Targets stay raw in the sink; the anchor carries
    // the target in a data attribute for the deferred resolution pass.
    text = re_wiki_link
        .replace_all(&text, |caps: &Captures| {
            let target = caps.get(1).map_or("", |m| m.as_str());
            let alias = caps.get(2).map_or(target, |m| m.as_str());
            if target.is_empty() {
                return alias.to_string();
            }
            links.wiki.push(unescape(target));
            format!("<a class=\"wiki-link\" href=\"#\" data-target=\"{target}\">{alias}</a>")
        })
        .into_owned();

    // 5. Restore math spans.
    for (idx, raw) in math_stash.iter().enumerate() {
        let token = format!("{MATH_MARK}{idx}{MATH_MARK}");
        let rendered = if raw.trim().is_empty() {
            String::new()
        } else {
            format!(
                "<span class=\"math\" data-tex=\"{}\">{}</span>",
                html_escape::encode_double_quoted_attribute(raw),
                escape(raw)
            )
        };
        text = text.replace(&token, &rendered);
    }

    // 6. Restore code spans.
    for (idx, escaped) in code_stash.iter().enumerate() {
        let token = format!("{CODE_MARK}{idx}{CODE_MARK}");
        text = text.replace(&token, &format!("<code>{escaped}</code>"));
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(text: &str) -> (String, LinkSink) {
        let mut links = LinkSink::default();
        let html = render_inline(text, &mut links);
        (html, links)
    }

    #[test]
    fn plain_text_is_escaped() {
        let (html, _) = render("a < b & \"c\"");
        assert!(html.contains("&lt;"));
        assert!(html.contains("&amp;"));
        assert!(!html.contains('<'));
    }

    #[test]
    fn slashes_and_apostrophes_survive_escaping() {
        let (html, links) = render("it's [x](a/b/c.png) and [[notes/Deep]]");
        assert!(html.contains("it's"));
        assert!(html.contains("href=\"a/b/c.png\""));
        assert!(html.contains("data-target=\"notes/Deep\""));
        assert_eq!(links.local, vec!["a/b/c.png"]);
    }

    #[test]
    fn code_span_protects_emphasis() {
        let (html, _) = render("`**not bold**`");
        assert_eq!(html, "<code>**not bold**</code>");
    }

    #[test]
    fn code_span_content_is_escaped() {
        let (html, _) = render("use `a < b` here");
        assert!(html.contains("<code>a &lt; b</code>"));
    }

    #[test]
    fn math_span_keeps_raw_latex() {
        let (html, _) = render("energy: $$E = mc^2$$");
        assert!(html.contains("data-tex=\"E = mc^2\""));
        assert!(html.contains("class=\"math\""));
    }

    #[test]
    fn empty_math_span_renders_nothing() {
        let (html, _) = render("$$$$ and $$ $$");
        assert!(!html.contains("math"));
    }

    #[test]
    fn math_with_angle_brackets_escaped_in_visible_text() {
        let (html, _) = render("$$a < b$$");
        assert!(html.contains(">a &lt; b</span>"));
    }

    #[test]
    fn bold_star_and_underscore() {
        let (html, _) = render("**hi** and __ho__");
        assert_eq!(html, "<strong>hi</strong> and <strong>ho</strong>");
    }

    #[test]
    fn italic_does_not_eat_bold() {
        let (html, _) = render("**bold** *ital*");
        assert_eq!(html, "<strong>bold</strong> <em>ital</em>");
    }

    #[test]
    fn underscore_italic_ignores_snake_case() {
        let (html, _) = render("snake_case_name stays");
        assert_eq!(html, "snake_case_name stays");
    }

    #[test]
    fn strikethrough_and_underline() {
        let (html, _) = render("~~gone~~ ==kept==");
        assert_eq!(html, "<del>gone</del> <u>kept</u>");
    }

    #[test]
    fn wiki_link_default_alias() {
        let (html, links) = render("see [[Target Page]]");
        assert_eq!(
            html,
            "see <a class=\"wiki-link\" href=\"#\" data-target=\"Target Page\">Target Page</a>"
        );
        assert_eq!(links.wiki, vec!["Target Page"]);
    }

    #[test]
    fn wiki_link_with_alias() {
        let (html, links) = render("[[notes/Deep|the deep one]]");
        assert!(html.contains("data-target=\"notes/Deep\""));
        assert!(html.contains(">the deep one</a>"));
        assert_eq!(links.wiki, vec!["notes/Deep"]);
    }

    #[test]
    fn empty_wiki_link_target_yields_alias_text() {
        let (html, links) = render("[[|just text]] and [[]]");
        assert_eq!(html, "just text and ");
        assert!(links.wiki.is_empty());
    }

    #[test]
    fn wiki_link_target_recorded_unescaped() {
        let (_, links) = render("[[Tom & Jerry]]");
        assert_eq!(links.wiki, vec!["Tom & Jerry"]);
    }

    #[test]
    fn wiki_image_renders_img() {
        let (html, _) = render("![[diagram.png]]");
        assert_eq!(
            html,
            "<img class=\"wiki-image\" src=\"diagram.png\" alt=\"diagram.png\">"
        );
    }

    #[test]
    fn wiki_image_alias_becomes_alt() {
        let (html, _) = render("![[photo.jpg|my photo]]");
        assert!(html.contains("alt=\"my photo\""));
    }

    #[test]
    fn excalidraw_embed_renders_container_div() {
        let (html, _) = render("![[flow.excalidraw]]");
        assert_eq!(
            html,
            "<div class=\"excalidraw-embed\" data-source=\"flow.excalidraw\"></div>"
        );
    }

    #[test]
    fn excalidraw_md_suffix_also_embeds() {
        let (html, _) = render("![[flow.excalidraw.md]]");
        assert!(html.starts_with("<div class=\"excalidraw-embed\""));
    }

    #[test]
    fn markdown_image() {
        let (html, _) = render("![alt text](pics/a.png)");
        assert_eq!(html, "<img src=\"pics/a.png\" alt=\"alt text\">");
    }

    #[test]
    fn external_link_classified_by_scheme() {
        let (html, links) = render("[site](https://example.com) [mail](mailto:a@b.c)");
        assert!(html.contains("class=\"external-link\""));
        assert_eq!(links.external, vec!["https://example.com", "mailto:a@b.c"]);
        assert!(links.local.is_empty());
    }

    #[test]
    fn local_link_classified_by_scheme() {
        let (html, links) = render("[notes](other/page.md)");
        assert!(html.contains("class=\"local-link\""));
        assert_eq!(links.local, vec!["other/page.md"]);
    }

    #[test]
    fn no_resolution_happens_here() {
        // Targets are preserved verbatim even when they point nowhere.
        let (_, links) = render("[x](does/not/exist.md) [[Ghost Page]]");
        assert_eq!(links.local, vec!["does/not/exist.md"]);
        assert_eq!(links.wiki, vec!["Ghost Page"]);
    }
}
