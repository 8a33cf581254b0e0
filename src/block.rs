//! Block-level Markdown parsing: a full document → ordered HTML blocks.
//!
//! A single-pass, stateful line scanner. Lines are classified in priority
//! order — fence delimiter, heading, blank, unordered item, ordered item,
//! blockquote, paragraph — and block state (list stack, blockquote stack,
//! open code fence, paragraph buffer) is adjusted as each line arrives. A
//! trailing blank sentinel forces a final flush, so the last paragraph or
//! list never needs special-casing.
//!
//! Inline content inside headings, list items, quotes, and paragraphs goes
//! through [`crate::inline::render_inline`]; fenced code is escaped verbatim
//! with no Markdown interpretation.

use crate::inline::{LinkSink, escape, render_inline};
use crate::naming::strip_tags;
use regex::Regex;
use std::sync::OnceLock;

/// Result of parsing one Markdown document.
#[derive(Debug)]
pub struct ParsedDocument {
    /// Rendered HTML blocks joined by newlines.
    pub html: String,
    /// Plain-text title from the first H1/H2 heading, if any.
    pub title: Option<String>,
    /// All link references collected during inline rendering, document order.
    pub links: LinkSink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListTag {
    Ul,
    Ol,
}

impl ListTag {
    fn open(self) -> &'static str {
        match self {
            ListTag::Ul => "<ul>",
            ListTag::Ol => "<ol>",
        }
    }

    fn close(self) -> &'static str {
        match self {
            ListTag::Ul => "</ul>",
            ListTag::Ol => "</ol>",
        }
    }
}

#[derive(Debug, Default)]
struct BlockParser {
    blocks: Vec<String>,
    paragraph: Vec<String>,
    lists: Vec<(ListTag, usize)>,
    quotes: Vec<usize>,
    code: Option<(Option<String>, Vec<String>)>,
    title: Option<String>,
    links: LinkSink,
}

/// Parse a whole Markdown document into HTML blocks plus metadata.
pub fn parse_blocks(text: &str) -> ParsedDocument {
    let mut parser = BlockParser::default();
    for line in text.lines() {
        parser.feed(line);
    }
    // An unterminated fence still emits what it buffered.
    parser.close_code();
    // Blank sentinel flushes any open paragraph, lists, and quotes.
    parser.feed("");

    ParsedDocument {
        html: parser.blocks.join("\n"),
        title: parser.title,
        links: parser.links,
    }
}

impl BlockParser {
    fn feed(&mut self, raw_line: &str) {
        static RE_HEADING: OnceLock<Regex> = OnceLock::new();
        static RE_ORDERED: OnceLock<Regex> = OnceLock::new();
        let re_heading = RE_HEADING.get_or_init(|| Regex::new(r"^(#{1,6})\s+(.*)$").unwrap());
        let re_ordered = RE_ORDERED.get_or_init(|| Regex::new(r"^\d+[.)]\s+(.*)$").unwrap());

        let trimmed = raw_line.trim_start();
        let indent = raw_line.len() - trimmed.len();

        // Inside a fence everything is literal until the closing delimiter.
        if let Some((_, lines)) = self.code.as_mut() {
            if trimmed.starts_with("```") {
                self.close_code();
            } else {
                lines.push(escape(raw_line));
            }
            return;
        }

        if trimmed.starts_with("```") {
            self.flush_paragraph();
            let lang = trimmed[3..].trim();
            let lang = (!lang.is_empty()).then(|| lang.to_string());
            self.code = Some((lang, Vec::new()));
            return;
        }

        if let Some(caps) = re_heading.captures(trimmed) {
            self.flush_paragraph();
            self.close_lists_to(0, None);
            self.close_all_quotes();
            let level = caps[1].len();
            let rendered = render_inline(caps[2].trim(), &mut self.links);
            if level <= 2 && self.title.is_none() {
                let text = strip_tags(&rendered).trim().to_string();
                if !text.is_empty() {
                    self.title = Some(text);
                }
            }
            self.blocks.push(format!("<h{level}>{rendered}</h{level}>"));
            return;
        }

        if trimmed.is_empty() {
            self.flush_paragraph();
            self.close_lists_to(0, None);
            self.close_all_quotes();
            return;
        }

        if let Some(item) = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("+ "))
            .or_else(|| trimmed.strip_prefix("* "))
        {
            self.list_item(ListTag::Ul, indent, item);
            return;
        }

        if let Some(caps) = re_ordered.captures(trimmed) {
            let item = caps[1].to_string();
            self.list_item(ListTag::Ol, indent, &item);
            return;
        }

        if let Some(content) = trimmed.strip_prefix('>') {
            self.flush_paragraph();
            self.close_lists_to(0, None);
            self.close_quotes_to(indent);
            if self.quotes.last() != Some(&indent) {
                self.quotes.push(indent);
                self.blocks.push("<blockquote>".to_string());
            }
            let content = content.strip_prefix(' ').unwrap_or(content);
            let rendered = render_inline(content, &mut self.links);
            self.blocks.push(format!("<p>{rendered}</p>"));
            return;
        }

        // A plain line ends any open list; lazy continuation of list items
        // is out of scope, and the flushed <p> must not land inside <ul>.
        self.close_lists_to(0, None);
        self.paragraph.push(trimmed.to_string());
    }

    fn list_item(&mut self, tag: ListTag, indent: usize, item: &str) {
        self.flush_paragraph();
        self.close_all_quotes();
        self.close_lists_to(indent, Some(tag));
        match self.lists.last() {
            Some(&(t, i)) if t == tag && i == indent => {}
            _ => {
                self.lists.push((tag, indent));
                self.blocks.push(tag.open().to_string());
            }
        }
        let rendered = render_inline(item, &mut self.links);
        self.blocks.push(format!("<li>{rendered}</li>"));
    }

    /// Close list levels nested deeper than `indent`. Closing down to zero
    /// with no tag closes everything; a differing tag at equal indent forces
    /// a close so the caller can reopen with the right element.
    fn close_lists_to(&mut self, indent: usize, tag: Option<ListTag>) {
        while let Some(&(top_tag, top_indent)) = self.lists.last() {
            let type_switch = tag.is_some_and(|t| top_indent == indent && top_tag != t);
            if top_indent > indent || type_switch || tag.is_none() {
                self.lists.pop();
                self.blocks.push(top_tag.close().to_string());
            } else {
                break;
            }
        }
    }

    fn close_quotes_to(&mut self, indent: usize) {
        while let Some(&top) = self.quotes.last() {
            if top > indent {
                self.quotes.pop();
                self.blocks.push("</blockquote>".to_string());
            } else {
                break;
            }
        }
    }

    fn close_all_quotes(&mut self) {
        while self.quotes.pop().is_some() {
            self.blocks.push("</blockquote>".to_string());
        }
    }

    fn flush_paragraph(&mut self) {
        if self.paragraph.is_empty() {
            return;
        }
        let joined = self.paragraph.join(" ");
        self.paragraph.clear();
        let rendered = render_inline(&joined, &mut self.links);
        self.blocks.push(format!("<p>{rendered}</p>"));
    }

    fn close_code(&mut self) {
        if let Some((lang, lines)) = self.code.take() {
            let class = lang
                .map(|l| format!(" class=\"language-{l}\""))
                .unwrap_or_default();
            self.blocks
                .push(format!("<pre><code{class}>{}</code></pre>", lines.join("\n")));
        }
    }
}
