//! Rich text editing over a small block document
//!
//! The stored value is HTML. The editor keeps it as a list of blocks whose
//! inline content stays HTML, so marks like `<strong>` survive a round trip.
//! Edits made by the user record undo history and emit the new HTML; values
//! pushed in from outside only re-synchronise the document.

use regex::Regex;
use std::sync::LazyLock;

static OPEN_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(p|h[1-6]|blockquote|ul|ol|pre)(?:\s[^>]*)?>").expect("block pattern is a valid regex")
});

static ITEM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<li(?:\s[^>]*)?>(.*?)</li>").expect("list item pattern is a valid regex")
});

static CODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*<code(?:\s[^>]*)?>(.*?)</code>\s*$").expect("code pattern is a valid regex")
});

static PARAGRAPH_WRAP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*<p(?:\s[^>]*)?>(.*?)</p>\s*$").expect("paragraph pattern is a valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(String),
    Heading { level: u8, content: String },
    Quote(String),
    BulletList(Vec<String>),
    OrderedList(Vec<String>),
    Code(String),
}

impl Block {
    fn to_html(&self) -> String {
        match self {
            Block::Paragraph(content) => format!("<p>{content}</p>"),
            Block::Heading { level, content } => format!("<h{level}>{content}</h{level}>"),
            Block::Quote(content) => format!("<blockquote><p>{content}</p></blockquote>"),
            Block::BulletList(items) => format!("<ul>{}</ul>", list_items(items)),
            Block::OrderedList(items) => format!("<ol>{}</ol>", list_items(items)),
            Block::Code(content) => format!("<pre><code>{content}</code></pre>"),
        }
    }

    fn to_plain(&self) -> String {
        match self {
            Block::Paragraph(content) => content.clone(),
            Block::Heading { level, content } => {
                format!("{} {content}", "#".repeat(usize::from(*level)))
            }
            Block::Quote(content) => format!("> {content}"),
            Block::BulletList(items) => items
                .iter()
                .map(|i| format!("- {i}"))
                .collect::<Vec<_>>()
                .join("\n"),
            Block::OrderedList(items) => items
                .iter()
                .enumerate()
                .map(|(n, i)| format!("{}. {i}", n + 1))
                .collect::<Vec<_>>()
                .join("\n"),
            Block::Code(content) => format!("```\n{content}\n```"),
        }
    }
}

fn list_items(items: &[String]) -> String {
    items.iter().map(|i| format!("<li><p>{i}</p></li>")).collect()
}

fn unwrap_paragraph(inner: &str) -> String {
    PARAGRAPH_WRAP
        .captures(inner)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(inner)
        .trim()
        .to_string()
}

/// Parse stored HTML into blocks. Text outside any block tag becomes a
/// paragraph.
pub fn parse_html(html: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut pos = 0;
    while let Some(caps) = OPEN_TAG.captures(&html[pos..]) {
        let (Some(open), Some(tag)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let loose = html[pos..pos + open.start()].trim();
        if !loose.is_empty() {
            blocks.push(Block::Paragraph(loose.to_string()));
        }
        let tag = tag.as_str();
        let inner_start = pos + open.end();
        let close = format!("</{tag}>");
        let (inner, next) = match html[inner_start..].find(&close) {
            Some(end) => (
                &html[inner_start..inner_start + end],
                inner_start + end + close.len(),
            ),
            None => (&html[inner_start..], html.len()),
        };
        blocks.push(block_from_tag(tag, inner));
        pos = next;
    }
    let rest = html[pos..].trim();
    if !rest.is_empty() {
        blocks.push(Block::Paragraph(rest.to_string()));
    }
    blocks
}

fn block_from_tag(tag: &str, inner: &str) -> Block {
    match tag {
        "p" => Block::Paragraph(inner.trim().to_string()),
        "blockquote" => Block::Quote(unwrap_paragraph(inner)),
        "ul" | "ol" => {
            let items = ITEM_PATTERN
                .captures_iter(inner)
                .filter_map(|c| c.get(1))
                .map(|m| unwrap_paragraph(m.as_str()))
                .collect();
            if tag == "ul" {
                Block::BulletList(items)
            } else {
                Block::OrderedList(items)
            }
        }
        "pre" => Block::Code(
            CODE_PATTERN
                .captures(inner)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str())
                .unwrap_or(inner)
                .to_string(),
        ),
        heading => Block::Heading {
            level: heading[1..].parse().unwrap_or(1),
            content: inner.trim().to_string(),
        },
    }
}

/// Parse lightweight plain-text markup typed in a terminal editor.
///
/// Blank lines separate paragraphs; `#`..`######` start headings, `>` quotes,
/// `-`/`*` bullet items, `1.` ordered items, and ``` fences code. Inline
/// content is kept as written, so inline HTML and entities from
/// [`RichTextEditor::plain_text`] come back unchanged.
pub fn parse_plain(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<String> = Vec::new();
    let mut lines = text.lines().peekable();

    fn flush(paragraph: &mut Vec<String>, blocks: &mut Vec<Block>) {
        if !paragraph.is_empty() {
            blocks.push(Block::Paragraph(paragraph.join(" ")));
            paragraph.clear();
        }
    }

    while let Some(line) = lines.next() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            flush(&mut paragraph, &mut blocks);
            continue;
        }
        if trimmed.starts_with("```") {
            flush(&mut paragraph, &mut blocks);
            let mut code = Vec::new();
            for inner in lines.by_ref() {
                if inner.trim().starts_with("```") {
                    break;
                }
                code.push(inner.to_string());
            }
            blocks.push(Block::Code(code.join("\n")));
            continue;
        }
        if let Some((level, rest)) = heading_prefix(trimmed) {
            flush(&mut paragraph, &mut blocks);
            blocks.push(Block::Heading {
                level,
                content: rest.to_string(),
            });
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("> ") {
            flush(&mut paragraph, &mut blocks);
            blocks.push(Block::Quote(rest.to_string()));
            continue;
        }
        if let Some(item) = bullet_item(trimmed) {
            flush(&mut paragraph, &mut blocks);
            match blocks.last_mut() {
                Some(Block::BulletList(items)) => items.push(item.to_string()),
                _ => blocks.push(Block::BulletList(vec![item.to_string()])),
            }
            continue;
        }
        if let Some(item) = ordered_item(trimmed) {
            flush(&mut paragraph, &mut blocks);
            match blocks.last_mut() {
                Some(Block::OrderedList(items)) => items.push(item.to_string()),
                _ => blocks.push(Block::OrderedList(vec![item.to_string()])),
            }
            continue;
        }
        paragraph.push(trimmed.to_string());
    }
    flush(&mut paragraph, &mut blocks);
    blocks
}

fn heading_prefix(line: &str) -> Option<(u8, &str)> {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }
    line[hashes..]
        .strip_prefix(' ')
        .map(|rest| (hashes as u8, rest.trim()))
}

fn bullet_item(line: &str) -> Option<&str> {
    line.strip_prefix("- ").or_else(|| line.strip_prefix("* "))
}

fn ordered_item(line: &str) -> Option<&str> {
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    line[digits..].strip_prefix(". ")
}

fn serialize(blocks: &[Block]) -> String {
    if blocks.is_empty() {
        return String::new();
    }
    blocks.iter().map(Block::to_html).collect()
}

#[derive(Debug, Clone, Default)]
pub struct RichTextEditor {
    blocks: Vec<Block>,
    undo: Vec<Vec<Block>>,
    redo: Vec<Vec<Block>>,
}

impl RichTextEditor {
    pub fn new(html: &str) -> Self {
        Self {
            blocks: parse_html(html),
            undo: Vec::new(),
            redo: Vec::new(),
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn html(&self) -> String {
        serialize(&self.blocks)
    }

    /// The document as editable plain-text markup
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::to_plain)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Apply a user edit. Returns the new HTML when the document changed.
    pub fn edit(&mut self, blocks: Vec<Block>) -> Option<String> {
        if blocks == self.blocks {
            return None;
        }
        let previous = std::mem::replace(&mut self.blocks, blocks);
        self.undo.push(previous);
        self.redo.clear();
        Some(self.html())
    }

    /// Replace the document with what the user typed in plain-text markup.
    /// Text identical to [`Self::plain_text`] leaves the stored HTML alone.
    pub fn edit_plain(&mut self, text: &str) -> Option<String> {
        if text == self.plain_text() {
            return None;
        }
        self.edit(parse_plain(text))
    }

    /// Adopt a value set from outside the editor. No history entry is
    /// recorded and nothing is emitted.
    pub fn sync_external(&mut self, html: &str) {
        if html != self.html() {
            self.blocks = parse_html(html);
        }
    }

    pub fn undo(&mut self) -> Option<String> {
        let previous = self.undo.pop()?;
        let current = std::mem::replace(&mut self.blocks, previous);
        self.redo.push(current);
        Some(self.html())
    }

    pub fn redo(&mut self) -> Option<String> {
        let next = self.redo.pop()?;
        let current = std::mem::replace(&mut self.blocks, next);
        self.undo.push(current);
        Some(self.html())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_serialize_blocks() {
        let html = "<h2>Intro</h2><p>Hello <strong>world</strong></p><ul><li><p>a</p></li><li><p>b</p></li></ul>";
        let editor = RichTextEditor::new(html);
        assert_eq!(
            editor.blocks(),
            &[
                Block::Heading { level: 2, content: "Intro".into() },
                Block::Paragraph("Hello <strong>world</strong>".into()),
                Block::BulletList(vec!["a".into(), "b".into()]),
            ]
        );
        assert_eq!(editor.html(), html);
    }

    #[test]
    fn test_loose_text_becomes_paragraph() {
        let editor = RichTextEditor::new("just text");
        assert_eq!(editor.html(), "<p>just text</p>");
    }

    #[test]
    fn test_plain_markup() {
        let blocks = parse_plain("# Title\n\nfirst line\nsecond line\n\n- one\n- two\n\n1. x\n2. y\n\n> quoted <b>bold</b>\n\n```\nlet a = 1;\n```");
        assert_eq!(
            blocks,
            vec![
                Block::Heading { level: 1, content: "Title".into() },
                Block::Paragraph("first line second line".into()),
                Block::BulletList(vec!["one".into(), "two".into()]),
                Block::OrderedList(vec!["x".into(), "y".into()]),
                Block::Quote("quoted <b>bold</b>".into()),
                Block::Code("let a = 1;".into()),
            ]
        );
    }

    #[test]
    fn test_user_edit_records_history_and_emits() {
        let mut editor = RichTextEditor::new("<p>one</p>");
        let emitted = editor.edit_plain("two");
        assert_eq!(emitted.as_deref(), Some("<p>two</p>"));
        assert!(editor.can_undo());
        assert_eq!(editor.edit_plain("two"), None);

        assert_eq!(editor.undo().as_deref(), Some("<p>one</p>"));
        assert_eq!(editor.redo().as_deref(), Some("<p>two</p>"));
    }

    #[test]
    fn test_external_sync_skips_history() {
        let mut editor = RichTextEditor::new("<p>one</p>");
        editor.sync_external("<p>from server</p>");
        assert_eq!(editor.html(), "<p>from server</p>");
        assert!(!editor.can_undo());
        assert_eq!(editor.undo(), None);
    }

    #[test]
    fn test_plain_text_round_trip_for_editing() {
        let editor = RichTextEditor::new("<h1>T</h1><p>body</p><ol><li><p>a</p></li></ol>");
        assert_eq!(editor.plain_text(), "# T\n\nbody\n\n1. a");
    }

    #[test]
    fn test_unchanged_plain_text_keeps_stored_html() {
        let html = "<p>Hello <strong>world</strong> &amp; co</p><h5>Small</h5>";
        let mut editor = RichTextEditor::new(html);
        let plain = editor.plain_text();
        assert_eq!(editor.edit_plain(&plain), None);
        assert_eq!(editor.html(), html);
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_inline_markup_survives_an_edit() {
        let mut editor = RichTextEditor::new("<p>Hello <em>there</em> &amp; co</p><h6>Tiny</h6>");
        let edited = editor.plain_text().replace("Hello", "Hi");
        assert_eq!(
            editor.edit_plain(&edited).as_deref(),
            Some("<p>Hi <em>there</em> &amp; co</p><h6>Tiny</h6>")
        );
    }
}
