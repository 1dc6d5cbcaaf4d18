use std::borrow::Cow;

use crate::model::{TextInstruction, TextStyle};
use crate::style::{Emphasis, StyleStack};

#[derive(Debug, PartialEq)]
struct Tag {
    name: String,
    closing: bool,
    self_closing: bool,
}

#[derive(Debug, PartialEq)]
enum Token<'a> {
    Text(&'a str),
    Tag(Tag),
}

pub fn heading_size(level: u8, base: f32) -> f32 {
    match level {
        1 => 18.0,
        2 => 16.0,
        3 => 14.0,
        4 => 13.0,
        5 => 12.0,
        6 => 11.0,
        _ => base,
    }
}

fn heading_level(name: &str) -> Option<u8> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

fn emphasis(name: &str) -> Option<Emphasis> {
    match name {
        "strong" | "b" => Some(Emphasis::Bold),
        "em" | "i" => Some(Emphasis::Italic),
        "u" => Some(Emphasis::Underline),
        _ => None,
    }
}

/// Reads one tag starting at `<`. Returns the tag and the number of bytes it
/// spans, or `None` when the `<` does not open a well-formed tag.
fn scan_tag(s: &str) -> Option<(Tag, usize)> {
    let bytes = s.as_bytes();
    let mut pos = 1;
    let closing = bytes.get(pos) == Some(&b'/');
    if closing {
        pos += 1;
    }
    if !bytes.get(pos).is_some_and(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    let name_start = pos;
    while bytes.get(pos).is_some_and(|b| b.is_ascii_alphanumeric()) {
        pos += 1;
    }
    let name = s[name_start..pos].to_ascii_lowercase();
    match bytes.get(pos) {
        Some(b) if b.is_ascii_whitespace() || *b == b'/' || *b == b'>' => {}
        _ => return None,
    }

    let mut quote: Option<u8> = None;
    while let Some(&b) = bytes.get(pos) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => {
                let self_closing = pos > name_start && bytes[pos - 1] == b'/';
                let tag = Tag {
                    name,
                    closing,
                    self_closing,
                };
                return Some((tag, pos + 1));
            }
            None => {}
        }
        pos += 1;
    }
    None
}

fn tokenize(html: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let bytes = html.as_bytes();
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }
        let rest = &html[i..];
        // Comments and declarations (<!doctype>, <?xml?>) are dropped whole.
        let skip = if let Some(body) = rest.strip_prefix("<!--") {
            Some(body.find("-->").map_or(rest.len(), |end| 4 + end + 3))
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            rest.find('>').map(|end| end + 1)
        } else {
            None
        };
        if let Some(len) = skip {
            if text_start < i {
                tokens.push(Token::Text(&html[text_start..i]));
            }
            i += len;
            text_start = i;
            continue;
        }
        match scan_tag(rest) {
            Some((tag, len)) => {
                if text_start < i {
                    tokens.push(Token::Text(&html[text_start..i]));
                }
                tokens.push(Token::Tag(tag));
                i += len;
                text_start = i;
            }
            None => i += 1,
        }
    }
    if text_start < html.len() {
        tokens.push(Token::Text(&html[text_start..]));
    }
    tokens
}

fn named_entity(name: &str) -> Option<char> {
    match name {
        "nbsp" => Some(' '),
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => None,
    }
}

fn decode_entity(body: &str) -> Option<char> {
    if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        // A numeric no-break space still behaves as a plain space.
        return if code == 0xA0 { Some(' ') } else { char::from_u32(code) };
    }
    named_entity(body)
}

pub(crate) fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let decoded = after
            .find(';')
            .filter(|&end| end > 0 && end <= 10)
            .and_then(|end| decode_entity(&after[..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &after[end + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            in_space = true;
        } else {
            if in_space {
                out.push(' ');
                in_space = false;
            }
            out.push(c);
        }
    }
    if in_space {
        out.push(' ');
    }
    out
}

/// Collapses whitespace inside each hard line and trims the block.
fn normalize_block_text(text: &str) -> String {
    let lines: Vec<String> = text
        .split('\n')
        .map(|line| collapse_whitespace(line).trim().to_string())
        .collect();
    let first = lines.iter().position(|l| !l.is_empty());
    let last = lines.iter().rposition(|l| !l.is_empty());
    match (first, last) {
        (Some(first), Some(last)) => lines[first..=last].join("\n"),
        _ => String::new(),
    }
}

enum BlockKind {
    Heading(u8),
    Paragraph,
    Item { marker: String },
}

struct OpenBlock {
    kind: BlockKind,
    text: String,
}

struct ListFrame {
    ordered: bool,
    count: usize,
}

struct Walker {
    out: Vec<TextInstruction>,
    base: TextStyle,
    inline: StyleStack,
    block: Option<OpenBlock>,
    lists: Vec<ListFrame>,
    run: String,
    run_style: TextStyle,
}

impl Walker {
    fn new(base: TextStyle) -> Self {
        Walker {
            out: Vec::new(),
            base,
            inline: StyleStack::new(base),
            block: None,
            lists: Vec::new(),
            run: String::new(),
            run_style: base,
        }
    }

    fn text(&mut self, raw: &str) {
        let text = decode_entities(raw);
        if let Some(block) = self.block.as_mut() {
            // Source newlines are ordinary whitespace; only <br> breaks a block.
            block.text.push_str(&collapse_whitespace(&text));
            return;
        }
        if !self.lists.is_empty() {
            // Text inside a list but outside any <li>, e.g. after a nested list.
            if !text.trim().is_empty() {
                self.block = Some(OpenBlock {
                    kind: BlockKind::Item { marker: String::new() },
                    text: collapse_whitespace(&text),
                });
            }
            return;
        }
        let style = self.inline.current();
        if !self.run.is_empty() && style != self.run_style {
            self.flush_run();
        }
        self.run_style = style;
        self.run.push_str(&text);
    }

    fn flush_run(&mut self) {
        let pending = std::mem::take(&mut self.run);
        if pending.is_empty() {
            return;
        }
        let prev_run = match self.out.last_mut() {
            Some(TextInstruction::Run { text, .. }) => Some(text),
            _ => None,
        };
        let mut text = collapse_whitespace(&pending);
        if text.trim().is_empty() {
            // Whitespace between two runs still separates their words.
            if let Some(prev) = prev_run
                && !prev.ends_with(' ')
            {
                prev.push(' ');
            }
            return;
        }
        if prev_run.is_none() {
            text = text.trim_start().to_string();
        }
        self.out.push(TextInstruction::Run {
            text,
            style: self.run_style,
        });
    }

    /// Ends a sequence of inline runs before anything that breaks the line.
    fn end_runs(&mut self) {
        self.flush_run();
        if let Some(TextInstruction::Run { text, .. }) = self.out.last_mut() {
            let trimmed = text.trim_end().len();
            text.truncate(trimmed);
            if text.is_empty() {
                self.out.pop();
            }
        }
    }

    fn flush_block(&mut self) {
        let Some(block) = self.block.take() else {
            return;
        };
        let text = normalize_block_text(&block.text);
        // An editor's blank line is a paragraph holding only a <br>.
        let blank_line = text.is_empty() && block.text.contains('\n');
        match block.kind {
            BlockKind::Heading(level) => self.out.push(TextInstruction::Block {
                text,
                style: self
                    .base
                    .sized(heading_size(level, self.base.font_size))
                    .bold(),
            }),
            BlockKind::Paragraph if !text.is_empty() || blank_line => {
                self.out.push(TextInstruction::Block {
                    text,
                    style: self.base,
                })
            }
            BlockKind::Item { marker } if !text.is_empty() => {
                self.out.push(TextInstruction::ListItem {
                    text,
                    style: self.base,
                    marker,
                })
            }
            _ => {}
        }
    }

    fn in_item(&self) -> bool {
        matches!(
            self.block,
            Some(OpenBlock {
                kind: BlockKind::Item { .. },
                ..
            })
        )
    }

    fn open_block(&mut self, kind: BlockKind) {
        self.end_runs();
        self.flush_block();
        self.block = Some(OpenBlock {
            kind,
            text: String::new(),
        });
    }

    fn open(&mut self, tag: &Tag) {
        let name = tag.name.as_str();
        if let Some(level) = heading_level(name) {
            // Headings and paragraphs nested in a list item stay part of the item.
            if !self.in_item() {
                self.open_block(BlockKind::Heading(level));
            }
            return;
        }
        if let Some(emphasis) = emphasis(name) {
            self.inline.push(emphasis);
            return;
        }
        match name {
            "p" if !self.in_item() => self.open_block(BlockKind::Paragraph),
            "br" => match self.block.as_mut() {
                Some(block) => block.text.push('\n'),
                None => {
                    self.end_runs();
                    self.out.push(TextInstruction::LineBreak);
                }
            },
            "ul" | "ol" => {
                self.end_runs();
                self.flush_block();
                self.lists.push(ListFrame {
                    ordered: name == "ol",
                    count: 0,
                });
            }
            "li" => {
                let marker = match self.lists.last_mut() {
                    Some(list) => {
                        list.count += 1;
                        if list.ordered {
                            format!("{}. ", list.count)
                        } else {
                            "\u{2022} ".to_string()
                        }
                    }
                    None => "\u{2022} ".to_string(),
                };
                self.open_block(BlockKind::Item { marker });
            }
            _ => {}
        }
    }

    fn close(&mut self, tag: &Tag) {
        let name = tag.name.as_str();
        if heading_level(name).is_some() || name == "p" {
            if !self.in_item() {
                self.flush_block();
            }
            return;
        }
        if let Some(emphasis) = emphasis(name) {
            self.inline.pop(emphasis);
            return;
        }
        match name {
            "li" => {
                if self.in_item() {
                    self.flush_block();
                }
            }
            "ul" | "ol" => {
                self.flush_block();
                self.lists.pop();
            }
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<TextInstruction> {
        self.end_runs();
        self.flush_block();
        self.out
    }
}

/// Converts editor rich text into text-flow instructions, in document order.
///
/// Never fails: unknown tags are stripped, a stray `<` is kept as text and
/// unclosed blocks are closed at the next block or at the end of input.
pub fn parse(html: &str, base: TextStyle) -> Vec<TextInstruction> {
    if html.trim().is_empty() {
        return Vec::new();
    }
    let mut walker = Walker::new(base);
    for token in tokenize(html) {
        match token {
            Token::Text(text) => walker.text(text),
            Token::Tag(tag) if tag.closing => walker.close(&tag),
            Token::Tag(tag) if tag.self_closing && tag.name != "br" => {}
            Token::Tag(tag) => walker.open(&tag),
        }
    }
    walker.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizer_reads_attributes_and_self_closing_tags() {
        let tokens = tokenize(r#"<p class="a>b">x<br/></P>"#);
        assert_eq!(tokens.len(), 4);
        assert!(matches!(&tokens[0], Token::Tag(t) if t.name == "p" && !t.closing));
        assert_eq!(tokens[1], Token::Text("x"));
        assert!(matches!(&tokens[2], Token::Tag(t) if t.name == "br" && t.self_closing));
        assert!(matches!(&tokens[3], Token::Tag(t) if t.name == "p" && t.closing));
    }

    #[test]
    fn stray_angle_brackets_stay_text() {
        let tokens = tokenize("a < b <3 <p");
        assert_eq!(tokens, vec![Token::Text("a < b <3 <p")]);
    }

    #[test]
    fn comments_are_skipped() {
        let tokens = tokenize("a<!-- <p>hidden</p> -->b");
        assert_eq!(tokens, vec![Token::Text("a"), Token::Text("b")]);
    }

    #[test]
    fn entities_decode() {
        assert_eq!(decode_entities("a&nbsp;b &amp; c"), "a b & c");
        assert_eq!(decode_entities("&#65;&#x42;&lt;"), "AB<");
        assert_eq!(decode_entities("AT&T &bogus; &"), "AT&T &bogus; &");
    }

    #[test]
    fn block_text_keeps_hard_breaks() {
        assert_eq!(normalize_block_text("  one \n\n two  \n "), "one\n\ntwo");
        assert_eq!(normalize_block_text(" \n "), "");
    }
}
