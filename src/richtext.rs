//! Utilities for working with styled text fragments.
//!
//! Cell and title text may carry a small inline markup subset:
//!
//! - `<b>…</b>` / `<strong>…</strong>` for bold text
//! - `<i>…</i>` / `<em>…</em>` for italic text
//! - `<font size=10 color=#RRGGBB>…</font>` for font size and color changes (`face`/`name`
//!   attributes are accepted and ignored, the document font family is always used)
//! - `<br/>` for an explicit line break
//! - the entities `&lt;`, `&gt;`, `&amp;`, `&quot;`, `&apos;` and `&#39;`
//!
//! [`parse_markup`] turns such text into [`RichText`], a list of lines made of [`Span`]s that can
//! be converted to `genpdf` [`StyledString`]s.

use std::fmt;

use genpdf::style::{Color, Style, StyledString};

/// A slice of text together with inline style attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Span {
    text: String,
    bold: bool,
    italic: bool,
    color: Option<Color>,
    font_size: Option<u8>,
}

impl Span {
    /// Creates a new span with the provided text and no styles applied.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Returns the raw text contained in this span.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns whether the span should be rendered in bold.
    pub fn is_bold(&self) -> bool {
        self.bold
    }

    /// Returns whether the span should be rendered in italic.
    pub fn is_italic(&self) -> bool {
        self.italic
    }

    /// Returns the configured color for the span, if any.
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Returns the font size override in points, if any.
    pub fn font_size(&self) -> Option<u8> {
        self.font_size
    }

    /// Marks the span as bold.
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Marks the span as italic.
    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Assigns a color to the span.
    pub fn colored(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Assigns a font size override to the span.
    pub fn sized(mut self, font_size: u8) -> Self {
        self.font_size = Some(font_size);
        self
    }

    fn to_style(&self) -> Style {
        let mut style = Style::new();
        if let Some(color) = self.color {
            style.set_color(color);
        }
        if let Some(size) = self.font_size {
            style.set_font_size(size);
        }
        if self.bold {
            style.set_bold();
        }
        if self.italic {
            style.set_italic();
        }
        style
    }

    /// Converts the span to a [`StyledString`]. Unset attributes inherit from the element style.
    pub fn to_styled_string(&self) -> StyledString {
        StyledString::new(self.text.clone(), self.to_style())
    }
}

impl From<&Span> for StyledString {
    fn from(span: &Span) -> Self {
        span.to_styled_string()
    }
}

impl From<Span> for StyledString {
    fn from(span: Span) -> Self {
        span.to_styled_string()
    }
}

/// Parsed rich text: one entry per line, each line a sequence of spans.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RichText {
    lines: Vec<Vec<Span>>,
}

impl RichText {
    /// Wraps plain text without interpreting any markup.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            lines: vec![vec![Span::new(text)]],
        }
    }

    /// Returns the lines of the text.
    pub fn lines(&self) -> &[Vec<Span>] {
        &self.lines
    }

    /// Returns the text content without styling, lines joined by `\n`.
    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.iter().map(Span::text).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Parse errors produced by [`parse_markup`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    index: usize,
    message: String,
}

impl ParseError {
    fn new(index: usize, message: impl Into<String>) -> Self {
        Self {
            index,
            message: message.into(),
        }
    }

    /// Byte index in the input string where the error was detected.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Human-readable description of the parsing error.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at byte {})", self.message, self.index)
    }
}

impl std::error::Error for ParseError {}

#[derive(Clone, Copy, Debug, Default)]
struct StyleState {
    bold: bool,
    italic: bool,
    color: Option<Color>,
    font_size: Option<u8>,
}

impl StyleState {
    fn to_span(self, text: impl Into<String>) -> Span {
        Span {
            text: text.into(),
            bold: self.bold,
            italic: self.italic,
            color: self.color,
            font_size: self.font_size,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tag {
    Bold,
    Italic,
    Font,
}

impl Tag {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "b" | "strong" => Some(Self::Bold),
            "i" | "em" => Some(Self::Italic),
            "font" => Some(Self::Font),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Tag::Bold => "b",
            Tag::Italic => "i",
            Tag::Font => "font",
        }
    }
}

enum Token {
    Open(Tag, StyleState),
    Close(Tag),
    LineBreak,
}

/// Parses inline markup into [`RichText`].
///
/// The parser is strict: unknown tags, unbalanced tags and malformed attributes produce a
/// [`ParseError`] with the byte offset of the problem. A `<` that is not followed by a letter or
/// `/` is kept as literal text.
pub fn parse_markup(input: &str) -> Result<RichText, ParseError> {
    let mut lines: Vec<Vec<Span>> = vec![Vec::new()];
    let mut buffer = String::new();
    let mut open: Vec<(Tag, StyleState, usize)> = Vec::new();
    let mut state = StyleState::default();
    let mut index = 0;

    while index < input.len() {
        let rest = &input[index..];

        if starts_tag(rest) {
            let close = rest
                .find('>')
                .ok_or_else(|| ParseError::new(index, "unterminated tag; expected `>`"))?;
            flush_buffer(&mut buffer, &mut lines, state);
            match parse_tag(&rest[1..close], index, state)? {
                Token::Open(tag, nested) => {
                    open.push((tag, state, index));
                    state = nested;
                }
                Token::Close(tag) => match open.pop() {
                    Some((opened, saved, _)) if opened == tag => state = saved,
                    Some((opened, _, _)) => {
                        return Err(ParseError::new(
                            index,
                            format!(
                                "closing `</{}>` does not match open `<{}>`",
                                tag.name(),
                                opened.name()
                            ),
                        ))
                    }
                    None => {
                        return Err(ParseError::new(
                            index,
                            format!("unexpected closing `</{}>`", tag.name()),
                        ))
                    }
                },
                Token::LineBreak => lines.push(Vec::new()),
            }
            index += close + 1;
            continue;
        }

        if rest.starts_with('&') {
            if let Some((decoded, consumed)) = decode_entity(rest) {
                buffer.push(decoded);
                index += consumed;
                continue;
            }
        }

        let Some(ch) = rest.chars().next() else {
            break;
        };
        buffer.push(ch);
        index += ch.len_utf8();
    }

    if let Some((tag, _, opened_at)) = open.pop() {
        return Err(ParseError::new(
            opened_at,
            format!("unterminated `<{}>` tag", tag.name()),
        ));
    }

    flush_buffer(&mut buffer, &mut lines, state);
    Ok(RichText { lines })
}

fn starts_tag(rest: &str) -> bool {
    let mut chars = rest.chars();
    chars.next() == Some('<')
        && chars
            .next()
            .map_or(false, |next| next == '/' || next.is_ascii_alphabetic())
}

fn flush_buffer(buffer: &mut String, lines: &mut [Vec<Span>], state: StyleState) {
    if buffer.is_empty() {
        return;
    }
    if let Some(line) = lines.last_mut() {
        line.push(state.to_span(std::mem::take(buffer)));
    }
}

fn parse_tag(raw: &str, index: usize, state: StyleState) -> Result<Token, ParseError> {
    if let Some(name) = raw.strip_prefix('/') {
        let name = name.trim().to_ascii_lowercase();
        return Tag::from_name(&name)
            .map(Token::Close)
            .ok_or_else(|| ParseError::new(index, format!("unsupported tag `</{name}>`")));
    }

    let self_closing = raw.trim_end().ends_with('/');
    let body = raw.trim_end().trim_end_matches('/');
    let mut parts = body.split_whitespace();
    let name = parts.next().unwrap_or_default().to_ascii_lowercase();

    if name == "br" {
        return Ok(Token::LineBreak);
    }

    let tag = Tag::from_name(&name)
        .ok_or_else(|| ParseError::new(index, format!("unsupported tag `<{name}>`")))?;
    if self_closing {
        return Err(ParseError::new(
            index,
            format!("`<{name}/>` cannot be self-closing"),
        ));
    }

    let mut nested = state;
    match tag {
        Tag::Bold => nested.bold = true,
        Tag::Italic => nested.italic = true,
        Tag::Font => {
            for attribute in parts {
                apply_font_attribute(attribute, index, &mut nested)?;
            }
        }
    }
    Ok(Token::Open(tag, nested))
}

fn apply_font_attribute(
    attribute: &str,
    index: usize,
    state: &mut StyleState,
) -> Result<(), ParseError> {
    let (key, value) = attribute.split_once('=').ok_or_else(|| {
        ParseError::new(
            index,
            format!("expected `key=value` attribute, found `{attribute}`"),
        )
    })?;
    let value = value.trim_matches(|c| c == '"' || c == '\'');

    match key.to_ascii_lowercase().as_str() {
        "size" => {
            let size = value
                .parse::<f64>()
                .ok()
                .filter(|size| *size > 0.0 && *size <= f64::from(u8::MAX))
                .ok_or_else(|| ParseError::new(index, format!("invalid font size `{value}`")))?;
            state.font_size = Some(size.round() as u8);
        }
        "color" => state.color = Some(parse_hex_color(value, index)?),
        "face" | "name" => {}
        other => {
            return Err(ParseError::new(
                index,
                format!("unsupported font attribute `{other}`"),
            ))
        }
    }
    Ok(())
}

fn parse_hex_color(value: &str, index: usize) -> Result<Color, ParseError> {
    let hex = value.strip_prefix('#').ok_or_else(|| {
        ParseError::new(index, "expected `#` followed by a hexadecimal RGB value")
    })?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ParseError::new(
            index,
            "invalid RGB specification; expected 6 hexadecimal digits",
        ));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .map_err(|_| ParseError::new(index, "invalid RGB specification"))
    };
    Ok(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn decode_entity(rest: &str) -> Option<(char, usize)> {
    const ENTITIES: &[(&str, char)] = &[
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&amp;", '&'),
        ("&quot;", '"'),
        ("&apos;", '\''),
        ("&#39;", '\''),
        ("&nbsp;", '\u{a0}'),
    ];
    ENTITIES
        .iter()
        .find(|(entity, _)| rest.starts_with(entity))
        .map(|(entity, ch)| (*ch, entity.len()))
}
