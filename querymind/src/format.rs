//! Bot reply formatting.
//!
//! Replies are split into display segments: list lines of the form
//! `- Title (http://...)` become link cards, and bare URLs in prose become
//! links. Anything else is passed through verbatim.

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;

/// Marker that switches a reply into line-by-line mode.
const LIST_MARKER: &str = "- ";
const ARXIV_PREFIX: &str = "http://arxiv.org/abs/";

static CARD_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-\s+(?P<title>.*?)\s*\((?P<url>https?://\S+)\)\s*$")
        .expect("card pattern is valid")
});

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("url pattern is valid"));

/// One piece of a formatted reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A titled link, from a `- Title (url)` line.
    Card { title: String, url: String },
    /// A whole line of plain text (line-by-line mode).
    Line(String),
    /// A run of plain text inside prose.
    Text(String),
    /// A bare URL inside prose.
    Link(String),
}

/// Split a bot reply into display segments.
pub fn format_bot_response(text: &str) -> Vec<Segment> {
    if text.contains(ARXIV_PREFIX) || text.contains(LIST_MARKER) {
        text.split('\n').map(format_line).collect()
    } else {
        split_links(text)
    }
}

fn format_line(line: &str) -> Segment {
    CARD_LINE
        .captures(line.trim())
        .and_then(|caps| {
            let title = caps["title"].trim();
            (!title.is_empty()).then(|| Segment::Card {
                title: title.to_string(),
                url: caps["url"].to_string(),
            })
        })
        .unwrap_or_else(|| Segment::Line(line.to_string()))
}

fn split_links(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;
    for m in URL.find_iter(text) {
        if m.start() > last {
            segments.push(Segment::Text(text[last..m.start()].to_string()));
        }
        segments.push(Segment::Link(m.as_str().to_string()));
        last = m.end();
    }
    if last < text.len() || segments.is_empty() {
        segments.push(Segment::Text(text[last..].to_string()));
    }
    segments
}

/// Render segments as terminal text.
pub fn render_plain(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Card { title, url } => {
                let _ = writeln!(out, "  * {title}");
                let _ = writeln!(out, "    {url}");
            }
            Segment::Line(line) => {
                out.push_str(line);
                out.push('\n');
            }
            Segment::Text(text) => out.push_str(text),
            Segment::Link(url) => {
                let _ = write!(out, "<{url}>");
            }
        }
    }
    if out.ends_with('\n') {
        out.pop();
    }
    out
}
