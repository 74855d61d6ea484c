//! Parser state for body extraction: an owned stack of open elements, each
//! accumulating the text of its descendants.
//!
//! [`walk`] replays a parsed document as open/text/comment/close events in
//! document order. [`ExtractorState`] consumes those events without ever
//! looking back at the tree, so it behaves the same as a streaming tag
//! parser would.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Node};

/// Subtrees whose text is never collected.
const SKIP_TAGS: [&str; 12] = [
    "script", "style", "noscript", "template", "iframe", "svg", "math", "object", "embed", "video",
    "audio", "canvas",
];

/// Elements that start a new line in the accumulated text.
const BLOCK_TAGS: [&str; 28] = [
    "p", "div", "br", "h1", "h2", "h3", "h4", "h5", "h6", "li", "ul", "ol", "dl", "dt", "dd",
    "section", "article", "main", "header", "footer", "aside", "nav", "blockquote", "pre", "table",
    "tr", "figure", "figcaption",
];

/// Elements a comment marker can anchor.
const ANCHORABLE_TAGS: [&str; 3] = ["div", "section", "article"];

static CONTENT_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|[\s_-])(?:article[-_]?body|post[-_]?body|entry[-_]?content|content|body)(?:$|[\s_-])")
        .expect("valid regex")
});

/// The attributes of an opening tag the extractor cares about.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenTag<'a> {
    pub name: &'a str,
    pub id: Option<&'a str>,
    pub class: Option<&'a str>,
    pub itemprop: Option<&'a str>,
}

impl OpenTag<'_> {
    fn is_tagged_container(&self) -> bool {
        if self
            .itemprop
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("articleBody"))
        {
            return true;
        }
        [self.id, self.class]
            .into_iter()
            .flatten()
            .any(|v| CONTENT_NAME.is_match(v))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Plain,
    Tagged,
    Anchored,
}

#[derive(Debug)]
struct ElementFrame {
    tag: String,
    role: Role,
    text: String,
    paragraphs: Vec<String>,
}

impl ElementFrame {
    fn new(tag: &str, role: Role) -> Self {
        Self {
            tag: tag.to_string(),
            role,
            text: String::new(),
            paragraphs: Vec::new(),
        }
    }

    /// Paragraph elements when there are any, raw text lines otherwise.
    fn lines(&self) -> Vec<String> {
        if self.paragraphs.is_empty() {
            split_lines(&self.text)
        } else {
            self.paragraphs.clone()
        }
    }
}

/// Everything collected from one document.
#[derive(Debug, Default)]
pub struct Collected {
    /// Lines of the `<body>` element, if one was closed.
    pub body: Option<Vec<String>>,
    /// One entry per `itemprop`/`id`/`class` tagged container.
    pub tagged: Vec<Vec<String>>,
    /// One entry per comment-anchored container.
    pub anchored: Vec<Vec<String>>,
}

pub struct ExtractorState {
    stack: Vec<ElementFrame>,
    skip_depth: usize,
    pending_anchor: bool,
    markers: Vec<String>,
    collected: Collected,
}

impl ExtractorState {
    pub fn new(comment_markers: &[String]) -> Self {
        Self {
            stack: vec![ElementFrame::new("#document", Role::Plain)],
            skip_depth: 0,
            pending_anchor: false,
            markers: comment_markers.iter().map(|m| m.to_lowercase()).collect(),
            collected: Collected::default(),
        }
    }

    pub fn open(&mut self, tag: &OpenTag<'_>) {
        let name = tag.name.to_ascii_lowercase();
        if SKIP_TAGS.contains(&name.as_str()) {
            self.skip_depth += 1;
        }

        let role = if self.skip_depth > 0 {
            Role::Plain
        } else if tag.is_tagged_container() {
            Role::Tagged
        } else if self.pending_anchor && ANCHORABLE_TAGS.contains(&name.as_str()) {
            Role::Anchored
        } else {
            Role::Plain
        };
        self.pending_anchor = false;

        if BLOCK_TAGS.contains(&name.as_str()) {
            self.push_break();
        }
        self.stack.push(ElementFrame::new(&name, role));
    }

    pub fn text(&mut self, text: &str) {
        if self.skip_depth > 0 {
            return;
        }
        if !text.trim().is_empty() {
            self.pending_anchor = false;
        }
        let Some(top) = self.stack.last_mut() else {
            return;
        };
        let mut last_space = top.text.ends_with([' ', '\n']) || top.text.is_empty();
        for ch in text.chars() {
            if ch.is_whitespace() {
                if !last_space {
                    top.text.push(' ');
                    last_space = true;
                }
            } else {
                top.text.push(ch);
                last_space = false;
            }
        }
    }

    pub fn comment(&mut self, comment: &str) {
        if self.skip_depth > 0 {
            return;
        }
        let lowered = comment.to_lowercase();
        if self.markers.iter().any(|m| lowered.contains(m.as_str())) {
            self.pending_anchor = true;
        }
    }

    /// Close the innermost open element named `name`, resolving any elements
    /// left open inside it. Unmatched end tags are ignored.
    pub fn close(&mut self, name: &str) {
        let name = name.to_ascii_lowercase();
        let Some(pos) = self.stack.iter().rposition(|f| f.tag == name) else {
            return;
        };
        if pos == 0 {
            return;
        }
        while self.stack.len() > pos {
            self.pop_frame();
        }
    }

    /// Resolve any elements still open and hand back what was collected.
    pub fn finish(mut self) -> Collected {
        while self.stack.len() > 1 {
            self.pop_frame();
        }
        self.collected
    }

    fn pop_frame(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        if SKIP_TAGS.contains(&frame.tag.as_str()) {
            self.skip_depth = self.skip_depth.saturating_sub(1);
        }

        match frame.role {
            Role::Tagged => self.collected.tagged.push(frame.lines()),
            Role::Anchored => self.collected.anchored.push(frame.lines()),
            Role::Plain => {}
        }
        if frame.tag == "body" && self.collected.body.is_none() {
            self.collected.body = Some(split_lines(&frame.text));
        }

        let is_block = BLOCK_TAGS.contains(&frame.tag.as_str());
        let Some(parent) = self.stack.last_mut() else {
            return;
        };
        if frame.tag == "p" {
            parent.paragraphs.extend(split_lines(&frame.text));
        }
        parent.paragraphs.extend(frame.paragraphs);
        parent.text.push_str(&frame.text);
        if is_block {
            parent.text.push('\n');
        }
    }

    fn push_break(&mut self) {
        if let Some(top) = self.stack.last_mut() {
            if !top.text.is_empty() && !top.text.ends_with('\n') {
                top.text.push('\n');
            }
        }
    }
}

/// Replay a parsed document through `state` in document order.
pub fn walk(document: &Html, state: &mut ExtractorState) {
    let mut work = vec![(document.tree.root(), false)];
    while let Some((node, closing)) = work.pop() {
        match node.value() {
            Node::Element(element) => {
                if closing {
                    state.close(element.name());
                    continue;
                }
                state.open(&OpenTag {
                    name: element.name(),
                    id: element.attr("id"),
                    class: element.attr("class"),
                    itemprop: element.attr("itemprop"),
                });
                work.push((node, true));
            }
            Node::Text(text) => {
                state.text(text);
                continue;
            }
            Node::Comment(comment) => {
                state.comment(comment);
                continue;
            }
            _ => {}
        }
        let children: Vec<_> = node.children().collect();
        work.extend(children.into_iter().rev().map(|child| (child, false)));
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect()
}
