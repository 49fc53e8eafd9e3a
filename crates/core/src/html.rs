//! HTML 문서 — 관대한(tag-soup) 파서와 arena 기반 요소 트리
//!
//! [`HtmlDocument`]는 HTML 소스를 한 번 파싱해 arena에 노드를 저장하고,
//! [`HtmlElement`]는 arena 인덱스로 노드를 가리킵니다. 부모/자식 링크가 모두
//! 인덱스이므로 순환 참조가 없습니다.
//!
//! # 파싱 규칙
//! - 태그/속성 이름은 소문자로 정규화되며, 중복 속성은 첫 번째 값이 유지됩니다.
//! - void 요소와 self-closing 구문(`<x/>`)은 자식을 갖지 않습니다.
//! - `script`, `style`, `textarea`, `title`의 내용은 마크업으로 해석하지 않습니다.
//! - 주석, doctype, processing instruction은 건너뜁니다.
//! - 종료 태그는 가장 가까운 같은 이름의 열린 요소를 닫고, 짝이 없으면 무시됩니다.
//! - 최상위 요소가 없거나 여러 개이면 합성 `html` 루트가 만들어집니다.
//!
//! # 사용 예시
//! ```
//! use pagehint_core::dom::{Document, Element};
//! use pagehint_core::html::HtmlDocument;
//!
//! let doc = HtmlDocument::parse("<html><body><p class=x>hi</p></body></html>").unwrap();
//! let p = &doc.query("p")[0];
//! assert_eq!(p.attribute("CLASS"), Some("x"));
//! assert_eq!(p.location().map(|l| l.column), Some(13));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::dom::{Document, Element, ElementRef, NodeKey, SourceLocation};
use crate::error::ParseError;

/// 기본 최대 입력 크기 (16 MB)
pub const DEFAULT_MAX_SIZE: usize = 16 * 1024 * 1024;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// `p`를 암묵적으로 닫는 블록 요소
const CLOSES_P: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "details",
    "div",
    "dl",
    "fieldset",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "ul",
];

const P_SCOPE_BOUNDARY: &[&str] = &[
    "button", "caption", "html", "object", "table", "td", "template", "th",
];

static NEXT_DOCUMENT_ID: AtomicUsize = AtomicUsize::new(1);

#[derive(Debug)]
struct Node {
    tag: String,
    attributes: Vec<(String, String)>,
    parent: Option<usize>,
    children: Vec<usize>,
    location: Option<SourceLocation>,
    /// 외부 HTML의 바이트 범위 [start, end)
    span: (usize, usize),
}

#[derive(Debug)]
struct Arena {
    id: usize,
    source: String,
    nodes: Vec<Node>,
    root: usize,
}

/// 파싱된 HTML 문서
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    arena: Arc<Arena>,
}

impl HtmlDocument {
    /// 기본 크기 제한([`DEFAULT_MAX_SIZE`])으로 파싱합니다.
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        Self::parse_with_limit(source, DEFAULT_MAX_SIZE)
    }

    /// 지정한 크기 제한으로 파싱합니다.
    pub fn parse_with_limit(source: &str, max_size: usize) -> Result<Self, ParseError> {
        if source.len() > max_size {
            return Err(ParseError::TooLarge {
                size: source.len(),
                max: max_size,
            });
        }

        let (nodes, root) = TreeBuilder::new(source).build();
        Ok(Self {
            arena: Arc::new(Arena {
                id: NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed),
                source: source.to_owned(),
                nodes,
                root,
            }),
        })
    }

    /// 합성 루트를 포함한 요소 수
    pub fn element_count(&self) -> usize {
        self.arena.nodes.len()
    }

    /// 구체 타입의 루트 요소
    pub fn root_element(&self) -> HtmlElement {
        HtmlElement {
            arena: Arc::clone(&self.arena),
            index: self.arena.root,
        }
    }
}

impl Document for HtmlDocument {
    fn root(&self) -> ElementRef {
        Arc::new(self.root_element())
    }

    fn source(&self) -> &str {
        &self.arena.source
    }
}

/// arena 노드를 가리키는 요소 핸들
#[derive(Clone)]
pub struct HtmlElement {
    arena: Arc<Arena>,
    index: usize,
}

impl HtmlElement {
    fn node(&self) -> &Node {
        &self.arena.nodes[self.index]
    }

    fn handle(&self, index: usize) -> ElementRef {
        Arc::new(Self {
            arena: Arc::clone(&self.arena),
            index,
        })
    }
}

impl std::fmt::Debug for HtmlElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let node = self.node();
        f.debug_struct("HtmlElement")
            .field("tag", &node.tag)
            .field("index", &self.index)
            .field("location", &node.location)
            .finish()
    }
}

impl Element for HtmlElement {
    fn tag_name(&self) -> &str {
        &self.node().tag
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.node()
            .attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn attributes(&self) -> &[(String, String)] {
        &self.node().attributes
    }

    fn key(&self) -> NodeKey {
        NodeKey {
            document: self.arena.id,
            node: self.index,
        }
    }

    fn parent(&self) -> Option<ElementRef> {
        self.node().parent.map(|p| self.handle(p))
    }

    fn children(&self) -> Vec<ElementRef> {
        self.node()
            .children
            .iter()
            .map(|&c| self.handle(c))
            .collect()
    }

    fn location(&self) -> Option<SourceLocation> {
        self.node().location
    }

    fn outer_html(&self) -> String {
        let (start, end) = self.node().span;
        self.arena
            .source
            .get(start..end)
            .unwrap_or_default()
            .to_owned()
    }
}

// ─── Tree Builder ───────────────────────────────────────────────

struct TreeBuilder<'a> {
    src: &'a str,
    bytes: &'a [u8],
    /// ASCII 소문자 사본 (바이트 오프셋이 원본과 동일)
    lower: String,
    line_starts: Vec<usize>,
    nodes: Vec<Node>,
    open: Vec<usize>,
    top_level: Vec<usize>,
    pos: usize,
}

impl<'a> TreeBuilder<'a> {
    fn new(src: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(src.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            src,
            bytes: src.as_bytes(),
            lower: src.to_ascii_lowercase(),
            line_starts,
            nodes: Vec::new(),
            open: Vec::new(),
            top_level: Vec::new(),
            pos: 0,
        }
    }

    fn build(mut self) -> (Vec<Node>, usize) {
        while let Some(offset) = self.src[self.pos..].find('<') {
            self.pos += offset;
            let rest = &self.src[self.pos..];

            if rest.starts_with("<!--") {
                self.skip_past("-->", self.pos + 4);
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                self.skip_past(">", self.pos + 2);
            } else if rest.starts_with("</") {
                self.end_tag();
            } else if self
                .bytes
                .get(self.pos + 1)
                .is_some_and(u8::is_ascii_alphabetic)
            {
                self.start_tag();
            } else {
                self.pos += 1;
            }
        }

        let len = self.src.len();
        while let Some(index) = self.open.pop() {
            self.nodes[index].span.1 = len;
        }

        let root = match self.top_level.as_slice() {
            [single] => *single,
            _ => self.synthetic_root(),
        };
        (self.nodes, root)
    }

    fn synthetic_root(&mut self) -> usize {
        let index = self.nodes.len();
        for &child in &self.top_level {
            self.nodes[child].parent = Some(index);
        }
        self.nodes.push(Node {
            tag: "html".to_owned(),
            attributes: Vec::new(),
            parent: None,
            children: std::mem::take(&mut self.top_level),
            location: None,
            span: (0, self.src.len()),
        });
        index
    }

    fn skip_past(&mut self, needle: &str, from: usize) {
        self.pos = match self.src.get(from..).and_then(|s| s.find(needle)) {
            Some(i) => from + i + needle.len(),
            None => self.src.len(),
        };
    }

    fn location_of(&self, offset: usize) -> SourceLocation {
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let line_start = self.line_starts[line - 1];
        let column = self.src[line_start..offset].chars().count() + 1;
        SourceLocation {
            line: u32::try_from(line).unwrap_or(u32::MAX),
            column: u32::try_from(column).unwrap_or(u32::MAX),
        }
    }

    fn read_name(&mut self) -> String {
        let start = self.pos;
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            if b.is_ascii_whitespace() || b == b'/' || b == b'>' {
                break;
            }
            self.pos += 1;
        }
        self.lower[start..self.pos].to_owned()
    }

    fn skip_whitespace(&mut self) {
        while self
            .bytes
            .get(self.pos)
            .is_some_and(u8::is_ascii_whitespace)
        {
            self.pos += 1;
        }
    }

    fn end_tag(&mut self) {
        let tag_start = self.pos;
        self.pos += 2;
        let name = self.read_name();
        self.skip_past(">", self.pos);

        if name.is_empty() {
            return;
        }
        let Some(depth) = self.open.iter().rposition(|&i| self.nodes[i].tag == name) else {
            return;
        };

        let matched = self.open[depth];
        let implicit: Vec<usize> = self.open.drain(depth + 1..).collect();
        for index in implicit {
            self.nodes[index].span.1 = tag_start;
        }
        self.open.pop();
        self.nodes[matched].span.1 = self.pos;
    }

    fn start_tag(&mut self) {
        let tag_start = self.pos;
        self.pos += 1;
        let tag = self.read_name();
        let (attributes, self_closing) = self.read_attributes();
        let tag_end = self.pos;

        self.close_implied(&tag, tag_start);

        let index = self.nodes.len();
        let parent = self.open.last().copied();
        match parent {
            Some(p) => self.nodes[p].children.push(index),
            None => self.top_level.push(index),
        }
        self.nodes.push(Node {
            tag,
            attributes,
            parent,
            children: Vec::new(),
            location: Some(self.location_of(tag_start)),
            span: (tag_start, tag_end),
        });

        let tag = self.nodes[index].tag.as_str();
        if self_closing || VOID_ELEMENTS.contains(&tag) {
            return;
        }
        if RAW_TEXT_ELEMENTS.contains(&tag) {
            let closing = format!("</{tag}");
            let end = match self.lower[tag_end..].find(&closing) {
                Some(i) => {
                    let close_start = tag_end + i;
                    match self.src[close_start..].find('>') {
                        Some(j) => close_start + j + 1,
                        None => self.src.len(),
                    }
                }
                None => self.src.len(),
            };
            self.nodes[index].span.1 = end;
            self.pos = end;
            return;
        }
        self.open.push(index);
    }

    /// 속성 목록과 self-closing 여부를 읽고 `>` 다음으로 이동합니다.
    fn read_attributes(&mut self) -> (Vec<(String, String)>, bool) {
        let mut attributes: Vec<(String, String)> = Vec::new();
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            match self.bytes.get(self.pos) {
                None => break,
                Some(b'>') => {
                    self.pos += 1;
                    break;
                }
                Some(b'/') => {
                    self.pos += 1;
                    if self.bytes.get(self.pos) == Some(&b'>') {
                        self_closing = true;
                        self.pos += 1;
                        break;
                    }
                    continue;
                }
                Some(_) => {}
            }

            let name_start = self.pos;
            while let Some(&b) = self.bytes.get(self.pos) {
                if b.is_ascii_whitespace() || matches!(b, b'=' | b'>' | b'/') {
                    break;
                }
                self.pos += 1;
            }
            if self.pos == name_start {
                // '=' 로 시작하는 이름 같은 비정상 입력
                self.pos += 1;
                continue;
            }
            let name = self.lower[name_start..self.pos].to_owned();

            self.skip_whitespace();
            let value = if self.bytes.get(self.pos) == Some(&b'=') {
                self.pos += 1;
                self.skip_whitespace();
                self.read_attribute_value()
            } else {
                String::new()
            };

            if !attributes.iter().any(|(existing, _)| *existing == name) {
                attributes.push((name, value));
            }
        }

        (attributes, self_closing)
    }

    fn read_attribute_value(&mut self) -> String {
        match self.bytes.get(self.pos) {
            Some(&quote) if quote == b'"' || quote == b'\'' => {
                let start = self.pos + 1;
                let end = self.bytes[start..]
                    .iter()
                    .position(|&b| b == quote)
                    .map_or(self.bytes.len(), |i| start + i);
                self.pos = (end + 1).min(self.bytes.len());
                self.src[start..end].to_owned()
            }
            _ => {
                let start = self.pos;
                while let Some(&b) = self.bytes.get(self.pos) {
                    if b.is_ascii_whitespace() || b == b'>' {
                        break;
                    }
                    self.pos += 1;
                }
                self.src[start..self.pos].to_owned()
            }
        }
    }

    /// 새 시작 태그가 암묵적으로 닫는 열린 요소를 닫습니다.
    fn close_implied(&mut self, tag: &str, at: usize) {
        let (closable, boundary): (&[&str], &[&str]) = match tag {
            "li" => (&["li"], &["ul", "ol", "menu"]),
            "dt" | "dd" => (&["dt", "dd"], &["dl"]),
            "tr" => (&["tr"], &["table", "thead", "tbody", "tfoot"]),
            "td" | "th" => (&["td", "th"], &["tr", "table"]),
            "thead" | "tbody" | "tfoot" => (&["thead", "tbody", "tfoot"], &["table"]),
            "option" => (&["option"], &["select", "datalist", "optgroup"]),
            "body" => (&["head"], &["html"]),
            t if CLOSES_P.contains(&t) => (&["p"], P_SCOPE_BOUNDARY),
            _ => return,
        };

        for depth in (0..self.open.len()).rev() {
            let open_tag = self.nodes[self.open[depth]].tag.as_str();
            if closable.contains(&open_tag) {
                let closed: Vec<usize> = self.open.drain(depth..).collect();
                for index in closed {
                    self.nodes[index].span.1 = at;
                }
                return;
            }
            if boundary.contains(&open_tag) {
                return;
            }
        }
    }
}
