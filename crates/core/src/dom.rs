//! DOM capability — 트래버설과 힌트가 문서를 읽기 위한 읽기 전용 인터페이스
//!
//! 트래버설 엔진은 [`Element`]와 [`Document`] trait만 사용하며,
//! 구체적인 파서 구현(예: [`crate::html::HtmlDocument`])과 분리됩니다.
//!
//! # 식별성
//! 요소 비교는 [`Element::is_same`]을 사용합니다. 같은 노드를 가리키는
//! 두 개의 [`ElementRef`]는 포인터가 달라도 같은 요소로 취급됩니다.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// 공유 가능한 요소 참조
pub type ElementRef = Arc<dyn Element>;

/// 공유 가능한 문서 참조
pub type DocumentRef = Arc<dyn Document>;

/// 소스 상의 위치 (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// 줄 번호
    pub line: u32,
    /// 열 번호 (문자 단위)
    pub column: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// 노드 식별 키
///
/// `document`는 프로세스 안에서 문서마다 유일하며, `node`는 문서 내 인덱스입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey {
    /// 문서 식별자
    pub document: usize,
    /// 문서 내 노드 인덱스
    pub node: usize,
}

/// 읽기 전용 요소 capability
pub trait Element: Send + Sync + fmt::Debug {
    /// 소문자 태그 이름
    fn tag_name(&self) -> &str;

    /// 속성 값을 조회합니다 (이름은 대소문자 구분 없음).
    fn attribute(&self, name: &str) -> Option<&str>;

    /// 모든 속성 (소스 순서, 소문자 이름)
    fn attributes(&self) -> &[(String, String)];

    /// 노드 식별 키
    fn key(&self) -> NodeKey;

    /// 두 참조가 같은 노드를 가리키는지 확인합니다.
    fn is_same(&self, other: &dyn Element) -> bool {
        self.key() == other.key()
    }

    /// 부모 요소 (루트이면 `None`)
    fn parent(&self) -> Option<ElementRef>;

    /// 자식 요소 (문서 순서)
    fn children(&self) -> Vec<ElementRef>;

    /// 시작 태그의 소스 위치 (합성 노드이면 `None`)
    fn location(&self) -> Option<SourceLocation>;

    /// 요소의 외부 HTML
    fn outer_html(&self) -> String;

    /// 속성 존재 여부
    fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }
}

/// 읽기 전용 문서 capability
pub trait Document: Send + Sync + fmt::Debug {
    /// 문서 루트 요소
    fn root(&self) -> ElementRef;

    /// 원본 소스
    fn source(&self) -> &str;

    /// 태그 이름과 일치하는 요소를 문서 순서로 반환합니다.
    fn query(&self, tag: &str) -> Vec<ElementRef> {
        let tag = tag.to_ascii_lowercase();
        let mut found = Vec::new();
        let mut stack = vec![self.root()];

        while let Some(element) = stack.pop() {
            if element.tag_name() == tag {
                found.push(Arc::clone(&element));
            }
            let mut children = element.children();
            children.reverse();
            stack.extend(children);
        }

        found
    }
}

/// 대소문자를 구분하지 않는 HTTP 헤더 맵
///
/// 키는 소문자로 정규화되어 저장됩니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    /// 빈 헤더 맵을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 헤더를 추가합니다. 기존 값은 대체됩니다.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.0
            .insert(name.as_ref().trim().to_ascii_lowercase(), value.into());
    }

    /// 헤더 값을 조회합니다.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .get(&name.trim().to_ascii_lowercase())
            .map(String::as_str)
    }

    /// 헤더 존재 여부
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// (소문자 이름, 값) 순회
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_are_case_insensitive() {
        let mut headers = Headers::new();
        headers.insert("Content-Type", "text/html");
        assert_eq!(headers.get("content-type"), Some("text/html"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("text/html"));
        assert!(headers.contains("Content-type"));
    }

    #[test]
    fn headers_insert_replaces_existing() {
        let mut headers = Headers::new();
        headers.insert("X-Powered-By", "a");
        headers.insert("x-powered-by", "b");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("x-powered-by"), Some("b"));
    }

    #[test]
    fn headers_from_iter_normalises_keys() {
        let headers: Headers = [("Server", "nginx"), ("X-UA-Compatible", "ie=edge")]
            .into_iter()
            .collect();
        let names: Vec<&str> = headers.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["server", "x-ua-compatible"]);
    }

    #[test]
    fn headers_serialize_as_map() {
        let headers: Headers = [("Server", "nginx")].into_iter().collect();
        let json = serde_json::to_string(&headers).unwrap();
        assert_eq!(json, r#"{"server":"nginx"}"#);
    }

    #[test]
    fn source_location_display() {
        let loc = SourceLocation { line: 3, column: 14 };
        assert_eq!(loc.to_string(), "3:14");
    }
}
