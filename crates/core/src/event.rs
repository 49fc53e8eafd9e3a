//! 이벤트 어휘 — 스캔 중 버스로 흐르는 이벤트 이름과 페이로드
//!
//! 이벤트 이름은 닫힌 어휘입니다. 구독자는 정확한 이름(`traverse::start`)이나
//! 네임스페이스 와일드카드(`element::*`)로 이벤트를 받습니다.
//!
//! | 이벤트 | 페이로드 |
//! |---|---|
//! | `scan::start`, `scan::end` | resource |
//! | `fetch::start::target`, `fetch::start` | resource |
//! | `fetch::end::<mediatype>` | element?, request, response |
//! | `fetch::error` | element?, hops, error |
//! | `traverse::start`, `traverse::end` | resource |
//! | `traverse::down`, `traverse::up`, `element::<tag>` | element |

use std::borrow::Cow;
use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::dom::{ElementRef, Headers};

// --- 이벤트 이름 상수 ---

/// 스캔 시작 (스캔당 정확히 1회, 첫 이벤트)
pub const SCAN_START: &str = "scan::start";
/// 스캔 종료 (스캔당 정확히 1회, 마지막 이벤트)
pub const SCAN_END: &str = "scan::end";
/// 대상 문서 fetch 시작
pub const FETCH_START_TARGET: &str = "fetch::start::target";
/// 하위 리소스 fetch 시작
pub const FETCH_START: &str = "fetch::start";
/// 하위 리소스 fetch 실패
pub const FETCH_ERROR: &str = "fetch::error";
/// fetch 완료 이벤트 접두어 (`fetch::end::<mediatype>`)
pub const FETCH_END_PREFIX: &str = "fetch::end::";
/// 문서 순회 시작
pub const TRAVERSE_START: &str = "traverse::start";
/// 문서 순회 종료
pub const TRAVERSE_END: &str = "traverse::end";
/// 요소 진입
pub const TRAVERSE_DOWN: &str = "traverse::down";
/// 요소 이탈
pub const TRAVERSE_UP: &str = "traverse::up";
/// 요소 이벤트 접두어 (`element::<tag>`)
pub const ELEMENT_PREFIX: &str = "element::";

/// `element::<tag>` 이벤트 이름 (태그는 소문자로 정규화)
pub fn element_event(tag: &str) -> String {
    format!("{ELEMENT_PREFIX}{}", tag.to_ascii_lowercase())
}

/// `fetch::end::<mediatype>` 이벤트 이름
pub fn fetch_end_event(media_type: MediaType) -> String {
    format!("{FETCH_END_PREFIX}{media_type}")
}

/// fetch 결과 미디어 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Html,
    Css,
    Script,
    Image,
    Font,
    Manifest,
    Json,
    Unknown,
}

impl MediaType {
    /// 이벤트 이름에 쓰이는 소문자 표기
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Css => "css",
            Self::Script => "script",
            Self::Image => "image",
            Self::Font => "font",
            Self::Manifest => "manifest",
            Self::Json => "json",
            Self::Unknown => "unknown",
        }
    }

    /// `content-type` 헤더 값에서 미디어 타입을 판별합니다.
    pub fn from_content_type(content_type: &str) -> Self {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match mime.as_str() {
            "text/html" | "application/xhtml+xml" => Self::Html,
            "text/css" => Self::Css,
            "application/manifest+json" => Self::Manifest,
            m if m.contains("javascript") || m.contains("ecmascript") => Self::Script,
            m if m.starts_with("image/") => Self::Image,
            m if m.starts_with("font/") || m.contains("font-") || m.contains("woff") => {
                Self::Font
            }
            m if m == "application/json" || m.ends_with("+json") => Self::Json,
            _ => Self::Unknown,
        }
    }

    /// 파일 확장자(경로 또는 URL의 마지막 세그먼트)에서 미디어 타입을 판별합니다.
    pub fn from_extension(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let file = path.rsplit('/').next().unwrap_or_default();
        let Some((_, ext)) = file.rsplit_once('.') else {
            return Self::Unknown;
        };

        match ext.to_ascii_lowercase().as_str() {
            "html" | "htm" | "xhtml" => Self::Html,
            "css" => Self::Css,
            "js" | "mjs" | "cjs" => Self::Script,
            "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "ico" | "avif" | "bmp" => {
                Self::Image
            }
            "woff" | "woff2" | "ttf" | "otf" | "eot" => Self::Font,
            "webmanifest" => Self::Manifest,
            "json" => Self::Json,
            _ => Self::Unknown,
        }
    }

    /// 확장자에 대응하는 기본 `content-type`
    pub fn default_content_type(self) -> &'static str {
        match self {
            Self::Html => "text/html; charset=utf-8",
            Self::Css => "text/css",
            Self::Script => "text/javascript",
            Self::Image => "image/*",
            Self::Font => "font/*",
            Self::Manifest => "application/manifest+json",
            Self::Json => "application/json",
            Self::Unknown => "application/octet-stream",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `content-type` 값에서 charset 파라미터를 추출합니다 (소문자).
pub fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_ascii_lowercase())
    })
}

/// fetch 요청 메타데이터
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub url: String,
    pub headers: Headers,
}

impl Request {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Headers::new(),
        }
    }
}

/// fetch 응답
///
/// 본문은 `bytes::Bytes`로 보관되어 힌트 간 복사 없이 공유됩니다.
#[derive(Debug, Clone)]
pub struct Response {
    /// 최종 URL (리다이렉트 이후)
    pub url: String,
    /// HTTP 상태 코드
    pub status: u16,
    /// 응답 헤더
    pub headers: Headers,
    /// 응답 본문
    pub body: Bytes,
    /// 판별된 미디어 타입
    pub media_type: MediaType,
    /// 본문 charset
    pub charset: Option<String>,
    /// 리다이렉트 체인 (요청 URL → ... → 최종 URL 직전)
    pub hops: Vec<String>,
}

impl Response {
    /// 본문을 UTF-8 텍스트로 해석합니다 (잘못된 바이트는 대체 문자).
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// 성공 상태(2xx/3xx)인지 확인합니다.
    pub fn is_success(&self) -> bool {
        self.status < 400
    }
}

/// `fetch::end::*` 페이로드
#[derive(Debug, Clone)]
pub struct FetchEnd {
    /// 리소스를 참조한 요소 (대상 문서이면 `None`)
    pub element: Option<ElementRef>,
    pub request: Request,
    pub response: Response,
}

/// `fetch::error` 페이로드
#[derive(Debug, Clone)]
pub struct FetchFailure {
    /// 리소스를 참조한 요소
    pub element: Option<ElementRef>,
    /// 실패 전까지 거친 URL 목록
    pub hops: Vec<String>,
    /// 응답이 있었다면 상태 코드
    pub status: Option<u16>,
    /// 실패 사유
    pub error: String,
}

/// 이벤트 페이로드
#[derive(Debug, Clone)]
pub enum Payload {
    /// 리소스만 담는 이벤트 (`scan::*`, `fetch::start*`, `traverse::start/end`)
    Resource,
    /// 요소 이벤트 (`element::*`, `traverse::down/up`)
    Element(ElementRef),
    /// fetch 완료
    FetchEnd(Box<FetchEnd>),
    /// fetch 실패
    FetchError(Box<FetchFailure>),
}

/// 버스로 전달되는 이벤트
#[derive(Debug, Clone)]
pub struct Event {
    /// 이벤트 이름
    pub name: String,
    /// 이벤트가 속한 리소스 URL
    pub resource: String,
    /// 페이로드
    pub payload: Payload,
}

impl Event {
    /// 리소스만 담는 이벤트를 생성합니다.
    pub fn new(name: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource: resource.into(),
            payload: Payload::Resource,
        }
    }

    /// 요소 이벤트를 생성합니다.
    pub fn with_element(
        name: impl Into<String>,
        resource: impl Into<String>,
        element: ElementRef,
    ) -> Self {
        Self {
            name: name.into(),
            resource: resource.into(),
            payload: Payload::Element(element),
        }
    }

    /// `fetch::end::<mediatype>` 이벤트를 생성합니다.
    ///
    /// 이름은 응답의 미디어 타입에서 결정됩니다.
    pub fn fetched(resource: impl Into<String>, fetch: FetchEnd) -> Self {
        Self {
            name: fetch_end_event(fetch.response.media_type),
            resource: resource.into(),
            payload: Payload::FetchEnd(Box::new(fetch)),
        }
    }

    /// `fetch::error` 이벤트를 생성합니다.
    pub fn fetch_failed(resource: impl Into<String>, failure: FetchFailure) -> Self {
        Self {
            name: FETCH_ERROR.to_owned(),
            resource: resource.into(),
            payload: Payload::FetchError(Box::new(failure)),
        }
    }

    /// 페이로드에 담긴 요소 (요소 이벤트 또는 요소가 참조한 fetch)
    pub fn element(&self) -> Option<&ElementRef> {
        match &self.payload {
            Payload::Element(element) => Some(element),
            Payload::FetchEnd(fetch) => fetch.element.as_ref(),
            Payload::FetchError(failure) => failure.element.as_ref(),
            Payload::Resource => None,
        }
    }

    pub fn fetch_end(&self) -> Option<&FetchEnd> {
        match &self.payload {
            Payload::FetchEnd(fetch) => Some(fetch),
            _ => None,
        }
    }

    pub fn fetch_failure(&self) -> Option<&FetchFailure> {
        match &self.payload {
            Payload::FetchError(failure) => Some(failure),
            _ => None,
        }
    }

    /// 이름의 첫 `::` 앞부분 (예: `element::p` → `element`)
    pub fn namespace(&self) -> &str {
        self.name
            .split_once("::")
            .map_or(self.name.as_str(), |(ns, _)| ns)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} resource={}", self.name, self.resource)?;
        if let Some(location) = self.element().and_then(|e| e.location()) {
            write!(f, " at={location}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Document, Element};
    use crate::html::HtmlDocument;

    fn response(media_type: MediaType, status: u16) -> Response {
        Response {
            url: "https://example.com/a".to_owned(),
            status,
            headers: Headers::new(),
            body: Bytes::from_static(b"body"),
            media_type,
            charset: None,
            hops: Vec::new(),
        }
    }

    #[test]
    fn element_event_lowercases_tag() {
        assert_eq!(element_event("IMG"), "element::img");
        assert_eq!(element_event("p"), "element::p");
    }

    #[test]
    fn fetch_end_event_uses_media_type() {
        assert_eq!(fetch_end_event(MediaType::Html), "fetch::end::html");
        assert_eq!(fetch_end_event(MediaType::Manifest), "fetch::end::manifest");
    }

    #[test]
    fn media_type_from_content_type() {
        assert_eq!(
            MediaType::from_content_type("text/html; charset=UTF-8"),
            MediaType::Html
        );
        assert_eq!(MediaType::from_content_type("TEXT/CSS"), MediaType::Css);
        assert_eq!(
            MediaType::from_content_type("application/javascript"),
            MediaType::Script
        );
        assert_eq!(MediaType::from_content_type("image/png"), MediaType::Image);
        assert_eq!(MediaType::from_content_type("font/woff2"), MediaType::Font);
        assert_eq!(
            MediaType::from_content_type("application/manifest+json"),
            MediaType::Manifest
        );
        assert_eq!(
            MediaType::from_content_type("application/ld+json"),
            MediaType::Json
        );
        assert_eq!(
            MediaType::from_content_type("application/octet-stream"),
            MediaType::Unknown
        );
    }

    #[test]
    fn media_type_from_extension() {
        assert_eq!(MediaType::from_extension("/a/b/index.HTML"), MediaType::Html);
        assert_eq!(MediaType::from_extension("style.css?v=2"), MediaType::Css);
        assert_eq!(MediaType::from_extension("app.mjs#x"), MediaType::Script);
        assert_eq!(MediaType::from_extension("site.webmanifest"), MediaType::Manifest);
        assert_eq!(MediaType::from_extension("/dir.d/README"), MediaType::Unknown);
    }

    #[test]
    fn charset_parameter_is_extracted() {
        assert_eq!(
            charset_from_content_type("text/html; Charset=\"UTF-8\""),
            Some("utf-8".to_owned())
        );
        assert_eq!(charset_from_content_type("text/html"), None);
    }

    #[test]
    fn fetched_event_name_follows_response() {
        let event = Event::fetched(
            "https://example.com/a",
            FetchEnd {
                element: None,
                request: Request::new("https://example.com/a"),
                response: response(MediaType::Css, 200),
            },
        );
        assert_eq!(event.name, "fetch::end::css");
        assert!(event.fetch_end().is_some());
        assert!(event.element().is_none());
        assert_eq!(event.namespace(), "fetch");
    }

    #[test]
    fn element_accessor_covers_fetch_payloads() {
        let doc = HtmlDocument::parse("<img src=a.png>").unwrap();
        let img = doc.root();
        let event = Event::fetch_failed(
            "https://example.com/a.png",
            FetchFailure {
                element: Some(img.clone()),
                hops: vec!["https://example.com/a.png".to_owned()],
                status: Some(404),
                error: "not found".to_owned(),
            },
        );
        assert_eq!(event.name, FETCH_ERROR);
        let element = event.element().expect("element should be present");
        assert!(element.is_same(img.as_ref()));
        assert_eq!(event.fetch_failure().map(|f| f.status), Some(Some(404)));
    }

    #[test]
    fn display_includes_location_for_elements() {
        let doc = HtmlDocument::parse("<html>\n<p>x</p></html>").unwrap();
        let p = doc.query("p").remove(0);
        let event = Event::with_element(element_event("p"), "file:///a.html", p);
        assert_eq!(event.to_string(), "element::p resource=file:///a.html at=2:1");
    }

    #[test]
    fn response_text_is_lossy() {
        let mut r = response(MediaType::Html, 200);
        r.body = Bytes::from_static(b"ok\xff");
        assert_eq!(r.text(), "ok\u{fffd}");
        assert!(r.is_success());
        assert!(!response(MediaType::Html, 404).is_success());
    }
}
