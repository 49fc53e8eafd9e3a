//! 리소스 로더 trait

use std::future::Future;

use bytes::Bytes;
use pagehint_core::dom::Headers;
use pagehint_core::event::{MediaType, Response, charset_from_content_type};
use url::Url;

/// 로더 에러
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// 로더가 처리하지 않는 스킴
    #[error("unsupported scheme '{scheme}' for {url}")]
    UnsupportedScheme { scheme: String, url: String },

    /// 리소스에 연결할 수 없음 (응답 없음)
    #[error("{url} is unreachable: {reason}")]
    Unreachable { url: String, reason: String },

    /// 리다이렉트 한도 초과
    #[error("too many redirects starting at {url} (limit {limit})")]
    TooManyRedirects { url: String, limit: usize },

    /// 파일 읽기 실패
    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 로드된 리소스
///
/// 상태 코드가 400 이상이어도 응답이 있으면 `Loaded`입니다.
#[derive(Debug, Clone)]
pub struct Loaded {
    /// 리다이렉트 이후 최종 URL
    pub final_url: Url,
    pub status: u16,
    pub headers: Headers,
    pub body: Bytes,
    /// 최종 URL 이전에 거친 URL
    pub hops: Vec<String>,
}

impl Loaded {
    /// `content-type` 헤더, 없으면 확장자로 미디어 타입을 판별합니다.
    pub fn media_type(&self) -> MediaType {
        let from_header = self
            .headers
            .get("content-type")
            .map(MediaType::from_content_type)
            .unwrap_or(MediaType::Unknown);
        match from_header {
            MediaType::Unknown => MediaType::from_extension(self.final_url.path()),
            known => known,
        }
    }

    /// 이벤트 페이로드용 응답으로 변환합니다.
    pub fn into_response(self) -> Response {
        let media_type = self.media_type();
        let charset = self
            .headers
            .get("content-type")
            .and_then(charset_from_content_type);
        Response {
            url: self.final_url.to_string(),
            status: self.status,
            headers: self.headers,
            body: self.body,
            media_type,
            charset,
            hops: self.hops,
        }
    }
}

/// URL에서 리소스를 읽어오는 로더
pub trait Loader: Send + Sync {
    /// 로더 이름
    fn name(&self) -> &str;

    /// 리소스를 로드합니다. 응답이 없을 때만 에러입니다.
    fn load(&self, url: &Url) -> impl Future<Output = Result<Loaded, LoadError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(url: &str, content_type: Option<&str>) -> Loaded {
        let mut headers = Headers::new();
        if let Some(ct) = content_type {
            headers.insert("content-type", ct);
        }
        Loaded {
            final_url: Url::parse(url).unwrap(),
            status: 200,
            headers,
            body: Bytes::new(),
            hops: Vec::new(),
        }
    }

    #[test]
    fn media_type_prefers_header() {
        let l = loaded("https://example.com/app.js", Some("text/css"));
        assert_eq!(l.media_type(), MediaType::Css);
    }

    #[test]
    fn media_type_falls_back_to_extension() {
        let l = loaded("https://example.com/app.js?v=1", None);
        assert_eq!(l.media_type(), MediaType::Script);

        let l = loaded("https://example.com/logo.png", Some("application/octet-stream"));
        assert_eq!(l.media_type(), MediaType::Image);
    }

    #[test]
    fn response_carries_charset() {
        let response = loaded("https://example.com/", Some("text/html; charset=UTF-8")).into_response();
        assert_eq!(response.media_type, MediaType::Html);
        assert_eq!(response.charset.as_deref(), Some("utf-8"));
        assert_eq!(response.url, "https://example.com/");
    }
}
