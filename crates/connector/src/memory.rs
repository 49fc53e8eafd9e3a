//! 메모리 로더 — URL로 등록된 고정 응답

use std::collections::HashMap;

use bytes::Bytes;
use pagehint_core::dom::Headers;
use tracing::debug;
use url::Url;

use crate::loader::{LoadError, Loaded, Loader};

/// 리다이렉트 최대 횟수
pub const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Clone)]
enum Fixture {
    Page {
        status: u16,
        headers: Headers,
        body: Bytes,
    },
    Redirect {
        location: String,
    },
}

/// 고정 응답을 돌려주는 로더
///
/// 등록되지 않은 URL은 응답이 없는 것으로 취급됩니다.
///
/// # 사용 예시
/// ```
/// use pagehint_connector::MemoryLoader;
///
/// let loader = MemoryLoader::new()
///     .page("https://example.com/", "text/html", "<title>x</title>")
///     .status("https://example.com/missing.css", 404)
///     .redirect("http://example.com/", "https://example.com/");
/// assert_eq!(loader.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    fixtures: HashMap<String, Fixture>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// `200` 응답을 등록합니다.
    pub fn page(self, url: &str, content_type: &str, body: impl Into<Bytes>) -> Self {
        let mut headers = Headers::new();
        headers.insert("content-type", content_type);
        self.response(url, 200, headers, body)
    }

    /// 본문 없는 상태 코드 응답을 등록합니다.
    pub fn status(self, url: &str, status: u16) -> Self {
        self.response(url, status, Headers::new(), Bytes::new())
    }

    /// 임의의 응답을 등록합니다.
    pub fn response(
        mut self,
        url: &str,
        status: u16,
        headers: Headers,
        body: impl Into<Bytes>,
    ) -> Self {
        self.fixtures.insert(
            normalize(url),
            Fixture::Page {
                status,
                headers,
                body: body.into(),
            },
        );
        self
    }

    /// 리다이렉트를 등록합니다. `location`은 상대 URL일 수 있습니다.
    pub fn redirect(mut self, from: &str, location: &str) -> Self {
        self.fixtures.insert(
            normalize(from),
            Fixture::Redirect {
                location: location.to_owned(),
            },
        );
        self
    }

    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }
}

impl Loader for MemoryLoader {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load(&self, url: &Url) -> Result<Loaded, LoadError> {
        let mut current = url.clone();
        let mut hops = Vec::new();

        loop {
            let fixture = self
                .fixtures
                .get(&normalize(current.as_str()))
                .ok_or_else(|| LoadError::Unreachable {
                    url: current.to_string(),
                    reason: "no fixture registered".to_owned(),
                })?;

            match fixture {
                Fixture::Page {
                    status,
                    headers,
                    body,
                } => {
                    debug!(url = %current, status, hops = hops.len(), "fixture served");
                    return Ok(Loaded {
                        final_url: current,
                        status: *status,
                        headers: headers.clone(),
                        body: body.clone(),
                        hops,
                    });
                }
                Fixture::Redirect { location } => {
                    if hops.len() >= MAX_REDIRECTS {
                        return Err(LoadError::TooManyRedirects {
                            url: url.to_string(),
                            limit: MAX_REDIRECTS,
                        });
                    }
                    let next = current.join(location).map_err(|e| LoadError::Unreachable {
                        url: current.to_string(),
                        reason: format!("invalid redirect location '{location}': {e}"),
                    })?;
                    hops.push(current.to_string());
                    current = next;
                }
            }
        }
    }
}

/// fragment를 제거한 URL 문자열
fn normalize(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => url.to_owned(),
    }
}
