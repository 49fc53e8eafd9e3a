//! 정적 커넥터 — 문서를 로드하고 하위 리소스를 가져온 뒤 순회
//!
//! 스크립트를 실행하지 않고 소스 HTML만 분석합니다.

use std::collections::HashSet;
use std::sync::Arc;

use pagehint_core::dom::{Document, DocumentRef, Element, ElementRef};
use pagehint_core::error::ConnectorError;
use pagehint_core::event::{FetchEnd, FetchFailure, Request};
use pagehint_core::html::{DEFAULT_MAX_SIZE, HtmlDocument};
use pagehint_engine::{Connector, ScanDriver};
use tracing::{debug, info};
use url::Url;

use crate::fs::{FsLoader, target_url};
use crate::loader::Loader;

/// 정적 커넥터 설정
#[derive(Debug, Clone)]
pub struct StaticOptions {
    /// 하위 리소스(스타일시트, 스크립트, 이미지 등)를 가져올지
    pub fetch_subresources: bool,
    /// 대상 문서 최대 크기 (바이트)
    pub max_document_size: usize,
}

impl Default for StaticOptions {
    fn default() -> Self {
        Self {
            fetch_subresources: true,
            max_document_size: DEFAULT_MAX_SIZE,
        }
    }
}

/// 로더 기반 정적 커넥터
#[derive(Debug)]
pub struct StaticConnector<L: Loader> {
    loader: L,
    options: StaticOptions,
    fetched: usize,
}

impl StaticConnector<FsLoader> {
    /// 로컬 파일 커넥터
    pub fn local() -> Self {
        Self::new(FsLoader::new())
    }
}

impl<L: Loader> StaticConnector<L> {
    pub fn new(loader: L) -> Self {
        Self::with_options(loader, StaticOptions::default())
    }

    pub fn with_options(loader: L, options: StaticOptions) -> Self {
        Self {
            loader,
            options,
            fetched: 0,
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// 마지막 collect에서 시도한 하위 리소스 수
    pub fn subresources_fetched(&self) -> usize {
        self.fetched
    }

    async fn fetch_subresource(
        &self,
        driver: &ScanDriver,
        element: ElementRef,
        url: Url,
    ) -> Result<(), ConnectorError> {
        let resource = url.to_string();
        driver.fetch_start(&resource).await?;

        match self.loader.load(&url).await {
            Ok(loaded) if loaded.status < 400 => {
                driver
                    .fetch_end(
                        &resource,
                        FetchEnd {
                            element: Some(element),
                            request: Request::new(resource.clone()),
                            response: loaded.into_response(),
                        },
                    )
                    .await?;
            }
            Ok(loaded) => {
                debug!(resource = %resource, status = loaded.status, "sub-resource failed");
                let mut hops = loaded.hops;
                hops.push(loaded.final_url.to_string());
                driver
                    .fetch_error(
                        &resource,
                        FetchFailure {
                            element: Some(element),
                            hops,
                            status: Some(loaded.status),
                            error: format!("responded with status {}", loaded.status),
                        },
                    )
                    .await?;
            }
            Err(e) => {
                debug!(resource = %resource, error = %e, "sub-resource unreachable");
                driver
                    .fetch_error(
                        &resource,
                        FetchFailure {
                            element: Some(element),
                            hops: vec![resource.clone()],
                            status: None,
                            error: e.to_string(),
                        },
                    )
                    .await?;
            }
        }
        Ok(())
    }
}

impl<L: Loader> Connector for StaticConnector<L> {
    fn name(&self) -> &str {
        self.loader.name()
    }

    async fn collect(&mut self, target: &str, driver: &ScanDriver) -> Result<(), ConnectorError> {
        self.fetched = 0;
        let url = match target_url(target) {
            Ok(url) => url,
            Err(reason) => {
                // 해석할 수 없는 대상도 fetch::start::target은 한 번 발행합니다.
                driver.start_scan(target).await?;
                driver.fetch_start_target(target).await?;
                return Err(ConnectorError::Load {
                    resource: target.to_owned(),
                    reason,
                });
            }
        };
        let resource = url.to_string();

        driver.start_scan(&resource).await?;
        driver.fetch_start_target(&resource).await?;

        let loaded = self
            .loader
            .load(&url)
            .await
            .map_err(|e| ConnectorError::Load {
                resource: resource.clone(),
                reason: e.to_string(),
            })?;
        if loaded.status >= 400 {
            return Err(ConnectorError::Status {
                resource,
                status: loaded.status,
            });
        }

        let base = loaded.final_url.clone();
        let response = loaded.into_response();
        let document = HtmlDocument::parse_with_limit(&response.text(), self.options.max_document_size)?;
        let document: DocumentRef = Arc::new(document);
        let headers = response.headers.clone();

        driver
            .fetch_end_target(
                &resource,
                FetchEnd {
                    element: None,
                    request: Request::new(resource.clone()),
                    response,
                },
            )
            .await?;
        driver.publish_page(Arc::clone(&document), headers);

        if self.options.fetch_subresources {
            let base = document_base(document.as_ref(), &base);
            let subresources = discover_subresources(document.as_ref(), &base);
            info!(resource = %resource, count = subresources.len(), "fetching sub-resources");
            for (element, sub_url) in subresources {
                self.fetched += 1;
                self.fetch_subresource(driver, element, sub_url).await?;
            }
        }

        driver.traverse(document.as_ref(), &resource).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ConnectorError> {
        debug!(loader = self.loader.name(), "static connector closed");
        Ok(())
    }
}

// ─── Sub-resource discovery ──────────────────────────────────────────

/// 첫 `<base href>`가 있으면 그 URL, 없으면 문서 URL
fn document_base(document: &dyn Document, fallback: &Url) -> Url {
    document
        .query("base")
        .iter()
        .find_map(|base| base.attribute("href"))
        .and_then(|href| fallback.join(href.trim()).ok())
        .unwrap_or_else(|| fallback.clone())
}

/// 가져올 하위 리소스를 문서 순서로 찾습니다. 같은 URL은 한 번만 포함됩니다.
///
/// - `link[rel~=stylesheet|icon|manifest][href]`
/// - `script[src]`
/// - `img[src]`
pub fn discover_subresources(document: &dyn Document, base: &Url) -> Vec<(ElementRef, Url)> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();
    let mut stack = vec![document.root()];

    while let Some(element) = stack.pop() {
        if let Some(reference) = subresource_reference(&element) {
            match resolve_reference(base, reference) {
                Some(url) if seen.insert(url.to_string()) => found.push((element.clone(), url)),
                Some(_) => {}
                None => debug!(reference, "sub-resource reference not fetched"),
            }
        }
        stack.extend(element.children().into_iter().rev());
    }
    found
}

fn subresource_reference(element: &ElementRef) -> Option<&str> {
    match element.tag_name() {
        "link" => {
            let rel = element.attribute("rel")?;
            let wanted = rel.split_ascii_whitespace().any(|token| {
                ["stylesheet", "icon", "manifest"]
                    .iter()
                    .any(|w| token.eq_ignore_ascii_case(w))
            });
            if wanted { element.attribute("href") } else { None }
        }
        "script" | "img" => element.attribute("src"),
        _ => None,
    }
}

fn resolve_reference(base: &Url, reference: &str) -> Option<Url> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }
    let url = base.join(reference).ok()?;
    match url.scheme() {
        "http" | "https" | "file" => Some(url),
        // data:, javascript:, blob: 등은 가져오지 않음
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(html: &str) -> HtmlDocument {
        HtmlDocument::parse(html).unwrap()
    }

    fn base() -> Url {
        Url::parse("https://example.com/dir/page.html").unwrap()
    }

    #[test]
    fn discovers_supported_references_in_document_order() {
        let d = doc(r#"<html><head>
            <link rel="stylesheet" href="a.css">
            <link rel="preconnect" href="https://cdn.example">
            <link rel="shortcut icon" href="/favicon.ico">
            <script src="app.js"></script>
            <script>inline()</script>
            </head><body><img src="logo.png"><img src="logo.png"><a href="x.html">x</a></body></html>"#);

        let urls: Vec<String> = discover_subresources(&d, &base())
            .into_iter()
            .map(|(_, url)| url.to_string())
            .collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/dir/a.css",
                "https://example.com/favicon.ico",
                "https://example.com/dir/app.js",
                "https://example.com/dir/logo.png",
            ]
        );
    }

    #[test]
    fn skips_data_and_empty_references() {
        let d = doc(r#"<body><img src="data:image/png;base64,AAAA"><img src=""><script src="javascript:void(0)"></script></body>"#);
        assert!(discover_subresources(&d, &base()).is_empty());
    }

    #[test]
    fn base_element_changes_resolution() {
        let d = doc(r#"<html><head><base href="https://cdn.example/assets/"></head><body><img src="a.png"></body></html>"#);
        let base = document_base(&d, &base());
        let found = discover_subresources(&d, &base);
        assert_eq!(found[0].1.as_str(), "https://cdn.example/assets/a.png");
    }
}
