//! 파일 시스템 로더
//!
//! `file:` URL을 읽어 HTTP 응답처럼 합성합니다. 존재하지 않는 파일은 `404`,
//! 디렉토리는 `index.html`로 해석합니다.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use pagehint_core::dom::Headers;
use pagehint_core::event::MediaType;
use tracing::debug;
use url::Url;

use crate::loader::{LoadError, Loaded, Loader};

/// 로컬 파일 로더
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl FsLoader {
    pub fn new() -> Self {
        Self
    }
}

impl Loader for FsLoader {
    fn name(&self) -> &str {
        "fs"
    }

    async fn load(&self, url: &Url) -> Result<Loaded, LoadError> {
        if url.scheme() != "file" {
            return Err(LoadError::UnsupportedScheme {
                scheme: url.scheme().to_owned(),
                url: url.to_string(),
            });
        }
        let path = url.to_file_path().map_err(|()| LoadError::Unreachable {
            url: url.to_string(),
            reason: "not a local file path".to_owned(),
        })?;

        let path = resolve_index(path).await;
        let final_url = Url::from_file_path(&path).unwrap_or_else(|()| url.clone());

        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                debug!(path = %path.display(), bytes = bytes.len(), "file loaded");
                Ok(synthesize(final_url, 200, &path, Bytes::from(bytes)))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "file not found");
                Ok(synthesize(final_url, 404, &path, Bytes::new()))
            }
            Err(e) => Err(LoadError::Io {
                path: path.display().to_string(),
                source: e,
            }),
        }
    }
}

async fn resolve_index(path: PathBuf) -> PathBuf {
    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_dir() => path.join("index.html"),
        _ => path,
    }
}

fn synthesize(final_url: Url, status: u16, path: &Path, body: Bytes) -> Loaded {
    let media_type = MediaType::from_extension(&path.to_string_lossy());
    let mut headers = Headers::new();
    headers.insert("content-type", media_type.default_content_type());
    headers.insert("content-length", body.len().to_string());

    Loaded {
        final_url,
        status,
        headers,
        body,
        hops: Vec::new(),
    }
}

/// 경로나 URL 문자열을 로드 가능한 URL로 변환합니다.
///
/// 스킴이 있는 문자열은 URL로, 나머지(Windows 드라이브 문자 포함)는 파일 경로로 해석합니다.
pub fn target_url(target: &str) -> Result<Url, String> {
    let trimmed = target.trim();
    if trimmed.is_empty() {
        return Err("target is empty".to_owned());
    }

    if let Ok(url) = Url::parse(trimmed) {
        if url.scheme().len() > 1 {
            return Ok(url);
        }
    }

    let path = Path::new(trimmed);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| format!("cannot resolve relative path: {e}"))?
            .join(path)
    };
    Url::from_file_path(&absolute)
        .map_err(|()| format!("'{}' is not a valid file path", absolute.display()))
}
