//! # pagehint-core
//!
//! 웹 문서 힌트 검사기의 공통 기반 크레이트입니다.
//!
//! - [`dom`]: 트래버설과 힌트가 사용하는 읽기 전용 DOM capability
//! - [`html`]: arena 기반 관대한 HTML 파서
//! - [`event`]: 스캔 이벤트 어휘와 페이로드
//! - [`types`]: Problem, 심각도, 대상 브라우저
//! - [`config`]: `pagehint.toml` 설정
//! - [`error`]: 도메인 에러
//! - [`metrics`]: 메트릭 이름 상수

pub mod config;
pub mod dom;
pub mod error;
pub mod event;
pub mod html;
pub mod metrics;
pub mod types;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{BusError, ConfigError, ConnectorError, HintError, PagehintError, ParseError};

// 설정
pub use config::{HintConfig, PagehintConfig};

// DOM
pub use dom::{Document, DocumentRef, Element, ElementRef, Headers, SourceLocation};
pub use html::HtmlDocument;

// 이벤트
pub use event::{Event, FetchEnd, FetchFailure, MediaType, Payload, Request, Response};

// 도메인 타입
pub use types::{BrowserTarget, Category, Problem, ProblemLocation, Severity};
