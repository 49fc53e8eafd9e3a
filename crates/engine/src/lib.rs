//! # pagehint-engine
//!
//! 힌트 검사 코어 엔진입니다.
//!
//! - [`bus`]: 패턴 구독과 순차 디스패치를 제공하는 이벤트 버스
//! - [`traverse`]: 재귀 없는 깊이 우선 문서 순회
//! - [`sink`]: 스캔 단위 Problem 수집과 힌트별 Reporter
//! - [`hint`]: 힌트 정의, 옵션 스키마, 레지스트리 바인딩
//! - [`connector`]: 커넥터 trait과 이벤트 발행용 [`ScanDriver`]
//! - [`scan`]: 스캔 생명주기를 관리하는 [`Scanner`]
//! - [`report`]: [`ScanReport`]와 진단
//!
//! # 흐름
//!
//! ```text
//! Scanner::scan
//!   → HintRegistry::bind (구독 등록)
//!   → Connector::collect (scan::start, fetch::*, traverse::*, element::*)
//!   → scan::end
//!   → ScanReport
//! ```

use std::future::Future;
use std::pin::Pin;

pub mod bus;
pub mod connector;
pub mod hint;
pub mod report;
pub mod scan;
pub mod sink;
pub mod traverse;

/// dyn-compatible trait에서 사용하는 boxed future
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

// --- 주요 타입 re-export ---

pub use bus::{EventBus, Handler, HandlerFault, Pattern};
pub use connector::{Connector, DynConnector, ScanDriver};
pub use hint::{
    HintContext, HintDefinition, HintFactory, HintMetadata, HintRegistry, OptionField,
    OptionKind, OptionsSchema, PageState, Subscriptions,
};
pub use report::{Diagnostic, ScanReport, SeverityCounts};
pub use scan::Scanner;
pub use sink::{ProblemSink, ReportOptions, Reporter};
pub use traverse::TraversalStats;
