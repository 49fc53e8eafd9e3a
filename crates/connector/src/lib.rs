//! # pagehint-connector
//!
//! 대상 문서를 가져와 스캔 이벤트를 발행하는 커넥터입니다.
//!
//! - [`StaticConnector`]: HTML을 파싱하고 하위 리소스를 가져온 뒤 문서를 순회
//! - [`FsLoader`]: 로컬 파일 (`file:` URL, 경로)
//! - [`MemoryLoader`]: URL별 고정 응답 (테스트, 임베딩)
//!
//! # 사용 예시
//!
//! ```ignore
//! let mut connector = StaticConnector::local();
//! let report = scanner.scan(&mut connector, "./site/index.html").await;
//! ```

pub mod fs;
pub mod loader;
pub mod memory;
pub mod static_connector;

// --- 주요 타입 re-export ---

pub use fs::{FsLoader, target_url};
pub use loader::{LoadError, Loaded, Loader};
pub use memory::MemoryLoader;
pub use static_connector::{StaticConnector, StaticOptions, discover_subresources};
