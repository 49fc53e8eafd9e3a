//! 에러 타입 — 도메인별 에러 정의

/// pagehint 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum PagehintError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 문서 파싱 에러
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// 이벤트 버스 에러
    #[error("bus error: {0}")]
    Bus(#[from] BusError),

    /// 힌트 등록/바인딩 에러
    #[error("hint error: {0}")]
    Hint(#[from] HintError),

    /// 커넥터 에러
    #[error("connector error: {0}")]
    Connector(#[from] ConnectorError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 문서 파싱 에러
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// 입력 데이터 초과
    #[error("input too large: {size} bytes (max: {max})")]
    TooLarge { size: usize, max: usize },

    /// 지원하지 않는 브라우저 표기
    #[error("invalid browser target '{value}': {reason}")]
    BrowserTarget { value: String, reason: String },
}

/// 이벤트 버스 에러
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    /// 구독 패턴 형식 오류
    #[error("invalid event pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// 핸들러 태스크가 격리되지 못하고 중단됨 (런타임 종료 등)
    #[error("dispatch of '{event}' aborted in handler of '{hint}': {reason}")]
    DispatchAborted {
        event: String,
        hint: String,
        reason: String,
    },

    /// 같은 스캔 안에서 다른 리소스 순회가 진행 중
    #[error("traversal of '{requested}' requested while '{active}' is still being traversed")]
    TraversalInProgress { active: String, requested: String },
}

/// 힌트 등록/바인딩 에러
#[derive(Debug, thiserror::Error)]
pub enum HintError {
    /// 이미 등록된 힌트
    #[error("hint already registered: {id}")]
    AlreadyRegistered { id: String },

    /// 힌트를 찾을 수 없음
    #[error("hint not found: {id}")]
    NotFound { id: String },

    /// 옵션 스키마 검증 실패
    #[error("invalid options for hint '{id}': {reason}")]
    InvalidOptions { id: String, reason: String },

    /// 힌트 팩토리 실패
    #[error("hint '{id}' failed to initialise: {reason}")]
    FactoryFailed { id: String, reason: String },
}

/// 커넥터 에러
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    /// 커넥터가 처리할 수 없는 대상
    #[error("unsupported target: {0}")]
    UnsupportedTarget(String),

    /// 리소스 로드 실패
    #[error("failed to load {resource}: {reason}")]
    Load { resource: String, reason: String },

    /// 대상 문서가 오류 상태 코드를 반환
    #[error("{resource} responded with status {status}")]
    Status { resource: String, status: u16 },

    /// 이벤트 디스패치 중단
    #[error("dispatch failed: {0}")]
    Dispatch(#[from] BusError),

    /// 문서 파싱 실패
    #[error("document parse failed: {0}")]
    Parse(#[from] ParseError),
}
