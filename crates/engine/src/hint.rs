//! 힌트 정의와 레지스트리 — 스캔 단위 바인딩
//!
//! 힌트는 정적 메타데이터와 순수 팩토리로 이루어진 닫힌 레코드([`HintDefinition`])입니다.
//! [`HintRegistry::bind`]는 스캔이 시작되기 전에 다음을 수행합니다.
//!
//! 1. 설정에서 심각도를 결정하고 `off`이거나 로컬 파일에서 동작하지 않는 힌트를 건너뜀
//! 2. 힌트 옵션을 스키마로 검증
//! 3. 팩토리를 호출해 구독 목록을 얻음
//! 4. 모든 패턴을 검증한 뒤 버스에 등록
//!
//! 한 힌트의 실패는 그 힌트만 제외하며 진단으로 기록됩니다.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, OnceLock};

use pagehint_core::config::PagehintConfig;
use pagehint_core::dom::{DocumentRef, Headers};
use pagehint_core::error::HintError;
use pagehint_core::event::Event;
use pagehint_core::types::{BrowserTarget, Category, Severity};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::bus::{EventBus, Handler, Pattern, boxed_handler};
use crate::report::Diagnostic;
use crate::sink::{ProblemSink, Reporter};

// ─── Options Schema ──────────────────────────────────────────────────

/// 옵션 값의 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    Bool,
    Integer,
    String,
    StringList,
    /// 허용된 문자열 중 하나
    OneOf(&'static [&'static str]),
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Integer => write!(f, "integer"),
            Self::String => write!(f, "string"),
            Self::StringList => write!(f, "string list"),
            Self::OneOf(values) => write!(f, "one of [{}]", values.join(", ")),
        }
    }
}

/// 옵션 필드 선언
#[derive(Debug, Clone, Copy, Serialize)]
pub struct OptionField {
    pub name: &'static str,
    pub kind: OptionKind,
    pub required: bool,
    pub description: &'static str,
}

/// 힌트 옵션 스키마
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(transparent)]
pub struct OptionsSchema {
    pub fields: &'static [OptionField],
}

impl OptionsSchema {
    /// 옵션이 없는 스키마
    pub const EMPTY: Self = Self { fields: &[] };

    /// 설정된 옵션 테이블을 검증합니다.
    ///
    /// 선언되지 않은 키, 누락된 필수 키, 형식 불일치를 거부합니다.
    pub fn validate(&self, options: &toml::Table) -> Result<(), String> {
        if let Some(unknown) = options
            .keys()
            .find(|key| !self.fields.iter().any(|f| f.name == key.as_str()))
        {
            return Err(format!("unknown option '{unknown}'"));
        }

        for field in self.fields {
            let Some(value) = options.get(field.name) else {
                if field.required {
                    return Err(format!("missing required option '{}'", field.name));
                }
                continue;
            };

            let valid = match field.kind {
                OptionKind::Bool => value.is_bool(),
                OptionKind::Integer => value.is_integer(),
                OptionKind::String => value.is_str(),
                OptionKind::StringList => value
                    .as_array()
                    .is_some_and(|items| items.iter().all(toml::Value::is_str)),
                OptionKind::OneOf(allowed) => value.as_str().is_some_and(|s| allowed.contains(&s)),
            };
            if !valid {
                return Err(format!(
                    "option '{}' must be {}, got {}",
                    field.name,
                    field.kind,
                    value.type_str()
                ));
            }
        }
        Ok(())
    }
}

// ─── Metadata & Definition ───────────────────────────────────────────

/// 힌트 메타데이터
#[derive(Debug, Clone, Copy, Serialize)]
pub struct HintMetadata {
    /// 고유 ID (예: `"disown-opener"`)
    pub id: &'static str,
    pub category: Category,
    pub description: &'static str,
    /// 설정이 없을 때의 심각도
    pub default_severity: Severity,
    /// 자동 수정 가능 여부
    pub fixable: bool,
    /// 옵션 스키마
    pub schema: OptionsSchema,
    /// `file:` 대상에서도 의미가 있는지
    pub works_with_local_files: bool,
}

/// 힌트 팩토리
///
/// 설정은 호출 시점에 한 번 읽히고 스캔 동안 고정됩니다.
pub type HintFactory = fn(&HintContext) -> anyhow::Result<Subscriptions>;

/// 힌트 정의 (메타데이터 + 팩토리)
#[derive(Clone, Copy)]
pub struct HintDefinition {
    pub meta: HintMetadata,
    pub factory: HintFactory,
}

impl fmt::Debug for HintDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HintDefinition")
            .field("id", &self.meta.id)
            .finish_non_exhaustive()
    }
}

/// 팩토리가 반환하는 구독 목록
#[derive(Default)]
pub struct Subscriptions {
    entries: Vec<(String, Handler)>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// 패턴에 async 핸들러를 추가합니다 (builder).
    pub fn on<F, Fut>(mut self, pattern: &str, handler: F) -> Self
    where
        F: Fn(Arc<Event>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.entries
            .push((pattern.to_owned(), boxed_handler(handler)));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(p, _)| p.as_str())
    }
}

// ─── Page State ──────────────────────────────────────────────────────

/// 대상 문서의 DOM과 헤더 (커넥터가 한 번 게시)
#[derive(Debug, Default)]
pub struct PageState {
    dom: OnceLock<DocumentRef>,
    headers: OnceLock<Headers>,
}

impl PageState {
    /// DOM과 헤더를 게시합니다. 이미 게시되었다면 `false`를 반환합니다.
    pub fn publish(&self, dom: DocumentRef, headers: Headers) -> bool {
        let dom_set = self.dom.set(dom).is_ok();
        let headers_set = self.headers.set(headers).is_ok();
        dom_set && headers_set
    }

    pub fn dom(&self) -> Option<DocumentRef> {
        self.dom.get().cloned()
    }

    pub fn headers(&self) -> Option<&Headers> {
        self.headers.get()
    }
}

// ─── HintContext ─────────────────────────────────────────────────────

/// 팩토리와 핸들러에 주입되는 힌트 실행 컨텍스트
#[derive(Clone)]
pub struct HintContext {
    reporter: Reporter,
    options: Arc<toml::Table>,
    browsers: Arc<[BrowserTarget]>,
    page: Arc<PageState>,
    target: Arc<str>,
}

impl HintContext {
    /// 바인딩 밖(테스트, 도구)에서 컨텍스트를 직접 만듭니다.
    pub fn new(
        reporter: Reporter,
        options: toml::Table,
        browsers: Arc<[BrowserTarget]>,
        page: Arc<PageState>,
        target: &str,
    ) -> Self {
        Self {
            reporter,
            options: Arc::new(options),
            browsers,
            page,
            target: Arc::from(target),
        }
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    pub fn hint_id(&self) -> &str {
        self.reporter.hint_id()
    }

    /// 옵션 테이블을 힌트의 옵션 타입으로 역직렬화합니다.
    pub fn options<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
        let value = toml::Value::Table((*self.options).clone());
        Ok(value.try_into()?)
    }

    pub fn raw_options(&self) -> &toml::Table {
        &self.options
    }

    /// 대상 브라우저
    pub fn browsers(&self) -> &[BrowserTarget] {
        &self.browsers
    }

    /// document mode 브라우저(IE 8–11)를 대상으로 하는지
    pub fn targets_document_mode_browsers(&self) -> bool {
        self.browsers.iter().any(BrowserTarget::is_document_mode_browser)
    }

    /// 대상 문서 DOM (게시 전이면 `None`)
    pub fn page_dom(&self) -> Option<DocumentRef> {
        self.page.dom()
    }

    /// 대상 문서 응답 헤더 (게시 전이면 `None`)
    pub fn page_headers(&self) -> Option<&Headers> {
        self.page.headers()
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn is_local_target(&self) -> bool {
        is_local_target(&self.target)
    }
}

impl fmt::Debug for HintContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HintContext")
            .field("hint", &self.reporter.hint_id())
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// `file:` URL이거나 스킴이 없는 경로이면 로컬 대상입니다.
pub fn is_local_target(target: &str) -> bool {
    let lower = target.trim().to_ascii_lowercase();
    lower.starts_with("file:") || !lower.contains("://")
}

// ─── HintRegistry ────────────────────────────────────────────────────

/// 바인딩에 필요한 스캔 단위 입력
pub struct BindContext<'a> {
    pub config: &'a PagehintConfig,
    pub browsers: Arc<[BrowserTarget]>,
    pub sink: Arc<ProblemSink>,
    pub page: Arc<PageState>,
    pub target: &'a str,
}

/// 바인딩 결과
#[derive(Debug, Default)]
pub struct BindOutcome {
    /// 등록된 힌트 ID (등록 순서)
    pub bound: Vec<String>,
    /// 건너뛰거나 실패한 힌트의 진단
    pub diagnostics: Vec<Diagnostic>,
}

/// 힌트 레지스트리
///
/// 힌트 정의의 등록과 해제, 스캔 단위 바인딩을 담당합니다.
/// 등록 순서가 보존되며 같은 이벤트의 핸들러 호출 순서가 됩니다.
///
/// # 사용 예시
/// ```ignore
/// let mut registry = HintRegistry::new();
/// registry.register(image_alt::definition())?;
///
/// let outcome = registry.bind(&bind_ctx, &mut bus);
/// ```
#[derive(Debug, Default)]
pub struct HintRegistry {
    hints: Vec<HintDefinition>,
}

impl HintRegistry {
    /// 빈 레지스트리를 생성합니다.
    pub fn new() -> Self {
        Self { hints: Vec::new() }
    }

    /// 힌트를 등록합니다.
    ///
    /// 같은 ID의 힌트가 이미 등록되어 있으면 에러를 반환합니다.
    pub fn register(&mut self, hint: HintDefinition) -> Result<(), HintError> {
        let id = hint.meta.id;
        if self.hints.iter().any(|h| h.meta.id == id) {
            return Err(HintError::AlreadyRegistered { id: id.to_owned() });
        }
        self.hints.push(hint);
        Ok(())
    }

    /// 힌트를 해제하고 정의를 반환합니다.
    pub fn unregister(&mut self, id: &str) -> Result<HintDefinition, HintError> {
        let pos = self.hints.iter().position(|h| h.meta.id == id);
        match pos {
            Some(idx) => Ok(self.hints.remove(idx)),
            None => Err(HintError::NotFound { id: id.to_owned() }),
        }
    }

    /// ID로 힌트를 조회합니다.
    pub fn get(&self, id: &str) -> Option<&HintDefinition> {
        self.hints.iter().find(|h| h.meta.id == id)
    }

    /// 등록된 힌트 수를 반환합니다.
    pub fn count(&self) -> usize {
        self.hints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hints.is_empty()
    }

    /// 등록된 모든 힌트의 메타데이터를 반환합니다.
    pub fn list(&self) -> Vec<&HintMetadata> {
        self.hints.iter().map(|h| &h.meta).collect()
    }

    /// 등록된 힌트를 스캔 하나의 버스에 바인딩합니다.
    ///
    /// 실패한 힌트는 건너뛰고 진단으로 기록하며, 나머지 힌트의 바인딩은 계속됩니다.
    pub fn bind(&self, ctx: &BindContext<'_>, bus: &mut EventBus) -> BindOutcome {
        let mut outcome = BindOutcome::default();
        let local = is_local_target(ctx.target);

        for id in ctx.config.hints.keys() {
            if self.get(id).is_none() {
                warn!(hint = %id, "configuration references an unknown hint");
                outcome.diagnostics.push(Diagnostic::HintConfig {
                    hint: id.clone(),
                    reason: "no hint with this id is registered".to_owned(),
                });
            }
        }

        for hint in &self.hints {
            let meta = &hint.meta;
            let configured = ctx.config.hint(meta.id);
            let severity = configured
                .and_then(|c| c.severity)
                .unwrap_or(meta.default_severity);

            if !severity.is_enabled() {
                debug!(hint = meta.id, "hint disabled by configuration");
                outcome.diagnostics.push(Diagnostic::HintSkipped {
                    hint: meta.id.to_owned(),
                    reason: "disabled by configuration".to_owned(),
                });
                continue;
            }
            if local && !meta.works_with_local_files {
                debug!(hint = meta.id, "hint skipped for local target");
                outcome.diagnostics.push(Diagnostic::HintSkipped {
                    hint: meta.id.to_owned(),
                    reason: "does not work with local files".to_owned(),
                });
                continue;
            }

            match self.bind_one(hint, severity, ctx, bus) {
                Ok(listeners) => {
                    debug!(hint = meta.id, listeners, %severity, "hint bound");
                    outcome.bound.push(meta.id.to_owned());
                }
                Err(e) => {
                    warn!(hint = meta.id, error = %e, "hint dropped from scan");
                    outcome.diagnostics.push(Diagnostic::HintConfig {
                        hint: meta.id.to_owned(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        outcome
    }

    fn bind_one(
        &self,
        hint: &HintDefinition,
        severity: Severity,
        ctx: &BindContext<'_>,
        bus: &mut EventBus,
    ) -> Result<usize, HintError> {
        let id = hint.meta.id;
        let options = ctx
            .config
            .hint(id)
            .map(|c| c.options.clone())
            .unwrap_or_default();

        hint.meta
            .schema
            .validate(&options)
            .map_err(|reason| HintError::InvalidOptions {
                id: id.to_owned(),
                reason,
            })?;

        let hint_ctx = HintContext::new(
            ctx.sink.reporter(id, severity),
            options,
            Arc::clone(&ctx.browsers),
            Arc::clone(&ctx.page),
            ctx.target,
        );
        let subscriptions = (hint.factory)(&hint_ctx).map_err(|e| HintError::FactoryFailed {
            id: id.to_owned(),
            reason: format!("{e:#}"),
        })?;

        // 하나라도 잘못된 패턴이면 힌트 전체를 등록하지 않음
        for pattern in subscriptions.patterns() {
            Pattern::parse(pattern).map_err(|e| HintError::FactoryFailed {
                id: id.to_owned(),
                reason: e.to_string(),
            })?;
        }

        let count = subscriptions.len();
        for (pattern, handler) in subscriptions.entries {
            bus.subscribe(&pattern, id, handler)
                .map_err(|e| HintError::FactoryFailed {
                    id: id.to_owned(),
                    reason: e.to_string(),
                })?;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagehint_core::config::HintConfig;

    const FLAG_FIELDS: &[OptionField] = &[
        OptionField {
            name: "flag",
            kind: OptionKind::Bool,
            required: false,
            description: "a flag",
        },
        OptionField {
            name: "mode",
            kind: OptionKind::OneOf(&["fast", "slow"]),
            required: false,
            description: "a mode",
        },
        OptionField {
            name: "names",
            kind: OptionKind::StringList,
            required: false,
            description: "names",
        },
    ];

    fn meta(id: &'static str) -> HintMetadata {
        HintMetadata {
            id,
            category: Category::Other,
            description: "test hint",
            default_severity: Severity::Warning,
            fixable: false,
            schema: OptionsSchema { fields: FLAG_FIELDS },
            works_with_local_files: true,
        }
    }

    fn ok_factory(_: &HintContext) -> anyhow::Result<Subscriptions> {
        Ok(Subscriptions::new().on("element::p", |_| async { Ok(()) }))
    }

    fn failing_factory(_: &HintContext) -> anyhow::Result<Subscriptions> {
        anyhow::bail!("cannot initialise")
    }

    fn bad_pattern_factory(_: &HintContext) -> anyhow::Result<Subscriptions> {
        Ok(Subscriptions::new()
            .on("element::p", |_| async { Ok(()) })
            .on("*", |_| async { Ok(()) }))
    }

    fn def(id: &'static str, factory: HintFactory) -> HintDefinition {
        HintDefinition {
            meta: meta(id),
            factory,
        }
    }

    fn bind_with(
        registry: &HintRegistry,
        config: &PagehintConfig,
        target: &str,
    ) -> (BindOutcome, EventBus) {
        let mut bus = EventBus::new();
        let ctx = BindContext {
            config,
            browsers: Arc::from(Vec::new()),
            sink: Arc::new(ProblemSink::new(200)),
            page: Arc::new(PageState::default()),
            target,
        };
        let outcome = registry.bind(&ctx, &mut bus);
        (outcome, bus)
    }

    fn config_with(id: &str, hint: HintConfig) -> PagehintConfig {
        let mut config = PagehintConfig::default();
        config.hints.insert(id.to_owned(), hint);
        config
    }

    // ─── Registry ─────────────────────────────────────────────────

    #[test]
    fn register_rejects_duplicates() {
        let mut registry = HintRegistry::new();
        registry.register(def("a", ok_factory)).unwrap();
        let err = registry.register(def("a", ok_factory)).unwrap_err();
        assert!(matches!(err, HintError::AlreadyRegistered { .. }));
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn unregister_and_lookup() {
        let mut registry = HintRegistry::new();
        registry.register(def("a", ok_factory)).unwrap();
        registry.register(def("b", ok_factory)).unwrap();

        assert!(registry.get("b").is_some());
        let removed = registry.unregister("a").unwrap();
        assert_eq!(removed.meta.id, "a");
        assert!(matches!(
            registry.unregister("a"),
            Err(HintError::NotFound { .. })
        ));
        let ids: Vec<&str> = registry.list().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["b"]);
    }

    // ─── Schema ───────────────────────────────────────────────────

    #[test]
    fn schema_accepts_valid_options() {
        let schema = OptionsSchema { fields: FLAG_FIELDS };
        let options: toml::Table =
            toml::from_str("flag = true\nmode = \"fast\"\nnames = [\"a\", \"b\"]").unwrap();
        schema.validate(&options).unwrap();
    }

    #[test]
    fn schema_rejects_unknown_and_mistyped_options() {
        let schema = OptionsSchema { fields: FLAG_FIELDS };

        let unknown: toml::Table = toml::from_str("colour = 1").unwrap();
        assert!(schema.validate(&unknown).unwrap_err().contains("colour"));

        let mistyped: toml::Table = toml::from_str("flag = \"yes\"").unwrap();
        assert!(schema.validate(&mistyped).unwrap_err().contains("bool"));

        let not_allowed: toml::Table = toml::from_str("mode = \"medium\"").unwrap();
        assert!(schema.validate(&not_allowed).is_err());

        let mixed_list: toml::Table = toml::from_str("names = [\"a\", 1]").unwrap();
        assert!(schema.validate(&mixed_list).is_err());
    }

    #[test]
    fn schema_requires_required_fields() {
        const REQUIRED: &[OptionField] = &[OptionField {
            name: "level",
            kind: OptionKind::Integer,
            required: true,
            description: "level",
        }];
        let schema = OptionsSchema { fields: REQUIRED };
        let err = schema.validate(&toml::Table::new()).unwrap_err();
        assert!(err.contains("missing required option 'level'"));
    }

    // ─── Bind ─────────────────────────────────────────────────────

    #[test]
    fn bind_registers_enabled_hints() {
        let mut registry = HintRegistry::new();
        registry.register(def("a", ok_factory)).unwrap();
        registry.register(def("b", ok_factory)).unwrap();

        let (outcome, bus) = bind_with(&registry, &PagehintConfig::default(), "file:///x.html");
        assert_eq!(outcome.bound, vec!["a", "b"]);
        assert!(outcome.diagnostics.is_empty());
        assert_eq!(bus.listener_count(), 2);
    }

    #[test]
    fn bind_skips_hints_configured_off() {
        let mut registry = HintRegistry::new();
        registry.register(def("a", ok_factory)).unwrap();
        let config = config_with(
            "a",
            HintConfig {
                severity: Some(Severity::Off),
                options: toml::Table::new(),
            },
        );

        let (outcome, bus) = bind_with(&registry, &config, "file:///x.html");
        assert!(outcome.bound.is_empty());
        assert_eq!(bus.listener_count(), 0);
        assert!(matches!(
            &outcome.diagnostics[0],
            Diagnostic::HintSkipped { hint, .. } if hint == "a"
        ));
    }

    #[test]
    fn bind_skips_remote_only_hints_for_local_targets() {
        let mut registry = HintRegistry::new();
        let mut remote_only = def("remote", ok_factory);
        remote_only.meta.works_with_local_files = false;
        registry.register(remote_only).unwrap();

        let (outcome, _) = bind_with(&registry, &PagehintConfig::default(), "./page.html");
        assert!(outcome.bound.is_empty());

        let (outcome, _) =
            bind_with(&registry, &PagehintConfig::default(), "https://example.com/");
        assert_eq!(outcome.bound, vec!["remote"]);
    }

    #[test]
    fn bind_drops_hint_with_invalid_options_only() {
        let mut registry = HintRegistry::new();
        registry.register(def("a", ok_factory)).unwrap();
        registry.register(def("b", ok_factory)).unwrap();
        let config = config_with(
            "a",
            HintConfig {
                severity: None,
                options: toml::from_str("flag = 3").unwrap(),
            },
        );

        let (outcome, bus) = bind_with(&registry, &config, "file:///x.html");
        assert_eq!(outcome.bound, vec!["b"]);
        assert_eq!(bus.listener_count(), 1);
        assert!(matches!(
            &outcome.diagnostics[0],
            Diagnostic::HintConfig { hint, reason } if hint == "a" && reason.contains("flag")
        ));
    }

    #[test]
    fn bind_drops_hint_whose_factory_fails() {
        let mut registry = HintRegistry::new();
        registry.register(def("broken", failing_factory)).unwrap();
        registry.register(def("ok", ok_factory)).unwrap();

        let (outcome, _) = bind_with(&registry, &PagehintConfig::default(), "file:///x.html");
        assert_eq!(outcome.bound, vec!["ok"]);
        assert!(matches!(
            &outcome.diagnostics[0],
            Diagnostic::HintConfig { hint, reason } if hint == "broken" && reason.contains("cannot initialise")
        ));
    }

    #[test]
    fn bind_is_atomic_per_hint_on_bad_pattern() {
        let mut registry = HintRegistry::new();
        registry.register(def("bad", bad_pattern_factory)).unwrap();

        let (outcome, bus) = bind_with(&registry, &PagehintConfig::default(), "file:///x.html");
        assert!(outcome.bound.is_empty());
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn bind_reports_unknown_configured_hints() {
        let registry = HintRegistry::new();
        let config = config_with("ghost", HintConfig::default());

        let (outcome, _) = bind_with(&registry, &config, "file:///x.html");
        assert!(matches!(
            &outcome.diagnostics[0],
            Diagnostic::HintConfig { hint, .. } if hint == "ghost"
        ));
    }

    // ─── Context ──────────────────────────────────────────────────

    #[derive(Debug, serde::Deserialize, Default)]
    #[serde(default)]
    struct FlagOptions {
        flag: bool,
        names: Vec<String>,
    }

    #[test]
    fn context_deserializes_options() {
        let sink = Arc::new(ProblemSink::new(200));
        let ctx = HintContext::new(
            sink.reporter("a", Severity::Warning),
            toml::from_str("flag = true\nnames = [\"x\"]").unwrap(),
            Arc::from(vec!["ie 9".parse::<BrowserTarget>().unwrap()]),
            Arc::new(PageState::default()),
            "https://example.com/",
        );

        let options: FlagOptions = ctx.options().unwrap();
        assert!(options.flag);
        assert_eq!(options.names, vec!["x"]);
        assert!(ctx.targets_document_mode_browsers());
        assert!(!ctx.is_local_target());
        assert!(ctx.page_dom().is_none());
    }

    #[test]
    fn local_target_detection() {
        assert!(is_local_target("file:///tmp/a.html"));
        assert!(is_local_target("./a.html"));
        assert!(is_local_target("C:\\site\\index.html"));
        assert!(!is_local_target("https://example.com"));
        assert!(!is_local_target("HTTP://example.com"));
    }

    #[test]
    fn page_state_publishes_once() {
        use pagehint_core::html::HtmlDocument;

        let page = PageState::default();
        let doc: DocumentRef = Arc::new(HtmlDocument::parse("<p>x</p>").unwrap());
        assert!(page.publish(Arc::clone(&doc), Headers::new()));
        assert!(!page.publish(doc, Headers::new()));
        assert!(page.dom().is_some());
        assert!(page.headers().is_some());
    }
}
