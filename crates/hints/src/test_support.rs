//! 힌트 단위 테스트 도우미

use pagehint_connector::{MemoryLoader, StaticConnector};
use pagehint_core::config::{HintConfig, PagehintConfig};
use pagehint_engine::{HintDefinition, HintRegistry, ScanReport, Scanner};

pub(crate) const PAGE_URL: &str = "https://example.com/";

/// 힌트 하나만 등록하고 로더의 대상을 스캔합니다.
pub(crate) async fn scan_with(
    definition: HintDefinition,
    config: PagehintConfig,
    loader: MemoryLoader,
    target: &str,
) -> ScanReport {
    let mut registry = HintRegistry::new();
    registry.register(definition).expect("register hint");
    let scanner = Scanner::new(registry, config).expect("scanner");
    let mut connector = StaticConnector::new(loader);
    scanner.scan(&mut connector, target).await
}

/// `PAGE_URL`에서 제공되는 HTML 하나를 기본 설정으로 스캔합니다.
pub(crate) async fn scan_html(definition: HintDefinition, html: &'static str) -> ScanReport {
    let loader = MemoryLoader::new().page(PAGE_URL, "text/html; charset=utf-8", html);
    scan_with(definition, PagehintConfig::default(), loader, PAGE_URL).await
}

/// 힌트 옵션(TOML)과 대상 브라우저를 지정한 설정
pub(crate) fn config_with(id: &str, options: &str, browsers: &[&str]) -> PagehintConfig {
    let mut config = PagehintConfig::default();
    config.scan.browsers = browsers.iter().map(|b| (*b).to_owned()).collect();
    config.hints.insert(
        id.to_owned(),
        HintConfig {
            severity: None,
            options: toml::from_str(options).expect("options toml"),
        },
    );
    config
}

/// 보고된 메시지 목록
pub(crate) fn messages(report: &ScanReport) -> Vec<&str> {
    report.problems.iter().map(|p| p.message.as_str()).collect()
}
