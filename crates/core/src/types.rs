//! 도메인 타입 — 시스템 전역에서 사용되는 공통 타입
//!
//! 힌트가 보고하는 [`Problem`]과 심각도, 위치, 대상 브라우저 표기를 정의합니다.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// 심각도 레벨
///
/// `Ord` 구현으로 비교가 가능합니다 (`Off < Warning < Error`).
/// `Off`는 힌트가 비활성화되었음을 뜻하며, 이 심각도로는 Problem이 생성되지 않습니다.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// 비활성화
    Off,
    /// 경고
    #[default]
    #[serde(alias = "warn")]
    Warning,
    /// 오류
    Error,
}

impl Severity {
    /// 문자열에서 심각도를 파싱합니다.
    ///
    /// 대소문자를 구분하지 않습니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "off" | "disabled" | "0" => Some(Self::Off),
            "warning" | "warn" | "1" => Some(Self::Warning),
            "error" | "err" | "2" => Some(Self::Error),
            _ => None,
        }
    }

    /// Problem을 생성할 수 있는 심각도인지 확인합니다.
    pub fn is_enabled(self) -> bool {
        self != Self::Off
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// 힌트 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// 접근성
    Accessibility,
    /// 브라우저 호환성
    Compatibility,
    /// 개발 편의
    Development,
    /// 상호 운용성
    Interoperability,
    /// 성능
    Performance,
    /// 프로그레시브 웹 앱
    Pwa,
    /// 보안
    Security,
    /// 기타
    Other,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Accessibility => "accessibility",
            Self::Compatibility => "compatibility",
            Self::Development => "development",
            Self::Interoperability => "interoperability",
            Self::Performance => "performance",
            Self::Pwa => "pwa",
            Self::Security => "security",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// Problem 위치
///
/// `line`/`column`은 문서 기준 1-based 위치입니다.
/// `element_line`/`element_column`은 요소 내부 기준 상대 위치입니다 (있을 경우).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemLocation {
    /// 문서 기준 줄 번호
    pub line: u32,
    /// 문서 기준 열 번호
    pub column: u32,
    /// 요소 기준 줄 번호
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_line: Option<u32>,
    /// 요소 기준 열 번호
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_column: Option<u32>,
}

impl ProblemLocation {
    /// 문서 기준 위치만 가진 Location을 생성합니다.
    pub fn new(line: u32, column: u32) -> Self {
        Self {
            line,
            column,
            element_line: None,
            element_column: None,
        }
    }
}

impl fmt::Display for ProblemLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// 힌트가 보고한 문제
///
/// Problem Sink의 report 경로로만 생성되며, 생성 이후 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    /// 문제가 발견된 리소스 (URL)
    pub resource: String,
    /// 보고한 힌트 ID
    pub hint_id: String,
    /// 심각도
    pub severity: Severity,
    /// 메시지
    pub message: String,
    /// 위치 (요소 기반 보고일 때)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<ProblemLocation>,
    /// 관련 소스 코드 조각
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_code: Option<String>,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(
                f,
                "[{}] {}:{} {} ({})",
                self.severity, self.resource, loc, self.message, self.hint_id
            ),
            None => write!(
                f,
                "[{}] {} {} ({})",
                self.severity, self.resource, self.message, self.hint_id
            ),
        }
    }
}

/// 표시 순서 비교: 리소스 → 위치 (위치 없는 문제가 먼저) → 힌트 ID
pub fn presentation_order(a: &Problem, b: &Problem) -> Ordering {
    a.resource
        .cmp(&b.resource)
        .then_with(|| match (a.location, b.location) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => x.line.cmp(&y.line).then(x.column.cmp(&y.column)),
        })
        .then_with(|| a.hint_id.cmp(&b.hint_id))
}

/// Problem 목록을 표시 순서로 정렬합니다 (안정 정렬).
pub fn sort_problems(problems: &mut [Problem]) {
    problems.sort_by(presentation_order);
}

/// 대상 브라우저 (예: `"chrome 120"`, `"ie 11"`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BrowserTarget {
    /// 소문자 브라우저 이름
    pub name: String,
    /// 주 버전
    pub version: u32,
}

impl BrowserTarget {
    /// document mode를 가진 브라우저(Internet Explorer 8–11)인지 확인합니다.
    pub fn is_document_mode_browser(&self) -> bool {
        self.is_internet_explorer() && (8..=11).contains(&self.version)
    }

    /// `rel="noopener"`을 지원하는지 확인합니다.
    pub fn supports_noopener(&self) -> bool {
        match self.name.as_str() {
            "ie" | "internet explorer" | "explorer" => false,
            "edge" => self.version >= 79,
            "chrome" | "and_chr" => self.version >= 49,
            "firefox" | "and_ff" => self.version >= 52,
            "safari" | "ios_saf" => self.version >= 11,
            "opera" => self.version >= 36,
            _ => true,
        }
    }

    fn is_internet_explorer(&self) -> bool {
        matches!(self.name.as_str(), "ie" | "internet explorer" | "explorer")
    }
}

impl FromStr for BrowserTarget {
    type Err = ParseError;

    /// `"<name> <version>"` 형식을 파싱합니다. 버전은 주 버전만 사용합니다.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = |reason: &str| ParseError::BrowserTarget {
            value: s.to_owned(),
            reason: reason.to_owned(),
        };

        let (name, version) = trimmed
            .rsplit_once(char::is_whitespace)
            .ok_or_else(|| invalid("expected '<name> <version>'"))?;

        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return Err(invalid("browser name is empty"));
        }

        let major: String = version
            .trim()
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        let version = major
            .parse::<u32>()
            .map_err(|_| invalid("version must start with a number"))?;

        Ok(Self { name, version })
    }
}

impl fmt::Display for BrowserTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem(resource: &str, hint: &str, location: Option<(u32, u32)>) -> Problem {
        Problem {
            resource: resource.to_owned(),
            hint_id: hint.to_owned(),
            severity: Severity::Warning,
            message: "msg".to_owned(),
            location: location.map(|(l, c)| ProblemLocation::new(l, c)),
            source_code: None,
        }
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::Off < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn severity_default_is_warning() {
        assert_eq!(Severity::default(), Severity::Warning);
    }

    #[test]
    fn severity_from_str_loose() {
        assert_eq!(Severity::from_str_loose("ERROR"), Some(Severity::Error));
        assert_eq!(Severity::from_str_loose("warn"), Some(Severity::Warning));
        assert_eq!(Severity::from_str_loose(" off "), Some(Severity::Off));
        assert_eq!(Severity::from_str_loose("2"), Some(Severity::Error));
        assert_eq!(Severity::from_str_loose("fatal"), None);
    }

    #[test]
    fn severity_serde_lowercase() {
        let json = serde_json::to_string(&Severity::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
        let parsed: Severity = serde_json::from_str("\"warn\"").unwrap();
        assert_eq!(parsed, Severity::Warning);
    }

    #[test]
    fn sort_problems_by_resource_then_location() {
        let mut problems = vec![
            problem("https://b.example/", "x", Some((1, 1))),
            problem("https://a.example/", "x", Some((10, 2))),
            problem("https://a.example/", "y", None),
            problem("https://a.example/", "x", Some((3, 7))),
            problem("https://a.example/", "x", Some((3, 2))),
        ];
        sort_problems(&mut problems);

        let order: Vec<(String, Option<u32>, Option<u32>)> = problems
            .iter()
            .map(|p| {
                (
                    p.resource.clone(),
                    p.location.map(|l| l.line),
                    p.location.map(|l| l.column),
                )
            })
            .collect();
        assert_eq!(
            order,
            vec![
                ("https://a.example/".to_owned(), None, None),
                ("https://a.example/".to_owned(), Some(3), Some(2)),
                ("https://a.example/".to_owned(), Some(3), Some(7)),
                ("https://a.example/".to_owned(), Some(10), Some(2)),
                ("https://b.example/".to_owned(), Some(1), Some(1)),
            ]
        );
    }

    #[test]
    fn problem_display_with_location() {
        let p = problem("https://a.example/", "image-alt", Some((4, 9)));
        assert_eq!(
            p.to_string(),
            "[warning] https://a.example/:4:9 msg (image-alt)"
        );
    }

    #[test]
    fn browser_target_parses_name_and_major_version() {
        let target: BrowserTarget = "Chrome 120.0.1".parse().unwrap();
        assert_eq!(target.name, "chrome");
        assert_eq!(target.version, 120);

        let target: BrowserTarget = "internet explorer 9".parse().unwrap();
        assert_eq!(target.name, "internet explorer");
        assert!(target.is_document_mode_browser());
    }

    #[test]
    fn browser_target_rejects_missing_version() {
        assert!("chrome".parse::<BrowserTarget>().is_err());
        assert!("chrome latest".parse::<BrowserTarget>().is_err());
    }

    #[test]
    fn document_mode_browsers_are_ie_8_to_11() {
        let ie7: BrowserTarget = "ie 7".parse().unwrap();
        let ie11: BrowserTarget = "ie 11".parse().unwrap();
        let edge: BrowserTarget = "edge 18".parse().unwrap();
        assert!(!ie7.is_document_mode_browser());
        assert!(ie11.is_document_mode_browser());
        assert!(!edge.is_document_mode_browser());
    }

    #[test]
    fn noopener_support() {
        let old_edge: BrowserTarget = "edge 18".parse().unwrap();
        let chrome: BrowserTarget = "chrome 120".parse().unwrap();
        let ie: BrowserTarget = "ie 11".parse().unwrap();
        assert!(!old_edge.supports_noopener());
        assert!(chrome.supports_noopener());
        assert!(!ie.supports_noopener());
    }
}
