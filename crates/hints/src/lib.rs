//! # pagehint-hints
//!
//! 내장 힌트 모음입니다. 각 모듈은 `ID`와 [`HintDefinition`]을 돌려주는
//! `definition()`을 제공합니다.
//!
//! | ID | 분류 | 구독 |
//! |----|------|------|
//! | `disown-opener` | security | `element::a`, `element::area` |
//! | `highest-available-document-mode` | compatibility | `traverse::end` |
//! | `image-alt` | accessibility | `element::img` |
//! | `meta-charset-utf-8` | interoperability | `traverse::end` |
//! | `no-broken-links` | other | `fetch::error` |
//! | `no-disallowed-headers` | security | `fetch::end::*` |

pub mod disown_opener;
pub mod highest_document_mode;
pub mod image_alt;
pub mod meta_charset_utf_8;
pub mod no_broken_links;
pub mod no_disallowed_headers;

#[cfg(test)]
mod test_support;

use pagehint_core::error::HintError;
use pagehint_engine::{HintDefinition, HintRegistry};

/// 모든 내장 힌트 정의 (ID 순)
pub fn builtin_hints() -> Vec<HintDefinition> {
    vec![
        disown_opener::definition(),
        highest_document_mode::definition(),
        image_alt::definition(),
        meta_charset_utf_8::definition(),
        no_broken_links::definition(),
        no_disallowed_headers::definition(),
    ]
}

/// ID로 내장 힌트를 찾습니다.
pub fn find(id: &str) -> Option<HintDefinition> {
    builtin_hints().into_iter().find(|h| h.meta.id == id)
}

/// 모든 내장 힌트를 등록한 레지스트리
pub fn builtin_registry() -> Result<HintRegistry, HintError> {
    registry_with(builtin_hints())
}

/// 주어진 힌트만 등록한 레지스트리. 중복 ID는 오류입니다.
pub fn registry_with(
    hints: impl IntoIterator<Item = HintDefinition>,
) -> Result<HintRegistry, HintError> {
    let mut registry = HintRegistry::new();
    for hint in hints {
        registry.register(hint)?;
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_ids_are_unique_and_sorted() {
        let ids: Vec<&str> = builtin_hints().iter().map(|h| h.meta.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn builtin_registry_lists_every_hint() {
        let registry = builtin_registry().expect("registry");
        assert_eq!(registry.count(), builtin_hints().len());
        assert!(registry.get(no_broken_links::ID).is_some());
    }

    #[test]
    fn find_by_id() {
        let hint = find("image-alt").expect("image-alt");
        assert_eq!(hint.meta.id, image_alt::ID);
        assert!(find("no-such-hint").is_none());
    }

    #[test]
    fn duplicate_definition_is_rejected() {
        let err = registry_with([image_alt::definition(), image_alt::definition()])
            .expect_err("duplicate");
        assert!(matches!(err, HintError::AlreadyRegistered { id } if id == "image-alt"));
    }
}
