#![no_main]

use libfuzzer_sys::fuzz_target;
use pagehint_core::dom::{Document, Element};
use pagehint_core::html::HtmlDocument;

fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(document) = HtmlDocument::parse(source) else {
        return;
    };

    // 모든 요소는 루트에서 도달 가능해야 하고 부모 링크와 일치해야 한다
    let mut stack = vec![document.root()];
    let mut visited = 0usize;
    while let Some(element) = stack.pop() {
        visited += 1;
        let _ = element.outer_html();
        for child in element.children() {
            let parent = child.parent().expect("child has a parent");
            assert!(parent.is_same(element.as_ref()));
            stack.push(child);
        }
    }
    assert_eq!(visited, document.element_count());
});
