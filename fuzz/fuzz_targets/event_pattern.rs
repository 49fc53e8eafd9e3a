#![no_main]

use libfuzzer_sys::fuzz_target;
use pagehint_engine::Pattern;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    // 앞부분은 패턴, 나머지는 이벤트 이름
    let (pattern, name) = text.split_once('\n').unwrap_or((text, text));
    if let Ok(pattern) = Pattern::parse(pattern) {
        let _ = pattern.matches(name);
    }
});
