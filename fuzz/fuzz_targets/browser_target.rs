#![no_main]

use libfuzzer_sys::fuzz_target;
use pagehint_core::types::BrowserTarget;

fuzz_target!(|data: &[u8]| {
    if let Ok(entry) = std::str::from_utf8(data) {
        if let Ok(target) = entry.parse::<BrowserTarget>() {
            let _ = target.is_document_mode_browser();
            let _ = target.supports_noopener();
        }
    }
});
