#![no_main]

use libfuzzer_sys::fuzz_target;
use pagehint_core::config::PagehintConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(toml_str) = std::str::from_utf8(data) {
        if let Ok(config) = PagehintConfig::parse(toml_str) {
            let _ = config.validate();
        }
    }
});
