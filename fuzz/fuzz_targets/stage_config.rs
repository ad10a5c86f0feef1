#![no_main]

use libfuzzer_sys::fuzz_target;
use rawsig_processes::{ProcessConfigDocument, ProcessRegistry};

fuzz_target!(|data: &[u8]| {
    // TOML 파서는 &str을 받으므로 UTF-8 변환 필요
    let Ok(content) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(doc) = ProcessConfigDocument::parse(content) else {
        return;
    };
    let registry = ProcessRegistry::default();
    for kind in registry.kinds() {
        let _ = registry.build(kind, &doc);
    }
});
