#![no_main]

use libfuzzer_sys::fuzz_target;
use rawsig_core::observable::ObservableCatalog;
use rawsig_tree::RunFile;

fuzz_target!(|data: &[u8]| {
    if let Ok(json) = std::str::from_utf8(data) {
        if let Ok(run) = RunFile::from_json(json) {
            for name in run.tree_names() {
                if let Some(tree) = run.tree(name) {
                    let _ = tree.observable_exists("veto_PeakTime_top");
                }
            }
        }
    }
});
