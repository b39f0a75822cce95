// SPDX-License-Identifier: MIT OR Apache-2.0

#[cfg(target_arch = "wasm32")]
wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

use fanlog::{Deployment, Level, Registry, StdErrorSink};
use std::sync::Arc;

//Writes a few lines to stderr so they can be eyeballed with `--nocapture`.
#[cfg_attr(not(target_arch = "wasm32"), test)]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn print_demo() {
    let registry = Arc::new(Registry::with_deployment(Deployment::function(
        "demo-fn",
        Some("7"),
    )));
    registry.register_level(Level::Debug, Arc::new(StdErrorSink::new()));

    let log = registry.logger("demo");
    fanlog::debug!(log, serde_json::json!({"step": 1}), "starting %s", "up");
    log.child("worker").info("hello from the worker");

    #[cfg(not(target_arch = "wasm32"))]
    {
        let handle = std::thread::spawn(move || {
            fanlog::warn!(log, "from a thread, %d%% done", 50);
        });
        handle.join().unwrap();
    }
    registry.flush().unwrap();
    assert_eq!(registry.write_failures(), 0);
}
