#![no_main]

use libfuzzer_sys::fuzz_target;
use panelstack_nav::StackConfig;
use panelstack_recycler::RecyclerConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if text.len() > 4096 {
        return;
    }

    // Loaders must never panic, and anything they accept must validate.
    if let Ok(config) = StackConfig::from_toml_str(text) {
        assert!(config.validate().is_empty());
    }
    if let Ok(config) = StackConfig::from_json_str(text) {
        assert!(config.validate().is_empty());
    }
    if let Ok(config) = RecyclerConfig::from_toml_str(text) {
        assert!(config.validate().is_empty());
        assert!(config.check().is_ok(), "validated config rejected: {config:?}");
    }
    if let Ok(config) = RecyclerConfig::from_json_str(text) {
        assert!(config.validate().is_empty());
        assert!(config.check().is_ok(), "validated config rejected: {config:?}");
    }
});
