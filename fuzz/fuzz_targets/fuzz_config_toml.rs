#![no_main]

use keygrid_core::geometry::Rect;
use keygrid_runtime::config::KeygridConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(config) = KeygridConfig::from_toml_str(text) else {
        return;
    };

    // A config that validates must always produce a selector for a
    // reasonable screen.
    if config.validate().is_ok() {
        let selector = config
            .build_selector(Rect::from_size(4096, 4096))
            .expect("validated config builds a selector");
        assert_eq!(
            selector.grid().len(),
            config.row_alphabet().unwrap().len() * config.col_alphabet().unwrap().len()
        );
    }
});
