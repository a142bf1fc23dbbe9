#![forbid(unsafe_code)]

//! Loading configuration from disk.

use std::io::Write;

use keygrid_core::event::KeyCode;
use keygrid_core::geometry::Rect;
use keygrid_core::selection::PointerAction;
use keygrid_runtime::config::{ConfigError, KeygridConfig};

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn loads_full_file() {
    let file = write_config(
        r#"
        [grid]
        rows = "asdf"
        cols = "jkl"

        [subgrid]
        rows = 2
        cols = 3
        alphabet = "QWEASD"

        [pointer]
        action = "move"
        dispatch_delay_ms = 0

        [session]
        cancel_key = "backspace"
        single_shot = false

        [screen]
        width = 2560
        height = 1440
        "#,
    );
    let config = KeygridConfig::from_toml_file(file.path()).unwrap();
    assert!(config.validate().unwrap().is_empty());
    assert_eq!(config.row_alphabet().unwrap().to_string(), "ASDF");
    assert_eq!(config.cancel_key().unwrap(), KeyCode::Backspace);
    assert_eq!(config.pointer.action, PointerAction::Move);
    assert!(!config.session.single_shot);
    assert_eq!(config.screen_rect(), Some(Rect::from_size(2560, 1440)));

    let layout = config.sub_layout().unwrap().unwrap();
    assert_eq!((layout.rows(), layout.cols()), (2, 3));
}

#[test]
fn empty_file_is_default() {
    let file = write_config("");
    let config = KeygridConfig::from_toml_file(file.path()).unwrap();
    assert_eq!(config, KeygridConfig::default());
}

#[test]
fn malformed_file_reports_parse_error() {
    let file = write_config("[grid\nrows = 3");
    assert!(matches!(
        KeygridConfig::from_toml_file(file.path()),
        Err(ConfigError::Toml(_))
    ));
}

#[test]
fn written_config_loads_back() {
    let mut config = KeygridConfig::default();
    config.grid.rows = "QWE".into();
    config.pointer.action = PointerAction::Move;
    let file = write_config(&config.to_toml_string().unwrap());
    assert_eq!(KeygridConfig::from_toml_file(file.path()).unwrap(), config);
}
