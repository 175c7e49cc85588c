//! Roundtrip serialisation tests for the persisted registry.
//!
//! Each `#[case]` gets its own `TempDir`, so nothing is shared.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use appdeck_core::{registry, AppEntry, AppRoot, Registry};
use rstest::rstest;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn empty_registry() -> Registry {
    Registry::new()
}

fn two_app_registry() -> Registry {
    let lan = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 50));
    [
        (AppRoot::from("/work/appA"), AppEntry::new(lan, 8501, 1001)),
        (AppRoot::from("/work/appB"), AppEntry::new(lan, 9000, 1002)),
    ]
    .into_iter()
    .collect()
}

fn unicode_registry() -> Registry {
    [(
        AppRoot::from("/work/アプリ/проект 项目"),
        AppEntry::new(IpAddr::V6(Ipv6Addr::LOCALHOST), 8765, u32::MAX),
    )]
    .into_iter()
    .collect()
}

// ---------------------------------------------------------------------------
// save → load → save
// ---------------------------------------------------------------------------

#[rstest]
#[case::empty(empty_registry())]
#[case::two_apps(two_app_registry())]
#[case::unicode(unicode_registry())]
fn save_load_save_is_stable(#[case] original: Registry) {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join(registry::REGISTRY_FILE);

    registry::save_at(&path, &original).expect("first save");
    let first_bytes = std::fs::read(&path).expect("read");

    let loaded = registry::load_at(&path).expect("load");
    assert_eq!(loaded, original);

    registry::save_at(&path, &loaded).expect("second save");
    let second_bytes = std::fs::read(&path).expect("read");
    assert_eq!(first_bytes, second_bytes, "re-saving must not change the file");
}

#[rstest]
#[case(8501)]
#[case(8750)]
#[case(9000)]
fn port_survives_roundtrip(#[case] port: u16) {
    let mut reg = Registry::new();
    reg.insert_new(
        AppRoot::from("/a"),
        AppEntry::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port, 7),
    );
    let json = registry::to_json(&reg).expect("json");
    let back: Registry = serde_json::from_str(&json).expect("parse");
    assert_eq!(back.get(&AppRoot::from("/a")).map(|e| e.port), Some(port));
}
