//! Snapshot Persistence Tests
//!
//! - A saved registry reloads with identical tables, orphans included
//! - Identifier assignment continues where it left off
//! - Tampering and missing files are detected before parsing
//! - A save cut short before its manifest leaves the last commit intact

use std::fs;

use bookledger::config::RegistryConfig;
use bookledger::observability::Logger;
use bookledger::registry::{
    CallContext, LedgerState, Principal, RecordFields, Registry, RegistryError, RegistryIdentity,
};
use bookledger::snapshot::{
    parse_checksum, state_file_name, SnapshotError, SnapshotStore, FORMAT_VERSION,
};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn identity() -> RegistryIdentity {
    RegistryIdentity::new(Principal::from_u128(0xAD), Principal::nil())
}

fn author() -> CallContext {
    CallContext::new(Principal::from_u128(0x1), 20)
}

fn reader() -> CallContext {
    CallContext::new(Principal::from_u128(0x2), 21)
}

fn fields(title: &str) -> RecordFields {
    RecordFields::new(title, 1_000, "summary", vec!["tag".to_string()])
}

/// Two records, one deleted, with a grant and a read on each
fn populated_registry() -> Registry {
    let registry = Registry::new(identity()).with_logger(Logger::silent());
    let kept = registry.upload(&author(), fields("Persuasion")).unwrap();
    let gone = registry.upload(&author(), fields("Sanditon")).unwrap();
    for id in [kept, gone] {
        registry.grant_access(&author(), id, reader().caller).unwrap();
        registry.read_ebook(&reader(), id).unwrap();
    }
    registry.delete(&author(), gone).unwrap();
    registry
}

// =============================================================================
// Round Trip
// =============================================================================

#[test]
fn test_reload_preserves_tables() {
    let tmp = TempDir::new().unwrap();
    let store = SnapshotStore::new(tmp.path().join("ledger"));
    let registry = populated_registry();

    let manifest = store.save(&registry.export_state()).unwrap();
    assert_eq!(manifest.format_version, FORMAT_VERSION);
    assert_eq!(manifest.total_records, 2);
    assert_eq!(manifest.live_records, 1);
    assert!(parse_checksum(&manifest.state_checksum).is_some());

    let reloaded = Registry::with_state(identity(), store.load().unwrap())
        .with_logger(Logger::silent());
    assert_eq!(reloaded.export_state(), registry.export_state());
    assert_eq!(reloaded.summary(), registry.summary());

    // Orphaned grant on the deleted record survives the round trip
    assert!(reloaded.has_access(2, &reader().caller));
    assert_eq!(reloaded.get_metadata(2), Err(RegistryError::NotFound));
    assert_eq!(reloaded.get_read_count(1), Ok(1));
}

#[test]
fn test_ids_continue_after_reload() {
    let tmp = TempDir::new().unwrap();
    let store = SnapshotStore::new(tmp.path());
    store.save(&populated_registry().export_state()).unwrap();

    let reloaded = Registry::with_state(identity(), store.load().unwrap())
        .with_logger(Logger::silent());
    assert_eq!(reloaded.upload(&author(), fields("Emma")), Ok(3));
}

#[test]
fn test_registry_from_config_uses_loaded_state() {
    let tmp = TempDir::new().unwrap();
    let config = RegistryConfig::new(
        tmp.path().display().to_string(),
        Principal::from_u128(0xAD),
    );
    let store = SnapshotStore::new(config.state_path());
    store.save(&populated_registry().export_state()).unwrap();

    let registry = Registry::from_config(&config, store.load().unwrap())
        .with_logger(Logger::silent());
    assert_eq!(registry.get_total_records(), 2);
    assert!(registry.check_admin_access(&CallContext::new(config.admin, 1)));
}

// =============================================================================
// Integrity
// =============================================================================

#[test]
fn test_tampered_state_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let store = SnapshotStore::new(tmp.path());
    store.save(&populated_registry().export_state()).unwrap();

    let state_path = store.state_path().unwrap();
    let text = fs::read_to_string(&state_path).unwrap();
    fs::write(&state_path, text.replace("Persuasion", "Persuasiom")).unwrap();

    let err = store.load().unwrap_err();
    assert!(matches!(err, SnapshotError::ChecksumMismatch { .. }));
    assert!(err.is_corruption());
}

#[test]
fn test_missing_state_file_is_io_error() {
    let tmp = TempDir::new().unwrap();
    let store = SnapshotStore::new(tmp.path());
    store.save(&populated_registry().export_state()).unwrap();
    fs::remove_file(store.state_path().unwrap()).unwrap();

    let err = store.verify().unwrap_err();
    assert_eq!(err.code(), "BOOK_SNAPSHOT_IO");
}

#[test]
fn test_unfinished_save_does_not_replace_committed_state() {
    let tmp = TempDir::new().unwrap();
    let store = SnapshotStore::new(tmp.path());
    let committed = populated_registry().export_state();
    let manifest = store.save(&committed).unwrap();

    // New state written under the next generation, manifest never renamed
    let orphan = tmp.path().join(state_file_name(manifest.generation + 1));
    fs::write(&orphan, serde_json::to_vec(&LedgerState::new()).unwrap()).unwrap();

    let reopened = SnapshotStore::new(tmp.path());
    assert_eq!(reopened.load().unwrap(), committed);
    assert_eq!(reopened.verify().unwrap(), manifest);

    reopened.save(&committed).unwrap();
    assert!(!orphan.exists());
}

#[test]
fn test_empty_directory_is_missing() {
    let tmp = TempDir::new().unwrap();
    let store = SnapshotStore::new(tmp.path());
    assert!(!store.exists());
    assert_eq!(store.verify().unwrap_err().code(), "BOOK_SNAPSHOT_MISSING");
}
