//! CLI command implementations
//!
//! Each command loads the configuration, touches the snapshot directory it
//! names, and prints JSON to stdout. The `*_ledger` functions carry the
//! logic and return the JSON instead of printing it.

use std::io::{self, BufRead, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::{json, Value};

use crate::config::RegistryConfig;
use crate::observability::{Event, MetricsSnapshot};
use crate::registry::{LedgerState, RecordId, Registry, Transaction};
use crate::snapshot::SnapshotStore;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{error_response, ok_response, read_lines, write_line, InputLine};

/// Main CLI entry point, the only function main.rs calls
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Apply { config } => apply(&config),
        Command::Inspect { config, record } => inspect(&config, record),
        Command::Verify { config } => verify(&config),
        Command::Backup { config, output } => backup(&config, &output),
        Command::Restore { config, input } => restore(&config, &input),
    }
}

pub fn init(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let response = init_ledger(&config)?;
    write_line(&mut io::stdout().lock(), &response)
}

pub fn apply(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    apply_stream(&config, stdin.lock(), &mut stdout.lock())?;
    Ok(())
}

pub fn inspect(config_path: &Path, record: Option<RecordId>) -> CliResult<()> {
    let config = load_config(config_path)?;
    let response = inspect_ledger(&config, record)?;
    write_line(&mut io::stdout().lock(), &response)
}

pub fn verify(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let response = verify_ledger(&config)?;
    write_line(&mut io::stdout().lock(), &response)
}

pub fn backup(config_path: &Path, output: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let response = backup_ledger(&config, output)?;
    write_line(&mut io::stdout().lock(), &response)
}

pub fn restore(config_path: &Path, input: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let response = restore_ledger(&config, input)?;
    write_line(&mut io::stdout().lock(), &response)
}

fn load_config(path: &Path) -> CliResult<RegistryConfig> {
    let config = RegistryConfig::load(path)?;
    let path_text = path.display().to_string();
    config.logger().info(
        Event::ConfigLoaded,
        &[("path", path_text.as_str()), ("state_dir", config.state_dir.as_str())],
    );
    Ok(config)
}

/// Write an empty snapshot. Fails if one already exists.
pub fn init_ledger(config: &RegistryConfig) -> CliResult<Value> {
    let store = SnapshotStore::new(config.state_path());
    if store.exists() {
        return Err(CliError::already_initialized(&config.state_dir));
    }

    let manifest = store.save(&LedgerState::new())?;
    config.logger().info(
        Event::StateCreated,
        &[
            ("state_checksum", manifest.state_checksum.as_str()),
            ("state_dir", config.state_dir.as_str()),
        ],
    );

    Ok(json!({
        "initialized": true,
        "state_dir": config.state_dir,
        "manifest": manifest,
    }))
}

/// Outcome of one `apply` run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    /// Input lines that failed to parse as a transaction
    pub malformed: u64,
    pub metrics: MetricsSnapshot,
}

/// Apply every transaction line of `input`, answer each on `output`, then
/// persist the resulting state once.
///
/// The state is saved even when reading input or writing answers fails
/// part way, so every call applied before the failure survives. The
/// stream error is returned after the save.
pub fn apply_stream<R: BufRead, W: Write>(
    config: &RegistryConfig,
    input: R,
    output: &mut W,
) -> CliResult<ApplyReport> {
    let store = open_store(config)?;
    let registry = load_registry(config, &store)?;
    let mut malformed = 0;

    let streamed = apply_lines(&registry, input, output, &mut malformed);
    if let Err(err) = &streamed {
        let applied = registry.metrics().calls_applied.to_string();
        config.logger().error(
            Event::StreamAborted,
            &[
                ("calls_applied", applied.as_str()),
                ("code", err.code_str()),
                ("message", err.message()),
            ],
        );
    }

    save_state(config, &store, &registry)?;
    streamed?;

    Ok(ApplyReport {
        malformed,
        metrics: registry.metrics(),
    })
}

fn apply_lines<R: BufRead, W: Write>(
    registry: &Registry,
    input: R,
    output: &mut W,
    malformed: &mut u64,
) -> CliResult<()> {
    for line in read_lines(input) {
        let parsed = match line? {
            InputLine::Text(text) => serde_json::from_str::<Transaction>(&text)
                .map_err(|e| format!("Malformed transaction: {}", e)),
            InputLine::Undecodable(msg) => Err(format!("Malformed transaction: {}", msg)),
        };
        let tx = match parsed {
            Ok(tx) => tx,
            Err(message) => {
                *malformed += 1;
                write_line(output, &error_response("BOOK_CLI_IO_ERROR", None, &message))?;
                continue;
            }
        };

        let response = match registry.apply(&tx) {
            Ok(result) => ok_response(serde_json::to_value(result)?),
            Err(err) => error_response(err.code(), Some(err.wire_code()), &err.to_string()),
        };
        write_line(output, &response)?;
    }
    Ok(())
}

fn save_state(
    config: &RegistryConfig,
    store: &SnapshotStore,
    registry: &Registry,
) -> CliResult<()> {
    let manifest = match store.save(&registry.export_state()) {
        Ok(manifest) => manifest,
        Err(err) => {
            config.logger().error(
                Event::SaveFailed,
                &[
                    ("code", err.code()),
                    ("state_dir", config.state_dir.as_str()),
                ],
            );
            return Err(err.into());
        }
    };

    let generation = manifest.generation.to_string();
    let total = manifest.total_records.to_string();
    config.logger().info(
        Event::StateSaved,
        &[
            ("generation", generation.as_str()),
            ("state_checksum", manifest.state_checksum.as_str()),
            ("total_records", total.as_str()),
        ],
    );
    Ok(())
}

/// Summary of the whole ledger, or metadata for `record`
pub fn inspect_ledger(config: &RegistryConfig, record: Option<RecordId>) -> CliResult<Value> {
    let store = open_store(config)?;
    let registry = load_registry(config, &store)?;

    match record {
        Some(id) => Ok(serde_json::to_value(registry.get_metadata(id)?)?),
        None => Ok(serde_json::to_value(registry.summary())?),
    }
}

pub fn verify_ledger(config: &RegistryConfig) -> CliResult<Value> {
    let store = open_store(config)?;
    let manifest = store.verify()?;
    config.logger().info(
        Event::SnapshotVerified,
        &[
            ("state_checksum", manifest.state_checksum.as_str()),
            ("state_dir", config.state_dir.as_str()),
        ],
    );
    Ok(json!({
        "verified": true,
        "manifest": manifest,
    }))
}

pub fn backup_ledger(config: &RegistryConfig, output: &Path) -> CliResult<Value> {
    let store = open_store(config)?;
    let manifest = store.export_archive(output)?;
    let archive = output.display().to_string();
    config.logger().info(
        Event::ArchiveExported,
        &[
            ("archive", archive.as_str()),
            ("state_checksum", manifest.state_checksum.as_str()),
        ],
    );
    Ok(json!({
        "archive": archive,
        "manifest": manifest,
    }))
}

/// Fill an uninitialized state directory from an archive
pub fn restore_ledger(config: &RegistryConfig, input: &Path) -> CliResult<Value> {
    let store = SnapshotStore::new(config.state_path());
    if store.exists() {
        return Err(CliError::already_initialized(&config.state_dir));
    }

    let manifest = store.restore_archive(input)?;
    let archive = input.display().to_string();
    config.logger().info(
        Event::ArchiveRestored,
        &[
            ("archive", archive.as_str()),
            ("state_checksum", manifest.state_checksum.as_str()),
            ("state_dir", config.state_dir.as_str()),
        ],
    );
    Ok(json!({
        "restored": true,
        "manifest": manifest,
    }))
}

fn open_store(config: &RegistryConfig) -> CliResult<SnapshotStore> {
    let store = SnapshotStore::new(config.state_path());
    if !store.exists() {
        return Err(CliError::not_initialized(&config.state_dir));
    }
    Ok(store)
}

fn load_registry(config: &RegistryConfig, store: &SnapshotStore) -> CliResult<Registry> {
    let state = store.load()?;
    let total = state.total_records().to_string();
    config.logger().info(
        Event::StateLoaded,
        &[
            ("state_dir", config.state_dir.as_str()),
            ("total_records", total.as_str()),
        ],
    );
    Ok(Registry::from_config(config, state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::errors::CliErrorCode;
    use crate::registry::Principal;
    use std::io::{Cursor, Read};
    use tempfile::TempDir;

    fn config(temp_dir: &TempDir) -> RegistryConfig {
        let mut config = RegistryConfig::new(
            temp_dir.path().join("ledger").display().to_string(),
            Principal::from_u128(0xAD),
        );
        config.log_level = "error".into();
        config
    }

    fn responses(output: Vec<u8>) -> Vec<Value> {
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_init_twice_fails() {
        let temp_dir = TempDir::new().unwrap();
        let config = config(&temp_dir);

        let response = init_ledger(&config).unwrap();
        assert_eq!(response["initialized"], true);
        assert_eq!(response["manifest"]["total_records"], 0);

        let err = init_ledger(&config).unwrap_err();
        assert_eq!(err.code(), CliErrorCode::AlreadyInitialized);
    }

    #[test]
    fn test_commands_require_init() {
        let temp_dir = TempDir::new().unwrap();
        let config = config(&temp_dir);

        let err = inspect_ledger(&config, None).unwrap_err();
        assert_eq!(err.code(), CliErrorCode::NotInitialized);
        let err = verify_ledger(&config).unwrap_err();
        assert_eq!(err.code(), CliErrorCode::NotInitialized);
    }

    #[test]
    fn test_apply_stream_persists_and_answers_each_line() {
        let temp_dir = TempDir::new().unwrap();
        let config = config(&temp_dir);
        init_ledger(&config).unwrap();

        let owner = Principal::from_u128(1);
        let input = format!(
            "{}\nnot json\n{}\n",
            json!({"caller": owner, "height": 10, "call": {"op": "upload", "title": "Dune", "size": 500000, "summary": "Desert planet", "categories": ["scifi"]}}),
            json!({"caller": owner, "height": 11, "call": {"op": "get_owner", "record_id": 2}}),
        );

        let mut output = Vec::new();
        let report = apply_stream(&config, Cursor::new(input), &mut output).unwrap();
        assert_eq!(report.malformed, 1);
        assert_eq!(report.metrics.calls_applied, 1);
        assert_eq!(report.metrics.calls_rejected, 1);

        let lines = responses(output);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["status"], "ok");
        assert_eq!(lines[0]["output"], json!({"kind": "record_id", "value": 1}));
        assert_eq!(lines[1]["code"], "BOOK_CLI_IO_ERROR");
        assert_eq!(lines[2]["code"], "BOOK_NOT_FOUND");
        assert_eq!(lines[2]["wire_code"], 100);

        let metadata = inspect_ledger(&config, Some(1)).unwrap();
        assert_eq!(metadata["title"], "Dune");
        assert_eq!(metadata["created_at"], 10);

        let summary = inspect_ledger(&config, None).unwrap();
        assert_eq!(summary["total_records"], 1);
        assert_eq!(verify_ledger(&config).unwrap()["verified"], true);
    }

    fn upload_line(title: &str, height: u64) -> String {
        json!({
            "caller": Principal::from_u128(1),
            "height": height,
            "call": {"op": "upload", "title": title, "size": 1000, "summary": "Short read", "categories": ["misc"]}
        })
        .to_string()
    }

    #[test]
    fn test_undecodable_line_is_answered_and_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let config = config(&temp_dir);
        init_ledger(&config).unwrap();

        let mut input = format!("{}\n", upload_line("Emma", 1)).into_bytes();
        input.extend_from_slice(b"\xff\xfe{\"op\"}\n");
        input.extend_from_slice(format!("{}\n", upload_line("Persuasion", 2)).as_bytes());

        let mut output = Vec::new();
        let report = apply_stream(&config, Cursor::new(input), &mut output).unwrap();
        assert_eq!(report.malformed, 1);
        assert_eq!(report.metrics.calls_applied, 2);

        let lines = responses(output);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["status"], "ok");
        assert_eq!(lines[1]["code"], "BOOK_CLI_IO_ERROR");
        assert_eq!(lines[2]["output"], json!({"kind": "record_id", "value": 2}));

        assert_eq!(inspect_ledger(&config, None).unwrap()["total_records"], 2);
    }

    /// Serves `data`, then fails every later read
    struct FailingReader {
        data: Cursor<Vec<u8>>,
    }

    impl io::Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.data.read(buf)? {
                0 => Err(io::Error::new(io::ErrorKind::BrokenPipe, "input closed")),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn test_failed_input_still_saves_applied_calls() {
        let temp_dir = TempDir::new().unwrap();
        let config = config(&temp_dir);
        init_ledger(&config).unwrap();

        let data = format!("{}\n", upload_line("Emma", 1)).into_bytes();
        let input = io::BufReader::new(FailingReader {
            data: Cursor::new(data),
        });

        let mut output = Vec::new();
        let err = apply_stream(&config, input, &mut output).unwrap_err();
        assert_eq!(err.code(), CliErrorCode::Io);
        assert_eq!(responses(output)[0]["status"], "ok");

        let summary = inspect_ledger(&config, None).unwrap();
        assert_eq!(summary["total_records"], 1);
        assert_eq!(inspect_ledger(&config, Some(1)).unwrap()["title"], "Emma");
    }

    #[test]
    fn test_backup_and_restore_into_fresh_directory() {
        let temp_dir = TempDir::new().unwrap();
        let source = config(&temp_dir);
        init_ledger(&source).unwrap();
        let archive = temp_dir.path().join("ledger.tar");
        backup_ledger(&source, &archive).unwrap();

        let mut target = source.clone();
        target.state_dir = temp_dir.path().join("copy").display().to_string();
        let response = restore_ledger(&target, &archive).unwrap();
        assert_eq!(response["restored"], true);
        assert_eq!(verify_ledger(&target).unwrap()["verified"], true);

        let err = restore_ledger(&target, &archive).unwrap_err();
        assert_eq!(err.code(), CliErrorCode::AlreadyInitialized);
    }

    #[test]
    fn test_inspect_missing_record() {
        let temp_dir = TempDir::new().unwrap();
        let config = config(&temp_dir);
        init_ledger(&config).unwrap();

        let err = inspect_ledger(&config, Some(9)).unwrap_err();
        assert_eq!(err.code(), CliErrorCode::Registry);
        assert!(err.message().contains("BOOK_NOT_FOUND"));
    }
}
