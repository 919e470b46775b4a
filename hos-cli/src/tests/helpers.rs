//! Test helpers for temporary databases and captured command output.

use super::*;
use camino::Utf8PathBuf;
use serde::de::DeserializeOwned;
use tempfile::TempDir;

/// A temporary directory holding the SQLite database under test.
pub(super) struct Workspace {
    _dir: TempDir,
    database: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self {
            database: root.join("state/hos.db"),
            _dir: dir,
        }
    }

    pub(super) fn database(&self) -> &Utf8PathBuf {
        &self.database
    }
}

/// Parse a full command line, program name included.
pub(super) fn parse(argv: &[&str]) -> Result<Command, CliError> {
    Cli::try_parse_from(argv)
        .map(|cli| cli.command)
        .map_err(CliError::from)
}

/// Decode what a command wrote to its output buffer.
pub(super) fn decode<T: DeserializeOwned>(output: &[u8]) -> T {
    let text = std::str::from_utf8(output).expect("output utf-8");
    serde_json::from_str(text).expect("output should be JSON")
}
