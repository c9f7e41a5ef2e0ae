//! JSON Lines file implementation of `LedgerStore`.
//!
//! One block per line, appended with `write_all` + `flush` + `sync_data`.
//! If any step of an append fails, the file is truncated back to its
//! previous length so a partially written line never becomes visible.
//!
//! A block is committed once its terminating `\n` is on disk. A trailing
//! line without one is a write torn by a crash: loads skip it and the next
//! append truncates it away.

use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tracing::{debug, warn};

use evidence_contracts::{EvidenceEntry, LedgerError, LedgerResult, LedgerStore};

/// Append-only JSONL block store.
#[derive(Debug, Clone)]
pub struct JsonlLedgerStore {
    path: PathBuf,
}

impl JsonlLedgerStore {
    /// Use the file at `path`. Nothing is created until the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Length of the committed prefix: everything up to and including the
    /// last `\n`.
    async fn committed_len(file: &mut fs::File) -> std::io::Result<u64> {
        let len = file.metadata().await?.len();
        if len == 0 {
            return Ok(0);
        }

        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1)).await?;
        file.read_exact(&mut last).await?;
        if last[0] == b'\n' {
            return Ok(len);
        }

        let mut bytes = Vec::new();
        file.seek(SeekFrom::Start(0)).await?;
        file.read_to_end(&mut bytes).await?;
        Ok(bytes
            .iter()
            .rposition(|b| *b == b'\n')
            .map_or(0, |newline| newline as u64 + 1))
    }

    async fn write_line(&self, file: &mut fs::File, line: &[u8]) -> std::io::Result<()> {
        file.write_all(line).await?;
        file.flush().await?;
        file.sync_data().await
    }
}

impl LedgerStore for JsonlLedgerStore {
    async fn load_all_blocks(&self) -> LedgerResult<Vec<EvidenceEntry>> {
        let text = match fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(LedgerError::persistence(format!(
                    "failed to read ledger file '{}': {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let committed = match text.rfind('\n') {
            Some(newline) => &text[..=newline],
            None => "",
        };
        let torn = &text[committed.len()..];
        if !torn.trim().is_empty() {
            warn!(
                path = %self.path.display(),
                bytes = torn.len(),
                "ignoring unterminated trailing line"
            );
        }

        let mut blocks = Vec::new();
        for (index, line) in committed.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let block: EvidenceEntry = serde_json::from_str(line).map_err(|e| {
                LedgerError::persistence(format!(
                    "failed to parse line {} of '{}': {}",
                    index + 1,
                    self.path.display(),
                    e
                ))
            })?;
            blocks.push(block);
        }

        debug!(path = %self.path.display(), blocks = blocks.len(), "loaded ledger file");
        Ok(blocks)
    }

    async fn append_block(&self, block: &EvidenceEntry) -> LedgerResult<()> {
        let mut line = serde_json::to_vec(block).map_err(|e| LedgerError::Serialization {
            reason: format!("failed to encode block {}: {}", block.block_number, e),
        })?;
        line.push(b'\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                LedgerError::persistence(format!(
                    "failed to create ledger directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| {
                LedgerError::persistence(format!(
                    "failed to open ledger file '{}': {}",
                    self.path.display(),
                    e
                ))
            })?;

        let file_len = file
            .metadata()
            .await
            .map_err(|e| LedgerError::persistence(format!("failed to stat ledger file: {}", e)))?
            .len();
        let original_len = Self::committed_len(&mut file).await.map_err(|e| {
            LedgerError::persistence(format!(
                "failed to read ledger file '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        if original_len < file_len {
            warn!(
                path = %self.path.display(),
                bytes = file_len - original_len,
                "truncating unterminated trailing line"
            );
            file.set_len(original_len).await.map_err(|e| {
                LedgerError::persistence(format!(
                    "failed to truncate torn write in '{}': {}",
                    self.path.display(),
                    e
                ))
            })?;
        }

        if let Err(e) = self.write_line(&mut file, &line).await {
            if let Err(rollback) = file.set_len(original_len).await {
                warn!(
                    path = %self.path.display(),
                    error = %rollback,
                    "failed to roll back partial block write"
                );
            }
            return Err(LedgerError::persistence(format!(
                "failed to append block {} to '{}': {}",
                block.block_number,
                self.path.display(),
                e
            )));
        }

        Ok(())
    }

    async fn clear_all(&self) -> LedgerResult<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LedgerError::persistence(format!(
                "failed to clear ledger file '{}': {}",
                self.path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use evidence_contracts::{EventType, NewEvidence};

    use super::*;
    use crate::EvidenceLedger;

    fn drill(description: &str) -> NewEvidence {
        NewEvidence::new(
            EventType::Inspection,
            "ism",
            "ISM Code",
            "chief.officer@mv-aurora",
            description,
        )
    }

    #[tokio::test]
    async fn missing_file_loads_empty_and_clears_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlLedgerStore::new(dir.path().join("absent.jsonl"));

        assert!(store.load_all_blocks().await.unwrap().is_empty());
        store.clear_all().await.unwrap();
    }

    #[tokio::test]
    async fn blocks_survive_reopening_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ledger.jsonl");

        let first = EvidenceLedger::new(JsonlLedgerStore::new(&path));
        first.record_evidence(drill("Lifeboat drill")).await.unwrap();
        first.record_evidence(drill("Fire drill")).await.unwrap();

        let second = EvidenceLedger::new(JsonlLedgerStore::new(&path));
        let entry = second.record_evidence(drill("Abandon ship drill")).await.unwrap();
        assert_eq!(entry.block_number, 3);

        let blocks = second.store().load_all_blocks().await.unwrap();
        assert_eq!(blocks.len(), 4);
        assert!(second.verify_ledger_integrity().await.unwrap().is_valid);
    }

    #[tokio::test]
    async fn edited_line_on_disk_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.jsonl");

        let ledger = EvidenceLedger::new(JsonlLedgerStore::new(&path));
        ledger.record_evidence(drill("Lifeboat drill")).await.unwrap();
        ledger.record_evidence(drill("Fire drill")).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let edited = text.replace(
            "\"description\":\"Lifeboat drill\"",
            "\"description\":\"Lifeboat drill (satisfactory)\"",
        );
        assert_ne!(text, edited, "fixture must contain the compact description field");
        std::fs::write(&path, edited).unwrap();

        let report = ledger.verify_ledger_integrity().await.unwrap();
        assert!(!report.is_valid);
        assert_eq!(report.corrupted_blocks, vec![1]);
    }

    #[tokio::test]
    async fn garbage_line_is_a_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.jsonl");
        std::fs::write(&path, "{\"not\": \"a block\"}\n").unwrap();

        let err = JsonlLedgerStore::new(&path).load_all_blocks().await.unwrap_err();
        match err {
            LedgerError::Persistence { reason } => assert!(reason.contains("line 1"), "{reason}"),
            other => panic!("expected Persistence, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn torn_trailing_line_is_skipped_then_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.jsonl");

        let ledger = EvidenceLedger::new(JsonlLedgerStore::new(&path));
        ledger.record_evidence(drill("Lifeboat drill")).await.unwrap();
        ledger.record_evidence(drill("Fire drill")).await.unwrap();

        // A crash mid-append leaves half a record with no newline.
        let mut text = std::fs::read_to_string(&path).unwrap();
        text.push_str("{\"id\":\"abc\",\"blockNum");
        std::fs::write(&path, text).unwrap();

        let reopened = EvidenceLedger::new(JsonlLedgerStore::new(&path));
        let report = reopened.verify_ledger_integrity().await.unwrap();
        assert!(report.is_valid, "{}", report.message);
        assert_eq!(report.blocks_checked, 3);

        let entry = reopened.record_evidence(drill("Abandon ship drill")).await.unwrap();
        assert_eq!(entry.block_number, 3);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains("\"abc\""), "torn record must be truncated");
        assert!(text.ends_with('\n'));
        assert_eq!(text.lines().count(), 4);
        assert!(reopened.verify_ledger_integrity().await.unwrap().is_valid);
    }

    #[tokio::test]
    async fn float_payload_verifies_after_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.jsonl");

        let ledger = EvidenceLedger::new(JsonlLedgerStore::new(&path));
        ledger
            .record_evidence(
                drill("Tank sounding")
                    .with_data(serde_json::json!({ "reading": 1.3718976195639483e-7 })),
            )
            .await
            .unwrap();

        let reopened = EvidenceLedger::new(JsonlLedgerStore::new(&path));
        let report = reopened.verify_ledger_integrity().await.unwrap();
        assert!(report.is_valid, "{}", report.message);

        let entry = reopened.get_evidence_entry(1).await.unwrap().unwrap();
        assert_eq!(
            entry.data.get("reading"),
            Some(&evidence_contracts::EvidenceValue::Float(1.3718976195639483e-7))
        );
    }

    #[tokio::test]
    async fn reset_removes_previous_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.jsonl");

        let ledger = EvidenceLedger::new(JsonlLedgerStore::new(&path));
        ledger.record_evidence(drill("Lifeboat drill")).await.unwrap();
        ledger.initialize(true).await.unwrap();

        let blocks = ledger.store().load_all_blocks().await.unwrap();
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].is_genesis());
    }
}
