//! Append-only record of every chat turn.
//!
//! The CSV file has a fixed three-column header and one row per turn. Readers
//! skip malformed rows instead of failing, so a damaged line never hides the
//! rest of the history.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

use ib_protocol::transcript::TranscriptEntry;

/// Column names written as the first row of a new transcript file.
pub const HEADER: [&str; 3] = ["User Input", "Chatbot Response", "Timestamp"];

/// Errors reading or writing the transcript.
#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("CSV error: {0}")]
    Csv(String),
}

impl From<std::io::Error> for TranscriptError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<csv::Error> for TranscriptError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e.to_string())
    }
}

/// Convenience alias for transcript results.
pub type TranscriptResult<T> = Result<T, TranscriptError>;

/// Where conversation turns are recorded.
#[async_trait]
pub trait TranscriptSink: Send + Sync {
    /// Append one turn.
    async fn append(&self, entry: &TranscriptEntry) -> TranscriptResult<()>;

    /// All well-formed turns, newest first.
    async fn read_newest_first(&self) -> TranscriptResult<Vec<TranscriptEntry>>;
}

/// CSV file transcript.
pub struct CsvTranscript {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvTranscript {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TranscriptSink for CsvTranscript {
    async fn append(&self, entry: &TranscriptEntry) -> TranscriptResult<()> {
        let _guard = self.write_lock.lock().await;
        let path = self.path.clone();
        let entry = entry.clone();
        tokio::task::spawn_blocking(move || append_row(&path, &entry))
            .await
            .map_err(|e| TranscriptError::Io(format!("transcript task failed: {e}")))?
    }

    async fn read_newest_first(&self) -> TranscriptResult<Vec<TranscriptEntry>> {
        let path = self.path.clone();
        let mut entries = tokio::task::spawn_blocking(move || read_rows(&path))
            .await
            .map_err(|e| TranscriptError::Io(format!("transcript task failed: {e}")))??;
        entries.reverse();
        Ok(entries)
    }
}

fn append_row(path: &Path, entry: &TranscriptEntry) -> TranscriptResult<()> {
    let needs_header = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    if needs_header {
        writer.write_record(HEADER)?;
    }
    writer.write_record([&entry.user_input, &entry.response, &entry.timestamp])?;
    writer.flush()?;
    Ok(())
}

fn read_rows(path: &Path) -> TranscriptResult<Vec<TranscriptEntry>> {
    let file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut entries = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(e.into()),
            Err(e) => {
                tracing::warn!(row = index + 1, error = %e, "skipping unreadable transcript row");
                continue;
            }
        };

        if index == 0 && record.iter().eq(HEADER) {
            continue;
        }
        if record.len() != HEADER.len() {
            tracing::warn!(
                row = index + 1,
                columns = record.len(),
                "skipping malformed transcript row"
            );
            continue;
        }
        entries.push(TranscriptEntry::new(&record[0], &record[1], &record[2]));
    }
    Ok(entries)
}

/// In-memory transcript for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryTranscript {
    entries: Mutex<Vec<TranscriptEntry>>,
}

impl MemoryTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl TranscriptSink for MemoryTranscript {
    async fn append(&self, entry: &TranscriptEntry) -> TranscriptResult<()> {
        self.entries.lock().await.push(entry.clone());
        Ok(())
    }

    async fn read_newest_first(&self) -> TranscriptResult<Vec<TranscriptEntry>> {
        Ok(self.entries.lock().await.iter().rev().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(i: usize) -> TranscriptEntry {
        TranscriptEntry::new(
            format!("input {i}"),
            format!("response {i}"),
            format!("2024-01-15 12:00:{i:02}"),
        )
    }

    #[tokio::test]
    async fn round_trip_newest_first() {
        let dir = TempDir::new().unwrap();
        let sink = CsvTranscript::new(dir.path().join("chat_log.csv"));
        for i in 0..5 {
            sink.append(&entry(i)).await.unwrap();
        }

        let rows = sink.read_newest_first().await.unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0], entry(4));
        assert_eq!(rows[4], entry(0));
    }

    #[tokio::test]
    async fn header_written_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chat_log.csv");
        let sink = CsvTranscript::new(&path);
        sink.append(&entry(1)).await.unwrap();
        sink.append(&entry(2)).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("User Input,Chatbot Response,Timestamp"));
        assert_eq!(contents.matches("User Input").count(), 1);
        assert_eq!(contents.lines().count(), 3);
    }

    #[tokio::test]
    async fn commas_and_quotes_survive() {
        let dir = TempDir::new().unwrap();
        let sink = CsvTranscript::new(dir.path().join("chat_log.csv"));
        let tricky = TranscriptEntry::new(
            "hello, \"bot\"",
            "Hi!\nHow can I help?",
            "2024-01-15 12:00:00",
        );
        sink.append(&tricky).await.unwrap();
        assert_eq!(sink.read_newest_first().await.unwrap(), vec![tricky]);
    }

    #[tokio::test]
    async fn malformed_rows_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chat_log.csv");
        std::fs::write(
            &path,
            "User Input,Chatbot Response,Timestamp\n\
             hi,Hello!,2024-01-15 12:00:00\n\
             only two,columns\n\
             bye,Goodbye!,2024-01-15 12:00:05,extra\n\
             thanks,You're welcome!,2024-01-15 12:00:09\n",
        )
        .unwrap();

        let rows = CsvTranscript::new(&path).read_newest_first().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].user_input, "thanks");
        assert_eq!(rows[1].user_input, "hi");
    }

    #[tokio::test]
    async fn missing_file_is_empty_history() {
        let dir = TempDir::new().unwrap();
        let sink = CsvTranscript::new(dir.path().join("nope.csv"));
        assert!(sink.read_newest_first().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn file_without_header_keeps_first_row() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chat_log.csv");
        std::fs::write(&path, "hi,Hello!,2024-01-15 12:00:00\n").unwrap();
        let rows = CsvTranscript::new(&path).read_newest_first().await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn unwritable_path_is_an_error() {
        let dir = TempDir::new().unwrap();
        // A directory cannot be opened for appending.
        let sink = CsvTranscript::new(dir.path());
        assert!(matches!(sink.append(&entry(0)).await, Err(TranscriptError::Io(_))));
    }

    #[tokio::test]
    async fn memory_transcript_newest_first() {
        let sink = MemoryTranscript::new();
        sink.append(&entry(0)).await.unwrap();
        sink.append(&entry(1)).await.unwrap();
        assert_eq!(sink.len().await, 2);
        let rows = sink.read_newest_first().await.unwrap();
        assert_eq!(rows[0], entry(1));
    }
}
