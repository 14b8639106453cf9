use async_trait::async_trait;
use burrow_core::error::{Result, StorageError};
use burrow_core::{CallContext, ReadStorage, ShortenerRecord, UrlStorage};
use serde::{Deserialize, Serialize};
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;

/// One line of the storage file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub uuid: u64,
    pub short_url: String,
    pub original_url: String,
}

impl FileRecord {
    /// Encodes the record as a newline-terminated JSON line.
    pub fn to_line(&self) -> Result<Vec<u8>> {
        let mut line = serde_json::to_vec(self)
            .map_err(|e| StorageError::InvalidData(format!("failed to encode record: {e}")))?;
        line.push(b'\n');
        Ok(line)
    }

    /// Decodes one line, without its terminator.
    pub fn from_line(line: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

impl From<FileRecord> for ShortenerRecord {
    fn from(value: FileRecord) -> Self {
        ShortenerRecord {
            id: value.uuid,
            user_id: String::new(),
            short_url: value.short_url,
            original_url: value.original_url,
        }
    }
}

struct FileState {
    file: File,
    last_id: u64,
}

/// Append-only JSON-lines storage.
///
/// The file is opened once and held until the storage is dropped. All
/// operations go through one lock, so id assignment (highest stored id plus
/// one) cannot race. Writing a short URL again appends a new line; reads
/// return the last line written for a key.
///
/// Original URLs are not deduplicated and records carry no owner, so the
/// user-scoped operations are no-ops.
pub struct FileStorage {
    path: PathBuf,
    state: Mutex<FileState>,
}

impl std::fmt::Debug for FileStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStorage")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl FileStorage {
    /// Opens (creating if needed) the storage file at `path`.
    ///
    /// The whole file is validated on open; a malformed line fails the call.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| StorageError::Io(format!("failed to open {}: {e}", path.display())))?;

        let mut last_id = 0;
        scan(&mut file, &path, |record| last_id = last_id.max(record.uuid)).await?;

        Ok(Self {
            path,
            state: Mutex::new(FileState { file, last_id }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn append(&self, state: &mut FileState, record: &ShortenerRecord) -> Result<()> {
        let line = FileRecord {
            uuid: state.last_id + 1,
            short_url: record.short_url.clone(),
            original_url: record.original_url.clone(),
        };
        let bytes = line.to_line()?;

        state.file.write_all(&bytes).await?;
        state.file.flush().await?;
        state.last_id = line.uuid;
        Ok(())
    }
}

/// Reads every line from the start of `file`, handing each record to `visit`.
async fn scan<F>(file: &mut File, path: &Path, mut visit: F) -> Result<()>
where
    F: FnMut(FileRecord),
{
    file.seek(SeekFrom::Start(0)).await?;
    let mut lines = BufReader::new(file).lines();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let record = FileRecord::from_line(&line).map_err(|e| {
            StorageError::InvalidData(format!("{}:{line_no}: {e}", path.display()))
        })?;
        visit(record);
    }

    Ok(())
}

#[async_trait]
impl ReadStorage for FileStorage {
    async fn read_url(
        &self,
        ctx: &CallContext,
        short_url: &str,
    ) -> Result<Option<ShortenerRecord>> {
        ctx.run(async {
            let mut state = self.state.lock().await;
            let mut found = None;
            scan(&mut state.file, &self.path, |record| {
                if record.short_url == short_url {
                    found = Some(record);
                }
            })
            .await?;
            Ok(found.map(ShortenerRecord::from))
        })
        .await
    }

    async fn check_duplicate_url(
        &self,
        _ctx: &CallContext,
        _original_url: &str,
    ) -> Result<Option<String>> {
        Ok(None)
    }

    async fn get_user_urls(
        &self,
        _ctx: &CallContext,
        _user_id: &str,
    ) -> Result<Vec<ShortenerRecord>> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl UrlStorage for FileStorage {
    async fn write_url(&self, ctx: &CallContext, record: &ShortenerRecord) -> Result<()> {
        ctx.run(async {
            let mut state = self.state.lock().await;
            self.append(&mut state, record).await
        })
        .await
    }

    async fn write_batch(&self, ctx: &CallContext, records: &[ShortenerRecord]) -> Result<()> {
        ctx.run(async {
            let mut state = self.state.lock().await;
            for record in records {
                self.append(&mut state, record).await?;
            }
            Ok(())
        })
        .await
    }

    async fn delete_user_urls(
        &self,
        _ctx: &CallContext,
        _records: &[ShortenerRecord],
    ) -> Result<()> {
        Ok(())
    }
}
