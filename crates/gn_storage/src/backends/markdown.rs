use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use gn_core::{DailyStore, Result};
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use super::file_name;

/// Stores one UTF-8 Markdown file per day under a directory.
#[derive(Debug, Clone)]
pub struct MarkdownStore {
    dir: PathBuf,
}

impl MarkdownStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

/// Fills a file that was just created at `path`. A failed write removes the
/// file again so the date stays free for the next run.
async fn fill_or_remove<W>(path: &Path, mut file: W, contents: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let filled = async {
        file.write_all(contents.as_bytes()).await?;
        file.flush().await
    }
    .await;

    if let Err(e) = filled {
        drop(file);
        if let Err(cleanup) = fs::remove_file(path).await {
            warn!("Could not remove partial {}: {}", path.display(), cleanup);
        }
        return Err(e);
    }
    Ok(())
}

#[async_trait]
impl DailyStore for MarkdownStore {
    fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(file_name(date))
    }

    async fn exists(&self, date: NaiveDate) -> Result<bool> {
        Ok(fs::try_exists(self.path_for(date)).await?)
    }

    async fn write_if_absent(&self, date: NaiveDate, contents: &str) -> Result<bool> {
        let path = self.path_for(date);
        fs::create_dir_all(&self.dir).await?;

        // create_new makes the existence check and the creation one step.
        let file = match OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!("{} already exists, not overwriting", path.display());
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };
        fill_or_remove(&path, file, contents).await?;
        Ok(true)
    }
}
