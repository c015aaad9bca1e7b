//! Writing generated source to its destination

use std::fmt;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::{self, AsyncWriteExt};

use crate::error::{GenerationError, Result};

/// Where generated source goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDestination {
    Stdout,
    File(PathBuf),
}

impl OutputDestination {
    /// A file when a path is given, stdout otherwise
    pub fn from_path(path: Option<&Path>) -> Self {
        match path {
            Some(path) => OutputDestination::File(path.to_path_buf()),
            None => OutputDestination::Stdout,
        }
    }
}

impl fmt::Display for OutputDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputDestination::Stdout => write!(f, "stdout"),
            OutputDestination::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Write `text` to `destination`, creating missing parent directories
pub async fn write_output(text: &str, destination: &OutputDestination) -> Result<()> {
    match destination {
        OutputDestination::Stdout => {
            let mut stdout = io::stdout();
            stdout.write_all(text.as_bytes()).await?;
            stdout.flush().await?;
        }
        OutputDestination::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).await.map_err(|e| {
                    GenerationError::OutputError(format!(
                        "Failed to create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }

            let mut file = fs::File::create(path).await.map_err(|e| {
                GenerationError::OutputError(format!(
                    "Failed to create file {}: {}",
                    path.display(),
                    e
                ))
            })?;

            file.write_all(text.as_bytes()).await.map_err(|e| {
                GenerationError::OutputError(format!(
                    "Failed to write file {}: {}",
                    path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                GenerationError::OutputError(format!(
                    "Failed to flush file {}: {}",
                    path.display(),
                    e
                ))
            })?;
        }
    }

    tracing::debug!(destination = %destination, bytes = text.len(), "Wrote generated source");
    Ok(())
}
