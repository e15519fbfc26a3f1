//! File-backed credential store.

use crate::traits::CredentialStore;
use doorlock_core::{
    Error, Result,
    constants::{ERASED_CELL, STORE_SIZE},
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Credential store persisted as a flat file image.
///
/// The whole store is held in memory and rewritten to disk on every cell
/// write, mirroring EEPROM semantics: a missing or truncated file reads
/// as erased cells, and an enrolled credential survives restarts.
#[derive(Debug)]
pub struct FileEeprom {
    path: PathBuf,
    cells: Vec<u8>,
}

impl FileEeprom {
    /// Open a store image, creating an erased one if the file is missing.
    ///
    /// A file shorter than the store size is padded with erased cells, so
    /// images from older runs stay readable.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut cells = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no store image, starting erased");
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };
        cells.resize(STORE_SIZE, ERASED_CELL);
        cells.truncate(STORE_SIZE);
        Ok(Self { path, cells })
    }

    async fn flush(&self) -> Result<()> {
        tokio::fs::write(&self.path, &self.cells).await?;
        Ok(())
    }
}

impl CredentialStore for FileEeprom {
    async fn read_byte(&mut self, address: u16) -> Result<u8> {
        self.cells
            .get(address as usize)
            .copied()
            .ok_or(Error::StoreOutOfRange { address })
    }

    async fn write_byte(&mut self, address: u16, value: u8) -> Result<()> {
        let cell = self
            .cells
            .get_mut(address as usize)
            .ok_or(Error::StoreOutOfRange { address })?;
        *cell = value;
        debug!(address, "store cell written");
        self.flush().await
    }
}
