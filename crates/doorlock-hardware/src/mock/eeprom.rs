//! In-memory credential store.

use crate::traits::CredentialStore;
use doorlock_core::{
    Error, Result,
    constants::{ERASED_CELL, STORE_SIZE},
};

/// Volatile store with EEPROM semantics.
///
/// All cells start erased (0xFF). Contents are lost when the value is
/// dropped; use [`FileEeprom`](crate::FileEeprom) for persistence.
#[derive(Debug, Clone)]
pub struct MemoryEeprom {
    cells: Vec<u8>,
}

impl MemoryEeprom {
    /// Create a store with every cell erased.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cells: vec![ERASED_CELL; STORE_SIZE],
        }
    }
}

impl Default for MemoryEeprom {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for MemoryEeprom {
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
        Ok(())
    }
}
