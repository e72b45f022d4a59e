//! Stored Settings Records
//!
//! Byte layout of the per-mode settings kept in non-volatile storage. The
//! engine never touches storage itself; it only defines the record shape and
//! how stale or damaged records are detected.
//!
//! ```text
//! ┌─────────────┬──────────────────────────────┬──────────────┐
//! │ version u16 │ bincode(GameSettings)        │ sha256[..4]  │
//! │ (LE)        │ fixed-int, fixed size        │ of the rest  │
//! └─────────────┴──────────────────────────────┴──────────────┘
//! ```

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::warn;

use crate::game::config::{GameMode, GameSettings};

/// Current record layout version. Bump on any change to `GameSettings`.
pub const SETTINGS_VERSION: u16 = 1;

/// Domain separator for the record checksum.
const CHECKSUM_DOMAIN: &[u8] = b"CAPTURE_POINT_SETTINGS_V1";

const VERSION_LEN: usize = 2;
const CHECKSUM_LEN: usize = 4;

/// Reasons a stored record is not used.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Written by a different firmware layout
    #[error("settings version {found}, expected {expected}")]
    Version {
        /// Version tag found in the record
        found: u16,
        /// Version this build understands
        expected: u16,
    },

    /// Truncated or padded record
    #[error("settings record is {found} bytes, expected {expected}")]
    Length {
        /// Bytes supplied
        found: usize,
        /// Bytes a record occupies
        expected: usize,
    },

    /// Bit rot or a torn write
    #[error("settings checksum mismatch")]
    Checksum,

    /// Payload could not be encoded/decoded
    #[error("settings codec error: {0}")]
    Codec(#[from] bincode::Error),

    /// Record stored in another mode's slot
    #[error("slot for {slot:?} holds settings for {found:?}")]
    Slot {
        /// Mode the slot belongs to
        slot: GameMode,
        /// Mode found in the record
        found: GameMode,
    },
}

/// Size of the encoded settings payload.
pub fn payload_len() -> usize {
    // Fixed-int encoding of a struct without collections: same size for every value.
    bincode::serialized_size(&GameSettings::default()).map_or(0, |n| n as usize)
}

/// Size of one full record.
pub fn record_len() -> usize {
    VERSION_LEN + payload_len() + CHECKSUM_LEN
}

fn checksum(body: &[u8]) -> [u8; CHECKSUM_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(CHECKSUM_DOMAIN);
    hasher.update(body);
    let digest = hasher.finalize();

    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest[..CHECKSUM_LEN]);
    out
}

/// Encode one settings record.
pub fn encode_record(settings: &GameSettings) -> Result<Vec<u8>, StoreError> {
    let mut bytes = Vec::with_capacity(record_len());
    bytes.extend_from_slice(&SETTINGS_VERSION.to_le_bytes());
    bytes.extend_from_slice(&bincode::serialize(settings)?);
    let sum = checksum(&bytes);
    bytes.extend_from_slice(&sum);
    Ok(bytes)
}

/// Decode and verify one settings record.
pub fn decode_record(bytes: &[u8]) -> Result<GameSettings, StoreError> {
    if bytes.len() < VERSION_LEN {
        return Err(StoreError::Length {
            found: bytes.len(),
            expected: record_len(),
        });
    }

    // Version first, so an old layout reports as stale rather than as corrupt.
    let found = u16::from_le_bytes([bytes[0], bytes[1]]);
    if found != SETTINGS_VERSION {
        return Err(StoreError::Version {
            found,
            expected: SETTINGS_VERSION,
        });
    }

    if bytes.len() != record_len() {
        return Err(StoreError::Length {
            found: bytes.len(),
            expected: record_len(),
        });
    }

    let (body, sum) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
    if checksum(body) != sum {
        return Err(StoreError::Checksum);
    }

    Ok(bincode::deserialize(&body[VERSION_LEN..])?)
}

/// Decode the record for `mode`'s slot, checking it belongs there.
pub fn decode_slot(bytes: &[u8], mode: GameMode) -> Result<GameSettings, StoreError> {
    let settings = decode_record(bytes)?;
    if settings.mode != mode {
        return Err(StoreError::Slot {
            slot: mode,
            found: settings.mode,
        });
    }
    Ok(settings)
}

/// Load `mode`'s slot, falling back to factory defaults if it is unusable.
pub fn load_slot(bytes: &[u8], mode: GameMode) -> GameSettings {
    match decode_slot(bytes, mode) {
        Ok(settings) => settings,
        Err(err) => {
            warn!("Ignoring stored {:?} settings: {}", mode, err);
            GameSettings::for_mode(mode)
        }
    }
}

// =============================================================================
// SETTINGS BANK
// =============================================================================

/// One settings slot per game mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettingsBank {
    slots: [GameSettings; GameMode::COUNT],
}

impl Default for SettingsBank {
    fn default() -> Self {
        Self {
            slots: GameMode::ALL.map(GameSettings::for_mode),
        }
    }
}

impl SettingsBank {
    /// Bank of factory defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings for a mode.
    pub fn get(&self, mode: GameMode) -> &GameSettings {
        &self.slots[mode.slot()]
    }

    /// Store settings in their mode's slot.
    pub fn set(&mut self, settings: GameSettings) {
        self.slots[settings.mode.slot()] = settings;
    }

    /// Encode every slot, in slot order.
    pub fn to_bytes(&self) -> Result<Vec<u8>, StoreError> {
        let mut bytes = Vec::with_capacity(record_len() * GameMode::COUNT);
        for settings in &self.slots {
            bytes.extend_from_slice(&encode_record(settings)?);
        }
        Ok(bytes)
    }

    /// Decode a bank image. Missing or unusable slots get factory defaults.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let len = record_len();
        let mut bank = Self::default();
        for mode in GameMode::ALL {
            let offset = mode.slot() * len;
            let record = bytes.get(offset..offset + len).unwrap_or(&[]);
            bank.slots[mode.slot()] = load_slot(record, mode);
        }
        bank
    }
}
