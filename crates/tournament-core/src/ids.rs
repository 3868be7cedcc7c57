//! Chain-agnostic identifiers
//!
//! The host blockchain's account and asset identifiers are opaque 32-byte
//! values to this crate (a Solana `Pubkey` is exactly that shape). `Ord` is
//! derived so registered-player sets iterate in a canonical, consensus-safe
//! order — the same order the bracket shuffle consumes.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct AccountId(pub [u8; 32]);

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct AssetId(pub [u8; 32]);

impl AccountId {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AssetId {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<[u8; 32]> for AccountId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<[u8; 32]> for AssetId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in &self.0[..4] {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, "…")
    }
}
