//! # Atomic swap records: the HTLC primitive
//!
//! An [`AtomicSwap`] locks value from an initiator for a recipient, behind a
//! SHA-256 commitment to a secret and an absolute expiry.
//!
//! ## State Machine
//!
//! ```text
//!   ┌───────┐ initiate ┌──────┐  redeem(secret)  ┌────────┐
//!   │ EMPTY ├─────────▶│ OPEN ├─────────────────▶│ CLOSED │
//!   └───────┘          └──┬───┘                  └────────┘
//!                         │ refund (now >= expiry)
//!                         ▼
//!                    ┌─────────┐
//!                    │ EXPIRED │
//!                    └─────────┘
//! ```
//!
//! `CLOSED` and `EXPIRED` are terminal.
//!
//! ## Identifiers
//!
//! `swap_id = SHA-256(secret_hash || timestamp)` where `timestamp` is the
//! creation time in unix seconds encoded as a 32-byte big-endian unsigned
//! integer. Any party holding the commitment and creation time can
//! recompute it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{SwapId, TraderId};

/// Preimage whose disclosure authorizes redemption.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Secret(pub [u8; 32]);

impl Secret {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The commitment published when the swap is initiated.
    #[must_use]
    pub fn hash(&self) -> SecretHash {
        secret_hash(self)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret({}..)", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl Secret {
    /// A fresh random secret.
    #[must_use]
    pub fn random() -> Self {
        Self(rand::random::<[u8; 32]>())
    }
}

/// SHA-256 commitment to a [`Secret`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecretHash(pub [u8; 32]);

impl SecretHash {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for SecretHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// `SHA-256(secret)`.
#[must_use]
pub fn secret_hash(secret: &Secret) -> SecretHash {
    let digest = Sha256::digest(secret.as_bytes());
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&digest);
    SecretHash(hash)
}

/// Derive the swap identifier from a commitment and its creation time.
///
/// The id is `SHA-256(secret_hash || uint256_be(timestamp))`. Ids are not
/// interchangeable with those of the legacy on-chain swapper, which hashes
/// the same bytes with Keccak-256; a counterparty on that contract cannot
/// look a swap up by an id produced here.
#[must_use]
pub fn swap_id(secret_hash: &SecretHash, timestamp: u64) -> SwapId {
    let mut encoded_timestamp = [0u8; 32];
    encoded_timestamp[24..].copy_from_slice(&timestamp.to_be_bytes());

    let mut hasher = Sha256::new();
    hasher.update(secret_hash.as_bytes());
    hasher.update(encoded_timestamp);
    let digest = hasher.finalize();
    let mut id = [0u8; 32];
    id.copy_from_slice(&digest);
    SwapId(id)
}

/// Lifecycle state of a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SwapStatus {
    /// Never initiated.
    #[default]
    Empty,
    /// Value is locked, awaiting redeem or refund.
    Open,
    /// Redeemed; the secret has been revealed. **Terminal.**
    Closed,
    /// Refunded to the initiator after expiry. **Terminal.**
    Expired,
}

impl SwapStatus {
    /// Can a swap in this state move to `target`?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Empty, Self::Open) | (Self::Open, Self::Closed | Self::Expired)
        )
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Expired)
    }
}

impl fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "EMPTY"),
            Self::Open => write!(f, "OPEN"),
            Self::Closed => write!(f, "CLOSED"),
            Self::Expired => write!(f, "EXPIRED"),
        }
    }
}

/// A hash-time-locked swap record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomicSwap {
    pub id: SwapId,
    pub initiator: TraderId,
    pub recipient: TraderId,
    pub secret_hash: SecretHash,
    /// Locked amount, in the escrow's native unit.
    pub value: u128,
    /// The swap becomes refundable at this instant.
    pub expiry: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub status: SwapStatus,
    /// Set only by a successful redemption.
    pub revealed_secret: Option<Secret>,
}

impl AtomicSwap {
    /// Whether `secret` opens this swap's commitment.
    #[must_use]
    pub fn secret_matches(&self, secret: &Secret) -> bool {
        secret_hash(secret) == self.secret_hash
    }

    /// Whether the expiry has been reached at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiry
    }

    #[must_use]
    pub fn is_redeemable(&self) -> bool {
        self.status == SwapStatus::Open
    }

    #[must_use]
    pub fn is_refundable_at(&self, now: DateTime<Utc>) -> bool {
        self.status == SwapStatus::Open && self.is_expired_at(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex32(s: &str) -> [u8; 32] {
        hex::decode(s).unwrap().try_into().unwrap()
    }

    #[test]
    fn secret_hash_known_answer() {
        let secret = Secret([0x42; 32]);
        assert_eq!(
            secret.hash(),
            SecretHash(hex32(
                "425ed4e4a36b30ea21b90e21c712c649e8214c29b7eaf68089d1039c6e55384c"
            ))
        );
    }

    #[test]
    fn swap_id_known_answer() {
        let secret_hash = Secret([0x42; 32]).hash();
        assert_eq!(
            swap_id(&secret_hash, 1_538_810_051),
            SwapId(hex32(
                "002b49746f04c5a2eeff3f019a0dcd6441b9ed2a954106fac5173e90b1a30b94"
            ))
        );
    }

    #[test]
    fn swap_id_known_answer_external_commitment() {
        let secret_hash = SecretHash(hex32(
            "eea647e0899064b976fdf00b4edba2a0069596cb49d011362dafca77ac2e8a13",
        ));
        assert_eq!(
            swap_id(&secret_hash, 1_538_810_051),
            SwapId(hex32(
                "f3c047b63047a2ca423fbd3edad641ba7bfd0514a26ab8e471d325a9ec2f5497"
            ))
        );
    }

    #[test]
    fn swap_id_differs_from_keccak_swapper() {
        let secret_hash = SecretHash(hex32(
            "eea647e0899064b976fdf00b4edba2a0069596cb49d011362dafca77ac2e8a13",
        ));
        let keccak_id = SwapId(hex32(
            "cfaab9c63df63aacd51548b8ad8af193c3f831351fded5689494426f7d998fc6",
        ));
        assert_ne!(swap_id(&secret_hash, 1_538_810_051), keccak_id);
    }

    #[test]
    fn swap_id_binds_timestamp() {
        let secret_hash = Secret::random().hash();
        assert_eq!(swap_id(&secret_hash, 100), swap_id(&secret_hash, 100));
        assert_ne!(swap_id(&secret_hash, 100), swap_id(&secret_hash, 101));
    }

    #[test]
    fn status_transitions_valid() {
        assert!(SwapStatus::Empty.can_transition_to(SwapStatus::Open));
        assert!(SwapStatus::Open.can_transition_to(SwapStatus::Closed));
        assert!(SwapStatus::Open.can_transition_to(SwapStatus::Expired));
    }

    #[test]
    fn status_transitions_invalid() {
        assert!(!SwapStatus::Empty.can_transition_to(SwapStatus::Closed));
        assert!(!SwapStatus::Empty.can_transition_to(SwapStatus::Expired));
        for terminal in [SwapStatus::Closed, SwapStatus::Expired] {
            assert!(terminal.is_terminal());
            for target in [
                SwapStatus::Empty,
                SwapStatus::Open,
                SwapStatus::Closed,
                SwapStatus::Expired,
            ] {
                assert!(!terminal.can_transition_to(target));
            }
        }
    }

    #[test]
    fn secret_debug_is_truncated() {
        let secret = Secret([0xAB; 32]);
        assert_eq!(format!("{secret:?}"), "Secret(abababab..)");
    }

    #[test]
    fn refundable_only_when_open_and_expired() {
        let now = Utc::now();
        let secret = Secret::random();
        let mut swap = AtomicSwap {
            id: swap_id(&secret.hash(), 0),
            initiator: TraderId::new(),
            recipient: TraderId::new(),
            secret_hash: secret.hash(),
            value: 100_000,
            expiry: now,
            created_at: now,
            status: SwapStatus::Open,
            revealed_secret: None,
        };
        assert!(swap.secret_matches(&secret));
        assert!(swap.is_refundable_at(now));
        assert!(!swap.is_refundable_at(now - chrono::Duration::seconds(1)));
        swap.status = SwapStatus::Closed;
        assert!(!swap.is_refundable_at(now));
    }
}
