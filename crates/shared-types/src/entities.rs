//! # Ledger Entities
//!
//! Defines the ledger entities exchanged with a node: transactions as read
//! back from the chain, their signed form before announcement, and the
//! receipts used to resolve aliases.
//!
//! ## Clusters
//!
//! - **Identity**: `Hash`, `Address`, `NamespaceId`, `MosaicId`
//! - **References**: `UnresolvedAddress`, `UnresolvedMosaicId`, `UnresolvedMosaic`
//! - **Transactions**: `Transaction`, `TransactionBody`, `ResolvedTransaction`,
//!   `SignedTransaction`, `TransactionStatus`
//! - **Receipts**: `Statement`, `ResolutionStatement`, `ResolutionEntry`

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};

use crate::errors::HashParseError;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// A 32-byte transaction hash.
pub type Hash = [u8; 32];

/// A 64-byte Ed25519 signature.
pub type Signature = [u8; 64];

/// A 32-byte Ed25519 public key.
pub type PublicKey = [u8; 32];

/// A 24-byte raw ledger address (network byte + key digest + checksum).
pub type Address = [u8; 24];

/// Identifier of a namespace. A namespace can be linked to an address or a
/// mosaic, which makes it usable as an alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NamespaceId(pub u64);

/// Identifier of a mosaic (token).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MosaicId(pub u64);

/// Render a hash as upper-case hex, the form used by node APIs.
#[must_use]
pub fn to_hex(hash: &Hash) -> String {
    hex::encode_upper(hash)
}

/// Parse a hex transaction identifier into a [`Hash`].
pub fn parse_hash(value: &str) -> Result<Hash, HashParseError> {
    let bytes = hex::decode(value.trim()).map_err(|e| HashParseError::InvalidHex(e.to_string()))?;
    let got = bytes.len();
    bytes
        .try_into()
        .map_err(|_| HashParseError::InvalidLength { got })
}

// =============================================================================
// CLUSTER B: REFERENCES
// =============================================================================

/// An address as it appears inside a transaction: either raw, or an alias
/// that still has to be resolved through receipts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnresolvedAddress {
    /// A concrete address.
    Address(Address),
    /// A namespace linked to an address.
    Alias(NamespaceId),
}

impl UnresolvedAddress {
    /// The namespace, if this reference is an alias.
    #[must_use]
    pub fn alias(&self) -> Option<NamespaceId> {
        match self {
            Self::Alias(namespace) => Some(*namespace),
            Self::Address(_) => None,
        }
    }
}

/// A mosaic id as it appears inside a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnresolvedMosaicId {
    /// A concrete mosaic id.
    Mosaic(MosaicId),
    /// A namespace linked to a mosaic.
    Alias(NamespaceId),
}

impl UnresolvedMosaicId {
    /// The namespace, if this reference is an alias.
    #[must_use]
    pub fn alias(&self) -> Option<NamespaceId> {
        match self {
            Self::Alias(namespace) => Some(*namespace),
            Self::Mosaic(_) => None,
        }
    }
}

/// An amount of a (possibly aliased) mosaic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnresolvedMosaic {
    /// The mosaic reference.
    pub id: UnresolvedMosaicId,
    /// Amount in atomic units.
    pub amount: u64,
}

// =============================================================================
// CLUSTER C: TRANSACTIONS
// =============================================================================

/// Flavour of an aggregate transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregateKind {
    /// All cosignatures are attached before announcement.
    Complete,
    /// Cosignatures are collected on-chain; requires a confirmed hash lock.
    Bonded,
}

/// Transaction type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Transfer of mosaics and an optional message.
    Transfer,
    /// Hash lock (deposit guaranteeing a bonded aggregate).
    HashLock,
    /// Aggregate complete.
    AggregateComplete,
    /// Aggregate bonded.
    AggregateBonded,
}

/// A cosignature attached to an aggregate transaction.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cosignature {
    /// Cosigner public key.
    pub signer: PublicKey,
    /// Signature over the aggregate hash.
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
}

/// Where a transaction sits in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInfo {
    /// Block height.
    pub height: u64,
    /// Index within the block, or within the parent aggregate for inner
    /// transactions.
    pub index: u32,
    /// Transaction hash.
    pub hash: Hash,
    /// Hash of the parent aggregate, for inner transactions.
    pub aggregate_hash: Option<Hash>,
}

/// Type-specific transaction content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionBody {
    /// Mosaic transfer.
    Transfer {
        /// Recipient (may be an alias).
        recipient: UnresolvedAddress,
        /// Transferred mosaics (ids may be aliases).
        mosaics: Vec<UnresolvedMosaic>,
        /// Message payload.
        message: Vec<u8>,
    },
    /// Hash lock funding a bonded aggregate.
    HashLock {
        /// Locked deposit.
        mosaic: UnresolvedMosaic,
        /// Lock duration in blocks.
        duration: u64,
        /// Hash of the aggregate the lock guarantees.
        aggregate_hash: Hash,
    },
    /// Aggregate of inner transactions.
    Aggregate {
        /// Complete or bonded.
        kind: AggregateKind,
        /// Embedded transactions.
        inner: Vec<Transaction>,
        /// Collected cosignatures.
        cosignatures: Vec<Cosignature>,
    },
}

/// A ledger transaction.
///
/// Transactions read from a node may still carry aliases; see
/// [`ResolvedTransaction`] for the alias-free form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Signer address.
    pub signer: Address,
    /// Maximum fee in atomic units.
    pub max_fee: u64,
    /// Deadline (network time, milliseconds).
    pub deadline: u64,
    /// Type-specific content.
    pub body: TransactionBody,
    /// Chain position, present once the transaction is on the ledger.
    pub info: Option<TransactionInfo>,
}

impl Transaction {
    /// The transaction type tag.
    #[must_use]
    pub fn kind(&self) -> TransactionKind {
        match &self.body {
            TransactionBody::Transfer { .. } => TransactionKind::Transfer,
            TransactionBody::HashLock { .. } => TransactionKind::HashLock,
            TransactionBody::Aggregate {
                kind: AggregateKind::Complete,
                ..
            } => TransactionKind::AggregateComplete,
            TransactionBody::Aggregate {
                kind: AggregateKind::Bonded,
                ..
            } => TransactionKind::AggregateBonded,
        }
    }

    /// The ledger hash, if known.
    #[must_use]
    pub fn hash(&self) -> Option<Hash> {
        self.info.map(|info| info.hash)
    }

    /// True if any address or mosaic reference is still an alias,
    /// including inside aggregate inner transactions.
    #[must_use]
    pub fn has_unresolved_references(&self) -> bool {
        match &self.body {
            TransactionBody::Transfer {
                recipient, mosaics, ..
            } => recipient.alias().is_some() || mosaics.iter().any(|m| m.id.alias().is_some()),
            TransactionBody::HashLock { mosaic, .. } => mosaic.id.alias().is_some(),
            TransactionBody::Aggregate { inner, .. } => {
                inner.iter().any(Transaction::has_unresolved_references)
            }
        }
    }

    /// True if `address` signed this transaction, receives it, or takes
    /// part through an inner transaction.
    #[must_use]
    pub fn involves(&self, address: &Address) -> bool {
        if &self.signer == address {
            return true;
        }
        match &self.body {
            TransactionBody::Transfer {
                recipient: UnresolvedAddress::Address(recipient),
                ..
            } => recipient == address,
            TransactionBody::Aggregate { inner, .. } => inner.iter().any(|tx| tx.involves(address)),
            _ => false,
        }
    }
}

/// A transaction whose references are all concrete.
///
/// Can only be built from a [`Transaction`] without aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTransaction(Transaction);

impl ResolvedTransaction {
    /// Wrap `transaction` if it carries no alias; hand it back otherwise.
    pub fn try_from_transaction(transaction: Transaction) -> Result<Self, Transaction> {
        if transaction.has_unresolved_references() {
            Err(transaction)
        } else {
            Ok(Self(transaction))
        }
    }

    /// The underlying transaction.
    #[must_use]
    pub fn transaction(&self) -> &Transaction {
        &self.0
    }

    /// The ledger hash, if known.
    #[must_use]
    pub fn hash(&self) -> Option<Hash> {
        self.0.hash()
    }

    /// Unwrap into the underlying transaction.
    #[must_use]
    pub fn into_inner(self) -> Transaction {
        self.0
    }
}

/// A signed transaction payload, ready for announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    /// Serialized, signed payload.
    pub payload: Vec<u8>,
    /// Transaction hash.
    pub hash: Hash,
    /// Signer address.
    pub signer: Address,
    /// Transaction type tag.
    pub kind: TransactionKind,
}

impl SignedTransaction {
    /// Build from a payload, deriving the hash as SHA-256 of the payload.
    #[must_use]
    pub fn from_payload(payload: Vec<u8>, signer: Address, kind: TransactionKind) -> Self {
        use sha2::{Digest, Sha256};
        let hash: Hash = Sha256::digest(&payload).into();
        Self {
            payload,
            hash,
            signer,
            kind,
        }
    }

    /// Returns the signer address.
    pub fn signer_address(&self) -> Address {
        self.signer
    }
}

/// A transaction status error pushed by the node when it rejects a
/// transaction after announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionStatus {
    /// Rejected transaction hash.
    pub hash: Hash,
    /// Status code (e.g. `Failure_Core_Insufficient_Balance`).
    pub code: String,
    /// Transaction deadline.
    pub deadline: u64,
}

// =============================================================================
// CLUSTER D: RECEIPTS
// =============================================================================

/// Position of the transaction that produced a receipt within a block.
///
/// Ordered lexicographically by (`primary_id`, `secondary_id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReceiptSource {
    /// Index of the top-level transaction in the block, plus one.
    pub primary_id: u32,
    /// Index of the inner transaction in its aggregate, plus one; zero for
    /// top-level transactions.
    pub secondary_id: u32,
}

impl ReceiptSource {
    /// Source position of a top-level transaction at `index`.
    ///
    /// `None` when `index` is the last representable position.
    #[must_use]
    pub fn top_level(index: u32) -> Option<Self> {
        Some(Self {
            primary_id: index.checked_add(1)?,
            secondary_id: 0,
        })
    }

    /// Source position of the inner transaction at `inner_index` of the
    /// aggregate at `aggregate_index`.
    ///
    /// `None` when either index is the last representable position.
    #[must_use]
    pub fn embedded(aggregate_index: u32, inner_index: u32) -> Option<Self> {
        Some(Self {
            primary_id: aggregate_index.checked_add(1)?,
            secondary_id: inner_index.checked_add(1)?,
        })
    }
}

/// An alias resolution that took effect from `source` onward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionEntry<R> {
    /// Where the resolution started applying.
    pub source: ReceiptSource,
    /// Resolved value.
    pub resolved: R,
}

/// All resolutions of one namespace within one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionStatement<R> {
    /// Block height.
    pub height: u64,
    /// Namespace being resolved.
    pub unresolved: NamespaceId,
    /// Resolutions, in block order.
    pub entries: Vec<ResolutionEntry<R>>,
}

impl<R: Clone> ResolutionStatement<R> {
    /// The value the namespace resolved to for a transaction at `position`:
    /// the latest entry whose source is not after it.
    #[must_use]
    pub fn resolve_at(&self, position: ReceiptSource) -> Option<R> {
        self.entries
            .iter()
            .filter(|entry| entry.source <= position)
            .max_by_key(|entry| entry.source)
            .map(|entry| entry.resolved.clone())
    }
}

/// Receipts of one block relevant to alias resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// Block height.
    pub height: u64,
    /// Address alias resolutions.
    pub address_resolutions: Vec<ResolutionStatement<Address>>,
    /// Mosaic alias resolutions.
    pub mosaic_resolutions: Vec<ResolutionStatement<MosaicId>>,
}

impl Statement {
    /// Resolve an address alias for a transaction at `position`.
    #[must_use]
    pub fn resolve_address(&self, namespace: NamespaceId, position: ReceiptSource) -> Option<Address> {
        self.address_resolutions
            .iter()
            .find(|statement| statement.unresolved == namespace)
            .and_then(|statement| statement.resolve_at(position))
    }

    /// Resolve a mosaic alias for a transaction at `position`.
    #[must_use]
    pub fn resolve_mosaic(&self, namespace: NamespaceId, position: ReceiptSource) -> Option<MosaicId> {
        self.mosaic_resolutions
            .iter()
            .find(|statement| statement.unresolved == namespace)
            .and_then(|statement| statement.resolve_at(position))
    }
}
