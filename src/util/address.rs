// Layer 1: Standard library imports
use std::fmt::{self, Display};

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Layer 3: Internal module imports
// (none)

/// Unique identifier for an actor within a stage.
///
/// Addresses are 128-bit, time-sortable identifiers (UUID v7) minted by an
/// [`AddressFactory`]. They are immutable once minted, totally ordered,
/// hashable, and render as the standard hyphenated UUID string.
///
/// # Example
/// ```rust
/// use stagehand::util::AddressFactory;
///
/// let factory = AddressFactory::default();
/// let first = factory.unique();
/// let second = factory.unique();
/// assert_ne!(first, second);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(Uuid);

impl Address {
    /// Create an address from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mints [`Address`]es for a stage.
///
/// The factory is the only source of new addresses; it is cheap to clone
/// and stateless (uniqueness and ordering come from the v7 scheme).
#[derive(Debug, Default, Clone)]
pub struct AddressFactory;

impl AddressFactory {
    /// Create a new address factory.
    pub fn new() -> Self {
        Self
    }

    /// Mint a fresh, unique, time-sortable address.
    pub fn unique(&self) -> Address {
        Address(Uuid::now_v7())
    }
}
