//! Access-flag bitmask carried by every resource.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Owner/group/public read, write, and visibility bits plus the
/// internal-only marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessFlags(u32);

impl AccessFlags {
    pub const OWNER_READ: Self = Self(1);
    pub const OWNER_WRITE: Self = Self(2);
    pub const OWNER_VISIBLE: Self = Self(4);
    pub const GROUP_READ: Self = Self(8);
    pub const GROUP_WRITE: Self = Self(16);
    pub const GROUP_VISIBLE: Self = Self(32);
    pub const PUBLIC_READ: Self = Self(64);
    pub const PUBLIC_WRITE: Self = Self(128);
    pub const PUBLIC_VISIBLE: Self = Self(256);
    /// Readable only through internal requests.
    pub const INTERNAL: Self = Self(512);

    /// No bits set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Owner and group may do everything, the public may read and see.
    pub const fn default_resource() -> Self {
        Self(1 | 2 | 4 | 8 | 16 | 32 | 64 | 256)
    }

    /// Build flags from raw bits; unknown bits are dropped.
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Self(bits & 1023)
    }

    /// The raw bitmask.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether every bit of `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Return a copy with the bits of `other` set.
    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Return a copy with the bits of `other` cleared.
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Whether the resource is restricted to internal requests.
    pub const fn is_internal(self) -> bool {
        self.contains(Self::INTERNAL)
    }
}

impl Default for AccessFlags {
    fn default() -> Self {
        Self::default_resource()
    }
}

impl BitOr for AccessFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.with(rhs)
    }
}

impl BitOrAssign for AccessFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.with(rhs);
    }
}

impl fmt::Display for AccessFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bit = |flag: Self, c: char| if self.contains(flag) { c } else { '-' };
        write!(
            f,
            "{}{}{}{}{}{}{}{}{}{}",
            bit(Self::OWNER_READ, 'r'),
            bit(Self::OWNER_WRITE, 'w'),
            bit(Self::OWNER_VISIBLE, 'v'),
            bit(Self::GROUP_READ, 'r'),
            bit(Self::GROUP_WRITE, 'w'),
            bit(Self::GROUP_VISIBLE, 'v'),
            bit(Self::PUBLIC_READ, 'r'),
            bit(Self::PUBLIC_WRITE, 'w'),
            bit(Self::PUBLIC_VISIBLE, 'v'),
            bit(Self::INTERNAL, 'i'),
        )
    }
}
