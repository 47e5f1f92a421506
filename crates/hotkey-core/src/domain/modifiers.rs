//! Modifier kinds and the bit-flag set that combines them.
//!
//! A [`ModifierSet`] is a single byte, so two sets built from the same kinds in
//! any order (with or without duplicates) are bit-for-bit identical.  That is
//! what makes hotkey matching order-independent without sorting or allocating.

use std::fmt;
use std::ops::BitOr;

use serde::Deserialize;

/// One of the four modifier categories.  Left and right keys share a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[repr(u8)]
pub enum ModifierKind {
    Alt = 1 << 0,
    Control = 1 << 1,
    Shift = 1 << 2,
    WindowsKey = 1 << 3,
}

impl ModifierKind {
    /// All kinds, in bit order.
    pub const ALL: [ModifierKind; 4] = [
        ModifierKind::Alt,
        ModifierKind::Control,
        ModifierKind::Shift,
        ModifierKind::WindowsKey,
    ];

    /// The flag bit for this kind.
    pub const fn bit(self) -> u8 {
        self as u8
    }

    fn label(self) -> &'static str {
        match self {
            ModifierKind::Alt => "Alt",
            ModifierKind::Control => "Control",
            ModifierKind::Shift => "Shift",
            ModifierKind::WindowsKey => "Win",
        }
    }
}

/// An unordered set of [`ModifierKind`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ModifierSet(u8);

impl ModifierSet {
    /// The empty set (no modifiers required).
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Builds a set from raw flag bits, discarding unknown bits.
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & 0x0F)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub const fn contains(self, kind: ModifierKind) -> bool {
        self.0 & kind.bit() != 0
    }

    /// Returns a copy of this set with `kind` added.
    #[must_use]
    pub const fn with(self, kind: ModifierKind) -> Self {
        Self(self.0 | kind.bit())
    }

    pub fn insert(&mut self, kind: ModifierKind) {
        self.0 |= kind.bit();
    }

    pub fn remove(&mut self, kind: ModifierKind) {
        self.0 &= !kind.bit();
    }

    /// Iterates the kinds in the set in bit order.
    pub fn iter(self) -> impl Iterator<Item = ModifierKind> {
        ModifierKind::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

impl From<ModifierKind> for ModifierSet {
    fn from(kind: ModifierKind) -> Self {
        Self(kind.bit())
    }
}

impl FromIterator<ModifierKind> for ModifierSet {
    fn from_iter<I: IntoIterator<Item = ModifierKind>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

impl<'a> FromIterator<&'a ModifierKind> for ModifierSet {
    fn from_iter<I: IntoIterator<Item = &'a ModifierKind>>(iter: I) -> Self {
        iter.into_iter().copied().collect()
    }
}

impl BitOr for ModifierKind {
    type Output = ModifierSet;

    fn bitor(self, rhs: Self) -> ModifierSet {
        ModifierSet::from(self).with(rhs)
    }
}

impl BitOr<ModifierKind> for ModifierSet {
    type Output = ModifierSet;

    fn bitor(self, rhs: ModifierKind) -> ModifierSet {
        self.with(rhs)
    }
}

impl fmt::Display for ModifierSet {
    /// Renders as `Control+Shift`, or an empty string for the empty set.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, kind) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            f.write_str(kind.label())?;
        }
        Ok(())
    }
}
