//! Bit-flags attached to definitions

use bitflags::bitflags;

bitflags! {
    /// Behaviour switches of a [`ConfigDef`](crate::ConfigDef).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DefFlags: u32 {
        /// The value may not be empty
        const NOT_EMPTY = 1 << 0;
        /// The value is fixed once startup completes
        const ON_STARTUP = 1 << 1;
        /// Numbers may not be negative
        const NOT_NEGATIVE = 1 << 2;
        /// The value is hidden in dumps (passwords, tokens)
        const SENSITIVE = 1 << 3;
    }
}
