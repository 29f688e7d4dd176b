//! Fixed enumerations with a canonical wire representation.
//!
//! The PVZ API exchanges cities, product types, statuses, and roles as
//! plain strings (some in Cyrillic). `define_wire_enum!` ties every variant
//! to exactly one such string and derives the serde, `Display`, `FromStr`
//! and (with the `postgres` feature) `sqlx` encodings from it, so the JSON
//! body, the database enum label and the error message can never disagree.

use thiserror::Error;

/// Error returned when a string is not one of an enumeration's wire values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: {value:?}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }

    /// Human name of the enumeration that failed to parse (e.g. `city`).
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.kind
    }

    /// The rejected input.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

macro_rules! define_wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident as $kind:literal in $pg_type:literal {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $wire:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[cfg_attr(feature = "postgres", derive(::sqlx::Type))]
        #[cfg_attr(feature = "postgres", sqlx(type_name = $pg_type))]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $wire)]
                #[cfg_attr(feature = "postgres", sqlx(rename = $wire))]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The canonical wire string for this variant.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }

            /// Parse a wire string. Matching is exact (case-sensitive).
            ///
            /// # Errors
            ///
            /// Returns [`ParseEnumError`] if `s` is not a known wire value.
            pub fn parse(s: &str) -> ::core::result::Result<Self, $crate::types::ParseEnumError> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    _ => Err($crate::types::ParseEnumError::new($kind, s)),
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::types::ParseEnumError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}
