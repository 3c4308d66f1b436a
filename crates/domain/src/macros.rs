//! Macro for implementing Display and FromStr for wire-level enums
//!
//! Provider query parameters and persisted states are plain lowercase strings.
//! This macro keeps the enum/string mapping in one place and parses
//! case-insensitively.
//!
//! # Example
//!
//! ```rust
//! use soundcheck_domain::impl_wire_str_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Market {
//!     Global,
//!     Local,
//! }
//!
//! impl_wire_str_conversions!(Market {
//!     Global => "global",
//!     Local => "local",
//! });
//! ```

/// Implements Display and FromStr for an enum with a fixed string mapping
///
/// This macro generates:
/// - Display: writes the mapped wire string
/// - FromStr: parses case-insensitively back to the variant
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their lowercase wire
///   representations
#[macro_export]
macro_rules! impl_wire_str_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
