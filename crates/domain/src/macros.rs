//! Macro for implementing Display and FromStr for wire-name enums
//!
//! # Example
//!
//! ```rust
//! use keyway_domain::impl_wire_name_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Channel {
//!     Wifi,
//!     Cellular,
//! }
//!
//! impl_wire_name_conversions!(Channel {
//!     Wifi => "wifi",
//!     Cellular => "cellular",
//! });
//!
//! assert_eq!(Channel::Wifi.to_string(), "wifi");
//! assert_eq!("CELLULAR".parse::<Channel>(), Ok(Channel::Cellular));
//! ```

/// Implements Display and FromStr traits for enums with a fixed wire name
///
/// Display writes the wire name verbatim; FromStr matches it ignoring ASCII
/// case.
#[macro_export]
macro_rules! impl_wire_name_conversions {
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

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}
