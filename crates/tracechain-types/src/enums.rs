//! Text forms of the schema's unit variants.

/// Error returned when a string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseVariantError {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

/// Implements `as_str`, `Display`, `FromStr` and `ALL` for a unit-variant enum.
///
/// The text form is the snake_case variant name; parsing also accepts the
/// Candid (PascalCase) spelling and is case-insensitive.
macro_rules! text_variants {
    ($ty:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = $crate::enums::ParseVariantError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().replace(['-', ' '], "_");
                $(
                    if wanted.eq_ignore_ascii_case($text)
                        || wanted.eq_ignore_ascii_case(stringify!($variant))
                    {
                        return Ok(Self::$variant);
                    }
                )+
                Err($crate::enums::ParseVariantError {
                    kind: $kind,
                    value: s.to_string(),
                    expected: [$($text),+].join(", "),
                })
            }
        }
    };
}

pub(crate) use text_variants;
