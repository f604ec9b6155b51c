use serde::{Deserialize, Serialize};

/// An enum value that does not match any known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {field} value: {value}")]
pub struct InvalidEnum {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidEnum;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

// Novelty priority: High means few comparable reports exist.
str_enum!(Judgement {
    High => "High",
    Moderate => "Moderate",
    Low => "Low",
});

str_enum!(QueryStrength {
    Narrow => "narrow",
    Broad => "broad",
});

// How the broad query is derived from the validated blocks.
str_enum!(BroadStrategy {
    DropLastBlock => "drop_last_block",
    FirstBlockOnly => "first_block_only",
});

// Whether fully invalidated evaluations stay visible as level-0 "closest matches".
str_enum!(ClosestMatchPolicy {
    DropInvalidated => "drop_invalidated",
    RetainInvalidated => "retain_invalidated",
});
