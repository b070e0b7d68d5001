//! Domain primitives shared by the board services and the HTTP layer.
//!
//! Enumerations here are persisted as lowercase strings; each one offers
//! `as_str` for writing and a `FromStr` impl for reading back.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The identity a mutation is performed on behalf of.
///
/// Resolved by the authentication layer from the access token and passed
/// explicitly into every service call that needs to authorize or audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    pub id: i32,
    pub is_root: bool,
}

impl Actor {
    #[must_use]
    pub const fn new(id: i32, is_root: bool) -> Self {
        Self { id, is_root }
    }

    /// Returns true when this actor may change a resource owned by `owner_id`.
    #[must_use]
    pub const fn can_mutate(&self, owner_id: i32) -> bool {
        can_mutate(self, owner_id)
    }
}

/// Root actors bypass ownership; everyone else may only touch what they created.
#[must_use]
pub const fn can_mutate(actor: &Actor, owner_id: i32) -> bool {
    actor.is_root || actor.id == owner_id
}

/// Error returned when parsing one of the string-backed enums fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

string_enum!(
    /// Task priority.
    Priority, "priority", {
        Low => "low",
        Medium => "medium",
        High => "high",
        Urgent => "urgent",
    }
);

string_enum!(
    /// The kind of entity an activity record describes.
    EntityType, "entity type", {
        Task => "task",
        Column => "column",
        User => "user",
    }
);

string_enum!(
    /// What happened to the entity.
    ActivityAction, "activity action", {
        Created => "created",
        Updated => "updated",
        Deleted => "deleted",
        Moved => "moved",
        Assigned => "assigned",
        PriorityChanged => "priority_changed",
        Commented => "commented",
    }
);

string_enum!(
    /// Default UI theme stored in the application settings.
    Theme, "theme", {
        Light => "light",
        Dark => "dark",
        System => "system",
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_mutate_owner() {
        let actor = Actor::new(7, false);
        assert!(actor.can_mutate(7));
        assert!(!actor.can_mutate(8));
    }

    #[test]
    fn test_can_mutate_root_bypasses_ownership() {
        let root = Actor::new(1, true);
        assert!(root.can_mutate(1));
        assert!(root.can_mutate(42));
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!("high".parse::<Priority>(), Ok(Priority::High));
        assert_eq!(Priority::Urgent.as_str(), "urgent");
        assert!("critical".parse::<Priority>().is_err());
        assert!("High".parse::<Priority>().is_err());
    }

    #[test]
    fn test_action_serializes_snake_case() {
        let json = serde_json::to_string(&ActivityAction::PriorityChanged).unwrap();
        assert_eq!(json, "\"priority_changed\"");
        assert_eq!(ActivityAction::PriorityChanged.as_str(), "priority_changed");
    }

    #[test]
    fn test_unknown_variant_message() {
        let err = "purple".parse::<Theme>().unwrap_err();
        assert_eq!(err.to_string(), "unknown theme: 'purple'");
    }

    #[test]
    fn test_all_lists_every_variant() {
        assert_eq!(Priority::ALL.len(), 4);
        assert_eq!(EntityType::ALL.len(), 3);
        assert!(Theme::ALL.contains(&Theme::System));
    }
}
