use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::room::RoomNo;

macro_rules! uuid_id {
    ($name:ident) => {
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), &self.0.to_string()[..8])
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(UserId);
uuid_id!(ListenerId);

/// Document id of a room. Assigned once from the room number at creation
/// and never re-derived afterwards.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id read as a room number, if it is one.
    pub fn as_room_no(&self) -> Option<RoomNo> {
        RoomNo::parse(&self.0)
    }
}

impl fmt::Debug for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RoomId({})", self.0)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_room_id() {
        assert_eq!(RoomId::new("12").as_room_no(), Some(RoomNo::from(12)));
        assert_eq!(RoomId::new("007").as_room_no(), Some(RoomNo::from(7)));
    }

    #[test]
    fn non_numeric_room_id() {
        assert_eq!(RoomId::new("annex").as_room_no(), None);
    }

    #[test]
    fn user_ids_are_unique() {
        assert_ne!(UserId::new(), UserId::new());
    }
}
