use uuid::Uuid;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id_type {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                $name(Uuid::new_v4())
            }

            pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
                Ok($name(Uuid::parse_str(s)?))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id_type!(UserId);
define_id_type!(AccountId);
define_id_type!(RuleId);
define_id_type!(EntryId);

impl AccountId {
    /// Deterministic derivation: the account shares the user's UUID, so
    /// account lookup stays consistent across restarts.
    pub fn from_user(user_id: UserId) -> Self {
        AccountId(user_id.0)
    }
}
