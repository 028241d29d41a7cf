use crate::id::UserId;
use serde::{Deserialize, Serialize};

/// Identity of the caller performing an operation. Supplied explicitly on
/// every call; the engine never holds a session-bound current user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub is_admin: bool,
}

impl Actor {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            is_admin: false,
        }
    }

    pub fn admin(id: UserId) -> Self {
        Self { id, is_admin: true }
    }
}
