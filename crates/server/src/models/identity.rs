//! The authenticated caller attached to a request.

use pvz_core::{Role, UserId};

/// Identity resolved by authentication.
///
/// Dummy identities are built from token claims alone and never exist in
/// the user store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
    pub dummy: bool,
}
