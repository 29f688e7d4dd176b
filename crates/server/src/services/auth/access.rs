//! Role-based authorization.

use pvz_core::Role;

use crate::models::Identity;
use crate::services::ServiceError;

/// Check that the caller's role is in `allowed`.
///
/// # Errors
///
/// - `ServiceError::Unauthorized` if there is no caller
/// - `ServiceError::Forbidden` if the caller's role is not allowed
pub fn authorize<'a>(
    identity: Option<&'a Identity>,
    allowed: &[Role],
) -> Result<&'a Identity, ServiceError> {
    let identity = identity.ok_or(ServiceError::Unauthorized)?;
    if !allowed.contains(&identity.role) {
        tracing::debug!(
            user_id = %identity.user_id,
            role = %identity.role,
            "role not permitted"
        );
        return Err(ServiceError::Forbidden);
    }
    Ok(identity)
}
