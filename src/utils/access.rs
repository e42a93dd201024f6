// src/utils/access.rs

use crate::{error::AppError, models::user::Role, utils::jwt::Caller};

/// Owner-or-admin rule for edit and delete.
pub fn can_mutate(caller: &Caller, owner_id: i64) -> bool {
    caller.id == owner_id || caller.is_admin()
}

/// Fails with `Forbidden` unless the caller holds `role`.
pub fn require_role(caller: &Caller, role: Role) -> Result<(), AppError> {
    if caller.role != role {
        return Err(AppError::Forbidden(format!("Requires the {} role", role)));
    }
    Ok(())
}

/// `can_mutate` as a guard.
pub fn require_owner_or_admin(caller: &Caller, owner_id: i64) -> Result<(), AppError> {
    if !can_mutate(caller, owner_id) {
        return Err(AppError::Forbidden(
            "Only the owner or an administrator may modify this record".to_string(),
        ));
    }
    Ok(())
}
