//! Per-request authorization predicates.
//!
//! Pure functions over (caller identity, target), evaluated at the top
//! of each handler. A false result must short-circuit the whole
//! handler, not merely hide data.

use uuid::Uuid;

use super::user::UserRole;

/// Caller identity, detached from the web layer so the predicates can
/// be tested without a request in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: Uuid,
    pub role: UserRole,
}

impl Caller {
    pub fn new(id: Uuid, role: UserRole) -> Self {
        Self { id, role }
    }
}

/// May the caller view the page of the user with `target_id`?
/// Users may access themselves; admins may access anyone.
pub fn can_access_user(caller: &Caller, target_id: Uuid) -> bool {
    caller.role.is_admin() || caller.id == target_id
}

/// May the caller mutate a listing owned by `owner_id`?
/// Owners may edit their own listings; admins may edit any.
pub fn can_edit_listing(caller: &Caller, owner_id: Uuid) -> bool {
    caller.role.is_admin() || caller.id == owner_id
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: Uuid) -> Caller {
        Caller::new(id, UserRole::User)
    }

    fn admin() -> Caller {
        Caller::new(Uuid::new_v4(), UserRole::Admin)
    }

    #[test]
    fn user_can_access_self() {
        let id = Uuid::new_v4();
        assert!(can_access_user(&user(id), id));
    }

    #[test]
    fn user_cannot_access_other() {
        assert!(!can_access_user(&user(Uuid::new_v4()), Uuid::new_v4()));
    }

    #[test]
    fn admin_can_access_anyone() {
        assert!(can_access_user(&admin(), Uuid::new_v4()));
    }

    #[test]
    fn owner_can_edit_own_listing() {
        let id = Uuid::new_v4();
        assert!(can_edit_listing(&user(id), id));
    }

    #[test]
    fn stranger_cannot_edit_listing() {
        assert!(!can_edit_listing(&user(Uuid::new_v4()), Uuid::new_v4()));
    }

    #[test]
    fn admin_can_edit_any_listing() {
        assert!(can_edit_listing(&admin(), Uuid::new_v4()));
    }
}
