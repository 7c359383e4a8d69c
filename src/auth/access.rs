use crate::database::models::User;

/// Everything a route can ask permission for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Login,
    ReadReference,
    WriteReference,
    ReadSelf,
    ListUsers,
    ReadUser,
    CreateUser,
    UpdateUser,
    DeleteUser,
    ReadDevice,
    WriteDevice,
    ReadIncident,
    CreateIncident,
    UpdateIncident,
    DeleteIncident,
    ReadHistory,
}

/// Who may perform an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Public,
    Authenticated,
    Administrator,
}

impl Operation {
    pub fn scope(self) -> Scope {
        use Operation::*;

        match self {
            Login | ReadReference => Scope::Public,
            ReadSelf | ReadDevice | ReadIncident | CreateIncident | UpdateIncident | ReadHistory => {
                Scope::Authenticated
            }
            WriteReference | ListUsers | ReadUser | CreateUser | UpdateUser | DeleteUser
            | WriteDevice | DeleteIncident => Scope::Administrator,
        }
    }

    pub fn as_str(self) -> &'static str {
        use Operation::*;

        match self {
            Login => "login",
            ReadReference => "read reference data",
            WriteReference => "modify reference data",
            ReadSelf => "read own profile",
            ListUsers => "list users",
            ReadUser => "read users",
            CreateUser => "create users",
            UpdateUser => "update users",
            DeleteUser => "delete users",
            ReadDevice => "read devices",
            WriteDevice => "modify devices",
            ReadIncident => "read incidents",
            CreateIncident => "create incidents",
            UpdateIncident => "update incidents",
            DeleteIncident => "delete incidents",
            ReadHistory => "read incident history",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Not allowed to {}", .0.as_str())]
    Forbidden(Operation),
}

/// Role-based authorization. There is no per-record ownership check.
#[derive(Debug, Clone, Copy)]
pub struct AccessControl {
    admin_role_id: i32,
}

impl AccessControl {
    pub fn new(admin_role_id: i32) -> Self {
        Self { admin_role_id }
    }

    pub fn admin_role_id(&self) -> i32 {
        self.admin_role_id
    }

    pub fn is_admin(&self, user: &User) -> bool {
        user.role_id == self.admin_role_id
    }

    pub fn authorize(&self, user: Option<&User>, operation: Operation) -> Result<(), AccessError> {
        match (operation.scope(), user) {
            (Scope::Public, _) => Ok(()),
            (_, None) => Err(AccessError::Unauthenticated),
            (Scope::Authenticated, Some(_)) => Ok(()),
            (Scope::Administrator, Some(user)) if self.is_admin(user) => Ok(()),
            (Scope::Administrator, Some(user)) => {
                tracing::warn!(
                    "Denied {} for user {} (role {})",
                    operation.as_str(),
                    user.id,
                    user.role_id
                );
                Err(AccessError::Forbidden(operation))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role_id: i32) -> User {
        User {
            id: 7,
            office_id: None,
            first_name: "Vin".to_string(),
            last_name: "Venture".to_string(),
            email: "vin@cosmere.com".to_string(),
            password_hash: String::new(),
            role_id,
        }
    }

    #[test]
    fn admin_operations_require_admin_role() {
        let access = AccessControl::new(1);

        assert!(access.authorize(Some(&user(1)), Operation::CreateUser).is_ok());
        assert_eq!(
            access.authorize(Some(&user(3)), Operation::CreateUser),
            Err(AccessError::Forbidden(Operation::CreateUser))
        );
    }

    #[test]
    fn any_user_may_work_with_incidents() {
        let access = AccessControl::new(1);
        let reporter = user(3);

        for op in [
            Operation::ReadIncident,
            Operation::CreateIncident,
            Operation::UpdateIncident,
            Operation::ReadSelf,
            Operation::ReadHistory,
        ] {
            assert!(access.authorize(Some(&reporter), op).is_ok(), "{op:?}");
        }
        assert!(access.authorize(Some(&reporter), Operation::DeleteIncident).is_err());
    }

    #[test]
    fn missing_identity_is_unauthenticated_before_role_check() {
        let access = AccessControl::new(1);

        assert_eq!(
            access.authorize(None, Operation::DeleteUser),
            Err(AccessError::Unauthenticated)
        );
        assert_eq!(
            access.authorize(None, Operation::ReadIncident),
            Err(AccessError::Unauthenticated)
        );
        assert!(access.authorize(None, Operation::ReadReference).is_ok());
        assert!(access.authorize(None, Operation::Login).is_ok());
    }

    #[test]
    fn admin_role_is_configurable() {
        let access = AccessControl::new(2);
        assert!(access.authorize(Some(&user(2)), Operation::ListUsers).is_ok());
        assert!(access.authorize(Some(&user(1)), Operation::ListUsers).is_err());
    }
}
