//! Actor identity supplied by the auth collaborator
//!
//! Authentication happens upstream. Every command reaches the core with an
//! already-verified `Actor`; the core only applies role policy, it never
//! re-validates credentials.

use serde::{Deserialize, Serialize};

/// Role of the acting party
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Kitchen,
    Waiter,
    /// Walk-in customer ordering from a table device (no account)
    Customer,
}

impl Role {
    /// Wire name, also accepted by [`std::str::FromStr`]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Kitchen => "kitchen",
            Role::Waiter => "waiter",
            Role::Customer => "customer",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "kitchen" => Ok(Role::Kitchen),
            "waiter" => Ok(Role::Waiter),
            "customer" => Ok(Role::Customer),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated actor attached to every command
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub role: Role,
}

impl Actor {
    pub fn new(id: i64, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_staff(&self) -> bool {
        !matches!(self.role, Role::Customer)
    }

    /// True when the role is one of `roles`
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Admin, Role::Kitchen, Role::Waiter, Role::Customer] {
            let parsed: Role = role.as_str().parse().unwrap();
            assert_eq!(parsed, role);
        }
        assert!("chef".parse::<Role>().is_err());
    }

    #[test]
    fn role_checks() {
        let waiter = Actor::new(9, Role::Waiter);
        assert!(waiter.is_staff());
        assert!(waiter.has_any_role(&[Role::Waiter, Role::Admin]));
        assert!(!waiter.has_any_role(&[Role::Kitchen]));
        assert!(!Actor::new(0, Role::Customer).is_staff());
    }
}
