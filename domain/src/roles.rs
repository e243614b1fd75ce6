//! Portal roles.
//!
//! Every dashboard in the portal is scoped to exactly one of these roles,
//! and role-targeted notifications name one of them. The enum is closed on
//! purpose: every branch over roles is compiler-checked.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A portal role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Ward and clinic physicians
    Doctor,
    /// Ward nursing staff
    Nurse,
    /// Hospital pharmacy
    Pharmacy,
    /// Front-desk reception
    Receptionist,
    /// Operations administration
    Admin,
    /// Patient-facing portal
    Patient,
}

impl Role {
    /// All roles, in dashboard order.
    pub const ALL: [Role; 6] = [
        Role::Doctor,
        Role::Nurse,
        Role::Pharmacy,
        Role::Receptionist,
        Role::Admin,
        Role::Patient,
    ];

    /// Lowercase wire/display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Doctor => "doctor",
            Role::Nurse => "nurse",
            Role::Pharmacy => "pharmacy",
            Role::Receptionist => "receptionist",
            Role::Admin => "admin",
            Role::Patient => "patient",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_roles_have_distinct_names() {
        let mut names: Vec<&str> = Role::ALL.iter().map(|r| r.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Role::ALL.len());
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(Role::Pharmacy.to_string(), "pharmacy");
    }
}
