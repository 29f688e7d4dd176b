//! Operator roles.

define_wire_enum! {
    /// Role of an authenticated operator.
    ///
    /// Moderators register pickup points; employees run receptions and
    /// handle products. Listing is open to both.
    pub enum Role as "role" in "user_role" {
        /// Pickup point staff member.
        Employee => "employee",
        /// Network moderator.
        Moderator => "moderator",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip_strings() {
        assert_eq!(Role::parse("employee").unwrap(), Role::Employee);
        assert_eq!(Role::parse("moderator").unwrap(), Role::Moderator);
        assert_eq!(Role::Employee.to_string(), "employee");
    }

    #[test]
    fn test_role_rejects_unknown() {
        assert!(Role::parse("admin").is_err());
        assert!(Role::parse("Employee").is_err());
    }
}
