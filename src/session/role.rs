//! Session roles
//!
//! The gateway recognises `client` and `manager`; deployments may define
//! further tags, which are carried through verbatim.

use std::fmt;
use std::str::FromStr;

/// Identity tag attached to the channel open request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    Client,
    Manager,
    /// Deployment-defined role (lowercase, non-empty)
    Other(String),
}

impl Role {
    /// Wire form used in the `role` query parameter
    pub fn as_str(&self) -> &str {
        match self {
            Role::Client => "client",
            Role::Manager => "manager",
            Role::Other(tag) => tag,
        }
    }

    /// Capitalised form for badges ("Client", "Manager")
    pub fn display_name(&self) -> String {
        let tag = self.as_str();
        let mut chars = tag.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Client
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role parse error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid role '{0}': expected a single word of letters, digits, '-' or '_'")]
pub struct InvalidRole(pub String);

impl FromStr for Role {
    type Err = InvalidRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_lowercase();
        if tag.is_empty()
            || !tag
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(InvalidRole(s.to_string()));
        }
        Ok(match tag.as_str() {
            "client" => Role::Client,
            "manager" => Role::Manager,
            _ => Role::Other(tag),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_roles() {
        assert_eq!("client".parse::<Role>().unwrap(), Role::Client);
        assert_eq!("Manager".parse::<Role>().unwrap(), Role::Manager);
        assert_eq!(" manager ".parse::<Role>().unwrap(), Role::Manager);
    }

    #[test]
    fn test_parse_deployment_role() {
        let role: Role = "auditor".parse().unwrap();
        assert_eq!(role, Role::Other("auditor".to_string()));
        assert_eq!(role.as_str(), "auditor");
        assert_eq!(role.display_name(), "Auditor");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<Role>().is_err());
        assert!("two words".parse::<Role>().is_err());
        assert!("a&b=c".parse::<Role>().is_err());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(Role::Client.display_name(), "Client");
        assert_eq!(Role::Manager.display_name(), "Manager");
    }
}
