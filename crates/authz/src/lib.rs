//! Ownership guards.
//!
//! Handlers resolve the acting user and the owner of the resource they touch,
//! then ask one of these guards whether the action may proceed.

use std::fmt::Display;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: {action} requires {requirement}")]
    Forbidden {
        action: &'static str,
        requirement: &'static str,
    },
}

impl AuthzError {
    pub fn action(&self) -> &'static str {
        match self {
            AuthzError::Forbidden { action, .. } => action,
        }
    }
}

/// Allow only the owner of the resource.
pub fn ensure_owner<Id>(action: &'static str, owner: &Id, actor: &Id) -> Result<(), AuthzError>
where
    Id: PartialEq + Display,
{
    if owner == actor {
        return Ok(());
    }

    tracing::debug!(action, %owner, %actor, "denied: actor is not the owner");
    Err(AuthzError::Forbidden {
        action,
        requirement: "ownership",
    })
}

/// Allow anyone except the owner of the resource.
pub fn ensure_not_owner<Id>(
    action: &'static str,
    owner: &Id,
    actor: &Id,
) -> Result<(), AuthzError>
where
    Id: PartialEq + Display,
{
    if owner != actor {
        return Ok(());
    }

    tracing::debug!(action, %owner, "denied: owners may not act on their own resource");
    Err(AuthzError::Forbidden {
        action,
        requirement: "a non-owner",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_guard() {
        assert!(ensure_owner("edit spot", &7, &7).is_ok());

        let err = ensure_owner("edit spot", &7, &8).unwrap_err();
        assert_eq!(err.action(), "edit spot");
        assert_eq!(err.to_string(), "forbidden: edit spot requires ownership");
    }

    #[test]
    fn not_owner_guard() {
        assert!(ensure_not_owner("book spot", &7, &8).is_ok());
        assert_eq!(
            ensure_not_owner("book spot", &7, &7),
            Err(AuthzError::Forbidden {
                action: "book spot",
                requirement: "a non-owner",
            })
        );
    }
}
