//! Who is making a request.

use serde::Serialize;

use crate::domain::id::UserId;
use crate::domain::user::Authority;
use crate::error::AuthError;

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub user_id: UserId,
    pub email: String,
    pub authorities: Vec<Authority>,
}

impl Principal {
    #[must_use]
    pub fn has_authority(&self, authority: Authority) -> bool {
        self.authorities.contains(&authority)
    }
}

/// The identity attached to a request. Requests without a token are
/// anonymous rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Identity {
    #[default]
    Anonymous,
    Authenticated(Principal),
}

impl Identity {
    #[must_use]
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(principal) => Some(principal),
        }
    }

    /// Require `authority`.
    ///
    /// # Errors
    /// [`AuthError::Unauthenticated`] for anonymous callers,
    /// [`AuthError::Forbidden`] when the principal lacks the authority.
    pub fn require(&self, authority: Authority) -> Result<&Principal, AuthError> {
        let principal = self.principal().ok_or(AuthError::Unauthenticated)?;
        if principal.has_authority(authority) {
            Ok(principal)
        } else {
            Err(AuthError::Forbidden { required: authority })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> Identity {
        Identity::Authenticated(Principal {
            user_id: UserId::new(2),
            email: "bob@example.com".into(),
            authorities: vec![Authority::User],
        })
    }

    #[test]
    fn anonymous_is_unauthenticated() {
        assert_eq!(
            Identity::Anonymous.require(Authority::User),
            Err(AuthError::Unauthenticated)
        );
    }

    #[test]
    fn missing_authority_is_forbidden() {
        assert!(user().require(Authority::User).is_ok());
        assert_eq!(
            user().require(Authority::Admin),
            Err(AuthError::Forbidden {
                required: Authority::Admin
            })
        );
    }
}
