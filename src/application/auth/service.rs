//! Registration, login and token verification.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::identity::{Identity, Principal};
use super::token::{Claims, IssuedToken, TokenCodec, TokenKind, TokenSettings};
use crate::domain::user::{Authority, Credentials, NewUser, Registration, User};
use crate::error::{AuthError, Error, Result};
use crate::port::outbound::credential::PasswordHasher;
use crate::port::outbound::store::Store;

/// Password verified against when the email is unknown, so that both
/// failure paths pay for one hash verification.
const DECOY_PASSWORD: &str = "decoy-password-never-matches";

/// Tokens handed out on a successful login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: User,
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

/// Authentication use cases.
pub struct AuthService<S, H> {
    store: Arc<S>,
    hasher: H,
    codec: TokenCodec,
    settings: TokenSettings,
    decoy_hash: String,
}

impl<S: Store, H: PasswordHasher> AuthService<S, H> {
    /// Build the service. Hashes the decoy password once up front.
    ///
    /// # Errors
    /// Returns [`Error::Hashing`] if the hasher fails.
    pub fn new(store: Arc<S>, hasher: H, settings: TokenSettings) -> Result<Self> {
        let decoy_hash = hasher.hash(DECOY_PASSWORD)?;
        Ok(Self {
            store,
            hasher,
            codec: TokenCodec::new(settings.secret.clone()),
            settings,
            decoy_hash,
        })
    }

    /// Register a new account. The first account ever registered is also
    /// granted [`Authority::Admin`].
    ///
    /// # Errors
    /// [`Error::Conflict`] if the email is already registered.
    pub fn register(&self, registration: &Registration) -> Result<User> {
        let email = registration.email();
        let taken = self
            .store
            .transaction(|tx| Ok(tx.find_user_by_email(email)?.is_some()))?;
        if taken {
            return Err(email_taken(email));
        }

        let password_hash = self.hasher.hash(registration.password())?;
        let user = self.store.transaction(|tx| {
            let first_user = tx.count_users()? == 0;
            tx.insert_user(&NewUser {
                first_name: registration.first_name().to_string(),
                last_name: registration.last_name().to_string(),
                email: email.to_string(),
                password_hash,
                authorities: Authority::initial_set(first_user),
                created_at: Utc::now(),
            })
        })?;

        info!(
            user_id = %user.id,
            email = %user.email,
            admin = user.has_authority(Authority::Admin),
            "User registered"
        );
        Ok(user)
    }

    /// Check credentials and issue an access and a refresh token.
    ///
    /// # Errors
    /// [`AuthError::InvalidCredentials`] for an unknown email or a wrong
    /// password, without saying which.
    pub fn login(&self, credentials: &Credentials) -> Result<Session> {
        let user = self
            .store
            .transaction(|tx| tx.find_user_by_email(credentials.email()))?;

        let user = match user {
            Some(user) if self.hasher.verify(credentials.password(), &user.password_hash) => user,
            Some(_) => return Err(self.reject_login(credentials.email())),
            None => {
                self.hasher.verify(credentials.password(), &self.decoy_hash);
                return Err(self.reject_login(credentials.email()));
            }
        };

        let now = Utc::now();
        let access = self.codec.issue(
            &user.email,
            &user.authorities,
            TokenKind::Access,
            now,
            self.settings.access_ttl,
        )?;
        let refresh = self.codec.issue(
            &user.email,
            &user.authorities,
            TokenKind::Refresh,
            now,
            self.settings.refresh_ttl,
        )?;

        info!(user_id = %user.id, "User logged in");
        Ok(Session {
            user,
            access,
            refresh,
        })
    }

    fn reject_login(&self, email: &str) -> Error {
        warn!(email = %email, "Login rejected");
        AuthError::InvalidCredentials.into()
    }

    /// Exchange a refresh token for a new access token carrying the user's
    /// current authorities.
    ///
    /// # Errors
    /// [`AuthError::InvalidToken`] if the token is not a valid refresh
    /// token for an existing user, [`AuthError::Expired`] if it expired.
    pub fn refresh(&self, refresh_token: &str) -> Result<IssuedToken> {
        let claims = self.verify(refresh_token, TokenKind::Refresh)?;
        let user = self.resolve_subject(&claims)?;
        let issued = self.codec.issue(
            &user.email,
            &user.authorities,
            TokenKind::Access,
            Utc::now(),
            self.settings.access_ttl,
        )?;
        info!(user_id = %user.id, "Access token refreshed");
        Ok(issued)
    }

    /// Resolve the identity behind an optional access token.
    ///
    /// No token yields [`Identity::Anonymous`]. A token must verify, belong
    /// to an existing user and claim exactly the authorities the user holds
    /// now. A token issued before the user's enrollment changed is rejected.
    ///
    /// # Errors
    /// [`AuthError::Expired`] or [`AuthError::InvalidToken`].
    pub fn authenticate(&self, token: Option<&str>) -> Result<Identity> {
        let Some(token) = token else {
            return Ok(Identity::Anonymous);
        };

        let claims = self.verify(token, TokenKind::Access)?;
        let user = self.resolve_subject(&claims)?;
        let claimed: BTreeSet<Authority> = claims.authorities.iter().copied().collect();
        let enrolled: BTreeSet<Authority> = user.authorities.iter().copied().collect();
        if claimed != enrolled {
            warn!(
                user_id = %user.id,
                claimed = ?claimed,
                enrolled = ?enrolled,
                "Token authorities differ from enrollment"
            );
            return Err(AuthError::InvalidToken("token authorities no longer match".into()).into());
        }

        Ok(Identity::Authenticated(Principal {
            user_id: user.id,
            email: user.email,
            authorities: claims.authorities,
        }))
    }

    fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims> {
        let claims = self.codec.decode(token, Utc::now()).map_err(|e| {
            warn!(error = %e, "Token rejected");
            e
        })?;
        if claims.typ != expected {
            warn!(subject = %claims.sub, typ = ?claims.typ, "Token used for the wrong purpose");
            return Err(AuthError::InvalidToken(format!(
                "expected {} token, got {}",
                expected.as_str(),
                claims.typ.as_str()
            ))
            .into());
        }
        Ok(claims)
    }

    fn resolve_subject(&self, claims: &Claims) -> Result<User> {
        let user = self
            .store
            .transaction(|tx| tx.find_user_by_email(&claims.sub))?;
        user.ok_or_else(|| {
            warn!(subject = %claims.sub, "Token subject no longer exists");
            AuthError::InvalidToken("unknown subject".into()).into()
        })
    }
}

fn email_taken(email: &str) -> Error {
    Error::Conflict(format!("email {email} is already registered"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::memory::MemoryStore;
    use crate::adapter::outbound::password::Argon2Hasher;
    use crate::error::ErrorKind;
    use chrono::Duration;

    const SECRET: &[u8] = b"unit-test-secret-unit-test-secret";

    fn service() -> AuthService<MemoryStore, Argon2Hasher> {
        let settings = TokenSettings {
            secret: SECRET.to_vec(),
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(7),
        };
        AuthService::new(
            Arc::new(MemoryStore::new()),
            Argon2Hasher::new(8, 1, 1).unwrap(),
            settings,
        )
        .unwrap()
    }

    fn register(auth: &AuthService<MemoryStore, Argon2Hasher>, email: &str) -> User {
        let registration = Registration::try_new("Ada", "Lovelace", email, "analytical").unwrap();
        auth.register(&registration).unwrap()
    }

    fn login(
        auth: &AuthService<MemoryStore, Argon2Hasher>,
        email: &str,
        password: &str,
    ) -> Result<Session> {
        auth.login(&Credentials::try_new(email, password).unwrap())
    }

    #[test]
    fn first_user_is_admin_later_users_are_not() {
        let auth = service();
        let first = register(&auth, "ada@example.com");
        let second = register(&auth, "bob@example.com");
        assert_eq!(first.authorities, vec![Authority::User, Authority::Admin]);
        assert_eq!(second.authorities, vec![Authority::User]);
    }

    #[test]
    fn duplicate_email_conflicts_case_insensitively() {
        let auth = service();
        register(&auth, "ada@example.com");
        let again = Registration::try_new("Ada", "L", "ADA@example.com", "analytical").unwrap();
        assert_eq!(auth.register(&again).unwrap_err().kind(), ErrorKind::Conflict);
    }

    #[test]
    fn unknown_email_and_wrong_password_look_the_same() {
        let auth = service();
        register(&auth, "ada@example.com");

        let wrong_password = login(&auth, "ada@example.com", "not-it-at-all").unwrap_err();
        let unknown_email = login(&auth, "eve@example.com", "analytical").unwrap_err();
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert_eq!(wrong_password.kind(), ErrorKind::InvalidCredentials);
        assert_eq!(unknown_email.kind(), ErrorKind::InvalidCredentials);
    }

    #[test]
    fn access_token_authenticates_refresh_token_does_not() {
        let auth = service();
        register(&auth, "ada@example.com");
        let session = login(&auth, "ada@example.com", "analytical").unwrap();

        let identity = auth.authenticate(Some(&session.access.token)).unwrap();
        let principal = identity.principal().unwrap();
        assert_eq!(principal.email, "ada@example.com");
        assert!(principal.has_authority(Authority::Admin));

        let err = auth.authenticate(Some(&session.refresh.token)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidToken);
    }

    #[test]
    fn refresh_issues_new_access_token() {
        let auth = service();
        register(&auth, "ada@example.com");
        let session = login(&auth, "ada@example.com", "analytical").unwrap();

        let access = auth.refresh(&session.refresh.token).unwrap();
        assert!(auth.authenticate(Some(&access.token)).is_ok());
        assert_eq!(
            auth.refresh(&session.access.token).unwrap_err().kind(),
            ErrorKind::InvalidToken
        );
    }

    #[test]
    fn missing_token_is_anonymous() {
        assert_eq!(service().authenticate(None).unwrap(), Identity::Anonymous);
    }

    #[test]
    fn expired_and_invalid_tokens_are_distinct() {
        let auth = service();
        register(&auth, "ada@example.com");
        let codec = TokenCodec::new(SECRET);
        let expired = codec
            .issue(
                "ada@example.com",
                &[Authority::User],
                TokenKind::Access,
                Utc::now() - Duration::hours(2),
                Duration::hours(1),
            )
            .unwrap();

        assert_eq!(
            auth.authenticate(Some(&expired.token)).unwrap_err().kind(),
            ErrorKind::Expired
        );
        assert_eq!(
            auth.authenticate(Some("garbage")).unwrap_err().kind(),
            ErrorKind::InvalidToken
        );
    }

    #[test]
    fn token_claiming_authorities_the_user_lacks_is_rejected() {
        let auth = service();
        register(&auth, "ada@example.com");
        register(&auth, "bob@example.com");
        let forged = TokenCodec::new(SECRET)
            .issue(
                "bob@example.com",
                &[Authority::User, Authority::Admin],
                TokenKind::Access,
                Utc::now(),
                Duration::minutes(5),
            )
            .unwrap();

        let err = auth.authenticate(Some(&forged.token)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidToken);
    }

    #[test]
    fn token_missing_a_held_authority_is_rejected() {
        let auth = service();
        register(&auth, "ada@example.com");
        let stale = TokenCodec::new(SECRET)
            .issue(
                "ada@example.com",
                &[Authority::User],
                TokenKind::Access,
                Utc::now(),
                Duration::minutes(5),
            )
            .unwrap();

        let err = auth.authenticate(Some(&stale.token)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidToken);
    }

    #[test]
    fn token_for_unknown_subject_is_rejected() {
        let auth = service();
        let orphan = TokenCodec::new(SECRET)
            .issue(
                "ghost@example.com",
                &[Authority::User],
                TokenKind::Access,
                Utc::now(),
                Duration::minutes(5),
            )
            .unwrap();
        assert_eq!(
            auth.authenticate(Some(&orphan.token)).unwrap_err().kind(),
            ErrorKind::InvalidToken
        );
    }
}
