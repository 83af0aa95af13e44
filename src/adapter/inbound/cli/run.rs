//! Command dispatch and the authorization gate in front of every service.

use tracing::debug;

use super::command::{Cli, Commands};
use super::{auth, exchange, listing, output, stock};
use crate::application::auth::{bearer_token, AuthService, Identity};
use crate::application::{authorize, Operation};
use crate::error::{Error, ErrorKind, Result};
use crate::infrastructure::bootstrap::{bootstrap, open_store, Services};
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::credential::PasswordHasher;
use crate::port::outbound::store::Store;

/// The caller behind one invocation: the token it presented, checked
/// against the auth service on demand.
pub struct Caller<'a, S, H> {
    auth: &'a AuthService<S, H>,
    token: Option<&'a str>,
}

impl<'a, S: Store, H: PasswordHasher> Caller<'a, S, H> {
    /// `raw` may be a bare token or an `Authorization` header value.
    pub fn new(auth: &'a AuthService<S, H>, raw: Option<&'a str>) -> Self {
        let token = raw.and_then(|raw| {
            let raw = raw.trim();
            if raw.starts_with("Bearer ") {
                bearer_token(raw)
            } else {
                (!raw.is_empty()).then_some(raw)
            }
        });
        Self { auth, token }
    }

    /// Resolve the caller without any authority check.
    ///
    /// # Errors
    /// Fails if a token was presented and does not verify.
    pub fn identify(&self) -> Result<Identity> {
        self.auth.authenticate(self.token)
    }

    /// Resolve the caller and check it may run `operation`.
    ///
    /// Public operations run as [`Identity::Anonymous`] without looking at
    /// the token, so a stale token never blocks them.
    ///
    /// # Errors
    /// Token errors from authentication, then `Unauthenticated` or
    /// `Forbidden` from the access policy.
    pub fn authorize(&self, operation: Operation) -> Result<Identity> {
        if operation.required_authority().is_none() {
            debug!(%operation, "Public operation");
            return Ok(Identity::Anonymous);
        }
        let identity = self.identify()?;
        let principal = authorize(&identity, operation)?;
        debug!(
            %operation,
            user = principal.map_or("anonymous", |p| p.email.as_str()),
            "Authorized"
        );
        Ok(identity)
    }
}

/// Run the parsed command against the configured database.
///
/// # Errors
/// Returns the first error raised while wiring or running the command.
pub fn execute(cli: &Cli, config: &Config) -> Result<()> {
    if let Commands::Migrate = cli.command {
        open_store(&config.database)?;
        output::success(&format!("Database {} is up to date", config.database.url));
        return Ok(());
    }

    let services = bootstrap(config)?;
    dispatch(&services, cli.token.as_deref(), &cli.command)
}

/// Route a command to its handler.
///
/// # Errors
/// Returns the handler's error.
pub fn dispatch<S: Store, H: PasswordHasher>(
    services: &Services<S, H>,
    token: Option<&str>,
    command: &Commands,
) -> Result<()> {
    let caller = Caller::new(&services.auth, token);
    match command {
        Commands::Migrate => {
            output::success("Database is up to date");
            Ok(())
        }
        Commands::Auth(command) => auth::execute(&services.auth, &caller, command),
        Commands::Stock(command) => stock::execute(&services.stocks, &caller, command),
        Commands::Exchange(command) => exchange::execute(&services.exchanges, &caller, command),
        Commands::Listing(command) => listing::execute(&services.listings, &caller, command),
    }
}

/// Process exit code for an error.
#[must_use]
pub fn exit_code(error: &Error) -> i32 {
    match error.kind() {
        ErrorKind::Internal => 1,
        ErrorKind::Validation => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::Duplicate | ErrorKind::Conflict => 4,
        ErrorKind::InvalidCredentials
        | ErrorKind::Expired
        | ErrorKind::InvalidToken
        | ErrorKind::Unauthenticated => 5,
        ErrorKind::Forbidden => 6,
    }
}
