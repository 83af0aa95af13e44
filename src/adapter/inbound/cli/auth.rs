//! Handlers for `stockex auth`.

use dialoguer::theme::ColorfulTheme;
use dialoguer::Password;
use serde_json::json;

use super::command::AuthCommand;
use super::output;
use super::run::Caller;
use crate::application::auth::{AuthService, IssuedToken, Session};
use crate::domain::user::{Credentials, Registration, User};
use crate::error::Result;
use crate::port::outbound::credential::PasswordHasher;
use crate::port::outbound::store::Store;

fn prompt_password(confirm: bool) -> Result<String> {
    let theme = ColorfulTheme::default();
    let prompt = Password::with_theme(&theme).with_prompt("Password");
    let password = if confirm {
        prompt
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()?
    } else {
        prompt.interact()?
    };
    Ok(password)
}

fn render_user(user: &User) {
    output::field("ID", user.id);
    output::field("Name", format!("{} {}", user.first_name, user.last_name));
    output::field("Email", &user.email);
    let authorities: Vec<&str> = user.authorities.iter().map(|a| a.as_str()).collect();
    output::field("Roles", authorities.join(", "));
}

fn render_token(label: &str, token: &IssuedToken) {
    output::field(label, &token.token);
    output::field("Expires", token.expires_at.to_rfc3339());
}

fn render_session(session: &Session) {
    render_user(&session.user);
    render_token("Access", &session.access);
    render_token("Refresh", &session.refresh);
    output::hint("pass the access token with --token or STOCKEX_TOKEN");
}

/// Execute an auth subcommand.
///
/// # Errors
/// Returns validation, credential and token errors.
pub fn execute<S: Store, H: PasswordHasher>(
    service: &AuthService<S, H>,
    caller: &Caller<'_, S, H>,
    command: &AuthCommand,
) -> Result<()> {
    match command {
        AuthCommand::Register(args) => {
            let password = match &args.password {
                Some(password) => password.clone(),
                None => prompt_password(true)?,
            };
            let registration =
                Registration::try_new(&args.first_name, &args.last_name, &args.email, &password)?;
            let user = service.register(&registration)?;
            output::success(&format!("Registered {}", user.email));
            output::result("user", &user, render_user)
        }
        AuthCommand::Login(args) => {
            let password = match &args.password {
                Some(password) => password.clone(),
                None => prompt_password(false)?,
            };
            let session = service.login(&Credentials::try_new(&args.email, &password)?)?;
            output::result("session", &session, render_session)
        }
        AuthCommand::Refresh(args) => {
            let access = service.refresh(args.refresh_token.trim())?;
            output::result("token", &access, |token| render_token("Access", token))
        }
        AuthCommand::Whoami => {
            let identity = caller.identify()?;
            match identity.principal() {
                Some(principal) => output::result("principal", principal, |principal| {
                    output::field("User", principal.user_id);
                    output::field("Email", &principal.email);
                    let authorities: Vec<&str> =
                        principal.authorities.iter().map(|a| a.as_str()).collect();
                    output::field("Roles", authorities.join(", "));
                }),
                None => output::result("principal", &json!(null), |_| {
                    output::note("anonymous (no token)");
                }),
            }
        }
    }
}
