//! Login command handler.

use dialoguer::Input;
use secrecy::SecretString;
use vendtrack_api::UserProfile;
use vendtrack_core::Session;

use crate::cli::{GlobalOpts, LoginArgs};
use crate::config::{self, ResolvedProfile};
use crate::error::CliError;
use crate::output::{self, Field};

use super::util;

fn profile_detail(p: &UserProfile) -> String {
    let name = [p.first_name.as_deref(), p.last_name.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    output::render_fields(&[
        Field::new("ID", p.id),
        Field::new("Username", &p.username),
        Field::new("Name", name),
        Field::new("Email", output::opt(p.email.as_ref())),
    ])
}

/// Password from env / keyring / config, prompting as a last resort.
fn password_for(resolved: &ResolvedProfile) -> Result<SecretString, CliError> {
    if let Ok(pw) = config::resolve_password(&resolved.profile, &resolved.name) {
        return Ok(pw);
    }
    let pw = rpassword::prompt_password("Password: ").map_err(util::prompt_err)?;
    if pw.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok(SecretString::from(pw))
}

pub async fn handle(
    resolved: &ResolvedProfile,
    args: &LoginArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let session = Session::new(resolved.anonymous_client_config()?)?;

    let username = match resolved.profile.username.clone() {
        Some(u) => u,
        None => Input::new()
            .with_prompt("Username")
            .interact_text()
            .map_err(util::prompt_err)?,
    };
    let password = password_for(resolved)?;

    let profile = session
        .login(&username, &password)
        .await
        .map_err(|e| match CliError::from(e) {
            CliError::AuthFailed { message, .. } => CliError::AuthFailed {
                profile: resolved.name.clone(),
                message,
            },
            other => other,
        })?;

    if args.save_password {
        match config::store_password(&resolved.name, &password) {
            Ok(()) => output::note(
                global,
                &format!("Password stored in system keyring for profile '{}'", resolved.name),
            ),
            Err(e) => output::warn(global, &format!("could not store password: {e}")),
        }
    }

    output::note(global, &format!("Logged in as {}", profile.username));
    let out = output::render_single(global.output, &profile, profile_detail, |p| {
        p.username.clone()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
