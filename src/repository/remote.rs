// file: src/repository/remote.rs
// description: credential and progress callbacks shared by clone, fetch and push
// reference: https://docs.rs/git2

use crate::config::CredentialsConfig;
use git2::{Cred, CredentialType, FetchOptions, RemoteCallbacks};
use tracing::debug;

/// libgit2 keeps asking for credentials while the remote rejects them.
const MAX_CREDENTIAL_ATTEMPTS: usize = 3;

pub fn callbacks(credentials: &CredentialsConfig) -> RemoteCallbacks<'_> {
    let mut callbacks = RemoteCallbacks::new();
    let mut attempts = 0usize;

    callbacks.credentials(move |url, username_from_url, allowed| {
        attempts += 1;
        if attempts > MAX_CREDENTIAL_ATTEMPTS {
            return Err(git2::Error::from_str(&format!(
                "authentication to {} failed after {} attempts",
                url, MAX_CREDENTIAL_ATTEMPTS
            )));
        }
        resolve_credentials(credentials, username_from_url, allowed)
    });

    callbacks.transfer_progress(|stats| {
        if stats.received_objects() == stats.total_objects() {
            debug!(
                "Resolving deltas {}/{}",
                stats.indexed_deltas(),
                stats.total_deltas()
            );
        } else if stats.total_objects() > 0 {
            debug!(
                "Received {}/{} objects",
                stats.received_objects(),
                stats.total_objects()
            );
        }
        true
    });

    callbacks.push_transfer_progress(|current, total, bytes| {
        debug!("Pushed {}/{} objects ({} bytes)", current, total, bytes);
    });

    callbacks
}

pub fn fetch_options(credentials: &CredentialsConfig) -> FetchOptions<'_> {
    let mut fetch_options = FetchOptions::new();
    fetch_options.remote_callbacks(callbacks(credentials));
    fetch_options
}

fn resolve_credentials(
    credentials: &CredentialsConfig,
    username_from_url: Option<&str>,
    allowed: CredentialType,
) -> Result<Cred, git2::Error> {
    let username = username_from_url
        .or(credentials.username.as_deref())
        .unwrap_or("git");

    if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
        if let Some(token) = credentials.token.as_deref() {
            let user = credentials.username.as_deref().unwrap_or(username);
            return Cred::userpass_plaintext(user, token);
        }
    }

    if allowed.contains(CredentialType::SSH_KEY) {
        return match credentials.ssh_key_path.as_deref() {
            Some(key) => Cred::ssh_key(username, None, key, credentials.ssh_passphrase.as_deref()),
            None => Cred::ssh_key_from_agent(username),
        };
    }

    if allowed.contains(CredentialType::USERNAME) {
        return Cred::username(username);
    }

    if allowed.contains(CredentialType::DEFAULT) {
        return Cred::default();
    }

    Err(git2::Error::from_str(
        "no configured credentials match what the remote accepts",
    ))
}
