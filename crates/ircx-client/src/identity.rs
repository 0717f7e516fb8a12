//! Identity resolution.
//!
//! Merges a network's stored identity, an optional identity profile and
//! per-call overrides into a fully-resolved network config.  Later steps
//! override earlier ones:
//!
//! 1. the network's own nick/alt-nick/realname/ident (bundled defaults
//!    when unset),
//! 2. the referenced profile (or the designated default profile), which
//!    only overwrites fields it actually fills in,
//! 3. caller-supplied overrides, where `name`/`email` compose into the
//!    realname.
//!
//! Pure transform: absent profiles fall through, nothing errors.

use uuid::Uuid;

use ircx_shared::constants::{DEFAULT_IDENT, DEFAULT_NICK, DEFAULT_REALNAME};
use ircx_shared::network::{
    IdentityOverrides, IdentityProfile, NetworkConfig, OperCredentials, SaslConfig,
};

pub fn resolve_identity(
    network: &NetworkConfig,
    profiles: &[IdentityProfile],
    default_profile: Option<&IdentityProfile>,
    selected_profile_id: Option<Uuid>,
    overrides: &IdentityOverrides,
) -> NetworkConfig {
    let mut resolved = network.clone();

    // 1. Network values, with bundled defaults for anything unset.
    if resolved.nick.is_empty() {
        resolved.nick = DEFAULT_NICK.to_string();
    }
    if resolved.alt_nick.is_empty() {
        resolved.alt_nick = format!("{}_", resolved.nick);
    }
    if resolved.realname.is_empty() {
        resolved.realname = DEFAULT_REALNAME.to_string();
    }
    if resolved.ident.is_empty() {
        resolved.ident = DEFAULT_IDENT.to_string();
    }

    // 2. Profile values, non-empty fields only.
    let wanted = selected_profile_id.or(network.identity_profile_id);
    let profile = wanted
        .and_then(|id| profiles.iter().find(|p| p.id == id))
        .or(default_profile);

    if let Some(profile) = profile {
        apply_profile(&mut resolved, profile);
    }

    // 3. Caller overrides.
    if let Some(ref nick) = overrides.nick {
        resolved.nick = nick.clone();
    }
    if let Some(ref alt_nick) = overrides.alt_nick {
        resolved.alt_nick = alt_nick.clone();
    }
    if let Some(ref ident) = overrides.ident {
        resolved.ident = ident.clone();
    }
    match (&overrides.name, &overrides.email) {
        (Some(name), Some(email)) => resolved.realname = format!("{name} <{email}>"),
        (Some(name), None) => resolved.realname = name.clone(),
        (None, Some(email)) => resolved.realname = format!("{} <{email}>", resolved.realname),
        (None, None) => {}
    }

    resolved
}

fn apply_profile(resolved: &mut NetworkConfig, profile: &IdentityProfile) {
    if !profile.nick.is_empty() {
        resolved.nick = profile.nick.clone();
    }
    if !profile.alt_nick.is_empty() {
        resolved.alt_nick = profile.alt_nick.clone();
    }
    if !profile.realname.is_empty() {
        resolved.realname = profile.realname.clone();
    }
    if !profile.ident.is_empty() {
        resolved.ident = profile.ident.clone();
    }
    if !profile.sasl_account.is_empty() {
        resolved.sasl = Some(SaslConfig {
            account: profile.sasl_account.clone(),
            password: profile.sasl_password.clone(),
        });
    }
    if !profile.nickserv_password.is_empty() {
        resolved.nickserv_password = Some(profile.nickserv_password.clone());
    }
    if !profile.oper_user.is_empty() {
        resolved.oper = Some(OperCredentials {
            user: profile.oper_user.clone(),
            password: profile.oper_password.clone(),
        });
    }
}
