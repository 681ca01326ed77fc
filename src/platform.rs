//! Host account introspection.
//!
//! Everything here shells out to `id` / `getent` rather than binding libc:
//! the installer already treats the host system as a set of opaque
//! collaborator commands, and keeping the queries on the [`Executor`] seam
//! makes them scriptable in tests.
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};

use crate::exec::Executor;

/// Groups whose membership suggests the operator can become root.
const ADMIN_GROUPS: &[&str] = &["wheel", "sudo", "admin"];

/// Shells that mark an account as not usable for login.
const NO_LOGIN_SHELLS: &[&str] = &["/bin/false", "/sbin/nologin", "/usr/sbin/nologin"];

/// A passwd entry for a local account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub name: String,
    pub uid: u32,
    pub home: PathBuf,
    pub shell: String,
}

impl UserRecord {
    /// Parse a `getent passwd` line (`name:x:uid:gid:gecos:home:shell`).
    fn parse(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.trim().split(':').collect();
        let (name, uid, home, shell) = match fields.as_slice() {
            [name, _, uid, _, _, home, shell] => (*name, *uid, *home, *shell),
            _ => return None,
        };
        Some(Self {
            name: name.to_string(),
            uid: uid.parse().ok()?,
            home: PathBuf::from(home),
            shell: shell.to_string(),
        })
    }

    /// Whether this account's shell permits logins.
    #[must_use]
    pub fn has_login_shell(&self) -> bool {
        !self.shell.is_empty() && !NO_LOGIN_SHELLS.contains(&self.shell.as_str())
    }
}

/// The effective uid of this process.
///
/// # Errors
///
/// Returns an error if `id -u` cannot be run or produces garbage.
pub fn effective_uid(executor: &dyn Executor) -> Result<u32> {
    let result = executor.run("id", &["-u"])?;
    result
        .stdout
        .trim()
        .parse()
        .with_context(|| format!("unexpected `id -u` output: {}", result.stdout.trim()))
}

/// Whether this process runs as root.
#[must_use]
pub fn is_root(executor: &dyn Executor) -> bool {
    effective_uid(executor).map(|uid| uid == 0).unwrap_or(false)
}

/// The login name of the effective user.
///
/// # Errors
///
/// Returns an error if `id -un` fails.
pub fn current_username(executor: &dyn Executor) -> Result<String> {
    let result = executor.run("id", &["-un"])?;
    Ok(result.stdout.trim().to_string())
}

/// Whether the effective user belongs to a group that usually grants sudo.
#[must_use]
pub fn in_admin_group(executor: &dyn Executor) -> bool {
    executor.run_unchecked("id", &["-Gn"]).is_ok_and(|result| {
        result.success
            && result
                .stdout
                .split_whitespace()
                .any(|g| ADMIN_GROUPS.contains(&g))
    })
}

/// Look up a local account by name or uid string.
///
/// # Errors
///
/// Returns an error only if `getent` itself cannot be spawned; an unknown
/// account is `Ok(None)`.
pub fn lookup_user(key: &str, executor: &dyn Executor) -> Result<Option<UserRecord>> {
    let result = executor.run_unchecked("getent", &["passwd", key])?;
    if !result.success {
        return Ok(None);
    }
    Ok(result.stdout.lines().next().and_then(UserRecord::parse))
}

/// Validate a `--user` argument: the account must exist, must not be root,
/// and must have a login shell.
///
/// # Errors
///
/// Returns a [`GateError::InvalidUser`](crate::error::GateError::InvalidUser)
/// describing which requirement failed.
pub fn validate_primary_user(name: &str, executor: &dyn Executor) -> Result<UserRecord> {
    let invalid = |reason: &str| crate::error::GateError::InvalidUser {
        name: name.to_string(),
        reason: reason.to_string(),
    };
    let Some(record) = lookup_user(name, executor)? else {
        bail!(invalid("no such user"));
    };
    if record.uid == 0 {
        bail!(invalid("this user is root"));
    }
    if !record.has_login_shell() {
        bail!(invalid("this user has no shell"));
    }
    Ok(record)
}

/// Guess the primary (non-root) user of the system.
///
/// Prefers `$SUDO_USER`; otherwise, if exactly one account owns a directory
/// under `/home`, that account is the guess.
#[must_use]
pub fn primary_user_guess(executor: &dyn Executor) -> Option<String> {
    if let Ok(user) = std::env::var("SUDO_USER")
        && !user.is_empty()
    {
        return Some(user);
    }
    single_home_owner(Path::new("/home"), executor)
}

fn single_home_owner(home_root: &Path, executor: &dyn Executor) -> Option<String> {
    use std::os::unix::fs::MetadataExt as _;

    let entries = std::fs::read_dir(home_root).ok()?;
    let mut uids: Vec<u32> = entries
        .filter_map(std::result::Result::ok)
        .filter(|e| e.path().is_dir())
        .filter_map(|e| e.metadata().ok().map(|m| m.uid()))
        .collect();
    uids.sort_unstable();
    uids.dedup();

    let mut users: Vec<String> = uids
        .into_iter()
        .filter_map(|uid| lookup_user(&uid.to_string(), executor).ok().flatten())
        .map(|record| record.name)
        .collect();
    users.sort_unstable();
    users.dedup();

    match users.as_slice() {
        [single] => Some(single.clone()),
        _ => None,
    }
}
