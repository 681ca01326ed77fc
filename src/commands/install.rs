//! The install driver: distro gate, mode selection, privilege escalation,
//! required-program gate, then the application installers in order.
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};

use crate::cli::Cli;
use crate::distro::{DistroSpec, DistroTable};
use crate::error::GateError;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::Logger;
use crate::paths::display_relative_to_home;
use crate::platform;
use crate::prompt::{Prompter, TerminalPrompter};
use crate::resources::package::{
    REQUIRED_PROGRAMS, format_program_status, install_command_line, missing_programs,
};
use crate::tasks::{self, Context, InstallMode};

/// How the run proceeds after mode selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeDecision {
    /// Per-user install, continue in this process.
    Local,
    /// System-wide install, already running as root.
    Global { primary_user: Option<String> },
    /// Re-exec under sudo with `--global` (and the invoking user as primary).
    Escalate { primary_user: Option<String> },
}

/// Run the install command.
///
/// # Errors
///
/// Returns an error on any gating failure (unknown distro declined, missing
/// programs after an install attempt, declined escalation, invalid `--user`,
/// prompt abort) and when any task recorded a failure.
pub fn run(args: &Cli, log: &Logger) -> Result<()> {
    let executor = SystemExecutor;
    let prompter = TerminalPrompter::new(args.yes);

    let version = option_env!("HOMESET_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    log.info(&format!("homeset {version}"));

    let table = DistroTable::builtin()?;
    let distro_id = crate::distro::detect(&executor);
    check_distro(distro_id.as_deref(), &table, &prompter, log)?;
    let spec = distro_id.as_deref().and_then(|id| table.get(id));

    let decision = decide_mode(args, &executor, &prompter, log)?;
    let (mode, primary_user) = match decision {
        ModeDecision::Local => (InstallMode::User, None),
        ModeDecision::Global { primary_user } => (InstallMode::Global, primary_user),
        ModeDecision::Escalate { primary_user } => {
            log.info("Using sudo to become root...");
            return reexec_with_sudo(&escalation_args(primary_user.as_deref()));
        }
    };

    ensure_required_programs(spec, &executor, &prompter, log)?;

    let payload_root = resolve_payload_root(args.root.as_deref())?;
    let home = PathBuf::from(
        std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable is not set"))?,
    );

    let base_dir = mode.base_dir(&home);
    log.info(&format!(
        "Install path: \x1b[97m{}\x1b[0m",
        display_relative_to_home(&base_dir, &home)
    ));
    std::fs::create_dir_all(&base_dir)
        .with_context(|| format!("create: {}", base_dir.display()))?;

    // helper scripts are shared by several apps; refresh them up front
    crate::resources::fs::replace_dir(&payload_root.join("bin"), &base_dir.join("bin"), false)?;
    std::fs::create_dir_all(base_dir.join("etc"))
        .with_context(|| format!("create: {}", base_dir.join("etc").display()))?;

    let ctx = Context::new(
        mode,
        spec,
        payload_root,
        home,
        primary_user,
        &executor,
        &prompter,
        log,
    );
    for task in tasks::all_install_tasks() {
        tasks::execute(task.as_ref(), &ctx);
    }

    log.print_summary();
    let failures = log.failure_count();
    if failures > 0 {
        bail!("{failures} task(s) failed");
    }

    log.info("\x1b[92mAll done!\x1b[0m");
    log.info("\x1b[93mYou most likely need to login again for some of the changes to work.\x1b[0m");
    Ok(())
}

/// Gate on the detected distribution.
///
/// Unknown distros degrade (package install becomes manual) but the
/// operator must opt in.
fn check_distro(
    distro_id: Option<&str>,
    table: &DistroTable,
    prompter: &dyn Prompter,
    log: &Logger,
) -> Result<()> {
    match distro_id {
        Some(id) if table.contains(id) => {
            log.debug(&format!("detected distro: {id}"));
            Ok(())
        }
        _ => {
            let id = distro_id.unwrap_or("unknown");
            log.warn(&format!(
                "Unknown distro \x1b[31m{id}\x1b[0m; some automatisms may not work!"
            ));
            log.debug(&format!("supported: {}", table.ids().join(", ")));
            if prompter.confirm("Continue anyway?", Some(false))? {
                Ok(())
            } else {
                bail!(GateError::DistroDeclined(id.to_string()))
            }
        }
    }
}

/// Phase 1 of privilege handling: decide the install mode and whether a
/// re-exec is needed, without performing it.
fn decide_mode(
    args: &Cli,
    executor: &dyn Executor,
    prompter: &dyn Prompter,
    log: &Logger,
) -> Result<ModeDecision> {
    let is_root = platform::is_root(executor);

    if args.local {
        return Ok(ModeDecision::Local);
    }
    if args.global {
        if !is_root {
            bail!("global install requires root (re-run under sudo or choose --local)");
        }
        let primary_user = match args.user.as_deref() {
            Some(name) => Some(platform::validate_primary_user(name, executor)?.name),
            None => None,
        };
        return Ok(ModeDecision::Global { primary_user });
    }

    let username = platform::current_username(executor)?;
    let recommended_global = is_root || platform::in_admin_group(executor);
    print_mode_banner(&username, is_root, recommended_global, log);

    let global = choose_global(prompter, recommended_global)?;
    if !global {
        return Ok(ModeDecision::Local);
    }
    if !is_root {
        return Ok(ModeDecision::Escalate {
            primary_user: Some(username),
        });
    }

    let primary_user = prompt_primary_user(executor, prompter)?;
    Ok(ModeDecision::Global {
        primary_user: Some(primary_user),
    })
}

fn print_mode_banner(username: &str, is_root: bool, recommended_global: bool, log: &Logger) {
    log.info(&format!("Welcome, \x1b[36m{username}\x1b[0m!"));
    log.info("");
    log.info("If this is \x1b[32myour system\x1b[0m, a global install gives you the same");
    log.info("environment when switching to a root shell or other users.");
    log.info("If this is a \x1b[33mshared system\x1b[0m where you might not even have root");
    log.info("access, install locally, just for your own user.");
    log.info("");
    let why = if is_root {
        "you are \x1b[91mroot\x1b[0m"
    } else {
        "you most likely have \x1b[91msudo access\x1b[0m"
    };
    if recommended_global {
        log.info(&format!(
            "Recommendation: install \x1b[32mglobally\x1b[0m ({why})"
        ));
    } else {
        log.info("Recommendation: install \x1b[33mlocally\x1b[0m (unless you have sudo access)");
    }
    log.info("");
}

/// The two-step confirm chain: accept the recommendation, or flip to the
/// other mode, or abort.
fn choose_global(prompter: &dyn Prompter, recommended_global: bool) -> Result<bool> {
    if recommended_global {
        if prompter.confirm("Continue with \x1b[32mglobal\x1b[0m install?", Some(true))? {
            return Ok(true);
        }
        if prompter.confirm("Install \x1b[33mlocally\x1b[0m instead?", Some(true))? {
            return Ok(false);
        }
    } else {
        if prompter.confirm("Continue with \x1b[33mlocal\x1b[0m install?", Some(true))? {
            return Ok(false);
        }
        if prompter.confirm("Install \x1b[32mglobally\x1b[0m instead?", Some(true))? {
            return Ok(true);
        }
    }
    bail!(GateError::EscalationDeclined)
}

/// Ask root which regular account the install is for, validating the answer.
fn prompt_primary_user(executor: &dyn Executor, prompter: &dyn Prompter) -> Result<String> {
    let guess = platform::primary_user_guess(executor);
    loop {
        let name = prompter.input(
            "Please provide the name of your regular (non-root) user",
            guess.as_deref(),
        )?;
        match platform::validate_primary_user(&name, executor) {
            Ok(record) => return Ok(record.name),
            Err(e) => println!("{e:#}"),
        }
    }
}

/// Phase 2 argument vector for the sudo re-exec.
#[must_use]
pub fn escalation_args(primary_user: Option<&str>) -> Vec<String> {
    let mut args = vec!["--global".to_string()];
    if let Some(user) = primary_user {
        args.push("--user".to_string());
        args.push(user.to_string());
    }
    args
}

/// Replace this process with `sudo -E <self> <args>`.
fn reexec_with_sudo(args: &[String]) -> Result<()> {
    use std::os::unix::process::CommandExt as _;

    let exe = std::env::current_exe().context("locate own executable")?;
    let mut cmd = std::process::Command::new("sudo");
    cmd.arg("-E").arg(exe).args(args);
    // exec only returns on failure
    let err = cmd.exec();
    Err(err).context("sudo failed")
}

/// Verify the required tools are present, attempting one install when any
/// are missing. A bounded loop, not recursion: probe, install, re-probe.
fn ensure_required_programs(
    spec: Option<&DistroSpec>,
    executor: &dyn Executor,
    prompter: &dyn Prompter,
    log: &Logger,
) -> Result<()> {
    for attempt in 0..2 {
        let missing = missing_programs(REQUIRED_PROGRAMS, executor);
        log.info(&format!(
            "Required packages: {}",
            format_program_status(REQUIRED_PROGRAMS, &missing)
        ));
        if missing.is_empty() {
            return Ok(());
        }
        if attempt == 0 {
            install_missing(spec, &missing, executor, prompter, log)?;
        }
    }
    let missing = missing_programs(REQUIRED_PROGRAMS, executor);
    bail!(GateError::ProgramsMissing(
        missing.iter().map(ToString::to_string).collect()
    ))
}

/// Install the missing tools, or walk the operator through doing it by hand
/// when the distro is unknown or we lack the privileges.
fn install_missing(
    spec: Option<&DistroSpec>,
    missing: &[&str],
    executor: &dyn Executor,
    prompter: &dyn Prompter,
    log: &Logger,
) -> Result<()> {
    let Some(spec) = spec else {
        log.info("Please install the following packages:");
        for program in missing {
            log.info(&format!(" - \x1b[97m{program}\x1b[0m"));
        }
        prompter.wait("once you installed them")?;
        return Ok(());
    };

    let cmdline = install_command_line(spec, missing);
    if platform::is_root(executor) {
        log.info("The following command will be used to install the missing packages:");
        log.info(&format!("    \x1b[97m{cmdline}\x1b[0m"));
        prompter.wait("to start the installation")?;
        let command = spec.install_command(missing);
        if let Some((program, rest)) = command.split_first() {
            let args: Vec<&str> = rest.iter().map(String::as_str).collect();
            let result = executor.run_interactive(program, &args)?;
            if !result.success {
                log.warn("non-zero exit code; installation likely failed");
            }
        }
    } else {
        log.info("Run the following command as root to install missing packages:");
        log.info(&format!("    \x1b[97m{cmdline}\x1b[0m"));
        prompter.wait("once you installed them")?;
    }
    Ok(())
}

/// Whether `dir` looks like the shipped payload directory.
fn is_payload_dir(dir: &Path) -> bool {
    dir.join("etc").is_dir() && dir.join("bin").is_dir()
}

/// Resolve the directory holding the shipped payload (`etc/`, `bin/`,
/// `dconf/`).
///
/// Checked in order: `--root`, `$HOMESET_ROOT`, a `payload/` directory next
/// to (or above) the executable, `payload/` under the current directory.
///
/// # Errors
///
/// Returns an error if no candidate contains the payload markers.
pub fn resolve_payload_root(cli_root: Option<&Path>) -> Result<PathBuf> {
    if let Some(root) = cli_root {
        if is_payload_dir(root) {
            return Ok(root.to_path_buf());
        }
        bail!("--root {} does not contain the payload", root.display());
    }

    if let Ok(root) = std::env::var("HOMESET_ROOT") {
        let root = PathBuf::from(root);
        if is_payload_dir(&root) {
            return Ok(root);
        }
        bail!("HOMESET_ROOT {} does not contain the payload", root.display());
    }

    if let Ok(exe) = std::env::current_exe()
        && let Some(mut dir) = exe.parent()
    {
        // binary lives in target/{debug,release}/ during development and
        // next to payload/ when deployed
        for _ in 0..4 {
            let candidate = dir.join("payload");
            if is_payload_dir(&candidate) {
                return Ok(candidate);
            }
            match dir.parent() {
                Some(parent) => dir = parent,
                None => break,
            }
        }
    }

    let cwd = std::env::current_dir()?;
    let candidate = cwd.join("payload");
    if is_payload_dir(&candidate) {
        return Ok(candidate);
    }

    bail!("cannot locate the payload directory; use --root or set HOMESET_ROOT")
}
