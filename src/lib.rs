//! Personal environment installer for Linux.
//!
//! Detects the host distribution, verifies the required tools (git, zsh,
//! tmux, vim), and deploys a curated shell/editor/multiplexer configuration
//! either system-wide or for a single user. Config files are provisioned
//! idempotently: canonical copies under the tool's private directory,
//! symlinks at the paths the applications read, and untouched per-user
//! override files.
//!
//! The public API is organised into four layers:
//!
//! - **[`template`]** — `@@token@@` placeholder substitution
//! - **[`resources`]** — idempotent provisioning primitives (managed files,
//!   loader patches, program probes)
//! - **[`tasks`]** — per-application installers wired to resources
//! - **[`commands`]** — the top-level install driver

pub mod cli;
pub mod commands;
pub mod distro;
pub mod error;
pub mod exec;
pub mod logging;
pub mod paths;
pub mod platform;
pub mod prompt;
pub mod resources;
pub mod tasks;
pub mod template;
