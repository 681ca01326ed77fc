//! Default login shell configuration.
use anyhow::Result;

use crate::platform;

use super::{Context, Task, TaskResult};

/// Switch login shells to zsh for the invoking and primary users.
#[derive(Debug)]
pub struct ConfigureShell;

const ZSH: &str = "/bin/zsh";

impl ConfigureShell {
    /// Change `user`'s login shell to zsh, preferring `usermod` when running
    /// as root and `chsh` for the invoking user otherwise. Failures degrade
    /// to printing the manual command.
    fn update_shell(ctx: &Context<'_>, user: &str, current_user: &str) -> Result<()> {
        if let Some(record) = platform::lookup_user(user, ctx.executor)?
            && record.shell == ZSH
        {
            ctx.log.debug(&format!("{user} already uses zsh"));
            return Ok(());
        }

        if platform::is_root(ctx.executor) {
            ctx.log
                .info(&format!("Updating shell to zsh for \x1b[97m{user}\x1b[0m"));
            let result = ctx
                .executor
                .run_interactive("usermod", &["-s", ZSH, user])?;
            if result.success {
                return Ok(());
            }
        } else if user == current_user && ctx.executor.which("chsh") {
            ctx.log.info(&format!("Updating shell to zsh for {user} using chsh"));
            ctx.log.info("You may need to enter your password");
            let result = ctx.executor.run_interactive("chsh", &["-s", ZSH])?;
            if result.success {
                return Ok(());
            }
        }

        ctx.log.warn("Could not update shell");
        ctx.log.info(&format!(
            "Run \x1b[97musermod -s {ZSH} {user}\x1b[0m as root to change it manually"
        ));
        Ok(())
    }
}

impl Task for ConfigureShell {
    fn name(&self) -> &str {
        "default shell"
    }

    fn should_run(&self, _ctx: &Context<'_>) -> bool {
        true
    }

    fn run(&self, ctx: &Context<'_>) -> Result<TaskResult> {
        let current = platform::current_username(ctx.executor)?;
        Self::update_shell(ctx, &current, &current)?;
        if let Some(primary) = ctx.primary_user.as_deref()
            && primary != current
        {
            Self::update_shell(ctx, primary, &current)?;
        }
        Ok(TaskResult::Ok)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::exec::test_helpers::MockExecutor;
    use crate::tasks::test_helpers::TestEnv;

    #[test]
    fn already_zsh_runs_no_commands_beyond_lookup() {
        let mut env = TestEnv::user_mode();
        env.executor = MockExecutor::with_responses(&[
            (true, "alice\n"),                                     // id -un
            (true, "alice:x:1000:1000::/home/alice:/bin/zsh\n"),   // getent passwd
        ]);
        let ctx = env.ctx();

        assert_eq!(ConfigureShell.run(&ctx).unwrap(), TaskResult::Ok);
        let calls = env.executor.calls.borrow();
        assert_eq!(calls.len(), 2, "no shell change command expected: {calls:?}");
    }

    #[test]
    fn root_uses_usermod() {
        let mut env = TestEnv::user_mode();
        env.executor = MockExecutor::with_responses(&[
            (true, "root\n"),                                  // id -un
            (true, "root:x:0:0:root:/root:/bin/bash\n"),       // getent passwd
            (true, "0\n"),                                     // id -u (is_root)
            (true, ""),                                        // usermod
        ]);
        let ctx = env.ctx();

        assert_eq!(ConfigureShell.run(&ctx).unwrap(), TaskResult::Ok);
        let calls = env.executor.calls.borrow();
        assert_eq!(calls[3], "usermod -s /bin/zsh root");
    }

    #[test]
    fn non_root_uses_chsh_for_own_account() {
        let mut env = TestEnv::user_mode();
        env.executor = MockExecutor::with_responses(&[
            (true, "alice\n"),                                    // id -un
            (true, "alice:x:1000:1000::/home/alice:/bin/bash\n"), // getent passwd
            (true, "1000\n"),                                     // id -u (is_root)
            (true, ""),                                           // chsh
        ])
        .with_which(true);
        let ctx = env.ctx();

        assert_eq!(ConfigureShell.run(&ctx).unwrap(), TaskResult::Ok);
        let calls = env.executor.calls.borrow();
        assert_eq!(calls[3], "chsh -s /bin/zsh");
    }

    #[test]
    fn primary_user_also_updated_when_different() {
        let mut env = TestEnv::user_mode();
        env.primary_user = Some("alice".to_string());
        env.executor = MockExecutor::with_responses(&[
            (true, "root\n"),                                     // id -un
            (true, "root:x:0:0:root:/root:/bin/zsh\n"),           // getent (root ok)
            (true, "alice:x:1000:1000::/home/alice:/bin/bash\n"), // getent alice
            (true, "0\n"),                                        // id -u
            (true, ""),                                           // usermod alice
        ]);
        let ctx = env.ctx();

        assert_eq!(ConfigureShell.run(&ctx).unwrap(), TaskResult::Ok);
        let calls = env.executor.calls.borrow();
        assert_eq!(calls[4], "usermod -s /bin/zsh alice");
    }
}
