use std::{
    io::{
        stdout,
        Stdout,
    },
    ops::{
        Deref,
        DerefMut,
    },
};

use crossterm::{
    terminal::{
        disable_raw_mode,
        enable_raw_mode,
        EnterAlternateScreen,
        LeaveAlternateScreen,
    },
    ExecutableCommand,
};
use ratatui::{
    backend::{
        Backend,
        CrosstermBackend,
    },
    Terminal,
};

/// Owns the terminal while the interactive view is shown.
/// The alternate screen and raw mode are left again on drop, even when unwinding.
pub struct TerminalGuard<B: Backend> {
    inner: Terminal<B>,
}

impl<B: Backend> TerminalGuard<B> {
    pub fn setup(backend: B) -> anyhow::Result<Self> {
        stdout().execute(EnterAlternateScreen)?;
        enable_raw_mode()?;

        let mut inner = Terminal::new(backend)?;
        inner.clear()?;
        Ok(Self { inner })
    }
}

impl<B: Backend> Drop for TerminalGuard<B> {
    fn drop(&mut self) {
        if let Err(error) = disable_raw_mode() {
            log::warn!("Failed to disable raw mode: {}", error);
        }
        if let Err(error) = stdout().execute(LeaveAlternateScreen) {
            log::warn!("Failed to leave alternate screen: {}", error);
        }
    }
}

impl<B: Backend> Deref for TerminalGuard<B> {
    type Target = Terminal<B>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<B: Backend> DerefMut for TerminalGuard<B> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

pub fn setup() -> anyhow::Result<TerminalGuard<CrosstermBackend<Stdout>>> {
    TerminalGuard::setup(CrosstermBackend::new(stdout()))
}
