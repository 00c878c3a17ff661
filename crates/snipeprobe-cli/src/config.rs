//! CLI configuration

use crate::commands::{ColorArg, ConfigSource};
use crate::error::CliResult;
use snipeprobe::ProbeConfig;

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Quiet - errors only
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - debug logs from snipeprobe
    Verbose,
    /// Debug - everything
    Debug,
}

impl Verbosity {
    /// From the `-q` flag and the `-v` count
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: u8) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, 1) => Self::Verbose,
            (false, _) => Self::Debug,
        }
    }

    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Level passed to `snipeprobe::logging::level_for`
    #[must_use]
    pub const fn as_level(self) -> i8 {
        match self {
            Self::Quiet => -1,
            Self::Normal => 0,
            Self::Verbose => 1,
            Self::Debug => 2,
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

impl ColorChoice {
    /// Should use colors based on output detection
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => std::io::IsTerminal::is_terminal(&std::io::stdout()),
        }
    }
}

/// Build the effective configuration from the process environment
pub fn load_config(source: &ConfigSource) -> CliResult<ProbeConfig> {
    load_config_with(source, |key| std::env::var(key).ok())
}

/// Build the effective configuration with an explicit variable source
pub fn load_config_with<F>(source: &ConfigSource, var: F) -> CliResult<ProbeConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let base = match &source.config {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config file");
            ProbeConfig::from_file(path)?
        }
        None => ProbeConfig::default(),
    };
    let mut config = base.apply_vars(var)?;

    if let Some(url) = &source.base_url {
        config.base_url.clone_from(url);
    }
    if let Some(model) = &source.model {
        config.model_name.clone_from(model);
    }
    if source.seed.is_some() {
        config.seed = source.seed;
    }
    if source.headed {
        config.browser = config.browser.with_headless(false);
    }
    if source.no_sandbox {
        config.browser = config.browser.with_no_sandbox();
    }
    if source.artifacts_dir.is_some() {
        config.artifacts_dir.clone_from(&source.artifacts_dir);
    }

    config.validate()?;
    Ok(config)
}
