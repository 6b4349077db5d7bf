//! # Output Styling
//!
//! Whether gee paints its output, and the handful of styles the progress
//! view and the final report share.
//!
//! The decision is made once per invocation by [`OutputConfig::resolve`]
//! from the `--color` choice, the environment and whether stdout is a
//! terminal:
//!
//! | Input                         | Effect                  |
//! |-------------------------------|-------------------------|
//! | `--color always` / `never`    | wins over everything    |
//! | `NO_COLOR` set (even empty)   | off                     |
//! | `CLICOLOR=0`                  | off                     |
//! | `CLICOLOR_FORCE` non-zero     | on, even without a TTY  |
//! | `TERM=dumb`                   | off                     |
//! | otherwise                     | on when stdout is a TTY |
//!
//! Every styled fragment is forced on or off from the `OutputConfig` it
//! was rendered with rather than from `console`'s global switch, so
//! rendering is deterministic under test.

use std::env;
use std::fmt;
use std::str::FromStr;

use console::{Style, StyledObject};

/// The `--color` flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            other => Err(format!(
                "invalid color choice '{}', expected always, never or auto",
                other
            )),
        }
    }
}

impl fmt::Display for ColorChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColorChoice::Auto => "auto",
            ColorChoice::Always => "always",
            ColorChoice::Never => "never",
        })
    }
}

/// Whether output is painted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl OutputConfig {
    /// Decide from the process environment and the real stdout.
    pub fn detect(choice: ColorChoice) -> Self {
        Self::resolve(
            choice,
            |key| env::var(key).ok(),
            console::Term::stdout().features().colors_supported(),
        )
    }

    /// Decide from `choice`, an environment lookup and whether the
    /// terminal supports colors.
    pub fn resolve<E>(choice: ColorChoice, var: E, terminal_colors: bool) -> Self
    where
        E: Fn(&str) -> Option<String>,
    {
        let use_color = match choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                if var("NO_COLOR").is_some() || var("CLICOLOR").as_deref() == Some("0") {
                    false
                } else if var("CLICOLOR_FORCE").is_some_and(|v| !v.is_empty() && v != "0") {
                    true
                } else if var("TERM").as_deref() == Some("dumb") {
                    false
                } else {
                    terminal_colors
                }
            }
        };
        Self { use_color }
    }

    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    pub fn without_color() -> Self {
        Self { use_color: false }
    }

    /// Apply `style` to `text`, or leave it plain when colors are off.
    pub fn paint<D>(&self, style: &Style, text: D) -> StyledObject<D> {
        style.apply_to(text).force_styling(self.use_color)
    }

    /// Repository names.
    pub fn repo_name<D>(&self, text: D) -> StyledObject<D> {
        self.paint(&Style::new().bold().white(), text)
    }

    /// Command labels and branch names.
    pub fn command<D>(&self, text: D) -> StyledObject<D> {
        self.paint(&Style::new().bold().color256(245), text)
    }

    pub fn dim<D>(&self, text: D) -> StyledObject<D> {
        self.paint(&Style::new().color256(245), text)
    }

    pub fn success<D>(&self, text: D) -> StyledObject<D> {
        self.paint(&Style::new().green(), text)
    }

    pub fn error<D>(&self, text: D) -> StyledObject<D> {
        self.paint(&Style::new().red(), text)
    }

    pub fn warning<D>(&self, text: D) -> StyledObject<D> {
        self.paint(&Style::new().yellow(), text)
    }

    /// Result box borders: red for failures, dark grey otherwise.
    pub fn border<D>(&self, text: D, failed: bool) -> StyledObject<D> {
        if failed {
            self.error(text)
        } else {
            self.paint(&Style::new().color256(238), text)
        }
    }

    pub fn symbol_success(&self) -> String {
        self.paint(&Style::new().bold().green(), "✓").to_string()
    }

    pub fn symbol_error(&self) -> String {
        self.paint(&Style::new().bold().red(), "✗").to_string()
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::detect(ColorChoice::Auto)
    }
}

/// `fancy` when colors are on, `plain` otherwise.
///
/// ```
/// use gee::output::{emoji, OutputConfig};
///
/// assert_eq!(emoji(&OutputConfig::without_color(), "✅", "*"), "*");
/// ```
pub fn emoji<'a>(config: &OutputConfig, fancy: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        fancy
    } else {
        plain
    }
}
