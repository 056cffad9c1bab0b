//! Session variant selection
//!
//! A run provisions desktop stack A, stack B, or both. The variant comes from
//! `--variant` when given; otherwise the user picks it from an interactive
//! menu, or from a numbered prompt when no terminal UI is available. Once
//! resolved it is cached and never changes for the rest of the run.

mod prompt;

use std::cell::OnceCell;
use std::fmt;
use std::io::IsTerminal;
use std::str::FromStr;

use crate::config::Settings;
use crate::error::{DeskforgeError, Result};

pub use prompt::{VariantOption, select_with_menu, select_with_prompt};

/// One of the two alternative desktop stacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stack {
    A,
    B,
}

impl Stack {
    pub fn as_str(self) -> &'static str {
        match self {
            Stack::A => "A",
            Stack::B => "B",
        }
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which stacks a run provisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    A,
    B,
    Both,
}

impl Variant {
    /// Every variant, in menu order
    pub const ALL: [Variant; 3] = [Variant::A, Variant::B, Variant::Both];

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::A => "A",
            Variant::B => "B",
            Variant::Both => "BOTH",
        }
    }

    /// Whether this variant requests `stack`
    pub fn wants(self, stack: Stack) -> bool {
        matches!(
            (self, stack),
            (Variant::A, Stack::A) | (Variant::B, Stack::B) | (Variant::Both, _)
        )
    }

    /// Requested stacks in A, B order
    pub fn stacks(self) -> Vec<Stack> {
        [Stack::A, Stack::B]
            .into_iter()
            .filter(|stack| self.wants(*stack))
            .collect()
    }

    /// Allowed flag values, for error messages and help text
    pub fn allowed() -> String {
        Self::ALL
            .iter()
            .map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = DeskforgeError;

    fn from_str(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| DeskforgeError::InvalidVariant {
                value: value.to_string(),
                allowed: Self::allowed(),
            })
    }
}

/// How to ask the user when no flag was given
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frontend {
    /// Arrow-key selection menu
    Menu,
    /// Numbered prompt on stdin/stdout
    Plain,
}

impl Frontend {
    /// Menu when both stdin and stdout are terminals
    pub fn detect() -> Self {
        if std::io::stdin().is_terminal() && std::io::stdout().is_terminal() {
            Frontend::Menu
        } else {
            Frontend::Plain
        }
    }
}

/// Resolves the variant once and hands out the cached value afterwards
#[derive(Debug, Default)]
pub struct VariantResolver {
    resolved: OnceCell<Variant>,
}

impl VariantResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve from the flag value, or ask through `frontend`
    pub fn resolve(
        &self,
        flag: Option<&str>,
        frontend: Frontend,
        settings: &Settings,
    ) -> Result<Variant> {
        if let Some(variant) = self.resolved.get() {
            return Ok(*variant);
        }

        let variant = match flag {
            Some(value) => value.parse()?,
            None => {
                let options = VariantOption::all(settings);
                match frontend {
                    Frontend::Menu => select_with_menu(&options)?,
                    Frontend::Plain => {
                        let stdin = std::io::stdin();
                        let mut input = stdin.lock();
                        let mut output = std::io::stdout();
                        select_with_prompt(&mut input, &mut output, &options)?
                    }
                }
            }
        };

        tracing::debug!(%variant, "variant resolved");
        Ok(*self.resolved.get_or_init(|| variant))
    }

    /// Variant resolved earlier in this run, if any
    #[cfg(test)]
    pub fn get(&self) -> Option<Variant> {
        self.resolved.get().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("a".parse::<Variant>().unwrap(), Variant::A);
        assert_eq!("B".parse::<Variant>().unwrap(), Variant::B);
        assert_eq!("both".parse::<Variant>().unwrap(), Variant::Both);
        assert_eq!(" BOTH ".parse::<Variant>().unwrap(), Variant::Both);
    }

    #[test]
    fn test_parse_rejects_unknown_value_naming_allowed_set() {
        let err = "wayland".parse::<Variant>().unwrap_err();
        match err {
            DeskforgeError::InvalidVariant { value, allowed } => {
                assert_eq!(value, "wayland");
                assert_eq!(allowed, "A, B, BOTH");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_wants() {
        assert!(Variant::A.wants(Stack::A));
        assert!(!Variant::A.wants(Stack::B));
        assert!(!Variant::B.wants(Stack::A));
        assert!(Variant::Both.wants(Stack::A));
        assert!(Variant::Both.wants(Stack::B));
        assert_eq!(Variant::Both.stacks(), vec![Stack::A, Stack::B]);
        assert_eq!(Variant::B.stacks(), vec![Stack::B]);
    }

    #[test]
    fn test_resolver_uses_flag_without_prompting() {
        let resolver = VariantResolver::new();
        let variant = resolver
            .resolve(Some("b"), Frontend::Menu, &Settings::default())
            .unwrap();

        assert_eq!(variant, Variant::B);
        assert_eq!(resolver.get(), Some(Variant::B));
    }

    #[test]
    fn test_resolver_caches_first_result() {
        let resolver = VariantResolver::new();
        resolver
            .resolve(Some("A"), Frontend::Plain, &Settings::default())
            .unwrap();

        // A later call, even with a different flag, returns the cached value
        let again = resolver
            .resolve(Some("BOTH"), Frontend::Plain, &Settings::default())
            .unwrap();
        assert_eq!(again, Variant::A);
    }

    #[test]
    fn test_resolver_invalid_flag_is_not_cached() {
        let resolver = VariantResolver::new();
        assert!(
            resolver
                .resolve(Some("C"), Frontend::Plain, &Settings::default())
                .is_err()
        );
        assert_eq!(resolver.get(), None);
    }
}
