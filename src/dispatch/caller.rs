//! Caller identity as seen by the executor chain.

use std::fmt;
use tracing::warn;

/// Display name the legacy host adapter reserves for the server console.
pub const DEFAULT_SENTINEL: &str = "CONSOLE";

/// Who is invoking a command.
///
/// The host adapter decides the variant at the boundary; policy decorators
/// match on the tag and never compare names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Caller {
    /// A player or other session-bound caller.
    Interactive { name: String },
    /// The console, a script, or any other caller without a session.
    NonInteractive,
}

impl Caller {
    pub fn interactive(name: impl Into<String>) -> Self {
        Self::Interactive { name: name.into() }
    }

    /// Classifies a caller by display name, treating `sentinel` as non-interactive.
    ///
    /// This mirrors hosts that only expose a display name. An interactive identity
    /// whose name equals the sentinel is indistinguishable from the console here;
    /// the match is case-sensitive and logged so collisions can be spotted.
    pub fn from_display_name(name: &str, sentinel: &str) -> Self {
        if name == sentinel {
            Self::NonInteractive
        } else {
            if name.eq_ignore_ascii_case(sentinel) {
                warn!(
                    name,
                    sentinel, "caller name differs from the sentinel only by case"
                );
            }
            Self::interactive(name)
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::Interactive { .. })
    }

    /// The interactive caller's name. The non-interactive caller has none.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Interactive { name } => Some(name),
            Self::NonInteractive => None,
        }
    }

    /// Inverse of [`Caller::from_display_name`]: the host-facing name, using
    /// `sentinel` for the non-interactive caller.
    pub fn display_name<'a>(&'a self, sentinel: &'a str) -> &'a str {
        self.name().unwrap_or(sentinel)
    }

    /// Short label for the caller kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Interactive { .. } => "interactive",
            Self::NonInteractive => "non-interactive",
        }
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interactive { name } => f.write_str(name),
            Self::NonInteractive => f.write_str(self.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_name_is_non_interactive() {
        let caller = Caller::from_display_name("CONSOLE", DEFAULT_SENTINEL);
        assert_eq!(caller, Caller::NonInteractive);
        assert!(!caller.is_interactive());
    }

    #[test]
    fn test_other_names_are_interactive() {
        let caller = Caller::from_display_name("Notch", DEFAULT_SENTINEL);
        assert_eq!(caller, Caller::interactive("Notch"));
        assert!(caller.is_interactive());
        assert_eq!(caller.name(), Some("Notch"));
        assert_eq!(caller.display_name(DEFAULT_SENTINEL), "Notch");
    }

    #[test]
    fn test_sentinel_match_is_case_sensitive() {
        let caller = Caller::from_display_name("console", DEFAULT_SENTINEL);
        assert!(caller.is_interactive());
    }

    #[test]
    fn test_custom_sentinel() {
        assert_eq!(
            Caller::from_display_name("@server", "@server"),
            Caller::NonInteractive
        );
        assert!(Caller::from_display_name("CONSOLE", "@server").is_interactive());
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(Caller::NonInteractive.kind(), "non-interactive");
        assert_eq!(Caller::interactive("a").kind(), "interactive");
        assert_eq!(Caller::NonInteractive.to_string(), "non-interactive");
        assert_eq!(Caller::interactive("Alex").to_string(), "Alex");
    }

    #[test]
    fn test_display_name_uses_configured_sentinel() {
        let console = Caller::from_display_name("@server", "@server");
        assert_eq!(console.name(), None);
        assert_eq!(console.display_name("@server"), "@server");
        let default_console = Caller::from_display_name(DEFAULT_SENTINEL, DEFAULT_SENTINEL);
        assert_eq!(default_console.display_name(DEFAULT_SENTINEL), "CONSOLE");
    }
}
