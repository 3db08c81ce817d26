use serde::{Deserialize, Serialize};

use crate::session::Identity;

/// Stored theme preference. `System` defers to the platform's dark-mode
/// hint, matching the original behavior when no preference was saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemePreference {
    pub fn is_dark(&self, system_dark: bool) -> bool {
        match self {
            ThemePreference::Light => false,
            ThemePreference::Dark => true,
            ThemePreference::System => system_dark,
        }
    }

    pub fn toggled(&self, system_dark: bool) -> ThemePreference {
        if self.is_dark(system_dark) {
            ThemePreference::Light
        } else {
            ThemePreference::Dark
        }
    }
}

/// Explicit per-session state the embedding view layer threads through
/// calls, instead of ambient global lookups.
#[derive(Debug, Clone, Default)]
pub struct AppContext {
    pub identity: Identity,
    pub theme: ThemePreference,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_defers_to_hint() {
        assert!(ThemePreference::System.is_dark(true));
        assert!(!ThemePreference::System.is_dark(false));
        assert!(ThemePreference::Dark.is_dark(false));
        assert!(!ThemePreference::Light.is_dark(true));
    }

    #[test]
    fn test_toggle_flips_resolved_theme() {
        assert_eq!(ThemePreference::System.toggled(false), ThemePreference::Dark);
        assert_eq!(ThemePreference::System.toggled(true), ThemePreference::Light);
        assert_eq!(ThemePreference::Dark.toggled(false), ThemePreference::Light);
    }
}
