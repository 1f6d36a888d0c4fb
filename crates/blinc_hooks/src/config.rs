//! Hooks runtime configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Configuration for a [`HooksRuntime`](crate::HooksRuntime).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HooksConfig {
    /// Maximum number of replay passes per render before aborting.
    pub re_render_limit: u32,
    /// Whether to log rules-of-hooks diagnostics (dependency shape changes).
    pub dev_warnings: bool,
    /// Whether `use_layout_effect` logs that it cannot run in a single pass.
    pub warn_on_layout_effect: bool,
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl HooksConfig {
    /// Replay limit used by [`HooksConfig::standard`].
    pub const DEFAULT_RE_RENDER_LIMIT: u32 = 25;

    /// Standard configuration with diagnostics enabled.
    pub fn standard() -> Self {
        Self {
            re_render_limit: Self::DEFAULT_RE_RENDER_LIMIT,
            dev_warnings: true,
            warn_on_layout_effect: true,
        }
    }

    /// Production configuration with no diagnostics.
    pub fn quiet() -> Self {
        Self {
            re_render_limit: Self::DEFAULT_RE_RENDER_LIMIT,
            dev_warnings: false,
            warn_on_layout_effect: false,
        }
    }

    /// Testing configuration: diagnostics on, small replay limit so runaway
    /// update cycles fail fast.
    pub fn testing() -> Self {
        Self {
            re_render_limit: 5,
            dev_warnings: true,
            warn_on_layout_effect: true,
        }
    }

    /// Parse a configuration from TOML. Missing keys take standard values.
    ///
    /// ```rust
    /// use blinc_hooks::HooksConfig;
    ///
    /// let config = HooksConfig::from_toml_str("re_render_limit = 10").unwrap();
    /// assert_eq!(config.re_render_limit, 10);
    /// assert!(config.dev_warnings);
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Set the replay limit.
    pub fn with_re_render_limit(mut self, limit: u32) -> Self {
        self.re_render_limit = limit;
        self
    }

    /// Enable or disable rules-of-hooks diagnostics.
    pub fn with_dev_warnings(mut self, enabled: bool) -> Self {
        self.dev_warnings = enabled;
        self
    }

    /// Enable or disable the layout-effect warning.
    pub fn with_layout_effect_warning(mut self, enabled: bool) -> Self {
        self.warn_on_layout_effect = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HookError;

    #[test]
    fn test_presets() {
        assert_eq!(HooksConfig::default(), HooksConfig::standard());
        assert_eq!(HooksConfig::standard().re_render_limit, 25);
        assert!(!HooksConfig::quiet().dev_warnings);
        assert!(HooksConfig::testing().re_render_limit < 25);
    }

    #[test]
    fn test_builders() {
        let config = HooksConfig::quiet()
            .with_re_render_limit(3)
            .with_dev_warnings(true)
            .with_layout_effect_warning(true);

        assert_eq!(config.re_render_limit, 3);
        assert!(config.dev_warnings);
        assert!(config.warn_on_layout_effect);
    }

    #[test]
    fn test_from_toml() {
        let config = HooksConfig::from_toml_str(
            "re_render_limit = 50\ndev_warnings = false\nwarn_on_layout_effect = false\n",
        )
        .unwrap();

        assert_eq!(config, HooksConfig::quiet().with_re_render_limit(50));
    }

    #[test]
    fn test_from_toml_empty_uses_defaults() {
        assert_eq!(HooksConfig::from_toml_str("").unwrap(), HooksConfig::standard());
    }

    #[test]
    fn test_from_toml_invalid() {
        assert!(matches!(
            HooksConfig::from_toml_str("re_render_limit = \"many\""),
            Err(HookError::Config(_))
        ));
    }
}
