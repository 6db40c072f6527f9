#![forbid(unsafe_code)]

//! Stack configuration.
//!
//! [`StackConfig`] is handed to [`UiStackBuilder`](crate::UiStackBuilder)
//! once at setup time and is read-only afterwards. Every panel owned by the
//! stack reads its animation trigger names and dialog defaults from it.
//!
//! With the `config-files` feature the config can be loaded from TOML or
//! JSON; missing fields fall back to [`StackConfig::default`] and the result
//! is validated before it is returned.

use panelstack_core::Rgba;
#[cfg(feature = "config-files")]
use panelstack_core::{ConfigError, config};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "config-files")]
use std::path::Path;

/// Default animator trigger played when a panel enters.
pub const DEFAULT_ENTER_TRIGGER: &str = "panel_enter";
/// Default animator trigger played when a panel exits.
pub const DEFAULT_EXIT_TRIGGER: &str = "panel_exit";

/// Stack-wide settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StackConfig {
    /// Animator trigger name for enter animations. Default: `panel_enter`.
    pub enter_trigger: String,
    /// Animator trigger name for exit animations. Default: `panel_exit`.
    pub exit_trigger: String,
    /// Colour of newly created dialog masks. Default: black at 50% alpha.
    pub mask_color: Rgba,
    /// Tapping a dialog mask closes the dialog above it. Default: true.
    pub close_dialog_on_mask_tap: bool,
    /// Activating or deactivating a dialog outside the stack API also
    /// toggles its mask and the panel beneath. Default: true.
    pub couple_dialog_visibility: bool,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            enter_trigger: DEFAULT_ENTER_TRIGGER.to_string(),
            exit_trigger: DEFAULT_EXIT_TRIGGER.to_string(),
            mask_color: Rgba::default(),
            close_dialog_on_mask_tap: true,
            couple_dialog_visibility: true,
        }
    }
}

impl StackConfig {
    /// Set the enter trigger name.
    #[must_use]
    pub fn enter_trigger(mut self, name: impl Into<String>) -> Self {
        self.enter_trigger = name.into();
        self
    }

    /// Set the exit trigger name.
    #[must_use]
    pub fn exit_trigger(mut self, name: impl Into<String>) -> Self {
        self.exit_trigger = name.into();
        self
    }

    /// Set the dialog mask colour.
    #[must_use]
    pub fn mask_color(mut self, color: Rgba) -> Self {
        self.mask_color = color;
        self
    }

    /// Enable or disable closing dialogs by tapping their mask.
    #[must_use]
    pub fn close_dialog_on_mask_tap(mut self, enabled: bool) -> Self {
        self.close_dialog_on_mask_tap = enabled;
        self
    }

    /// Enable or disable dialog visibility coupling.
    #[must_use]
    pub fn couple_dialog_visibility(mut self, enabled: bool) -> Self {
        self.couple_dialog_visibility = enabled;
        self
    }

    /// Validate all parameters.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.enter_trigger.trim().is_empty() {
            errors.push("enter_trigger must not be empty".into());
        }
        if self.exit_trigger.trim().is_empty() {
            errors.push("exit_trigger must not be empty".into());
        }
        if !self.enter_trigger.is_empty() && self.enter_trigger == self.exit_trigger {
            errors.push(format!(
                "enter_trigger and exit_trigger must differ, both are {:?}",
                self.enter_trigger
            ));
        }

        let c = self.mask_color;
        for (channel, value) in [("r", c.r), ("g", c.g), ("b", c.b), ("a", c.a)] {
            if !(0.0..=1.0).contains(&value) {
                errors.push(format!(
                    "mask_color.{channel} must be in [0, 1], got {value}"
                ));
            }
        }

        errors
    }

    /// Load from a TOML string.
    #[cfg(feature = "config-files")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        config::from_toml_str::<Self>(s)?.checked()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config-files")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        config::from_toml_file::<Self>(path)?.checked()
    }

    /// Load from a JSON string.
    #[cfg(feature = "config-files")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        config::from_json_str::<Self>(s)?.checked()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config-files")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        config::from_json_file::<Self>(path)?.checked()
    }

    #[cfg(feature = "config-files")]
    fn checked(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = StackConfig::default();
        assert_eq!(cfg.enter_trigger, "panel_enter");
        assert_eq!(cfg.exit_trigger, "panel_exit");
        assert_eq!(cfg.mask_color.a, 0.5);
        assert!(cfg.close_dialog_on_mask_tap);
        assert!(cfg.couple_dialog_visibility);
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn builder_chain() {
        let cfg = StackConfig::default()
            .enter_trigger("in")
            .exit_trigger("out")
            .mask_color(Rgba::rgb(1.0, 0.0, 0.0))
            .close_dialog_on_mask_tap(false)
            .couple_dialog_visibility(false);
        assert_eq!(cfg.enter_trigger, "in");
        assert_eq!(cfg.mask_color.r, 1.0);
        assert!(!cfg.close_dialog_on_mask_tap);
        assert!(!cfg.couple_dialog_visibility);
    }

    #[test]
    fn validate_reports_every_problem() {
        let mut cfg = StackConfig::default().enter_trigger("").exit_trigger(" ");
        cfg.mask_color.a = 1.5;
        let errors = cfg.validate();
        assert_eq!(errors.len(), 3, "{errors:?}");
        assert!(errors.iter().any(|e| e.contains("mask_color.a")));
    }

    #[test]
    fn identical_triggers_rejected() {
        let cfg = StackConfig::default().exit_trigger("panel_enter");
        assert_eq!(cfg.validate().len(), 1);
    }

    #[cfg(feature = "config-files")]
    #[test]
    fn toml_partial_document_uses_defaults() {
        let cfg = StackConfig::from_toml_str("close_dialog_on_mask_tap = false\n").expect("parse");
        assert!(!cfg.close_dialog_on_mask_tap);
        assert_eq!(cfg.enter_trigger, DEFAULT_ENTER_TRIGGER);
    }

    #[cfg(feature = "config-files")]
    #[test]
    fn json_invalid_values_rejected() {
        let err = StackConfig::from_json_str(r#"{ "enter_trigger": "" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref list) if list.len() == 1));
    }
}
