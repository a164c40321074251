//! Scan session configuration.

use serde::Deserialize;

use crate::channel::ChannelContext;

/// Configuration shared by a scan session and its assigners.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Input (tuner source) the channels belong to.
    pub input_id: String,
    /// First display number handed out by the number cursors.
    pub initial_display_number: u32,
    /// First LCN handed out when a service has no usable LCN.
    pub lcn_overflow_start: u32,
    /// Display name used when a service name cannot be decoded.
    pub placeholder_name: String,
    /// Language picked out of multilingual service names (ISO 639-2).
    pub preferred_language: Option<String>,
    /// Prefix of the synthetic name given to analog channels.
    pub atv_name_prefix: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            input_id: "tuner0".to_string(),
            initial_display_number: 1,
            lcn_overflow_start: 900,
            placeholder_name: "Unknown".to_string(),
            preferred_language: None,
            atv_name_prefix: "ATV".to_string(),
        }
    }
}

impl ScanConfig {
    /// Create a default configuration for the given input.
    pub fn for_input(input_id: impl Into<String>) -> Self {
        Self {
            input_id: input_id.into(),
            ..Self::default()
        }
    }

    pub fn with_initial_display_number(mut self, number: u32) -> Self {
        self.initial_display_number = number;
        self
    }

    pub fn with_lcn_overflow_start(mut self, lcn: u32) -> Self {
        self.lcn_overflow_start = lcn;
        self
    }

    pub fn with_preferred_language(mut self, lang: impl Into<String>) -> Self {
        self.preferred_language = Some(lang.into());
        self
    }

    /// Factory inputs for a channel given the provisional `number`.
    pub fn channel_context(&self, number: u32) -> ChannelContext<'_> {
        ChannelContext {
            input_id: &self.input_id,
            number,
            placeholder_name: &self.placeholder_name,
            preferred_language: self.preferred_language.as_deref(),
            atv_name_prefix: &self.atv_name_prefix,
        }
    }
}
