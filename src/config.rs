use serde::{Deserialize, Serialize};

use crate::RuxError;

/// Options driving the decoding of a SoundFont bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Samples recorded below this rate are upsampled by doubling until they reach it.
    ///
    /// Should match the output rate of the consuming audio backend.
    pub target_sample_rate: u32,
}

impl ParseOptions {
    pub const DEFAULT_TARGET_SAMPLE_RATE: u32 = 22_050;

    /// Highest accepted target sample rate
    pub const MAX_TARGET_SAMPLE_RATE: u32 = 384_000;

    pub const fn with_target_sample_rate(mut self, target_sample_rate: u32) -> Self {
        self.target_sample_rate = target_sample_rate;
        self
    }

    /// Read options from a JSON document, missing fields take their default value.
    pub fn from_json(json: &str) -> Result<Self, RuxError> {
        let options: Self = serde_json::from_str(json).map_err(|err| {
            RuxError::ConfigError(format!("Could not read parse options {err:}"))
        })?;
        options.validate()?;
        Ok(options)
    }

    /// Check the options before decoding, 0 disables upsampling.
    pub fn validate(&self) -> Result<(), RuxError> {
        if self.target_sample_rate > Self::MAX_TARGET_SAMPLE_RATE {
            return Err(RuxError::ConfigError(format!(
                "target sample rate {} Hz above the {} Hz limit",
                self.target_sample_rate,
                Self::MAX_TARGET_SAMPLE_RATE
            )));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, RuxError> {
        serde_json::to_string_pretty(self).map_err(|err| {
            RuxError::ConfigError(format!("Could not write parse options {err:}"))
        })
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            target_sample_rate: Self::DEFAULT_TARGET_SAMPLE_RATE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_target_rate() {
        assert_eq!(ParseOptions::default().target_sample_rate, 22_050);
        assert_eq!(
            ParseOptions::default()
                .with_target_sample_rate(44_100)
                .target_sample_rate,
            44_100
        );
    }

    #[test]
    fn test_from_json() {
        let options = ParseOptions::from_json(r#"{"target_sample_rate": 48000}"#).unwrap();
        assert_eq!(options.target_sample_rate, 48_000);

        let options = ParseOptions::from_json("{}").unwrap();
        assert_eq!(options, ParseOptions::default());
    }

    #[test]
    fn test_from_invalid_json() {
        let err = ParseOptions::from_json(r#"{"target_sample_rate": "fast"}"#).unwrap_err();
        assert!(matches!(err, RuxError::ConfigError(_)), "{err}");
    }

    #[test]
    fn test_reject_target_rate_above_limit() {
        let err = ParseOptions::from_json(r#"{"target_sample_rate": 4294967295}"#).unwrap_err();
        assert!(matches!(err, RuxError::ConfigError(_)), "{err}");

        let options = ParseOptions::default().with_target_sample_rate(384_001);
        assert!(matches!(options.validate(), Err(RuxError::ConfigError(_))));

        let options = ParseOptions::default().with_target_sample_rate(384_000);
        assert_eq!(options.validate(), Ok(()));
        assert_eq!(ParseOptions::default().with_target_sample_rate(0).validate(), Ok(()));
    }

    #[test]
    fn test_json_round_trip() {
        let options = ParseOptions::default().with_target_sample_rate(32_000);
        let json = options.to_json().unwrap();
        assert_eq!(ParseOptions::from_json(&json).unwrap(), options);
    }
}
