use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Probability assumed for a transition or emission never seen in training.
pub const DEFAULT_FLOOR: f64 = 1e-10;

/// Decoding parameters.
///
/// Read from JSON, every field is optional:
///
/// ```json
/// { "floor": 1e-12, "fallback": "NN" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecoderConfig {
    /// Unseen-event probability, in `(0, 1]`.
    pub floor: f64,
    /// Tag used when no tag can be recovered. `None` selects the most frequent
    /// training tag.
    pub fallback: Option<String>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self { floor: DEFAULT_FLOOR, fallback: None }
    }
}

impl DecoderConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = File::open(path)?;
        let config: Self = serde_json::from_reader(BufReader::new(f))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_floor(mut self, floor: f64) -> Self {
        self.floor = floor;
        self
    }

    pub fn with_fallback(mut self, tag: impl Into<String>) -> Self {
        self.fallback = Some(tag.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.floor > 0.0 && self.floor <= 1.0) {
            return Err(Error::InvalidConfig(format!("floor must be in (0, 1], got {}", self.floor)));
        }
        if matches!(&self.fallback, Some(tag) if tag.trim().is_empty()) {
            return Err(Error::InvalidConfig("fallback tag must not be blank".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DecoderConfig::default();
        assert_eq!(config.floor, 1e-10);
        assert_eq!(config.fallback, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json() {
        let config: DecoderConfig = serde_json::from_str(r#"{"fallback": "NN"}"#).unwrap();
        assert_eq!(config, DecoderConfig::default().with_fallback("NN"));
        let config: DecoderConfig = serde_json::from_str(r#"{"floor": 1e-5}"#).unwrap();
        assert_eq!(config.floor, 1e-5);
        assert!(serde_json::from_str::<DecoderConfig>(r#"{"flor": 1e-5}"#).is_err());
    }

    #[test]
    fn rejects_bad_values() {
        for floor in [0.0, -1.0, 1.5, f64::NAN] {
            let config = DecoderConfig::default().with_floor(floor);
            assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))), "{floor}");
        }
        assert!(DecoderConfig::default().with_floor(1.0).validate().is_ok());
        assert!(DecoderConfig::default().with_fallback(" ").validate().is_err());
    }
}
