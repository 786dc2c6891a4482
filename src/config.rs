//! Physical sheet configuration.
//!
//! All dimensions are in inches. The grid shape is fixed by the label stock and
//! is not part of [`PrintConfig`].

use core::fmt;
use serde::{Deserialize, Serialize};

/// Label rows per sheet.
pub const LABEL_ROWS: usize = 10;
/// Label columns per sheet.
pub const LABEL_COLUMNS: usize = 3;
/// Sheet capacity.
pub const LABELS_PER_PAGE: usize = LABEL_ROWS * LABEL_COLUMNS;

/// Label stock dimensions used by geometry resolution.
///
/// Field names serialize in camelCase so configs saved by the settings form
/// load unchanged. Missing fields fall back to [`PrintConfig::default`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrintConfig {
    /// Width of one label.
    pub label_width: f32,
    /// Height of one label (and of one grid row).
    pub label_height: f32,
    /// Distance from the top of the page to the top of the first row.
    pub page_padding_top: f32,
    /// Distance from the left of the page to the left of the first column.
    pub page_padding_left: f32,
    /// Horizontal gap between columns. Rows have no gap.
    pub column_gap: f32,
}

impl PrintConfig {
    /// Defaults for 30-up 2.625" x 1" address label stock.
    pub const fn stock_defaults() -> Self {
        Self {
            label_width: 2.625,
            label_height: 1.0,
            page_padding_top: 0.5,
            page_padding_left: 0.1875,
            column_gap: 0.125,
        }
    }

    /// Restore every dimension to [`PrintConfig::stock_defaults`].
    pub fn reset(&mut self) {
        *self = Self::stock_defaults();
    }

    /// Check that the dimensions describe a usable grid.
    ///
    /// Label width and height must be finite and greater than zero. Paddings
    /// and the column gap must be finite and not negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("labelWidth", self.label_width),
            ("labelHeight", self.label_height),
        ];
        let non_negative = [
            ("pagePaddingTop", self.page_padding_top),
            ("pagePaddingLeft", self.page_padding_left),
            ("columnGap", self.column_gap),
        ];
        for (field, value) in positive.into_iter().chain(non_negative) {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field });
            }
        }
        for (field, value) in positive {
            if value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        for (field, value) in non_negative {
            if value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }
        Ok(())
    }

    /// Decode and validate a persisted configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        log::debug!("loaded print config: {:?}", config);
        Ok(config)
    }

    /// Encode for persistence.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self::stock_defaults()
    }
}

/// Configuration load/validation error.
#[derive(Debug)]
pub enum ConfigError {
    /// Dimension is NaN or infinite.
    NotFinite { field: &'static str },
    /// Label size is zero or negative.
    NotPositive { field: &'static str, value: f32 },
    /// Padding or gap is negative.
    Negative { field: &'static str, value: f32 },
    /// Persisted payload is not valid config JSON.
    Json(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFinite { field } => write!(f, "{} must be a finite number", field),
            Self::NotPositive { field, value } => {
                write!(f, "{} must be greater than zero (got {})", field, value)
            }
            Self::Negative { field, value } => {
                write!(f, "{} must not be negative (got {})", field, value)
            }
            Self::Json(err) => write!(f, "invalid print config json: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
