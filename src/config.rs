//! Branch policy settings.
//!
//! Settings cover the defaults the engine falls back to when the shift
//! resolver has no assignment: the default working window and the
//! zone used when an employee profile carries no usable zone id. They
//! can be loaded from a YAML file or built from [`Settings::default`].

use std::fs;
use std::path::Path;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

fn default_shift_start() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).expect("09:00 is a valid time")
}

fn default_shift_end() -> NaiveTime {
    NaiveTime::from_hms_opt(18, 0, 0).expect("18:00 is a valid time")
}

fn default_timezone() -> String {
    "UTC".to_string()
}

/// Engine-wide policy defaults.
///
/// # Example file
///
/// ```yaml
/// default_shift_start: "09:30:00"
/// default_shift_end: "18:30:00"
/// default_timezone: "Asia/Dhaka"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Expected start time when no shift assignment exists.
    #[serde(default = "default_shift_start")]
    pub default_shift_start: NaiveTime,
    /// Expected end time when no shift assignment exists.
    #[serde(default = "default_shift_end")]
    pub default_shift_end: NaiveTime,
    /// Zone applied when an employee profile has an empty zone id.
    #[serde(default = "default_timezone")]
    pub default_timezone: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_shift_start: default_shift_start(),
            default_shift_end: default_shift_end(),
            default_timezone: default_timezone(),
        }
    }
}

impl Settings {
    /// Loads settings from a YAML file.
    ///
    /// Returns [`EngineError::ConfigNotFound`] when the file is missing
    /// and [`EngineError::ConfigParseError`] when it is not valid YAML
    /// for this shape. Fields absent from the file take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }
}
