//! Typed view of a resolved DLWP HEALPix dataset config.
//!
//! Only shapes the fields; whether `nside` is a valid HEALPix resolution or `time_step` a
//! multiple of `data_time_step` is left to the dataset pipeline that consumes them.

use crate::error::ConfigError;
use crate::resolved::ResolvedConfig;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Dataset parameters as declared in a `data/*.yaml` config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetParams {
    #[serde(default)]
    pub src_directory: Option<String>,
    #[serde(default)]
    pub dst_directory: Option<String>,
    #[serde(default)]
    pub dataset_name: Option<String>,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub suffix: Option<String>,
    #[serde(default)]
    pub data_format: Option<String>,

    #[serde(default)]
    pub input_variables: Vec<String>,
    /// `null` means "same as the inputs".
    #[serde(default)]
    pub output_variables: Option<Vec<String>>,
    /// Constant fields, name -> source variable.
    #[serde(default)]
    pub constants: IndexMap<String, String>,

    #[serde(default)]
    pub input_time_dim: Option<i64>,
    #[serde(default)]
    pub output_time_dim: Option<i64>,
    #[serde(default)]
    pub data_time_step: Option<String>,
    #[serde(default)]
    pub time_step: Option<String>,
    #[serde(default)]
    pub gap: Option<String>,

    #[serde(default)]
    pub add_insolation: bool,
    #[serde(default)]
    pub nside: Option<i64>,
    #[serde(default)]
    pub cube_dim: Option<i64>,
    #[serde(default)]
    pub prebuilt_dataset: bool,

    /// Everything else (module, scaling, splits, couplings, ...), untouched.
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl DatasetParams {
    pub fn from_resolved(config: &ResolvedConfig) -> Result<Self, ConfigError> {
        config.deserialize()
    }

    /// Output variables, falling back to the inputs when none are declared.
    pub fn effective_output_variables(&self) -> &[String] {
        self.output_variables
            .as_deref()
            .unwrap_or(&self.input_variables)
    }
}
