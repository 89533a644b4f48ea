//! JSON configuration of extinction laws and correction stages
//!
//! A law is described by its kind in a `"law"` tag plus its parameters:
//!
//! ```json
//! { "law": "cardelli", "ebmv": 0.12, "rv": 3.1 }
//! { "law": "lmc" }
//! { "law": "fitzpatrick_massa", "ebmv": 0.2, "rv": 3.1,
//!   "coefficients": { "c1": -0.89, "c2": 0.998, "c3": 2.719, "c4": 0.4, "x0": 4.579, "gamma": 0.934 } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::functional::{LawFamily, DEFAULT_RV};
use crate::laws::fitzpatrick::{LMC_EBMV, LMC_RV, SMC_EBMV, SMC_RV};
use crate::laws::{
    CalzettiLaw, CardelliLaw, ExtinctionError, ExtinctionLaw, FitzpatrickMassaLaw, FmCoefficients,
};
use crate::pipeline::{ExtinctionStage, StageConfig};

/// Errors raised while loading or building a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ExtinctionError),
}

fn default_a0() -> f64 {
    1.0
}

fn default_rv() -> f64 {
    DEFAULT_RV
}

/// Serializable description of an extinction law
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "law", rename_all = "snake_case")]
pub enum LawConfig {
    Calzetti {
        #[serde(default = "default_a0")]
        a0: f64,
    },
    Cardelli {
        ebmv: f64,
        #[serde(default = "default_rv")]
        rv: f64,
    },
    FitzpatrickMassa {
        coefficients: FmCoefficients,
        ebmv: f64,
        #[serde(default = "default_rv")]
        rv: f64,
    },
    /// LMC average curve; omitted values take the curve's defaults
    Lmc {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ebmv: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rv: Option<f64>,
    },
    /// SMC bar curve; omitted values take the curve's defaults
    Smc {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ebmv: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rv: Option<f64>,
    },
}

impl LawConfig {
    /// Construct the described law
    pub fn build(&self) -> Result<Box<dyn ExtinctionLaw>, ConfigError> {
        let law: Box<dyn ExtinctionLaw> = match *self {
            LawConfig::Calzetti { a0 } => Box::new(CalzettiLaw::new(a0)),
            LawConfig::Cardelli { ebmv, rv } => Box::new(CardelliLaw::new(ebmv, rv)?),
            LawConfig::FitzpatrickMassa {
                coefficients,
                ebmv,
                rv,
            } => Box::new(FitzpatrickMassaLaw::new(coefficients, ebmv, rv)?),
            LawConfig::Lmc { ebmv, rv } => {
                LawFamily::Lmc.build(ebmv.unwrap_or(LMC_EBMV), rv.unwrap_or(LMC_RV))?
            }
            LawConfig::Smc { ebmv, rv } => {
                LawFamily::Smc.build(ebmv.unwrap_or(SMC_EBMV), rv.unwrap_or(SMC_RV))?
            }
        };
        Ok(law)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// A law together with the settings of the stage that applies it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionConfig {
    pub law: LawConfig,
    #[serde(default)]
    pub stage: StageConfig,
}

impl CorrectionConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Build a pipeline stage applying the configured law
    pub fn build_stage(&self) -> Result<ExtinctionStage<Box<dyn ExtinctionLaw>>, ConfigError> {
        Ok(ExtinctionStage::with_config(self.law.build()?, self.stage))
    }
}
