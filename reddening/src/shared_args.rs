use crate::config::{ConfigError, LawConfig};
use crate::functional::DEFAULT_RV;
use crate::laws::ExtinctionLaw;
use crate::photometry::bands::BandSpec;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Parse a band name, Balmer line name or wavelength in angstroms (e.g. "V", "Ha", "6563")
pub fn parse_band_or_wavelength(s: &str) -> Result<BandSpec, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Band must not be empty".to_string());
    }
    match s.parse::<f64>() {
        Ok(wavelength) if wavelength > 0.0 && wavelength.is_finite() => {
            Ok(BandSpec::Wavelength(wavelength))
        }
        Ok(wavelength) => Err(format!("Wavelength must be positive, got {}", wavelength)),
        Err(_) => Ok(BandSpec::Named(s.to_string())),
    }
}

/// Built-in extinction laws selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LawModel {
    /// Cardelli, Clayton & Mathis 1989 Milky Way law
    Ccm,
    /// Fitzpatrick-Massa curve for the LMC average
    Lmc,
    /// Fitzpatrick-Massa curve for the SMC bar
    Smc,
    /// Calzetti starburst attenuation
    Calzetti,
}

impl std::fmt::Display for LawModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LawModel::Ccm => write!(f, "ccm"),
            LawModel::Lmc => write!(f, "lmc"),
            LawModel::Smc => write!(f, "smc"),
            LawModel::Calzetti => write!(f, "calzetti"),
        }
    }
}

/// A built-in law or a JSON law configuration file
#[derive(Debug, Clone, PartialEq)]
pub enum LawArg {
    Model(LawModel),
    File(PathBuf),
}

impl std::str::FromStr for LawArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match LawModel::from_str(s, true) {
            Ok(model) => Ok(LawArg::Model(model)),
            Err(_) if s.ends_with(".json") => Ok(LawArg::File(PathBuf::from(s))),
            Err(_) => Err(format!(
                "Unknown law '{}', expected ccm, lmc, smc, calzetti or a .json configuration",
                s
            )),
        }
    }
}

impl std::fmt::Display for LawArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LawArg::Model(model) => write!(f, "{}", model),
            LawArg::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Law selection arguments shared by the `deredden` subcommands
#[derive(Parser, Debug, Clone)]
pub struct SharedLawArgs {
    /// Extinction law: ccm, lmc, smc, calzetti or a path to a JSON law configuration
    #[arg(long, default_value = "ccm")]
    pub law: LawArg,

    /// Color excess E(B-V) for the built-in color excess laws
    #[arg(long)]
    pub ebmv: Option<f64>,

    /// Total-to-selective extinction ratio Rv for the built-in color excess laws
    #[arg(long)]
    pub rv: Option<f64>,

    /// Normalization A0 for the Calzetti law
    #[arg(long)]
    pub a0: Option<f64>,
}

impl SharedLawArgs {
    /// Law configuration described by the arguments
    ///
    /// Values given on the command line do not override a configuration file.
    pub fn law_config(&self) -> Result<LawConfig, ConfigError> {
        match &self.law {
            LawArg::File(path) => LawConfig::load_from_file(path),
            LawArg::Model(LawModel::Ccm) => Ok(LawConfig::Cardelli {
                ebmv: self.ebmv.unwrap_or(1.0),
                rv: self.rv.unwrap_or(DEFAULT_RV),
            }),
            LawArg::Model(LawModel::Lmc) => Ok(LawConfig::Lmc {
                ebmv: self.ebmv,
                rv: self.rv,
            }),
            LawArg::Model(LawModel::Smc) => Ok(LawConfig::Smc {
                ebmv: self.ebmv,
                rv: self.rv,
            }),
            LawArg::Model(LawModel::Calzetti) => Ok(LawConfig::Calzetti {
                a0: self.a0.unwrap_or(1.0),
            }),
        }
    }

    pub fn build_law(&self) -> Result<Box<dyn ExtinctionLaw>, ConfigError> {
        self.law_config()?.build()
    }
}
