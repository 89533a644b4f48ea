//! Command line extinction corrections
//!
//! Corrects line fluxes, estimates E(B−V) from Balmer decrements and
//! calibrates a law's normalization from observed flux ratios.
//!
//! ```text
//! deredden flux --law ccm --ebmv 0.1 --line Ha 1.0e-15
//! deredden extinction --law lmc --band V --band B
//! deredden ebmv --ratio 4.1 --transition Hab
//! deredden calibrate --law ccm --ratio 4.1 --ratio 3.9 --transition Hab
//! ```

use clap::{Parser, Subcommand};
use log::info;
use ndarray::ArrayView1;
use reddening::calibration::{ExpectedRatio, FluxRatioCalibrate, Reducer};
use reddening::functional::{
    a_lambda_from_flux_ratio, ebmv_from_flux_ratio, resolve_wavelength, DEFAULT_RV,
};
use reddening::laws::ExtinctionLaw;
use reddening::photometry::bands::BandSpec;
use reddening::photometry::lines::{case_b_ratio, LineSpec};
use reddening::photometry::PhotometricCorrection;
use reddening::shared_args::{parse_band_or_wavelength, SharedLawArgs};

#[derive(Parser, Debug)]
#[command(
    name = "deredden",
    about = "Interstellar extinction corrections and calibration",
    long_about = None
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Correct a line flux for extinction
    Flux {
        #[command(flatten)]
        law: SharedLawArgs,

        /// Line name (Ha, Hb, Hg, Hd, He) or wavelength in angstroms
        #[arg(long, default_value = "Ha")]
        line: String,

        /// Observed flux
        flux: f64,
    },

    /// Print the extinction in magnitudes at bands or wavelengths
    Extinction {
        #[command(flatten)]
        law: SharedLawArgs,

        /// Band name, Balmer line name or wavelength in angstroms (repeatable)
        #[arg(long = "band", value_parser = parse_band_or_wavelength, required = true)]
        bands: Vec<BandSpec>,
    },

    /// Estimate E(B-V) from observed flux ratios with the Milky Way law
    Ebmv {
        /// Observed flux ratio F1/F2 (repeatable)
        #[arg(long = "ratio", required = true)]
        ratios: Vec<f64>,

        /// Case B transition of the ratio, e.g. Hab for Halpha/Hbeta
        #[arg(long, default_value = "Hab")]
        transition: String,

        /// Total-to-selective extinction ratio
        #[arg(long, default_value_t = DEFAULT_RV)]
        rv: f64,

        /// Tolerance on E(B-V)
        #[arg(long, default_value_t = 1e-4)]
        tolerance: f64,

        /// Report the extinction at this band instead of E(B-V)
        #[arg(long, value_parser = parse_band_or_wavelength)]
        band: Option<BandSpec>,
    },

    /// Fit a law's normalization to observed flux ratios
    Calibrate {
        #[command(flatten)]
        law: SharedLawArgs,

        /// Observed flux ratio F1/F2 (repeatable)
        #[arg(long = "ratio", required = true)]
        ratios: Vec<f64>,

        /// Case B transition of the ratios
        #[arg(long, default_value = "Hab")]
        transition: String,

        /// Ignore ratios that give no finite estimate
        #[arg(long, default_value_t = false)]
        finite_only: bool,
    },
}

fn line_spec(line: &str) -> LineSpec {
    match line.parse::<f64>() {
        Ok(wavelength) => LineSpec::Wavelength(wavelength),
        Err(_) => LineSpec::Named(line.to_string()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::Flux { law, line, flux } => {
            let extinction = law.build_law()?;
            info!("Correcting {} flux with {}", line, extinction.name());
            let corrected = extinction.correct_flux(flux, line_spec(&line))?;
            println!("{:.6e}", corrected);
        }
        Command::Extinction { law, bands } => {
            let extinction = law.build_law()?;
            let wavelengths = bands
                .iter()
                .map(resolve_wavelength)
                .collect::<Result<Vec<_>, _>>()?;
            let values = extinction.evaluate(ArrayView1::from(wavelengths.as_slice()))?;
            for (band, value) in bands.iter().zip(values.iter()) {
                let label = match band {
                    BandSpec::Named(name) => name.clone(),
                    BandSpec::Wavelength(wavelength) => format!("{} Å", wavelength),
                };
                println!("{:>10}  {:.4}", label, value);
            }
        }
        Command::Ebmv {
            ratios,
            transition,
            rv,
            tolerance,
            band,
        } => {
            let expected = case_b_ratio(&transition)?;
            let values = match band {
                Some(band) => a_lambda_from_flux_ratio(&ratios, &expected, band, rv, tolerance)?,
                None => ebmv_from_flux_ratio(&ratios, &expected, rv, tolerance)?,
            };
            for (ratio, value) in ratios.iter().zip(values.iter()) {
                println!("{:.4}  {:.4}", ratio, value);
            }
        }
        Command::Calibrate {
            law,
            ratios,
            transition,
            finite_only,
        } => {
            let mut extinction = law.build_law()?;
            let reducer = if finite_only {
                Reducer::FiniteOnly
            } else {
                Reducer::Identity
            };
            let result = extinction.calibrate_from_flux_ratio(
                &ratios,
                &[ExpectedRatio::Transition(transition)],
                None,
                &reducer,
            )?;
            println!("Law:           {}", extinction.name());
            println!("Normalization: {:.6}", result.normalization);
            println!("Dispersion:    {:.6}", result.dispersion);
            println!("Estimates:     {}", result.estimates.len());
        }
    }

    Ok(())
}
