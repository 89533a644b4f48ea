//! Pipeline stages driven the way a host pipeline drives them.

use approx::assert_relative_eq;
use ndarray::array;
use reddening::config::{CorrectionConfig, LawConfig};
use reddening::laws::CardelliLaw;
use reddening::photometry::{PhotometricCorrection, SampledSpectrum, SpectralUnit};
use reddening::pipeline::{
    ExtinctionStage, Pipeline, PipelineError, PipelineItem, PipelineStage, ProcessOutcome,
    StageConfig,
};

fn spectrum() -> SampledSpectrum {
    SampledSpectrum::new(
        array![400.0, 500.0, 656.282],
        array![3.0, 2.0, 1.0],
        array![0.3, 0.2, 0.1],
        SpectralUnit::Nanometer,
    )
    .unwrap()
}

#[test]
fn test_feed_process_extract_returns_corrected_spectrum() {
    let _ = env_logger::builder().is_test(true).try_init();
    let law = CardelliLaw::milky_way(0.25).unwrap();
    let expected = law.correct_spectrum(&spectrum()).unwrap();

    let mut stage = ExtinctionStage::new(law);
    stage
        .feed(PipelineItem::Spectrum(spectrum()), "observation")
        .unwrap();
    assert_eq!(stage.process().unwrap(), ProcessOutcome::Processed);

    let corrected = stage.extract().unwrap().into_spectrum().unwrap();
    assert_eq!(corrected.unit(), SpectralUnit::Nanometer);
    for i in 0..3 {
        assert_relative_eq!(corrected.flux()[i], expected.flux()[i], max_relative = 1e-12);
    }
    assert!(corrected.flux()[0] > spectrum().flux()[0]);
}

#[test]
fn test_extract_reports_nothing_ready() {
    let mut stage = ExtinctionStage::new(CardelliLaw::milky_way(0.25).unwrap());
    assert!(stage.extract().is_none());

    stage.feed(PipelineItem::Spectrum(spectrum()), "a").unwrap();
    stage.process().unwrap();
    stage.clear();
    assert!(stage.extract().is_none());
}

#[test]
fn test_multiple_feeds_before_draining() {
    let mut stage = ExtinctionStage::new(CardelliLaw::milky_way(0.1).unwrap());
    for source in ["a", "b", "c"] {
        stage.feed(PipelineItem::Spectrum(spectrum()), source).unwrap();
    }
    let mut processed = 0;
    while stage.process().unwrap() == ProcessOutcome::Processed {
        processed += 1;
    }
    assert_eq!(processed, 3);

    let mut extracted = 0;
    while stage.extract().is_some() {
        extracted += 1;
    }
    assert_eq!(extracted, 3);
}

#[test]
fn test_wrong_payload_is_rejected() {
    let mut stage = ExtinctionStage::new(CardelliLaw::milky_way(0.1).unwrap());
    let err = stage
        .feed(
            PipelineItem::Photometry {
                band: "V".to_string(),
                magnitudes: array![10.0, 11.0],
            },
            "catalog",
        )
        .unwrap_err();
    assert!(matches!(err, PipelineError::UnrecognizedInput { .. }));
    assert!(err.to_string().contains("photometry"));
    assert!(stage.extract().is_none());
}

#[test]
fn test_retry_budget_from_config() {
    let config = CorrectionConfig {
        law: LawConfig::Cardelli { ebmv: 0.1, rv: 3.1 },
        stage: StageConfig { max_retries: 2 },
    };
    let mut stage = config.build_stage().unwrap();
    // 50 nm is beyond the far-UV end of the law
    let bad = SampledSpectrum::without_errors(array![50.0], array![1.0], SpectralUnit::Nanometer)
        .unwrap();
    stage.feed(PipelineItem::Spectrum(bad), "bad").unwrap();

    assert_eq!(
        stage.process().unwrap(),
        ProcessOutcome::Retrying { attempts: 1 }
    );
    let err = stage.process().unwrap_err();
    assert!(matches!(err, PipelineError::Processing { attempts: 2, .. }));
    assert_eq!(stage.process().unwrap(), ProcessOutcome::Idle);
}

#[test]
fn test_pipeline_chains_configured_stages() {
    let foreground = LawConfig::Cardelli { ebmv: 0.05, rv: 3.1 };
    let host = LawConfig::Smc {
        ebmv: Some(0.1),
        rv: None,
    };

    let mut pipeline = Pipeline::new();
    for config in [&foreground, &host] {
        let stage = ExtinctionStage::new(config.build().unwrap());
        pipeline.add_stage(Box::new(stage));
    }
    pipeline.push(PipelineItem::Spectrum(spectrum()), "obs").unwrap();
    let outputs = pipeline.run().unwrap();
    assert_eq!(outputs.len(), 1);

    let expected = host
        .build()
        .unwrap()
        .correct_spectrum(
            &foreground
                .build()
                .unwrap()
                .correct_spectrum(&spectrum())
                .unwrap(),
        )
        .unwrap();
    let out = outputs[0].clone().into_spectrum().unwrap();
    for i in 0..3 {
        assert_relative_eq!(out.flux()[i], expected.flux()[i], max_relative = 1e-12);
    }

    assert!(pipeline.run().unwrap().is_empty());
}

#[test]
fn test_corrected_spectra_are_kept_when_a_later_item_fails() {
    let _ = env_logger::builder().is_test(true).try_init();
    let foreground = CardelliLaw::milky_way(0.05).unwrap();
    let host = CardelliLaw::new(0.2, 4.0).unwrap();
    let expected = host
        .correct_spectrum(&foreground.correct_spectrum(&spectrum()).unwrap())
        .unwrap();

    let mut pipeline = Pipeline::new()
        .with_stage(ExtinctionStage::new(foreground))
        .with_stage(ExtinctionStage::with_config(
            host,
            StageConfig { max_retries: 1 },
        ));
    pipeline.push(PipelineItem::Spectrum(spectrum()), "good").unwrap();
    // 50 nm is beyond the far-UV end of the law
    let bad = SampledSpectrum::without_errors(array![50.0], array![1.0], SpectralUnit::Nanometer)
        .unwrap();
    pipeline.push(PipelineItem::Spectrum(bad), "bad").unwrap();

    let err = pipeline.run().unwrap_err();
    assert!(matches!(err, PipelineError::Processing { .. }));

    let outputs = pipeline.run().unwrap();
    assert_eq!(outputs.len(), 1);
    let out = outputs[0].clone().into_spectrum().unwrap();
    for i in 0..3 {
        assert_relative_eq!(out.flux()[i], expected.flux()[i], max_relative = 1e-12);
    }
    assert!(pipeline.run().unwrap().is_empty());
}
