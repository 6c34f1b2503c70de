//! End-to-end tests: trend table to corpus to artifacts to served predictions.

use approx::assert_relative_eq;
use chrono::NaiveDate;
use slang_lifespan::classify::{morphology_score, NeologismScorer, ScorerConfig};
use slang_lifespan::config::PipelineConfig;
use slang_lifespan::core::{LifetimeLabel, TimeSeries, TrendTable};
use slang_lifespan::detection::SeriesAnalysis;
use slang_lifespan::features::{DecayRateStrategy, FeatureExtractor, FeatureKind};
use slang_lifespan::labeling::{CorpusBuilder, LabelConfig, LifetimeLabeler};
use slang_lifespan::models::ModelArtifacts;
use slang_lifespan::pipeline::{Assessment, FeatureSource, LifetimeService};
use slang_lifespan::transform::Preprocessor;
use std::sync::Arc;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 1, 1).unwrap()
}

fn monthly(values: Vec<f64>) -> TimeSeries {
    TimeSeries::monthly(start(), values).unwrap()
}

/// Zero, a linear climb to `peak`, `hold` months at the peak, then silence.
fn lifecycle(rise: usize, hold: usize, peak: f64) -> Vec<f64> {
    let mut values = vec![0.0];
    values.extend((1..=rise).map(|i| peak * i as f64 / rise as f64));
    values.extend(std::iter::repeat(peak).take(hold));
    values.extend(std::iter::repeat(0.0).take(6));
    values
}

const TERMS: &[(&str, usize, usize, f64)] = &[
    ("킹받네", 1, 2, 100.0),
    ("갓생", 2, 5, 90.0),
    ("점메추", 3, 1, 80.0),
    ("어쩔티비", 1, 8, 100.0),
    ("오운완", 4, 3, 70.0),
    ("분좋카", 2, 0, 100.0),
    ("쿠쿠루삥뽕", 5, 6, 60.0),
    ("억까", 3, 10, 95.0),
    ("알잘딱깔센", 6, 2, 85.0),
];

fn table() -> TrendTable {
    let mut table = TrendTable::new();
    for &(word, rise, hold, peak) in TERMS {
        table
            .insert_series(&monthly(lifecycle(rise, hold, peak)).with_term(word))
            .unwrap();
    }
    // Runs to the end of the table index so it never dies.
    let mut still_rising = vec![0.0, 20.0, 50.0, 100.0, 90.0, 95.0, 92.0];
    still_rising.extend(vec![94.0; 13]);
    let still_rising = monthly(still_rising);
    table.insert_series(&still_rising.with_term("중꺾마")).unwrap();
    table
}

fn service(config: &PipelineConfig) -> LifetimeService {
    let corpus = CorpusBuilder::from_config(config)
        .build_from_table(&table())
        .unwrap();
    let artifacts = ModelArtifacts::fit(&corpus).unwrap();
    LifetimeService::new(config, Arc::new(artifacts)).unwrap()
}

#[test]
fn flat_series_is_dead_on_arrival() {
    let series = monthly(vec![0.0; 24]);
    let analysis =
        SeriesAnalysis::analyze(&series, &Preprocessor::default(), &Default::default()).unwrap();
    assert!(analysis.boundaries.is_dead_on_arrival());

    let labeler = LifetimeLabeler::new(LabelConfig {
        min_signal: 0.0,
        ..LabelConfig::default()
    });
    assert_eq!(labeler.label(&analysis), Some(LifetimeLabel::Months(0)));

    let features = FeatureExtractor::default().extract("무야호", &series).unwrap();
    assert_eq!(features.values(), &[3.0, 0.0, 0.0, 0.0]);

    let svc = service(&PipelineConfig::three_feature());
    assert_eq!(
        svc.assess("무야호", Some(&series)).unwrap(),
        Assessment::InsufficientData {
            word: "무야호".to_string()
        }
    );
}

#[test]
fn single_step_spike_dies_the_next_month() {
    let config = PipelineConfig::three_feature();
    let builder = CorpusBuilder::from_config(&config);
    let spike = monthly(vec![0.0, 0.0, 0.0, 100.0, 0.0, 0.0, 0.0, 0.0]);

    let row = builder.build_row("반짝", &spike).unwrap().unwrap();
    assert_eq!(row.label, LifetimeLabel::Months(1));
    assert_relative_eq!(row.features.get(FeatureKind::MaxRisingSlope).unwrap(), 100.0);
    assert_relative_eq!(row.features.get(FeatureKind::PeakValue).unwrap(), 100.0);

    let preprocessor = Preprocessor::new(config.preprocess.clone());
    let analysis = SeriesAnalysis::analyze(&spike, &preprocessor, &config.boundary).unwrap();
    assert_eq!(analysis.boundaries.rise_start, Some(3));
    assert_eq!(analysis.boundaries.peak.index, 3);
    assert_eq!(analysis.boundaries.death, Some(4));
}

#[test]
fn slow_decay_stays_ongoing_but_is_kept_for_lookup() {
    let config = PipelineConfig::four_feature();
    let values: Vec<f64> = (0..52)
        .map(|i| {
            if i <= 26 {
                4.0 * i as f64
            } else {
                104.0 - 1.5 * (i - 26) as f64
            }
        })
        .collect();
    let weekly = TimeSeries::weekly(start(), values).unwrap().with_term("롱런");

    let builder = CorpusBuilder::from_config(&config);
    let mut corpus = builder.build_from_table(&table()).unwrap();
    let ongoing = builder.build_row("롱런", &weekly).unwrap().unwrap();
    assert!(corpus.insert(ongoing).unwrap().is_none());

    let row = corpus.get("롱런").unwrap();
    assert_eq!(row.label, LifetimeLabel::Ongoing);
    assert!(corpus.labelled_rows().all(|r| r.word != "롱런"));

    let artifacts = ModelArtifacts::fit(&corpus).unwrap();
    assert!(artifacts.contains("롱런"));

    let svc = LifetimeService::new(&config, Arc::new(artifacts)).unwrap();
    for &(word, ..) in TERMS {
        if let Assessment::Predicted(report) = svc.assess(word, None).unwrap() {
            assert!(!report.neighbor_words.iter().any(|w| w == "롱런" || w == "중꺾마"));
        }
    }
}

#[test]
fn consonant_only_word_saturates_morphology() {
    assert_eq!(morphology_score("ㅋㅋㅋ"), 1.0);

    let score = NeologismScorer::new(ScorerConfig::default()).score("ㅋㅋㅋ", None);
    assert_eq!(score.subscores.morph, 1.0);
    assert!(score.final_score >= 0.0 && score.final_score <= 1.0);
}

#[test]
fn reference_word_gets_five_other_neighbours_in_order() {
    let svc = service(&PipelineConfig::three_feature());

    let Assessment::Predicted(report) = svc.assess("갓생", None).unwrap() else {
        panic!("expected a prediction");
    };
    assert_eq!(report.feature_source, FeatureSource::Reference);
    assert_eq!(report.neighbor_words.len(), 5);
    assert!(!report.neighbor_words.iter().any(|w| w == "갓생"));
    assert!(!report.neighbor_words.iter().any(|w| w == "중꺾마"));
    assert!(report
        .neighbor_distances
        .windows(2)
        .all(|pair| pair[0] <= pair[1]));
    assert!(report.neighbor_distances.iter().all(|&d| d > 0.0));
}

#[test]
fn reference_features_survive_the_scaler() {
    let config = PipelineConfig::three_feature();
    let corpus = CorpusBuilder::from_config(&config)
        .build_from_table(&table())
        .unwrap();
    let artifacts = Arc::new(ModelArtifacts::fit(&corpus).unwrap());
    let svc = LifetimeService::new(&config, artifacts).unwrap();

    let Assessment::Predicted(report) = svc.assess("억까", None).unwrap() else {
        panic!("expected a prediction");
    };
    let stored = corpus.get("억까").unwrap().features.values();
    for (a, b) in report.features.iter().zip(stored) {
        assert_relative_eq!(*a, *b, epsilon = 1e-9);
    }
}

#[test]
fn persisted_artifacts_serve_identically() {
    let config = PipelineConfig::four_feature();
    let corpus = CorpusBuilder::from_config(&config)
        .build_from_table(&table())
        .unwrap();
    let artifacts = ModelArtifacts::fit(&corpus).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("artifacts.json");
    artifacts.save(&path).unwrap();
    let loaded = ModelArtifacts::load(&path).unwrap();

    let fresh = LifetimeService::new(&config, Arc::new(artifacts)).unwrap();
    let reloaded = LifetimeService::new(&config, Arc::new(loaded)).unwrap();
    let live = monthly(lifecycle(2, 4, 88.0));

    assert_eq!(
        fresh.assess("새단어", Some(&live)).unwrap(),
        reloaded.assess("새단어", Some(&live)).unwrap()
    );
}

#[test]
fn mismatched_decay_strategy_is_refused() {
    let config = PipelineConfig::four_feature();
    let corpus = CorpusBuilder::from_config(&config)
        .build_from_table(&table())
        .unwrap();
    let artifacts = Arc::new(ModelArtifacts::fit(&corpus).unwrap());

    let mut other = config.clone();
    other.features.decay_strategy = DecayRateStrategy::MeanAfterPeak;
    let err = LifetimeService::new(&other, artifacts.clone()).unwrap_err();
    assert!(err.is_configuration());

    let three = PipelineConfig::three_feature();
    assert!(LifetimeService::new(&three, artifacts)
        .unwrap_err()
        .is_configuration());
}

#[test]
fn assessment_serializes_with_outcome_tag() {
    let svc = service(&PipelineConfig::three_feature());
    let json = serde_json::to_value(svc.assess("킹받네", None).unwrap()).unwrap();
    assert_eq!(json["outcome"], "predicted");
    assert_eq!(json["word"], "킹받네");
    assert!(json["neighbor_words"].is_array());

    let json = serde_json::to_value(svc.assess("모르는말", None).unwrap()).unwrap();
    assert_eq!(json["outcome"], "insufficient_data");
}
