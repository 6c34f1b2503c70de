//! Quickstart example demonstrating basic usage of slang-lifespan.
//!
//! Run with: cargo run --example quickstart

use chrono::NaiveDate;
use slang_lifespan::classify::{NeologismScorer, StaticDictionary};
use slang_lifespan::config::PipelineConfig;
use slang_lifespan::core::{TimeSeries, TrendTable};
use slang_lifespan::labeling::CorpusBuilder;
use slang_lifespan::logging::init_tracing;
use slang_lifespan::models::{evaluate, train_test_split, ModelArtifacts};
use slang_lifespan::pipeline::{Assessment, LifetimeService};
use std::sync::Arc;

/// Rise over `rise` months to `peak`, hold, then fade out over `fade` months.
fn lifecycle(rise: usize, hold: usize, fade: usize, peak: f64) -> Vec<f64> {
    let mut values = vec![0.0, 0.0];
    values.extend((1..=rise).map(|i| peak * i as f64 / rise as f64));
    values.extend(std::iter::repeat(peak).take(hold));
    values.extend((1..=fade).map(|i| peak * (1.0 - i as f64 / fade as f64)));
    values.extend(std::iter::repeat(0.0).take(4));
    values
}

fn main() {
    init_tracing("slang_lifespan=info").unwrap();
    println!("=== slang-lifespan Quickstart ===\n");

    // 1. Build a trend table of historical terms
    let start = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
    let history = [
        ("킹받네", 2, 3, 2, 100.0),
        ("갓생", 3, 8, 4, 90.0),
        ("점메추", 1, 1, 1, 75.0),
        ("어쩔티비", 2, 5, 3, 100.0),
        ("오운완", 4, 2, 5, 80.0),
        ("분좋카", 1, 0, 2, 95.0),
        ("억까", 3, 12, 6, 85.0),
        ("알잘딱깔센", 5, 4, 3, 70.0),
        ("스불재", 2, 2, 2, 60.0),
        ("꾸안꾸", 4, 10, 8, 90.0),
        ("중꺾마", 2, 20, 0, 100.0),
    ];

    let mut table = TrendTable::new();
    for (word, rise, hold, fade, peak) in history {
        let series = TimeSeries::monthly(start, lifecycle(rise, hold, fade, peak))
            .unwrap()
            .with_term(word);
        table.insert_series(&series).unwrap();
    }
    println!("Trend table: {} terms over {} months", table.terms().count(), table.len());

    // 2. Label lifetimes and extract features
    let config = PipelineConfig::three_feature();
    let corpus = CorpusBuilder::from_config(&config)
        .build_from_table(&table)
        .unwrap();

    println!("\n--- Training corpus ({}) ---", corpus.schema().describe());
    for row in corpus.rows() {
        println!("  {:<8} {:>8}  {:?}", row.word, row.label.to_string(), row.features.values());
    }

    // 3. Hold-out evaluation
    println!("\n--- Hold-out evaluation (k = {}) ---", config.knn.k);
    let (train, test) = train_test_split(corpus.rows(), 0.3, 42).unwrap();
    let report = evaluate(&train, &test, corpus.decay_strategy(), &config.knn).unwrap();
    println!(
        "train={} test={} MAE={:.2} RMSE={:.2}",
        report.n_train, report.n_test, report.metrics.mae, report.metrics.rmse
    );

    // 4. Fit artifacts and serve predictions
    let artifacts = Arc::new(ModelArtifacts::fit(&corpus).unwrap());
    let dictionary = Arc::new(StaticDictionary::new(["사랑", "학교"]));
    let service = LifetimeService::new(&config, artifacts)
        .unwrap()
        .with_dictionary(dictionary.clone());

    println!("\n--- Lifetime assessments ---");
    let live = TimeSeries::monthly(start, lifecycle(2, 4, 3, 88.0)).unwrap();
    let queries: [(&str, Option<&TimeSeries>); 4] = [
        ("갓생", None),
        ("새로운밈", Some(&live)),
        ("사랑", None),
        ("모르는말", None),
    ];
    for (word, series) in queries {
        match service.assess(word, series).unwrap() {
            Assessment::Predicted(r) => println!(
                "  {:<8} {:>3} months ({:?}), neighbours {:?}",
                r.word, r.predicted_months, r.status, r.neighbor_words
            ),
            other => println!("  {}", serde_json::to_string(&other).unwrap()),
        }
    }

    // 5. Neologism likelihood
    println!("\n--- Neologism scores ---");
    let scorer = NeologismScorer::new(config.scorer.clone()).with_dictionary(dictionary);
    for word in ["ㅋㅋㅋ", "갓생", "사랑"] {
        let s = scorer.score(word, None);
        println!(
            "  {:<8} score={:.2} neologism={} (dict={:.2}, trend={:.2}, morph={:.2})",
            s.word,
            s.final_score,
            s.is_neologism,
            s.subscores.dict,
            s.subscores.trend,
            s.subscores.morph
        );
    }
}
