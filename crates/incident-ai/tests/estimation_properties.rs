//! Properties of the local severity and resolution heuristics over the
//! standard reference tables and custom CSV tables.

use std::io::Cursor;
use std::sync::Arc;

use incident_ai::workflows::incidents::{IncidentEstimator, ReferenceData};

fn estimator() -> IncidentEstimator {
    IncidentEstimator::new(Arc::new(ReferenceData::standard()))
}

fn all_pairs(reference: &ReferenceData) -> Vec<(String, String)> {
    reference
        .incident_types()
        .iter()
        .flat_map(|kind| {
            reference
                .taluks()
                .iter()
                .map(move |taluk| (kind.id.clone(), taluk.id.clone()))
        })
        .collect()
}

#[test]
fn every_known_pair_scores_within_one_to_ten() {
    let estimator = estimator();
    for (kind, taluk) in all_pairs(estimator.reference()) {
        let score = estimator.estimate_severity(&kind, &taluk);
        assert!((1..=10).contains(&score), "{kind}/{taluk} scored {score}");
    }
}

#[test]
fn unknown_ids_fall_back_to_defaults() {
    let estimator = estimator();
    assert_eq!(estimator.estimate_severity("volcano", "mangalore"), 5);
    assert_eq!(estimator.estimate_severity("fire", "atlantis"), 5);
    assert_eq!(estimator.estimate_resolution_minutes("volcano", "puttur", 9), 240);
    assert_eq!(estimator.estimate_resolution_minutes("fire", "atlantis", 2), 240);

    let estimate = estimator.resolution_estimate("fire", "atlantis", 5, None);
    assert_eq!(estimate.minutes, 240);
    assert_eq!(estimate.confidence, 50);
}

#[test]
fn taluk_factor_scales_and_clamps_severity() {
    let estimator = estimator();
    assert_eq!(estimator.estimate_severity("fire", "belthangady"), 10);
    assert_eq!(estimator.estimate_severity("fallen-tree", "mangalore"), 4);
    assert_eq!(estimator.estimate_severity("road-damage", "bantwal"), 6);
}

#[test]
fn higher_severity_never_takes_longer() {
    let estimator = estimator();
    for (kind, taluk) in all_pairs(estimator.reference()) {
        let minutes: Vec<u32> = (1..=10)
            .map(|severity| estimator.estimate_resolution_minutes(&kind, &taluk, severity))
            .collect();
        assert!(
            minutes.windows(2).all(|pair| pair[0] >= pair[1]),
            "{kind}/{taluk} produced {minutes:?}"
        );
    }
}

#[test]
fn urgent_power_outage_in_puttur() {
    let estimator = estimator();
    assert_eq!(
        estimator.estimate_resolution_minutes("power-outage", "puttur", 9),
        264
    );
    assert_eq!(
        estimator.estimate_resolution_minutes("power-outage", "puttur", 7),
        330
    );
    assert_eq!(
        estimator.estimate_resolution_minutes("power-outage", "puttur", 3),
        396
    );
}

#[test]
fn monsoon_month_lengthens_resolution() {
    let estimator = estimator();
    assert_eq!(
        estimator.estimate_resolution_minutes_in_month("power-outage", "puttur", 9, 7),
        343
    );
    assert_eq!(
        estimator.estimate_resolution_minutes_in_month("power-outage", "puttur", 9, 4),
        264
    );

    let estimate = estimator.resolution_estimate("volcano", "puttur", 5, Some(7));
    assert_eq!(estimate.minutes, 312);
}

#[test]
fn repeated_calls_are_deterministic() {
    let estimator = estimator();
    let first = estimator.resolution_estimate("water-logging", "surathkal", 7, Some(8));
    for _ in 0..10 {
        assert_eq!(
            estimator.resolution_estimate("water-logging", "surathkal", 7, Some(8)),
            first
        );
    }
}

#[test]
fn custom_tables_drive_estimates() {
    let types = "id,name,baseline_severity\nlandslide,Landslide,6\n";
    let taluks = "id,name,average_resolution_minutes,severity_factor\nsullia,Sullia,500,1.5\n";
    let reference = ReferenceData::from_readers(Cursor::new(types), Cursor::new(taluks))
        .expect("custom tables load");
    let estimator = IncidentEstimator::new(Arc::new(reference));

    assert_eq!(estimator.estimate_severity("landslide", "sullia"), 9);
    assert_eq!(estimator.estimate_resolution_minutes("landslide", "sullia", 9), 400);
    assert_eq!(estimator.estimate_severity("fire", "sullia"), 5);
}
