use std::sync::Arc;

use super::common::*;
use crate::config::EngineConfig;
use crate::prediction::{
    Algorithm, PredictionError, PredictionId, PredictionStatus, PricePredictionEngine,
};
use crate::property::repository::{PredictionRepository, PropertyRepository, RepositoryError};
use crate::property::{
    current_year, PropertyCategory, PropertyId, PropertyService, PropertyServiceError,
    ValidationIssue,
};

#[test]
fn add_property_assigns_repository_id() {
    let (service, properties, _) = build_service();

    let mut draft = house();
    draft.id = PropertyId(99);
    let stored = service.add_property(draft).expect("valid property");

    assert_eq!(stored.id, PropertyId(1));
    assert_eq!(properties.count().expect("count"), 1);
    assert_eq!(
        properties.fetch(PropertyId(1)).expect("fetch"),
        Some(stored)
    );
}

#[test]
fn add_property_rejects_invalid_drafts_without_persisting() {
    let (service, properties, _) = build_service();

    let mut draft = house();
    draft.area = -10.0;
    draft.year_built = REFERENCE_YEAR + 1;

    match service.add_property(draft) {
        Err(PropertyServiceError::Validation(error)) => assert_eq!(
            error.issues,
            vec![ValidationIssue::InvalidArea, ValidationIssue::InvalidYearBuilt]
        ),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(properties.count().expect("count"), 0);
}

#[test]
fn unpinned_reference_year_tracks_the_calendar() {
    let engine = PricePredictionEngine::new(EngineConfig {
        reference_year: None,
        ..engine_config()
    })
    .expect("engine starts");
    let service = PropertyService::new(
        Arc::new(MemoryProperties::default()),
        Arc::new(MemoryPredictions::default()),
        Arc::new(engine),
    );

    let mut fresh = house();
    fresh.year_built = current_year();
    service.add_property(fresh).expect("built this year");

    let mut planned = house();
    planned.year_built = current_year() + 1;
    match service.add_property(planned) {
        Err(PropertyServiceError::Validation(error)) => {
            assert_eq!(error.issues, vec![ValidationIssue::InvalidYearBuilt])
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    service.engine().shutdown();
}

#[test]
fn missing_property_is_not_found() {
    let (service, _, _) = build_service();
    assert!(matches!(
        service.get_property(PropertyId(42)),
        Err(PropertyServiceError::Repository(RepositoryError::NotFound))
    ));
}

#[test]
fn filters_by_category() {
    let (service, _, _) = build_service();
    service.add_property(house()).expect("house");
    service.add_property(office()).expect("office");
    service.add_property(warehouse()).expect("warehouse");
    service.add_property(house()).expect("second house");

    let residential = service
        .properties_by_category(PropertyCategory::Residential)
        .expect("listing");
    assert_eq!(residential.len(), 2);
    assert!(residential
        .iter()
        .all(|property| property.category() == PropertyCategory::Residential));
    assert_eq!(service.total_properties().expect("count"), 4);
}

#[test]
fn update_replaces_attributes_and_keeps_id() {
    let (service, _, _) = build_service();
    let stored = service.add_property(house()).expect("house");

    let mut revised = house();
    revised.address = "125 Oak Street".to_string();
    revised.bedrooms = 4;
    let updated = service
        .update_property(stored.id, revised)
        .expect("update succeeds");

    assert_eq!(updated.id, stored.id);
    let fetched = service.get_property(stored.id).expect("still present");
    assert_eq!(fetched.address, "125 Oak Street");
    assert_eq!(fetched.bedrooms, 4);
}

#[test]
fn update_of_unknown_property_is_not_found() {
    let (service, _, _) = build_service();
    assert!(matches!(
        service.update_property(PropertyId(7), house()),
        Err(PropertyServiceError::Repository(RepositoryError::NotFound))
    ));
}

#[test]
fn delete_removes_the_record() {
    let (service, _, _) = build_service();
    let stored = service.add_property(office()).expect("office");

    service.delete_property(stored.id).expect("delete succeeds");
    assert!(service.get_property(stored.id).is_err());
    assert!(service.delete_property(stored.id).is_err());
}

#[test]
fn statistics_summarize_category_estimates() {
    let (service, _, _) = build_service();
    service.add_property(house()).expect("house");
    service.add_property(office()).expect("office");
    service.add_property(warehouse()).expect("warehouse");

    let stats = service.price_statistics().expect("statistics");
    assert_eq!(stats.total_properties, 3);
    assert!((stats.total_value - 21_808_800.0).abs() < 1e-6);
    assert!((stats.average_price - 7_269_600.0).abs() < 1e-6);
    assert!((stats.highest_price - 10_523_000.0).abs() < 1e-6);
    assert!((service.average_estimated_price().expect("average") - 7_269_600.0).abs() < 1e-6);
}

#[test]
fn statistics_of_empty_portfolio_are_zero() {
    let (service, _, _) = build_service();
    let stats = service.price_statistics().expect("statistics");
    assert_eq!(stats.total_properties, 0);
    assert_eq!(stats.average_price, 0.0);
    assert_eq!(stats.highest_price, 0.0);
}

#[test]
fn predict_persists_and_caches_every_algorithm() {
    let (service, _, predictions) = build_service();
    let stored = service.add_property(house()).expect("house");

    let saved = service.predict(stored.id).expect("prediction succeeds");
    assert_eq!(saved.len(), 3);
    assert!(saved
        .iter()
        .all(|result| result.prediction_id != PredictionId::UNSAVED));

    let persisted = service.prediction_results(stored.id).expect("history");
    assert_eq!(persisted, saved);
    assert_eq!(predictions.all().len(), 3);

    let cached = service.cached_predictions(stored.id);
    assert_eq!(cached.len(), 3);
    for algorithm in Algorithm::ALL {
        assert!(cached.iter().any(|result| result.algorithm == algorithm));
    }
}

#[test]
fn predict_for_unknown_property_leaves_cache_untouched() {
    let (service, _, predictions) = build_service();

    assert!(matches!(
        service.predict(PropertyId(5)),
        Err(PropertyServiceError::Repository(RepositoryError::NotFound))
    ));
    assert_eq!(service.engine().cached_len(), 0);
    assert!(predictions.all().is_empty());
}

#[test]
fn predict_after_engine_shutdown_reports_closed() {
    let (service, _, _) = build_service();
    let stored = service.add_property(warehouse()).expect("warehouse");
    service.engine().shutdown();

    assert!(matches!(
        service.predict(stored.id),
        Err(PropertyServiceError::Prediction(PredictionError::Closed))
    ));
}

#[test]
fn clearing_the_cache_keeps_persisted_history() {
    let (service, _, _) = build_service();
    let stored = service.add_property(office()).expect("office");
    service.predict(stored.id).expect("prediction succeeds");

    service.clear_prediction_cache();
    assert!(service.cached_predictions(stored.id).is_empty());
    assert_eq!(
        service.prediction_results(stored.id).expect("history").len(),
        3
    );
}

#[test]
fn record_actual_price_verifies_prediction() {
    let (service, _, predictions) = build_service();
    let stored = service.add_property(house()).expect("house");
    let saved = service.predict(stored.id).expect("prediction succeeds");
    let target = saved[0].prediction_id;

    let verified = service
        .record_actual_price(target, 3_200_000.0)
        .expect("actual price recorded");
    assert_eq!(verified.status, PredictionStatus::Verified);
    assert_eq!(verified.actual_price, 3_200_000.0);

    let persisted = predictions
        .fetch(target)
        .expect("fetch")
        .expect("prediction present");
    assert_eq!(persisted.status, PredictionStatus::Verified);
}

#[test]
fn record_actual_price_validates_amount_and_id() {
    let (service, _, _) = build_service();

    assert!(matches!(
        service.record_actual_price(PredictionId(1), -5.0),
        Err(PropertyServiceError::Validation(_))
    ));
    assert!(matches!(
        service.record_actual_price(PredictionId(1), 100_000.0),
        Err(PropertyServiceError::Repository(RepositoryError::NotFound))
    ));
}

#[test]
fn repository_outage_surfaces_as_repository_error() {
    let service = PropertyService::new(
        Arc::new(UnavailableProperties),
        Arc::new(MemoryPredictions::default()),
        engine(),
    );

    assert!(matches!(
        service.add_property(house()),
        Err(PropertyServiceError::Repository(RepositoryError::Unavailable(_)))
    ));
    assert!(service.price_statistics().is_err());
}
