use crate::infra::{InMemoryPredictionRepository, InMemoryPropertyRepository};
use clap::Args;
use house_price::config::AppConfig;
use house_price::error::AppError;
use house_price::prediction::{PredictionResult, PricePredictionEngine};
use house_price::property::{
    Property, PropertyCategory, PropertyKind, PropertyService, PropertyServiceError,
};
use serde_json::json;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

type DemoService = PropertyService<InMemoryPropertyRepository, InMemoryPredictionRepository>;

#[derive(Args, Debug)]
pub(crate) struct PredictArgs {
    /// Property category: residential, commercial, or industrial
    #[arg(long, value_parser = crate::infra::parse_category)]
    pub(crate) category: PropertyCategory,
    #[arg(long)]
    pub(crate) address: String,
    /// Floor area in square feet
    #[arg(long)]
    pub(crate) area: f64,
    #[arg(long, default_value_t = 0)]
    pub(crate) bedrooms: u32,
    #[arg(long, default_value_t = 0)]
    pub(crate) bathrooms: u32,
    #[arg(long)]
    pub(crate) year_built: i32,
    /// Residential: number of floors
    #[arg(long, default_value_t = 1)]
    pub(crate) floors: u32,
    /// Residential: property has a garage
    #[arg(long)]
    pub(crate) garage: bool,
    /// Residential: property has a garden
    #[arg(long)]
    pub(crate) garden: bool,
    /// Commercial: monthly rent income
    #[arg(long, default_value_t = 0.0)]
    pub(crate) rent_income: f64,
    /// Commercial: property has parking
    #[arg(long)]
    pub(crate) parking: bool,
    /// Commercial: maximum number of floors
    #[arg(long, default_value_t = 1)]
    pub(crate) max_floors: u32,
    /// Industrial: floor load capacity
    #[arg(long, default_value_t = 0.0)]
    pub(crate) load_capacity: f64,
    /// Industrial: property has a loading dock
    #[arg(long)]
    pub(crate) loading_dock: bool,
    /// Industrial: zoning designation
    #[arg(long, default_value = "GENERAL")]
    pub(crate) zone_type: String,
    /// Override the number of prediction worker threads
    #[arg(long)]
    pub(crate) workers: Option<usize>,
}

impl PredictArgs {
    fn to_property(&self) -> Property {
        let kind = match self.category {
            PropertyCategory::Residential => PropertyKind::Residential {
                floors: self.floors,
                has_garage: self.garage,
                has_garden: self.garden,
            },
            PropertyCategory::Commercial => PropertyKind::Commercial {
                rent_income: self.rent_income,
                has_parking: self.parking,
                max_floors: self.max_floors,
            },
            PropertyCategory::Industrial => PropertyKind::Industrial {
                load_capacity: self.load_capacity,
                has_loading_dock: self.loading_dock,
                zone_type: self.zone_type.clone(),
            },
        };

        Property::new(
            self.address.clone(),
            self.area,
            self.bedrooms,
            self.bathrooms,
            self.year_built,
            kind,
        )
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the number of prediction worker threads
    #[arg(long)]
    pub(crate) workers: Option<usize>,
    /// Concurrent callers used for the load portion of the demo
    #[arg(long, default_value_t = 4)]
    pub(crate) callers: usize,
}

fn build_service(workers: Option<usize>) -> Result<DemoService, AppError> {
    let mut config = AppConfig::load()?;
    if let Some(workers) = workers {
        config.engine.worker_threads = workers.max(1);
    }

    let engine = PricePredictionEngine::new(config.engine)?;
    Ok(PropertyService::new(
        Arc::new(InMemoryPropertyRepository::default()),
        Arc::new(InMemoryPredictionRepository::default()),
        Arc::new(engine),
    ))
}

pub(crate) fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let service = build_service(args.workers)?;
    let outcome = predict_one(&service, args.to_property());
    service.engine().shutdown();
    let (stored, predictions) = outcome?;

    let report = json!({
        "property": service.view(stored),
        "predictions": predictions,
    });
    let rendered = serde_json::to_string_pretty(&report).map_err(std::io::Error::from)?;
    println!("{rendered}");
    Ok(())
}

fn predict_one(
    service: &DemoService,
    property: Property,
) -> Result<(Property, Vec<PredictionResult>), PropertyServiceError> {
    let stored = service.add_property(property)?;
    let predictions = service.predict(stored.id)?;
    Ok((stored, predictions))
}

pub(crate) fn sample_portfolio() -> Vec<Property> {
    vec![
        Property::residential("123 Oak Street", 2000.0, 3, 2, 2015, 2, true, true),
        Property::residential("48 Willow Lane", 1350.0, 2, 1, 1978, 1, false, true),
        Property::commercial("456 Business Ave", 5000.0, 0, 4, 2010, 5000.0, true, 6),
        Property::commercial("9 Market Square", 2200.0, 0, 2, 1995, 3200.0, false, 3),
        Property::industrial("789 Factory Road", 10_000.0, 0, 2, 2005, 500.0, true, "M-2"),
        Property::industrial("15 Dockside Way", 25_000.0, 0, 4, 1988, 1200.0, true, "M-3"),
    ]
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let service = build_service(args.workers)?;
    let outcome = walk_portfolio(&service, args.callers.max(1));
    service.engine().shutdown();
    println!("\nEngine state after shutdown: {}", service.engine().state());
    outcome.map_err(AppError::from)
}

fn walk_portfolio(service: &DemoService, callers: usize) -> Result<(), PropertyServiceError> {
    println!("House price prediction demo");
    println!(
        "- {} worker threads | {:?} task timeout | reference year {}",
        service.engine().config().worker_threads,
        service.engine().config().task_timeout,
        service.engine().reference_year()
    );

    println!("\nPortfolio");
    let mut stored = Vec::new();
    for property in sample_portfolio() {
        let property = service.add_property(property)?;
        let view = service.view(property.clone());
        println!(
            "  #{} {:<18} {:<12} {:>9.0} sqft  built {}  est. ${:>14.2}",
            property.id,
            property.address,
            property.category().label(),
            property.area,
            property.year_built,
            view.estimated_price
        );
        stored.push(property);
    }

    let stats = service.price_statistics()?;
    println!(
        "- {} properties | total ${:.2} | average ${:.2} | highest ${:.2}",
        stats.total_properties, stats.total_value, stats.average_price, stats.highest_price
    );
    for category in PropertyCategory::ALL {
        let matching = service.properties_by_category(category)?;
        println!("  {category}: {} listed", matching.len());
    }

    println!("\nPredictions");
    let mut first_results = Vec::new();
    for property in &stored {
        let started = Instant::now();
        let results = service.predict(property.id)?;
        println!("  #{} {} ({:?})", property.id, property.address, started.elapsed());
        for result in &results {
            println!(
                "    - {:<18} ${:>14.2}  accuracy {:.1}%",
                result.algorithm.label(),
                result.predicted_price,
                result.accuracy
            );
        }
        if first_results.is_empty() {
            first_results = results;
        }
    }

    println!("\nConcurrent load: {callers} callers across the portfolio");
    let started = Instant::now();
    let failures = thread::scope(|scope| {
        let handles: Vec<_> = (0..callers)
            .map(|_| {
                scope.spawn(|| {
                    stored
                        .iter()
                        .filter(|property| service.predict(property.id).is_err())
                        .count()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or(stored.len()))
            .sum::<usize>()
    });
    println!(
        "- {} prediction calls in {:?} | {} failed | {} cached results",
        callers * stored.len(),
        started.elapsed(),
        failures,
        service.engine().cached_len()
    );

    if let Some(first) = first_results.first() {
        let actual = first.predicted_price * 0.97;
        let verified = service.record_actual_price(first.prediction_id, actual)?;
        println!(
            "\nRecorded sale of ${:.2} against {} prediction #{} (error ${:.2})",
            verified.actual_price,
            verified.algorithm,
            verified.prediction_id,
            verified.error().unwrap_or_default()
        );
    }

    let invalid = Property::residential("", -40.0, 25, 1, 2999, 1, false, false);
    match service.add_property(invalid) {
        Err(PropertyServiceError::Validation(error)) => {
            println!("\nRejected invalid listing: {error}");
        }
        Err(other) => return Err(other),
        Ok(property) => println!("\nUnexpectedly accepted listing #{}", property.id),
    }

    service.clear_prediction_cache();
    println!("Prediction cache cleared ({} entries)", service.engine().cached_len());
    Ok(())
}
