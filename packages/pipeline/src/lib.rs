#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! End-to-end map pipeline.
//!
//! [`MapPipeline`] fetches every configured protocol and the country
//! boundary concurrently, normalizes and extracts geometry, and composes
//! the ordered layer list. Rendering is left to the caller so the pipeline
//! has no side effects beyond network reads.
//!
//! Fetching and boundary loading sit behind the [`ObservationFetcher`] and
//! [`BoundaryLoader`] traits; the HTTP implementations are the defaults.

pub mod config;

use std::time::Duration;

use async_trait::async_trait;
use globe_map_boundary::{BoundaryError, BoundarySource, CountryBoundary, extract_rings};
use globe_map_map::cities::catalog_for;
use globe_map_map::compose::compose;
use globe_map_map_models::{CityMarker, FigureLayout, LayerSpec};
use globe_map_observation::fields::CoordinateFields;
use globe_map_observation::query::ObservationQuery;
use globe_map_observation::{ObservationDataset, ObservationError, fetch_dataset};

pub use crate::config::PipelineConfig;

/// Errors that can occur while running the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },

    /// Configuration TOML could not be parsed.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O error (config file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// An observation fetch failed.
    #[error("Observation fetch failed: {0}")]
    Observation(#[from] ObservationError),

    /// The boundary could not be loaded.
    #[error("Boundary load failed: {0}")]
    Boundary(#[from] BoundaryError),
}

/// Fetches and normalizes one protocol's observations.
#[async_trait]
pub trait ObservationFetcher: Send + Sync {
    /// Runs `query` and returns the normalized dataset.
    ///
    /// # Errors
    ///
    /// Returns [`ObservationError`] if the fetch fails.
    async fn fetch(&self, query: &ObservationQuery) -> Result<ObservationDataset, ObservationError>;
}

/// Loads the boundary of one country.
#[async_trait]
pub trait BoundaryLoader: Send + Sync {
    /// Loads `country`'s boundary. A country missing from the source is
    /// returned with no shape rather than as an error.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError`] if the source cannot be loaded.
    async fn load(&self, country: &str) -> Result<CountryBoundary, BoundaryError>;
}

/// Fetches observations from the GLOBE API over HTTP.
#[derive(Debug, Clone)]
pub struct HttpObservationFetcher {
    client: reqwest::Client,
    fields: CoordinateFields,
    max_retries: u32,
}

impl HttpObservationFetcher {
    /// Creates a fetcher.
    #[must_use]
    pub const fn new(client: reqwest::Client, fields: CoordinateFields, max_retries: u32) -> Self {
        Self {
            client,
            fields,
            max_retries,
        }
    }
}

#[async_trait]
impl ObservationFetcher for HttpObservationFetcher {
    async fn fetch(&self, query: &ObservationQuery) -> Result<ObservationDataset, ObservationError> {
        fetch_dataset(&self.client, query, &self.fields, self.max_retries).await
    }
}

/// Loads boundaries from a URL or local file.
#[derive(Debug, Clone)]
pub struct SourceBoundaryLoader {
    client: reqwest::Client,
    source: BoundarySource,
    name_field: String,
}

impl SourceBoundaryLoader {
    /// Creates a loader.
    #[must_use]
    pub fn new(client: reqwest::Client, source: BoundarySource, name_field: impl Into<String>) -> Self {
        Self {
            client,
            source,
            name_field: name_field.into(),
        }
    }
}

#[async_trait]
impl BoundaryLoader for SourceBoundaryLoader {
    async fn load(&self, country: &str) -> Result<CountryBoundary, BoundaryError> {
        globe_map_boundary::load_country(&self.client, &self.source, &self.name_field, country)
            .await
    }
}

/// A configured map pipeline.
pub struct MapPipeline {
    config: PipelineConfig,
    fetcher: Box<dyn ObservationFetcher>,
    loader: Box<dyn BoundaryLoader>,
    cities: Vec<CityMarker>,
}

impl std::fmt::Debug for MapPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapPipeline")
            .field("config", &self.config)
            .field("cities", &self.cities.len())
            .finish_non_exhaustive()
    }
}

impl MapPipeline {
    /// Creates a pipeline with HTTP fetching and the registered city
    /// catalog for the configured country.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if the configuration is invalid, or
    /// [`PipelineError::Http`] if the HTTP client cannot be built.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .build()?;

        let fetcher =
            HttpObservationFetcher::new(client.clone(), config.fields.clone(), config.api.max_retries);
        let loader = SourceBoundaryLoader::new(
            client,
            BoundarySource::parse(config.boundary.source.trim()),
            config.boundary.name_field.trim(),
        );

        let cities = catalog_for(&config.country).unwrap_or_else(|| {
            log::warn!("No city catalog for '{}', drawing no city labels", config.country);
            Vec::new()
        });

        Ok(Self {
            config,
            fetcher: Box::new(fetcher),
            loader: Box::new(loader),
            cities,
        })
    }

    /// Creates a pipeline from explicit components.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if the configuration is invalid.
    pub fn with_components(
        config: PipelineConfig,
        fetcher: Box<dyn ObservationFetcher>,
        loader: Box<dyn BoundaryLoader>,
        cities: Vec<CityMarker>,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self {
            config,
            fetcher,
            loader,
            cities,
        })
    }

    /// The pipeline's configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// City markers drawn on top of the map.
    #[must_use]
    pub fn cities(&self) -> &[CityMarker] {
        &self.cities
    }

    /// Figure layout for the configured country and date range.
    #[must_use]
    pub fn layout(&self) -> FigureLayout {
        use chrono::Datelike as _;

        FigureLayout::for_country(
            self.config.country.trim(),
            self.config.start_date.year(),
            self.config.end_date.year(),
        )
    }

    /// Fetches every configured protocol concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first fetch failure.
    pub async fn fetch_datasets(&self) -> Result<Vec<ObservationDataset>, PipelineError> {
        let queries = self.config.queries();
        let datasets = futures::future::try_join_all(
            queries.iter().map(|query| self.fetcher.fetch(query)),
        )
        .await?;
        Ok(datasets)
    }

    /// Runs the pipeline and returns the composed layers: boundary rings,
    /// then non-empty datasets in protocol order, then city labels.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if any observation fetch or the boundary
    /// load fails. Empty datasets and a missing boundary shape are not
    /// errors.
    pub async fn run(&self) -> Result<Vec<LayerSpec>, PipelineError> {
        let country = self.config.country.trim();
        log::info!(
            "Building map for {country} ({}, {} to {}), {} protocols",
            self.config.country_code,
            self.config.start_date,
            self.config.end_date,
            self.config.protocols.len()
        );

        let (datasets, boundary) = futures::future::try_join(self.fetch_datasets(), async {
            self.loader
                .load(country)
                .await
                .map_err(PipelineError::from)
        })
        .await?;

        let rings = extract_rings(&boundary);
        let records: usize = datasets.iter().map(ObservationDataset::len).sum();
        log::info!(
            "Fetched {records} records across {} datasets, {} boundary rings",
            datasets.len(),
            rings.len()
        );

        let layers = compose(country, &rings, &datasets, &self.cities);
        log::info!("Composed {} layers", layers.len());
        Ok(layers)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use geo::{MultiPolygon, polygon};
    use globe_map_boundary::BoundaryShape;
    use globe_map_map_models::{LayerKind, TextAnchor};
    use globe_map_observation::normalize::normalize_response;
    use globe_map_observation_models::Protocol;
    use serde_json::json;

    use super::*;

    /// Serves canned response bodies per protocol and records the queries.
    struct FakeFetcher {
        bodies: Vec<(Protocol, serde_json::Value)>,
        seen: Arc<Mutex<Vec<Protocol>>>,
    }

    impl FakeFetcher {
        fn new(bodies: Vec<(Protocol, serde_json::Value)>) -> Self {
            Self {
                bodies,
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl ObservationFetcher for FakeFetcher {
        async fn fetch(
            &self,
            query: &ObservationQuery,
        ) -> Result<ObservationDataset, ObservationError> {
            self.seen.lock().unwrap().push(query.protocol);
            let body = self
                .bodies
                .iter()
                .find(|(p, _)| *p == query.protocol)
                .map_or_else(|| json!({"results": []}), |(_, body)| body.clone());
            Ok(normalize_response(
                query.protocol,
                &body,
                &CoordinateFields::default(),
            ))
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl ObservationFetcher for FailingFetcher {
        async fn fetch(
            &self,
            query: &ObservationQuery,
        ) -> Result<ObservationDataset, ObservationError> {
            Err(ObservationError::Status {
                url: query.base_url.clone(),
                status: 503,
            })
        }
    }

    struct FakeLoader {
        shape: Option<BoundaryShape>,
    }

    #[async_trait]
    impl BoundaryLoader for FakeLoader {
        async fn load(&self, country: &str) -> Result<CountryBoundary, BoundaryError> {
            Ok(CountryBoundary::new(country, self.shape.clone()))
        }
    }

    struct FailingLoader;

    #[async_trait]
    impl BoundaryLoader for FailingLoader {
        async fn load(&self, _country: &str) -> Result<CountryBoundary, BoundaryError> {
            Err(BoundaryError::Archive {
                message: "archive has no .shp member".to_string(),
            })
        }
    }

    fn two_part_boundary() -> Option<BoundaryShape> {
        let mainland = polygon![
            (x: 68.0, y: 8.0),
            (x: 97.0, y: 8.0),
            (x: 97.0, y: 35.0),
            (x: 68.0, y: 35.0),
        ];
        let islands = polygon![
            (x: 92.0, y: 6.0),
            (x: 94.0, y: 6.0),
            (x: 94.0, y: 14.0),
        ];
        Some(BoundaryShape::MultiPolygon(MultiPolygon::new(vec![
            mainland, islands,
        ])))
    }

    fn cities() -> Vec<CityMarker> {
        vec![
            CityMarker::new("Mumbai", (72.8777, 19.0760), TextAnchor::MiddleLeft),
            CityMarker::new("Delhi", (77.1025, 28.7041), TextAnchor::TopCenter),
            CityMarker::new("Kochi", (76.2673, 9.9312), TextAnchor::BottomLeft),
        ]
    }

    fn pipeline(
        fetcher: Box<dyn ObservationFetcher>,
        loader: Box<dyn BoundaryLoader>,
    ) -> MapPipeline {
        MapPipeline::with_components(PipelineConfig::default(), fetcher, loader, cities()).unwrap()
    }

    fn kinds(layers: &[LayerSpec]) -> Vec<LayerKind> {
        layers.iter().map(|l| l.kind).collect()
    }

    #[tokio::test]
    async fn all_empty_fetches_yield_boundary_and_cities_only() {
        let pipeline = pipeline(
            Box::new(FakeFetcher::new(Vec::new())),
            Box::new(FakeLoader {
                shape: two_part_boundary(),
            }),
        );
        let layers = pipeline.run().await.unwrap();
        assert_eq!(
            kinds(&layers),
            vec![
                LayerKind::Boundary,
                LayerKind::Boundary,
                LayerKind::CityLabel,
                LayerKind::CityLabel,
                LayerKind::CityLabel,
            ]
        );
        assert_eq!(layers.iter().filter(|l| l.show_in_legend).count(), 1);
    }

    #[tokio::test]
    async fn mixed_schemas_are_normalized_and_ordered() {
        let fetcher = FakeFetcher::new(vec![
            (
                Protocol::Precipitations,
                json!({"results": [{"lat": 19.0, "lng": 72.8}]}),
            ),
            (
                Protocol::SurfaceTemperatures,
                json!({"results": [
                    {"latitude": 28.7, "longitude": 77.1},
                    {"latitude": 12.9},
                ]}),
            ),
            (Protocol::Humidities, json!({"error": "no results key"})),
        ]);
        let pipeline = pipeline(
            Box::new(fetcher),
            Box::new(FakeLoader {
                shape: two_part_boundary(),
            }),
        );
        let layers = pipeline.run().await.unwrap();
        assert_eq!(
            kinds(&layers),
            vec![
                LayerKind::Boundary,
                LayerKind::Boundary,
                LayerKind::Dataset(Protocol::SurfaceTemperatures),
                LayerKind::Dataset(Protocol::Precipitations),
                LayerKind::CityLabel,
                LayerKind::CityLabel,
                LayerKind::CityLabel,
            ]
        );
        let temperatures = &layers[2];
        assert_eq!(temperatures.len(), 1);
        assert_eq!(temperatures.x, vec![77.1]);
        let precipitation = &layers[3];
        assert_eq!(precipitation.y, vec![19.0]);
        assert_eq!(precipitation.x, vec![72.8]);
    }

    #[tokio::test]
    async fn fetches_only_configured_protocols() {
        let fetcher = FakeFetcher::new(Vec::new());
        let seen = Arc::clone(&fetcher.seen);
        let config = PipelineConfig {
            protocols: vec![Protocol::MosquitoHabitatMapper, Protocol::Humidities],
            ..PipelineConfig::default()
        };
        let pipeline = MapPipeline::with_components(
            config,
            Box::new(fetcher),
            Box::new(FakeLoader { shape: None }),
            Vec::new(),
        )
        .unwrap();
        let datasets = pipeline.fetch_datasets().await.unwrap();
        assert_eq!(datasets.len(), 2);
        assert_eq!(datasets[0].protocol, Protocol::Humidities);
        let mut seen = seen.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen, vec![Protocol::Humidities, Protocol::MosquitoHabitatMapper]);
    }

    #[tokio::test]
    async fn missing_boundary_shape_draws_no_outline() {
        let pipeline = pipeline(
            Box::new(FakeFetcher::new(Vec::new())),
            Box::new(FakeLoader { shape: None }),
        );
        let layers = pipeline.run().await.unwrap();
        assert!(layers.iter().all(|l| l.kind == LayerKind::CityLabel));
    }

    #[tokio::test]
    async fn fetch_failure_fails_the_pipeline() {
        let pipeline = pipeline(
            Box::new(FailingFetcher),
            Box::new(FakeLoader {
                shape: two_part_boundary(),
            }),
        );
        assert!(matches!(
            pipeline.run().await,
            Err(PipelineError::Observation(ObservationError::Status {
                status: 503,
                ..
            }))
        ));
    }

    #[tokio::test]
    async fn boundary_failure_fails_the_pipeline() {
        let pipeline = pipeline(Box::new(FakeFetcher::new(Vec::new())), Box::new(FailingLoader));
        assert!(matches!(
            pipeline.run().await,
            Err(PipelineError::Boundary(BoundaryError::Archive { .. }))
        ));
    }

    #[tokio::test]
    async fn repeated_runs_compose_identical_layers() {
        let fetcher = FakeFetcher::new(vec![(
            Protocol::MosquitoHabitatMapper,
            json!({"results": [{"latitude": 22.5, "longitude": 88.3}, {"lat": "13.08", "lon": "80.27"}]}),
        )]);
        let pipeline = pipeline(
            Box::new(fetcher),
            Box::new(FakeLoader {
                shape: two_part_boundary(),
            }),
        );
        let first = pipeline.run().await.unwrap();
        let second = pipeline.run().await.unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = PipelineConfig {
            protocols: Vec::new(),
            ..PipelineConfig::default()
        };
        let result = MapPipeline::with_components(
            config,
            Box::new(FailingFetcher),
            Box::new(FailingLoader),
            Vec::new(),
        );
        assert!(matches!(result, Err(PipelineError::Config { .. })));
    }

    #[test]
    fn http_pipeline_rejects_invalid_config() {
        let config = PipelineConfig {
            country_code: " ".to_string(),
            ..PipelineConfig::default()
        };
        assert!(matches!(
            MapPipeline::new(config),
            Err(PipelineError::Config { .. })
        ));
    }

    #[test]
    fn layout_title_uses_config_years() {
        let pipeline = pipeline(Box::new(FailingFetcher), Box::new(FailingLoader));
        assert_eq!(
            pipeline.layout().title,
            "Factors Influencing Mosquito Distribution Across India (2015-2026)"
        );
    }

    #[test]
    fn default_pipeline_uses_registered_cities() {
        let pipeline = MapPipeline::new(PipelineConfig::default()).unwrap();
        assert_eq!(pipeline.cities().len(), 17);
    }
}
