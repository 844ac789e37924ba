//! # land-compare
//!
//! Compares what a piece of land would yield as a solar farm or as a
//! reforestation site.
//!
//! Polygons are drawn (or read from KML / GPX / GeoJSON), measured and tagged
//! with a land use. Per-hectare coefficients come from a remote calculation
//! service and are only re-requested once the location has moved far enough
//! from the last successful request, since they vary slowly with geography.
//! The session aggregates area per land use and turns it into annual energy
//! production and carbon offset.
//!
//! ```no_run
//! use land_compare::{Config, HttpCalculationClient, Session, WGS84Point};
//!
//! # async fn run() -> land_compare::Result<()> {
//! let config = Config::from_env();
//! let api = HttpCalculationClient::new(&config)?;
//! let mut session = Session::with_config(&config);
//!
//! session.handle_location_update(&api, WGS84Point::new(28.4, -81.58)).await?;
//! let parcel = land_compare::read_polygon::read_path("parcel.kml".as_ref())?.remove(0);
//! session.toggle_draw();
//! let estimate = session.handle_draw_end(parcel.geodesic_area(), parcel);
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod api;
pub mod area;
pub mod cache_policy;
pub mod coefficients;
pub mod config;
mod error;
pub mod estimate;
pub mod forest;
pub mod landuse;
pub mod mercator;
pub mod point;
pub mod polygon;
pub mod read_polygon;
pub mod report;
pub mod session;
pub mod svg;
pub mod typst;

pub use aggregator::{DrawnPolygon, PolygonAggregator};
pub use api::{CalculationApi, CalculationRequest, CalculationResponse, HttpCalculationClient};
pub use area::AreaMethod;
pub use cache_policy::RecalculationPolicy;
pub use coefficients::{CoefficientSet, ValidationWarning};
pub use config::Config;
pub use error::{Error, Result};
pub use estimate::ImpactEstimate;
pub use forest::ForestRecord;
pub use landuse::LandUseType;
pub use point::WGS84Point;
pub use polygon::Polygon;
pub use session::{CoefficientUpdate, DrawState, PendingFetch, Session};
