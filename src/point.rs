use core::fmt;

use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WGS84Point {
    #[serde(rename = "longitude")]
    pub lon: f64,
    #[serde(rename = "latitude")]
    pub lat: f64,
}

impl WGS84Point {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lon, lat }
    }

    /// Great-circle distance in kilometers.
    pub fn distance_km(&self, other: &WGS84Point) -> f64 {
        let a = Point::new(self.lon, self.lat);
        let b = Point::new(other.lon, other.lat);
        Haversine.distance(a, b) / 1000.0
    }

    /// UTM zone number (1-60) containing this point.
    pub fn utm_zone(&self) -> u8 {
        let zone = ((self.lon + 180.0) / 6.0).floor() as i32 + 1;
        zone.clamp(1, 60) as u8
    }

    pub fn to_utm_proj4(&self) -> String {
        let south = if self.lat < 0.0 { "+south " } else { "" };
        format!(
            "+proj=utm +zone={} {}+datum=WGS84 +units=m +no_defs +type=crs",
            self.utm_zone(),
            south
        )
    }
}

impl fmt::Display for WGS84Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wgs(lat: {:.5}, lon: {:.5})", self.lat, self.lon)
    }
}

/// A point projected to a metric (UTM) plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MercatorPoint {
    pub x: f64,
    pub y: f64,
}

impl fmt::Display for MercatorPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mercator(x: {:.1}, y: {:.1})", self.x, self.y)
    }
}

#[derive(Clone, Debug)]
pub struct WGS84BoundingBox {
    pub min: WGS84Point,
    pub max: WGS84Point,
}

impl WGS84BoundingBox {
    /// Smallest box containing all points, `None` for an empty slice.
    pub fn from_points(points: &[WGS84Point]) -> Option<Self> {
        let first = points.first()?;
        let (min, max) = points.iter().fold((*first, *first), |(min, max), curr| {
            (
                WGS84Point {
                    lon: min.lon.min(curr.lon),
                    lat: min.lat.min(curr.lat),
                },
                WGS84Point {
                    lon: max.lon.max(curr.lon),
                    lat: max.lat.max(curr.lat),
                },
            )
        });
        Some(Self { min, max })
    }
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: WGS84Point {
                lon: self.min.lon.min(other.min.lon),
                lat: self.min.lat.min(other.min.lat),
            },
            max: WGS84Point {
                lon: self.max.lon.max(other.max.lon),
                lat: self.max.lat.max(other.max.lat),
            },
        }
    }
    pub fn center(&self) -> WGS84Point {
        WGS84Point {
            lon: (self.min.lon + self.max.lon) / 2.0,
            lat: (self.min.lat + self.max.lat) / 2.0,
        }
    }
    pub fn contains(&self, w: &WGS84Point) -> bool {
        w.lon >= self.min.lon
            && w.lon <= self.max.lon
            && w.lat >= self.min.lat
            && w.lat <= self.max.lat
    }
}

impl fmt::Display for WGS84BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wgsbbox(min: {}, max: {})", self.min, self.max)
    }
}

#[derive(Clone, Debug)]
pub struct MercatorBoundingBox {
    pub min: MercatorPoint,
    pub max: MercatorPoint,
}

impl MercatorBoundingBox {
    pub fn from_points(points: &[MercatorPoint]) -> Option<Self> {
        let first = points.first()?;
        let (min, max) = points.iter().fold((*first, *first), |(min, max), curr| {
            (
                MercatorPoint {
                    x: min.x.min(curr.x),
                    y: min.y.min(curr.y),
                },
                MercatorPoint {
                    x: max.x.max(curr.x),
                    y: max.y.max(curr.y),
                },
            )
        });
        Some(Self { min, max })
    }
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

impl fmt::Display for MercatorBoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mercatorbbox(min: {}, max: {})", self.min, self.max)
    }
}
