//! Coordinate reference systems understood by the loader and the resolver.
//!
//! Only a small, closed set is supported: geographic WGS84, Web Mercator and
//! the WGS84 / UTM zones. Every transform goes through geographic
//! coordinates; UTM uses the Krüger series of the transverse Mercator
//! projection, which is accurate to well below a millimetre inside a zone.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
use std::fmt;
use std::str::FromStr;

use geo::{Coord, MapCoords};
use serde::{Deserialize, Serialize};

use crate::Error;

/// WGS84 semi-major axis, meters
const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening
const WGS84_F: f64 = 1.0 / 298.257_223_563;

const UTM_K0: f64 = 0.9996;
const UTM_FALSE_EASTING: f64 = 500_000.0;
const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Web Mercator is undefined at the poles, EPSG:3857 clips here.
const WEB_MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_59;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Crs {
    /// EPSG:4326, degrees
    Wgs84,
    /// EPSG:3857, meters
    WebMercator,
    /// EPSG:326zz (north) / EPSG:327zz (south), meters
    Utm { zone: u8, north: bool },
}

impl Crs {
    pub fn epsg(&self) -> u32 {
        match *self {
            Crs::Wgs84 => 4326,
            Crs::WebMercator => 3857,
            Crs::Utm { zone, north: true } => 32600 + u32::from(zone),
            Crs::Utm { zone, north: false } => 32700 + u32::from(zone),
        }
    }

    pub fn from_epsg(code: u32) -> Result<Self, Error> {
        match code {
            4326 => Ok(Crs::Wgs84),
            3857 | 900_913 => Ok(Crs::WebMercator),
            32601..=32660 => Ok(Crs::Utm {
                zone: (code - 32600) as u8,
                north: true,
            }),
            32701..=32760 => Ok(Crs::Utm {
                zone: (code - 32700) as u8,
                north: false,
            }),
            _ => Err(Error::UnsupportedCrs(format!("EPSG:{code}"))),
        }
    }

    /// Projected systems have linear units in meters, which is what
    /// snapping and edge lengths require.
    pub fn is_projected(&self) -> bool {
        !matches!(self, Crs::Wgs84)
    }

    /// UTM zone containing the given longitude, handy for picking a target CRS.
    pub fn utm_for(lon: f64, lat: f64) -> Result<Self, Error> {
        if !(-180.0..=180.0).contains(&lon) || !(-80.0..=84.0).contains(&lat) {
            return Err(Error::Projection(format!(
                "({lon}, {lat}) is outside the UTM coverage area"
            )));
        }
        let zone = (((lon + 180.0) / 6.0).floor() as u8).clamp(0, 59) + 1;
        Ok(Crs::Utm {
            zone,
            north: lat >= 0.0,
        })
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

impl FromStr for Crs {
    type Err = Error;

    /// Accepts `EPSG:32645`, `epsg:4326`, `urn:ogc:def:crs:EPSG::32645`,
    /// `urn:ogc:def:crs:OGC:1.3:CRS84` and bare codes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let upper = trimmed.to_ascii_uppercase();

        if upper.ends_with("CRS84") {
            return Ok(Crs::Wgs84);
        }

        let code = upper
            .strip_prefix("URN:OGC:DEF:CRS:EPSG:")
            .map(|rest| rest.trim_start_matches(':').rsplit(':').next().unwrap_or(rest))
            .or_else(|| upper.strip_prefix("EPSG:"))
            .unwrap_or(&upper);

        let code: u32 = code
            .parse()
            .map_err(|_| Error::UnsupportedCrs(trimmed.to_string()))?;
        Self::from_epsg(code)
    }
}

impl TryFrom<String> for Crs {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Crs> for String {
    fn from(crs: Crs) -> Self {
        crs.to_string()
    }
}

/// Coordinate transform between two supported reference systems.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transformer {
    from: Crs,
    to: Crs,
}

impl Transformer {
    pub fn new(from: Crs, to: Crs) -> Self {
        Self { from, to }
    }

    pub fn source(&self) -> Crs {
        self.from
    }

    pub fn target(&self) -> Crs {
        self.to
    }

    pub fn is_identity(&self) -> bool {
        self.from == self.to
    }

    /// Transform a single coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Projection`] when the input lies outside the domain
    /// of the source system. A layer declared as EPSG:4326 whose coordinates
    /// are actually meters fails here instead of silently producing garbage.
    pub fn transform(&self, coord: Coord<f64>) -> Result<Coord<f64>, Error> {
        if self.is_identity() {
            return check_finite(coord, self.to);
        }
        let (lon, lat) = to_geographic(coord, self.from)?;
        from_geographic(lon, lat, self.to)
    }

    /// Transform every coordinate of a geometry.
    pub fn transform_geometry<G>(&self, geometry: &G) -> Result<G::Output, Error>
    where
        G: MapCoords<f64, f64>,
    {
        geometry.try_map_coords(|coord| self.transform(coord))
    }
}

fn check_finite(coord: Coord<f64>, crs: Crs) -> Result<Coord<f64>, Error> {
    if coord.x.is_finite() && coord.y.is_finite() {
        Ok(coord)
    } else {
        Err(Error::Projection(format!(
            "non-finite coordinate ({}, {}) in {crs}",
            coord.x, coord.y
        )))
    }
}

fn to_geographic(coord: Coord<f64>, crs: Crs) -> Result<(f64, f64), Error> {
    let coord = check_finite(coord, crs)?;
    match crs {
        Crs::Wgs84 => {
            if !(-180.0..=180.0).contains(&coord.x) || !(-90.0..=90.0).contains(&coord.y) {
                return Err(Error::Projection(format!(
                    "({}, {}) is not a valid longitude/latitude pair, \
                     the layer CRS is probably mislabeled",
                    coord.x, coord.y
                )));
            }
            Ok((coord.x, coord.y))
        }
        Crs::WebMercator => {
            let lon = (coord.x / WGS84_A).to_degrees();
            let lat = (2.0 * (coord.y / WGS84_A).exp().atan() - FRAC_PI_2).to_degrees();
            Ok((lon, lat))
        }
        Crs::Utm { zone, north } => {
            let (lon, lat) = KRUGER.inverse(coord, zone, north);
            if lon.is_finite() && lat.is_finite() {
                Ok((lon, lat))
            } else {
                Err(Error::Projection(format!(
                    "({}, {}) cannot be inverted from {crs}",
                    coord.x, coord.y
                )))
            }
        }
    }
}

fn from_geographic(lon: f64, lat: f64, crs: Crs) -> Result<Coord<f64>, Error> {
    let coord = match crs {
        Crs::Wgs84 => Coord { x: lon, y: lat },
        Crs::WebMercator => {
            if lat.abs() > WEB_MERCATOR_MAX_LAT {
                return Err(Error::Projection(format!(
                    "latitude {lat} is outside the Web Mercator range"
                )));
            }
            Coord {
                x: WGS84_A * lon.to_radians(),
                y: WGS84_A * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln(),
            }
        }
        Crs::Utm { zone, north } => KRUGER.forward(lon, lat, zone, north),
    };
    check_finite(coord, crs)
}

/// Series coefficients of the Krüger transverse Mercator for WGS84.
struct Kruger {
    rectifying_radius: f64,
    eccentricity_squared: f64,
    alpha: [f64; 3],
    beta: [f64; 3],
    delta: [f64; 3],
}

static KRUGER: Kruger = Kruger::wgs84();

impl Kruger {
    const fn wgs84() -> Self {
        let n = WGS84_F / (2.0 - WGS84_F);
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;
        Self {
            rectifying_radius: WGS84_A / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0),
            eccentricity_squared: WGS84_F * (2.0 - WGS84_F),
            alpha: [
                n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0,
                13.0 * n2 / 48.0 - 3.0 * n3 / 5.0,
                61.0 * n3 / 240.0,
            ],
            beta: [
                n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0,
                n2 / 48.0 + n3 / 15.0,
                17.0 * n3 / 480.0,
            ],
            delta: [
                2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3,
                7.0 * n2 / 3.0 - 8.0 * n3 / 5.0,
                56.0 * n3 / 15.0,
            ],
        }
    }

    fn eccentricity(&self) -> f64 {
        self.eccentricity_squared.sqrt()
    }

    fn central_meridian(zone: u8) -> f64 {
        f64::from(zone) * 6.0 - 183.0
    }

    fn forward(&self, lon: f64, lat: f64, zone: u8, north: bool) -> Coord<f64> {
        let e = self.eccentricity();
        let phi = lat.to_radians();
        let lambda = (lon - Self::central_meridian(zone)).to_radians();

        let t = (phi.sin().atanh() - e * (e * phi.sin()).atanh()).sinh();
        let xi_prime = t.atan2(lambda.cos());
        let eta_prime = (lambda.sin() / (1.0 + t * t).sqrt()).atanh();

        let mut xi = xi_prime;
        let mut eta = eta_prime;
        for (j, alpha) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            xi += alpha * (k * xi_prime).sin() * (k * eta_prime).cosh();
            eta += alpha * (k * xi_prime).cos() * (k * eta_prime).sinh();
        }

        let false_northing = if north { 0.0 } else { UTM_FALSE_NORTHING_SOUTH };
        Coord {
            x: UTM_FALSE_EASTING + UTM_K0 * self.rectifying_radius * eta,
            y: false_northing + UTM_K0 * self.rectifying_radius * xi,
        }
    }

    fn inverse(&self, coord: Coord<f64>, zone: u8, north: bool) -> (f64, f64) {
        let false_northing = if north { 0.0 } else { UTM_FALSE_NORTHING_SOUTH };
        let scale = UTM_K0 * self.rectifying_radius;
        let xi = (coord.y - false_northing) / scale;
        let eta = (coord.x - UTM_FALSE_EASTING) / scale;

        let mut xi_prime = xi;
        let mut eta_prime = eta;
        for (j, beta) in self.beta.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            xi_prime -= beta * (k * xi).sin() * (k * eta).cosh();
            eta_prime -= beta * (k * xi).cos() * (k * eta).sinh();
        }

        let chi = (xi_prime.sin() / eta_prime.cosh()).asin();
        let mut phi = chi;
        for (j, delta) in self.delta.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            phi += delta * (k * chi).sin();
        }
        let lambda = eta_prime.sinh().atan2(xi_prime.cos());

        (
            Self::central_meridian(zone) + lambda.to_degrees(),
            phi.to_degrees(),
        )
    }
}
