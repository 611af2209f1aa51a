//! Calcul d'emprise (bounding box) des géométries GeoJSON
//!
//! L'emprise est toujours recalculée depuis la géométrie source et remplacée
//! en bloc, jamais modifiée en place.

use geo::{Coord, Rect};
use geojson::{GeoJson, Geometry, Value};
use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Marge (en pixels) appliquée lors du cadrage
pub const FIT_PADDING: f64 = 20.0;

/// Emprise en longitude/latitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct Bounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Bounds {
    /// Crée une emprise en vérifiant que les bornes sont finies et ordonnées
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Result<Self, ModelError> {
        let values = [min_lon, min_lat, max_lon, max_lat];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::invalid_geometry("bbox", "non finite coordinate"));
        }
        if min_lon > max_lon || min_lat > max_lat {
            return Err(ModelError::invalid_geometry("bbox", "min greater than max"));
        }
        Ok(Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        })
    }

    fn from_coord(c: Coord) -> Self {
        Self {
            min_lon: c.x,
            min_lat: c.y,
            max_lon: c.x,
            max_lat: c.y,
        }
    }

    /// Emprise élargie pour contenir `c`
    pub fn extend(self, c: Coord) -> Self {
        Self {
            min_lon: self.min_lon.min(c.x),
            min_lat: self.min_lat.min(c.y),
            max_lon: self.max_lon.max(c.x),
            max_lat: self.max_lat.max(c.y),
        }
    }

    /// Plus petite emprise contenant les deux
    pub fn union(self, other: Self) -> Self {
        self.extend(other.south_west()).extend(other.north_east())
    }

    pub fn south_west(&self) -> Coord {
        Coord {
            x: self.min_lon,
            y: self.min_lat,
        }
    }

    pub fn north_east(&self) -> Coord {
        Coord {
            x: self.max_lon,
            y: self.max_lat,
        }
    }

    pub fn center(&self) -> Coord {
        self.to_rect().center()
    }

    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Emprise déplacée de (`dlon`, `dlat`)
    pub fn translate(&self, dlon: f64, dlat: f64) -> Self {
        Self {
            min_lon: self.min_lon + dlon,
            min_lat: self.min_lat + dlat,
            max_lon: self.max_lon + dlon,
            max_lat: self.max_lat + dlat,
        }
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(self.south_west(), self.north_east())
    }

    /// Polygone GeoJSON fermé couvrant l'emprise
    pub fn to_polygon(&self) -> Geometry {
        let ring = vec![
            vec![self.min_lon, self.min_lat],
            vec![self.max_lon, self.min_lat],
            vec![self.max_lon, self.max_lat],
            vec![self.min_lon, self.max_lat],
            vec![self.min_lon, self.min_lat],
        ];
        Geometry::new(Value::Polygon(vec![ring]))
    }
}

impl From<Rect> for Bounds {
    fn from(rect: Rect) -> Self {
        Self::from_coord(rect.min()).extend(rect.max())
    }
}

impl TryFrom<[f64; 4]> for Bounds {
    type Error = ModelError;

    fn try_from(bbox: [f64; 4]) -> Result<Self, Self::Error> {
        Self::new(bbox[0], bbox[1], bbox[2], bbox[3])
    }
}

impl From<Bounds> for [f64; 4] {
    fn from(b: Bounds) -> Self {
        [b.min_lon, b.min_lat, b.max_lon, b.max_lat]
    }
}

/// Calcule l'emprise d'un document GeoJSON (géométrie, feature ou collection)
///
/// Les features sans géométrie et les tableaux de coordonnées vides ne
/// contribuent pas. Retourne `None` si aucune coordonnée n'a été trouvée.
pub fn compute_bounds(geojson: &GeoJson) -> Option<Bounds> {
    match geojson {
        GeoJson::Geometry(geometry) => geometry_bounds(geometry),
        GeoJson::Feature(feature) => feature.geometry.as_ref().and_then(geometry_bounds),
        GeoJson::FeatureCollection(collection) => collection
            .features
            .iter()
            .filter_map(|f| f.geometry.as_ref())
            .filter_map(geometry_bounds)
            .reduce(Bounds::union),
    }
}

/// Calcule l'emprise d'une géométrie, quelle que soit sa profondeur d'imbrication
pub fn geometry_bounds(geometry: &Geometry) -> Option<Bounds> {
    let mut acc = None;
    fold_value(&geometry.value, &mut acc);
    acc
}

fn fold_value(value: &Value, acc: &mut Option<Bounds>) {
    match value {
        Value::Point(p) => fold_position(p, acc),
        Value::MultiPoint(points) | Value::LineString(points) => {
            points.iter().for_each(|p| fold_position(p, acc));
        }
        Value::MultiLineString(lines) | Value::Polygon(lines) => {
            lines.iter().flatten().for_each(|p| fold_position(p, acc));
        }
        Value::MultiPolygon(polygons) => {
            polygons
                .iter()
                .flatten()
                .flatten()
                .for_each(|p| fold_position(p, acc));
        }
        Value::GeometryCollection(geometries) => {
            geometries.iter().for_each(|g| fold_value(&g.value, acc));
        }
    }
}

fn fold_position(position: &[f64], acc: &mut Option<Bounds>) {
    let (Some(&x), Some(&y)) = (position.first(), position.get(1)) else {
        return;
    };
    if !x.is_finite() || !y.is_finite() {
        return;
    }
    let c = Coord { x, y };
    *acc = Some(match acc.take() {
        Some(b) => b.extend(c),
        None => Bounds::from_coord(c),
    });
}

/// Paramètres de cadrage transmis au rendu cartographique
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitBounds {
    pub south_west: Coord,
    pub north_east: Coord,
    /// Marge en pixels, constante
    pub padding: f64,
    /// Interpolation linéaire (pas d'easing animé)
    pub linear: bool,
}

/// Convertit une emprise en paramètres de cadrage
///
/// `None` signifie « conserver la vue courante », jamais « cadrer sur [0,0] ».
pub fn fit_parameters(bounds: Option<&Bounds>) -> Option<FitBounds> {
    bounds.map(|b| FitBounds {
        south_west: b.south_west(),
        north_east: b.north_east(),
        padding: FIT_PADDING,
        linear: true,
    })
}
