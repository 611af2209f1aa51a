//! Clé de mémoïsation d'une géométrie
//!
//! Deux géométries de même valeur (au centimètre près) ont la même clé, ce qui
//! évite de recalculer l'emprise et de déplacer la carte inutilement.

use blake3::Hasher;
use geojson::{Geometry, Value};

/// Hash stable d'une géométrie GeoJSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryKey([u8; 32]);

impl GeometryKey {
    /// Calcule la clé d'une géométrie
    pub fn of(geometry: &Geometry) -> Self {
        let mut hasher = Hasher::new();
        hash_value(&mut hasher, &geometry.value);
        Self(*hasher.finalize().as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for GeometryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 8 octets suffisent pour les logs
        f.write_str(&hex::encode(&self.0[..8]))
    }
}

fn hash_value(hasher: &mut Hasher, value: &Value) {
    match value {
        Value::Point(p) => {
            hasher.update(b"POINT");
            hash_position(hasher, p);
        }
        Value::MultiPoint(points) => {
            hasher.update(b"MULTIPOINT");
            hash_positions(hasher, points);
        }
        Value::LineString(points) => {
            hasher.update(b"LINESTRING");
            hash_positions(hasher, points);
        }
        Value::MultiLineString(lines) => {
            hasher.update(b"MULTILINESTRING");
            hash_len(hasher, lines.len());
            for line in lines {
                hasher.update(b"LS");
                hash_positions(hasher, line);
            }
        }
        Value::Polygon(rings) => {
            hasher.update(b"POLYGON");
            hash_rings(hasher, rings);
        }
        Value::MultiPolygon(polygons) => {
            hasher.update(b"MULTIPOLYGON");
            hash_len(hasher, polygons.len());
            for rings in polygons {
                hasher.update(b"POLY");
                hash_rings(hasher, rings);
            }
        }
        Value::GeometryCollection(geometries) => {
            hasher.update(b"COLLECTION");
            hash_len(hasher, geometries.len());
            for g in geometries {
                hash_value(hasher, &g.value);
            }
        }
    }
}

fn hash_rings(hasher: &mut Hasher, rings: &[Vec<Vec<f64>>]) {
    hash_len(hasher, rings.len());
    for (i, ring) in rings.iter().enumerate() {
        hasher.update(if i == 0 { b"EXT" } else { b"INT" });
        hash_positions(hasher, ring);
    }
}

fn hash_positions(hasher: &mut Hasher, positions: &[Vec<f64>]) {
    hash_len(hasher, positions.len());
    for p in positions {
        hash_position(hasher, p);
    }
}

fn hash_len(hasher: &mut Hasher, len: usize) {
    hasher.update(&(len as u64).to_le_bytes());
}

/// Hash une position avec arrondi à 7 décimales (~1 cm en WGS84)
fn hash_position(hasher: &mut Hasher, position: &[f64]) {
    hash_len(hasher, position.len());
    for v in position {
        let rounded = (v * 10_000_000.0).round() as i64;
        hasher.update(&rounded.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f64, y: f64) -> Geometry {
        Geometry::new(Value::Point(vec![x, y]))
    }

    #[test]
    fn test_same_geometry_same_key() {
        assert_eq!(GeometryKey::of(&point(1.0, 2.0)), GeometryKey::of(&point(1.0, 2.0)));
    }

    #[test]
    fn test_different_geometry_different_key() {
        assert_ne!(GeometryKey::of(&point(1.0, 2.0)), GeometryKey::of(&point(1.0, 3.0)));
    }

    #[test]
    fn test_sub_centimeter_noise_is_ignored() {
        assert_eq!(
            GeometryKey::of(&point(5.724_524_1, 45.188_529_0)),
            GeometryKey::of(&point(5.724_524_100_01, 45.188_529_0))
        );
    }

    #[test]
    fn test_type_is_part_of_key() {
        let positions = vec![vec![0.0, 0.0], vec![1.0, 1.0]];
        let line = Geometry::new(Value::LineString(positions.clone()));
        let multi = Geometry::new(Value::MultiPoint(positions));
        assert_ne!(GeometryKey::of(&line), GeometryKey::of(&multi));
    }

    #[test]
    fn test_hex_formats() {
        let key = GeometryKey::of(&point(0.0, 0.0));
        assert_eq!(key.to_hex().len(), 64);
        assert_eq!(key.to_string().len(), 16);
        assert!(key.to_hex().starts_with(&key.to_string()));
    }
}
