//! Cadrage de la caméra en Web Mercator (EPSG:3857)
//!
//! Calcule le centre et le niveau de zoom qui font tenir une emprise dans
//! l'écran, marge comprise, comme le fait le rendu cartographique.

use geo::Coord;

use crate::bounds::FitBounds;

use super::ViewportCommand;

/// Rayon équatorial WGS84 en mètres
const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude limite de la projection
const MAX_LATITUDE: f64 = 85.051_128_78;

/// Taille d'une tuile vectorielle en pixels
pub const TILE_SIZE: f64 = 512.0;

pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 20.0;

/// Taille de la carte en pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenSize {
    pub width: f64,
    pub height: f64,
}

/// Position de la caméra
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Centre (lon, lat) en degrés
    pub center: Coord,
    pub zoom: f64,
}

impl Camera {
    pub fn new(center: Coord, zoom: f64) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }

    /// Caméra cadrant `fit` sur un écran de taille `screen`
    ///
    /// Une emprise réduite à un point donne le zoom maximal.
    pub fn fit(fit: &FitBounds, screen: ScreenSize) -> Self {
        let sw = to_web_mercator(fit.south_west);
        let ne = to_web_mercator(fit.north_east);

        let available_width = (screen.width - 2.0 * fit.padding).max(1.0);
        let available_height = (screen.height - 2.0 * fit.padding).max(1.0);

        let zoom = zoom_for_extent(ne.x - sw.x, available_width)
            .min(zoom_for_extent(ne.y - sw.y, available_height));

        let center = from_web_mercator(Coord {
            x: (sw.x + ne.x) / 2.0,
            y: (sw.y + ne.y) / 2.0,
        });

        Self::new(center, zoom)
    }

    /// Applique une commande de viewport ; `Retain` laisse la caméra intacte
    pub fn apply(self, command: &ViewportCommand, screen: ScreenSize) -> Self {
        match command {
            ViewportCommand::Retain => self,
            ViewportCommand::Fit(fit) => Self::fit(fit, screen),
        }
    }
}

/// Zoom pour lequel `extent` mètres tiennent dans `pixels` pixels
fn zoom_for_extent(extent: f64, pixels: f64) -> f64 {
    if extent <= 0.0 {
        return MAX_ZOOM;
    }
    let world = 2.0 * std::f64::consts::PI * EARTH_RADIUS;
    (world * pixels / (TILE_SIZE * extent)).log2()
}

/// Convertit (lon, lat) en degrés vers Web Mercator (mètres)
fn to_web_mercator(c: Coord) -> Coord {
    let lon = c.x.to_radians();
    let lat = c.y.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();

    Coord {
        x: EARTH_RADIUS * lon,
        y: EARTH_RADIUS * (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln(),
    }
}

/// Convertit Web Mercator (mètres) vers (lon, lat) en degrés
fn from_web_mercator(c: Coord) -> Coord {
    let lon = c.x / EARTH_RADIUS;
    let lat = 2.0 * (c.y / EARTH_RADIUS).exp().atan() - std::f64::consts::FRAC_PI_2;

    Coord {
        x: lon.to_degrees(),
        y: lat.to_degrees(),
    }
}
