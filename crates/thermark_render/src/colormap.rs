//! Named colormaps for heat-map rendering.
//!
//! Each map is a short list of color stops over `0.0..=1.0`; values between
//! stops are linearly interpolated. The stops are coarse approximations of
//! the perceptual maps commonly used for thermal imagery.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::RenderError;

/// Colormaps available to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Colormap {
    #[default]
    Magma,
    Inferno,
    Jet,
    Hot,
    Gray,
    Viridis,
    Plasma,
    Cividis,
    Turbo,
}

const MAGMA: &[(f32, u32)] = &[
    (0.0, 0x000004),
    (0.25, 0x51127c),
    (0.5, 0xb73779),
    (0.75, 0xfc8961),
    (1.0, 0xfcfdbf),
];
const INFERNO: &[(f32, u32)] = &[
    (0.0, 0x000004),
    (0.25, 0x57106e),
    (0.5, 0xbc3754),
    (0.75, 0xf98e09),
    (1.0, 0xfcffa4),
];
const JET: &[(f32, u32)] = &[
    (0.0, 0x00007f),
    (0.125, 0x0000ff),
    (0.375, 0x00ffff),
    (0.625, 0xffff00),
    (0.875, 0xff0000),
    (1.0, 0x7f0000),
];
const HOT: &[(f32, u32)] = &[
    (0.0, 0x0b0000),
    (0.375, 0xff0000),
    (0.75, 0xffff00),
    (1.0, 0xffffff),
];
const GRAY: &[(f32, u32)] = &[(0.0, 0x000000), (1.0, 0xffffff)];
const VIRIDIS: &[(f32, u32)] = &[
    (0.0, 0x440154),
    (0.25, 0x3b528b),
    (0.5, 0x21918c),
    (0.75, 0x5ec962),
    (1.0, 0xfde725),
];
const PLASMA: &[(f32, u32)] = &[
    (0.0, 0x0d0887),
    (0.25, 0x7e03a8),
    (0.5, 0xcc4778),
    (0.75, 0xf89540),
    (1.0, 0xf0f921),
];
const CIVIDIS: &[(f32, u32)] = &[
    (0.0, 0x00224e),
    (0.25, 0x414d6b),
    (0.5, 0x7c7b78),
    (0.75, 0xbcaf6f),
    (1.0, 0xfee838),
];
const TURBO: &[(f32, u32)] = &[
    (0.0, 0x30123b),
    (0.17, 0x4686fb),
    (0.33, 0x1ae4b6),
    (0.5, 0xa2fc3c),
    (0.67, 0xfabb38),
    (0.83, 0xe4460a),
    (1.0, 0x7a0403),
];

impl Colormap {
    /// Get the identifier used in configuration files and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Colormap::Magma => "magma",
            Colormap::Inferno => "inferno",
            Colormap::Jet => "jet",
            Colormap::Hot => "hot",
            Colormap::Gray => "gray",
            Colormap::Viridis => "viridis",
            Colormap::Plasma => "plasma",
            Colormap::Cividis => "cividis",
            Colormap::Turbo => "turbo",
        }
    }

    /// Get all available colormaps.
    pub fn all() -> &'static [Colormap] {
        &[
            Colormap::Magma,
            Colormap::Inferno,
            Colormap::Jet,
            Colormap::Hot,
            Colormap::Gray,
            Colormap::Viridis,
            Colormap::Plasma,
            Colormap::Cividis,
            Colormap::Turbo,
        ]
    }

    fn stops(&self) -> &'static [(f32, u32)] {
        match self {
            Colormap::Magma => MAGMA,
            Colormap::Inferno => INFERNO,
            Colormap::Jet => JET,
            Colormap::Hot => HOT,
            Colormap::Gray => GRAY,
            Colormap::Viridis => VIRIDIS,
            Colormap::Plasma => PLASMA,
            Colormap::Cividis => CIVIDIS,
            Colormap::Turbo => TURBO,
        }
    }

    /// Map a normalized value to a color. NaN maps to the low end.
    pub fn sample(&self, t: f32) -> Color {
        let stops = self.stops();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        for pair in stops.windows(2) {
            let (t0, c0) = pair[0];
            let (t1, c1) = pair[1];
            if t <= t1 {
                let span = t1 - t0;
                let local = if span > 0.0 { (t - t0) / span } else { 0.0 };
                return Color::from_hex(c0).lerp(Color::from_hex(c1), local);
            }
        }

        stops
            .last()
            .map(|&(_, c)| Color::from_hex(c))
            .unwrap_or(Color::BLACK)
    }

    /// Map a raw sample to a color given the display levels.
    pub fn map_value(&self, value: f32, low: f32, high: f32) -> Color {
        let range = high - low;
        let t = if range > 0.0 {
            (value - low) / range
        } else if value >= high {
            1.0
        } else {
            0.0
        };
        self.sample(t)
    }
}

impl FromStr for Colormap {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        // "grey" is accepted as an alias
        let wanted = if wanted == "grey" { "gray".to_string() } else { wanted };
        Colormap::all()
            .iter()
            .copied()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| RenderError::UnknownColormap(s.to_string()))
    }
}

impl std::fmt::Display for Colormap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("magma".parse::<Colormap>().unwrap(), Colormap::Magma);
        assert_eq!("  Inferno ".parse::<Colormap>().unwrap(), Colormap::Inferno);
        assert_eq!("grey".parse::<Colormap>().unwrap(), Colormap::Gray);
        assert!("rainbow".parse::<Colormap>().is_err());
    }

    #[test]
    fn test_every_map_round_trips_through_name() {
        for map in Colormap::all() {
            assert_eq!(map.name().parse::<Colormap>().unwrap(), *map);
        }
    }

    #[test]
    fn test_gray_endpoints() {
        assert_eq!(Colormap::Gray.sample(0.0).to_rgba8(), [0, 0, 0, 255]);
        assert_eq!(Colormap::Gray.sample(1.0).to_rgba8(), [255, 255, 255, 255]);
        assert_eq!(Colormap::Gray.sample(-5.0).to_rgba8(), [0, 0, 0, 255]);
        assert_eq!(Colormap::Gray.sample(f32::NAN).to_rgba8(), [0, 0, 0, 255]);
    }

    #[test]
    fn test_map_value_saturates_outside_levels() {
        let lo = Colormap::Gray.map_value(-10.0, 0.0, 100.0);
        let hi = Colormap::Gray.map_value(500.0, 0.0, 100.0);
        assert_eq!(lo.to_rgba8(), [0, 0, 0, 255]);
        assert_eq!(hi.to_rgba8(), [255, 255, 255, 255]);
    }

    #[test]
    fn test_map_value_degenerate_levels() {
        // low == high must not divide by zero
        assert_eq!(Colormap::Gray.map_value(5.0, 5.0, 5.0).to_rgba8(), [255, 255, 255, 255]);
        assert_eq!(Colormap::Gray.map_value(4.0, 5.0, 5.0).to_rgba8(), [0, 0, 0, 255]);
    }
}
