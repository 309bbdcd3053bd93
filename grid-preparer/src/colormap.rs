/// Colour ramps for heatmap tiles. Every ramp takes a value already
/// normalised to [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Colormap {
    /// Blue to red around the HSL hue wheel
    Hue,
    Jet,
    Viridis,
    Turbo,
}

type Rgb = (f64, f64, f64);

/// `(position, colour)` stops, positions ascending from 0.0 to 1.0.
const JET: [(f64, Rgb); 6] = [
    (0.0, (0.0, 0.0, 0.5)),
    (0.125, (0.0, 0.0, 1.0)),
    (0.375, (0.0, 1.0, 1.0)),
    (0.625, (1.0, 1.0, 0.0)),
    (0.875, (1.0, 0.0, 0.0)),
    (1.0, (0.5, 0.0, 0.0)),
];

const VIRIDIS: [(f64, Rgb); 5] = [
    (0.0, (0.267004, 0.004874, 0.329415)),
    (0.25, (0.282623, 0.140926, 0.457517)),
    (0.5, (0.163625, 0.471133, 0.558148)),
    (0.75, (0.477504, 0.821444, 0.318195)),
    (1.0, (0.993248, 0.906157, 0.143936)),
];

const TURBO: [(f64, Rgb); 6] = [
    (0.0, (0.18995, 0.07176, 0.23217)),
    (0.2, (0.11770, 0.56700, 0.75088)),
    (0.4, (0.17205, 0.88797, 0.54362)),
    (0.6, (0.89567, 0.99343, 0.29685)),
    (0.8, (0.97809, 0.55414, 0.10540)),
    (1.0, (0.78801, 0.08080, 0.06051)),
];

impl Colormap {
    pub fn map(&self, value: f64) -> (u8, u8, u8) {
        // NaN has no place on a ramp; show it at the low end.
        let v = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        let (r, g, b) = match self {
            Colormap::Hue => hue_ramp(v),
            Colormap::Jet => sample_stops(&JET, v),
            Colormap::Viridis => sample_stops(&VIRIDIS, v),
            Colormap::Turbo => sample_stops(&TURBO, v),
        };
        (channel(r), channel(g), channel(b))
    }
}

fn channel(c: f64) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Hue `(1 - v) * 240` degrees at 70% saturation and 50% lightness, so 0.0 is
/// blue and 1.0 is red.
fn hue_ramp(v: f64) -> Rgb {
    hsl_to_rgb((1.0 - v) * 240.0, 0.7, 0.5)
}

fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> Rgb {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = (hue / 60.0).rem_euclid(6.0);
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = lightness - chroma / 2.0;
    (r + m, g + m, b + m)
}

/// Linear interpolation between the two stops bracketing `v`.
fn sample_stops(stops: &[(f64, Rgb)], v: f64) -> Rgb {
    let upper = stops
        .iter()
        .position(|&(at, _)| at >= v)
        .unwrap_or(stops.len() - 1);
    if upper == 0 || stops[upper].0 == v {
        return stops[upper].1;
    }
    let (p0, (r0, g0, b0)) = stops[upper - 1];
    let (p1, (r1, g1, b1)) = stops[upper];
    let t = (v - p0) / (p1 - p0);
    (r0 + t * (r1 - r0), g0 + t * (g1 - g0), b0 + t * (b1 - b0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hue_ramp_runs_blue_to_red() {
        let (r, g, b) = Colormap::Hue.map(0.0);
        assert!(b > 200 && r < 50 && g < 50);
        let (r, g, b) = Colormap::Hue.map(1.0);
        assert!(r > 200 && g < 50 && b < 50);
        // Midpoint is hue 120: green.
        let (r, g, b) = Colormap::Hue.map(0.5);
        assert!(g > 200 && r < 50 && b < 50);
    }

    #[test]
    fn values_outside_unit_range_are_clamped() {
        assert_eq!(Colormap::Jet.map(-3.0), Colormap::Jet.map(0.0));
        assert_eq!(Colormap::Turbo.map(7.0), Colormap::Turbo.map(1.0));
        assert_eq!(Colormap::Viridis.map(f64::NAN), Colormap::Viridis.map(0.0));
    }

    #[test]
    fn stops_are_hit_exactly() {
        assert_eq!(sample_stops(&VIRIDIS, 0.0), VIRIDIS[0].1);
        assert_eq!(sample_stops(&VIRIDIS, 1.0), VIRIDIS[4].1);
        assert_eq!(sample_stops(&JET, 0.375), JET[2].1);
        assert_eq!(Colormap::Jet.map(0.125), (0, 0, 255));
        assert_eq!(Colormap::Jet.map(0.625), (255, 255, 0));
    }

    #[test]
    fn jet_blends_between_stops() {
        // Halfway from cyan to yellow.
        assert_eq!(Colormap::Jet.map(0.5), (128, 255, 128));
        // Dark red at the top end.
        assert_eq!(Colormap::Jet.map(1.0), (128, 0, 0));
    }

    #[test]
    fn channels_are_clamped_and_rounded() {
        assert_eq!(channel(1.2), 255);
        assert_eq!(channel(-0.1), 0);
        assert_eq!(channel(0.5), 128);
    }
}
