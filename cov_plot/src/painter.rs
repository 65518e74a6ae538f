use std::{fmt, str::FromStr};

use plotters::style::RGBColor;

use crate::band::{BandGeometry, BandSlice};

/// Colours used by the band painters
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub green: RGBColor,
    pub red: RGBColor,
    pub purple: RGBColor,
    pub yellow: RGBColor,
    pub cyan: RGBColor,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            green: RGBColor(0x28, 0x96, 0x2D),
            red: RGBColor(0xCA, 0x28, 0x28),
            purple: RGBColor(0x35, 0x48, 0x8B),
            yellow: RGBColor(0xDF, 0xC9, 0x2C),
            cyan: RGBColor(0x2A, 0xB5, 0xAA),
        }
    }
}

/// A closed, filled polygon in chart coordinates
#[derive(Debug, Clone)]
pub struct FilledShape {
    pub points: Vec<(f64, f64)>,
    pub colour: RGBColor,
    pub opacity: f64,
}

/// Draws the contents of a single band
///
/// `columns` is the number of horizontal sample points available for the
/// band, normally one per pixel.  Shapes must stay inside the band rectangle.
/// The default painter draws nothing.
pub trait BandPainter {
    fn tag(&self) -> Option<&str> {
        None
    }

    fn shapes(&self, _band: &BandGeometry, _slice: &BandSlice, _columns: usize) -> Vec<FilledShape> {
        Vec::new()
    }
}

/// Band outlines only
pub struct FramePainter;

impl BandPainter for FramePainter {}

/// ok coverage (on top of the total in a lighter shade) above the band
/// centre, high and low coverage stacked below it
pub struct CoveragePainter {
    palette: Palette,
}

impl CoveragePainter {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }
}

impl BandPainter for CoveragePainter {
    fn shapes(&self, band: &BandGeometry, slice: &BandSlice, columns: usize) -> Vec<FilledShape> {
        if slice.is_empty() {
            return Vec::new();
        }
        let bucket = bucket_size(band.width(), columns);
        let edges = bucket_edges(slice.len(), bucket);
        let zero = vec![0.0; edges.len()];
        let all = bucket_max(slice.all(), bucket);
        let ok = bucket_max(slice.ok(), bucket);
        let high: Vec<f64> = bucket_max(slice.high(), bucket)
            .iter()
            .map(|x| -x)
            .collect();
        let high_low: Vec<f64> = slice
            .high()
            .iter()
            .zip(slice.low())
            .map(|(h, l)| h + l)
            .collect();
        let high_low: Vec<f64> = bucket_max(&high_low, bucket)
            .iter()
            .map(|x| -x)
            .collect();

        vec![
            FilledShape {
                points: fill_between(band, &edges, &zero, &all),
                colour: self.palette.yellow,
                opacity: 0.4,
            },
            FilledShape {
                points: fill_between(band, &edges, &zero, &ok),
                colour: self.palette.green,
                opacity: 0.9,
            },
            FilledShape {
                points: fill_between(band, &edges, &zero, &high),
                colour: self.palette.red,
                opacity: 0.9,
            },
            FilledShape {
                points: fill_between(band, &edges, &high, &high_low),
                colour: self.palette.purple,
                opacity: 0.9,
            },
        ]
    }
}

/// Binned high coverage above the band centre, binned low coverage below
pub struct BinnedPainter {
    palette: Palette,
}

impl BinnedPainter {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }
}

impl BandPainter for BinnedPainter {
    fn tag(&self) -> Option<&str> {
        Some("binned")
    }

    fn shapes(&self, band: &BandGeometry, slice: &BandSlice, columns: usize) -> Vec<FilledShape> {
        if slice.is_empty() {
            return Vec::new();
        }
        let bucket = bucket_size(band.width(), columns);
        let edges = bucket_edges(slice.len(), bucket);
        let zero = vec![0.0; edges.len()];
        let high = bucket_max(slice.high_binned(), bucket);
        let low: Vec<f64> = bucket_max(slice.low_binned(), bucket)
            .iter()
            .map(|x| -x)
            .collect();
        vec![
            FilledShape {
                points: fill_between(band, &edges, &zero, &high),
                colour: self.palette.red,
                opacity: 0.9,
            },
            FilledShape {
                points: fill_between(band, &edges, &zero, &low),
                colour: self.palette.cyan,
                opacity: 0.9,
            },
        ]
    }
}

/// Selects the band painter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotKind {
    Coverage,
    Binned,
    Frame,
}

impl PlotKind {
    pub fn painter(&self, palette: Palette) -> Box<dyn BandPainter> {
        match self {
            Self::Coverage => Box::new(CoveragePainter::new(palette)),
            Self::Binned => Box::new(BinnedPainter::new(palette)),
            Self::Frame => Box::new(FramePainter),
        }
    }
}

impl FromStr for PlotKind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "coverage" => Ok(Self::Coverage),
            "binned" => Ok(Self::Binned),
            "frame" => Ok(Self::Frame),
            _ => Err("no match"),
        }
    }
}

impl fmt::Display for PlotKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::Coverage => "coverage",
            Self::Binned => "binned",
            Self::Frame => "frame",
        };
        write!(f, "{}", s)
    }
}

/// Number of positions per sample point so that a band of width nt fits in columns
pub fn bucket_size(width: usize, columns: usize) -> usize {
    width.div_ceil(columns.max(1)).max(1)
}

/// Maximum of each consecutive block of `bucket` values
pub fn bucket_max(v: &[f64], bucket: usize) -> Vec<f64> {
    v.chunks(bucket.max(1))
        .map(|c| c.iter().copied().fold(f64::NEG_INFINITY, f64::max))
        .collect()
}

/// Local x range (left, right) of each block
fn bucket_edges(len: usize, bucket: usize) -> Vec<(f64, f64)> {
    let bucket = bucket.max(1);
    (0..len)
        .step_by(bucket)
        .map(|a| (a as f64, (a + bucket).min(len) as f64))
        .collect()
}

/// Polygon between two step profiles given as offsets from the band centre.
/// The profiles are clamped to the band rectangle
fn fill_between(
    band: &BandGeometry,
    edges: &[(f64, f64)],
    lower: &[f64],
    upper: &[f64],
) -> Vec<(f64, f64)> {
    let y = |d: f64| band.clamp(band.centre() + d);
    let mut pts = Vec::with_capacity(edges.len() * 4);
    for ((a, b), d) in edges.iter().zip(upper) {
        pts.push((*a, y(*d)));
        pts.push((*b, y(*d)));
    }
    for ((a, b), d) in edges.iter().zip(lower).rev() {
        pts.push((*b, y(*d)));
        pts.push((*a, y(*d)));
    }
    pts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::YScale, data::tests::synthetic, layout::Layout};

    #[test]
    fn bucketing() {
        assert_eq!(bucket_size(1000, 100), 10);
        assert_eq!(bucket_size(1001, 100), 11);
        assert_eq!(bucket_size(10, 100), 1);
        assert_eq!(bucket_size(10, 0), 10);
        assert_eq!(bucket_max(&[1.0, 5.0, 2.0, 0.0, 3.0], 2), vec![5.0, 2.0, 3.0]);
        assert_eq!(
            bucket_edges(5, 2),
            vec![(0.0, 2.0), (2.0, 4.0), (4.0, 5.0)]
        );
    }

    #[test]
    fn kinds() {
        assert_eq!(PlotKind::from_str("Binned"), Ok(PlotKind::Binned));
        assert!(PlotKind::from_str("pie").is_err());
        assert_eq!(PlotKind::Frame.to_string(), "frame");
        let p = Palette::default();
        assert_eq!(PlotKind::Binned.painter(p).tag(), Some("binned"));
        assert_eq!(PlotKind::Coverage.painter(p).tag(), None);
    }

    #[test]
    fn shapes_stay_inside_band() {
        let ds = synthetic(5000);
        let l = Layout::plan(5000, None, None, Some(2000), YScale::Max(40.0), ds.okh()).unwrap();
        let p = CoveragePainter::new(Palette::default());
        for b in BandGeometry::all(&l) {
            let s = b.slice(&ds);
            let shapes = p.shapes(&b, &s, 100);
            assert_eq!(shapes.len(), 4);
            for sh in shapes.iter() {
                // two points per bucket on each edge
                assert_eq!(sh.points.len(), 4 * s.len().div_ceil(20));
                for (x, y) in sh.points.iter() {
                    assert!(*x >= 0.0 && *x <= b.width() as f64);
                    assert!(*y <= b.top() && *y >= b.bottom());
                }
            }
        }
        let b = BandGeometry::new(&l, 0);
        assert!(FramePainter.shapes(&b, &b.slice(&ds), 100).is_empty());
    }

    #[test]
    fn fill_profile() {
        let ds = synthetic(100);
        let l = Layout::plan(4, None, None, None, YScale::Max(50.0), ds.okh()).unwrap();
        let b = BandGeometry::new(&l, 0);
        let edges = bucket_edges(4, 2);
        let pts = fill_between(&b, &edges, &[0.0, 0.0], &[10.0, 80.0]);
        let c = b.centre();
        assert_eq!(
            pts,
            vec![
                (0.0, c + 10.0),
                (2.0, c + 10.0),
                (2.0, b.top()),
                (4.0, b.top()),
                (4.0, c),
                (2.0, c),
                (2.0, c),
                (0.0, c),
            ]
        );
    }
}
