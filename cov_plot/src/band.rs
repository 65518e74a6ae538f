use crate::{data::CoverageDataset, layout::Layout};

/// BandGeometry
///
/// Position of a single band, both along the sequence and on the y axis
///
/// start, stop - sequence range covered by the band (stop exclusive, never past the plot stop)
/// width - nucleotides per band; the band rectangle always spans 0..width
/// centre - vertical offset of the band's zero line
/// top, bottom - vertical limits of the band rectangle
///
#[derive(Debug, Clone, PartialEq)]
pub struct BandGeometry {
    index: usize,
    start: usize,
    stop: usize,
    width: usize,
    centre: f64,
    top: f64,
    bottom: f64,
}

impl BandGeometry {
    pub fn new(layout: &Layout, index: usize) -> Self {
        let width = layout.nt_per_band();
        let start = layout.start() + index * width;
        let stop = (start + width).min(layout.stop());
        let centre = layout.band_centre(index);
        let half = 0.5 * layout.spacing();
        Self {
            index,
            start,
            stop,
            width,
            centre,
            top: centre + half,
            bottom: centre - half,
        }
    }

    /// All bands of a layout, top to bottom
    pub fn all(layout: &Layout) -> Vec<Self> {
        (0..layout.n_bands()).map(|i| Self::new(layout, i)).collect()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn stop(&self) -> usize {
        self.stop
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn centre(&self) -> f64 {
        self.centre
    }

    pub fn top(&self) -> f64 {
        self.top
    }

    pub fn bottom(&self) -> f64 {
        self.bottom
    }

    /// Keep y inside the band rectangle
    pub fn clamp(&self, y: f64) -> f64 {
        y.max(self.bottom).min(self.top)
    }

    /// Corners of the band rectangle in chart coordinates
    pub fn rect(&self) -> [(f64, f64); 2] {
        [(0.0, self.top()), (self.width as f64, self.bottom())]
    }

    /// Restrict the per position vectors of ds to this band
    pub fn slice<'a>(&self, ds: &'a CoverageDataset) -> BandSlice<'a> {
        let a = self.start.min(ds.seq_len());
        let b = self.stop.min(ds.seq_len());
        BandSlice {
            start: a,
            ok: &ds.ok()[a..b],
            high: &ds.high()[a..b],
            low: &ds.low()[a..b],
            low_binned: &ds.low_binned()[a..b],
            high_binned: &ds.high_binned()[a..b],
            all: &ds.all()[a..b],
        }
    }

    /// Left hand tick: band centre labelled with the band start position
    pub fn primary_tick(&self) -> Tick {
        Tick {
            y: self.centre,
            label: format!("{:.2e}", self.start as f64),
        }
    }

    /// Right hand ticks at -h, 0 and h around the band centre
    pub fn secondary_ticks(&self, h: f64) -> [Tick; 3] {
        let lab = |x: f64| format!("{}", x.trunc() as i64);
        [
            Tick {
                y: self.centre - h,
                label: lab(-h),
            },
            Tick {
                y: self.centre,
                label: lab(0.0),
            },
            Tick {
                y: self.centre + h,
                label: lab(h),
            },
        ]
    }
}

/// Per position data for one band; x coordinates are local to the band
pub struct BandSlice<'a> {
    start: usize,
    ok: &'a [f64],
    high: &'a [f64],
    low: &'a [f64],
    low_binned: &'a [f64],
    high_binned: &'a [f64],
    all: &'a [f64],
}

impl<'a> BandSlice<'a> {
    /// Sequence position of local x = 0
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn len(&self) -> usize {
        self.ok.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ok.is_empty()
    }

    pub fn ok(&self) -> &'a [f64] {
        self.ok
    }

    pub fn high(&self) -> &'a [f64] {
        self.high
    }

    pub fn low(&self) -> &'a [f64] {
        self.low
    }

    pub fn low_binned(&self) -> &'a [f64] {
        self.low_binned
    }

    pub fn high_binned(&self) -> &'a [f64] {
        self.high_binned
    }

    pub fn all(&self) -> &'a [f64] {
        self.all
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub y: f64,
    pub label: String,
}

/// Tick marks for the left (band start) and right (coverage scale) axes
#[derive(Debug, Default)]
pub struct Ticks {
    pub primary: Vec<Tick>,
    pub secondary: Vec<Tick>,
}

impl Ticks {
    pub fn collect(bands: &[BandGeometry], h: f64) -> Self {
        let mut t = Self::default();
        for b in bands {
            t.primary.push(b.primary_tick());
            t.secondary.extend(b.secondary_ticks(h));
        }
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::YScale, data::tests::synthetic};

    fn layout(ds: &CoverageDataset, start: Option<usize>, nt: usize) -> Layout {
        Layout::plan(ds.seq_len(), start, None, Some(nt), YScale::Max(10.0), ds.okh()).unwrap()
    }

    #[test]
    fn band_ranges_cover_plot() {
        let ds = synthetic(2500);
        let l = layout(&ds, Some(100), 1000);
        let bands = BandGeometry::all(&l);
        assert_eq!(bands.len(), 3);
        let r: Vec<_> = bands.iter().map(|b| (b.start(), b.stop())).collect();
        assert_eq!(r, vec![(100, 1100), (1100, 2100), (2100, 2500)]);
        assert!(bands.iter().all(|b| b.width() == 1000));
        assert_eq!(bands[1].centre(), -40.0);
        assert_eq!((bands[1].top(), bands[1].bottom()), (-30.0, -50.0));
        assert_eq!(bands[1].rect(), [(0.0, -30.0), (1000.0, -50.0)]);
        assert_eq!(bands[1].clamp(0.0), -30.0);
        assert_eq!(bands[1].clamp(-45.0), -45.0);
        assert_eq!(bands[1].clamp(-100.0), -50.0);
    }

    #[test]
    fn slice_matches_dataset() {
        let ds = synthetic(2500);
        let l = layout(&ds, None, 1000);
        let b = BandGeometry::new(&l, 2);
        let s = b.slice(&ds);
        assert_eq!(s.len(), 500);
        assert_eq!(s.start(), 2000);
        assert_eq!(s.ok()[0], ds.ok()[2000]);
        assert_eq!(s.all()[499], ds.all()[2499]);
        assert_eq!(s.high().len(), 500);
        assert_eq!(s.low_binned()[3], ds.low_binned()[2003]);
    }

    #[test]
    fn ticks() {
        let ds = synthetic(3000);
        let l = layout(&ds, None, 1000);
        let bands = BandGeometry::all(&l);
        let t = Ticks::collect(&bands, 24.75);
        assert_eq!(t.primary.len(), 3);
        assert_eq!(t.secondary.len(), 9);
        assert_eq!(t.primary[1].label, "1.00e3");
        assert_eq!(t.primary[1].y, -40.0);
        let labels: Vec<_> = t.secondary[..3].iter().map(|x| x.label.as_str()).collect();
        assert_eq!(labels, vec!["-24", "0", "24"]);
        assert_eq!(t.secondary[0].y, -20.0 - 24.75);
    }
}
