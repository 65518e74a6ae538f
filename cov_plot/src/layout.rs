use crate::config::YScale;

/// Step (and starting value) for automatic band sizing
pub const AUTO_NT_STEP: usize = 1_000_000;
/// Maximum number of bands produced by automatic sizing
pub const AUTO_MAX_BANDS: usize = 5;

/// Layout
///
/// Band layout for a plot, derived from the sequence length and the
/// requested range, band size and y scaling
///
/// start, stop - plotted range (stop is exclusive)
/// n_bands - number of bands
/// nt_per_band - nucleotides per band (never more than stop - start)
/// max_y - y axis covers -max_y..max_y for each band
///
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    start: usize,
    stop: usize,
    n_bands: usize,
    nt_per_band: usize,
    max_y: f64,
}

impl Layout {
    /// Plan the layout
    ///
    /// A stop beyond seq_len is clamped; a start at or beyond the (clamped) stop
    /// is an error.  okh is the half scaled ok coverage used for the y fraction.
    pub fn plan(
        seq_len: usize,
        start: Option<usize>,
        stop: Option<usize>,
        nt_per_band: Option<usize>,
        yscale: YScale,
        okh: &[f64],
    ) -> anyhow::Result<Self> {
        let start = start.unwrap_or(0);
        let stop = match stop {
            Some(x) if x > seq_len => {
                debug!("Stop {} beyond sequence end; clamping to {}", x, seq_len);
                seq_len
            }
            Some(x) => x,
            None => seq_len,
        };
        if start >= stop {
            return Err(anyhow!(
                "Empty plot range: start {} is not before stop {} (sequence length {})",
                start,
                stop,
                seq_len
            ));
        }
        let plot_len = stop - start;

        let (nt, n_bands) = match nt_per_band {
            Some(0) => return Err(anyhow!("Nucleotides per band must be greater than zero")),
            Some(nt) => (nt, plot_len.div_ceil(nt)),
            None => {
                debug!("nt per band is not specified");
                auto_band_size(plot_len)
            }
        };
        let nt = nt.min(plot_len);

        let max_y = match yscale {
            YScale::Max(m) => m.trunc(),
            YScale::Fraction(f) => utils::quantile(okh, f)
                .ok_or_else(|| anyhow!("Could not get quantile {} of coverage", f))?
                .trunc(),
        };
        let max_y = if max_y > 0.0 {
            max_y
        } else {
            warn!("Y axis maximum {} is not positive; using 1", max_y);
            1.0
        };

        info!("Plotting {} nucleotides per band", nt);
        info!("Plotting from {} to {} ({} nt)", start, stop, plot_len);
        info!("Plotting {} bands", n_bands);
        debug!("Y axis limits: -{} to {}", max_y, max_y);

        Ok(Self {
            start,
            stop,
            n_bands,
            nt_per_band: nt,
            max_y,
        })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn stop(&self) -> usize {
        self.stop
    }

    pub fn plot_len(&self) -> usize {
        self.stop - self.start
    }

    pub fn n_bands(&self) -> usize {
        self.n_bands
    }

    pub fn nt_per_band(&self) -> usize {
        self.nt_per_band
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    /// Vertical distance between the centres of adjacent bands
    pub fn spacing(&self) -> f64 {
        2.0 * self.max_y
    }

    /// Vertical centre of band ix; bands stack downwards from the top
    pub fn band_centre(&self, ix: usize) -> f64 {
        -((ix + 1) as f64) * self.spacing()
    }

    /// Range of the y axis over all bands (bottom, top)
    pub fn y_range(&self) -> (f64, f64) {
        (
            self.band_centre(self.n_bands.saturating_sub(1)) - self.max_y,
            self.band_centre(0) + self.max_y,
        )
    }
}

/// Start at AUTO_NT_STEP nt per band and grow in steps of AUTO_NT_STEP
/// until there are no more than AUTO_MAX_BANDS bands
fn auto_band_size(plot_len: usize) -> (usize, usize) {
    let mut nt = AUTO_NT_STEP;
    let mut n_bands = plot_len.div_ceil(nt);
    while n_bands > AUTO_MAX_BANDS {
        nt += AUTO_NT_STEP;
        n_bands = plot_len.div_ceil(nt);
    }
    (nt, n_bands)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAC: YScale = YScale::Fraction(0.98);

    fn okh(n: usize) -> Vec<f64> {
        (0..n).map(|i| (i % 100) as f64).collect()
    }

    #[test]
    fn auto_band_count_is_minimal() {
        let v = okh(10);
        for (len, exp_nt, exp_bands) in [
            (1usize, 1usize, 1usize),
            (4_999_999, 1_000_000, 5),
            (5_000_000, 1_000_000, 5),
            (5_000_001, 2_000_000, 3),
            (12_000_000, 3_000_000, 4),
            (30_000_001, 7_000_000, 5),
        ] {
            let l = Layout::plan(len, None, None, None, FRAC, &v).unwrap();
            assert_eq!(l.n_bands(), exp_bands, "len {}", len);
            assert!(l.nt_per_band() <= l.plot_len());
            assert_eq!(l.nt_per_band(), exp_nt.min(len), "len {}", len);
            // one fewer step would give too many bands
            if exp_nt > AUTO_NT_STEP {
                assert!(len.div_ceil(exp_nt - AUTO_NT_STEP) > AUTO_MAX_BANDS);
            }
        }
    }

    #[test]
    fn explicit_band_size() {
        let v = okh(10);
        let l = Layout::plan(10_500, None, None, Some(1000), FRAC, &v).unwrap();
        assert_eq!(l.n_bands(), 11);
        assert_eq!(l.nt_per_band(), 1000);
        let l = Layout::plan(10_500, Some(500), Some(1000), Some(1000), FRAC, &v).unwrap();
        assert_eq!(l.n_bands(), 1);
        assert_eq!(l.nt_per_band(), 500);
        assert!(Layout::plan(100, None, None, Some(0), FRAC, &v).is_err());
    }

    #[test]
    fn stop_clamped_to_sequence_length() {
        let v = okh(10);
        let l = Layout::plan(2000, Some(100), Some(1_000_000), None, FRAC, &v).unwrap();
        assert_eq!(l.stop(), 2000);
        assert_eq!(l.plot_len(), 1900);
        assert_eq!(l.nt_per_band(), 1900);
        assert!(Layout::plan(2000, Some(2000), None, None, FRAC, &v).is_err());
        assert!(Layout::plan(2000, Some(300), Some(200), None, FRAC, &v).is_err());
    }

    #[test]
    fn y_max_from_quantile() {
        // 0..99 repeated 10 times; sorted index floor(0.98 * 1000) = 980 => 98
        let v = okh(1000);
        let l = Layout::plan(1000, None, None, None, FRAC, &v).unwrap();
        assert_eq!(l.max_y(), 98.0);
        assert_eq!(l.spacing(), 196.0);

        let half: Vec<f64> = v.iter().map(|x| x + 0.5).collect();
        let l = Layout::plan(1000, None, None, None, FRAC, &half).unwrap();
        assert_eq!(l.max_y(), 98.0);

        let l = Layout::plan(1000, None, None, None, YScale::Max(12.5), &v).unwrap();
        assert_eq!(l.max_y(), 12.0);

        let l = Layout::plan(1000, None, None, None, YScale::Max(0.5), &v).unwrap();
        assert_eq!(l.max_y(), 1.0);

        let zero = vec![0.0; 100];
        let l = Layout::plan(100, None, None, None, FRAC, &zero).unwrap();
        assert_eq!(l.max_y(), 1.0);
    }

    #[test]
    fn bands_stack_downwards() {
        let v = okh(100);
        let l = Layout::plan(3000, None, None, Some(1000), YScale::Max(10.0), &v).unwrap();
        assert_eq!(l.band_centre(0), -20.0);
        assert_eq!(l.band_centre(1), -40.0);
        assert_eq!(l.band_centre(2), -60.0);
        assert_eq!(l.y_range(), (-70.0, -10.0));
    }
}
