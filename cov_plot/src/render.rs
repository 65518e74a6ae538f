use plotters::{
    coord::{types::RangedCoordf64, Shift},
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};

use crate::{
    band::{BandGeometry, Ticks},
    data::CoverageDataset,
    layout::Layout,
    painter::BandPainter,
};

/// Extra height (px) added to the bands for the title and x axis
const FIG_EXTRA_HEIGHT: u32 = 100;
/// Left and right plot margins as fractions of the image width
const MARGIN_LEFT: f64 = 0.08;
const MARGIN_RIGHT: f64 = 0.07;
/// Largest image dimension (px) we will try to render
pub const MAX_IMAGE_DIM: u32 = 65_535;
/// Sample points per pixel column in quick mode
const QUICK_FACTOR: usize = 4;

const FONT: &str = "sans-serif";
const TITLE_SIZE: u32 = 14;
const LABEL_SIZE: u32 = 10;
const TICK_LEN: i32 = 4;

/// Figure
///
/// Everything needed to draw a coverage plot onto a plotters drawing area
///
pub struct Figure<'a> {
    data: &'a CoverageDataset,
    layout: &'a Layout,
    painter: &'a dyn BandPainter,
    title: String,
    image_width: u32,
    band_height: u32,
    quick: bool,
}

impl<'a> Figure<'a> {
    pub fn new(
        data: &'a CoverageDataset,
        layout: &'a Layout,
        painter: &'a dyn BandPainter,
        image_width: u32,
        band_height: u32,
    ) -> Self {
        let title = default_title(data.seq_id(), layout.start(), layout.stop());
        Self {
            data,
            layout,
            painter,
            title,
            image_width,
            band_height,
            quick: false,
        }
    }

    pub fn set_title<S: AsRef<str>>(&mut self, s: S) {
        self.title = s.as_ref().to_owned()
    }

    pub fn set_quick(&mut self, quick: bool) {
        self.quick = quick
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Image size in pixels
    ///
    /// Fails if either dimension would exceed MAX_IMAGE_DIM
    pub fn size(&self) -> anyhow::Result<(u32, u32)> {
        let n_bands = self.layout.n_bands();
        let height = u32::try_from(n_bands)
            .ok()
            .and_then(|n| n.checked_mul(self.band_height))
            .and_then(|h| h.checked_add(FIG_EXTRA_HEIGHT))
            .filter(|h| *h <= MAX_IMAGE_DIM)
            .ok_or_else(|| {
                anyhow!(
                    "Image too tall: {} bands of {} px (limit {} px); use fewer bands or a smaller band height",
                    n_bands,
                    self.band_height,
                    MAX_IMAGE_DIM
                )
            })?;
        if self.image_width > MAX_IMAGE_DIM {
            return Err(anyhow!(
                "Image width {} px exceeds limit of {} px",
                self.image_width,
                MAX_IMAGE_DIM
            ));
        }
        Ok((self.image_width, height))
    }

    /// Pixel margins (left, right, top/bottom)
    fn margins(&self) -> (u32, u32, u32) {
        let w = self.image_width as f64;
        (
            (w * MARGIN_LEFT).round() as u32,
            (w * MARGIN_RIGHT).round() as u32,
            FIG_EXTRA_HEIGHT / 3,
        )
    }

    /// Number of sample points available to a band painter
    fn columns(&self) -> usize {
        let (l, r, _) = self.margins();
        let px = self.image_width.saturating_sub(l + r).max(1) as usize;
        if self.quick {
            (px / QUICK_FACTOR).max(1)
        } else {
            px
        }
    }

    /// Draw the complete figure: title, axes, ticks and bands
    pub fn draw<DB>(&self, root: &DrawingArea<DB, Shift>) -> anyhow::Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE)?;
        let (l, r, tb) = self.margins();

        let mut chart = ChartBuilder::on(root)
            .margin_top(tb)
            .x_label_area_size(tb)
            .y_label_area_size(l)
            .right_y_label_area_size(r)
            .build_cartesian_2d(self.x_range(), self.y_range())?;

        chart
            .configure_mesh()
            .disable_mesh()
            .y_labels(0)
            .x_labels(6)
            .x_label_formatter(&|x| format!("{:.2e}", x))
            .label_style((FONT, LABEL_SIZE))
            .draw()?;

        let (w, _) = root.dim_in_pixel();
        root.draw(&Text::new(
            self.title.clone(),
            ((w / 2) as i32, (tb / 2) as i32),
            (FONT, TITLE_SIZE)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Center)),
        ))?;

        let bands = self.draw_bands(&mut chart)?;

        // Tick marks: left axis shows band start, right axis the coverage scale
        let ticks = Ticks::collect(&bands, self.data.stats().median_h);
        let x_right = self.layout.nt_per_band() as f64;
        let left_style = (FONT, LABEL_SIZE)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Right, VPos::Center));
        let right_style = (FONT, LABEL_SIZE)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Left, VPos::Center));
        for t in ticks.primary.iter() {
            let (px, py) = chart.backend_coord(&(0.0, t.y));
            root.draw(&PathElement::new(vec![(px - TICK_LEN, py), (px, py)], BLACK))?;
            root.draw(&Text::new(
                t.label.clone(),
                (px - TICK_LEN - 2, py),
                left_style.clone(),
            ))?;
        }
        for t in ticks.secondary.iter() {
            let (px, py) = chart.backend_coord(&(x_right, t.y));
            root.draw(&PathElement::new(vec![(px, py), (px + TICK_LEN, py)], BLACK))?;
            root.draw(&Text::new(
                t.label.clone(),
                (px + TICK_LEN + 2, py),
                right_style.clone(),
            ))?;
        }
        // Right hand axis line
        let yr = self.y_range();
        let p0 = chart.backend_coord(&(x_right, yr.end));
        let p1 = chart.backend_coord(&(x_right, yr.start));
        root.draw(&PathElement::new(vec![p0, p1], BLACK))?;

        root.present()?;
        Ok(())
    }

    /// Draw band rectangles and band contents.  No text is drawn
    pub fn draw_bands<DB>(
        &self,
        chart: &mut ChartContext<DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    ) -> anyhow::Result<Vec<BandGeometry>>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let bands = BandGeometry::all(self.layout);
        let columns = self.columns();
        for b in bands.iter() {
            debug!(
                "start plotting band {} ({}-{}, centre {})",
                b.index(),
                b.start(),
                b.stop(),
                b.centre()
            );
            let [p0, p1] = b.rect();
            chart.draw_series(std::iter::once(Rectangle::new(
                [p0, p1],
                BLACK.mix(0.2).stroke_width(1),
            )))?;
            chart.draw_series(std::iter::once(PathElement::new(
                vec![(0.0, b.centre()), (b.width() as f64, b.centre())],
                BLACK.mix(0.3),
            )))?;

            let slice = b.slice(self.data);
            let shapes = self.painter.shapes(b, &slice, columns);
            trace!(
                "band {}: {} positions from {}, {} shapes",
                b.index(),
                slice.len(),
                slice.start(),
                shapes.len()
            );
            chart.draw_series(
                shapes
                    .into_iter()
                    .map(|s| Polygon::new(s.points, s.colour.mix(s.opacity).filled())),
            )?;
        }
        Ok(bands)
    }

    /// Visible x range is always one band width
    pub fn x_range(&self) -> std::ops::Range<f64> {
        0.0..(self.layout.nt_per_band() as f64)
    }

    pub fn y_range(&self) -> std::ops::Range<f64> {
        let (a, b) = self.layout.y_range();
        a..b
    }
}

pub fn default_title(seq_id: &str, start: usize, stop: usize) -> String {
    if start == 0 {
        format!(
            "Coverage plot for \"{}\" (0 to {:.2e})",
            seq_id, stop as f64
        )
    } else {
        format!(
            "Coverage plot for \"{}\" ({:.2e} to {:.2e})",
            seq_id, start as f64, stop as f64
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::YScale,
        data::tests::synthetic,
        painter::{CoveragePainter, FramePainter, Palette},
    };

    #[test]
    fn titles() {
        assert_eq!(
            default_title("chr1", 0, 2_500_000),
            "Coverage plot for \"chr1\" (0 to 2.50e6)"
        );
        assert_eq!(
            default_title("chr1", 1000, 2000),
            "Coverage plot for \"chr1\" (1.00e3 to 2.00e3)"
        );
    }

    #[test]
    fn figure_geometry() {
        let ds = synthetic(3000);
        let l = Layout::plan(3000, None, None, Some(1000), YScale::Max(10.0), ds.okh()).unwrap();
        let mut fig = Figure::new(&ds, &l, &FramePainter, 1000, 200);
        assert_eq!(fig.size().unwrap(), (1000, 700));
        assert_eq!(fig.margins(), (80, 70, 33));
        assert_eq!(fig.columns(), 850);
        fig.set_quick(true);
        assert_eq!(fig.columns(), 212);
        assert_eq!(fig.x_range(), 0.0..1000.0);
        assert_eq!(fig.y_range(), -70.0..-10.0);
        assert_eq!(fig.title(), "Coverage plot for \"synthetic\" (0 to 3.00e3)");
        fig.set_title("custom");
        assert_eq!(fig.title(), "custom");
    }

    #[test]
    fn oversized_figure_rejected() {
        let ds = synthetic(3000);
        // one band per nucleotide
        let l = Layout::plan(3000, None, None, Some(1), YScale::Max(10.0), ds.okh()).unwrap();
        assert_eq!(l.n_bands(), 3000);
        assert!(Figure::new(&ds, &l, &FramePainter, 1000, 200).size().is_err());

        // multiplication overflows u32
        let big = Layout::plan(30_000_000, None, None, Some(1), YScale::Max(10.0), ds.okh()).unwrap();
        assert!(Figure::new(&ds, &big, &FramePainter, 1000, 200).size().is_err());

        let l = Layout::plan(3000, None, None, Some(1000), YScale::Max(10.0), ds.okh()).unwrap();
        assert!(Figure::new(&ds, &l, &FramePainter, MAX_IMAGE_DIM + 1, 200).size().is_err());
        assert_eq!(
            Figure::new(&ds, &l, &FramePainter, MAX_IMAGE_DIM, 200).size().unwrap(),
            (MAX_IMAGE_DIM, 700)
        );
    }

    #[test]
    fn bands_drawn_to_svg() {
        let ds = synthetic(3000);
        let l = Layout::plan(3000, None, None, Some(1000), YScale::Max(50.0), ds.okh()).unwrap();
        let painter = CoveragePainter::new(Palette::default());
        let fig = Figure::new(&ds, &l, &painter, 400, 100);
        let mut buf = String::new();
        {
            let root = SVGBackend::with_string(&mut buf, fig.size().unwrap()).into_drawing_area();
            let mut chart = ChartBuilder::on(&root)
                .build_cartesian_2d(fig.x_range(), fig.y_range())
                .unwrap();
            let bands = fig.draw_bands(&mut chart).unwrap();
            assert_eq!(bands.len(), 3);
            root.present().unwrap();
        }
        assert!(buf.contains("<svg"));
        // 3 bands x 4 filled shapes
        assert_eq!(buf.matches("<polygon").count(), 12);
    }
}
