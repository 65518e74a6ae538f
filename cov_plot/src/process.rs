use std::path::Path;

use crate::{
    config::Config,
    data::CoverageDataset,
    layout::Layout,
    output::{output_stem, write_figures},
    painter::Palette,
    render::Figure,
};

/// Load the coverage data, plan the bands and write one image per
/// requested format
pub fn plot_coverage(cfg: &Config) -> anyhow::Result<()> {
    debug!("Starting processing");
    let data = CoverageDataset::from_npz(cfg.seq_id(), cfg.input_file())?;
    plot_dataset(cfg, &data)
}

pub fn plot_dataset(cfg: &Config, data: &CoverageDataset) -> anyhow::Result<()> {
    let layout = Layout::plan(
        data.seq_len(),
        cfg.start(),
        cfg.stop(),
        cfg.nt_per_band(),
        cfg.yscale(),
        data.okh(),
    )?;
    debug!(
        "Layout: {} bands of {} nt covering {} nt, y max {}",
        layout.n_bands(),
        layout.nt_per_band(),
        layout.plot_len(),
        layout.max_y()
    );

    let painter = cfg.kind().painter(Palette::default());
    debug!("Band painter: {}", cfg.kind());

    let mut fig = Figure::new(
        data,
        &layout,
        painter.as_ref(),
        cfg.image_width(),
        cfg.band_height(),
    );
    if let Some(t) = cfg.title() {
        fig.set_title(t)
    }
    fig.set_quick(cfg.quick());
    let (w, h) = fig.size()?;
    debug!("Image size: {} x {} px", w, h);

    let base = cfg
        .output()
        .unwrap_or_else(|| Path::new(data.seq_id()));
    let tag = cfg.tag().or_else(|| painter.tag());
    let range = cfg
        .range_given()
        .then_some((layout.start(), layout.stop()));
    let stem = output_stem(base, tag, range);

    let written = write_figures(&fig, &stem, cfg.formats())?;
    trace!("Wrote {} files", written.len());
    Ok(())
}
