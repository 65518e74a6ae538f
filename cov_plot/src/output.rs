use std::{
    ffi::OsString,
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::Context;
use plotters::prelude::*;

use crate::render::Figure;

/// Supported output image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Bmp,
    Svg,
}

impl ImageFormat {
    pub fn ext(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Bmp => "bmp",
            Self::Svg => "svg",
        }
    }
}

impl FromStr for ImageFormat {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "bmp" => Ok(Self::Bmp),
            "svg" => Ok(Self::Svg),
            _ => Err("unsupported image format"),
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.ext())
    }
}

/// Output file name without extension
///
/// base (output name or sequence id), then _tag if present, then
/// _start_stop if a range was requested
pub fn output_stem<P: AsRef<Path>>(
    base: P,
    tag: Option<&str>,
    range: Option<(usize, usize)>,
) -> PathBuf {
    let mut s = OsString::from(base.as_ref());
    if let Some(t) = tag.filter(|t| !t.is_empty()) {
        s.push(format!("_{}", t));
    }
    if let Some((a, b)) = range {
        s.push(format!("_{}_{}", a, b));
    }
    PathBuf::from(s)
}

/// Full output path for a format
pub fn output_path<P: AsRef<Path>>(stem: P, fmt: ImageFormat) -> PathBuf {
    let mut s = OsString::from(stem.as_ref());
    s.push(".");
    s.push(fmt.ext());
    PathBuf::from(s)
}

/// Scratch file used while a bitmap is rendered; keeps the final extension
/// so the encoder is chosen correctly
fn partial_path(path: &Path, fmt: ImageFormat) -> PathBuf {
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.partial.{}", name, fmt.ext()))
}

/// Render fig once per format next to stem
///
/// Every format is rendered to a scratch file first; the outputs are only
/// moved into place once all renders have succeeded.  On any failure the
/// scratch files and any outputs already moved are removed.
pub fn write_figures(
    fig: &Figure,
    stem: &Path,
    formats: &[ImageFormat],
) -> anyhow::Result<Vec<PathBuf>> {
    let size = fig.size()?;
    debug!("Rendering \"{}\" at {:?} px", fig.title(), size);

    // (scratch, output) pairs
    let mut pending: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(formats.len());
    for fmt in formats {
        let path = output_path(stem, *fmt);
        let tmp = partial_path(&path, *fmt);
        trace!("Rendering {} to {}", fmt, tmp.display());
        pending.push((tmp.clone(), path.clone()));
        if let Err(e) = render_to(fig, &tmp, *fmt, size) {
            discard(&pending, 0);
            return Err(e.context(format!("Error rendering {}", path.display())));
        }
    }

    for (i, (tmp, path)) in pending.iter().enumerate() {
        info!("writing to {}", path.display());
        if let Err(e) = fs::rename(tmp, path) {
            discard(&pending, i);
            return Err(anyhow::Error::new(e).context(format!(
                "Error moving {} to {}",
                tmp.display(),
                path.display()
            )));
        }
    }
    Ok(pending.into_iter().map(|(_, p)| p).collect())
}

fn render_to(
    fig: &Figure,
    path: &Path,
    fmt: ImageFormat,
    size: (u32, u32),
) -> anyhow::Result<()> {
    match fmt {
        ImageFormat::Svg => {
            let mut buf = String::new();
            {
                let root = SVGBackend::with_string(&mut buf, size).into_drawing_area();
                fig.draw(&root)?;
            }
            fs::write(path, buf)
                .with_context(|| format!("Error writing file {}", path.display()))
        }
        _ => {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            fig.draw(&root)
        }
    }
}

/// Remove the scratch files, and the outputs of the first `renamed` entries
fn discard(pending: &[(PathBuf, PathBuf)], renamed: usize) {
    for (i, (tmp, path)) in pending.iter().enumerate() {
        let p = if i < renamed { path } else { tmp };
        if fs::remove_file(p).is_ok() {
            debug!("Removed {}", p.display())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats() {
        assert_eq!(ImageFormat::from_str("PNG"), Ok(ImageFormat::Png));
        assert_eq!(ImageFormat::from_str("jpeg"), Ok(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::Jpeg.to_string(), "jpg");
        assert!(ImageFormat::from_str("pdf").is_err());
    }

    #[test]
    fn stems() {
        assert_eq!(output_stem("chr1", None, None), PathBuf::from("chr1"));
        assert_eq!(
            output_stem("chr1", Some("binned"), None),
            PathBuf::from("chr1_binned")
        );
        assert_eq!(
            output_stem("chr1", None, Some((0, 5000))),
            PathBuf::from("chr1_0_5000")
        );
        assert_eq!(
            output_stem("out/plot", Some("binned"), Some((100, 200))),
            PathBuf::from("out/plot_binned_100_200")
        );
        assert_eq!(output_stem("chr1", Some(""), None), PathBuf::from("chr1"));
    }

    #[test]
    fn paths() {
        let stem = output_stem("scaffold.12", None, None);
        assert_eq!(
            output_path(&stem, ImageFormat::Png),
            PathBuf::from("scaffold.12.png")
        );
        assert_eq!(
            output_path(&stem, ImageFormat::Svg),
            PathBuf::from("scaffold.12.svg")
        );
        assert_eq!(
            partial_path(Path::new("out/a.png"), ImageFormat::Png),
            PathBuf::from("out/.a.png.partial.png")
        );
    }
}
