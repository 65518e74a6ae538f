use std::path::{Path, PathBuf};

use crate::{output::ImageFormat, painter::PlotKind};

pub const DEFAULT_IMAGE_WIDTH: u32 = 1000;
pub const DEFAULT_BAND_HEIGHT: u32 = 200;
pub const DEFAULT_YFRAC: f64 = 0.98;

/// How the y axis limit is chosen
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum YScale {
    /// Fraction of the (half scaled) ok coverage that should fall inside the band
    Fraction(f64),
    /// Explicit maximum
    Max(f64),
}

/// Config
///
/// Configuration info for the program
/// This is generated from the command line arguments
/// Once set it is read only
///
/// seq_id - sequence identifier (used for the default input and output names)
/// input_file - explicit npz archive [default: combined/<seq_id>.combined.coverage.npz]
/// start, stop - requested plot range
/// nt_per_band - requested nucleotides per band (None => automatic)
/// image_width - width of image in px
/// band_height - height of each band in px
/// yscale - y axis scaling
/// output - output file name without extension [default: seq_id]
/// formats - output image formats
/// kind - band painter
/// tag - file name tag
/// title - figure title
/// quick - produce a light version of the plot
///
pub struct Config {
    seq_id: String,
    input_file: Option<PathBuf>,
    start: Option<usize>,
    stop: Option<usize>,
    nt_per_band: Option<usize>,
    image_width: u32,
    band_height: u32,
    yscale: YScale,
    output: Option<PathBuf>,
    formats: Vec<ImageFormat>,
    kind: PlotKind,
    tag: Option<String>,
    title: Option<String>,
    quick: bool,
}

impl Config {
    pub fn new(seq_id: String) -> Self {
        Self {
            seq_id,
            input_file: None,
            start: None,
            stop: None,
            nt_per_band: None,
            image_width: DEFAULT_IMAGE_WIDTH,
            band_height: DEFAULT_BAND_HEIGHT,
            yscale: YScale::Fraction(DEFAULT_YFRAC),
            output: None,
            formats: vec![ImageFormat::Png],
            kind: PlotKind::Coverage,
            tag: None,
            title: None,
            quick: false,
        }
    }

    pub fn set_input_file<P: AsRef<Path>>(&mut self, p: P) {
        self.input_file = Some(p.as_ref().to_owned())
    }

    pub fn set_range(&mut self, start: Option<usize>, stop: Option<usize>) -> anyhow::Result<()> {
        if let (Some(a), Some(b)) = (start, stop) {
            if b <= a {
                return Err(anyhow!("Invalid plot range - stop ({}) <= start ({})", b, a));
            }
        }
        self.start = start;
        self.stop = stop;
        Ok(())
    }

    pub fn set_nt_per_band(&mut self, x: usize) -> anyhow::Result<()> {
        if x == 0 {
            Err(anyhow!("Nucleotides per band must be greater than zero"))
        } else {
            self.nt_per_band = Some(x);
            Ok(())
        }
    }

    pub fn set_image_width(&mut self, x: u32) {
        self.image_width = x
    }

    pub fn set_band_height(&mut self, x: u32) {
        self.band_height = x
    }

    pub fn set_yscale(&mut self, y: YScale) -> anyhow::Result<()> {
        match y {
            YScale::Fraction(f) if !(f > 0.0 && f <= 1.0) => {
                Err(anyhow!("Y fraction {} out of range (0, 1]", f))
            }
            YScale::Max(m) if !(m.is_finite() && m > 0.0) => {
                Err(anyhow!("Y max must be positive (found {})", m))
            }
            _ => {
                self.yscale = y;
                Ok(())
            }
        }
    }

    pub fn set_output<P: AsRef<Path>>(&mut self, p: P) {
        self.output = Some(p.as_ref().to_owned())
    }

    pub fn set_formats(&mut self, mut v: Vec<ImageFormat>) {
        // Keep first occurrence of each format
        let mut seen = Vec::with_capacity(v.len());
        v.retain(|f| {
            if seen.contains(f) {
                false
            } else {
                seen.push(*f);
                true
            }
        });
        if !v.is_empty() {
            self.formats = v
        }
    }

    pub fn set_kind(&mut self, k: PlotKind) {
        self.kind = k
    }

    pub fn set_tag(&mut self, s: String) {
        self.tag = Some(s)
    }

    pub fn set_title(&mut self, s: String) {
        self.title = Some(s)
    }

    pub fn set_quick(&mut self) {
        self.quick = true
    }

    pub fn seq_id(&self) -> &str {
        &self.seq_id
    }

    /// Path to input archive, derived from the sequence id if not set explicitly
    pub fn input_file(&self) -> PathBuf {
        self.input_file.clone().unwrap_or_else(|| {
            Path::new("combined").join(format!("{}.combined.coverage.npz", self.seq_id))
        })
    }

    pub fn start(&self) -> Option<usize> {
        self.start
    }

    pub fn stop(&self) -> Option<usize> {
        self.stop
    }

    /// True if the user asked for a specific range
    pub fn range_given(&self) -> bool {
        self.start.is_some() || self.stop.is_some()
    }

    pub fn nt_per_band(&self) -> Option<usize> {
        self.nt_per_band
    }

    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    pub fn band_height(&self) -> u32 {
        self.band_height
    }

    pub fn yscale(&self) -> YScale {
        self.yscale
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    pub fn formats(&self) -> &[ImageFormat] {
        &self.formats
    }

    pub fn kind(&self) -> PlotKind {
        self.kind
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn quick(&self) -> bool {
        self.quick
    }
}
