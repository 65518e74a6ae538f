use std::{
    fs::File,
    io::{BufReader, Read, Seek},
    path::Path,
};

use anyhow::Context;
use ndarray::{Array1, Ix1, OwnedRepr};
use ndarray_npy::{NpzReader, ReadNpyError, ReadNpzError, ReadableElement};

/// Names of the arrays expected in the coverage archive
pub const KEY_OK: &str = "r_ok";
pub const KEY_HIGH: &str = "r_high";
pub const KEY_LOW: &str = "r_low";
pub const KEY_LOW_BINNED: &str = "r_low_binned";
pub const KEY_HIGH_BINNED: &str = "r_high_binned";
pub const KEY_BINS_HIGH: &str = "bins_high";
pub const KEY_BINS_LOW: &str = "bins_low";

/// Raw vectors as read from the archive, before validation
#[derive(Default)]
pub struct RawCoverage {
    pub ok: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub low_binned: Vec<f64>,
    pub high_binned: Vec<f64>,
    pub bins_high: Vec<f64>,
    pub bins_low: Vec<f64>,
}

/// Descriptive statistics for the ok coverage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverageStats {
    pub median: f64,
    pub median_h: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// CoverageDataset
///
/// Per position coverage vectors for a single sequence.  All per position
/// vectors have the same length; bins_high and bins_low are sized
/// independently.  Read only once loaded.
///
/// all - ok + high + low
/// okh - ok / 2
///
pub struct CoverageDataset {
    seq_id: String,
    ok: Vec<f64>,
    high: Vec<f64>,
    low: Vec<f64>,
    low_binned: Vec<f64>,
    high_binned: Vec<f64>,
    all: Vec<f64>,
    okh: Vec<f64>,
    bins_high: Vec<f64>,
    bins_low: Vec<f64>,
    stats: CoverageStats,
}

impl CoverageDataset {
    pub fn new(seq_id: &str, raw: RawCoverage) -> anyhow::Result<Self> {
        let RawCoverage {
            ok,
            high,
            low,
            low_binned,
            high_binned,
            bins_high,
            bins_low,
        } = raw;

        let len = ok.len();
        if len == 0 {
            return Err(anyhow!("Empty coverage vector for {}", seq_id));
        }
        for (name, v) in [
            (KEY_HIGH, &high),
            (KEY_LOW, &low),
            (KEY_LOW_BINNED, &low_binned),
            (KEY_HIGH_BINNED, &high_binned),
        ] {
            if v.len() != len {
                return Err(anyhow!(
                    "Length mismatch for {}: {} has {} entries, {} has {}",
                    seq_id,
                    KEY_OK,
                    len,
                    name,
                    v.len()
                ));
            }
        }

        let all: Vec<f64> = ok
            .iter()
            .zip(high.iter())
            .zip(low.iter())
            .map(|((a, b), c)| a + b + c)
            .collect();
        let okh: Vec<f64> = ok.iter().map(|x| x / 2.0).collect();

        // Non-empty vectors so these are all present
        let (min, max) = utils::min_max(&ok).unwrap_or((f64::NAN, f64::NAN));
        let stats = CoverageStats {
            median: utils::median(&ok).unwrap_or(f64::NAN),
            median_h: utils::median(&okh).unwrap_or(f64::NAN),
            mean: utils::mean(&ok).unwrap_or(f64::NAN),
            min,
            max,
        };

        Ok(Self {
            seq_id: seq_id.to_owned(),
            ok,
            high,
            low,
            low_binned,
            high_binned,
            all,
            okh,
            bins_high,
            bins_low,
            stats,
        })
    }

    /// Load coverage data for seq_id from a numpy npz archive
    pub fn from_npz<P: AsRef<Path>>(seq_id: &str, path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        info!("Loading sequence: {}", seq_id);
        debug!("Opening coverage archive {}", path.display());
        let file = File::open(path)
            .with_context(|| format!("Could not open coverage archive {}", path.display()))?;
        let mut npz = NpzReader::new(BufReader::new(file))
            .with_context(|| format!("Could not read {} as an npz archive", path.display()))?;
        let names = npz
            .names()
            .with_context(|| format!("Could not list arrays in {}", path.display()))?;
        trace!("Arrays in {}: {:?}", path.display(), names);

        let mut get = |key: &str| {
            read_vector(&mut npz, &names, key)
                .with_context(|| format!("Error reading array {} from {}", key, path.display()))
        };

        let raw = RawCoverage {
            ok: get(KEY_OK)?,
            high: get(KEY_HIGH)?,
            low: get(KEY_LOW)?,
            low_binned: get(KEY_LOW_BINNED)?,
            high_binned: get(KEY_HIGH_BINNED)?,
            bins_high: get(KEY_BINS_HIGH)?,
            bins_low: get(KEY_BINS_LOW)?,
        };

        let ds = Self::new(seq_id, raw)
            .with_context(|| format!("Invalid coverage data in {}", path.display()))?;
        debug!("loaded coverage plots of len {}", ds.seq_len());
        ds.log_stats();
        Ok(ds)
    }

    fn log_stats(&self) {
        let s = &self.stats;
        info!("stats: median ok is {} (h {})", s.median, s.median_h);
        info!("stats: average ok is {}", s.mean);
        info!("stats: min, max ok is {}, {}", s.min, s.max);
        debug!(
            "bin boundaries: {} high, {} low",
            self.bins_high().len(),
            self.bins_low().len()
        );
    }

    pub fn seq_id(&self) -> &str {
        &self.seq_id
    }

    pub fn seq_len(&self) -> usize {
        self.ok.len()
    }

    pub fn ok(&self) -> &[f64] {
        &self.ok
    }

    pub fn high(&self) -> &[f64] {
        &self.high
    }

    pub fn low(&self) -> &[f64] {
        &self.low
    }

    pub fn low_binned(&self) -> &[f64] {
        &self.low_binned
    }

    pub fn high_binned(&self) -> &[f64] {
        &self.high_binned
    }

    pub fn all(&self) -> &[f64] {
        &self.all
    }

    pub fn okh(&self) -> &[f64] {
        &self.okh
    }

    pub fn bins_high(&self) -> &[f64] {
        &self.bins_high
    }

    pub fn bins_low(&self) -> &[f64] {
        &self.bins_low
    }

    pub fn stats(&self) -> &CoverageStats {
        &self.stats
    }
}

/// Element types we accept in the archive; everything is stored as f64
trait AsF64: ReadableElement + Copy {
    fn as_f64(self) -> f64;
}

macro_rules! impl_as_f64 {
    ($($t:ty),*) => {
        $(impl AsF64 for $t {
            fn as_f64(self) -> f64 {
                self as f64
            }
        })*
    };
}

impl_as_f64!(f64, f32, i64, i32, i16, i8, u64, u32, u16, u8);

/// Read array `name` as element type T
/// Returns Ok(None) if the stored dtype is not T
fn read_typed<R: Read + Seek, T: AsF64>(
    npz: &mut NpzReader<R>,
    name: &str,
) -> Result<Option<Vec<f64>>, ReadNpzError> {
    match npz.by_name::<OwnedRepr<T>, Ix1>(name) {
        Ok(a) => Ok(Some(to_f64(a))),
        Err(ReadNpzError::Npy(ReadNpyError::WrongDescriptor(_))) => Ok(None),
        Err(e) => Err(e),
    }
}

fn to_f64<T: AsF64>(a: Array1<T>) -> Vec<f64> {
    a.iter().map(|x| x.as_f64()).collect()
}

/// Find array `key` in the archive (numpy stores it as key.npy) and read
/// it as a vector of f64 whatever its numeric dtype
fn read_vector<R: Read + Seek>(
    npz: &mut NpzReader<R>,
    names: &[String],
    key: &str,
) -> anyhow::Result<Vec<f64>> {
    let npy_name = format!("{}.npy", key);
    let name = names
        .iter()
        .find(|n| n.as_str() == key || n.as_str() == npy_name)
        .ok_or_else(|| anyhow!("Missing array {}", key))?;

    let readers: [fn(&mut NpzReader<R>, &str) -> Result<Option<Vec<f64>>, ReadNpzError>; 10] = [
        read_typed::<R, f64>,
        read_typed::<R, f32>,
        read_typed::<R, i64>,
        read_typed::<R, i32>,
        read_typed::<R, i16>,
        read_typed::<R, i8>,
        read_typed::<R, u64>,
        read_typed::<R, u32>,
        read_typed::<R, u16>,
        read_typed::<R, u8>,
    ];
    for rd in readers {
        if let Some(v) = rd(npz, name)? {
            trace!("Read {} values for {}", v.len(), key);
            return Ok(v);
        }
    }
    Err(anyhow!("Unsupported element type for array {}", key))
}
