// In crates/data-cache/src/lib.rs

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use core_types::{Bar, Freq, Symbol};

pub mod error;

// Re-export the most important types for easy access.
pub use error::{Error, Result};

/// A filesystem-backed store of pre-built bars, one JSON-lines file per
/// symbol and period: `{root}/{code}_{asset}/{freq}.jsonl`, ascending by `dt`.
///
/// The cache is only ever read or appended to. Callers construct it and pass
/// it where it is needed; there is no process-wide instance.
#[derive(Debug, Clone)]
pub struct DataCache {
    root: PathBuf,
}

impl DataCache {
    /// Opens the cache rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| Error::Io {
            path: root.clone(),
            source,
        })?;
        tracing::debug!(root = %root.display(), "Data cache opened.");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The file holding `symbol`'s bars for `freq`.
    pub fn path_for(&self, symbol: &Symbol, freq: Freq) -> PathBuf {
        self.root
            .join(format!("{}_{}", symbol.code, symbol.asset.as_str()))
            .join(format!("{}.jsonl", freq))
    }

    /// Loads every cached bar of `symbol` and `freq` with `dt <= until`.
    /// A symbol or period that was never cached yields an empty list.
    pub fn load_bars(&self, symbol: &Symbol, freq: Freq, until: DateTime<Utc>) -> Result<Vec<Bar>> {
        let path = self.path_for(symbol, freq);
        let mut bars = self.read_all(&path)?;
        bars.retain(|bar| bar.dt <= until);
        tracing::debug!(%symbol, %freq, count = bars.len(), "Loaded bars from data cache.");
        Ok(bars)
    }

    /// Appends the bars newer than the last cached one and returns how many
    /// were written. Bars already covered by the cache are skipped, so
    /// importing the same data twice is harmless.
    pub fn append_bars(&self, symbol: &Symbol, freq: Freq, bars: &[Bar]) -> Result<usize> {
        if let Some(bad) = bars.iter().find(|b| &b.symbol != symbol || b.freq != freq) {
            return Err(Error::Mismatch {
                expected: format!("{}/{}", symbol, freq),
                got: format!("{}/{}", bad.symbol, bad.freq),
            });
        }

        let path = self.path_for(symbol, freq);
        let last_dt = self.read_all(&path)?.last().map(|bar| bar.dt);
        let mut sorted: Vec<&Bar> = bars
            .iter()
            .filter(|bar| last_dt.is_none_or(|last| bar.dt > last))
            .collect();
        sorted.sort_by_key(|bar| bar.dt);
        sorted.dedup_by_key(|bar| bar.dt);
        if sorted.is_empty() {
            return Ok(0);
        }

        let io_err = |source| Error::Io {
            path: path.clone(),
            source,
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        for bar in &sorted {
            serde_json::to_writer(&mut writer, bar)?;
            writer.write_all(b"\n").map_err(io_err)?;
        }
        writer.flush().map_err(io_err)?;

        tracing::info!(%symbol, %freq, count = sorted.len(), "Appended bars to data cache.");
        Ok(sorted.len())
    }

    fn read_all(&self, path: &Path) -> Result<Vec<Bar>> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(Error::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let mut bars = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|source| Error::Io {
                path: path.to_path_buf(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let bar = serde_json::from_str(&line).map_err(|source| Error::Malformed {
                path: path.to_path_buf(),
                line: index + 1,
                source,
            })?;
            bars.push(bar);
        }
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use core_types::BarCache;
    use rust_decimal_macros::dec;

    fn symbol() -> Symbol {
        "300001.SZ#E".parse().unwrap()
    }

    fn bar(i: i64) -> Bar {
        Bar {
            symbol: symbol(),
            id: i as u64,
            dt: Utc.with_ymd_and_hms(2021, 3, 1, 0, 0, 0).unwrap() + Duration::days(i),
            freq: Freq::Daily,
            open: dec!(10.0),
            close: dec!(10.5),
            high: dec!(11.0),
            low: dec!(9.5),
            vol: dec!(12000),
            amount: dec!(126000),
            cache: BarCache::default(),
        }
    }

    #[test]
    fn missing_series_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DataCache::open(dir.path()).unwrap();
        let bars = cache.load_bars(&symbol(), Freq::Daily, Utc::now()).unwrap();
        assert!(bars.is_empty());
    }

    #[test]
    fn appends_and_loads_up_to_a_cutoff() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DataCache::open(dir.path().join("nested")).unwrap();
        let bars: Vec<Bar> = (0..5).map(bar).collect();

        assert_eq!(cache.append_bars(&symbol(), Freq::Daily, &bars).unwrap(), 5);
        assert!(cache.path_for(&symbol(), Freq::Daily).ends_with("300001.SZ_E/daily.jsonl"));

        let loaded = cache.load_bars(&symbol(), Freq::Daily, bars[2].dt).unwrap();
        assert_eq!(loaded, bars[..3].to_vec());
    }

    #[test]
    fn append_skips_bars_already_cached() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DataCache::open(dir.path()).unwrap();
        let bars: Vec<Bar> = (0..5).map(bar).collect();

        cache.append_bars(&symbol(), Freq::Daily, &bars[..3]).unwrap();
        assert_eq!(cache.append_bars(&symbol(), Freq::Daily, &bars).unwrap(), 2);
        assert_eq!(cache.append_bars(&symbol(), Freq::Daily, &bars).unwrap(), 0);

        let loaded = cache.load_bars(&symbol(), Freq::Daily, Utc::now()).unwrap();
        assert_eq!(loaded.len(), 5);
    }

    #[test]
    fn rejects_bars_of_another_series() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DataCache::open(dir.path()).unwrap();
        let err = cache.append_bars(&symbol(), Freq::F15, &[bar(0)]).unwrap_err();
        assert!(matches!(err, Error::Mismatch { .. }));
    }

    #[test]
    fn reports_malformed_lines_with_position() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DataCache::open(dir.path()).unwrap();
        cache.append_bars(&symbol(), Freq::Daily, &[bar(0)]).unwrap();

        let path = cache.path_for(&symbol(), Freq::Daily);
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "{{not json").unwrap();

        let err = cache.load_bars(&symbol(), Freq::Daily, Utc::now()).unwrap_err();
        assert!(matches!(err, Error::Malformed { line: 2, .. }));
    }
}
