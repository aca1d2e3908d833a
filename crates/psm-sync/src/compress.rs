//! Compressed copies of the finished database file.

use std::{
  fmt,
  fs::File,
  io::{self, BufReader, BufWriter, Write as _},
  path::{Path, PathBuf},
};

use flate2::{Compression, write::GzEncoder};
use serde::Serialize;
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::Result;

/// Content encoding of a published file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
  None,
  Brotli,
  Gzip,
  Zip,
}

impl fmt::Display for Encoding {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::None => "none",
      Self::Brotli => "brotli",
      Self::Gzip => "gzip",
      Self::Zip => "zip",
    })
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedArtifact {
  pub path:     PathBuf,
  pub encoding: Encoding,
}

/// Write `<file>.br`, `<file>.gz` and `<stem>.zip` next to `db_path`.
pub fn compress(db_path: &Path) -> Result<Vec<CompressedArtifact>> {
  let artifacts = vec![
    CompressedArtifact { path: brotli_file(db_path)?, encoding: Encoding::Brotli },
    CompressedArtifact { path: gzip(db_path)?, encoding: Encoding::Gzip },
    CompressedArtifact { path: zip_single(db_path)?, encoding: Encoding::Zip },
  ];
  for a in &artifacts {
    tracing::info!(path = %a.path.display(), encoding = %a.encoding, "compressed");
  }
  Ok(artifacts)
}

fn file_name(path: &Path) -> String {
  path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_default()
}

const BROTLI_QUALITY: u32 = 11;
const BROTLI_WINDOW: u32 = 22;

fn brotli_file(src: &Path) -> Result<PathBuf> {
  let dest = src.with_file_name(format!("{}.br", file_name(src)));
  let mut input = BufReader::new(File::open(src)?);
  let mut encoder = brotli::CompressorWriter::new(
    BufWriter::new(File::create(&dest)?),
    64 * 1024,
    BROTLI_QUALITY,
    BROTLI_WINDOW,
  );
  io::copy(&mut input, &mut encoder)?;
  encoder.flush()?;
  encoder.into_inner().flush()?;
  Ok(dest)
}

fn gzip(src: &Path) -> Result<PathBuf> {
  let dest = src.with_file_name(format!("{}.gz", file_name(src)));
  let mut input = BufReader::new(File::open(src)?);
  let mut encoder = GzEncoder::new(BufWriter::new(File::create(&dest)?), Compression::best());
  io::copy(&mut input, &mut encoder)?;
  encoder.finish()?.flush()?;
  Ok(dest)
}

fn zip_single(src: &Path) -> Result<PathBuf> {
  let dest = src.with_extension("zip");
  let mut writer = ZipWriter::new(File::create(&dest)?);
  let options = SimpleFileOptions::default()
    .compression_method(CompressionMethod::Deflated)
    .compression_level(Some(9));

  writer.start_file(file_name(src), options)?;
  io::copy(&mut BufReader::new(File::open(src)?), &mut writer)?;
  writer.finish()?;
  Ok(dest)
}

#[cfg(test)]
mod tests {
  use std::io::Read as _;

  use flate2::read::GzDecoder;

  use super::*;

  #[test]
  fn brotli_gzip_and_zip_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("pflanzenschutz.sqlite");
    let content = b"SQLite format 3\0".repeat(64);
    std::fs::write(&db, &content).unwrap();

    let artifacts = compress(&db).unwrap();
    assert_eq!(artifacts.len(), 3);

    let br = &artifacts[0];
    assert_eq!(br.encoding, Encoding::Brotli);
    assert_eq!(br.path, dir.path().join("pflanzenschutz.sqlite.br"));
    let mut unpacked = Vec::new();
    brotli::Decompressor::new(File::open(&br.path).unwrap(), 4096)
      .read_to_end(&mut unpacked)
      .unwrap();
    assert_eq!(unpacked, content);

    let gz = &artifacts[1];
    assert_eq!(gz.encoding, Encoding::Gzip);
    assert_eq!(gz.path, dir.path().join("pflanzenschutz.sqlite.gz"));
    let mut unpacked = Vec::new();
    GzDecoder::new(File::open(&gz.path).unwrap())
      .read_to_end(&mut unpacked)
      .unwrap();
    assert_eq!(unpacked, content);

    let zipped = &artifacts[2];
    assert_eq!(zipped.encoding, Encoding::Zip);
    assert_eq!(zipped.path, dir.path().join("pflanzenschutz.zip"));
    let mut archive = zip::ZipArchive::new(File::open(&zipped.path).unwrap()).unwrap();
    assert_eq!(archive.len(), 1);
    let mut entry = archive.by_name("pflanzenschutz.sqlite").unwrap();
    let mut unpacked = Vec::new();
    entry.read_to_end(&mut unpacked).unwrap();
    assert_eq!(unpacked, content);
  }

  #[test]
  fn encoding_labels() {
    assert_eq!(Encoding::None.to_string(), "none");
    assert_eq!(Encoding::Brotli.to_string(), "brotli");
    assert_eq!(serde_json::to_value(Encoding::Brotli).unwrap(), "brotli");
    assert_eq!(serde_json::to_value(Encoding::Gzip).unwrap(), "gzip");
  }
}
