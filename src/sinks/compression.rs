//! Gzip compression of rotated log files

use super::rotation::gz_path;
use crate::core::error::{LoggerError, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// What happens to a file once it has been rotated out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionMode {
    #[default]
    None,
    /// Replace it with `name.gz`
    Gzip,
}

/// Compress a log file with transactional safety using streaming I/O
///
/// The compressed bytes go to `name.gz.tmp` first and are renamed into
/// place once complete. The original file is only deleted after that
/// rename succeeds; on any failure it is left untouched.
///
/// Returns the path of the `.gz` file.
pub fn compress_file(path: &Path) -> Result<PathBuf> {
    let gz_path = gz_path(path);
    let mut temp_name = gz_path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_gz_path = gz_path.with_file_name(temp_name);

    let input = File::open(path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to open file for compression: {}", path.display()),
            e,
        )
    })?;
    let mut reader = BufReader::with_capacity(64 * 1024, input); // 64KB buffer

    let output = File::create(&temp_gz_path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!(
                "Failed to create temporary compressed file: {}",
                temp_gz_path.display()
            ),
            e,
        )
    })?;
    let buffered_output = BufWriter::with_capacity(64 * 1024, output);

    let mut encoder =
        flate2::write::GzEncoder::new(buffered_output, flate2::Compression::default());

    // Stream in chunks so large files never sit in memory
    let mut buffer = vec![0u8; 64 * 1024];
    loop {
        let bytes_read = reader.read(&mut buffer).map_err(|e| {
            let _ = fs::remove_file(&temp_gz_path);
            LoggerError::io_operation(
                "compress log file",
                format!("Failed to read from file: {}", path.display()),
                e,
            )
        })?;

        if bytes_read == 0 {
            break;
        }

        encoder.write_all(&buffer[..bytes_read]).map_err(|e| {
            let _ = fs::remove_file(&temp_gz_path);
            LoggerError::io_operation(
                "compress log file",
                "Failed to compress data chunk".to_string(),
                e,
            )
        })?;
    }

    let mut buffered_output = encoder.finish().map_err(|e| {
        let _ = fs::remove_file(&temp_gz_path);
        LoggerError::io_operation(
            "compress log file",
            "Failed to finish compression".to_string(),
            e,
        )
    })?;
    buffered_output.flush().map_err(|e| {
        let _ = fs::remove_file(&temp_gz_path);
        LoggerError::io_operation(
            "compress log file",
            "Failed to flush compressed file".to_string(),
            e,
        )
    })?;
    drop(buffered_output);

    fs::rename(&temp_gz_path, &gz_path).map_err(|e| {
        let _ = fs::remove_file(&temp_gz_path);
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to rename compressed file to: {}", gz_path.display()),
            e,
        )
    })?;

    if let Err(e) = fs::remove_file(path) {
        // compression itself succeeded; both versions now exist
        eprintln!(
            "[LOGGER WARNING] Compression succeeded but failed to remove original file {}: {}. \
             Both compressed and uncompressed versions exist.",
            path.display(),
            e
        );
    }

    Ok(gz_path)
}

/// Like [`compress_file`], but reports a missing input as a compression error
pub(crate) fn compress_rotated(path: &Path) -> Result<PathBuf> {
    if !path.is_file() {
        return Err(LoggerError::compression(
            path.display().to_string(),
            "rotated file no longer exists",
        ));
    }
    compress_file(path)
}
