//! BIOS/firmware asset validation and resolution
//!
//! Every required asset must resolve to a readable, correctly sized file
//! before initialization proceeds. Validation fails fast on the first
//! unmet requirement and names the asset that failed.

use nitro_core::{AssetError, AssetKind, Console, Settings};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Exact image size fixed by the hardware family, in bytes
pub fn expected_size(kind: AssetKind) -> u64 {
    match kind {
        AssetKind::Bios9 => 0x1000,
        AssetKind::Bios7 => 0x4000,
        AssetKind::Firmware => 0x40000,
        AssetKind::GbaBios => 0x4000,
    }
}

/// Boot images read into memory after validation
///
/// Owning the bytes here keeps machine construction infallible: any I/O
/// failure has already surfaced during resolution.
#[derive(Debug, Default)]
pub struct ResolvedAssets {
    images: HashMap<AssetKind, Vec<u8>>,
}

impl ResolvedAssets {
    /// Borrow an asset image, if it was required and resolved
    pub fn image(&self, kind: AssetKind) -> Option<&[u8]> {
        self.images.get(&kind).map(Vec::as_slice)
    }

    /// Take ownership of an asset image
    pub fn take(&mut self, kind: AssetKind) -> Option<Vec<u8>> {
        self.images.remove(&kind)
    }
}

/// Check every asset the console class requires
///
/// Pure validation; nothing is read into memory and nothing is mutated.
pub fn validate(settings: &Settings, console: Console) -> Result<(), AssetError> {
    for &kind in AssetKind::required_for(console) {
        validate_one(settings, kind)?;
    }
    Ok(())
}

/// Validate and read the required assets into owned buffers
pub fn resolve(settings: &Settings, console: Console) -> Result<ResolvedAssets, AssetError> {
    let mut images = HashMap::new();

    for &kind in AssetKind::required_for(console) {
        let path = validate_one(settings, kind)?;

        let data = std::fs::read(path).map_err(|e| AssetError::Unreadable {
            kind,
            path: path.to_path_buf(),
            source: e,
        })?;

        // The file may have changed between the metadata check and the read
        let expected = expected_size(kind);
        if data.len() as u64 != expected {
            return Err(AssetError::WrongSize {
                kind,
                path: path.to_path_buf(),
                expected,
                actual: data.len() as u64,
            });
        }

        debug!("resolved {} from {:?} ({} bytes)", kind, path, data.len());
        images.insert(kind, data);
    }

    info!("resolved {} boot assets for {}", images.len(), console);
    Ok(ResolvedAssets { images })
}

/// Check one asset: path configured, file present and readable, size exact
fn validate_one(settings: &Settings, kind: AssetKind) -> Result<&Path, AssetError> {
    let path = settings
        .asset_path(kind)
        .ok_or(AssetError::NotConfigured(kind))?;

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AssetError::NotFound {
                kind,
                path: path.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(AssetError::Unreadable {
                kind,
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    let metadata = file.metadata().map_err(|e| AssetError::Unreadable {
        kind,
        path: path.to_path_buf(),
        source: e,
    })?;

    if !metadata.is_file() {
        return Err(AssetError::NotFound {
            kind,
            path: path.to_path_buf(),
        });
    }

    let expected = expected_size(kind);
    if metadata.len() != expected {
        return Err(AssetError::WrongSize {
            kind,
            path: path.to_path_buf(),
            expected,
            actual: metadata.len(),
        });
    }

    Ok(path)
}
