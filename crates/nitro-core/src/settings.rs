//! Settings store for the nitrous emulator
//!
//! Settings live in a line-oriented `key=value` file, the format the
//! original frontends already ship. Unknown keys are ignored so newer
//! and older builds can share one file.

use crate::console::Console;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Settings file name, looked up relative to the settings root
pub const SETTINGS_FILE: &str = "nitrous.ini";

/// Logical BIOS/firmware asset identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// ARM9 BIOS image
    Bios9,
    /// ARM7 BIOS image
    Bios7,
    /// NDS firmware image
    Firmware,
    /// GBA BIOS image
    GbaBios,
}

impl AssetKind {
    /// All asset kinds, in canonical settings-file order
    pub const ALL: [AssetKind; 4] = [
        AssetKind::Bios9,
        AssetKind::Bios7,
        AssetKind::Firmware,
        AssetKind::GbaBios,
    ];

    /// Settings-file key for this asset's path
    pub fn ini_key(self) -> &'static str {
        match self {
            Self::Bios9 => "bios9Path",
            Self::Bios7 => "bios7Path",
            Self::Firmware => "firmwarePath",
            Self::GbaBios => "gbaBiosPath",
        }
    }

    /// Short name used in diagnostics
    pub fn name(self) -> &'static str {
        match self {
            Self::Bios9 => "bios9",
            Self::Bios7 => "bios7",
            Self::Firmware => "firmware",
            Self::GbaBios => "gba bios",
        }
    }

    /// Assets a console class requires before it can power on
    pub fn required_for(console: Console) -> &'static [AssetKind] {
        match console {
            Console::Nds => &[AssetKind::Bios9, AssetKind::Bios7, AssetKind::Firmware],
            Console::Gba => &[AssetKind::GbaBios],
        }
    }

    fn from_ini_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.ini_key() == key)
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Emulator settings
///
/// Built once per process by the frontend boundary and treated as
/// read-only for the rest of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    asset_paths: HashMap<AssetKind, PathBuf>,
    /// Boot straight into the cartridge instead of the firmware menu
    pub direct_boot: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            asset_paths: HashMap::new(),
            direct_boot: true,
        }
    }
}

impl Settings {
    /// Load settings from `<root>/nitrous.ini`
    ///
    /// A missing file yields the defaults (an empty asset set); path
    /// validation is deferred to the asset resolver so the user can fix
    /// the file and retry without restarting.
    pub fn load<P: AsRef<Path>>(root: P) -> io::Result<Self> {
        let path = root.as_ref().join(SETTINGS_FILE);

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("settings file {:?} does not exist, using defaults", path);
                return Ok(Self::default());
            }
            Err(e) => return Err(e),
        };

        let mut settings = Self::default();

        for line in content.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());

            if let Some(kind) = AssetKind::from_ini_key(key) {
                if !value.is_empty() {
                    settings.asset_paths.insert(kind, PathBuf::from(value));
                }
            } else if key == "directBoot" {
                match value {
                    "1" | "true" => settings.direct_boot = true,
                    "0" | "false" => settings.direct_boot = false,
                    other => warn!("ignoring invalid directBoot value {:?}", other),
                }
            }
            // Unknown keys are ignored; the file is shared with frontends
            // that carry their own display settings.
        }

        debug!(
            "loaded settings from {:?}: {} asset paths, direct_boot={}",
            path,
            settings.asset_paths.len(),
            settings.direct_boot
        );

        Ok(settings)
    }

    /// Write settings to `<root>/nitrous.ini`, the canonical serialization
    pub fn save<P: AsRef<Path>>(&self, root: P) -> io::Result<()> {
        let path = root.as_ref().join(SETTINGS_FILE);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut content = String::new();
        for kind in AssetKind::ALL {
            if let Some(asset_path) = self.asset_paths.get(&kind) {
                content.push_str(kind.ini_key());
                content.push('=');
                content.push_str(&asset_path.to_string_lossy());
                content.push('\n');
            }
        }
        content.push_str(&format!(
            "directBoot={}\n",
            if self.direct_boot { 1 } else { 0 }
        ));

        std::fs::write(&path, content)
    }

    /// Configured path for an asset, if any
    pub fn asset_path(&self, kind: AssetKind) -> Option<&Path> {
        self.asset_paths.get(&kind).map(PathBuf::as_path)
    }

    /// Set the path for an asset
    pub fn set_asset_path<P: Into<PathBuf>>(&mut self, kind: AssetKind, path: P) {
        self.asset_paths.insert(kind, path.into());
    }

    /// Default settings root when the embedder does not supply one
    pub fn default_root() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nitrous")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(settings.direct_boot);
        for kind in AssetKind::ALL {
            assert!(settings.asset_path(kind).is_none());
        }
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_parse_known_keys() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            "bios9Path=/bios/bios9.bin\n\
             bios7Path=/bios/bios7.bin\n\
             firmwarePath=/bios/firmware.bin\n\
             directBoot=0\n",
        )
        .unwrap();

        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(
            settings.asset_path(AssetKind::Bios9),
            Some(Path::new("/bios/bios9.bin"))
        );
        assert_eq!(
            settings.asset_path(AssetKind::Bios7),
            Some(Path::new("/bios/bios7.bin"))
        );
        assert_eq!(
            settings.asset_path(AssetKind::Firmware),
            Some(Path::new("/bios/firmware.bin"))
        );
        assert!(settings.asset_path(AssetKind::GbaBios).is_none());
        assert!(!settings.direct_boot);
    }

    #[test]
    fn test_unknown_and_malformed_lines_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            "screenFilter=1\n\
             this line has no separator\n\
             \n\
             gbaBiosPath=/bios/gba_bios.bin\n",
        )
        .unwrap();

        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(
            settings.asset_path(AssetKind::GbaBios),
            Some(Path::new("/bios/gba_bios.bin"))
        );
        assert!(settings.asset_path(AssetKind::Bios9).is_none());
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();

        let mut settings = Settings::default();
        settings.set_asset_path(AssetKind::Bios9, "/assets/bios9.bin");
        settings.set_asset_path(AssetKind::Bios7, "/assets/bios7.bin");
        settings.set_asset_path(AssetKind::Firmware, "/assets/firmware.bin");
        settings.set_asset_path(AssetKind::GbaBios, "/assets/gba_bios.bin");
        settings.direct_boot = false;

        settings.save(dir.path()).unwrap();
        let reloaded = Settings::load(dir.path()).unwrap();
        assert_eq!(reloaded, settings);
    }

    #[test]
    fn test_required_assets_per_console() {
        assert_eq!(
            AssetKind::required_for(Console::Nds),
            &[AssetKind::Bios9, AssetKind::Bios7, AssetKind::Firmware]
        );
        assert_eq!(AssetKind::required_for(Console::Gba), &[AssetKind::GbaBios]);
    }
}
