//! Console family selection

use std::path::Path;

/// Console family a cartridge image targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Console {
    /// Nintendo DS (`.nds` cartridge image)
    Nds,
    /// Game Boy Advance (`.gba` cartridge image)
    Gba,
}

impl Console {
    /// Derive the console family from a ROM path's extension
    ///
    /// The frontend only ever forwards `.nds` and `.gba` files; anything
    /// else returns `None` and is treated as an unreadable ROM upstream.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("nds") {
            Some(Self::Nds)
        } else if ext.eq_ignore_ascii_case("gba") {
            Some(Self::Gba)
        } else {
            None
        }
    }

    /// Short display name
    pub fn name(self) -> &'static str {
        match self {
            Self::Nds => "NDS",
            Self::Gba => "GBA",
        }
    }
}

impl std::fmt::Display for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(Console::from_path("/sdcard/game.nds"), Some(Console::Nds));
        assert_eq!(Console::from_path("/sdcard/game.GBA"), Some(Console::Gba));
        assert_eq!(Console::from_path("/sdcard/game.iso"), None);
        assert_eq!(Console::from_path("/sdcard/noext"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Console::Nds), "NDS");
        assert_eq!(format!("{}", Console::Gba), "GBA");
    }
}
