//! Distribution detection.
use std::fmt;
use std::path::Path;

/// Distribution family, which decides the package manager and the bootloader
/// layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// Debian, Ubuntu and derivatives (apt, `update-grub`).
    Debian,
    /// Arch Linux and derivatives (pacman, `grub-mkconfig`).
    Arch,
    /// Fedora and other dnf-based systems (`grub2-mkconfig`).
    Fedora,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debian => write!(f, "debian"),
            Self::Arch => write!(f, "arch"),
            Self::Fedora => write!(f, "fedora"),
        }
    }
}

/// Platform information for the current system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// Detected distribution family.
    pub family: Family,
    /// `PRETTY_NAME` from os-release, for display only.
    pub pretty_name: String,
}

impl Platform {
    /// Create a platform with explicit values.
    #[must_use]
    pub fn new(family: Family, pretty_name: impl Into<String>) -> Self {
        Self {
            family,
            pretty_name: pretty_name.into(),
        }
    }

    /// Detect the current platform from `/etc/os-release`.
    ///
    /// Falls back to marker files and finally to [`Family::Debian`] when
    /// os-release is unreadable.
    #[must_use]
    pub fn detect() -> Self {
        std::fs::read_to_string("/etc/os-release").map_or_else(
            |_| Self::new(Self::detect_from_markers(), "unknown"),
            |text| Self::from_os_release(&text),
        )
    }

    /// Parse the contents of an os-release file.
    #[must_use]
    pub fn from_os_release(text: &str) -> Self {
        let mut id = String::new();
        let mut id_like = String::new();
        let mut pretty_name = String::from("unknown");
        for line in text.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches('"').to_string();
            match key.trim() {
                "ID" => id = value,
                "ID_LIKE" => id_like = value,
                "PRETTY_NAME" => pretty_name = value,
                _ => {}
            }
        }

        let family = std::iter::once(id.as_str())
            .chain(id_like.split_whitespace())
            .find_map(Self::family_from_id)
            .unwrap_or_else(Self::detect_from_markers);
        Self {
            family,
            pretty_name,
        }
    }

    fn family_from_id(id: &str) -> Option<Family> {
        match id {
            "debian" | "ubuntu" | "pop" | "linuxmint" => Some(Family::Debian),
            "arch" | "endeavouros" | "manjaro" => Some(Family::Arch),
            "fedora" | "rhel" | "centos" | "nobara" => Some(Family::Fedora),
            _ => None,
        }
    }

    fn detect_from_markers() -> Family {
        if Path::new("/etc/arch-release").exists() {
            Family::Arch
        } else if Path::new("/etc/fedora-release").exists() {
            Family::Fedora
        } else {
            Family::Debian
        }
    }
}
