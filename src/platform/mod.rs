//! Where files get installed: OS and privilege detection plus directory setup.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::domain::{AppError, CatalogEntry};

/// Folder name created under the chosen base directory.
pub const INSTALL_DIR_NAME: &str = "FrutigerAeroInstaller";

const SYSTEM_PROGRAM_DIR: &str = r"C:\Program Files";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    Windows,
    Other,
}

impl HostOs {
    pub fn current() -> Self {
        if cfg!(windows) {
            HostOs::Windows
        } else {
            HostOs::Other
        }
    }
}

/// Result of the privilege check. `Unknown` means the check itself failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elevation {
    Elevated,
    Standard,
    Unknown,
}

/// Base directories the install path is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDirs {
    pub home: PathBuf,
    pub downloads: PathBuf,
    pub program_files: PathBuf,
}

impl UserDirs {
    pub fn detect() -> Result<Self, AppError> {
        let home = dirs::home_dir().ok_or(AppError::NoHomeDir)?;
        let downloads = dirs::download_dir().unwrap_or_else(|| home.join("Downloads"));
        Ok(Self {
            home,
            downloads,
            program_files: PathBuf::from(SYSTEM_PROGRAM_DIR),
        })
    }
}

/// The directory every download lands in. Exists once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTarget {
    dir: PathBuf,
}

impl InstallTarget {
    /// Creates `dir` (and parents) if needed. Safe to call repeatedly.
    pub fn prepare(dir: PathBuf) -> Result<Self, AppError> {
        std::fs::create_dir_all(&dir).map_err(|source| AppError::InstallDir {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn destination(&self, entry: &CatalogEntry) -> PathBuf {
        self.dir.join(entry.destination_filename())
    }

    pub fn file(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }
}

/// Chooses the install directory. Pure and deterministic for a given input.
pub fn install_dir_for(os: HostOs, elevation: Elevation, dirs: &UserDirs) -> PathBuf {
    match (os, elevation) {
        (HostOs::Windows, Elevation::Elevated) => dirs.program_files.join(INSTALL_DIR_NAME),
        (HostOs::Windows, Elevation::Standard | Elevation::Unknown) => {
            dirs.downloads.join(INSTALL_DIR_NAME)
        }
        (HostOs::Other, _) => dirs.home.join(INSTALL_DIR_NAME),
    }
}

/// Picks and creates the install directory for this process.
pub fn resolve_install_target(
    os: HostOs,
    elevation: Elevation,
    dirs: &UserDirs,
) -> Result<InstallTarget, AppError> {
    if elevation == Elevation::Unknown {
        warn!("Privilege check failed; using the per-user install location");
    }
    let dir = install_dir_for(os, elevation, dirs);
    debug!(?os, ?elevation, path = %dir.display(), "Resolved install directory");
    InstallTarget::prepare(dir)
}

#[cfg(windows)]
pub fn detect_elevation() -> Elevation {
    use windows::Win32::Foundation::{CloseHandle, HANDLE};
    use windows::Win32::Security::{GetTokenInformation, TokenElevation, TOKEN_ELEVATION, TOKEN_QUERY};
    use windows::Win32::System::Threading::{GetCurrentProcess, OpenProcessToken};

    let mut token = HANDLE::default();
    // SAFETY: the pseudo handle from GetCurrentProcess needs no cleanup; `token` is
    // closed below on every path after a successful open.
    if unsafe { OpenProcessToken(GetCurrentProcess(), TOKEN_QUERY, &mut token) }.is_err() {
        return Elevation::Unknown;
    }

    let mut elevation = TOKEN_ELEVATION::default();
    let mut returned = 0u32;
    let queried = unsafe {
        GetTokenInformation(
            token,
            TokenElevation,
            Some(&mut elevation as *mut TOKEN_ELEVATION as *mut std::ffi::c_void),
            std::mem::size_of::<TOKEN_ELEVATION>() as u32,
            &mut returned,
        )
    };
    let _ = unsafe { CloseHandle(token) };

    match queried {
        Ok(()) if elevation.TokenIsElevated != 0 => Elevation::Elevated,
        Ok(()) => Elevation::Standard,
        Err(_) => Elevation::Unknown,
    }
}

#[cfg(unix)]
pub fn detect_elevation() -> Elevation {
    if unsafe { libc::geteuid() } == 0 {
        Elevation::Elevated
    } else {
        Elevation::Standard
    }
}

#[cfg(not(any(unix, windows)))]
pub fn detect_elevation() -> Elevation {
    Elevation::Unknown
}
