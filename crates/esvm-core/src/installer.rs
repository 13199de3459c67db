//! File registration for engine installs.
//!
//! An engine plugin never touches the install directories directly. It is
//! handed a [`Registrar`] exposing the scratch paths of the current install
//! and a handful of primitives that copy files into place and expose them
//! under alias names in the bin directory.
//!
//! # Implementation Note: launchers
//!
//! Aliases are created one of three ways:
//! - `register_binary` on unix hosts symlinks `bin/<alias>` to the installed
//!   file, so the binary keeps its real path (and finds sibling dylibs).
//! - `register_script` writes a bash launcher `bin/<alias>` forwarding `"$@"`.
//! - On Windows-family platforms both produce `bin/<alias>.cmd` forwarding `%*`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use esvm_schema::Platform;
use tokio::fs;

/// Install-time capabilities offered to engine plugins.
#[async_trait]
pub trait Registrar: Send + Sync {
    /// Where the archive was downloaded.
    fn download_path(&self) -> &Path;

    /// Where the archive is unpacked.
    fn extracted_path(&self) -> &Path;

    /// The engine's permanent install directory.
    fn install_path(&self) -> &Path;

    /// Copy `extracted/<name>` into the install directory.
    ///
    /// Returns the installed path.
    async fn register_asset(&self, name: &str) -> std::io::Result<PathBuf>;

    /// Register every extracted file matching `pattern` (e.g. `*.so`).
    ///
    /// Returns the installed paths, which may be empty.
    async fn register_assets(&self, pattern: &str) -> std::io::Result<Vec<PathBuf>>;

    /// Install `extracted/<name>` and expose it as `alias`.
    ///
    /// Returns the alias path.
    async fn register_binary(&self, name: &str, alias: &str) -> std::io::Result<PathBuf>;

    /// Write a launcher named `alias` that runs `body` with the caller's
    /// arguments appended.
    ///
    /// Returns the launcher path.
    async fn register_script(&self, alias: &str, body: &str) -> std::io::Result<PathBuf>;
}

/// Filesystem-backed [`Registrar`] for one install run.
#[derive(Debug, Clone)]
pub struct Installation {
    platform: Platform,
    download_path: PathBuf,
    extracted_path: PathBuf,
    install_path: PathBuf,
    bin_dir: PathBuf,
}

impl Installation {
    pub fn new(
        platform: Platform,
        download_path: PathBuf,
        extracted_path: PathBuf,
        install_path: PathBuf,
        bin_dir: PathBuf,
    ) -> Self {
        Self {
            platform,
            download_path,
            extracted_path,
            install_path,
            bin_dir,
        }
    }

    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    /// Create the install and bin directories.
    pub async fn prepare(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.install_path).await?;
        fs::create_dir_all(&self.bin_dir).await
    }

    fn alias_path(&self, alias: &str) -> PathBuf {
        if self.platform.is_windows() {
            self.bin_dir.join(format!("{alias}.cmd"))
        } else {
            self.bin_dir.join(alias)
        }
    }

    /// Write `contents` to the alias path, replacing whatever was there.
    async fn write_launcher(&self, alias: &str, contents: String) -> std::io::Result<PathBuf> {
        let path = self.alias_path(alias);
        remove_existing(&path).await?;
        fs::write(&path, contents).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).await?;
        }

        tracing::debug!("Registered launcher {}", path.display());
        Ok(path)
    }
}

/// Launcher text for `body` on the given platform.
pub fn launcher_source(platform: Platform, body: &str) -> String {
    if platform.is_windows() {
        format!("@echo off\r\n{body} %*\r\n")
    } else {
        format!("#!/usr/bin/env bash\n{body} \"$@\"\n")
    }
}

async fn remove_existing(path: &Path) -> std::io::Result<()> {
    match fs::symlink_metadata(path).await {
        Ok(_) => fs::remove_file(path).await,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[async_trait]
impl Registrar for Installation {
    fn download_path(&self) -> &Path {
        &self.download_path
    }

    fn extracted_path(&self) -> &Path {
        &self.extracted_path
    }

    fn install_path(&self) -> &Path {
        &self.install_path
    }

    async fn register_asset(&self, name: &str) -> std::io::Result<PathBuf> {
        let source = self.extracted_path.join(name);
        let dest = self.install_path.join(name);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::copy(&source, &dest).await.map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("Failed to install {}: {e}", source.display()),
            )
        })?;

        tracing::trace!("Registered asset {}", dest.display());
        Ok(dest)
    }

    async fn register_assets(&self, pattern: &str) -> std::io::Result<Vec<PathBuf>> {
        // Only the caller's pattern is live; the directory is matched literally.
        let root = glob::Pattern::escape(&self.extracted_path.to_string_lossy());
        let full_pattern = Path::new(&root).join(pattern);
        let matches = glob::glob(&full_pattern.to_string_lossy())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        let mut names = Vec::new();
        for entry in matches {
            let path = entry.map_err(glob::GlobError::into_error)?;
            if !path.is_file() {
                continue;
            }
            if let Ok(relative) = path.strip_prefix(&self.extracted_path) {
                names.push(relative.to_string_lossy().into_owned());
            }
        }

        let mut installed = Vec::with_capacity(names.len());
        for name in names {
            installed.push(self.register_asset(&name).await?);
        }
        tracing::debug!("Registered {} assets matching {pattern}", installed.len());
        Ok(installed)
    }

    async fn register_binary(&self, name: &str, alias: &str) -> std::io::Result<PathBuf> {
        let installed = self.register_asset(name).await?;

        if self.platform.is_windows() {
            let body = format!("\"{}\"", installed.display());
            return self
                .write_launcher(alias, launcher_source(self.platform, &body))
                .await;
        }

        let link = self.alias_path(alias);
        remove_existing(&link).await?;

        #[cfg(unix)]
        fs::symlink(&installed, &link).await?;
        #[cfg(not(unix))]
        fs::copy(&installed, &link).await.map(|_| ())?;

        tracing::debug!("Linked {} -> {}", link.display(), installed.display());
        Ok(link)
    }

    async fn register_script(&self, alias: &str, body: &str) -> std::io::Result<PathBuf> {
        self.write_launcher(alias, launcher_source(self.platform, body))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn installation(root: &Path, platform: Platform) -> Installation {
        let extracted = root.join("extracted");
        std::fs::create_dir_all(&extracted).unwrap();
        Installation::new(
            platform,
            root.join("download.zip"),
            extracted,
            root.join("engines/jsshell"),
            root.join("bin"),
        )
    }

    #[tokio::test]
    async fn test_register_asset_copies_file() {
        let dir = TempDir::new().unwrap();
        let inst = installation(dir.path(), Platform::LinuxX64);
        inst.prepare().await.unwrap();
        std::fs::write(inst.extracted_path().join("js"), "elf").unwrap();

        let path = inst.register_asset("js").await.unwrap();
        assert_eq!(path, inst.install_path().join("js"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "elf");
    }

    #[tokio::test]
    async fn test_register_asset_missing_is_error() {
        let dir = TempDir::new().unwrap();
        let inst = installation(dir.path(), Platform::LinuxX64);
        inst.prepare().await.unwrap();

        let err = inst.register_asset("js").await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_register_assets_glob() {
        let dir = TempDir::new().unwrap();
        let inst = installation(dir.path(), Platform::LinuxX64);
        inst.prepare().await.unwrap();
        for name in ["libnspr4.so", "libplc4.so", "js", "README"] {
            std::fs::write(inst.extracted_path().join(name), name).unwrap();
        }

        let mut installed = inst.register_assets("*.so").await.unwrap();
        installed.sort();
        assert_eq!(
            installed,
            vec![
                inst.install_path().join("libnspr4.so"),
                inst.install_path().join("libplc4.so"),
            ]
        );
        assert!(!inst.install_path().join("js").exists());
    }

    #[tokio::test]
    async fn test_register_assets_under_bracketed_home() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("home [1]");
        let inst = installation(&root, Platform::LinuxX64);
        inst.prepare().await.unwrap();
        std::fs::write(inst.extracted_path().join("libnss3.so"), "so").unwrap();

        let installed = inst.register_assets("*.so").await.unwrap();
        assert_eq!(installed, vec![inst.install_path().join("libnss3.so")]);
    }

    #[tokio::test]
    async fn test_register_assets_no_matches() {
        let dir = TempDir::new().unwrap();
        let inst = installation(dir.path(), Platform::DarwinX64);
        inst.prepare().await.unwrap();

        assert!(inst.register_assets("*.dylib").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_register_script_unix_launcher() {
        let dir = TempDir::new().unwrap();
        let inst = installation(dir.path(), Platform::LinuxX64);
        inst.prepare().await.unwrap();

        let path = inst.register_script("sm", "\"/x/js\"").await.unwrap();
        assert_eq!(path, inst.bin_dir().join("sm"));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "#!/usr/bin/env bash\n\"/x/js\" \"$@\"\n"
        );

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[tokio::test]
    async fn test_register_script_windows_launcher() {
        let dir = TempDir::new().unwrap();
        let inst = installation(dir.path(), Platform::Win32X64);
        inst.prepare().await.unwrap();

        let path = inst.register_script("sm", "\"C:\\js.exe\"").await.unwrap();
        assert_eq!(path, inst.bin_dir().join("sm.cmd"));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "@echo off\r\n\"C:\\js.exe\" %*\r\n"
        );
    }

    #[tokio::test]
    async fn test_register_script_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let inst = installation(dir.path(), Platform::LinuxX64);
        inst.prepare().await.unwrap();

        inst.register_script("sm", "old").await.unwrap();
        let path = inst.register_script("sm", "new").await.unwrap();
        assert!(std::fs::read_to_string(path).unwrap().contains("new \"$@\""));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_register_binary_symlinks_on_unix() {
        let dir = TempDir::new().unwrap();
        let inst = installation(dir.path(), Platform::DarwinArm64);
        inst.prepare().await.unwrap();
        std::fs::write(inst.extracted_path().join("js"), "macho").unwrap();

        let sm = inst.register_binary("js", "sm").await.unwrap();
        let full = inst.register_binary("js", "spidermonkey").await.unwrap();

        assert_eq!(full, inst.bin_dir().join("spidermonkey"));
        assert_eq!(std::fs::read_link(&sm).unwrap(), inst.install_path().join("js"));
        assert_eq!(std::fs::read_to_string(&full).unwrap(), "macho");
    }

    #[tokio::test]
    async fn test_register_binary_windows_writes_shim() {
        let dir = TempDir::new().unwrap();
        let inst = installation(dir.path(), Platform::Win32Ia32);
        inst.prepare().await.unwrap();
        std::fs::write(inst.extracted_path().join("js.exe"), "MZ").unwrap();

        let shim = inst.register_binary("js.exe", "sm").await.unwrap();
        let text = std::fs::read_to_string(&shim).unwrap();
        assert!(shim.ends_with("sm.cmd"));
        assert!(text.contains(&format!("\"{}\"", inst.install_path().join("js.exe").display())));
    }
}
