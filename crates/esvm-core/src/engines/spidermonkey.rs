//! SpiderMonkey, Mozilla's engine, installed from the `jsshell` archives
//! published next to every Firefox build.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use esvm_schema::{EngineConfig, Platform, VersionSpec};

use crate::buildhub::{BuildQuery, Buildhub};
use crate::engine::{Engine, EngineError};
use crate::installer::Registrar;
use crate::io::extract;

use super::self_test;

/// Root of Mozilla's build archive.
pub const ARCHIVE_BASE_URL: &str = "https://archive.mozilla.org/pub/firefox";

/// Static descriptor: `jsshell`, aliased as `spidermonkey` and `sm`.
pub const CONFIG: EngineConfig = EngineConfig {
    name: "SpiderMonkey",
    id: "jsshell",
    aliases: &["spidermonkey", "sm"],
    supported: &[
        Platform::LinuxIa32,
        Platform::LinuxX64,
        Platform::Win32Ia32,
        Platform::Win32X64,
        Platform::DarwinX64,
        Platform::DarwinArm64,
    ],
};

/// Buildhub only lists Windows builds for the nightly channel, so the
/// newest win64 nightly stands in for every platform.
const NIGHTLY_QUERY: BuildQuery<'static> = BuildQuery {
    product: "firefox",
    tree: "mozilla-central",
    channel: "nightly",
    platform: "win64",
};

/// Program and expected output for the post-install smoke test.
const TEST_PROGRAM: &str = "print(\"42\");";
const TEST_OUTPUT: &str = "42";

/// Per-platform `jsshell-<token>.zip` archive token.
pub fn archive_token(platform: Platform) -> Option<&'static str> {
    match platform {
        Platform::DarwinX64 | Platform::DarwinArm64 => Some("mac"),
        Platform::LinuxIa32 => Some("linux-i686"),
        Platform::LinuxX64 => Some("linux-x86_64"),
        Platform::Win32Ia32 => Some("win32"),
        Platform::Win32X64 => Some("win64"),
        Platform::LinuxArm64 | Platform::Win32Arm64 => None,
    }
}

/// SpiderMonkey installer for a single target platform.
///
/// Resolves versions through Buildhub and downloads from the Mozilla archive.
#[derive(Debug)]
pub struct SpiderMonkey {
    platform: Platform,
    buildhub: Buildhub,
    archive_base: String,
    bin_path: Option<PathBuf>,
}

impl SpiderMonkey {
    /// Installer for `platform` backed by the public archive.
    pub fn new(platform: Platform, buildhub: Buildhub) -> Self {
        Self {
            platform,
            buildhub,
            archive_base: ARCHIVE_BASE_URL.to_string(),
            bin_path: None,
        }
    }

    /// Use a mirror of the Mozilla archive instead of the public one.
    pub fn with_archive_base(mut self, base: impl Into<String>) -> Self {
        self.archive_base = base.into().trim_end_matches('/').to_string();
        self
    }

    fn unsupported(&self) -> EngineError {
        EngineError::UnsupportedPlatform {
            engine: CONFIG.name,
            platform: self.platform,
        }
    }
}

#[async_trait]
impl Engine for SpiderMonkey {
    fn config(&self) -> &'static EngineConfig {
        &CONFIG
    }

    fn platform(&self) -> Platform {
        self.platform
    }

    async fn resolve_version(&self, version: &VersionSpec) -> Result<VersionSpec, EngineError> {
        if !version.is_latest() {
            return Ok(version.clone());
        }

        let build = self
            .buildhub
            .latest(&NIGHTLY_QUERY)
            .await
            .map_err(|source| EngineError::VersionResolution {
                engine: CONFIG.name,
                source,
            })?;

        Ok(VersionSpec::nightly(&build.version, &build.build_id))
    }

    fn download_url(&self, version: &VersionSpec) -> Result<String, EngineError> {
        let token = archive_token(self.platform).ok_or_else(|| self.unsupported())?;

        if let Some(id) = version.build_id() {
            return Ok(format!(
                "{}/nightly/{}/{}/{}-mozilla-central/jsshell-{token}.zip",
                self.archive_base,
                id.year(),
                id.month(),
                id.date(),
            ));
        }

        Ok(format!(
            "{}/releases/{version}/jsshell/jsshell-{token}.zip",
            self.archive_base
        ))
    }

    async fn extract(&self, registrar: &dyn Registrar) -> Result<(), EngineError> {
        extract::unzip(registrar.download_path(), registrar.extracted_path()).await?;
        Ok(())
    }

    async fn install(&mut self, registrar: &dyn Registrar) -> Result<(), EngineError> {
        let bin_path = match self.platform {
            Platform::DarwinX64 | Platform::DarwinArm64 => {
                registrar.register_assets("*.dylib").await?;
                registrar.register_binary("js", "sm").await?;
                registrar.register_binary("js", "spidermonkey").await?
            }
            Platform::LinuxIa32 | Platform::LinuxX64 => {
                registrar.register_assets("*.so").await?;
                // Not linked directly: the binary needs its .so files on the search path
                let sm = registrar.register_asset("js").await?;
                let source = format!(
                    "LD_LIBRARY_PATH=\"{}\" \"{}\"",
                    registrar.install_path().display(),
                    sm.display()
                );
                let bin_path = registrar.register_script("spidermonkey", &source).await?;
                registrar.register_script("sm", &source).await?;
                bin_path
            }
            Platform::Win32Ia32 | Platform::Win32X64 => {
                registrar.register_assets("*.dll").await?;
                let sm = registrar.register_asset("js.exe").await?;
                let source = format!("\"{}\"", sm.display());
                let bin_path = registrar.register_script("spidermonkey", &source).await?;
                registrar.register_script("sm", &source).await?;
                bin_path
            }
            Platform::LinuxArm64 | Platform::Win32Arm64 => return Err(self.unsupported()),
        };

        tracing::debug!("SpiderMonkey entry point: {}", bin_path.display());
        self.bin_path = Some(bin_path);
        Ok(())
    }

    async fn test(&self) -> Result<(), EngineError> {
        let bin_path = self
            .bin_path
            .as_deref()
            .ok_or_else(|| EngineError::SelfTest {
                engine: CONFIG.name,
                reason: "engine is not installed".to_string(),
            })?;

        self_test::expect_output(
            CONFIG.name,
            bin_path,
            &["-e", TEST_PROGRAM],
            TEST_OUTPUT,
        )
        .await
    }

    fn bin_path(&self) -> Option<&Path> {
        self.bin_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installer::Installation;
    use mockito::Server;
    use reqwest::Client;
    use tempfile::TempDir;

    const TOKENS: [&str; 5] = ["mac", "linux-i686", "linux-x86_64", "win32", "win64"];

    /// Buildhub pointed at a port nothing listens on: any request fails.
    fn offline_buildhub() -> Buildhub {
        Buildhub::new(Client::new(), "http://127.0.0.1:9/api/search")
    }

    fn engine(platform: Platform) -> SpiderMonkey {
        SpiderMonkey::new(platform, offline_buildhub())
    }

    fn installation(root: &Path, platform: Platform) -> Installation {
        let extracted = root.join("extracted");
        std::fs::create_dir_all(&extracted).unwrap();
        Installation::new(
            platform,
            root.join("jsshell.zip"),
            extracted,
            root.join("engines/jsshell"),
            root.join("bin"),
        )
    }

    #[test]
    fn test_every_supported_platform_has_one_token() {
        let version = VersionSpec::parse("128.0").unwrap();
        for platform in CONFIG.supported {
            let url = engine(*platform).download_url(&version).unwrap();
            let file = url.rsplit('/').next().unwrap();
            let hits: Vec<_> = TOKENS
                .iter()
                .filter(|t| file == format!("jsshell-{t}.zip"))
                .collect();
            assert_eq!(hits.len(), 1, "{platform}: {url}");
            assert_eq!(Some(*hits[0]), archive_token(*platform));
        }
    }

    #[test]
    fn test_token_table() {
        assert_eq!(archive_token(Platform::DarwinX64), Some("mac"));
        assert_eq!(archive_token(Platform::DarwinArm64), Some("mac"));
        assert_eq!(archive_token(Platform::LinuxIa32), Some("linux-i686"));
        assert_eq!(archive_token(Platform::LinuxX64), Some("linux-x86_64"));
        assert_eq!(archive_token(Platform::Win32Ia32), Some("win32"));
        assert_eq!(archive_token(Platform::Win32X64), Some("win64"));
    }

    #[test]
    fn test_release_url() {
        let url = engine(Platform::LinuxX64)
            .download_url(&VersionSpec::parse("128.0").unwrap())
            .unwrap();
        assert_eq!(
            url,
            "https://archive.mozilla.org/pub/firefox/releases/128.0/jsshell/jsshell-linux-x86_64.zip"
        );
    }

    #[test]
    fn test_nightly_url() {
        let url = engine(Platform::DarwinArm64)
            .download_url(&VersionSpec::parse("91.0a1#20210501123456").unwrap())
            .unwrap();
        assert_eq!(
            url,
            "https://archive.mozilla.org/pub/firefox/nightly/2021/05/2021-05-01-mozilla-central/jsshell-mac.zip"
        );
    }

    #[test]
    fn test_short_suffix_is_a_release() {
        let url = engine(Platform::Win32X64)
            .download_url(&VersionSpec::parse("91.0a1#2021").unwrap())
            .unwrap();
        assert!(url.contains("/releases/91.0a1#2021/jsshell/jsshell-win64.zip"));
    }

    #[test]
    fn test_mirror_base() {
        let url = engine(Platform::Win32Ia32)
            .with_archive_base("http://mirror.local/firefox/")
            .download_url(&VersionSpec::parse("115.0").unwrap())
            .unwrap();
        assert_eq!(
            url,
            "http://mirror.local/firefox/releases/115.0/jsshell/jsshell-win32.zip"
        );
    }

    #[tokio::test]
    async fn test_unsupported_platform_fails_before_network() {
        let mut server = Server::new_async().await;
        let m = server.mock("POST", mockito::Matcher::Any).expect(0).create_async().await;
        let hub = Buildhub::new(Client::new(), format!("{}/api/search", server.url()));

        for platform in [Platform::LinuxArm64, Platform::Win32Arm64] {
            let sm = SpiderMonkey::new(platform, hub.clone()).with_archive_base(server.url());
            let err = sm
                .download_url(&VersionSpec::parse("128.0").unwrap())
                .unwrap_err();
            assert!(err.is_unsupported_platform());
            assert_eq!(
                err.to_string(),
                format!("No SpiderMonkey builds available for {platform}")
            );
        }
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_resolve_passthrough() {
        let sm = engine(Platform::LinuxX64);
        let v = VersionSpec::parse("128.0").unwrap();
        assert_eq!(sm.resolve_version(&v).await.unwrap(), v);
    }

    #[tokio::test]
    async fn test_resolve_latest_queries_buildhub_once() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/api/search")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "query": { "bool": { "must": [
                    { "term": { "source.product": "firefox" } },
                    { "term": { "source.tree": "mozilla-central" } },
                    { "term": { "target.channel": "nightly" } },
                    { "term": { "target.platform": "win64" } },
                ] } }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"hits":{"hits":[{"_source":{"build":{"id":"20210501123456"},"target":{"version":"91.0a1"}}}]}}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let hub = Buildhub::new(Client::new(), format!("{}/api/search", server.url()));
        let sm = SpiderMonkey::new(Platform::LinuxX64, hub);
        let resolved = sm.resolve_version(&VersionSpec::latest()).await.unwrap();

        assert_eq!(resolved.as_str(), "91.0a1#20210501123456");
        assert_eq!(resolved.build_id().unwrap().as_str(), "20210501123456");
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_resolve_latest_empty_hits_fails() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/api/search")
            .with_status(200)
            .with_body(r#"{"hits":{"hits":[]}}"#)
            .create_async()
            .await;

        let hub = Buildhub::new(Client::new(), format!("{}/api/search", server.url()));
        let sm = SpiderMonkey::new(Platform::LinuxX64, hub);
        let err = sm.resolve_version(&VersionSpec::latest()).await.unwrap_err();
        assert!(matches!(err, EngineError::VersionResolution { .. }));
    }

    #[tokio::test]
    async fn test_resolve_latest_network_failure() {
        let sm = engine(Platform::LinuxX64);
        let err = sm.resolve_version(&VersionSpec::latest()).await.unwrap_err();
        assert!(matches!(err, EngineError::VersionResolution { .. }));
    }

    #[tokio::test]
    async fn test_install_linux_wraps_ld_library_path() {
        let dir = TempDir::new().unwrap();
        let inst = installation(dir.path(), Platform::LinuxX64);
        inst.prepare().await.unwrap();
        for name in ["js", "libnss3.so", "libmozglue.so"] {
            std::fs::write(inst.extracted_path().join(name), name).unwrap();
        }

        let mut sm = engine(Platform::LinuxX64);
        sm.install(&inst).await.unwrap();

        let bin = sm.bin_path().unwrap();
        assert_eq!(bin, inst.bin_dir().join("spidermonkey"));
        let script = std::fs::read_to_string(bin).unwrap();
        let expected = format!(
            "LD_LIBRARY_PATH=\"{}\" \"{}\"",
            inst.install_path().display(),
            inst.install_path().join("js").display()
        );
        assert!(script.contains(&expected), "{script}");
        assert_eq!(
            std::fs::read_to_string(inst.bin_dir().join("sm")).unwrap(),
            script
        );
        assert!(inst.install_path().join("libnss3.so").exists());
        assert!(inst.install_path().join("libmozglue.so").exists());
    }

    #[tokio::test]
    async fn test_install_windows_quotes_exe() {
        let dir = TempDir::new().unwrap();
        let inst = installation(dir.path(), Platform::Win32X64);
        inst.prepare().await.unwrap();
        for name in ["js.exe", "mozglue.dll", "nss3.dll"] {
            std::fs::write(inst.extracted_path().join(name), name).unwrap();
        }

        let mut sm = engine(Platform::Win32X64);
        sm.install(&inst).await.unwrap();

        let bin = sm.bin_path().unwrap();
        assert_eq!(bin, inst.bin_dir().join("spidermonkey.cmd"));
        let script = std::fs::read_to_string(bin).unwrap();
        assert!(!script.contains("LD_LIBRARY_PATH="));
        assert!(script.contains(&format!(
            "\"{}\" %*",
            inst.install_path().join("js.exe").display()
        )));
        assert!(inst.bin_dir().join("sm.cmd").exists());
        assert!(inst.install_path().join("mozglue.dll").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_install_mac_links_both_aliases() {
        let dir = TempDir::new().unwrap();
        let inst = installation(dir.path(), Platform::DarwinX64);
        inst.prepare().await.unwrap();
        for name in ["js", "libnss3.dylib"] {
            std::fs::write(inst.extracted_path().join(name), name).unwrap();
        }

        let mut sm = engine(Platform::DarwinX64);
        sm.install(&inst).await.unwrap();

        assert_eq!(sm.bin_path().unwrap(), inst.bin_dir().join("spidermonkey"));
        assert!(inst.bin_dir().join("sm").exists());
        assert!(inst.install_path().join("libnss3.dylib").exists());
    }

    #[tokio::test]
    async fn test_install_rechecks_platform() {
        let dir = TempDir::new().unwrap();
        let inst = installation(dir.path(), Platform::LinuxArm64);
        inst.prepare().await.unwrap();
        std::fs::write(inst.extracted_path().join("js"), "js").unwrap();

        let mut sm = engine(Platform::LinuxArm64);
        let err = sm.install(&inst).await.unwrap_err();
        assert!(err.is_unsupported_platform());
        assert!(sm.bin_path().is_none());
    }

    #[tokio::test]
    async fn test_self_test_before_install_fails_fast() {
        let sm = engine(Platform::LinuxX64);
        let err = sm.test().await.unwrap_err();
        assert!(matches!(err, EngineError::SelfTest { .. }));
    }

    #[cfg(unix)]
    fn stub(dir: &Path, name: &str, script: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_self_test_accepts_42() {
        let dir = TempDir::new().unwrap();
        let bin = stub(
            dir.path(),
            "js",
            "#!/bin/sh\n[ \"$1\" = \"-e\" ] && [ \"$2\" = 'print(\"42\");' ] && echo 42\n",
        );

        let mut sm = engine(Platform::LinuxX64);
        sm.bin_path = Some(bin);
        sm.test().await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_self_test_rejects_other_output() {
        let dir = TempDir::new().unwrap();
        let bin = stub(dir.path(), "js", "#!/bin/sh\necho 41\n");

        let mut sm = engine(Platform::LinuxX64);
        sm.bin_path = Some(bin);
        let err = sm.test().await.unwrap_err();
        assert!(matches!(err, EngineError::SelfTest { .. }));
        assert!(err.to_string().contains("41"));
    }
}
