//! Download dispatch
//!
//! Turns each descriptor into a local file. Release assets go through the
//! lock-gated content cache; repository files and plain URLs are always
//! fetched into the run's temporary directory.

use std::path::{Path, PathBuf};

use crate::core::cache::ContentCache;
use crate::core::descriptor::{AssetDescriptor, AssetSelector};
use crate::core::lock::{LockRecord, LockStore};
use crate::core::placement::Placer;
use crate::core::section::Section;
use crate::error::{DownloadError, SdpackError};
use crate::github::GithubClient;
use crate::infra::download::{file_name_from_url, DownloadManager};
use crate::infra::filesystem;

/// Tally of one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Files transferred
    pub downloaded: usize,
    /// Release assets served from the cache
    pub up_to_date: usize,
    /// Items that produced nothing to place
    pub failed: usize,
}

impl RunSummary {
    /// Total items processed
    pub fn total(&self) -> usize {
        self.downloaded + self.up_to_date + self.failed
    }
}

/// What a single download attempt produced
enum Fetched {
    Transferred(PathBuf),
    Cached(PathBuf),
    Nothing,
}

/// Resolves descriptors to local files
#[derive(Debug)]
pub struct Engine {
    github: GithubClient,
    downloader: DownloadManager,
    cache: ContentCache,
    temp_dir: PathBuf,
    summary: RunSummary,
}

impl Engine {
    /// Create an engine; uncached files land in `temp_dir`
    pub fn new(
        github: GithubClient,
        downloader: DownloadManager,
        cache: ContentCache,
        temp_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            github,
            downloader,
            cache,
            temp_dir: temp_dir.into(),
            summary: RunSummary::default(),
        }
    }

    /// Counts so far
    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Obtain the file described by `descriptor`
    ///
    /// `Ok(None)` means there is nothing to place; the reason has already
    /// been printed. Errors are transport failures and abort the run.
    pub async fn download(
        &mut self,
        descriptor: &AssetDescriptor,
        lock: &mut LockStore,
    ) -> Result<Option<PathBuf>, DownloadError> {
        let fetched = match descriptor {
            AssetDescriptor::GithubReleaseAsset { repo, selector } => {
                self.download_release_asset(repo, selector, lock).await?
            }
            AssetDescriptor::GithubRepoFile { repo, file_path } => {
                self.download_repo_file(repo, file_path).await?
            }
            AssetDescriptor::RawUrl { url } => self.download_url(url.as_str()).await?,
        };

        Ok(match fetched {
            Fetched::Transferred(path) => {
                self.summary.downloaded += 1;
                Some(path)
            }
            Fetched::Cached(path) => {
                self.summary.up_to_date += 1;
                Some(path)
            }
            Fetched::Nothing => {
                self.summary.failed += 1;
                None
            }
        })
    }

    /// Download and place every item of `sections`, in order
    ///
    /// Each placed item's `remove` list is applied right after it. The lock
    /// store is left as it stood at the failing item when an error is
    /// returned; saving it is up to the caller.
    pub async fn download_all(
        &mut self,
        sections: &[Section],
        lock: &mut LockStore,
        placer: &Placer,
    ) -> Result<(), SdpackError> {
        filesystem::create_dir_all(placer.sd_root())?;

        for section in sections {
            println!("Downloading {}:", section.id);

            for item in &section.items {
                let Some(artifact) = self.download(&item.descriptor, lock).await? else {
                    continue;
                };
                placer.place(&artifact, section.id)?;
                placer.remove_from_root(&item.remove)?;
            }
        }
        Ok(())
    }

    async fn download_release_asset(
        &self,
        repo: &str,
        selector: &AssetSelector,
        lock: &mut LockStore,
    ) -> Result<Fetched, DownloadError> {
        let Some(release) = self.github.latest_release(repo).await? else {
            println!("Unable to get latest release for `{repo}`");
            return Ok(Fetched::Nothing);
        };

        let Some(asset) = release.find_asset(selector) else {
            println!("Unable to get matching asset for `{repo}`");
            return Ok(Fetched::Nothing);
        };

        let current = LockRecord {
            repo: repo.to_string(),
            tag_name: release.tag_name.clone(),
            asset_name: asset.name.clone(),
            asset_updated_at: asset.updated_at.clone(),
        };

        if let Some(previous) = lock.find(repo, selector).cloned() {
            if previous == current && self.cache.contains(&current) {
                println!("\t{repo}: Already up to date");
                return Ok(Fetched::Cached(self.cache.asset_path(&current)));
            }
            if previous != current {
                tracing::debug!(
                    "`{repo}` moved from {} to {}",
                    previous.tag_name,
                    current.tag_name
                );
                self.cache.evict(&previous);
                lock.remove(repo, selector);
            }
        }

        println!("\t{repo}: {}", asset.name);
        let target_dir = self.cache.asset_dir(&current);
        let fetched = self
            .downloader
            .fetch(&asset.browser_download_url, &target_dir)
            .await?;

        Ok(match fetched {
            Some(path) => {
                lock.upsert(selector, current);
                Fetched::Transferred(path)
            }
            None => Fetched::Nothing,
        })
    }

    async fn download_repo_file(
        &self,
        repo: &str,
        file_path: &str,
    ) -> Result<Fetched, DownloadError> {
        let name = Path::new(file_path)
            .file_name()
            .map_or_else(|| file_path.into(), |n| n.to_string_lossy());
        println!("\t{repo}: {name}");

        let Some(branch) = self.github.default_branch(repo).await? else {
            println!("Unable to get default branch for `{repo}`");
            return Ok(Fetched::Nothing);
        };

        let url = self.github.raw_file_url(repo, &branch, file_path);
        self.fetch_to_temp(&url).await
    }

    async fn download_url(&self, url: &str) -> Result<Fetched, DownloadError> {
        let name = file_name_from_url(url).unwrap_or_else(|| url.to_string());
        println!("\t{name}");
        self.fetch_to_temp(url).await
    }

    async fn fetch_to_temp(&self, url: &str) -> Result<Fetched, DownloadError> {
        Ok(self
            .downloader
            .fetch(url, &self.temp_dir)
            .await?
            .map_or(Fetched::Nothing, Fetched::Transferred))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Url;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct Fixture {
        server: MockServer,
        temp: TempDir,
        engine: Engine,
    }

    async fn fixture() -> Fixture {
        let server = MockServer::start().await;
        let temp = TempDir::new().unwrap();
        let github = GithubClient::with_urls(server.uri(), server.uri(), None);
        let engine = Engine::new(
            github,
            DownloadManager::new(),
            ContentCache::new(temp.path().join("cache")),
            temp.path().join("tmp"),
        );
        Fixture {
            server,
            temp,
            engine,
        }
    }

    fn release_asset(name: &str) -> AssetDescriptor {
        AssetDescriptor::GithubReleaseAsset {
            repo: "foo/bar".to_string(),
            selector: AssetSelector::Name(name.to_string()),
        }
    }

    async fn mount_release(server: &MockServer, tag: &str, assets: &[&str]) {
        let assets: Vec<_> = assets
            .iter()
            .map(|name| {
                json!({
                    "name": name,
                    "browser_download_url": format!("{}/download/{tag}/{name}", server.uri()),
                    "updated_at": "2024-01-01T00:00:00Z",
                })
            })
            .collect();
        Mock::given(method("GET"))
            .and(path("/repos/foo/bar/releases/latest"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"tag_name": tag, "assets": assets})),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_release_asset_is_cached_and_locked() {
        let mut f = fixture().await;
        mount_release(&f.server, "v1.0", &["bar-v1.0.zip"]).await;
        Mock::given(method("GET"))
            .and(path("/download/v1.0/bar-v1.0.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"zip".to_vec()))
            .expect(1)
            .mount(&f.server)
            .await;

        let mut lock = LockStore::new();
        let descriptor = release_asset("bar-v1.0.zip");

        let first = f.engine.download(&descriptor, &mut lock).await.unwrap();
        let second = f.engine.download(&descriptor, &mut lock).await.unwrap();

        assert_eq!(first, second);
        assert!(first.unwrap().starts_with(f.temp.path().join("cache")));
        assert_eq!(
            lock.all(),
            &[LockRecord {
                repo: "foo/bar".to_string(),
                tag_name: "v1.0".to_string(),
                asset_name: "bar-v1.0.zip".to_string(),
                asset_updated_at: "2024-01-01T00:00:00Z".to_string(),
            }]
        );
        assert_eq!(
            f.engine.summary(),
            RunSummary {
                downloaded: 1,
                up_to_date: 1,
                failed: 0
            }
        );
    }

    #[tokio::test]
    async fn test_missing_cache_file_is_fetched_again() {
        let mut f = fixture().await;
        mount_release(&f.server, "v1.0", &["bar.bin"]).await;
        Mock::given(method("GET"))
            .and(path("/download/v1.0/bar.bin"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"bin".to_vec()))
            .expect(2)
            .mount(&f.server)
            .await;

        let mut lock = LockStore::new();
        let descriptor = release_asset("bar.bin");

        let path = f.engine.download(&descriptor, &mut lock).await.unwrap().unwrap();
        std::fs::remove_file(&path).unwrap();
        let again = f.engine.download(&descriptor, &mut lock).await.unwrap();

        assert_eq!(again, Some(path));
        assert_eq!(lock.len(), 1);
    }

    #[tokio::test]
    async fn test_unmatched_asset_is_soft() {
        let mut f = fixture().await;
        mount_release(&f.server, "v1.0", &["other.zip"]).await;

        let mut lock = LockStore::new();
        let result = f
            .engine
            .download(&release_asset("bar.zip"), &mut lock)
            .await
            .unwrap();

        assert_eq!(result, None);
        assert!(lock.is_empty());
        assert_eq!(f.engine.summary().failed, 1);
    }

    #[tokio::test]
    async fn test_failed_asset_download_leaves_lock_untouched() {
        let mut f = fixture().await;
        mount_release(&f.server, "v1.0", &["bar.zip"]).await;
        Mock::given(method("GET"))
            .and(path("/download/v1.0/bar.zip"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&f.server)
            .await;

        let mut lock = LockStore::new();
        let result = f
            .engine
            .download(&release_asset("bar.zip"), &mut lock)
            .await
            .unwrap();

        assert_eq!(result, None);
        assert!(lock.is_empty());
    }

    #[tokio::test]
    async fn test_repo_file_uses_default_branch() {
        let mut f = fixture().await;
        Mock::given(method("GET"))
            .and(path("/repos/foo/bar"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"default_branch": "develop"})),
            )
            .mount(&f.server)
            .await;
        Mock::given(method("GET"))
            .and(path("/foo/bar/develop/scripts/dump.te"))
            .respond_with(ResponseTemplate::new(200).set_body_string("script"))
            .expect(1)
            .mount(&f.server)
            .await;

        let descriptor = AssetDescriptor::GithubRepoFile {
            repo: "foo/bar".to_string(),
            file_path: "scripts/dump.te".to_string(),
        };
        let mut lock = LockStore::new();
        let path = f.engine.download(&descriptor, &mut lock).await.unwrap().unwrap();

        assert_eq!(path, f.temp.path().join("tmp/dump.te"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "script");
        assert!(lock.is_empty());
    }

    #[tokio::test]
    async fn test_raw_url_goes_to_temp() {
        let mut f = fixture().await;
        Mock::given(method("GET"))
            .and(path("/files/lockpick.bin"))
            .respond_with(ResponseTemplate::new(200).set_body_string("payload"))
            .mount(&f.server)
            .await;

        let url = Url::parse(&format!("{}/files/lockpick.bin", f.server.uri())).unwrap();
        let mut lock = LockStore::new();
        let path = f
            .engine
            .download(&AssetDescriptor::RawUrl { url }, &mut lock)
            .await
            .unwrap();

        assert_eq!(path, Some(f.temp.path().join("tmp/lockpick.bin")));
    }
}
