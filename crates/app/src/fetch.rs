use std::{fmt, io::Read, path::PathBuf};

use meditation_player_core::{
    ApiConfig, AssetResolver, MediaCompletion, MediaRequest, MeditationSource, PlayerError, Result,
};
use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;
use url::Url;

/// Where the meditation catalog comes from.
#[derive(Debug, Clone)]
pub enum CatalogSource {
    File(PathBuf),
    Remote(Url),
}

impl CatalogSource {
    /// Uses `location` when given (an http(s) URL or a file path), otherwise
    /// the configured API endpoint.
    pub fn locate(location: Option<&str>, api: &ApiConfig) -> Result<Self> {
        match location {
            Some(location) if is_remote(location) => Ok(Self::Remote(Url::parse(location)?)),
            Some(location) => Ok(Self::File(std::path::absolute(location)?)),
            None => {
                let base = api.base_url.as_deref().ok_or_else(|| {
                    PlayerError::msg("no catalog given and no API base URL configured")
                })?;
                let resolver = AssetResolver::from_base_url(base)?;
                Ok(Self::Remote(resolver.resolve(&api.meditations_path)?))
            }
        }
    }

    /// Relative media references resolve next to the catalog.
    pub fn default_resolver(&self) -> Result<AssetResolver> {
        match self {
            Self::File(path) => {
                let dir = path
                    .parent()
                    .ok_or_else(|| PlayerError::msg("catalog path has no parent directory"))?;
                AssetResolver::from_directory(dir)
            }
            Self::Remote(url) => Ok(AssetResolver::new(Some(url.clone()))),
        }
    }
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Remote(url) => f.write_str(url.as_str()),
        }
    }
}

impl MeditationSource for CatalogSource {
    fn fetch_catalog(&self) -> Result<Value> {
        match self {
            Self::File(path) => {
                let raw = std::fs::read_to_string(path)?;
                Ok(serde_json::from_str(&raw)?)
            }
            Self::Remote(url) => {
                let response = ureq::get(url.as_str())
                    .set("Accept", "application/json")
                    .call()
                    .map_err(|err| PlayerError::fetch(url.as_str(), err))?;
                Ok(response.into_json()?)
            }
        }
    }
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Fetches `request` in the background and reports back on `completions`.
pub fn spawn_fetch(request: MediaRequest, completions: UnboundedSender<MediaCompletion>) {
    tokio::spawn(async move {
        let result = fetch_bytes(&request.url).await;
        if let Err(err) = &result {
            tracing::debug!(url = %request.url, "fetch failed: {err}");
        }
        // The receiver is gone once the session loop has exited.
        let _ = completions.send(MediaCompletion::new(request, result));
    });
}

async fn fetch_bytes(url: &Url) -> Result<Vec<u8>> {
    match url.scheme() {
        "file" => {
            let path = url
                .to_file_path()
                .map_err(|()| PlayerError::fetch(url.as_str(), "not a local path"))?;
            Ok(tokio::fs::read(path).await?)
        }
        "http" | "https" => {
            let url = url.clone();
            tokio::task::spawn_blocking(move || http_get(&url))
                .await
                .map_err(|err| PlayerError::msg(format!("fetch task failed: {err}")))?
        }
        other => Err(PlayerError::UnsupportedScheme(other.to_string())),
    }
}

fn http_get(url: &Url) -> Result<Vec<u8>> {
    let response = ureq::get(url.as_str())
        .set("Accept", "*/*")
        .call()
        .map_err(|err| PlayerError::fetch(url.as_str(), err))?;

    let mut bytes = Vec::new();
    response.into_reader().read_to_end(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locates_files_and_urls() {
        let api = ApiConfig::default();

        let remote = CatalogSource::locate(Some("https://api.test/meditations/"), &api).unwrap();
        assert!(matches!(remote, CatalogSource::Remote(_)));

        let file = CatalogSource::locate(Some("catalog.json"), &api).unwrap();
        let CatalogSource::File(path) = &file else {
            panic!("expected a file source");
        };
        assert!(path.is_absolute());
        assert_eq!(
            file.default_resolver().unwrap().base().unwrap().scheme(),
            "file"
        );
    }

    #[test]
    fn falls_back_to_the_configured_api() {
        let api = ApiConfig {
            base_url: Some("https://api.test/v1".to_string()),
            ..ApiConfig::default()
        };

        let source = CatalogSource::locate(None, &api).unwrap();
        assert_eq!(source.to_string(), "https://api.test/v1/api/meditations/");

        assert!(CatalogSource::locate(None, &ApiConfig::default()).is_err());
    }

    #[test]
    fn reads_catalog_files() {
        let path = std::env::temp_dir().join(format!("catalog-{}.json", std::process::id()));
        std::fs::write(&path, r#"[{"id": "a", "title": "A", "durationMs": 10}]"#).unwrap();

        let payload = CatalogSource::File(path.clone()).fetch_catalog().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(meditation_player_core::parse_catalog(&payload).len(), 1);
    }

    #[test]
    fn file_fetches_report_missing_files() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let url = Url::from_file_path(std::env::temp_dir().join("missing-clip.wav")).unwrap();

        let result = runtime.block_on(fetch_bytes(&url));
        assert!(matches!(result, Err(PlayerError::Io(_))));

        let ftp = Url::parse("ftp://media.test/a.wav").unwrap();
        let result = runtime.block_on(fetch_bytes(&ftp));
        assert!(matches!(result, Err(PlayerError::UnsupportedScheme(_))));
    }
}
