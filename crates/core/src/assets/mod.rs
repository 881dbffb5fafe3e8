use std::path::Path;

use url::Url;

use crate::{PlayerError, Result};

/// Resolves timeline media references (`file` fields) into fetchable URLs.
///
/// References that already carry a scheme are used as-is; everything else is
/// joined onto the configured base.
#[derive(Debug, Clone, Default)]
pub struct AssetResolver {
    base: Option<Url>,
}

impl AssetResolver {
    pub fn new(base: Option<Url>) -> Self {
        Self { base }
    }

    pub fn from_base_url(base: &str) -> Result<Self> {
        Ok(Self::new(Some(Url::parse(&with_trailing_slash(base))?)))
    }

    /// Resolver for catalogs stored on disk: relative references point next to
    /// the catalog file.
    pub fn from_directory(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let base = Url::from_directory_path(dir).map_err(|()| {
            PlayerError::msg(format!(
                "media directory `{}` must be an absolute path",
                dir.display()
            ))
        })?;
        Ok(Self::new(Some(base)))
    }

    pub fn base(&self) -> Option<&Url> {
        self.base.as_ref()
    }

    pub fn resolve(&self, reference: &str) -> Result<Url> {
        match Url::parse(reference) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.base {
                Some(base) => Ok(base.join(reference)?),
                None => Err(PlayerError::msg(format!(
                    "relative media reference `{reference}` needs a base URL"
                ))),
            },
            Err(err) => Err(err.into()),
        }
    }
}

fn with_trailing_slash(base: &str) -> String {
    if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    }
}
