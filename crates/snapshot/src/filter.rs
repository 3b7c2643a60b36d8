use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

#[derive(Debug, thiserror::Error)]
#[error("invalid skip pattern {pattern:?}: {source}")]
pub struct FilterError {
    pattern: String,
    #[source]
    source: ignore::Error,
}

/// Gitignore-style matcher deciding which snapshot paths are left out.
///
/// Patterns without a slash match the file name at any depth, so `._*`
/// catches `photos/._IMG_0001.JPG` as well as `._IMG_0001.JPG`.
pub struct SkipFilter {
    matcher: Gitignore,
}

impl Default for SkipFilter {
    fn default() -> Self {
        SkipFilter {
            matcher: Gitignore::empty(),
        }
    }
}

impl SkipFilter {
    pub fn new<I, S>(patterns: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        // Rooted at "." so candidate paths are never prefix-stripped;
        // snapshot paths are not relative to the working directory.
        let mut builder = GitignoreBuilder::new(Path::new("."));

        for pat in patterns {
            let pat = pat.as_ref();
            builder.add_line(None, pat).map_err(|source| FilterError {
                pattern: pat.to_owned(),
                source,
            })?;
        }

        let matcher = builder.build().map_err(|source| FilterError {
            pattern: String::new(),
            source,
        })?;

        Ok(SkipFilter { matcher })
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.matcher.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn is_skipped(&self, path: &str) -> bool {
        !self.is_empty() && self.matcher.matched(Path::new(path), false).is_ignore()
    }
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
