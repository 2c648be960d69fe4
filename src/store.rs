//! Cache of hook repositories
//!
//! Each source URL gets one bare repository under the cache directory.
//! Revisions are resolved against the cached refs first and the source is
//! only fetched when the pin is missing or looks mutable (a branch).
//! Manifests are read straight from the commit tree, so nothing is checked
//! out.

use crate::catalog::{CatalogError, HookCatalog};
use crate::manifest::{HookDefinition, MANIFEST_FILE, parse_manifest};
use crate::pipeline::Revision;
use git2::{Oid, Repository};
use std::path::{Path, PathBuf};

const FETCH_REFSPECS: [&str; 2] = [
    "+refs/heads/*:refs/remotes/origin/*",
    "+refs/tags/*:refs/tags/*",
];

pub struct RepoStore {
    cache_dir: PathBuf,
    offline: bool,
}

impl RepoStore {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            offline: false,
        }
    }

    /// Never fetch; only revisions already in the cache resolve
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Directory holding the bare repository for `url`
    pub fn cache_path(&self, url: &str) -> PathBuf {
        self.cache_dir.join(cache_key(url))
    }

    /// Resolve a revision pin to a commit id, fetching when needed
    pub fn resolve(&self, url: &str, rev: &Revision) -> Result<Oid, CatalogError> {
        let repo = self.open_or_init(url)?;

        if let Some(oid) = lookup(&repo, rev) {
            if rev.is_immutable() || self.offline {
                tracing::trace!("Cache hit for {}@{} ({})", url, rev, short(oid));
                return Ok(oid);
            }
            tracing::debug!("Revision '{}' looks mutable, refreshing {}", rev, url);
        }

        if self.offline {
            return Err(CatalogError::Unresolvable {
                reason: format!("`{rev}` is not cached and offline mode is enabled"),
            });
        }

        tracing::info!("Fetching {}", url);
        let mut remote = repo
            .find_remote("origin")
            .or_else(|_| repo.remote("origin", url))
            .map_err(|err| unresolvable(url, &err))?;
        remote
            .fetch(&FETCH_REFSPECS, None, None)
            .map_err(|err| unresolvable(url, &err))?;

        let oid = lookup(&repo, rev).ok_or_else(|| CatalogError::Unresolvable {
            reason: format!("revision not found in {url}"),
        })?;
        tracing::info!("Resolved {}@{} to {}", url, rev, short(oid));
        Ok(oid)
    }

    /// Read the hook manifest at `commit`
    pub fn read_manifest(
        &self,
        url: &str,
        commit: Oid,
    ) -> Result<Vec<HookDefinition>, CatalogError> {
        let repo = self.open_or_init(url)?;
        let manifest_error = |reason: String| CatalogError::Manifest { reason };

        let tree = repo
            .find_commit(commit)
            .and_then(|commit| commit.tree())
            .map_err(|err| manifest_error(err.message().to_string()))?;

        let entry = tree.get_path(Path::new(MANIFEST_FILE)).map_err(|_| {
            manifest_error(format!("{MANIFEST_FILE} not found at {}", short(commit)))
        })?;

        let blob = entry
            .to_object(&repo)
            .and_then(|object| object.peel_to_blob())
            .map_err(|err| manifest_error(err.message().to_string()))?;

        let text = std::str::from_utf8(blob.content())
            .map_err(|_| manifest_error(format!("{MANIFEST_FILE} is not valid UTF-8")))?;

        parse_manifest(text)
    }

    fn open_or_init(&self, url: &str) -> Result<Repository, CatalogError> {
        let path = self.cache_path(url);
        let result = if path.join("HEAD").exists() {
            Repository::open_bare(&path)
        } else {
            tracing::debug!("Creating cache for {} at {}", url, path.display());
            Repository::init_bare(&path)
        };

        result.map_err(|err| CatalogError::Unresolvable {
            reason: format!("cannot open cache at {}: {}", path.display(), err.message()),
        })
    }
}

impl HookCatalog for RepoStore {
    fn advertised_hooks(
        &self,
        url: &str,
        rev: &Revision,
    ) -> Result<Vec<HookDefinition>, CatalogError> {
        let commit = self.resolve(url, rev)?;
        self.read_manifest(url, commit)
    }
}

/// Find `rev` as a tag, a fetched branch or a commit id
fn lookup(repo: &Repository, rev: &Revision) -> Option<Oid> {
    let rev = rev.as_str();
    [
        format!("refs/tags/{rev}"),
        format!("refs/remotes/origin/{rev}"),
        rev.to_string(),
    ]
    .iter()
    .find_map(|spec| {
        repo.revparse_single(spec)
            .and_then(|object| object.peel_to_commit())
            .map(|commit| commit.id())
            .ok()
    })
}

/// Stable directory name for a source URL
fn cache_key(url: &str) -> String {
    let readable: String = url
        .trim_end_matches('/')
        .trim_end_matches(".git")
        .rsplit(['/', ':', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
        .collect();

    // FNV-1a keeps names distinct for repos sharing a last path segment
    let hash = url.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    });

    format!("{readable}-{hash:016x}")
}

fn short(oid: Oid) -> String {
    oid.to_string()[..8].to_string()
}

fn unresolvable(url: &str, err: &git2::Error) -> CatalogError {
    CatalogError::Unresolvable {
        reason: format!("failed to fetch {url}: {}", err.message()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use std::fs;
    use tempfile::TempDir;

    const MANIFEST: &str = "- id: check-json\n  name: check json\n  entry: check-json\n  language: python\n- id: check-yaml\n  name: check yaml\n  entry: check-yaml\n  language: python\n";

    /// Create a hook repository with one commit tagged `v1.0.0`
    fn hooks_repo(dir: &Path, manifest: Option<&str>) -> Oid {
        let repo = Repository::init(dir).unwrap();
        let file = manifest.map_or("README.md", |_| MANIFEST_FILE);
        fs::write(dir.join(file), manifest.unwrap_or("no hooks here\n")).unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new(file)).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

        let sig = Signature::now("Test", "test@example.com").unwrap();
        let oid = repo
            .commit(Some("HEAD"), &sig, &sig, "add hooks", &tree, &[])
            .unwrap();
        let commit = repo.find_commit(oid).unwrap();
        repo.tag_lightweight("v1.0.0", commit.as_object(), false)
            .unwrap();
        oid
    }

    /// Add a commit on top of `main`, creating the branch from HEAD first
    fn commit_on_main(dir: &Path, message: &str) -> Oid {
        let repo = Repository::open(dir).unwrap();
        let head = repo.head().unwrap().peel_to_commit().unwrap();
        if repo.find_branch("main", git2::BranchType::Local).is_err() {
            repo.branch("main", &head, false).unwrap();
        }
        let parent = repo
            .find_branch("main", git2::BranchType::Local)
            .unwrap()
            .get()
            .peel_to_commit()
            .unwrap();

        let sig = Signature::now("Test", "test@example.com").unwrap();
        let tree = parent.tree().unwrap();
        repo.commit(
            Some("refs/heads/main"),
            &sig,
            &sig,
            message,
            &tree,
            &[&parent],
        )
        .unwrap()
    }

    fn rev(rev: &str) -> Revision {
        Revision::new(rev).unwrap()
    }

    #[test]
    fn test_resolve_tag_and_read_manifest() {
        let source = TempDir::new().unwrap();
        let cache = TempDir::new().unwrap();
        let expected = hooks_repo(source.path(), Some(MANIFEST));
        let url = source.path().to_str().unwrap();

        let store = RepoStore::new(cache.path());
        assert_eq!(store.resolve(url, &rev("v1.0.0")).unwrap(), expected);

        let hooks = store.advertised_hooks(url, &rev("v1.0.0")).unwrap();
        let ids: Vec<&str> = hooks.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, ["check-json", "check-yaml"]);
        assert!(store.cache_path(url).join("HEAD").exists());
    }

    #[test]
    fn test_resolve_commit_id() {
        let source = TempDir::new().unwrap();
        let cache = TempDir::new().unwrap();
        let expected = hooks_repo(source.path(), Some(MANIFEST));
        let url = source.path().to_str().unwrap();

        let store = RepoStore::new(cache.path());
        let full = expected.to_string();
        assert_eq!(store.resolve(url, &rev(&full)).unwrap(), expected);
    }

    #[test]
    fn test_unknown_tag_is_unresolvable() {
        let source = TempDir::new().unwrap();
        let cache = TempDir::new().unwrap();
        hooks_repo(source.path(), Some(MANIFEST));
        let url = source.path().to_str().unwrap();

        let err = RepoStore::new(cache.path())
            .resolve(url, &rev("v9.9.9"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::Unresolvable { .. }));
    }

    #[test]
    fn test_missing_source_is_unresolvable() {
        let cache = TempDir::new().unwrap();
        let missing = cache.path().join("nowhere");

        let err = RepoStore::new(cache.path().join("cache"))
            .resolve(missing.to_str().unwrap(), &rev("v1.0.0"))
            .unwrap_err();
        assert!(err.to_string().contains("failed to fetch"));
    }

    #[test]
    fn test_offline_uses_cache_only() {
        let source = TempDir::new().unwrap();
        let cache = TempDir::new().unwrap();
        let expected = hooks_repo(source.path(), Some(MANIFEST));
        let url = source.path().to_str().unwrap();

        let offline = RepoStore::new(cache.path()).offline(true);
        assert!(offline.resolve(url, &rev("v1.0.0")).is_err());

        RepoStore::new(cache.path()).resolve(url, &rev("v1.0.0")).unwrap();
        assert_eq!(offline.resolve(url, &rev("v1.0.0")).unwrap(), expected);
    }

    #[test]
    fn test_branch_pin_is_refetched() {
        let source = TempDir::new().unwrap();
        let cache = TempDir::new().unwrap();
        hooks_repo(source.path(), Some(MANIFEST));
        let first = commit_on_main(source.path(), "first");
        let url = source.path().to_str().unwrap();

        let store = RepoStore::new(cache.path());
        assert_eq!(store.resolve(url, &rev("main")).unwrap(), first);

        let second = commit_on_main(source.path(), "second");
        assert_ne!(first, second);
        assert_eq!(store.resolve(url, &rev("main")).unwrap(), second);

        // offline keeps whatever was fetched last
        let offline = RepoStore::new(cache.path()).offline(true);
        assert_eq!(offline.resolve(url, &rev("main")).unwrap(), second);
    }

    #[test]
    fn test_cached_tag_is_not_refetched() {
        let source = TempDir::new().unwrap();
        let cache = TempDir::new().unwrap();
        let expected = hooks_repo(source.path(), Some(MANIFEST));
        commit_on_main(source.path(), "branch");
        let url = source.path().to_str().unwrap().to_string();

        let store = RepoStore::new(cache.path());
        assert_eq!(store.resolve(&url, &rev("v1.0.0")).unwrap(), expected);

        // with the source gone any fetch would fail
        Repository::open(source.path())
            .unwrap()
            .tag_delete("v1.0.0")
            .unwrap();
        fs::remove_dir_all(source.path()).unwrap();

        assert_eq!(store.resolve(&url, &rev("v1.0.0")).unwrap(), expected);
        let err = store.resolve(&url, &rev("main")).unwrap_err();
        assert!(err.to_string().contains("failed to fetch"));
    }

    #[test]
    fn test_missing_manifest() {
        let source = TempDir::new().unwrap();
        let cache = TempDir::new().unwrap();
        hooks_repo(source.path(), None);
        let url = source.path().to_str().unwrap();

        let err = RepoStore::new(cache.path())
            .advertised_hooks(url, &rev("v1.0.0"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::Manifest { .. }));
    }

    #[test]
    fn test_cache_key() {
        let a = cache_key("https://github.com/pre-commit/pre-commit-hooks");
        let b = cache_key("https://github.com/pre-commit/pre-commit-hooks.git");
        assert!(a.starts_with("pre-commit-hooks-"));
        assert!(b.starts_with("pre-commit-hooks-"));
        assert_ne!(a, b);
        assert_eq!(a, cache_key("https://github.com/pre-commit/pre-commit-hooks"));
    }
}
