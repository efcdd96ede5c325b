use std::path::Path;

use git2::{ErrorCode, ObjectType, Oid, Repository};

use crate::core::{CommitId, ParentIds, Peeled, RefEntry, RefKind};
use crate::error::{Error, Result};

use super::CommitGraphSource;

const TAG_PREFIX: &str = "refs/tags/";

/// Commit source over a real repository via libgit2.
pub struct GitSource {
    repo: Repository,
}

impl GitSource {
    /// Open a repository at `path`, or discover one from the environment.
    pub fn open(repo_path: Option<&Path>) -> Result<Self> {
        let repo = match repo_path {
            Some(path) => Repository::open(path),
            None => Repository::open_from_env(),
        }?;
        Ok(Self { repo })
    }

    fn oid(&self, id: &CommitId) -> Result<Oid> {
        Oid::from_str(id.as_str()).map_err(|e| Error::ObjectCorrupt {
            id: id.clone(),
            reason: e.to_string(),
        })
    }

    fn find_commit(&self, id: &CommitId) -> Result<git2::Commit<'_>> {
        let oid = self.oid(id)?;
        self.repo.find_commit(oid).map_err(|e| {
            if e.code() == ErrorCode::NotFound {
                Error::ObjectMissing { id: id.clone() }
            } else {
                Error::ObjectCorrupt {
                    id: id.clone(),
                    reason: e.message().to_owned(),
                }
            }
        })
    }

    /// Enumerate branch and tag references, annotated tags carrying their
    /// peeled commit id.
    pub fn refs(&self) -> Result<Vec<RefEntry>> {
        let mut refs = Vec::new();

        // Local and remote branches
        for branch in self.repo.branches(None)? {
            let (branch, _) = branch?;
            if let (Some(name), Some(target)) = (branch.name()?, branch.get().target()) {
                refs.push(RefEntry::branch(
                    name,
                    CommitId::from(target.to_string()),
                ));
            }
        }

        // Tags
        let mut raw_tags: Vec<(Oid, String)> = Vec::new();
        self.repo.tag_foreach(|oid, name| {
            if let Ok(name) = std::str::from_utf8(name) {
                let short = name.strip_prefix(TAG_PREFIX).unwrap_or(name);
                raw_tags.push((oid, short.to_owned()));
            }
            true
        })?;
        for (oid, name) in raw_tags {
            // Annotated tags point at a tag object; record its target so
            // the engine can peel without another round-trip.
            let peeled = self
                .repo
                .find_tag(oid)
                .ok()
                .map(|tag| CommitId::from(tag.target_id().to_string()));
            refs.push(RefEntry::tag(
                name,
                CommitId::from(oid.to_string()),
                peeled,
            ));
        }

        Ok(refs)
    }

    /// Commit id HEAD currently resolves to, if any.
    pub fn head(&self) -> Result<Option<CommitId>> {
        match self.repo.head() {
            Ok(head) => Ok(head.target().map(|oid| CommitId::from(oid.to_string()))),
            Err(_) => Ok(None),
        }
    }

    /// Resolve a revision spec (branch name, tag, abbreviated sha) to a
    /// commit id.
    pub fn resolve(&self, spec: &str) -> Result<CommitId> {
        let obj = self.repo.revparse_single(spec)?;
        let commit = obj.peel_to_commit()?;
        Ok(CommitId::from(commit.id().to_string()))
    }
}

impl CommitGraphSource for GitSource {
    fn parents_of(&self, id: &CommitId) -> Result<ParentIds> {
        let commit = self.find_commit(id)?;
        Ok(commit
            .parent_ids()
            .map(|oid| CommitId::from(oid.to_string()))
            .collect())
    }

    fn timestamp_of(&self, id: &CommitId) -> Result<i64> {
        Ok(self.find_commit(id)?.time().seconds())
    }

    fn peel(&self, entry: &RefEntry) -> Result<Peeled> {
        let target = match &entry.kind {
            RefKind::Tag { peeled: Some(id) } => id,
            _ => &entry.target,
        };
        let oid = self.oid(target)?;
        let obj = self.repo.find_object(oid, None).map_err(|e| {
            if e.code() == ErrorCode::NotFound {
                Error::ObjectMissing {
                    id: target.clone(),
                }
            } else {
                Error::Git(e)
            }
        })?;
        match obj.peel(ObjectType::Commit) {
            Ok(commit) => Ok(Peeled::Commit(CommitId::from(commit.id().to_string()))),
            Err(_) => Ok(Peeled::NotACommit),
        }
    }
}
