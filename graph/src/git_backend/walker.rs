use crate::core::{Commit, CommitDetails};
use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use git2::{Repository, Sort};
use tracing::{debug, info};

/// Reads commits out of a git repository in log order
pub struct GitWalker {
    repo: Repository,
}

/// A branch or tag pointing at a commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefLabel {
    pub name: String,
    pub target: String,
}

impl GitWalker {
    pub fn open(repo_path: Option<&str>) -> Result<Self> {
        let repo = match repo_path {
            Some(path) => Repository::open(path),
            None => Repository::open_from_env(),
        }
        .context("Failed to open repository")?;

        info!(path = %repo.path().display(), "opened repository");
        Ok(Self { repo })
    }

    /// Commits reachable from HEAD and every local branch, children before
    /// parents, newest first among unrelated lines
    pub fn commits(&self, limit: Option<usize>) -> Result<Vec<Commit>> {
        let mut revwalk = self.repo.revwalk()?;

        if self.repo.head().is_ok() {
            revwalk.push_head()?;
        }
        for branch in self.repo.branches(Some(git2::BranchType::Local))? {
            let (branch, _) = branch?;
            if let Some(target) = branch.get().target() {
                revwalk.push(target)?;
            }
        }
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;

        let mut commits = Vec::new();
        for oid in revwalk {
            if limit.is_some_and(|limit| commits.len() >= limit) {
                break;
            }
            let commit = self.repo.find_commit(oid?)?;
            commits.push(to_commit(&commit)?);
        }

        debug!(count = commits.len(), ?limit, "walked commits");
        Ok(commits)
    }

    /// Local branches and tags
    pub fn refs(&self) -> Result<Vec<RefLabel>> {
        let mut refs = Vec::new();

        for branch in self.repo.branches(Some(git2::BranchType::Local))? {
            let (branch, _) = branch?;
            if let (Some(name), Some(target)) = (branch.name()?, branch.get().target()) {
                refs.push(RefLabel {
                    name: name.to_string(),
                    target: target.to_string(),
                });
            }
        }

        let mut tags = Vec::new();
        self.repo.tag_foreach(|oid, name| {
            if let Ok(name) = std::str::from_utf8(name) {
                tags.push((name.trim_start_matches("refs/tags/").to_string(), oid));
            }
            true
        })?;
        for (name, oid) in tags {
            // annotated tags point at a tag object, not the commit
            let target = self
                .repo
                .find_object(oid, None)
                .and_then(|object| object.peel_to_commit())
                .map(|commit| commit.id())
                .unwrap_or(oid);
            refs.push(RefLabel {
                name,
                target: target.to_string(),
            });
        }

        Ok(refs)
    }

    /// Commit HEAD points at, if any
    pub fn head(&self) -> Option<String> {
        self.repo
            .head()
            .ok()
            .and_then(|head| head.target())
            .map(|oid| oid.to_string())
    }
}

fn to_commit(commit: &git2::Commit) -> Result<Commit> {
    let id = commit.id().to_string();
    let parents = commit.parent_ids().map(|oid| oid.to_string()).collect();

    let timestamp = Utc
        .timestamp_opt(commit.time().seconds(), 0)
        .single()
        .with_context(|| format!("Invalid timestamp on commit {}", id))?;

    let details = CommitDetails {
        author: commit.author().name().unwrap_or("Unknown").to_string(),
        summary: commit.summary().unwrap_or("").to_string(),
        timestamp,
    };
    Ok(Commit::new(id, parents).with_details(details))
}
