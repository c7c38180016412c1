use std::{fs, num::NonZeroU32, path::Path};

use anyhow::Context;

use crate::{
    progress::IndicatifProgress,
    types::{CloneError, CloneRequest, CloneResult, GitRef},
};

/// The only seam between the CLI and the version-control client.
#[cfg_attr(test, mockall::automock)]
pub trait Cloner {
    /// Clones exactly `request.reference` into `request.directory` and
    /// returns the commit HEAD points to afterwards.
    fn clone_single_ref(&self, request: &CloneRequest) -> Result<CloneResult, CloneError>;
}

pub struct GixCloner {
    show_progress: bool,
}

impl GixCloner {
    pub fn new(show_progress: bool) -> Self {
        Self { show_progress }
    }

    fn fetch_and_checkout<P>(
        request: &CloneRequest,
        fetch_progress: P,
        checkout_progress: P,
    ) -> anyhow::Result<gix::Repository>
    where
        P: gix::NestedProgress,
        P::SubProgress: gix::NestedProgress + 'static,
    {
        let url = gix::url::parse(request.url.as_str().into())
            .with_context(|| format!("invalid repository URL '{}'", request.url))?;

        let ref_name = request.reference.full_name();
        let refspec = request.reference.fetch_refspec();

        log::debug!("Clone URL: {}", url.to_bstring());
        log::debug!("Ref: {}", &ref_name);
        log::debug!("Refspec: {}", &refspec);

        let mut clone = gix::prepare_clone(url, &request.directory)?
            .with_ref_name(Some(ref_name.as_str()))?
            .configure_remote(move |mut remote| {
                remote.replace_refspecs(Some(refspec.as_str()), gix::remote::Direction::Fetch)?;
                Ok(remote)
            });

        if let Some(depth) = NonZeroU32::new(request.depth) {
            log::debug!("Shallow depth: {}", depth);
            clone = clone.with_shallow(gix::remote::fetch::Shallow::DepthAtRemote(depth));
        }

        let (mut checkout, _) =
            clone.fetch_then_checkout(fetch_progress, &gix::interrupt::IS_INTERRUPTED)?;

        log::debug!("Fetched {}, checking out", &ref_name);

        if let GitRef::Tag(_) = request.reference {
            Self::detach_head(checkout.repo())?;
        }

        let (repo, _) =
            checkout.main_worktree(checkout_progress, &gix::interrupt::IS_INTERRUPTED)?;

        Ok(repo)
    }

    /// Points HEAD at the tagged commit itself, so commits made in the clone leave the tag alone.
    fn detach_head(repo: &gix::Repository) -> anyhow::Result<()> {
        let commit = repo.head_id().context("cannot resolve tag")?.detach();
        repo.reference(
            "HEAD",
            commit,
            gix::refs::transaction::PreviousValue::Any,
            "clone: detach HEAD at tag",
        )
        .context("cannot detach HEAD")?;

        log::debug!("Detached HEAD at {}", commit);
        Ok(())
    }

    /// gix removes the whole target on a failed fetch, including a directory
    /// the user created beforehand. Put that one back, empty.
    fn restore_directory(directory: &Path) {
        if directory.exists() {
            return;
        }
        match fs::create_dir_all(directory) {
            Ok(()) => log::debug!("Restored {}", directory.display()),
            Err(e) => log::debug!("Could not restore {}: {}", directory.display(), e),
        }
    }

    fn head_commit(repo: &gix::Repository) -> anyhow::Result<String> {
        let head = repo.head_id().context("cannot resolve HEAD")?.detach();
        let commit = repo
            .find_commit(head)
            .with_context(|| format!("cannot load commit {}", head))?;

        log::debug!("Checked out HEAD: {}", commit.id);
        Ok(commit.id.to_string())
    }
}

impl Cloner for GixCloner {
    fn clone_single_ref(&self, request: &CloneRequest) -> Result<CloneResult, CloneError> {
        let existed = request.directory.is_dir();

        let fetched = if self.show_progress {
            Self::fetch_and_checkout(request, IndicatifProgress::new(), IndicatifProgress::new())
        } else {
            Self::fetch_and_checkout(request, gix::progress::Discard, gix::progress::Discard)
        };

        let repo = match fetched {
            Ok(repo) => repo,
            Err(e) => {
                if existed {
                    Self::restore_directory(&request.directory);
                }
                return Err(CloneError::Clone(e));
            }
        };

        let commit_id = Self::head_commit(&repo).map_err(CloneError::Read)?;

        Ok(CloneResult { commit_id })
    }
}
