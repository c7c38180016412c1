use std::{fmt, path::PathBuf};

use crate::constants;

#[derive(Debug, thiserror::Error)]
pub enum CloneError {
    #[error("{0} must be provided")]
    MissingInput(&'static str),
    #[error("either branch or tag must be provided")]
    Configuration,
    #[error("{0:#}")]
    Clone(anyhow::Error),
    #[error("failed to read checked out commit: {0:#}")]
    Read(anyhow::Error),
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GitRef {
    Branch(String),
    Tag(String),
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl GitRef {
    /// Picks the ref to check out. A branch takes precedence over a tag when both are given.
    pub fn resolve(branch: Option<&str>, tag: Option<&str>) -> Result<Self, CloneError> {
        match (non_empty(branch), non_empty(tag)) {
            (Some(branch), _) => Ok(GitRef::Branch(branch.to_string())),
            (None, Some(tag)) => Ok(GitRef::Tag(tag.to_string())),
            (None, None) => Err(CloneError::Configuration),
        }
    }

    pub fn full_name(&self) -> String {
        match self {
            GitRef::Branch(name) => format!("{}{}", constants::BRANCH_PREFIX, name),
            GitRef::Tag(name) => format!("{}{}", constants::TAG_PREFIX, name),
        }
    }

    /// Refspec limiting the fetch to this ref only, mapped the way `git clone --single-branch` does.
    pub fn fetch_refspec(&self) -> String {
        match self {
            GitRef::Branch(name) => format!(
                "+{}{}:refs/remotes/{}/{}",
                constants::BRANCH_PREFIX,
                name,
                constants::DEFAULT_REMOTE,
                name
            ),
            GitRef::Tag(_) => {
                let full_name = self.full_name();
                format!("+{}:{}", full_name, full_name)
            }
        }
    }
}

impl fmt::Display for GitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GitRef::Branch(name) => write!(f, "Branch: {}", name),
            GitRef::Tag(name) => write!(f, "Tag: {}", name),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CloneRequest {
    pub url: String,
    pub directory: PathBuf,
    pub repo_name: String,
    pub reference: GitRef,
    pub depth: u32,
}

impl CloneRequest {
    /// Required inputs are checked before the ref, so a missing url/dir/name
    /// is reported ahead of a missing branch or tag.
    pub fn new(
        url: Option<&str>,
        directory: Option<&str>,
        repo_name: Option<&str>,
        branch: Option<&str>,
        tag: Option<&str>,
    ) -> Result<Self, CloneError> {
        let url = non_empty(url).ok_or(CloneError::MissingInput("url"))?;
        let directory = non_empty(directory).ok_or(CloneError::MissingInput("dir"))?;
        let repo_name = non_empty(repo_name).ok_or(CloneError::MissingInput("name"))?;
        let reference = GitRef::resolve(branch, tag)?;

        Ok(Self {
            url: url.to_string(),
            directory: PathBuf::from(shellexpand::tilde(directory).into_owned()),
            repo_name: repo_name.to_string(),
            reference,
            depth: constants::DEFAULT_DEPTH,
        })
    }

    pub fn with_depth(self, depth: u32) -> Self {
        Self { depth, ..self }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CloneResult {
    pub commit_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_resolves_to_heads_ref() {
        let r = GitRef::resolve(Some("main"), None).unwrap();
        assert_eq!(r, GitRef::Branch("main".into()));
        assert_eq!(r.full_name(), "refs/heads/main");
        assert_eq!(r.to_string(), "Branch: main");
    }

    #[test]
    fn tag_resolves_to_tags_ref() {
        let r = GitRef::resolve(None, Some("v1.2.0")).unwrap();
        assert_eq!(r, GitRef::Tag("v1.2.0".into()));
        assert_eq!(r.full_name(), "refs/tags/v1.2.0");
        assert_eq!(r.to_string(), "Tag: v1.2.0");
    }

    #[test]
    fn branch_wins_when_both_are_set() {
        let r = GitRef::resolve(Some("develop"), Some("v1.0")).unwrap();
        assert_eq!(r, GitRef::Branch("develop".into()));
    }

    #[test]
    fn empty_branch_falls_back_to_tag() {
        let r = GitRef::resolve(Some(""), Some("v1.0")).unwrap();
        assert_eq!(r, GitRef::Tag("v1.0".into()));
    }

    #[test]
    fn neither_branch_nor_tag_is_a_configuration_error() {
        assert!(matches!(
            GitRef::resolve(None, None),
            Err(CloneError::Configuration)
        ));
        assert!(matches!(
            GitRef::resolve(Some(""), Some("")),
            Err(CloneError::Configuration)
        ));
        assert_eq!(
            CloneError::Configuration.to_string(),
            "either branch or tag must be provided"
        );
    }

    #[test]
    fn refspecs_cover_a_single_ref() {
        assert_eq!(
            GitRef::Branch("main".into()).fetch_refspec(),
            "+refs/heads/main:refs/remotes/origin/main"
        );
        assert_eq!(
            GitRef::Tag("v1".into()).fetch_refspec(),
            "+refs/tags/v1:refs/tags/v1"
        );
    }

    #[test]
    fn request_requires_url_dir_and_name() {
        let missing = |url, dir, name| {
            match CloneRequest::new(url, dir, name, Some("main"), None) {
                Err(CloneError::MissingInput(flag)) => flag,
                other => panic!("expected missing input, got {:?}", other),
            }
        };

        assert_eq!(missing(None, Some("d"), Some("n")), "url");
        assert_eq!(missing(Some(""), Some("d"), Some("n")), "url");
        assert_eq!(missing(Some("u"), None, Some("n")), "dir");
        assert_eq!(missing(Some("u"), Some("d"), Some("")), "name");
    }

    #[test]
    fn missing_input_is_reported_before_missing_ref() {
        assert!(matches!(
            CloneRequest::new(None, Some("d"), Some("n"), None, None),
            Err(CloneError::MissingInput("url"))
        ));
    }

    #[test]
    fn request_defaults_to_shallow_depth() {
        let req = CloneRequest::new(
            Some("https://example.com/demo.git"),
            Some("/tmp/demo"),
            Some("demo"),
            None,
            Some("v1"),
        )
        .unwrap();

        assert_eq!(req.depth, 1);
        assert_eq!(req.directory, PathBuf::from("/tmp/demo"));
        assert_eq!(req.reference, GitRef::Tag("v1".into()));
        assert_eq!(req.with_depth(0).depth, 0);
    }

    #[test]
    fn request_expands_home_in_directory() {
        let req = CloneRequest::new(Some("u"), Some("~/demo"), Some("n"), Some("main"), None).unwrap();
        assert!(!req.directory.starts_with("~"));
        assert!(req.directory.ends_with("demo"));
    }
}
