pub const DEFAULT_REMOTE: &'static str = "origin";
pub const DEFAULT_DEPTH: u32 = 1;
pub const BRANCH_PREFIX: &'static str = "refs/heads/";
pub const TAG_PREFIX: &'static str = "refs/tags/";
