//! GitOps repository helpers

/// Placeholder written into legacy records when no GitOps repository was set up
pub const GIT_REPO_NOT_CONFIGURED: &str = "Git Repo Not Configured";

/// Whether the repository url is effectively unset
pub fn is_git_ops_repo_not_configured(repo_url: &str) -> bool {
    let url = repo_url.trim();
    url.is_empty() || url == GIT_REPO_NOT_CONFIGURED
}

pub fn is_git_ops_repo_configured(repo_url: &str) -> bool {
    !is_git_ops_repo_not_configured(repo_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_configured_urls() {
        assert!(is_git_ops_repo_not_configured(""));
        assert!(is_git_ops_repo_not_configured("   "));
        assert!(is_git_ops_repo_not_configured(GIT_REPO_NOT_CONFIGURED));
    }

    #[test]
    fn test_configured_url() {
        assert!(is_git_ops_repo_configured("https://github.com/org/app.git"));
        assert!(!is_git_ops_repo_configured(""));
    }
}
