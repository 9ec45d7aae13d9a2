//! The emulated HTTP surface as a closed enum.
//!
//! Keeping the surface enumerable lets startup registration be exhaustive:
//! a new route variant fails to compile until a handler exists for it.

use crate::method::Method;

/// Every route the bridge serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// `GET /health`
    Health,
    /// `GET /api/workspace/info`
    WorkspaceInfo,
    /// `POST /api/fs/read`
    FsRead,
    /// `POST /api/fs/write`
    FsWrite,
    /// `POST /api/fs/list`
    FsList,
    /// `POST /api/fs/create-dir`
    FsCreateDir,
    /// `POST /api/fs/delete`
    FsDelete,
    /// `POST /api/fs/move`
    FsMove,
    /// `POST /api/fs/copy`
    FsCopy,
    /// `POST /api/exec/command`
    ExecCommand,
}

impl Route {
    /// All routes, for exhaustive registration at startup.
    pub const ALL: [Route; 10] = [
        Route::Health,
        Route::WorkspaceInfo,
        Route::FsRead,
        Route::FsWrite,
        Route::FsList,
        Route::FsCreateDir,
        Route::FsDelete,
        Route::FsMove,
        Route::FsCopy,
        Route::ExecCommand,
    ];

    #[must_use]
    pub fn method(&self) -> Method {
        match self {
            Self::Health | Self::WorkspaceInfo => Method::Get,
            _ => Method::Post,
        }
    }

    #[must_use]
    pub fn path(&self) -> &'static str {
        match self {
            Self::Health => "/health",
            Self::WorkspaceInfo => "/api/workspace/info",
            Self::FsRead => "/api/fs/read",
            Self::FsWrite => "/api/fs/write",
            Self::FsList => "/api/fs/list",
            Self::FsCreateDir => "/api/fs/create-dir",
            Self::FsDelete => "/api/fs/delete",
            Self::FsMove => "/api/fs/move",
            Self::FsCopy => "/api/fs/copy",
            Self::ExecCommand => "/api/exec/command",
        }
    }

    /// Exact-match lookup; no pattern or prefix matching.
    #[must_use]
    pub fn resolve(method: Method, path: &str) -> Option<Route> {
        Self::ALL
            .into_iter()
            .find(|r| r.method() == method && r.path() == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_routes() {
        assert_eq!(Route::resolve(Method::Get, "/health"), Some(Route::Health));
        assert_eq!(
            Route::resolve(Method::Post, "/api/fs/create-dir"),
            Some(Route::FsCreateDir)
        );
    }

    #[test]
    fn test_resolve_is_exact_match() {
        assert_eq!(Route::resolve(Method::Post, "/health"), None);
        assert_eq!(Route::resolve(Method::Get, "/health/"), None);
        assert_eq!(Route::resolve(Method::Get, "/api/fs/read"), None);
    }

    #[test]
    fn test_all_pairs_unique() {
        for (i, a) in Route::ALL.iter().enumerate() {
            for b in &Route::ALL[i + 1..] {
                assert!(
                    a.method() != b.method() || a.path() != b.path(),
                    "duplicate route pair: {:?} and {:?}",
                    a,
                    b
                );
            }
        }
    }
}
