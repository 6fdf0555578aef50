pub mod auth;
pub mod photos;
pub mod users;
pub mod words;

use serde::Deserialize;

/// `skip`/`limit` query parameters shared by the listing endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl Pagination {
    /// Resolve to a non-negative offset and a limit clamped to 1..=100.
    pub fn clamped(&self) -> (i64, i64) {
        let skip = self.skip.unwrap_or(0).max(0);
        let limit = self.limit.unwrap_or(100).clamp(1, 100);
        (skip, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults() {
        assert_eq!(Pagination::default().clamped(), (0, 100));
    }

    #[test]
    fn pagination_clamps_out_of_range_values() {
        let page = Pagination {
            skip: Some(-5),
            limit: Some(100_000),
        };
        assert_eq!(page.clamped(), (0, 100));

        let page = Pagination {
            skip: Some(20),
            limit: Some(0),
        };
        assert_eq!(page.clamped(), (20, 1));
    }
}
