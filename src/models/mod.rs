pub mod comments;
pub mod portfolio;
pub mod users;

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PaginationQuery {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }

    /// Number of records to skip for the current page.
    pub fn offset(&self) -> u64 {
        (self.page() - 1) * self.limit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page_of_twenty() {
        let q = PaginationQuery::default();
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), 20);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn clamps_out_of_range_values() {
        let q = PaginationQuery {
            page: Some(0),
            limit: Some(500),
        };
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), 100);

        let q = PaginationQuery {
            page: Some(3),
            limit: Some(0),
        };
        assert_eq!(q.limit(), 1);
        assert_eq!(q.offset(), 2);
    }
}
