use serde::Serialize;

/// Page/limit pair taken from list query strings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: i64 = 10;
    const MAX_LIMIT: i64 = 100;

    /// Builds a request, clamping page to >= 1 and limit to 1..=100
    pub fn new(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(default_limit).clamp(1, Self::MAX_LIMIT),
        }
    }

    pub fn first(limit: i64) -> Self {
        Self { page: 1, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    /// Applies this page to an already filtered and sorted list
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        items
            .iter()
            .skip(self.offset() as usize)
            .take(self.limit as usize)
            .cloned()
            .collect()
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(Self::DEFAULT_LIMIT)
    }
}

/// One page of results plus the unpaginated total
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub request: PageRequest,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self { items, total, request }
    }

    pub fn meta(&self) -> PageMeta {
        PageMeta {
            current: self.request.page,
            pages: (self.total + self.request.limit - 1) / self.request.limit,
            total: self.total,
        }
    }
}

/// Pagination block returned next to list payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub current: i64,
    pub pages: i64,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_clamping() {
        let req = PageRequest::new(None, None, 20);
        assert_eq!(req, PageRequest { page: 1, limit: 20 });

        let req = PageRequest::new(Some(0), Some(1000), 10);
        assert_eq!(req, PageRequest { page: 1, limit: 100 });
    }

    #[test]
    fn offset_follows_page() {
        let req = PageRequest::new(Some(3), Some(10), 10);
        assert_eq!(req.offset(), 20);
    }

    #[test]
    fn pages_round_up() {
        let page = Paginated::new(vec![1, 2], 21, PageRequest::new(Some(1), Some(10), 10));
        assert_eq!(page.meta(), PageMeta { current: 1, pages: 3, total: 21 });

        let empty: Paginated<i32> = Paginated::new(vec![], 0, PageRequest::default());
        assert_eq!(empty.meta().pages, 0);
    }

    #[test]
    fn slice_skips_previous_pages() {
        let data: Vec<i32> = (1..=25).collect();
        let req = PageRequest::new(Some(3), Some(10), 10);
        assert_eq!(req.slice(&data), vec![21, 22, 23, 24, 25]);
    }
}
