//! Response envelope shared by every endpoint.
//!
//! Success and error responses alike are `{"message": ..., "data": ...}`;
//! errors carry `data: null` and the status code says the rest.

use serde::Serialize;

use crate::db::PageRequest;

/// Standard messages for successful operations.
pub mod messages {
    pub const CREATED: &str = "Created successfully";
    pub const UPDATED: &str = "Updated successfully";
    pub const DELETED: &str = "Deleted successfully";
    pub const FOUND: &str = "Resource found";
    pub const SUCCESS: &str = "Request successful";
}

/// The `{message, data}` envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Envelope with a payload.
    #[must_use]
    pub fn new(message: &str, data: T) -> Self {
        Self {
            message: message.to_owned(),
            data: Some(data),
        }
    }
}

impl ApiResponse<serde_json::Value> {
    /// Envelope with `data: null`, for writes that return nothing.
    #[must_use]
    pub fn empty(message: &str) -> Self {
        Self {
            message: message.to_owned(),
            data: None,
        }
    }
}

/// One page of a listing.
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_items: i64,
    pub total_pages: i64,
}

impl<T> PageResponse<T> {
    /// Wrap one page of rows with the totals the repository counted.
    #[must_use]
    pub fn new(items: Vec<T>, page: &PageRequest, total_items: i64) -> Self {
        let size = i64::from(page.size());
        Self {
            items,
            page: page.page(),
            size: page.size(),
            total_items,
            total_pages: (total_items + size - 1) / size,
        }
    }

    /// Map the page's items, keeping the paging envelope.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::SortColumns;

    const COLUMNS: SortColumns = SortColumns {
        allowed: &["name"],
        default: "name",
    };

    fn page() -> PageRequest {
        PageRequest::resolve(Some(0), Some(10), None, None, COLUMNS).unwrap()
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let resp = PageResponse::new(vec![1, 2, 3], &page(), 21);
        assert_eq!(resp.total_pages, 3);

        let resp = PageResponse::new(vec![1], &page(), 20);
        assert_eq!(resp.total_pages, 2);
    }

    #[test]
    fn test_empty_listing() {
        let resp: PageResponse<i32> = PageResponse::new(vec![], &page(), 0);
        assert_eq!(resp.total_pages, 0);
        assert!(resp.items.is_empty());
    }

    #[test]
    fn test_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::new(messages::FOUND, 42)).unwrap();
        assert_eq!(body["message"], "Resource found");
        assert_eq!(body["data"], 42);

        let body = serde_json::to_value(ApiResponse::empty(messages::CREATED)).unwrap();
        assert!(body["data"].is_null());
    }
}
