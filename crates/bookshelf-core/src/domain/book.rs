//! 도서 레코드 및 페이지네이션 규칙.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 기본 페이지 크기.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// 허용되는 최대 페이지 크기.
pub const MAX_PAGE_SIZE: i64 = 100;

/// 도서 레코드.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// 도서 생성/수정 입력.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookInput {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub quantity: i32,
}

/// 페이지 요청.
///
/// 범위를 벗어난 값은 [`PageRequest::normalized`]에서 기본값으로 교정됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self { page, page_size }
    }

    /// page < 1 이면 1, page_size 가 [1, 100] 밖이면 10.
    #[must_use]
    pub fn normalized(self) -> Self {
        let page = if self.page < 1 { 1 } else { self.page };
        let page_size = if (1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            self.page_size
        } else {
            DEFAULT_PAGE_SIZE
        };
        Self { page, page_size }
    }

    /// 건너뛸 레코드 수.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// 전체 건수에 대한 페이지 수 (올림).
    pub fn total_pages(&self, total: i64) -> i64 {
        if self.page_size <= 0 {
            return 0;
        }
        (total + self.page_size - 1) / self.page_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_defaults() {
        assert_eq!(PageRequest::new(0, 0).normalized(), PageRequest::new(1, 10));
        assert_eq!(PageRequest::new(-3, 101).normalized(), PageRequest::new(1, 10));
        assert_eq!(PageRequest::new(4, 25).normalized(), PageRequest::new(4, 25));
        assert_eq!(PageRequest::new(2, 100).normalized(), PageRequest::new(2, 100));
    }

    #[test]
    fn test_offset_and_total_pages() {
        let page = PageRequest::new(3, 10);
        assert_eq!(page.offset(), 20);
        assert_eq!(page.total_pages(0), 0);
        assert_eq!(page.total_pages(10), 1);
        assert_eq!(page.total_pages(11), 2);
    }

    #[test]
    fn test_book_input_quantity_defaults_to_zero() {
        let input: BookInput =
            serde_json::from_str(r#"{"title": "Dune", "author": "Herbert"}"#).unwrap();
        assert_eq!(input.quantity, 0);
    }

    proptest! {
        #[test]
        fn normalized_page_is_always_in_range(page in any::<i64>(), size in any::<i64>()) {
            let p = PageRequest::new(page, size).normalized();
            prop_assert!(p.page >= 1);
            prop_assert!((1..=MAX_PAGE_SIZE).contains(&p.page_size));
        }
    }
}
