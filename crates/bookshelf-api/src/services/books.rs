//! 도서 서비스.

use std::sync::Arc;

use tracing::{debug, info};

use bookshelf_core::{Book, BookInput, PageRequest};

use crate::repository::{BookStore, StoreError};

/// 도서 서비스 에러.
#[derive(Debug, thiserror::Error)]
pub enum BookError {
    #[error("book title is required")]
    EmptyTitle,

    #[error("book author is required")]
    EmptyAuthor,

    #[error("book quantity cannot be negative")]
    NegativeQuantity,

    #[error("book not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// 페이지 조회 결과.
#[derive(Debug, Clone)]
pub struct BookPage {
    pub books: Vec<Book>,
    /// 전체 활성 도서 수
    pub total: i64,
    /// 정규화된 페이지 요청
    pub page: PageRequest,
}

impl BookPage {
    pub fn total_pages(&self) -> i64 {
        self.page.total_pages(self.total)
    }
}

fn validate_input(input: &BookInput) -> Result<(), BookError> {
    if input.title.trim().is_empty() {
        return Err(BookError::EmptyTitle);
    }
    if input.author.trim().is_empty() {
        return Err(BookError::EmptyAuthor);
    }
    if input.quantity < 0 {
        return Err(BookError::NegativeQuantity);
    }
    Ok(())
}

/// 도서 서비스.
#[derive(Clone)]
pub struct BookService {
    books: Arc<dyn BookStore>,
}

impl BookService {
    pub fn new(books: Arc<dyn BookStore>) -> Self {
        Self { books }
    }

    pub async fn create(&self, input: BookInput) -> Result<Book, BookError> {
        validate_input(&input)?;

        let book = self.books.create(input).await?;
        info!(book_id = book.id, title = %book.title, "도서 등록");
        Ok(book)
    }

    pub async fn list_all(&self) -> Result<Vec<Book>, BookError> {
        Ok(self.books.list().await?)
    }

    pub async fn get(&self, id: i64) -> Result<Book, BookError> {
        self.books.find_by_id(id).await?.ok_or(BookError::NotFound)
    }

    /// 제목/저자/수량 전체 교체.
    pub async fn update(&self, id: i64, input: BookInput) -> Result<Book, BookError> {
        // 존재 확인을 검증보다 먼저 수행 (없는 ID는 입력과 무관하게 404)
        self.get(id).await?;
        validate_input(&input)?;

        let book = self.books.update(id, input).await?.ok_or(BookError::NotFound)?;
        info!(book_id = id, "도서 수정");
        Ok(book)
    }

    /// 소프트 삭제.
    pub async fn delete(&self, id: i64) -> Result<(), BookError> {
        if !self.books.soft_delete(id).await? {
            return Err(BookError::NotFound);
        }
        info!(book_id = id, "도서 삭제");
        Ok(())
    }

    /// 제목 또는 저자 검색. 빈 검색어는 전체 목록.
    pub async fn search(&self, query: &str) -> Result<Vec<Book>, BookError> {
        if query.is_empty() {
            return self.list_all().await;
        }
        debug!(query = %query, "도서 검색");
        Ok(self.books.search(query).await?)
    }

    /// 페이지 조회. 범위를 벗어난 값은 기본값으로 교정됩니다.
    pub async fn paginate(&self, page: i64, page_size: i64) -> Result<BookPage, BookError> {
        let page = PageRequest::new(page, page_size).normalized();
        let (books, total) = self.books.paginate(page.offset(), page.page_size).await?;

        Ok(BookPage { books, total, page })
    }

    pub async fn update_quantity(&self, id: i64, quantity: i32) -> Result<(), BookError> {
        if quantity < 0 {
            return Err(BookError::NegativeQuantity);
        }
        if !self.books.update_quantity(id, quantity).await? {
            return Err(BookError::NotFound);
        }
        info!(book_id = id, quantity, "도서 수량 변경");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryBookStore;

    fn service() -> BookService {
        BookService::new(Arc::new(MemoryBookStore::new()))
    }

    fn input(title: &str, author: &str, quantity: i32) -> BookInput {
        BookInput {
            title: title.to_string(),
            author: author.to_string(),
            quantity,
        }
    }

    #[tokio::test]
    async fn test_create_validates_input() {
        let books = service();

        assert!(matches!(
            books.create(input("  ", "Herbert", 1)).await,
            Err(BookError::EmptyTitle)
        ));
        assert!(matches!(
            books.create(input("Dune", "", 1)).await,
            Err(BookError::EmptyAuthor)
        ));
        assert!(matches!(
            books.create(input("Dune", "Herbert", -1)).await,
            Err(BookError::NegativeQuantity)
        ));

        let book = books.create(input("Dune", "Herbert", 3)).await.unwrap();
        assert_eq!(book.quantity, 3);
        assert_eq!(books.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let books = service();
        let book = books.create(input("Dune", "Herbert", 3)).await.unwrap();

        let updated = books
            .update(book.id, input("Dune Messiah", "Frank Herbert", 5))
            .await
            .unwrap();
        assert_eq!(updated.title, "Dune Messiah");
        assert_eq!(updated.quantity, 5);

        assert!(matches!(
            books.update(999, input("", "", -1)).await,
            Err(BookError::NotFound)
        ));

        books.delete(book.id).await.unwrap();
        assert!(matches!(books.get(book.id).await, Err(BookError::NotFound)));
        assert!(matches!(books.delete(book.id).await, Err(BookError::NotFound)));
    }

    #[tokio::test]
    async fn test_search_empty_query_lists_all() {
        let books = service();
        books.create(input("Dune", "Herbert", 1)).await.unwrap();
        books.create(input("Emma", "Austen", 1)).await.unwrap();

        assert_eq!(books.search("").await.unwrap().len(), 2);
        assert_eq!(books.search("herb").await.unwrap().len(), 1);
        assert!(books.search("tolkien").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_paginate_normalizes_request() {
        let books = service();
        for i in 0..15 {
            books
                .create(input(&format!("Book {i}"), "Author", 1))
                .await
                .unwrap();
        }

        let first = books.paginate(0, 0).await.unwrap();
        assert_eq!(first.page, PageRequest::new(1, 10));
        assert_eq!(first.books.len(), 10);
        assert_eq!(first.total, 15);
        assert_eq!(first.total_pages(), 2);

        let second = books.paginate(2, 500).await.unwrap();
        assert_eq!(second.page.page_size, 10);
        assert_eq!(second.books.len(), 5);
    }

    #[tokio::test]
    async fn test_update_quantity() {
        let books = service();
        let book = books.create(input("Dune", "Herbert", 1)).await.unwrap();

        books.update_quantity(book.id, 7).await.unwrap();
        assert_eq!(books.get(book.id).await.unwrap().quantity, 7);

        assert!(matches!(
            books.update_quantity(book.id, -2).await,
            Err(BookError::NegativeQuantity)
        ));
        assert!(matches!(
            books.update_quantity(999, 1).await,
            Err(BookError::NotFound)
        ));
    }
}
