//! Book Repository
//!
//! 도서 관련 데이터베이스 연산을 담당합니다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use bookshelf_core::{Book, BookInput};

use super::StoreResult;

/// 도서 저장소.
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn create(&self, input: BookInput) -> StoreResult<Book>;

    /// 활성 도서 전체 (ID 순).
    async fn list(&self) -> StoreResult<Vec<Book>>;

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Book>>;

    /// 제목/저자/수량 전체 교체. 대상이 없으면 None.
    async fn update(&self, id: i64, input: BookInput) -> StoreResult<Option<Book>>;

    /// 수량만 변경. 대상이 없으면 false.
    async fn update_quantity(&self, id: i64, quantity: i32) -> StoreResult<bool>;

    /// 소프트 삭제. 대상이 없으면 false.
    async fn soft_delete(&self, id: i64) -> StoreResult<bool>;

    /// 제목 또는 저자에 부분 문자열이 포함된 도서 (대소문자 무시).
    async fn search(&self, query: &str) -> StoreResult<Vec<Book>>;

    /// 한 페이지 분량과 전체 활성 도서 수.
    async fn paginate(&self, offset: i64, limit: i64) -> StoreResult<(Vec<Book>, i64)>;
}

// ================================================================================================
// PostgreSQL
// ================================================================================================

/// books 테이블 레코드
#[derive(Debug, FromRow)]
struct BookRow {
    id: i64,
    title: String,
    author: String,
    quantity: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[sqlx(default)]
    deleted_at: Option<DateTime<Utc>>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            id: row.id,
            title: row.title,
            author: row.author,
            quantity: row.quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

/// LIKE 패턴 메타문자 이스케이프 후 `%...%`로 감쌉니다.
fn contains_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// PostgreSQL 도서 저장소
#[derive(Clone)]
pub struct PgBookStore {
    pool: PgPool,
}

impl PgBookStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn create(&self, input: BookInput) -> StoreResult<Book> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            INSERT INTO books (title, author, quantity)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&input.title)
        .bind(&input.author)
        .bind(input.quantity)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn list(&self) -> StoreResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(
            "SELECT * FROM books WHERE deleted_at IS NULL ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Book>> {
        let row = sqlx::query_as::<_, BookRow>(
            "SELECT * FROM books WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Book::from))
    }

    async fn update(&self, id: i64, input: BookInput) -> StoreResult<Option<Book>> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            UPDATE books
            SET title = $2, author = $3, quantity = $4, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.title)
        .bind(&input.author)
        .bind(input.quantity)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Book::from))
    }

    async fn update_quantity(&self, id: i64, quantity: i32) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET quantity = $2, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(quantity)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn soft_delete(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET deleted_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn search(&self, query: &str) -> StoreResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT * FROM books
            WHERE deleted_at IS NULL
              AND (title ILIKE $1 ESCAPE '\' OR author ILIKE $1 ESCAPE '\')
            ORDER BY id
            "#,
        )
        .bind(contains_pattern(query))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn paginate(&self, offset: i64, limit: i64) -> StoreResult<(Vec<Book>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE deleted_at IS NULL")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT * FROM books
            WHERE deleted_at IS NULL
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows.into_iter().map(Book::from).collect(), total))
    }
}
