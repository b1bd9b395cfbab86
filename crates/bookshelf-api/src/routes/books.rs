//! 도서 endpoint.
//!
//! 조회는 인증된 모든 사용자, 변경은 admin 역할만 허용합니다.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use bookshelf_core::{Book, BookInput};

use super::{parse_id, MessageResponse, ValidatedJson};
use crate::auth::{require_admin, require_auth};
use crate::error::ApiResult;
use crate::state::AppState;

// ==================== 요청/응답 타입 ====================

/// 도서 목록 쿼리.
///
/// `search`가 있으면 검색, `page`/`page_size` 중 하나라도 있으면 페이지 조회,
/// 둘 다 없으면 전체 목록. 숫자가 아닌 페이지 값은 0으로 취급되어 기본값으로 교정됩니다.
#[derive(Debug, Default, Deserialize)]
pub struct BookListQuery {
    pub search: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// 도서 생성/수정 요청
#[derive(Debug, Deserialize, Validate)]
pub struct BookRequest {
    #[validate(length(min = 1, max = 255, message = "title must be between 1 and 255 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 255, message = "author must be between 1 and 255 characters"))]
    pub author: String,
    #[serde(default)]
    #[validate(range(min = 0, message = "quantity cannot be negative"))]
    pub quantity: i32,
}

impl From<BookRequest> for BookInput {
    fn from(req: BookRequest) -> Self {
        BookInput {
            title: req.title,
            author: req.author,
            quantity: req.quantity,
        }
    }
}

/// 수량 변경 요청
#[derive(Debug, Deserialize, Validate)]
pub struct QuantityRequest {
    #[validate(range(min = 0, message = "quantity cannot be negative"))]
    pub quantity: i32,
}

/// 검색 결과 응답
#[derive(Debug, Serialize, Deserialize)]
pub struct BookListResponse {
    pub books: Vec<Book>,
    pub count: usize,
}

/// 페이지 조회 응답
#[derive(Debug, Serialize, Deserialize)]
pub struct BookPageResponse {
    pub books: Vec<Book>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

fn parse_page_value(raw: Option<&str>) -> i64 {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

// ==================== 핸들러 ====================

/// 도서 목록/검색/페이지 조회.
///
/// GET /books
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BookListQuery>,
) -> ApiResult<Response> {
    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        let books = state.books.search(search).await?;
        let count = books.len();
        return Ok(Json(BookListResponse { books, count }).into_response());
    }

    if query.page.is_some() || query.page_size.is_some() {
        let result = state
            .books
            .paginate(
                parse_page_value(query.page.as_deref()),
                parse_page_value(query.page_size.as_deref()),
            )
            .await?;
        let total_pages = result.total_pages();

        return Ok(Json(BookPageResponse {
            books: result.books,
            total: result.total,
            page: result.page.page,
            page_size: result.page.page_size,
            total_pages,
        })
        .into_response());
    }

    let books = state.books.list_all().await?;
    Ok(Json(books).into_response())
}

/// 도서 상세 조회.
///
/// GET /books/{id}
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Book>> {
    let id = parse_id(&id, "book")?;
    Ok(Json(state.books.get(id).await?))
}

/// 도서 등록.
///
/// POST /books
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<BookRequest>,
) -> ApiResult<(StatusCode, Json<Book>)> {
    let book = state.books.create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// 도서 수정.
///
/// PUT /books/{id}
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<BookRequest>,
) -> ApiResult<Json<Book>> {
    let id = parse_id(&id, "book")?;
    Ok(Json(state.books.update(id, req.into()).await?))
}

/// 도서 삭제 (소프트 삭제).
///
/// DELETE /books/{id}
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_id(&id, "book")?;
    state.books.delete(id).await?;
    Ok(Json(MessageResponse::new("Book deleted successfully")))
}

/// 도서 수량 변경.
///
/// PATCH /books/{id}/quantity
pub async fn update_quantity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<QuantityRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_id(&id, "book")?;
    state.books.update_quantity(id, req.quantity).await?;
    Ok(Json(MessageResponse::new("Book quantity updated successfully")))
}

// ==================== 라우터 ====================

/// 도서 라우터 생성.
///
/// 조회 라우트와 변경 라우트를 합친 뒤 전체에 인증 게이트를 적용합니다.
pub fn books_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let read = Router::new()
        .route("/", get(list_books))
        .route("/{id}", get(get_book));

    let write = Router::new()
        .route("/", post(create_book))
        .route("/{id}", put(update_book).delete(delete_book))
        .route("/{id}/quantity", patch(update_quantity))
        .route_layer(middleware::from_fn(require_admin));

    read.merge(write)
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}
