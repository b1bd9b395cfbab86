//! 인메모리 저장소 (테스트 전용).
//!
//! PostgreSQL 구현과 같은 규칙을 따릅니다: 활성 레코드 간 username/email 유일,
//! 소프트 삭제된 레코드는 조회에서 제외, ID 순 정렬.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use bookshelf_core::{Book, BookInput, NewUser, Role, User};

use super::{BookStore, StoreError, StoreResult, UserStore};

struct Table<T> {
    next_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// 인메모리 사용자 저장소
#[derive(Default)]
pub struct MemoryUserStore {
    table: RwLock<Table<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn active(user: &User) -> bool {
        user.deleted_at.is_none()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let mut table = self.table.write().await;

        for existing in table.rows.values().filter(|u| Self::active(u)) {
            if existing.username == user.username {
                return Err(StoreError::Conflict("users_username_key".to_string()));
            }
            if existing.email == user.email {
                return Err(StoreError::Conflict("users_email_key".to_string()));
            }
        }

        let id = table.allocate_id();
        let now = Utc::now();
        let record = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        table.rows.insert(id, record.clone());

        Ok(record)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).filter(|u| Self::active(u)).cloned())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .find(|u| Self::active(u) && u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .find(|u| Self::active(u) && u.email == email)
            .cloned())
    }

    async fn exists_by_username(&self, username: &str) -> StoreResult<bool> {
        Ok(self.find_by_username(username).await?.is_some())
    }

    async fn exists_by_email(&self, email: &str) -> StoreResult<bool> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|u| Self::active(u))
            .cloned()
            .collect())
    }

    async fn update_role(&self, id: i64, role: Role) -> StoreResult<bool> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&id).filter(|u| Self::active(u)) {
            Some(user) => {
                user.role = role;
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> StoreResult<bool> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&id).filter(|u| Self::active(u)) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// 인메모리 도서 저장소
#[derive(Default)]
pub struct MemoryBookStore {
    table: RwLock<Table<Book>>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn active_book(book: &&Book) -> bool {
    book.deleted_at.is_none()
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn create(&self, input: BookInput) -> StoreResult<Book> {
        let mut table = self.table.write().await;
        let id = table.allocate_id();
        let now = Utc::now();
        let book = Book {
            id,
            title: input.title,
            author: input.author,
            quantity: input.quantity,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        table.rows.insert(id, book.clone());

        Ok(book)
    }

    async fn list(&self) -> StoreResult<Vec<Book>> {
        let table = self.table.read().await;
        Ok(table.rows.values().filter(active_book).cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Book>> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).filter(active_book).cloned())
    }

    async fn update(&self, id: i64, input: BookInput) -> StoreResult<Option<Book>> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&id).filter(|b| b.deleted_at.is_none()) {
            Some(book) => {
                book.title = input.title;
                book.author = input.author;
                book.quantity = input.quantity;
                book.updated_at = Utc::now();
                Ok(Some(book.clone()))
            }
            None => Ok(None),
        }
    }

    async fn update_quantity(&self, id: i64, quantity: i32) -> StoreResult<bool> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&id).filter(|b| b.deleted_at.is_none()) {
            Some(book) => {
                book.quantity = quantity;
                book.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn soft_delete(&self, id: i64) -> StoreResult<bool> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&id).filter(|b| b.deleted_at.is_none()) {
            Some(book) => {
                book.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn search(&self, query: &str) -> StoreResult<Vec<Book>> {
        let needle = query.to_lowercase();
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(active_book)
            .filter(|b| {
                b.title.to_lowercase().contains(&needle)
                    || b.author.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    async fn paginate(&self, offset: i64, limit: i64) -> StoreResult<(Vec<Book>, i64)> {
        let table = self.table.read().await;
        let active: Vec<&Book> = table.rows.values().filter(active_book).collect();
        let total = active.len() as i64;
        let page = active
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect();

        Ok((page, total))
    }
}
