//! 도메인 모델.

pub mod book;
pub mod user;

pub use book::{Book, BookInput, PageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use user::{NewUser, Role, User};
