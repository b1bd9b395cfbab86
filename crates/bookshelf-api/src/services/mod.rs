//! 비즈니스 서비스.

pub mod books;

pub use books::{BookError, BookPage, BookService};
