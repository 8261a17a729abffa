//! Repositories for database operations

pub mod comment;
pub mod review;
pub mod taxonomy;
pub mod title;
pub mod user;

pub use comment::CommentRepository;
pub use review::ReviewRepository;
pub use taxonomy::TaxonomyRepository;
pub use title::{TitleRecord, TitleRepository, TitleUpdate};
pub use user::UserRepository;
