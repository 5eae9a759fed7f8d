mod repository;

pub use repository::{MongoTokenRepository, TokenCollections};
