pub mod defs;

pub use defs::{Article, CategorizedDigest, Category, EnrichedArticle};
