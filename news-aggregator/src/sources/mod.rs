pub mod news_api;
pub mod rss_feed;

pub use news_api::NewsApiSource;
pub use rss_feed::RssFeedSource;
