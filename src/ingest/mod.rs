pub mod mapper;
pub mod service;

pub use mapper::{map_artist, map_master, map_release};
pub use service::SearchService;
