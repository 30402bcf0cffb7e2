pub mod manager;

pub use manager::LibraryManager;
