mod model;
mod repository;

pub use model::HistoryEntryDB;
pub use repository::HistoryRepository;
