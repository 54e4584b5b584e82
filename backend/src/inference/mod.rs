pub mod model;
pub mod preprocess;
pub mod verdict;
