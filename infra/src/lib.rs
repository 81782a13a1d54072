pub mod documents;
pub mod ids;
pub mod persistence;
