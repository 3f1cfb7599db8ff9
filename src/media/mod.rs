pub mod index;
pub mod matcher;
pub mod metadata;
pub mod scanner;
