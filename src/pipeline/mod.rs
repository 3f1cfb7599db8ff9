pub mod discovery;
pub mod executor;
pub mod run;
pub mod scheduler;
pub mod summary;
