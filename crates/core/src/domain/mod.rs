pub mod candidate;
pub mod feed;
pub mod run;
