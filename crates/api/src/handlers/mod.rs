pub mod callbacks;
pub mod jobs;
pub mod processors;
pub mod quota;
