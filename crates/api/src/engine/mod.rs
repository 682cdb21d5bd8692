//! The admission/dispatch engine: everything between "a client asked for a
//! job" and "a worker callback settled it".

pub mod admission;
pub mod dispatcher;
