mod album_cache;
mod catalog;
mod job_runner;
mod notifier;

pub(crate) use catalog::*;
