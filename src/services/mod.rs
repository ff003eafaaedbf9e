mod archive;

mod download_worker;
pub(crate) use download_worker::*;

mod notification_log;
pub(crate) use notification_log::*;
