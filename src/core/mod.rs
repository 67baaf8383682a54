// Pure event model and dedup algorithm. Nothing in here touches the filesystem.

pub mod dedup;
pub mod fingerprint;
pub mod history;
pub mod record;
pub mod similarity;
