// Resume builder: Markdown assembly, AI rewrite of entry descriptions, and
// persistence (row per user plus a Markdown snapshot in S3 on each save).

pub mod handlers;
pub mod improve;
pub mod markdown;
pub mod prompts;
pub mod storage;
