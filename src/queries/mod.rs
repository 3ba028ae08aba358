//! SQL text builders, one function per statement.

pub mod ddl;
pub mod drafts;
pub mod history;
pub mod metadata;
