// src/application/ports/time.rs
use chrono::{DateTime, Utc};

/// Wall clock used to expire cached slug tables.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
