use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct RootDto {
    pub name: &'static str,
    pub version: &'static str,
    pub status: &'static str,
    #[serde(rename = "_links")]
    pub _links: RootLinks,
}

#[derive(Debug, Serialize)]
pub struct RootLinks {
    pub upload: &'static str,
    pub health: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StatusDto {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub version: &'static str,
    pub queue: QueueStatsDto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueStatsDto {
    pub depth: usize,
    pub capacity: usize,
    pub in_flight: usize,
    pub workers: usize,
}
