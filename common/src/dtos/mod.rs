mod jobs;
pub use jobs::*;

mod root;
pub use root::*;

mod upload;
pub use upload::*;

use crate::{models::{JobModel, JobStatus}, util::routes::{validation_result_route, validation_status_route}};

pub trait GetSelfRoute {
    fn get_self_route(&self) -> String;
}

impl GetSelfRoute for JobModel {
    fn get_self_route(&self) -> String {
        validation_status_route(&self.id)
    }
}

impl JobModel {
    pub fn to_dto(&self) -> JobDto {
        JobDto {
            id: self.id.clone(),
            status: self.status,
            extension: self.kind.extension(),
            message: self.message.clone(),
            created: self.created,
            finished: self.finished,
            _links: JobLinks {
                _self: self.get_self_route(),
                result: (self.status == JobStatus::Completed).then(|| validation_result_route(&self.id)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileKind;

    #[test]
    fn result_link_only_for_completed_jobs() {
        let mut job = JobModel::new("abc123".to_string(), FileKind::Csv);
        let dto = job.to_dto();
        assert_eq!(dto._links._self, "/api/validation/status/abc123");
        assert!(dto._links.result.is_none());

        job.status = JobStatus::Completed;
        let dto = job.to_dto();
        assert_eq!(dto._links.result.as_deref(), Some("/api/validation/results/abc123"));
    }

    #[test]
    fn dto_serializes_status_as_snake_case_token() {
        let mut job = JobModel::new("abc123".to_string(), FileKind::Pdf);
        job.status = JobStatus::Failed;
        job.message = Some("no text".to_string());

        let value = serde_json::to_value(job.to_dto()).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["extension"], ".pdf");
        assert_eq!(value["message"], "no text");
        assert!(value["_links"].get("result").is_none());
    }
}
