pub fn validation_status_route(file_id: &str) -> String {
    format!("/api/validation/status/{}", file_id)
}

pub fn validation_result_route(file_id: &str) -> String {
    format!("/api/validation/results/{}", file_id)
}

pub fn report_download_route(report_id: &str) -> String {
    format!("/api/reports/download/{}", report_id)
}
