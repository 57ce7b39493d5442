//! Health-record and statistics endpoints

use serde::Deserialize;

use crate::api::client::{ApiClient, ApiRequest};
use crate::api::http::read_json;
use crate::error::Result;
use crate::models::{DateRange, HealthRecord, HealthStatistics};

/// The list endpoint returns a bare array, or a page object when the server
/// has pagination enabled.
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordList {
    Plain(Vec<HealthRecord>),
    Paged { results: Vec<HealthRecord> },
}

impl From<RecordList> for Vec<HealthRecord> {
    fn from(list: RecordList) -> Self {
        match list {
            RecordList::Plain(records) | RecordList::Paged { results: records } => records,
        }
    }
}

fn with_range(mut request: ApiRequest, range: Option<&DateRange>) -> ApiRequest {
    if let Some(range) = range {
        for (key, value) in range.query_pairs() {
            request = request.query(key, value);
        }
    }
    request
}

impl ApiClient {
    /// POST /health-records/
    pub async fn create_record(&self, record: &HealthRecord) -> Result<HealthRecord> {
        let request = ApiRequest::post("/health-records/").json(record)?;
        let response = self.send(&request).await?;
        Ok(read_json(response).await?)
    }

    /// GET /health-records/ with optional `start_date`/`end_date`
    pub async fn list_records(&self, range: Option<&DateRange>) -> Result<Vec<HealthRecord>> {
        let request = with_range(ApiRequest::get("/health-records/"), range);
        let response = self.send(&request).await?;
        let list: RecordList = read_json(response).await?;
        Ok(list.into())
    }

    /// GET /health-records/:id/
    pub async fn get_record(&self, id: i64) -> Result<HealthRecord> {
        let request = ApiRequest::get(format!("/health-records/{}/", id));
        let response = self.send(&request).await?;
        Ok(read_json(response).await?)
    }

    /// PUT /health-records/:id/
    pub async fn update_record(&self, id: i64, record: &HealthRecord) -> Result<HealthRecord> {
        let request = ApiRequest::put(format!("/health-records/{}/", id)).json(record)?;
        let response = self.send(&request).await?;
        Ok(read_json(response).await?)
    }

    /// DELETE /health-records/:id/
    pub async fn delete_record(&self, id: i64) -> Result<()> {
        let request = ApiRequest::delete(format!("/health-records/{}/", id));
        self.send(&request).await?;
        Ok(())
    }

    /// GET /health-records/statistics/ with optional `start_date`/`end_date`
    pub async fn statistics(&self, range: Option<&DateRange>) -> Result<HealthStatistics> {
        let request = with_range(ApiRequest::get("/health-records/statistics/"), range);
        let response = self.send(&request).await?;
        Ok(read_json(response).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_record_list_shapes() {
        let plain: RecordList =
            serde_json::from_str(r#"[{"id": 1, "record_time": "2024-01-01T08:00:00"}]"#).unwrap();
        assert_eq!(Vec::<HealthRecord>::from(plain).len(), 1);

        let paged: RecordList = serde_json::from_str(
            r#"{"count": 2, "next": null, "results": [
                {"id": 1, "record_time": "2024-01-01T08:00:00"},
                {"id": 2, "record_time": "2024-01-02T08:00:00"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(Vec::<HealthRecord>::from(paged).len(), 2);
    }

    #[test]
    fn test_range_added_to_query() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        );
        let request = with_range(ApiRequest::get("/health-records/"), Some(&range));
        assert_eq!(
            request.query,
            vec![
                ("start_date", "2024-01-01".to_string()),
                ("end_date", "2024-01-31".to_string())
            ]
        );

        let unfiltered = with_range(ApiRequest::get("/health-records/"), None);
        assert!(unfiltered.query.is_empty());
    }
}
