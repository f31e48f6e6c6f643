//! Page operations against the Confluence pages API.

use serde::Deserialize;
use tracing::{debug, info};

use super::PageClient;
use crate::error::ConfluenceError;
use crate::store::ContentStore;
use crate::types::{ContentRecord, CreatePageRequest, FetchResult, UpdatePageRequest};

/// Creation response envelope. Only the id is trusted; the store may
/// normalize or add fields that are only visible on a read.
#[derive(Debug, Deserialize)]
struct CreatedPage {
    id: i64,
}

impl ContentStore for PageClient {
    fn fetch(&self, id: i64) -> Result<FetchResult, ConfluenceError> {
        let url = format!("{}/{id}?body-format=storage", self.pages_url());

        debug!("Fetching page {}", id);

        let response = self
            .agent
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .call()?;

        let status = response.status().as_u16();
        if status != 200 {
            debug!("Fetch of page {} returned status {}", id, status);
            return Ok(FetchResult {
                status,
                record: None,
            });
        }

        let record: ContentRecord = response.into_body().read_json()?;
        Ok(FetchResult {
            status,
            record: Some(record),
        })
    }

    fn create(&self, request: &CreatePageRequest) -> Result<i64, ConfluenceError> {
        info!(
            "Creating page '{}' under parent {}",
            request.title, request.parent_id
        );

        let response = self
            .agent
            .post(&self.pages_url())
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .send_json(request)?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status != 200 {
            return Err(ConfluenceError::CreateRejected {
                status,
                body: error_body(&mut body),
            });
        }

        let created: CreatedPage = body.read_json()?;
        Ok(created.id)
    }

    fn update(&self, id: i64, request: &UpdatePageRequest) -> Result<(), ConfluenceError> {
        let url = format!("{}/{id}", self.pages_url());

        info!("Updating page {} to version {}", id, request.version.number);

        let response = self
            .agent
            .put(&url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .send_json(request)?;

        let status = response.status().as_u16();
        if status != 200 {
            let mut body = response.into_body();
            return Err(ConfluenceError::UpdateRejected {
                id,
                status,
                body: error_body(&mut body),
            });
        }

        Ok(())
    }

    fn delete(&self, id: i64) -> Result<(), ConfluenceError> {
        let url = format!("{}/{id}", self.pages_url());

        info!("Deleting page {}", id);

        let response = self
            .agent
            .delete(&url)
            .header("Authorization", &self.auth_header)
            .call()?;

        let status = response.status().as_u16();
        if status != 200 {
            let mut body = response.into_body();
            return Err(ConfluenceError::DeleteRejected {
                id,
                status,
                body: error_body(&mut body),
            });
        }

        Ok(())
    }

    fn delete_oldest_version(&self, id: i64) -> Result<u16, ConfluenceError> {
        let url = self.version_url(id);

        debug!("Deleting oldest version of page {}", id);

        let response = self
            .agent
            .delete(&url)
            .header("Authorization", &self.auth_header)
            .call()?;

        Ok(response.status().as_u16())
    }
}

/// Read an error response body for diagnostics.
fn error_body(body: &mut ureq::Body) -> String {
    body.read_to_string()
        .unwrap_or_else(|_| "(unable to read error body)".to_owned())
}
