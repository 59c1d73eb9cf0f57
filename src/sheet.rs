use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::row::Row;

/// What the Apps Script said about a write.
///
/// The script answers a successful `doPost` with a redirect, so a 302 is all
/// the evidence there is. `Inferred` cannot tell a stored row from one the
/// script silently dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    Confirmed,
    Inferred { status: u16 },
    Rejected { status: u16, body: String },
}

#[derive(Debug, Deserialize)]
struct ReadEnvelope {
    result: String,
    data: Option<Vec<Row>>,
    error: Option<String>,
}

/// Client for the spreadsheet-backed web app.
#[derive(Debug, Clone)]
pub struct SheetClient {
    http: reqwest::Client,
    url: Option<String>,
}

impl SheetClient {
    pub fn new(url: Option<String>) -> Self {
        SheetClient {
            http: reqwest::Client::new(),
            url,
        }
    }

    /// POST `payload` as JSON. Fails before any network call when no URL is configured.
    pub async fn append<T: Serialize + ?Sized>(
        &self,
        payload: &T,
    ) -> Result<WriteOutcome, AppError> {
        let url = self.url.as_deref().ok_or(AppError::MissingSheetUrl)?;

        let response = self.http.post(url).json(payload).send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(WriteOutcome::Confirmed);
        }
        if status == StatusCode::FOUND {
            log::info!("Sheet answered {status}, assuming the row was appended");
            return Ok(WriteOutcome::Inferred {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        log::warn!("Sheet rejected write with {status}: {body}");

        Ok(WriteOutcome::Rejected {
            status: status.as_u16(),
            body,
        })
    }

    /// Fetch every row, surfacing the reason on failure.
    pub async fn try_fetch_rows(&self) -> Result<Vec<Row>, AppError> {
        let url = self.url.as_deref().ok_or(AppError::MissingSheetUrl)?;

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::RemoteStatus(status.to_string()));
        }

        let body = response.text().await?;
        let envelope: ReadEnvelope = serde_json::from_str(&body)?;

        if envelope.result != "success" {
            return Err(AppError::RemoteError(envelope.error.unwrap_or_default()));
        }

        Ok(envelope.data.unwrap_or_default())
    }

    /// Fetch every row. Any failure is logged and yields an empty table.
    pub async fn fetch_rows(&self) -> Vec<Row> {
        match self.try_fetch_rows().await {
            Ok(rows) => {
                log::debug!("Fetched {} rows from sheet", rows.len());
                rows
            }
            Err(e) => {
                log::error!("Error fetching data: {e}");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::SubmissionPayload;
    use mockito::Matcher;
    use serde_json::json;
    use std::io::Write;

    fn payload() -> SubmissionPayload {
        SubmissionPayload {
            full_name: "Ravi".to_string(),
            phone_number: "9876543210".to_string(),
            constituency: "12".to_string(),
            party_role: "Member".to_string(),
        }
    }

    #[tokio::test]
    async fn append_posts_json_and_confirms_on_ok() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/exec")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "fullName": "Ravi",
                "phoneNumber": "9876543210",
                "constituency": "12",
                "partyRole": "Member",
            })))
            .with_status(200)
            .with_body(r#"{"result":"success"}"#)
            .create_async()
            .await;

        let client = SheetClient::new(Some(format!("{}/exec", server.url())));
        let outcome = client.append(&payload()).await.unwrap();

        assert_eq!(outcome, WriteOutcome::Confirmed);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn append_treats_bare_redirect_as_inferred() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/exec")
            .with_status(302)
            .create_async()
            .await;

        let client = SheetClient::new(Some(format!("{}/exec", server.url())));
        let outcome = client.append(&payload()).await.unwrap();

        assert_eq!(outcome, WriteOutcome::Inferred { status: 302 });
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn append_reports_rejection_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/exec")
            .with_status(403)
            .with_body("Script access denied")
            .create_async()
            .await;

        let client = SheetClient::new(Some(format!("{}/exec", server.url())));
        let outcome = client.append(&payload()).await.unwrap();

        assert_eq!(
            outcome,
            WriteOutcome::Rejected {
                status: 403,
                body: "Script access denied".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn append_surfaces_aborted_rejection_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/exec")
            .with_status(500)
            .with_chunked_body(|w| {
                w.write_all(b"Exception: ")?;
                Err(std::io::Error::other("connection dropped"))
            })
            .create_async()
            .await;

        let client = SheetClient::new(Some(format!("{}/exec", server.url())));
        let err = client.append(&payload()).await.unwrap_err();

        assert!(matches!(err, AppError::Transport(_)));
    }

    #[tokio::test]
    async fn append_without_url_fails_before_network() {
        let client = SheetClient::new(None);
        let err = client.append(&payload()).await.unwrap_err();

        assert!(matches!(err, AppError::MissingSheetUrl));
    }

    #[tokio::test]
    async fn fetch_rows_unwraps_success_envelope() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/exec")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"result":"success","data":[
                    {"Timestamp":"2024-01-01T10:00:00Z","FullName":"Ravi","PhoneNumber":9876543210},
                    {"Timestamp":"2024-01-02T09:30:00Z","FullName":"Meena","PhoneNumber":"9123456780"}
                ]}"#,
            )
            .create_async()
            .await;

        let client = SheetClient::new(Some(format!("{}/exec", server.url())));
        let rows = client.fetch_rows().await;

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("PhoneNumber"), Some("9876543210"));
        assert_eq!(rows[1].get("FullName"), Some("Meena"));
    }

    #[tokio::test]
    async fn fetch_rows_is_empty_on_error_envelope() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/exec")
            .with_status(200)
            .with_body(r#"{"result":"error","error":"Sheet not found"}"#)
            .create_async()
            .await;

        let client = SheetClient::new(Some(format!("{}/exec", server.url())));

        let err = client.try_fetch_rows().await.unwrap_err();
        assert_eq!(err.to_string(), "API returned an error: Sheet not found");
        assert!(client.fetch_rows().await.is_empty());
    }

    #[tokio::test]
    async fn fetch_rows_is_empty_on_bad_status_or_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/broken")
            .with_status(500)
            .create_async()
            .await;
        let _mock = server
            .mock("GET", "/html")
            .with_status(200)
            .with_body("<html>Sign in</html>")
            .create_async()
            .await;

        let broken = SheetClient::new(Some(format!("{}/broken", server.url())));
        assert!(matches!(
            broken.try_fetch_rows().await,
            Err(AppError::RemoteStatus(_))
        ));
        assert!(broken.fetch_rows().await.is_empty());

        let html = SheetClient::new(Some(format!("{}/html", server.url())));
        assert!(matches!(
            html.try_fetch_rows().await,
            Err(AppError::MalformedPayload(_))
        ));
        assert!(html.fetch_rows().await.is_empty());
    }

    #[tokio::test]
    async fn fetch_rows_without_url_is_empty() {
        assert!(SheetClient::new(None).fetch_rows().await.is_empty());
    }
}
