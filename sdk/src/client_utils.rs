use crate::{ApiError, DuplicateJob};
use reqwest::{header::HeaderMap, Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Fields checked, in order, when extracting a message from an error body.
const MESSAGE_FIELDS: [&str; 3] = ["error", "message", "detail"];
const DEFAULT_MESSAGE: &str = "backend request failed";

#[derive(Deserialize)]
struct DuplicateEnvelope {
    #[serde(default)]
    duplicate: bool,
    existing_job: DuplicateJob,
}

/// Pull a human-readable message out of a backend error body.
/// Unparseable bodies fall back to a generic default.
pub(crate) fn extract_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for field in MESSAGE_FIELDS {
            if let Some(message) = value.get(field).and_then(|v| v.as_str()) {
                if !message.is_empty() {
                    return message.to_string();
                }
            }
        }
    }
    DEFAULT_MESSAGE.to_string()
}

async fn status_error(response: Response) -> ApiError {
    let status = response.status();
    let path = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
        StatusCode::NOT_FOUND => ApiError::NotFound(path),
        StatusCode::CONFLICT => match serde_json::from_str::<DuplicateEnvelope>(&body) {
            Ok(envelope) if envelope.duplicate => ApiError::Duplicate(envelope.existing_job),
            _ => ApiError::Backend(status, extract_message(&body)),
        },
        _ => ApiError::Backend(status, extract_message(&body)),
    }
}

/// GET a JSON resource.
pub(crate) async fn get_json<R: DeserializeOwned>(
    client: &Client,
    url: &str,
    query: &[(&'static str, String)],
    headers: HeaderMap,
) -> Result<R, ApiError> {
    let response = client
        .get(url)
        .query(query)
        .headers(headers)
        .send()
        .await?;
    if response.status().is_success() {
        Ok(response.json::<R>().await?)
    } else {
        Err(status_error(response).await)
    }
}

/// GET a raw text resource.
pub(crate) async fn get_text(
    client: &Client,
    url: &str,
    headers: HeaderMap,
) -> Result<String, ApiError> {
    let response = client.get(url).headers(headers).send().await?;
    if response.status().is_success() {
        Ok(response.text().await?)
    } else {
        Err(status_error(response).await)
    }
}

/// POST a JSON request, parse the JSON response.
pub(crate) async fn post_json<T: Serialize, R: DeserializeOwned>(
    client: &Client,
    url: &str,
    data: &T,
    headers: HeaderMap,
) -> Result<R, ApiError> {
    let response = client.post(url).headers(headers).json(data).send().await?;
    if response.status().is_success() {
        Ok(response.json::<R>().await?)
    } else {
        Err(status_error(response).await)
    }
}

/// DELETE a resource, discarding any response body.
pub(crate) async fn delete(client: &Client, url: &str, headers: HeaderMap) -> Result<(), ApiError> {
    let response = client.delete(url).headers(headers).send().await?;
    if response.status().is_success() {
        Ok(())
    } else {
        Err(status_error(response).await)
    }
}

#[cfg(test)]
mod tests {
    use super::extract_message;

    #[test]
    fn extract_message_respects_field_order() {
        assert_eq!(
            extract_message(r#"{"message":"second","error":"first"}"#),
            "first"
        );
        assert_eq!(
            extract_message(r#"{"detail":"third","message":"second"}"#),
            "second"
        );
        assert_eq!(extract_message(r#"{"detail":"third"}"#), "third");
    }

    #[test]
    fn extract_message_skips_empty_and_non_string_fields() {
        assert_eq!(
            extract_message(r#"{"error":"","message":"fallback"}"#),
            "fallback"
        );
        assert_eq!(
            extract_message(r#"{"error":42,"message":"fallback"}"#),
            "fallback"
        );
    }

    #[test]
    fn extract_message_defaults_on_unparseable_bodies() {
        assert_eq!(extract_message("<html>bad gateway</html>"), "backend request failed");
        assert_eq!(extract_message(""), "backend request failed");
        assert_eq!(extract_message(r#"{"code":500}"#), "backend request failed");
    }
}
