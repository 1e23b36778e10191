use std::future::Future;

use rquest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::prelude::*;

use super::auth::auth_token;
use super::types::{ActionResponse, Product};

const BASE_API_URL: &str = "https://api.stockhub.store/";

pub const RETRY_LIMIT: usize = 3;

async fn post_action<T: DeserializeOwned>(
    client: &Client,
    action: &str,
    params: Value,
) -> Result<Vec<T>> {
    let body = json!({ "action": action, "params": params });

    let request = client
        .post(BASE_API_URL)
        .header("X-Auth", auth_token())
        .json(&body);
    let response = request
        .send()
        .await
        .map_err(|err| anyhow!("failed to send request {}", err.without_url().to_string()))?;

    let response_status = response.status();
    let response_text = response
        .text()
        .await
        .map_err(|err| anyhow!("failed to get response text {}", err.to_string()))?;

    if !response_status.is_success() {
        bail!("bad status {}", response_status);
    }

    let deserialized_response: ActionResponse<T> = serde_json::from_str(&response_text)
        .map_err(|err| anyhow!("failed to deserialize response {}", err))?;

    Ok(deserialized_response.result)
}

pub async fn get_fields(client: &Client) -> Result<Vec<String>> {
    post_action(client, "get_fields", json!({})).await
}

pub async fn get_ids(
    client: &Client,
    offset: Option<usize>,
    limit: Option<usize>,
) -> Result<Vec<String>> {
    let mut params = json!({});
    if let Some(offset) = offset {
        params["offset"] = json!(offset);
    }
    if let Some(limit) = limit {
        params["limit"] = json!(limit);
    }

    post_action(client, "get_ids", params).await
}

pub async fn get_items(client: &Client, ids: &[String]) -> Result<Vec<Product>> {
    post_action(client, "get_items", json!({ "ids": ids })).await
}

pub async fn filter_ids(client: &Client, field: &str, value: &Value) -> Result<Vec<String>> {
    let mut params = serde_json::Map::new();
    params.insert(field.to_string(), value.clone());

    post_action(client, "filter", Value::Object(params)).await
}

// Retries immediately on any failure, no backoff. Exhaustion resolves
// to an empty result; callers render that as "no items found".
pub async fn with_retry<T, F, Fut>(label: &str, op: F) -> Vec<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    for attempt in 1..=RETRY_LIMIT {
        match op().await {
            Ok(result) => return result,
            Err(err) => warn!(
                "Request failed; action={}; attempt={}/{}; err={}",
                label, attempt, RETRY_LIMIT, err
            ),
        }
    }

    Vec::new()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::catalog::utils::get_client;

    use super::*;

    #[tokio::test]
    async fn test_with_retry_gives_up_after_cap() {
        let attempts = AtomicUsize::new(0);

        let result: Vec<String> = with_retry("test", || async {
            attempts.fetch_add(1, Ordering::SeqCst);
            bail!("connection reset")
        })
        .await;

        assert!(result.is_empty());
        assert_eq!(attempts.load(Ordering::SeqCst), RETRY_LIMIT);
    }

    #[tokio::test]
    async fn test_with_retry_stops_on_success() {
        let attempts = AtomicUsize::new(0);

        let result = with_retry("test", || async {
            if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                bail!("connection reset")
            }

            Ok(vec!["1789aff2".to_string()])
        })
        .await;

        assert_eq!(result, vec!["1789aff2"]);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    #[ignore = "hits the live catalog API"]
    async fn test_live_browse_roundtrip() {
        let client = get_client();

        let fields = get_fields(&client).await.unwrap();
        assert!(fields.contains(&"price".to_string()));

        let ids = get_ids(&client, Some(0), Some(5)).await.unwrap();
        let items = get_items(&client, &ids).await.unwrap();
        assert!(!items.is_empty());
    }
}
