//! CLI Commands

pub mod config;
pub mod deliveries;
pub mod export;
pub mod production;
pub mod report;

use chrono::NaiveDate;
use recurra_core::{
    DateRange, Expense, Plan, Product, ProductCostHistory, Subscription, TeamSnapshot, TeamSubscriptionHistory,
};
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use uuid::Uuid;

/// API client
pub struct ApiClient {
    pub base_url: String,
    pub api_key: Option<String>,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str, api_key: Option<&str>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(String::from),
            client: reqwest::Client::new(),
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, String> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.get(&url);

        if let Some(key) = &self.api_key {
            req = req.header("Authorization", format!("Bearer {}", key));
        }

        let resp = req.send().await.map_err(|e| e.to_string())?;
        if !resp.status().is_success() {
            return Err(format!("GET {} failed: {}", url, resp.status()));
        }
        let json: serde_json::Value = resp.json().await.map_err(|e| e.to_string())?;
        unwrap_data(json)
    }
}

/// Payload of a `{"data": ...}` envelope
fn unwrap_data<T: DeserializeOwned>(json: serde_json::Value) -> Result<T, String> {
    match json.get("data") {
        Some(data) => serde_json::from_value(data.clone()).map_err(|e| e.to_string()),
        None => Err("No data in response".into()),
    }
}

/// Where the team snapshot comes from
pub enum SnapshotSource {
    File(PathBuf),
    Api { client: ApiClient, team_id: Uuid },
}

impl SnapshotSource {
    pub async fn load(&self) -> Result<TeamSnapshot, String> {
        match self {
            SnapshotSource::File(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
                TeamSnapshot::from_json(&content).map_err(|e| format!("{}: {}", path.display(), e))
            }
            SnapshotSource::Api { client, team_id } => fetch_snapshot(client, *team_id).await,
        }
    }
}

async fn fetch_snapshot(client: &ApiClient, team_id: Uuid) -> Result<TeamSnapshot, String> {
    let base = format!("/teams/{}", team_id);
    let subscriptions_url = format!("{}/subscriptions", base);
    let products_url = format!("{}/products", base);
    let cost_history_url = format!("{}/product-cost-history", base);
    let expenses_url = format!("{}/expenses", base);
    let platform_history_url = format!("{}/subscription-history", base);
    let plan_url = format!("{}/plan", base);
    let (subscriptions, products, cost_history, expenses, platform_history, plan) = tokio::try_join!(
        client.get::<Vec<Subscription>>(&subscriptions_url),
        client.get::<Vec<Product>>(&products_url),
        client.get::<Vec<ProductCostHistory>>(&cost_history_url),
        client.get::<Vec<Expense>>(&expenses_url),
        client.get::<Vec<TeamSubscriptionHistory>>(&platform_history_url),
        client.get::<Option<Plan>>(&plan_url),
    )?;

    tracing::debug!(
        team_id = %team_id,
        subscriptions = subscriptions.len(),
        products = products.len(),
        "fetched team snapshot"
    );

    Ok(TeamSnapshot { team_id, plan, subscriptions, products, cost_history, expenses, platform_history })
}

pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| format!("Invalid date '{}', expected YYYY-MM-DD", value))
}

pub fn parse_range(from: &str, to: &str) -> Result<DateRange, String> {
    let range = DateRange::new(parse_date(from)?, parse_date(to)?);
    if range.start > range.end {
        return Err(format!("--from {} is after --to {}", range.start, range.end));
    }
    Ok(range)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwrap_data_envelope() {
        let plan: Option<Plan> = unwrap_data(serde_json::json!({ "data": null })).unwrap();
        assert!(plan.is_none());

        let ids: Vec<u32> = unwrap_data(serde_json::json!({ "data": [1, 2, 3] })).unwrap();
        assert_eq!(ids, vec![1, 2, 3]);

        assert!(unwrap_data::<Vec<u32>>(serde_json::json!({ "error": "nope" })).is_err());
    }

    #[test]
    fn test_parse_range() {
        let range = parse_range("2024-02-01", "2024-02-29").unwrap();
        assert_eq!(range.len_days(), 29);
        assert!(parse_range("2024-03-01", "2024-02-01").is_err());
        assert!(parse_date("01/02/2024").is_err());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = ApiClient::new("https://api.example.com/v1/", None);
        assert_eq!(client.base_url, "https://api.example.com/v1");
    }
}
