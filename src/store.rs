use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_dynamodb::{
    config::{Builder as DynamoConfigBuilder, Region},
    error::DisplayErrorContext,
    types::AttributeValue,
    Client,
};
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::config::AppConfig;
use crate::meals::record::MealRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The table could not be reached or rejected the call.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// An item came back without a required attribute or with one that does
    /// not parse.
    #[error("corrupt item: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait MealStore: Send + Sync {
    /// Persists one record. A put on an existing (user_id, timestamp) key
    /// overwrites; callers stamp timestamps at microsecond resolution, which
    /// keeps that window practically empty.
    async fn put(&self, record: &MealRecord) -> Result<(), StoreError>;

    /// Up to `limit` records for one user, ascending by timestamp (the
    /// table's native sort-key order).
    async fn query_by_user(&self, user_id: &str, limit: i32)
        -> Result<Vec<MealRecord>, StoreError>;

    /// All records for one user with `start <= timestamp <= end`. An empty
    /// result is `Ok(vec![])`.
    async fn query_by_time_range(
        &self,
        user_id: &str,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<MealRecord>, StoreError>;
}

pub struct DynamoMealStore {
    client: Client,
    table: String,
}

impl DynamoMealStore {
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let mut loader =
            defaults(BehaviorVersion::latest()).region(Region::new(config.aws_region.clone()));

        if let Some(endpoint) = &config.dynamodb_endpoint {
            // Local DynamoDB accepts any static credentials.
            loader = loader
                .endpoint_url(endpoint)
                .credentials_provider(Credentials::new("local", "local", None, None, "static"));
        }

        let shared = loader.load().await;
        let conf = DynamoConfigBuilder::from(&shared).build();

        Ok(Self {
            client: Client::from_conf(conf),
            table: config.dynamodb_table.clone(),
        })
    }
}

#[async_trait]
impl MealStore for DynamoMealStore {
    async fn put(&self, record: &MealRecord) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(to_item(record)?))
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }

    async fn query_by_user(
        &self,
        user_id: &str,
        limit: i32,
    ) -> Result<Vec<MealRecord>, StoreError> {
        let out = self
            .client
            .query()
            .table_name(&self.table)
            .key_condition_expression("#uid = :uid")
            .expression_attribute_names("#uid", "user_id")
            .expression_attribute_values(":uid", AttributeValue::S(user_id.to_string()))
            .limit(limit)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(DisplayErrorContext(&e).to_string()))?;

        out.items().iter().map(from_item).collect()
    }

    async fn query_by_time_range(
        &self,
        user_id: &str,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<MealRecord>, StoreError> {
        let start_key = format_sort_key(start)?;
        let end_key = format_sort_key(end)?;

        let mut records = Vec::new();
        let mut exclusive_start_key = None;

        // Follow LastEvaluatedKey so a day spanning multiple pages is never
        // truncated.
        loop {
            let mut req = self
                .client
                .query()
                .table_name(&self.table)
                // "timestamp" is a DynamoDB reserved word, hence the alias.
                .key_condition_expression("#uid = :uid AND #ts BETWEEN :start AND :end")
                .expression_attribute_names("#uid", "user_id")
                .expression_attribute_names("#ts", "timestamp")
                .expression_attribute_values(":uid", AttributeValue::S(user_id.to_string()))
                .expression_attribute_values(":start", AttributeValue::S(start_key.clone()))
                .expression_attribute_values(":end", AttributeValue::S(end_key.clone()));
            if let Some(key) = exclusive_start_key.take() {
                req = req.set_exclusive_start_key(Some(key));
            }

            let out = req
                .send()
                .await
                .map_err(|e| StoreError::Unavailable(DisplayErrorContext(&e).to_string()))?;

            for item in out.items() {
                records.push(from_item(item)?);
            }

            match out.last_evaluated_key() {
                Some(key) if !key.is_empty() => exclusive_start_key = Some(key.clone()),
                _ => break,
            }
        }

        Ok(records)
    }
}

/// Sort keys use a fixed-width fraction so lexicographic order matches
/// chronological order; a trimmed RFC 3339 fraction would not sort.
const SORT_KEY_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z");

fn format_sort_key(ts: OffsetDateTime) -> Result<String, StoreError> {
    ts.format(SORT_KEY_FORMAT)
        .map_err(|e| StoreError::Corrupt(format!("timestamp not formattable: {e}")))
}

fn to_item(record: &MealRecord) -> Result<HashMap<String, AttributeValue>, StoreError> {
    let mut item = HashMap::from([
        (
            "user_id".to_string(),
            AttributeValue::S(record.user_id.clone()),
        ),
        (
            "timestamp".to_string(),
            AttributeValue::S(format_sort_key(record.timestamp)?),
        ),
        (
            "calories".to_string(),
            AttributeValue::N(record.calories.to_string()),
        ),
        (
            "protein".to_string(),
            AttributeValue::N(record.protein.to_string()),
        ),
        ("fat".to_string(), AttributeValue::N(record.fat.to_string())),
        (
            "carbs".to_string(),
            AttributeValue::N(record.carbs.to_string()),
        ),
    ]);
    if let Some(meal_type) = &record.meal_type {
        item.insert("meal_type".into(), AttributeValue::S(meal_type.clone()));
    }
    if let Some(description) = &record.description {
        item.insert("description".into(), AttributeValue::S(description.clone()));
    }
    Ok(item)
}

fn from_item(item: &HashMap<String, AttributeValue>) -> Result<MealRecord, StoreError> {
    let raw_ts = string_attr(item, "timestamp")?;
    let timestamp = OffsetDateTime::parse(&raw_ts, &Rfc3339)
        .map_err(|e| StoreError::Corrupt(format!("timestamp {raw_ts:?}: {e}")))?;

    Ok(MealRecord {
        user_id: string_attr(item, "user_id")?,
        timestamp,
        calories: number_attr(item, "calories")?,
        protein: number_attr(item, "protein")?,
        fat: number_attr(item, "fat")?,
        carbs: number_attr(item, "carbs")?,
        meal_type: optional_string_attr(item, "meal_type"),
        description: optional_string_attr(item, "description"),
    })
}

fn string_attr(item: &HashMap<String, AttributeValue>, name: &str) -> Result<String, StoreError> {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .ok_or_else(|| StoreError::Corrupt(format!("missing string attribute {name}")))
}

fn optional_string_attr(item: &HashMap<String, AttributeValue>, name: &str) -> Option<String> {
    item.get(name).and_then(|v| v.as_s().ok()).cloned()
}

fn number_attr(item: &HashMap<String, AttributeValue>, name: &str) -> Result<f64, StoreError> {
    let raw = item
        .get(name)
        .and_then(|v| v.as_n().ok())
        .ok_or_else(|| StoreError::Corrupt(format!("missing number attribute {name}")))?;
    raw.parse::<f64>()
        .map_err(|_| StoreError::Corrupt(format!("non-numeric attribute {name}: {raw:?}")))
}

/// Mirrors the table's semantics (ascending sort-key order, inclusive range,
/// same-key overwrite) against a plain Vec, for tests and local runs.
#[derive(Default)]
pub struct MemoryMealStore {
    records: Mutex<Vec<MealRecord>>,
}

#[async_trait]
impl MealStore for MemoryMealStore {
    async fn put(&self, record: &MealRecord) -> Result<(), StoreError> {
        let mut records = self.records.lock().expect("meal store mutex poisoned");
        if let Some(existing) = records
            .iter_mut()
            .find(|r| r.user_id == record.user_id && r.timestamp == record.timestamp)
        {
            *existing = record.clone();
        } else {
            records.push(record.clone());
        }
        Ok(())
    }

    async fn query_by_user(
        &self,
        user_id: &str,
        limit: i32,
    ) -> Result<Vec<MealRecord>, StoreError> {
        let records = self.records.lock().expect("meal store mutex poisoned");
        let mut matches: Vec<MealRecord> = records
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        matches.sort_by_key(|r| r.timestamp);
        matches.truncate(limit.max(0) as usize);
        Ok(matches)
    }

    async fn query_by_time_range(
        &self,
        user_id: &str,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<MealRecord>, StoreError> {
        let records = self.records.lock().expect("meal store mutex poisoned");
        let mut matches: Vec<MealRecord> = records
            .iter()
            .filter(|r| r.user_id == user_id && r.timestamp >= start && r.timestamp <= end)
            .cloned()
            .collect();
        matches.sort_by_key(|r| r.timestamp);
        Ok(matches)
    }
}
