//! Fetching several records by id.
//!
//! Hydra collections have no native "id in (...)" query. When the resource
//! declares an `id` filter the ids are fetched through the list operation,
//! page by page; otherwise each id is served from the document cache or
//! fetched on its own, concurrently. Either way the result follows the order
//! of the requested ids, never the order responses arrive in.

use super::DataProvider;
use crate::core::error::Result;
use crate::core::normalize::denormalize_record;
use crate::core::schema::ResourceSchema;
use crate::core::types::{FilterSpec, GetListParams, GetOneParams, PaginationInfo, Record};
use futures::stream::{FuturesUnordered, TryStreamExt};
use serde_json::Value;
use std::collections::HashMap;

pub(super) async fn get_many(provider: &DataProvider, schema: &ResourceSchema, ids: &[String]) -> Result<Vec<Record>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    if schema.has_id_filter() {
        let records = fetch_filtered(provider, schema, ids).await?;
        Ok(reorder(ids, records))
    } else {
        fetch_each(provider, schema, ids).await
    }
}

/// List filtered on every id at once, following pages while the server
/// reports more. Stops once the page index exceeds the number of records
/// gathered so far, so a server that never ends pagination cannot loop us.
async fn fetch_filtered(provider: &DataProvider, schema: &ResourceSchema, ids: &[String]) -> Result<Vec<Record>> {
    let id_filter = Value::Array(ids.iter().cloned().map(Value::String).collect());
    let per_page = u32::try_from(ids.len()).unwrap_or(u32::MAX);
    let mut page: u32 = 1;
    let mut records = Vec::with_capacity(ids.len());

    loop {
        let params = GetListParams::new()
            .with_pagination(page, per_page)
            .with_filter(FilterSpec::new().with("id", id_filter.clone()));
        let list = provider.get_list(&schema.name, params).await?;
        let received = list.data.len();
        records.extend(list.data);

        let more = match list.pagination {
            PaginationInfo::Total(total) => total > records.len() as u64,
            PaginationInfo::PageInfo { has_next_page, .. } => has_next_page,
            PaginationInfo::Unknown => false,
        };
        if !more || received == 0 {
            break;
        }

        page += 1;
        if page as usize > records.len() {
            tracing::warn!(resource = %schema.name, page, "stopping id-filtered pagination");
            break;
        }
    }

    Ok(records)
}

/// One request per id not already cached, all in flight at once.
async fn fetch_each(provider: &DataProvider, schema: &ResourceSchema, ids: &[String]) -> Result<Vec<Record>> {
    let fetches: FuturesUnordered<_> = ids
        .iter()
        .enumerate()
        .map(|(index, id)| async move {
            let record = match provider.cache().get(id) {
                Some(cached) => denormalize_record(schema, cached).await?,
                None => {
                    provider
                        .get_one(&schema.name, GetOneParams::new(id.clone()))
                        .await?
                }
            };
            Ok::<_, crate::core::error::ProviderError>((index, record))
        })
        .collect();

    let mut slots: Vec<Option<Record>> = vec![None; ids.len()];
    let completed: Vec<(usize, Record)> = fetches.try_collect().await?;
    for (index, record) in completed {
        slots[index] = Some(record);
    }
    Ok(slots.into_iter().flatten().collect())
}

/// Arrange `records` in the order of `ids`. Ids the server did not return
/// are skipped.
fn reorder(ids: &[String], records: Vec<Record>) -> Vec<Record> {
    let by_id: HashMap<String, Record> = records
        .into_iter()
        .map(|record| (record.id().to_string(), record))
        .collect();

    ids.iter()
        .filter_map(|id| {
            let found = by_id.get(id).cloned();
            if found.is_none() {
                tracing::warn!(id = %id, "requested record missing from response");
            }
            found
        })
        .collect()
}
