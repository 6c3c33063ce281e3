use std::path::Path;

use human_bytes::human_bytes;
use log::Level;
use logging_timer::stimer;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, info};

use crate::dataset::{self, FieldType};
use crate::error::{LoaderError, Result};
use crate::es_client::EsClient;
use crate::models::bulk::BulkResponse;
use crate::resource;

/// Creates `index`, bulk loads the bundled dataset into it and puts one
/// filtered alias per feature type on top. Stops at the first failure and
/// leaves whatever was already created in place.
pub async fn load_dataset(client: &EsClient, index: &str, resources: &Path) -> Result<()> {
    let _tmr = stimer!(Level::Info; "LOAD_DATASET");

    // resource first: a missing dataset must not leave an empty index behind
    let payload = resource::read_resource(resources, dataset::BULK_RESOURCE).await?;

    create_index(client, index, &dataset::index_definition()).await?;
    bulk_load(client, index, payload).await?;
    for alias in dataset::ALIASES {
        create_filtered_alias(client, alias, index, &dataset::alias_filter(alias)).await?;
    }
    Ok(())
}

pub async fn create_index(client: &EsClient, name: &str, mapping: &Value) -> Result<()> {
    info!("Creating index {}", name);
    client
        .call_ok(Method::PUT, &format!("/{}", name), &[], Some(mapping.to_string()))
        .await?;
    Ok(())
}

pub async fn bulk_load(client: &EsClient, index: &str, payload: String) -> Result<BulkResponse> {
    let path = format!("/{}/{}/_bulk", index, dataset::MAPPING_TYPE);
    info!(
        "Sending bulk payload of {} ({} lines) to {}",
        human_bytes(payload.len() as f64),
        payload.lines().count(),
        path
    );

    let response = client
        .call(Method::POST, &path, &[("refresh", "true")], Some(payload))
        .await?;
    if response.get_status() != StatusCode::OK {
        return Err(LoaderError::Status {
            method: Method::POST,
            path,
            status: response.get_status(),
            body: response.into_body(),
        });
    }

    let bulk: BulkResponse = response.parse(&path)?;
    if bulk.has_errors() {
        return Err(LoaderError::BulkErrors(response.into_body()));
    }
    info!(
        "Bulk loaded {} documents into {} in {}ms",
        bulk.get_items_count(),
        index,
        bulk.get_took()
    );
    Ok(bulk)
}

/// `filter` is spliced into the body as-is, e.g. `"term" : { "ogc_type" : "lakes" }`.
pub async fn create_filtered_alias(
    client: &EsClient,
    alias_name: &str,
    index: &str,
    filter: &str,
) -> Result<()> {
    debug!("Creating alias {} -> {} with filter {}", alias_name, index, filter);
    client
        .call_ok(
            Method::POST,
            &format!("/{}/_alias/{}", index, alias_name),
            &[],
            Some(format!("{{\"filter\" : {{ {} }} }}", filter)),
        )
        .await?;
    info!("Alias {} created on {}", alias_name, index);
    Ok(())
}

/// Reads the mapping and aliases back and checks them against the fixed
/// definitions.
pub async fn verify_dataset(client: &EsClient, index: &str) -> Result<()> {
    let mapping: Value = client.get_json(&format!("/{}/_mapping", index)).await?;
    let aliases: Value = client.get_json(&format!("/{}/_alias", index)).await?;

    let mut problems = mapping_problems(&mapping[index]["mappings"]);
    problems.extend(alias_problems(&aliases[index]["aliases"]));

    if !problems.is_empty() {
        return Err(LoaderError::Verification {
            index: index.to_string(),
            problems,
        });
    }
    info!(
        "Index {} has the expected {} fields and {} aliases",
        index,
        dataset::FIELDS.len(),
        dataset::ALIASES.len()
    );
    Ok(())
}

fn mapping_problems(mappings: &Value) -> Vec<String> {
    // Typeless stores put `properties` straight under `mappings`.
    let properties = if mappings.get("properties").is_some() {
        &mappings["properties"]
    } else {
        &mappings[dataset::MAPPING_TYPE]["properties"]
    };
    let Some(properties) = properties.as_object() else {
        return vec!["mapping has no properties".to_string()];
    };

    let mut problems = Vec::new();
    for (name, field_type) in dataset::FIELDS {
        let Some(field) = properties.get(*name) else {
            problems.push(format!("field {} is missing", name));
            continue;
        };
        let actual = field["type"].as_str().unwrap_or("object");
        if actual != field_type.as_str() {
            problems.push(format!("field {} is {}, expected {}", name, actual, field_type.as_str()));
        } else if *field_type == FieldType::String
            && field["fields"]["keyword"]["type"].as_str() != Some("keyword")
        {
            problems.push(format!("field {} has no keyword sub-field", name));
        }
    }
    for name in properties.keys() {
        if !dataset::FIELDS.iter().any(|(expected, _)| *expected == name.as_str()) {
            problems.push(format!("unexpected field {}", name));
        }
    }
    problems
}

fn alias_problems(aliases: &Value) -> Vec<String> {
    let mut problems = Vec::new();
    for alias in dataset::ALIASES {
        let Some(definition) = aliases.get(*alias) else {
            problems.push(format!("alias {} is missing", alias));
            continue;
        };
        let term = &definition["filter"]["term"][dataset::DISCRIMINATOR_FIELD];
        // Stores may echo the short form or expand it to `{"value": ...}`.
        let value = term.as_str().or_else(|| term["value"].as_str());
        if value != Some(*alias) {
            problems.push(format!(
                "alias {} filter is {}, expected a term on {}",
                alias, definition["filter"], dataset::DISCRIMINATOR_FIELD
            ));
        }
    }
    problems
}
