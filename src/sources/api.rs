use serde::Deserialize;
use serde_with::{serde_as, OneOrMany};
use ureq::Agent;

use super::{Record, SourceError};
use crate::address::unescape;

/// Rows from a tabular export shaped `{Export: {Table: {Row: [...]}}}`.
pub fn fetch(agent: &Agent, url: &str) -> Result<Vec<Record>, SourceError> {
    let document: Document = agent.get(url).call()?.into_json()?;
    Ok(records(document))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Document {
    export: Option<Export>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Export {
    table: Option<Table>,
}

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Table {
    // a single row comes through as an object
    #[serde_as(as = "OneOrMany<_>")]
    #[serde(default)]
    row: Vec<Row>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Row {
    #[serde(default)]
    customer_name: String,
    address_city_state_zip: Option<String>,
    #[serde(default)]
    customer_type: String,
}

fn records(document: Document) -> Vec<Record> {
    let rows = document
        .export
        .and_then(|x| x.table)
        .map(|x| x.row)
        .unwrap_or_default();

    rows.into_iter()
        .map(|row| Record {
            customer_name: unescape(&row.customer_name),
            raw_address: row.address_city_state_zip,
            customer_type: row.customer_type,
        })
        .filter(|x| !is_system_row(x))
        .collect()
}

/// Inventory adjustments and header echoes the export mixes in with customers.
fn is_system_row(record: &Record) -> bool {
    let name = record.customer_name.to_lowercase();
    let address = record.raw_address.as_deref().unwrap_or_default().to_lowercase();
    name.contains("fifo") || name.contains("adjustment") || address.contains("distributor address")
}
