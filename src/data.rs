use serde::{Deserialize, Serialize};

use crate::{catalog::utils::parse_filter_value, catalog::ExportTask, prelude::*};

const QUERIES_FILE: &str = "queries.csv";

#[derive(Deserialize, Serialize)]
pub struct QueryData {
    pub name: String,
    pub field: String,
    pub value: String,
}

impl Default for QueryData {
    fn default() -> Self {
        Self {
            name: "under-500".to_string(),
            field: "price".to_string(),
            value: "500".to_string(),
        }
    }
}

impl From<QueryData> for ExportTask {
    fn from(val: QueryData) -> Self {
        ExportTask::new(val.name, val.field, parse_filter_value(&val.value))
    }
}

pub async fn read_queries() -> Result<Vec<ExportTask>> {
    let mut reader = match csv::Reader::from_path(QUERIES_FILE) {
        Ok(reader) => reader,
        Err(error) => {
            if error.to_string().contains("No such file or directory") {
                write_default_queries().await?;
                bail!("Fill the queries.csv file");
            }

            return Err(anyhow!("could not read csv file: {}", error));
        }
    };

    let records = reader.records();

    let mut queries = Vec::new();
    for record in records {
        let record = record?;
        let query: QueryData = match record.deserialize(None) {
            Ok(query) => query,
            Err(_error) => {
                continue;
            }
        };

        queries.push(query.into());
    }

    Ok(queries)
}

pub async fn write_default_queries() -> Result<()> {
    let mut writer = csv::Writer::from_path(QUERIES_FILE)
        .map_err(|error| anyhow!("could not write csv file {}", error))?;

    {
        let record = QueryData::default();
        writer
            .serialize(record)
            .map_err(|error| anyhow!("could not serialize csv record: {}", error))?;
    }

    Ok(())
}
