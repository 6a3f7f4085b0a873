use anyhow::Context;
use clap::Subcommand;
use reqwest::{Client, Method, StatusCode};
use serde_json::{json, Value};

use crate::cli::utils::{output_error, output_records, output_success};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum DataCommands {
    #[command(about = "List all records")]
    List,

    #[command(about = "Show a single record")]
    Get {
        #[arg(help = "Record ID")]
        id: String,
    },

    #[command(about = "Create a record")]
    Create {
        #[arg(help = "Record name")]
        name: String,
    },

    #[command(about = "Rename a record")]
    Update {
        #[arg(help = "Record ID to update")]
        id: String,
        #[arg(help = "New record name")]
        name: String,
    },

    #[command(about = "Delete a record")]
    Delete {
        #[arg(help = "Record ID to delete")]
        id: String,
    },
}

pub async fn handle(cmd: DataCommands, base_url: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = Client::new();
    let collection = format!("{}/api/data", base_url);

    let (method, url, body) = match &cmd {
        DataCommands::List => (Method::GET, collection, None),
        DataCommands::Get { id } => (Method::GET, format!("{}/{}", collection, id), None),
        DataCommands::Create { name } => (Method::POST, collection, Some(json!({ "name": name }))),
        DataCommands::Update { id, name } => (
            Method::PUT,
            format!("{}/{}", collection, id),
            Some(json!({ "name": name })),
        ),
        DataCommands::Delete { id } => (Method::DELETE, format!("{}/{}", collection, id), None),
    };

    let mut request = client.request(method, &url);
    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request
        .send()
        .await
        .with_context(|| format!("request to {} failed", url))?;
    let status = response.status();
    let payload: Value = response.json().await.unwrap_or(Value::Null);

    if status == StatusCode::NOT_FOUND {
        let message = payload["message"].as_str().unwrap_or("Data not found");
        output_error(&output_format, message, Some("NOT_FOUND"))?;
        anyhow::bail!("{}", message);
    }
    if !status.is_success() {
        output_error(&output_format, &format!("server returned {}", status), None)?;
        anyhow::bail!("server returned {}", status);
    }

    match cmd {
        DataCommands::List => output_records(&output_format, &payload),
        DataCommands::Get { .. } => output_records(&output_format, &payload),
        DataCommands::Create { .. } => output_success(&output_format, "Record created", Some(json!({ "record": payload }))),
        DataCommands::Update { .. } => output_success(&output_format, "Record updated", Some(json!({ "record": payload }))),
        DataCommands::Delete { id } => output_success(&output_format, &format!("Record {} deleted", id), None),
    }
}
