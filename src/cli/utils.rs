use serde_json::{json, Value};
use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(target)) = (data, response.as_object_mut()) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(
    output_format: &OutputFormat,
    message: &str,
    error_code: Option<&str>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Output one record or an array of records
pub fn output_records(output_format: &OutputFormat, payload: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(payload)?);
        }
        OutputFormat::Text => {
            let records = match payload {
                Value::Array(items) => items.clone(),
                other => vec![other.clone()],
            };
            if records.is_empty() {
                println!("No records");
            }
            for record in records {
                println!("{}", format_record(&record));
            }
        }
    }
    Ok(())
}

/// `<id>  <name>` with a dash for records without a name
pub fn format_record(record: &Value) -> String {
    let id = record.get("id").map(|v| v.to_string()).unwrap_or_else(|| "?".to_string());
    let name = record.get("name").and_then(Value::as_str).unwrap_or("-");
    format!("{:>4}  {}", id, name)
}
