use shadowpath_common::protocol::ElementRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

pub fn format_results(results: &[ElementRef], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(results).unwrap_or_else(|e| format!("Error: {}", e))
        }
        OutputFormat::Text => {
            let mut output = format!("Found {} element(s).", results.len());
            for (index, element) in results.iter().enumerate() {
                output.push_str(&format!("\n{}. {}", index + 1, element));
            }
            output
        }
    }
}
