use crate::cli::args::CliArgs;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if args.total_records == Some(0) {
        return Err("invalid total-records, expected positive integer".to_string());
    }
    if args.page_size == Some(0) {
        return Err("invalid page-size, expected positive integer".to_string());
    }
    if args.page == Some(0) {
        return Err("invalid page, pages start at 1".to_string());
    }
    if args.workers == Some(0) {
        return Err("invalid workers, expected positive integer".to_string());
    }
    if let Some(raw) = args.base_url.as_deref() {
        reqwest::Url::parse(raw.trim()).map_err(|e| format!("invalid --base-url '{raw}': {e}"))?;
    }
    if let Some(raw) = args.output_format.as_deref() {
        if crate::render::OutputFormat::parse(raw).is_none() {
            return Err(format!(
                "invalid --output-format '{raw}', expected text or json"
            ));
        }
    }
    if args.output.is_some() && !args.once {
        return Err("--output requires --once".to_string());
    }
    Ok(())
}
