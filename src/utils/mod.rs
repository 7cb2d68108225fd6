/// Upper-cases the first character, leaving the rest untouched.
pub fn title_case(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn format_id(id: u32) -> String {
    format!("#{:03}", id)
}

pub fn parse_page_number(value: &str) -> Result<u32, String> {
    let raw = value.trim();
    if raw.is_empty() {
        return Err("page number is empty".to_string());
    }
    raw.parse::<u32>()
        .map_err(|_| format!("invalid page number '{raw}'"))
}

pub fn verbosity_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "pokedex=warn",
        1 => "pokedex=info",
        _ => "pokedex=debug",
    }
}

pub fn trim_base_url(url: &str) -> String {
    let mut out = url.trim().to_string();
    while out.ends_with('/') {
        out.pop();
    }
    out
}
