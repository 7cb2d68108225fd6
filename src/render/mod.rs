use colored::{ColoredString, Colorize};

use crate::catalog::{PageLayout, Record};
use crate::palette::{self, TypeColor};
use crate::utils::{format_id, title_case};
use crate::view::ViewState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

/// Display-ready view of a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Card {
    pub number: String,
    pub name: String,
    pub type_label: String,
    pub color: Option<&'static TypeColor>,
    pub image: String,
}

impl Card {
    pub fn from_record(record: &Record) -> Self {
        Self {
            number: format_id(record.id),
            name: title_case(&record.name),
            type_label: palette::type_label(&record.types),
            color: palette::type_color(&record.types),
            image: record.image_or_fallback().to_string(),
        }
    }

    fn paint(&self, text: &str) -> ColoredString {
        match self.color {
            Some(TypeColor { rgb: (r, g, b), .. }) => text.truecolor(*r, *g, *b),
            None => text.normal(),
        }
    }

    pub fn render(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            self.paint("▌"),
            self.number.bold(),
            format!("{:<14}", self.name).bold().white(),
            "Type:".dimmed(),
            self.paint(&format!("{:<18}", self.type_label)),
            self.image.dimmed()
        )
    }
}

pub fn render_header(state: &ViewState) -> String {
    if !state.search_open {
        return format!("{} {}", "Pokédex".bold().red(), "[/ to search]".dimmed());
    }
    let placeholder = if state.loading {
        "Loading Pokémon..."
    } else {
        "Search Pokémon by name..."
    };
    let input = if state.search_term.is_empty() {
        placeholder.dimmed().to_string()
    } else {
        state.search_term.clone()
    };
    format!("{} {} {}", "Pokédex".bold().red(), "🔍".blue(), input)
}

pub fn render_footer(state: &ViewState, layout: &PageLayout) -> String {
    let previous = if state.can_go_previous() {
        "⬅ Previous".blue()
    } else {
        "⬅ Previous".dimmed()
    };
    let next = if state.can_go_next(layout) {
        "Next ➡".blue()
    } else {
        "Next ➡".dimmed()
    };
    format!(
        "{}  [{}]  {}  Page {} of {}",
        previous,
        state.input_page,
        next,
        state.current_page,
        layout.last_page()
    )
}

pub fn render_view(state: &ViewState, layout: &PageLayout) -> String {
    let mut out = String::new();
    out.push_str(&render_header(state));
    out.push('\n');
    if state.loading {
        out.push_str("Loading...\n");
    } else {
        for record in &state.filtered {
            out.push_str(&Card::from_record(record).render());
            out.push('\n');
        }
    }
    out.push_str(&render_footer(state, layout));
    out.push('\n');
    out
}

pub fn render_text(records: &[Record]) -> Vec<u8> {
    let mut out = String::new();
    for r in records {
        out.push_str(&format!("{} {}\n", format_id(r.id), r.name));
    }
    out.into_bytes()
}

pub fn render_json(records: &[Record]) -> Vec<u8> {
    serde_json::to_vec_pretty(records).unwrap_or_else(|_| b"[]\n".to_vec())
}

pub fn render(format: OutputFormat, records: &[Record]) -> Vec<u8> {
    match format {
        OutputFormat::Text => render_text(records),
        OutputFormat::Json => render_json(records),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::record;

    #[test]
    fn card_uses_priority_color_and_padded_number() {
        let card = Card::from_record(&record(1, "bulbasaur", &["poison", "grass"]));
        assert_eq!(card.number, "#001");
        assert_eq!(card.name, "Bulbasaur");
        assert_eq!(card.type_label, "Poison / Grass");
        assert_eq!(card.color.map(|c| c.css), Some("lightgreen"));
        assert_eq!(card.color.map(|c| c.rgb), Some((144, 238, 144)));
    }

    #[test]
    fn card_without_sprite_uses_fallback() {
        let mut r = record(1010, "ironleaves", &["stellar"]);
        r.image_url = None;
        let card = Card::from_record(&r);
        assert_eq!(card.image, crate::catalog::FALLBACK_IMAGE);
        assert_eq!(card.color, None);

        colored::control::set_override(false);
        let line = card.render();
        assert!(line.contains("#1010"));
        assert!(line.contains("/fallback-image.png"));
        assert!(Card::from_record(&record(1, "bulbasaur", &["grass"]))
            .render()
            .contains("https://img.example/1.png"));
    }

    #[test]
    fn view_shows_loading_instead_of_grid() {
        colored::control::set_override(false);
        let layout = PageLayout::default();
        let mut state = ViewState::initial(1);
        state.filtered = vec![record(1, "bulbasaur", &["grass"])];
        state.loading = true;

        let out = render_view(&state, &layout);
        assert!(out.contains("Loading..."));
        assert!(!out.contains("Bulbasaur"));
        assert!(out.contains("Page 1 of 101"));
    }

    #[test]
    fn output_format_inference() {
        assert_eq!(OutputFormat::parse("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("xml"), None);
        assert_eq!(infer_format_from_path("out.json"), Some(OutputFormat::Json));
        assert_eq!(infer_format_from_path("out.txt"), Some(OutputFormat::Text));
        assert_eq!(infer_format_from_path("out"), None);
    }

    #[test]
    fn text_export_lists_ids_and_names() {
        let records = vec![
            record(1, "bulbasaur", &["grass"]),
            record(4, "charmander", &["fire"]),
        ];
        let out = String::from_utf8(render_text(&records)).unwrap();
        assert_eq!(out, "#001 bulbasaur\n#004 charmander\n");
    }

    #[test]
    fn json_export_is_an_array() {
        let records = vec![record(25, "pikachu", &["electric"])];
        let value: serde_json::Value = serde_json::from_slice(&render_json(&records)).unwrap();
        assert_eq!(value[0]["id"], 25);
        assert_eq!(value[0]["types"][0], "electric");
    }
}
