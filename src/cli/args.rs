use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "pokedex",
    version,
    about = "paginated, searchable creature catalog",
    long_about = "Pokedex browses the PokeAPI catalog page by page, with per-type colors and a name filter over the loaded page.\n\nExamples:\n  pokedex\n  pokedex -p 25 -q saur --once\n  pokedex -p 101 --once -o last-page.json\n\nTip: Use --init-config to write ~/.pokedex/config.yml and keep invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        long = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the displayed records to a file (with --once)."
    )]
    pub output: Option<String>,

    #[arg(
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format: text or json (inferred from the file extension by default)."
    )]
    pub output_format: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.pokedex/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "init-config",
        help_heading = "Input",
        help = "Write the default config file and exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 'b',
        long = "base-url",
        value_name = "URL",
        help_heading = "Catalog",
        help = "Base URL of the REST API."
    )]
    pub base_url: Option<String>,

    #[arg(
        short = 'n',
        long = "total-records",
        value_name = "N",
        help_heading = "Catalog",
        help = "Number of records in the catalog."
    )]
    pub total_records: Option<u32>,

    #[arg(
        short = 's',
        long = "page-size",
        value_name = "N",
        help_heading = "Catalog",
        help = "Records per page."
    )]
    pub page_size: Option<u32>,

    #[arg(
        short = 'p',
        long = "page",
        value_name = "N",
        help_heading = "Catalog",
        help = "Page to open first."
    )]
    pub page: Option<u32>,

    #[arg(
        short = 'q',
        long = "search",
        value_name = "TERM",
        help_heading = "Catalog",
        help = "Open the search bar with this name filter."
    )]
    pub search: Option<String>,

    #[arg(
        long = "once",
        help_heading = "Catalog",
        help = "Print the page once and exit instead of starting the interactive view."
    )]
    pub once: bool,

    #[arg(
        long = "timeout",
        value_name = "SECS",
        help_heading = "HTTP",
        help = "Request timeout in seconds."
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'r',
        long = "rate",
        value_name = "RPS",
        help_heading = "HTTP",
        help = "Request rate limit (requests per second, 0 = unlimited)."
    )]
    pub rate: Option<u32>,

    #[arg(
        long = "proxy",
        value_name = "URL",
        help_heading = "HTTP",
        help = "Route requests through an HTTP proxy."
    )]
    pub proxy: Option<String>,

    #[arg(
        short = 'w',
        long = "workers",
        value_name = "N",
        help_heading = "Performance",
        help = "Runtime worker threads."
    )]
    pub workers: Option<usize>,
}
