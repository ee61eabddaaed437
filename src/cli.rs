use clap::Parser;

/// Terminal back office for clients, employees and products.
#[derive(Debug, Parser)]
#[command(name = "comandas_admin", version)]
pub struct Cli {
    /// Override PROXY_BASE_URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Where to write the log file
    #[arg(long)]
    pub log_file: Option<String>,

    /// Screen to open after login, e.g. /clientes or /produto/edit/3
    #[arg(long)]
    pub route: Option<String>,
}
