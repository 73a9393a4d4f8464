//! CLI argument definitions using clap derive macros.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Search, browse and download high-resolution photographs.
///
/// Queries go through the search proxy (`imagesearch serve`), which holds the
/// provider credential. Results are biased toward 4K landscape photography and
/// shown 12 per page, highest resolution first.
#[derive(Parser, Debug)]
#[command(name = "imagesearch")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Base URL of the search proxy
    #[arg(long, global = true, value_name = "URL")]
    pub proxy_url: Option<String>,

    /// Directory downloaded images are saved into
    #[arg(short = 'o', long, global = true, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the default collection (waterfall nature)
    Default,
    /// Search for a term and show one page of results
    Search(SearchArgs),
    /// Interactive browsing over stdin
    Browse,
    /// Run the search proxy server
    Serve(ServeArgs),
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Search term
    pub term: String,

    /// Page to show (1-based)
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Download the result(s) at these positions (1-12) on the shown page
    #[arg(short, long = "download", value_name = "INDEX", num_args = 1.., value_parser = clap::value_parser!(u8).range(1..=12))]
    pub download: Vec<u8>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<SocketAddr>,

    /// Provider API base URL (for testing against a mock)
    #[arg(long, value_name = "URL", hide = true)]
    pub upstream_url: Option<String>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ConfigAction {
    /// Print effective configuration and where each value comes from
    Show,
}
