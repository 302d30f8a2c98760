use clap::{Parser, Subcommand, builder::PossibleValuesParser, builder::TypedValueParser};
use lumber::{LEVELS, Level};

use crate::Result;
use crate::command;
use crate::utils::env::ExplorerEnv;

#[derive(Debug, Parser)]
#[command(
    name = "log-explorer",
    version,
    about = "
Log Explorer - serves the log explorer UI and proxies its calls to New Relic and Gemini

Start the server from the directory holding log_explorer.html:

    $ log-explorer serve

New Relic API keys come from the browser with every request.
Set GEMINI_API_KEY (in the environment or a .env file) to enable AI insights.
"
)]
pub struct LogExplorer {
    #[command(subcommand)]
    pub command: Command,

    /// Specify the log level
    #[arg(
        long = "log",
        short = 'l',
        global = true,
        value_parser = PossibleValuesParser::new(LEVELS).try_map(|level| level.parse::<Level>()),
        ignore_case = true
    )]
    pub log_level: Option<Level>,

    #[arg(skip)]
    pub env_store: ExplorerEnv,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the UI and the proxy endpoints
    Serve(command::Serve),
}

impl LogExplorer {
    pub async fn run(&self) -> Result<()> {
        match &self.command {
            Command::Serve(command) => command.run(&self.env_store).await,
        }
    }
}
