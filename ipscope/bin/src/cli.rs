use std::{io, io::Write, path::PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use ipscope_server::ApiDoc;
use snafu::ResultExt;
use utoipa::OpenApi;

use crate::{command::run_server, config::Config, error, shadow};

#[derive(Debug, Parser)]
#[command(author,
    version,
    long_version = shadow::CLAP_LONG_VERSION,
    about,
    long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(
        long = "config",
        short = 'c',
        env = "IPSCOPE_CONFIG_FILE_PATH",
        help = "Specify a configuration file"
    )]
    config_file_path: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[clap(about = "Print version information")]
    Version,

    #[clap(about = "Output shell completion code for the specified shell (bash, zsh, fish)")]
    Completion { shell: Shell },

    #[clap(about = "Output default configuration")]
    DefaultConfig,

    #[clap(about = "Run server")]
    #[command(visible_alias = "run")]
    Server {
        #[clap(long = "port", env = "PORT", help = "Override the HTTP listen port")]
        port: Option<u16>,
    },

    #[clap(about = "Output `OpenApi` document")]
    OpenApi,
}

impl Cli {
    pub fn run(self) -> Result<(), Box<error::Error>> {
        match self.command {
            Command::Version => {
                write_stdout(Self::command().render_long_version().as_bytes())?;
            }
            Command::Completion { shell } => {
                let mut command = Self::command();
                let bin_name = command.get_name().to_string();
                clap_complete::generate(shell, &mut command, bin_name, &mut io::stdout());
            }
            Command::DefaultConfig => {
                let config_text = serde_yaml::to_string(&Config::default())
                    .context(error::RenderDefaultConfigSnafu)?;
                write_stdout(config_text.as_bytes())?;
            }
            Command::Server { port } => {
                let mut config = self.load_config()?;
                if let Some(port) = port {
                    config.web.port = port;
                }
                run_server(config)?;
            }
            Command::OpenApi => {
                let document =
                    ApiDoc::openapi().to_yaml().boxed().context(error::RenderOpenApiSnafu)?;
                write_stdout(document.as_bytes())?;
            }
        }

        Ok(())
    }

    /// Configuration from `--config`, or from the default path if a file exists
    /// there, or the built-in defaults.
    fn load_config(&self) -> Result<Config, error::Error> {
        match &self.config_file_path {
            Some(path) => Ok(Config::load(path)?),
            None => {
                let path = Config::default_path();
                if path.exists() { Ok(Config::load(&path)?) } else { Ok(Config::default()) }
            }
        }
    }
}

fn write_stdout(bytes: &[u8]) -> Result<(), error::Error> {
    io::stdout().write_all(bytes).context(error::WriteStdoutSnafu)
}
