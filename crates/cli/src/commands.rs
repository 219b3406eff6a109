use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Execute a batch file against the database
    Run {
        #[arg(long, help = "Batch file path (JSON)")]
        batch: String,

        #[arg(long, help = "Connection URL; falls back to DATABASE_URL")]
        url: Option<String>,

        #[arg(long, help = "Load variables such as DATABASE_URL from this .env file")]
        env_file: Option<String>,

        #[arg(
            long,
            help = "If specified, writes the JSON result to this file instead of stdout"
        )]
        output: Option<String>,
    },
    /// Print the statement a batch file would run, without connecting
    Render {
        #[arg(long, help = "Batch file path (JSON)")]
        batch: String,
    },
    /// Test a connection URL
    TestConn {
        #[arg(long, help = "Connection URL; falls back to DATABASE_URL")]
        url: Option<String>,

        #[arg(long, help = "Load variables such as DATABASE_URL from this .env file")]
        env_file: Option<String>,
    },
}
