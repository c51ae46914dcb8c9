use crate::demo::{run_demo, run_renewals_report, DemoArgs, RenewalsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use tenant_leasing::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Tenant Leasing Console",
    about = "Serve and inspect the leasing applicant, group and renewal lists",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print lease renewals grouped by days-left bucket
    Renewals(RenewalsArgs),
    /// Walk through applicant and group lifecycle actions on sample data
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Renewals(args) => run_renewals_report(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tenant_leasing::workflows::leasing::{CallerRole, DayBucket};

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["tenant-leasing-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn renewals_accepts_comma_separated_buckets() {
        let cli = Cli::try_parse_from([
            "tenant-leasing-api",
            "renewals",
            "--bucket",
            "expired,0-30",
            "--bucket",
            "360+",
            "--owner",
            "Cedar Holdings",
        ])
        .expect("parses");

        let Some(Command::Renewals(args)) = cli.command else {
            panic!("expected renewals command");
        };
        assert_eq!(
            args.buckets,
            vec![DayBucket::Expired, DayBucket::Within30, DayBucket::Beyond360]
        );
        assert_eq!(args.owner.as_deref(), Some("Cedar Holdings"));
    }

    #[test]
    fn demo_rejects_unknown_roles() {
        assert!(Cli::try_parse_from(["tenant-leasing-api", "demo", "--role", "janitor"]).is_err());

        let cli = Cli::try_parse_from(["tenant-leasing-api", "demo", "--role", "agent"])
            .expect("parses");
        let Some(Command::Demo(args)) = cli.command else {
            panic!("expected demo command");
        };
        assert_eq!(args.role, CallerRole::Agent);
    }
}
