use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;
use timetable::client::{ExportFormat, ExportTarget};
use timetable::types::{Section, Semester, StudentYear, TimetableFilter, TimetableQuery, LAB_ROOMS};
use timetable::{ApiClient, AuthContext, ClientConfig, SessionStore, SnapshotCache, TimetableView};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "timetable")]
#[command(about = "College timetable administration client")]
struct Cli {
    /// Raise log verbosity; RUST_LOG overrides this
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Log in and remember the session
    Login { email: String, password: String },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Show admin dashboard counts
    Stats,
    /// Print one semester/section timetable
    Grid { semester: Semester, section: Section },
    /// List the laboratory venues
    Labs,
    /// Print every class held in one venue
    Lab { venue: String },
    /// Download a semester/section timetable
    Export {
        semester: Semester,
        section: Section,
        format: ExportFormat,
    },
    /// Download a laboratory timetable
    LabExport { format: ExportFormat, venue: String },
    /// Download the student roster for one year
    StudentsExport { year: StudentYear, format: ExportFormat },
    /// Request a password reset link
    ForgotPassword { email: String },
    /// Confirm an email address
    VerifyEmail { token: String },
}

fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "timetable=info",
        1 => "timetable=debug",
        _ => "timetable=trace",
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(cli.verbose).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<()> {
    let config = ClientConfig::from_env().context("Failed to load configuration")?;
    let client = ApiClient::new(&config)?;
    let store = SessionStore::new(&config.session_file);
    let mut auth = store.restore()?;

    match command {
        Commands::Login { email, password } => {
            let session = client.login(&mut auth, &email, &password).await?;
            store.save(&session)?;
            println!("Logged in as {} ({})", session.user.username, session.user.role);
        }
        Commands::Logout => {
            auth.clear();
            store.clear()?;
            println!("Logged out");
        }
        Commands::Whoami => match auth.user() {
            Some(user) => println!("{} <{}> {}", user.username, user.email, user.role),
            None => println!("Not logged in"),
        },
        Commands::Stats => {
            let stats = client.admin_stats(&auth).await?;
            println!(
                "courses: {}\nfaculty: {}\nstaff: {}\nusers: {}",
                stats.courses, stats.faculty, stats.staff, stats.users
            );
        }
        Commands::Grid { semester, section } => {
            let query = TimetableQuery::Class(TimetableFilter::new(semester, section));
            show(&client, &config, &auth, query).await?;
        }
        Commands::Labs => {
            for lab in LAB_ROOMS {
                println!("{}", lab);
            }
        }
        Commands::Lab { venue } => {
            show(&client, &config, &auth, TimetableQuery::Lab(venue)).await?;
        }
        Commands::Export {
            semester,
            section,
            format,
        } => {
            let target = ExportTarget::Timetable(TimetableFilter::new(semester, section));
            export(&client, &config, &auth, target, format).await?;
        }
        Commands::LabExport { format, venue } => {
            export(&client, &config, &auth, ExportTarget::Lab(venue), format).await?;
        }
        Commands::StudentsExport { year, format } => {
            export(&client, &config, &auth, ExportTarget::Students(year), format).await?;
        }
        Commands::ForgotPassword { email } => {
            println!("{}", client.forgot_password(&email).await?);
        }
        Commands::VerifyEmail { token } => {
            println!("{}", client.verify_email(&token).await?);
        }
    }
    Ok(())
}

async fn show(
    client: &ApiClient,
    config: &ClientConfig,
    auth: &AuthContext,
    query: TimetableQuery,
) -> Result<()> {
    let cache = Arc::new(SnapshotCache::new(config.snapshot_ttl()));
    let mut view = TimetableView::new(client.clone(), cache, query);
    view.refresh(auth).await?;
    println!("{}", view.query());
    print!("{}", view.layout().render_text());
    Ok(())
}

async fn export(
    client: &ApiClient,
    config: &ClientConfig,
    auth: &AuthContext,
    target: ExportTarget,
    format: ExportFormat,
) -> Result<()> {
    let document = client.export(auth, &target, format).await?;
    let path = document.save_in(&config.export_dir).await?;
    println!("Saved {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_typed_arguments() {
        let cli = Cli::try_parse_from(["timetable", "grid", "III", "B"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Grid {
                semester: Semester::Third,
                section: Section::B
            }
        ));

        let cli =
            Cli::try_parse_from(["timetable", "students-export", "II", "excel"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::StudentsExport {
                year: StudentYear::Second,
                format: ExportFormat::Excel
            }
        ));
    }

    #[test]
    fn test_venue_is_one_argument() {
        let cli = Cli::try_parse_from([
            "timetable",
            "lab-export",
            "pdf",
            "DEEP LEARNING LABORATORY",
        ])
        .unwrap();
        match cli.command {
            Commands::LabExport { format, venue } => {
                assert_eq!(format, ExportFormat::Pdf);
                assert_eq!(venue, "DEEP LEARNING LABORATORY");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_values() {
        assert!(Cli::try_parse_from(["timetable", "grid", "IX", "A"]).is_err());
        assert!(Cli::try_parse_from(["timetable", "export", "I", "A", "csv"]).is_err());
        assert!(Cli::try_parse_from(["timetable", "login", "a@b.com"]).is_err());
        assert!(Cli::try_parse_from(["timetable", "frobnicate"]).is_err());
    }

    #[test]
    fn test_verbosity_selects_filter() {
        let cli = Cli::try_parse_from(["timetable", "-vv", "whoami"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(default_filter(0), "timetable=info");
        assert_eq!(default_filter(cli.verbose), "timetable=trace");
    }
}
