use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use workboard::client::DocumentClient;
use workboard::config::Config;
use workboard::models::*;
use workboard::view::{self, SortMode, ViewMode, ViewQuery};
use workboard::{api, import};

#[derive(Parser)]
#[command(name = "workboard")]
#[command(about = "Release and feature-area work tracker with CSV import")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the document store server
    Serve {
        /// Port for HTTP API (default: WORKBOARD_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Replace the whole board with the contents of a CSV export
    Import {
        /// CSV file to import
        file: PathBuf,

        /// Parse and report without saving
        #[arg(long)]
        dry_run: bool,
    },
    /// Show tasks
    List {
        /// all, byFeatureArea or byRelease
        #[arg(long, default_value = "all")]
        view: ViewMode,

        /// releaseDate or featureArea
        #[arg(long, default_value = "releaseDate")]
        sort: SortMode,

        /// Release or feature area id to filter on (with a by* view)
        #[arg(long)]
        filter: Option<String>,
    },
    /// Show releases, by date
    Releases,
    /// Show feature areas, by name
    Areas,
    /// Print the board as JSON or CSV
    Export {
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete everything on the board
    Clear {
        /// Confirm; the board cannot be recovered afterwards
        #[arg(long)]
        yes: bool,
    },
    /// Create, edit or delete a task
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },
    /// Create, edit or delete a release
    Release {
        #[command(subcommand)]
        action: ReleaseAction,
    },
    /// Create, edit or delete a feature area
    Area {
        #[command(subcommand)]
        action: AreaAction,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Json,
    Csv,
}

#[derive(Subcommand)]
enum TaskAction {
    /// Create a task, or edit it when --id is given
    Upsert {
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        name: Option<String>,
        /// "Not Started", "In Progress", "Complete" or any other column name
        #[arg(long)]
        status: Option<String>,
        /// Release id ("" to unassign)
        #[arg(long)]
        release: Option<String>,
        /// Feature area id ("" to unassign)
        #[arg(long)]
        area: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Open subtask (repeatable); replaces the subtask list
        #[arg(long = "subtask")]
        subtasks: Vec<String>,
        /// Completed subtask (repeatable); replaces the subtask list
        #[arg(long = "done-subtask")]
        done_subtasks: Vec<String>,
    },
    /// Delete a task and its subtasks
    Delete { id: String },
}

#[derive(Subcommand)]
enum ReleaseAction {
    /// Create a release, or edit it when --id is given
    Upsert {
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        name: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
        /// YYYY-MM
        #[arg(long)]
        launch_month: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a release (tasks follow WORKBOARD_DELETE_POLICY)
    Delete { id: String },
}

#[derive(Subcommand)]
enum AreaAction {
    /// Create a feature area, or edit it when --id is given
    Upsert {
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a feature area (tasks follow WORKBOARD_DELETE_POLICY)
    Delete { id: String },
}

/// Initialize tracing with output to stderr (for CLI commands) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "workboard=debug,tower_http=debug".into()),
    );

    if use_stderr {
        // CLI mode: log to stderr so stdout is clean for listings and exports
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn serve(config: &Config, port: u16) -> anyhow::Result<()> {
    let store = config.store()?;
    tracing::info!("Storing board at {}", store.path().display());

    let app = api::create_router(store);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("Workboard server listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Load the board for editing. Unlike [`DocumentClient::load`], a failed load
/// aborts: saving an empty fallback would wipe the stored board.
async fn load_for_edit(client: &DocumentClient) -> anyhow::Result<Document> {
    client
        .try_load()
        .await
        .with_context(|| format!("Failed to load data from {}", client.base_url()))
}

async fn save(client: &DocumentClient, document: &Document) -> anyhow::Result<()> {
    client.save(document).await.with_context(|| {
        format!(
            "Failed to save data to {}. Please check if the server is running",
            client.base_url()
        )
    })
}

fn subtask_inputs(open: Vec<String>, done: Vec<String>) -> Option<Vec<SubtaskInput>> {
    if open.is_empty() && done.is_empty() {
        return None;
    }
    let open = open.into_iter().map(|name| SubtaskInput { name, done: false });
    let done = done.into_iter().map(|name| SubtaskInput { name, done: true });
    Some(open.chain(done).collect())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Server logs go to stdout; CLI commands keep stdout for their output
    let is_server = matches!(cli.command, None | Some(Commands::Serve { .. }));
    init_tracing(!is_server);

    let config = Config::from_env();

    let client = DocumentClient::new(config.server_url.clone());

    match cli.command {
        Some(Commands::Serve { port }) => {
            let port = port.unwrap_or(config.port);
            tracing::info!("Starting Workboard server on port {}", port);
            serve(&config, port).await?;
        }
        None => {
            // Default: start server
            tracing::info!("Starting Workboard server on port {}", config.port);
            serve(&config, config.port).await?;
        }
        Some(Commands::Import { file, dry_run }) => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let document = import::import_csv(&text)?;
            if document.tasks.is_empty() {
                anyhow::bail!(
                    "No rows with a Name in {}; the board was left unchanged",
                    file.display()
                );
            }
            if !dry_run {
                save(&client, &document).await?;
            }
            println!(
                "CSV Imported Successfully! {} release(s), {} feature area(s), {} task(s){}",
                document.releases.len(),
                document.feature_areas.len(),
                document.task_count(),
                if dry_run { " (dry run, not saved)" } else { "" }
            );
        }
        Some(Commands::List { view, sort, filter }) => {
            let document = client.load().await;
            let query = ViewQuery::new(view, sort, filter);
            let projected = view::project(&document, &query);
            print!("{}", view::render_view(&document, &projected));
        }
        Some(Commands::Releases) => {
            let document = client.load().await;
            print!("{}", view::render_releases(&document));
        }
        Some(Commands::Areas) => {
            let document = client.load().await;
            print!("{}", view::render_feature_areas(&document));
        }
        Some(Commands::Export { format, output }) => {
            let document = client.load().await;
            let content = match format {
                ExportFormat::Json => serde_json::to_string_pretty(&document)?,
                ExportFormat::Csv => import::export_csv(&document)?,
            };
            match output {
                Some(path) => std::fs::write(&path, content)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => println!("{}", content.trim_end()),
            }
        }
        Some(Commands::Clear { yes }) => {
            if !yes {
                anyhow::bail!("Refusing to clear the board without --yes");
            }
            let mut document = client.load().await;
            document.clear();
            save(&client, &document).await?;
            println!("Cleared all data");
        }
        Some(Commands::Task { action }) => {
            let mut document = load_for_edit(&client).await?;
            match action {
                TaskAction::Upsert {
                    id,
                    name,
                    status,
                    release,
                    area,
                    due,
                    assignee,
                    notes,
                    subtasks,
                    done_subtasks,
                } => {
                    let id = document.upsert_task(TaskInput {
                        id,
                        name,
                        status,
                        release_id: release,
                        feature_area_id: area,
                        due_date: due,
                        assignee,
                        notes,
                        subtasks: subtask_inputs(subtasks, done_subtasks),
                    })?;
                    save(&client, &document).await?;
                    println!("Saved task {}", id);
                }
                TaskAction::Delete { id } => {
                    let removed = document.delete_task(&id)?;
                    save(&client, &document).await?;
                    println!("Deleted {} task(s)", removed);
                }
            }
        }
        Some(Commands::Release { action }) => {
            let mut document = load_for_edit(&client).await?;
            match action {
                ReleaseAction::Upsert {
                    id,
                    name,
                    date,
                    launch_month,
                    color,
                } => {
                    let id = document.upsert_release(ReleaseInput {
                        id,
                        name,
                        date,
                        launch_month,
                        color,
                    })?;
                    save(&client, &document).await?;
                    println!("Saved release {}", id);
                }
                ReleaseAction::Delete { id } => {
                    let report = document.delete_release(&id, config.delete_policy)?;
                    save(&client, &document).await?;
                    println!(
                        "Deleted release {} ({} task(s) removed, {} unassigned)",
                        id, report.tasks_removed, report.tasks_unassigned
                    );
                }
            }
        }
        Some(Commands::Area { action }) => {
            let mut document = load_for_edit(&client).await?;
            match action {
                AreaAction::Upsert { id, name, color } => {
                    let id = document.upsert_feature_area(FeatureAreaInput { id, name, color })?;
                    save(&client, &document).await?;
                    println!("Saved feature area {}", id);
                }
                AreaAction::Delete { id } => {
                    let report = document.delete_feature_area(&id, config.delete_policy)?;
                    save(&client, &document).await?;
                    println!(
                        "Deleted feature area {} ({} task(s) removed, {} unassigned)",
                        id, report.tasks_removed, report.tasks_unassigned
                    );
                }
            }
        }
    }

    Ok(())
}
