use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coursepath::db::Database;
use coursepath::models::*;
use coursepath::{render, Container, Engine, EngineConfig};

#[derive(Parser)]
#[command(name = "cpath")]
#[command(about = "Course structure and learning-path sequencing")]
struct Cli {
    /// Database file (defaults to COURSEPATH_DB or the platform data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Deepest allowed item depth (defaults to COURSEPATH_MAX_DEPTH or 10)
    #[arg(long, global = true)]
    max_depth: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage courses
    #[command(subcommand)]
    Course(CourseCommand),
    /// Publish and inspect snapshots
    #[command(subcommand)]
    Snapshot(SnapshotCommand),
    /// Manage folders
    #[command(subcommand)]
    Folder(FolderCommand),
    /// Manage leaf items
    #[command(subcommand)]
    Item(ItemCommand),
    /// Print the item hierarchy
    Tree {
        #[command(flatten)]
        target: Target,
        /// Print JSON instead of an ASCII tree
        #[arg(long)]
        json: bool,
    },
    /// Inspect and edit the learning path
    #[command(subcommand)]
    Path(PathCommand),
}

#[derive(Subcommand)]
enum CourseCommand {
    Create { title: String },
    List,
}

#[derive(Subcommand)]
enum SnapshotCommand {
    /// Copy the course's current structure into a new draft snapshot
    Create {
        #[arg(long)]
        course: i64,
    },
    List {
        #[arg(long)]
        course: i64,
    },
    /// Set a snapshot's status (draft, active, completed, archived)
    Status {
        id: i64,
        #[arg(value_parser = parse_status)]
        status: SnapshotStatus,
    },
}

#[derive(Subcommand)]
enum FolderCommand {
    Add {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        parent: Option<i64>,
        name: String,
    },
}

#[derive(Subcommand)]
enum ItemCommand {
    Add {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        parent: Option<i64>,
        /// Id of the learning content this leaf points at
        #[arg(long)]
        payload: i64,
        name: String,
    },
    Rename {
        #[command(flatten)]
        target: Target,
        id: i64,
        name: String,
    },
    Relink {
        #[command(flatten)]
        target: Target,
        id: i64,
        payload: i64,
    },
    /// Move an item under another folder, or to the root without --parent
    Move {
        #[command(flatten)]
        target: Target,
        id: i64,
        #[arg(long)]
        parent: Option<i64>,
    },
    /// Delete an item, its descendants and every relation touching them
    Delete {
        #[command(flatten)]
        target: Target,
        id: i64,
    },
}

#[derive(Subcommand)]
enum PathCommand {
    Show {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        json: bool,
    },
    /// Rebuild the path from tree order
    Auto {
        #[command(flatten)]
        target: Target,
    },
    /// Make an item the first one in the path
    Start {
        #[command(flatten)]
        target: Target,
        item: i64,
    },
    /// Add one edge; omit --from to add the start edge
    Link {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        from: Option<i64>,
        #[arg(long)]
        to: i64,
    },
    /// Replace the whole path. Edges are FROM:TO, with `start:TO` for the start edge
    Replace {
        #[command(flatten)]
        target: Target,
        #[arg(value_parser = parse_edge, required = true)]
        edges: Vec<RelationInput>,
    },
    Unlink {
        #[command(flatten)]
        target: Target,
        relation: i64,
    },
}

/// Which container a structure command works on.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct Target {
    #[arg(long)]
    course: Option<i64>,
    #[arg(long)]
    snapshot: Option<i64>,
}

fn parse_status(s: &str) -> Result<SnapshotStatus, String> {
    SnapshotStatus::from_str(s).ok_or_else(|| format!("unknown snapshot status: {}", s))
}

fn parse_edge(s: &str) -> Result<RelationInput, String> {
    let (from, to) = s
        .split_once(':')
        .ok_or_else(|| format!("expected FROM:TO, got {}", s))?;
    let to: i64 = to
        .parse()
        .map_err(|_| format!("invalid target item id: {}", to))?;
    match from {
        "start" | "" => Ok(RelationInput::start(to)),
        from => {
            let from: i64 = from
                .parse()
                .map_err(|_| format!("invalid source item id: {}", from))?;
            Ok(RelationInput::link(from, to))
        }
    }
}

/// Initialize tracing on stderr so stdout carries only command output
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "coursepath=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn resolve(engine: &Engine, target: &Target) -> anyhow::Result<Box<dyn Container>> {
    match (target.course, target.snapshot) {
        (Some(id), _) => Ok(Box::new(engine.course(id)?)),
        (None, Some(id)) => Ok(Box::new(engine.snapshot(id)?)),
        (None, None) => anyhow::bail!("either --course or --snapshot is required"),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = EngineConfig::from_env();
    if let Some(max_depth) = cli.max_depth {
        config = config.with_max_depth(max_depth);
    }
    if let Some(path) = cli.db {
        config.database_path = Some(path);
    }

    let db = match &config.database_path {
        Some(path) => Database::open(path.clone())?,
        None => Database::open_default()?,
    };
    db.migrate()?;

    let engine = Engine::new(db, config);

    match cli.command {
        Commands::Course(CourseCommand::Create { title }) => {
            print_json(&engine.create_course(CreateCourseInput { title })?)?;
        }
        Commands::Course(CourseCommand::List) => {
            print_json(&engine.list_courses()?)?;
        }
        Commands::Snapshot(SnapshotCommand::Create { course }) => {
            let course = engine.course(course)?;
            print_json(&engine.create_snapshot(&course)?)?;
        }
        Commands::Snapshot(SnapshotCommand::List { course }) => {
            print_json(&engine.list_snapshots(course)?)?;
        }
        Commands::Snapshot(SnapshotCommand::Status { id, status }) => {
            print_json(&engine.set_snapshot_status(id, status)?)?;
        }
        Commands::Folder(FolderCommand::Add {
            target,
            parent,
            name,
        }) => {
            let container = resolve(&engine, &target)?;
            let folder = engine.create_folder(
                &*container,
                CreateFolderInput {
                    parent_id: parent,
                    name,
                },
            )?;
            print_json(&folder)?;
        }
        Commands::Item(command) => run_item(&engine, command)?,
        Commands::Tree { target, json } => {
            let container = resolve(&engine, &target)?;
            let hierarchy = engine.hierarchy(&*container)?;
            if json {
                print_json(&hierarchy)?;
            } else {
                print!("{}", render::render_hierarchy(&hierarchy));
            }
        }
        Commands::Path(command) => run_path(&engine, command)?,
    }

    Ok(())
}

fn run_item(engine: &Engine, command: ItemCommand) -> anyhow::Result<()> {
    match command {
        ItemCommand::Add {
            target,
            parent,
            payload,
            name,
        } => {
            let container = resolve(engine, &target)?;
            let item = engine.create_item(
                &*container,
                CreateItemInput {
                    parent_id: parent,
                    name,
                    leaf_payload_ref: payload,
                },
            )?;
            print_json(&item)
        }
        ItemCommand::Rename { target, id, name } => {
            let container = resolve(engine, &target)?;
            print_json(&engine.rename_item(&*container, id, &name)?)
        }
        ItemCommand::Relink {
            target,
            id,
            payload,
        } => {
            let container = resolve(engine, &target)?;
            print_json(&engine.relink_payload(&*container, id, payload)?)
        }
        ItemCommand::Move { target, id, parent } => {
            let container = resolve(engine, &target)?;
            print_json(&engine.move_item(&*container, id, parent)?)
        }
        ItemCommand::Delete { target, id } => {
            let container = resolve(engine, &target)?;
            print_json(&engine.delete_item(&*container, id)?)
        }
    }
}

fn run_path(engine: &Engine, command: PathCommand) -> anyhow::Result<()> {
    match command {
        PathCommand::Show { target, json } => {
            let container = resolve(engine, &target)?;
            let path = engine.relations(&*container)?;
            if json {
                print_json(&path)
            } else {
                print!("{}", render::render_path(&path));
                Ok(())
            }
        }
        PathCommand::Auto { target } => {
            let container = resolve(engine, &target)?;
            print_json(&engine.create_auto_relations(&*container)?)
        }
        PathCommand::Start { target, item } => {
            let container = resolve(engine, &target)?;
            print_json(&engine.set_start_item(&*container, item)?)
        }
        PathCommand::Link { target, from, to } => {
            let container = resolve(engine, &target)?;
            let edge = RelationInput {
                from_item_id: from,
                to_item_id: to,
            };
            print_json(&engine.create_relation(&*container, edge)?)
        }
        PathCommand::Replace { target, edges } => {
            let container = resolve(engine, &target)?;
            print_json(&engine.update_relations(&*container, &edges)?)
        }
        PathCommand::Unlink { target, relation } => {
            let container = resolve(engine, &target)?;
            engine.delete_relation(&*container, relation)?;
            println!("Deleted relation {}", relation);
            Ok(())
        }
    }
}
