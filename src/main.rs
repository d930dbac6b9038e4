use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use waypoint_config::PlainWorkflow;
use waypoint_workflow::{
  EngineConfig, NewState, NewTransition, ReferentialIntegrity, StatePatch, TransitionContext,
  Workflow, WorkflowEngine, format_timestamp, payment_workflow,
};

/// Waypoint - author and drive workflow state machines stored as JSON
#[derive(Parser)]
#[command(name = "waypoint")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Reject edits that reference unknown states or transitions
  #[arg(long, global = true)]
  strict: bool,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Create a new workflow file
  Init {
    workflow_file: PathBuf,

    /// Start from a predefined workflow instead of an empty one
    #[arg(long, value_enum)]
    preset: Option<Preset>,

    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
  },

  /// Print the workflow as JSON
  Show { workflow_file: PathBuf },

  /// Add a state
  AddState {
    workflow_file: PathBuf,
    #[arg(long)]
    name: String,
    #[arg(long)]
    id: Option<String>,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long)]
    color: Option<String>,
    #[arg(long)]
    initial: bool,
    #[arg(long = "final")]
    is_final: bool,
  },

  /// Patch fields of a state
  UpdateState {
    workflow_file: PathBuf,
    id: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    color: Option<String>,
    #[arg(long = "final")]
    is_final: Option<bool>,
  },

  /// Remove a state and every transition touching it
  RemoveState { workflow_file: PathBuf, id: String },

  /// Flag a state as initial and make it current
  SetInitial { workflow_file: PathBuf, id: String },

  /// Add a transition between two states
  AddTransition {
    workflow_file: PathBuf,
    #[arg(long)]
    from: String,
    #[arg(long)]
    to: String,
    #[arg(long, default_value = "")]
    condition: String,
    #[arg(long)]
    action: Option<String>,
    #[arg(long)]
    id: Option<String>,
  },

  /// Remove a transition
  RemoveTransition { workflow_file: PathBuf, id: String },

  /// List transitions leaving the current state
  Available { workflow_file: PathBuf },

  /// Move to a target state
  Go {
    workflow_file: PathBuf,
    target: String,
    #[command(flatten)]
    note: Note,
  },

  /// Fire a transition by id
  Exec {
    workflow_file: PathBuf,
    transition_id: String,
    #[command(flatten)]
    note: Note,
  },

  /// Print the execution history
  History { workflow_file: PathBuf },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Preset {
  Payment,
}

#[derive(clap::Args)]
struct Note {
  /// Who performed the transition
  #[arg(long)]
  operator: Option<String>,

  /// Free-text comment recorded in the history
  #[arg(long)]
  comment: Option<String>,
}

impl From<Note> for TransitionContext {
  fn from(note: Note) -> Self {
    TransitionContext {
      operator: note.operator,
      comment: note.comment,
      transition_id: None,
    }
  }
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let integrity = if cli.strict {
    ReferentialIntegrity::Strict
  } else {
    ReferentialIntegrity::Lenient
  };
  let engine = WorkflowEngine::new(EngineConfig { integrity });

  match cli.command {
    Some(command) => run(&engine, command),
    None => {
      println!("waypoint - use --help to see available commands");
      Ok(())
    }
  }
}

fn run(engine: &WorkflowEngine, command: Commands) -> Result<()> {
  match command {
    Commands::Init {
      workflow_file,
      preset,
      force,
    } => {
      if workflow_file.exists() && !force {
        bail!(
          "workflow file already exists: {} (use --force to overwrite)",
          workflow_file.display()
        );
      }
      let workflow = match preset {
        Some(Preset::Payment) => payment_workflow(engine.now()),
        None => Workflow::empty(),
      };
      write_workflow(&workflow_file, &workflow)?;
      eprintln!("Created workflow: {}", workflow_file.display());
    }

    Commands::Show { workflow_file } => {
      let workflow = read_workflow(&workflow_file)?;
      println!("{}", workflow.to_json()?);
    }

    Commands::AddState {
      workflow_file,
      name,
      id,
      description,
      color,
      initial,
      is_final,
    } => {
      let workflow = read_workflow(&workflow_file)?;
      let workflow = engine.add_state(
        &workflow,
        NewState {
          id,
          name,
          description,
          is_initial: initial,
          is_final,
          color,
        },
      );
      if let Some(state) = workflow.states().all().last() {
        eprintln!("Added state: {} ({})", state.name, state.id);
      }
      write_workflow(&workflow_file, &workflow)?;
    }

    Commands::UpdateState {
      workflow_file,
      id,
      name,
      description,
      color,
      is_final,
    } => {
      let workflow = read_workflow(&workflow_file)?;
      let patch = StatePatch {
        name,
        description,
        is_initial: None,
        is_final,
        color,
      };
      let workflow = engine
        .update_state(&workflow, &id, &patch)
        .with_context(|| format!("failed to update state '{}'", id))?;
      write_workflow(&workflow_file, &workflow)?;
    }

    Commands::RemoveState { workflow_file, id } => {
      let workflow = read_workflow(&workflow_file)?;
      let workflow = engine
        .remove_state(&workflow, &id)
        .with_context(|| format!("failed to remove state '{}'", id))?;
      write_workflow(&workflow_file, &workflow)?;
    }

    Commands::SetInitial { workflow_file, id } => {
      let workflow = read_workflow(&workflow_file)?;
      let workflow = engine
        .set_initial_state(&workflow, &id)
        .with_context(|| format!("failed to set initial state '{}'", id))?;
      write_workflow(&workflow_file, &workflow)?;
    }

    Commands::AddTransition {
      workflow_file,
      from,
      to,
      condition,
      action,
      id,
    } => {
      let workflow = read_workflow(&workflow_file)?;
      let workflow = engine
        .add_transition(
          &workflow,
          NewTransition {
            id,
            from,
            to,
            condition,
            action,
          },
        )
        .context("failed to add transition")?;
      if let Some(transition) = workflow.transitions().all().last() {
        eprintln!(
          "Added transition: {} -> {} ({})",
          transition.from, transition.to, transition.id
        );
      }
      write_workflow(&workflow_file, &workflow)?;
    }

    Commands::RemoveTransition { workflow_file, id } => {
      let workflow = read_workflow(&workflow_file)?;
      let workflow = engine
        .remove_transition(&workflow, &id)
        .with_context(|| format!("failed to remove transition '{}'", id))?;
      write_workflow(&workflow_file, &workflow)?;
    }

    Commands::Available { workflow_file } => {
      let workflow = read_workflow(&workflow_file)?;
      eprintln!(
        "Current state: {} ({})",
        workflow.state_name(workflow.current_state_id()),
        workflow.current_state_id()
      );
      if workflow.is_final_state() {
        eprintln!("Current state is final");
      }
      for transition in workflow.available_transitions() {
        println!(
          "{}\t{} -> {}\t{}",
          transition.id,
          workflow.state_name(&transition.from),
          workflow.state_name(&transition.to),
          transition.condition
        );
      }
    }

    Commands::Go {
      workflow_file,
      target,
      note,
    } => {
      let workflow = read_workflow(&workflow_file)?;
      let workflow = engine
        .transition_to(&workflow, &target, note.into())
        .with_context(|| format!("failed to move to '{}'", target))?;
      eprintln!("Now in: {}", workflow.state_name(workflow.current_state_id()));
      write_workflow(&workflow_file, &workflow)?;
    }

    Commands::Exec {
      workflow_file,
      transition_id,
      note,
    } => {
      let workflow = read_workflow(&workflow_file)?;
      let workflow = engine
        .execute_transition(&workflow, &transition_id, note.into())
        .with_context(|| format!("failed to execute transition '{}'", transition_id))?;
      eprintln!("Now in: {}", workflow.state_name(workflow.current_state_id()));
      write_workflow(&workflow_file, &workflow)?;
    }

    Commands::History { workflow_file } => {
      let workflow = read_workflow(&workflow_file)?;
      for entry in workflow.history() {
        println!(
          "{}\t{}\t{}\t{}",
          format_timestamp(&entry.timestamp),
          entry.state_name,
          entry.operator.as_deref().unwrap_or("-"),
          entry.comment.as_deref().unwrap_or("")
        );
      }
    }
  }

  Ok(())
}

fn read_workflow(path: &Path) -> Result<Workflow> {
  let content = std::fs::read_to_string(path)
    .with_context(|| format!("failed to read workflow file: {}", path.display()))?;

  let plain: PlainWorkflow = serde_json::from_str(&content)
    .with_context(|| format!("failed to parse workflow file: {}", path.display()))?;

  let workflow = Workflow::from_plain(plain)
    .with_context(|| format!("invalid workflow file: {}", path.display()))?;

  debug!(
    path = %path.display(),
    states = workflow.states().len(),
    current = %workflow.current_state_id(),
    "loaded workflow"
  );
  Ok(workflow)
}

fn write_workflow(path: &Path, workflow: &Workflow) -> Result<()> {
  let json = workflow.to_json()?;
  std::fs::write(path, json)
    .with_context(|| format!("failed to write workflow file: {}", path.display()))?;

  debug!(
    path = %path.display(),
    history = workflow.history().len(),
    "saved workflow"
  );
  Ok(())
}
