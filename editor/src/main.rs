mod error;
mod log_capture;
mod project;
mod session;
mod shell;

use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tessera_scene::SceneEditor;

use crate::error::{EditorError, EditorResult};
use crate::shell::Shell;

/// Tessera scene editor.
#[derive(Parser, Debug)]
#[command(
    name = "tessera",
    about = "Headless editor for Tessera scenes",
    long_about = "Edits GUI and game-object scene trees through a line-oriented shell.\n\n\
        Commands are read from stdin, or from a script with --script.\n\
        Type 'help' at the prompt for the command list.",
    version
)]
struct Args {
    /// Project configuration file.
    #[arg(long, default_value = "project.toml")]
    project: PathBuf,

    /// Scene to open at startup, overriding the project setting.
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Run commands from this file instead of stdin.
    #[arg(long)]
    script: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = log_capture::install(log_capture::DEFAULT_CAPACITY) {
        eprintln!("failed to install logger: {e}");
    }
    log::info!("Tessera v{} starting", tessera_scene::VERSION);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> EditorResult<()> {
    let config = project::load_or_default(&args.project);
    if let Some(buffer) = log_capture::log_buffer() {
        buffer.lock().set_capacity(config.editor.log_capacity);
    }

    let editor = SceneEditor::new(config.editor.max_undo);
    let mut shell = Shell::new(editor, config.project.name.clone());

    if let Some(scene) = args.scene.or_else(|| config.scene_path(&args.project)) {
        if scene.exists() {
            let message = shell.load(&scene)?;
            log::info!("{message}");
        } else {
            log::warn!("Scene {} does not exist yet, starting empty", scene.display());
        }
    }

    let out = io::stdout().lock();
    let result = match &args.script {
        Some(path) => {
            let file = File::open(path).map_err(|source| EditorError::Io {
                path: path.clone(),
                source,
            })?;
            shell.run(BufReader::new(file), out, false)
        }
        None => {
            let stdin = io::stdin();
            let interactive = stdin.is_terminal();
            shell.run(stdin.lock(), out, interactive)
        }
    };
    result.map_err(|source| EditorError::Io {
        path: args.script.unwrap_or_else(|| PathBuf::from("<stdin>")),
        source,
    })?;

    if shell.editor().has_unsaved_changes() {
        match shell.scene_path() {
            Some(path) => log::warn!("Exiting with unsaved changes to {}", path.display()),
            None => log::warn!("Exiting with an unsaved scene"),
        }
    }
    Ok(())
}
