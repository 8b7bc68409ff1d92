//! Line-oriented command shell driving a [`SceneEditor`].
//!
//! Nodes are addressed by numeric id or by path (`:/level/hero`). Most
//! editing commands act on the current selection.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use tessera_core::math::Vec3;
use tessera_scene::serializer::read_scene_file;
use tessera_scene::{NodeId, NodeKind, SceneEditor};

use crate::error::{EditorError, EditorResult};
use crate::log_capture;
use crate::session;

const HELP: &str = "\
commands:
  create <kind> [name]          create a node at the root
  child <parent> <command>      run create or paste under <parent>
  select [node...|all]          replace the selection (empty clears)
  move <target|root> [before]   move the selection into or before <target>
  rename <node> <name>          rename a node
  visible <node> <on|off>       show or hide a node
  pos <node> <x> <y> [z]        set the local position
  copy | cut | paste            clipboard
  paste-child <parent>          paste under <parent>
  dup | delete                  duplicate or delete the selection
  undo | redo                   step through the history
  begin <description> | end     group edits into one undo step
  tree | history | path <node>  inspect
  save [file] | load <file>     scene files
  import <file> [name]          load a scene under a new container
  log [n|clear]                 recent log lines
  quit";

/// Result of one shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue(String),
    Quit,
}

pub struct Shell {
    editor: SceneEditor,
    project_name: String,
    scene_path: Option<PathBuf>,
}

impl Shell {
    pub fn new(editor: SceneEditor, project_name: impl Into<String>) -> Self {
        Self {
            editor,
            project_name: project_name.into(),
            scene_path: None,
        }
    }

    pub fn editor(&self) -> &SceneEditor {
        &self.editor
    }

    pub fn scene_path(&self) -> Option<&Path> {
        self.scene_path.as_deref()
    }

    /// Prompt with a `*` while there are unsaved changes.
    pub fn prompt(&self) -> String {
        let dirty = if self.editor.has_unsaved_changes() { "*" } else { "" };
        format!("{}{dirty}> ", self.project_name)
    }

    /// Runs commands from `input` until it ends or `quit` is read.
    ///
    /// Command errors are printed and logged; only I/O failures on `out`
    /// stop the loop.
    pub fn run(&mut self, input: impl BufRead, mut out: impl Write, interactive: bool) -> std::io::Result<()> {
        if interactive {
            write!(out, "{}", self.prompt())?;
            out.flush()?;
        }
        for line in input.lines() {
            let line = line?;
            match self.execute(&line) {
                Ok(Outcome::Quit) => break,
                Ok(Outcome::Continue(text)) => {
                    if !text.is_empty() {
                        writeln!(out, "{text}")?;
                    }
                }
                Err(e) => {
                    log::warn!("{}: {e}", line.trim());
                    writeln!(out, "error: {e}")?;
                }
            }
            if interactive {
                write!(out, "{}", self.prompt())?;
                out.flush()?;
            }
        }
        Ok(())
    }

    /// Executes one command line. Blank lines and `#` comments do nothing.
    pub fn execute(&mut self, line: &str) -> EditorResult<Outcome> {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.first() {
            None => Ok(Outcome::Continue(String::new())),
            Some(w) if w.starts_with('#') => Ok(Outcome::Continue(String::new())),
            Some(&"quit") | Some(&"exit") => Ok(Outcome::Quit),
            Some(_) => self.dispatch(&words, None).map(Outcome::Continue),
        }
    }

    fn dispatch(&mut self, words: &[&str], parent: Option<NodeId>) -> EditorResult<String> {
        let (command, args) = match words.split_first() {
            Some((c, a)) => (*c, a),
            None => return Err(EditorError::usage("missing command")),
        };
        if parent.is_some() && !matches!(command, "create" | "paste") {
            return Err(EditorError::usage(format!("'child' does not apply to '{command}'")));
        }
        match command {
            "help" => Ok(HELP.to_string()),
            "child" => {
                let (target, rest) = args
                    .split_first()
                    .ok_or_else(|| EditorError::usage("child <parent> <command>"))?;
                let target = self.node(target)?;
                self.dispatch(rest, Some(target))
            }
            "create" => self.create(args, parent),
            "select" => self.select(args),
            "move" => self.move_selection(args),
            "rename" => {
                let (node, name) = args
                    .split_first()
                    .filter(|(_, name)| !name.is_empty())
                    .ok_or_else(|| EditorError::usage("rename <node> <name>"))?;
                let id = self.node(node)?;
                check(self.editor.rename(id, &name.join(" ")), "rename failed")
            }
            "visible" => {
                let [node, state] = args else {
                    return Err(EditorError::usage("visible <node> <on|off>"));
                };
                let visible = match *state {
                    "on" | "true" => true,
                    "off" | "false" => false,
                    other => return Err(EditorError::usage(format!("expected on or off, got '{other}'"))),
                };
                let id = self.node(node)?;
                check(self.editor.set_visible(&[id], visible), "visibility change failed")
            }
            "pos" => self.set_position(args),
            "copy" => Ok(format!("copied {}", self.editor.copy())),
            "cut" => Ok(format!("cut {}", self.editor.cut())),
            "paste" => {
                let pasted = match parent {
                    Some(p) => self.editor.paste_as_child(p),
                    None => self.editor.paste(),
                };
                Ok(format!("pasted {}", ids(&pasted)))
            }
            "paste-child" => {
                let [target] = args else {
                    return Err(EditorError::usage("paste-child <parent>"));
                };
                let target = self.node(target)?;
                Ok(format!("pasted {}", ids(&self.editor.paste_as_child(target))))
            }
            "dup" => Ok(format!("duplicated {}", ids(&self.editor.duplicate()))),
            "delete" => Ok(format!("deleted {}", self.editor.delete_selected())),
            "undo" => {
                let description = self.editor.history().undo_descriptions().next().map(str::to_owned);
                self.editor.undo()?;
                Ok(format!("undid {}", description.unwrap_or_default()))
            }
            "redo" => {
                let description = self.editor.history().redo_descriptions().next().map(str::to_owned);
                self.editor.redo()?;
                Ok(format!("redid {}", description.unwrap_or_default()))
            }
            "begin" => {
                let description = if args.is_empty() { "Group".to_string() } else { args.join(" ") };
                self.editor.begin_group(&description);
                Ok(String::new())
            }
            "end" => check(self.editor.end_group(), "no group recorded"),
            "tree" => Ok(self.editor.store().debug_graph()),
            "history" => Ok(self.history()),
            "path" => {
                let [node] = args else {
                    return Err(EditorError::usage("path <node>"));
                };
                let id = self.node(node)?;
                Ok(self.editor.store().path_of(id).unwrap_or_default().to_string())
            }
            "save" => self.save(args),
            "load" => {
                let [file] = args else {
                    return Err(EditorError::usage("load <file>"));
                };
                self.load(Path::new(file))
            }
            "import" => self.import(args),
            "log" => {
                let Some(buffer) = log_capture::log_buffer() else {
                    return Ok(String::new());
                };
                let n = match args.first() {
                    Some(&"clear") => {
                        buffer.lock().clear();
                        return Ok(String::new());
                    }
                    Some(n) => parse(n)?,
                    None => 20,
                };
                let lines = buffer.lock().recent(n);
                Ok(lines.join("\n"))
            }
            other => Err(EditorError::usage(format!("unknown command '{other}', try 'help'"))),
        }
    }

    /// Resolves a node argument: a path starting with `:/` or a numeric id.
    fn node(&self, arg: &str) -> EditorResult<NodeId> {
        let store = self.editor.store();
        let found = if arg.starts_with(tessera_scene::PATH_ROOT) {
            store.get_by_path(arg).map(|n| n.id())
        } else {
            let id = NodeId(parse(arg)?);
            store.contains(id).then_some(id)
        };
        found.ok_or_else(|| EditorError::usage(format!("no node '{arg}'")))
    }

    fn create(&mut self, args: &[&str], parent: Option<NodeId>) -> EditorResult<String> {
        let (kind, name) = args
            .split_first()
            .ok_or_else(|| EditorError::usage("create <kind> [name]"))?;
        let kind: NodeKind = kind.parse()?;
        let id = if name.is_empty() {
            self.editor.create(kind, Default::default(), parent)
        } else {
            self.editor.create_named(kind, Default::default(), parent, &name.join(" "))
        }
        .ok_or_else(|| EditorError::usage(format!("cannot create {kind} here")))?;
        let name = self.editor.store().get(id).map(|n| n.name().to_string()).unwrap_or_default();
        Ok(format!("created {id} {name}"))
    }

    fn select(&mut self, args: &[&str]) -> EditorResult<String> {
        if args == ["all"] {
            let store = self.editor.store().walk();
            self.editor.selection_mut().set_selected(&store);
        } else {
            let selected = args.iter().map(|a| self.node(a)).collect::<EditorResult<Vec<_>>>()?;
            self.editor.selection_mut().set_selected(&selected);
        }
        Ok(format!("selected {}", ids(self.editor.selection().selected())))
    }

    fn move_selection(&mut self, args: &[&str]) -> EditorResult<String> {
        let (target, as_child) = match args {
            ["root"] => (None, true),
            [target] => (Some(self.node(target)?), true),
            [target, "before"] => (Some(self.node(target)?), false),
            _ => return Err(EditorError::usage("move <target|root> [before]")),
        };
        let selected = self.editor.selection().selected().to_vec();
        check(self.editor.move_nodes(&selected, target, as_child), "move rejected")
    }

    fn set_position(&mut self, args: &[&str]) -> EditorResult<String> {
        let (node, coords) = match args {
            [node, x, y] => (node, [*x, *y, "0"]),
            [node, x, y, z] => (node, [*x, *y, *z]),
            _ => return Err(EditorError::usage("pos <node> <x> <y> [z]")),
        };
        let id = self.node(node)?;
        let [x, y, z]: [f32; 3] = [parse(coords[0])?, parse(coords[1])?, parse(coords[2])?];
        check(self.editor.set_position(id, Vec3::new(x, y, z)), "position change failed")
    }

    fn history(&self) -> String {
        let history = self.editor.history();
        let mut lines: Vec<String> = history.redo_descriptions().map(|d| format!("  (redo) {d}")).collect();
        lines.reverse();
        lines.extend(history.undo_descriptions().map(|d| format!("  {d}")));
        if lines.is_empty() {
            return "history is empty".to_string();
        }
        lines.join("\n")
    }

    fn save(&mut self, args: &[&str]) -> EditorResult<String> {
        let path = match args {
            [file] => PathBuf::from(file),
            [] => self
                .scene_path
                .clone()
                .ok_or_else(|| EditorError::usage("no scene file yet, use 'save <file>'"))?,
            _ => return Err(EditorError::usage("save [file]")),
        };
        self.editor.store().save_scene_file(&path)?;
        session::save_session(self.editor.store(), &path)?;
        self.editor.mark_saved();
        log::info!("Saved scene to {}", path.display());
        let message = format!("saved {}", path.display());
        self.scene_path = Some(path);
        Ok(message)
    }

    /// Replaces the scene with `path` and restores its session sidecar.
    pub fn load(&mut self, path: &Path) -> EditorResult<String> {
        let scene = read_scene_file(path)?;
        self.editor.load_scene(&scene);
        session::load_session(self.editor.store_mut(), path)?;
        self.scene_path = Some(path.to_path_buf());
        Ok(format!("loaded {} ({} nodes)", path.display(), self.editor.store().len()))
    }

    fn import(&mut self, args: &[&str]) -> EditorResult<String> {
        let (file, name) = match args {
            [file] => (*file, None),
            [file, name @ ..] => (*file, Some(name.join(" "))),
            _ => return Err(EditorError::usage("import <file> [name]")),
        };
        let path = Path::new(file);
        let scene = read_scene_file(path)?;
        let name = name
            .or_else(|| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "imported".to_string());
        let id = self
            .editor
            .import_scene(&scene, &name)
            .ok_or_else(|| EditorError::usage(format!("cannot import {file}: ids out of range")))?;
        Ok(format!("imported {id} {name}"))
    }
}

fn parse<T: std::str::FromStr>(arg: &str) -> EditorResult<T> {
    arg.parse()
        .map_err(|_| EditorError::usage(format!("invalid number '{arg}'")))
}

fn check(ok: bool, message: &str) -> EditorResult<String> {
    if ok { Ok(String::new()) } else { Err(EditorError::usage(message)) }
}

fn ids(ids: &[NodeId]) -> String {
    let list: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    format!("[{}]", list.join(", "))
}
