//! Command-line front end.
//!
//! Every editing command opens the named design from the local store,
//! applies one change, and writes it back. `push` and `pull` move a design
//! between the local store and the remote service.

use crate::editor::{Editor, EditorError};
use clap::{Args, Parser, Subcommand};
use easel_core::config::PersistenceConfig;
use easel_core::document::DocumentError;
use easel_core::persistence::Persistence;
use easel_core::shapes::{FontWeight, SerializableColor, ShapeKind, ShapeParams, TextStyle};
use easel_core::storage::{FileStore, LocalStorage, RemoteStorage, StorageError};
use easel_render::{ImageFormat, RasterRenderer};
use kurbo::{BezPath, Point};
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Parser)]
#[command(
    name = "easel",
    version,
    about = "Draw on a canvas and keep designs locally or on a server"
)]
pub struct Cli {
    /// Design to work on (defaults to "myCanvas").
    #[arg(long, short, env = "EASEL_DEFAULT_NAME", global = true)]
    pub name: Option<String>,

    /// Directory for local designs.
    #[arg(long, env = "EASEL_STORE_DIR", global = true)]
    pub store_dir: Option<PathBuf>,

    /// Remote service base URL.
    #[arg(long, env = "EASEL_BASE_URL", global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a shape: rect, circle, ellipse, triangle, line, polyline, polygon or path.
    Add {
        kind: ShapeKind,
        #[command(flatten)]
        shape: ShapeArgs,
    },
    /// Add a text object.
    Text {
        content: String,
        #[command(flatten)]
        style: TextArgs,
    },
    /// Change a text property (fontFamily, fontSize, fontWeight, fill) of an object.
    Restyle {
        index: usize,
        property: String,
        value: String,
    },
    /// Remove an object.
    Remove { index: usize },
    /// Remove every object.
    Clear,
    /// Print the objects of the design.
    Show {
        /// Print the stored JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },
    /// List stored designs.
    List {
        #[arg(long)]
        remote: bool,
    },
    /// Delete a stored design.
    Delete {
        #[arg(long)]
        remote: bool,
    },
    /// Render the design to an image file.
    Export {
        #[arg(long, short, default_value = "png")]
        format: ImageFormat,
        /// Output file (defaults to `<name>.<ext>`).
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Upload the local design to the server.
    Push,
    /// Replace the local design with the server's copy.
    Pull,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ShapeArgs {
    #[arg(long)]
    pub left: Option<f64>,
    #[arg(long)]
    pub top: Option<f64>,
    #[arg(long)]
    pub width: Option<f64>,
    #[arg(long)]
    pub height: Option<f64>,
    #[arg(long)]
    pub radius: Option<f64>,
    #[arg(long)]
    pub rx: Option<f64>,
    #[arg(long)]
    pub ry: Option<f64>,
    /// Vertices as `x,y x,y ...`.
    #[arg(long)]
    pub points: Option<PointList>,
    /// SVG path data.
    #[arg(long)]
    pub path: Option<SvgPath>,
    #[arg(long)]
    pub fill: Option<SerializableColor>,
    #[arg(long)]
    pub stroke: Option<SerializableColor>,
    #[arg(long)]
    pub stroke_width: Option<f64>,
}

impl ShapeArgs {
    pub fn to_params(&self) -> ShapeParams {
        ShapeParams {
            left: self.left,
            top: self.top,
            width: self.width,
            height: self.height,
            radius: self.radius,
            radius_x: self.rx,
            radius_y: self.ry,
            points: self.points.clone().map(|p| p.0),
            path: self.path.clone().map(|p| p.0),
            fill: self.fill,
            stroke: self.stroke,
            stroke_width: self.stroke_width,
            content: None,
        }
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct TextArgs {
    #[arg(long)]
    pub font_family: Option<String>,
    #[arg(long)]
    pub font_size: Option<f64>,
    #[arg(long)]
    pub font_weight: Option<FontWeight>,
    #[arg(long)]
    pub fill: Option<SerializableColor>,
    #[arg(long)]
    pub left: Option<f64>,
    #[arg(long)]
    pub top: Option<f64>,
}

impl TextArgs {
    pub fn to_style(&self) -> TextStyle {
        TextStyle {
            font_family: self.font_family.clone(),
            font_size: self.font_size,
            font_weight: self.font_weight,
            fill: self.fill,
        }
    }

    pub fn position(&self) -> Option<Point> {
        Some(Point::new(self.left?, self.top?))
    }
}

/// Whitespace-separated `x,y` pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct PointList(pub Vec<Point>);

impl FromStr for PointList {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let points = s
            .split_whitespace()
            .map(|pair| {
                let (x, y) = pair
                    .split_once(',')
                    .ok_or_else(|| format!("Expected x,y but got {:?}", pair))?;
                let coord = |v: &str| {
                    v.trim()
                        .parse::<f64>()
                        .map_err(|_| format!("Invalid coordinate {:?}", v))
                };
                Ok(Point::new(coord(x)?, coord(y)?))
            })
            .collect::<Result<Vec<_>, String>>()?;
        if points.len() < 2 {
            return Err("At least two points are needed".to_string());
        }
        Ok(PointList(points))
    }
}

#[derive(Debug, Clone)]
pub struct SvgPath(pub BezPath);

impl FromStr for SvgPath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BezPath::from_svg(s)
            .map(SvgPath)
            .map_err(|e| format!("Invalid path data: {}", e))
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("{0}")]
    Usage(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for CliError {
    fn from(e: StorageError) -> Self {
        CliError::Editor(e.into())
    }
}

impl CliError {
    pub fn notice(&self) -> String {
        match self {
            CliError::Editor(e) => e.notice(),
            other => other.to_string(),
        }
    }
}

struct Session {
    config: PersistenceConfig,
    local: Persistence<LocalStorage<FileStore>>,
}

impl Session {
    fn open(cli: &Cli) -> Result<Self, CliError> {
        let mut config = PersistenceConfig::from_env();
        if let Some(base_url) = &cli.base_url {
            config = config.with_base_url(base_url.as_str());
        }
        if let Some(name) = &cli.name {
            config = config.with_default_name(name.as_str());
        }
        let store = match &cli.store_dir {
            Some(dir) => FileStore::new(dir)?,
            None => FileStore::default_location()?,
        };
        log::debug!("Local designs in {}", store.base_path().display());
        let local = Persistence::new(LocalStorage::new(store), config.clone());
        Ok(Self { config, local })
    }

    fn name(&self) -> &str {
        &self.config.default_name
    }

    fn remote(&self) -> Result<Persistence<RemoteStorage>, CliError> {
        let storage = RemoteStorage::new(&self.config.base_url)?;
        Ok(Persistence::new(storage, self.config.clone()))
    }

    /// Load the local design, or leave the editor empty for a new one.
    fn open_design(&self, editor: &mut Editor<RasterRenderer>) -> Result<(), CliError> {
        match editor.load_local(&self.local, None) {
            Ok(()) => Ok(()),
            Err(EditorError::Storage(StorageError::NotFound(name))) => {
                log::info!("Starting new design {:?}", name);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save_design(&self, editor: &Editor<RasterRenderer>) -> Result<String, CliError> {
        Ok(editor.save_local(&self.local, None)?)
    }
}

/// Run one command, writing its report to `out`.
pub async fn run<W: Write>(cli: Cli, out: &mut W) -> Result<(), CliError> {
    let session = Session::open(&cli)?;
    let mut editor = Editor::new(RasterRenderer::new());

    match cli.command {
        Command::Add { kind, shape } => {
            session.open_design(&mut editor)?;
            let index = editor.add_shape(kind, &shape.to_params());
            let name = session.save_design(&editor)?;
            writeln!(out, "Added {} #{} to {}", kind, index, name)?;
        }
        Command::Text { content, style } => {
            session.open_design(&mut editor)?;
            let index = editor.add_text(&content, &style.to_style(), style.position());
            let name = session.save_design(&editor)?;
            writeln!(out, "Added text #{} to {}", index, name)?;
        }
        Command::Restyle { index, property, value } => {
            session.open_design(&mut editor)?;
            if !editor.select(index) {
                return Err(CliError::Usage(format!("No object #{}", index)));
            }
            if editor.restyle_selection_str(&property, &value)? {
                session.save_design(&editor)?;
                writeln!(out, "Restyled #{}", index)?;
            } else {
                writeln!(out, "Object #{} is not text; nothing changed", index)?;
            }
        }
        Command::Remove { index } => {
            session.open_design(&mut editor)?;
            if !editor.select(index) {
                return Err(CliError::Usage(format!("No object #{}", index)));
            }
            if let Some(removed) = editor.remove_selected() {
                session.save_design(&editor)?;
                writeln!(out, "Removed {} #{}", removed.kind(), index)?;
            }
        }
        Command::Clear => {
            session.open_design(&mut editor)?;
            editor.clear();
            let name = session.save_design(&editor)?;
            writeln!(out, "Cleared {}", name)?;
        }
        Command::Show { json } => {
            session.open_design(&mut editor)?;
            let document = editor.document();
            if json {
                writeln!(out, "{}", document.to_json()?)?;
            } else {
                writeln!(
                    out,
                    "{} ({}x{}, {} objects)",
                    session.name(),
                    document.width,
                    document.height,
                    document.len()
                )?;
                for (i, shape) in document.objects.iter().enumerate() {
                    let origin = shape.origin();
                    write!(out, "#{} {} at ({:.1}, {:.1})", i, shape.kind(), origin.x, origin.y)?;
                    if let Some(text) = shape.as_text() {
                        write!(out, " {:?}", text.content())?;
                    }
                    writeln!(out)?;
                }
            }
        }
        Command::List { remote } => {
            let names = if remote {
                session.remote()?.list().await?
            } else {
                session.local.list().await?
            };
            for name in names {
                writeln!(out, "{}", name)?;
            }
        }
        Command::Delete { remote } => {
            if remote {
                session.remote()?.delete(None).await?;
            } else {
                session.local.delete(None).await?;
            }
            writeln!(out, "Deleted {}", session.name())?;
        }
        Command::Export { format, output } => {
            session.open_design(&mut editor)?;
            let export = editor.export_raster(format, Some(session.name()))?;
            let path = output.unwrap_or_else(|| PathBuf::from(&export.filename));
            std::fs::write(&path, &export.bytes)?;
            writeln!(out, "Exported {} ({} bytes)", path.display(), export.bytes.len())?;
        }
        Command::Push => {
            editor.load_local(&session.local, None)?;
            let saved = editor.save(&session.remote()?, None).await?;
            writeln!(out, "{}", saved.notice())?;
        }
        Command::Pull => {
            editor.load(&session.remote()?, None).await?;
            session.save_design(&editor)?;
            writeln!(out, "Canvas loaded from server!")?;
        }
    }

    editor.dispose();
    Ok(())
}
