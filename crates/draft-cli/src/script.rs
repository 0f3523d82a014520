//! Drafting scripts
//!
//! A script is a RON file naming a document and listing the operations to
//! replay against it:
//!
//! ```ron
//! (
//!     document: "Bracket",
//!     commands: [
//!         Create(kind: Rectangle, name: "R1"),
//!         Set(feature: "R1", property: "Width", value: Float(10.0)),
//!         Recompute,
//!         Show("R1"),
//!     ],
//! )
//! ```

use std::io::Write;
use std::path::Path;

use draft_core::{Document, DocumentError, EngineConfig, FeatureKind, PropertyValue};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::report;

/// Script errors
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read script: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse script: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("command {index} ({command}) failed: {source}")]
    Command {
        index: usize,
        command: &'static str,
        #[source]
        source: DocumentError,
    },
}

/// One document operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Create { kind: FeatureKind, name: String },
    Set { feature: String, property: String, value: PropertyValue },
    Remove(String),
    Rename { from: String, to: String },
    Touch(String),
    AddPoint { feature: String, point: DVec3 },
    RemovePoint { feature: String, index: usize },
    MakeLine { start: DVec3, end: DVec3 },
    MakeCircle { center: DVec3, radius: f64 },
    MakeRectangle { start: DVec3, width: f64, height: f64 },
    MakeRegularPolygon { center: DVec3, sides: usize, radius: f64 },
    /// Recompute every Dirty feature and print the report
    Recompute,
    /// Recompute one feature and print the report
    RecomputeFeature(String),
    /// Print a feature's status and properties
    Show(String),
}

impl Command {
    pub fn label(&self) -> &'static str {
        match self {
            Command::Create { .. } => "Create",
            Command::Set { .. } => "Set",
            Command::Remove(_) => "Remove",
            Command::Rename { .. } => "Rename",
            Command::Touch(_) => "Touch",
            Command::AddPoint { .. } => "AddPoint",
            Command::RemovePoint { .. } => "RemovePoint",
            Command::MakeLine { .. } => "MakeLine",
            Command::MakeCircle { .. } => "MakeCircle",
            Command::MakeRectangle { .. } => "MakeRectangle",
            Command::MakeRegularPolygon { .. } => "MakeRegularPolygon",
            Command::Recompute => "Recompute",
            Command::RecomputeFeature(_) => "RecomputeFeature",
            Command::Show(_) => "Show",
        }
    }
}

/// A parsed script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default = "default_document_name")]
    pub document: String,
    pub commands: Vec<Command>,
}

fn default_document_name() -> String {
    String::from("Drawing")
}

impl Script {
    pub fn parse(source: &str) -> Result<Self, ScriptError> {
        Ok(ron::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let source = std::fs::read_to_string(path)?;
        Self::parse(&source)
    }

    /// Replay the script against a fresh document, writing reports to `out`.
    /// Stops at the first failing command.
    pub fn run(&self, config: EngineConfig, out: &mut impl Write) -> Result<Document, ScriptError> {
        let mut doc = Document::with_config(self.document.clone(), config);
        tracing::info!(
            "Running {} command(s) on document '{}'",
            self.commands.len(),
            doc.name
        );

        for (index, command) in self.commands.iter().enumerate() {
            tracing::debug!("Command {}: {:?}", index, command);
            execute(&mut doc, command, out).map_err(|source| match source {
                Step::Document(source) => ScriptError::Command {
                    index,
                    command: command.label(),
                    source,
                },
                Step::Io(e) => ScriptError::Io(e),
            })?;
        }
        Ok(doc)
    }
}

/// Failure of a single command
enum Step {
    Document(DocumentError),
    Io(std::io::Error),
}

impl From<DocumentError> for Step {
    fn from(err: DocumentError) -> Self {
        Step::Document(err)
    }
}

impl From<std::io::Error> for Step {
    fn from(err: std::io::Error) -> Self {
        Step::Io(err)
    }
}

fn execute(doc: &mut Document, command: &Command, out: &mut impl Write) -> Result<(), Step> {
    match command {
        Command::Create { kind, name } => {
            doc.create_feature(*kind, name)?;
        }
        Command::Set {
            feature,
            property,
            value,
        } => {
            doc.set_property(feature, property, value.clone())?;
        }
        Command::Remove(name) => {
            doc.remove_feature(name)?;
        }
        Command::Rename { from, to } => doc.rename_feature(from, to)?,
        Command::Touch(name) => doc.touch(name)?,
        Command::AddPoint { feature, point } => doc.add_polygon_point(feature, *point)?,
        Command::RemovePoint { feature, index } => {
            doc.remove_polygon_point(feature, *index)?;
        }
        Command::MakeLine { start, end } => {
            let name = doc.make_line(*start, *end)?;
            writeln!(out, "created {name}")?;
        }
        Command::MakeCircle { center, radius } => {
            let name = doc.make_circle(*center, *radius)?;
            writeln!(out, "created {name}")?;
        }
        Command::MakeRectangle {
            start,
            width,
            height,
        } => {
            let name = doc.make_rectangle(*start, *width, *height)?;
            writeln!(out, "created {name}")?;
        }
        Command::MakeRegularPolygon {
            center,
            sides,
            radius,
        } => {
            let name = doc.make_regular_polygon(*center, *sides, *radius)?;
            writeln!(out, "created {name}")?;
        }
        Command::Recompute => {
            let report = doc.recompute_all();
            report::write_report(out, &report)?;
        }
        Command::RecomputeFeature(name) => {
            let report = doc.recompute_feature(name)?;
            report::write_report(out, &report)?;
        }
        Command::Show(name) => {
            let feature = doc
                .feature(name)
                .ok_or_else(|| DocumentError::UnknownFeature(name.clone()))?;
            report::write_feature(out, feature)?;
        }
    }
    Ok(())
}
