//! WASM bindings for tablecraft
//!
//! Tables, selections and outcomes cross the boundary as JSON. A
//! [`WasmEditor`] keeps its clipboard between calls; the free functions
//! each use a fresh editor.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::core::commands::{self, CommandOutcome, InsertTableOptions, TableCommand, TableEditor};
use crate::core::options::EngineOptions;
use crate::core::target::Selection;
use crate::document::{CellAddress, StyleMap, Table};
use crate::features::{self, Format};
use crate::utils::error::{TableError, TableResult};

/// Result of a command, as seen from JavaScript
#[derive(Serialize, Deserialize, Default)]
pub struct CommandResult {
    /// The table after the command (unchanged on error)
    pub table: Option<Table>,
    /// Where the host should put the selection
    pub cursor: Option<CellAddress>,
    pub outcome: Option<CommandOutcome>,
    /// Error message if the command failed
    pub error: Option<String>,
}

/// Conversion result
#[derive(Serialize, Deserialize, Default)]
pub struct ConvertResult {
    pub output: String,
    pub success: bool,
    pub error: Option<String>,
}

/// Initialize panic hook and console logging
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Debug) {
        // A host that calls init twice keeps its first logger
        log::debug!("console logger not installed: {}", e);
    }
}

fn from_json<T: for<'de> Deserialize<'de>>(what: &str, json: &str) -> TableResult<T> {
    serde_json::from_str(json).map_err(|e| TableError::parse(format!("invalid {} JSON: {}", what, e)))
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

/// Build a command from its name and JSON argument
///
/// `applyCellStyle` takes an object of style keys; the type commands take
/// a string.
fn command_from_json(name: &str, arg_json: Option<&str>) -> TableResult<TableCommand> {
    let Some(json) = arg_json.filter(|s| !s.trim().is_empty()) else {
        return TableCommand::parse(name, None);
    };
    if commands::command_kind(name) == Some(commands::CommandKind::ApplyCellStyle) {
        let styles: StyleMap = from_json("style", json)?;
        return Ok(TableCommand::ApplyCellStyle(styles));
    }
    let arg: String = from_json("argument", json)?;
    TableCommand::parse(name, Some(&arg))
}

fn run_command(
    editor: &mut TableEditor,
    table_json: &str,
    selection_json: &str,
    command: &str,
    arg_json: Option<&str>,
) -> CommandResult {
    let result = (|| {
        let mut table: Table = from_json("table", table_json)?;
        let selection: Selection = from_json("selection", selection_json)?;
        let command = command_from_json(command, arg_json)?;
        let outcome = editor.execute(&mut table, &selection, &command)?;
        Ok::<_, TableError>((table, outcome))
    })();

    match result {
        Ok((table, outcome)) => {
            let cursor = match &outcome {
                CommandOutcome::Changed { cursor } => Some(*cursor),
                _ => None,
            };
            CommandResult {
                table: Some(table),
                cursor,
                outcome: Some(outcome),
                error: None,
            }
        }
        Err(e) => CommandResult {
            error: Some(e.to_string()),
            ..Default::default()
        },
    }
}

/// Editor that keeps its clipboard across commands
#[wasm_bindgen]
pub struct WasmEditor {
    editor: TableEditor,
}

#[wasm_bindgen]
impl WasmEditor {
    /// Create an editor; `options` is an `EngineOptions` object or undefined
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> WasmEditor {
        let options: EngineOptions = serde_wasm_bindgen::from_value(options).unwrap_or_default();
        WasmEditor {
            editor: TableEditor::with_options(options),
        }
    }

    #[wasm_bindgen(js_name = "execute")]
    pub fn execute(
        &mut self,
        table_json: &str,
        selection_json: &str,
        command: &str,
        arg_json: Option<String>,
    ) -> JsValue {
        to_js(&run_command(
            &mut self.editor,
            table_json,
            selection_json,
            command,
            arg_json.as_deref(),
        ))
    }

    #[wasm_bindgen(js_name = "clearClipboard")]
    pub fn clear_clipboard(&mut self) {
        self.editor.clipboard_mut().clear();
    }
}

/// Run one command with a fresh editor
#[wasm_bindgen(js_name = "executeCommand")]
pub fn execute_command(
    table_json: &str,
    selection_json: &str,
    command: &str,
    arg_json: Option<String>,
) -> JsValue {
    let mut editor = TableEditor::new();
    to_js(&run_command(
        &mut editor,
        table_json,
        selection_json,
        command,
        arg_json.as_deref(),
    ))
}

/// Create a table; `options` is an `InsertTableOptions` object or undefined
#[wasm_bindgen(js_name = "insertTable")]
pub fn insert_table(rows: usize, cols: usize, options: JsValue) -> JsValue {
    let options: InsertTableOptions = serde_wasm_bindgen::from_value(options).unwrap_or_default();
    let result = match commands::insert_table(rows, cols, &options) {
        Ok((table, cursor)) => CommandResult {
            table: Some(table),
            cursor: Some(cursor),
            outcome: Some(CommandOutcome::Changed { cursor }),
            error: None,
        },
        Err(e) => CommandResult {
            error: Some(e.to_string()),
            ..Default::default()
        },
    };
    to_js(&result)
}

/// Convert a table between LaTeX and Typst (`to` is "latex" or "typst")
#[wasm_bindgen]
pub fn convert(input: &str, to: &str) -> JsValue {
    let result = Format::from_name(to)
        .ok_or_else(|| TableError::parse(format!("unknown format '{}'", to)))
        .and_then(|format| {
            let (table, _) = features::parse_table(input, None)?;
            Ok(features::render_table(&table, format))
        });
    let result = match result {
        Ok(output) => ConvertResult {
            output,
            success: true,
            error: None,
        },
        Err(e) => ConvertResult {
            error: Some(e.to_string()),
            ..Default::default()
        },
    };
    to_js(&result)
}

/// Detect input format ("latex", "typst" or "unknown")
#[wasm_bindgen(js_name = "detectFormat")]
pub fn detect_format(input: &str) -> String {
    features::detect_format(input)
        .map(Format::name)
        .unwrap_or("unknown")
        .to_string()
}

#[wasm_bindgen(js_name = "getVersion")]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
