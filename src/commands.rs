use crate::display::{self, SectionState};
use crate::parse;
use crate::predict;
use crate::selection::{ClearToken, Effect, SelectionController, CLEAR_DEBOUNCE};
use crate::types::PredictionOutcome;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tauri::{AppHandle, Emitter, Manager, State};

#[derive(Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// All mutable UI-facing state, owned here and touched only from commands.
#[derive(Default)]
pub struct ViewerState {
    pub selection: SelectionController,
    pub sections: SectionState,
    pub outcome: Option<PredictionOutcome>,
    generation: u64,
}

impl ViewerState {
    /// Mark the start of a new upload; returns its generation. A response
    /// whose generation is no longer current was superseded by a newer
    /// upload and gets discarded (last writer by start order wins).
    pub fn begin_upload(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    pub fn apply_outcome(&mut self, outcome: PredictionOutcome) {
        self.selection.reset();
        self.sections = SectionState::default();
        self.outcome = Some(outcome);
    }
}

pub struct AppState {
    pub viewer: Mutex<ViewerState>,
}

#[tauri::command]
pub fn get_app_data_path(app: AppHandle) -> Result<String, String> {
    let path = app.path().app_data_dir().map_err(|e| e.to_string())?;
    path.to_str()
        .map(String::from)
        .ok_or_else(|| "Invalid path".to_string())
}

#[tauri::command]
pub fn get_app_version(app: AppHandle) -> String {
    app.package_info().version.to_string()
}

#[tauri::command]
pub fn get_api_status() -> String {
    predict::api_status()
}

#[tauri::command]
pub fn open_app_data_folder(app: AppHandle) -> Result<(), String> {
    let path = app.path().app_data_dir().map_err(|e| e.to_string())?;
    opener::open(&path).map_err(|e| e.to_string())
}

/// Upload a document and replace the viewer state with the normalized
/// result. Returns None when a newer upload started while this one was in
/// flight.
#[tauri::command]
pub async fn predict_document(
    state: State<'_, AppState>,
    file_path: String,
) -> Result<Option<PredictionOutcome>, String> {
    let generation = {
        let mut viewer = state.viewer.lock().map_err(|e| e.to_string())?;
        viewer.begin_upload()
    };

    let path = file_path.clone();
    let inference = tauri::async_runtime::spawn_blocking(move || predict::run_predict(&path))
        .await
        .map_err(|e| e.to_string())??;

    let records = parse::flatten(&inference.prediction)?;
    let confidence = parse::average_confidence(&inference.prediction);
    let metadata = display::document_metadata(&inference.prediction, inference.orientation);
    let overview = display::overview_sentence(&metadata);
    let outcome = PredictionOutcome {
        prediction: inference.prediction,
        orientation: inference.orientation,
        records,
        confidence,
        metadata,
        overview,
    };

    let mut viewer = state.viewer.lock().map_err(|e| e.to_string())?;
    if !viewer.is_current(generation) {
        return Ok(None);
    }
    viewer.apply_outcome(outcome.clone());
    Ok(Some(outcome))
}

#[tauri::command]
pub fn record_hover_enter(state: State<AppState>, id: String) -> Result<Vec<Effect>, String> {
    let mut viewer = state.viewer.lock().map_err(|e| e.to_string())?;
    Ok(viewer.selection.record_enter(&id))
}

#[tauri::command]
pub fn record_hover_leave(app: AppHandle, state: State<AppState>) -> Result<(), String> {
    let token = {
        let mut viewer = state.viewer.lock().map_err(|e| e.to_string())?;
        viewer.selection.record_leave()
    };
    if let Some(token) = token {
        schedule_clear(app, token);
    }
    Ok(())
}

#[tauri::command]
pub fn shape_hover_enter(state: State<AppState>, id: String) -> Result<Vec<Effect>, String> {
    let mut viewer = state.viewer.lock().map_err(|e| e.to_string())?;
    Ok(viewer.selection.shape_enter(&id))
}

#[tauri::command]
pub fn shape_hover_leave(app: AppHandle, state: State<AppState>) -> Result<(), String> {
    let token = {
        let mut viewer = state.viewer.lock().map_err(|e| e.to_string())?;
        viewer.selection.shape_leave()
    };
    if let Some(token) = token {
        schedule_clear(app, token);
    }
    Ok(())
}

/// Resolve a debounced clear on a worker thread and push any resulting
/// effects to the webview.
fn schedule_clear(app: AppHandle, token: ClearToken) {
    tauri::async_runtime::spawn_blocking(move || {
        std::thread::sleep(CLEAR_DEBOUNCE);
        let state = app.state::<AppState>();
        let effects = match state.viewer.lock() {
            Ok(mut viewer) => viewer.selection.resolve_clear(token),
            Err(_) => return,
        };
        if !effects.is_empty() {
            let _ = app.emit("selection-effects", &effects);
        }
    });
}

#[tauri::command]
pub fn get_selection(state: State<AppState>) -> Result<Option<String>, String> {
    let viewer = state.viewer.lock().map_err(|e| e.to_string())?;
    Ok(viewer.selection.selected().map(String::from))
}

#[tauri::command]
pub fn toggle_section(state: State<AppState>, section: String) -> Result<bool, String> {
    let mut viewer = state.viewer.lock().map_err(|e| e.to_string())?;
    viewer.sections.toggle(&section)
}

#[tauri::command]
pub fn get_section_state(state: State<AppState>) -> Result<SectionState, String> {
    let viewer = state.viewer.lock().map_err(|e| e.to_string())?;
    Ok(viewer.sections.clone())
}

/// Headers of the document types the prediction provider accepts:
/// PDF, PNG, JPEG and both TIFF byte orders. WebP is checked separately.
const DOCUMENT_MAGIC: &[&[u8]] = &[b"%PDF-", b"\x89PNG", b"\xFF\xD8\xFF", b"II*\0", b"MM\0*"];

#[tauri::command]
pub fn validate_document_file(path: String) -> Result<ValidationResult, String> {
    let path = Path::new(&path);
    if !path.exists() {
        return Ok(ValidationResult {
            valid: false,
            error: Some("File not found.".to_string()),
        });
    }
    let metadata = fs::metadata(path).map_err(|e| e.to_string())?;
    if metadata.len() > 50 * 1024 * 1024 {
        return Ok(ValidationResult {
            valid: false,
            error: Some("File too large (max 50MB).".to_string()),
        });
    }
    let mut f = fs::File::open(path).map_err(|e| format!("Could not open: {}", e))?;
    let mut header = [0u8; 12];
    use std::io::Read;
    if f.read(&mut header).unwrap_or(0) < 4 {
        return Ok(ValidationResult {
            valid: false,
            error: Some("Not a supported document (could not read header).".to_string()),
        });
    }
    let is_webp = header.starts_with(b"RIFF") && &header[8..12] == b"WEBP";
    let recognized = is_webp || DOCUMENT_MAGIC.iter().any(|&magic| header.starts_with(magic));
    if !recognized {
        return Ok(ValidationResult {
            valid: false,
            error: Some("Not a supported document (PDF, PNG, JPEG, TIFF or WebP).".to_string()),
        });
    }
    Ok(ValidationResult {
        valid: true,
        error: None,
    })
}

#[tauri::command]
pub fn read_file_base64(path: String) -> Result<String, String> {
    let bytes = fs::read(Path::new(&path)).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            "File not found.".to_string()
        } else {
            format!("Could not read file: {}", e)
        }
    })?;
    Ok(BASE64.encode(&bytes))
}
