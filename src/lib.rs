mod commands;
mod display;
mod parse;
mod predict;
mod selection;
mod types;

use commands::{AppState, ViewerState};
use std::sync::Mutex;
use tauri::Manager;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            let app_data_dir = app.path().app_data_dir().map_err(|e| e.to_string())?;
            // Load .env from app data dir so production users can place credentials there (Settings → Open app data folder)
            let env_path = app_data_dir.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
            }
            app.manage(AppState {
                viewer: Mutex::new(ViewerState::default()),
            });
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::get_app_data_path,
            commands::open_app_data_folder,
            commands::get_app_version,
            commands::get_api_status,
            commands::predict_document,
            commands::record_hover_enter,
            commands::record_hover_leave,
            commands::shape_hover_enter,
            commands::shape_hover_leave,
            commands::get_selection,
            commands::toggle_section,
            commands::get_section_state,
            commands::validate_document_file,
            commands::read_file_base64,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
