//! CLI probe for the map core.
//!
//! # Responsibility
//! - Verify `cyklomapa_core` linkage and print its version.
//! - Open a map database and print the publicly visible layers and points.
//!
//! Configuration: first positional argument or `CYKLOMAPA_DB` for the
//! database path (in-memory when absent); `CYKLOMAPA_LOG_DIR` and
//! `CYKLOMAPA_LOG_LEVEL` enable file logging.

use cyklomapa_core::db::{open_db, open_db_in_memory};
use cyklomapa_core::{
    default_log_level, init_logging, MapService, MemoryResponseCache, PoiListQuery,
    SqliteMapRepository,
};
use log::error;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("cyklomapa_core ping={}", cyklomapa_core::ping());
    println!("cyklomapa_core version={}", cyklomapa_core::core_version());

    if let Ok(log_dir) = std::env::var("CYKLOMAPA_LOG_DIR") {
        let level = std::env::var("CYKLOMAPA_LOG_LEVEL")
            .unwrap_or_else(|_| default_log_level().to_string());
        if let Err(err) = init_logging(&level, &log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let db_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("CYKLOMAPA_DB").ok());

    match print_public_map(db_path.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn print_public_map(db_path: Option<&str>) -> Result<(), Box<dyn Error>> {
    let conn = match db_path {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let repo = SqliteMapRepository::try_new(&conn)?;
    let service = MapService::new(repo, MemoryResponseCache::new());

    for layer in service.layers()? {
        let visible = service.list_pois(&PoiListQuery {
            layer_id: Some(layer.id),
            ..PoiListQuery::visible()
        })?;
        println!("layer {} ({}) visible_pois={}", layer.slug, layer.order, visible.len());

        for poi in visible {
            let Some(marker) = service.get_marker(poi.marker_id)? else {
                continue;
            };
            println!(
                "  {} [{}] {} min_zoom={}",
                poi.label(&marker),
                marker.slug,
                poi.position,
                poi.effective_min_zoom(&marker)
            );
        }
    }
    Ok(())
}
