use actix_files::Files;
use actix_multipart::Multipart;
use actix_web::{HttpResponse, ResponseError, web};
use futures::TryStreamExt;
use log::{error, info, warn};
use shared::{AnalysisResponse, DetectResponse, HealthResponse, MediaKind};
use uuid::Uuid;

use crate::error::AnalysisError;
use crate::scoring::Scorer;

pub fn configure_routes(cfg: &mut web::ServiceConfig, frontend_dir: Option<String>) {
    cfg.service(web::resource("/").route(web::get().to(health)))
        .service(web::resource("/detect").route(web::post().to(detect)))
        .service(web::resource("/analyze-image").route(web::post().to(analyze_image)))
        .service(web::resource("/analyze-video").route(web::post().to(analyze_video)));

    // frontend/Trunk.toml builds with public_url = /static/
    if let Some(dir) = frontend_dir {
        cfg.service(Files::new("/static", dir).index_file("index.html"));
    }
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "Backend is running".to_string(),
    })
}

async fn detect() -> HttpResponse {
    HttpResponse::Ok().json(DetectResponse {
        deepfake_probability: 0.42,
        note: "POC response".to_string(),
    })
}

async fn analyze_image(
    scorer: web::Data<Scorer>,
    payload: Multipart,
) -> Result<HttpResponse, AnalysisError> {
    analyze(scorer, payload, MediaKind::Image).await
}

async fn analyze_video(
    scorer: web::Data<Scorer>,
    payload: Multipart,
) -> Result<HttpResponse, AnalysisError> {
    analyze(scorer, payload, MediaKind::Video).await
}

async fn analyze(
    scorer: web::Data<Scorer>,
    payload: Multipart,
    kind: MediaKind,
) -> Result<HttpResponse, AnalysisError> {
    let analysis_id = Uuid::new_v4();
    let upload = match read_upload(payload, scorer.config().max_upload_bytes).await {
        Ok(upload) => upload,
        Err(e) => {
            warn!("Rejected {} upload {}: {}", kind, analysis_id, e);
            return Err(e);
        }
    };
    info!("Analysing {} upload {} ({} bytes)", kind, analysis_id, upload.len());

    let result: Result<AnalysisResponse, AnalysisError> = web::block(move || match kind {
        MediaKind::Image => scorer.analyze_image(&upload),
        MediaKind::Video => scorer.analyze_video(&upload),
    })
    .await?;

    match result {
        Ok(response) => {
            info!(
                "Analysis {}: probability {} -> {}",
                analysis_id, response.deepfake_probability, response.result
            );
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => {
            if e.status_code().is_server_error() {
                error!("Analysis {} failed: {}", analysis_id, e);
            } else {
                warn!("Analysis {} rejected: {}", analysis_id, e);
            }
            Err(e)
        }
    }
}

/// Reads the uploaded file into memory. Prefers the field named `file`,
/// falling back to the first field that carries a filename.
async fn read_upload(mut payload: Multipart, limit: usize) -> Result<Vec<u8>, AnalysisError> {
    let mut upload: Option<Vec<u8>> = None;

    while let Some(mut field) = payload.try_next().await? {
        let named_file = field.name() == Some("file");
        let has_filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .is_some();
        if !named_file && (upload.is_some() || !has_filename) {
            continue;
        }

        let mut data = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            if data.len() + chunk.len() > limit {
                return Err(AnalysisError::UploadTooLarge(limit));
            }
            data.extend_from_slice(&chunk);
        }
        upload = Some(data);

        if named_file {
            break;
        }
    }

    match upload {
        Some(data) if data.is_empty() => Err(AnalysisError::EmptyUpload),
        Some(data) => Ok(data),
        None => Err(AnalysisError::MissingFile),
    }
}
