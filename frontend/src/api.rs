use gloo_net::http::Request;
use shared::{AnalysisResponse, ErrorResponse};
use web_sys::{File, FormData};

/// Prefix for API calls; empty when the page is served by the backend itself.
const API_BASE: &str = match option_env!("API_BASE_URL") {
    Some(base) => base,
    None => "",
};

/// Videos go to the video endpoint, everything else is treated as an image.
pub fn endpoint_for(mime_type: &str) -> &'static str {
    if mime_type.starts_with("video") {
        "/analyze-video"
    } else {
        "/analyze-image"
    }
}

pub async fn analyze_file(file: &File) -> Result<AnalysisResponse, String> {
    let form_data = FormData::new().map_err(|e| format!("{:?}", e))?;
    form_data
        .append_with_blob_and_filename("file", file, &file.name())
        .map_err(|e| format!("{:?}", e))?;

    let url = format!("{}{}", API_BASE, endpoint_for(&file.type_()));
    let response = Request::post(&url)
        .body(form_data)
        .map_err(|e| e.to_string())?
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if !response.ok() {
        let status = response.status();
        let detail = response
            .json::<ErrorResponse>()
            .await
            .map(|body| body.error)
            .unwrap_or_default();
        return Err(format!("API error: {} {}", status, detail));
    }

    response
        .json::<AnalysisResponse>()
        .await
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::endpoint_for;

    #[test]
    fn picks_endpoint_by_mime_type() {
        assert_eq!(endpoint_for("video/mp4"), "/analyze-video");
        assert_eq!(endpoint_for("image/png"), "/analyze-image");
        assert_eq!(endpoint_for(""), "/analyze-image");
    }
}
