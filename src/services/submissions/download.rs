use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::header};
use std::path::Path;
use tracing::error;

use super::SubmissionService;
use super::upload::stored_path;
use crate::authorization::{Action, Resource, authorize};
use crate::errors::HWSystemError;
use crate::middlewares::RequireJWT;

/// 附件的返回方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// 作为附件下载，保留原文件名
    Download,
    /// 按扩展名推断类型，在浏览器中直接显示
    Inline,
}

/// 根据原始文件名的扩展名推断在线查看时的 Content-Type
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "pdf" => "application/pdf",
        "txt" => "text/plain; charset=utf-8",
        "md" => "text/markdown; charset=utf-8",
        "ipynb" | "json" => "application/json; charset=utf-8",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

pub async fn serve_attachment(
    service: &SubmissionService,
    request: &HttpRequest,
    attachment_id: i64,
    disposition: Disposition,
) -> ActixResult<HttpResponse> {
    let actor = RequireJWT::current_user(request)?;
    let storage = service.get_storage(request)?;

    let owned = storage
        .get_attachment_by_id(attachment_id)
        .await?
        .ok_or_else(|| HWSystemError::not_found("Attachment not found"))?;
    authorize(&actor, Resource::Attachment, Action::Read, Some(owned.student_id))?;

    let attachment = owned.attachment;
    let path = stored_path(&attachment.file_path);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            error!(
                "Stored file for attachment {} is missing: {}",
                attachment.id,
                path.display()
            );
            return Err(HWSystemError::not_found("Attachment file not found").into());
        }
        Err(e) => return Err(HWSystemError::file_operation(format!("File read failed: {e}")).into()),
    };

    let response = match disposition {
        Disposition::Download => HttpResponse::Ok()
            .insert_header((header::CONTENT_TYPE, "application/octet-stream"))
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!(
                    "attachment; filename=\"{}\"",
                    attachment.file_name.replace('"', "")
                ),
            ))
            .body(bytes),
        Disposition::Inline => HttpResponse::Ok()
            .insert_header((header::CONTENT_TYPE, content_type_for(&attachment.file_name)))
            .insert_header((header::CONTENT_DISPOSITION, "inline"))
            .body(bytes),
    };

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_by_extension() {
        assert_eq!(content_type_for("report.PDF"), "application/pdf");
        assert_eq!(content_type_for("notes.md"), "text/markdown; charset=utf-8");
        assert_eq!(
            content_type_for("lab.ipynb"),
            "application/json; charset=utf-8"
        );
        assert_eq!(content_type_for("photo.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("archive.zip"), "application/octet-stream");
        assert_eq!(content_type_for("no_extension"), "application/octet-stream");
    }
}
