//! 附件落盘
//!
//! 上传文件以 `{时间戳}-{uuid}.bin` 的名字保存在配置的上传目录下，数据库只记录这个文件名。
//! 作业上的 maxFileSize / allowedFileTypes 不参与校验，这里只执行配置中的传输层限制。

use actix_multipart::{Field, Multipart};
use futures_util::{StreamExt, TryStreamExt};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{error, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::{HWSystemError, Result};
use crate::models::submissions::{entities::NewAttachment, requests::SubmissionForm};

const FILES_FIELD: &str = "files";
const DEFAULT_FILE_TYPE: &str = "application/octet-stream";

/// 存储文件的完整路径
pub(crate) fn stored_path(stored_name: &str) -> PathBuf {
    PathBuf::from(&AppConfig::get().upload.dir).join(stored_name)
}

/// 删除已落盘的文件，失败只记录日志
pub async fn remove_stored_files(stored_names: &[String]) {
    for name in stored_names {
        if let Err(e) = tokio::fs::remove_file(stored_path(name)).await {
            warn!("Failed to remove stored file {}: {}", name, e);
        }
    }
}

fn multipart_error(e: impl std::fmt::Display) -> HWSystemError {
    HWSystemError::validation(format!("Invalid multipart payload: {e}"))
}

/// 解析提交表单，文件字段直接写入上传目录
///
/// 任意一步失败时，已经写入的文件都会被删除。
pub async fn read_submission_form(mut payload: Multipart) -> Result<SubmissionForm> {
    let mut form = SubmissionForm::default();

    match collect_fields(&mut payload, &mut form).await {
        Ok(()) => Ok(form),
        Err(e) => {
            let saved: Vec<String> = form.files.iter().map(|f| f.file_path.clone()).collect();
            remove_stored_files(&saved).await;
            Err(e)
        }
    }
}

async fn collect_fields(payload: &mut Multipart, form: &mut SubmissionForm) -> Result<()> {
    let config = AppConfig::get();

    while let Some(mut field) = payload.try_next().await.map_err(multipart_error)? {
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();

        match name.as_str() {
            FILES_FIELD => {
                if form.files.len() >= config.upload.max_files {
                    return Err(HWSystemError::validation(format!(
                        "Too many files, at most {} per submission",
                        config.upload.max_files
                    )));
                }
                let file = save_file(&mut field, config.upload.max_size).await?;
                form.files.push(file);
            }
            "assignmentId" => {
                let raw = read_text(&mut field).await?;
                let raw = raw.trim();
                form.assignment_id = if raw.is_empty() {
                    None
                } else {
                    Some(raw.parse::<i64>().map_err(|_| {
                        HWSystemError::validation(format!("Invalid assignment ID: {raw}"))
                    })?)
                };
            }
            "textContent" => form.text_content = Some(read_text(&mut field).await?),
            "status" => form.status = Some(read_text(&mut field).await?),
            // 未知字段直接丢弃
            _ => while field.next().await.is_some() {},
        }
    }

    Ok(())
}

async fn read_text(field: &mut Field) -> Result<String> {
    let limit = AppConfig::get().server.limits.max_payload_size;
    let mut bytes = Vec::new();

    while let Some(chunk) = field.next().await {
        let data = chunk.map_err(multipart_error)?;
        if bytes.len() + data.len() > limit {
            return Err(HWSystemError::validation("Form field is too large"));
        }
        bytes.extend_from_slice(&data);
    }

    String::from_utf8(bytes).map_err(|_| HWSystemError::validation("Form field is not valid UTF-8"))
}

async fn save_file(field: &mut Field, max_size: usize) -> Result<NewAttachment> {
    let upload_dir = &AppConfig::get().upload.dir;
    tokio::fs::create_dir_all(upload_dir).await.map_err(|e| {
        error!("Failed to create upload directory {}: {}", upload_dir, e);
        HWSystemError::file_operation(format!("Failed to create upload directory: {e}"))
    })?;

    let file_name = field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .map(|s| s.to_string())
        .unwrap_or_else(|| "upload".to_string());
    let file_type = field
        .content_type()
        .map(|ct| ct.to_string())
        .unwrap_or_else(|| DEFAULT_FILE_TYPE.to_string());

    let stored_name = format!("{}-{}.bin", chrono::Utc::now().timestamp(), Uuid::new_v4());
    let path = stored_path(&stored_name);

    match write_field(field, &path, max_size).await {
        Ok(file_size) => Ok(NewAttachment {
            file_name,
            file_path: stored_name,
            file_size,
            file_type,
        }),
        Err(e) => {
            let _ = tokio::fs::remove_file(&path).await;
            Err(e)
        }
    }
}

async fn write_field(field: &mut Field, path: &Path, max_size: usize) -> Result<i64> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut total_size: usize = 0;

    while let Some(chunk) = field.next().await {
        let data = chunk.map_err(multipart_error)?;
        total_size += data.len();
        if total_size > max_size {
            return Err(HWSystemError::validation("File size exceeds the limit"));
        }
        file.write_all(&data).await?;
    }
    file.flush().await?;

    Ok(total_size as i64)
}
