use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AuthService;
use crate::errors::HWSystemError;
use crate::middlewares::RequireJWT;
use crate::models::auth::UpdateProfileRequest;
use crate::models::users::{entities::Language, requests::UpdateProfile};

// 只允许修改姓名和界面语言
pub async fn handle_update_profile(
    service: &AuthService,
    update_request: UpdateProfileRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(request)?;

    let language = match update_request.language.filter(|l| !l.is_empty()) {
        Some(language) => Some(language.parse::<Language>().map_err(|_| {
            HWSystemError::validation(r#"Invalid language. Must be "en" or "zh-CN""#)
        })?),
        None => None,
    };

    let update = UpdateProfile {
        first_name: update_request
            .first_name
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()),
        last_name: update_request
            .last_name
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()),
        language,
    };

    if update.first_name.is_none() && update.last_name.is_none() && update.language.is_none() {
        return Err(HWSystemError::validation("No fields to update").into());
    }

    let storage = service.get_storage(request)?;
    match storage.update_user_profile(user.id, update).await? {
        Some(user) => Ok(HttpResponse::Ok().json(user)),
        None => Err(HWSystemError::not_found("User not found").into()),
    }
}
