use actix_web::{HttpRequest, HttpResponse, delete, post, put, web};
use tracing::info;
use validator::Validate;

use crate::application::referral_code_service::ReferralCodeService;
use crate::data::referral_code_repository::PostgresReferralCodeRepository;
use crate::domain::error::DomainError;
use crate::presentation::dto::{CodeQuery, CreateReferralCodeRequest, ReferralCodeView};
use crate::presentation::utils::{AuthenticatedUser, request_id};

type Codes = web::Data<ReferralCodeService<PostgresReferralCodeRepository>>;

#[post("/referral_codes/create")]
pub async fn create_code(
    req: HttpRequest,
    user: AuthenticatedUser,
    service: Codes,
    payload: web::Json<CreateReferralCodeRequest>,
) -> Result<HttpResponse, DomainError> {
    payload
        .validate()
        .map_err(|e| DomainError::Validation(e.to_string()))?;

    let code = service.create_code(user.id, payload.into_inner()).await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        code = %code.code,
        "referral code created"
    );

    Ok(HttpResponse::Created().json(ReferralCodeView::from(code)))
}

#[put("/referral_codes/activate")]
pub async fn activate_code(
    req: HttpRequest,
    user: AuthenticatedUser,
    service: Codes,
    query: web::Query<CodeQuery>,
) -> Result<HttpResponse, DomainError> {
    let code = service.activate_code(query.referral_code, user.id).await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        code = %code.code,
        "referral code activated"
    );

    Ok(HttpResponse::Ok().json(ReferralCodeView::from(code)))
}

#[delete("/referral_codes/delete")]
pub async fn delete_code(
    req: HttpRequest,
    user: AuthenticatedUser,
    service: Codes,
    query: web::Query<CodeQuery>,
) -> Result<HttpResponse, DomainError> {
    service.delete_code(query.referral_code, user.id).await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        code = %query.referral_code,
        "referral code deleted"
    );

    Ok(HttpResponse::NoContent().finish())
}
