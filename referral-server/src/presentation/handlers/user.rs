use actix_web::{HttpRequest, HttpResponse, get, post, put, web};
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::application::user_service::UserService;
use crate::data::referral_code_repository::PostgresReferralCodeRepository;
use crate::data::user_repository::PostgresUserRepository;
use crate::domain::error::DomainError;
use crate::infrastructure::cache::ResponseCache;
use crate::presentation::dto::{
    CodeQuery, CreateUserRequest, EmailQuery, ReferralEmailQuery, ReferrerQuery,
    UpdateUserRequest, UserView,
};
use crate::presentation::utils::{AuthenticatedUser, request_id};

type Users = web::Data<UserService<PostgresUserRepository, PostgresReferralCodeRepository>>;

#[post("/users/register")]
pub async fn register(
    req: HttpRequest,
    service: Users,
    payload: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, DomainError> {
    payload
        .validate()
        .map_err(|e| DomainError::Validation(e.to_string()))?;

    let user = service.register(payload.into_inner()).await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        email = %user.email,
        "user registered"
    );

    Ok(HttpResponse::Created().json(UserView::from(user)))
}

/// Mails the referrer's active code to a prospective user. Replies before
/// the mail leaves; delivery is best-effort.
#[get("/users/get_rc_by_email")]
pub async fn get_rc_by_email(
    service: Users,
    query: web::Query<ReferralEmailQuery>,
) -> Result<HttpResponse, DomainError> {
    query
        .validate()
        .map_err(|e| DomainError::Validation(e.to_string()))?;

    service
        .request_referral(&query.referrer_email, &query.user_email)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "detail": format!(
            "a message with the referral code has been sent to {}",
            query.user_email
        )
    })))
}

#[post("/users/end_registration")]
pub async fn end_registration(
    req: HttpRequest,
    service: Users,
    query: web::Query<CodeQuery>,
    payload: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, DomainError> {
    payload
        .validate()
        .map_err(|e| DomainError::Validation(e.to_string()))?;

    let user = service
        .register_with_code(query.referral_code, payload.into_inner())
        .await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        referred_by = %user.referred_by,
        "user registered through referral code"
    );

    Ok(HttpResponse::Created().json(UserView::from(user)))
}

#[get("/users/user_info")]
pub async fn user_info(
    req: HttpRequest,
    _user: AuthenticatedUser,
    service: Users,
    cache: web::Data<ResponseCache>,
    query: web::Query<EmailQuery>,
) -> Result<HttpResponse, DomainError> {
    query
        .validate()
        .map_err(|e| DomainError::Validation(e.to_string()))?;

    let key = ResponseCache::key(req.path(), req.query_string());
    if let Some(hit) = cache.get(&key) {
        return Ok(HttpResponse::Ok().json(hit));
    }

    let (user, codes) = service.get_user(&query.email).await?;
    let body = serde_json::to_value(UserView::with_codes(user, codes))
        .map_err(|e| DomainError::Internal(e.to_string()))?;
    cache.insert(key, body.clone());

    Ok(HttpResponse::Ok().json(body))
}

#[get("/users/referrals_info")]
pub async fn referrals_info(
    req: HttpRequest,
    _user: AuthenticatedUser,
    service: Users,
    cache: web::Data<ResponseCache>,
    query: web::Query<ReferrerQuery>,
) -> Result<HttpResponse, DomainError> {
    let key = ResponseCache::key(req.path(), req.query_string());
    if let Some(hit) = cache.get(&key) {
        return Ok(HttpResponse::Ok().json(hit));
    }

    let referrals = service.get_referrals(query.referrer_id).await?;
    let views: Vec<UserView> = referrals.into_iter().map(UserView::from).collect();
    let body =
        serde_json::to_value(views).map_err(|e| DomainError::Internal(e.to_string()))?;
    cache.insert(key, body.clone());

    Ok(HttpResponse::Ok().json(body))
}

#[put("/users/update_user_info")]
pub async fn update_user_info(
    req: HttpRequest,
    user: AuthenticatedUser,
    service: Users,
    query: web::Query<EmailQuery>,
    payload: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, DomainError> {
    query
        .validate()
        .map_err(|e| DomainError::Validation(e.to_string()))?;
    payload
        .validate()
        .map_err(|e| DomainError::Validation(e.to_string()))?;

    let updated = service.update_user(&query.email, payload.into_inner()).await?;

    info!(
        request_id = %request_id(&req),
        caller = %user.email,
        user_id = %updated.id,
        "user profile updated"
    );

    Ok(HttpResponse::Ok().json(UserView::from(updated)))
}

#[get("/users/email_exists")]
pub async fn email_exists(
    req: HttpRequest,
    _user: AuthenticatedUser,
    service: Users,
    cache: web::Data<ResponseCache>,
    query: web::Query<EmailQuery>,
) -> Result<HttpResponse, DomainError> {
    query
        .validate()
        .map_err(|e| DomainError::Validation(e.to_string()))?;

    let key = ResponseCache::key(req.path(), req.query_string());
    if let Some(hit) = cache.get(&key) {
        return Ok(HttpResponse::Ok().json(hit));
    }

    let user = service.check_email_deliverability(&query.email).await?;
    let body = serde_json::to_value(UserView::from(user))
        .map_err(|e| DomainError::Internal(e.to_string()))?;
    cache.insert(key, body.clone());

    Ok(HttpResponse::Ok().json(body))
}
