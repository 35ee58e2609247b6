#![deny(missing_docs)]
//! The HTTP front end for the filesafe service: file encryption and
//! decryption over server-local paths, email OTP issuance and
//! verification, and the embedded landing page.

use std::any::Any;
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::Body,
    extract::{Form, Json as JsonBody, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use local_ip_address::local_ip;
use log::{error, info};
use rust_embed::RustEmbed;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;

use filesafe_core::config::{self, MailConfig, OtpConfig};
use filesafe_core::error::Error;
use filesafe_core::gateway;
use filesafe_core::keystore::KeyMaterial;
use filesafe_core::mailer::{self, OtpSender, SmtpMailer};
use filesafe_core::otp_store::OtpStore;
use filesafe_core::totp;

#[derive(RustEmbed)]
#[folder = "../static/"]
struct Asset;

/// Shared application state
struct AppState {
    key: KeyMaterial,
    otp: Mutex<OtpStore>,
    download_dir: PathBuf,
}

#[derive(Deserialize)]
struct FilePathForm {
    filepath: Option<String>,
}

#[derive(Deserialize)]
struct SendOtpRequest {
    email: Option<String>,
}

#[derive(Deserialize)]
struct VerifyOtpRequest {
    otp: Option<String>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let base = config::data_dir();
    let key_path = config::key_file(&base);
    let key = KeyMaterial::load_or_generate(&key_path)
        .expect("Failed to initialize the encryption key");
    info!("encryption key loaded from {}", key_path.display());

    let app_state = Arc::new(AppState {
        key,
        otp: Mutex::new(OtpStore::new()),
        download_dir: config::download_dir(&base),
    });

    // Build the Axum router.
    let app = Router::new()
        .route("/", get(home))
        .route("/encrypt", post(encrypt_handler))
        .route("/decrypt", post(decrypt_handler))
        .route("/send-otp", post(send_otp_handler))
        .route("/verify-otp", post(verify_otp_handler))
        .route("/download/:filename", get(download_handler))
        .route("/static/*path", get(static_handler))
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(CatchPanicLayer::custom(handle_panic))
        .fallback(not_found);

    // Run the server.
    let port = 3000;
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    println!("listening on:");
    if let Ok(my_local_ip) = local_ip() {
        println!("  - http://{my_local_ip}:{port}/");
    }
    println!("  - http://127.0.0.1:{port}/");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind the listen address");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}

/// Converts an operation failure into a status code and the JSON error
/// body the client sees. Internal detail is logged, never sent, on the
/// 500-class paths that carry one.
fn error_response(err: &Error) -> (StatusCode, Json<Value>) {
    match err {
        Error::MissingInput
        | Error::NotFound
        | Error::NotAFile
        | Error::InvalidCiphertext
        | Error::InvalidEmail
        | Error::InvalidFormat
        | Error::InvalidOrExpired => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": err.to_string() })))
        }
        Error::Configuration(detail) => {
            error!("configuration error: {detail}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "OTP configuration error" })),
            )
        }
        Error::Delivery(detail) => {
            error!("delivery error: {detail}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to send OTP" })),
            )
        }
        Error::Io(e) => {
            error!("internal error: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        }
    }
}

async fn encrypt_handler(
    State(state): State<Arc<AppState>>,
    payload: Option<Form<FilePathForm>>,
) -> (StatusCode, Json<Value>) {
    let filepath = payload
        .and_then(|Form(form)| form.filepath)
        .unwrap_or_default();
    info!("encrypt request for '{filepath}'");

    match gateway::encrypt_file(&state.key, &filepath, &state.download_dir) {
        Ok(file_name) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "download_url": format!("/download/{file_name}"),
                "message": "File encrypted successfully",
            })),
        ),
        Err(e) => error_response(&e),
    }
}

async fn decrypt_handler(
    State(state): State<Arc<AppState>>,
    payload: Option<Form<FilePathForm>>,
) -> (StatusCode, Json<Value>) {
    let filepath = payload
        .and_then(|Form(form)| form.filepath)
        .unwrap_or_default();
    info!("decrypt request for '{filepath}'");

    match gateway::decrypt_file(&state.key, &filepath) {
        Ok(output) => (
            StatusCode::OK,
            Json(json!({
                "message": format!("File decrypted successfully to {}", output.display()),
            })),
        ),
        Err(e) => error_response(&e),
    }
}

async fn send_otp_handler(
    State(state): State<Arc<AppState>>,
    payload: Option<JsonBody<SendOtpRequest>>,
) -> (StatusCode, Json<Value>) {
    let email = payload
        .and_then(|JsonBody(request)| request.email)
        .unwrap_or_default();
    if let Err(e) = mailer::validate_email(&email) {
        return error_response(&e);
    }

    let otp_config = match OtpConfig::from_env() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    let secret = match totp::decode_secret(&otp_config.secret) {
        Ok(s) => s,
        Err(e) => return error_response(&e),
    };
    let code = totp::totp_now(&secret, otp_config.step, otp_config.digits);

    // The record is stored before delivery is attempted; a failed send
    // does not roll back issuance.
    state
        .otp
        .lock()
        .expect("OTP store lock poisoned")
        .issue(&email, code.clone(), otp_config.step);

    let mail_config = match MailConfig::from_env() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    match SmtpMailer::new(mail_config).send(&code, &email) {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "success": true, "message": "OTP sent successfully" })),
        ),
        Err(e) => error_response(&e),
    }
}

async fn verify_otp_handler(
    State(state): State<Arc<AppState>>,
    payload: Option<JsonBody<VerifyOtpRequest>>,
) -> (StatusCode, Json<Value>) {
    let otp = payload
        .and_then(|JsonBody(request)| request.otp)
        .unwrap_or_default();
    if otp.len() != 6 || !otp.chars().all(|c| c.is_ascii_digit()) {
        return error_response(&Error::InvalidFormat);
    }

    let verified = state
        .otp
        .lock()
        .expect("OTP store lock poisoned")
        .verify(&otp);

    if verified {
        (
            StatusCode::OK,
            Json(json!({ "success": true, "message": "OTP verified successfully" })),
        )
    } else {
        error_response(&Error::InvalidOrExpired)
    }
}

async fn download_handler(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Response {
    let file_path = state.download_dir.join(&filename);
    if file_path.is_file() {
        match fs::read(&file_path) {
            Ok(data) => {
                let headers = [
                    (header::CONTENT_TYPE, "application/octet-stream".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{filename}\""),
                    ),
                ];
                (headers, Body::from(data)).into_response()
            }
            Err(e) => {
                error!("failed to read {}: {e}", file_path.display());
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "error": "File not found" })),
                )
                    .into_response()
            }
        }
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "File not found" })),
        )
            .into_response()
    }
}

async fn home() -> Response {
    serve_asset("index.html")
}

async fn static_handler(Path(path): Path<String>) -> Response {
    serve_asset(&path)
}

fn serve_asset(path: &str) -> Response {
    match Asset::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            match Response::builder()
                .header(header::CONTENT_TYPE, mime.as_ref())
                .body(Body::from(content.data))
            {
                Ok(response) => response,
                Err(e) => {
                    error!("failed to build asset response: {e}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "error": "Internal server error" })),
                    )
                        .into_response()
                }
            }
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Endpoint not found" })),
        )
            .into_response(),
    }
}

async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Endpoint not found" })),
    )
}

/// Last-resort conversion of a handler panic into a generic JSON 500. The
/// panic payload is logged server-side and never reaches the client.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_owned()
    } else {
        "opaque panic payload".to_owned()
    };
    error!("unhandled panic in request handler: {detail}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "An unexpected error occurred" })),
    )
        .into_response()
}
