use axum::{
	Form, Json, Router,
	extract::{DefaultBodyLimit, Multipart, Path, State, multipart::MultipartError},
	http::{StatusCode, header},
	response::{Html, IntoResponse, Redirect, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::{
	pages,
	session::{Authenticated, Session},
	state::AppState,
};
use pinvault_service::{
	Error as ServiceError, FILE_DELETED_MESSAGE, LoginRequest, NOTES_DELETED_MESSAGE,
	NOTES_UPDATED_MESSAGE, UploadRequest, UploadedFile,
};

const LOGGED_OUT_MESSAGE: &str = "Logged out successfully.";

#[derive(Debug, Deserialize)]
struct LoginForm {
	#[serde(default)]
	vault_password: String,
}

#[derive(Debug, Deserialize)]
struct UpdateNoteForm {
	#[serde(default)]
	updated_code: String,
}

pub fn router(state: AppState) -> Router {
	let body_limit = state.service.cfg.service.max_upload_bytes;

	Router::new()
		.route("/", get(home))
		.route("/login", get(login_page).post(login))
		.route("/logout", get(logout))
		.route("/upload", post(upload))
		.route("/view", get(view))
		.route("/download/{filename}", get(download))
		.route("/delete_file/{filename}", get(delete_file))
		.route("/update_note", post(update_note))
		.route("/delete_note", post(delete_note))
		.route("/about", get(about))
		.route("/health", get(health))
		.layer(DefaultBodyLimit::max(body_limit))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn about() -> Html<String> {
	Html(pages::about())
}

async fn home(Authenticated { mut session, tenant }: Authenticated) -> (Session, Html<String>) {
	let flashes = session.data.take_flashes();
	let page = pages::home(&tenant.pin, &flashes);

	(session, Html(page))
}

async fn login_page(mut session: Session) -> (Session, Html<String>) {
	let flashes = session.data.take_flashes();
	let page = pages::login(&flashes);

	(session, Html(page))
}

async fn login(
	State(state): State<AppState>,
	mut session: Session,
	Form(form): Form<LoginForm>,
) -> Result<(Session, Redirect), ApiError> {
	match state.service.login(LoginRequest { pin: form.vault_password }).await {
		Ok(response) => {
			if let Some(message) = response.message() {
				session.flash(message);
			}

			session.data.log_in(response.tenant);

			Ok((session, Redirect::to("/")))
		},
		Err(err) => {
			flash_user_error(&mut session, err)?;

			Ok((session, Redirect::to("/login")))
		},
	}
}

async fn logout(mut session: Session) -> (Session, Redirect) {
	session.data.log_out();
	session.flash(LOGGED_OUT_MESSAGE);

	(session, Redirect::to("/login"))
}

async fn upload(
	State(state): State<AppState>,
	Authenticated { mut session, tenant }: Authenticated,
	mut multipart: Multipart,
) -> Result<(Session, Redirect), ApiError> {
	let mut file = None;
	let mut code = None;

	while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
		let field_name = field.name().map(|name| name.to_string());

		match field_name.as_deref() {
			Some("file") => {
				let name = field.file_name().unwrap_or_default().to_string();
				let bytes = field.bytes().await.map_err(multipart_error)?;

				file = Some(UploadedFile { name, bytes: bytes.to_vec() });
			},
			Some("code") => {
				code = Some(field.text().await.map_err(multipart_error)?);
			},
			_ => {},
		}
	}

	match state.service.upload(UploadRequest { tenant, file, code }).await {
		Ok(response) => {
			for message in response.messages() {
				session.flash(message);
			}
		},
		Err(err) => flash_user_error(&mut session, err)?,
	}

	Ok((session, Redirect::to("/")))
}

async fn view(
	State(state): State<AppState>,
	Authenticated { mut session, tenant }: Authenticated,
) -> Result<Response, ApiError> {
	match state.service.view(&tenant).await {
		Ok(view) => {
			let flashes = session.data.take_flashes();
			let page = pages::view(&view, &flashes);

			Ok((session, Html(page)).into_response())
		},
		Err(err) => {
			flash_user_error(&mut session, err)?;

			Ok((session, Redirect::to("/")).into_response())
		},
	}
}

async fn download(
	State(state): State<AppState>,
	Authenticated { mut session, tenant }: Authenticated,
	Path(filename): Path<String>,
) -> Result<Response, ApiError> {
	match state.service.download(&tenant, &filename).await {
		Ok(download) => {
			let disposition = format!("attachment; filename=\"{}\"", download.filename);
			let headers = [
				(header::CONTENT_TYPE, "application/octet-stream".to_string()),
				(header::CONTENT_DISPOSITION, disposition),
			];

			Ok((headers, download.bytes).into_response())
		},
		Err(err) => {
			flash_user_error(&mut session, err)?;

			Ok((session, Redirect::to("/view")).into_response())
		},
	}
}

async fn delete_file(
	State(state): State<AppState>,
	Authenticated { mut session, tenant }: Authenticated,
	Path(filename): Path<String>,
) -> Result<(Session, Redirect), ApiError> {
	match state.service.delete_file(&tenant, &filename).await {
		Ok(_) => session.flash(FILE_DELETED_MESSAGE),
		Err(err) => flash_user_error(&mut session, err)?,
	}

	Ok((session, Redirect::to("/view")))
}

async fn update_note(
	State(state): State<AppState>,
	Authenticated { mut session, tenant }: Authenticated,
	Form(form): Form<UpdateNoteForm>,
) -> Result<(Session, Redirect), ApiError> {
	match state.service.update_notes(&tenant, form.updated_code).await {
		Ok(()) => session.flash(NOTES_UPDATED_MESSAGE),
		Err(err) => flash_user_error(&mut session, err)?,
	}

	Ok((session, Redirect::to("/view")))
}

async fn delete_note(
	State(state): State<AppState>,
	Authenticated { mut session, tenant }: Authenticated,
) -> Result<(Session, Redirect), ApiError> {
	match state.service.delete_notes(&tenant).await {
		Ok(_) => session.flash(NOTES_DELETED_MESSAGE),
		Err(err) => flash_user_error(&mut session, err)?,
	}

	Ok((session, Redirect::to("/view")))
}

/// Shows user-facing failures as a flash. Anything else becomes an error response.
fn flash_user_error(session: &mut Session, err: ServiceError) -> Result<(), ApiError> {
	if err.is_user_facing() {
		session.flash(err.to_string());

		return Ok(());
	}

	Err(err.into())
}

fn multipart_error(err: MultipartError) -> ApiError {
	json_error(err.status(), "invalid_request", err.body_text(), None)
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				json_error(StatusCode::BAD_REQUEST, "invalid_request", message, None),
			ServiceError::NotFound { message } =>
				json_error(StatusCode::NOT_FOUND, "not_found", message, None),
			ServiceError::Storage { message } => {
				tracing::error!(error = %message, "Storage failure.");

				json_error(
					StatusCode::INTERNAL_SERVER_ERROR,
					"storage_error",
					"Storage failure.",
					None,
				)
			},
			ServiceError::Blob { message } => {
				tracing::error!(error = %message, "Blob storage failure.");

				json_error(
					StatusCode::INTERNAL_SERVER_ERROR,
					"blob_error",
					"Blob storage failure.",
					None,
				)
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}
