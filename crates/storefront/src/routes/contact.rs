//! Contact form route handlers.
//!
//! Submissions are validated and written to the log; nothing is persisted.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use bitversity_core::{Email, Flash, FlashSeverity};

use crate::error::AppError;
use crate::filters;
use crate::middleware::{load_visitor, save_visitor};
use crate::models::VisitorSession;
use crate::state::AppState;

/// Maximum characters in the name field.
pub const NAME_MAX: usize = 100;
/// Maximum characters in the subject field.
pub const SUBJECT_MAX: usize = 150;
/// Maximum characters in the message field.
pub const MESSAGE_MAX: usize = 5000;

const CONTACT_PATH: &str = "/contact";

// =============================================================================
// Form Types
// =============================================================================

/// Contact form data.
#[derive(Debug, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub csrf_token: String,
}

/// Per-field validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactErrors {
    pub name: Option<&'static str>,
    pub email: Option<&'static str>,
    pub subject: Option<&'static str>,
    pub message: Option<&'static str>,
}

/// Trimmed field values, echoed back into the form when it is re-rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactValues {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// A submission that passed validation.
#[derive(Debug, Clone)]
pub struct ContactSubmission {
    pub name: String,
    pub email: Email,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    fn values(&self) -> ContactValues {
        ContactValues {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            subject: self.subject.trim().to_string(),
            message: self.message.trim().to_string(),
        }
    }

    /// Check every field, reporting all problems at once.
    ///
    /// # Errors
    ///
    /// Returns the trimmed values and a message per invalid field.
    pub fn validate(&self) -> Result<ContactSubmission, (ContactValues, ContactErrors)> {
        let values = self.values();

        let email = if values.email.is_empty() {
            Err("Please enter your email address.")
        } else {
            Email::parse(&values.email).map_err(|_| "Please enter a valid email address.")
        };

        let errors = ContactErrors {
            name: check_text(
                &values.name,
                NAME_MAX,
                "Please enter your name.",
                "Name must be 100 characters or fewer.",
            ),
            email: email.as_ref().err().copied(),
            subject: check_text(
                &values.subject,
                SUBJECT_MAX,
                "Please enter a subject.",
                "Subject must be 150 characters or fewer.",
            ),
            message: check_text(
                &values.message,
                MESSAGE_MAX,
                "Please enter a message.",
                "Message must be 5000 characters or fewer.",
            ),
        };

        match email {
            Ok(email) if errors == ContactErrors::default() => Ok(ContactSubmission {
                name: values.name,
                email,
                subject: values.subject,
                message: values.message,
            }),
            _ => Err((values, errors)),
        }
    }
}

/// Required, bounded text field.
fn check_text(
    value: &str,
    max: usize,
    missing: &'static str,
    too_long: &'static str,
) -> Option<&'static str> {
    if value.is_empty() {
        Some(missing)
    } else if value.chars().count() > max {
        Some(too_long)
    } else {
        None
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub csrf_token: String,
    pub flash: Option<Flash>,
    pub support_email: String,
    pub form: ContactValues,
    pub errors: ContactErrors,
}

impl ContactTemplate {
    fn new(
        state: &AppState,
        visitor: &mut VisitorSession,
        form: ContactValues,
        errors: ContactErrors,
    ) -> Self {
        Self {
            csrf_token: visitor.csrf_token().to_string(),
            flash: visitor.pop_flash(),
            support_email: state.config().support_email.to_string(),
            form,
            errors,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the contact form.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
) -> Result<ContactTemplate, AppError> {
    let mut visitor = load_visitor(&session).await?;
    let template = ContactTemplate::new(
        &state,
        &mut visitor,
        ContactValues::default(),
        ContactErrors::default(),
    );
    save_visitor(&session, &visitor).await?;
    Ok(template)
}

/// Handle a contact form submission.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ContactForm>,
) -> Result<Response, AppError> {
    let mut visitor = load_visitor(&session).await?;

    if !visitor.validate_csrf(&form.csrf_token) {
        warn!("Contact form rejected: CSRF token mismatch");
        return Err(AppError::invalid_csrf());
    }

    match form.validate() {
        Ok(submission) => {
            info!(
                name = %submission.name,
                email = %submission.email,
                subject = %submission.subject,
                message = %submission.message,
                "Contact form submitted"
            );
            visitor.set_flash(
                "Thanks for reaching out! We'll get back to you soon.",
                FlashSeverity::Success,
            );
            save_visitor(&session, &visitor).await?;
            Ok(Redirect::to(CONTACT_PATH).into_response())
        }
        Err((values, errors)) => {
            let template = ContactTemplate::new(&state, &mut visitor, values, errors);
            save_visitor(&session, &visitor).await?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response())
        }
    }
}
