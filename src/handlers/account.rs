use askama::Template;
use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::PrivateCookieJar;
use tracing::info;

use crate::PortalError;
use crate::auth::{hash_secret_blocking, with_hash_marker};
use crate::config::PasswordScheme;
use crate::db::NewUser;
use crate::db::users::InsertOutcome;
use crate::middleware::SessionUser;
use crate::server::router::PortalState;
use crate::types::forms::{LoginForm, RegisterForm, RegistrationError, normalize_email};

const INVALID_LOGIN: &str = "Invalid email or password.";

#[derive(Template, Default)]
#[template(path = "register.html")]
struct RegisterTemplate {
    error: Option<String>,
    name: String,
    email: String,
    mpin: String,
    credit_card: String,
}

impl RegisterTemplate {
    /// Re-render the submitted form (minus the password) with an error.
    fn rejected(form: RegisterForm, err: RegistrationError) -> Self {
        Self {
            error: Some(err.to_string()),
            name: form.name,
            email: form.email,
            mpin: form.mpin,
            credit_card: form.credit_card,
        }
    }
}

#[derive(Template, Default)]
#[template(path = "login.html")]
struct LoginTemplate {
    error: Option<String>,
}

/// GET /register
pub async fn register_page() -> Result<Html<String>, PortalError> {
    Ok(Html(RegisterTemplate::default().render()?))
}

/// POST /register -> validates, stores the new user and sends them to login.
pub async fn register_submit(
    State(state): State<PortalState>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, PortalError> {
    let form = form.normalized();

    if let Err(err) = form.validate() {
        return rejected_registration(form, err);
    }
    if state.users.email_exists(&form.email).await? {
        return rejected_registration(form, RegistrationError::DuplicateEmail);
    }

    let user = build_new_user(&state, &form).await?;
    match state.users.insert(&user).await? {
        InsertOutcome::Inserted(id) => {
            info!(user_id = id, "registered new user");
            Ok(Redirect::to("/login").into_response())
        }
        InsertOutcome::DuplicateEmail => {
            rejected_registration(form, RegistrationError::DuplicateEmail)
        }
    }
}

fn rejected_registration(form: RegisterForm, err: RegistrationError) -> Result<Response, PortalError> {
    let page = RegisterTemplate::rejected(form, err);
    Ok(Html(page.render()?).into_response())
}

async fn build_new_user(state: &PortalState, form: &RegisterForm) -> Result<NewUser, PortalError> {
    let password = match state.password_scheme {
        PasswordScheme::Legacy => state.verifier.cipher().encrypt(&form.password),
        PasswordScheme::Argon2 => hash_secret_blocking(form.password.clone()).await?,
    };
    let mpin_hash = hash_secret_blocking(form.mpin.clone()).await?;
    let card_hash = hash_secret_blocking(form.credit_card.clone()).await?;

    Ok(NewUser {
        name: form.name.clone(),
        email: form.email.clone(),
        password,
        mpin_secure_hash: Some(with_hash_marker(&mpin_hash)),
        atm_card_secure_hash: Some(card_hash),
        atm_card_last4: Some(form.card_last4()),
    })
}

/// GET /login
pub async fn login_page() -> Result<Html<String>, PortalError> {
    Ok(Html(LoginTemplate::default().render()?))
}

/// POST /login -> starts a session on success, re-renders the form otherwise.
pub async fn login_submit(
    State(state): State<PortalState>,
    jar: PrivateCookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, PortalError> {
    let email = normalize_email(&form.email);

    if let Some(user) = state.users.find_by_email(&email).await? {
        let verifier = state.verifier;
        let stored = user.password.clone();
        let provided = form.password;
        let verified =
            tokio::task::spawn_blocking(move || verifier.verify(&stored, &provided)).await?;

        if verified {
            let session = SessionUser {
                user_id: user.id,
                user_name: user.name,
            };
            let jar = session.store(jar, state.insecure_cookie)?;
            info!(user_id = session.user_id, "user logged in");
            return Ok((jar, Redirect::to("/dashboard")).into_response());
        }
    }

    info!("rejected login attempt");
    let page = LoginTemplate {
        error: Some(INVALID_LOGIN.to_string()),
    };
    Ok(Html(page.render()?).into_response())
}

/// GET /logout
pub async fn logout(jar: PrivateCookieJar) -> impl IntoResponse {
    (SessionUser::clear(jar), Redirect::to("/login"))
}
