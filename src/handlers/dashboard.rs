use askama::Template;
use axum::response::{Html, Redirect};

use crate::PortalError;
use crate::middleware::SessionUser;

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    name: String,
}

/// GET / -> always to the login page.
pub async fn home() -> Redirect {
    Redirect::to("/login")
}

/// GET /dashboard, only reachable with a session.
pub async fn dashboard(session: SessionUser) -> Result<Html<String>, PortalError> {
    let page = DashboardTemplate {
        name: session.user_name,
    };
    Ok(Html(page.render()?))
}
