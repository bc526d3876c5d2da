use axum::response::Html;
use tower_sessions::Session;

use crate::error::PageError;
use crate::session::SessionContext;
use crate::template;

pub async fn index(session: Session) -> Result<Html<String>, PageError> {
    let ctx = SessionContext::load(&session).await?;
    Ok(template::render_menu(
        ctx.provider,
        ctx.credentials().is_some(),
    ))
}
