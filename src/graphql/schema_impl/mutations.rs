use async_graphql::{Context, ErrorExtensions, Object, Result};

use crate::{
    app_state::AppState,
    auth::extract_claims_from_context,
    models::dto::{request::ProgressUpdateRequest, response::ProgressEntryDto},
};

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn record_progress(
        &self,
        ctx: &Context<'_>,
        input: ProgressUpdateRequest,
    ) -> Result<ProgressEntryDto> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).map_err(|e| e.extend())?;

        state
            .progress_service
            .record(&claims.sub, input)
            .await
            .map_err(|e| e.extend())
    }
}
