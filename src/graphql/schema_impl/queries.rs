use async_graphql::{Context, ErrorExtensions, Object, Result, ID};

use crate::{
    app_state::AppState,
    auth::extract_claims_from_context,
    models::dto::response::{
        AdaptiveDifficultyDto, GeneratedContentDto, ProgressEntryDto, UserDto,
    },
};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// The signed-in account.
    async fn me(&self, ctx: &Context<'_>) -> Result<UserDto> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).map_err(|e| e.extend())?;

        let user = state
            .user_service
            .get_user(&claims.sub)
            .await
            .map_err(|e| e.extend())?;
        Ok(user.into())
    }

    /// Progress history of the signed-in user, newest first.
    async fn progress(&self, ctx: &Context<'_>) -> Result<Vec<ProgressEntryDto>> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).map_err(|e| e.extend())?;

        state
            .progress_service
            .list(&claims.sub)
            .await
            .map_err(|e| e.extend())
    }

    async fn adaptive_difficulty(
        &self,
        ctx: &Context<'_>,
        topic: String,
    ) -> Result<AdaptiveDifficultyDto> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).map_err(|e| e.extend())?;

        state
            .progress_service
            .adaptive(&claims.sub, &topic)
            .await
            .map_err(|e| e.extend())
    }

    async fn content(&self, ctx: &Context<'_>, id: ID) -> Result<GeneratedContentDto> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).map_err(|e| e.extend())?;

        let content = state
            .content_service
            .get_content(&claims, &id)
            .await
            .map_err(|e| e.extend())?;
        Ok(content.into())
    }

    /// Everything the signed-in user has generated, newest first.
    async fn my_content(&self, ctx: &Context<'_>) -> Result<Vec<GeneratedContentDto>> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).map_err(|e| e.extend())?;

        let contents = state
            .content_service
            .list_for_user(&claims.sub)
            .await
            .map_err(|e| e.extend())?;
        Ok(contents.into_iter().map(GeneratedContentDto::from).collect())
    }
}
