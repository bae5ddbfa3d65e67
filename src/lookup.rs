use tracing::Instrument;

use crate::{
    api::ApiError,
    collectibles::{self, CollectiblesSummary},
    metrics::{Outcome, Section},
    App,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileView {
    pub display_name: String,
    /// `@name`, falling back to the id
    pub handle: String,
    pub description: String,
    /// `None` if the status could not be loaded or is blank
    pub status: Option<String>,
    pub avatar_url: Option<String>,
    pub profile_link: String,
}

/// Both sections of the page, each of them failing on its own.
#[derive(Debug)]
pub struct Lookup {
    pub user_id: String,
    pub profile: Result<ProfileView, ApiError>,
    pub collectibles: Result<CollectiblesSummary, ApiError>,
}

#[tracing::instrument(skip(app))]
pub async fn lookup(app: &App, user_id: &str) -> Lookup {
    let (profile, collectibles) = tokio::join!(
        load_profile(app, user_id).instrument(tracing::info_span!("profile")),
        load_collectibles(app, user_id).instrument(tracing::info_span!("collectibles")),
    );

    match &profile {
        Ok(_) => app.metrics.record(Section::Profile, Outcome::Ok),
        Err(e) => {
            tracing::error!("Loading User {:?}", e);
            app.metrics.record(Section::Profile, Outcome::Error);
        }
    };

    match &collectibles {
        Ok(summary) if summary.is_empty() => {
            app.metrics.record(Section::Collectibles, Outcome::Empty);
        }
        Ok(summary) => {
            tracing::info!(
                total_rap = summary.total_rap,
                count = summary.total_count,
                groups = summary.groups.len(),
                "Loaded Collectibles"
            );

            app.metrics.record(Section::Collectibles, Outcome::Ok);
            app.metrics.last_total_rap.set(summary.total_rap as f64);
            app.metrics
                .last_collectible_count
                .set(summary.total_count as f64);
        }
        Err(e) => {
            tracing::error!("Loading Collectibles {:?}", e);
            app.metrics.record(Section::Collectibles, Outcome::Error);
        }
    };
    app.metrics.touch();

    Lookup {
        user_id: user_id.to_string(),
        profile,
        collectibles,
    }
}

/// Info, status and avatar, one after the other. Only the status is allowed to fail.
async fn load_profile(app: &App, user_id: &str) -> Result<ProfileView, ApiError> {
    let info = app.client.load_user(user_id).await?;

    let status = match app.client.load_status(user_id).await {
        Ok(status) => status.display_text().map(str::to_string),
        Err(e) => {
            tracing::warn!("Loading Status {:?}", e);
            None
        }
    };

    let avatar = app.client.load_avatar(user_id).await?;
    let avatar_url = avatar
        .first_image_url()
        .map(|url| app.config.absolute_asset_url(url));

    Ok(ProfileView {
        display_name: non_empty(info.display_name).unwrap_or_else(|| "Unknown".to_string()),
        handle: format!(
            "@{}",
            non_empty(info.name).unwrap_or_else(|| user_id.to_string())
        ),
        description: info.description.unwrap_or_default(),
        status,
        avatar_url,
        profile_link: app.config.profile_link(user_id),
    })
}

async fn load_collectibles(app: &App, user_id: &str) -> Result<CollectiblesSummary, ApiError> {
    let items = app.client.load_collectibles(user_id).await?;
    Ok(collectibles::summarize(items))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
