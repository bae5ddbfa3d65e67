use serde::{Deserialize, Deserializer};

/*
{
    "previousPageCursor": null,
    "nextPageCursor": "2_1_c4b9...",
    "data": [
        {
            "userAssetId": 1031,
            "serialNumber": null,
            "assetId": 1365767,
            "name": "Valkyrie Helm",
            "recentAveragePrice": 125000,
            "originalPrice": null,
            "assetStock": null
        }
    ]
}
*/
#[derive(Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse<D> {
    pub previous_page_cursor: Option<String>,
    pub next_page_cursor: Option<String>,
    pub data: Option<D>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collectible {
    pub user_asset_id: Option<u64>,
    pub asset_id: Option<u64>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_price")]
    pub recent_average_price: u64,
    pub serial_number: Option<u64>,
    pub original_price: Option<serde_json::Value>,
    pub asset_stock: Option<serde_json::Value>,
}

pub type CollectiblesResponse = PagedResponse<Vec<Collectible>>;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserStatus {
    pub status: Option<String>,
    pub data: Option<StatusData>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusData {
    pub status: Option<String>,
}

impl UserStatus {
    /// The first non-empty of the places a status text shows up in, `None` if
    /// that turns out to be blank.
    pub fn display_text(&self) -> Option<&str> {
        [
            self.status.as_deref(),
            self.data.as_ref().and_then(|d| d.status.as_deref()),
            self.text.as_deref(),
        ]
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .map(str::trim)
        .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AvatarThumbnails {
    pub data: Option<Vec<Thumbnail>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thumbnail {
    pub target_id: Option<u64>,
    pub state: Option<String>,
    pub image_url: Option<String>,
}

impl AvatarThumbnails {
    pub fn first_image_url(&self) -> Option<&str> {
        self.data
            .as_ref()?
            .first()?
            .image_url
            .as_deref()
            .filter(|u| !u.is_empty())
    }
}

/// Prices show up as integers, floats, numeric strings or null depending on the
/// item, anything that is not a positive number counts as 0.
fn lenient_price<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;

    let value = match raw {
        Some(serde_json::Value::Number(n)) => n.as_u64().or_else(|| n.as_f64().map(float_price)),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok().map(float_price),
        _ => None,
    };

    Ok(value.unwrap_or(0))
}

fn float_price(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}
