use crate::{
    collectibles::{self, CollectiblesSummary},
    lookup::{Lookup, ProfileView},
    Config,
};

pub const PLACEHOLDER: &str = "—";
pub const IDLE_AVATAR: &str = "Enter a User ID and press Load";
pub const IDLE_COLLECTIBLES: &str = "Waiting for a user ID…";
pub const INVALID_INPUT: &str = "Please enter a valid User ID.";
pub const PROFILE_ERROR: &str = "Error loading user";
pub const NO_COLLECTIBLES: &str = "No collectibles found";
pub const COLLECTIBLES_ERROR: &str =
    "Collectibles are not available ( Inventory Private or Q-Net is down. (403) ).";

#[derive(Debug)]
pub enum PageState<'l> {
    /// Nothing has been asked for yet
    Idle,
    /// The form was submitted without an id
    Invalid,
    Loaded(&'l Lookup),
}

pub fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

const STYLE: &str = r#"
body { background: #0f1115; color: #e5e7eb; font-family: system-ui, sans-serif; margin: 0; padding: 2rem; }
form { display: flex; gap: .5rem; margin-bottom: 1.5rem; }
input { flex: 1; max-width: 20rem; padding: .5rem; border-radius: 8px; border: 1px solid #2a2f3a; background: #171a21; color: inherit; }
button { padding: .5rem 1rem; border-radius: 8px; border: 0; background: #3b82f6; color: white; cursor: pointer; }
.notice { color: #f87171; }
.profile { display: flex; gap: 1.5rem; align-items: flex-start; margin-bottom: 2rem; }
#avatar-wrap { width: 180px; min-height: 180px; display: flex; align-items: center; justify-content: center; background: #171a21; border-radius: 12px; }
#avatar-wrap .muted { color: #9aa0aa; text-align: center; }
#status { color: #9ca3af; font-size: 0.9rem; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(160px, 1fr)); gap: 1rem; }
.card { background: #171a21; border-radius: 12px; overflow: hidden; }
.thumb-wrap { position: relative; }
.thumb { width: 100%; display: block; }
.item-count { position: absolute; top: .5rem; right: .5rem; background: rgba(0,0,0,.7); padding: .1rem .4rem; border-radius: 6px; }
.body { padding: .5rem .75rem; }
.name { margin: 0 0 .25rem; font-weight: 600; }
.meta { margin: 0; color: #9ca3af; }
"#;

/// Renders the whole document for the given state.
pub fn page(state: &PageState<'_>, config: &Config) -> String {
    let input_value = match state {
        PageState::Loaded(lookup) => lookup.user_id.as_str(),
        _ => "",
    };

    let title = match state {
        PageState::Loaded(lookup) => format!("{} | RAP Lookup", lookup.user_id),
        _ => "RAP Lookup".to_string(),
    };

    let mut out = String::new();
    out.push_str(&format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body>
<form id="userForm" method="get" action="/">
<input id="userIdInput" name="user" placeholder="User ID" value="{value}" autofocus>
<button type="submit">Load</button>
</form>
"#,
        title = escape(&title),
        value = escape(input_value),
    ));

    if let PageState::Invalid = state {
        out.push_str(&format!(
            "<p class=\"notice\" id=\"error\">{INVALID_INPUT}</p>\n"
        ));
    }

    match state {
        PageState::Loaded(lookup) => {
            match &lookup.profile {
                Ok(profile) => profile_section(&mut out, profile),
                Err(_) => profile_placeholder(&mut out, ProfilePlaceholder::Failed),
            };
            match &lookup.collectibles {
                Ok(summary) => collectibles_section(&mut out, summary, config),
                Err(_) => collectibles_placeholder(&mut out, COLLECTIBLES_ERROR),
            };
        }
        PageState::Idle | PageState::Invalid => {
            profile_placeholder(&mut out, ProfilePlaceholder::Idle);
            collectibles_placeholder(&mut out, IDLE_COLLECTIBLES);
        }
    };

    out.push_str("</body>\n</html>\n");
    out
}

fn profile_section(out: &mut String, profile: &ProfileView) {
    let avatar = match profile.avatar_url.as_deref() {
        Some(url) => format!(
            r#"<img src="{}" alt="Avatar" style="width:100%;border-radius:12px;">"#,
            escape(url)
        ),
        None => String::new(),
    };

    out.push_str(&format!(
        r#"<section class="profile">
<div id="avatar-wrap">{avatar}</div>
<div>
<h1 id="displayName">{display_name}</h1>
<p id="username">{handle}</p>
<p id="status">{status}</p>
<p id="desc">{description}</p>
<a id="profileLink" href="{link}">View profile</a>
</div>
</section>
"#,
        display_name = escape(&profile.display_name),
        handle = escape(&profile.handle),
        status = escape(profile.status.as_deref().unwrap_or(PLACEHOLDER)),
        description = escape(&profile.description),
        link = escape(&profile.profile_link),
    ));
}

#[derive(Debug, Clone, Copy)]
enum ProfilePlaceholder {
    Idle,
    /// Every field shows the placeholder, handle and description included
    Failed,
}

fn profile_placeholder(out: &mut String, kind: ProfilePlaceholder) {
    let (message, handle, description) = match kind {
        ProfilePlaceholder::Idle => (IDLE_AVATAR, format!("@{PLACEHOLDER}"), ""),
        ProfilePlaceholder::Failed => (PROFILE_ERROR, PLACEHOLDER.to_string(), PLACEHOLDER),
    };

    out.push_str(&format!(
        r#"<section class="profile">
<div id="avatar-wrap"><p class="muted">{message}</p></div>
<div>
<h1 id="displayName">{PLACEHOLDER}</h1>
<p id="username">{handle}</p>
<p id="status">{PLACEHOLDER}</p>
<p id="desc">{description}</p>
</div>
</section>
"#,
        message = escape(message),
        handle = escape(&handle),
        description = escape(description),
    ));
}

fn collectibles_section(out: &mut String, summary: &CollectiblesSummary, config: &Config) {
    if summary.is_empty() {
        collectibles_placeholder(out, NO_COLLECTIBLES);
        return;
    }

    out.push_str(&format!(
        r#"<section>
<h2 id="collectiblesTitle">Collectibles (Total RAP: {total})</h2>
<p>Count: <span id="count">{count}</span></p>
<div class="grid" id="grid">
"#,
        total = collectibles::format_thousands(summary.total_rap),
        count = summary.total_count,
    ));

    for group in &summary.groups {
        let item = &group.item;

        let thumb = match item.asset_id {
            Some(asset_id) => format!(
                r#"<img class="thumb" src="{}" alt="{}">"#,
                escape(&collectibles::thumbnail_url(&config.asset_base, asset_id)),
                escape(item.name.as_deref().unwrap_or("Item")),
            ),
            None => String::new(),
        };

        let count = if group.quantity > 1 {
            format!(r#"<div class="item-count">×{}</div>"#, group.quantity)
        } else {
            String::new()
        };

        out.push_str(&format!(
            r#"<div class="card">
<div class="thumb-wrap">{thumb}{count}</div>
<div class="body">
<p class="name">{name}</p>
<p class="meta">RAP: {rap}</p>
</div>
</div>
"#,
            name = escape(item.name.as_deref().unwrap_or("Unknown")),
            rap = collectibles::format_thousands(item.recent_average_price),
        ));
    }

    out.push_str("</div>\n</section>\n");
}

fn collectibles_placeholder(out: &mut String, message: &str) {
    out.push_str(&format!(
        r#"<section>
<h2 id="collectiblesTitle">Collectibles</h2>
<p>Count: <span id="count">0</span></p>
<p id="loading">{message}</p>
</section>
"#,
        message = escape(message),
    ));
}
