use crate::handlers::index_url;
use crate::models::{LeaderboardMode, RankedEntry, Record, RecordId};
use chrono::{DateTime, Utc};
use std::fmt::Write;

pub struct HistoryView {
    pub player: String,
    pub best_id: Option<RecordId>,
    pub records: Vec<Record>,
}

pub struct IndexView<'a> {
    pub categories: &'a [String],
    pub active_category: &'a str,
    pub mode: LeaderboardMode,
    pub entries: &'a [RankedEntry],
    pub add_open: bool,
    pub history: Option<&'a HistoryView>,
    pub share_url: Option<&'a str>,
}

pub fn render_index(view: &IndexView<'_>) -> String {
    let slots = [
        ("TABS", render_tabs(view)),
        ("ADD_HREF", escape_html(&format!("{}&modal=add", index_url(view.active_category, None)))),
        ("SHARE", render_share(view.share_url)),
        ("LEADERBOARD", render_leaderboard(view)),
        ("ADD_MODAL", render_add_modal(view)),
        ("HISTORY_MODAL", render_history_modal(view)),
    ];
    fill_template(INDEX_HTML, &slots)
}

/// Substitutes `{{NAME}}` slots in a single left-to-right pass. Filled-in
/// text is never scanned again, so player data cannot name a slot.
fn fill_template(template: &str, slots: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start + 2..].find("}}") else {
            break;
        };
        let end = start + 2 + len + 2;
        out.push_str(&rest[..start]);
        let name = &rest[start + 2..end - 2];
        match slots.iter().find(|(slot, _)| *slot == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..end]),
        }
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}

fn render_tabs(view: &IndexView<'_>) -> String {
    let mut out = String::new();
    for category in view.categories {
        let class = if category == view.active_category { "tab active" } else { "tab" };
        let _ = write!(
            out,
            r#"<a class="{class}" href="{href}" data-category="{name}">{name}</a>"#,
            href = escape_html(&index_url(category, None)),
            name = escape_html(category),
        );
    }
    out
}

fn render_share(share_url: Option<&str>) -> String {
    match share_url {
        Some(url) => format!(
            r#"<a class="btn-share" id="btnShare" href="{url}" data-url="{url}">Share</a>"#,
            url = escape_html(url)
        ),
        None => String::new(),
    }
}

fn render_leaderboard(view: &IndexView<'_>) -> String {
    if view.entries.is_empty() {
        return r#"<div class="empty-state"><div class="icon">&#x26BD;</div><p>No records yet. Tap + New Record to add one!</p></div>"#
            .to_string();
    }

    let mut out = String::new();
    for entry in view.entries {
        let record = &entry.record;
        let class = match entry.rank {
            1..=3 => format!("record-card rank-{}", entry.rank),
            _ => "record-card".to_string(),
        };
        let rank = match entry.medal {
            Some(medal) => medal.emoji().to_string(),
            None => entry.rank.to_string(),
        };
        let title = match (view.mode, record.player.as_deref()) {
            (LeaderboardMode::PersonalBests, Some(player)) => format!(
                r#"<a class="player-name" href="{href}">{name}</a>"#,
                href = escape_html(&index_url(view.active_category, Some(player))),
                name = escape_html(player),
            ),
            _ => String::new(),
        };

        let _ = write!(
            out,
            r#"<div class="{class}" data-id="{id}">
  <div class="rank">{rank}</div>
  <div class="record-info">{title}<div class="record-count">{touches}</div><div class="record-date">{date}</div></div>
  {delete}
</div>
"#,
            id = escape_html(record.id.as_str()),
            touches = touches_label(record),
            date = format_date(&record.date),
            delete = delete_form(record, view.active_category, None),
        );
    }
    out
}

fn touches_label(record: &Record) -> String {
    match record.duration {
        Some(seconds) => format!("{} touches &middot; {seconds}s", record.count),
        None => format!("{} touches", record.count),
    }
}

fn delete_form(record: &Record, category: &str, player: Option<&str>) -> String {
    let player_field = player
        .map(|p| format!(r#"<input type="hidden" name="player" value="{}" />"#, escape_html(p)))
        .unwrap_or_default();
    format!(
        r#"<form method="post" action="/records/{id}/delete"><input type="hidden" name="category" value="{category}" />{player_field}<button class="btn-delete" type="submit" title="Delete">&times;</button></form>"#,
        id = escape_html(record.id.as_str()),
        category = escape_html(category),
    )
}

fn render_add_modal(view: &IndexView<'_>) -> String {
    if !view.add_open {
        return String::new();
    }

    let close = escape_html(&index_url(view.active_category, None));
    let mut options = String::new();
    for category in view.categories {
        let selected = if category == view.active_category { " selected" } else { "" };
        let _ = write!(
            options,
            r#"<option value="{name}"{selected}>{name}</option>"#,
            name = escape_html(category)
        );
    }
    let team_fields = match view.mode {
        LeaderboardMode::PersonalBests => r#"<label>Player <input id="player" name="player" type="text" autocomplete="off" /></label>
      <label>Duration (seconds) <input id="duration" name="duration" type="number" min="1" inputmode="numeric" /></label>"#,
        LeaderboardMode::AllRecords => "",
    };

    format!(
        r#"<div class="modal-overlay open" id="modalOverlay">
  <a class="backdrop" href="{close}" aria-label="Close"></a>
  <div class="modal">
    <div class="modal-header"><h2>New Record</h2><a class="modal-close" id="modalClose" href="{close}">&times;</a></div>
    <form id="recordForm" method="post" action="/records">
      <label>Category <select id="category" name="category">{options}</select></label>
      {team_fields}
      <label>Touches <input id="count" name="count" type="number" min="1" inputmode="numeric" autofocus /></label>
      <button class="btn-primary" type="submit">Save</button>
    </form>
  </div>
</div>"#
    )
}

fn render_history_modal(view: &IndexView<'_>) -> String {
    let Some(history) = view.history else {
        return String::new();
    };

    let close = escape_html(&index_url(view.active_category, None));
    let mut rows = String::new();
    for record in &history.records {
        let best = if history.best_id.as_ref() == Some(&record.id) {
            r#" <span class="best">PB</span>"#
        } else {
            ""
        };
        let _ = write!(
            rows,
            r#"<li class="history-row" data-id="{id}"><span>{touches}{best}</span><span class="record-date">{date}</span>{delete}</li>"#,
            id = escape_html(record.id.as_str()),
            touches = touches_label(record),
            date = format_date(&record.date),
            delete = delete_form(record, view.active_category, Some(&history.player)),
        );
    }

    format!(
        r#"<div class="modal-overlay open" id="historyOverlay">
  <a class="backdrop" href="{close}" aria-label="Close"></a>
  <div class="modal">
    <div class="modal-header"><h2>{player} &middot; {category}</h2><a class="modal-close" href="{close}">&times;</a></div>
    <ul class="history">{rows}</ul>
  </div>
</div>"#,
        player = escape_html(&history.player),
        category = escape_html(view.active_category),
    )
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Juggle Records</title>
  <style>
    :root {
      --bg-1: #eef6e9;
      --ink: #22281f;
      --accent: #3f9b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(160deg, var(--bg-1), #d7ecd0 70%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      justify-items: center;
      padding: 28px 16px 48px;
    }

    .app {
      width: min(640px, 100%);
      background: var(--card);
      border-radius: 24px;
      box-shadow: var(--shadow);
      padding: 28px;
      display: grid;
      gap: 20px;
    }

    header {
      display: flex;
      align-items: center;
      justify-content: space-between;
      gap: 12px;
    }

    h1 {
      margin: 0;
      font-family: "Georgia", serif;
      font-size: clamp(1.8rem, 4vw, 2.4rem);
    }

    a {
      color: inherit;
    }

    .tabs {
      display: flex;
      gap: 6px;
      padding: 6px;
      background: rgba(47, 72, 88, 0.08);
      border-radius: 999px;
    }

    .tab {
      flex: 1;
      text-align: center;
      text-decoration: none;
      border-radius: 999px;
      padding: 8px 14px;
      font-weight: 600;
      color: #6b645d;
      text-transform: capitalize;
    }

    .tab.active {
      background: white;
      color: var(--accent-2);
      box-shadow: 0 8px 16px rgba(47, 72, 88, 0.12);
    }

    .btn-primary, .btn-share, #btnAddRecord {
      border: none;
      border-radius: 999px;
      padding: 12px 18px;
      font-weight: 600;
      text-decoration: none;
      background: var(--accent);
      color: white;
      cursor: pointer;
      text-align: center;
    }

    .btn-share {
      background: var(--accent-2);
    }

    #leaderboard {
      display: grid;
      gap: 10px;
      animation: fade 250ms ease;
    }

    .record-card {
      display: grid;
      grid-template-columns: 48px 1fr auto;
      align-items: center;
      gap: 12px;
      background: white;
      border-radius: 16px;
      padding: 12px 16px;
      border: 1px solid rgba(47, 72, 88, 0.08);
    }

    .record-card.rank-1 {
      border-color: #e6c34a;
    }

    .rank {
      font-size: 1.5rem;
      text-align: center;
      font-weight: 600;
    }

    .player-name {
      font-weight: 600;
    }

    .record-date {
      color: #7a746d;
      font-size: 0.85rem;
    }

    .btn-delete {
      border: none;
      background: transparent;
      font-size: 1.4rem;
      color: #a19a92;
      cursor: pointer;
    }

    .empty-state {
      text-align: center;
      color: #6f6a65;
      padding: 32px 0;
    }

    .empty-state .icon {
      font-size: 2.4rem;
    }

    .modal-overlay {
      position: fixed;
      inset: 0;
      display: grid;
      place-items: center;
      padding: 16px;
    }

    .backdrop {
      position: absolute;
      inset: 0;
      background: rgba(34, 40, 31, 0.45);
    }

    .modal {
      position: relative;
      width: min(420px, 100%);
      max-height: 80vh;
      overflow-y: auto;
      background: white;
      border-radius: 20px;
      padding: 20px;
      display: grid;
      gap: 14px;
    }

    .modal-header {
      display: flex;
      justify-content: space-between;
      align-items: center;
    }

    .modal-header h2 {
      margin: 0;
      font-size: 1.2rem;
      text-transform: capitalize;
    }

    .modal-close {
      text-decoration: none;
      font-size: 1.6rem;
    }

    #recordForm {
      display: grid;
      gap: 12px;
    }

    #recordForm label {
      display: grid;
      gap: 4px;
      font-size: 0.9rem;
    }

    #recordForm input, #recordForm select {
      padding: 10px;
      border-radius: 10px;
      border: 1px solid rgba(47, 72, 88, 0.2);
      font-size: 1rem;
    }

    .history {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 8px;
      animation: fade 250ms ease;
    }

    .history-row {
      display: grid;
      grid-template-columns: 1fr auto auto;
      align-items: center;
      gap: 10px;
    }

    .best {
      background: #e6c34a;
      border-radius: 6px;
      padding: 1px 6px;
      font-size: 0.75rem;
      font-weight: 600;
    }

    @keyframes fade {
      from {
        opacity: 0.4;
      }
      to {
        opacity: 1;
      }
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Juggle Records</h1>
      {{SHARE}}
    </header>

    <nav class="tabs">{{TABS}}</nav>

    <a id="btnAddRecord" href="{{ADD_HREF}}">+ New Record</a>

    <section id="leaderboard">
{{LEADERBOARD}}
    </section>
  </main>

  {{ADD_MODAL}}
  {{HISTORY_MODAL}}

  <script>
    const share = document.getElementById('btnShare');
    if (share && navigator.clipboard) {
      share.addEventListener('click', (e) => {
        e.preventDefault();
        navigator.clipboard.writeText(share.dataset.url).then(() => {
          share.textContent = 'Copied!';
          setTimeout(() => { share.textContent = 'Share'; }, 1500);
        });
      });
    }

    if ('serviceWorker' in navigator) {
      navigator.serviceWorker.register('/sw.js');
    }
  </script>
</body>
</html>
"#;
