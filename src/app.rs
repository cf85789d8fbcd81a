use leptos::*;

use crate::application::views::{DashboardView, DetectionRow, dashboard_view};
use crate::domain::{ConnectionState, Publication, Readiness, dashboard::Timestamp};

/// Page model for the latest publication; `None` until a snapshot has landed.
pub fn project(publication: &Publication, now: Timestamp) -> Option<DashboardView> {
    publication.state.as_deref().map(|state| dashboard_view(state, now))
}

/// Banner shown instead of (or above) the dashboard body
pub fn status_label(publication: &Publication) -> String {
    match &publication.readiness {
        Readiness::Loading => "⏳ Loading dashboard...".to_string(),
        Readiness::Unavailable { reason } => format!("❌ Dashboard unavailable: {reason}"),
        Readiness::Ready => String::new(),
        Readiness::Closed => "🛑 Session closed".to_string(),
    }
}

pub fn connection_badge(connection: ConnectionState) -> &'static str {
    match connection {
        ConnectionState::Connected => "🟢 LIVE",
        ConnectionState::Connecting => "🟡 CONNECTING",
        ConnectionState::Disconnected => "🔴 OFF",
    }
}

const STYLES: &str = r#"
.fraud-dashboard {
    font-family: 'SF Pro Display', -apple-system, BlinkMacSystemFont, sans-serif;
    background: linear-gradient(135deg, #1e3c72 0%, #2a5298 100%);
    min-height: 100vh;
    padding: 20px;
    color: white;
}

.header {
    display: flex;
    justify-content: space-between;
    align-items: center;
    background: rgba(255, 255, 255, 0.1);
    padding: 20px;
    border-radius: 15px;
    margin-bottom: 20px;
}

.status {
    color: #f39c12;
    font-size: 14px;
    text-align: center;
    margin-bottom: 10px;
}

.summary {
    display: flex;
    gap: 20px;
    margin-bottom: 20px;
}

.card, .panel {
    flex: 1;
    background: rgba(0, 0, 0, 0.3);
    border-radius: 10px;
    padding: 15px;
}

.card-value {
    font-size: 24px;
    font-weight: 700;
    color: #72c685;
}

.card-label, .hint {
    font-size: 12px;
    color: #a0a0a0;
}

.risk-High { color: #e74c3c; }
.risk-Medium { color: #f39c12; }
.risk-Low { color: #72c685; }
"#;

/// Root component. Both inputs are owned by the caller; the component only reads.
#[component]
pub fn DashboardApp(publication: RwSignal<Publication>, now: RwSignal<Timestamp>) -> impl IntoView {
    let model = create_memo(move |_| project(&publication.get(), now.get()));

    view! {
        <style>{STYLES}</style>
        <div class="fraud-dashboard">
            <div class="header">
                <h1>"🛡️ Fraud Detection Dashboard"</h1>
                <span>{move || connection_badge(publication.get().connection)}</span>
            </div>
            <div class="status">{move || status_label(&publication.get())}</div>
            {move || model.get().map(|model| view! { <DashboardBody model=model /> })}
        </div>
    }
}

#[component]
fn DashboardBody(model: DashboardView) -> impl IntoView {
    let DashboardView { summary, trend, distribution, distribution_is_stale, models, recent } = model;

    view! {
        <div class="summary">
            <SummaryCard label="Total Transactions" value=summary.total_transactions.to_string() />
            <SummaryCard label="Fraud Detected" value=summary.fraud_detected.to_string() />
            <SummaryCard label="Fraud Rate" value=format!("{:.2}%", summary.fraud_rate_percent) />
            <SummaryCard
                label="Accuracy"
                value=summary.accuracy_percent.map_or("-".to_string(), |percent| format!("{percent:.1}%"))
            />
            <SummaryCard
                label="Prevention Saved"
                value=summary.prevention_saved.map_or("-".to_string(), |saved| format!("{saved:.2}$"))
            />
        </div>
        <div class="summary">
            <div class="panel">
                <h3>"Monthly Trend"</h3>
                <ul>
                    {trend
                        .into_iter()
                        .map(|point| view! {
                            <li>{point.label}": "{point.legitimate}" legitimate / "{point.fraud}" fraud"</li>
                        })
                        .collect_view()}
                </ul>
            </div>
            <div class="panel">
                <h3>"Detection Distribution"</h3>
                {distribution_is_stale.then(|| view! { <p class="hint">"As of the last snapshot"</p> })}
                <ul>
                    {distribution
                        .into_iter()
                        .map(|slice| view! {
                            <li>{slice.name}": "{slice.value}" ("{format!("{:.1}%", slice.percent)}")"</li>
                        })
                        .collect_view()}
                </ul>
            </div>
            <div class="panel">
                <h3>"Model Performance"</h3>
                <ul>
                    {models
                        .into_iter()
                        .map(|bar| view! {
                            <li>{bar.model}": "{format!("{:.1}%", bar.accuracy_percent)}</li>
                        })
                        .collect_view()}
                </ul>
            </div>
        </div>
        <RecentDetections rows=recent />
    }
}

#[component]
fn SummaryCard(label: &'static str, value: String) -> impl IntoView {
    view! {
        <div class="card">
            <div class="card-value">{value}</div>
            <div class="card-label">{label}</div>
        </div>
    }
}

#[component]
fn RecentDetections(rows: Vec<DetectionRow>) -> impl IntoView {
    view! {
        <div class="panel">
            <h3>"Recent Detections"</h3>
            <table>
                <thead>
                    <tr><th>"Transaction"</th><th>"Amount"</th><th>"Risk"</th><th>"Time"</th></tr>
                </thead>
                <tbody>
                    {rows
                        .into_iter()
                        .map(|row| {
                            let class = format!("risk-{}", row.risk);
                            view! {
                                <tr>
                                    <td>{row.id}</td>
                                    <td>{row.amount}</td>
                                    <td class=class>{row.risk.to_string()}</td>
                                    <td>{row.age}</td>
                                </tr>
                            }
                        })
                        .collect_view()}
                </tbody>
            </table>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_to_render_before_the_snapshot() {
        let publication = Publication::default();
        assert!(project(&publication, Timestamp::from_millis(0)).is_none());
        assert_eq!(status_label(&publication), "⏳ Loading dashboard...");
    }

    #[test]
    fn unavailable_banner_carries_the_reason() {
        let publication = Publication {
            readiness: Readiness::Unavailable { reason: "HTTP status 503".to_string() },
            ..Publication::default()
        };
        assert_eq!(status_label(&publication), "❌ Dashboard unavailable: HTTP status 503");
        assert_eq!(connection_badge(publication.connection), "🔴 OFF");
    }
}
