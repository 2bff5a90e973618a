// THEORY:
// Server-side rendering of the dashboard page with leptos. The page is
// rendered once per request from a `Snapshot`; after that `/client.js` keeps
// it current from the telemetry WebSocket, so the markup carries stable ids
// the script can patch (`junction-<id>`, `violations`, `chat-log`, ...).

use crate::server::SystemInfo;
use junction_watch::Snapshot;
use junction_watch::core_modules::chat::ChatMessage;
use junction_watch::core_modules::junction::Junction;
use junction_watch::core_modules::violation::Violation;
use leptos::*;

const STYLE: &str = r#"
body { margin:0; font-family: system-ui, sans-serif; background:#111827; color:#E5E7EB; }
main { max-width:1200px; margin:0 auto; padding:16px; }
.grid { display:grid; grid-template-columns: repeat(auto-fit, minmax(260px, 1fr)); gap:12px; }
.card { background:#1F2937; border:1px solid #374151; border-radius:10px; padding:12px; }
.signal { display:inline-block; width:12px; height:12px; border-radius:50%; margin-right:6px; }
.signal.red { background:#EF4444; } .signal.yellow { background:#F59E0B; } .signal.green { background:#10B981; }
.actions button { padding:6px 12px; margin-right:8px; }
.chat-log { height:220px; overflow-y:auto; font-size:13px; }
.msg.generated { color:#93C5FD; } .msg.authored { color:#FDE68A; text-align:right; }
.muted { color:#9CA3AF; font-size:12px; }
"#;

#[component]
fn JunctionCard(junction: Junction) -> impl IntoView {
    let signal = junction.signal.label();
    view! {
        <div class="card junction" id=format!("junction-{}", junction.id)>
            <h3>{junction.name}</h3>
            <p class="muted">{junction.description}</p>
            <p>
                <span class=format!("signal {signal}")></span>
                <span class="signal-label">{signal}</span>
            </p>
            <p>"Density: "<span class="density">{junction.density.label()}</span></p>
            <p>"Vehicles: "<span class="vehicles">{junction.vehicles.to_string()}</span></p>
            <p>"Wait: "<span class="wait">{junction.wait_time.to_string()}</span></p>
        </div>
    }
}

#[component]
fn ViolationRow(violation: Violation) -> impl IntoView {
    view! {
        <li class="violation">
            <strong>{violation.kind.label()}</strong>
            " at "{violation.location}" "
            <span class="muted">{format!("{} ({:.1}%, {})", violation.time, violation.confidence, violation.ai_model)}</span>
        </li>
    }
}

#[component]
fn ChatLine(message: ChatMessage) -> impl IntoView {
    let class = if message.is_generated() { "msg generated" } else { "msg authored" };
    view! {
        <div class=class>
            <span>{message.text}</span>" "
            <span class="muted">{message.timestamp}</span>
        </div>
    }
}

#[component]
fn DashboardPage(snapshot: Snapshot, info: SystemInfo) -> impl IntoView {
    let stats = snapshot.stats;
    view! {
        <main>
            <header>
                <h1>"AI Traffic Management System"</h1>
                <p class="muted">
                    {format!("{} junctions monitored, {} accuracy, {}", info.junctions_monitored, info.ai_accuracy, info.uptime)}
                </p>
            </header>

            <section class="actions card">
                <button id="btn-refresh">"Refresh Now"</button>
                <button id="btn-optimize">"Optimize Signals"</button>
                <button id="btn-emergency">"Emergency Override"</button>
                <span id="status" class="muted">{if snapshot.optimizing { "optimizing" } else { "idle" }}</span>
            </section>

            <section class="grid" id="junctions">
                {snapshot.junctions.into_iter().map(|junction| view! { <JunctionCard junction=junction/> }).collect_view()}
            </section>

            <section class="grid">
                <div class="card">
                    <h2>"Live Camera Feed"</h2>
                    <img id="camera" src="/api/camera/feed" width="640" height="360" alt="camera feed"/>
                    <div class="actions">
                        <button id="btn-play">"Play"</button>
                        <button id="btn-pause">"Pause"</button>
                        <span id="detected" class="muted"></span>
                    </div>
                </div>
                <div class="card">
                    <h2>"Statistics"</h2>
                    <ul id="stats">
                        <li>"Total vehicles: "<span id="stat-vehicles">{stats.total_vehicles.to_string()}</span></li>
                        <li>"Average wait: "<span id="stat-wait">{format!("{:.0} seconds", stats.average_wait_secs)}</span></li>
                        <li>"Signals: "<span id="stat-signals">{format!("{} green, {} yellow, {} red", stats.green_signals, stats.yellow_signals, stats.red_signals)}</span></li>
                        <li>"Violations today: "<span id="stat-violations">{stats.violations_total.to_string()}</span></li>
                    </ul>
                </div>
            </section>

            <section class="grid">
                <div class="card">
                    <h2>"Recent Violations"</h2>
                    <ul id="violations">
                        {snapshot.violations.into_iter().map(|violation| view! { <ViolationRow violation=violation/> }).collect_view()}
                    </ul>
                </div>
                <div class="card">
                    <h2>"AI Assistant"</h2>
                    <div id="chat-log" class="chat-log">
                        {snapshot.chat.into_iter().map(|message| view! { <ChatLine message=message/> }).collect_view()}
                    </div>
                    <form id="chat-form">
                        <input id="chat-input" type="text" placeholder="Ask about traffic..." autocomplete="off"/>
                        <button type="submit">"Send"</button>
                    </form>
                </div>
            </section>

            <footer class="muted">{format!("Backend: {}", info.backend)}</footer>
            <script src="/client.js"></script>
        </main>
    }
}

/// Full HTML document for the dashboard at `snapshot`.
pub fn render_page(snapshot: Snapshot, info: SystemInfo) -> String {
    let body = leptos::ssr::render_to_string(move || view! { <DashboardPage snapshot=snapshot info=info/> });
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\"/>\
         <title>AI Traffic Management System</title><style>{STYLE}</style></head><body>{body}</body></html>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use junction_watch::clock::FixedClock;
    use junction_watch::{Dashboard, DashboardConfig};
    use std::sync::Arc;

    #[test]
    fn page_lists_every_junction_and_the_greeting() {
        let config = DashboardConfig { seed: Some(3), ..Default::default() };
        let mut dashboard = Dashboard::with_clock(config, Arc::new(FixedClock::new(10, 0, 0)));
        dashboard.emergency_override();
        let snapshot = dashboard.snapshot();
        let info = SystemInfo::for_junctions(snapshot.junctions.len());

        let html = render_page(snapshot, info);
        assert!(html.starts_with("<!DOCTYPE html>"));
        for name in ["Connaught Place", "India Gate Circle", "Akshardham Temple", "Red Fort Junction"] {
            assert!(html.contains(name), "missing {name}");
        }
        assert!(html.contains("junction-junction1"));
        assert!(html.contains("Emergency"));
        assert!(html.contains("AI traffic assistant"));
        assert!(html.contains("/client.js"));
    }
}
