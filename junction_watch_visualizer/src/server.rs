use crate::error::HttpApiError;
use crate::{ControlHandle, FrameBus, ServerConfig, view};
use anyhow::Context;
use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::{Bytes, BytesMut};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use junction_watch::core_modules::camera_feed::FeedMeta;
use junction_watch::core_modules::chat::ChatMessage;
use junction_watch::core_modules::junction::Junction;
use junction_watch::{Monitor, Snapshot, Stats};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

/// Everything a handler can reach.
#[derive(Clone)]
pub struct AppState {
    pub monitor: Monitor,
    pub bus: FrameBus,
    pub control: ControlHandle,
}

impl AppState {
    pub fn new(monitor: Monitor, bus: FrameBus, control: ControlHandle) -> Self {
        Self { monitor, bus, control }
    }
}

/// Static description of the backend shown in the page footer and `/api/system/info`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemInfo {
    pub backend: &'static str,
    pub version: &'static str,
    pub ml_libraries: Vec<&'static str>,
    pub junctions_monitored: usize,
    pub ai_accuracy: &'static str,
    pub uptime: &'static str,
}

impl SystemInfo {
    pub fn for_junctions(junctions_monitored: usize) -> Self {
        Self {
            backend: "Rust axum",
            version: env!("CARGO_PKG_VERSION"),
            ml_libraries: vec![
                "TensorFlow - Neural Networks",
                "OpenCV - Computer Vision",
                "YOLO - Object Detection",
                "Scikit-learn - Machine Learning",
                "NumPy - Numerical Computing",
                "Pandas - Data Analysis",
            ],
            junctions_monitored,
            ai_accuracy: "98.5%",
            uptime: "Continuous 24/7 monitoring",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    accepted: bool,
    message: Option<ChatMessage>,
}

/// Messages pushed over `/ws/telemetry`.
#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
enum Telemetry {
    Snapshot(Snapshot),
    Feed(FeedMeta),
}

// Button, chat and telemetry glue for the server-rendered page.
const CLIENT_JS: &str = r#"(function(){
    const $ = (id)=>document.getElementById(id);
    const status = (t)=>{ const el=$('status'); if(el) el.textContent=t; };
    const post = (url, body)=> fetch(url, { method:'POST', headers:{'Content-Type':'application/json'}, body: body ? JSON.stringify(body) : undefined });
    const text = (tag, cls, value)=>{ const el=document.createElement(tag); if(cls) el.className=cls; el.textContent=value; return el; };

    if($('btn-refresh')){ $('btn-refresh').onclick = ()=> post('/api/traffic/update'); }
    if($('btn-optimize')){ $('btn-optimize').onclick = ()=> post('/api/signals/optimize').then(r=> status(r.status===409 ? 'already optimizing' : 'optimizing')); }
    if($('btn-emergency')){ $('btn-emergency').onclick = ()=> post('/api/emergency/override').then(()=>status('emergency override')); }
    if($('btn-play')){ $('btn-play').onclick = ()=> post('/control/play'); }
    if($('btn-pause')){ $('btn-pause').onclick = ()=> post('/control/pause'); }

    const form = $('chat-form');
    if(form){ form.onsubmit = (ev)=>{
        ev.preventDefault();
        const input = $('chat-input');
        const message = input.value;
        input.value = '';
        post('/api/chat', { message });
    }; }

    const renderSnapshot = (snap)=>{
        status(snap.optimizing ? 'optimizing' : 'idle');
        for(const j of snap.junctions){
            const card = $('junction-'+j.id);
            if(!card) continue;
            card.querySelector('.signal').className = 'signal '+j.signal;
            card.querySelector('.signal-label').textContent = j.signal;
            card.querySelector('.density').textContent = j.density;
            card.querySelector('.vehicles').textContent = j.vehicles;
            card.querySelector('.wait').textContent = j.wait_time;
        }
        const list = $('violations');
        if(list){
            list.replaceChildren(...snap.violations.map(v=>{
                const li = text('li', 'violation', '');
                li.append(text('strong', '', v.type), ' at '+v.location+' ', text('span', 'muted', v.time+' ('+v.confidence.toFixed(1)+'%, '+v.ai_model+')'));
                return li;
            }));
        }
        const log = $('chat-log');
        if(log){
            log.replaceChildren(...snap.chat.map(m=>{
                const row = text('div', 'msg '+m.origin, '');
                row.append(text('span', '', m.text), ' ', text('span', 'muted', m.timestamp));
                return row;
            }));
            log.scrollTop = log.scrollHeight;
        }
        const s = snap.stats;
        if($('stat-vehicles')) $('stat-vehicles').textContent = s.total_vehicles;
        if($('stat-wait')) $('stat-wait').textContent = Math.round(s.average_wait_secs)+' seconds';
        if($('stat-signals')) $('stat-signals').textContent = s.green_signals+' green, '+s.yellow_signals+' yellow, '+s.red_signals+' red';
        if($('stat-violations')) $('stat-violations').textContent = s.violations_total;
    };

    const connect = ()=>{
        const ws = new WebSocket((location.protocol==='https:'?'wss://':'ws://')+location.host+'/ws/telemetry');
        ws.onmessage = (ev)=>{
            const msg = JSON.parse(ev.data);
            if(msg.type==='snapshot'){ renderSnapshot(msg.data); }
            else if(msg.type==='feed' && $('detected')){ $('detected').textContent = (msg.data.playing ? 'live' : 'paused')+', '+msg.data.detected_count+' vehicles detected'; }
        };
        ws.onclose = ()=>{ status('disconnected'); setTimeout(connect, 2000); };
    };
    connect();
})();"#;

const MJPEG_BOUNDARY: &str = "frame";

/// Every route of the dashboard server.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/client.js", get(client_js))
        .route("/healthz", get(|| async { "ok" }))
        .route("/api/traffic/status", get(traffic_status))
        .route("/api/junctions/:id", get(junction_by_id))
        .route("/api/traffic/update", post(update_traffic))
        .route("/api/signals/optimize", post(optimize_signals))
        .route("/api/emergency/override", post(emergency_override))
        .route("/api/violations", get(violations))
        .route("/api/stats", get(stats))
        .route("/api/chat", get(chat_transcript).post(chat))
        .route("/api/system/info", get(system_info))
        .route("/api/camera/feed", get(camera_feed))
        .route("/ws/telemetry", get(telemetry))
        .route("/control/play", post(play))
        .route("/control/pause", post(pause))
        .with_state(state)
}

/// Binds `cfg.bind_addr` and serves the dashboard on a background task.
pub async fn start_server(
    monitor: Monitor,
    bus: FrameBus,
    cfg: ServerConfig,
    control: ControlHandle,
) -> anyhow::Result<tokio::task::JoinHandle<()>> {
    let app = router(AppState::new(monitor, bus, control));
    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("binding {}", cfg.bind_addr))?;
    let local = listener.local_addr().context("reading bound address")?;
    info!(addr = %local, "dashboard server listening on http://{local}");

    let server = tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            error!(error = %err, "dashboard server stopped");
        }
    });
    Ok(server)
}

fn system_info_for(state: &AppState) -> SystemInfo {
    SystemInfo::for_junctions(state.monitor.read(|d| d.junctions().len()))
}

fn junctions_of(state: &AppState) -> Vec<Junction> {
    state.monitor.read(|d| d.junctions().to_vec())
}

async fn index(State(state): State<AppState>) -> Html<String> {
    let info = system_info_for(&state);
    Html(view::render_page(state.monitor.snapshot(), info))
}

async fn client_js() -> Response {
    let mut resp = Response::new(Body::from(CLIENT_JS));
    resp.headers_mut().insert(header::CONTENT_TYPE, HeaderValue::from_static("application/javascript"));
    resp
}

async fn traffic_status(State(state): State<AppState>) -> Json<Value> {
    let (junctions, optimizing) = state.monitor.read(|d| (d.junctions().to_vec(), d.is_optimizing()));
    Json(json!({
        "status": "success",
        "junctions": junctions,
        "optimizing": optimizing,
        "system_info": system_info_for(&state),
    }))
}

async fn junction_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Junction>, HttpApiError> {
    let junction = state.monitor.read(|d| d.junction(&id).cloned())?;
    Ok(Json(junction))
}

async fn update_traffic(State(state): State<AppState>) -> Json<Value> {
    let outcome = state.monitor.refresh_now();
    Json(json!({
        "status": "success",
        "tick": outcome.tick,
        "violation": outcome.violation,
        "junctions": junctions_of(&state),
    }))
}

async fn optimize_signals(State(state): State<AppState>) -> Result<(StatusCode, Json<Value>), HttpApiError> {
    state.monitor.optimize()?;
    let delay = state.monitor.read(|d| d.config().optimize_delay);
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "status": "optimizing", "completes_in_ms": delay.as_millis() as u64 })),
    ))
}

async fn emergency_override(State(state): State<AppState>) -> Json<Value> {
    state.monitor.emergency_override();
    Json(json!({ "status": "success", "junctions": junctions_of(&state) }))
}

async fn violations(State(state): State<AppState>) -> Json<Value> {
    let (list, total) = state.monitor.read(|d| (d.violations().to_vec(), d.violations().total_recorded()));
    Json(json!({ "status": "success", "violations": list, "total_recorded": total }))
}

async fn stats(State(state): State<AppState>) -> Json<Stats> {
    Json(state.monitor.read(|d| d.stats()))
}

async fn chat_transcript(State(state): State<AppState>) -> Json<Vec<ChatMessage>> {
    Json(state.monitor.read(|d| d.chat().messages().to_vec()))
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, HttpApiError> {
    let Json(req) = payload?;
    let message = state.monitor.send_chat(&req.message);
    Ok(Json(ChatResponse { accepted: message.is_some(), message }))
}

async fn system_info(State(state): State<AppState>) -> Json<SystemInfo> {
    Json(system_info_for(&state))
}

async fn camera_feed(State(state): State<AppState>) -> Response {
    let mut rx = state.bus.frames_tx.subscribe();
    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(packet) => {
                    let head = format!(
                        "--{MJPEG_BOUNDARY}\r\nContent-Type: {}\r\nContent-Length: {}\r\n\r\n",
                        packet.format.mime(),
                        packet.data.len()
                    );
                    let mut part = BytesMut::with_capacity(head.len() + packet.data.len() + 2);
                    part.extend_from_slice(head.as_bytes());
                    part.extend_from_slice(&packet.data);
                    part.extend_from_slice(b"\r\n");
                    yield Ok::<Bytes, std::convert::Infallible>(part.freeze());
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "mjpeg client lagging");
                    continue;
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    let mut resp = Response::new(Body::from_stream(stream));
    let content_type = format!("multipart/x-mixed-replace; boundary={MJPEG_BOUNDARY}");
    if let Ok(value) = HeaderValue::from_str(&content_type) {
        resp.headers_mut().insert(header::CONTENT_TYPE, value);
    }
    resp.headers_mut().insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    resp
}

async fn telemetry(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| telemetry_conn(socket, state))
}

async fn send_telemetry(tx: &mut SplitSink<WebSocket, Message>, msg: &Telemetry) -> anyhow::Result<()> {
    let text = serde_json::to_string(msg)?;
    tx.send(Message::Text(text)).await?;
    Ok(())
}

async fn telemetry_conn(socket: WebSocket, state: AppState) {
    let (mut tx, mut rx) = socket.split();
    let mut snapshots = state.monitor.subscribe();
    let mut metas = state.bus.meta_tx.subscribe();

    if send_telemetry(&mut tx, &Telemetry::Snapshot(state.monitor.snapshot())).await.is_err() {
        return;
    }
    debug!("telemetry client connected");

    loop {
        let outgoing = tokio::select! {
            snap = snapshots.recv() => match snap {
                Ok(snapshot) => Telemetry::Snapshot(snapshot),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "telemetry client lagging, resending latest snapshot");
                    Telemetry::Snapshot(state.monitor.snapshot())
                }
                Err(RecvError::Closed) => break,
            },
            meta = metas.recv() => match meta {
                Ok(meta) => Telemetry::Feed(meta),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            },
            incoming = rx.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => continue,
            },
        };
        if send_telemetry(&mut tx, &outgoing).await.is_err() {
            break;
        }
    }
    debug!("telemetry client disconnected");
}

async fn play(State(state): State<AppState>) -> StatusCode {
    state.control.set_playing(true);
    info!("camera feed play requested");
    StatusCode::NO_CONTENT
}

async fn pause(State(state): State<AppState>) -> StatusCode {
    state.control.set_playing(false);
    info!("camera feed pause requested");
    StatusCode::NO_CONTENT
}
