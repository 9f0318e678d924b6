use anyhow::Context;
use prizedraw_core::{DisplaySlots, DrawEngine, DrawOutcome, RngState};
use prizedraw_data::{
    load_draw_config, DeskError, DeskStatus, DrawDesk, EligibilityError, JsonRosterStore,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use tiny_http::{Header, Method, Response, Server, StatusCode};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Desk = DrawDesk<JsonRosterStore>;

struct Settings {
    addr: String,
    assets: PathBuf,
    roster: PathBuf,
    seed: Option<u64>,
}

impl Settings {
    fn from_env() -> anyhow::Result<Self> {
        let assets = PathBuf::from(
            std::env::var("PRIZEDRAW_ASSETS").unwrap_or_else(|_| "assets".into()),
        );
        let roster = std::env::var("PRIZEDRAW_ROSTER")
            .map(PathBuf::from)
            .unwrap_or_else(|_| assets.join("roster.json"));
        let seed = match std::env::var("PRIZEDRAW_SEED") {
            Ok(raw) => Some(
                raw.parse::<u64>()
                    .with_context(|| format!("parse PRIZEDRAW_SEED {raw:?}"))?,
            ),
            Err(_) => None,
        };
        Ok(Self {
            addr: std::env::var("PRIZEDRAW_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".into()),
            assets,
            roster,
            seed,
        })
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prizedraw_web=info,prizedraw_data=info,prizedraw_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;
    let config = load_draw_config(&settings.assets)?;
    let rng = settings
        .seed
        .map(RngState::from_seed)
        .unwrap_or_else(RngState::from_entropy);
    let engine = DrawEngine::new(&config, rng).context("build prize pool")?;
    let store = JsonRosterStore::new(&settings.roster);
    let desk = Arc::new(
        DrawDesk::open(engine, store)
            .with_context(|| format!("open roster {}", settings.roster.display()))?,
    );

    let server = Server::http(&settings.addr)
        .map_err(|err| anyhow::anyhow!("start server on {}: {err}", settings.addr))?;
    tracing::info!("lucky draw server on http://{}", settings.addr);
    for request in server.incoming_requests() {
        let desk = Arc::clone(&desk);
        thread::spawn(move || {
            if let Err(err) = handle_request(request, &desk) {
                tracing::error!("request error: {err}");
            }
        });
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
struct ParticipantRequest {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    name: Value,
}

impl ParticipantRequest {
    fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    fn id(&self) -> String {
        field_text(&self.id)
    }

    fn name(&self) -> String {
        field_text(&self.name)
    }
}

fn field_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        _ => String::new(),
    }
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
enum SpinReply {
    Win {
        slots: DisplaySlots,
        prize: u32,
    },
    Lose {
        slots: DisplaySlots,
    },
    Invalid {
        message: String,
    },
    NotEligible {
        reason: &'static str,
        message: String,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Serialize, PartialEq)]
struct CheckReply {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
}

fn spin_reply(result: Result<DrawOutcome, DeskError>) -> (StatusCode, SpinReply) {
    match result {
        Ok(DrawOutcome::Win { slots, prize }) => (StatusCode(200), SpinReply::Win { slots, prize }),
        Ok(DrawOutcome::Lose { slots }) => (StatusCode(200), SpinReply::Lose { slots }),
        Err(DeskError::Ineligible(EligibilityError::MissingFields)) => (
            StatusCode(200),
            SpinReply::Invalid {
                message: EligibilityError::MissingFields.to_string(),
            },
        ),
        Err(DeskError::Ineligible(err)) => (
            StatusCode(200),
            SpinReply::NotEligible {
                reason: err.code(),
                message: err.to_string(),
            },
        ),
        Err(DeskError::Draw(err)) => {
            tracing::error!("draw failed: {err}");
            (
                StatusCode(500),
                SpinReply::Error {
                    message: "draw failed".to_string(),
                },
            )
        }
    }
}

fn check_reply(result: Result<(), EligibilityError>) -> CheckReply {
    CheckReply {
        ok: result.is_ok(),
        error: result.err().map(EligibilityError::code),
    }
}

fn handle_request(
    mut request: tiny_http::Request,
    desk: &Desk,
) -> Result<(), Box<dyn std::error::Error>> {
    let url = request.url().to_string();
    match (request.method(), url.as_str()) {
        (&Method::Get, "/") => {
            respond_with_file(request, web_path("index.html"), "text/html; charset=utf-8")?;
        }
        (&Method::Post, "/spin") => {
            let body = read_body(&mut request)?;
            let req = ParticipantRequest::parse(&body);
            let (status, reply) = spin_reply(desk.spin(&req.id(), &req.name()));
            respond_json(request, status, &reply)?;
        }
        (&Method::Post, "/check") => {
            let body = read_body(&mut request)?;
            let req = ParticipantRequest::parse(&body);
            let reply = check_reply(desk.check(&req.id(), &req.name()));
            respond_json(request, StatusCode(200), &reply)?;
        }
        (&Method::Get, "/api/pool") => {
            let status: DeskStatus = desk.status();
            respond_json(request, StatusCode(200), &status)?;
        }
        _ => {
            request.respond(Response::empty(StatusCode(404)))?;
        }
    }
    Ok(())
}

fn web_path(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("web")
        .join(file)
}

fn read_body(request: &mut tiny_http::Request) -> std::io::Result<String> {
    let mut body = String::new();
    request.as_reader().read_to_string(&mut body)?;
    Ok(body)
}

fn respond_with_file(
    request: tiny_http::Request,
    path: PathBuf,
    content_type: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = match std::fs::read(&path) {
        Ok(content) => content,
        Err(err) => {
            tracing::warn!("cannot serve {}: {err}", path.display());
            request.respond(Response::empty(StatusCode(404)))?;
            return Ok(());
        }
    };
    let header = Header::from_bytes(&b"Content-Type"[..], content_type)
        .map_err(|_| "invalid content type header")?;
    request.respond(Response::from_data(content).with_header(header))?;
    Ok(())
}

fn respond_json<T: Serialize>(
    request: tiny_http::Request,
    status: StatusCode,
    body: &T,
) -> Result<(), Box<dyn std::error::Error>> {
    let body = serde_json::to_vec(body)?;
    let header = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
        .map_err(|_| "invalid content type header")?;
    request.respond(
        Response::from_data(body)
            .with_header(header)
            .with_status_code(status),
    )?;
    Ok(())
}
