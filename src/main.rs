use dotenvy::dotenv;
use oxide_router::api::{self, AppState};
use oxide_router::config::Settings;
use oxide_router::router::SmartRouter;
use regex::Regex;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Regex patterns for redacting sensitive data
struct RedactionPatterns {
    bearer: Regex,
    sk_key: Regex,
    gsk_key: Regex,
    url_key: Regex,
    env_key: Regex,
}

impl RedactionPatterns {
    /// Initialize all regex patterns
    ///
    /// # Errors
    ///
    /// Returns an error if any regex pattern is invalid
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            bearer: Regex::new(r"(?i)(bearer\s+)[A-Za-z0-9._-]{8,}")?,
            sk_key: Regex::new(r"sk-[A-Za-z0-9_-]{16,}")?,
            gsk_key: Regex::new(r"gsk_[A-Za-z0-9_-]{16,}")?,
            url_key: Regex::new(r"([?&]key=)[A-Za-z0-9_-]+")?,
            env_key: Regex::new(r"((?:OPENAI|ANTHROPIC|GEMINI|GROQ|OPENROUTER)_API_KEY=)[^\s&]+")?,
        })
    }

    fn redact(&self, input: &str) -> String {
        let mut output = input.to_string();
        output = self
            .bearer
            .replace_all(&output, "$1[API_KEY]")
            .to_string();
        output = self.sk_key.replace_all(&output, "[API_KEY]").to_string();
        output = self.gsk_key.replace_all(&output, "[API_KEY]").to_string();
        output = self
            .url_key
            .replace_all(&output, "$1[API_KEY]")
            .to_string();
        output = self
            .env_key
            .replace_all(&output, "$1[MASKED]")
            .to_string();
        output
    }
}

struct RedactingWriter<W: Write> {
    inner: W,
    patterns: Arc<RedactionPatterns>,
}

impl<W: Write> RedactingWriter<W> {
    const fn new(inner: W, patterns: Arc<RedactionPatterns>) -> Self {
        Self { inner, patterns }
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        let redacted = self.patterns.redact(&s);
        self.inner.write_all(redacted.as_bytes())?;
        // We return the original buffer length to satisfy the contract,
        // even if the redacted string length differs.
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

struct RedactingMakeWriter<F> {
    make_inner: F,
    patterns: Arc<RedactionPatterns>,
}

impl<F> RedactingMakeWriter<F> {
    const fn new(make_inner: F, patterns: Arc<RedactionPatterns>) -> Self {
        Self {
            make_inner,
            patterns,
        }
    }
}

impl<'a, F, W> tracing_subscriber::fmt::MakeWriter<'a> for RedactingMakeWriter<F>
where
    F: Fn() -> W + 'static,
    W: Write,
{
    type Writer = RedactingWriter<W>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter::new((self.make_inner)(), self.patterns.clone())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenv().ok();

    // Initialize redaction patterns early (before logging)
    let patterns = Arc::new(RedactionPatterns::new().map_err(|e| {
        eprintln!("Failed to compile regex patterns: {e}");
        e
    })?);

    // Setup logging with redaction
    init_logging(patterns);

    info!("Starting Oxide Router...");

    // Load settings
    let settings = init_settings();

    if !settings.any_provider_configured() {
        error!("No provider API keys configured; every completion will fail");
    }

    let router = Arc::new(SmartRouter::new(&settings));
    info!(
        models = router.catalog().len(),
        cache_enabled = router.cache().enabled(),
        "Router initialized"
    );

    let state = AppState {
        router,
        settings: settings.clone(),
    };
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    info!(addr = settings.bind_addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shut down cleanly");
    Ok(())
}

fn init_logging(patterns: Arc<RedactionPatterns>) {
    let make_writer = RedactingMakeWriter::new(io::stderr, patterns);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(make_writer))
        .init();
}

fn init_settings() -> Arc<Settings> {
    match Settings::new() {
        Ok(s) => {
            info!("Configuration loaded successfully.");
            Arc::new(s)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
