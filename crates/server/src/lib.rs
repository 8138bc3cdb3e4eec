//! Process bootstrap shared by the `participants` and `survey-management`
//! binaries: tracing, database and Redis connections, service wiring, the
//! tower-http layer stack and graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use fred::interfaces::ClientLike;
use sea_orm::DatabaseConnection;
use survey_api::{ManagementState, ParticipantsState, TokenVerifier};
use survey_common::{
    Config, InMemoryCodeStore, LocalStorage, RedisCodeStore, VerificationCodeStore,
    config::ServerConfig,
};
use survey_core::{
    AnswerService, AuthServiceClient, ConductorService, DraftService, Mailer, MediaService,
    NoOpMailer, NoOpRoleAssigner, OptionService, QuestionService, ResultsService, RoleAssigner,
    SessionService, SmtpMailer, SurveyService,
};
use survey_db::repositories::{
    AnswerRepository, ConductorRepository, OptionRepository, ParticipantDraftRepository,
    QuestionRepository, SurveyDraftRepository, SurveyMediaFileRepository, SurveyRepository,
    SurveyRequirementRepository, SurveySessionRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Body limit for routes that never carry uploads.
const JSON_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Initialize the global tracing subscriber.
///
/// Output is JSON when `SURVEY_LOG_FORMAT=json`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "survey=debug,tower_http=debug".into());
    let json = std::env::var("SURVEY_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Connect to Postgres and run pending migrations.
pub async fn connect_database(config: &Config) -> anyhow::Result<Arc<DatabaseConnection>> {
    let db = survey_db::init(config)
        .await
        .context("failed to connect to database")?;
    info!("Connected to database");

    info!("Running database migrations...");
    survey_db::migrate(&db).await?;
    info!("Migrations completed");

    Ok(Arc::new(db))
}

fn token_verifier(config: &Config) -> TokenVerifier {
    if config.auth.is_dev_bypass() {
        warn!(
            user_id = config.auth.dev_user_id,
            roles = ?config.auth.dev_roles,
            "No JWT secret configured; every request runs as the development identity"
        );
    }
    TokenVerifier::from_config(&config.auth)
}

/// Build the participants service router.
pub fn participants_app(config: &Config, db: &Arc<DatabaseConnection>) -> Router {
    let session_service = SessionService::new(
        Arc::clone(db),
        SurveyRepository::new(Arc::clone(db)),
        QuestionRepository::new(Arc::clone(db)),
        SurveySessionRepository::new(Arc::clone(db)),
        ParticipantDraftRepository::new(Arc::clone(db)),
        AnswerRepository::new(Arc::clone(db)),
        config.submission.answer_policy,
    );

    let router = survey_api::participants_router(ParticipantsState {
        session_service,
        verifier: token_verifier(config),
    });
    with_http_layers(router, &config.server, JSON_BODY_LIMIT)
}

/// Build the survey management service router.
pub async fn management_app(
    config: &Config,
    db: &Arc<DatabaseConnection>,
) -> anyhow::Result<Router> {
    let survey_repo = SurveyRepository::new(Arc::clone(db));
    let question_repo = QuestionRepository::new(Arc::clone(db));
    let option_repo = OptionRepository::new(Arc::clone(db));
    let session_repo = SurveySessionRepository::new(Arc::clone(db));
    let answer_repo = AnswerRepository::new(Arc::clone(db));
    let media_repo = SurveyMediaFileRepository::new(Arc::clone(db));
    let draft_repo = SurveyDraftRepository::new(Arc::clone(db));
    let requirement_repo = SurveyRequirementRepository::new(Arc::clone(db));

    let storage = Arc::new(LocalStorage::from_config(&config.storage));

    let role_assigner: Arc<dyn RoleAssigner> =
        match AuthServiceClient::from_config(&config.auth_service)? {
            Some(client) => Arc::new(client),
            None => {
                warn!("Auth service URL not configured; conductor roles will not be assigned");
                Arc::new(NoOpRoleAssigner)
            }
        };

    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp) => Arc::new(SmtpMailer::from_config(smtp)?),
        None => {
            warn!("SMTP not configured; verification e-mails will only be logged");
            Arc::new(NoOpMailer)
        }
    };

    let state = ManagementState {
        survey_service: SurveyService::new(
            Arc::clone(db),
            survey_repo.clone(),
            requirement_repo.clone(),
            question_repo.clone(),
            option_repo.clone(),
            media_repo.clone(),
            draft_repo.clone(),
        ),
        draft_service: DraftService::new(
            Arc::clone(db),
            survey_repo.clone(),
            draft_repo,
            question_repo.clone(),
            option_repo.clone(),
            media_repo,
            requirement_repo,
        ),
        question_service: QuestionService::new(
            Arc::clone(db),
            survey_repo.clone(),
            question_repo.clone(),
            option_repo.clone(),
        ),
        option_service: OptionService::new(survey_repo.clone(), question_repo.clone(), option_repo),
        answer_service: AnswerService::new(
            Arc::clone(db),
            session_repo.clone(),
            answer_repo.clone(),
        ),
        media_service: MediaService::new(storage, config.storage.max_upload_bytes),
        results_service: ResultsService::new(survey_repo, question_repo, session_repo, answer_repo),
        conductor_service: ConductorService::new(
            ConductorRepository::new(Arc::clone(db)),
            role_assigner,
            config.auth_service.role_name.clone(),
            mailer,
            code_store(config).await?,
            Duration::from_secs(config.verification.code_ttl_secs),
        ),
        verifier: token_verifier(config),
    };

    // Multipart uploads carry the file plus form overhead.
    let body_limit = config.storage.max_upload_bytes.max(JSON_BODY_LIMIT) + 64 * 1024;
    Ok(with_http_layers(
        survey_api::management_router(state),
        &config.server,
        body_limit,
    ))
}

async fn code_store(config: &Config) -> anyhow::Result<Arc<dyn VerificationCodeStore>> {
    let Some(url) = config.redis.url.as_deref() else {
        warn!("Redis URL not configured; verification codes are kept in memory");
        return Ok(Arc::new(InMemoryCodeStore::new()));
    };

    info!("Connecting to Redis...");
    let redis_config = fred::types::config::Config::from_url(url)
        .context("failed to parse Redis URL")?;
    let client = fred::clients::Client::new(redis_config, None, None, None);
    client.connect();
    client
        .wait_for_connect()
        .await
        .context("failed to connect to Redis")?;
    info!("Connected to Redis");

    Ok(Arc::new(RedisCodeStore::new(
        Arc::new(client),
        config.redis.prefix.clone(),
    )))
}

/// Apply the shared tower-http stack.
pub fn with_http_layers(router: Router, server: &ServerConfig, body_limit: usize) -> Router {
    router
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TimeoutLayer::new(Duration::from_secs(
            server.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Bind `port` and serve `app` until SIGINT or SIGTERM.
pub async fn serve(app: Router, host: &str, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid listen address {host}:{port}"))?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}
