use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the kickabout backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::game::create_game,
        crate::routes::game::get_game,
        crate::routes::game::get_occupancy,
        crate::routes::game::get_roster,
        crate::routes::join::join,
        crate::routes::join::confirm,
        crate::routes::webhook::stripe_webhook,
        crate::routes::organiser::connect,
        crate::routes::organiser::status,
        crate::routes::sse::game_stream,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::game::CreateGameRequest,
            crate::dto::game::GameCreatedResponse,
            crate::dto::game::GameDetails,
            crate::dto::join::JoinRequest,
            crate::dto::join::JoinResponse,
            crate::dto::join::ConfirmRequest,
            crate::dto::join::ConfirmResponse,
            crate::dto::join::WebhookAck,
            crate::dto::occupancy::OccupancyResponse,
            crate::dto::occupancy::RosterResponse,
            crate::dto::occupancy::RosterEntrySummary,
            crate::dto::organiser::ConnectRequest,
            crate::dto::organiser::ConnectResponse,
            crate::dto::organiser::AccountStatusResponse,
        )
    ),
    tags(
        (name = "games", description = "Game creation and game-scoped reads"),
        (name = "join", description = "Paid-join flow: checkout and confirmation"),
        (name = "webhook", description = "Payment processor webhook intake"),
        (name = "organisers", description = "Organiser payout-account onboarding"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
pub struct ApiDoc;
