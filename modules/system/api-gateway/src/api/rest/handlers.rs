use axum::Json;
use axum::extract::{Query, State};
use chrono::{SecondsFormat, Utc};
use discomfort_sdk::{
    CardBatch, ChallengeTask, Domain, GrowthReflection, OnboardingReport, UserPreferenceSet,
};
use serde_json::Value;
use taste_graph_sdk::{InsightsQuery, TasteEntity, TasteGraphError};
use tracing::field::Empty;
use zesty_errors::{Problem, codes};

use crate::api::rest::dto::{
    AffinityClusterParams, AntithesesDto, AntithesesReq, ChallengeTaskReq, CrossDomainParams,
    FindNemesisReq, GenerateCardsReq, GenerateDto, GenerateReq, GrowthReflectionReq, HealthDto,
    InsightsReq, NemesisDto, OnboardingReq, RelatedDto, SearchParams, SearchResultsDto,
    ServiceStatus, ServicesDto,
};
use crate::api::rest::error::{
    ApiResult, graph_failure, missing, present, text_gen_failure, unknown_type,
};
use crate::state::AppState;

const DEFAULT_USER_NAME: &str = "Explorer";
const DEFAULT_TASK_DIFFICULTY: u8 = 3;
const RECOMMENDATIONS_FAILED: &str = "Failed to get recommendations";

fn non_null(value: Option<Value>) -> Option<Value> {
    value.filter(|v| !v.is_null())
}

#[allow(clippy::unused_async)]
pub async fn health(State(state): State<AppState>) -> Json<HealthDto> {
    Json(HealthDto {
        status: "OK",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        services: ServicesDto {
            taste_graph: ServiceStatus::from_configured(state.graph.is_configured()),
            text_gen: ServiceStatus::from_configured(state.text_gen.is_configured()),
        },
    })
}

// ==================== Taste graph ====================

/// Search never fails: without a credential, or when the graph errors, the
/// caller gets a single placeholder entity marked as mock.
#[tracing::instrument(skip_all, fields(kind = Empty))]
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchResultsDto>> {
    let query = present(params.query);
    let kind = present(params.kind);
    let (Some(query), Some(kind)) = (query.as_deref(), kind.as_deref()) else {
        return Err(missing(
            "Missing required parameters: query and type",
            &[("query", query.is_some()), ("type", kind.is_some())],
        ));
    };
    tracing::Span::current().record("kind", kind);

    let types = Domain::from_alias(kind).map_or(kind, |domain| domain.search_types());
    let results = match state.graph.search(query, types).await {
        Ok(results) => results,
        Err(TasteGraphError::NotConfigured) => vec![TasteEntity::mock(query, kind, false)],
        Err(e) => {
            tracing::warn!(
                kind = %e.kind(),
                error = %e,
                "graph search failed; answering with a mock entity"
            );
            vec![TasteEntity::mock(query, kind, true)]
        }
    };
    Ok(Json(SearchResultsDto { results }))
}

#[tracing::instrument(skip_all)]
pub async fn insights(
    State(state): State<AppState>,
    Json(req): Json<InsightsReq>,
) -> ApiResult<Json<RelatedDto>> {
    let signal = non_null(req.signal);
    let filter = non_null(req.filter);
    let (Some(signal), Some(filter)) = (signal.clone(), filter.clone()) else {
        return Err(missing(
            "Missing required parameters: signal and filter",
            &[("signal", signal.is_some()), ("filter", filter.is_some())],
        ));
    };

    state
        .graph
        .insights(&InsightsQuery { signal, filter })
        .await
        .map(|related| Json(RelatedDto { related }))
        .map_err(|e| graph_failure("insights", &e, "Failed to get insights from the taste graph"))
}

/// Search for the best match, then return what the graph relates to it.
#[tracing::instrument(skip_all, fields(domain = Empty))]
pub async fn recommendations(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<RelatedDto>> {
    let query = present(params.query);
    let kind = present(params.kind);
    let (Some(query), Some(kind)) = (query.as_deref(), kind.as_deref()) else {
        return Err(missing(
            "Missing required parameters: query and type",
            &[("query", query.is_some()), ("type", kind.is_some())],
        ));
    };
    let domain = Domain::from_alias(kind).ok_or_else(|| unknown_type("type", kind))?;
    tracing::Span::current().record("domain", domain.as_str());

    let entity = state
        .graph
        .search_entity(query, domain)
        .await
        .map_err(|e| graph_failure("recommendations.search", &e, RECOMMENDATIONS_FAILED))?
        .ok_or_else(|| codes::not_found("Entity not found"))?;

    state
        .graph
        .get_recommendations(&entity.id, domain)
        .await
        .map(|related| Json(RelatedDto { related }))
        .map_err(|e| graph_failure("recommendations.related", &e, RECOMMENDATIONS_FAILED))
}

#[tracing::instrument(skip_all)]
pub async fn antitheses(
    State(state): State<AppState>,
    Json(req): Json<AntithesesReq>,
) -> ApiResult<Json<AntithesesDto>> {
    let entity_id = present(req.entity_id);
    let kind = present(req.kind);
    let (Some(entity_id), Some(kind)) = (entity_id.as_deref(), kind.as_deref()) else {
        return Err(missing(
            "Missing required parameters: entity_id and type",
            &[("entity_id", entity_id.is_some()), ("type", kind.is_some())],
        ));
    };
    let domain = Domain::from_alias(kind).ok_or_else(|| unknown_type("type", kind))?;

    state
        .graph
        .approximate_antitheses(entity_id, domain)
        .await
        .map(|antitheses| Json(AntithesesDto { antitheses }))
        .map_err(|e| {
            graph_failure(
                "antitheses",
                &e,
                "Failed to get antitheses from the taste graph",
            )
        })
}

#[tracing::instrument(skip_all)]
pub async fn affinity_cluster(
    State(state): State<AppState>,
    Query(params): Query<AffinityClusterParams>,
) -> ApiResult<Json<Value>> {
    let Some(entities) = present(params.entities) else {
        return Err(missing(
            "Missing required parameter: entities",
            &[("entities", false)],
        ));
    };
    state
        .graph
        .affinity_cluster(&entities)
        .await
        .map(Json)
        .map_err(|e| {
            graph_failure(
                "affinity_cluster",
                &e,
                "Failed to get affinity cluster from the taste graph",
            )
        })
}

#[tracing::instrument(skip_all)]
pub async fn cross_domain_affinity(
    State(state): State<AppState>,
    Query(params): Query<CrossDomainParams>,
) -> ApiResult<Json<Value>> {
    let source = present(params.source_entities);
    let target = present(params.target_type);
    let (Some(source), Some(target)) = (source.as_deref(), target.as_deref()) else {
        return Err(missing(
            "Missing required parameters: source_entities and target_type",
            &[
                ("source_entities", source.is_some()),
                ("target_type", target.is_some()),
            ],
        ));
    };
    state
        .graph
        .cross_domain_affinity(source, target)
        .await
        .map(Json)
        .map_err(|e| {
            graph_failure(
                "cross_domain_affinity",
                &e,
                "Failed to get cross-domain affinity from the taste graph",
            )
        })
}

// ==================== Text generation ====================

#[tracing::instrument(skip_all)]
pub async fn generate(
    State(state): State<AppState>,
    Json(req): Json<GenerateReq>,
) -> ApiResult<Json<GenerateDto>> {
    let Some(prompt) = present(req.prompt) else {
        return Err(missing("Missing prompt parameter", &[("prompt", false)]));
    };
    state
        .text_gen
        .generate(&prompt)
        .await
        .map(|text| Json(GenerateDto { text }))
        .map_err(|e| text_gen_failure(&e))
}

// ==================== Zesty ====================

/// Always answers with a full batch; missing input means defaults.
#[tracing::instrument(skip_all)]
pub async fn generate_cards(
    State(state): State<AppState>,
    Json(req): Json<GenerateCardsReq>,
) -> Json<CardBatch> {
    let (preferences, unknown) =
        UserPreferenceSet::from_inputs(&req.user_preferences.unwrap_or_default());
    if !unknown.is_empty() {
        tracing::debug!(?unknown, "dropped preferences with unknown types");
    }
    let domains: Vec<Domain> = req
        .domains
        .unwrap_or_default()
        .iter()
        .filter_map(|d| Domain::from_alias(d))
        .collect();

    Json(state.discomfort.generate_cards(&preferences, &domains).await)
}

#[tracing::instrument(skip_all)]
pub async fn onboarding_report(
    State(state): State<AppState>,
    Json(req): Json<OnboardingReq>,
) -> Json<OnboardingReport> {
    let preferences = req.preference_set();
    let user_name = present(req.user_name).unwrap_or_else(|| DEFAULT_USER_NAME.to_owned());
    Json(
        state
            .discomfort
            .onboarding_report(&user_name, &preferences)
            .await,
    )
}

#[tracing::instrument(skip_all)]
pub async fn growth_reflection(
    State(state): State<AppState>,
    Json(req): Json<GrowthReflectionReq>,
) -> ApiResult<Json<GrowthReflection>> {
    let completed = non_null(req.completed_challenges);
    let user_name = present(req.user_name);
    let (Some(completed), Some(user_name)) = (completed.as_ref(), user_name.as_deref()) else {
        return Err(missing(
            "Missing completedChallenges or userName",
            &[
                ("completedChallenges", completed.is_some()),
                ("userName", user_name.is_some()),
            ],
        ));
    };
    Ok(Json(
        state
            .discomfort
            .growth_reflection(user_name, completed)
            .await,
    ))
}

#[allow(clippy::unused_async)]
#[tracing::instrument(skip_all)]
pub async fn find_nemesis(
    State(state): State<AppState>,
    Json(req): Json<FindNemesisReq>,
) -> ApiResult<Json<NemesisDto>> {
    let user_id = present(req.user_id);
    let (Some(preferences), Some(user_id)) = (req.user_preferences.as_deref(), user_id.as_deref())
    else {
        return Err(missing(
            "Missing userPreferences or userId",
            &[
                ("userPreferences", req.user_preferences.is_some()),
                ("userId", user_id.is_some()),
            ],
        ));
    };
    let nemesis = state.discomfort.find_nemesis(user_id, preferences);
    Ok(Json(NemesisDto { nemesis }))
}

/// Structured task for a domain; upstream trouble yields the templated task.
#[tracing::instrument(skip_all)]
pub async fn challenge_task(
    State(state): State<AppState>,
    Json(req): Json<ChallengeTaskReq>,
) -> ApiResult<Json<ChallengeTask>> {
    let Some(raw) = present(req.domain) else {
        return Err(missing("Missing domain", &[("domain", false)]));
    };
    let domain = Domain::from_alias(&raw).ok_or_else(|| unknown_type("domain", &raw))?;
    let difficulty = req
        .difficulty
        .and_then(|d| u8::try_from(d.clamp(1, 5)).ok())
        .unwrap_or(DEFAULT_TASK_DIFFICULTY);
    Ok(Json(
        state.discomfort.challenge_task(domain, difficulty).await,
    ))
}

#[allow(clippy::unused_async)]
pub async fn not_found() -> Problem {
    codes::not_found("Endpoint not found")
}
